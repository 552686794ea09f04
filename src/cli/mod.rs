pub mod add;
pub mod build;
pub mod prompt;
pub mod stats;

use std::path::PathBuf;

use add::{process_add_command, AddCommand};
use anyhow::Result;
use build::{process_build_command, BuildCommand};
use clap::{Parser, Subcommand};
use stats::{process_stats_command, StatsCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    config::{Config, CONFIG_FILE_NAME},
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "auralog", version, long_about = None)]
#[command(about = "Migraine journal with a static dashboard", long_about = None)]
pub(crate) struct Args {
    #[command(subcommand)]
    commands: Option<Commands>,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        help = "Configuration file. By default auralog.config.json in the current directory"
    )]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(
        visible_alias = "write",
        about = "Record a new headache. This is the default command"
    )]
    Add {
        #[command(flatten)]
        command: AddCommand,
    },
    #[command(about = "Write the dashboard and the journal data as a static site")]
    Build {
        #[command(flatten)]
        command: BuildCommand,
    },
    #[command(about = "Print counts of the journal in the terminal")]
    Stats {
        #[command(flatten)]
        command: StatsCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(
        CLI_PREFIX,
        &create_application_default_path()?,
        logging_level,
        args.log,
    )?;

    let config_path = args
        .config
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
    let config = Config::load(&config_path);

    match args.commands {
        Some(Commands::Add { command }) => process_add_command(command, &config).await,
        Some(Commands::Build { command }) => process_build_command(command, &config).await,
        Some(Commands::Stats { command }) => process_stats_command(command, &config).await,
        None => {
            let command = AddCommand::parse_from(["add"]);
            process_add_command(command, &config).await
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Args, Commands};

    #[test]
    fn args_are_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn write_is_an_alias_of_add() {
        let args = Args::parse_from(["auralog", "write", "--at", "202301151230"]);
        assert!(matches!(args.commands, Some(Commands::Add { .. })));

        let args = Args::parse_from(["auralog", "--log"]);
        assert!(args.commands.is_none());
        assert!(args.log);
    }

    #[test]
    fn build_and_stats_options() {
        let args = Args::parse_from([
            "auralog", "--config", "custom.json", "build", "--out", "public", "--theme", "blue",
            "--bar-orientation", "column",
        ]);
        assert!(matches!(args.commands, Some(Commands::Build { .. })));
        assert_eq!(args.config.as_deref(), Some(std::path::Path::new("custom.json")));

        let args = Args::parse_from(["auralog", "stats", "--field", "weekday", "-f", "triggers"]);
        assert!(matches!(args.commands, Some(Commands::Stats { .. })));
    }
}
