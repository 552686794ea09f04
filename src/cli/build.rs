use std::path::PathBuf;

use ansi_term::Colour;
use anyhow::Result;
use clap::Parser;

use crate::{
    analysis::charts::{BarOrientation, HeatmapTheme},
    config::Config,
    entries::storage::EntryStorageImpl,
    site::{build_site, BuildReport},
};

#[derive(Debug, Parser)]
pub struct BuildCommand {
    #[arg(long, default_value = "dist", help = "Directory the dashboard is written to")]
    out: PathBuf,
    #[arg(long, default_value_t = HeatmapTheme::default(), help = "Colours of the calendar heatmap")]
    theme: HeatmapTheme,
    #[arg(long, default_value_t = BarOrientation::default(), help = "Draw the weekday chart with horizontal bars or vertical columns")]
    bar_orientation: BarOrientation,
}

fn summary(report: &BuildReport, command: &BuildCommand) -> String {
    let mut lines = vec![format!(
        "Built {} entries and {} charts into {}",
        Colour::Green.bold().paint(report.entries.to_string()),
        report.charts,
        command.out.display()
    )];
    lines.extend(
        report
            .skipped
            .iter()
            .map(|v| format!("{} {v}", Colour::Yellow.paint("skipped"))),
    );
    lines.join("\n")
}

pub async fn process_build_command(command: BuildCommand, config: &Config) -> Result<()> {
    let storage = EntryStorageImpl::new(config.content_dir.clone());
    let report = build_site(
        &storage,
        config,
        &command.out,
        command.theme,
        command.bar_orientation,
    )
    .await?;
    println!("{}", summary(&report, &command));
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::entries::EntryError;

    #[test]
    fn summary_lists_skipped_entries() {
        let report = BuildReport {
            entries: 3,
            charts: 7,
            skipped: vec![EntryError::MalformedSourceIdentifier {
                source_id: "2023010.md".into(),
                digits: "2023010".into(),
            }],
        };
        let command = BuildCommand {
            out: PathBuf::from("dist"),
            theme: HeatmapTheme::Purple,
            bar_orientation: BarOrientation::Bar,
        };

        let text = summary(&report, &command);

        assert!(text.contains("7 charts into dist"));
        assert!(text.contains("2023010.md"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn build_flags() {
        let command = BuildCommand::parse_from(["build", "--bar-orientation", "column"]);
        assert_eq!(command.bar_orientation, BarOrientation::Column);
        assert_eq!(command.theme, HeatmapTheme::Purple);
        assert_eq!(command.out, PathBuf::from("dist"));
    }
}
