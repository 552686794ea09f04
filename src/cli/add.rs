use std::fmt::Display;

use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};
use tracing::{info, warn};

use crate::{
    config::Config,
    entries::{
        entities::NewEntry,
        storage::{EntryStorage, EntryStorageImpl},
    },
    utils::time::FILE_STEM_FORMAT,
};

use super::{
    prompt::{Prompter, TerminalPrompter},
    Args,
};

pub const DATE_QUESTION: &str = "When did it happen? (in YYYYMMDDHHMM format)";
pub const SLEEP_QUESTION: &str = "Did it happen in your sleep?";
pub const JOURNAL_QUESTION: &str = "Do you want to write an entry for this log?";
pub const JOURNAL_EDITOR: &str = "Write about this headache, then save and close the editor.";
pub const CHOICE_REQUIRED: &str = "You must choose at least one.";

const TIMESTAMP_LENGTH: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct AddCommand {
    #[arg(
        long,
        help = "When the headache started, skipping the question. Either YYYYMMDDHHMM or something like \"now\", \"2 hours ago\", \"14:00 15/03/2025\""
    )]
    at: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
}

/// Checks an answer to [DATE_QUESTION]. The error is shown to the user as is.
pub fn validate_date(answer: &str) -> Result<NaiveDateTime, String> {
    let answer = answer.trim();
    if answer.len() > TIMESTAMP_LENGTH {
        return Err("Your date is too long. Make sure it's in YYYYMMDDHHMM format.".into());
    }
    if answer.len() < TIMESTAMP_LENGTH {
        return Err("Your date isn't long enough. Make sure it's in YYYYMMDDHHMM format.".into());
    }
    if !answer.chars().all(|c| c.is_ascii_digit()) {
        return Err("Your date can only contain digits. Make sure it's in YYYYMMDDHHMM format.".into());
    }
    NaiveDateTime::parse_from_str(answer, FILE_STEM_FORMAT)
        .map_err(|_| "That date doesn't exist. Make sure it's in YYYYMMDDHHMM format.".into())
}

/// Resolves `--at`, either as a file timestamp or as a human readable date.
fn parse_at(value: &str, date_style: DateStyle) -> Result<NaiveDateTime, String> {
    if let Ok(moment) = validate_date(value) {
        return Ok(moment);
    }
    parse_date_string(value, Local::now(), date_style.into())
        .map(|v| v.naive_local())
        .map_err(|e| format!("Failed to validate date {value:?}: {e}"))
}

/// Asks everything a new entry needs. `moment` skips the date question when it's already known.
pub fn interview(
    prompter: &mut impl Prompter,
    config: &Config,
    moment: Option<NaiveDateTime>,
) -> Result<NewEntry> {
    let moment = match moment {
        Some(moment) => moment,
        None => loop {
            match validate_date(&prompter.input(DATE_QUESTION)?) {
                Ok(moment) => break moment,
                Err(reason) => prompter.invalid(&reason)?,
            }
        },
    };
    let sleep = prompter.confirm(SLEEP_QUESTION)?;
    let mut entry = NewEntry::new(moment, sleep);

    for field in config.enabled_fields() {
        let choices = config.choices(field);
        if choices.is_empty() {
            warn!("No choices configured for {}, skipping", field.key());
            continue;
        }
        let selected = loop {
            let selected = prompter.multi_select(field.question(), choices)?;
            if field.requires_selection() && selected.is_empty() {
                prompter.invalid(CHOICE_REQUIRED)?;
            } else {
                break selected;
            }
        };
        entry.set_choices(field, selected);
    }

    if prompter.confirm(JOURNAL_QUESTION)? {
        let text = prompter.editor(JOURNAL_EDITOR)?;
        entry.journal = Some(text).filter(|v| !v.trim().is_empty());
    }
    Ok(entry)
}

pub async fn process_add_command(command: AddCommand, config: &Config) -> Result<()> {
    let moment = match command.at.as_deref() {
        Some(value) => Some(parse_at(value, command.date_style).map_err(|e| {
            Args::command().error(clap::error::ErrorKind::ValueValidation, e)
        })?),
        None => None,
    };

    let entry = interview(&mut TerminalPrompter::stdio(), config, moment)?;
    let storage = EntryStorageImpl::new(config.content_dir.clone());
    let path = storage.write_entry(&entry).await?;

    info!("Recorded entry {path:?}");
    println!("Saved {}", path.display());
    Ok(())
}
