use std::fmt::Write;

use ansi_term::{Colour, Style};
use anyhow::Result;
use chrono::Datelike;
use clap::Parser;

use crate::{
    analysis::series::{aggregate, numeric_series, FieldSelector, FrequencySeries, Label},
    config::Config,
    entries::{entities::CanonicalEntry, load_journal, storage::EntryStorageImpl},
    utils::time::{month_name, DAYS, MONTHS},
};

const MAX_BAR_WIDTH: usize = 40;

#[derive(Debug, Parser)]
pub struct StatsCommand {
    #[arg(
        short,
        long = "field",
        help = "Field to count, can be repeated. \"weekday\" and \"hour\" count by the entry date. By default every enabled multi-select field is shown"
    )]
    fields: Vec<FieldSelector>,
}

fn bar(count: usize, largest: usize) -> String {
    if largest == 0 {
        return String::new();
    }
    let width = (count * MAX_BAR_WIDTH).div_ceil(largest);
    "■".repeat(width)
}

fn write_rows(
    output: &mut String,
    rows: impl IntoIterator<Item = (String, usize)> + Clone,
) -> Result<()> {
    let largest = rows.clone().into_iter().map(|(_, v)| v).max().unwrap_or(0);
    let width = rows
        .clone()
        .into_iter()
        .map(|(v, _)| v.chars().count())
        .max()
        .unwrap_or(0);
    for (label, count) in rows {
        writeln!(
            output,
            "  {label:<width$} {count:>4} {}",
            Colour::Purple.paint(bar(count, largest))
        )?;
    }
    Ok(())
}

fn write_header(output: &mut String, title: &str) -> Result<()> {
    writeln!(output, "{}", Style::new().bold().underline().paint(title))?;
    Ok(())
}

fn write_series(output: &mut String, title: &str, series: &FrequencySeries) -> Result<()> {
    write_header(output, title)?;
    if series.is_empty() {
        writeln!(output, "  {}", Colour::Fixed(8).paint("nothing recorded"))?;
        return Ok(());
    }
    write_rows(
        output,
        series
            .points()
            .iter()
            .map(|v| (v.label.to_string(), v.count))
            .collect::<Vec<_>>(),
    )
}

/// Text report of the journal. Weekdays and months are listed in calendar order.
pub fn render_stats(entries: &[CanonicalEntry], fields: &[FieldSelector]) -> Result<String> {
    let mut output = String::new();
    writeln!(
        output,
        "{} {}\n",
        Style::new().bold().paint(entries.len().to_string()),
        if entries.len() == 1 { "entry" } else { "entries" }
    )?;

    let weekdays = aggregate(entries, &FieldSelector::DayOfWeek)?;
    write_header(&mut output, "Day of week")?;
    write_rows(
        &mut output,
        DAYS.iter()
            .map(|day| (day.to_string(), weekdays.count_of(&Label::from(*day))))
            .collect::<Vec<_>>(),
    )?;
    writeln!(output)?;

    let mut months = [0; MONTHS.len()];
    for moment in entries.iter().filter_map(|v| v.moment()) {
        months[moment.month0() as usize] += 1;
    }
    write_header(&mut output, "Month")?;
    write_rows(
        &mut output,
        months
            .iter()
            .enumerate()
            .filter_map(|(index, count)| Some((month_name(index as u32)?.to_string(), *count)))
            .collect::<Vec<_>>(),
    )?;
    writeln!(output)?;

    let hours = aggregate(entries, &FieldSelector::HourOfDay)?;
    write_series(&mut output, "Hour of day", &hours)?;
    if let Some(top_hour) = numeric_series(entries, &FieldSelector::HourOfDay)?.mode {
        writeln!(
            output,
            "  Most headaches started around {}",
            Colour::Yellow.bold().paint(format!("{top_hour}:00"))
        )?;
    }

    for field in fields {
        writeln!(output)?;
        write_series(&mut output, field.name(), &aggregate(entries, field)?)?;
    }
    Ok(output)
}

pub async fn process_stats_command(command: StatsCommand, config: &Config) -> Result<()> {
    let storage = EntryStorageImpl::new(config.content_dir.clone());
    let journal = load_journal(&storage, config.normalize_options()).await?;

    let fields = if command.fields.is_empty() {
        config
            .enabled_fields()
            .into_iter()
            .map(|v| FieldSelector::field(v.key()))
            .collect()
    } else {
        command.fields
    };

    print!("{}", render_stats(&journal.entries, &fields)?);
    for skipped in &journal.skipped {
        eprintln!("{} {skipped}", Colour::Yellow.paint("skipped"));
    }
    Ok(())
}
