use std::path::Path;

use serde_json::Value;

use super::{
    entities::{CanonicalEntry, RawEntry, CONTENT_FIELD, DATE_FIELD},
    EntryError,
};

/// Length of the `YYYYMMDDHHMM` timestamp entry files are named with.
pub const TIMESTAMP_DIGITS: usize = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Keep the free text journal of each entry.
    pub parse_journal: bool,
}

/// Produces a [CanonicalEntry] from a raw entry. The date in the front matter wins, otherwise
/// it's derived from the timestamp in `source_id`. `raw` is left untouched.
pub fn normalize(
    raw: &RawEntry,
    source_id: &str,
    options: NormalizeOptions,
) -> Result<CanonicalEntry, EntryError> {
    let mut fields = raw.data.clone();

    let date = match fields.remove(DATE_FIELD).and_then(explicit_date) {
        Some(date) => date,
        None => date_from_source_id(source_id)?,
    };

    let content = if options.parse_journal {
        // The journal text takes the place of a `content` key in the front matter.
        fields.remove(CONTENT_FIELD);
        raw.content.clone()
    } else {
        None
    };

    Ok(CanonicalEntry {
        date,
        fields,
        content,
    })
}

/// Returns the date from the front matter if there is a usable one.
fn explicit_date(value: Value) -> Option<String> {
    match value {
        Value::String(date) if !date.trim().is_empty() => Some(date),
        Value::Number(number) => Some(number.to_string()),
        Value::Null | Value::String(_) | Value::Bool(_) | Value::Array(_) | Value::Object(_) => {
            None
        }
    }
}

/// Digit run of a file name. Directories, a non digit prefix and anything after the digits
/// (extensions included) are dropped.
pub fn source_digits(source_id: &str) -> &str {
    let name = Path::new(source_id)
        .file_name()
        .and_then(|v| v.to_str())
        .unwrap_or(source_id);
    let name = name.trim_start_matches(|c: char| !c.is_ascii_digit());
    let end = name
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(name.len());
    &name[..end]
}

/// Turns `dir/202301151230.md` into `2023-01-15T12:30`. Only the amount of digits is checked,
/// a month of `13` goes through as is.
pub fn date_from_source_id(source_id: &str) -> Result<String, EntryError> {
    let digits = source_digits(source_id);
    if digits.len() != TIMESTAMP_DIGITS {
        return Err(EntryError::MalformedSourceIdentifier {
            source_id: source_id.to_string(),
            digits: digits.to_string(),
        });
    }

    let (year, rest) = digits.split_at(4);
    let (month, rest) = rest.split_at(2);
    let (day, rest) = rest.split_at(2);
    let (hour, minute) = rest.split_at(2);
    Ok(format!("{year}-{month}-{day}T{hour}:{minute}"))
}
