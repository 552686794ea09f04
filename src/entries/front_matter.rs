//! Splitting entry files into their YAML header and journal text, and writing them back.
//!
//! An entry file looks like this:
//!
//! ```text
//! ---
//! date: 2023-01-15T12:30
//! sleep: false
//! triggers:
//!   - Stress
//! ---
//!
//! Free text journal.
//! ```

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use super::entities::{Fields, RawEntry};

const DELIMITER: &str = "---";

#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("front matter is never closed with `---`")]
    Unterminated,
    #[error("front matter is not a mapping")]
    NotAMapping,
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter can't be represented as json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parses the text of an entry file. Text without a header becomes an entry with no fields.
pub fn parse(text: &str) -> Result<RawEntry, FrontMatterError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let Some((header, body)) = split(text)? else {
        return Ok(RawEntry {
            data: Fields::new(),
            content: non_empty(text),
        });
    };

    let yaml = serde_yaml::from_str::<serde_yaml::Value>(header)?;
    // Non string keys are rejected here since json objects can't hold them.
    let data = match serde_json::to_value(yaml)? {
        Value::Null => Fields::new(),
        Value::Object(map) => map.into_iter().collect(),
        _ => return Err(FrontMatterError::NotAMapping),
    };

    Ok(RawEntry {
        data,
        content: non_empty(body),
    })
}

/// Returns header and body, or `None` if the text doesn't start with a header.
fn split(text: &str) -> Result<Option<(&str, &str)>, FrontMatterError> {
    let Some(first_line_end) = text.find('\n') else {
        return Ok(None);
    };
    if text[..first_line_end].trim_end() != DELIMITER {
        return Ok(None);
    }

    let header_start = first_line_end + 1;
    let mut offset = header_start;
    for line in text[header_start..].split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let body = &text[offset + line.len()..];
            let body = body
                .strip_prefix("\r\n")
                .or_else(|| body.strip_prefix('\n'))
                .unwrap_or(body);
            return Ok(Some((&text[header_start..offset], body)));
        }
        offset += line.len();
    }
    Err(FrontMatterError::Unterminated)
}

fn non_empty(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Renders a header and an optional journal into the text of an entry file.
pub fn render(header: &impl Serialize, body: Option<&str>) -> Result<String, FrontMatterError> {
    let yaml = serde_yaml::to_string(header)?;
    let mut text = format!("{DELIMITER}\n{yaml}{DELIMITER}\n");
    if let Some(body) = body.filter(|v| !v.trim().is_empty()) {
        text.push('\n');
        text.push_str(body.trim_end());
        text.push('\n');
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;
    use crate::entries::entities::NewEntry;

    #[test]
    fn parse_header_and_body() {
        let entry = parse(
            "---\n\
             date: 2023-01-15T12:30\n\
             sleep: false\n\
             triggers:\n  - Stress\n  - Heat\n\
             ---\n\
             \n\
             Started after lunch.\n",
        )
        .unwrap();

        assert_eq!(entry.data["date"], json!("2023-01-15T12:30"));
        assert_eq!(entry.data["sleep"], json!(false));
        assert_eq!(entry.data["triggers"], json!(["Stress", "Heat"]));
        assert_eq!(entry.content.as_deref(), Some("Started after lunch.\n"));
    }

    #[test]
    fn parse_single_string_choice() {
        let entry = parse("---\nsymptoms: Nausea\n---\n").unwrap();
        assert_eq!(entry.data["symptoms"], json!("Nausea"));
        assert_eq!(entry.content, None);
    }

    #[test]
    fn parse_without_header() {
        let entry = parse("Just some words").unwrap();
        assert!(entry.data.is_empty());
        assert_eq!(entry.content.as_deref(), Some("Just some words"));
    }

    #[test]
    fn parse_empty_header() {
        let entry = parse("---\n---\n").unwrap();
        assert!(entry.data.is_empty());
        assert_eq!(entry.content, None);
    }

    #[test]
    fn parse_rejects_bad_headers() {
        assert!(matches!(
            parse("---\nsleep: true\n"),
            Err(FrontMatterError::Unterminated)
        ));
        assert!(matches!(
            parse("---\n- a\n- b\n---\n"),
            Err(FrontMatterError::NotAMapping)
        ));
        assert!(matches!(
            parse("---\nsleep: [\n---\n"),
            Err(FrontMatterError::Yaml(_))
        ));
    }

    #[test]
    fn render_then_parse_new_entry() {
        let moment = NaiveDate::from_ymd_opt(2023, 1, 15)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        let mut entry = NewEntry::new(moment, false);
        entry.triggers = Some(vec!["Stress".into()]);

        let text = render(&entry, Some("Took a nap.")).unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.ends_with("---\n\nTook a nap.\n"));

        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.data["date"], json!("2023-01-15T12:30"));
        assert_eq!(parsed.data["triggers"], json!(["Stress"]));
        assert_eq!(parsed.content.as_deref(), Some("Took a nap.\n"));
    }
}
