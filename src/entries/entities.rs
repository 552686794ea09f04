use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::time::{format_entry_date, parse_entry_date, timestamp_to_file_stem};

pub const DATE_FIELD: &str = "date";
pub const CONTENT_FIELD: &str = "content";

pub type Fields = BTreeMap<String, Value>;

/// An entry exactly as it was found in its file: the front matter mapping and the text after it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawEntry {
    pub data: Fields,
    pub content: Option<String>,
}

/// A [RawEntry] together with the file it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedEntry {
    pub source_id: String,
    pub raw: RawEntry,
}

/// The entry shape written into `headaches.json`. `date` is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalEntry {
    pub date: String,
    #[serde(flatten)]
    pub fields: Fields,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl CanonicalEntry {
    /// `None` when the date can't be read as a local date time, for example `2023-13-01T10:00`
    /// derived from a badly named file.
    pub fn moment(&self) -> Option<NaiveDateTime> {
        parse_entry_date(&self.date)
    }
}

/// Multi-select fields every journal has. Each can be switched off through the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChoiceField {
    Triggers,
    Symptoms,
    PainAreas,
    Medications,
}

impl ChoiceField {
    pub const ALL: [ChoiceField; 4] = [
        ChoiceField::Triggers,
        ChoiceField::Symptoms,
        ChoiceField::PainAreas,
        ChoiceField::Medications,
    ];

    /// Name of the field in the front matter.
    pub fn key(&self) -> &'static str {
        match self {
            ChoiceField::Triggers => "triggers",
            ChoiceField::Symptoms => "symptoms",
            ChoiceField::PainAreas => "pain_areas",
            ChoiceField::Medications => "medications",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ChoiceField::Triggers => "Triggers",
            ChoiceField::Symptoms => "Symptoms",
            ChoiceField::PainAreas => "Pain Areas",
            ChoiceField::Medications => "Medications",
        }
    }

    pub fn question(&self) -> &'static str {
        match self {
            ChoiceField::Triggers => "What were the triggers?",
            ChoiceField::Symptoms => "What were your symptoms?",
            ChoiceField::PainAreas => "What were your pain areas?",
            ChoiceField::Medications => "What medications did you take?",
        }
    }

    /// Taking no medication is a valid answer, everything else needs at least one choice.
    pub fn requires_selection(&self) -> bool {
        !matches!(self, ChoiceField::Medications)
    }
}

/// A freshly recorded entry, before it's written to disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEntry {
    #[serde(skip)]
    pub moment: NaiveDateTime,
    pub date: String,
    pub sleep: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggers: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pain_areas: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medications: Option<Vec<String>>,
    #[serde(skip)]
    pub journal: Option<String>,
}

impl NewEntry {
    pub fn new(moment: NaiveDateTime, sleep: bool) -> Self {
        Self {
            moment,
            date: format_entry_date(moment),
            sleep,
            triggers: None,
            symptoms: None,
            pain_areas: None,
            medications: None,
            journal: None,
        }
    }

    pub fn set_choices(&mut self, field: ChoiceField, values: Vec<String>) {
        let slot = match field {
            ChoiceField::Triggers => &mut self.triggers,
            ChoiceField::Symptoms => &mut self.symptoms,
            ChoiceField::PainAreas => &mut self.pain_areas,
            ChoiceField::Medications => &mut self.medications,
        };
        *slot = Some(values);
    }

    pub fn file_stem(&self) -> String {
        timestamp_to_file_stem(self.moment)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    #[test]
    fn canonical_entry_serializes_flat() {
        let mut fields = Fields::new();
        fields.insert("sleep".into(), json!(true));
        fields.insert("triggers".into(), json!(["Stress"]));
        let entry = CanonicalEntry {
            date: "2023-01-15T12:30".into(),
            fields,
            content: None,
        };

        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"date": "2023-01-15T12:30", "sleep": true, "triggers": ["Stress"]})
        );

        let with_content = CanonicalEntry {
            content: Some("Rough day".into()),
            ..entry
        };
        assert_eq!(
            serde_json::to_value(&with_content).unwrap()["content"],
            json!("Rough day")
        );
    }

    #[test]
    fn canonical_entry_moment() {
        let entry = CanonicalEntry {
            date: "2023-01-15T12:30".into(),
            fields: Fields::new(),
            content: None,
        };
        assert_eq!(
            entry.moment(),
            NaiveDate::from_ymd_opt(2023, 1, 15)
                .unwrap()
                .and_hms_opt(12, 30, 0)
        );

        let garbled = CanonicalEntry {
            date: "2023-13-15T12:30".into(),
            ..entry
        };
        assert_eq!(garbled.moment(), None);
    }

    #[test]
    fn new_entry_keeps_only_answered_fields() {
        let moment = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(6, 45, 0)
            .unwrap();
        let mut entry = NewEntry::new(moment, true);
        entry.set_choices(ChoiceField::PainAreas, vec!["Neck".into()]);
        entry.journal = Some("Woke up with it".into());

        assert_eq!(entry.file_stem(), "202403090645");
        assert_eq!(
            serde_json::to_value(&entry).unwrap(),
            json!({"date": "2024-03-09T06:45", "sleep": true, "pain_areas": ["Neck"]})
        );
    }
}
