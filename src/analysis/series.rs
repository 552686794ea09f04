use std::{collections::BTreeMap, fmt::Display, str::FromStr};

use chrono::{Datelike, Timelike};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::{
    entries::entities::{CanonicalEntry, CONTENT_FIELD, DATE_FIELD},
    utils::time::day_name,
};

/// A single projected value of an entry. Labels of the same kind sort naturally, mixed kinds
/// sort booleans first, then integers, then text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Label {
    Bool(bool),
    Integer(i64),
    Text(String),
}

impl Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Bool(v) => write!(f, "{v}"),
            Label::Integer(v) => write!(f, "{v}"),
            Label::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Text(value.to_string())
    }
}

/// Which value of an entry gets counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSelector {
    /// Name of the weekday of the entry date.
    DayOfWeek,
    /// Hour (0-23) of the entry date.
    HourOfDay,
    /// A field of the entry, either a single value or a list of them.
    Field(String),
}

impl FieldSelector {
    pub fn field(name: impl Into<String>) -> Self {
        FieldSelector::Field(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            FieldSelector::DayOfWeek => "day of week",
            FieldSelector::HourOfDay => "hour of day",
            FieldSelector::Field(name) => name,
        }
    }
}

impl FromStr for FieldSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "weekday" | "day-of-week" => FieldSelector::DayOfWeek,
            "hour" | "hour-of-day" => FieldSelector::HourOfDay,
            name => FieldSelector::Field(name.to_string()),
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("field {field:?} holds {value} which can't be counted, only single values and flat lists can")]
    UnsupportedValue { field: String, value: String },
    #[error("field {field:?} holds {value} which isn't a whole number")]
    NotNumeric { field: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    #[serde(rename = "name")]
    pub label: Label,
    #[serde(rename = "y")]
    pub count: usize,
}

/// Counts of every distinct value of a field, sorted by value. Serializes into chart points.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct FrequencySeries(Vec<SeriesPoint>);

impl FrequencySeries {
    pub fn points(&self) -> &[SeriesPoint] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.0.iter().map(|v| v.count).sum()
    }

    pub fn count_of(&self, label: &Label) -> usize {
        self.0
            .binary_search_by(|v| v.label.cmp(label))
            .map(|index| self.0[index].count)
            .unwrap_or(0)
    }
}

impl FromIterator<SeriesPoint> for FrequencySeries {
    fn from_iter<T: IntoIterator<Item = SeriesPoint>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Raw values of a numeric field together with the most frequent one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NumericSeries {
    pub values: Vec<i64>,
    pub mode: Option<i64>,
}

/// Counts how often every value of `field` occurs across `entries`. Lists are flattened so an
/// entry with two triggers counts once for each. Missing values are skipped.
///
/// Labels are ordered by value, which for weekday names means alphabetically. Putting them in
/// calendar order is up to the caller.
pub fn aggregate(
    entries: &[CanonicalEntry],
    field: &FieldSelector,
) -> Result<FrequencySeries, SeriesError> {
    let values = project_all(entries, field)?;

    let mut counts = BTreeMap::<Label, usize>::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    Ok(counts
        .into_iter()
        .map(|(label, count)| SeriesPoint { label, count })
        .collect())
}

/// Unaggregated values of a numeric field, for consumers that bucket them on their own.
pub fn numeric_series(
    entries: &[CanonicalEntry],
    field: &FieldSelector,
) -> Result<NumericSeries, SeriesError> {
    let values = project_all(entries, field)?
        .into_iter()
        .map(|v| match v {
            Label::Integer(v) => Ok(v),
            other => Err(SeriesError::NotNumeric {
                field: field.name().to_string(),
                value: other.to_string(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mode = mode(&values);
    Ok(NumericSeries { values, mode })
}

/// Most frequent value. When several values are tied the lowest one wins.
pub fn mode<T: Ord + Copy>(values: &[T]) -> Option<T> {
    let mut counts = BTreeMap::<T, usize>::new();
    for value in values {
        *counts.entry(*value).or_default() += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

fn project_all(
    entries: &[CanonicalEntry],
    field: &FieldSelector,
) -> Result<Vec<Label>, SeriesError> {
    let mut values = vec![];
    for entry in entries {
        project(entry, field, &mut values)?;
    }
    Ok(values)
}

fn project(
    entry: &CanonicalEntry,
    field: &FieldSelector,
    out: &mut Vec<Label>,
) -> Result<(), SeriesError> {
    match field {
        FieldSelector::DayOfWeek => {
            if let Some(day) = entry
                .moment()
                .and_then(|v| day_name(v.weekday().num_days_from_sunday()))
            {
                out.push(day.into());
            }
        }
        FieldSelector::HourOfDay => {
            if let Some(moment) = entry.moment() {
                out.push(Label::Integer(moment.hour() as i64));
            }
        }
        FieldSelector::Field(name) if name == DATE_FIELD => {
            out.push(Label::Text(entry.date.clone()));
        }
        FieldSelector::Field(name) if name == CONTENT_FIELD && entry.content.is_some() => {
            out.extend(entry.content.as_deref().map(Label::from));
        }
        FieldSelector::Field(name) => match entry.fields.get(name) {
            None => (),
            Some(Value::Array(items)) => {
                for item in items {
                    out.extend(scalar_label(name, item)?);
                }
            }
            Some(value) => out.extend(scalar_label(name, value)?),
        },
    }
    Ok(())
}

fn scalar_label(field: &str, value: &Value) -> Result<Option<Label>, SeriesError> {
    Ok(match value {
        Value::Null => None,
        Value::Bool(v) => Some(Label::Bool(*v)),
        Value::Number(v) => Some(
            v.as_i64()
                .map(Label::Integer)
                .unwrap_or_else(|| Label::Text(v.to_string())),
        ),
        Value::String(v) => Some(Label::Text(v.clone())),
        Value::Array(_) | Value::Object(_) => {
            return Err(SeriesError::UnsupportedValue {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
    })
}
