//! Chart configurations computed from the journal. Each chart kind has its own
//! [ChartDataProvider]; rendering them is left to Highcharts in the browser.

use std::{collections::BTreeMap, fmt::Display};

use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use clap::ValueEnum;
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    entries::entities::{CanonicalEntry, ChoiceField},
    utils::time::{week_of_year, DAYS},
};

use super::series::{aggregate, numeric_series, FieldSelector, SeriesError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Pie,
    Histogram,
    Heatmap,
}

/// Everything the dashboard needs to draw one chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub id: String,
    pub kind: ChartKind,
    pub title: String,
    pub subtitle: String,
    pub options: Value,
}

pub trait ChartDataProvider {
    fn id(&self) -> String;

    fn kind(&self) -> ChartKind;

    fn title(&self) -> String;

    fn subtitle(&self) -> String {
        String::new()
    }

    /// Chart specific options, without the ones shared by every chart.
    fn chart_options(&self, entries: &[CanonicalEntry]) -> Result<Value, SeriesError>;

    fn compute(&self, entries: &[CanonicalEntry]) -> Result<ChartConfig, SeriesError> {
        let title = self.title();
        let subtitle = self.subtitle();
        let mut options = json!({
            "credits": { "enabled": false },
            "title": { "text": title },
            "subtitle": { "text": subtitle },
        });
        merge(&mut options, self.chart_options(entries)?);

        Ok(ChartConfig {
            id: self.id(),
            kind: self.kind(),
            title,
            subtitle,
            options,
        })
    }
}

/// Deep merge of json objects, values from `overlay` win.
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BarOrientation {
    #[default]
    Bar,
    Column,
}

impl Display for BarOrientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BarOrientation::Bar => write!(f, "bar"),
            BarOrientation::Column => write!(f, "column"),
        }
    }
}

/// Headaches per day of the week.
#[derive(Debug, Clone, Default)]
pub struct BarChart {
    pub orientation: BarOrientation,
}

impl ChartDataProvider for BarChart {
    fn id(&self) -> String {
        "weekdays".into()
    }

    fn kind(&self) -> ChartKind {
        ChartKind::Bar
    }

    fn title(&self) -> String {
        "Headaches by Day of the Week".into()
    }

    fn chart_options(&self, entries: &[CanonicalEntry]) -> Result<Value, SeriesError> {
        let series = aggregate(entries, &FieldSelector::DayOfWeek)?;
        // The series is sorted by name, the axis needs calendar order.
        let data = DAYS
            .iter()
            .enumerate()
            .map(|(index, day)| {
                json!({ "name": day, "x": index, "y": series.count_of(&(*day).into()) })
            })
            .collect::<Vec<_>>();

        Ok(json!({
            "chart": { "type": self.orientation.to_string() },
            "legend": { "enabled": false },
            "series": [{ "name": "Headaches", "data": data }],
            "xAxis": { "categories": DAYS, "crosshair": true },
            "yAxis": { "title": { "text": "Headaches" } },
        }))
    }
}

/// Share of each value of a multi-select field.
#[derive(Debug, Clone)]
pub struct PieChart {
    pub field: String,
    pub title: String,
}

impl PieChart {
    pub fn new(field: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            title: title.into(),
        }
    }
}

impl From<ChoiceField> for PieChart {
    fn from(value: ChoiceField) -> Self {
        PieChart::new(value.key(), value.title())
    }
}

impl ChartDataProvider for PieChart {
    fn id(&self) -> String {
        format!("pie-{}", self.field.replace('_', "-"))
    }

    fn kind(&self) -> ChartKind {
        ChartKind::Pie
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn chart_options(&self, entries: &[CanonicalEntry]) -> Result<Value, SeriesError> {
        let series = aggregate(entries, &FieldSelector::field(self.field.as_str()))?;

        Ok(json!({
            "accessibility": { "point": { "valueSuffix": "%" } },
            "chart": { "type": "pie" },
            "legend": { "labelFormat": "{name}: <b>{percentage:.0f}%</b>" },
            "plotOptions": {
                "pie": { "innerSize": "50%", "showInLegend": true },
                "series": { "states": { "hover": { "halo": false } } },
            },
            "series": [{ "name": self.field, "colorByPoint": true, "data": series }],
            "tooltip": { "pointFormat": "Count: <b>{point.y}</b>" },
        }))
    }
}

/// Hours of the day headaches start at.
#[derive(Debug, Clone, Default)]
pub struct HistogramChart;

impl HistogramChart {
    /// Text describing the most common hour.
    pub fn caption(top_hour: i64) -> String {
        let next = (top_hour + 1) % 24;
        let period = if (12..24).contains(&(top_hour + 1)) {
            "p.m."
        } else {
            "a.m."
        };
        format!("Worst Time of the Day? Between {top_hour}:00-{next}:00 {period}")
    }
}

impl ChartDataProvider for HistogramChart {
    fn id(&self) -> String {
        "hours".into()
    }

    fn kind(&self) -> ChartKind {
        ChartKind::Histogram
    }

    fn title(&self) -> String {
        "Headaches by Hour".into()
    }

    fn chart_options(&self, entries: &[CanonicalEntry]) -> Result<Value, SeriesError> {
        let hours = numeric_series(entries, &FieldSelector::HourOfDay)?;

        let mut options = json!({
            "plotOptions": {
                "histogram": {
                    "accessibility": {
                        "point": {
                            "valueDescriptionFormat": "{index}. {point.x:.3f} to {point.x2:.3f}, {point.y}."
                        }
                    },
                    "binsNumber": "sturges",
                },
                "scatter": {
                    "tooltip": { "pointFormat": "Headache No. <b>{point.x}</b><br/>Hour: <b>{point.y}</b>" }
                },
            },
            "series": [
                { "name": "Headaches", "type": "histogram", "xAxis": 1, "yAxis": 1, "baseSeries": "s1" },
                { "name": "Time", "type": "scatter", "data": hours.values, "id": "s1", "marker": { "radius": 2.5 } },
            ],
            "xAxis": [
                { "title": { "text": "Headache Count" }, "opposite": true },
                { "title": { "text": "Hourly Block" } },
            ],
            "yAxis": [
                { "title": { "text": "Hour" }, "opposite": true },
                { "title": { "text": "Headaches" } },
            ],
        });
        if let Some(top_hour) = hours.mode {
            merge(
                &mut options,
                json!({ "caption": { "text": Self::caption(top_hour) } }),
            );
        }
        Ok(options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum HeatmapTheme {
    Orange,
    Blue,
    Green,
    #[default]
    Purple,
}

impl HeatmapTheme {
    pub fn palette(&self) -> [&'static str; 6] {
        match self {
            HeatmapTheme::Orange => [
                "#864313", "#b3591a", "#df7020", "#e58c4d", "#e58c4d", "#f2c6a6",
            ],
            HeatmapTheme::Blue => [
                "#136086", "#1a7fb3", "#209fdf", "#4db2e5", "#79c6ec", "#a6d9f2",
            ],
            HeatmapTheme::Green => [
                "#138626", "#1ab333", "#20df40", "#4de566", "#79ec8c", "#a6f2b2",
            ],
            HeatmapTheme::Purple => [
                "#861386", "#b31ab3", "#df20df", "#e54de5", "#ec79ec", "#f2a6f2",
            ],
        }
    }
}

impl Display for HeatmapTheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeatmapTheme::Orange => write!(f, "orange"),
            HeatmapTheme::Blue => write!(f, "blue"),
            HeatmapTheme::Green => write!(f, "green"),
            HeatmapTheme::Purple => write!(f, "purple"),
        }
    }
}

/// Calendar of the days with a headache in one year, coloured by the hour it started. Every
/// year of the journal gets its own chart so days of different years never share a cell.
#[derive(Debug, Clone)]
pub struct CalendarHeatmap {
    pub theme: HeatmapTheme,
    pub year: i32,
}

impl CalendarHeatmap {
    /// Time of the last entry of every day. Entries with unreadable dates are left out.
    pub fn days(entries: &[CanonicalEntry]) -> BTreeMap<NaiveDate, NaiveTime> {
        entries
            .iter()
            .filter_map(|v| v.moment())
            .map(|v| (v.date(), v.time()))
            .collect()
    }

    /// First and last year with an entry.
    pub fn year_range(days: &BTreeMap<NaiveDate, NaiveTime>) -> Option<(i32, i32)> {
        let first = days.keys().next()?.year();
        let last = days.keys().next_back()?.year();
        Some((first, last))
    }

    /// One calendar for every year from the first entry to the last, empty years included.
    pub fn for_journal(
        entries: &[CanonicalEntry],
        theme: HeatmapTheme,
    ) -> Vec<CalendarHeatmap> {
        Self::year_range(&Self::days(entries))
            .map(|(first, last)| {
                (first..=last)
                    .map(|year| CalendarHeatmap { theme, year })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ChartDataProvider for CalendarHeatmap {
    fn id(&self) -> String {
        format!("calendar-{}", self.year)
    }

    fn kind(&self) -> ChartKind {
        ChartKind::Heatmap
    }

    fn title(&self) -> String {
        format!("Calendar {}", self.year)
    }

    fn chart_options(&self, entries: &[CanonicalEntry]) -> Result<Value, SeriesError> {
        let data = Self::days(entries)
            .into_iter()
            .filter(|(date, _)| date.year() == self.year)
            .map(|(date, time)| {
                json!({
                    "x": week_of_year(date),
                    "y": date.weekday().num_days_from_sunday(),
                    "value": time.hour(),
                    "date": date.format("%Y-%m-%d").to_string(),
                    "time": time.format("%H:%M").to_string(),
                })
            })
            .collect::<Vec<_>>();

        let palette = self.theme.palette();
        let stops = palette
            .iter()
            .enumerate()
            .map(|(index, color)| json!([index as f64 / (palette.len() - 1) as f64, color]))
            .collect::<Vec<_>>();

        Ok(json!({
            "chart": { "type": "heatmap" },
            "colorAxis": { "min": 0, "max": 23, "stops": stops },
            "legend": { "enabled": false },
            "series": [{ "name": self.year.to_string(), "data": data, "borderWidth": 1 }],
            "tooltip": { "pointFormat": "<b>Date:</b> {point.date}<br><b>Time:</b> {point.time}" },
            "xAxis": { "title": { "text": "Week" }, "min": 0, "max": 53 },
            "yAxis": { "categories": DAYS, "reversed": true, "title": { "text": null } },
        }))
    }
}

/// The charts of the dashboard, in display order. Calendars depend on which years `entries`
/// cover, everything else on the enabled fields only.
pub fn dashboard_charts(
    entries: &[CanonicalEntry],
    fields: &[ChoiceField],
    theme: HeatmapTheme,
    orientation: BarOrientation,
) -> Vec<Box<dyn ChartDataProvider>> {
    let mut charts: Vec<Box<dyn ChartDataProvider>> = vec![
        Box::new(BarChart { orientation }),
        Box::new(HistogramChart),
    ];
    charts.extend(
        CalendarHeatmap::for_journal(entries, theme)
            .into_iter()
            .map(|v| Box::new(v) as Box<dyn ChartDataProvider>),
    );
    charts.extend(
        fields
            .iter()
            .map(|field| Box::new(PieChart::from(*field)) as Box<dyn ChartDataProvider>),
    );
    charts
}
