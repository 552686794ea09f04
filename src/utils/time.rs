use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};

/// Days in the week, in the order returned by [Datelike::weekday] counted from Sunday.
pub const DAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Format used for canonical entry dates.
pub const ENTRY_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Format used for entry file names.
pub const FILE_STEM_FORMAT: &str = "%Y%m%d%H%M";

const ACCEPTED_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Zero means Sunday.
pub fn day_name(day: u32) -> Option<&'static str> {
    DAYS.get(day as usize).copied()
}

/// Zero means January.
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTHS.get(month as usize).copied()
}

/// Parses the date of an entry as a local date time. A bare date is treated as midnight. Dates
/// with an offset, like `2023-01-15T12:30:00.000Z`, keep the wall clock time they were written
/// with.
pub fn parse_entry_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    ACCEPTED_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|v| v.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}

/// This is the standard way of converting a moment to an entry file name in auralog.
pub fn timestamp_to_file_stem(moment: NaiveDateTime) -> String {
    moment.format(FILE_STEM_FORMAT).to_string()
}

pub fn format_entry_date(moment: NaiveDateTime) -> String {
    moment.format(ENTRY_DATE_FORMAT).to_string()
}

/// Index of the Sunday based week containing `date`, counted from the first day of its year.
pub fn week_of_year(date: NaiveDate) -> u32 {
    let first = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap_or(date);
    (date.ordinal0() + first.weekday().num_days_from_sunday()) / 7
}
