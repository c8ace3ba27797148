//! Date range types shared by the controller, the query synchronizer and the CLI.
//!
//! Everything here is day-granular: time-of-day never survives past
//! [`normalize`], so a committed range can be compared, matched and
//! serialized without worrying about midnight drift.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use derive_more::Display;
use serde::{Serialize, Serializer};

/// Label used for any committed range that matches no preset.
pub const CUSTOM_RANGE: &str = "Custom range";

/// Caption for a span with no endpoints picked yet.
pub const SELECT_DATES: &str = "Select dates";

/// Date pattern used by the trigger button and captions (e.g. "Jan 01, 2026").
pub const DEFAULT_DATE_FORMAT: &str = "%b %d, %Y";

/// Separator between the two ends of a formatted range.
pub const DEFAULT_SEPARATOR: &str = " – ";

/// Truncate a date-time to its calendar day.
#[must_use]
pub fn normalize(value: NaiveDateTime) -> NaiveDate {
    value.date()
}

/// Truncate a zoned date-time to its local calendar day.
#[must_use]
pub fn normalize_local<Tz: TimeZone>(value: &DateTime<Tz>) -> NaiveDate {
    value.with_timezone(&Local).date_naive()
}

/// An ordered pair of calendar days, `start <= end` always.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DayRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DayRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    #[must_use]
    pub fn new(a: NaiveDate, b: NaiveDate) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// A range covering a single day.
    #[must_use]
    pub const fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    /// First day (inclusive).
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day (inclusive).
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of calendar days covered, counting both ends.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// An in-progress calendar selection as reported by the widget.
///
/// Either end may be missing while the user is still picking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CalendarSpan {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl CalendarSpan {
    /// A span with nothing picked.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// A span with only the first endpoint picked.
    #[must_use]
    pub const fn starting(start: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: None,
        }
    }

    /// A span with both endpoints picked.
    #[must_use]
    pub const fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Mirror a committed range.
    #[must_use]
    pub const fn mirror(range: &DayRange) -> Self {
        Self::between(range.start, range.end)
    }

    /// True when both endpoints are present.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// True when neither endpoint is present.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// The ordered range, if both endpoints are present.
    #[must_use]
    pub fn complete(&self) -> Option<DayRange> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(DayRange::new(start, end)),
            _ => None,
        }
    }
}

/// Label carried by a committed range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display)]
pub enum RangeLabel {
    /// A named preset from the catalog.
    #[display("{_0}")]
    Preset(String),
    /// Anything the catalog does not name.
    #[display("Custom range")]
    Custom,
}

impl RangeLabel {
    /// Label for a preset name.
    pub fn preset(name: impl Into<String>) -> Self {
        Self::Preset(name.into())
    }
}

impl Serialize for RangeLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The range currently driving the page.
///
/// Always complete and day-granular; only the controller creates new values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedRange {
    #[serde(flatten)]
    range: DayRange,
    label: RangeLabel,
}

impl CommittedRange {
    #[must_use]
    pub const fn new(range: DayRange, label: RangeLabel) -> Self {
        Self { range, label }
    }

    #[must_use]
    pub const fn range(&self) -> DayRange {
        self.range
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.range.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.range.end
    }

    #[must_use]
    pub const fn label(&self) -> &RangeLabel {
        &self.label
    }
}

impl fmt::Display for CommittedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} .. {})",
            self.label,
            iso_date(self.range.start),
            iso_date(self.range.end)
        )
    }
}

/// Format a day as `YYYY-MM-DD`.
#[must_use]
pub fn iso_date(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

/// Human-facing date formatting for the trigger button and captions.
///
/// The pattern is a chrono strftime string; [`crate::Config::validate`]
/// rejects patterns chrono cannot render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFormat {
    pattern: String,
    separator: String,
}

impl Default for DateFormat {
    fn default() -> Self {
        Self::new(DEFAULT_DATE_FORMAT, DEFAULT_SEPARATOR)
    }
}

impl DateFormat {
    pub fn new(pattern: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            separator: separator.into(),
        }
    }

    /// Format a single day.
    #[must_use]
    pub fn day(&self, day: NaiveDate) -> String {
        day.format(&self.pattern).to_string()
    }

    /// Format a complete range as "start – end".
    #[must_use]
    pub fn range(&self, range: &DayRange) -> String {
        format!(
            "{}{}{}",
            self.day(range.start),
            self.separator,
            self.day(range.end)
        )
    }

    /// Caption for a possibly partial span.
    ///
    /// Complete spans render as a range, start-only spans as "start – …",
    /// anything else as "Select dates".
    #[must_use]
    pub fn span(&self, span: &CalendarSpan) -> String {
        if let Some(range) = span.complete() {
            self.range(&range)
        } else if let Some(start) = span.start {
            format!("{}{}…", self.day(start), self.separator)
        } else {
            SELECT_DATES.to_string()
        }
    }
}
