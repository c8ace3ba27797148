//! Preset catalog and range matching.
//!
//! Presets are anchored to a single "today" when the catalog is built. The
//! catalog is not recomputed on every read; see
//! [`crate::config::PresetConfig::refresh_on_open`] for the opt-in refresh.

use std::fmt;

use chrono::{Duration, Local, NaiveDate};
use serde::Serialize;

use crate::date_range::{normalize_local, DayRange, RangeLabel};

/// Source of the current local calendar day.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Reads the local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        normalize_local(&Local::now())
    }
}

/// Always reports the same day. Used by tests and `--today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// The named shortcuts offered next to the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PresetKind {
    /// Today only
    Today,
    /// Last 7 days, today included
    Last7Days,
    /// Last 30 days, today included
    Last30Days,
}

impl PresetKind {
    /// Get display name for the preset.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Last7Days => "Last 7 days",
            Self::Last30Days => "Last 30 days",
        }
    }

    /// Days before today where the preset starts.
    #[must_use]
    pub const fn days_back(self) -> i64 {
        match self {
            Self::Today => 0,
            Self::Last7Days => 6,
            Self::Last30Days => 29,
        }
    }

    /// Parse a preset from its label or a dashed slug ("last-7-days").
    #[must_use]
    pub fn from_label(input: &str) -> Option<Self> {
        let wanted = input.trim().replace('-', " ");
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.label().eq_ignore_ascii_case(&wanted))
    }

    /// All presets, in catalog order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Today, Self::Last7Days, Self::Last30Days]
    }

    /// Anchor this preset to `today`.
    #[must_use]
    pub fn anchored(self, today: NaiveDate) -> Preset {
        let start = today - Duration::days(self.days_back());
        Preset {
            kind: self,
            range: DayRange::new(start, today),
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A preset resolved against a concrete day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    pub kind: PresetKind,
    #[serde(flatten)]
    pub range: DayRange,
}

impl Preset {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.kind.label()
    }

    #[must_use]
    pub fn range_label(&self) -> RangeLabel {
        RangeLabel::preset(self.label())
    }
}

/// Build the ordered preset list anchored to `today`.
#[must_use]
pub fn compute_presets(today: NaiveDate) -> Vec<Preset> {
    PresetKind::all()
        .iter()
        .map(|kind| kind.anchored(today))
        .collect()
}

/// Name a normalized range: the first preset matching both ends, else custom.
#[must_use]
pub fn match_range(range: &DayRange, presets: &[Preset]) -> RangeLabel {
    presets
        .iter()
        .find(|preset| preset.range == *range)
        .map_or(RangeLabel::Custom, Preset::range_label)
}

/// Presets computed once for a given anchor day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetCatalog {
    anchor: NaiveDate,
    presets: Vec<Preset>,
}

impl PresetCatalog {
    #[must_use]
    pub fn new(today: NaiveDate) -> Self {
        Self {
            anchor: today,
            presets: compute_presets(today),
        }
    }

    /// The day the catalog was anchored to.
    #[must_use]
    pub const fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    #[must_use]
    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    /// Look up a preset by kind.
    #[must_use]
    pub fn get(&self, kind: PresetKind) -> Preset {
        self.presets
            .iter()
            .copied()
            .find(|preset| preset.kind == kind)
            .unwrap_or_else(|| kind.anchored(self.anchor))
    }

    /// The "Today" preset.
    #[must_use]
    pub fn today(&self) -> Preset {
        self.get(PresetKind::Today)
    }

    /// The "Last 7 days" preset, used as the default range.
    #[must_use]
    pub fn default_preset(&self) -> Preset {
        self.get(PresetKind::Last7Days)
    }

    /// Match a range against this catalog.
    #[must_use]
    pub fn label_for(&self, range: &DayRange) -> RangeLabel {
        match_range(range, &self.presets)
    }
}
