//! Query-string handling for the `from`/`to` range parameters.
//!
//! Parameters are kept in their raw, encoded form so that anything the
//! controller does not own round-trips byte for byte. Only the range keys are
//! decoded and rewritten.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::date_range::{iso_date, normalize, CommittedRange, DayRange};
use crate::error::{Error, Result};
use crate::preset::PresetCatalog;

/// Names of the two range parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryKeys {
    pub from: String,
    pub to: String,
}

impl Default for QueryKeys {
    fn default() -> Self {
        Self {
            from: "from".to_string(),
            to: "to".to_string(),
        }
    }
}

/// One `key=value` segment, stored exactly as it appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawPair {
    key: String,
    value: Option<String>,
}

impl RawPair {
    fn decoded_key(&self) -> String {
        decode_component(&self.key)
    }
}

/// Ordered query parameters, preserving unrelated pairs verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<RawPair>,
}

impl QueryParams {
    /// Parse a query string, with or without the leading `?`.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let pairs = query
            .split('&')
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) => RawPair {
                    key: key.to_string(),
                    value: Some(value.to_string()),
                },
                None => RawPair {
                    key: segment.to_string(),
                    value: None,
                },
            })
            .collect();
        Self { pairs }
    }

    /// Decoded value of the first pair named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.pairs
            .iter()
            .find(|pair| pair.decoded_key() == key)
            .map(|pair| {
                pair.value
                    .as_deref()
                    .map(decode_component)
                    .unwrap_or_default()
            })
    }

    /// Set `key` to `value`.
    ///
    /// The first existing pair keeps its position, later duplicates are
    /// dropped, and a missing key is appended. Other pairs are untouched.
    pub fn set(&mut self, key: &str, value: &str) {
        let replacement = RawPair {
            key: urlencoding::encode(key).into_owned(),
            value: Some(urlencoding::encode(value).into_owned()),
        };

        let mut replaced = false;
        self.pairs.retain_mut(|pair| {
            if pair.decoded_key() != key {
                return true;
            }
            if replaced {
                return false;
            }
            *pair = replacement.clone();
            replaced = true;
            true
        });

        if !replaced {
            self.pairs.push(replacement);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The range parameters as raw strings.
    #[must_use]
    pub fn seed(&self, keys: &QueryKeys) -> SeedParams {
        SeedParams {
            from: self.get(&keys.from),
            to: self.get(&keys.to),
        }
    }

    /// Write a range under the given keys.
    pub fn set_range(&mut self, keys: &QueryKeys, range: &DayRange) {
        self.set(&keys.from, &iso_date(range.start()));
        self.set(&keys.to, &iso_date(range.end()));
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pair) in self.pairs.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            f.write_str(&pair.key)?;
            if let Some(ref value) = pair.value {
                write!(f, "={value}")?;
            }
        }
        Ok(())
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let decoded = urlencoding::decode(&spaced).map(Cow::into_owned);
    decoded.unwrap_or(spaced)
}

/// Raw `from`/`to` values read once at construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedParams {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl SeedParams {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
        }
    }

    /// Both bounds parsed and ordered, if both are present and valid.
    ///
    /// Reversed bounds are swapped.
    pub fn resolve(&self) -> Result<DayRange> {
        let from = self
            .from
            .as_deref()
            .ok_or_else(|| Error::invalid_date("", "missing 'from'"))?;
        let to = self
            .to
            .as_deref()
            .ok_or_else(|| Error::invalid_date("", "missing 'to'"))?;
        Ok(DayRange::new(parse_day(from)?, parse_day(to)?))
    }
}

/// Parse a query date into a calendar day.
///
/// Accepts `YYYY-MM-DD` as well as ISO date-times (with or without an
/// offset), which are truncated to the day they name.
pub fn parse_day(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::invalid_date(input, "empty value"));
    }

    if let Ok(day) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(day);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(normalize(dt.naive_local()));
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Ok(normalize(dt));
        }
    }

    Err(Error::invalid_date(input, "expected YYYY-MM-DD"))
}

/// Resolve the initial committed range from seed parameters.
///
/// Missing or unparsable input falls back to the catalog's default preset.
#[must_use]
pub fn seed_range(seed: &SeedParams, catalog: &PresetCatalog) -> CommittedRange {
    match seed.resolve() {
        Ok(range) => {
            let label = catalog.label_for(&range);
            debug!(%label, "seeded range from query");
            CommittedRange::new(range, label)
        }
        Err(e) => {
            if seed.from.is_some() || seed.to.is_some() {
                warn!("ignoring range query parameters: {}", e);
            }
            let preset = catalog.default_preset();
            CommittedRange::new(preset.range, preset.range_label())
        }
    }
}

/// Parse the range for server-rendered views.
///
/// Same fallback rules as [`seed_range`], without preset labelling.
#[must_use]
pub fn parse_dashboard_range(seed: &SeedParams, today: NaiveDate) -> DayRange {
    seed.resolve()
        .unwrap_or_else(|_| PresetCatalog::new(today).default_preset().range)
}
