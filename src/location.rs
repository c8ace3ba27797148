//! The narrow port between the controller and the page address.

use chrono::NaiveDate;
use tracing::debug;

use crate::date_range::DayRange;
use crate::error::{Error, Result};
use crate::query::{QueryKeys, QueryParams, SeedParams};

/// Where the committed range is read from once and projected to afterwards.
pub trait QueryPort {
    /// Raw range parameters present when the page was loaded.
    fn read_initial_range(&self) -> SeedParams;

    /// Project a committed range into the address without adding history.
    fn write_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<()>;
}

/// An in-memory page address with a session history.
///
/// `write_range` rewrites the current entry in place, like a replace-mode
/// router navigation, so the history never grows past the loaded page.
#[derive(Debug, Clone)]
pub struct PageLocation {
    path: String,
    query: QueryParams,
    fragment: Option<String>,
    keys: QueryKeys,
    history: Vec<String>,
    replacements: usize,
}

impl PageLocation {
    /// Parse an address such as `/dashboard?from=2026-01-01&to=2026-01-03#kpis`.
    pub fn parse(url: &str, keys: QueryKeys) -> Result<Self> {
        let url = url.trim();
        if url.is_empty() {
            return Err(Error::InvalidQuery("empty address".to_string()));
        }

        let (rest, fragment) = match url.split_once('#') {
            Some((rest, fragment)) => (rest, Some(fragment.to_string())),
            None => (url, None),
        };
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        let path = if path.is_empty() { "/" } else { path };

        let mut location = Self {
            path: path.to_string(),
            query: QueryParams::parse(query),
            fragment,
            keys,
            history: Vec::new(),
            replacements: 0,
        };
        let href = location.href();
        location.history.push(href);
        Ok(location)
    }

    /// The full current address.
    #[must_use]
    pub fn href(&self) -> String {
        let mut href = self.path.clone();
        if !self.query.is_empty() {
            href.push('?');
            href.push_str(&self.query.to_string());
        }
        if let Some(ref fragment) = self.fragment {
            href.push('#');
            href.push_str(fragment);
        }
        href
    }

    /// Number of session history entries.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Number of in-place address rewrites so far.
    #[must_use]
    pub const fn replacements(&self) -> usize {
        self.replacements
    }

    fn replace_current(&mut self) -> Result<()> {
        let href = self.href();
        let current = self
            .history
            .last_mut()
            .ok_or_else(|| Error::navigation("history is empty"))?;
        *current = href;
        self.replacements += 1;
        Ok(())
    }
}

impl QueryPort for PageLocation {
    fn read_initial_range(&self) -> SeedParams {
        self.query.seed(&self.keys)
    }

    fn write_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<()> {
        self.query.set_range(&self.keys, &DayRange::new(start, end));
        self.replace_current()?;
        debug!(href = %self.href(), "replaced address");
        Ok(())
    }
}
