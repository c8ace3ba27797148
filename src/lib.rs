//! # Range Bar
//!
//! Date-range selection and query synchronization for a dashboard top bar.
//!
//! This crate provides:
//! - A preset catalog ("Today", "Last 7 days", "Last 30 days") and a range matcher
//! - A popover controller with auto-commit, explicit confirm and cancel paths
//! - A query synchronizer projecting the committed range into `from`/`to`
//!   without adding history entries
//! - Lenient parsing of range parameters for server-rendered views

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod controller;
pub mod date_range;
pub mod display;
pub mod error;
pub mod location;
pub mod preset;
pub mod query;
pub mod script;

pub use config::Config;
pub use controller::{ControllerOptions, Popover, RangeController, RangeEvent, Transition};
pub use date_range::{CalendarSpan, CommittedRange, DayRange, RangeLabel};
pub use error::{Error, Result};
pub use location::{PageLocation, QueryPort};
pub use preset::{compute_presets, match_range, Clock, FixedClock, PresetCatalog, PresetKind};
pub use query::{parse_dashboard_range, SeedParams};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "range-bar";
