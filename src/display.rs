//! Display utilities for the command line.
//!
//! # Functions
//!
//! - [`Snapshot::capture`] - Collect what the top bar would render right now
//! - [`print_section_simple`] - Print section headers
//! - [`display_presets`] / [`display_snapshot`] / [`describe_transition`] - Human-readable output

use serde::Serialize;

use crate::controller::{RangeController, Transition};
use crate::date_range::{iso_date, CalendarSpan, CommittedRange};
use crate::location::QueryPort;
use crate::preset::{Clock, PresetCatalog};

/// Everything the top bar shows for the current state.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub committed: CommittedRange,
    pub trigger_label: String,
    pub open: bool,
    pub selection: CalendarSpan,
    pub caption: String,
    pub can_confirm: bool,
    pub href: String,
}

impl Snapshot {
    /// Capture the controller's visible state alongside the current address.
    pub fn capture<P: QueryPort, C: Clock>(
        controller: &RangeController<P, C>,
        href: impl Into<String>,
    ) -> Self {
        Self {
            committed: controller.committed().clone(),
            trigger_label: controller.trigger_label(),
            open: controller.is_open(),
            selection: controller.selection(),
            caption: controller.span_caption(),
            can_confirm: controller.can_confirm(),
            href: href.into(),
        }
    }
}

/// Print a simple section header with dashes.
pub fn print_section_simple(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(30));
}

/// Print the preset catalog, marking the active entry.
pub fn display_presets(catalog: &PresetCatalog, active: Option<&CommittedRange>) {
    for preset in catalog.presets() {
        let marker = match active {
            Some(committed) if *committed.label() == preset.range_label() => "*",
            _ => " ",
        };
        println!(
            "  {marker} {:<14} {} .. {}  ({} days)",
            preset.label(),
            iso_date(preset.range.start()),
            iso_date(preset.range.end()),
            preset.range.len_days()
        );
    }
}

/// Print a snapshot as aligned key/value lines.
pub fn display_snapshot(snapshot: &Snapshot) {
    println!("  Trigger:    {}", snapshot.trigger_label);
    println!("  Committed:  {}", snapshot.committed);
    println!(
        "  Popover:    {}",
        if snapshot.open { "open" } else { "closed" }
    );
    if snapshot.open {
        println!("  Selection:  {}", snapshot.caption);
        println!(
            "  Done:       {}",
            if snapshot.can_confirm { "enabled" } else { "disabled" }
        );
    }
    println!("  Address:    {}", snapshot.href);
}

/// One-line description of a transition.
#[must_use]
pub fn describe_transition(transition: &Transition) -> String {
    match transition {
        Transition::Opened => "opened".to_string(),
        Transition::Edited => "selection updated".to_string(),
        Transition::Relabeled => "switched to custom range".to_string(),
        Transition::Committed(range) => format!("committed {range}"),
        Transition::Dismissed => "closed without commit".to_string(),
        Transition::Ignored => "ignored".to_string(),
    }
}
