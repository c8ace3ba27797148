//! The top-bar range controller.
//!
//! Owns the committed range, the popover state and the editing buffer, and
//! pushes every commit through the [`QueryPort`]. All transitions happen inside
//! a single call to [`RangeController::handle`], so a commit and the close that
//! follows it can never be observed separately.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::date_range::{CalendarSpan, CommittedRange, DateFormat, DayRange, RangeLabel};
use crate::location::QueryPort;
use crate::preset::{Clock, Preset, PresetCatalog, PresetKind, SystemClock};
use crate::query::seed_range;

/// Popover state. The editing buffer only exists while open.
///
/// `custom` is the tentative "Custom range" label set by the custom entry. It is
/// never written to the committed range; commits re-match the label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popover {
    Closed,
    Open { buffer: CalendarSpan, custom: bool },
}

/// Something the user did to the date control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeEvent {
    /// Trigger button pressed while closed
    Open,
    /// Trigger button pressed, whatever the state
    Toggle,
    /// The calendar widget reported its current span
    Pick(CalendarSpan),
    /// A preset button was pressed
    SelectPreset(PresetKind),
    /// The "Custom range…" entry was pressed
    SelectCustom,
    /// The "Done" button was pressed
    Confirm,
    /// Pointer down on the backdrop outside the popover
    Backdrop,
    /// Escape key while open
    Escape,
    /// The small clear control inside the popover
    Reset,
    /// Both bounds typed into the standalone range inputs
    SetRange { from: NaiveDate, to: NaiveDate },
}

/// What an event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Closed → Open
    Opened,
    /// Buffer changed, still open
    Edited,
    /// Custom entry chosen, buffer cleared, still open
    Relabeled,
    /// New committed range, popover closed
    Committed(CommittedRange),
    /// Closed without touching the committed range
    Dismissed,
    /// Not applicable in the current state
    Ignored,
}

/// What the calendar widget is told to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarView {
    pub selected: CalendarSpan,
    /// First day of the left-most month grid
    pub month: NaiveDate,
    pub months_shown: u32,
    pub week_starts_on: Weekday,
}

/// Presentation and catalog settings for a controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    pub format: DateFormat,
    pub refresh_presets_on_open: bool,
    pub months_shown: u32,
    pub week_starts_on: Weekday,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            format: DateFormat::default(),
            refresh_presets_on_open: false,
            months_shown: 2,
            week_starts_on: Weekday::Mon,
        }
    }
}

impl From<&Config> for ControllerOptions {
    fn from(config: &Config) -> Self {
        Self {
            format: config.display.date_format(),
            refresh_presets_on_open: config.presets.refresh_on_open,
            months_shown: config.display.months_shown,
            week_starts_on: config.display.week_starts_on,
        }
    }
}

/// Date-range controller for the dashboard top bar.
#[derive(Debug)]
pub struct RangeController<P, C = SystemClock> {
    port: P,
    clock: C,
    options: ControllerOptions,
    catalog: PresetCatalog,
    committed: CommittedRange,
    popover: Popover,
    syncs: usize,
}

impl<P: QueryPort> RangeController<P, SystemClock> {
    /// Build a controller reading the local wall clock.
    pub fn new(port: P, options: ControllerOptions) -> Self {
        Self::with_clock(port, SystemClock, options)
    }
}

impl<P: QueryPort, C: Clock> RangeController<P, C> {
    /// Build a controller, seeding the committed range from the port.
    ///
    /// The resolved range is written back once so the address always
    /// carries it, even when it came from the default.
    pub fn with_clock(port: P, clock: C, options: ControllerOptions) -> Self {
        let catalog = PresetCatalog::new(clock.today());
        let committed = seed_range(&port.read_initial_range(), &catalog);
        let mut controller = Self {
            port,
            clock,
            options,
            catalog,
            committed,
            popover: Popover::Closed,
            syncs: 0,
        };
        controller.sync();
        controller
    }

    /// Apply one event.
    pub fn handle(&mut self, event: RangeEvent) -> Transition {
        let transition = match (self.popover, event) {
            (Popover::Closed, RangeEvent::Open | RangeEvent::Toggle) => self.open(),
            (Popover::Open { .. }, RangeEvent::Toggle | RangeEvent::Backdrop | RangeEvent::Escape) => {
                self.dismiss()
            }
            (Popover::Open { .. }, RangeEvent::Pick(span)) => self.pick(span),
            (Popover::Open { .. }, RangeEvent::SelectPreset(kind)) => {
                let preset = self.catalog.get(kind);
                self.apply_preset(preset)
            }
            (Popover::Open { .. }, RangeEvent::SelectCustom) => self.select_custom(),
            (Popover::Open { buffer, .. }, RangeEvent::Confirm) => match buffer.complete() {
                Some(range) => self.commit_matched(range),
                None => Transition::Ignored,
            },
            (Popover::Open { .. }, RangeEvent::Reset) => {
                let today = self.catalog.today();
                self.apply_preset(today)
            }
            (_, RangeEvent::SetRange { from, to }) => self.commit_matched(DayRange::new(from, to)),
            _ => Transition::Ignored,
        };

        if transition == Transition::Ignored {
            debug!(?event, "event ignored while {}", self.state_name());
        }
        transition
    }

    fn open(&mut self) -> Transition {
        if self.options.refresh_presets_on_open {
            let today = self.clock.today();
            if today != self.catalog.anchor() {
                debug!(%today, "re-anchoring presets");
                self.catalog = PresetCatalog::new(today);
            }
        }
        self.popover = Popover::Open {
            buffer: CalendarSpan::mirror(&self.committed.range()),
            custom: false,
        };
        debug!("popover opened");
        Transition::Opened
    }

    fn pick(&mut self, span: CalendarSpan) -> Transition {
        // `complete` orders a reversed span instead of committing the widget's
        // bounds as reported, so a committed range always has start <= end.
        match span.complete() {
            Some(range) => self.commit_matched(range),
            None => {
                if let Popover::Open { ref mut buffer, .. } = self.popover {
                    *buffer = span;
                }
                Transition::Edited
            }
        }
    }

    fn select_custom(&mut self) -> Transition {
        self.popover = Popover::Open {
            buffer: CalendarSpan::empty(),
            custom: true,
        };
        debug!("custom entry selected");
        Transition::Relabeled
    }

    fn dismiss(&mut self) -> Transition {
        self.popover = Popover::Closed;
        debug!("popover dismissed");
        Transition::Dismissed
    }

    fn apply_preset(&mut self, preset: Preset) -> Transition {
        self.commit(CommittedRange::new(preset.range, preset.range_label()))
    }

    fn commit_matched(&mut self, range: DayRange) -> Transition {
        let label = self.catalog.label_for(&range);
        self.commit(CommittedRange::new(range, label))
    }

    /// Replace the committed range and close. The address is only rewritten
    /// when the value actually changed.
    fn commit(&mut self, next: CommittedRange) -> Transition {
        info!(range = %next, "committed range");
        self.popover = Popover::Closed;
        if next != self.committed {
            self.committed = next.clone();
            self.sync();
        }
        Transition::Committed(next)
    }

    /// Project the committed range into the address.
    ///
    /// A failed write leaves the committed range as it is.
    fn sync(&mut self) {
        self.syncs += 1;
        if let Err(e) = self
            .port
            .write_range(self.committed.start(), self.committed.end())
        {
            warn!("failed to write range to address: {}", e);
        }
    }

    const fn state_name(&self) -> &'static str {
        match self.popover {
            Popover::Closed => "closed",
            Popover::Open { .. } => "open",
        }
    }

    // ===== Queries =====

    #[must_use]
    pub const fn committed(&self) -> &CommittedRange {
        &self.committed
    }

    #[must_use]
    pub const fn popover(&self) -> Popover {
        self.popover
    }

    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self.popover, Popover::Open { .. })
    }

    /// The editing buffer, or the committed range mirrored while closed.
    #[must_use]
    pub fn selection(&self) -> CalendarSpan {
        match self.popover {
            Popover::Open { buffer, .. } => buffer,
            Popover::Closed => CalendarSpan::mirror(&self.committed.range()),
        }
    }

    /// Whether "Done" would commit right now.
    #[must_use]
    pub const fn can_confirm(&self) -> bool {
        match self.popover {
            Popover::Open { buffer, .. } => buffer.is_complete(),
            Popover::Closed => false,
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &PresetCatalog {
        &self.catalog
    }

    /// The label shown for the current state: the tentative custom label
    /// while editing a custom range, else the committed one.
    #[must_use]
    pub fn label(&self) -> &RangeLabel {
        match self.popover {
            Popover::Open { custom: true, .. } => &RangeLabel::Custom,
            _ => self.committed.label(),
        }
    }

    /// Whether the given entry in the preset list is the current one.
    #[must_use]
    pub fn is_active(&self, label: &RangeLabel) -> bool {
        self.label() == label
    }

    /// Text on the trigger button.
    ///
    /// Preset names show as-is. A custom range shows its dates, taken from the
    /// buffer while editing; an incomplete buffer shows "Custom range".
    #[must_use]
    pub fn trigger_label(&self) -> String {
        match self.label() {
            RangeLabel::Preset(name) => name.clone(),
            RangeLabel::Custom => match self.selection().complete() {
                Some(range) => self.options.format.range(&range),
                None => RangeLabel::Custom.to_string(),
            },
        }
    }

    /// Caption under the custom entry describing the current selection.
    #[must_use]
    pub fn span_caption(&self) -> String {
        self.options.format.span(&self.selection())
    }

    /// Controlled props for the calendar widget.
    #[must_use]
    pub fn calendar_view(&self) -> CalendarView {
        let selected = self.selection();
        let anchor = selected.start.unwrap_or_else(|| self.clock.today());
        CalendarView {
            selected,
            month: anchor.with_day(1).unwrap_or(anchor),
            months_shown: self.options.months_shown,
            week_starts_on: self.options.week_starts_on,
        }
    }

    /// Number of times the range has been written to the port.
    #[must_use]
    pub const fn sync_count(&self) -> usize {
        self.syncs
    }

    #[must_use]
    pub const fn port(&self) -> &P {
        &self.port
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::preset::FixedClock;
    use crate::query::SeedParams;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    /// Records every write; optionally fails them.
    #[derive(Debug, Default)]
    struct RecordingPort {
        seed: SeedParams,
        writes: Vec<(NaiveDate, NaiveDate)>,
        fail: bool,
    }

    impl QueryPort for RecordingPort {
        fn read_initial_range(&self) -> SeedParams {
            self.seed.clone()
        }

        fn write_range(&mut self, start: NaiveDate, end: NaiveDate) -> Result<()> {
            if self.fail {
                return Err(Error::navigation("router unavailable"));
            }
            self.writes.push((start, end));
            Ok(())
        }
    }

    fn controller(seed: SeedParams) -> RangeController<RecordingPort, FixedClock> {
        let port = RecordingPort {
            seed,
            ..RecordingPort::default()
        };
        RangeController::with_clock(port, FixedClock(d(2026, 1, 5)), ControllerOptions::default())
    }

    #[test]
    fn test_default_seed_writes_once() {
        let ctl = controller(SeedParams::default());
        assert_eq!(ctl.committed().label(), &RangeLabel::preset("Last 7 days"));
        assert_eq!(ctl.port().writes, vec![(d(2025, 12, 30), d(2026, 1, 5))]);
        assert_eq!(ctl.sync_count(), 1);
        assert!(!ctl.is_open());
    }

    #[test]
    fn test_open_mirrors_committed() {
        let mut ctl = controller(SeedParams::new("2026-01-01", "2026-01-03"));
        assert_eq!(ctl.handle(RangeEvent::Open), Transition::Opened);
        assert_eq!(
            ctl.popover(),
            Popover::Open {
                buffer: CalendarSpan::between(d(2026, 1, 1), d(2026, 1, 3)),
                custom: false,
            }
        );
    }

    #[test]
    fn test_partial_pick_keeps_open() {
        let mut ctl = controller(SeedParams::default());
        ctl.handle(RangeEvent::Open);
        let transition = ctl.handle(RangeEvent::Pick(CalendarSpan::starting(d(2026, 1, 2))));
        assert_eq!(transition, Transition::Edited);
        assert!(ctl.is_open());
        assert!(!ctl.can_confirm());
        assert_eq!(ctl.span_caption(), "Jan 02, 2026 – …");
        assert_eq!(ctl.sync_count(), 1);
    }

    #[test]
    fn test_complete_pick_auto_commits() {
        let mut ctl = controller(SeedParams::default());
        ctl.handle(RangeEvent::Open);
        let transition = ctl.handle(RangeEvent::Pick(CalendarSpan::between(
            d(2026, 1, 5),
            d(2026, 1, 5),
        )));
        assert!(matches!(transition, Transition::Committed(_)));
        assert_eq!(ctl.committed().label(), &RangeLabel::preset("Today"));
        assert!(!ctl.is_open());
        assert_eq!(ctl.port().writes.last(), Some(&(d(2026, 1, 5), d(2026, 1, 5))));
    }

    #[test]
    fn test_reversed_pick_is_ordered() {
        let mut ctl = controller(SeedParams::default());
        ctl.handle(RangeEvent::Open);
        ctl.handle(RangeEvent::Pick(CalendarSpan::between(d(2026, 1, 9), d(2026, 1, 7))));
        assert_eq!(ctl.committed().start(), d(2026, 1, 7));
        assert_eq!(ctl.committed().end(), d(2026, 1, 9));
    }

    #[test]
    fn test_preset_closes_without_rematch() {
        let mut ctl = controller(SeedParams::default());
        ctl.handle(RangeEvent::Open);
        ctl.handle(RangeEvent::SelectPreset(PresetKind::Last30Days));
        assert_eq!(ctl.committed().label(), &RangeLabel::preset("Last 30 days"));
        assert_eq!(ctl.committed().start(), d(2025, 12, 7));
        assert!(!ctl.is_open());
        assert_eq!(
            ctl.selection(),
            CalendarSpan::between(d(2025, 12, 7), d(2026, 1, 5))
        );
    }

    #[test]
    fn test_custom_entry_clears_buffer() {
        let mut ctl = controller(SeedParams::default());
        let before = ctl.committed().clone();
        ctl.handle(RangeEvent::Open);
        assert_eq!(ctl.handle(RangeEvent::SelectCustom), Transition::Relabeled);
        assert!(ctl.is_open());
        assert!(ctl.selection().is_empty());
        assert_eq!(ctl.label(), &RangeLabel::Custom);
        assert!(ctl.is_active(&RangeLabel::Custom));
        assert_eq!(ctl.trigger_label(), "Custom range");
        assert_eq!(ctl.span_caption(), "Select dates");

        // Tentative until committed: nothing written yet.
        assert_eq!(ctl.committed(), &before);
        assert_eq!(ctl.port().writes.len(), 1);
    }

    #[test]
    fn test_custom_entry_dropped_on_escape() {
        let mut ctl = controller(SeedParams::default());
        let before = ctl.committed().clone();
        ctl.handle(RangeEvent::Open);
        ctl.handle(RangeEvent::SelectCustom);
        assert_eq!(ctl.handle(RangeEvent::Escape), Transition::Dismissed);

        assert_eq!(ctl.committed(), &before);
        assert_eq!(ctl.label(), &RangeLabel::preset("Last 7 days"));
        assert_eq!(ctl.trigger_label(), "Last 7 days");
        assert_eq!(ctl.sync_count(), 1);

        ctl.handle(RangeEvent::Open);
        assert_eq!(
            ctl.popover(),
            Popover::Open {
                buffer: CalendarSpan::mirror(&before.range()),
                custom: false,
            }
        );
    }

    #[test]
    fn test_custom_entry_then_pick_commits_matched_label() {
        let mut ctl = controller(SeedParams::default());
        ctl.handle(RangeEvent::Open);
        ctl.handle(RangeEvent::SelectCustom);
        ctl.handle(RangeEvent::Pick(CalendarSpan::starting(d(2026, 1, 1))));
        assert_eq!(ctl.trigger_label(), "Custom range");
        ctl.handle(RangeEvent::Pick(CalendarSpan::between(d(2026, 1, 1), d(2026, 1, 2))));
        assert_eq!(ctl.committed().label(), &RangeLabel::Custom);
        assert_eq!(ctl.port().writes.last(), Some(&(d(2026, 1, 1), d(2026, 1, 2))));
        assert_eq!(ctl.sync_count(), 2);
    }

    #[test]
    fn test_unchanged_commit_skips_write() {
        let mut ctl = controller(SeedParams::default());
        ctl.handle(RangeEvent::Open);
        let transition = ctl.handle(RangeEvent::SelectPreset(PresetKind::Last7Days));
        assert!(matches!(transition, Transition::Committed(_)));
        assert!(!ctl.is_open());
        assert_eq!(ctl.sync_count(), 1);
        assert_eq!(ctl.port().writes.len(), 1);
    }

    #[test]
    fn test_confirm_incomplete_is_noop() {
        let mut ctl = controller(SeedParams::default());
        let before = ctl.committed().clone();
        ctl.handle(RangeEvent::Open);
        ctl.handle(RangeEvent::SelectCustom);
        ctl.handle(RangeEvent::Pick(CalendarSpan::starting(d(2026, 1, 2))));
        assert_eq!(ctl.handle(RangeEvent::Confirm), Transition::Ignored);
        assert!(ctl.is_open());
        assert_eq!(ctl.committed().range(), before.range());
    }

    #[test]
    fn test_confirm_when_closed_is_noop() {
        let mut ctl = controller(SeedParams::default());
        assert_eq!(ctl.handle(RangeEvent::Confirm), Transition::Ignored);
        assert_eq!(ctl.sync_count(), 1);
    }

    #[test]
    fn test_backdrop_reverts_buffer() {
        let mut ctl = controller(SeedParams::default());
        let before = ctl.committed().clone();
        ctl.handle(RangeEvent::Open);
        ctl.handle(RangeEvent::Pick(CalendarSpan::starting(d(2026, 1, 1))));
        assert_eq!(ctl.handle(RangeEvent::Backdrop), Transition::Dismissed);
        assert_eq!(ctl.committed(), &before);
        assert_eq!(ctl.selection(), CalendarSpan::mirror(&before.range()));
    }

    #[test]
    fn test_reset_commits_today() {
        let mut ctl = controller(SeedParams::default());
        ctl.handle(RangeEvent::Open);
        ctl.handle(RangeEvent::Reset);
        assert_eq!(ctl.committed().label(), &RangeLabel::preset("Today"));
        assert_eq!(ctl.committed().range(), DayRange::single(d(2026, 1, 5)));
        assert!(!ctl.is_open());
    }

    #[test]
    fn test_toggle_opens_and_dismisses() {
        let mut ctl = controller(SeedParams::default());
        assert_eq!(ctl.handle(RangeEvent::Toggle), Transition::Opened);
        ctl.handle(RangeEvent::Pick(CalendarSpan::starting(d(2026, 1, 1))));
        assert_eq!(ctl.handle(RangeEvent::Toggle), Transition::Dismissed);
        assert_eq!(ctl.committed().label(), &RangeLabel::preset("Last 7 days"));
    }

    #[test]
    fn test_closed_only_ignores_open_events() {
        let mut ctl = controller(SeedParams::default());
        for event in [
            RangeEvent::Escape,
            RangeEvent::Backdrop,
            RangeEvent::Reset,
            RangeEvent::SelectCustom,
            RangeEvent::SelectPreset(PresetKind::Today),
            RangeEvent::Pick(CalendarSpan::between(d(2026, 1, 1), d(2026, 1, 2))),
        ] {
            assert_eq!(ctl.handle(event), Transition::Ignored);
        }
        assert_eq!(ctl.handle(RangeEvent::Open), Transition::Opened);
        assert_eq!(ctl.handle(RangeEvent::Open), Transition::Ignored);
    }

    #[test]
    fn test_set_range_commits_from_any_state() {
        let mut ctl = controller(SeedParams::default());
        let transition = ctl.handle(RangeEvent::SetRange {
            from: d(2026, 1, 1),
            to: d(2026, 1, 3),
        });
        assert!(matches!(transition, Transition::Committed(_)));
        assert_eq!(ctl.trigger_label(), "Jan 01, 2026 – Jan 03, 2026");
    }

    #[test]
    fn test_failed_write_keeps_committed() {
        let port = RecordingPort {
            fail: true,
            ..RecordingPort::default()
        };
        let mut ctl =
            RangeController::with_clock(port, FixedClock(d(2026, 1, 5)), ControllerOptions::default());
        ctl.handle(RangeEvent::Open);
        ctl.handle(RangeEvent::SelectPreset(PresetKind::Today));
        assert_eq!(ctl.committed().label(), &RangeLabel::preset("Today"));
        assert_eq!(ctl.sync_count(), 2);
        assert!(ctl.port().writes.is_empty());
    }

    #[test]
    fn test_calendar_view_month() {
        let mut ctl = controller(SeedParams::new("2026-02-14", "2026-03-02"));
        let view = ctl.calendar_view();
        assert_eq!(view.month, d(2026, 2, 1));
        assert_eq!(view.months_shown, 2);
        assert_eq!(view.week_starts_on, Weekday::Mon);

        ctl.handle(RangeEvent::Open);
        ctl.handle(RangeEvent::SelectCustom);
        assert_eq!(ctl.calendar_view().month, d(2026, 1, 1));
    }

    #[test]
    fn test_new_uses_system_clock() {
        let ctl = RangeController::new(RecordingPort::default(), ControllerOptions::default());
        let anchor = ctl.catalog().anchor();
        assert_eq!(ctl.committed().end(), anchor);
        assert_eq!(ctl.committed().range().len_days(), 7);
    }

    #[test]
    fn test_options_from_config() {
        let mut config = Config::default();
        config.display.months_shown = 3;
        config.presets.refresh_on_open = true;
        let options = ControllerOptions::from(&config);
        assert_eq!(options.months_shown, 3);
        assert!(options.refresh_presets_on_open);
    }

    #[test]
    fn test_is_active() {
        let ctl = controller(SeedParams::default());
        assert!(ctl.is_active(&RangeLabel::preset("Last 7 days")));
        assert!(!ctl.is_active(&RangeLabel::Custom));
    }
}
