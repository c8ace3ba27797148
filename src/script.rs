//! Textual event scripts for replaying user interaction from the command line.
//!
//! One token per event:
//!
//! | token                 | event                                |
//! |-----------------------|--------------------------------------|
//! | `open`, `toggle`      | trigger button                       |
//! | `pick:DATE`           | widget reports a start-only span     |
//! | `pick:DATE..DATE`     | widget reports a complete span       |
//! | `clear-pick`          | widget reports an empty span         |
//! | `preset:LABEL`        | preset button (`preset:last-7-days`) |
//! | `custom`              | "Custom range…" entry                |
//! | `done`                | confirm button                       |
//! | `backdrop`, `escape`  | dismiss                              |
//! | `reset`               | clear control (commits "Today")      |
//! | `set:DATE..DATE`      | standalone range inputs              |

use crate::controller::RangeEvent;
use crate::date_range::CalendarSpan;
use crate::error::{Error, Result};
use crate::preset::PresetKind;
use crate::query::parse_day;

/// Parse a single event token.
pub fn parse_event(token: &str) -> Result<RangeEvent> {
    let token = token.trim();
    let (name, arg) = match token.split_once(':') {
        Some((name, arg)) => (name, Some(arg)),
        None => (token, None),
    };

    let event = match (name.to_ascii_lowercase().as_str(), arg) {
        ("open", None) => RangeEvent::Open,
        ("toggle", None) => RangeEvent::Toggle,
        ("clear-pick", None) => RangeEvent::Pick(CalendarSpan::empty()),
        ("custom", None) => RangeEvent::SelectCustom,
        ("done" | "confirm", None) => RangeEvent::Confirm,
        ("backdrop", None) => RangeEvent::Backdrop,
        ("escape" | "esc", None) => RangeEvent::Escape,
        ("reset", None) => RangeEvent::Reset,
        ("pick", Some(arg)) => RangeEvent::Pick(parse_span(arg)?),
        ("preset", Some(arg)) => RangeEvent::SelectPreset(
            PresetKind::from_label(arg)
                .ok_or_else(|| Error::other(format!("unknown preset '{arg}'")))?,
        ),
        ("set", Some(arg)) => {
            let (from, to) = arg
                .split_once("..")
                .ok_or_else(|| Error::other(format!("set needs FROM..TO, got '{arg}'")))?;
            RangeEvent::SetRange {
                from: parse_day(from)?,
                to: parse_day(to)?,
            }
        }
        _ => return Err(Error::other(format!("unknown event '{token}'"))),
    };
    Ok(event)
}

/// Parse every token of a script, stopping at the first bad one.
pub fn parse_script<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<RangeEvent>> {
    tokens.iter().map(|t| parse_event(t.as_ref())).collect()
}

fn parse_span(arg: &str) -> Result<CalendarSpan> {
    match arg.split_once("..") {
        Some((start, end)) => Ok(CalendarSpan::between(parse_day(start)?, parse_day(end)?)),
        None => Ok(CalendarSpan::starting(parse_day(arg)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_simple_events() {
        assert_eq!(parse_event("open").unwrap(), RangeEvent::Open);
        assert_eq!(parse_event(" Escape ").unwrap(), RangeEvent::Escape);
        assert_eq!(parse_event("done").unwrap(), RangeEvent::Confirm);
        assert_eq!(
            parse_event("clear-pick").unwrap(),
            RangeEvent::Pick(CalendarSpan::empty())
        );
    }

    #[test]
    fn test_parse_pick() {
        assert_eq!(
            parse_event("pick:2026-01-10").unwrap(),
            RangeEvent::Pick(CalendarSpan::starting(d(2026, 1, 10)))
        );
        assert_eq!(
            parse_event("pick:2026-01-10..2026-01-12").unwrap(),
            RangeEvent::Pick(CalendarSpan::between(d(2026, 1, 10), d(2026, 1, 12)))
        );
    }

    #[test]
    fn test_parse_preset_and_set() {
        assert_eq!(
            parse_event("preset:last-30-days").unwrap(),
            RangeEvent::SelectPreset(PresetKind::Last30Days)
        );
        assert_eq!(
            parse_event("set:2026-01-01..2026-01-03").unwrap(),
            RangeEvent::SetRange {
                from: d(2026, 1, 1),
                to: d(2026, 1, 3)
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_event("jump").is_err());
        assert!(parse_event("open:now").is_err());
        assert!(parse_event("preset:yesterday").is_err());
        assert!(parse_event("pick:soon").is_err());
        assert!(parse_event("set:2026-01-01").is_err());
    }

    #[test]
    fn test_parse_script_stops_on_error() {
        assert_eq!(parse_script(&["open", "escape"]).unwrap().len(), 2);
        assert!(parse_script(&["open", "bogus", "escape"]).is_err());
    }
}
