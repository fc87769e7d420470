// Demodata - Shift classifier
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Time-of-day regimes and the per-machine daily refill window.
//!
//! All local-time decisions are made in the factory time zone
//! ([`FACTORY_TIMEZONE`]). Windows are half-open `[start, end)` and may
//! wrap past midnight.

use crate::profile::FactoryLayout;
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset};
use chrono::{TimeZone, Timelike, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// IANA name of the factory time zone.
pub const FACTORY_TIMEZONE: &str = "Asia/Tokyo";

/// UTC offset of [`FACTORY_TIMEZONE`]. The zone has no daylight saving.
pub const FACTORY_UTC_OFFSET_SECS: i32 = 9 * 3600;

/// Fixed offset of the factory time zone.
pub fn factory_offset() -> FixedOffset {
    FixedOffset::east_opt(FACTORY_UTC_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Convert any timestamp into factory local time.
pub fn to_factory_time<Tz: TimeZone>(ts: &DateTime<Tz>) -> DateTime<FixedOffset> {
    ts.with_timezone(&factory_offset())
}

/// Half-open local time window, `[start, end)`, in seconds from midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    start_sec: u32,
    end_sec: u32,
}

impl ShiftWindow {
    /// Window from `start_h:start_m` to `end_h:end_m`.
    pub const fn new(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Self {
        Self {
            start_sec: start_h * 3600 + start_m * 60,
            end_sec: end_h * 3600 + end_m * 60,
        }
    }

    /// Whether a wall-clock time falls inside the window.
    pub fn contains_time(&self, time: NaiveTime) -> bool {
        in_window(time.num_seconds_from_midnight(), self.start_sec, self.end_sec)
    }

    /// Whether a timestamp falls inside the window, in factory local time.
    pub fn contains<Tz: TimeZone>(&self, ts: &DateTime<Tz>) -> bool {
        self.contains_time(to_factory_time(ts).time())
    }
}

/// Half-open membership test with midnight wraparound.
///
/// When `start > end` the window spans midnight.
pub fn in_window(t: u32, start: u32, end: u32) -> bool {
    if start <= end {
        start <= t && t < end
    } else {
        t >= start || t < end
    }
}

pub const LUNCH_BREAK: ShiftWindow = ShiftWindow::new(12, 0, 12, 15);
pub const OFF_SHIFT: ShiftWindow = ShiftWindow::new(18, 0, 9, 0);
pub const STARTUP: ShiftWindow = ShiftWindow::new(9, 0, 9, 30);
pub const NORMAL_MORNING: ShiftWindow = ShiftWindow::new(9, 30, 12, 0);
pub const LATE_MORNING: ShiftWindow = ShiftWindow::new(12, 15, 13, 0);
pub const AFTERNOON: ShiftWindow = ShiftWindow::new(13, 0, 15, 30);

/// Local time the daily refill window is anchored at (15:30).
pub const REFILL_ANCHOR_SEC: i64 = 15 * 3600 + 30 * 60;

/// Time-of-day regime governing status selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// 12:00-12:15
    LunchBreak,
    /// 18:00-09:00
    OffShift,
    /// 09:00-09:30
    Startup,
    /// 09:30-12:00
    NormalMorning,
    /// 12:15-13:00, post-lunch recovery
    LateMorning,
    /// 13:00-15:30
    Afternoon,
    /// Anything else (15:30-18:00)
    SteadyState,
}

impl Regime {
    /// Get regime name as string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Regime::LunchBreak => "lunch_break",
            Regime::OffShift => "off_shift",
            Regime::Startup => "startup",
            Regime::NormalMorning => "normal_morning",
            Regime::LateMorning => "late_morning",
            Regime::Afternoon => "afternoon",
            Regime::SteadyState => "steady_state",
        }
    }
}

/// Classify a timestamp into its regime.
pub fn classify<Tz: TimeZone>(ts: &DateTime<Tz>) -> Regime {
    classify_time(to_factory_time(ts).time())
}

/// Classify a factory-local wall-clock time.
pub fn classify_time(time: NaiveTime) -> Regime {
    if LUNCH_BREAK.contains_time(time) {
        Regime::LunchBreak
    } else if OFF_SHIFT.contains_time(time) {
        Regime::OffShift
    } else if STARTUP.contains_time(time) {
        Regime::Startup
    } else if NORMAL_MORNING.contains_time(time) {
        Regime::NormalMorning
    } else if LATE_MORNING.contains_time(time) {
        Regime::LateMorning
    } else if AFTERNOON.contains_time(time) {
        Regime::Afternoon
    } else {
        Regime::SteadyState
    }
}

/// Stable 32-bit seed for a string.
///
/// SHA-256 of the UTF-8 bytes read as a big-endian integer, reduced
/// modulo 2^32 (the last four digest bytes).
pub fn seed_from_string(s: &str) -> u32 {
    let digest = Sha256::digest(s.as_bytes());
    u32::from_be_bytes([digest[28], digest[29], digest[30], digest[31]])
}

/// A machine's material refill window for one calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefillWindow {
    /// Calendar date (factory local).
    pub date: NaiveDate,
    /// Minutes after 15:30 the refill starts (0..=2).
    pub start_offset_min: u32,
    /// Refill duration in minutes (3..=7).
    pub duration_min: u32,
    /// Local start time.
    pub start: NaiveDateTime,
    /// Local end time (exclusive).
    pub end: NaiveDateTime,
}

impl RefillWindow {
    /// Whether a timestamp falls inside `[start, end)`.
    pub fn contains<Tz: TimeZone>(&self, ts: &DateTime<Tz>) -> bool {
        let local = to_factory_time(ts).naive_local();
        self.start <= local && local < self.end
    }
}

/// Compute the refill window of `machine_id` on `date`.
///
/// Depends only on its arguments: the same machine always gets the same
/// window on the same date.
pub fn refill_window(date: NaiveDate, machine_id: &str) -> RefillWindow {
    let seed = seed_from_string(&format!("{}-{}-refill", date.format("%Y-%m-%d"), machine_id));
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(seed));

    let start_offset_min: u32 = rng.gen_range(0..=2);
    let duration_min: u32 = rng.gen_range(3..=7);

    let anchor = NaiveDateTime::new(date, NaiveTime::default()) + Duration::seconds(REFILL_ANCHOR_SEC);
    let start = anchor + Duration::minutes(i64::from(start_offset_min));
    let end = start + Duration::minutes(i64::from(duration_min));

    RefillWindow {
        date,
        start_offset_min,
        duration_min,
        start,
        end,
    }
}

/// Whether `machine_id` is inside its refill window at `ts`.
///
/// Always false for machines outside the layout's refill subset.
pub fn refill_active<Tz: TimeZone>(
    layout: &FactoryLayout,
    ts: &DateTime<Tz>,
    machine_id: &str,
) -> bool {
    if !layout.is_refill_machine(machine_id) {
        return false;
    }
    let local = to_factory_time(ts);
    refill_window(local.date_naive(), machine_id).contains(&local)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jst(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<FixedOffset> {
        factory_offset()
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
    }

    fn at(h: u32, m: u32) -> Regime {
        classify(&jst(2024, 5, 1, h, m, 0))
    }

    #[test]
    fn test_in_window_plain() {
        assert!(in_window(10, 10, 20));
        assert!(in_window(19, 10, 20));
        assert!(!in_window(20, 10, 20));
        assert!(!in_window(9, 10, 20));
    }

    #[test]
    fn test_in_window_wraps_midnight() {
        assert!(in_window(23, 20, 5));
        assert!(in_window(0, 20, 5));
        assert!(in_window(4, 20, 5));
        assert!(!in_window(5, 20, 5));
        assert!(!in_window(12, 20, 5));
    }

    #[test]
    fn test_in_window_empty() {
        assert!(!in_window(10, 10, 10));
    }

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(at(12, 0), Regime::LunchBreak);
        assert_eq!(at(12, 14), Regime::LunchBreak);
        assert_eq!(at(12, 15), Regime::LateMorning);
        assert_eq!(at(12, 59), Regime::LateMorning);
        assert_eq!(at(13, 0), Regime::Afternoon);
        assert_eq!(at(15, 29), Regime::Afternoon);
        assert_eq!(at(15, 30), Regime::SteadyState);
        assert_eq!(at(17, 59), Regime::SteadyState);
        assert_eq!(at(18, 0), Regime::OffShift);
        assert_eq!(at(0, 0), Regime::OffShift);
        assert_eq!(at(8, 59), Regime::OffShift);
        assert_eq!(at(9, 0), Regime::Startup);
        assert_eq!(at(9, 29), Regime::Startup);
        assert_eq!(at(9, 30), Regime::NormalMorning);
        assert_eq!(at(11, 59), Regime::NormalMorning);
    }

    #[test]
    fn test_classify_last_second_before_boundary() {
        assert_eq!(classify(&jst(2024, 5, 1, 12, 14, 59)), Regime::LunchBreak);
        assert_eq!(classify(&jst(2024, 5, 1, 8, 59, 59)), Regime::OffShift);
    }

    #[test]
    fn test_classify_converts_to_factory_zone() {
        // 03:05 UTC is 12:05 in Tokyo
        let utc = Utc.with_ymd_and_hms(2024, 5, 1, 3, 5, 0).unwrap();
        assert_eq!(classify(&utc), Regime::LunchBreak);
    }

    #[test]
    fn test_seed_from_string() {
        assert_eq!(seed_from_string("abc"), 0xf200_15ad);
        assert_eq!(
            seed_from_string("2024-05-01-M02-refill"),
            seed_from_string("2024-05-01-M02-refill")
        );
        assert_ne!(
            seed_from_string("2024-05-01-M02-refill"),
            seed_from_string("2024-05-01-M03-refill")
        );
    }

    #[test]
    fn test_refill_window_bounds() {
        for day in 1..=28 {
            let date = NaiveDate::from_ymd_opt(2024, 2, day).unwrap();
            for machine in ["M02", "M03"] {
                let w = refill_window(date, machine);
                assert!(w.start_offset_min <= 2);
                assert!((3..=7).contains(&w.duration_min));
                assert_eq!(w.start.date(), date);
                assert_eq!(
                    w.start.time().num_seconds_from_midnight(),
                    (REFILL_ANCHOR_SEC as u32) + w.start_offset_min * 60
                );
                assert_eq!((w.end - w.start).num_minutes(), i64::from(w.duration_min));
            }
        }
    }

    #[test]
    fn test_refill_window_is_reproducible() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let first = refill_window(date, "M02");
        for _ in 0..10 {
            assert_eq!(refill_window(date, "M02"), first);
        }
    }

    #[test]
    fn test_refill_window_contains() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let w = refill_window(date, "M03");
        let start = factory_offset().from_local_datetime(&w.start).unwrap();
        let end = factory_offset().from_local_datetime(&w.end).unwrap();

        assert!(w.contains(&start));
        assert!(w.contains(&(end - Duration::seconds(1))));
        assert!(!w.contains(&end));
        assert!(!w.contains(&(start - Duration::seconds(1))));
    }

    #[test]
    fn test_refill_active_only_for_refill_machines() {
        let layout = FactoryLayout::builtin();
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let w = refill_window(date, "M01");
        let inside = factory_offset().from_local_datetime(&w.start).unwrap();
        assert!(!refill_active(&layout, &inside, "M01"));

        let w = refill_window(date, "M02");
        let inside = factory_offset().from_local_datetime(&w.start).unwrap();
        assert!(refill_active(&layout, &inside, "M02"));
        assert!(!refill_active(&layout, &jst(2024, 5, 1, 15, 29, 59), "M02"));
        assert!(!refill_active(&layout, &jst(2024, 5, 1, 15, 40, 0), "M02"));
    }
}
