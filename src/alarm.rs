// Demodata - Alarm model
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Random alarm events.
//!
//! Alarms fire with a small constant hazard rate. A fired alarm overrides
//! the machine status to [`MachineStatus::Alarm`](crate::status::MachineStatus::Alarm)
//! and its reason to [`AlarmCode::reason`].

use crate::status::Reason;
use crate::weighted::WeightedTable;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Alarm occurrences per second (0.2 per day).
pub const ALARM_RATE_PER_SEC: f64 = 0.2 / 86_400.0;

/// Alarm duration bounds in seconds (inclusive).
pub const ALARM_DURATION_SEC: (u32, u32) = (30, 120);

/// Fixed set of alarm codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AlarmCode {
    /// Quality deviation
    Q001,
    /// Quality deviation (secondary inspection)
    Q002,
    /// Machine fault, power surge
    M001,
    /// Over temperature
    T001,
    /// High vibration
    V001,
}

/// Alarm codes in draw order.
pub const ALARM_CODES: [AlarmCode; 5] = [
    AlarmCode::Q001,
    AlarmCode::Q002,
    AlarmCode::M001,
    AlarmCode::T001,
    AlarmCode::V001,
];

pub static SEVERITY_WEIGHTS: WeightedTable<u8> =
    WeightedTable::new(&[(1, 0.6), (2, 0.3), (3, 0.1)]);

impl AlarmCode {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmCode::Q001 => "Q001",
            AlarmCode::Q002 => "Q002",
            AlarmCode::M001 => "M001",
            AlarmCode::T001 => "T001",
            AlarmCode::V001 => "V001",
        }
    }

    /// Quality-related codes raise the defect rate.
    pub fn is_quality(&self) -> bool {
        matches!(self, AlarmCode::Q001 | AlarmCode::Q002)
    }

    /// Reason reported while this alarm is active.
    pub fn reason(&self) -> Reason {
        match self {
            AlarmCode::Q001 | AlarmCode::Q002 => Reason::QualityIssue,
            AlarmCode::M001 => Reason::MachineFault,
            AlarmCode::T001 => Reason::OverTemp,
            AlarmCode::V001 => Reason::HighVibration,
        }
    }
}

impl fmt::Display for AlarmCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An alarm raised during one interval. Only code and severity are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlarmEvent {
    pub code: AlarmCode,
    /// 1 (minor) to 3 (critical).
    pub severity: u8,
    /// Informational only.
    pub duration_sec: u32,
}

/// Probability that an alarm fires within `interval_sec`.
///
/// Linear in the interval length; the hazard is small enough that the
/// exponential form would differ only in the noise.
pub fn alarm_probability(interval_sec: u32) -> f64 {
    ALARM_RATE_PER_SEC * f64::from(interval_sec)
}

/// Roll for an alarm.
///
/// Draws: one hit roll, then on a hit the code, severity and duration.
pub fn choose_alarm<R: Rng + ?Sized>(rng: &mut R, interval_sec: u32) -> Option<AlarmEvent> {
    if rng.gen::<f64>() >= alarm_probability(interval_sec) {
        return None;
    }

    let code = ALARM_CODES[rng.gen_range(0..ALARM_CODES.len())];
    let severity = SEVERITY_WEIGHTS.pick(rng);
    let duration_sec = rng.gen_range(ALARM_DURATION_SEC.0..=ALARM_DURATION_SEC.1);

    Some(AlarmEvent {
        code,
        severity,
        duration_sec,
    })
}
