// Demodata - Interval and status selection
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Reporting interval and per-machine operating status.

use crate::shift::Regime;
use crate::weighted::WeightedTable;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating state of a machine over one interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineStatus {
    #[serde(rename = "RUN")]
    Run,
    #[serde(rename = "IDLE")]
    Idle,
    #[serde(rename = "STOP")]
    Stop,
    #[serde(rename = "CHANGEOVER")]
    Changeover,
    #[serde(rename = "MAINT")]
    Maintenance,
    /// Overrides any other status when an alarm fires.
    #[serde(rename = "ALARM")]
    Alarm,
}

impl MachineStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MachineStatus::Run => "RUN",
            MachineStatus::Idle => "IDLE",
            MachineStatus::Stop => "STOP",
            MachineStatus::Changeover => "CHANGEOVER",
            MachineStatus::Maintenance => "MAINT",
            MachineStatus::Alarm => "ALARM",
        }
    }

    /// Default reason for a status drawn from a weighted table.
    pub fn default_reason(&self) -> Reason {
        match self {
            MachineStatus::Run => Reason::NormalRun,
            MachineStatus::Idle => Reason::EndOfShift,
            MachineStatus::Stop => Reason::MaterialWait,
            MachineStatus::Changeover => Reason::Changeover,
            MachineStatus::Maintenance => Reason::PlannedMaintenance,
            // Alarm reasons come from the alarm code
            MachineStatus::Alarm => Reason::MachineFault,
        }
    }
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable reason code attached to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    NormalRun,
    LunchBreak,
    OffShift,
    MaterialRefill,
    EndOfShift,
    MaterialWait,
    Changeover,
    PlannedMaintenance,
    QualityIssue,
    MachineFault,
    OverTemp,
    HighVibration,
}

impl Reason {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::NormalRun => "normal_run",
            Reason::LunchBreak => "lunch_break",
            Reason::OffShift => "off_shift",
            Reason::MaterialRefill => "material_refill",
            Reason::EndOfShift => "end_of_shift",
            Reason::MaterialWait => "material_wait",
            Reason::Changeover => "changeover",
            Reason::PlannedMaintenance => "planned_maintenance",
            Reason::QualityIssue => "quality_issue",
            Reason::MachineFault => "machine_fault",
            Reason::OverTemp => "over_temp",
            Reason::HighVibration => "high_vibration",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting interval lengths in seconds, most likely first.
pub static INTERVAL_WEIGHTS: WeightedTable<u32> = WeightedTable::new(&[
    (60, 0.70),
    (30, 0.10),
    (120, 0.10),
    (10, 0.05),
    (300, 0.04),
    (600, 0.01),
]);

use MachineStatus::{Changeover, Idle, Maintenance, Run, Stop};

pub static STARTUP_STATUS: WeightedTable<MachineStatus> = WeightedTable::new(&[
    (Run, 0.60),
    (Idle, 0.20),
    (Stop, 0.10),
    (Changeover, 0.05),
    (Maintenance, 0.05),
]);

/// Normal morning and afternoon.
pub static PRODUCTIVE_STATUS: WeightedTable<MachineStatus> = WeightedTable::new(&[
    (Run, 0.85),
    (Idle, 0.05),
    (Stop, 0.05),
    (Changeover, 0.03),
    (Maintenance, 0.02),
]);

pub static LATE_MORNING_STATUS: WeightedTable<MachineStatus> = WeightedTable::new(&[
    (Run, 0.70),
    (Idle, 0.20),
    (Stop, 0.05),
    (Changeover, 0.03),
    (Maintenance, 0.02),
]);

pub static STEADY_STATUS: WeightedTable<MachineStatus> = WeightedTable::new(&[
    (Run, 0.80),
    (Idle, 0.10),
    (Stop, 0.05),
    (Changeover, 0.03),
    (Maintenance, 0.02),
]);

/// Probability that a machine runs during off-shift hours.
pub const OFF_SHIFT_RUN_PROBABILITY: f64 = 0.1;

/// Draw the snapshot's reporting interval.
pub fn select_interval_sec<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    INTERVAL_WEIGHTS.pick(rng)
}

/// Pick a status and reason for one machine.
///
/// Lunch break consumes no randomness; every other branch consumes exactly
/// one draw, except an active refill window which consumes none.
pub fn select_status<R: Rng + ?Sized>(
    rng: &mut R,
    regime: Regime,
    refill_active: bool,
) -> (MachineStatus, Reason) {
    let table = match regime {
        Regime::LunchBreak => return (Idle, Reason::LunchBreak),
        Regime::OffShift => {
            return if rng.gen::<f64>() < OFF_SHIFT_RUN_PROBABILITY {
                (Run, Reason::NormalRun)
            } else {
                (Idle, Reason::OffShift)
            };
        }
        _ if refill_active => return (Stop, Reason::MaterialRefill),
        Regime::Startup => &STARTUP_STATUS,
        Regime::NormalMorning | Regime::Afternoon => &PRODUCTIVE_STATUS,
        Regime::LateMorning => &LATE_MORNING_STATUS,
        Regime::SteadyState => &STEADY_STATUS,
    };

    let status = table.pick(rng);
    (status, status.default_reason())
}
