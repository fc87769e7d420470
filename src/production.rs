// Demodata - Production model
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Time-in-state accounting and good/defect unit counters.

use crate::alarm::AlarmEvent;
use crate::profile::LineProfile;
use crate::shift::Regime;
use crate::status::MachineStatus;
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Relative standard deviation of the sampled cycle count.
pub const CYCLE_COUNT_REL_STD: f64 = 0.05;

/// Startup widens the cycle-time range by this share of its span, both ends.
pub const STARTUP_CYCLE_PADDING: f64 = 0.3;

/// Lower bound on the widened startup cycle time.
pub const MIN_CYCLE_TIME_MS: u32 = 500;

/// Startup defect-rate multiplier.
pub const STARTUP_DEFECT_FACTOR: f64 = 2.0;

/// Bounds of the random defect multiplier under a quality alarm.
pub const QUALITY_ALARM_FACTOR: (f64, f64) = (1.5, 3.0);

/// Seconds attributed to each time bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeDeltas {
    pub run: u32,
    pub idle: u32,
    pub stop: u32,
}

impl TimeDeltas {
    /// Attribute the whole interval to the bucket of `status`.
    ///
    /// RUN counts as run time, IDLE as idle time, everything else
    /// (STOP, CHANGEOVER, MAINT, ALARM) as stop time.
    pub fn attribute(status: MachineStatus, interval_sec: u32) -> Self {
        match status {
            MachineStatus::Run => Self {
                run: interval_sec,
                ..Self::default()
            },
            MachineStatus::Idle => Self {
                idle: interval_sec,
                ..Self::default()
            },
            MachineStatus::Stop
            | MachineStatus::Changeover
            | MachineStatus::Maintenance
            | MachineStatus::Alarm => Self {
                stop: interval_sec,
                ..Self::default()
            },
        }
    }

    /// Sum of all buckets.
    pub fn total(&self) -> u32 {
        self.run + self.idle + self.stop
    }
}

/// Unit counters for one interval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductionCounts {
    /// Sampled cycles (good + defects).
    pub cycles: u64,
    pub good: u64,
    pub defects: u64,
}

/// Draw the cycle time for a running machine.
pub fn cycle_time_ms<R: Rng + ?Sized>(rng: &mut R, line: &LineProfile, regime: Regime) -> u32 {
    let (mut min_ms, mut max_ms) = (line.cycle_time_ms.min, line.cycle_time_ms.max);
    if regime == Regime::Startup {
        let padding = (f64::from(max_ms - min_ms) * STARTUP_CYCLE_PADDING) as u32;
        min_ms = min_ms.saturating_sub(padding).max(MIN_CYCLE_TIME_MS);
        max_ms = max_ms.saturating_add(padding);
    }
    rng.gen_range(min_ms..=max_ms.max(min_ms))
}

/// Effective per-unit defect probability.
///
/// Consumes one draw only when a quality alarm is active.
pub fn defect_rate<R: Rng + ?Sized>(
    rng: &mut R,
    line: &LineProfile,
    regime: Regime,
    alarm: Option<&AlarmEvent>,
) -> f64 {
    let mut rate = line.defect_rate;
    if regime == Regime::Startup {
        rate *= STARTUP_DEFECT_FACTOR;
    }
    if alarm.is_some_and(|a| a.code.is_quality()) {
        let (lo, hi) = QUALITY_ALARM_FACTOR;
        rate *= lo + (hi - lo) * rng.gen::<f64>();
    }
    rate
}

/// Expected cycles in the interval.
pub fn expected_cycles(interval_sec: u32, cycle_time_ms: u32) -> f64 {
    f64::from(interval_sec) * 1000.0 / f64::from(cycle_time_ms.max(1))
}

/// Sample cycle, good and defect counts.
///
/// The cycle count is normal around the expected count (5% relative
/// standard deviation), floored at zero and truncated. Each cycle then
/// fails independently with probability `defect_rate`.
pub fn sample_counts<R: Rng + ?Sized>(
    rng: &mut R,
    interval_sec: u32,
    cycle_time_ms: u32,
    defect_rate: f64,
) -> ProductionCounts {
    let expected = expected_cycles(interval_sec, cycle_time_ms);
    let sampled = match Normal::new(expected, expected * CYCLE_COUNT_REL_STD) {
        Ok(dist) => dist.sample(rng),
        Err(_) => expected,
    };
    let cycles = sampled.max(0.0) as u64;

    let defects = (0..cycles)
        .filter(|_| rng.gen::<f64>() < defect_rate)
        .count() as u64;

    ProductionCounts {
        cycles,
        good: cycles.saturating_sub(defects),
        defects,
    }
}
