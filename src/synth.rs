// Demodata - Snapshot synthesis
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Top-level synthesis: classifier → selector → alarm/production →
//! sensors → record assembly.
//!
//! A single random source is threaded through the whole snapshot in a
//! fixed order, so the same `(timestamp, seed)` pair always yields the
//! same snapshot:
//!
//! 1. reporting interval
//! 2. for each line, for each machine:
//!    status, alarm roll (not IDLE), cycle time and counts (RUN only),
//!    sensors.

use crate::alarm::{choose_alarm, AlarmEvent};
use crate::error::Result;
use crate::production::{cycle_time_ms, defect_rate, sample_counts, ProductionCounts, TimeDeltas};
use crate::profile::{FactoryLayout, LineProfile};
use crate::sensors::synthesize_sensors;
use crate::shift::{classify, factory_offset, refill_active, to_factory_time, Regime};
use crate::snapshot::{AlarmSummary, LineSnapshot, MachineRecord, Snapshot, SCHEMA_VERSION};
use crate::status::{select_interval_sec, select_status, MachineStatus};
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Current time in the factory zone.
pub fn now_in_factory_zone() -> DateTime<FixedOffset> {
    Utc::now().with_timezone(&factory_offset())
}

/// Snapshot synthesizer over a validated layout.
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    layout: FactoryLayout,
}

impl Synthesizer {
    /// Validate `layout` and build a synthesizer for it.
    pub fn new(layout: FactoryLayout) -> Result<Self> {
        layout.validate()?;
        Ok(Self { layout })
    }

    /// The layout in use.
    pub fn layout(&self) -> &FactoryLayout {
        &self.layout
    }

    /// Build one snapshot for `timestamp`.
    pub fn synthesize<Tz, R>(&self, timestamp: &DateTime<Tz>, rng: &mut R) -> Snapshot
    where
        Tz: TimeZone,
        R: Rng + ?Sized,
    {
        let ts = to_factory_time(timestamp);
        let regime = classify(&ts);
        let interval_sec = select_interval_sec(rng);
        debug!(
            "synthesizing snapshot at {} (regime {}, interval {}s)",
            ts,
            regime.as_str(),
            interval_sec
        );

        let mut lines = Vec::with_capacity(self.layout.lines.len());
        for line in &self.layout.lines {
            let mut machines = Vec::with_capacity(self.layout.machine_ids.len());
            for machine_id in &self.layout.machine_ids {
                let refill = refill_active(&self.layout, &ts, machine_id);
                machines.push(synthesize_machine(
                    rng,
                    line,
                    machine_id,
                    regime,
                    refill,
                    interval_sec,
                ));
            }
            lines.push(LineSnapshot {
                line_id: line.line_id.clone(),
                line_name: line.line_name.clone(),
                machines,
            });
        }

        Snapshot {
            schema_version: SCHEMA_VERSION.to_string(),
            factory_id: self.layout.factory_id.clone(),
            ts,
            interval_sec,
            lines,
        }
    }
}

/// Build the record of one machine.
pub fn synthesize_machine<R: Rng + ?Sized>(
    rng: &mut R,
    line: &LineProfile,
    machine_id: &str,
    regime: Regime,
    refill_active: bool,
    interval_sec: u32,
) -> MachineRecord {
    let (mut status, mut reason) = select_status(rng, regime, refill_active);

    let alarm: Option<AlarmEvent> = if status != MachineStatus::Idle {
        choose_alarm(rng, interval_sec)
    } else {
        None
    };
    if let Some(event) = &alarm {
        status = MachineStatus::Alarm;
        reason = event.code.reason();
    }

    let time = TimeDeltas::attribute(status, interval_sec);

    let (cycle_time, counts) = if status == MachineStatus::Run {
        let ct = cycle_time_ms(rng, line, regime);
        let rate = defect_rate(rng, line, regime, alarm.as_ref());
        (Some(ct), sample_counts(rng, interval_sec, ct, rate))
    } else {
        (None, ProductionCounts::default())
    };

    let sensors = synthesize_sensors(rng, line, status, alarm.as_ref());

    trace!(
        "{}-{}: {} ({}) good={} ng={}",
        line.line_id,
        machine_id,
        status,
        reason,
        counts.good,
        counts.defects
    );

    MachineRecord {
        machine_id: format!("{}-{}", line.line_id, machine_id),
        status,
        reason,
        good_count_delta: counts.good,
        ng_count_delta: counts.defects,
        run_time_sec_delta: time.run,
        idle_time_sec_delta: time.idle,
        stop_time_sec_delta: time.stop,
        cycle_time_ms: cycle_time,
        sensors,
        alarm: alarm.as_ref().map(AlarmSummary::from),
    }
}

/// Synthesize with the built-in layout.
pub fn synthesize<Tz, R>(timestamp: &DateTime<Tz>, rng: &mut R) -> Snapshot
where
    Tz: TimeZone,
    R: Rng + ?Sized,
{
    Synthesizer::default().synthesize(timestamp, rng)
}

/// Synthesize with the built-in layout and a seeded `StdRng`.
pub fn synthesize_seeded<Tz: TimeZone>(timestamp: &DateTime<Tz>, seed: u64) -> Snapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    synthesize(timestamp, &mut rng)
}

/// Synthesize for the current time with a fresh, entropy-seeded source.
pub fn synthesize_now() -> Snapshot {
    let mut rng = StdRng::from_entropy();
    synthesize(&now_in_factory_zone(), &mut rng)
}
