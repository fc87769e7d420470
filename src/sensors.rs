// Demodata - Sensor synthesizer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Temperature, power and vibration readings conditioned on status and
//! alarm.

use crate::alarm::{AlarmCode, AlarmEvent};
use crate::profile::LineProfile;
use crate::status::MachineStatus;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shop-floor ambient temperature in °C.
pub const AMBIENT_TEMPERATURE_C: f64 = 25.0;

/// Idle power as a share of the nominal range: `[min * 0.2, max * 0.4]`.
pub const IDLE_POWER_SHARE: (f64, f64) = (0.2, 0.4);

/// Idle vibration range.
pub const IDLE_VIBRATION: (f64, f64) = (0.0, 0.03);

/// Over-temperature alarm: degrees above nominal max.
pub const OVER_TEMP_OFFSET_C: (f64, f64) = (5.0, 10.0);

/// High-vibration alarm range.
pub const ALARM_VIBRATION: (f64, f64) = (0.3, 0.6);

/// Machine-fault alarm: multiple of nominal max power.
pub const FAULT_POWER_FACTOR: (f64, f64) = (1.3, 1.8);

/// Sensor readings for one machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReadings {
    #[serde(rename = "temperatureC")]
    pub temperature_c: f64,
    #[serde(rename = "powerW")]
    pub power_w: f64,
    pub vibration: f64,
}

/// Uniform draw in `[lo, hi)`; returns `lo` when the bounds coincide.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.gen::<f64>()
}

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

/// Draw the readings of one machine.
///
/// Draws three baseline values (temperature, power, vibration), then at
/// most one override for a sensor-affecting alarm.
pub fn synthesize_sensors<R: Rng + ?Sized>(
    rng: &mut R,
    line: &LineProfile,
    status: MachineStatus,
    alarm: Option<&AlarmEvent>,
) -> SensorReadings {
    let temp = line.temperature_c;
    let power = line.power_w;
    let vib = line.vibration;

    let (mut temperature_c, mut power_w, mut vibration) = if status == MachineStatus::Run {
        (
            uniform(rng, temp.min, temp.max),
            uniform(rng, power.min, power.max),
            uniform(rng, vib.min, vib.max),
        )
    } else {
        (
            uniform(rng, AMBIENT_TEMPERATURE_C, temp.min),
            uniform(
                rng,
                power.min * IDLE_POWER_SHARE.0,
                power.max * IDLE_POWER_SHARE.1,
            ),
            uniform(rng, IDLE_VIBRATION.0, IDLE_VIBRATION.1),
        )
    };

    match alarm.map(|a| a.code) {
        Some(AlarmCode::T001) => {
            temperature_c = uniform(
                rng,
                temp.max + OVER_TEMP_OFFSET_C.0,
                temp.max + OVER_TEMP_OFFSET_C.1,
            );
        }
        Some(AlarmCode::V001) => {
            vibration = uniform(rng, ALARM_VIBRATION.0, ALARM_VIBRATION.1);
        }
        Some(AlarmCode::M001) => {
            power_w = uniform(
                rng,
                power.max * FAULT_POWER_FACTOR.0,
                power.max * FAULT_POWER_FACTOR.1,
            );
        }
        Some(AlarmCode::Q001) | Some(AlarmCode::Q002) | None => {}
    }

    SensorReadings {
        temperature_c: round_to(temperature_c, 2),
        power_w: round_to(power_w, 1),
        vibration: round_to(vibration, 3),
    }
}
