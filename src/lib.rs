// Demodata - Factory telemetry synthesizer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Demodata
//!
//! Plausible factory-floor telemetry for exercising ingestion pipelines.
//!
//! Given a timestamp and a random source, the synthesizer produces one
//! JSON-serializable [`Snapshot`] covering an elapsed reporting interval:
//! three production lines, six machines each, every machine reporting its
//! status, production counters, sensor readings and, occasionally, an
//! alarm.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::TimeZone;
//! use demodata::{factory_offset, synthesize_seeded, MachineStatus, Reason};
//!
//! // 12:05 in the factory time zone is the lunch break
//! let ts = factory_offset().with_ymd_and_hms(2024, 5, 1, 12, 5, 0).unwrap();
//! let snapshot = synthesize_seeded(&ts, 42);
//!
//! for machine in snapshot.machines() {
//!     assert_eq!(machine.status, MachineStatus::Idle);
//!     assert_eq!(machine.reason, Reason::LunchBreak);
//! }
//!
//! let json = snapshot.to_json().unwrap();
//! assert!(json.contains("\"factoryId\":\"F001\""));
//! ```
//!
//! ## Reproducibility
//!
//! Every draw comes from the caller's random source in a fixed order
//! (interval first, then line-major / machine-minor), so the same
//! timestamp and seed always reproduce the same snapshot. The daily
//! material-refill window is derived from a hash of the date and machine
//! id and ignores the caller's source entirely.
//!
//! ## Modules
//!
//! - [`shift`]: Time-of-day regimes and refill windows
//! - [`status`]: Reporting interval and status selection
//! - [`alarm`]: Alarm events
//! - [`production`]: Time accounting and unit counters
//! - [`sensors`]: Sensor readings
//! - [`snapshot`]: Output records
//! - [`synth`]: Top-level synthesis
//! - [`profile`]: Static factory layout

pub mod alarm;
pub mod error;
pub mod production;
pub mod profile;
pub mod sensors;
pub mod shift;
pub mod snapshot;
pub mod status;
pub mod synth;
pub mod weighted;

// Re-exports for convenience
pub use alarm::{AlarmCode, AlarmEvent};
pub use error::{ConfigError, Result};
pub use production::{ProductionCounts, TimeDeltas};
pub use profile::{FactoryLayout, LineProfile, Range};
pub use sensors::SensorReadings;
pub use shift::{classify, factory_offset, refill_window, Regime, RefillWindow, FACTORY_TIMEZONE};
pub use snapshot::{AlarmSummary, LineSnapshot, MachineRecord, Snapshot, SCHEMA_VERSION};
pub use status::{MachineStatus, Reason};
pub use synth::{now_in_factory_zone, synthesize, synthesize_now, synthesize_seeded, Synthesizer};
pub use weighted::WeightedTable;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
