// Demodata - Snapshot records
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Output records. Field names are the downstream wire contract.

use crate::alarm::{AlarmCode, AlarmEvent};
use crate::sensors::SensorReadings;
use crate::status::{MachineStatus, Reason};
use chrono::{DateTime, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize, Serializer};

/// Snapshot schema version.
pub const SCHEMA_VERSION: &str = "1.0";

/// Alarm as emitted in a machine record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmSummary {
    pub alarm_code: AlarmCode,
    pub severity: u8,
}

impl From<&AlarmEvent> for AlarmSummary {
    fn from(event: &AlarmEvent) -> Self {
        Self {
            alarm_code: event.code,
            severity: event.severity,
        }
    }
}

/// Per-machine output for one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineRecord {
    /// `{lineId}-{machineId}`.
    pub machine_id: String,
    pub status: MachineStatus,
    pub reason: Reason,
    pub good_count_delta: u64,
    pub ng_count_delta: u64,
    pub run_time_sec_delta: u32,
    pub idle_time_sec_delta: u32,
    pub stop_time_sec_delta: u32,
    /// Present only while running; serialized as `null` otherwise.
    pub cycle_time_ms: Option<u32>,
    pub sensors: SensorReadings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm: Option<AlarmSummary>,
}

impl MachineRecord {
    /// Sum of the three time buckets.
    pub fn accounted_time_sec(&self) -> u32 {
        self.run_time_sec_delta + self.idle_time_sec_delta + self.stop_time_sec_delta
    }
}

/// One production line and its machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSnapshot {
    pub line_id: String,
    pub line_name: String,
    pub machines: Vec<MachineRecord>,
}

/// Top-level telemetry snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub schema_version: String,
    pub factory_id: String,
    #[serde(serialize_with = "serialize_ts")]
    pub ts: DateTime<FixedOffset>,
    pub interval_sec: u32,
    pub lines: Vec<LineSnapshot>,
}

/// RFC 3339 with numeric offset; fractional seconds only when present.
fn serialize_ts<S: Serializer>(ts: &DateTime<FixedOffset>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_ts(ts))
}

/// Format a timestamp the way snapshots carry it.
pub fn format_ts(ts: &DateTime<FixedOffset>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

impl Snapshot {
    /// Compact JSON. Non-ASCII text (line names) is emitted verbatim.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Indented JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Iterate over every machine record, line-major.
    pub fn machines(&self) -> impl Iterator<Item = &MachineRecord> {
        self.lines.iter().flat_map(|l| l.machines.iter())
    }

    /// Number of machine records.
    pub fn machine_count(&self) -> usize {
        self.lines.iter().map(|l| l.machines.len()).sum()
    }
}
