// Demodata - Factory layout
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Static factory layout: production lines, machines and their nominal
//! operating envelopes.
//!
//! The layout is built once (either [`FactoryLayout::builtin`] or loaded
//! from JSON) and validated before any synthesis runs. Synthesis never
//! mutates it.

use crate::error::{ConfigError, Result};
use crate::sensors::AMBIENT_TEMPERATURE_C;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Default factory identifier.
pub const DEFAULT_FACTORY_ID: &str = "F001";

/// Inclusive min/max range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range<T> {
    /// Lower bound.
    pub min: T,
    /// Upper bound.
    pub max: T,
}

impl<T: Copy + PartialOrd + Into<f64>> Range<T> {
    /// Create a new range.
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Check whether a value lies within the range.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Width of the range.
    pub fn span(&self) -> f64 {
        self.max.into() - self.min.into()
    }

    /// Reject empty, inverted or non-finite ranges.
    pub fn validate(&self, line_id: &str, field: &'static str) -> Result<()> {
        let (min, max) = (self.min.into(), self.max.into());
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(ConfigError::InvalidRange {
                line_id: line_id.to_string(),
                field,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// Nominal operating envelope of one production line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProfile {
    /// Line identifier (e.g. "L1").
    pub line_id: String,
    /// Display name.
    pub line_name: String,
    /// Cycle time per unit in milliseconds.
    pub cycle_time_ms: Range<u32>,
    /// Probability that one produced unit is defective.
    pub defect_rate: f64,
    /// Operating temperature in °C.
    pub temperature_c: Range<f64>,
    /// Operating power draw in W.
    pub power_w: Range<f64>,
    /// Operating vibration (unitless).
    pub vibration: Range<f64>,
}

impl LineProfile {
    /// Check every range and the defect rate.
    pub fn validate(&self) -> Result<()> {
        let id = self.line_id.as_str();
        if id.is_empty() {
            return Err(ConfigError::EmptyId("line"));
        }

        self.cycle_time_ms.validate(id, "cycleTimeMs")?;
        if self.cycle_time_ms.min == 0 {
            return Err(ConfigError::InvalidRange {
                line_id: id.to_string(),
                field: "cycleTimeMs",
                min: 0.0,
                max: self.cycle_time_ms.max.into(),
            });
        }

        if !(0.0..=1.0).contains(&self.defect_rate) {
            return Err(ConfigError::InvalidDefectRate {
                line_id: id.to_string(),
                rate: self.defect_rate,
            });
        }

        self.temperature_c.validate(id, "temperatureC")?;
        if self.temperature_c.min < AMBIENT_TEMPERATURE_C {
            return Err(ConfigError::BelowAmbient {
                line_id: id.to_string(),
                min: self.temperature_c.min,
                ambient: AMBIENT_TEMPERATURE_C,
            });
        }

        self.power_w.validate(id, "powerW")?;
        self.vibration.validate(id, "vibration")?;
        for (field, range) in [("powerW", &self.power_w), ("vibration", &self.vibration)] {
            if range.min < 0.0 {
                return Err(ConfigError::InvalidRange {
                    line_id: id.to_string(),
                    field,
                    min: range.min,
                    max: range.max,
                });
            }
        }

        Ok(())
    }
}

/// Complete static description of the factory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactoryLayout {
    /// Factory identifier written into every snapshot.
    #[serde(default = "default_factory_id")]
    pub factory_id: String,
    /// Production lines in output order.
    pub lines: Vec<LineProfile>,
    /// Machine ids present on every line, in output order.
    #[serde(default = "default_machine_ids")]
    pub machine_ids: Vec<String>,
    /// Machines that stop for a daily material refill.
    #[serde(default = "default_refill_machines")]
    pub refill_machines: Vec<String>,
}

fn default_factory_id() -> String {
    DEFAULT_FACTORY_ID.to_string()
}

fn default_machine_ids() -> Vec<String> {
    (1..=6).map(|i| format!("M{:02}", i)).collect()
}

fn default_refill_machines() -> Vec<String> {
    vec!["M02".to_string(), "M03".to_string()]
}

impl Default for FactoryLayout {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FactoryLayout {
    /// The three-line, six-machine demo factory.
    pub fn builtin() -> Self {
        Self {
            factory_id: default_factory_id(),
            lines: vec![
                LineProfile {
                    line_id: "L1".to_string(),
                    line_name: "部品製造".to_string(),
                    cycle_time_ms: Range::new(2500, 3500),
                    defect_rate: 0.003,
                    temperature_c: Range::new(35.0, 45.0),
                    power_w: Range::new(700.0, 1200.0),
                    vibration: Range::new(0.05, 0.25),
                },
                LineProfile {
                    line_id: "L2".to_string(),
                    line_name: "組立".to_string(),
                    cycle_time_ms: Range::new(4500, 6500),
                    defect_rate: 0.008,
                    temperature_c: Range::new(30.0, 40.0),
                    power_w: Range::new(500.0, 900.0),
                    vibration: Range::new(0.05, 0.25),
                },
                LineProfile {
                    line_id: "L3".to_string(),
                    line_name: "検査".to_string(),
                    cycle_time_ms: Range::new(6000, 9000),
                    defect_rate: 0.012,
                    temperature_c: Range::new(28.0, 38.0),
                    power_w: Range::new(300.0, 600.0),
                    vibration: Range::new(0.05, 0.25),
                },
            ],
            machine_ids: default_machine_ids(),
            refill_machines: default_refill_machines(),
        }
    }

    /// Parse and validate a layout from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let layout: Self = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load and validate a layout from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Validate the whole layout.
    pub fn validate(&self) -> Result<()> {
        if self.factory_id.is_empty() {
            return Err(ConfigError::EmptyId("factory"));
        }
        if self.lines.is_empty() {
            return Err(ConfigError::Empty("lines"));
        }
        if self.machine_ids.is_empty() {
            return Err(ConfigError::Empty("machines"));
        }

        let mut seen = HashSet::new();
        for line in &self.lines {
            line.validate()?;
            if !seen.insert(line.line_id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    kind: "line",
                    id: line.line_id.clone(),
                });
            }
        }

        let mut seen = HashSet::new();
        for id in &self.machine_ids {
            if id.is_empty() {
                return Err(ConfigError::EmptyId("machine"));
            }
            if !seen.insert(id.as_str()) {
                return Err(ConfigError::DuplicateId {
                    kind: "machine",
                    id: id.clone(),
                });
            }
        }

        if let Some(unknown) = self
            .refill_machines
            .iter()
            .find(|id| !seen.contains(id.as_str()))
        {
            return Err(ConfigError::UnknownRefillMachine(unknown.clone()));
        }

        Ok(())
    }

    /// Whether a machine belongs to the daily refill subset.
    pub fn is_refill_machine(&self, machine_id: &str) -> bool {
        self.refill_machines.iter().any(|m| m == machine_id)
    }

    /// Total number of machines across all lines.
    pub fn machine_count(&self) -> usize {
        self.lines.len() * self.machine_ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let layout = FactoryLayout::builtin();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.lines.len(), 3);
        assert_eq!(layout.machine_ids, vec!["M01", "M02", "M03", "M04", "M05", "M06"]);
        assert_eq!(layout.machine_count(), 18);
    }

    #[test]
    fn test_refill_membership() {
        let layout = FactoryLayout::builtin();
        assert!(layout.is_refill_machine("M02"));
        assert!(layout.is_refill_machine("M03"));
        assert!(!layout.is_refill_machine("M01"));
    }

    #[test]
    fn test_range_validate() {
        assert!(Range::new(1.0, 2.0).validate("L1", "x").is_ok());
        assert!(Range::new(2.0, 2.0).validate("L1", "x").is_err());
        assert!(Range::new(3.0, 2.0).validate("L1", "x").is_err());
        assert!(Range::new(f64::NAN, 2.0).validate("L1", "x").is_err());
        assert!(Range::new(10u32, 20u32).validate("L1", "x").is_ok());
    }

    #[test]
    fn test_range_contains() {
        let r = Range::new(2500u32, 3500u32);
        assert!(r.contains(2500));
        assert!(r.contains(3500));
        assert!(!r.contains(3501));
        assert_eq!(r.span(), 1000.0);
    }

    #[test]
    fn test_rejects_inverted_temperature() {
        let mut layout = FactoryLayout::builtin();
        layout.lines[1].temperature_c = Range::new(40.0, 30.0);
        match layout.validate() {
            Err(ConfigError::InvalidRange { line_id, field, .. }) => {
                assert_eq!(line_id, "L2");
                assert_eq!(field, "temperatureC");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_below_ambient() {
        let mut layout = FactoryLayout::builtin();
        layout.lines[0].temperature_c = Range::new(20.0, 45.0);
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::BelowAmbient { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_defect_rate() {
        let mut layout = FactoryLayout::builtin();
        layout.lines[2].defect_rate = 1.5;
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::InvalidDefectRate { .. })
        ));
    }

    #[test]
    fn test_rejects_zero_cycle_time() {
        let mut layout = FactoryLayout::builtin();
        layout.lines[0].cycle_time_ms = Range::new(0, 100);
        assert!(layout.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicates() {
        let mut layout = FactoryLayout::builtin();
        layout.lines[1].line_id = "L1".to_string();
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::DuplicateId { kind: "line", .. })
        ));

        let mut layout = FactoryLayout::builtin();
        layout.machine_ids.push("M01".to_string());
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::DuplicateId { kind: "machine", .. })
        ));
    }

    #[test]
    fn test_rejects_unknown_refill_machine() {
        let mut layout = FactoryLayout::builtin();
        layout.refill_machines.push("M99".to_string());
        assert!(matches!(
            layout.validate(),
            Err(ConfigError::UnknownRefillMachine(id)) if id == "M99"
        ));
    }

    #[test]
    fn test_rejects_empty_layout() {
        let mut layout = FactoryLayout::builtin();
        layout.lines.clear();
        assert!(matches!(layout.validate(), Err(ConfigError::Empty("lines"))));
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "lines": [{
                "lineId": "LX",
                "lineName": "Test",
                "cycleTimeMs": {"min": 1000, "max": 2000},
                "defectRate": 0.01,
                "temperatureC": {"min": 30.0, "max": 40.0},
                "powerW": {"min": 100.0, "max": 200.0},
                "vibration": {"min": 0.05, "max": 0.25}
            }]
        }"#;

        let layout = FactoryLayout::from_json_str(json).unwrap();
        assert_eq!(layout.factory_id, "F001");
        assert_eq!(layout.machine_ids.len(), 6);
        assert_eq!(layout.refill_machines, vec!["M02", "M03"]);
        assert_eq!(layout.lines[0].cycle_time_ms, Range::new(1000, 2000));
    }

    #[test]
    fn test_json_rejects_invalid() {
        let json = r#"{
            "lines": [{
                "lineId": "LX",
                "lineName": "Test",
                "cycleTimeMs": {"min": 2000, "max": 1000},
                "defectRate": 0.01,
                "temperatureC": {"min": 30.0, "max": 40.0},
                "powerW": {"min": 100.0, "max": 200.0},
                "vibration": {"min": 0.05, "max": 0.25}
            }]
        }"#;

        assert!(FactoryLayout::from_json_str(json).is_err());
        assert!(matches!(
            FactoryLayout::from_json_str("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
