// Demodata - Factory telemetry synthesizer
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Error types for demodata
//!
//! Synthesis itself cannot fail. The only errors are raised while loading
//! or validating the static factory layout.

use thiserror::Error;

/// Result type alias for layout operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Static configuration rejected at construction time
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A min/max range is empty, inverted or not finite
    #[error("Invalid range for {field} on line {line_id}: min {min}, max {max}")]
    InvalidRange {
        line_id: String,
        field: &'static str,
        min: f64,
        max: f64,
    },

    /// Defect rate outside [0, 1]
    #[error("Defect rate {rate} on line {line_id} is not a probability")]
    InvalidDefectRate { line_id: String, rate: f64 },

    /// Nominal minimum temperature below ambient
    #[error("Line {line_id}: nominal minimum temperature {min} is below ambient {ambient}")]
    BelowAmbient {
        line_id: String,
        min: f64,
        ambient: f64,
    },

    /// Layout has no lines or no machines
    #[error("Layout has no {0}")]
    Empty(&'static str),

    /// Empty identifier
    #[error("Empty {0} identifier")]
    EmptyId(&'static str),

    /// Identifier appears twice
    #[error("Duplicate {kind} identifier: {id}")]
    DuplicateId { kind: &'static str, id: String },

    /// Refill machine that does not exist in the layout
    #[error("Refill machine {0} is not part of the layout")]
    UnknownRefillMachine(String),

    /// IO error while reading a layout file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed layout JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
