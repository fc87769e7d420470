// Demodata Sender - Error types
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

use std::path::PathBuf;
use thiserror::Error;

/// Transport configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file at the resolved path
    #[error("configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file exists but could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid configuration document
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Endpoint is not an absolute http(s) URL
    #[error("invalid endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Unknown HTTP method
    #[error("invalid HTTP method {0:?}")]
    InvalidMethod(String),

    /// Header name or value not representable in HTTP
    #[error("invalid header {0:?}")]
    InvalidHeader(String),
}

/// A single delivery attempt failed
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, timeout or protocol failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport could not be built from its configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Endpoint unreachable for another reason
    #[error("endpoint unavailable: {0}")]
    Unavailable(String),
}

/// Delivery of one snapshot failed
#[derive(Debug, Error)]
pub enum SendError {
    /// Snapshot could not be serialized
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Every attempt failed
    #[error("delivery failed after {attempts} attempt(s): {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: TransportError,
    },
}

impl SendError {
    /// Number of attempts made before giving up, if any were made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Serialize(_) => 0,
            Self::RetriesExhausted { attempts, .. } => *attempts,
        }
    }
}
