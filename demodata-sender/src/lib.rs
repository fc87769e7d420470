// Demodata Sender - Snapshot delivery
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Demodata Sender
//!
//! Delivers synthesized telemetry snapshots to an ingestion endpoint.
//!
//! - [`config`]: transport configuration file and its lookup
//! - [`retry`]: bounded retry with a delay schedule
//! - [`transport`]: the HTTP transport and the sender built on it
//!
//! ```ignore
//! use demodata_sender::{HttpTransport, Sender, TransportConfig};
//!
//! let config = TransportConfig::load("arc.json")?;
//! let sender = Sender::new(HttpTransport::new(&config)?);
//! let report = sender.send_snapshot(&demodata::synthesize_now())?;
//! println!("{} after {} attempt(s)", report.response, report.attempts);
//! ```

pub mod config;
pub mod error;
pub mod retry;
pub mod transport;

pub use config::{resolve_config_path, TransportConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};
pub use error::{ConfigError, SendError, TransportError};
pub use retry::{with_retry, with_retry_metrics, RetryResult, RetryStrategy};
pub use transport::{HttpTransport, SendReport, Sender, Transport};
