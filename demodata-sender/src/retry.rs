// Demodata Sender - Retry logic
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Bounded retry with back-off between attempts.

use std::fmt::Display;
use std::time::{Duration, Instant};
use tracing::warn;

/// Base delays of the default delivery policy.
pub const DEFAULT_SCHEDULE: [Duration; 3] = [
    Duration::from_millis(500),
    Duration::from_millis(1000),
    Duration::from_millis(2000),
];

/// Extra delay added per retry by the default delivery policy.
pub const DEFAULT_STEP: Duration = Duration::from_millis(100);

/// Attempts made by the default delivery policy.
pub const DEFAULT_ATTEMPTS: u32 = 3;

/// Retry strategy for operations
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RetryStrategy {
    /// No retries
    #[default]
    None,
    /// Fixed number of retries with constant delay
    Fixed {
        /// Maximum number of retry attempts
        max_retries: u32,
        /// Delay between retries
        delay: Duration,
    },
    /// Exponential backoff
    ExponentialBackoff {
        /// Maximum number of retry attempts
        max_retries: u32,
        /// Initial delay
        initial_delay: Duration,
        /// Maximum delay
        max_delay: Duration,
        /// Multiplier for each attempt
        multiplier: f64,
    },
    /// Explicit delay table plus a per-retry step.
    ///
    /// Retry `n` (0-indexed) waits `delays[n] + step * (n + 1)`; past the
    /// end of the table the last delay is reused.
    Schedule {
        /// Maximum number of retry attempts
        max_retries: u32,
        /// Base delay per retry
        delays: Vec<Duration>,
        /// Added once per retry number
        step: Duration,
    },
}

impl RetryStrategy {
    /// Calculate delay for a given retry number (0-indexed)
    ///
    /// Returns None if no more retries should be attempted
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries() {
            return None;
        }
        match self {
            Self::None => None,
            Self::Fixed { delay, .. } => Some(*delay),
            Self::ExponentialBackoff {
                initial_delay,
                max_delay,
                multiplier,
                ..
            } => {
                let delay_ms = initial_delay.as_millis() as f64 * multiplier.powi(attempt as i32);
                let delay = Duration::from_millis(delay_ms as u64);
                Some(delay.min(*max_delay))
            }
            Self::Schedule { delays, step, .. } => {
                let base = delays
                    .get(attempt as usize)
                    .or_else(|| delays.last())
                    .copied()
                    .unwrap_or(Duration::ZERO);
                Some(base + *step * (attempt + 1))
            }
        }
    }

    /// Get maximum number of retries
    pub fn max_retries(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Fixed { max_retries, .. }
            | Self::ExponentialBackoff { max_retries, .. }
            | Self::Schedule { max_retries, .. } => *max_retries,
        }
    }

    /// Total number of attempts, the first one included
    pub fn max_attempts(&self) -> u32 {
        self.max_retries() + 1
    }

    /// Create a fixed retry strategy
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self::Fixed { max_retries, delay }
    }

    /// Create an exponential backoff strategy
    pub fn exponential(max_retries: u32, initial_delay: Duration) -> Self {
        Self::ExponentialBackoff {
            max_retries,
            initial_delay,
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }

    /// Delivery policy: `attempts` tries separated by 0.6 s, 1.2 s, 2.3 s, ...
    ///
    /// `attempts` below 1 is treated as 1.
    pub fn delivery(attempts: u32) -> Self {
        Self::Schedule {
            max_retries: attempts.max(1) - 1,
            delays: DEFAULT_SCHEDULE.to_vec(),
            step: DEFAULT_STEP,
        }
    }
}

/// Execute an operation with retry logic
///
/// Retries the operation according to the strategy, sleeping between
/// attempts and logging each failure that will be retried.
///
/// # Example
///
/// ```
/// use demodata_sender::retry::{with_retry, RetryStrategy};
/// use std::time::Duration;
///
/// let strategy = RetryStrategy::fixed(3, Duration::ZERO);
/// let mut calls = 0;
/// let result = with_retry(&strategy, || {
///     calls += 1;
///     if calls < 3 { Err("busy") } else { Ok(calls) }
/// });
/// assert_eq!(result, Ok(3));
/// ```
pub fn with_retry<T, E, F>(strategy: &RetryStrategy, operation: F) -> Result<T, E>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    with_retry_metrics(strategy, operation)
        .map(|result| result.value)
        .map_err(|(error, _)| error)
}

/// Result of a retry operation with metrics
#[derive(Debug, Clone)]
pub struct RetryResult<T> {
    /// The result value
    pub value: T,
    /// Number of attempts made
    pub attempts: u32,
    /// Total time spent, back-off included
    pub total_duration: Duration,
}

/// Execute an operation with retry logic and return metrics
///
/// On failure the last error is returned with the number of attempts made.
pub fn with_retry_metrics<T, E, F>(
    strategy: &RetryStrategy,
    mut operation: F,
) -> Result<RetryResult<T>, (E, u32)>
where
    E: Display,
    F: FnMut() -> Result<T, E>,
{
    let start = Instant::now();
    let mut attempt = 0;
    loop {
        match operation() {
            Ok(value) => {
                return Ok(RetryResult {
                    value,
                    attempts: attempt + 1,
                    total_duration: start.elapsed(),
                })
            }
            Err(e) => match strategy.delay_for_attempt(attempt) {
                Some(delay) => {
                    warn!(
                        attempt = attempt + 1,
                        "Send failed, retrying in {:.2}s: {}",
                        delay.as_secs_f64(),
                        e
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                None => return Err((e, attempt + 1)),
            },
        }
    }
}
