// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request deadlines and the deadlock retry policy.

use num_traits::ToPrimitive;
use std::time::{Duration, Instant};
use tracing::warn;

use crate::error::PersistenceError;

/// Budget applied when a caller does not choose one.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Sleeps between attempts after a deadlock; one retry per entry.
pub const DEADLOCK_BACKOFF: [Duration; 3] = [
    Duration::from_millis(10),
    Duration::from_millis(40),
    Duration::from_millis(160),
];

/// Absolute point in time by which a request must finish.
///
/// Passed explicitly alongside every repository call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    /// A deadline `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Instant::now() + budget,
        }
    }

    /// A deadline of [`DEFAULT_REQUEST_TIMEOUT`] from now.
    #[must_use]
    pub fn default_request() -> Self {
        Self::after(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Time left, saturating at zero.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Time left in whole milliseconds, at least 1 while not expired.
    #[must_use]
    pub fn remaining_millis(&self) -> u64 {
        self.remaining().as_millis().to_u64().unwrap_or(u64::MAX).max(1)
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }

    /// Fails with a timeout once the deadline has passed.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Timeout` naming `operation`.
    pub fn check(&self, operation: &str) -> Result<(), PersistenceError> {
        if self.is_expired() {
            Err(PersistenceError::Timeout(format!(
                "request deadline expired before {operation}"
            )))
        } else {
            Ok(())
        }
    }
}

/// Runs `attempt`, re-running it after each deadlock with the
/// [`DEADLOCK_BACKOFF`] schedule.
///
/// Every attempt must be a complete transaction so that a retry starts from
/// committed state. The deadline is checked before each attempt and bounds
/// each sleep.
///
/// # Errors
///
/// Returns the last deadlock once the schedule is exhausted, a timeout when
/// the deadline passes first, or any non-retryable error immediately.
pub fn with_deadlock_retry<T, F>(
    operation: &str,
    deadline: &Deadline,
    mut attempt: F,
) -> Result<T, PersistenceError>
where
    F: FnMut() -> Result<T, PersistenceError>,
{
    let mut backoff = DEADLOCK_BACKOFF.iter();
    loop {
        deadline.check(operation)?;
        match attempt() {
            Err(err) if err.is_retryable() => {
                let Some(delay) = backoff.next() else {
                    return Err(err);
                };
                let delay: Duration = (*delay).min(deadline.remaining());
                warn!(
                    operation,
                    error = %err,
                    delay_ms = delay.as_millis().to_u64().unwrap_or(u64::MAX),
                    "Transaction deadlocked, retrying"
                );
                std::thread::sleep(delay);
            }
            result => return result,
        }
    }
}
