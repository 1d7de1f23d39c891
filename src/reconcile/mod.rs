// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Idempotent toggle-with-verification.
//!
//! [`ToggleReconciler::reconcile`] compares a control's state with the
//! desired one and only clicks when they differ, then polls until the
//! dashboard reflects the change or a deadline passes.
//!
//! ```text
//! Located -> StateRead -> AlreadyMatching
//!                      -> Invoked -> Converged
//!                                 -> InterceptedRetry -> Invoked
//!                                 -> TimedOut
//!                                 -> Errored
//! ```

mod outcome;
mod reconciler;

use std::time::Duration;

pub use outcome::{Outcome, OutcomeResponse, ReconcileError};
pub use reconciler::ToggleReconciler;

/// Default time allowed for the dashboard to reflect a change.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(60);

/// Polling and retry timing for a [`ToggleReconciler`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use smarteefi_ctl::reconcile::ReconcileTiming;
///
/// let timing = ReconcileTiming::new()
///     .with_poll_interval(Duration::from_millis(250))
///     .with_intercept_grace(Duration::from_secs(2));
///
/// assert_eq!(timing.poll_interval(), Duration::from_millis(250));
/// assert_eq!(timing.intercept_grace(), Duration::from_secs(2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileTiming {
    poll_interval: Duration,
    intercept_grace: Duration,
}

impl ReconcileTiming {
    /// Default pause between state reads while waiting for convergence.
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
    /// Default pause before retrying an intercepted click.
    pub const DEFAULT_INTERCEPT_GRACE: Duration = Duration::from_secs(5);

    /// Creates the default timing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            intercept_grace: Self::DEFAULT_INTERCEPT_GRACE,
        }
    }

    /// Sets the pause between state reads.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the pause before retrying an intercepted click.
    #[must_use]
    pub const fn with_intercept_grace(mut self, grace: Duration) -> Self {
        self.intercept_grace = grace;
        self
    }

    /// Returns the pause between state reads.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Returns the pause before retrying an intercepted click.
    #[must_use]
    pub const fn intercept_grace(&self) -> Duration {
        self.intercept_grace
    }
}

impl Default for ReconcileTiming {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_defaults() {
        let timing = ReconcileTiming::default();
        assert_eq!(timing.poll_interval(), Duration::from_millis(500));
        assert_eq!(timing.intercept_grace(), Duration::from_secs(5));
    }
}
