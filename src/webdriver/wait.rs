// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Explicit waits: poll a condition until it holds or time runs out.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use super::client::{ElementId, Locator, WebDriverSession};
use crate::error::ProtocolError;

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// A bounded, non-busy poll loop over page conditions.
///
/// Probes that fail because an element is missing or went stale are
/// retried; any other error ends the wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    timeout: Duration,
    interval: Duration,
}

impl Wait {
    /// Default pause between probes.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

    /// Creates a wait bounded by `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            interval: Self::DEFAULT_INTERVAL,
        }
    }

    /// Sets the pause between probes.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Polls `probe` until it yields a value.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] naming `what` if the bound elapses,
    /// or the first non-transient probe error.
    pub async fn until<T, F, Fut>(&self, what: &str, mut probe: F) -> Result<T, ProtocolError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Option<T>, ProtocolError>>,
    {
        let now = Instant::now();
        // Unbounded waits saturate instead of overflowing the clock.
        let end = now
            .checked_add(self.timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);

        loop {
            match probe().await {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(e) if e.is_missing_element() => {
                    tracing::trace!(what, error = %e, "Element not ready yet");
                }
                Err(e) => return Err(e),
            }

            let now = Instant::now();
            if now >= end {
                return Err(ProtocolError::Timeout {
                    what: what.to_string(),
                    after: self.timeout,
                });
            }
            tokio::time::sleep((end - now).min(self.interval)).await;
        }
    }

    /// Waits until an element matching `locator` exists.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] if none appears in time.
    pub async fn for_present(
        &self,
        session: &WebDriverSession,
        locator: &Locator,
    ) -> Result<ElementId, ProtocolError> {
        self.until(&locator.to_string(), move || async move {
            Ok(session.find_elements(locator).await?.into_iter().next())
        })
        .await
    }

    /// Waits until an element matching `locator` is displayed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] if none becomes visible in time.
    pub async fn for_visible(
        &self,
        session: &WebDriverSession,
        locator: &Locator,
    ) -> Result<ElementId, ProtocolError> {
        self.until(&locator.to_string(), move || async move {
            let element = session.find_first(locator).await?;
            Ok(session.is_displayed(&element).await?.then_some(element))
        })
        .await
    }

    /// Waits until an element matching `locator` is displayed and enabled.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] if none becomes clickable in time.
    pub async fn for_clickable(
        &self,
        session: &WebDriverSession,
        locator: &Locator,
    ) -> Result<ElementId, ProtocolError> {
        self.until(&locator.to_string(), move || async move {
            let element = session.find_first(locator).await?;
            let clickable =
                session.is_displayed(&element).await? && session.is_enabled(&element).await?;
            Ok(clickable.then_some(element))
        })
        .await
    }

    /// Waits until the first element matching `locator` is gone or hidden.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Timeout`] if it stays visible.
    pub async fn for_invisible(
        &self,
        session: &WebDriverSession,
        locator: &Locator,
    ) -> Result<(), ProtocolError> {
        let what = format!("{locator} to disappear");
        self.until(&what, move || async move {
            let Some(element) = session.find_elements(locator).await?.into_iter().next() else {
                return Ok(Some(()));
            };
            match session.is_displayed(&element).await {
                Ok(displayed) => Ok((!displayed).then_some(())),
                // Removed between the lookup and the check.
                Err(e) if e.is_missing_element() => Ok(Some(())),
                Err(e) => Err(e),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn until_returns_first_value() {
        let calls = &AtomicU32::new(0);
        let wait = Wait::new(Duration::from_secs(5));

        let value = wait
            .until("third probe", move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok((n == 3).then_some(n))
            })
            .await
            .unwrap();

        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn until_times_out_at_bound() {
        let wait = Wait::new(Duration::from_millis(1200)).with_interval(Duration::from_millis(500));
        let start = Instant::now();

        let err = wait
            .until("never", || async { Ok::<Option<()>, _>(None) })
            .await
            .unwrap_err();

        assert_eq!(start.elapsed(), Duration::from_millis(1200));
        assert!(matches!(err, ProtocolError::Timeout { ref what, .. } if what == "never"));
    }

    #[tokio::test(start_paused = true)]
    async fn until_retries_missing_elements() {
        let calls = &AtomicU32::new(0);
        let wait = Wait::new(Duration::from_secs(5));

        let value = wait
            .until("element", move || async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ProtocolError::WebDriver {
                        error: "stale element reference".to_string(),
                        message: "gone".to_string(),
                    })
                } else {
                    Ok(Some("found"))
                }
            })
            .await
            .unwrap();

        assert_eq!(value, "found");
    }

    #[tokio::test(start_paused = true)]
    async fn until_accepts_unbounded_timeout() {
        let calls = &AtomicU32::new(0);
        let wait = Wait::new(Duration::MAX).with_interval(Duration::from_millis(10));

        let value = wait
            .until("second probe", move || async move {
                Ok((calls.fetch_add(1, Ordering::SeqCst) == 1).then_some("ready"))
            })
            .await
            .unwrap();

        assert_eq!(value, "ready");
    }

    #[tokio::test(start_paused = true)]
    async fn until_stops_on_hard_errors() {
        let wait = Wait::new(Duration::from_secs(5));

        let err = wait
            .until("element", || async {
                Err::<Option<()>, _>(ProtocolError::InvalidResponse("boom".to_string()))
            })
            .await
            .unwrap_err();

        assert!(matches!(err, ProtocolError::InvalidResponse(_)));
    }
}
