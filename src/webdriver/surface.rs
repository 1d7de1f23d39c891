// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! [`ControlSurface`] backed by a dashboard tab in a WebDriver session.

use std::time::Duration;

use serde_json::json;

use super::client::{ElementId, Locator, WebDriverSession, xpath_literal};
use super::wait::Wait;
use crate::error::{ProtocolError, SurfaceError};
use crate::surface::ControlSurface;
use crate::types::{Control, ToggleState};

const SCROLL_INTO_VIEW: &str =
    "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});";
const READ_HIDDEN_INPUT: &str = "var elem = arguments[0].querySelector('input[name=\"' + arguments[1] + '\"]'); \
     return elem ? elem.value : null;";
const CLICK: &str = "arguments[0].click();";

/// Selector for the dashboard's modal backdrop.
pub const OVERLAY_SELECTOR: &str = "ion-backdrop";

/// Timing for [`WebDriverSurface`].
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use smarteefi_ctl::webdriver::SurfaceConfig;
///
/// let config = SurfaceConfig::new()
///     .with_wait_timeout(Duration::from_secs(20))
///     .with_settle_delay(Duration::ZERO);
/// assert_eq!(config.wait_timeout(), Duration::from_secs(20));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceConfig {
    wait_timeout: Duration,
    settle_delay: Duration,
    poll_interval: Duration,
}

impl SurfaceConfig {
    /// Default bound for overlay waits.
    pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);
    /// Default pause after scrolling and after moving the pointer.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(1);

    /// Creates the default configuration.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            wait_timeout: Self::DEFAULT_WAIT_TIMEOUT,
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
            poll_interval: Wait::DEFAULT_INTERVAL,
        }
    }

    /// Sets the overlay wait bound.
    #[must_use]
    pub const fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Sets the pause after scrolling and pointer moves.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Sets the overlay poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Returns the overlay wait bound.
    #[must_use]
    pub const fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// Returns the settle delay.
    #[must_use]
    pub const fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    fn wait(&self) -> Wait {
        Wait::new(self.wait_timeout).with_interval(self.poll_interval)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A located `ion-toggle` and the hidden input that carries its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleHandle {
    element: ElementId,
    state_key: String,
}

impl ToggleHandle {
    /// Returns the toggle element.
    #[must_use]
    pub fn element(&self) -> &ElementId {
        &self.element
    }
}

/// Dashboard page driven through WebDriver.
#[derive(Debug)]
pub struct WebDriverSurface {
    session: WebDriverSession,
    config: SurfaceConfig,
}

impl WebDriverSurface {
    /// Wraps a session that already shows the dashboard.
    #[must_use]
    pub fn new(session: WebDriverSession, config: SurfaceConfig) -> Self {
        Self { session, config }
    }

    /// Returns the underlying session.
    #[must_use]
    pub fn session(&self) -> &WebDriverSession {
        &self.session
    }

    /// Returns the locator for the toggle next to `label`.
    #[must_use]
    pub fn toggle_locator(label: &str) -> Locator {
        Locator::xpath(format!(
            "//ion-item[ion-label/h2[contains(text(), {})]]//ion-toggle",
            xpath_literal(label)
        ))
    }

    async fn settle(&self) {
        if !self.config.settle_delay.is_zero() {
            tokio::time::sleep(self.config.settle_delay).await;
        }
    }

    async fn wait_for_overlay(&self) -> Result<(), SurfaceError> {
        let overlay = Locator::css(OVERLAY_SELECTOR);
        match self.config.wait().for_invisible(&self.session, &overlay).await {
            Ok(()) => Ok(()),
            Err(ProtocolError::Timeout { after, .. }) => Err(SurfaceError::OverlayPersisted(after)),
            Err(e) => Err(e.into()),
        }
    }
}

impl ControlSurface for WebDriverSurface {
    type Handle = ToggleHandle;

    async fn locate(&self, control: &Control) -> Result<ToggleHandle, SurfaceError> {
        let mut found = self
            .session
            .find_elements(&Self::toggle_locator(control.label()))
            .await?;

        tracing::debug!(label = control.label(), count = found.len(), "Looked up toggle");

        if found.len() > 1 {
            return Err(SurfaceError::Ambiguous {
                label: control.label().to_string(),
                count: found.len(),
            });
        }
        let element = found.pop().ok_or_else(|| SurfaceError::NotFound {
            label: control.label().to_string(),
        })?;

        self.session
            .execute(SCROLL_INTO_VIEW, vec![element.to_json()])
            .await?;
        self.settle().await;

        self.session.move_to(&element).await?;
        self.settle().await;

        self.wait_for_overlay().await?;

        Ok(ToggleHandle {
            element,
            state_key: control.state_key().to_string(),
        })
    }

    async fn is_interactable(&self, handle: &ToggleHandle) -> Result<bool, SurfaceError> {
        let displayed = self.session.is_displayed(&handle.element).await?;
        Ok(displayed && self.session.is_enabled(&handle.element).await?)
    }

    async fn read_state(&self, handle: &ToggleHandle) -> Result<ToggleState, SurfaceError> {
        let raw = self
            .session
            .execute(
                READ_HIDDEN_INPUT,
                vec![handle.element.to_json(), json!(handle.state_key)],
            )
            .await?;

        Ok(ToggleState::from_sentinel(raw.as_str()))
    }

    async fn invoke(&self, handle: &ToggleHandle) -> Result<(), SurfaceError> {
        self.session
            .execute(CLICK, vec![handle.element.to_json()])
            .await
            .map(drop)
            .map_err(SurfaceError::from_action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_locator_embeds_label() {
        assert_eq!(
            WebDriverSurface::toggle_locator("Switch-1"),
            Locator::xpath("//ion-item[ion-label/h2[contains(text(), 'Switch-1')]]//ion-toggle")
        );
    }

    #[test]
    fn surface_config_defaults() {
        let config = SurfaceConfig::default();
        assert_eq!(config.wait_timeout(), Duration::from_secs(60));
        assert_eq!(config.settle_delay(), Duration::from_secs(1));
    }
}
