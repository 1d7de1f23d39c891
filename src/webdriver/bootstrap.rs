// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session bootstrap: log into the dashboard and pick the home.
//!
//! This runs once at startup. Failures are returned to the caller instead
//! of ending the process, after a best-effort attempt to close the browser.

use std::fmt;
use std::time::Duration;

use super::client::{Locator, WebDriverConfig, WebDriverSession, xpath_literal};
use super::surface::{OVERLAY_SELECTOR, SurfaceConfig, WebDriverSurface};
use super::wait::Wait;
use crate::error::{BootstrapError, BootstrapStage, ProtocolError};

const EMAIL_INPUT: &str = "//input[@placeholder='Enter your email']";
const PASSWORD_INPUT: &str = "//input[@placeholder='Enter your password']";
const LOGIN_SIGNUP_BUTTON: &str = "//ion-button[contains(., 'Login/Signup')]";
const LOGIN_BUTTON: &str = "//ion-button[contains(., 'Login') and not(contains(., 'Signup'))]";
const TAB_BAR: &str = "//ion-tab-bar";
const HOME_DROPDOWN: &str = "//ion-select";
const ALERT_WRAPPER: &str =
    "//div[contains(@class, 'alert-wrapper') and contains(@class, 'ion-overlay-wrapper')]";
const OKAY_BUTTON: &str = "//div[contains(@class, 'alert-wrapper')]//button/span[text()='Okay']";

/// Dashboard account credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the account email.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Where and how to log in.
///
/// # Examples
///
/// ```
/// use smarteefi_ctl::webdriver::{BootstrapConfig, Credentials};
///
/// let config = BootstrapConfig::new(Credentials::new("me@example.com", "secret"))
///     .with_site("Beach House");
/// assert_eq!(config.site(), "Beach House");
/// assert_eq!(config.login_url(), "https://smarteefi.web.app/login");
/// ```
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    credentials: Credentials,
    login_url: String,
    site: String,
    wait_timeout: Duration,
    settle_after_login: Duration,
}

impl BootstrapConfig {
    /// Dashboard login page.
    pub const DEFAULT_LOGIN_URL: &'static str = "https://smarteefi.web.app/login";
    /// Home selected after login.
    pub const DEFAULT_SITE: &'static str = "Nikoo";
    /// Bound for each wait during bootstrap.
    pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(60);
    /// Pause after the dashboard appears.
    pub const DEFAULT_SETTLE_AFTER_LOGIN: Duration = Duration::from_secs(5);

    /// Creates a configuration with default URL, site, and timing.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            login_url: Self::DEFAULT_LOGIN_URL.to_string(),
            site: Self::DEFAULT_SITE.to_string(),
            wait_timeout: Self::DEFAULT_WAIT_TIMEOUT,
            settle_after_login: Self::DEFAULT_SETTLE_AFTER_LOGIN,
        }
    }

    /// Sets the login page URL.
    #[must_use]
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into();
        self
    }

    /// Sets the home to select.
    #[must_use]
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    /// Sets the bound for each wait.
    #[must_use]
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    /// Sets the pause after the dashboard appears.
    #[must_use]
    pub fn with_settle_after_login(mut self, delay: Duration) -> Self {
        self.settle_after_login = delay;
        self
    }

    /// Returns the login page URL.
    #[must_use]
    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Returns the home to select.
    #[must_use]
    pub fn site(&self) -> &str {
        &self.site
    }

    fn wait(&self) -> Wait {
        Wait::new(self.wait_timeout)
    }
}

/// Opens a session, logs in, selects the home, and returns the ready surface.
///
/// # Errors
///
/// Returns a [`BootstrapError`] naming the stage that failed. The browser
/// session is closed before returning if it was opened.
pub async fn launch(
    webdriver: &WebDriverConfig,
    bootstrap: &BootstrapConfig,
    surface: SurfaceConfig,
) -> Result<WebDriverSurface, BootstrapError> {
    let session = webdriver
        .connect()
        .await
        .map_err(|e| BootstrapError::new(BootstrapStage::Session, e))?;

    if let Err(err) = prepare_dashboard(&session, bootstrap).await {
        tracing::error!(error = %err, "Bootstrap failed, closing browser");
        if let Err(close_err) = session.close().await {
            tracing::warn!(error = %close_err, "Failed to close WebDriver session");
        }
        return Err(err);
    }

    tracing::info!(site = bootstrap.site(), "Dashboard ready");
    Ok(WebDriverSurface::new(session, surface))
}

/// Logs in and selects the configured home on an open session.
///
/// # Errors
///
/// Returns a [`BootstrapError`] for the first failing stage.
pub async fn prepare_dashboard(
    session: &WebDriverSession,
    config: &BootstrapConfig,
) -> Result<(), BootstrapError> {
    login(session, config)
        .await
        .map_err(|e| BootstrapError::new(BootstrapStage::Login, e))?;
    select_site(session, config)
        .await
        .map_err(|e| BootstrapError::new(BootstrapStage::SiteSelection, e))
}

async fn login(session: &WebDriverSession, config: &BootstrapConfig) -> Result<(), ProtocolError> {
    let wait = config.wait();

    session.navigate(config.login_url()).await?;

    let email = wait
        .for_clickable(session, &Locator::xpath(EMAIL_INPUT))
        .await?;
    session.clear(&email).await?;
    session.send_keys(&email, &config.credentials.email).await?;
    tracing::debug!(email = config.credentials.email(), "Entered email");

    let next = session.find_first(&Locator::xpath(LOGIN_SIGNUP_BUTTON)).await?;
    session.click(&next).await?;

    let password = wait
        .for_present(session, &Locator::xpath(PASSWORD_INPUT))
        .await?;
    session.clear(&password).await?;
    session
        .send_keys(&password, &config.credentials.password)
        .await?;
    tracing::debug!("Entered password");

    let submit = session.find_first(&Locator::xpath(LOGIN_BUTTON)).await?;
    session.click(&submit).await?;

    wait.for_present(session, &Locator::xpath(TAB_BAR)).await?;
    tracing::info!("Login successful");

    if !config.settle_after_login.is_zero() {
        tokio::time::sleep(config.settle_after_login).await;
    }
    Ok(())
}

async fn select_site(
    session: &WebDriverSession,
    config: &BootstrapConfig,
) -> Result<(), ProtocolError> {
    let wait = config.wait();
    let alert = Locator::xpath(ALERT_WRAPPER);

    wait.for_invisible(session, &Locator::css(OVERLAY_SELECTOR))
        .await?;

    let dropdown = wait
        .for_clickable(session, &Locator::xpath(HOME_DROPDOWN))
        .await?;
    session.click(&dropdown).await?;

    wait.for_visible(session, &alert).await?;
    tracing::debug!("Home selector opened");

    let options = session.find_elements(&site_option(config.site())).await?;
    if options.len() > 1 {
        tracing::warn!(
            site = config.site(),
            count = options.len(),
            "Several homes match, picking the first"
        );
    }
    let option = options
        .into_iter()
        .next()
        .ok_or_else(|| ProtocolError::MissingElement(format!("home option '{}'", config.site())))?;
    session.click(&option).await?;

    let okay = session.find_first(&Locator::xpath(OKAY_BUTTON)).await?;
    session.click(&okay).await?;

    wait.for_invisible(session, &alert).await?;
    tracing::info!(site = config.site(), "Home selected");
    Ok(())
}

/// Locator for the radio button of `site` in the home selector.
fn site_option(site: &str) -> Locator {
    Locator::xpath(format!(
        "//div[contains(@class, 'alert-wrapper')]//div[@class='alert-radio-label sc-ion-alert-md' \
         and contains(text(), {})]/ancestor::button",
        xpath_literal(site)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_debug_redacts_password() {
        let creds = Credentials::new("me@example.com", "hunter2");
        let debug = format!("{creds:?}");
        assert!(debug.contains("me@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn bootstrap_config_defaults() {
        let config = BootstrapConfig::new(Credentials::new("a", "b"));
        assert_eq!(config.site(), "Nikoo");
        assert_eq!(config.login_url(), "https://smarteefi.web.app/login");
        assert_eq!(config.wait_timeout, Duration::from_secs(60));
        assert_eq!(config.settle_after_login, Duration::from_secs(5));
    }

    #[test]
    fn site_option_quotes_name() {
        let Locator::XPath(expr) = site_option("Nikoo") else {
            panic!("expected xpath");
        };
        assert!(expr.contains("contains(text(), 'Nikoo')"));
        assert!(expr.ends_with("/ancestor::button"));
    }
}
