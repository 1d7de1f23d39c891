// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal W3C WebDriver client over HTTP.

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::{Value, json};

use crate::error::ProtocolError;

/// Key under which W3C WebDriver serializes element references.
pub const ELEMENT_KEY: &str = "element-6066-11e4-a52e-4f735466cecf";

// ============================================================================
// WebDriverConfig - How to reach the driver and which browser to start
// ============================================================================

/// Configuration for a WebDriver session.
///
/// # Examples
///
/// ```
/// use smarteefi_ctl::webdriver::WebDriverConfig;
/// use std::time::Duration;
///
/// let config = WebDriverConfig::new("http://localhost:9515")
///     .with_headless(true)
///     .with_browser_arg("--window-size=1280,800")
///     .with_timeout(Duration::from_secs(10));
///
/// assert_eq!(config.url(), "http://localhost:9515");
/// assert!(config.headless());
/// ```
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    url: String,
    timeout: Duration,
    headless: bool,
    browser_args: Vec<String>,
}

impl WebDriverConfig {
    /// Default chromedriver address.
    pub const DEFAULT_URL: &'static str = "http://localhost:9515";
    /// Default per-request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Creates a configuration for the driver at `url`.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            headless: false,
            browser_args: vec!["--start-maximized".to_string()],
        }
    }

    /// Runs the browser without a visible window.
    #[must_use]
    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Adds a browser command-line argument.
    #[must_use]
    pub fn with_browser_arg(mut self, arg: impl Into<String>) -> Self {
        self.browser_args.push(arg.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the driver URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns whether the browser runs headless.
    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    /// Builds the capabilities object sent when opening a session.
    #[must_use]
    pub fn capabilities(&self) -> Value {
        let mut args = self.browser_args.clone();
        if self.headless {
            args.push("--headless=new".to_string());
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }

    fn http_client(&self) -> Result<Client, ProtocolError> {
        Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(ProtocolError::Http)
    }

    /// Opens a new browser session.
    ///
    /// # Errors
    ///
    /// Returns error if the driver is unreachable or refuses the session.
    pub async fn connect(&self) -> Result<WebDriverSession, ProtocolError> {
        let client = self.http_client()?;
        let url = format!("{}/session", self.url);

        tracing::debug!(url = %url, headless = self.headless, "Opening WebDriver session");

        let body = send(&client, Method::POST, &url, Some(self.capabilities())).await?;

        // W3C puts the id under `value`; older drivers put it at the top level.
        let session_id = body
            .get("value")
            .and_then(|v| v.get("sessionId"))
            .or_else(|| body.get("sessionId"))
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::InvalidResponse("missing sessionId".to_string()))?
            .to_string();

        tracing::info!(session_id = %session_id, "WebDriver session opened");

        Ok(WebDriverSession {
            base_url: self.url.clone(),
            client,
            session_id,
        })
    }

    /// Attaches to an already running session.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be created.
    pub fn attach(&self, session_id: impl Into<String>) -> Result<WebDriverSession, ProtocolError> {
        Ok(WebDriverSession {
            base_url: self.url.clone(),
            client: self.http_client()?,
            session_id: session_id.into(),
        })
    }
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_URL)
    }
}

// ============================================================================
// Element references and locators
// ============================================================================

/// Opaque reference to an element in the session's current page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementId(String);

impl ElementId {
    /// Wraps a raw element reference.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw reference.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Serializes the reference for use as a script argument.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({ ELEMENT_KEY: self.0 })
    }

    fn from_json(value: &Value) -> Option<Self> {
        value.get(ELEMENT_KEY).and_then(Value::as_str).map(Self::new)
    }
}

/// Element lookup strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    /// XPath expression.
    XPath(String),
    /// CSS selector.
    Css(String),
}

impl Locator {
    /// Creates an XPath locator.
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Creates a CSS locator.
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    fn strategy(&self) -> (&'static str, &str) {
        match self {
            Self::XPath(expr) => ("xpath", expr),
            Self::Css(selector) => ("css selector", selector),
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (using, value) = self.strategy();
        write!(f, "{using} {value}")
    }
}

/// Quotes `text` as an XPath string literal.
///
/// XPath 1.0 has no escape sequences, so text containing both quote kinds
/// is assembled with `concat()`.
#[must_use]
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        format!("'{text}'")
    } else if !text.contains('"') {
        format!("\"{text}\"")
    } else {
        let parts: Vec<String> = text.split('\'').map(|part| format!("'{part}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

// ============================================================================
// WebDriverSession - One browser session
// ============================================================================

/// An open WebDriver session.
///
/// Every method maps to one W3C endpoint under `/session/{id}`.
#[derive(Debug, Clone)]
pub struct WebDriverSession {
    base_url: String,
    client: Client,
    session_id: String,
}

impl WebDriverSession {
    /// Returns the session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn session_url(&self, path: &str) -> String {
        format!("{}/session/{}{path}", self.base_url, self.session_id)
    }

    async fn command(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ProtocolError> {
        let url = self.session_url(path);
        let mut reply = send(&self.client, method, &url, body).await?;
        Ok(reply
            .get_mut("value")
            .map(Value::take)
            .unwrap_or_default())
    }

    /// Loads `url` in the current tab.
    ///
    /// # Errors
    ///
    /// Returns error if the driver rejects the navigation.
    pub async fn navigate(&self, url: &str) -> Result<(), ProtocolError> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(drop)
    }

    /// Returns every element matching `locator`, possibly none.
    ///
    /// # Errors
    ///
    /// Returns error if the lookup itself fails.
    pub async fn find_elements(&self, locator: &Locator) -> Result<Vec<ElementId>, ProtocolError> {
        let (using, value) = locator.strategy();
        let found = self
            .command(
                Method::POST,
                "/elements",
                Some(json!({ "using": using, "value": value })),
            )
            .await?;

        let items = found.as_array().ok_or_else(|| {
            ProtocolError::InvalidResponse(format!("expected element list for {locator}"))
        })?;

        items
            .iter()
            .map(|item| {
                ElementId::from_json(item).ok_or_else(|| {
                    ProtocolError::InvalidResponse(format!("malformed element reference: {item}"))
                })
            })
            .collect()
    }

    /// Returns the first element matching `locator`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MissingElement`] if nothing matches.
    pub async fn find_first(&self, locator: &Locator) -> Result<ElementId, ProtocolError> {
        self.find_elements(locator)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ProtocolError::MissingElement(locator.to_string()))
    }

    async fn element_flag(&self, element: &ElementId, flag: &str) -> Result<bool, ProtocolError> {
        let path = format!("/element/{}/{flag}", element.as_str());
        let value = self.command(Method::GET, &path, None).await?;
        value.as_bool().ok_or_else(|| {
            ProtocolError::InvalidResponse(format!("expected boolean for {flag}, got {value}"))
        })
    }

    /// Returns true if the element is rendered visibly.
    ///
    /// # Errors
    ///
    /// Returns error if the element is stale or the query fails.
    pub async fn is_displayed(&self, element: &ElementId) -> Result<bool, ProtocolError> {
        self.element_flag(element, "displayed").await
    }

    /// Returns true if the element accepts input.
    ///
    /// # Errors
    ///
    /// Returns error if the element is stale or the query fails.
    pub async fn is_enabled(&self, element: &ElementId) -> Result<bool, ProtocolError> {
        self.element_flag(element, "enabled").await
    }

    /// Clicks the element with a native pointer click.
    ///
    /// # Errors
    ///
    /// Returns `element click intercepted` if another element is on top.
    pub async fn click(&self, element: &ElementId) -> Result<(), ProtocolError> {
        let path = format!("/element/{}/click", element.as_str());
        self.command(Method::POST, &path, Some(json!({})))
            .await
            .map(drop)
    }

    /// Clears an input element.
    ///
    /// # Errors
    ///
    /// Returns error if the element cannot be edited.
    pub async fn clear(&self, element: &ElementId) -> Result<(), ProtocolError> {
        let path = format!("/element/{}/clear", element.as_str());
        self.command(Method::POST, &path, Some(json!({})))
            .await
            .map(drop)
    }

    /// Types `text` into the element.
    ///
    /// # Errors
    ///
    /// Returns error if the element cannot receive keys.
    pub async fn send_keys(&self, element: &ElementId, text: &str) -> Result<(), ProtocolError> {
        let path = format!("/element/{}/value", element.as_str());
        self.command(Method::POST, &path, Some(json!({ "text": text })))
            .await
            .map(drop)
    }

    /// Runs a synchronous script and returns its result.
    ///
    /// # Errors
    ///
    /// Returns error if the script throws or the driver rejects it.
    pub async fn execute(&self, script: &str, args: Vec<Value>) -> Result<Value, ProtocolError> {
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    /// Moves the mouse pointer to the centre of the element.
    ///
    /// # Errors
    ///
    /// Returns error if the action cannot be performed.
    pub async fn move_to(&self, element: &ElementId) -> Result<(), ProtocolError> {
        let actions = json!({
            "actions": [{
                "type": "pointer",
                "id": "mouse",
                "parameters": { "pointerType": "mouse" },
                "actions": [{
                    "type": "pointerMove",
                    "duration": 0,
                    "origin": element.to_json(),
                    "x": 0,
                    "y": 0
                }]
            }]
        });
        self.command(Method::POST, "/actions", Some(actions))
            .await
            .map(drop)
    }

    /// Ends the session and closes the browser.
    ///
    /// # Errors
    ///
    /// Returns error if the driver cannot be reached.
    pub async fn close(&self) -> Result<(), ProtocolError> {
        tracing::info!(session_id = %self.session_id, "Closing WebDriver session");
        self.command(Method::DELETE, "", None).await.map(drop)
    }
}

/// Sends one request and decodes the W3C envelope.
async fn send(
    client: &Client,
    method: Method,
    url: &str,
    body: Option<Value>,
) -> Result<Value, ProtocolError> {
    tracing::debug!(method = %method, url = %url, "Sending WebDriver command");

    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(ProtocolError::Http)?;
    let status = response.status();
    let text = response.text().await.map_err(ProtocolError::Http)?;

    tracing::trace!(status = status.as_u16(), body = %text, "Received WebDriver response");

    let parsed: Option<Value> = serde_json::from_str(&text).ok();

    if !status.is_success() {
        let detail = parsed.as_ref().and_then(|v| v.get("value"));
        let error = detail.and_then(|v| v.get("error")).and_then(Value::as_str);
        let message = detail
            .and_then(|v| v.get("message"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        return Err(match error {
            Some(error) => ProtocolError::WebDriver {
                error: error.to_string(),
                message: message.to_string(),
            },
            None => ProtocolError::InvalidResponse(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )),
        });
    }

    parsed.ok_or_else(|| ProtocolError::InvalidResponse(format!("body is not JSON: {text}")))
}
