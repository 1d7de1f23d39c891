// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `smarteefi_ctl` crate.
//!
//! This module provides the error hierarchy used across the crate: value
//! validation, WebDriver communication, control-surface faults, and
//! session bootstrap.
//!
//! Reconciliation failures have their own closed set in
//! [`ReconcileError`](crate::reconcile::ReconcileError); they never cross
//! into callers as raw faults, only as an [`Outcome`](crate::reconcile::Outcome).

use std::time::Duration;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the WebDriver server.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error reported by the control surface.
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// Session bootstrap (login or site selection) failed.
    #[error("bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// Console or HTTP server I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to value validation and parsing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An invalid toggle state string was provided.
    #[error("invalid toggle state: {0}")]
    InvalidToggleState(String),

    /// A switch definition could not be parsed.
    #[error("invalid switch definition '{0}', expected name=Label:state_key")]
    InvalidSwitch(String),

    /// Two switches were registered under the same name.
    #[error("duplicate switch name: {0}")]
    DuplicateSwitch(String),
}

/// Errors related to WebDriver communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The WebDriver server answered with a W3C error object.
    #[error("{error}: {message}")]
    WebDriver {
        /// The W3C error code, e.g. `no such element`.
        error: String,
        /// Human readable detail supplied by the driver.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),

    /// A required element is not on the page.
    #[error("element not found: {0}")]
    MissingElement(String),

    /// An explicit wait elapsed before its condition held.
    #[error("timed out after {} ms waiting for {what}", .after.as_millis())]
    Timeout {
        /// What was being waited for.
        what: String,
        /// How long the wait lasted.
        after: Duration,
    },
}

impl ProtocolError {
    /// W3C error code for a click landing on another element.
    pub const CLICK_INTERCEPTED: &'static str = "element click intercepted";

    /// Returns the W3C error code if this is a driver-reported error.
    #[must_use]
    pub fn webdriver_code(&self) -> Option<&str> {
        match self {
            Self::WebDriver { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Returns true if the fault means an element is absent or went stale.
    ///
    /// Explicit waits keep polling through these.
    #[must_use]
    pub fn is_missing_element(&self) -> bool {
        match self {
            Self::MissingElement(_) => true,
            Self::WebDriver { error, .. } => {
                error == "no such element" || error == "stale element reference"
            }
            _ => false,
        }
    }

    /// Returns true if the driver reported that another element received the click.
    #[must_use]
    pub fn is_click_intercepted(&self) -> bool {
        self.webdriver_code() == Some(Self::CLICK_INTERCEPTED)
    }
}

/// Faults reported by a [`ControlSurface`](crate::ControlSurface).
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// No control matches the label.
    #[error("no control labelled '{label}'")]
    NotFound {
        /// The label that was searched for.
        label: String,
    },

    /// More than one control matches the label.
    #[error("{count} controls labelled '{label}'")]
    Ambiguous {
        /// The label that was searched for.
        label: String,
        /// How many controls matched.
        count: usize,
    },

    /// A blocking overlay did not disappear within the surface's timeout.
    #[error("overlay still present after {} s", .0.as_secs())]
    OverlayPersisted(Duration),

    /// Another element received the input meant for the control.
    #[error("action intercepted: {0}")]
    Intercepted(String),

    /// Any other fault talking to the surface.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

impl SurfaceError {
    /// Creates an intercepted error if the protocol error says so, otherwise wraps it.
    #[must_use]
    pub fn from_action(err: ProtocolError) -> Self {
        if err.is_click_intercepted() {
            Self::Intercepted(err.to_string())
        } else {
            Self::Protocol(err)
        }
    }
}

/// The bootstrap step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    /// Opening the WebDriver session.
    Session,
    /// Logging into the dashboard.
    Login,
    /// Choosing the home/site.
    SiteSelection,
}

impl std::fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Session => "session",
            Self::Login => "login",
            Self::SiteSelection => "site selection",
        };
        f.write_str(name)
    }
}

/// Session bootstrap failed at a given stage.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct BootstrapError {
    /// The step that failed.
    pub stage: BootstrapStage,
    /// The underlying fault.
    #[source]
    pub source: ProtocolError,
}

impl BootstrapError {
    /// Creates a bootstrap error for a stage.
    #[must_use]
    pub fn new(stage: BootstrapStage, source: ProtocolError) -> Self {
        Self { stage, source }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
