// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Result of one reconciliation and its failure taxonomy.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::SurfaceError;
use crate::types::{Control, ToggleState};

/// Why a reconciliation failed.
///
/// The `Display` text of each variant is the message handed back to
/// callers, so it must stay stable.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// No control matches the label.
    #[error("No toggle control found for '{label}'.")]
    NotFound {
        /// Label that was searched for.
        label: String,
    },

    /// Several controls match the label.
    #[error("Found {count} toggle controls for '{label}', expected exactly one.")]
    Ambiguous {
        /// Label that was searched for.
        label: String,
        /// Number of matches.
        count: usize,
    },

    /// The control exists but is hidden or disabled.
    #[error("Toggle is either not visible or not enabled.")]
    NotInteractable {
        /// Label of the control.
        label: String,
    },

    /// A blocking overlay never cleared.
    #[error("An overlay is still covering the {label} after {}s.", .waited.as_secs())]
    OverlayPersisted {
        /// Label of the control.
        label: String,
        /// How long the surface waited.
        waited: Duration,
    },

    /// The action was intercepted twice in a row.
    #[error("Still unable to click the toggle: {detail}")]
    StillIntercepted {
        /// Label of the control.
        label: String,
        /// Driver detail from the second interception.
        detail: String,
    },

    /// The action went through but the state never converged.
    #[error("Failed to set the {label} to {desired}. The state did not change in time.")]
    Timeout {
        /// Label of the control.
        label: String,
        /// The state that was requested.
        desired: ToggleState,
        /// How long convergence was awaited.
        deadline: Duration,
    },

    /// Any other surface fault.
    #[error("An error occurred while toggling the {label}: {source}")]
    Surface {
        /// Label of the control.
        label: String,
        /// The underlying fault.
        source: SurfaceError,
    },
}

impl ReconcileError {
    /// Classifies a surface fault raised while working on `control`.
    #[must_use]
    pub fn from_surface(control: &Control, err: SurfaceError) -> Self {
        let label = control.label().to_string();
        match err {
            SurfaceError::NotFound { .. } => Self::NotFound { label },
            SurfaceError::Ambiguous { count, .. } => Self::Ambiguous { label, count },
            SurfaceError::OverlayPersisted(waited) => Self::OverlayPersisted { label, waited },
            source @ (SurfaceError::Intercepted(_) | SurfaceError::Protocol(_)) => {
                Self::Surface { label, source }
            }
        }
    }

    /// Returns true if the device may still apply the change on its own.
    ///
    /// Only a convergence timeout qualifies: the action was delivered, the
    /// dashboard just did not reflect it before the deadline.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Terminal state of one reconciliation.
#[derive(Debug)]
pub enum Outcome {
    /// The control already had the desired state; nothing was invoked.
    AlreadyInState {
        /// The control that was checked.
        control: Control,
        /// Its state.
        state: ToggleState,
    },

    /// The action was invoked and the state converged.
    Changed {
        /// The control that was changed.
        control: Control,
        /// Its new state.
        state: ToggleState,
        /// Number of `invoke` calls made (1, or 2 after an interception).
        attempts: u8,
        /// Number of state reads until convergence was observed.
        polls: u32,
    },

    /// The reconciliation failed.
    Failed(ReconcileError),
}

impl Outcome {
    /// Returns true for both success variants.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Returns the caller-facing message.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::AlreadyInState { control, state } => {
                format!("{} is already {state}.", control.display_label())
            }
            Self::Changed { control, state, .. } => {
                format!("Successfully set the {} to {state}.", control.label())
            }
            Self::Failed(err) => err.to_string(),
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ReconcileError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the `{success, message}` pair callers serialize.
    #[must_use]
    pub fn to_response(&self) -> OutcomeResponse {
        OutcomeResponse {
            success: self.is_success(),
            message: self.message(),
        }
    }
}

impl From<ReconcileError> for Outcome {
    fn from(err: ReconcileError) -> Self {
        Self::Failed(err)
    }
}

/// Wire form of an [`Outcome`]: `{"success": bool, "message": string}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeResponse {
    /// Whether the switch ended in the requested state.
    pub success: bool,
    /// Human readable explanation.
    pub message: String,
}
