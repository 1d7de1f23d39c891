// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The interaction seam between the reconciler and a live UI session.
//!
//! A [`ControlSurface`] is a stateful handle to one session (one browser
//! tab, in production). It is not meant to be shared: the
//! [`ToggleReconciler`](crate::reconcile::ToggleReconciler) owns it behind
//! an exclusive lock and drives it one call at a time.

use crate::error::SurfaceError;
use crate::types::{Control, ToggleState};

/// Operations the reconciler needs from a UI session.
#[allow(async_fn_in_trait)]
pub trait ControlSurface {
    /// Reference to a located control, valid for the rest of one reconciliation.
    type Handle;

    /// Finds the control and readies it for interaction.
    ///
    /// Implementations bring the control into view and wait, bounded by
    /// their own timeout, for any blocking overlay to go away.
    ///
    /// # Errors
    ///
    /// - [`SurfaceError::NotFound`] if no control matches the label
    /// - [`SurfaceError::Ambiguous`] if more than one control matches
    /// - [`SurfaceError::OverlayPersisted`] if an overlay never cleared
    /// - [`SurfaceError::Protocol`] for any other fault
    async fn locate(&self, control: &Control) -> Result<Self::Handle, SurfaceError>;

    /// Returns true if the control is visible and enabled.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Protocol`] if the session cannot be queried.
    async fn is_interactable(&self, handle: &Self::Handle) -> Result<bool, SurfaceError>;

    /// Reads the current state without side effects.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::Protocol`] if the session cannot be queried.
    async fn read_state(&self, handle: &Self::Handle) -> Result<ToggleState, SurfaceError>;

    /// Triggers the control's action exactly once.
    ///
    /// # Errors
    ///
    /// - [`SurfaceError::Intercepted`] if another element took the input
    /// - [`SurfaceError::Protocol`] for any other fault
    async fn invoke(&self, handle: &Self::Handle) -> Result<(), SurfaceError>;
}
