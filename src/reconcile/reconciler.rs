// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The toggle reconciler.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::error::SurfaceError;
use crate::surface::ControlSurface;
use crate::types::{Control, ToggleState};

use super::ReconcileTiming;

const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);
use super::outcome::{Outcome, ReconcileError};

/// Brings controls on a [`ControlSurface`] to a desired state.
///
/// The reconciler owns the surface behind an async exclusive lock. Every
/// call holds the lock from locating the control until its outcome is
/// known, so two calls never interleave their reads and clicks. Waiting
/// callers are served in arrival order.
///
/// # Examples
///
/// ```ignore
/// use std::time::Duration;
/// use smarteefi_ctl::reconcile::ToggleReconciler;
/// use smarteefi_ctl::types::{Control, ToggleState};
///
/// let reconciler = ToggleReconciler::new(surface);
/// let outcome = reconciler
///     .reconcile(&Control::new("Switch-1", "ion-tg-5"), ToggleState::On, Duration::from_secs(60))
///     .await;
/// println!("{}", outcome.message());
/// ```
#[derive(Debug)]
pub struct ToggleReconciler<S> {
    surface: Mutex<S>,
    timing: ReconcileTiming,
}

impl<S: ControlSurface> ToggleReconciler<S> {
    /// Creates a reconciler with default timing.
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface: Mutex::new(surface),
            timing: ReconcileTiming::default(),
        }
    }

    /// Sets the polling and retry timing.
    #[must_use]
    pub fn with_timing(mut self, timing: ReconcileTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Consumes the reconciler and hands back the surface.
    pub fn into_surface(self) -> S {
        self.surface.into_inner()
    }

    /// Brings `control` to `desired`, waiting at most `deadline` for the
    /// dashboard to reflect a change.
    ///
    /// Calling this repeatedly with the same desired state never clicks
    /// the control again once it matches.
    pub async fn reconcile(
        &self,
        control: &Control,
        desired: ToggleState,
        deadline: Duration,
    ) -> Outcome {
        let surface = self.surface.lock().await;

        let outcome = self
            .drive(&surface, control, desired, deadline)
            .await
            .unwrap_or_else(Outcome::Failed);

        match &outcome {
            Outcome::Failed(err) if err.is_recoverable() => {
                tracing::warn!(label = control.label(), %desired, "{err}");
            }
            Outcome::Failed(err) => {
                tracing::error!(label = control.label(), %desired, "{err}");
            }
            _ => tracing::info!(label = control.label(), %desired, "{}", outcome.message()),
        }

        outcome
    }

    /// Reads the state of `control` without changing it.
    ///
    /// # Errors
    ///
    /// Returns the same failures as the locate/read part of
    /// [`reconcile`](Self::reconcile).
    pub async fn current_state(&self, control: &Control) -> Result<ToggleState, ReconcileError> {
        let surface = self.surface.lock().await;
        let handle = prepare(&*surface, control).await?;
        surface
            .read_state(&handle)
            .await
            .map_err(|e| ReconcileError::from_surface(control, e))
    }

    async fn drive(
        &self,
        surface: &S,
        control: &Control,
        desired: ToggleState,
        deadline: Duration,
    ) -> Result<Outcome, ReconcileError> {
        let handle = prepare(surface, control).await?;

        let current = surface
            .read_state(&handle)
            .await
            .map_err(|e| ReconcileError::from_surface(control, e))?;
        tracing::debug!(label = control.label(), %current, %desired, "Read toggle state");

        if current == desired {
            return Ok(Outcome::AlreadyInState {
                control: control.clone(),
                state: current,
            });
        }

        let attempts = self.activate(surface, &handle, control).await?;
        let polls = self
            .await_convergence(surface, &handle, control, desired, deadline)
            .await?;

        Ok(Outcome::Changed {
            control: control.clone(),
            state: desired,
            attempts,
            polls,
        })
    }

    /// Invokes the action, retrying once after the grace period if the
    /// first attempt is intercepted. Returns the number of attempts.
    async fn activate(
        &self,
        surface: &S,
        handle: &S::Handle,
        control: &Control,
    ) -> Result<u8, ReconcileError> {
        match surface.invoke(handle).await {
            Ok(()) => return Ok(1),
            Err(SurfaceError::Intercepted(detail)) => {
                tracing::warn!(
                    label = control.label(),
                    detail = %detail,
                    grace_ms = self.timing.intercept_grace().as_millis(),
                    "Toggle click intercepted, retrying after grace period"
                );
            }
            Err(e) => return Err(ReconcileError::from_surface(control, e)),
        }

        tokio::time::sleep(self.timing.intercept_grace()).await;

        match surface.invoke(handle).await {
            Ok(()) => Ok(2),
            Err(SurfaceError::Intercepted(detail)) => Err(ReconcileError::StillIntercepted {
                label: control.label().to_string(),
                detail,
            }),
            Err(e) => Err(ReconcileError::from_surface(control, e)),
        }
    }

    /// Polls the state until it matches or the deadline passes. Returns the
    /// number of reads made.
    async fn await_convergence(
        &self,
        surface: &S,
        handle: &S::Handle,
        control: &Control,
        desired: ToggleState,
        deadline: Duration,
    ) -> Result<u32, ReconcileError> {
        let deadline_at = instant_after(deadline);
        let mut polls = 0u32;

        loop {
            let observed = surface
                .read_state(handle)
                .await
                .map_err(|e| ReconcileError::from_surface(control, e))?;
            polls += 1;

            if observed == desired {
                return Ok(polls);
            }

            let now = Instant::now();
            if now >= deadline_at {
                return Err(ReconcileError::Timeout {
                    label: control.label().to_string(),
                    desired,
                    deadline,
                });
            }

            tracing::trace!(label = control.label(), polls, %observed, "Waiting for state change");
            // Never sleep past the deadline.
            let nap = (deadline_at - now).min(self.timing.poll_interval());
            tokio::time::sleep(nap).await;
        }
    }
}

/// `now + duration`, saturating at a point roughly 30 years out.
fn instant_after(duration: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(duration).unwrap_or_else(|| now + FAR_FUTURE)
}

/// Locates the control and checks it can be clicked.
async fn prepare<S: ControlSurface>(
    surface: &S,
    control: &Control,
) -> Result<S::Handle, ReconcileError> {
    let handle = surface
        .locate(control)
        .await
        .map_err(|e| ReconcileError::from_surface(control, e))?;

    let interactable = surface
        .is_interactable(&handle)
        .await
        .map_err(|e| ReconcileError::from_surface(control, e))?;

    if !interactable {
        return Err(ReconcileError::NotInteractable {
            label: control.label().to_string(),
        });
    }

    Ok(handle)
}
