// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scripted in-memory control surface shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use smarteefi_ctl::{Control, ControlSurface, ProtocolError, SurfaceError, ToggleState};

/// Scripted behavior of one toggle.
#[derive(Debug, Clone)]
pub struct FakeToggle {
    state: ToggleState,
    matches: usize,
    interactable: bool,
    intercepts: u32,
    flip_after: Option<u32>,
    invoke_fault: Option<(String, String)>,
    pending: Option<(ToggleState, u32)>,
}

impl FakeToggle {
    /// One visible, enabled toggle that reflects a click on the next read.
    pub fn new(state: ToggleState) -> Self {
        Self {
            state,
            matches: 1,
            interactable: true,
            intercepts: 0,
            flip_after: Some(1),
            invoke_fault: None,
            pending: None,
        }
    }

    /// Number of elements matching the label.
    pub fn matching(mut self, count: usize) -> Self {
        self.matches = count;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.interactable = false;
        self
    }

    /// The next `count` invocations are intercepted.
    pub fn intercepted(mut self, count: u32) -> Self {
        self.intercepts = count;
        self
    }

    /// A click shows up on the `reads`-th read after it, or never for `None`.
    pub fn flips_after(mut self, reads: Option<u32>) -> Self {
        self.flip_after = reads;
        self
    }

    /// Every invocation fails with this driver error.
    pub fn failing_invoke(mut self, error: &str, message: &str) -> Self {
        self.invoke_fault = Some((error.to_string(), message.to_string()));
        self
    }
}

/// Surface over a set of scripted toggles. Clones share state, so a test
/// can keep one to inspect after handing another to the reconciler.
#[derive(Debug, Clone, Default)]
pub struct FakeSurface {
    toggles: Arc<Mutex<HashMap<String, FakeToggle>>>,
    events: Arc<Mutex<Vec<(String, String)>>>,
    latency: Duration,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_toggle(self, label: &str, toggle: FakeToggle) -> Self {
        self.toggles.lock().insert(label.to_string(), toggle);
        self
    }

    /// Delay applied to every operation, to give other tasks a chance to run.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// `(operation, label)` pairs in call order.
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().clone()
    }

    pub fn count(&self, operation: &str, label: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|(op, l)| op == operation && l == label)
            .count()
    }

    pub fn invokes(&self, label: &str) -> usize {
        self.count("invoke", label)
    }

    pub fn state(&self, label: &str) -> Option<ToggleState> {
        self.toggles.lock().get(label).map(|t| t.state)
    }

    async fn step(&self, operation: &str, label: &str) {
        self.events
            .lock()
            .push((operation.to_string(), label.to_string()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl ControlSurface for FakeSurface {
    type Handle = String;

    async fn locate(&self, control: &Control) -> Result<String, SurfaceError> {
        let label = control.label();
        self.step("locate", label).await;

        let matches = self.toggles.lock().get(label).map_or(0, |t| t.matches);
        match matches {
            0 => Err(SurfaceError::NotFound {
                label: label.to_string(),
            }),
            1 => Ok(label.to_string()),
            count => Err(SurfaceError::Ambiguous {
                label: label.to_string(),
                count,
            }),
        }
    }

    async fn is_interactable(&self, handle: &String) -> Result<bool, SurfaceError> {
        self.step("check", handle).await;
        Ok(self.toggles.lock().get(handle).is_some_and(|t| t.interactable))
    }

    async fn read_state(&self, handle: &String) -> Result<ToggleState, SurfaceError> {
        self.step("read", handle).await;

        let mut toggles = self.toggles.lock();
        let toggle = toggles
            .get_mut(handle)
            .ok_or_else(|| ProtocolError::MissingElement(handle.clone()))?;

        if let Some((target, remaining)) = toggle.pending {
            if remaining <= 1 {
                toggle.state = target;
                toggle.pending = None;
            } else {
                toggle.pending = Some((target, remaining - 1));
            }
        }
        Ok(toggle.state)
    }

    async fn invoke(&self, handle: &String) -> Result<(), SurfaceError> {
        self.step("invoke", handle).await;

        let mut toggles = self.toggles.lock();
        let toggle = toggles
            .get_mut(handle)
            .ok_or_else(|| ProtocolError::MissingElement(handle.clone()))?;

        if toggle.intercepts > 0 {
            toggle.intercepts -= 1;
            return Err(SurfaceError::Intercepted(
                "element click intercepted: <ion-backdrop> would receive the click".to_string(),
            ));
        }
        if let Some((error, message)) = &toggle.invoke_fault {
            return Err(SurfaceError::Protocol(ProtocolError::WebDriver {
                error: error.clone(),
                message: message.clone(),
            }));
        }

        let target = toggle.pending.map_or(toggle.state, |(t, _)| t).flipped();
        toggle.pending = toggle.flip_after.map(|reads| (target, reads));
        Ok(())
    }
}
