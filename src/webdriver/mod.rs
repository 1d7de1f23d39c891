// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! WebDriver implementation of the control surface.
//!
//! - [`WebDriverConfig`] / [`WebDriverSession`]: the W3C wire client
//! - [`Wait`]: explicit waits over page conditions
//! - [`WebDriverSurface`]: the dashboard as a [`ControlSurface`](crate::ControlSurface)
//! - [`launch`]: open a session, log in, select the home

mod bootstrap;
mod client;
mod surface;
mod wait;

pub use bootstrap::{BootstrapConfig, Credentials, launch, prepare_dashboard};
pub use client::{ELEMENT_KEY, ElementId, Locator, WebDriverConfig, WebDriverSession, xpath_literal};
pub use surface::{OVERLAY_SELECTOR, SurfaceConfig, ToggleHandle, WebDriverSurface};
pub use wait::Wait;
