// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `smarteefi_ctl` - Control Smarteefi switches through their web dashboard.
//!
//! The dashboard has no device API, so switches are driven the way a user
//! would: a browser session (through a WebDriver server such as
//! chromedriver) logs in, selects the home, and clicks toggles.
//!
//! # Building Blocks
//!
//! - [`ControlSurface`]: the seam to a live UI session
//! - [`ToggleReconciler`]: idempotent toggle-with-verification over a surface
//! - [`webdriver`]: the production surface and session bootstrap
//! - [`SwitchBoard`]: short switch names (`light`, `fan`, `charger`)
//! - [`server`] and [`cli`]: the HTTP API and the interactive console
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use smarteefi_ctl::webdriver::{self, BootstrapConfig, Credentials, SurfaceConfig, WebDriverConfig};
//! use smarteefi_ctl::{SwitchBoard, ToggleReconciler, ToggleState};
//!
//! #[tokio::main]
//! async fn main() -> smarteefi_ctl::Result<()> {
//!     let bootstrap = BootstrapConfig::new(Credentials::new("me@example.com", "secret"));
//!     let surface = webdriver::launch(
//!         &WebDriverConfig::default(),
//!         &bootstrap,
//!         SurfaceConfig::default(),
//!     )
//!     .await?;
//!
//!     let reconciler = ToggleReconciler::new(surface);
//!     let switches = SwitchBoard::default();
//!     if let Some(light) = switches.get("light") {
//!         let outcome = reconciler
//!             .reconcile(light.control(), ToggleState::On, Duration::from_secs(60))
//!             .await;
//!         println!("{}", outcome.message());
//!     }
//!
//!     reconciler.into_surface().session().close().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod reconcile;
pub mod server;
mod surface;
pub mod switchboard;
pub mod types;
pub mod webdriver;

pub use error::{
    BootstrapError, BootstrapStage, Error, ProtocolError, Result, SurfaceError, ValueError,
};
pub use reconcile::{Outcome, OutcomeResponse, ReconcileError, ReconcileTiming, ToggleReconciler};
pub use surface::ControlSurface;
pub use switchboard::{Switch, SwitchBoard};
pub use types::{Control, ToggleState};
