// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for dashboard switch control.
//!
//! # Types
//!
//! - [`ToggleState`] - On/Off state of a toggle
//! - [`Control`] - Label and state key identifying one switch

mod control;
mod toggle;

pub use control::Control;
pub use toggle::ToggleState;
