// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Toggle state of a dashboard switch.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// Represents the boolean state of a toggle control.
///
/// # Examples
///
/// ```
/// use smarteefi_ctl::types::ToggleState;
///
/// assert_eq!(ToggleState::On.as_str(), "ON");
/// assert_eq!(ToggleState::from_sentinel(Some("on")), ToggleState::On);
/// assert_eq!(ToggleState::from_sentinel(None), ToggleState::Off);
/// assert_eq!("off".parse::<ToggleState>().unwrap(), ToggleState::Off);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToggleState {
    /// The switch is off.
    Off,
    /// The switch is on.
    On,
}

impl ToggleState {
    /// Value the dashboard stores in a toggle's hidden input when it is on.
    pub const SENTINEL_ON: &'static str = "on";

    /// Returns the display representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// Derives the state from the raw value read from a control.
    ///
    /// Only the exact literal `"on"` means on; any other value, including an
    /// absent one, means off.
    #[must_use]
    pub fn from_sentinel(raw: Option<&str>) -> Self {
        Self::from(raw == Some(Self::SENTINEL_ON))
    }

    /// Returns the opposite state.
    #[must_use]
    pub const fn flipped(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToggleState {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "OFF" | "0" | "FALSE" => Ok(Self::Off),
            "ON" | "1" | "TRUE" => Ok(Self::On),
            _ => Err(ValueError::InvalidToggleState(s.to_string())),
        }
    }
}

impl From<bool> for ToggleState {
    fn from(value: bool) -> Self {
        if value { Self::On } else { Self::Off }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_state_as_str() {
        assert_eq!(ToggleState::Off.as_str(), "OFF");
        assert_eq!(ToggleState::On.as_str(), "ON");
    }

    #[test]
    fn toggle_state_from_str() {
        assert_eq!("ON".parse::<ToggleState>().unwrap(), ToggleState::On);
        assert_eq!("off".parse::<ToggleState>().unwrap(), ToggleState::Off);
        assert_eq!(" On ".parse::<ToggleState>().unwrap(), ToggleState::On);
        assert_eq!("1".parse::<ToggleState>().unwrap(), ToggleState::On);
        assert_eq!("false".parse::<ToggleState>().unwrap(), ToggleState::Off);
    }

    #[test]
    fn toggle_state_from_str_invalid() {
        let result = "toggle".parse::<ToggleState>();
        assert!(matches!(
            result.unwrap_err(),
            ValueError::InvalidToggleState(_)
        ));
    }

    #[test]
    fn sentinel_only_exact_on_literal() {
        assert_eq!(ToggleState::from_sentinel(Some("on")), ToggleState::On);
        assert_eq!(ToggleState::from_sentinel(Some("ON")), ToggleState::Off);
        assert_eq!(ToggleState::from_sentinel(Some("")), ToggleState::Off);
        assert_eq!(ToggleState::from_sentinel(Some("off")), ToggleState::Off);
        assert_eq!(ToggleState::from_sentinel(None), ToggleState::Off);
    }

    #[test]
    fn flipped_inverts() {
        assert_eq!(ToggleState::On.flipped(), ToggleState::Off);
        assert_eq!(ToggleState::Off.flipped(), ToggleState::On);
    }
}
