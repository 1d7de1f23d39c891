// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Named switches exposed to callers.
//!
//! Callers address switches by short names (`light`, `fan`, `charger`);
//! the board maps each name to the dashboard [`Control`] behind it.

use std::str::FromStr;

use crate::error::ValueError;
use crate::types::{Control, ToggleState};

/// A switch known by a short name.
///
/// # Examples
///
/// ```
/// use smarteefi_ctl::switchboard::Switch;
///
/// let switch: Switch = "lamp=Switch-3:ion-tg-7".parse().unwrap();
/// assert_eq!(switch.name(), "lamp");
/// assert_eq!(switch.control().label(), "Switch-3");
/// assert_eq!(switch.control().state_key(), "ion-tg-7");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Switch {
    name: String,
    control: Control,
}

impl Switch {
    /// Creates a switch. The name is stored lowercased.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::InvalidSwitch`] if the name is empty or holds
    /// anything but ASCII letters, digits, `-` and `_`.
    pub fn new(name: &str, control: Control) -> Result<Self, ValueError> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid || control.label().is_empty() || control.state_key().is_empty() {
            return Err(ValueError::InvalidSwitch(format!(
                "{name}={}:{}",
                control.label(),
                control.state_key()
            )));
        }
        Ok(Self {
            name: name.to_ascii_lowercase(),
            control,
        })
    }

    /// Returns the short name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the dashboard control.
    #[must_use]
    pub fn control(&self) -> &Control {
        &self.control
    }

    /// Returns the HTTP action segment that sets this switch to `state`.
    #[must_use]
    pub fn action(&self, state: ToggleState) -> String {
        match state {
            ToggleState::On => format!("{}on", self.name),
            ToggleState::Off => format!("{}off", self.name),
        }
    }
}

impl FromStr for Switch {
    type Err = ValueError;

    /// Parses `name=Label:state_key`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValueError::InvalidSwitch(s.to_string());
        let (name, rest) = s.split_once('=').ok_or_else(invalid)?;
        let (label, key) = rest.rsplit_once(':').ok_or_else(invalid)?;
        Self::new(name.trim(), Control::new(label.trim(), key.trim())).map_err(|_| invalid())
    }
}

/// Registry of named switches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchBoard {
    switches: Vec<Switch>,
}

impl SwitchBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            switches: Vec::new(),
        }
    }

    /// Adds a switch.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::DuplicateSwitch`] if the name is taken.
    pub fn register(&mut self, switch: Switch) -> Result<(), ValueError> {
        if self.get(switch.name()).is_some() {
            return Err(ValueError::DuplicateSwitch(switch.name().to_string()));
        }
        self.switches.push(switch);
        Ok(())
    }

    /// Looks up a switch by name, ignoring case.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Switch> {
        let name = name.trim();
        self.switches
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Resolves an action segment such as `lighton` or `fanoff`.
    #[must_use]
    pub fn resolve_action(&self, action: &str) -> Option<(&Switch, ToggleState)> {
        let action = action.to_ascii_lowercase();
        self.switches.iter().find_map(|switch| {
            [ToggleState::On, ToggleState::Off]
                .into_iter()
                .find(|state| switch.action(*state) == action)
                .map(|state| (switch, state))
        })
    }

    /// Returns the switch names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.switches.iter().map(Switch::name)
    }

    /// Iterates over the switches.
    pub fn iter(&self) -> impl Iterator<Item = &Switch> {
        self.switches.iter()
    }

    /// Returns the number of switches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.switches.len()
    }

    /// Returns true if no switch is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.switches.is_empty()
    }
}

impl Default for SwitchBoard {
    /// The light, fan, and charger of the Nikoo home.
    fn default() -> Self {
        let defaults = [
            ("light", "Switch-1", "ion-tg-5"),
            ("fan", "Fan-1", "ion-tg-9"),
            ("charger", "Switch-2", "ion-tg-6"),
        ];
        Self {
            switches: defaults
                .into_iter()
                .map(|(name, label, key)| Switch {
                    name: name.to_string(),
                    control: Control::new(label, key),
                })
                .collect(),
        }
    }
}
