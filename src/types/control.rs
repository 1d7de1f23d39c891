// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity of a single dashboard switch.

use std::fmt;

/// One physical switch as it appears on the dashboard.
///
/// The `label` is the text shown next to the toggle; the `state_key` names
/// the hidden input that carries its current value.
///
/// # Examples
///
/// ```
/// use smarteefi_ctl::types::Control;
///
/// let control = Control::new("Switch-1", "ion-tg-5");
/// assert_eq!(control.label(), "Switch-1");
/// assert_eq!(control.state_key(), "ion-tg-5");
/// assert_eq!(control.display_label(), "Switch-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Control {
    label: String,
    state_key: String,
}

impl Control {
    /// Creates a control from its label and state attribute key.
    #[must_use]
    pub fn new(label: impl Into<String>, state_key: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            state_key: state_key.into(),
        }
    }

    /// Returns the dashboard label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the name of the hidden input holding the state.
    #[must_use]
    pub fn state_key(&self) -> &str {
        &self.state_key
    }

    /// Returns the label with the first character uppercased and the rest lowercased.
    #[must_use]
    pub fn display_label(&self) -> String {
        let mut chars = self.label.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.state_key)
    }
}
