// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interactive console loop.
//!
//! Asks which switch to toggle, shows its current state, asks for the
//! desired state and reports the outcome. `exit` or end of input quits.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::reconcile::ToggleReconciler;
use crate::surface::ControlSurface;
use crate::switchboard::{Switch, SwitchBoard};
use crate::types::ToggleState;

const EXIT: &str = "exit";

/// Line-oriented console over any async reader and writer.
#[derive(Debug)]
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a console.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Returns the writer, e.g. to inspect what was printed.
    pub fn into_output(self) -> W {
        self.output
    }

    /// Runs the loop until `exit` or end of input.
    ///
    /// Toggle failures are printed and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns error only if reading or writing the console fails.
    pub async fn run<S: ControlSurface>(
        &mut self,
        reconciler: &ToggleReconciler<S>,
        switches: &SwitchBoard,
        deadline: Duration,
    ) -> io::Result<()> {
        let choices = choice_list(switches);

        loop {
            let question =
                format!("Which switch do you want to toggle? (Enter {choices}, or '{EXIT}' to quit): ");
            let Some(answer) = self.ask(&question).await? else {
                break;
            };

            if answer == EXIT {
                break;
            }

            let Some(switch) = switches.get(&answer) else {
                self.say(&format!("Invalid input. Please enter {choices}, or '{EXIT}'."))
                    .await?;
                continue;
            };

            if !self.toggle(reconciler, switch, deadline).await? {
                break;
            }
        }

        self.say("Exiting the script.").await
    }

    /// Handles one switch. Returns false if input ended mid-dialogue.
    async fn toggle<S: ControlSurface>(
        &mut self,
        reconciler: &ToggleReconciler<S>,
        switch: &Switch,
        deadline: Duration,
    ) -> io::Result<bool> {
        let control = switch.control();
        let label = control.label();

        match reconciler.current_state(control).await {
            Ok(state) => {
                self.say(&format!("The {label} is currently {state}.")).await?;
            }
            Err(err) => {
                self.say(&err.to_string()).await?;
                return Ok(true);
            }
        }

        let question = format!("Do you want to turn the {label} ON or OFF? (Enter 'on' or 'off'): ");
        let desired = loop {
            let Some(answer) = self.ask(&question).await? else {
                return Ok(false);
            };
            match answer.as_str() {
                "on" => break ToggleState::On,
                "off" => break ToggleState::Off,
                _ => self.say("Invalid input. Please enter 'on' or 'off'.").await?,
            }
        };

        let outcome = reconciler.reconcile(control, desired, deadline).await;
        self.say(&outcome.message()).await?;
        Ok(true)
    }

    /// Prints `question` and reads one trimmed, lowercased line.
    /// Returns `None` at end of input.
    async fn ask(&mut self, question: &str) -> io::Result<Option<String>> {
        self.output.write_all(question.as_bytes()).await?;
        self.output.flush().await?;

        let mut line = String::new();
        if self.input.read_line(&mut line).await? == 0 {
            self.output.write_all(b"\n").await?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_lowercase()))
    }

    async fn say(&mut self, text: &str) -> io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.write_all(b"\n").await?;
        self.output.flush().await
    }
}

/// `'light', 'fan', 'charger'` for the default board.
fn choice_list(switches: &SwitchBoard) -> String {
    switches
        .names()
        .map(|name| format!("'{name}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_list_quotes_names() {
        assert_eq!(
            choice_list(&SwitchBoard::default()),
            "'light', 'fan', 'charger'"
        );
        assert_eq!(choice_list(&SwitchBoard::empty()), "");
    }
}
