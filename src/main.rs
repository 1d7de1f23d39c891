// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Smarteefi dashboard controller.
//!
//! Usage:
//!   smarteefi-ctl serve [--bind 0.0.0.0:9000]
//!   smarteefi-ctl interactive
//!
//! Credentials come from `--email`/`--password` or the environment,
//! which is seeded from `environment_keys.env` and `.env` if present.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use smarteefi_ctl::cli::Console;
use smarteefi_ctl::server::{self, ApiState};
use smarteefi_ctl::webdriver::{self, BootstrapConfig, Credentials, SurfaceConfig, WebDriverConfig};
use smarteefi_ctl::{Error, Switch, SwitchBoard, ToggleReconciler};
use tokio::io::BufReader;

#[derive(Parser)]
#[command(name = "smarteefi-ctl")]
#[command(about = "Control Smarteefi switches through the web dashboard")]
struct Cli {
    /// WebDriver server (e.g. chromedriver) URL
    #[arg(long, env = "WEBDRIVER_URL", default_value = WebDriverConfig::DEFAULT_URL)]
    webdriver_url: String,

    /// Run the browser without a window
    #[arg(long, env = "SMARTEEFI_HEADLESS")]
    headless: bool,

    /// Dashboard account email
    #[arg(long, env = "SMARTEEFI_EMAIL")]
    email: String,

    /// Dashboard account password
    #[arg(long, env = "SMARTEEFI_PASSWORD", hide_env_values = true)]
    password: String,

    /// Home to select after login
    #[arg(long, env = "SMARTEEFI_SITE", default_value = BootstrapConfig::DEFAULT_SITE)]
    site: String,

    /// Extra switch, repeatable
    #[arg(long = "switch", value_name = "NAME=LABEL:KEY")]
    switches: Vec<Switch>,

    /// Seconds to wait for the dashboard to reflect a change
    #[arg(long, default_value_t = 60)]
    deadline_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:9000")]
        bind: SocketAddr,
    },
    /// Prompt for switches on the console
    Interactive,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::from_filename("environment_keys.env").ok();
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Exiting after fatal error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> smarteefi_ctl::Result<()> {
    let mut switches = SwitchBoard::default();
    for switch in cli.switches {
        switches.register(switch)?;
    }
    for switch in switches.iter() {
        tracing::debug!(name = switch.name(), control = %switch.control(), "Registered switch");
    }

    let webdriver = WebDriverConfig::new(cli.webdriver_url).with_headless(cli.headless);
    let bootstrap =
        BootstrapConfig::new(Credentials::new(cli.email, cli.password)).with_site(cli.site);
    let deadline = Duration::from_secs(cli.deadline_secs);

    let surface = webdriver::launch(&webdriver, &bootstrap, SurfaceConfig::default()).await?;
    let session = surface.session().clone();
    let reconciler = Arc::new(ToggleReconciler::new(surface));

    let result = match cli.command {
        Command::Serve { bind } => {
            let state = ApiState::new(Arc::clone(&reconciler), switches).with_deadline(deadline);
            server::run_server(state, bind).await
        }
        Command::Interactive => {
            let mut console = Console::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout());
            console.run(&*reconciler, &switches, deadline).await
        }
    };

    // Server workers may still hold the reconciler, so close through a clone.
    match session.close().await {
        Ok(()) => tracing::info!("Browser session closed"),
        Err(e) => tracing::warn!(error = %e, "Failed to close browser session"),
    }
    result.map_err(Error::from)
}
