// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP front end.
//!
//! | Route | Effect |
//! |---|---|
//! | `GET /` | liveness message |
//! | `POST /{name}on`, `POST /{name}off` | reconcile the named switch |
//!
//! Toggle routes answer `{"success": bool, "message": string}` with
//! status 200 on success and 400 on failure.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::{App, HttpResponse, HttpServer, web};
use serde_json::json;
use tracing_actix_web::TracingLogger;

use crate::reconcile::{DEFAULT_DEADLINE, OutcomeResponse, ToggleReconciler};
use crate::surface::ControlSurface;
use crate::switchboard::SwitchBoard;

/// Liveness message returned by `GET /`.
pub const RUNNING_MESSAGE: &str = "Smarteefi Control API is running.";

/// Shared state behind the routes.
#[derive(Debug)]
pub struct ApiState<S> {
    reconciler: Arc<ToggleReconciler<S>>,
    switches: SwitchBoard,
    deadline: Duration,
}

impl<S: ControlSurface> ApiState<S> {
    /// Creates the state with the default 60 second deadline.
    #[must_use]
    pub fn new(reconciler: Arc<ToggleReconciler<S>>, switches: SwitchBoard) -> Self {
        Self {
            reconciler,
            switches,
            deadline: DEFAULT_DEADLINE,
        }
    }

    /// Sets the convergence deadline used for every toggle request.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Registers the routes for a surface type.
pub fn configure<S: ControlSurface + 'static>(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/{action}", web::post().to(toggle::<S>));
}

/// Serves the API on `bind` until the server stops.
///
/// # Errors
///
/// Returns error if the address cannot be bound.
pub async fn run_server<S>(state: ApiState<S>, bind: SocketAddr) -> std::io::Result<()>
where
    S: ControlSurface + Send + 'static,
{
    let data = web::Data::new(state);

    tracing::info!(%bind, switches = data.switches.len(), "Starting HTTP server");

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(data.clone())
            .configure(configure::<S>)
    })
    .workers(1)
    .bind(bind)?
    .run()
    .await
}

async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": RUNNING_MESSAGE }))
}

async fn toggle<S: ControlSurface + 'static>(
    state: web::Data<ApiState<S>>,
    action: web::Path<String>,
) -> HttpResponse {
    let action = action.into_inner();
    let Some((switch, desired)) = state.switches.resolve_action(&action) else {
        return HttpResponse::NotFound().json(OutcomeResponse {
            success: false,
            message: format!("Unknown switch action '{action}'."),
        });
    };

    let control = switch.control().clone();
    let reconciler = Arc::clone(&state.reconciler);
    let deadline = state.deadline;

    // Detached so a client hanging up cannot abort a half-finished toggle.
    let task = actix_web::rt::spawn(async move {
        reconciler
            .reconcile(&control, desired, deadline)
            .await
            .to_response()
    });

    let body = match task.await {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(%action, error = %e, "Reconciliation task failed");
            OutcomeResponse {
                success: false,
                message: format!("An unexpected error occurred while handling '{action}'."),
            }
        }
    };

    if body.success {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::BadRequest().json(body)
    }
}
