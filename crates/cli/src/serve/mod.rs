//! `formkit serve` -- HTTP JSON API over the form engine.
//!
//! Security features:
//! - CORS headers on all responses (permissive for local dev)
//! - Request body size limit (default 1 MB, `server.body_limit`)
//! - Optional API key authentication via FORMKIT_API_KEY or `server.api_key`
//!
//! Endpoints:
//! - GET  /health                     - Server status (exempt from auth)
//! - GET  /forms                      - List loaded form definitions
//! - GET  /forms/{id}                 - One definition
//! - POST /forms/{id}/validate        - Run the gate against an instance
//! - POST /forms/{id}/submit          - Gate and store an instance
//! - POST /forms/{id}/sessions        - Open an editing session
//! - GET  /sessions/{sid}             - Render a session (?mode=edit|print)
//! - DELETE /sessions/{sid}           - Discard a session
//! - POST /sessions/{sid}/commands    - Apply one edit command
//! - PUT  /sessions/{sid}/mode        - Switch between edit and print
//! - POST /sessions/{sid}/submit      - Gate and store; closes the session
//! - GET  /submissions                - List stored submissions
//! - GET  /submissions/{id}           - One stored submission
//!
//! All responses use Content-Type: application/json.

mod handlers;
mod middleware;
mod sessions;
mod state;

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{middleware as axum_middleware, Json, Router};
use formkit_core::FormDefinition;
use formkit_storage::InMemorySubmissionStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use self::handlers::{
    handle_get_form, handle_get_submission, handle_health, handle_list_forms,
    handle_list_submissions, handle_not_found, handle_submit_form, handle_validate_form,
};
use self::middleware::auth_middleware;
use self::sessions::{
    handle_apply_command, handle_create_session, handle_delete_session, handle_get_session,
    handle_set_mode, handle_submit_session,
};
use self::state::AppState;
use crate::config::{collect_definition_paths, FormkitConfig};

/// Default request body limit: 1 MB.
const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Default port when neither the flag nor the config names one.
const DEFAULT_PORT: u16 = 8080;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

/// Load every definition under `paths`. A definition that fails to parse or
/// check is skipped with a warning; the server starts with the rest.
fn load_forms(paths: &[PathBuf]) -> Result<BTreeMap<String, Arc<FormDefinition>>, String> {
    let mut forms = BTreeMap::new();
    for path in collect_definition_paths(paths)? {
        let def = match FormDefinition::load(&path) {
            Ok(def) => def,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping form definition");
                continue;
            }
        };
        if let Err(errs) = formkit_core::check(&def) {
            for e in &errs {
                tracing::warn!(path = %path.display(), error = %e, "definition check failed");
            }
            continue;
        }
        tracing::info!(form = %def.id, path = %path.display(), "loaded form definition");
        if forms.insert(def.id.clone(), Arc::new(def)).is_some() {
            tracing::warn!(path = %path.display(), "form id loaded twice; keeping the later file");
        }
    }
    Ok(forms)
}

/// Build the router over a prepared state.
fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/forms", get(handle_list_forms))
        .route("/forms/{id}", get(handle_get_form))
        .route("/forms/{id}/validate", post(handle_validate_form))
        .route("/forms/{id}/submit", post(handle_submit_form))
        .route("/forms/{id}/sessions", post(handle_create_session))
        .route(
            "/sessions/{sid}",
            get(handle_get_session).delete(handle_delete_session),
        )
        .route("/sessions/{sid}/commands", post(handle_apply_command))
        .route("/sessions/{sid}/mode", put(handle_set_mode))
        .route("/sessions/{sid}/submit", post(handle_submit_session))
        .route("/submissions", get(handle_list_submissions))
        .route("/submissions/{id}", get(handle_get_submission))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Start the HTTP server.
///
/// The port comes from `--port`, then `server.port`, then 8080. Definitions
/// come from the command line plus `forms.paths`.
pub async fn start_server(
    port: Option<u16>,
    config: FormkitConfig,
    definition_paths: Vec<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut paths = definition_paths;
    paths.extend(config.forms.paths.iter().cloned());
    let forms = load_forms(&paths)?;

    let api_key = std::env::var("FORMKIT_API_KEY")
        .ok()
        .or(config.server.api_key)
        .filter(|k| !k.is_empty());
    if api_key.is_some() {
        tracing::info!("API key authentication enabled");
    }

    let state = Arc::new(AppState {
        forms,
        sessions: tokio::sync::RwLock::new(HashMap::new()),
        store: Box::new(InMemorySubmissionStore::new()),
        api_key,
    });
    let app = router(
        state,
        config.server.body_limit.unwrap_or(DEFAULT_BODY_LIMIT),
    );

    let port = port.or(config.server.port).unwrap_or(DEFAULT_PORT);
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("formkit listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shut down");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("received shutdown signal");
}
