//! Editing sessions over HTTP.
//!
//! A session holds one instance on the server. Clients post commands one at
//! a time and read back the rendered form in either mode. Sessions live
//! until they are deleted or successfully submitted.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formkit_core::{FormCommand, FormError, FormSession, RenderMode};
use formkit_storage::submit_form;
use serde::Deserialize;
use uuid::Uuid;

use super::handlers::{form_not_found, parse_instance, submission_response};
use super::json_error;
use super::state::AppState;

fn session_not_found(sid: &str) -> Response {
    json_error(StatusCode::NOT_FOUND, &format!("session '{}' not found", sid)).into_response()
}

/// Status for a rejected command: a duplicate column is a conflict with the
/// current table shape, print mode locks the instance, everything else is a
/// bad request.
fn command_status(e: &FormError) -> StatusCode {
    match e {
        FormError::DuplicateColumn { .. } => StatusCode::CONFLICT,
        FormError::ReadOnly => StatusCode::LOCKED,
        _ => StatusCode::BAD_REQUEST,
    }
}

fn session_body(sid: &Uuid, session: &FormSession) -> serde_json::Value {
    serde_json::json!({
        "session_id": sid.to_string(),
        "form_id": session.definition().id,
        "mode": session.mode(),
        "instance": session.instance(),
    })
}

/// POST /forms/{id}/sessions
///
/// An empty body starts from the definition's defaults; a JSON body is taken
/// as a saved instance to resume.
pub(crate) async fn handle_create_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let Some(def) = state.form(&id) else {
        return form_not_found(&id);
    };

    let session = if body.iter().all(u8::is_ascii_whitespace) {
        FormSession::new(def)
    } else {
        let json: serde_json::Value = match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(e) => {
                return json_error(StatusCode::BAD_REQUEST, &format!("invalid JSON: {}", e))
                    .into_response()
            }
        };
        match parse_instance(&def, json) {
            Ok(inst) => FormSession::with_instance(def, inst),
            Err(resp) => return resp,
        }
    };

    let sid = Uuid::new_v4();
    let body = session_body(&sid, &session);
    state.sessions.write().await.insert(sid, session);
    tracing::info!(form = %id, session = %sid, "session opened");
    (StatusCode::CREATED, Json(body)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionQuery {
    /// Overrides the session's own mode for this one rendering.
    mode: Option<String>,
}

/// GET /sessions/{sid}?mode=edit|print
///
/// The presentation carries the current validation errors inline.
pub(crate) async fn handle_get_session(
    State(state): State<Arc<AppState>>,
    Path(sid): Path<String>,
    Query(query): Query<SessionQuery>,
) -> Response {
    let Ok(key) = sid.parse::<Uuid>() else {
        return session_not_found(&sid);
    };
    let mode = match query.mode.as_deref().map(str::parse::<RenderMode>) {
        None => None,
        Some(Ok(m)) => Some(m),
        Some(Err(e)) => return json_error(StatusCode::BAD_REQUEST, &e).into_response(),
    };

    let sessions = state.sessions.read().await;
    let Some(session) = sessions.get(&key) else {
        return session_not_found(&sid);
    };
    let presentation = session.render_as(mode.unwrap_or(session.mode()));
    (StatusCode::OK, Json(presentation)).into_response()
}

/// POST /sessions/{sid}/commands
pub(crate) async fn handle_apply_command(
    State(state): State<Arc<AppState>>,
    Path(sid): Path<String>,
    Json(command): Json<FormCommand>,
) -> Response {
    let Ok(key) = sid.parse::<Uuid>() else {
        return session_not_found(&sid);
    };
    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&key) else {
        return session_not_found(&sid);
    };

    let op = command.op();
    match session.apply(command) {
        Ok(()) => (StatusCode::OK, Json(session_body(&key, session))).into_response(),
        Err(e) => {
            tracing::info!(session = %sid, op, error = %e, "command rejected");
            json_error(command_status(&e), &e.to_string()).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ModeBody {
    mode: RenderMode,
}

/// PUT /sessions/{sid}/mode
pub(crate) async fn handle_set_mode(
    State(state): State<Arc<AppState>>,
    Path(sid): Path<String>,
    Json(body): Json<ModeBody>,
) -> Response {
    let Ok(key) = sid.parse::<Uuid>() else {
        return session_not_found(&sid);
    };
    let mut sessions = state.sessions.write().await;
    let Some(session) = sessions.get_mut(&key) else {
        return session_not_found(&sid);
    };
    session.set_mode(body.mode);
    (StatusCode::OK, Json(session_body(&key, session))).into_response()
}

/// POST /sessions/{sid}/submit
///
/// A stored submission closes the session; a blocked one leaves it open for
/// further edits.
pub(crate) async fn handle_submit_session(
    State(state): State<Arc<AppState>>,
    Path(sid): Path<String>,
) -> Response {
    let Ok(key) = sid.parse::<Uuid>() else {
        return session_not_found(&sid);
    };
    // Snapshot under the read lock; the store call runs without holding it.
    let (def, inst) = {
        let sessions = state.sessions.read().await;
        let Some(session) = sessions.get(&key) else {
            return session_not_found(&sid);
        };
        (session.definition().clone(), session.instance().clone())
    };
    let result = submit_form(state.store.as_ref(), &def, &inst).await;
    if result.is_ok() && state.sessions.write().await.remove(&key).is_some() {
        tracing::info!(session = %sid, "session closed after submit");
    }
    submission_response(result)
}

/// DELETE /sessions/{sid}
///
/// Discards the session and its unsubmitted instance.
pub(crate) async fn handle_delete_session(
    State(state): State<Arc<AppState>>,
    Path(sid): Path<String>,
) -> Response {
    let Ok(key) = sid.parse::<Uuid>() else {
        return session_not_found(&sid);
    };
    if state.sessions.write().await.remove(&key).is_none() {
        return session_not_found(&sid);
    }
    tracing::info!(session = %sid, "session closed");
    (
        StatusCode::OK,
        Json(serde_json::json!({ "session_id": sid, "closed": true })),
    )
        .into_response()
}
