//! Route handlers for forms and stored submissions.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use formkit_core::{validate, FormDefinition, FormInstance};
use formkit_storage::{submit_form, StorageError, SubmissionReceipt, SubmitError};
use serde::Deserialize;

use super::json_error;
use super::state::AppState;

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "formkit_version": env!("CARGO_PKG_VERSION"),
        "forms": state.forms.len(),
    });
    (StatusCode::OK, Json(response))
}

/// GET /forms
pub(crate) async fn handle_list_forms(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let forms: Vec<serde_json::Value> = state
        .forms
        .values()
        .map(|def| {
            serde_json::json!({
                "id": def.id,
                "title": def.title,
                "department": def.department,
                "fields": def.fields.len(),
                "tables": def.tables.iter().map(|t| t.key.as_str()).collect::<Vec<_>>(),
            })
        })
        .collect();
    (StatusCode::OK, Json(serde_json::json!({ "forms": forms })))
}

pub(super) fn form_not_found(id: &str) -> Response {
    json_error(StatusCode::NOT_FOUND, &format!("form '{}' not found", id)).into_response()
}

/// GET /forms/{id}
pub(crate) async fn handle_get_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.form(&id) {
        Some(def) => (StatusCode::OK, Json(def.as_ref().clone())).into_response(),
        None => form_not_found(&id),
    }
}

/// Parse a request body as an instance of `def`.
pub(super) fn parse_instance(
    def: &FormDefinition,
    body: serde_json::Value,
) -> Result<FormInstance, Response> {
    def.parse_instance(body).map_err(|e| {
        json_error(StatusCode::BAD_REQUEST, &format!("invalid instance: {}", e)).into_response()
    })
}

/// POST /forms/{id}/validate
pub(crate) async fn handle_validate_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let Some(def) = state.form(&id) else {
        return form_not_found(&id);
    };
    let inst = match parse_instance(&def, body) {
        Ok(inst) => inst,
        Err(resp) => return resp,
    };
    let report = validate(&def, &inst);
    let response = serde_json::json!({ "valid": report.is_valid(), "errors": report });
    (StatusCode::OK, Json(response)).into_response()
}

/// Map a submission outcome to a response: 201 with the receipt, 422 with
/// the blocking report, 500 for store failures.
pub(super) fn submission_response(result: Result<SubmissionReceipt, SubmitError>) -> Response {
    match result {
        Ok(receipt) => (StatusCode::CREATED, Json(receipt)).into_response(),
        Err(SubmitError::Invalid(report)) => {
            let body = serde_json::json!({
                "error": "submission blocked by validation",
                "errors": report,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response()
        }
        Err(SubmitError::Form(e)) => {
            json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response()
        }
        Err(SubmitError::Storage(e)) => {
            tracing::error!(error = %e, "submission store failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response()
        }
    }
}

/// POST /forms/{id}/submit
pub(crate) async fn handle_submit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let Some(def) = state.form(&id) else {
        return form_not_found(&id);
    };
    let inst = match parse_instance(&def, body) {
        Ok(inst) => inst,
        Err(resp) => return resp,
    };
    submission_response(submit_form(state.store.as_ref(), &def, &inst).await)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionQuery {
    form_id: Option<String>,
    /// 0 or absent = no limit.
    #[serde(default)]
    limit: usize,
}

/// GET /submissions?form_id=&limit=
pub(crate) async fn handle_list_submissions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubmissionQuery>,
) -> Response {
    match state
        .store
        .list_submissions(query.form_id.as_deref(), query.limit)
        .await
    {
        Ok(records) => {
            (StatusCode::OK, Json(serde_json::json!({ "submissions": records }))).into_response()
        }
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response(),
    }
}

/// GET /submissions/{id}
pub(crate) async fn handle_get_submission(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.store.get_submission(&id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e @ StorageError::NotFound { .. }) => {
            json_error(StatusCode::NOT_FOUND, &e.to_string()).into_response()
        }
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response(),
    }
}
