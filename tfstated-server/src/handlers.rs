//! HTTP handlers for state and lock operations.
//!
//! These are thin: each handler translates one request into calls on
//! [`StateStore`](tfstated_core::StateStore) /
//! [`LockRegistry`](tfstated_core::LockRegistry) and maps the outcome to the
//! wire contract Terraform's `http` backend expects.

use axum::{
    extract::{Path, Query, State},
    http::{Method, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{any, get},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use tfstated_core::{LockRecord, StoreError};

use crate::{auth, AppState};

/// Error responses, mirrored onto the status codes Terraform understands:
/// 404 for absent state, 409 for lock conflicts, 423 for lock collisions,
/// 500 for storage failures.
pub enum ApiError {
    NotFound,
    Conflict(String),
    Locked(String),
    MethodNotAllowed,
    Internal(String),
}

impl ApiError {
    fn from_store(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound,
            StoreError::Conflict(message) => ApiError::Conflict(message),
            StoreError::AlreadyLocked => ApiError::Locked("A lock already exists".to_string()),
            StoreError::Io(err) => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            ApiError::Conflict(message) => (
                StatusCode::CONFLICT,
                Json(json!({"error": "Conflict", "message": message})),
            )
                .into_response(),
            ApiError::Locked(message) => (
                StatusCode::LOCKED,
                Json(json!({"error": "Locked", "message": message})),
            )
                .into_response(),
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED.into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal Server Error",
                    "message": format!("An unexpected error occurred:\n{message}\n"),
                })),
            )
                .into_response(),
        }
    }
}

#[derive(Deserialize)]
pub struct LockQuery {
    /// Lock token the writer claims to hold, as sent by Terraform's
    /// `?ID=...` query parameter. Optional: a write without a token is
    /// always permitted (the lock protocol is advisory).
    #[serde(rename = "ID")]
    id: Option<String>,
}

async fn get_state(
    State(state): State<Arc<AppState>>,
    Path((user_id, project_name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    match state.state_store.get(&user_id, &project_name) {
        Ok(document) => Ok(Json(document)),
        Err(StoreError::NotFound) => Err(ApiError::NotFound),
        Err(err) => {
            error!("Error retrieving state for {user_id}/{project_name}: {err}");
            Err(ApiError::from_store(err))
        }
    }
}

async fn put_state(
    State(state): State<Arc<AppState>>,
    Path((user_id, project_name)): Path<(String, String)>,
    Query(query): Query<LockQuery>,
    Json(document): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    // A supplied lock token must name an existing lock before the store is
    // touched at all.
    if let Some(lock_id) = query.id.as_deref() {
        let held = state.lock_registry.exists(lock_id).map_err(|err| {
            error!("Error verifying lock {lock_id}: {err}");
            ApiError::from_store(err)
        })?;
        if !held {
            return Err(ApiError::Conflict(
                "The requested lock does not exist".to_string(),
            ));
        }
    }

    state
        .state_store
        .put(&user_id, &project_name, document)
        .map_err(|err| {
            error!("Error saving state for {user_id}/{project_name}: {err}");
            ApiError::from_store(err)
        })?;

    Ok(Json(json!({"status": "Created"})))
}

async fn delete_state(
    State(state): State<Arc<AppState>>,
    Path((user_id, project_name)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    match state.state_store.delete(&user_id, &project_name) {
        Ok(()) => Ok(Json(json!({"status": "Deleted"}))),
        // Deleting state that was never written surfaces as a server error,
        // not a 404; existing clients depend on that contract.
        Err(StoreError::NotFound) => {
            error!("Error deleting state for {user_id}/{project_name}: no state exists");
            Err(ApiError::Internal(format!(
                "no state exists for {user_id}/{project_name}"
            )))
        }
        Err(err) => {
            error!("Error deleting state for {user_id}/{project_name}: {err}");
            Err(ApiError::from_store(err))
        }
    }
}

async fn lock_state(
    State(state): State<Arc<AppState>>,
    method: Method,
    Json(record): Json<LockRecord>,
) -> Result<Json<Value>, ApiError> {
    // Terraform's http backend defaults to the nonstandard LOCK verb; POST
    // is accepted for clients configured with standard methods only.
    if method != Method::POST && method.as_str() != "LOCK" {
        return Err(ApiError::MethodNotAllowed);
    }

    match state.lock_registry.create(&record) {
        Ok(true) => {
            info!("Lock {} acquired", record.id);
            Ok(Json(json!({"status": "Locked"})))
        }
        Ok(false) => Err(ApiError::Locked("A Lock already exists".to_string())),
        Err(err) => {
            error!("Error creating lock {}: {err}", record.id);
            Err(ApiError::from_store(err))
        }
    }
}

async fn unlock_state(
    State(state): State<Arc<AppState>>,
    method: Method,
    Json(record): Json<LockRecord>,
) -> Result<Json<Value>, ApiError> {
    if method != Method::POST && method != Method::DELETE && method.as_str() != "UNLOCK" {
        return Err(ApiError::MethodNotAllowed);
    }

    match state.lock_registry.remove(&record.id) {
        Ok(true) => {
            info!("Lock {} released", record.id);
            Ok(Json(json!({"status": "Unlocked"})))
        }
        Ok(false) => Err(ApiError::Conflict("Lock does not exist.".to_string())),
        Err(err) => {
            error!("Error removing lock {}: {err}", record.id);
            Err(ApiError::from_store(err))
        }
    }
}

pub fn api_router(middleware_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/state/:user_id/:project_name",
            get(get_state).post(put_state).delete(delete_state),
        )
        .route("/lock", any(lock_state))
        .route("/unlock", any(unlock_state))
        .route_layer(middleware::from_fn_with_state(
            middleware_state,
            auth::require_auth,
        ))
}
