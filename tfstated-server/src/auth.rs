//! HTTP Basic authentication guard.
//!
//! Composed as middleware ahead of the state and lock handlers; the storage
//! core never sees an unauthorized request and knows nothing about
//! authentication.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose, Engine as _};
use std::sync::Arc;
use tracing::warn;

use crate::{AppState, BasicCredentials};

/// Check an `Authorization` header value against the configured credentials.
pub fn check_credentials(expected: &BasicCredentials, header_value: &str) -> bool {
    let encoded = match header_value.strip_prefix("Basic ") {
        Some(rest) => rest.trim(),
        None => return false,
    };
    let decoded = match general_purpose::STANDARD.decode(encoded) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let decoded = match String::from_utf8(decoded) {
        Ok(text) => text,
        Err(_) => return false,
    };
    let Some((username, password)) = decoded.split_once(':') else {
        return false;
    };
    username == expected.username && password == expected.password
}

pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(credentials) = &state.credentials else {
        return next.run(request).await;
    };

    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| check_credentials(credentials, value));

    if authorized {
        next.run(request).await
    } else {
        warn!("Rejected request to {} with missing or invalid credentials", request.uri().path());
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"Login Required\"")],
            "Could not verify your access level for that URL.\n\
             You have to login with proper credentials",
        )
            .into_response()
    }
}
