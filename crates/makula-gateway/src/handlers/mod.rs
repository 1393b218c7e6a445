// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.

pub mod api;
pub mod auth;
pub mod waste;

use axum::http::StatusCode;
use axum::Json;
use makula_core::MakulaError;
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// GET /health
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Maps a flow error to its HTTP status.
pub fn error_status(err: &MakulaError) -> StatusCode {
    match err {
        MakulaError::Validation(_) => StatusCode::BAD_REQUEST,
        MakulaError::AuthFailure => StatusCode::UNAUTHORIZED,
        MakulaError::NotFound { .. } => StatusCode::NOT_FOUND,
        MakulaError::DuplicateLogin => StatusCode::CONFLICT,
        MakulaError::Config(_)
        | MakulaError::Storage { .. }
        | MakulaError::Media { .. }
        | MakulaError::Channel { .. }
        | MakulaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Converts a flow error into the JSON error response.
///
/// Upstream failures are logged server-side and collapsed into one generic
/// message; validation-class errors surface their specific reason.
pub fn error_response(err: MakulaError) -> (StatusCode, Json<ErrorResponse>) {
    let status = error_status(&err);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "request failed");
        "server error, try again later".to_string()
    } else {
        err.to_string()
    };
    (
        status,
        Json(ErrorResponse { error: message }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_the_error_taxonomy() {
        assert_eq!(
            error_status(&MakulaError::Validation("bad".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_status(&MakulaError::AuthFailure),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            error_status(&MakulaError::not_found("user")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            error_status(&MakulaError::DuplicateLogin),
            StatusCode::CONFLICT
        );
        assert_eq!(
            error_status(&MakulaError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_errors_are_collapsed() {
        let (status, body) = error_response(MakulaError::Storage {
            source: "disk full".into(),
        });
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.error, "server error, try again later");
    }

    #[test]
    fn validation_errors_keep_their_reason() {
        let (status, body) =
            error_response(MakulaError::Validation("weight must be greater than 0".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error, "weight must be greater than 0");
    }
}
