// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot-facing API, guarded by the `x-api-key` middleware.
//!
//! This is the system boundary the bot process submits through: record
//! surrender, identity resolution and linking, stats, history, and the
//! paper-type list.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use makula_core::types::{NewSubmission, PaperType, StatsSummary, SubmissionRecord};
use makula_core::MakulaError;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::handlers::error_response;
use crate::server::GatewayState;

/// Request body for POST /api/surrender.
#[derive(Debug, Deserialize)]
pub struct SurrenderRequest {
    pub telegram_id: i64,
    pub weight: f64,
    #[serde(default)]
    pub paper_type_id: Option<i64>,
    pub latitude: f64,
    pub longitude: f64,
    /// ISO 8601 calendar date of the surrender.
    pub date: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Response body for POST /api/surrender.
#[derive(Debug, Serialize)]
pub struct SurrenderResponse {
    pub record_id: i64,
}

/// Request body for POST /api/link-telegram.
#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub telegram_id: i64,
    pub account_id: i64,
}

/// Response body for GET /api/resolve/{login}.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub account_id: i64,
}

/// GET /api/paper-types
pub async fn get_paper_types(State(state): State<GatewayState>) -> Response {
    match state.records.list_paper_types().await {
        Ok(types) => Json::<Vec<PaperType>>(types).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// POST /api/surrender
///
/// Resolves the external identity, then persists the record. Responds 404
/// when the identity is not linked to any account and 400 on a bad weight.
pub async fn post_surrender(
    State(state): State<GatewayState>,
    Json(body): Json<SurrenderRequest>,
) -> Response {
    if !body.weight.is_finite() || body.weight <= 0.0 {
        return error_response(MakulaError::Validation(
            "weight must be greater than 0".into(),
        ))
        .into_response();
    }

    let account_id = match state.links.resolve(body.telegram_id).await {
        Ok(Some(id)) => id,
        Ok(None) => {
            return error_response(MakulaError::not_found("linked account")).into_response();
        }
        Err(err) => return error_response(err).into_response(),
    };

    let submission = NewSubmission {
        account_id,
        date: body.date,
        paper_type_id: body.paper_type_id,
        weight: body.weight,
        photo_url: body.photo_url,
        latitude: Some(body.latitude),
        longitude: Some(body.longitude),
    };

    match state.records.insert_submission(&submission).await {
        Ok(record_id) => {
            info!(
                telegram_id = body.telegram_id,
                account_id, record_id, "surrender recorded via API"
            );
            Json(SurrenderResponse { record_id }).into_response()
        }
        Err(err) => error_response(err).into_response(),
    }
}

/// POST /api/link-telegram
///
/// Verifies the account exists, then links. Idempotent for a pair that is
/// already linked.
pub async fn post_link_telegram(
    State(state): State<GatewayState>,
    Json(body): Json<LinkRequest>,
) -> Response {
    match state.auth.account_exists(body.account_id).await {
        Ok(true) => {}
        Ok(false) => {
            return error_response(MakulaError::not_found("account")).into_response();
        }
        Err(err) => return error_response(err).into_response(),
    }

    match state.links.link(body.telegram_id, body.account_id).await {
        Ok(()) => {
            info!(
                telegram_id = body.telegram_id,
                account_id = body.account_id,
                "identity linked via API"
            );
            Json(serde_json::json!({ "ok": true })).into_response()
        }
        Err(err) => error_response(err).into_response(),
    }
}

/// GET /api/resolve/{login}
pub async fn get_resolve(
    State(state): State<GatewayState>,
    Path(login): Path<String>,
) -> Response {
    match state.auth.resolve_login(&login).await {
        Ok(account_id) => Json(ResolveResponse { account_id }).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// GET /api/stats/{telegram_id}
pub async fn get_stats(
    State(state): State<GatewayState>,
    Path(telegram_id): Path<i64>,
) -> Response {
    match resolve_linked(&state, telegram_id).await {
        Ok(account_id) => match state.records.stats_for_account(account_id).await {
            Ok(stats) => Json::<StatsSummary>(stats).into_response(),
            Err(err) => error_response(err).into_response(),
        },
        Err(response) => response,
    }
}

/// GET /api/history/{telegram_id}
pub async fn get_history(
    State(state): State<GatewayState>,
    Path(telegram_id): Path<i64>,
) -> Response {
    match resolve_linked(&state, telegram_id).await {
        Ok(account_id) => match state.records.recent_for_account(account_id, 5).await {
            Ok(records) => Json::<Vec<SubmissionRecord>>(records).into_response(),
            Err(err) => error_response(err).into_response(),
        },
        Err(response) => response,
    }
}

async fn resolve_linked(state: &GatewayState, telegram_id: i64) -> Result<i64, Response> {
    match state.links.resolve(telegram_id).await {
        Ok(Some(account_id)) => Ok(account_id),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(crate::handlers::ErrorResponse {
                error: "linked account not found".into(),
            }),
        )
            .into_response()),
        Err(err) => Err(error_response(err).into_response()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surrender_request_deserializes_with_optionals_absent() {
        let json = r#"{
            "telegram_id": 42,
            "weight": 12.5,
            "latitude": 55.75,
            "longitude": 37.61,
            "date": "2026-08-06"
        }"#;
        let request: SurrenderRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.telegram_id, 42);
        assert_eq!(request.weight, 12.5);
        assert!(request.paper_type_id.is_none());
        assert!(request.photo_url.is_none());
    }

    #[test]
    fn surrender_request_rejects_missing_required_field() {
        // No weight.
        let json = r#"{
            "telegram_id": 42,
            "latitude": 55.75,
            "longitude": 37.61,
            "date": "2026-08-06"
        }"#;
        assert!(serde_json::from_str::<SurrenderRequest>(json).is_err());
    }

    #[test]
    fn link_request_deserializes() {
        let request: LinkRequest =
            serde_json::from_str(r#"{"telegram_id": 42, "account_id": 7}"#).unwrap();
        assert_eq!(request.telegram_id, 42);
        assert_eq!(request.account_id, 7);
    }

    #[test]
    fn surrender_response_serializes() {
        let json = serde_json::to_string(&SurrenderResponse { record_id: 9 }).unwrap();
        assert_eq!(json, r#"{"record_id":9}"#);
    }
}
