// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web submission surface for logged-in users.
//!
//! The single-request equivalent of the conversational flow: one multipart
//! form carries weight, paper type, date, optional coordinates, and an
//! optional photo file which is uploaded inline before the record insert.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use makula_auth::SessionUser;
use makula_core::types::{NewSubmission, PaperType, Role, StatsSummary, SubmissionRecord};
use makula_core::MakulaError;
use serde::Serialize;
use tracing::info;

use crate::auth::current_user;
use crate::handlers::{error_response, ErrorResponse};
use crate::server::GatewayState;

/// How many records the web history view returns.
const WEB_HISTORY_LIMIT: u32 = 50;

/// Response body for POST /waste/add.
#[derive(Debug, Serialize)]
pub struct AddResponse {
    pub record_id: i64,
}

/// The submission form fields accumulated from the multipart body.
#[derive(Debug, Default)]
struct AddForm {
    weight: Option<f64>,
    paper_type_id: Option<i64>,
    date: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    /// Target account; only honored for admin callers.
    user_id: Option<i64>,
    photo: Option<(Vec<u8>, String)>,
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "not logged in".into(),
        }),
    )
        .into_response()
}

fn require_user(state: &GatewayState, jar: &CookieJar) -> Result<SessionUser, Response> {
    current_user(state, jar)
        .map(|(_, user)| user)
        .ok_or_else(unauthorized)
}

async fn read_form(multipart: &mut Multipart) -> Result<AddForm, MakulaError> {
    let mut form = AddForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MakulaError::Validation(format!("malformed form: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "photo" {
            let filename = field
                .file_name()
                .unwrap_or("photo.jpg")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| MakulaError::Validation(format!("malformed photo field: {e}")))?;
            if !data.is_empty() {
                form.photo = Some((data.to_vec(), filename));
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| MakulaError::Validation(format!("malformed field {name}: {e}")))?;
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match name.as_str() {
            "weight" => form.weight = value.parse().ok(),
            "paper_type_id" => form.paper_type_id = value.parse().ok(),
            "date" => form.date = Some(value.to_string()),
            "latitude" => form.latitude = value.parse().ok(),
            "longitude" => form.longitude = value.parse().ok(),
            "user_id" => form.user_id = value.parse().ok(),
            _ => {}
        }
    }
    Ok(form)
}

/// POST /waste/add
///
/// Admin callers may submit on behalf of a worker via `user_id`; everyone
/// else records against their own account.
pub async fn post_add(
    State(state): State<GatewayState>,
    jar: CookieJar,
    mut multipart: Multipart,
) -> Response {
    let user = match require_user(&state, &jar) {
        Ok(user) => user,
        Err(response) => return response,
    };

    let form = match read_form(&mut multipart).await {
        Ok(form) => form,
        Err(err) => return error_response(err).into_response(),
    };

    let Some(weight) = form.weight.filter(|w| w.is_finite() && *w > 0.0) else {
        return error_response(MakulaError::Validation(
            "weight must be greater than 0".into(),
        ))
        .into_response();
    };

    let account_id = match (user.role, form.user_id) {
        (Role::Admin, Some(target)) => target,
        _ => user.account_id,
    };

    let photo_url = match form.photo {
        Some((data, filename)) => {
            let Some(media) = state.media.as_ref() else {
                return error_response(MakulaError::Validation(
                    "photo uploads are not available".into(),
                ))
                .into_response();
            };
            match media.upload_photo(data, &filename).await {
                Ok(url) => Some(url),
                Err(err) => return error_response(err).into_response(),
            }
        }
        None => None,
    };

    let submission = NewSubmission {
        account_id,
        date: form
            .date
            .unwrap_or_else(|| chrono::Utc::now().date_naive().to_string()),
        paper_type_id: form.paper_type_id,
        weight,
        photo_url,
        latitude: form.latitude,
        longitude: form.longitude,
    };

    match state.records.insert_submission(&submission).await {
        Ok(record_id) => {
            info!(account_id, record_id, weight, "submission recorded via web form");
            (StatusCode::CREATED, Json(AddResponse { record_id })).into_response()
        }
        Err(err) => error_response(err).into_response(),
    }
}

/// GET /waste/history
pub async fn get_history(State(state): State<GatewayState>, jar: CookieJar) -> Response {
    let user = match require_user(&state, &jar) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state
        .records
        .recent_for_account(user.account_id, WEB_HISTORY_LIMIT)
        .await
    {
        Ok(records) => Json::<Vec<SubmissionRecord>>(records).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// GET /waste/stats
pub async fn get_stats(State(state): State<GatewayState>, jar: CookieJar) -> Response {
    let user = match require_user(&state, &jar) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.records.stats_for_account(user.account_id).await {
        Ok(stats) => Json::<StatsSummary>(stats).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// GET /waste/types
pub async fn get_types(State(state): State<GatewayState>, jar: CookieJar) -> Response {
    if require_user(&state, &jar).is_err() {
        return unauthorized();
    }
    match state.records.list_paper_types().await {
        Ok(types) => Json::<Vec<PaperType>>(types).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_form_defaults_are_empty() {
        let form = AddForm::default();
        assert!(form.weight.is_none());
        assert!(form.photo.is_none());
        assert!(form.user_id.is_none());
    }

    #[test]
    fn add_response_serializes() {
        let json = serde_json::to_string(&AddResponse { record_id: 3 }).unwrap();
        assert_eq!(json, r#"{"record_id":3}"#);
    }
}
