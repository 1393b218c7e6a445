// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web auth surface: session introspection, login, logout, registration,
//! the forced password-change gate, and bootstrap setup.
//!
//! All handlers authenticate via the session cookie. Unlike the bot
//! surface, login errors here keep the distinct "user not found" / "invalid
//! password" messages.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Form, Json};
use axum_extra::extract::cookie::CookieJar;
use makula_auth::{LoginOutcome, RegisterRequest};
use makula_core::types::Role;
use serde::{Deserialize, Serialize};

use crate::auth::{current_user, removal_cookie, session_cookie, session_token};
use crate::handlers::{error_response, ErrorResponse};
use crate::server::GatewayState;

/// Request body for POST /auth/login.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub login: String,
    pub password: String,
}

/// Request body for POST /auth/register and /auth/setup.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub name: String,
    pub login: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

/// Request body for POST /auth/password.
#[derive(Debug, Deserialize)]
pub struct PasswordForm {
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

/// The authenticated identity as exposed to the client.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub must_change_password: bool,
}

/// Response body for GET /auth/session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: Option<UserInfo>,
    /// One-shot success notice; reading it clears it.
    pub success: Option<String>,
    /// One-shot error notice; reading it clears it.
    pub error: Option<String>,
}

/// Response body for POST /auth/login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// When set, the client must continue at the password-change step
    /// before anything else.
    pub password_change_required: bool,
}

/// Response body for registration and setup.
#[derive(Debug, Serialize)]
pub struct RegisteredResponse {
    pub id: i64,
}

/// GET /auth/session
///
/// Returns the current identity plus the pending one-shot notices (cleared
/// by this read). The client renders these the way the old server-side
/// templates rendered flash messages.
pub async fn get_session(State(state): State<GatewayState>, jar: CookieJar) -> Response {
    let user = current_user(&state, &jar).map(|(_, user)| UserInfo {
        id: user.account_id,
        name: user.name,
        role: user.role,
        must_change_password: user.must_change_password,
    });
    let notices = match session_token(&jar) {
        Some(token) => state.sessions.take_notices(&token),
        None => Default::default(),
    };
    Json(SessionResponse {
        user,
        success: notices.success,
        error: notices.error,
    })
    .into_response()
}

/// POST /auth/login
///
/// On success the session token is regenerated and the new cookie set; the
/// old token no longer resolves.
pub async fn post_login(
    State(state): State<GatewayState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let old_token = session_token(&jar);
    match state
        .auth
        .login(old_token.as_deref(), &form.login, &form.password)
        .await
    {
        Ok(outcome) => {
            let password_change_required =
                matches!(outcome, LoginOutcome::PasswordChangeRequired { .. });
            let jar = jar.add(session_cookie(outcome.token().to_string()));
            (
                jar,
                Json(LoginResponse {
                    password_change_required,
                }),
            )
                .into_response()
        }
        Err(err) => error_response(err).into_response(),
    }
}

/// GET /auth/logout
pub async fn get_logout(State(state): State<GatewayState>, jar: CookieJar) -> Response {
    if let Some(token) = session_token(&jar) {
        state.auth.logout(&token);
    }
    let jar = jar.remove(removal_cookie());
    (jar, Json(serde_json::json!({ "ok": true }))).into_response()
}

/// POST /auth/register
pub async fn post_register(
    State(state): State<GatewayState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let request = RegisterRequest {
        name: form.name,
        login: form.login,
        password: form.password,
        confirm_password: form.confirm_password,
    };
    match state.auth.register(&request).await {
        Ok(id) => (StatusCode::CREATED, Json(RegisteredResponse { id })).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// POST /auth/password
///
/// The forced password-change gate: only admitted while the session's
/// forced-change flag is set; everyone else is turned away.
pub async fn post_password(
    State(state): State<GatewayState>,
    jar: CookieJar,
    Form(form): Form<PasswordForm>,
) -> Response {
    let Some((token, user)) = current_user(&state, &jar) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "not logged in".into(),
            }),
        )
            .into_response();
    };
    if !user.must_change_password {
        return (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: "password change not required".into(),
            }),
        )
            .into_response();
    }

    match state
        .auth
        .change_password(&token, &form.password, &form.confirm_password)
        .await
    {
        Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

/// POST /auth/setup
///
/// Bootstraps the first admin account; turned away once any admin exists.
pub async fn post_setup(
    State(state): State<GatewayState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    match state.auth.setup_available().await {
        Ok(true) => {}
        Ok(false) => {
            return (
                StatusCode::FORBIDDEN,
                Json(ErrorResponse {
                    error: "setup is already complete".into(),
                }),
            )
                .into_response();
        }
        Err(err) => return error_response(err).into_response(),
    }

    let request = RegisterRequest {
        name: form.name,
        login: form.login,
        password: form.password,
        confirm_password: form.confirm_password,
    };
    match state.auth.setup_admin(&request).await {
        Ok(id) => (StatusCode::CREATED, Json(RegisteredResponse { id })).into_response(),
        Err(err) => error_response(err).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_form_deserializes() {
        let form: LoginForm =
            serde_urlencoded::from_str("login=worker_1&password=Abcdef1%21").unwrap();
        assert_eq!(form.login, "worker_1");
        assert_eq!(form.password, "Abcdef1!");
    }

    #[test]
    fn register_form_uses_camel_case_confirmation() {
        let form: RegisterForm = serde_urlencoded::from_str(
            "name=Ivan&login=ivan_01&password=Abcdef1%21&confirmPassword=Abcdef1%21",
        )
        .unwrap();
        assert_eq!(form.confirm_password, "Abcdef1!");
    }

    #[test]
    fn session_response_serializes_anonymous() {
        let response = SessionResponse {
            user: None,
            success: None,
            error: None,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"user\":null"));
    }

    #[test]
    fn user_info_serializes_role_lowercase() {
        let info = UserInfo {
            id: 1,
            name: "Worker".into(),
            role: Role::Worker,
            must_change_password: false,
        };
        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"role\":\"worker\""));
    }
}
