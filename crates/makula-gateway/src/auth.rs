// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request authentication for the gateway.
//!
//! Two surfaces, two schemes:
//! - the bot-facing `/api` routes require an `x-api-key` header matching the
//!   configured key; with no key configured, all API requests are rejected
//!   (fail-closed);
//! - the web routes carry an opaque session cookie resolved against the
//!   in-process [`SessionManager`].

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use makula_auth::SessionUser;

use crate::server::GatewayState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "makula_session";

/// API key configuration for the bot-facing routes.
#[derive(Clone)]
pub struct ApiKeyConfig {
    /// Expected key. `None` rejects all API requests.
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ApiKeyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Middleware validating the `x-api-key` header on the bot-facing routes.
pub async fn api_key_middleware(
    State(config): State<ApiKeyConfig>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let Some(ref expected) = config.api_key else {
        tracing::error!("gateway has no api key configured -- rejecting API request");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let provided = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok());

    match provided {
        Some(key) if key == expected => Ok(next.run(request).await),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

/// The session token presented by the request, if any.
pub fn session_token(jar: &CookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE).map(|c| c.value().to_string())
}

/// Resolves the request's session cookie to an authenticated user.
pub fn current_user(state: &GatewayState, jar: &CookieJar) -> Option<(String, SessionUser)> {
    let token = session_token(jar)?;
    let user = state.sessions.user(&token)?;
    Some((token, user))
}

/// Builds the session cookie for a (new) token.
pub fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .build()
}

/// Builds the removal cookie used on logout.
pub fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build()
}
