// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Authentication operations: login, registration, the forced
//! password-change gate, and bootstrap admin setup.
//!
//! Per request the flow is stateless; everything that survives a request
//! lives in the [`SessionManager`] or the credential store.

use std::sync::Arc;

use makula_core::types::{Account, NewAccount, Role};
use makula_core::{CredentialStore, MakulaError};
use tracing::{info, warn};

use crate::hash;
use crate::password;
use crate::session::{SessionManager, SessionUser};

/// Registration input fields.
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub name: String,
    pub login: String,
    pub password: String,
    pub confirm_password: String,
}

/// Result of a successful login.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Fully authenticated; the caller sets the returned token as the cookie.
    Success { token: String },
    /// Credentials were correct but the account is gated behind a password
    /// change; the caller redirects to the change step.
    PasswordChangeRequired { token: String },
}

impl LoginOutcome {
    pub fn token(&self) -> &str {
        match self {
            Self::Success { token } | Self::PasswordChangeRequired { token } => token,
        }
    }
}

/// Validates credentials, enforces the password policy, and manages the web
/// session lifecycle.
pub struct AuthFlow {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<SessionManager>,
}

impl AuthFlow {
    pub fn new(credentials: Arc<dyn CredentialStore>, sessions: Arc<SessionManager>) -> Self {
        Self {
            credentials,
            sessions,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Checks a login/password pair against the credential store.
    ///
    /// Fails with [`MakulaError::NotFound`] for an unknown login and
    /// [`MakulaError::AuthFailure`] for a wrong password. Callers that must
    /// not leak the distinction collapse both into one message.
    pub async fn verify_credentials(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Account, MakulaError> {
        let account = self
            .credentials
            .find_by_login(login)
            .await?
            .ok_or_else(|| MakulaError::not_found("user"))?;

        if !hash::verify_password(password, &account.password_hash) {
            warn!(login, "login attempt with wrong password");
            return Err(MakulaError::AuthFailure);
        }
        Ok(account)
    }

    /// Performs a web login.
    ///
    /// On success the session token is regenerated (the old one is
    /// invalidated before this returns, defeating fixation) and the session
    /// is populated with the account identity. Accounts flagged for a forced
    /// password change are routed to the gate instead of completing.
    pub async fn login(
        &self,
        current_token: Option<&str>,
        login: &str,
        password: &str,
    ) -> Result<LoginOutcome, MakulaError> {
        let account = self.verify_credentials(login, password).await?;

        let token = self.sessions.regenerate(
            current_token,
            SessionUser {
                account_id: account.id,
                name: account.name.clone(),
                role: account.role,
                must_change_password: account.must_change_password,
            },
        );

        info!(login, account_id = account.id, "login successful");

        if account.must_change_password {
            return Ok(LoginOutcome::PasswordChangeRequired { token });
        }
        self.sessions.set_success(&token, "Logged in successfully");
        Ok(LoginOutcome::Success { token })
    }

    /// Destroys the session (logout).
    pub fn logout(&self, token: &str) {
        self.sessions.destroy(token);
    }

    /// Registers a new worker account.
    ///
    /// Validation order (first failure wins): login length, login charset,
    /// reserved login, password length, uppercase, lowercase, digit, special
    /// character, confirmation match, duplicate login. The created account
    /// always gets the non-privileged role with the forced-change flag clear.
    pub async fn register(&self, request: &RegisterRequest) -> Result<i64, MakulaError> {
        password::validate_login(&request.login)?;
        password::validate_password(&request.password)?;
        if request.password != request.confirm_password {
            return Err(MakulaError::Validation("passwords do not match".into()));
        }

        let password_hash = hash::hash_password(&request.password)?;
        let id = self
            .credentials
            .insert_account(&NewAccount {
                name: request.name.clone(),
                login: request.login.clone(),
                password_hash,
                role: Role::Worker,
                must_change_password: false,
            })
            .await?;

        info!(login = %request.login, account_id = id, "account registered");
        Ok(id)
    }

    /// Completes the forced password change for the session's account.
    ///
    /// Re-validates with the same complexity rules, re-hashes, persists, and
    /// clears the flag in both the store and the live session.
    pub async fn change_password(
        &self,
        token: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), MakulaError> {
        let user = self
            .sessions
            .user(token)
            .ok_or(MakulaError::AuthFailure)?;

        password::validate_password(new_password)?;
        if new_password != confirm_password {
            return Err(MakulaError::Validation("passwords do not match".into()));
        }

        let password_hash = hash::hash_password(new_password)?;
        self.credentials
            .update_password(user.account_id, &password_hash, false)
            .await?;
        self.sessions.clear_password_flag(token);
        self.sessions.set_success(token, "Password updated");

        info!(account_id = user.account_id, "forced password change completed");
        Ok(())
    }

    /// Bootstraps the first admin account.
    ///
    /// Refused once any admin exists. Uses the stronger argon2 work factor.
    pub async fn setup_admin(&self, request: &RegisterRequest) -> Result<i64, MakulaError> {
        if self.credentials.admin_exists().await? {
            return Err(MakulaError::Validation(
                "setup is already complete".into(),
            ));
        }

        password::validate_login(&request.login)?;
        password::validate_password(&request.password)?;
        if request.password != request.confirm_password {
            return Err(MakulaError::Validation("passwords do not match".into()));
        }

        let password_hash = hash::hash_password_admin(&request.password)?;
        let id = self
            .credentials
            .insert_account(&NewAccount {
                name: request.name.clone(),
                login: request.login.clone(),
                password_hash,
                role: Role::Admin,
                must_change_password: false,
            })
            .await?;

        info!(login = %request.login, account_id = id, "bootstrap admin created");
        Ok(id)
    }

    /// True until the first admin account exists (the setup gate).
    pub async fn setup_available(&self) -> Result<bool, MakulaError> {
        Ok(!self.credentials.admin_exists().await?)
    }

    /// True when an account with the given id exists.
    pub async fn account_exists(&self, id: i64) -> Result<bool, MakulaError> {
        Ok(self.credentials.find_by_id(id).await?.is_some())
    }

    /// Resolves a login to its account id, for the identity resolution API.
    pub async fn resolve_login(&self, login: &str) -> Result<i64, MakulaError> {
        self.credentials
            .find_by_login(login)
            .await?
            .map(|account| account.id)
            .ok_or_else(|| MakulaError::not_found("user"))
    }
}
