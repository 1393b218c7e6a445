// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential store trait: persistence of user accounts.

use async_trait::async_trait;

use crate::error::MakulaError;
use crate::types::{Account, NewAccount};

/// Persistence of [`Account`] records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up an account by its unique login. Returns `None` when absent.
    async fn find_by_login(&self, login: &str) -> Result<Option<Account>, MakulaError>;

    /// Looks up an account by id. Returns `None` when absent.
    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, MakulaError>;

    /// Inserts a new account and returns its id.
    ///
    /// Fails with [`MakulaError::DuplicateLogin`] when the login is taken.
    async fn insert_account(&self, account: &NewAccount) -> Result<i64, MakulaError>;

    /// Replaces the password hash and forced-change flag for an account.
    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        must_change_password: bool,
    ) -> Result<(), MakulaError>;

    /// True when at least one admin-role account exists.
    ///
    /// Guards the bootstrap setup operation.
    async fn admin_exists(&self) -> Result<bool, MakulaError>;
}
