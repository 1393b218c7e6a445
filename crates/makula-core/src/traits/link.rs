// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity link store trait: external chat identity to account mapping.

use async_trait::async_trait;

use crate::error::MakulaError;

/// Maps a Telegram user id to at most one internal account id.
#[async_trait]
pub trait IdentityLinkStore: Send + Sync {
    /// Resolves an external identity to its linked account id, if any.
    async fn resolve(&self, telegram_id: i64) -> Result<Option<i64>, MakulaError>;

    /// Links an external identity to an account.
    ///
    /// Re-linking the same pair is an idempotent success. Linking a different
    /// account to an already-linked identity overwrites the previous link,
    /// preserving the at-most-one-account invariant.
    async fn link(&self, telegram_id: i64, account_id: i64) -> Result<(), MakulaError>;
}
