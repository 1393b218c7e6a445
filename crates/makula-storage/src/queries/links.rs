// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram identity link operations.

use makula_core::MakulaError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Resolve an external Telegram identity to its linked account id.
pub async fn resolve(db: &Database, telegram_id: i64) -> Result<Option<i64>, MakulaError> {
    db.connection()
        .call(move |conn| {
            let result = conn.query_row(
                "SELECT account_id FROM telegram_links WHERE telegram_id = ?1",
                params![telegram_id],
                |row| row.get(0),
            );
            match result {
                Ok(account_id) => Ok(Some(account_id)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Link an external identity to an account.
///
/// Idempotent for the same pair; a different account for an already-linked
/// identity overwrites the previous link.
pub async fn link(db: &Database, telegram_id: i64, account_id: i64) -> Result<(), MakulaError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO telegram_links (telegram_id, account_id) VALUES (?1, ?2)
                 ON CONFLICT(telegram_id) DO UPDATE SET account_id = excluded.account_id",
                params![telegram_id, account_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
