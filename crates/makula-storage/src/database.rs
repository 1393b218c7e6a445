// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use makula_core::MakulaError;
use tokio_rusqlite::Connection;
use tracing::debug;

use crate::migrations;

/// Handle to the SQLite database.
///
/// Opening runs PRAGMA setup (WAL, foreign keys) and all pending embedded
/// migrations before the handle is returned.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database at `path` and migrates it.
    pub async fn open(path: &str) -> Result<Self, MakulaError> {
        let conn = Connection::open(path)
            .await
            .map_err(|e| map_tr_err(e.into()))?;

        conn.call(|conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| MakulaError::Storage {
                source: Box::new(e),
            })?;

        debug!(path, "database opened and migrated");
        Ok(Self { conn })
    }

    /// Returns the shared connection handle.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Flushes the WAL and closes the background connection thread.
    pub async fn close(self) -> Result<(), MakulaError> {
        self.conn
            .call(|conn| {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn
            .close()
            .await
            .map_err(|e| MakulaError::Storage {
                source: Box::new(e),
            })?;
        Ok(())
    }
}

/// Maps a tokio-rusqlite error into [`MakulaError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error) -> MakulaError {
    MakulaError::Storage {
        source: Box::new(e),
    }
}
