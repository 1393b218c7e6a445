// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paper type category reads.

use makula_core::types::PaperType;
use makula_core::MakulaError;

use crate::database::{map_tr_err, Database};

/// All paper-type categories, ordered by name.
pub async fn list(db: &Database) -> Result<Vec<PaperType>, MakulaError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM paper_types ORDER BY name")?;
            let rows = stmt.query_map([], |row| {
                Ok(PaperType {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })?;
            let mut types = Vec::new();
            for row in rows {
                types.push(row?);
            }
            Ok(types)
        })
        .await
        .map_err(map_tr_err)
}
