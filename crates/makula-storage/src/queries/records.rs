// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Submission record inserts and the read-only aggregates consumed by the
//! stats and history surfaces.

use makula_core::types::{NewSubmission, StatsSummary, SubmissionRecord};
use makula_core::MakulaError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

const RECORD_COLUMNS: &str =
    "id, account_id, date, paper_type_id, weight, photo_url, latitude, longitude";

fn record_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubmissionRecord> {
    Ok(SubmissionRecord {
        id: row.get(0)?,
        account_id: row.get(1)?,
        date: row.get(2)?,
        paper_type_id: row.get(3)?,
        weight: row.get(4)?,
        photo_url: row.get(5)?,
        latitude: row.get(6)?,
        longitude: row.get(7)?,
    })
}

/// Insert a submission record and return its id.
pub async fn insert_submission(
    db: &Database,
    submission: &NewSubmission,
) -> Result<i64, MakulaError> {
    let submission = submission.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO submission_records
                     (account_id, date, paper_type_id, weight, photo_url, latitude, longitude)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    submission.account_id,
                    submission.date,
                    submission.paper_type_id,
                    submission.weight,
                    submission.photo_url,
                    submission.latitude,
                    submission.longitude,
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Aggregate totals (count, summed weight) for one account.
pub async fn stats_for_account(
    db: &Database,
    account_id: i64,
) -> Result<StatsSummary, MakulaError> {
    db.connection()
        .call(move |conn| {
            let stats = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(weight), 0)
                 FROM submission_records WHERE account_id = ?1",
                params![account_id],
                |row| {
                    Ok(StatsSummary {
                        count: row.get::<_, i64>(0)? as u64,
                        total_weight: row.get(1)?,
                    })
                },
            )?;
            Ok(stats)
        })
        .await
        .map_err(map_tr_err)
}

/// The most recent `limit` records for one account, newest first.
pub async fn recent_for_account(
    db: &Database,
    account_id: i64,
    limit: u32,
) -> Result<Vec<SubmissionRecord>, MakulaError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RECORD_COLUMNS} FROM submission_records
                 WHERE account_id = ?1 ORDER BY date DESC, id DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![account_id, limit], record_from_row)?;
            let mut records = Vec::new();
            for row in rows {
                records.push(row?);
            }
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}
