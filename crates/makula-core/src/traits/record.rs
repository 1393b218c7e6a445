// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait: submission persistence and read-only aggregates.

use async_trait::async_trait;

use crate::error::MakulaError;
use crate::types::{NewSubmission, PaperType, StatsSummary, SubmissionRecord};

/// Persistence of [`SubmissionRecord`]s plus the filtered/aggregated reads
/// the stats and history surfaces consume. Records are insert-only from the
/// in-scope flows.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts a submission and returns the created record id.
    async fn insert_submission(&self, submission: &NewSubmission) -> Result<i64, MakulaError>;

    /// Aggregate totals (count, summed weight) for one account.
    async fn stats_for_account(&self, account_id: i64) -> Result<StatsSummary, MakulaError>;

    /// The most recent `limit` records for one account, newest first.
    async fn recent_for_account(
        &self,
        account_id: i64,
        limit: u32,
    ) -> Result<Vec<SubmissionRecord>, MakulaError>;

    /// All paper-type categories, ordered by name.
    async fn list_paper_types(&self) -> Result<Vec<PaperType>, MakulaError>;
}
