// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementations of the core store traits.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use makula_config::model::StorageConfig;
use makula_core::types::{
    Account, NewAccount, NewSubmission, PaperType, StatsSummary, SubmissionRecord,
};
use makula_core::{
    CredentialStore, IdentityLinkStore, MakulaError, RecordStore,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed store implementing the credential, record, and identity
/// link traits over one shared [`Database`] handle.
///
/// Cloning is cheap; all clones share the single writer connection.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Database>,
}

impl SqliteStore {
    /// Opens the database configured in `config` and migrates it.
    pub async fn open(config: &StorageConfig) -> Result<Self, MakulaError> {
        let db = Database::open(&config.path).await?;
        debug!(path = %config.path, "SQLite store initialized");
        Ok(Self { db: Arc::new(db) })
    }

    /// Wraps an already-open database.
    pub fn from_database(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Returns the underlying database handle.
    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<Account>, MakulaError> {
        queries::accounts::find_by_login(&self.db, login).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Account>, MakulaError> {
        queries::accounts::find_by_id(&self.db, id).await
    }

    async fn insert_account(&self, account: &NewAccount) -> Result<i64, MakulaError> {
        queries::accounts::insert_account(&self.db, account).await
    }

    async fn update_password(
        &self,
        id: i64,
        password_hash: &str,
        must_change_password: bool,
    ) -> Result<(), MakulaError> {
        queries::accounts::update_password(&self.db, id, password_hash, must_change_password)
            .await
    }

    async fn admin_exists(&self) -> Result<bool, MakulaError> {
        queries::accounts::admin_exists(&self.db).await
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert_submission(&self, submission: &NewSubmission) -> Result<i64, MakulaError> {
        queries::records::insert_submission(&self.db, submission).await
    }

    async fn stats_for_account(&self, account_id: i64) -> Result<StatsSummary, MakulaError> {
        queries::records::stats_for_account(&self.db, account_id).await
    }

    async fn recent_for_account(
        &self,
        account_id: i64,
        limit: u32,
    ) -> Result<Vec<SubmissionRecord>, MakulaError> {
        queries::records::recent_for_account(&self.db, account_id, limit).await
    }

    async fn list_paper_types(&self) -> Result<Vec<PaperType>, MakulaError> {
        queries::paper_types::list(&self.db).await
    }
}

#[async_trait]
impl IdentityLinkStore for SqliteStore {
    async fn resolve(&self, telegram_id: i64) -> Result<Option<i64>, MakulaError> {
        queries::links::resolve(&self.db, telegram_id).await
    }

    async fn link(&self, telegram_id: i64, account_id: i64) -> Result<(), MakulaError> {
        queries::links::link(&self.db, telegram_id, account_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use makula_core::types::Role;
    use tempfile::tempdir;

    #[tokio::test]
    async fn trait_object_round_trip() {
        let dir = tempdir().unwrap();
        let config = StorageConfig {
            path: dir.path().join("test.db").to_str().unwrap().to_string(),
        };
        let store = SqliteStore::open(&config).await.unwrap();

        // Exercise the store through the trait objects the flows hold.
        let credentials: Arc<dyn CredentialStore> = Arc::new(store.clone());
        let records: Arc<dyn RecordStore> = Arc::new(store.clone());
        let links: Arc<dyn IdentityLinkStore> = Arc::new(store);

        let account_id = credentials
            .insert_account(&NewAccount {
                name: "Worker".to_string(),
                login: "worker_1".to_string(),
                password_hash: "$argon2id$fake".to_string(),
                role: Role::Worker,
                must_change_password: false,
            })
            .await
            .unwrap();

        links.link(777, account_id).await.unwrap();
        assert_eq!(links.resolve(777).await.unwrap(), Some(account_id));

        records
            .insert_submission(&NewSubmission {
                account_id,
                date: "2026-08-01".to_string(),
                paper_type_id: None,
                weight: 2.5,
                photo_url: None,
                latitude: None,
                longitude: None,
            })
            .await
            .unwrap();

        let stats = records.stats_for_account(account_id).await.unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total_weight, 2.5);
    }
}
