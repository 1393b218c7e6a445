// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account CRUD operations.

use makula_core::types::{Account, NewAccount, Role};
use makula_core::MakulaError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

const ACCOUNT_COLUMNS: &str = "id, name, login, password_hash, role, must_change_password";

fn account_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    let role_str: String = row.get(4)?;
    let role = role_str.parse::<Role>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        login: row.get(2)?,
        password_hash: row.get(3)?,
        role,
        must_change_password: row.get::<_, i64>(5)? != 0,
    })
}

/// Look up an account by its unique login.
pub async fn find_by_login(db: &Database, login: &str) -> Result<Option<Account>, MakulaError> {
    let login = login.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE login = ?1"
            ))?;
            let result = stmt.query_row(params![login], account_from_row);
            match result {
                Ok(account) => Ok(Some(account)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Look up an account by id.
pub async fn find_by_id(db: &Database, id: i64) -> Result<Option<Account>, MakulaError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], account_from_row);
            match result {
                Ok(account) => Ok(Some(account)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Insert a new account and return its id.
///
/// The duplicate-login check and the insert run in one call on the single
/// writer connection, so no second registration can slip in between.
pub async fn insert_account(db: &Database, account: &NewAccount) -> Result<i64, MakulaError> {
    let account = account.clone();
    let inserted = db
        .connection()
        .call(move |conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE login = ?1)",
                params![account.login],
                |row| row.get(0),
            )?;
            if exists {
                return Ok(None);
            }
            conn.execute(
                "INSERT INTO accounts (name, login, password_hash, role, must_change_password)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    account.name,
                    account.login,
                    account.password_hash,
                    account.role.to_string(),
                    account.must_change_password as i64,
                ],
            )?;
            Ok(Some(conn.last_insert_rowid()))
        })
        .await
        .map_err(map_tr_err)?;
    inserted.ok_or(MakulaError::DuplicateLogin)
}

/// Replace an account's password hash and forced-change flag.
pub async fn update_password(
    db: &Database,
    id: i64,
    password_hash: &str,
    must_change_password: bool,
) -> Result<(), MakulaError> {
    let password_hash = password_hash.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE accounts SET password_hash = ?1, must_change_password = ?2 WHERE id = ?3",
                params![password_hash, must_change_password as i64, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// True when at least one admin-role account exists.
pub async fn admin_exists(db: &Database) -> Result<bool, MakulaError> {
    db.connection()
        .call(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE role = 'admin')",
                [],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_account(login: &str) -> NewAccount {
        NewAccount {
            name: "Test Worker".to_string(),
            login: login.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            role: Role::Worker,
            must_change_password: false,
        }
    }

    #[tokio::test]
    async fn insert_and_find_by_login() {
        let (db, _dir) = setup_db().await;
        let id = insert_account(&db, &make_account("worker_1")).await.unwrap();

        let found = find_by_login(&db, "worker_1").await.unwrap().unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.name, "Test Worker");
        assert_eq!(found.role, Role::Worker);
        assert!(!found.must_change_password);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn find_unknown_login_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(find_by_login(&db, "nobody").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn duplicate_login_is_rejected() {
        let (db, _dir) = setup_db().await;
        insert_account(&db, &make_account("worker_1")).await.unwrap();

        let err = insert_account(&db, &make_account("worker_1"))
            .await
            .unwrap_err();
        assert!(matches!(err, MakulaError::DuplicateLogin));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn update_password_clears_forced_flag() {
        let (db, _dir) = setup_db().await;
        let mut account = make_account("worker_1");
        account.must_change_password = true;
        let id = insert_account(&db, &account).await.unwrap();

        update_password(&db, id, "$argon2id$new", false).await.unwrap();

        let found = find_by_id(&db, id).await.unwrap().unwrap();
        assert_eq!(found.password_hash, "$argon2id$new");
        assert!(!found.must_change_password);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn admin_exists_reflects_roles() {
        let (db, _dir) = setup_db().await;
        assert!(!admin_exists(&db).await.unwrap());

        let mut admin = make_account("chief");
        admin.role = Role::Admin;
        insert_account(&db, &admin).await.unwrap();

        assert!(admin_exists(&db).await.unwrap());
        db.close().await.unwrap();
    }
}
