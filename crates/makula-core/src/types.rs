// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Makula crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Account role. Workers submit records; admins additionally manage the
/// peripheral surfaces (paper types, exports, other users).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Worker,
}

/// A registered user account.
///
/// `password_hash` is an argon2 PHC string; the clear password is never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub login: String,
    pub password_hash: String,
    pub role: Role,
    /// When set, the next login is redirected into the password-change gate.
    pub must_change_password: bool,
}

/// Payload for inserting a new account. The id is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub login: String,
    pub password_hash: String,
    pub role: Role,
    pub must_change_password: bool,
}

/// A named waste-paper category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperType {
    pub id: i64,
    pub name: String,
}

/// One reported weigh-in event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub id: i64,
    pub account_id: i64,
    /// ISO 8601 calendar date of the surrender.
    pub date: String,
    pub paper_type_id: Option<i64>,
    /// Weight in kilograms, always > 0.
    pub weight: f64,
    pub photo_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Payload for inserting a new submission record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubmission {
    pub account_id: i64,
    pub date: String,
    pub paper_type_id: Option<i64>,
    pub weight: f64,
    pub photo_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Mapping from an external chat identity to an internal account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityLink {
    pub telegram_id: i64,
    pub account_id: i64,
}

/// Aggregate totals for one account's submissions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub count: u64,
    pub total_weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_through_strings() {
        assert_eq!(Role::Admin.to_string(), "admin");
        assert_eq!(Role::Worker.to_string(), "worker");
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("worker").unwrap(), Role::Worker);
        assert!(Role::from_str("superuser").is_err());
    }

    #[test]
    fn role_serde_uses_lowercase() {
        let json = serde_json::to_string(&Role::Worker).unwrap();
        assert_eq!(json, "\"worker\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn stats_summary_defaults_to_zero()  {
        let stats = StatsSummary::default();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total_weight, 0.0);
    }
}
