// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password hashing with argon2id.
//!
//! Hashes are stored as PHC strings, so verification reads the work
//! parameters from the hash itself and older hashes keep verifying after a
//! parameter bump.

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use makula_core::MakulaError;

// Admin accounts get a higher memory/time cost than the argon2 defaults.
const ADMIN_M_COST_KIB: u32 = 65536;
const ADMIN_T_COST: u32 = 3;
const ADMIN_P_COST: u32 = 1;

/// Hashes a password with the default argon2id parameters.
pub fn hash_password(password: &str) -> Result<String, MakulaError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MakulaError::Internal(format!("password hashing failed: {e}")))
}

/// Hashes a password with the stronger work factor used for the bootstrap
/// admin account.
pub fn hash_password_admin(password: &str) -> Result<String, MakulaError> {
    let params = Params::new(ADMIN_M_COST_KIB, ADMIN_T_COST, ADMIN_P_COST, None)
        .map_err(|e| MakulaError::Internal(format!("invalid argon2 parameters: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| MakulaError::Internal(format!("password hashing failed: {e}")))
}

/// Verifies a password against a stored PHC hash string.
///
/// An unparseable hash verifies as `false` rather than erroring; a corrupt
/// stored hash must read as "wrong password", not a server fault.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}
