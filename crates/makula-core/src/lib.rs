// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core error types, domain types, and store traits for the Makula
//! waste-paper collection tracker.

pub mod error;
pub mod traits;
pub mod types;

pub use error::MakulaError;
pub use traits::{CredentialStore, IdentityLinkStore, MediaStore, RecordStore};
