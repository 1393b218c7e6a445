// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store traits at the seams between flows and their external collaborators.
//!
//! Flows (auth, intake, submission) depend only on these traits, never on a
//! concrete backend, so tests substitute in-memory implementations.

pub mod credential;
pub mod link;
pub mod media;
pub mod record;

pub use credential::CredentialStore;
pub use link::IdentityLinkStore;
pub use media::MediaStore;
pub use record::RecordStore;
