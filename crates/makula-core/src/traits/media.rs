// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Media store trait: external photo hosting.

use async_trait::async_trait;

use crate::error::MakulaError;

/// Uploads submission photos to an external media service.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads image bytes and returns the hosted URL.
    async fn upload_photo(&self, data: Vec<u8>, filename: &str) -> Result<String, MakulaError>;
}
