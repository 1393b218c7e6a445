// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-identity conversation state store.
//!
//! Keyed by the external chat identity. Access goes through a per-key async
//! mutex, so two rapid messages from the same identity are serialized
//! (read-modify-write on one conversation never races) while distinct
//! identities proceed concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::step::ConversationState;

/// Conversation store injected into the intake engine.
///
/// `None` inside the guard means the identity has no active conversation.
#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<DashMap<i64, Arc<Mutex<Option<ConversationState>>>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the conversation slot for one identity.
    ///
    /// The guard owns the slot until dropped; a second message from the same
    /// identity parks here until the first finishes its transition.
    pub async fn lock(&self, telegram_id: i64) -> OwnedMutexGuard<Option<ConversationState>> {
        let slot = self
            .inner
            .entry(telegram_id)
            .or_insert_with(|| Arc::new(Mutex::new(None)))
            .clone();
        slot.lock_owned().await
    }
}
