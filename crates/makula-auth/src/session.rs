// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Process-wide web session state, keyed by an opaque client token.
//!
//! Sessions hold the authenticated identity plus transient one-shot notices
//! that the next response reads once and clears. The token is regenerated on
//! login to defeat session fixation, and entries expire lazily after the
//! configured inactivity window.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use makula_core::types::Role;
use rand::RngCore;

/// The authenticated identity carried by a populated session.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub account_id: i64,
    pub name: String,
    pub role: Role,
    pub must_change_password: bool,
}

/// One-shot notices, cleared by the read.
#[derive(Debug, Clone, Default)]
pub struct Notices {
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug)]
struct Entry {
    user: Option<SessionUser>,
    notices: Notices,
    last_seen: Instant,
}

impl Entry {
    fn empty() -> Self {
        Self {
            user: None,
            notices: Notices::default(),
            last_seen: Instant::now(),
        }
    }
}

/// Owner of all web sessions in the process.
pub struct SessionManager {
    sessions: DashMap<String, Entry>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    fn new_token() -> String {
        let mut bytes = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    /// Creates an empty (anonymous) session and returns its token.
    pub fn create(&self) -> String {
        let token = Self::new_token();
        self.sessions.insert(token.clone(), Entry::empty());
        token
    }

    /// Returns the authenticated user for a token, touching its expiry.
    ///
    /// Expired or unknown tokens return `None`; expired entries are removed.
    pub fn user(&self, token: &str) -> Option<SessionUser> {
        let mut entry = self.sessions.get_mut(token)?;
        if entry.last_seen.elapsed() > self.ttl {
            drop(entry);
            self.sessions.remove(token);
            return None;
        }
        entry.last_seen = Instant::now();
        entry.user.clone()
    }

    /// Populates a fresh session for a successful login and invalidates the
    /// old token.
    ///
    /// The regeneration (remove + insert under a new token) completes before
    /// this returns, so the success response can never carry the old token.
    pub fn regenerate(&self, old_token: Option<&str>, user: SessionUser) -> String {
        if let Some(old) = old_token {
            self.sessions.remove(old);
        }
        let token = Self::new_token();
        self.sessions.insert(
            token.clone(),
            Entry {
                user: Some(user),
                notices: Notices::default(),
                last_seen: Instant::now(),
            },
        );
        token
    }

    /// Destroys a session (logout).
    pub fn destroy(&self, token: &str) {
        self.sessions.remove(token);
    }

    /// Clears the forced-password-change flag on a live session.
    pub fn clear_password_flag(&self, token: &str) {
        if let Some(mut entry) = self.sessions.get_mut(token)
            && let Some(user) = entry.user.as_mut()
        {
            user.must_change_password = false;
        }
    }

    /// Sets the one-shot success notice.
    pub fn set_success(&self, token: &str, message: impl Into<String>) {
        if let Some(mut entry) = self.sessions.get_mut(token) {
            entry.notices.success = Some(message.into());
        }
    }

    /// Sets the one-shot error notice.
    pub fn set_error(&self, token: &str, message: impl Into<String>) {
        if let Some(mut entry) = self.sessions.get_mut(token) {
            entry.notices.error = Some(message.into());
        }
    }

    /// Takes (and clears) the pending notices for a token.
    pub fn take_notices(&self, token: &str) -> Notices {
        match self.sessions.get_mut(token) {
            Some(mut entry) => std::mem::take(&mut entry.notices),
            None => Notices::default(),
        }
    }

    /// Number of live sessions. Test and introspection helper.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
