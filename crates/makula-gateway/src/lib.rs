// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Makula.
//!
//! Serves two surfaces from one axum router: the session-cookie web surface
//! (auth lifecycle and the single-request submission form) and the
//! API-key-guarded surface the bot process submits through.

pub mod auth;
pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, GatewayState, ServerConfig};
