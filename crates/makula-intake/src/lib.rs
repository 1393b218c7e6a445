// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational intake flow for Makula bot submissions.
//!
//! A strictly sequential per-identity state machine collecting a
//! submission's fields (weight, paper type, location, optional photo) plus
//! the login/registration sub-steps that link an external chat identity to
//! an account. The transition logic in [`flow`] is pure and transport-free;
//! [`engine::IntakeEngine`] executes the effects against injected stores.

pub mod engine;
pub mod flow;
pub mod step;
pub mod store;

pub use engine::IntakeEngine;
pub use flow::{advance, prompt_for, EffectRequest, Transition};
pub use step::{ConversationState, IntakeInput, Scratch, Step};
pub use store::ConversationStore;
