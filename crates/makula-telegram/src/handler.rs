// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message classification and formatting for the Telegram channel.
//!
//! Maps incoming Telegram messages to bot commands or channel-agnostic
//! [`IntakeInput`] values, and renders the stats/history replies.

use makula_core::types::{StatsSummary, SubmissionRecord};
use makula_core::MakulaError;
use makula_intake::IntakeInput;
use teloxide::prelude::*;
use teloxide::types::ChatKind;

use crate::media;

/// Commands the bot reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    Start,
    Surrender,
    Cancel,
    Stats,
    History,
    Help,
}

pub const WELCOME_TEXT: &str = "Welcome! Use /surrender to hand in waste paper.";

pub const HELP_TEXT: &str = "Available commands:\n\n\
    /start - Start working with the bot\n\
    /surrender - Hand in waste paper\n\
    /stats - Your totals\n\
    /history - Your last 5 records\n\
    /cancel - Cancel the current submission\n\
    /help - This list";

/// Parses a leading slash command, tolerating the `@botname` suffix.
pub fn parse_command(text: &str) -> Option<BotCommand> {
    let first = text.trim().split_whitespace().next()?;
    if !first.starts_with('/') {
        return None;
    }
    let name = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or_default();
    match name {
        "start" => Some(BotCommand::Start),
        "surrender" => Some(BotCommand::Surrender),
        "cancel" => Some(BotCommand::Cancel),
        "stats" => Some(BotCommand::Stats),
        "history" => Some(BotCommand::History),
        "help" => Some(BotCommand::Help),
        _ => None,
    }
}

/// Checks whether the message is from a private (DM) chat.
///
/// Group, supergroup, and channel messages return `false`.
pub fn is_dm(msg: &Message) -> bool {
    matches!(msg.chat.kind, ChatKind::Private(_))
}

/// The numeric Telegram user id of the sender, if any.
///
/// Messages without a sender (e.g., channel posts) return `None`.
pub fn sender_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().map(|user| user.id.0 as i64)
}

/// Extracts an intake input from a Telegram message.
///
/// Handles text, shared locations, and photos. Returns `None` for message
/// types the flow has no use for (stickers, voice, documents).
pub async fn extract_input(
    bot: &Bot,
    msg: &Message,
) -> Result<Option<IntakeInput>, MakulaError> {
    if let Some(text) = msg.text() {
        return Ok(Some(IntakeInput::Text(text.to_string())));
    }

    if let Some(location) = msg.location() {
        return Ok(Some(IntakeInput::Location {
            latitude: location.latitude,
            longitude: location.longitude,
        }));
    }

    if let Some(photos) = msg.photo() {
        let (data, filename) = media::download_largest_photo(bot, photos).await?;
        return Ok(Some(IntakeInput::Photo { data, filename }));
    }

    Ok(None)
}

/// Renders the /stats reply.
pub fn format_stats(stats: &StatsSummary) -> String {
    format!(
        "Your totals:\nHanded in: {} kg\nSubmissions: {}",
        stats.total_weight, stats.count
    )
}

/// Renders the /history reply.
pub fn format_history(records: &[SubmissionRecord]) -> String {
    if records.is_empty() {
        return "You have no records yet.".to_string();
    }
    let lines: Vec<String> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            format!(
                "{}. Date: {}\n   Weight: {} kg",
                i + 1,
                record.date,
                record.weight
            )
        })
        .collect();
    format!("Recent records:\n\n{}", lines.join("\n\n"))
}
