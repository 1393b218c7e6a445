// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram bot channel for the Makula intake flow.
//!
//! Connects to the Telegram Bot API via teloxide long polling, routes
//! commands and messages into the [`IntakeEngine`], and delivers the flow's
//! replies back to the chat. Only private (DM) chats are processed.

pub mod handler;
pub mod media;

use std::sync::Arc;

use makula_config::model::TelegramConfig;
use makula_core::MakulaError;
use makula_intake::IntakeEngine;
use teloxide::prelude::*;
use tracing::{debug, error, info};

use crate::handler::BotCommand;

const MSG_NOT_LINKED_YET: &str =
    "You are not linked to an account yet. Use /surrender to sign in first.";
const MSG_STATS_FAILED: &str = "Could not fetch your stats.";
const MSG_HISTORY_FAILED: &str = "Could not fetch your history.";

/// Telegram channel driving the conversational intake flow.
pub struct TelegramBot {
    bot: Bot,
    engine: Arc<IntakeEngine>,
}

impl TelegramBot {
    /// Creates the bot channel.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig, engine: Arc<IntakeEngine>) -> Result<Self, MakulaError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            MakulaError::Config("telegram.bot_token is required for the bot channel".into())
        })?;

        if token.is_empty() {
            return Err(MakulaError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        Ok(Self {
            bot: Bot::new(token),
            engine,
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Runs long polling until the process shuts down.
    pub async fn run(self) {
        let engine = self.engine;

        info!("starting Telegram long polling");

        let endpoint = move |bot: Bot, msg: Message| {
            let engine = engine.clone();
            async move {
                if !handler::is_dm(&msg) {
                    debug!(chat_id = msg.chat.id.0, "ignoring non-DM message");
                    return respond(());
                }

                let replies = match process_message(&bot, &engine, &msg).await {
                    Ok(replies) => replies,
                    Err(e) => {
                        error!(error = %e, "failed to process message");
                        vec!["Something went wrong. Please try again later.".to_string()]
                    }
                };

                for reply in replies {
                    if let Err(e) = bot.send_message(msg.chat.id, reply).await {
                        error!(chat_id = msg.chat.id.0, error = %e, "failed to send reply");
                    }
                }

                respond(())
            }
        };

        Dispatcher::builder(self.bot, Update::filter_message().endpoint(endpoint))
            .default_handler(|_| async {}) // Silently ignore non-message updates
            .build()
            .dispatch()
            .await;
    }
}

/// Routes one message: commands first, then flow input.
async fn process_message(
    bot: &Bot,
    engine: &IntakeEngine,
    msg: &Message,
) -> Result<Vec<String>, MakulaError> {
    let Some(telegram_id) = handler::sender_id(msg) else {
        return Ok(vec![]);
    };

    if let Some(command) = msg.text().and_then(handler::parse_command) {
        return Ok(run_command(engine, telegram_id, command).await);
    }

    match handler::extract_input(bot, msg).await? {
        Some(input) => Ok(engine.handle_input(telegram_id, input).await),
        None => {
            debug!(msg_id = msg.id.0, "ignoring unsupported message type");
            Ok(vec![])
        }
    }
}

async fn run_command(engine: &IntakeEngine, telegram_id: i64, command: BotCommand) -> Vec<String> {
    match command {
        BotCommand::Start => vec![handler::WELCOME_TEXT.to_string()],
        BotCommand::Help => vec![handler::HELP_TEXT.to_string()],
        BotCommand::Surrender => engine.start(telegram_id).await,
        BotCommand::Cancel => engine.cancel(telegram_id).await,
        BotCommand::Stats => match engine.stats(telegram_id).await {
            Ok(stats) => vec![handler::format_stats(&stats)],
            Err(MakulaError::NotFound { .. }) => vec![MSG_NOT_LINKED_YET.to_string()],
            Err(e) => {
                error!(telegram_id, error = %e, "stats lookup failed");
                vec![MSG_STATS_FAILED.to_string()]
            }
        },
        BotCommand::History => match engine.history(telegram_id).await {
            Ok(records) => vec![handler::format_history(&records)],
            Err(MakulaError::NotFound { .. }) => vec![MSG_NOT_LINKED_YET.to_string()],
            Err(e) => {
                error!(telegram_id, error = %e, "history lookup failed");
                vec![MSG_HISTORY_FAILED.to_string()]
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use makula_auth::{AuthFlow, SessionManager};
    use makula_core::types::{
        Account, NewAccount, NewSubmission, PaperType, StatsSummary, SubmissionRecord,
    };
    use makula_core::{CredentialStore, IdentityLinkStore, RecordStore};
    use std::time::Duration;

    struct NullCredentials;

    #[async_trait::async_trait]
    impl CredentialStore for NullCredentials {
        async fn find_by_login(&self, _: &str) -> Result<Option<Account>, MakulaError> {
            Ok(None)
        }
        async fn find_by_id(&self, _: i64) -> Result<Option<Account>, MakulaError> {
            Ok(None)
        }
        async fn insert_account(&self, _: &NewAccount) -> Result<i64, MakulaError> {
            Ok(1)
        }
        async fn update_password(&self, _: i64, _: &str, _: bool) -> Result<(), MakulaError> {
            Ok(())
        }
        async fn admin_exists(&self) -> Result<bool, MakulaError> {
            Ok(false)
        }
    }

    struct NullLinks;

    #[async_trait::async_trait]
    impl IdentityLinkStore for NullLinks {
        async fn resolve(&self, _: i64) -> Result<Option<i64>, MakulaError> {
            Ok(None)
        }
        async fn link(&self, _: i64, _: i64) -> Result<(), MakulaError> {
            Ok(())
        }
    }

    struct NullRecords;

    #[async_trait::async_trait]
    impl RecordStore for NullRecords {
        async fn insert_submission(&self, _: &NewSubmission) -> Result<i64, MakulaError> {
            Ok(1)
        }
        async fn stats_for_account(&self, _: i64) -> Result<StatsSummary, MakulaError> {
            Ok(StatsSummary::default())
        }
        async fn recent_for_account(
            &self,
            _: i64,
            _: u32,
        ) -> Result<Vec<SubmissionRecord>, MakulaError> {
            Ok(vec![])
        }
        async fn list_paper_types(&self) -> Result<Vec<PaperType>, MakulaError> {
            Ok(vec![])
        }
    }

    fn engine() -> Arc<IntakeEngine> {
        let auth = Arc::new(AuthFlow::new(
            Arc::new(NullCredentials),
            Arc::new(SessionManager::new(Duration::from_secs(60))),
        ));
        Arc::new(IntakeEngine::new(
            auth,
            Arc::new(NullLinks),
            Arc::new(NullRecords),
            None,
        ))
    }

    #[test]
    fn new_requires_bot_token() {
        let config = TelegramConfig { bot_token: None };
        assert!(TelegramBot::new(&config, engine()).is_err());
    }

    #[test]
    fn new_rejects_empty_token() {
        let config = TelegramConfig {
            bot_token: Some(String::new()),
        };
        assert!(TelegramBot::new(&config, engine()).is_err());
    }

    #[test]
    fn new_accepts_valid_token() {
        let config = TelegramConfig {
            bot_token: Some("123456:ABC-DEF1234ghIkl-zyx57W2v1u123ew11".into()),
        };
        assert!(TelegramBot::new(&config, engine()).is_ok());
    }

    #[tokio::test]
    async fn stats_command_without_link_explains_linking() {
        let engine = engine();
        let replies = run_command(&engine, 42, BotCommand::Stats).await;
        assert_eq!(replies, vec![MSG_NOT_LINKED_YET.to_string()]);
    }

    #[tokio::test]
    async fn help_command_lists_all_commands() {
        let engine = engine();
        let replies = run_command(&engine, 42, BotCommand::Help).await;
        for command in ["/start", "/surrender", "/stats", "/history", "/cancel", "/help"] {
            assert!(replies[0].contains(command), "missing {command}");
        }
    }
}
