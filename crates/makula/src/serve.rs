// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `serve` command: wires storage, auth, intake, the Telegram bot, and
//! the HTTP gateway together and runs them until shutdown.

use std::sync::Arc;
use std::time::Duration;

use makula_auth::{AuthFlow, SessionManager};
use makula_config::MakulaConfig;
use makula_core::{IdentityLinkStore, MakulaError, MediaStore, RecordStore};
use makula_gateway::{GatewayState, ServerConfig};
use makula_intake::IntakeEngine;
use makula_media::HttpMediaStore;
use makula_storage::SqliteStore;
use makula_telegram::TelegramBot;
use tracing::{info, warn};

pub async fn run(config: MakulaConfig) -> Result<(), MakulaError> {
    let store = SqliteStore::open(&config.storage).await?;
    let links: Arc<dyn IdentityLinkStore> = Arc::new(store.clone());
    let records: Arc<dyn RecordStore> = Arc::new(store.clone());

    let sessions = Arc::new(SessionManager::new(Duration::from_secs(
        config.server.session_ttl_secs,
    )));
    let auth = Arc::new(AuthFlow::new(Arc::new(store.clone()), sessions.clone()));

    let media: Option<Arc<dyn MediaStore>> = HttpMediaStore::from_config(&config.media)
        .map(|store| Arc::new(store) as Arc<dyn MediaStore>);
    if media.is_none() {
        info!("no media upload endpoint configured; photo uploads disabled");
    }

    // The bot runs in the background when a token is configured; the
    // gateway always runs in the foreground.
    if config.telegram.bot_token.is_some() {
        let engine = Arc::new(IntakeEngine::new(
            auth.clone(),
            links.clone(),
            records.clone(),
            media.clone(),
        ));
        let bot = TelegramBot::new(&config.telegram, engine)?;
        tokio::spawn(async move {
            bot.run().await;
            warn!("telegram bot stopped");
        });
    } else {
        info!("no telegram bot token configured; bot channel disabled");
    }

    if config.server.api_key.is_none() {
        warn!("no server.api_key configured; all /api requests will be rejected");
    }

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        api_key: config.server.api_key.clone(),
    };
    let state = GatewayState {
        auth,
        sessions,
        links,
        records,
        media,
    };

    makula_gateway::start_server(&server_config, state).await
}
