// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Async driver for the conversational intake flow.
//!
//! Applies the pure transitions from [`crate::flow`] and executes the
//! effects they request (registration, login, identity linking, paper-type
//! loading, photo upload, record submission) against the injected stores.
//! Remote failures never crash the flow: they are logged and surfaced as a
//! message, and the conversation either stays in place (retryable steps) or
//! returns to the start (unrecoverable identity failures).

use std::sync::Arc;

use makula_auth::{AuthFlow, RegisterRequest};
use makula_core::types::{NewSubmission, StatsSummary, SubmissionRecord};
use makula_core::{IdentityLinkStore, MakulaError, MediaStore, RecordStore};
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, warn};

use crate::flow::{self, advance, prompt_for, EffectRequest, Transition};
use crate::step::{ConversationState, IntakeInput, Scratch, Step};
use crate::store::ConversationStore;

const MSG_SAVED: &str = "Your record has been saved!";
const MSG_GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";
const MSG_NOT_LINKED: &str =
    "Your Telegram account is not linked to any user. Start over with /surrender.";
const MSG_CANCELLED: &str = "Cancelled. Start again with /surrender.";
const MSG_NO_ACTIVE: &str = "Nothing in progress. Use /surrender to hand in waste paper.";
const MSG_LOGIN_FAILED: &str = "Login failed.";
const MSG_LOGGED_IN: &str = "Logged in successfully.";
const MSG_REGISTERED: &str = "Account created.";
const MSG_PHOTO_FAILED: &str = "Failed to upload the photo. Try again or answer \"no\".";
const MSG_PHOTO_UNAVAILABLE: &str =
    "Photo uploads are not available right now. Answer \"no\" to finish without one.";

/// How many records the history command shows.
const HISTORY_LIMIT: u32 = 5;

type Guard = OwnedMutexGuard<Option<ConversationState>>;

/// Drives one conversation per external identity through the intake steps.
pub struct IntakeEngine {
    auth: Arc<AuthFlow>,
    links: Arc<dyn IdentityLinkStore>,
    records: Arc<dyn RecordStore>,
    media: Option<Arc<dyn MediaStore>>,
    conversations: ConversationStore,
}

impl IntakeEngine {
    pub fn new(
        auth: Arc<AuthFlow>,
        links: Arc<dyn IdentityLinkStore>,
        records: Arc<dyn RecordStore>,
        media: Option<Arc<dyn MediaStore>>,
    ) -> Self {
        Self {
            auth,
            links,
            records,
            media,
            conversations: ConversationStore::new(),
        }
    }

    /// Begins (or restarts) the surrender flow for an identity.
    ///
    /// Already-linked identities skip the auth sub-flow straight to weight
    /// collection; everyone else starts at the login-or-register choice.
    pub async fn start(&self, telegram_id: i64) -> Vec<String> {
        let mut guard = self.conversations.lock(telegram_id).await;
        match self.links.resolve(telegram_id).await {
            Ok(Some(_)) => {
                let state = ConversationState::new(Step::CollectWeight);
                let prompt = prompt_for(state.step, &state.scratch);
                *guard = Some(state);
                vec![prompt]
            }
            Ok(None) => {
                let state = ConversationState::new(Step::Start);
                let prompt = prompt_for(state.step, &state.scratch);
                *guard = Some(state);
                vec![prompt]
            }
            Err(e) => {
                error!(telegram_id, error = %e, "failed to resolve identity link");
                vec![MSG_GENERIC_FAILURE.to_string()]
            }
        }
    }

    /// The restart command: accepted in every state, unconditionally clears
    /// the conversation.
    pub async fn cancel(&self, telegram_id: i64) -> Vec<String> {
        let mut guard = self.conversations.lock(telegram_id).await;
        *guard = None;
        vec![MSG_CANCELLED.to_string()]
    }

    /// Feeds one inbound message into the identity's conversation.
    pub async fn handle_input(&self, telegram_id: i64, input: IntakeInput) -> Vec<String> {
        let mut guard = self.conversations.lock(telegram_id).await;
        let Some(state) = guard.as_ref() else {
            return vec![MSG_NO_ACTIVE.to_string()];
        };

        match advance(state.step, &state.scratch, &input) {
            Transition::Stay { replies } => replies,
            Transition::Next { state, replies } => {
                *guard = Some(state);
                replies
            }
            Transition::Effect(effect) => self.run_effect(&mut guard, telegram_id, effect).await,
        }
    }

    /// Aggregate totals for the account linked to an identity.
    pub async fn stats(&self, telegram_id: i64) -> Result<StatsSummary, MakulaError> {
        let account_id = self.resolve_linked(telegram_id).await?;
        self.records.stats_for_account(account_id).await
    }

    /// The most recent records for the account linked to an identity.
    pub async fn history(&self, telegram_id: i64) -> Result<Vec<SubmissionRecord>, MakulaError> {
        let account_id = self.resolve_linked(telegram_id).await?;
        self.records
            .recent_for_account(account_id, HISTORY_LIMIT)
            .await
    }

    async fn resolve_linked(&self, telegram_id: i64) -> Result<i64, MakulaError> {
        self.links
            .resolve(telegram_id)
            .await?
            .ok_or_else(|| MakulaError::not_found("linked account"))
    }

    async fn run_effect(
        &self,
        guard: &mut Guard,
        telegram_id: i64,
        effect: EffectRequest,
    ) -> Vec<String> {
        match effect {
            EffectRequest::Login { login, password } => {
                self.do_login(guard, telegram_id, &login, &password).await
            }
            EffectRequest::Register {
                name,
                login,
                password,
            } => {
                self.do_register(guard, telegram_id, name, login, password)
                    .await
            }
            EffectRequest::LoadPaperTypes { scratch } => {
                self.do_load_paper_types(guard, scratch).await
            }
            EffectRequest::Finalize { scratch } => {
                self.do_finalize(guard, telegram_id, scratch).await
            }
            EffectRequest::UploadAndFinalize {
                scratch,
                data,
                filename,
            } => {
                self.do_upload_and_finalize(guard, telegram_id, scratch, data, filename)
                    .await
            }
        }
    }

    async fn do_login(
        &self,
        guard: &mut Guard,
        telegram_id: i64,
        login: &str,
        password: &str,
    ) -> Vec<String> {
        match self.auth.verify_credentials(login, password).await {
            Ok(account) => {
                if let Err(e) = self.links.link(telegram_id, account.id).await {
                    error!(telegram_id, error = %e, "failed to link identity after login");
                    **guard = Some(ConversationState::new(Step::Start));
                    return vec![MSG_GENERIC_FAILURE.to_string(), flow::PROMPT_CHOOSE.to_string()];
                }
                info!(telegram_id, account_id = account.id, "bot identity linked via login");
                let state = ConversationState::new(Step::CollectWeight);
                let prompt = prompt_for(state.step, &state.scratch);
                **guard = Some(state);
                vec![MSG_LOGGED_IN.to_string(), prompt]
            }
            // One generic message for both unknown login and wrong password;
            // the bot surface does not leak which one it was.
            Err(MakulaError::NotFound { .. } | MakulaError::AuthFailure) => {
                warn!(telegram_id, "bot login failed");
                **guard = Some(ConversationState::new(Step::LoginLogin));
                vec![format!("{MSG_LOGIN_FAILED} {}", flow::PROMPT_LOGIN)]
            }
            Err(e) => {
                error!(telegram_id, error = %e, "credential check failed");
                vec![MSG_GENERIC_FAILURE.to_string()]
            }
        }
    }

    async fn do_register(
        &self,
        guard: &mut Guard,
        telegram_id: i64,
        name: String,
        login: String,
        password: String,
    ) -> Vec<String> {
        let request = RegisterRequest {
            name,
            login,
            confirm_password: password.clone(),
            password,
        };
        match self.auth.register(&request).await {
            Ok(account_id) => {
                if let Err(e) = self.links.link(telegram_id, account_id).await {
                    error!(telegram_id, error = %e, "failed to link identity after registration");
                    **guard = Some(ConversationState::new(Step::Start));
                    return vec![MSG_GENERIC_FAILURE.to_string(), flow::PROMPT_CHOOSE.to_string()];
                }
                info!(telegram_id, account_id, "bot identity linked via registration");
                let state = ConversationState::new(Step::CollectWeight);
                let prompt = prompt_for(state.step, &state.scratch);
                **guard = Some(state);
                vec![MSG_REGISTERED.to_string(), prompt]
            }
            // Field validation failed: restart the registration sub-flow with
            // the specific reason surfaced.
            Err(e @ (MakulaError::Validation(_) | MakulaError::DuplicateLogin)) => {
                **guard = Some(ConversationState::new(Step::RegisterName));
                vec![e.to_string(), flow::PROMPT_NAME.to_string()]
            }
            Err(e) => {
                error!(telegram_id, error = %e, "registration failed");
                vec![MSG_GENERIC_FAILURE.to_string()]
            }
        }
    }

    async fn do_load_paper_types(&self, guard: &mut Guard, scratch: Scratch) -> Vec<String> {
        match self.records.list_paper_types().await {
            Ok(types) if types.is_empty() => {
                let state = ConversationState {
                    step: Step::CollectLocation,
                    scratch,
                };
                let prompt = prompt_for(state.step, &state.scratch);
                **guard = Some(state);
                vec![prompt]
            }
            Ok(types) => {
                let mut scratch = scratch;
                scratch.offered_types = types;
                let state = ConversationState {
                    step: Step::CollectPaperType,
                    scratch,
                };
                let prompt = prompt_for(state.step, &state.scratch);
                **guard = Some(state);
                vec![prompt]
            }
            Err(e) => {
                // The weight stays unrecorded; the user re-enters it.
                error!(error = %e, "failed to load paper types");
                vec![MSG_GENERIC_FAILURE.to_string()]
            }
        }
    }

    async fn do_upload_and_finalize(
        &self,
        guard: &mut Guard,
        telegram_id: i64,
        mut scratch: Scratch,
        data: Vec<u8>,
        filename: String,
    ) -> Vec<String> {
        let Some(media) = self.media.as_ref() else {
            return vec![MSG_PHOTO_UNAVAILABLE.to_string()];
        };
        match media.upload_photo(data, &filename).await {
            Ok(url) => {
                scratch.photo_url = Some(url);
                self.do_finalize(guard, telegram_id, scratch).await
            }
            Err(e) => {
                error!(telegram_id, error = %e, "photo upload failed");
                vec![MSG_PHOTO_FAILED.to_string()]
            }
        }
    }

    /// Terminal action: assembles the submission, persists it, and clears
    /// the conversation regardless of outcome.
    async fn do_finalize(
        &self,
        guard: &mut Guard,
        telegram_id: i64,
        scratch: Scratch,
    ) -> Vec<String> {
        **guard = None;

        let account_id = match self.links.resolve(telegram_id).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!(telegram_id, "finalize without a linked account");
                return vec![MSG_NOT_LINKED.to_string()];
            }
            Err(e) => {
                error!(telegram_id, error = %e, "failed to resolve identity at finalize");
                return vec![MSG_GENERIC_FAILURE.to_string()];
            }
        };

        let Some(weight) = scratch.weight else {
            error!(telegram_id, "finalize reached without a collected weight");
            return vec![MSG_GENERIC_FAILURE.to_string()];
        };

        let submission = NewSubmission {
            account_id,
            date: chrono::Utc::now().date_naive().to_string(),
            paper_type_id: scratch.paper_type_id,
            weight,
            photo_url: scratch.photo_url,
            latitude: scratch.latitude,
            longitude: scratch.longitude,
        };

        match self.records.insert_submission(&submission).await {
            Ok(record_id) => {
                info!(telegram_id, account_id, record_id, weight, "submission recorded");
                vec![MSG_SAVED.to_string()]
            }
            Err(e) => {
                error!(telegram_id, error = %e, "failed to persist submission");
                vec![MSG_GENERIC_FAILURE.to_string()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use makula_auth::SessionManager;
    use makula_core::types::{Account, NewAccount, PaperType, Role};
    use makula_core::CredentialStore;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MemCredentials {
        accounts: Mutex<Vec<Account>>,
    }

    #[async_trait]
    impl CredentialStore for MemCredentials {
        async fn find_by_login(&self, login: &str) -> Result<Option<Account>, MakulaError> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.login == login)
                .cloned())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Account>, MakulaError> {
            Ok(self
                .accounts
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == id)
                .cloned())
        }

        async fn insert_account(&self, account: &NewAccount) -> Result<i64, MakulaError> {
            let mut accounts = self.accounts.lock().unwrap();
            if accounts.iter().any(|a| a.login == account.login) {
                return Err(MakulaError::DuplicateLogin);
            }
            let id = accounts.len() as i64 + 1;
            accounts.push(Account {
                id,
                name: account.name.clone(),
                login: account.login.clone(),
                password_hash: account.password_hash.clone(),
                role: account.role,
                must_change_password: account.must_change_password,
            });
            Ok(id)
        }

        async fn update_password(
            &self,
            _id: i64,
            _password_hash: &str,
            _must_change_password: bool,
        ) -> Result<(), MakulaError> {
            Ok(())
        }

        async fn admin_exists(&self) -> Result<bool, MakulaError> {
            Ok(false)
        }
    }

    #[derive(Default)]
    struct MemLinks {
        links: Mutex<Vec<(i64, i64)>>,
    }

    #[async_trait]
    impl IdentityLinkStore for MemLinks {
        async fn resolve(&self, telegram_id: i64) -> Result<Option<i64>, MakulaError> {
            Ok(self
                .links
                .lock()
                .unwrap()
                .iter()
                .find(|(tid, _)| *tid == telegram_id)
                .map(|(_, account_id)| *account_id))
        }

        async fn link(&self, telegram_id: i64, account_id: i64) -> Result<(), MakulaError> {
            let mut links = self.links.lock().unwrap();
            if let Some(entry) = links.iter_mut().find(|(tid, _)| *tid == telegram_id) {
                entry.1 = account_id;
            } else {
                links.push((telegram_id, account_id));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MemRecords {
        submissions: Mutex<Vec<NewSubmission>>,
        paper_types: Vec<PaperType>,
    }

    impl MemRecords {
        fn with_types() -> Self {
            Self {
                submissions: Mutex::new(Vec::new()),
                paper_types: vec![
                    PaperType {
                        id: 1,
                        name: "Cardboard".into(),
                    },
                    PaperType {
                        id: 2,
                        name: "Newspaper".into(),
                    },
                ],
            }
        }
    }

    #[async_trait]
    impl RecordStore for MemRecords {
        async fn insert_submission(
            &self,
            submission: &NewSubmission,
        ) -> Result<i64, MakulaError> {
            let mut submissions = self.submissions.lock().unwrap();
            submissions.push(submission.clone());
            Ok(submissions.len() as i64)
        }

        async fn stats_for_account(
            &self,
            account_id: i64,
        ) -> Result<StatsSummary, MakulaError> {
            let submissions = self.submissions.lock().unwrap();
            let matching: Vec<_> = submissions
                .iter()
                .filter(|s| s.account_id == account_id)
                .collect();
            Ok(StatsSummary {
                count: matching.len() as u64,
                total_weight: matching.iter().map(|s| s.weight).sum(),
            })
        }

        async fn recent_for_account(
            &self,
            account_id: i64,
            limit: u32,
        ) -> Result<Vec<SubmissionRecord>, MakulaError> {
            let submissions = self.submissions.lock().unwrap();
            Ok(submissions
                .iter()
                .filter(|s| s.account_id == account_id)
                .rev()
                .take(limit as usize)
                .enumerate()
                .map(|(i, s)| SubmissionRecord {
                    id: i as i64 + 1,
                    account_id: s.account_id,
                    date: s.date.clone(),
                    paper_type_id: s.paper_type_id,
                    weight: s.weight,
                    photo_url: s.photo_url.clone(),
                    latitude: s.latitude,
                    longitude: s.longitude,
                })
                .collect())
        }

        async fn list_paper_types(&self) -> Result<Vec<PaperType>, MakulaError> {
            Ok(self.paper_types.clone())
        }
    }

    struct MemMedia;

    #[async_trait]
    impl MediaStore for MemMedia {
        async fn upload_photo(
            &self,
            _data: Vec<u8>,
            filename: &str,
        ) -> Result<String, MakulaError> {
            Ok(format!("https://media.example/waste-paper/{filename}"))
        }
    }

    struct Harness {
        engine: IntakeEngine,
        records: Arc<MemRecords>,
        links: Arc<MemLinks>,
    }

    fn harness() -> Harness {
        let credentials = Arc::new(MemCredentials::default());
        let records = Arc::new(MemRecords::with_types());
        let links = Arc::new(MemLinks::default());
        let auth = Arc::new(AuthFlow::new(
            credentials,
            Arc::new(SessionManager::new(Duration::from_secs(60))),
        ));
        let engine = IntakeEngine::new(
            auth,
            links.clone(),
            records.clone(),
            Some(Arc::new(MemMedia)),
        );
        Harness {
            engine,
            records,
            links,
        }
    }

    async fn step_of(engine: &IntakeEngine, telegram_id: i64) -> Option<Step> {
        engine
            .conversations
            .lock(telegram_id)
            .await
            .as_ref()
            .map(|s| s.step)
    }

    fn text(s: &str) -> IntakeInput {
        IntakeInput::Text(s.to_string())
    }

    const TID: i64 = 4242;

    /// Walks a linked identity up to the photo step.
    async fn walk_to_photo(h: &Harness) {
        h.links.link(TID, 1).await.unwrap();
        h.engine.start(TID).await;
        h.engine.handle_input(TID, text("12.5")).await;
        h.engine.handle_input(TID, text("Cardboard")).await;
        h.engine
            .handle_input(
                TID,
                IntakeInput::Location {
                    latitude: 55.75,
                    longitude: 37.61,
                },
            )
            .await;
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::CollectPhoto));
    }

    #[tokio::test]
    async fn start_unlinked_offers_login_or_register() {
        let h = harness();
        let replies = h.engine.start(TID).await;
        assert_eq!(replies, vec![flow::PROMPT_CHOOSE.to_string()]);
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::Start));
    }

    #[tokio::test]
    async fn start_linked_skips_to_weight() {
        let h = harness();
        h.links.link(TID, 1).await.unwrap();
        let replies = h.engine.start(TID).await;
        assert_eq!(replies, vec![flow::PROMPT_WEIGHT.to_string()]);
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::CollectWeight));
    }

    #[tokio::test]
    async fn input_without_conversation_hints_surrender() {
        let h = harness();
        let replies = h.engine.handle_input(TID, text("12.5")).await;
        assert_eq!(replies, vec![MSG_NO_ACTIVE.to_string()]);
    }

    /// Registration through the bot creates the account, links the identity,
    /// and continues to weight collection.
    #[tokio::test]
    async fn register_subflow_links_and_continues() {
        let h = harness();
        h.engine.start(TID).await;
        h.engine.handle_input(TID, text("register")).await;
        h.engine.handle_input(TID, text("Ivan")).await;
        h.engine.handle_input(TID, text("ivan_01")).await;
        h.engine.handle_input(TID, text("Abcdef1!")).await;
        let replies = h.engine.handle_input(TID, text("Abcdef1!")).await;

        assert_eq!(replies[0], MSG_REGISTERED);
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::CollectWeight));
        assert_eq!(h.links.resolve(TID).await.unwrap(), Some(1));
    }

    /// A register validation failure restarts the sub-flow at the name step
    /// with the specific reason surfaced.
    #[tokio::test]
    async fn register_validation_failure_restarts_at_name() {
        let h = harness();
        h.engine.start(TID).await;
        h.engine.handle_input(TID, text("register")).await;
        h.engine.handle_input(TID, text("Ivan")).await;
        h.engine.handle_input(TID, text("ab")).await; // login too short
        h.engine.handle_input(TID, text("Abcdef1!")).await;
        let replies = h.engine.handle_input(TID, text("Abcdef1!")).await;

        assert!(replies[0].contains("at least 4"));
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::RegisterName));
    }

    #[tokio::test]
    async fn login_subflow_rejects_bad_credentials_generically() {
        let h = harness();
        h.engine.start(TID).await;
        h.engine.handle_input(TID, text("login")).await;
        h.engine.handle_input(TID, text("ghost")).await;
        let replies = h.engine.handle_input(TID, text("Abcdef1!")).await;

        assert!(replies[0].starts_with(MSG_LOGIN_FAILED));
        // Unknown login and wrong password read identically.
        assert!(!replies[0].contains("not found"));
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::LoginLogin));
    }

    #[tokio::test]
    async fn login_subflow_links_existing_account() {
        let h = harness();
        // Register once through the bot, then cancel and log in again from
        // a second device identity.
        h.engine.start(TID).await;
        h.engine.handle_input(TID, text("register")).await;
        h.engine.handle_input(TID, text("Ivan")).await;
        h.engine.handle_input(TID, text("ivan_01")).await;
        h.engine.handle_input(TID, text("Abcdef1!")).await;
        h.engine.handle_input(TID, text("Abcdef1!")).await;

        let other = TID + 1;
        h.engine.start(other).await;
        h.engine.handle_input(other, text("login")).await;
        h.engine.handle_input(other, text("ivan_01")).await;
        let replies = h.engine.handle_input(other, text("Abcdef1!")).await;

        assert_eq!(replies[0], MSG_LOGGED_IN);
        assert_eq!(h.links.resolve(other).await.unwrap(), Some(1));
        assert_eq!(step_of(&h.engine, other).await, Some(Step::CollectWeight));
    }

    /// Weight, then a name outside the offered list re-prompts without a
    /// transition, then a valid name moves to location collection.
    #[tokio::test]
    async fn paper_type_reprompt_then_accept() {
        let h = harness();
        h.links.link(TID, 1).await.unwrap();
        h.engine.start(TID).await;

        h.engine.handle_input(TID, text("12.5")).await;
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::CollectPaperType));

        let replies = h.engine.handle_input(TID, text("Plastic")).await;
        assert!(replies[0].contains("Cardboard"));
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::CollectPaperType));

        h.engine.handle_input(TID, text("Cardboard")).await;
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::CollectLocation));
    }

    /// "no" at the photo step finalizes with a null photo reference.
    #[tokio::test]
    async fn photo_no_persists_record_without_photo() {
        let h = harness();
        walk_to_photo(&h).await;

        let replies = h.engine.handle_input(TID, text("no")).await;
        assert_eq!(replies, vec![MSG_SAVED.to_string()]);
        assert_eq!(step_of(&h.engine, TID).await, None);

        let submissions = h.records.submissions.lock().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0].weight, 12.5);
        assert_eq!(submissions[0].paper_type_id, Some(1));
        assert_eq!(submissions[0].latitude, Some(55.75));
        assert!(submissions[0].photo_url.is_none());
    }

    #[tokio::test]
    async fn photo_attachment_uploads_then_persists() {
        let h = harness();
        walk_to_photo(&h).await;

        let replies = h
            .engine
            .handle_input(
                TID,
                IntakeInput::Photo {
                    data: vec![0xFF, 0xD8],
                    filename: "photo.jpg".into(),
                },
            )
            .await;
        assert_eq!(replies, vec![MSG_SAVED.to_string()]);

        let submissions = h.records.submissions.lock().unwrap();
        assert_eq!(
            submissions[0].photo_url.as_deref(),
            Some("https://media.example/waste-paper/photo.jpg")
        );
    }

    /// Finalizing with no linked account yields the not-linked error and
    /// leaves no record behind.
    #[tokio::test]
    async fn finalize_without_link_creates_nothing() {
        let h = harness();
        // Force a conversation into the photo step without a link.
        {
            let mut guard = h.engine.conversations.lock(TID).await;
            *guard = Some(ConversationState {
                step: Step::CollectPhoto,
                scratch: Scratch {
                    weight: Some(3.0),
                    ..Scratch::default()
                },
            });
        }

        let replies = h.engine.handle_input(TID, text("no")).await;
        assert_eq!(replies, vec![MSG_NOT_LINKED.to_string()]);
        assert!(h.records.submissions.lock().unwrap().is_empty());
        assert_eq!(step_of(&h.engine, TID).await, None);
    }

    /// The restart command clears mid-flow state; the next start re-enters
    /// the flow from the beginning.
    #[tokio::test]
    async fn cancel_mid_flow_clears_state() {
        let h = harness();
        h.links.link(TID, 1).await.unwrap();
        h.engine.start(TID).await;
        h.engine.handle_input(TID, text("12.5")).await;
        h.engine.handle_input(TID, text("Cardboard")).await;
        assert_eq!(step_of(&h.engine, TID).await, Some(Step::CollectLocation));

        let replies = h.engine.cancel(TID).await;
        assert_eq!(replies, vec![MSG_CANCELLED.to_string()]);
        assert_eq!(step_of(&h.engine, TID).await, None);

        let replies = h.engine.handle_input(TID, text("anything")).await;
        assert_eq!(replies, vec![MSG_NO_ACTIVE.to_string()]);

        let replies = h.engine.start(TID).await;
        assert_eq!(replies, vec![flow::PROMPT_WEIGHT.to_string()]);
    }

    #[tokio::test]
    async fn stats_and_history_require_link() {
        let h = harness();
        assert!(matches!(
            h.engine.stats(TID).await.unwrap_err(),
            MakulaError::NotFound { .. }
        ));

        walk_to_photo(&h).await;
        h.engine.handle_input(TID, text("no")).await;

        let stats = h.engine.stats(TID).await.unwrap();
        assert_eq!(stats.count, 1);
        assert_eq!(stats.total_weight, 12.5);
        assert_eq!(h.engine.history(TID).await.unwrap().len(), 1);
    }
}
