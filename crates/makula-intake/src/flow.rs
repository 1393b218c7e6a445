// SPDX-FileCopyrightText: 2026 Makula Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pure transition logic for the conversational intake flow.
//!
//! `advance` maps (step, scratch, input) to a [`Transition`] without touching
//! any store or transport, so every branch is unit-testable with plain
//! values. Steps whose outcome depends on an external call return
//! [`Transition::Effect`]; the engine executes the effect and applies the
//! follow-up transition.

use crate::step::{ConversationState, IntakeInput, Scratch, Step};

pub const PROMPT_CHOOSE: &str =
    "Do you have an account? Answer \"login\" to sign in or \"register\" to create one.";
pub const PROMPT_LOGIN: &str = "Enter your login:";
pub const PROMPT_LOGIN_PASSWORD: &str = "Enter your password:";
pub const PROMPT_NAME: &str = "Enter your display name:";
pub const PROMPT_NEW_LOGIN: &str = "Choose a login:";
pub const PROMPT_NEW_PASSWORD: &str = "Choose a password:";
pub const PROMPT_CONFIRM: &str = "Repeat the password:";
pub const PROMPT_WEIGHT: &str = "Enter the weight of the waste paper in kilograms:";
pub const PROMPT_LOCATION: &str = "Now share your location.";
pub const PROMPT_PHOTO: &str = "Would you like to attach a photo? (yes/no)";
pub const PROMPT_SEND_PHOTO: &str = "Send the photo:";

const REPROMPT_WEIGHT: &str = "Please enter a number greater than 0.";
const REPROMPT_LOCATION: &str = "Please use the location sharing button to send your position.";
const REPROMPT_PHOTO: &str = "Please answer \"yes\" or \"no\", or send a photo.";
const REPROMPT_CONFIRM_MISMATCH: &str = "Passwords do not match. Choose a password:";

/// What a step asked the outside world to do.
#[derive(Debug, Clone, PartialEq)]
pub enum EffectRequest {
    /// Confirmation matched: register the account remotely, then link the
    /// identity and continue to weight collection.
    Register {
        name: String,
        login: String,
        password: String,
    },
    /// Password submitted: verify the credentials, then link the identity
    /// and continue to weight collection.
    Login { login: String, password: String },
    /// Weight accepted: the next step depends on whether any paper types
    /// exist, so the engine loads them.
    LoadPaperTypes { scratch: Scratch },
    /// Photo declined: assemble and submit the record.
    Finalize { scratch: Scratch },
    /// Photo attached: upload it, record the URL, then finalize.
    UploadAndFinalize {
        scratch: Scratch,
        data: Vec<u8>,
        filename: String,
    },
}

/// Result of advancing one step with one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Invalid input for this step: stay put and re-prompt.
    Stay { replies: Vec<String> },
    /// Move to the given state.
    Next {
        state: ConversationState,
        replies: Vec<String>,
    },
    /// An external effect decides what happens next.
    Effect(EffectRequest),
}

impl Transition {
    fn stay(reply: impl Into<String>) -> Self {
        Self::Stay {
            replies: vec![reply.into()],
        }
    }

    fn next(step: Step, scratch: Scratch, reply: impl Into<String>) -> Self {
        Self::Next {
            state: ConversationState { step, scratch },
            replies: vec![reply.into()],
        }
    }
}

/// The entry prompt a step greets the user with.
pub fn prompt_for(step: Step, scratch: &Scratch) -> String {
    match step {
        Step::Start => PROMPT_CHOOSE.to_string(),
        Step::LoginLogin => PROMPT_LOGIN.to_string(),
        Step::LoginPassword => PROMPT_LOGIN_PASSWORD.to_string(),
        Step::RegisterName => PROMPT_NAME.to_string(),
        Step::RegisterLogin => PROMPT_NEW_LOGIN.to_string(),
        Step::RegisterPassword => PROMPT_NEW_PASSWORD.to_string(),
        Step::RegisterConfirm => PROMPT_CONFIRM.to_string(),
        Step::CollectWeight => PROMPT_WEIGHT.to_string(),
        Step::CollectPaperType => paper_type_prompt(scratch),
        Step::CollectLocation => PROMPT_LOCATION.to_string(),
        Step::CollectPhoto => PROMPT_PHOTO.to_string(),
    }
}

fn paper_type_prompt(scratch: &Scratch) -> String {
    let names: Vec<&str> = scratch
        .offered_types
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    format!("Choose the paper type: {}", names.join(", "))
}

/// Advances the conversation one input.
///
/// Pure: the only outputs are the transition and its outgoing messages.
pub fn advance(step: Step, scratch: &Scratch, input: &IntakeInput) -> Transition {
    match step {
        Step::Start => advance_start(input),
        Step::LoginLogin => collect_text(input, PROMPT_LOGIN, |text| {
            let mut scratch = scratch.clone();
            scratch.login = Some(text);
            Transition::next(Step::LoginPassword, scratch, PROMPT_LOGIN_PASSWORD)
        }),
        Step::LoginPassword => collect_text(input, PROMPT_LOGIN_PASSWORD, |text| {
            Transition::Effect(EffectRequest::Login {
                login: scratch.login.clone().unwrap_or_default(),
                password: text,
            })
        }),
        Step::RegisterName => collect_text(input, PROMPT_NAME, |text| {
            let mut scratch = scratch.clone();
            scratch.name = Some(text);
            Transition::next(Step::RegisterLogin, scratch, PROMPT_NEW_LOGIN)
        }),
        Step::RegisterLogin => collect_text(input, PROMPT_NEW_LOGIN, |text| {
            let mut scratch = scratch.clone();
            scratch.login = Some(text);
            Transition::next(Step::RegisterPassword, scratch, PROMPT_NEW_PASSWORD)
        }),
        Step::RegisterPassword => collect_text(input, PROMPT_NEW_PASSWORD, |text| {
            let mut scratch = scratch.clone();
            scratch.password = Some(text);
            Transition::next(Step::RegisterConfirm, scratch, PROMPT_CONFIRM)
        }),
        Step::RegisterConfirm => advance_register_confirm(scratch, input),
        Step::CollectWeight => advance_weight(scratch, input),
        Step::CollectPaperType => advance_paper_type(scratch, input),
        Step::CollectLocation => advance_location(scratch, input),
        Step::CollectPhoto => advance_photo(scratch, input),
    }
}

fn advance_start(input: &IntakeInput) -> Transition {
    let IntakeInput::Text(text) = input else {
        return Transition::stay(PROMPT_CHOOSE);
    };
    match text.trim().to_lowercase().as_str() {
        "login" => Transition::next(Step::LoginLogin, Scratch::default(), PROMPT_LOGIN),
        "register" => Transition::next(Step::RegisterName, Scratch::default(), PROMPT_NAME),
        _ => Transition::stay(PROMPT_CHOOSE),
    }
}

/// Accepts non-empty text for a field-collecting step; anything else
/// re-prompts without transitioning.
fn collect_text(
    input: &IntakeInput,
    reprompt: &str,
    then: impl FnOnce(String) -> Transition,
) -> Transition {
    match input {
        IntakeInput::Text(text) if !text.trim().is_empty() => then(text.trim().to_string()),
        _ => Transition::stay(reprompt),
    }
}

fn advance_register_confirm(scratch: &Scratch, input: &IntakeInput) -> Transition {
    let IntakeInput::Text(text) = input else {
        return Transition::stay(PROMPT_CONFIRM);
    };
    if Some(text.trim()) != scratch.password.as_deref() {
        // Mismatch sends the user back to choose the password again.
        let mut scratch = scratch.clone();
        scratch.password = None;
        return Transition::next(Step::RegisterPassword, scratch, REPROMPT_CONFIRM_MISMATCH);
    }
    Transition::Effect(EffectRequest::Register {
        name: scratch.name.clone().unwrap_or_default(),
        login: scratch.login.clone().unwrap_or_default(),
        password: scratch.password.clone().unwrap_or_default(),
    })
}

fn advance_weight(scratch: &Scratch, input: &IntakeInput) -> Transition {
    let IntakeInput::Text(text) = input else {
        return Transition::stay(REPROMPT_WEIGHT);
    };
    match text.trim().parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight > 0.0 => {
            let mut scratch = scratch.clone();
            scratch.weight = Some(weight);
            Transition::Effect(EffectRequest::LoadPaperTypes { scratch })
        }
        _ => Transition::stay(REPROMPT_WEIGHT),
    }
}

fn advance_paper_type(scratch: &Scratch, input: &IntakeInput) -> Transition {
    let IntakeInput::Text(text) = input else {
        return Transition::stay(paper_type_prompt(scratch));
    };
    let wanted = text.trim();
    match scratch
        .offered_types
        .iter()
        .find(|t| t.name.eq_ignore_ascii_case(wanted))
    {
        Some(paper_type) => {
            let mut scratch = scratch.clone();
            scratch.paper_type_id = Some(paper_type.id);
            Transition::next(Step::CollectLocation, scratch, PROMPT_LOCATION)
        }
        None => Transition::stay(paper_type_prompt(scratch)),
    }
}

fn advance_location(scratch: &Scratch, input: &IntakeInput) -> Transition {
    let IntakeInput::Location {
        latitude,
        longitude,
    } = input
    else {
        return Transition::stay(REPROMPT_LOCATION);
    };
    let mut scratch = scratch.clone();
    scratch.latitude = Some(*latitude);
    scratch.longitude = Some(*longitude);
    Transition::next(Step::CollectPhoto, scratch, PROMPT_PHOTO)
}

fn advance_photo(scratch: &Scratch, input: &IntakeInput) -> Transition {
    match input {
        IntakeInput::Text(text) => match text.trim().to_lowercase().as_str() {
            "no" => Transition::Effect(EffectRequest::Finalize {
                scratch: scratch.clone(),
            }),
            "yes" => Transition::stay(PROMPT_SEND_PHOTO),
            _ => Transition::stay(REPROMPT_PHOTO),
        },
        IntakeInput::Photo { data, filename } => {
            Transition::Effect(EffectRequest::UploadAndFinalize {
                scratch: scratch.clone(),
                data: data.clone(),
                filename: filename.clone(),
            })
        }
        IntakeInput::Location { .. } => Transition::stay(REPROMPT_PHOTO),
    }
}
