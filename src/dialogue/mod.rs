//! Voice ordering dialogue
//!
//! [`Controller::handle`] is a pure transition: it takes the session and one
//! input and returns the effects to perform. [`Assistant`] performs them against
//! a [`VoiceIo`](crate::voice::VoiceIo) and an
//! [`OrderSubmitter`](crate::order::OrderSubmitter).
//!
//! ```text
//! AwaitingName -> AwaitingCategorySelection -> AwaitingOrderCommand
//!      -> AwaitingConfirmation -> Submitted -> AwaitingCategorySelection
//!                   \-> AwaitingOrderCommand (declined or failed)
//! ```

mod prompts;
mod runner;
mod session;

use std::sync::Arc;

use crate::matcher::{self, Answer, Command, Intent, Matcher, Normalized};
use crate::menu::{Catalog, Price};
use crate::order::{OrderPayload, SubmitOutcome};
use crate::voice::ListenError;

pub use runner::{Assistant, DEFAULT_LISTEN_TIMEOUT};
pub use session::Session;

/// Default number of consecutive misses before giving up
pub const DEFAULT_MAX_MISSES: u32 = 4;

/// Where the customer is in the conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DialogueState {
    #[default]
    AwaitingName,
    AwaitingCategorySelection,
    AwaitingOrderCommand,
    AwaitingConfirmation,
    /// Order handed to the submitter, waiting for the outcome
    Submitted,
}

/// Something that happened to the dialogue
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// The customer asked the assistant to start listening
    Activate,
    /// A transcript was recognized
    Heard(String),
    /// Listening produced no transcript
    ListenFailed(ListenError),
    /// The submitter finished with the order
    SubmissionFinished(SubmitOutcome),
}

/// Something the dialogue wants done
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Speak(String),
    Listen,
    Submit(OrderPayload),
    /// Stop and wait for the next activation
    Idle,
}

/// Dialogue settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueConfig {
    /// Spoken in the greeting
    pub restaurant_name: String,
    /// Consecutive misses before the dialogue goes idle, 0 for no limit
    pub max_misses: u32,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            restaurant_name: "Brasa Roja".to_string(),
            max_misses: DEFAULT_MAX_MISSES,
        }
    }
}

/// The ordering state machine
#[derive(Debug, Clone)]
pub struct Controller {
    matcher: Matcher,
    config: DialogueConfig,
}

impl Controller {
    #[must_use]
    pub const fn new(catalog: Arc<Catalog>, config: DialogueConfig) -> Self {
        Self {
            matcher: Matcher::new(catalog),
            config,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        self.matcher.catalog()
    }

    /// Apply one input to the session and return the effects, in order
    pub fn handle(&self, session: &mut Session, input: Input) -> Vec<Effect> {
        tracing::debug!(session_id = %session.id, state = ?session.state, input = ?input, "dialogue input");

        match input {
            Input::Activate => self.activate(session),
            Input::Heard(text) if text.trim().is_empty() => self.no_speech(session),
            Input::Heard(text) => self.heard(session, &text),
            Input::ListenFailed(error) => self.listen_failed(session, error),
            Input::SubmissionFinished(outcome) => self.submission_finished(session, outcome),
        }
    }

    fn activate(&self, session: &mut Session) -> Vec<Effect> {
        session.misses = 0;

        if session.customer_name.is_none() {
            session.state = DialogueState::AwaitingName;
            return speak_and_listen(prompts::greeting(&self.config.restaurant_name));
        }

        session.state = DialogueState::AwaitingCategorySelection;
        speak_and_listen(prompts::category_question(self.catalog()))
    }

    fn heard(&self, session: &mut Session, text: &str) -> Vec<Effect> {
        let normalized = matcher::normalize(text);
        tracing::debug!(
            session_id = %session.id,
            original = %normalized.original,
            phrase = %normalized.phrase,
            "heard"
        );

        match session.state {
            DialogueState::AwaitingName => self.name(session, text),
            DialogueState::AwaitingCategorySelection => self.category(session, &normalized),
            DialogueState::AwaitingOrderCommand => self.order_command(session, &normalized),
            DialogueState::AwaitingConfirmation => self.confirmation(session, text),
            DialogueState::Submitted => {
                tracing::warn!(session_id = %session.id, "utterance ignored while submitting");
                Vec::new()
            }
        }
    }

    fn name(&self, session: &mut Session, text: &str) -> Vec<Effect> {
        let Some(name) = matcher::extract_name(text) else {
            return self.miss(session, prompts::NAME_NOT_UNDERSTOOD.to_string());
        };

        tracing::info!(session_id = %session.id, customer = %name, "customer named");
        session.misses = 0;
        let greeting = prompts::nice_to_meet(&name);
        session.customer_name = Some(name);
        session.state = DialogueState::AwaitingCategorySelection;

        vec![
            Effect::Speak(format!(
                "{greeting} {}",
                prompts::category_question(self.catalog())
            )),
            Effect::Listen,
        ]
    }

    fn category(&self, session: &mut Session, normalized: &Normalized) -> Vec<Effect> {
        if let Some(category) = self.matcher.category(normalized)
            && !category.items.is_empty()
        {
            session.misses = 0;
            session.state = DialogueState::AwaitingOrderCommand;
            return vec![
                Effect::Speak(prompts::category_listing(category)),
                Effect::Speak(prompts::ORDER_QUESTION.to_string()),
                Effect::Listen,
            ];
        }

        // commands still work here, e.g. "finalizar pedido" after a new order
        if matcher::find_command(normalized).is_some() {
            return self.order_command(session, normalized);
        }

        self.miss(session, prompts::category_not_understood(self.catalog()))
    }

    fn order_command(&self, session: &mut Session, normalized: &Normalized) -> Vec<Effect> {
        let reply = match self.matcher.interpret(normalized) {
            Intent::NotFound => return self.miss(session, prompts::ITEM_NOT_FOUND.to_string()),
            Intent::Command(Command::Remove) => return self.remove(session, normalized),
            Intent::Command(Command::Confirm) => {
                if session.cart.is_empty() {
                    prompts::NOTHING_TO_CONFIRM.to_string()
                } else {
                    session.state = DialogueState::AwaitingConfirmation;
                    prompts::confirm_question(session.cart.total())
                }
            }
            Intent::Command(Command::ListItems) => {
                if session.cart.is_empty() {
                    prompts::EMPTY_CART.to_string()
                } else {
                    prompts::cart_summary(&session.cart)
                }
            }
            Intent::Command(Command::Total) => {
                let total = session.cart.total();
                if total == Price::ZERO {
                    prompts::EMPTY_CART.to_string()
                } else {
                    prompts::total(total)
                }
            }
            Intent::Command(Command::Cancel) => {
                session.cart.clear();
                tracing::info!(session_id = %session.id, "cart cleared by customer");
                prompts::CART_CLEARED.to_string()
            }
            Intent::Command(Command::Help) => prompts::HELP.to_string(),
            Intent::Command(Command::SwitchCategory) => {
                session.state = DialogueState::AwaitingCategorySelection;
                prompts::category_question(self.catalog())
            }
            Intent::Item(found) => {
                let quantity = session.cart.add(found.item, found.quantity);
                tracing::info!(
                    session_id = %session.id,
                    item = %found.item.name,
                    delta = found.quantity,
                    quantity,
                    "item added"
                );
                session.state = DialogueState::AwaitingOrderCommand;
                format!(
                    "{} {}",
                    prompts::added(found.item, found.quantity, quantity),
                    prompts::ADD_MORE
                )
            }
        };

        session.misses = 0;
        speak_and_listen(reply)
    }

    fn remove(&self, session: &mut Session, normalized: &Normalized) -> Vec<Effect> {
        let Some(found) = self.matcher.item(normalized) else {
            return self.miss(
                session,
                format!("{} {}", prompts::REMOVE_NOT_UNDERSTOOD, prompts::ANYTHING_ELSE),
            );
        };

        session.misses = 0;
        let full_removal = !matcher::is_partial_removal(normalized);
        let outcome = session.cart.remove(&found.item.name, full_removal);
        tracing::info!(session_id = %session.id, item = %found.item.name, ?outcome, "remove requested");

        speak_and_listen(format!(
            "{} {}",
            prompts::removed(&found.item.name, outcome),
            prompts::ANYTHING_ELSE
        ))
    }

    fn confirmation(&self, session: &mut Session, text: &str) -> Vec<Effect> {
        match matcher::classify_answer(text) {
            Answer::Yes => {
                session.misses = 0;
                session.state = DialogueState::Submitted;
                let payload = OrderPayload::from_cart(session.ticket_name(), &session.cart);
                vec![
                    Effect::Speak(prompts::CONFIRMING.to_string()),
                    Effect::Submit(payload),
                ]
            }
            Answer::No => {
                session.misses = 0;
                session.state = DialogueState::AwaitingOrderCommand;
                speak_and_listen(prompts::NOT_CONFIRMED.to_string())
            }
            Answer::Unclear => self.miss(session, prompts::YES_OR_NO.to_string()),
        }
    }

    fn submission_finished(&self, session: &mut Session, outcome: SubmitOutcome) -> Vec<Effect> {
        if session.state != DialogueState::Submitted {
            tracing::warn!(session_id = %session.id, state = ?session.state, "unexpected submission outcome");
            return Vec::new();
        }

        match outcome {
            SubmitOutcome::Accepted(order_id) => {
                tracing::info!(session_id = %session.id, order_id, "order accepted");
                session.cart.clear();
                session.state = DialogueState::AwaitingCategorySelection;
                vec![
                    Effect::Speak(prompts::accepted(order_id)),
                    Effect::Speak(prompts::something_else(self.catalog())),
                    Effect::Listen,
                ]
            }
            SubmitOutcome::Rejected(message) => {
                tracing::warn!(session_id = %session.id, %message, "order rejected");
                session.state = DialogueState::AwaitingOrderCommand;
                speak_and_listen(prompts::rejected(&message))
            }
            SubmitOutcome::Unreachable(reason) => {
                tracing::warn!(session_id = %session.id, %reason, "order backend unreachable");
                session.state = DialogueState::AwaitingOrderCommand;
                speak_and_listen(prompts::UNREACHABLE.to_string())
            }
        }
    }

    fn listen_failed(&self, session: &mut Session, error: ListenError) -> Vec<Effect> {
        match error {
            ListenError::NoSpeech => self.no_speech(session),
            ListenError::AudioCaptureFailure => speak_and_idle(prompts::AUDIO_CAPTURE),
            ListenError::NotAllowed => speak_and_idle(prompts::NOT_ALLOWED),
            ListenError::Other(reason) => {
                tracing::warn!(session_id = %session.id, %reason, "listen failed");
                speak_and_idle(prompts::LISTEN_ERROR)
            }
        }
    }

    fn no_speech(&self, session: &mut Session) -> Vec<Effect> {
        self.miss(session, prompts::NO_SPEECH.to_string())
    }

    /// Count an uninterpretable turn, re-prompting or giving up
    fn miss(&self, session: &mut Session, prompt: String) -> Vec<Effect> {
        session.misses += 1;
        let max = self.config.max_misses;

        if max > 0 && session.misses >= max {
            tracing::info!(session_id = %session.id, misses = session.misses, "too many misses, going idle");
            session.misses = 0;
            return speak_and_idle(prompts::ESCALATION);
        }

        speak_and_listen(prompt)
    }
}

fn speak_and_listen(text: String) -> Vec<Effect> {
    vec![Effect::Speak(text), Effect::Listen]
}

fn speak_and_idle(text: &str) -> Vec<Effect> {
    vec![Effect::Speak(text.to_string()), Effect::Idle]
}
