//! Effect runner
//!
//! Drives a [`Controller`] against a voice channel and an order submitter. One
//! activation runs turns until the dialogue asks to go idle; activations that
//! arrive meanwhile are dropped.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::mpsc;

use super::{Controller, Effect, Input, Session};
use crate::order::OrderSubmitter;
use crate::voice::{ListenError, VoiceIo};

/// Default time to wait for a transcript
pub const DEFAULT_LISTEN_TIMEOUT: Duration = Duration::from_secs(10);

/// Voice ordering assistant
pub struct Assistant<V, S> {
    controller: Controller,
    voice: V,
    submitter: S,
    listen_timeout: Duration,
}

impl<V: VoiceIo, S: OrderSubmitter> Assistant<V, S> {
    #[must_use]
    pub const fn new(controller: Controller, voice: V, submitter: S) -> Self {
        Self {
            controller,
            voice,
            submitter,
            listen_timeout: DEFAULT_LISTEN_TIMEOUT,
        }
    }

    /// Give up on a listen after `timeout` and treat it as silence
    #[must_use]
    pub const fn with_listen_timeout(mut self, timeout: Duration) -> Self {
        self.listen_timeout = timeout;
        self
    }

    #[must_use]
    pub const fn controller(&self) -> &Controller {
        &self.controller
    }

    #[must_use]
    pub const fn voice(&self) -> &V {
        &self.voice
    }

    pub const fn voice_mut(&mut self) -> &mut V {
        &mut self.voice
    }

    #[must_use]
    pub const fn submitter(&self) -> &S {
        &self.submitter
    }

    /// Feed one input and perform effects until the dialogue goes idle
    pub async fn run_turns(&mut self, session: &mut Session, input: Input) {
        let mut pending: VecDeque<Effect> = self.controller.handle(session, input).into();

        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::Speak(text) => {
                    if let Err(e) = self.voice.speak(&text).await {
                        tracing::warn!(session_id = %session.id, error = %e, "failed to speak");
                    }
                }
                Effect::Listen => {
                    let input = match self.listen().await {
                        Ok(text) => Input::Heard(text),
                        Err(error) => Input::ListenFailed(error),
                    };
                    pending.extend(self.controller.handle(session, input));
                }
                Effect::Submit(payload) => {
                    let outcome = self.submitter.submit(&payload).await;
                    pending.extend(
                        self.controller
                            .handle(session, Input::SubmissionFinished(outcome)),
                    );
                }
                Effect::Idle => {
                    tracing::debug!(session_id = %session.id, state = ?session.state, "dialogue idle");
                    pending.clear();
                }
            }
        }
    }

    /// Run an activation per trigger until the trigger channel closes
    pub async fn run(&mut self, session: &mut Session, mut triggers: mpsc::Receiver<()>) {
        tracing::info!(session_id = %session.id, "assistant ready");

        while triggers.recv().await.is_some() {
            self.run_turns(session, Input::Activate).await;

            // activations while busy are ignored
            let mut dropped = 0_usize;
            while triggers.try_recv().is_ok() {
                dropped += 1;
            }
            if dropped > 0 {
                tracing::debug!(dropped, "ignored activations while busy");
            }
        }

        tracing::info!(session_id = %session.id, "assistant stopped");
    }

    async fn listen(&mut self) -> Result<String, ListenError> {
        match tokio::time::timeout(self.listen_timeout, self.voice.listen()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(timeout = ?self.listen_timeout, "listen timed out");
                Err(ListenError::NoSpeech)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::dialogue::{DialogueConfig, DialogueState};
    use crate::menu::default_catalog;
    use crate::order::{OrderPayload, SubmitOutcome};
    use crate::voice::ScriptedVoice;

    #[derive(Clone, Default)]
    struct Recorder {
        submitted: Arc<Mutex<Vec<OrderPayload>>>,
        answer: Option<SubmitOutcome>,
    }

    #[async_trait]
    impl OrderSubmitter for Recorder {
        async fn submit(&self, payload: &OrderPayload) -> SubmitOutcome {
            self.submitted.lock().unwrap().push(payload.clone());
            self.answer.clone().unwrap_or(SubmitOutcome::Accepted(1))
        }
    }

    fn assistant(script: &[&str], submitter: Recorder) -> Assistant<ScriptedVoice, Recorder> {
        let controller = Controller::new(Arc::new(default_catalog()), DialogueConfig::default());
        let voice = ScriptedVoice::new(script.iter().copied());
        Assistant::new(controller, voice, submitter)
    }

    #[tokio::test]
    async fn test_full_order() {
        let recorder = Recorder::default();
        let mut a = assistant(
            &[
                "me llamo ana",
                "brasa",
                "quiero un pollo a la brasa",
                "dos papas fritas",
                "finalizar pedido",
                "sí",
            ],
            recorder.clone(),
        );
        a.voice_mut().push_failure(ListenError::AudioCaptureFailure);
        let mut session = Session::new();

        a.run_turns(&mut session, Input::Activate).await;

        let submitted = recorder.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].customer_name, "Ana");
        assert_eq!(submitted[0].total.cents(), 7190);
        assert!(session.cart.is_empty());
        assert_eq!(session.state, DialogueState::AwaitingCategorySelection);

        let spoken = a.voice().spoken();
        assert!(spoken.iter().any(|s| s == "Confirmando tu pedido..."));
        assert!(spoken.iter().any(|s| s.contains("Número de pedido: 1.")));
        assert_eq!(a.voice().remaining(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_keeps_cart() {
        let recorder = Recorder {
            answer: Some(SubmitOutcome::Unreachable("connection refused".to_string())),
            ..Recorder::default()
        };
        let mut a = assistant(&["anticuchos", "finalizar pedido", "si"], recorder.clone());
        a.voice_mut().push_failure(ListenError::NotAllowed);
        let mut session = Session::new();
        session.customer_name = Some("Luis".to_string());
        session.state = DialogueState::AwaitingOrderCommand;

        a.run_turns(&mut session, Input::Heard("ver pedido".to_string()))
            .await;

        assert_eq!(recorder.submitted.lock().unwrap().len(), 1);
        assert_eq!(session.cart.quantity_of("ANTICUCHOS"), 1);
        assert_eq!(session.state, DialogueState::AwaitingOrderCommand);
        assert!(
            a.voice()
                .spoken()
                .iter()
                .any(|s| s.starts_with("Lo siento, no pude conectar"))
        );
    }

    #[tokio::test]
    async fn test_exhausted_script_goes_idle() {
        let mut a = assistant(&[], Recorder::default());
        let mut session = Session::new();

        a.run_turns(&mut session, Input::Activate).await;

        assert_eq!(a.voice().listens(), 1);
        assert_eq!(session.state, DialogueState::AwaitingName);
    }

    #[tokio::test]
    async fn test_run_until_triggers_close() {
        let mut a = assistant(&["rosa"], Recorder::default());
        a.voice_mut().push_failure(ListenError::AudioCaptureFailure);
        let mut session = Session::new();

        let (tx, rx) = mpsc::channel(4);
        tx.send(()).await.unwrap();
        drop(tx);

        a.run(&mut session, rx).await;

        assert_eq!(session.customer_name.as_deref(), Some("Rosa"));
    }
}
