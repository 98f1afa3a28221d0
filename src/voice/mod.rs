//! Voice input and output
//!
//! The dialogue only sees [`VoiceIo`]: speak a prompt, listen for one utterance.
//! Adapters:
//! - [`ConsoleVoice`]: prompts on stdout, utterances typed on stdin
//! - [`MicrophoneVoice`]: microphone capture, speech-to-text, text-to-speech
//! - [`ScriptedVoice`]: canned utterances for tests

mod capture;
mod console;
mod endpoint;
mod microphone;
mod playback;
mod scripted;
mod stt;
mod tts;

use async_trait::async_trait;

pub use capture::{AudioCapture, MAX_UTTERANCE, SAMPLE_RATE, record_utterance, samples_to_wav};
pub use console::ConsoleVoice;
pub use endpoint::{Endpoint, EndpointSettings, UtteranceDetector};
pub use microphone::{MicrophoneVoice, UTTERANCE_ALLOWANCE, map_listen_error};
pub use playback::{AudioPlayback, Clip, decode_mp3};
pub use scripted::ScriptedVoice;
pub use stt::{DEFAULT_STT_URL, SpeechToText};
pub use tts::{DEFAULT_TTS_URL, TextToSpeech};

use crate::Result;

/// Why a listen attempt produced no transcript
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ListenError {
    /// Nothing was said before the timeout, or the transcript was empty
    #[error("no speech detected")]
    NoSpeech,
    /// The microphone could not be opened or stopped delivering audio
    #[error("audio capture failed")]
    AudioCaptureFailure,
    /// Access to the microphone or the speech service was refused
    #[error("not allowed")]
    NotAllowed,
    #[error("{0}")]
    Other(String),
}

/// Speech in and out for one dialogue
///
/// Calls never overlap: the dialogue awaits each one before issuing the next.
#[async_trait]
pub trait VoiceIo: Send {
    /// Say `text` to the customer
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails; callers log and continue
    async fn speak(&mut self, text: &str) -> Result<()>;

    /// Capture one utterance and return its transcript
    async fn listen(&mut self) -> std::result::Result<String, ListenError>;
}
