//! Microphone and speaker adapter
//!
//! listen: record one utterance, encode WAV, transcribe.
//! speak: synthesize MP3, decode, play.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::capture::{MAX_UTTERANCE, SAMPLE_RATE, record_utterance, samples_to_wav};
use super::endpoint::EndpointSettings;
use super::playback::AudioPlayback;
use super::stt::SpeechToText;
use super::tts::TextToSpeech;
use super::{ListenError, VoiceIo};
use crate::{Error, Result};

/// Time allowed for an utterance to finish and be transcribed once speech starts
pub const UTTERANCE_ALLOWANCE: Duration = MAX_UTTERANCE.saturating_add(Duration::from_secs(15));

/// Voice over the default microphone and speakers
pub struct MicrophoneVoice {
    stt: SpeechToText,
    tts: TextToSpeech,
    playback: AudioPlayback,
    endpoint: EndpointSettings,
    no_speech_timeout: Duration,
    recording: Option<Arc<AtomicBool>>,
}

impl MicrophoneVoice {
    #[must_use]
    pub fn new(stt: SpeechToText, tts: TextToSpeech, no_speech_timeout: Duration) -> Self {
        Self {
            stt,
            tts,
            playback: AudioPlayback::new(),
            endpoint: EndpointSettings::default(),
            no_speech_timeout,
            recording: None,
        }
    }

    /// Override the endpointing thresholds
    #[must_use]
    pub const fn with_endpoint(mut self, endpoint: EndpointSettings) -> Self {
        self.endpoint = endpoint;
        self
    }

    async fn record(&mut self) -> Result<Option<Vec<f32>>> {
        // a recording left over from a timed-out listen stops here
        if let Some(previous) = self.recording.take() {
            previous.store(true, Ordering::Relaxed);
        }
        let stop = Arc::new(AtomicBool::new(false));
        self.recording = Some(Arc::clone(&stop));

        let settings = self.endpoint;
        let timeout = self.no_speech_timeout;
        tokio::task::spawn_blocking(move || record_utterance(settings, timeout, &stop))
            .await
            .map_err(|e| Error::Audio(format!("capture task failed: {e}")))?
    }
}

/// Classify a voice pipeline error for the dialogue
#[must_use]
pub fn map_listen_error(err: &Error) -> ListenError {
    match err {
        Error::Audio(_) => ListenError::AudioCaptureFailure,
        Error::PermissionDenied(_) => ListenError::NotAllowed,
        other => ListenError::Other(other.to_string()),
    }
}

#[async_trait]
impl VoiceIo for MicrophoneVoice {
    async fn speak(&mut self, text: &str) -> Result<()> {
        tracing::debug!(text, "speaking");
        self.playback.stop();
        let audio = self.tts.synthesize(text).await?;
        self.playback.play_mp3(audio).await
    }

    async fn listen(&mut self) -> std::result::Result<String, ListenError> {
        let samples = self.record().await.map_err(|e| {
            tracing::error!(error = %e, "microphone capture failed");
            map_listen_error(&e)
        })?;
        let Some(samples) = samples else {
            return Err(ListenError::NoSpeech);
        };

        let wav = samples_to_wav(&samples, SAMPLE_RATE).map_err(|e| map_listen_error(&e))?;
        let transcript = self.stt.transcribe(wav).await.map_err(|e| {
            tracing::warn!(error = %e, "transcription failed");
            map_listen_error(&e)
        })?;

        if transcript.is_empty() {
            return Err(ListenError::NoSpeech);
        }
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_listen_error() {
        assert_eq!(
            map_listen_error(&Error::Audio("no input device".to_string())),
            ListenError::AudioCaptureFailure
        );
        assert_eq!(
            map_listen_error(&Error::PermissionDenied("401".to_string())),
            ListenError::NotAllowed
        );
        assert!(matches!(
            map_listen_error(&Error::Stt("500".to_string())),
            ListenError::Other(_)
        ));
    }
}
