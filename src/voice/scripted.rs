//! Scripted adapter for tests and demos

use std::collections::VecDeque;

use async_trait::async_trait;

use super::{ListenError, VoiceIo};
use crate::Result;

/// Replays canned listen results and records everything spoken
#[derive(Debug, Default)]
pub struct ScriptedVoice {
    script: VecDeque<std::result::Result<String, ListenError>>,
    spoken: Vec<String>,
    listens: usize,
}

impl ScriptedVoice {
    /// Script of utterances, heard in order
    #[must_use]
    pub fn new<I, S>(utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: utterances.into_iter().map(|u| Ok(u.into())).collect(),
            ..Self::default()
        }
    }

    /// Queue another utterance
    pub fn push(&mut self, utterance: impl Into<String>) {
        self.script.push_back(Ok(utterance.into()));
    }

    /// Queue a listen failure
    pub fn push_failure(&mut self, error: ListenError) {
        self.script.push_back(Err(error));
    }

    /// Everything spoken so far
    #[must_use]
    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }

    /// Most recent prompt
    #[must_use]
    pub fn last_spoken(&self) -> Option<&str> {
        self.spoken.last().map(String::as_str)
    }

    /// Drain the recorded prompts
    pub fn take_spoken(&mut self) -> Vec<String> {
        std::mem::take(&mut self.spoken)
    }

    /// Number of listen calls made
    #[must_use]
    pub const fn listens(&self) -> usize {
        self.listens
    }

    /// Utterances not yet heard
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl VoiceIo for ScriptedVoice {
    async fn speak(&mut self, text: &str) -> Result<()> {
        tracing::debug!(text, "scripted speak");
        self.spoken.push(text.to_string());
        Ok(())
    }

    async fn listen(&mut self) -> std::result::Result<String, ListenError> {
        self.listens += 1;
        self.script
            .pop_front()
            .unwrap_or_else(|| Err(ListenError::Other("script exhausted".to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_script() {
        let mut voice = ScriptedVoice::new(["hola"]);
        voice.push_failure(ListenError::NoSpeech);

        voice.speak("¿Cuál es tu nombre?").await.unwrap();
        assert_eq!(voice.listen().await.unwrap(), "hola");
        assert_eq!(voice.listen().await, Err(ListenError::NoSpeech));
        assert!(matches!(voice.listen().await, Err(ListenError::Other(_))));

        assert_eq!(voice.listens(), 3);
        assert_eq!(voice.spoken(), ["¿Cuál es tu nombre?"]);
    }
}
