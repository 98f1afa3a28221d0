//! Text-to-speech over an OpenAI-compatible speech endpoint

use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Default speech synthesis endpoint
pub const DEFAULT_TTS_URL: &str = "https://api.openai.com/v1/audio/speech";

#[derive(serde::Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'a str,
}

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    url: String,
    model: String,
    voice: String,
    speed: f32,
}

impl TextToSpeech {
    /// Create a synthesizer
    ///
    /// # Errors
    ///
    /// Returns error if API key is empty
    pub fn new(
        api_key: SecretString,
        url: String,
        model: String,
        voice: String,
        speed: f32,
    ) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config("API key required for speech synthesis".to_string()));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            url,
            model,
            voice,
            speed,
        })
    }

    /// Synthesize text to MP3 audio
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
            response_format: "mp3",
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("speech API error {status}: {body}")));
        }

        let audio = response.bytes().await?;
        tracing::debug!(bytes = audio.len(), "speech synthesized");
        Ok(audio.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_rejected() {
        let result = TextToSpeech::new(
            SecretString::from(String::new()),
            DEFAULT_TTS_URL.to_string(),
            "tts-1".to_string(),
            "nova".to_string(),
            1.0,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
