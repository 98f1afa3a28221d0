//! Terminal adapter: prompts are printed, utterances are typed

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::mpsc;

use super::{ListenError, VoiceIo};
use crate::Result;

/// Voice stand-in for a terminal session
///
/// Lines are read by a background task so an abandoned listen never loses input.
pub struct ConsoleVoice<W = Stdout> {
    lines: mpsc::Receiver<String>,
    out: W,
}

impl ConsoleVoice<Stdout> {
    /// Read from stdin and write to stdout
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn stdio() -> Self {
        Self::with_io(
            tokio::io::BufReader::new(tokio::io::stdin()),
            tokio::io::stdout(),
        )
    }
}

impl<W: AsyncWrite + Unpin + Send> ConsoleVoice<W> {
    /// Use any line source and output sink
    ///
    /// Must be called from within a tokio runtime.
    pub fn with_io<R>(reader: R, out: W) -> Self
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(16);
        tokio::spawn(async move {
            let mut lines = reader.lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if tx.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to read console input");
                        break;
                    }
                }
            }
        });

        Self { lines: rx, out }
    }

    /// Wait for the customer to press Enter
    ///
    /// Returns `false` once input is closed.
    pub async fn wait_for_activation(&mut self) -> bool {
        self.lines.recv().await.is_some()
    }

    /// Output sink, for inspection
    #[must_use]
    pub const fn output(&self) -> &W {
        &self.out
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> VoiceIo for ConsoleVoice<W> {
    async fn speak(&mut self, text: &str) -> Result<()> {
        self.out.write_all(format!("🔊 {text}\n").as_bytes()).await?;
        self.out.flush().await?;
        Ok(())
    }

    async fn listen(&mut self) -> std::result::Result<String, ListenError> {
        if let Err(e) = self.out.write_all("🎤 > ".as_bytes()).await {
            tracing::debug!(error = %e, "failed to write console prompt");
        }
        let _ = self.out.flush().await;

        match self.lines.recv().await {
            Some(line) if line.trim().is_empty() => Err(ListenError::NoSpeech),
            Some(line) => Ok(line.trim().to_string()),
            None => Err(ListenError::Other("console input closed".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_console_round_trip() {
        let input: &[u8] = b"quiero papas fritas\n\n";
        let mut voice = ConsoleVoice::with_io(input, Vec::new());

        voice.speak("Hola").await.unwrap();
        assert_eq!(voice.listen().await.unwrap(), "quiero papas fritas");
        assert_eq!(voice.listen().await, Err(ListenError::NoSpeech));
        assert!(matches!(voice.listen().await, Err(ListenError::Other(_))));

        let out = String::from_utf8(voice.output().clone()).unwrap();
        assert!(out.contains("🔊 Hola\n"));
    }

    #[tokio::test]
    async fn test_activation_ends_with_input() {
        let input: &[u8] = b"\n";
        let mut voice = ConsoleVoice::with_io(input, Vec::new());
        assert!(voice.wait_for_activation().await);
        assert!(!voice.wait_for_activation().await);
    }
}
