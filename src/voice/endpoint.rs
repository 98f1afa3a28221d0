//! Energy-based end-of-utterance detection
//!
//! Speech starts when a chunk's RMS energy crosses the threshold and ends after a
//! run of quiet samples. Short blips followed by silence are discarded.

/// Tuning for [`UtteranceDetector`], in samples at 16kHz
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndpointSettings {
    /// Minimum RMS energy to count a chunk as speech
    pub energy_threshold: f32,
    /// Speech shorter than this is treated as noise
    pub min_speech_samples: usize,
    /// Silence after speech that ends the utterance
    pub silence_samples: usize,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            energy_threshold: 0.03,
            min_speech_samples: 4800, // 0.3 seconds
            silence_samples: 12_000,  // 0.75 seconds
        }
    }
}

/// Where the detector is within an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// No speech yet
    Waiting,
    /// Speech in progress
    Speaking,
    /// Speech followed by enough silence
    Complete,
}

/// Finds one utterance in a stream of audio chunks
#[derive(Debug)]
pub struct UtteranceDetector {
    settings: EndpointSettings,
    state: Endpoint,
    speech: Vec<f32>,
    silence: usize,
}

impl UtteranceDetector {
    #[must_use]
    pub const fn new(settings: EndpointSettings) -> Self {
        Self {
            settings,
            state: Endpoint::Waiting,
            speech: Vec::new(),
            silence: 0,
        }
    }

    /// Feed a chunk of samples and return the new state
    pub fn process(&mut self, samples: &[f32]) -> Endpoint {
        if samples.is_empty() || self.state == Endpoint::Complete {
            return self.state;
        }

        let energy = calculate_energy(samples);
        let is_speech = energy > self.settings.energy_threshold;

        match self.state {
            Endpoint::Waiting => {
                if is_speech {
                    tracing::trace!(energy, "speech started");
                    self.state = Endpoint::Speaking;
                    self.speech.clear();
                    self.speech.extend_from_slice(samples);
                    self.silence = 0;
                }
            }
            Endpoint::Speaking => {
                self.speech.extend_from_slice(samples);
                if is_speech {
                    self.silence = 0;
                } else {
                    self.silence += samples.len();
                }

                if self.silence > self.settings.silence_samples {
                    let voiced = self.speech.len().saturating_sub(self.silence);
                    if voiced > self.settings.min_speech_samples {
                        tracing::debug!(samples = self.speech.len(), "utterance complete");
                        self.state = Endpoint::Complete;
                    } else {
                        tracing::trace!(voiced, "discarding short noise");
                        self.reset();
                    }
                }
            }
            Endpoint::Complete => {}
        }

        self.state
    }

    /// Take the captured utterance and reset
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let speech = std::mem::take(&mut self.speech);
        self.reset();
        speech
    }

    /// Back to waiting for speech
    pub fn reset(&mut self) {
        self.state = Endpoint::Waiting;
        self.speech.clear();
        self.silence = 0;
    }

    #[must_use]
    pub const fn state(&self) -> Endpoint {
        self.state
    }
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}
