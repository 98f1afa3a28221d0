//! Audio playback to speakers
//!
//! Playback runs on a blocking thread. Starting a new clip stops the one still
//! playing.

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use cpal::SampleRate;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::{Error, Result};

/// Decoded mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Plays synthesized speech on the default output device
#[derive(Debug, Default)]
pub struct AudioPlayback {
    current: Option<Arc<AtomicBool>>,
}

impl AudioPlayback {
    #[must_use]
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Stop whatever is playing
    pub fn stop(&mut self) {
        if let Some(flag) = self.current.take() {
            flag.store(true, Ordering::Relaxed);
        }
    }

    /// Play MP3 audio and wait for it to finish
    ///
    /// # Errors
    ///
    /// Returns error if decoding fails or no output device is usable
    pub async fn play_mp3(&mut self, mp3_data: Vec<u8>) -> Result<()> {
        self.stop();
        let stop = Arc::new(AtomicBool::new(false));
        self.current = Some(Arc::clone(&stop));

        tokio::task::spawn_blocking(move || {
            let clip = decode_mp3(&mp3_data)?;
            play_blocking(&clip, &stop)
        })
        .await
        .map_err(|e| Error::Audio(format!("playback task failed: {e}")))?
    }
}

/// Play a clip on the calling thread until it ends or `stop` is set
fn play_blocking(clip: &Clip, stop: &AtomicBool) -> Result<()> {
    if clip.samples.is_empty() {
        return Ok(());
    }

    let device = cpal::default_host()
        .default_output_device()
        .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

    let rate = SampleRate(clip.sample_rate);
    let supported = device
        .supported_output_configs()
        .map_err(|e| Error::Audio(e.to_string()))?
        .filter(|c| c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
        .min_by_key(cpal::SupportedStreamConfigRange::channels)
        .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;
    let config = supported.with_sample_rate(rate).config();
    let channels = usize::from(config.channels);

    let samples = Arc::new(clip.samples.clone());
    let position = Arc::new(AtomicUsize::new(0));

    let stream = {
        let samples = Arc::clone(&samples);
        let position = Arc::clone(&position);
        device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    for frame in data.chunks_mut(channels) {
                        let pos = position.fetch_add(1, Ordering::Relaxed);
                        let sample = samples.get(pos).copied().unwrap_or(0.0);
                        frame.fill(sample);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?
    };

    stream.play().map_err(|e| Error::Audio(e.to_string()))?;

    let duration_ms = (samples.len() as u64 * 1000) / u64::from(clip.sample_rate.max(1));
    let deadline = Instant::now() + Duration::from_millis(duration_ms + 500);

    while position.load(Ordering::Relaxed) < samples.len() {
        if stop.load(Ordering::Relaxed) {
            tracing::debug!("playback interrupted");
            return Ok(());
        }
        if Instant::now() > deadline {
            break;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    // let the device drain its last buffer
    std::thread::sleep(Duration::from_millis(100));
    tracing::debug!(samples = samples.len(), "playback complete");
    Ok(())
}

/// Decode MP3 bytes to mono f32 samples
///
/// # Errors
///
/// Returns error if the data is not valid MP3
pub fn decode_mp3(mp3_data: &[u8]) -> Result<Clip> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();
    let mut sample_rate = 24_000;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                sample_rate = u32::try_from(frame.sample_rate).unwrap_or(sample_rate);
                if frame.channels == 2 {
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    Ok(Clip {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_empty_mp3() {
        let clip = decode_mp3(&[]).unwrap();
        assert!(clip.samples.is_empty());
    }

    #[test]
    fn test_empty_clip_plays_instantly() {
        let clip = Clip {
            samples: Vec::new(),
            sample_rate: 24_000,
        };
        assert!(play_blocking(&clip, &AtomicBool::new(false)).is_ok());
    }

    #[test]
    fn test_stop_sets_flag() {
        let mut playback = AudioPlayback::new();
        let flag = Arc::new(AtomicBool::new(false));
        playback.current = Some(Arc::clone(&flag));

        playback.stop();
        assert!(flag.load(Ordering::Relaxed));
        assert!(playback.current.is_none());
    }
}
