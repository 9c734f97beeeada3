//! Tone engine: sine voices through cpal plus the audio clock
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{debug, error, info};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// How long every tone sounds.
pub const TONE_DURATION: Duration = Duration::from_millis(100);

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("No audio output device available")]
    NoOutputDevice,

    #[error("Failed to query output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("Unsupported sample format: {0:?}")]
    UnsupportedSampleFormat(cpal::SampleFormat),

    #[error("Failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("Failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Synthesis capability the pad depends on.
pub trait ToneEngine {
    /// Sound a sine tone at `frequency` for `TONE_DURATION`.
    fn play_note(&mut self, frequency: f32);

    /// Monotonic clock in seconds.
    fn current_time(&self) -> f64;

    fn shutdown(&mut self) {}
}

#[derive(Debug, Clone, Copy)]
struct Voice {
    phase: f32,
    phase_increment: f32,
    remaining: u64,
}

impl Voice {
    fn new(frequency: f32, sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            phase_increment: frequency / sample_rate,
            remaining: (TONE_DURATION.as_secs_f32() * sample_rate) as u64,
        }
    }

    fn next_sample(&mut self) -> f32 {
        let sample = (self.phase * 2.0 * std::f32::consts::PI).sin();
        self.phase += self.phase_increment;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        self.remaining = self.remaining.saturating_sub(1);
        sample
    }
}

/// Mix one frame per chunk of `channels` samples, advancing every voice and
/// dropping the finished ones.
fn render(data: &mut [f32], channels: usize, voices: &mut Vec<Voice>, amplitude: f32) -> u64 {
    let mut frames = 0;
    for frame in data.chunks_mut(channels.max(1)) {
        let mut value = 0.0;
        for voice in voices.iter_mut().filter(|voice| voice.remaining > 0) {
            value += voice.next_sample() * amplitude;
        }
        for sample in frame.iter_mut() {
            *sample = value.clamp(-1.0, 1.0);
        }
        frames += 1;
    }
    voices.retain(|voice| voice.remaining > 0);
    frames
}

/// Audio output using cpal
pub struct AudioOutput {
    stream: cpal::Stream,
    voices: Arc<Mutex<Vec<Voice>>>,
    frames: Arc<AtomicU64>,
    sample_rate: f32,
}

impl AudioOutput {
    pub fn new(amplitude: f32) -> Result<Self, AudioError> {
        let voices = Arc::new(Mutex::new(Vec::new()));
        let frames = Arc::new(AtomicU64::new(0));

        let (stream, sample_rate) =
            Self::setup_audio_stream(Arc::clone(&voices), Arc::clone(&frames), amplitude)?;

        Ok(Self {
            stream,
            voices,
            frames,
            sample_rate,
        })
    }

    fn setup_audio_stream(
        voices: Arc<Mutex<Vec<Voice>>>,
        frames: Arc<AtomicU64>,
        amplitude: f32,
    ) -> Result<(cpal::Stream, f32), AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::NoOutputDevice)?;
        let config = device.default_output_config()?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config.config(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let rendered = match voices.lock() {
                        Ok(mut voices) => render(data, channels, &mut voices, amplitude),
                        Err(_) => {
                            data.fill(0.0);
                            (data.len() / channels.max(1)) as u64
                        }
                    };
                    frames.fetch_add(rendered, Ordering::Relaxed);
                },
                |err| error!("audio stream error: {}", err),
                None,
            )?,
            other => return Err(AudioError::UnsupportedSampleFormat(other)),
        };

        stream.play()?;
        info!(
            "audio output on {:?}: {} Hz, {} channels",
            device.name().ok(),
            sample_rate,
            channels
        );
        Ok((stream, sample_rate))
    }
}

impl ToneEngine for AudioOutput {
    fn play_note(&mut self, frequency: f32) {
        if let Ok(mut voices) = self.voices.lock() {
            voices.push(Voice::new(frequency, self.sample_rate));
        }
    }

    fn current_time(&self) -> f64 {
        self.frames.load(Ordering::Relaxed) as f64 / self.sample_rate as f64
    }

    fn shutdown(&mut self) {
        if let Ok(mut voices) = self.voices.lock() {
            voices.clear();
        }
        if let Err(err) = self.stream.pause() {
            debug!("could not pause audio stream: {}", err);
        }
    }
}

/// Stand-in when no audio output could be opened. Keeps a wall clock so
/// recording still works.
pub struct SilentOutput {
    started: Instant,
}

impl SilentOutput {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SilentOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl ToneEngine for SilentOutput {
    fn play_note(&mut self, frequency: f32) {
        debug!("silent tone at {} Hz", frequency);
    }

    fn current_time(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_length_matches_tone_duration() {
        let voice = Voice::new(440.0, 48_000.0);
        assert_eq!(voice.remaining, 4_800);
    }

    #[test]
    fn test_render_expires_voices() {
        let mut voices = vec![Voice::new(440.0, 1_000.0)];
        let mut data = vec![0.0; 2 * 150];

        let frames = render(&mut data, 2, &mut voices, 0.2);
        assert_eq!(frames, 150);
        assert!(voices.is_empty());
        // Tone covers the first 100 frames, silence afterwards.
        assert!(data[..200].iter().any(|sample| *sample != 0.0));
        assert!(data[200..].iter().all(|sample| *sample == 0.0));
    }

    #[test]
    fn test_render_duplicates_frame_across_channels() {
        let mut voices = vec![Voice::new(250.0, 1_000.0)];
        let mut data = vec![0.0; 2 * 4];
        render(&mut data, 2, &mut voices, 0.5);
        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert!((data[2] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_silent_output_clock_advances() {
        let mut output = SilentOutput::new();
        let before = output.current_time();
        output.play_note(261.63);
        std::thread::sleep(Duration::from_millis(5));
        assert!(output.current_time() > before);
    }
}
