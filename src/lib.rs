//! TONEPAD - a four-note toy instrument library
//!
//! This library provides the core components behind the note pad:
//! - Tone engine with a monotonic audio clock
//! - Recorder that timestamps note presses
//! - Cancellable playback of recorded sequences
//! - Named samples persisted to a single local storage slot

pub mod audio;
pub mod config;
pub mod pad;
pub mod recorder;
pub mod samples;

// Re-export commonly used types
pub use audio::{AudioError, AudioOutput, SilentOutput, ToneEngine, TONE_DURATION};
pub use config::Config;
pub use pad::Pad;
pub use recorder::playback::{schedule_for, PlaybackEngine, PlaybackEvent, ScheduledTone};
pub use recorder::{Note, NoteEvent, Recorder, RecorderState, Recording};
pub use samples::storage::{FileStorage, MemoryStorage, Storage};
pub use samples::{SampleMap, SampleStore, StoreError, STORAGE_KEY};
