//! The note pad: ties the tone engine, recorder, playback and sample store
//! together behind the actions the UI exposes.
use crate::audio::{AudioError, ToneEngine};
use crate::recorder::playback::{PlaybackEngine, PlaybackEvent, ScheduledTone};
use crate::recorder::{Note, Recorder, Recording};
use crate::samples::{SampleStore, StoreError};
use log::debug;

pub struct Pad {
    engine: Box<dyn ToneEngine>,
    recorder: Recorder,
    playback: PlaybackEngine,
    store: SampleStore,
    audio_error: Option<AudioError>,
    shut_down: bool,
}

impl Pad {
    pub fn new(engine: Box<dyn ToneEngine>, store: SampleStore) -> Self {
        Self {
            engine,
            recorder: Recorder::new(),
            playback: PlaybackEngine::new(),
            store,
            audio_error: None,
            shut_down: false,
        }
    }

    /// Pad running on a fallback engine because audio could not be opened.
    pub fn with_audio_error(
        engine: Box<dyn ToneEngine>,
        store: SampleStore,
        error: AudioError,
    ) -> Self {
        let mut pad = Self::new(engine, store);
        pad.audio_error = Some(error);
        pad
    }

    pub fn audio_error(&self) -> Option<&AudioError> {
        self.audio_error.as_ref()
    }

    pub fn recording(&self) -> &Recording {
        self.recorder.recording()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_armed()
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn store(&self) -> &SampleStore {
        &self.store
    }

    pub fn press(&mut self, note: Note) {
        self.engine.play_note(note.frequency());
        let now = self.engine.current_time();
        if let Some(event) = self.recorder.capture(note, now) {
            debug!("recorded {} at {:.3}s", event.note, event.time);
        }
    }

    /// Start or stop recording. Starting cancels any playback still pending.
    pub fn toggle_recording(&mut self) -> bool {
        if !self.recorder.is_armed() {
            self.playback.cancel();
        }
        let now = self.engine.current_time();
        self.recorder.toggle(now)
    }

    pub fn play_recording(&mut self) -> Vec<ScheduledTone> {
        self.playback.play_recording(self.recorder.recording())
    }

    pub fn play_sample(&mut self, name: &str) -> Option<Vec<ScheduledTone>> {
        let recording = self.store.get(name)?;
        Some(self.playback.play_recording(recording))
    }

    pub fn stop_playback(&mut self) {
        self.playback.cancel();
    }

    /// Save the current recording as `name`. Empty recordings and blank names
    /// are not saved.
    pub fn save_sample(&mut self, name: &str) -> Result<bool, StoreError> {
        if self.recorder.recording().is_empty() {
            return Ok(false);
        }
        self.store.save(name, self.recorder.recording())
    }

    pub fn delete_sample(&mut self, name: &str) -> Result<(), StoreError> {
        self.store.delete(name)
    }

    /// Sound every tone that came due since the last poll.
    pub fn poll(&mut self) -> usize {
        let mut played = 0;
        for event in self.playback.poll_events() {
            match event {
                PlaybackEvent::Tone(note) => {
                    self.engine.play_note(note.frequency());
                    played += 1;
                }
                PlaybackEvent::Finished => debug!("playback finished"),
            }
        }
        played
    }

    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.playback.cancel();
        self.engine.shutdown();
    }
}

impl Drop for Pad {
    fn drop(&mut self) {
        self.shutdown();
    }
}
