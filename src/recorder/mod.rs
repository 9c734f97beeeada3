//! Notes, recordings and the armed/idle recorder state machine
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod playback;

/// One of the four pad notes. Serialized by its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Note {
    C,
    D,
    E,
    F,
}

impl Note {
    /// Pad order, left to right.
    pub const ALL: [Note; 4] = [Note::C, Note::D, Note::E, Note::F];

    pub fn frequency(self) -> f32 {
        match self {
            Note::C => 261.63,
            Note::D => 293.66,
            Note::E => 329.63,
            Note::F => 349.23,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Note::C => "C",
            Note::D => "D",
            Note::E => "E",
            Note::F => "F",
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A note press, `time` seconds after the recorder was armed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoteEvent {
    pub note: Note,
    pub time: f64,
}

impl NoteEvent {
    pub fn new(note: Note, time: f64) -> Self {
        Self { note, time }
    }
}

/// Ordered note events. Append order is playback order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recording {
    events: Vec<NoteEvent>,
}

impl Recording {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[NoteEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NoteEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Length of the recording in seconds, i.e. the time of its latest event.
    pub fn duration(&self) -> f64 {
        self.events
            .iter()
            .map(|event| event.time)
            .fold(0.0, f64::max)
    }

    fn push(&mut self, event: NoteEvent) {
        self.events.push(event);
    }

    fn clear(&mut self) {
        self.events.clear();
    }
}

impl From<Vec<NoteEvent>> for Recording {
    fn from(events: Vec<NoteEvent>) -> Self {
        Self { events }
    }
}

impl<'a> IntoIterator for &'a Recording {
    type Item = &'a NoteEvent;
    type IntoIter = std::slice::Iter<'a, NoteEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecorderState {
    Idle,
    /// Capturing presses; `started_at` is the audio clock at arming.
    Armed { started_at: f64 },
}

pub struct Recorder {
    state: RecorderState,
    recording: Recording,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            recording: Recording::new(),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, RecorderState::Armed { .. })
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    /// Arm the recorder. Any previous recording is discarded and `now`
    /// becomes the new zero point, even if already armed.
    pub fn start(&mut self, now: f64) {
        self.recording.clear();
        self.state = RecorderState::Armed { started_at: now };
    }

    pub fn stop(&mut self) {
        self.state = RecorderState::Idle;
    }

    /// Flip between idle and armed. Returns whether the recorder is now armed.
    pub fn toggle(&mut self, now: f64) -> bool {
        if self.is_armed() {
            self.stop();
        } else {
            self.start(now);
        }
        self.is_armed()
    }

    /// Append `note` if armed. Times are relative to the zero point and are
    /// stored as observed.
    pub fn capture(&mut self, note: Note, now: f64) -> Option<&NoteEvent> {
        let RecorderState::Armed { started_at } = self.state else {
            return None;
        };
        self.recording.push(NoteEvent::new(note, now - started_at));
        self.recording.events.last()
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}
