//! Playback engine - schedules recorded notes and reports them when due
use super::{Note, Recording};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// A tone to fire `delay` after playback starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledTone {
    pub note: Note,
    pub delay: Duration,
}

impl ScheduledTone {
    pub fn frequency(&self) -> f32 {
        self.note.frequency()
    }

    pub fn delay_ms(&self) -> u128 {
        self.delay.as_millis()
    }
}

/// One scheduled tone per event, in recording order. Negative or non-finite
/// times fire immediately.
pub fn schedule_for(recording: &Recording) -> Vec<ScheduledTone> {
    recording
        .iter()
        .map(|event| ScheduledTone {
            note: event.note,
            delay: Duration::try_from_secs_f64(event.time).unwrap_or_default(),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    Tone(Note),
    Finished,
}

struct Fired {
    generation: u64,
    event: PlaybackEvent,
}

pub struct PlaybackEngine {
    sender: Sender<Fired>,
    receiver: Receiver<Fired>,
    generation: Arc<AtomicU64>,
    active: Arc<AtomicU64>,
}

impl PlaybackEngine {
    pub fn new() -> Self {
        let (sender, receiver) = channel();

        Self {
            sender,
            receiver,
            generation: Arc::new(AtomicU64::new(0)),
            active: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a worker for `tones`. Runs alongside earlier schedules until
    /// `cancel` is called.
    pub fn play(&mut self, tones: Vec<ScheduledTone>) {
        if tones.is_empty() {
            return;
        }

        let mut tones = tones;
        tones.sort_by_key(|tone| tone.delay);

        let generation = self.generation.load(Ordering::SeqCst);
        let current = Arc::clone(&self.generation);
        let active = Arc::clone(&self.active);
        let sender = self.sender.clone();

        active.fetch_add(1, Ordering::SeqCst);
        debug!("scheduling {} tones", tones.len());

        thread::spawn(move || {
            let started = Instant::now();
            let cancelled = || current.load(Ordering::SeqCst) != generation;

            'tones: for tone in tones {
                loop {
                    if cancelled() {
                        break 'tones;
                    }
                    let elapsed = started.elapsed();
                    if elapsed >= tone.delay {
                        break;
                    }
                    thread::sleep((tone.delay - elapsed).min(Duration::from_millis(1)));
                }

                let _ = sender.send(Fired {
                    generation,
                    event: PlaybackEvent::Tone(tone.note),
                });
            }

            if !cancelled() {
                let _ = sender.send(Fired {
                    generation,
                    event: PlaybackEvent::Finished,
                });
            }
            active.fetch_sub(1, Ordering::SeqCst);
        });
    }

    pub fn play_recording(&mut self, recording: &Recording) -> Vec<ScheduledTone> {
        let tones = schedule_for(recording);
        self.play(tones.clone());
        tones
    }

    /// Drop every pending tone from every schedule started so far.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Whether any worker is still running (cancelled ones included until
    /// they notice).
    pub fn is_playing(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    /// Drain due events. Events from cancelled schedules are discarded.
    pub fn poll_events(&self) -> Vec<PlaybackEvent> {
        let generation = self.generation.load(Ordering::SeqCst);
        let mut events = Vec::new();
        while let Ok(fired) = self.receiver.try_recv() {
            if fired.generation == generation {
                events.push(fired.event);
            }
        }
        events
    }
}

impl Default for PlaybackEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.cancel();
    }
}
