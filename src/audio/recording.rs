//! Backend that records every call instead of making sound.
//!
//! Clones share the same log, so a host can keep one clone and hand the
//! other to the engine. Loads and plays can be made to fail per locator.

use super::{AudioBackend, AudioLocator};
use crate::{KeyquenceError, Result};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// One recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// `load` was called (successful or not)
    Load(AudioLocator),
    /// `play` succeeded
    Play(AudioLocator),
    /// `play` was rejected
    PlayRejected(AudioLocator),
    /// `pause`
    Pause(AudioLocator),
    /// `rewind`
    Rewind(AudioLocator),
    /// `unload`
    Unload(AudioLocator),
}

#[derive(Debug, Default)]
struct Shared {
    log: Vec<AudioEvent>,
    failing_loads: HashSet<AudioLocator>,
    failing_plays: HashSet<AudioLocator>,
}

/// Clip handed out by [`RecordingBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedClip {
    /// Locator the clip was loaded from
    pub locator: AudioLocator,
    /// Whether the clip is playing
    pub playing: bool,
}

/// Recording backend
#[derive(Debug, Clone, Default)]
pub struct RecordingBackend {
    shared: Arc<Mutex<Shared>>,
}

impl RecordingBackend {
    /// Create a backend with an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `load` of `locator` fail
    pub fn fail_load(self, locator: impl Into<AudioLocator>) -> Self {
        self.shared.lock().failing_loads.insert(locator.into());
        self
    }

    /// Make every `play` of `locator` fail
    pub fn fail_play(self, locator: impl Into<AudioLocator>) -> Self {
        self.shared.lock().failing_plays.insert(locator.into());
        self
    }

    /// Copy of the call log
    pub fn events(&self) -> Vec<AudioEvent> {
        self.shared.lock().log.clone()
    }

    /// Forget recorded calls (failure settings are kept)
    pub fn clear_events(&self) {
        self.shared.lock().log.clear();
    }

    /// Number of `load` calls for `locator`
    pub fn load_count(&self, locator: &str) -> usize {
        self.shared
            .lock()
            .log
            .iter()
            .filter(|event| matches!(event, AudioEvent::Load(l) if l.as_str() == locator))
            .count()
    }

    fn record(&self, event: AudioEvent) {
        self.shared.lock().log.push(event);
    }
}

impl AudioBackend for RecordingBackend {
    type Clip = RecordedClip;

    fn load(&mut self, locator: &AudioLocator) -> Result<RecordedClip> {
        self.record(AudioEvent::Load(locator.clone()));
        if self.shared.lock().failing_loads.contains(locator) {
            return Err(KeyquenceError::audio_load(locator.as_str(), "file not found"));
        }
        Ok(RecordedClip {
            locator: locator.clone(),
            playing: false,
        })
    }

    fn play(&mut self, clip: &mut RecordedClip) -> Result<()> {
        if self.shared.lock().failing_plays.contains(&clip.locator) {
            self.record(AudioEvent::PlayRejected(clip.locator.clone()));
            return Err(KeyquenceError::audio_playback(
                clip.locator.as_str(),
                "playback rejected by device",
            ));
        }
        clip.playing = true;
        self.record(AudioEvent::Play(clip.locator.clone()));
        Ok(())
    }

    fn pause(&mut self, clip: &mut RecordedClip) {
        clip.playing = false;
        self.record(AudioEvent::Pause(clip.locator.clone()));
    }

    fn rewind(&mut self, clip: &mut RecordedClip) {
        self.record(AudioEvent::Rewind(clip.locator.clone()));
    }

    fn unload(&mut self, clip: RecordedClip) {
        self.record(AudioEvent::Unload(clip.locator));
    }
}
