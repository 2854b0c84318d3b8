//! Exclusive audio slot
//!
//! Holds every clip loaded for an engine run plus a single "currently
//! playing" slot. Starting a clip first silences and rewinds whatever holds
//! the slot. Backend failures are reported to the diagnostic sink and leave
//! the slot empty; they are never returned to the caller.

use super::{AudioBackend, AudioLocator};
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Index of a clip loaded by an [`AudioArbiter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClipId(usize);

impl ClipId {
    /// Position in load order
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ClipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "clip#{}", self.0)
    }
}

/// Occupancy of the audio slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    /// Nothing is playing
    #[default]
    Empty,
    /// The clip is playing
    Playing(ClipId),
}

struct LoadedClip<C> {
    locator: AudioLocator,
    clip: C,
}

/// Single-slot audio arbiter
pub struct AudioArbiter<B: AudioBackend> {
    backend: B,
    clips: Vec<LoadedClip<B::Clip>>,
    /// Every locator ever requested; `None` when its load failed
    index: HashMap<AudioLocator, Option<ClipId>>,
    slot: SlotState,
    sink: Arc<dyn DiagnosticSink>,
}

impl<B: AudioBackend> AudioArbiter<B> {
    /// Create an arbiter with nothing loaded
    pub fn new(backend: B, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            backend,
            clips: Vec::new(),
            index: HashMap::new(),
            slot: SlotState::Empty,
            sink,
        }
    }

    /// Load `locator` unless it was requested before.
    ///
    /// Each distinct locator reaches the backend once. A failed load is
    /// reported and remembered, so later requests for it return `None`
    /// without retrying.
    pub fn preload(&mut self, locator: &AudioLocator) -> Option<ClipId> {
        if let Some(known) = self.index.get(locator) {
            return *known;
        }

        let loaded = match self.backend.load(locator) {
            Ok(clip) => {
                let id = ClipId(self.clips.len());
                self.clips.push(LoadedClip {
                    locator: locator.clone(),
                    clip,
                });
                tracing::debug!(%locator, %id, "audio cue loaded");
                Some(id)
            }
            Err(err) => {
                self.sink.report(&Diagnostic::AudioLoadFailure {
                    locator: locator.clone(),
                    reason: err.to_string(),
                });
                None
            }
        };
        self.index.insert(locator.clone(), loaded);
        loaded
    }

    /// Play `clip` exclusively. `None` is a no-op.
    ///
    /// A different clip in the slot is paused and rewound first; the same
    /// clip is rewound and restarted.
    pub fn play(&mut self, clip: Option<ClipId>) {
        let Some(id) = clip else {
            return;
        };
        if id.0 >= self.clips.len() {
            return;
        }

        if let SlotState::Playing(current) = self.slot {
            if current != id {
                self.silence(current);
            }
        }

        let entry = &mut self.clips[id.0];
        self.backend.rewind(&mut entry.clip);
        match self.backend.play(&mut entry.clip) {
            Ok(()) => self.slot = SlotState::Playing(id),
            Err(err) => {
                self.slot = SlotState::Empty;
                self.sink.report(&Diagnostic::AudioPlaybackFailure {
                    locator: entry.locator.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Pause and rewind the slot's clip and empty the slot.
    ///
    /// Returns true if something was playing.
    pub fn cancel(&mut self) -> bool {
        match std::mem::take(&mut self.slot) {
            SlotState::Playing(current) => {
                self.silence(current);
                true
            }
            SlotState::Empty => false,
        }
    }

    /// Pause every loaded clip, empty the slot and unload everything
    pub fn release_all(&mut self) {
        self.slot = SlotState::Empty;
        for entry in &mut self.clips {
            self.backend.pause(&mut entry.clip);
        }
        for entry in self.clips.drain(..) {
            self.backend.unload(entry.clip);
        }
        self.index.clear();
    }

    /// Current slot occupancy
    pub fn slot(&self) -> SlotState {
        self.slot
    }

    /// Number of clips currently loaded
    pub fn loaded_count(&self) -> usize {
        self.clips.len()
    }

    /// Locator of a loaded clip
    pub fn locator(&self, id: ClipId) -> Option<&AudioLocator> {
        self.clips.get(id.0).map(|entry| &entry.locator)
    }

    /// The backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn silence(&mut self, id: ClipId) {
        if let Some(entry) = self.clips.get_mut(id.0) {
            self.backend.pause(&mut entry.clip);
            self.backend.rewind(&mut entry.clip);
        }
    }
}

impl<B: AudioBackend> fmt::Debug for AudioArbiter<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioArbiter")
            .field("loaded", &self.clips.len())
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioEvent, RecordingBackend};
    use crate::diagnostics::CollectingSink;

    fn loc(s: &str) -> AudioLocator {
        AudioLocator::from(s)
    }

    fn arbiter(backend: RecordingBackend) -> (AudioArbiter<RecordingBackend>, CollectingSink) {
        let sink = CollectingSink::new();
        (AudioArbiter::new(backend, Arc::new(sink.clone())), sink)
    }

    #[test]
    fn test_preload_once_per_locator() {
        let backend = RecordingBackend::new();
        let (mut arb, _) = arbiter(backend.clone());
        let a = arb.preload(&loc("a.ogg"));
        let again = arb.preload(&loc("a.ogg"));
        let b = arb.preload(&loc("b.ogg"));
        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(backend.load_count("a.ogg"), 1);
        assert_eq!(arb.loaded_count(), 2);
    }

    #[test]
    fn test_failed_load_is_reported_and_not_retried() {
        let backend = RecordingBackend::new().fail_load("missing.ogg");
        let (mut arb, sink) = arbiter(backend.clone());
        assert_eq!(arb.preload(&loc("missing.ogg")), None);
        assert_eq!(arb.preload(&loc("missing.ogg")), None);
        assert_eq!(backend.load_count("missing.ogg"), 1);
        assert!(matches!(
            sink.reports().as_slice(),
            [Diagnostic::AudioLoadFailure { .. }]
        ));
    }

    #[test]
    fn test_play_preempts_previous_clip() {
        let backend = RecordingBackend::new();
        let (mut arb, _) = arbiter(backend.clone());
        let a = arb.preload(&loc("a.ogg"));
        let b = arb.preload(&loc("b.ogg"));
        arb.play(a);
        backend.clear_events();
        arb.play(b);

        assert_eq!(arb.slot(), SlotState::Playing(b.unwrap()));
        assert_eq!(
            backend.events(),
            vec![
                AudioEvent::Pause(loc("a.ogg")),
                AudioEvent::Rewind(loc("a.ogg")),
                AudioEvent::Rewind(loc("b.ogg")),
                AudioEvent::Play(loc("b.ogg")),
            ]
        );
    }

    #[test]
    fn test_play_same_clip_restarts() {
        let backend = RecordingBackend::new();
        let (mut arb, _) = arbiter(backend.clone());
        let a = arb.preload(&loc("a.ogg"));
        arb.play(a);
        backend.clear_events();
        arb.play(a);
        assert_eq!(arb.slot(), SlotState::Playing(a.unwrap()));
        assert_eq!(
            backend.events(),
            vec![AudioEvent::Rewind(loc("a.ogg")), AudioEvent::Play(loc("a.ogg"))]
        );
    }

    #[test]
    fn test_play_none_is_noop() {
        let backend = RecordingBackend::new();
        let (mut arb, _) = arbiter(backend.clone());
        let a = arb.preload(&loc("a.ogg"));
        arb.play(a);
        backend.clear_events();
        arb.play(None);
        assert_eq!(arb.slot(), SlotState::Playing(a.unwrap()));
        assert!(backend.events().is_empty());
    }

    #[test]
    fn test_playback_failure_empties_slot() {
        let backend = RecordingBackend::new().fail_play("bad.ogg");
        let (mut arb, sink) = arbiter(backend);
        let good = arb.preload(&loc("good.ogg"));
        let bad = arb.preload(&loc("bad.ogg"));
        arb.play(good);
        arb.play(bad);
        assert_eq!(arb.slot(), SlotState::Empty);
        assert!(matches!(
            sink.reports().as_slice(),
            [Diagnostic::AudioPlaybackFailure { locator, .. }] if locator.as_str() == "bad.ogg"
        ));
    }

    #[test]
    fn test_cancel() {
        let backend = RecordingBackend::new();
        let (mut arb, _) = arbiter(backend.clone());
        let a = arb.preload(&loc("a.ogg"));
        assert!(!arb.cancel());
        arb.play(a);
        backend.clear_events();
        assert!(arb.cancel());
        assert_eq!(arb.slot(), SlotState::Empty);
        assert_eq!(
            backend.events(),
            vec![AudioEvent::Pause(loc("a.ogg")), AudioEvent::Rewind(loc("a.ogg"))]
        );
        assert!(!arb.cancel());
    }

    #[test]
    fn test_release_all_pauses_and_unloads_everything() {
        let backend = RecordingBackend::new();
        let (mut arb, _) = arbiter(backend.clone());
        let a = arb.preload(&loc("a.ogg"));
        arb.preload(&loc("b.ogg"));
        arb.play(a);
        backend.clear_events();
        arb.release_all();

        assert_eq!(arb.slot(), SlotState::Empty);
        assert_eq!(arb.loaded_count(), 0);
        let events = backend.events();
        assert!(events.contains(&AudioEvent::Pause(loc("a.ogg"))));
        assert!(events.contains(&AudioEvent::Pause(loc("b.ogg"))));
        assert!(events.contains(&AudioEvent::Unload(loc("a.ogg"))));
        assert!(events.contains(&AudioEvent::Unload(loc("b.ogg"))));
    }
}
