//! Match engine
//!
//! Owns the rolling input buffer, the idle timer and the audio arbiter for
//! one run. Every key press is handled synchronously:
//!
//! 1. the interrupt key (if enabled) cancels the playing cue and stops there;
//! 2. named keys are ignored;
//! 3. a pending idle deadline that has already passed clears the buffer;
//! 4. the lower-cased character is appended and the idle timer restarted;
//! 5. every definition is tested against that buffer, in registration order;
//! 6. each match fires its callback and asks the arbiter to play its cue;
//! 7. if anything matched, the buffer is cleared once.
//!
//! Step 5 works on one snapshot, so several patterns can fire on the same key.

pub mod idle;
mod options;

pub use idle::IdleTimer;
pub use options::{EngineOptions, DEFAULT_IDLE_TIMEOUT_MS};

use crate::audio::{AudioArbiter, AudioBackend, ClipId, SlotState};
use crate::diagnostics::{Diagnostic, DiagnosticSink, TracingSink};
use crate::key::Key;
use crate::registry::{SequenceDefinition, SequenceRegistry};
use std::sync::Arc;
use std::time::Instant;

/// What a key press did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Appended to the buffer, nothing matched
    Buffered,
    /// These definitions (registration indices) fired; the buffer is now empty
    Detected(Vec<usize>),
    /// Interrupt key: the audio slot was cancelled, buffer untouched
    Interrupted,
    /// Named key that is not the interrupt key
    Ignored,
    /// The engine has been stopped
    Stopped,
}

/// Sequence matching engine for one run
pub struct MatchEngine<B: AudioBackend> {
    registry: SequenceRegistry,
    /// Preloaded clip per definition
    clips: Vec<Option<ClipId>>,
    buffer: String,
    idle: IdleTimer,
    arbiter: AudioArbiter<B>,
    interrupt_key: Option<String>,
    running: bool,
}

impl<B: AudioBackend> MatchEngine<B> {
    /// Start a run, reporting diagnostics through `tracing`
    pub fn start(definitions: Vec<SequenceDefinition>, options: EngineOptions, backend: B) -> Self {
        Self::start_with_sink(definitions, options, backend, Arc::new(TracingSink))
    }

    /// Start a run with an explicit diagnostic sink.
    ///
    /// Every distinct audio locator is loaded once. Load failures are
    /// reported and only silence the affected definitions.
    pub fn start_with_sink(
        definitions: Vec<SequenceDefinition>,
        options: EngineOptions,
        backend: B,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let registry = SequenceRegistry::new(definitions);
        for warning in options.warnings().into_iter().chain(registry.warnings()) {
            sink.report(&Diagnostic::ConfigurationWarning(warning));
        }

        let mut arbiter = AudioArbiter::new(backend, sink);
        let clips = registry
            .iter()
            .map(|def| def.audio().and_then(|locator| arbiter.preload(locator)))
            .collect();

        tracing::info!(
            sequences = registry.len(),
            clips = arbiter.loaded_count(),
            idle_timeout_ms = options.idle_timeout().as_millis() as u64,
            "sequence engine started"
        );

        Self {
            registry,
            clips,
            buffer: String::new(),
            idle: IdleTimer::new(options.idle_timeout()),
            arbiter,
            interrupt_key: options.effective_interrupt_key().map(str::to_string),
            running: true,
        }
    }

    /// Handle one key press at time `now`
    pub fn on_key_event(&mut self, key: &Key, now: Instant) -> KeyOutcome {
        if !self.running {
            return KeyOutcome::Stopped;
        }

        if let Some(interrupt) = &self.interrupt_key {
            if key.matches_name(interrupt) {
                if self.arbiter.cancel() {
                    tracing::debug!("audio cue interrupted");
                }
                return KeyOutcome::Interrupted;
            }
        }

        let Key::Char(c) = key else {
            return KeyOutcome::Ignored;
        };

        self.poll_idle(now);
        self.buffer.extend(c.to_lowercase());
        self.idle.arm(now);

        let matched = self.registry.matching(&self.buffer);
        if matched.is_empty() {
            return KeyOutcome::Buffered;
        }

        for &index in &matched {
            tracing::debug!(
                index,
                pattern = self.registry.get(index).map(SequenceDefinition::pattern),
                "sequence detected"
            );
            self.registry.fire(index);
            self.arbiter.play(self.clips[index]);
        }
        self.buffer.clear();

        KeyOutcome::Detected(matched)
    }

    /// Handle one key press now
    pub fn handle_key(&mut self, key: &Key) -> KeyOutcome {
        self.on_key_event(key, Instant::now())
    }

    /// Fire the idle timer if its deadline has passed.
    ///
    /// Returns true when the buffer was cleared. The timer stays disarmed
    /// until the next key press.
    pub fn poll_idle(&mut self, now: Instant) -> bool {
        if !self.running || !self.idle.expired(now) {
            return false;
        }
        self.idle.cancel();
        self.buffer.clear();
        true
    }

    /// End the run: cancel the timer, clear the buffer, pause and unload all
    /// audio. Calling it again does nothing.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.idle.cancel();
        self.buffer.clear();
        self.arbiter.release_all();
        self.clips.iter_mut().for_each(|clip| *clip = None);
        tracing::info!("sequence engine stopped");
    }

    /// Keys typed since the last reset, lower-cased
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Audio slot occupancy
    pub fn slot(&self) -> SlotState {
        self.arbiter.slot()
    }

    /// Pending idle deadline
    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle.deadline()
    }

    /// Returns true until [`stop`](Self::stop)
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Registered definitions
    pub fn registry(&self) -> &SequenceRegistry {
        &self.registry
    }

    /// Clip preloaded for the definition at `index`
    pub fn clip_for(&self, index: usize) -> Option<ClipId> {
        self.clips.get(index).copied().flatten()
    }

    /// Audio arbiter
    pub fn arbiter(&self) -> &AudioArbiter<B> {
        &self.arbiter
    }
}

impl<B: AudioBackend> Drop for MatchEngine<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
