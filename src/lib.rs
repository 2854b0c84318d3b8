//! Keystroke sequence detector
//!
//! Watches a stream of key presses, matches the typed keys against a set of
//! registered sequences and fires a callback (plus an optional audio cue)
//! whenever one of them shows up. Typical uses are easter eggs and typed
//! shortcuts ("iddqd", "up up down down").
//!
//! # Features
//! - Case-insensitive, contiguous substring matching against every registered sequence
//! - Rolling input buffer with an idle reset
//! - Single-slot exclusive audio playback with an optional interrupt key
//! - Non-fatal diagnostic channel for audio and configuration problems
//! - Threaded listener that owns the engine and its idle timer
//!
//! # Crate feature flags
//! - `playback` (opt-in): Real audio output (enables optional `rodio` dep)
//! - `cli` (opt-in): Terminal front end (`keyquence` binary)
//!
//! # Quick start
//! ## Driving the engine directly
//! ```no_run
//! use keyquence::{EngineOptions, Key, MatchEngine, SequenceDefinition, SilentBackend};
//! use std::time::Instant;
//!
//! let definitions = vec![SequenceDefinition::new("iddqd", || println!("god mode"))];
//! let mut engine = MatchEngine::start(definitions, EngineOptions::default(), SilentBackend::new());
//! for c in "iddqd".chars() {
//!     engine.on_key_event(&Key::Char(c), Instant::now());
//! }
//! engine.stop();
//! ```
//!
//! ## Background listener
//! ```no_run
//! use keyquence::{EngineOptions, Key, KeySequenceListener, SequenceDefinition, SilentBackend};
//!
//! let definitions = vec![SequenceDefinition::new("up up down down", || println!("konami"))];
//! let mut listener = KeySequenceListener::start(
//!     definitions,
//!     EngineOptions::default(),
//!     SilentBackend::new,
//! )
//! .unwrap();
//! listener.send(Key::from_name("u"));
//! listener.stop();
//! ```

#![warn(missing_docs)]

pub mod audio; // Audio arbitration and backends
pub mod config; // Sequence files
pub mod diagnostics; // Non-fatal error channel
pub mod engine; // Buffer, idle timer and matching
pub mod key; // Key identifiers
pub mod listener; // Host lifecycle driver
pub mod registry; // Sequence definitions

/// Error types for sequence detection and audio setup
#[derive(thiserror::Error, Debug)]
pub enum KeyquenceError {
    /// An audio resource could not be loaded
    #[error("Failed to load audio '{locator}': {reason}")]
    AudioLoad {
        /// Locator that was requested
        locator: String,
        /// Backend-provided reason
        reason: String,
    },

    /// The audio device rejected a play request
    #[error("Failed to play audio '{locator}': {reason}")]
    AudioPlayback {
        /// Locator of the clip that failed
        locator: String,
        /// Backend-provided reason
        reason: String,
    },

    /// Audio device could not be opened
    #[error("Audio device error: {0}")]
    AudioDevice(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// IO error from filesystem
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed sequence file
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl KeyquenceError {
    /// Creates an audio load error
    pub fn audio_load(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        KeyquenceError::AudioLoad {
            locator: locator.into(),
            reason: reason.into(),
        }
    }

    /// Creates an audio playback error
    pub fn audio_playback(locator: impl Into<String>, reason: impl Into<String>) -> Self {
        KeyquenceError::AudioPlayback {
            locator: locator.into(),
            reason: reason.into(),
        }
    }
}

impl From<String> for KeyquenceError {
    /// Converts a String into `KeyquenceError::Other`.
    ///
    /// Prefer the specific constructors (`audio_load`, `audio_playback`,
    /// `Config`) where the failure has a known category.
    fn from(msg: String) -> Self {
        KeyquenceError::Other(msg)
    }
}

impl From<&str> for KeyquenceError {
    fn from(msg: &str) -> Self {
        KeyquenceError::Other(msg.to_string())
    }
}

/// Result type for setup operations
pub type Result<T> = std::result::Result<T, KeyquenceError>;

// Public API exports
pub use audio::{
    AudioArbiter, AudioBackend, AudioEvent, AudioLocator, ClipId, RecordingBackend, SilentBackend,
    SlotState,
};
#[cfg(feature = "playback")]
pub use audio::rodio_backend::RodioBackend;
pub use config::{SequenceEntry, SequenceFile};
pub use diagnostics::{CollectingSink, ConfigWarning, Diagnostic, DiagnosticSink, TracingSink};
pub use engine::{EngineOptions, IdleTimer, KeyOutcome, MatchEngine, DEFAULT_IDLE_TIMEOUT_MS};
pub use key::{Key, DEFAULT_INTERRUPT_KEY};
pub use listener::KeySequenceListener;
pub use registry::{SequenceDefinition, SequenceRegistry};
