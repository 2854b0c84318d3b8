//! Diagnostic channel
//!
//! Nothing that goes wrong while matching keys or playing cues is returned to
//! the host. Audio load and playback failures and configuration problems are
//! reported here instead, and the engine carries on with a degraded
//! behaviour (no sound, or an earlier reset).

use crate::audio::AudioLocator;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Configuration problem that was clamped to a safe value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Definition at `index` has an empty pattern and will never match
    EmptyPattern {
        /// Registration index
        index: usize,
    },
    /// Idle timeout was zero or negative; negative values are clamped to zero
    NonPositiveIdleTimeout {
        /// Value that was configured
        requested_ms: i64,
    },
    /// Interrupt key was blank; the default is used instead
    EmptyInterruptKey,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::EmptyPattern { index } => {
                write!(f, "sequence #{index} has an empty pattern and is ignored")
            }
            ConfigWarning::NonPositiveIdleTimeout { requested_ms } => {
                write!(f, "idle timeout {requested_ms}ms is not positive, using 0ms")
            }
            ConfigWarning::EmptyInterruptKey => {
                write!(f, "interrupt key is blank, using the default")
            }
        }
    }
}

/// Non-fatal report
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Configuration was adjusted
    ConfigurationWarning(ConfigWarning),
    /// Audio could not be loaded; detections using it stay silent for this run
    AudioLoadFailure {
        /// Locator that failed
        locator: AudioLocator,
        /// Reason given by the backend
        reason: String,
    },
    /// The device refused to play; the slot was left empty
    AudioPlaybackFailure {
        /// Locator that failed
        locator: AudioLocator,
        /// Reason given by the backend
        reason: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ConfigurationWarning(warning) => write!(f, "{warning}"),
            Diagnostic::AudioLoadFailure { locator, reason } => {
                write!(f, "failed to load audio '{locator}': {reason}")
            }
            Diagnostic::AudioPlaybackFailure { locator, reason } => {
                write!(f, "failed to play audio '{locator}': {reason}")
            }
        }
    }
}

/// Sink for diagnostic reports. Fire-and-forget.
pub trait DiagnosticSink: Send + Sync {
    /// Accept one report
    fn report(&self, diagnostic: &Diagnostic);
}

/// Forwards reports to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::ConfigurationWarning(warning) => {
                tracing::warn!(%warning, "configuration adjusted");
            }
            Diagnostic::AudioLoadFailure { locator, reason } => {
                tracing::warn!(%locator, %reason, "audio cue unavailable");
            }
            Diagnostic::AudioPlaybackFailure { locator, reason } => {
                tracing::error!(%locator, %reason, "failed to play audio");
            }
        }
    }
}

/// Keeps every report in memory; clones share the same store
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    reports: Arc<Mutex<Vec<Diagnostic>>>,
}

impl CollectingSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything reported so far
    pub fn reports(&self) -> Vec<Diagnostic> {
        self.reports.lock().clone()
    }

    /// Number of reports
    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    /// Returns true when nothing was reported
    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    /// Drop all stored reports
    pub fn clear(&self) {
        self.reports.lock().clear();
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.reports.lock().push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_shares_store() {
        let sink = CollectingSink::new();
        let clone = sink.clone();
        clone.report(&Diagnostic::ConfigurationWarning(
            ConfigWarning::EmptyInterruptKey,
        ));
        assert_eq!(sink.len(), 1);
        sink.clear();
        assert!(clone.is_empty());
    }

    #[test]
    fn test_display() {
        let diag = Diagnostic::AudioPlaybackFailure {
            locator: AudioLocator::from("boom.ogg"),
            reason: "device busy".into(),
        };
        assert_eq!(diag.to_string(), "failed to play audio 'boom.ogg': device busy");
        let warning = ConfigWarning::NonPositiveIdleTimeout { requested_ms: -5 };
        assert_eq!(warning.to_string(), "idle timeout -5ms is not positive, using 0ms");
    }
}
