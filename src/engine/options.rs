use crate::diagnostics::ConfigWarning;
use crate::key::DEFAULT_INTERRUPT_KEY;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Idle timeout used when none is configured
pub const DEFAULT_IDLE_TIMEOUT_MS: i64 = 2000;

/// Engine options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Inactivity, in milliseconds, after which the buffer is cleared.
    /// Negative values are treated as zero.
    pub idle_timeout_ms: i64,
    /// Whether the interrupt key cancels the playing cue
    pub supports_interrupt: bool,
    /// Name of the interrupt key
    pub interrupt_key: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            supports_interrupt: true,
            interrupt_key: DEFAULT_INTERRUPT_KEY.to_string(),
        }
    }
}

impl EngineOptions {
    /// Set the idle timeout in milliseconds
    pub fn idle_timeout_ms(mut self, ms: i64) -> Self {
        self.idle_timeout_ms = ms;
        self
    }

    /// Enable or disable the interrupt key
    pub fn supports_interrupt(mut self, enabled: bool) -> Self {
        self.supports_interrupt = enabled;
        self
    }

    /// Set the interrupt key name
    pub fn interrupt_key(mut self, key: impl Into<String>) -> Self {
        self.interrupt_key = key.into();
        self
    }

    /// Idle timeout clamped to zero
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms.max(0) as u64)
    }

    /// Interrupt key in effect, `None` when interruption is off
    pub fn effective_interrupt_key(&self) -> Option<&str> {
        if !self.supports_interrupt {
            None
        } else if self.interrupt_key.trim().is_empty() {
            Some(DEFAULT_INTERRUPT_KEY)
        } else {
            Some(&self.interrupt_key)
        }
    }

    /// Values that are out of range or had to be clamped
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.idle_timeout_ms <= 0 {
            warnings.push(ConfigWarning::NonPositiveIdleTimeout {
                requested_ms: self.idle_timeout_ms,
            });
        }
        if self.supports_interrupt && self.interrupt_key.trim().is_empty() {
            warnings.push(ConfigWarning::EmptyInterruptKey);
        }
        warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = EngineOptions::default();
        assert_eq!(options.idle_timeout(), Duration::from_millis(2000));
        assert_eq!(options.effective_interrupt_key(), Some("Escape"));
        assert!(options.warnings().is_empty());
    }

    #[test]
    fn test_negative_timeout_is_clamped() {
        let options = EngineOptions::default().idle_timeout_ms(-250);
        assert_eq!(options.idle_timeout(), Duration::ZERO);
        assert_eq!(
            options.warnings(),
            vec![ConfigWarning::NonPositiveIdleTimeout { requested_ms: -250 }]
        );
    }

    #[test]
    fn test_zero_timeout_warns() {
        let options = EngineOptions::default().idle_timeout_ms(0);
        assert_eq!(options.idle_timeout(), Duration::ZERO);
        assert_eq!(
            options.warnings(),
            vec![ConfigWarning::NonPositiveIdleTimeout { requested_ms: 0 }]
        );
    }

    #[test]
    fn test_interrupt_key_fallback() {
        let options = EngineOptions::default().interrupt_key("  ");
        assert_eq!(options.effective_interrupt_key(), Some("Escape"));
        assert_eq!(options.warnings(), vec![ConfigWarning::EmptyInterruptKey]);

        let off = options.supports_interrupt(false);
        assert_eq!(off.effective_interrupt_key(), None);
        assert!(off.warnings().is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let options: EngineOptions = serde_json::from_str(r#"{"idle_timeout_ms": 500}"#).unwrap();
        assert_eq!(options.idle_timeout_ms, 500);
        assert!(options.supports_interrupt);
        assert_eq!(options.interrupt_key, "Escape");
    }
}
