//! Sequence definitions and the registry that holds them for one engine run.

use crate::audio::AudioLocator;
use crate::diagnostics::ConfigWarning;
use crate::key::normalize;
use std::fmt;

/// Callback fired once per detection
pub type DetectCallback = Box<dyn FnMut() + Send + 'static>;

/// One registered sequence: the pattern, what to do when it is typed and
/// which audio cue (if any) to play.
pub struct SequenceDefinition {
    pattern: String,
    normalized: String,
    on_detect: DetectCallback,
    audio: Option<AudioLocator>,
}

impl SequenceDefinition {
    /// Create a definition without audio
    pub fn new(pattern: impl Into<String>, on_detect: impl FnMut() + Send + 'static) -> Self {
        let pattern = pattern.into();
        let normalized = normalize(&pattern);
        Self {
            pattern,
            normalized,
            on_detect: Box::new(on_detect),
            audio: None,
        }
    }

    /// Attach an audio cue
    pub fn with_audio(mut self, locator: impl Into<AudioLocator>) -> Self {
        self.audio = Some(locator.into());
        self
    }

    /// Pattern as registered
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Lower-cased pattern used for matching
    pub fn normalized_pattern(&self) -> &str {
        &self.normalized
    }

    /// Audio cue locator
    pub fn audio(&self) -> Option<&AudioLocator> {
        self.audio.as_ref()
    }

    /// An empty pattern never matches
    pub fn is_inert(&self) -> bool {
        self.normalized.is_empty()
    }

    fn matches(&self, buffer: &str) -> bool {
        !self.is_inert() && buffer.contains(self.normalized.as_str())
    }
}

impl fmt::Debug for SequenceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceDefinition")
            .field("pattern", &self.pattern)
            .field("audio", &self.audio)
            .finish_non_exhaustive()
    }
}

/// Ordered, fixed set of sequence definitions.
///
/// Registration order is preserved and is the order in which matches fire.
/// Duplicate patterns are kept; each fires on its own.
#[derive(Debug, Default)]
pub struct SequenceRegistry {
    definitions: Vec<SequenceDefinition>,
}

impl SequenceRegistry {
    /// Build a registry from definitions in registration order
    pub fn new(definitions: Vec<SequenceDefinition>) -> Self {
        Self { definitions }
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Returns true when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Iterate in registration order
    pub fn iter(&self) -> impl Iterator<Item = &SequenceDefinition> {
        self.definitions.iter()
    }

    /// Definition at `index`
    pub fn get(&self, index: usize) -> Option<&SequenceDefinition> {
        self.definitions.get(index)
    }

    /// Audio locator registered for `pattern` (case-insensitive).
    ///
    /// With duplicate patterns the first definition carrying audio wins.
    pub fn audio_for(&self, pattern: &str) -> Option<&AudioLocator> {
        let wanted = normalize(pattern);
        self.definitions
            .iter()
            .filter(|def| def.normalized == wanted)
            .find_map(|def| def.audio.as_ref())
    }

    /// Indices of every definition whose pattern occurs in `buffer`, in registration order
    pub fn matching(&self, buffer: &str) -> Vec<usize> {
        self.definitions
            .iter()
            .enumerate()
            .filter(|(_, def)| def.matches(buffer))
            .map(|(index, _)| index)
            .collect()
    }

    /// Problems found in the registered definitions
    pub fn warnings(&self) -> Vec<ConfigWarning> {
        self.definitions
            .iter()
            .enumerate()
            .filter(|(_, def)| def.is_inert())
            .map(|(index, _)| ConfigWarning::EmptyPattern { index })
            .collect()
    }

    pub(crate) fn fire(&mut self, index: usize) {
        if let Some(def) = self.definitions.get_mut(index) {
            (def.on_detect)();
        }
    }
}
