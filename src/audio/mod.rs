//! Audio cues
//!
//! The engine never talks to a sound device directly. It goes through an
//! [`AudioBackend`], which loads clips from a locator and can play, pause and
//! rewind them. The [`AudioArbiter`] sits on top and makes sure at most one
//! clip is playing at a time.

pub mod arbiter;
pub mod recording;
#[cfg(feature = "playback")]
pub mod rodio_backend;

pub use arbiter::{AudioArbiter, ClipId, SlotState};
pub use recording::{AudioEvent, RecordingBackend};

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Where an audio clip lives (file path or URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AudioLocator(String);

impl AudioLocator {
    /// Create a locator
    pub fn new(locator: impl Into<String>) -> Self {
        Self(locator.into())
    }

    /// Raw locator text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Locator as a filesystem path
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Returns true for `scheme://...` locators
    pub fn is_url(&self) -> bool {
        self.0.contains("://")
    }

    /// Resolve a relative path against `base`; URLs and absolute paths are kept
    pub fn resolved_against(&self, base: &Path) -> Self {
        if self.is_url() || self.as_path().is_absolute() {
            self.clone()
        } else {
            Self(base.join(self.as_path()).to_string_lossy().into_owned())
        }
    }
}

impl fmt::Display for AudioLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AudioLocator {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AudioLocator {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<PathBuf> for AudioLocator {
    fn from(path: PathBuf) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

/// External audio subsystem.
///
/// Implementations own the device; clips are opaque to the engine. `play`
/// returns as soon as playback was requested and never waits for the clip
/// to finish.
pub trait AudioBackend {
    /// Loaded, playable clip
    type Clip;

    /// Load the clip at `locator`
    fn load(&mut self, locator: &AudioLocator) -> Result<Self::Clip>;

    /// Start playing from the current position
    fn play(&mut self, clip: &mut Self::Clip) -> Result<()>;

    /// Pause, keeping the position
    fn pause(&mut self, clip: &mut Self::Clip);

    /// Move the position back to the start
    fn rewind(&mut self, clip: &mut Self::Clip);

    /// Release a clip that will not be used again
    fn unload(&mut self, clip: Self::Clip) {
        drop(clip);
    }
}

/// Clip handed out by [`SilentBackend`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SilentClip {
    /// Locator the clip was loaded from
    pub locator: AudioLocator,
    /// Whether the clip is "playing"
    pub playing: bool,
}

/// Backend without a device: every load succeeds and nothing is heard.
///
/// Useful for headless hosts and when audio output is switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentBackend;

impl SilentBackend {
    /// Create the backend
    pub fn new() -> Self {
        Self
    }
}

impl AudioBackend for SilentBackend {
    type Clip = SilentClip;

    fn load(&mut self, locator: &AudioLocator) -> Result<SilentClip> {
        Ok(SilentClip {
            locator: locator.clone(),
            playing: false,
        })
    }

    fn play(&mut self, clip: &mut SilentClip) -> Result<()> {
        clip.playing = true;
        Ok(())
    }

    fn pause(&mut self, clip: &mut SilentClip) {
        clip.playing = false;
    }

    fn rewind(&mut self, _clip: &mut SilentClip) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_resolution() {
        let base = Path::new("/sounds");
        assert_eq!(
            AudioLocator::from("boom.ogg").resolved_against(base).as_path(),
            Path::new("/sounds/boom.ogg")
        );
        let url = AudioLocator::from("https://example.com/boom.ogg");
        assert_eq!(url.resolved_against(base), url);
    }

    #[test]
    fn test_silent_backend() {
        let mut backend = SilentBackend::new();
        let mut clip = backend.load(&AudioLocator::from("a.wav")).unwrap();
        backend.play(&mut clip).unwrap();
        assert!(clip.playing);
        backend.pause(&mut clip);
        assert!(!clip.playing);
    }
}
