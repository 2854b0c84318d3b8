//! Audio device backend using rodio
//!
//! Clips are read fully into memory at load time and decoded once to make
//! sure the format is supported. Each play builds a fresh sink and decoder
//! over the cached bytes, which is how a clip is "rewound": the old sink is
//! stopped and the next play starts from the first sample.

use super::{AudioBackend, AudioLocator};
use crate::{KeyquenceError, Result};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::fs;
use std::io::Cursor;
use std::sync::Arc;

/// Clip loaded by [`RodioBackend`]
pub struct RodioClip {
    locator: AudioLocator,
    bytes: Arc<[u8]>,
    sink: Option<Sink>,
}

impl RodioClip {
    /// Locator the clip was loaded from
    pub fn locator(&self) -> &AudioLocator {
        &self.locator
    }

    /// Returns true while the clip has an active, unpaused sink
    pub fn is_playing(&self) -> bool {
        self.sink
            .as_ref()
            .is_some_and(|sink| !sink.is_paused() && !sink.empty())
    }
}

/// Backend playing through the default output device.
///
/// Not `Send`: build it on the thread that drives the engine.
pub struct RodioBackend {
    device: std::result::Result<(OutputStream, OutputStreamHandle), String>,
    volume: f32,
}

impl RodioBackend {
    /// Open the default output device.
    ///
    /// A missing device is not an error here; every load then fails and is
    /// reported, so detection keeps working without sound.
    pub fn new() -> Self {
        let device = OutputStream::try_default()
            .map_err(|e| format!("Failed to create audio stream: {}", e));
        if let Err(reason) = &device {
            tracing::warn!(%reason, "no audio output device");
        }
        Self {
            device,
            volume: 1.0,
        }
    }

    /// Open the default output device, failing if there is none
    pub fn try_new() -> Result<Self> {
        let backend = Self::new();
        match &backend.device {
            Ok(_) => Ok(backend),
            Err(reason) => Err(KeyquenceError::AudioDevice(reason.clone())),
        }
    }

    /// Set playback volume for clips started from now on (1.0 = unchanged)
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume.max(0.0);
        self
    }

    fn handle(&self) -> std::result::Result<&OutputStreamHandle, &str> {
        self.device
            .as_ref()
            .map(|(_, handle)| handle)
            .map_err(String::as_str)
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for RodioBackend {
    type Clip = RodioClip;

    fn load(&mut self, locator: &AudioLocator) -> Result<RodioClip> {
        self.handle()
            .map_err(|reason| KeyquenceError::audio_load(locator.as_str(), reason))?;
        if locator.is_url() {
            return Err(KeyquenceError::audio_load(
                locator.as_str(),
                "remote locators are not supported",
            ));
        }

        let bytes: Arc<[u8]> = fs::read(locator.as_path())
            .map_err(|e| KeyquenceError::audio_load(locator.as_str(), e.to_string()))?
            .into();
        Decoder::new(Cursor::new(Arc::clone(&bytes)))
            .map_err(|e| KeyquenceError::audio_load(locator.as_str(), e.to_string()))?;

        Ok(RodioClip {
            locator: locator.clone(),
            bytes,
            sink: None,
        })
    }

    fn play(&mut self, clip: &mut RodioClip) -> Result<()> {
        let handle = self
            .handle()
            .map_err(|reason| KeyquenceError::audio_playback(clip.locator.as_str(), reason))?;

        let sink = Sink::try_new(handle)
            .map_err(|e| KeyquenceError::audio_playback(clip.locator.as_str(), e.to_string()))?;
        let source = Decoder::new(Cursor::new(Arc::clone(&clip.bytes)))
            .map_err(|e| KeyquenceError::audio_playback(clip.locator.as_str(), e.to_string()))?;
        sink.set_volume(self.volume);
        sink.append(source);
        sink.play();

        if let Some(old) = clip.sink.replace(sink) {
            old.stop();
        }
        Ok(())
    }

    fn pause(&mut self, clip: &mut RodioClip) {
        if let Some(sink) = &clip.sink {
            sink.pause();
        }
    }

    fn rewind(&mut self, clip: &mut RodioClip) {
        if let Some(sink) = clip.sink.take() {
            sink.stop();
        }
    }

    fn unload(&mut self, clip: RodioClip) {
        if let Some(sink) = clip.sink {
            sink.stop();
        }
    }
}
