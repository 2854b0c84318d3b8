//! Sequence files
//!
//! JSON description of engine options and sequences, used by the terminal
//! front end:
//!
//! ```json
//! {
//!   "options": { "idle_timeout_ms": 1500, "interrupt_key": "Escape" },
//!   "sequences": [
//!     { "pattern": "iddqd", "audio": "sounds/god.ogg", "message": "god mode" },
//!     { "pattern": "up up down down" }
//!   ]
//! }
//! ```
//!
//! Relative audio paths are resolved against the file's directory.

use crate::audio::AudioLocator;
use crate::engine::EngineOptions;
use crate::registry::SequenceDefinition;
use crate::{KeyquenceError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One sequence in a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceEntry {
    /// Pattern to detect
    pub pattern: String,
    /// Audio cue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioLocator>,
    /// Text the host shows on detection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Parsed sequence file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceFile {
    /// Engine options
    #[serde(default)]
    pub options: EngineOptions,
    /// Sequences in registration order
    #[serde(default)]
    pub sequences: Vec<SequenceEntry>,
}

impl SequenceFile {
    /// Read and parse a file, resolving relative audio paths against its directory
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            KeyquenceError::Config(format!(
                "Failed to read sequence file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut file = Self::from_json(&text)?;
        if let Some(base) = path.parent() {
            for entry in &mut file.sequences {
                entry.audio = entry.audio.take().map(|audio| audio.resolved_against(base));
            }
        }
        Ok(file)
    }

    /// Parse JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to pretty JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build engine definitions. `on_detect` is asked for one callback per entry.
    pub fn into_parts<F, C>(self, mut on_detect: F) -> (EngineOptions, Vec<SequenceDefinition>)
    where
        F: FnMut(&SequenceEntry) -> C,
        C: FnMut() + Send + 'static,
    {
        let definitions = self
            .sequences
            .iter()
            .map(|entry| {
                let definition = SequenceDefinition::new(entry.pattern.clone(), on_detect(entry));
                match &entry.audio {
                    Some(audio) => definition.with_audio(audio.clone()),
                    None => definition,
                }
            })
            .collect();
        (self.options, definitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "options": { "idle_timeout_ms": 750, "supports_interrupt": false },
        "sequences": [
            { "pattern": "iddqd", "audio": "sounds/god.ogg", "message": "god mode" },
            { "pattern": "idkfa" },
            { "pattern": "horn", "audio": "https://example.com/horn.ogg" }
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let file = SequenceFile::from_json(SAMPLE).unwrap();
        assert_eq!(file.options.idle_timeout_ms, 750);
        assert!(!file.options.supports_interrupt);
        assert_eq!(file.options.interrupt_key, "Escape");
        assert_eq!(file.sequences.len(), 3);
        assert_eq!(file.sequences[0].message.as_deref(), Some("god mode"));
        assert_eq!(file.sequences[1].audio, None);
    }

    #[test]
    fn test_empty_object_uses_defaults() {
        let file = SequenceFile::from_json("{}").unwrap();
        assert_eq!(file, SequenceFile::default());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            SequenceFile::from_json("{ \"sequences\": 3 }"),
            Err(KeyquenceError::Json(_))
        ));
    }

    #[test]
    fn test_load_resolves_relative_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sequences.json");
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(SAMPLE.as_bytes()).unwrap();

        let file = SequenceFile::load(&path).unwrap();
        assert_eq!(
            file.sequences[0].audio.as_ref().map(AudioLocator::as_path),
            Some(dir.path().join("sounds/god.ogg").as_path())
        );
        assert_eq!(
            file.sequences[2].audio.as_ref().map(AudioLocator::as_str),
            Some("https://example.com/horn.ogg")
        );
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SequenceFile::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, KeyquenceError::Config(_)));
    }

    #[test]
    fn test_into_parts() {
        let file = SequenceFile::from_json(SAMPLE).unwrap();
        let mut seen = Vec::new();
        let (options, definitions) = file.into_parts(|entry| {
            seen.push(entry.pattern.clone());
            || {}
        });
        assert_eq!(options.idle_timeout_ms, 750);
        assert_eq!(seen, vec!["iddqd", "idkfa", "horn"]);
        assert_eq!(
            definitions[0].audio().map(AudioLocator::as_str),
            Some("sounds/god.ogg")
        );
        assert!(definitions[1].audio().is_none());
    }

    #[test]
    fn test_round_trip_skips_empty_fields() {
        let file = SequenceFile {
            options: EngineOptions::default(),
            sequences: vec![SequenceEntry {
                pattern: "abc".into(),
                audio: None,
                message: None,
            }],
        };
        let json = file.to_json_pretty().unwrap();
        assert!(!json.contains("audio"));
        assert_eq!(SequenceFile::from_json(&json).unwrap(), file);
    }
}
