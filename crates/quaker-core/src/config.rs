use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::QuakeError;

/// How the two slots' offsets combine when both are active in one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetBlend {
    /// Each slot writes the camera directly; the later slot in a tick wins.
    #[default]
    LastWriterWins,
    /// Active slots' offsets are summed and written once per tick.
    Additive,
}

/// Engine-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Whether `play` may replace an in-flight quake in the same slot.
    pub overwritable: bool,
    pub blend: OffsetBlend,
    /// Fixed RNG seed for reproducible shakes. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            overwritable: true,
            blend: OffsetBlend::LastWriterWins,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Default settings with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parse a config file's contents.
    pub fn from_toml_str(contents: &str) -> Result<Self, QuakeError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, QuakeError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Load config from `QUAKER_CONFIG` or `config/quaker.toml`, falling back
    /// to defaults.
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("QUAKER_CONFIG") {
            match Self::from_path(&path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %path, error = %e, "Ignoring engine config"),
            }
        }
        if let Ok(config) = Self::from_path("config/quaker.toml") {
            return config;
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_overwritable_last_writer() {
        let config = EngineConfig::default();
        assert!(config.overwritable);
        assert_eq!(config.blend, OffsetBlend::LastWriterWins);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str("blend = \"additive\"").unwrap();
        assert_eq!(config.blend, OffsetBlend::Additive);
        assert!(config.overwritable);
    }

    #[test]
    fn full_toml() {
        let config =
            EngineConfig::from_toml_str("overwritable = false\nseed = 42\nblend = \"last_writer_wins\"")
                .unwrap();
        assert_eq!(
            config,
            EngineConfig {
                overwritable: false,
                blend: OffsetBlend::LastWriterWins,
                seed: Some(42),
            }
        );
    }

    #[test]
    fn bad_blend_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("blend = \"average\"").unwrap_err();
        assert!(matches!(err, QuakeError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EngineConfig::from_path("definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, QuakeError::Io(_)));
    }
}
