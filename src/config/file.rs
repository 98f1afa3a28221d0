//! TOML configuration file loading
//!
//! Supports `~/.config/brasa/config.toml` (or `BRASA_CONFIG`) as a persistent
//! config source. All fields are optional: the file is a partial overlay on top
//! of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::menu::MenuSource;
use crate::{Error, Result};

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BrasaConfigFile {
    /// Directory for the order database
    pub data_dir: Option<String>,

    #[serde(default)]
    pub server: ServerFileConfig,

    #[serde(default)]
    pub backend: BackendFileConfig,

    #[serde(default)]
    pub menu: MenuFileConfig,

    #[serde(default)]
    pub dialogue: DialogueFileConfig,

    #[serde(default)]
    pub voice: VoiceFileConfig,
}

/// Order backend server
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// API server port
    pub port: Option<u16>,

    /// Directory with the kitchen display files
    pub static_dir: Option<String>,
}

/// Where the assistant sends orders
#[derive(Debug, Default, Deserialize)]
pub struct BackendFileConfig {
    /// Base URL (e.g. "http://localhost:3000")
    pub url: Option<String>,
}

/// Menu catalog source
#[derive(Debug, Default, Deserialize)]
pub struct MenuFileConfig {
    pub source: Option<MenuSource>,
    pub path: Option<String>,
}

/// Dialogue tuning
#[derive(Debug, Default, Deserialize)]
pub struct DialogueFileConfig {
    pub restaurant_name: Option<String>,

    /// Consecutive misses before going idle (0 = never)
    pub max_misses: Option<u32>,

    pub listen_timeout_secs: Option<u64>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT endpoint
    pub stt_url: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS endpoint
    pub tts_url: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "nova")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,

    /// Recognition language (ISO 639-1)
    pub language: Option<String>,

    /// API key for the speech services
    pub api_key: Option<String>,
}

/// Parse a configuration file body
///
/// # Errors
///
/// Returns error if the content is not valid TOML for this schema
pub fn parse(content: &str) -> Result<BrasaConfigFile> {
    Ok(toml::from_str(content)?)
}

/// Load a config file from an explicit path
///
/// # Errors
///
/// Returns error if the file cannot be read or parsed
pub fn load_from(path: &Path) -> Result<BrasaConfigFile> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
    let config = parse(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;
    tracing::info!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Load the TOML config file from the standard path
///
/// Returns `BrasaConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> BrasaConfigFile {
    let Some(path) = config_file_path() else {
        return BrasaConfigFile::default();
    };

    if !path.exists() {
        return BrasaConfigFile::default();
    }

    load_from(&path).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring config file, using defaults");
        BrasaConfigFile::default()
    })
}

/// Return the config file path: `~/.config/brasa/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.config_dir().join("brasa").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_file() {
        let fc = parse(
            r#"
            [server]
            port = 4000

            [menu]
            source = "database"

            [dialogue]
            max_misses = 2
            "#,
        )
        .unwrap();

        assert_eq!(fc.server.port, Some(4000));
        assert_eq!(fc.menu.source, Some(MenuSource::Database));
        assert_eq!(fc.dialogue.max_misses, Some(2));
        assert!(fc.voice.api_key.is_none());
        assert!(fc.backend.url.is_none());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert!(parse("[llm]\nmodel = \"x\"").is_err());
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_from(&dir.path().join("nope.toml")),
            Err(Error::Config(_))
        ));
    }
}
