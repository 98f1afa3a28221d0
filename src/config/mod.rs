//! Configuration management
//!
//! Precedence: CLI flags > environment > config file > defaults. CLI flags are
//! applied by the binary on top of [`Config::load`].

pub mod file;

use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use crate::dialogue::{DEFAULT_MAX_MISSES, DialogueConfig};
use crate::menu::MenuSource;
use crate::Result;
use crate::voice::{DEFAULT_STT_URL, DEFAULT_TTS_URL};

pub use file::BrasaConfigFile;

/// Default API server port
pub const DEFAULT_PORT: u16 = 3000;

/// Default listen timeout in seconds
pub const DEFAULT_LISTEN_TIMEOUT_SECS: u64 = 10;

/// Brasa configuration
#[derive(Debug)]
pub struct Config {
    /// Path to data directory (database)
    pub data_dir: PathBuf,

    pub server: ServerConfig,

    pub backend: BackendConfig,

    pub menu: MenuConfig,

    pub dialogue: DialogueSettings,

    pub voice: VoiceConfig,
}

/// Order backend server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,

    /// Serve the kitchen display from this directory
    pub static_dir: Option<PathBuf>,
}

/// Where the assistant submits orders
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
}

/// Menu catalog source
#[derive(Debug, Clone)]
pub struct MenuConfig {
    pub source: MenuSource,
    pub path: Option<PathBuf>,
}

/// Dialogue tuning
#[derive(Debug, Clone)]
pub struct DialogueSettings {
    pub restaurant_name: String,
    pub max_misses: u32,
    pub listen_timeout: Duration,
}

impl DialogueSettings {
    /// Settings the controller needs
    #[must_use]
    pub fn controller_config(&self) -> DialogueConfig {
        DialogueConfig {
            restaurant_name: self.restaurant_name.clone(),
            max_misses: self.max_misses,
        }
    }
}

/// Voice processing configuration
#[derive(Debug)]
pub struct VoiceConfig {
    pub stt_url: String,
    pub stt_model: String,
    pub tts_url: String,
    pub tts_model: String,
    pub tts_voice: String,
    pub tts_speed: f32,
    pub language: String,
    /// Key for the STT/TTS services; microphone mode requires it
    pub api_key: Option<SecretString>,
}

impl Config {
    /// Load configuration from the config file and the process environment
    ///
    /// # Errors
    ///
    /// Returns error if `BRASA_CONFIG` names a file that cannot be read or parsed
    pub fn load() -> Result<Self> {
        let fc = match std::env::var("BRASA_CONFIG") {
            Ok(path) => file::load_from(Path::new(&path))?,
            Err(_) => file::load_config_file(),
        };

        let config = Self::resolve(fc, |key| std::env::var(key).ok());

        // Ensure data dir exists
        if let Err(e) = std::fs::create_dir_all(&config.data_dir) {
            tracing::warn!(
                path = %config.data_dir.display(),
                error = %e,
                "failed to create data directory"
            );
        }

        Ok(config)
    }

    /// Merge a config file with environment lookups (env > file > default)
    ///
    /// Unparseable environment values are ignored with a warning.
    #[must_use]
    pub fn resolve<F>(fc: BrasaConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let server = ServerConfig {
            port: parse_env(&env, "BRASA_PORT")
                .or_else(|| parse_env(&env, "PORT"))
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            static_dir: env("BRASA_STATIC_DIR")
                .or(fc.server.static_dir)
                .map(PathBuf::from),
        };

        let backend = BackendConfig {
            url: env("BRASA_BACKEND_URL")
                .or(fc.backend.url)
                .unwrap_or_else(|| format!("http://localhost:{}", server.port)),
        };

        let menu_path = env("BRASA_MENU_PATH")
            .or(fc.menu.path)
            .map(PathBuf::from);
        let menu = MenuConfig {
            source: parse_env(&env, "BRASA_MENU_SOURCE")
                .or(fc.menu.source)
                .unwrap_or_else(|| {
                    menu_path
                        .as_deref()
                        .map_or(MenuSource::Embedded, MenuSource::for_path)
                }),
            path: menu_path,
        };

        let dialogue = DialogueSettings {
            restaurant_name: env("BRASA_RESTAURANT_NAME")
                .or(fc.dialogue.restaurant_name)
                .unwrap_or_else(|| "Brasa Roja".to_string()),
            max_misses: parse_env(&env, "BRASA_MAX_MISSES")
                .or(fc.dialogue.max_misses)
                .unwrap_or(DEFAULT_MAX_MISSES),
            listen_timeout: Duration::from_secs(
                parse_env(&env, "BRASA_LISTEN_TIMEOUT_SECS")
                    .or(fc.dialogue.listen_timeout_secs)
                    .unwrap_or(DEFAULT_LISTEN_TIMEOUT_SECS)
                    .max(1),
            ),
        };

        let voice = VoiceConfig {
            stt_url: env("BRASA_STT_URL")
                .or(fc.voice.stt_url)
                .unwrap_or_else(|| DEFAULT_STT_URL.to_string()),
            stt_model: env("BRASA_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| "whisper-1".to_string()),
            tts_url: env("BRASA_TTS_URL")
                .or(fc.voice.tts_url)
                .unwrap_or_else(|| DEFAULT_TTS_URL.to_string()),
            tts_model: env("BRASA_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| "tts-1".to_string()),
            tts_voice: env("BRASA_TTS_VOICE")
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "nova".to_string()),
            tts_speed: parse_env(&env, "BRASA_TTS_SPEED")
                .or(fc.voice.tts_speed)
                .unwrap_or(1.0),
            language: env("BRASA_LANGUAGE")
                .or(fc.voice.language)
                .unwrap_or_else(|| "es".to_string()),
            api_key: env("OPENAI_API_KEY")
                .or(fc.voice.api_key)
                .filter(|key| !key.is_empty())
                .map(SecretString::from),
        };

        // Determine data directory (~/.local/share/brasa on Linux)
        let data_dir = env("BRASA_DATA_DIR")
            .or(fc.data_dir)
            .map_or_else(default_data_dir, PathBuf::from);

        Self {
            data_dir,
            server,
            backend,
            menu,
            dialogue,
            voice,
        }
    }

    /// Path of the order database
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("brasa.db")
    }
}

fn parse_env<T, F>(env: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = env(key)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        tracing::warn!(key, value = %raw, "ignoring unparseable environment value");
    }
    parsed
}

fn default_data_dir() -> PathBuf {
    directories::BaseDirs::new().map_or_else(|| PathBuf::from("."), |d| d.data_dir().join("brasa"))
}
