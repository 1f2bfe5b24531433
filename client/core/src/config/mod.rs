//! TOML Configuration File Support
//!
//! Centralized configuration loading for the client, from a TOML file at
//! `~/.config/red-queen/client.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. CLI arguments (applied by the caller through [`ConfigOverrides`])
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "http://localhost:8000"
//! chat_path = "/ai/chat/"
//! timeout_secs = 60
//!
//! [storage]
//! data_dir = "~/.local/share/red-queen"
//!
//! [animation]
//! reveal_interval_ms = 10
//! highlight_poll_ms = 5
//! transition_ms = 600
//!
//! [audio]
//! enabled = true
//! player = ["mpv", "--no-video", "--really-quiet"]
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Backend section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendToml {
    /// Scheme, host and port of the chat service
    pub base_url: Option<String>,

    /// Path of the chat endpoint
    pub chat_path: Option<String>,

    /// Client-side request timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Storage section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageToml {
    /// Directory for persisted sessions and logs (`~` is expanded)
    pub data_dir: Option<String>,
}

/// Animation section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Delay between revealed characters
    pub reveal_interval_ms: Option<u64>,

    /// How often playback position is sampled during highlight
    pub highlight_poll_ms: Option<u64>,

    /// How long content stays hidden after switching sessions
    pub transition_ms: Option<u64>,
}

/// Audio section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioToml {
    /// Whether spoken replies are played
    pub enabled: Option<bool>,

    /// External player command and arguments
    pub player: Option<Vec<String>>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientToml {
    /// Backend configuration section
    pub backend: BackendToml,

    /// Storage configuration section
    pub storage: StorageToml,

    /// Animation configuration section
    pub animation: AnimationToml,

    /// Audio configuration section
    pub audio: AudioToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Centralized configuration for the client
///
/// Use [`load_config`] to load configuration with proper priority handling.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Scheme, host and port of the chat service
    pub base_url: String,

    /// Path of the chat endpoint
    pub chat_path: String,

    /// Client-side request timeout
    pub request_timeout: Duration,

    /// Directory for persisted state and logs
    pub data_dir: PathBuf,

    /// Delay between revealed characters
    pub reveal_interval: Duration,

    /// Playback position sampling interval during highlight
    pub highlight_poll: Duration,

    /// Content hidden for this long after a session switch
    pub transition: Duration,

    /// Whether spoken replies are played through `audio_player`
    pub audio_enabled: bool,

    /// External player command (program followed by arguments)
    pub audio_player: Vec<String>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            chat_path: "/ai/chat/".to_string(),
            request_timeout: Duration::from_secs(60),
            data_dir: default_data_dir(),
            reveal_interval: Duration::from_millis(10),
            highlight_poll: Duration::from_millis(5),
            transition: Duration::from_millis(600),
            audio_enabled: true,
            audio_player: vec![
                "mpv".to_string(),
                "--no-video".to_string(),
                "--really-quiet".to_string(),
            ],
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl ClientConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Full URL of the chat endpoint
    #[must_use]
    pub fn chat_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.chat_path.trim_start_matches('/')
        )
    }

    /// Where rendered audio files are written before playback
    #[must_use]
    pub fn audio_cache_dir(&self) -> PathBuf {
        self.data_dir.join("audio")
    }

    /// Check values that would make the client unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "backend.base_url must start with http:// or https:// (got {:?})",
                self.base_url
            )));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "backend.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.reveal_interval.is_zero() || self.highlight_poll.is_zero() {
            return Err(ConfigError::ValidationError(
                "animation intervals must be greater than zero".to_string(),
            ));
        }
        if self.audio_enabled && self.audio_player.is_empty() {
            return Err(ConfigError::ValidationError(
                "audio.player must name a program when audio is enabled".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/red-queen/client.toml` or
/// `~/.config/red-queen/client.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("red-queen").join("client.toml"))
}

/// Default data directory (`~/.local/share/red-queen` on Linux)
#[must_use]
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|p| p.join("red-queen"))
        .unwrap_or_else(|| PathBuf::from(".red-queen"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// merged values fail validation. A missing config file is not an error.
pub fn load_config() -> Result<ClientConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<ClientConfig, ConfigError> {
    let mut config = ClientConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: ClientToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut ClientConfig, toml: &ClientToml) {
    if let Some(ref url) = toml.backend.base_url {
        config.base_url = url.clone();
    }
    if let Some(ref path) = toml.backend.chat_path {
        config.chat_path = path.clone();
    }
    if let Some(secs) = toml.backend.timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }

    if let Some(ref dir) = toml.storage.data_dir {
        config.data_dir = expand_home(dir);
    }

    if let Some(ms) = toml.animation.reveal_interval_ms {
        config.reveal_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.animation.highlight_poll_ms {
        config.highlight_poll = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.animation.transition_ms {
        config.transition = Duration::from_millis(ms);
    }

    if let Some(enabled) = toml.audio.enabled {
        config.audio_enabled = enabled;
    }
    if let Some(ref player) = toml.audio.player {
        config.audio_player = player.clone();
    }
}

/// Apply environment variable overrides to the config
///
/// `lookup` resolves a variable name; production passes `std::env::var`.
fn apply_env_config<F>(config: &mut ClientConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("REDQUEEN_API_URL") {
        config.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(path) = lookup("REDQUEEN_CHAT_PATH") {
        config.chat_path = path;
        config.source = ConfigSource::Env;
    }
    if let Some(timeout) = lookup("REDQUEEN_TIMEOUT_SECS") {
        if let Ok(secs) = timeout.trim().parse::<u64>() {
            config.request_timeout = Duration::from_secs(secs);
            config.source = ConfigSource::Env;
        }
    }
    if let Some(dir) = lookup("REDQUEEN_DATA_DIR") {
        config.data_dir = expand_home(&dir);
        config.source = ConfigSource::Env;
    }
    if let Some(enabled) = lookup("REDQUEEN_AUDIO") {
        config.audio_enabled = enabled != "0" && enabled.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
    if let Some(player) = lookup("REDQUEEN_AUDIO_PLAYER") {
        let command: Vec<String> = player.split_whitespace().map(String::from).collect();
        if !command.is_empty() {
            config.audio_player = command;
            config.source = ConfigSource::Env;
        }
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| Path::new(path).to_path_buf()),
        None => PathBuf::from(path),
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Backend base URL override
    pub base_url: Option<String>,

    /// Data directory override
    pub data_dir: Option<PathBuf>,

    /// Audio enabled override
    pub audio_enabled: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: String) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Set data directory override
    #[must_use]
    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.data_dir = Some(dir);
        self
    }

    /// Set audio enabled override
    #[must_use]
    pub fn with_audio_enabled(mut self, enabled: bool) -> Self {
        self.audio_enabled = Some(enabled);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut ClientConfig) {
        if self.base_url.is_some() || self.data_dir.is_some() || self.audio_enabled.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.base_url = url.clone();
        }
        if let Some(ref dir) = self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(enabled) = self.audio_enabled {
            config.audio_enabled = enabled;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn parse(toml_str: &str) -> ClientConfig {
        let toml_config: ClientToml = toml::from_str(toml_str).unwrap();
        let mut config = ClientConfig::default();
        apply_toml_config(&mut config, &toml_config);
        config
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();

        assert_eq!(config.chat_url(), "http://localhost:8000/ai/chat/");
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.reveal_interval, Duration::from_millis(10));
        assert_eq!(config.transition, Duration::from_millis(600));
        assert!(config.audio_enabled);
        assert_eq!(config.source(), ConfigSource::Default);
        config.validate().unwrap();
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("red-queen/client.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let config = parse(
            r#"
[backend]
base_url = "https://queen.example:9000/"
chat_path = "ai/chat/"
timeout_secs = 15

[storage]
data_dir = "/var/lib/red-queen"

[animation]
reveal_interval_ms = 20
highlight_poll_ms = 8
transition_ms = 500

[audio]
enabled = false
player = ["ffplay", "-nodisp", "-autoexit"]
"#,
        );

        assert_eq!(config.chat_url(), "https://queen.example:9000/ai/chat/");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/red-queen"));
        assert_eq!(config.reveal_interval, Duration::from_millis(20));
        assert_eq!(config.highlight_poll, Duration::from_millis(8));
        assert_eq!(config.transition, Duration::from_millis(500));
        assert!(!config.audio_enabled);
        assert_eq!(config.audio_player[0], "ffplay");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = parse("[backend]\ntimeout_secs = 5\n");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.reveal_interval, Duration::from_millis(10));
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/red-queen/client.toml");
        let config = load_config_from_path(Some(path)).unwrap();
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[backend\nbase_url = ").unwrap();

        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = parse("[backend]\nbase_url = \"http://file:1\"\n");
        config.set_source(ConfigSource::File);

        apply_env_config(
            &mut config,
            env_from(&[
                ("REDQUEEN_API_URL", "http://env:2"),
                ("REDQUEEN_TIMEOUT_SECS", "7"),
                ("REDQUEEN_AUDIO", "0"),
                ("REDQUEEN_AUDIO_PLAYER", "ffplay -nodisp"),
            ]),
        );

        assert_eq!(config.base_url, "http://env:2");
        assert_eq!(config.request_timeout, Duration::from_secs(7));
        assert!(!config.audio_enabled);
        assert_eq!(config.audio_player, vec!["ffplay", "-nodisp"]);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_env_ignores_unparseable_timeout() {
        let mut config = ClientConfig::default();
        apply_env_config(&mut config, env_from(&[("REDQUEEN_TIMEOUT_SECS", "soon")]));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_env() {
        let mut config = ClientConfig::default();
        apply_env_config(&mut config, env_from(&[("REDQUEEN_API_URL", "http://env:2")]));

        ConfigOverrides::new()
            .with_base_url("http://cli:3".to_string())
            .with_audio_enabled(false)
            .apply(&mut config);

        assert_eq!(config.base_url, "http://cli:3");
        assert!(!config.audio_enabled);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_config_overrides_empty_no_change() {
        let mut config = ClientConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = parse("[backend]\ntimeout_secs = 0\n");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));

        let config = parse("[animation]\nreveal_interval_ms = 0\n");
        assert!(config.validate().is_err());

        let config = parse("[backend]\nbase_url = \"localhost:8000\"\n");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/red-queen"), home.join("red-queen"));
        }
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
