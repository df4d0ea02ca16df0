//! Worker configuration loading from file and environment variables.

use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;

use murmur_llm::ModelConfig;
use murmur_voice::{LiveKitConfig, SpeechConfig};

/// Top-level worker configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Health endpoint network settings.
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Conversation memory settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Identity endpoint settings.
    #[serde(default)]
    pub identity: IdentityConfig,

    /// The secondary model that produces advisory text.
    #[serde(default = "default_augmentation_model")]
    pub augmentation: AugmentationConfig,

    /// The primary model that produces the spoken reply.
    #[serde(default = "default_primary_model")]
    pub primary: ModelConfig,

    /// STT/TTS settings.
    #[serde(default)]
    pub speech: SpeechConfig,

    /// LiveKit room service settings.
    #[serde(default)]
    pub livekit: LiveKitConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Network configuration for the worker's health endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Conversation memory configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,

    /// Busy timeout for SQLite connections, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled connections.
    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,
}

/// Identity endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// URL returning `{"email": ...}` for the connecting user.
    #[serde(default = "default_identity_endpoint")]
    pub endpoint: String,

    /// Lookup timeout in milliseconds.
    #[serde(default = "default_identity_timeout_ms")]
    pub timeout_ms: u64,
}

/// The augmentation model plus the bound on its per-turn latency.
#[derive(Debug, Clone, Deserialize)]
pub struct AugmentationConfig {
    #[serde(flatten)]
    pub model: ModelConfig,

    /// Bound on one augmentation call, in milliseconds. Past this the
    /// turn proceeds unaugmented.
    #[serde(default = "default_augment_timeout_ms")]
    pub timeout_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "murmur_worker=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
}

fn default_port() -> u16 {
    8090
}

fn default_db_path() -> String {
    "murmur.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_pool_max_size() -> u32 {
    4
}

fn default_identity_endpoint() -> String {
    "https://api.supermilla.com/email/get-email".to_string()
}

fn default_identity_timeout_ms() -> u64 {
    5_000
}

fn default_augment_timeout_ms() -> u64 {
    10_000
}

fn default_augmentation_model() -> AugmentationConfig {
    AugmentationConfig {
        model: ModelConfig::new("gpt-4o-mini", 0.7),
        timeout_ms: default_augment_timeout_ms(),
    }
}

fn default_primary_model() -> ModelConfig {
    ModelConfig::new("gpt-4o-mini", 0.7)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
            pool_max_size: default_pool_max_size(),
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            endpoint: default_identity_endpoint(),
            timeout_ms: default_identity_timeout_ms(),
        }
    }
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        default_augmentation_model()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `MURMUR_HOST` / `MURMUR_PORT` override `worker.host` / `worker.port`
/// - `MURMUR_DB_PATH` overrides `memory.path`
/// - `MURMUR_IDENTITY_ENDPOINT` overrides `identity.endpoint`
/// - `MURMUR_LOG_LEVEL` / `MURMUR_LOG_JSON` override the `logging` section
/// - `OPENAI_API_KEY` supplies the completion/speech API key
/// - `MURMUR_LIVEKIT_URL` / `MURMUR_LIVEKIT_API_KEY` /
///   `MURMUR_LIVEKIT_API_SECRET` override the `livekit` section
///
/// Secrets are only ever read from the environment; the config file has
/// no key fields worth committing.
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    // Environment variable overrides
    if let Ok(host) = std::env::var("MURMUR_HOST") {
        if let Ok(parsed) = host.parse() {
            config.worker.host = parsed;
        }
    }
    if let Ok(port) = std::env::var("MURMUR_PORT") {
        if let Ok(parsed) = port.parse() {
            config.worker.port = parsed;
        }
    }
    if let Ok(db_path) = std::env::var("MURMUR_DB_PATH") {
        config.memory.path = db_path;
    }
    if let Ok(endpoint) = std::env::var("MURMUR_IDENTITY_ENDPOINT") {
        config.identity.endpoint = endpoint;
    }
    if let Ok(level) = std::env::var("MURMUR_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Ok(json) = std::env::var("MURMUR_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
        config.augmentation.model.api_key = api_key.clone();
        config.primary.api_key = api_key;
    }
    if let Ok(url) = std::env::var("MURMUR_LIVEKIT_URL") {
        config.livekit.url = url;
    }
    if let Ok(key) = std::env::var("MURMUR_LIVEKIT_API_KEY") {
        config.livekit.api_key = key;
    }
    if let Ok(secret) = std::env::var("MURMUR_LIVEKIT_API_SECRET") {
        config.livekit.api_secret = secret;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::Mutex;

    /// `load_config` reads the process environment, which is shared
    /// across the test binary. Every test in this module takes this
    /// lock so an override test cannot leak into a defaults test.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_apply_without_a_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = load_config(None).expect("defaults should load");
        assert_eq!(config.worker.port, 8090);
        assert_eq!(config.memory.path, "murmur.db");
        assert_eq!(config.augmentation.model.model, "gpt-4o-mini");
        assert_eq!(config.augmentation.timeout_ms, 10_000);
        assert_eq!(config.speech.voice, "nova");
        assert!(!config.logging.json);
    }

    #[test]
    fn file_values_override_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(
            file,
            r#"
                [worker]
                port = 9000

                [memory]
                path = "/var/lib/murmur/memory.db"

                [augmentation]
                model = "gpt-4o"
                temperature = 0.2
                timeout_ms = 4000

                [speech]
                voice = "alloy"
            "#
        )
        .expect("write config");

        let config = load_config(file.path().to_str()).expect("should parse");
        assert_eq!(config.worker.port, 9000);
        assert_eq!(config.memory.path, "/var/lib/murmur/memory.db");
        assert_eq!(config.augmentation.model.model, "gpt-4o");
        assert_eq!(config.augmentation.model.temperature, 0.2);
        assert_eq!(config.augmentation.timeout_ms, 4000);
        assert_eq!(config.speech.voice, "alloy");
        // Untouched sections keep their defaults.
        assert_eq!(config.primary.model, "gpt-4o-mini");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        let config = load_config(Some("/nonexistent/murmur.toml")).expect("should fall back");
        assert_eq!(config.worker.port, 8090);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let _guard = ENV_LOCK.lock().unwrap();

        std::env::set_var("MURMUR_PORT", "9191");
        std::env::set_var("MURMUR_DB_PATH", "/tmp/override.db");
        std::env::set_var("MURMUR_IDENTITY_ENDPOINT", "http://localhost:4000/email");
        std::env::set_var("MURMUR_LOG_JSON", "true");
        std::env::set_var("OPENAI_API_KEY", "sk-from-env");
        std::env::set_var("MURMUR_LIVEKIT_URL", "ws://localhost:7880");
        std::env::set_var("MURMUR_LIVEKIT_API_SECRET", "lk-secret-from-env");

        let config = load_config(None).expect("should load");

        std::env::remove_var("MURMUR_PORT");
        std::env::remove_var("MURMUR_DB_PATH");
        std::env::remove_var("MURMUR_IDENTITY_ENDPOINT");
        std::env::remove_var("MURMUR_LOG_JSON");
        std::env::remove_var("OPENAI_API_KEY");
        std::env::remove_var("MURMUR_LIVEKIT_URL");
        std::env::remove_var("MURMUR_LIVEKIT_API_SECRET");

        assert_eq!(config.worker.port, 9191);
        assert_eq!(config.memory.path, "/tmp/override.db");
        assert_eq!(config.identity.endpoint, "http://localhost:4000/email");
        assert!(config.logging.json);
        // The key reaches both model clients.
        assert_eq!(config.augmentation.model.api_key, "sk-from-env");
        assert_eq!(config.primary.api_key, "sk-from-env");
        assert_eq!(config.livekit.url, "ws://localhost:7880");
        assert_eq!(config.livekit.api_secret, "lk-secret-from-env");
    }

    #[test]
    fn env_port_must_parse_to_apply() {
        let _guard = ENV_LOCK.lock().unwrap();

        std::env::set_var("MURMUR_PORT", "not-a-port");
        let config = load_config(None).expect("should load");
        std::env::remove_var("MURMUR_PORT");

        assert_eq!(config.worker.port, 8090, "unparsable override is ignored");
    }
}
