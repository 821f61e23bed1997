use axum::http::HeaderValue;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Default OpenAI-compatible endpoint used for chat completions (Groq).
pub const DEFAULT_COMPLETION_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Default chat model used for summaries and answers.
pub const DEFAULT_COMPLETION_MODEL: &str = "llama-3.1-8b-instant";
/// Default cap on upload request bodies (20 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
/// Default path of the log file written alongside stdout.
pub const DEFAULT_LOG_FILE: &str = "logs/documind.log";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the DocuMind server.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key for the completion provider. Missing keys fail at request time, not startup.
    pub completion_api_key: Option<String>,
    /// Base URL of the OpenAI-compatible completion API.
    pub completion_base_url: String,
    /// Model identifier sent with every completion request.
    pub completion_model: String,
    /// Origin allowed by the CORS layer.
    pub allowed_origin: AllowedOrigin,
    /// Optional directory holding the built frontend, served as a fallback.
    pub frontend_dist_dir: Option<String>,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Path of the log file, from `DOCUMIND_LOG_FILE`.
    pub log_file: String,
}

/// Cross-origin policy derived from `FRONTEND_URL`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedOrigin {
    /// `*` or unset: any origin, without credentials.
    Any,
    /// A single origin, with credentials allowed.
    Exact(HeaderValue),
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            completion_api_key: load_env_optional("GROQ_API_KEY"),
            completion_base_url: load_env_optional("COMPLETION_BASE_URL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_BASE_URL.to_string()),
            completion_model: load_env_optional("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            allowed_origin: load_env_optional("FRONTEND_URL")
                .map(|value| value.parse())
                .transpose()?
                .unwrap_or(AllowedOrigin::Any),
            frontend_dist_dir: load_env_optional("FRONTEND_DIST_DIR"),
            max_upload_bytes: load_env_optional("MAX_UPLOAD_BYTES")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("MAX_UPLOAD_BYTES".into()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            server_port: load_env_optional("SERVER_PORT")
                .or_else(|| load_env_optional("PORT"))
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            log_file: load_env_optional("DOCUMIND_LOG_FILE")
                .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        })
    }

    /// Whether a completion API key is available.
    pub fn has_api_key(&self) -> bool {
        self.completion_api_key.is_some()
    }
}

impl std::str::FromStr for AllowedOrigin {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed == "*" {
            return Ok(Self::Any);
        }
        HeaderValue::from_str(trimmed)
            .map(Self::Exact)
            .map_err(|_| ConfigError::InvalidValue("FRONTEND_URL".into()))
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        base_url = %config.completion_base_url,
        model = %config.completion_model,
        allowed_origin = ?config.allowed_origin,
        server_port = ?config.server_port,
        max_upload_bytes = config.max_upload_bytes,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
