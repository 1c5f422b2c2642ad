use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use thiserror::Error;
use tracing::{debug, info};

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_CONFIG_PATH: &str = "config/davenport.toml";
const DEFAULT_CATALOG_PATH: &str = "data/catalog.json";
const DEFAULT_CHECKPOINT_DIR: &str = "data/checkpoints";
const DEFAULT_BIND: &str = "127.0.0.1:5000";

static ENV_LOADER: Once = Once::new();

/// Loads `.env` once so API keys can live outside the config file.
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = dotenvy::dotenv();
    });
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub embedding_model: String,
    pub endpoint: String,
    /// Optional; when absent the Gemini client falls back to GEMINI_API_KEY.
    pub api_key: Option<String>,
    pub catalog_path: PathBuf,
    pub checkpoint_dir: PathBuf,
    pub max_turns: usize,
    pub retry_attempts: u32,
    pub rest_server: RestServerConfig,
}

#[derive(Debug, Clone)]
pub struct RestServerConfig {
    pub bind: String,
    pub cors_origins: Vec<String>,
}

impl Default for RestServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Deserialize, Default)]
struct RawConfig {
    model: Option<String>,
    embedding_model: Option<String>,
    endpoint: Option<String>,
    api_key: Option<String>,
    catalog_path: Option<PathBuf>,
    checkpoint_dir: Option<PathBuf>,
    max_turns: Option<usize>,
    retry_attempts: Option<u32>,
    #[serde(default)]
    rest_server: RawRestServer,
}

#[derive(Debug, Deserialize, Default)]
struct RawRestServer {
    bind: Option<String>,
    cors_origins: Option<Vec<String>>,
}

impl AppConfig {
    /// Load from `path`, or from the default path with a fallback to
    /// defaults when the default file does not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        ensure_env_loaded();
        if let Some(path) = path {
            return read_config(path);
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        match read_config(default_path) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("Configuration file not found; using defaults");
                Ok(Self::default())
            }
            Err(other) => Err(other),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parsed.into())
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            model: raw.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            embedding_model: raw
                .embedding_model
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            endpoint: raw.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            api_key: raw.api_key.filter(|key| !key.trim().is_empty()),
            catalog_path: raw
                .catalog_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
            checkpoint_dir: raw
                .checkpoint_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHECKPOINT_DIR)),
            max_turns: raw.max_turns.unwrap_or(crate::agent::DEFAULT_MAX_TURNS),
            retry_attempts: raw.retry_attempts.unwrap_or(3),
            rest_server: RestServerConfig {
                bind: raw
                    .rest_server
                    .bind
                    .unwrap_or_else(|| DEFAULT_BIND.to_string()),
                cors_origins: raw
                    .rest_server
                    .cors_origins
                    .unwrap_or_else(|| RestServerConfig::default().cors_origins),
            },
        }
    }
}
