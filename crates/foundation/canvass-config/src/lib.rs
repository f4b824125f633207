//! # Canvass Config
//!
//! Configuration is resolved in three layers, later layers winning:
//!
//! ```text
//!   built-in defaults
//!        ▼
//!   YAML file   (--config <path>, else ~/.config/canvass/config.yaml if present)
//!        ▼
//!   environment (JWT_SECRET, MONGODB_URI, GOOGLE_AI_API_KEY, ...)
//! ```
//!
//! The result is checked once by [`Config::validate`] before the server starts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Result type for configuration loading
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    Env { key: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// ---------------------------------------------------------------
//  Sections
// ---------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Prefix every API route is nested under. Empty means the root.
    pub api_prefix: String,
    /// Allowed CORS origin.
    pub frontend_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            api_prefix: "/api".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Memory,
    Mongodb,
}

impl std::str::FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "mongodb" | "mongo" => Ok(Self::Mongodb),
            other => Err(format!("unknown database backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub uri: String,
    pub name: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Memory,
            uri: "mongodb://localhost:27017".to_string(),
            name: "canvass".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_secs: u64,
    pub cookie_name: String,
    /// `Secure` + `SameSite=None` for cross-site frontends over HTTPS.
    /// Off means `SameSite=Lax`.
    pub secure_cookie: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: 86_400,
            cookie_name: "auth_token".to_string(),
            secure_cookie: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Without a key the summary endpoint reports a generation failure.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// Most recent responses fed into one prompt.
    pub max_responses: u64,
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.0-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            max_responses: 100,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub ai: AiConfig,
}

// ---------------------------------------------------------------
//  Loading
// ---------------------------------------------------------------

impl Config {
    /// Default config file location (~/.config/canvass/config.yaml)
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("canvass")
            .join("config.yaml")
    }

    /// Load defaults, then the file, then the process environment.
    ///
    /// An explicit `path` must exist. The default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Self::default_path();
                if default.exists() {
                    Self::from_file(&default)?
                } else {
                    tracing::debug!(path = %default.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Apply environment overrides read through `lookup`. Blank values are
    /// ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("CANVASS_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = get("CANVASS_API_PREFIX") {
            self.server.api_prefix = v;
        }
        if let Some(v) = get("FRONTEND_URL") {
            self.server.frontend_url = v;
        }
        if let Some(v) = get("CANVASS_DB_BACKEND") {
            self.database.backend = v.parse().map_err(|_| env_error("CANVASS_DB_BACKEND", &v))?;
        }
        if let Some(v) = get("MONGODB_URI") {
            self.database.uri = v;
        }
        if let Some(v) = get("MONGODB_DATABASE") {
            self.database.name = v;
        }
        if let Some(v) = get("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = get("JWT_TTL_SECS") {
            self.auth.token_ttl_secs = v.trim().parse().map_err(|_| env_error("JWT_TTL_SECS", &v))?;
        }
        if let Some(v) = get("COOKIE_SECURE") {
            self.auth.secure_cookie = parse_bool(&v).ok_or_else(|| env_error("COOKIE_SECURE", &v))?;
        }
        if let Some(v) = get("GOOGLE_AI_API_KEY") {
            self.ai.api_key = Some(v);
        }
        if let Some(v) = get("GOOGLE_AI_MODEL") {
            self.ai.model = v;
        }
        Ok(())
    }

    /// Reject configurations the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "auth.jwt_secret is required (set JWT_SECRET)".to_string(),
            ));
        }
        if self.auth.token_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "auth.token_ttl_secs must be greater than 0".to_string(),
            ));
        }
        let prefix = &self.server.api_prefix;
        if !prefix.is_empty() && !prefix.starts_with('/') {
            return Err(ConfigError::Invalid(format!(
                "server.api_prefix must start with '/': {prefix}"
            )));
        }
        if self.ai.max_responses == 0 {
            return Err(ConfigError::Invalid(
                "ai.max_responses must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// API prefix without a trailing slash; "/" collapses to empty.
    pub fn api_prefix(&self) -> &str {
        self.server.api_prefix.trim_end_matches('/')
    }
}

fn env_error(key: &str, value: &str) -> ConfigError {
    ConfigError::Env {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
