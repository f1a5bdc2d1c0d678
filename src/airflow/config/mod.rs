use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs::{config_dir, home_dir};
use log::info;
use serde::{Deserialize, Serialize};

use crate::airflow::error::AdapterError;

/// Expands environment variables in a string value.
/// Supports ${VAR} and $VAR syntax.
pub fn expand_env_vars(value: &str) -> Result<String, AdapterError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| AdapterError::Config {
            message: format!("failed to expand environment variable in '{value}': {e}"),
        })
}

/// Default location of the configuration file (`~/.config/airflow-bridge/config.toml`).
pub fn default_config_path() -> PathBuf {
    config_dir()
        .or_else(|| home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("airflow-bridge")
        .join("config.toml")
}

/// Major Airflow release line. `V2` servers speak REST API v1 (legacy),
/// `V3` servers speak REST API v2 (current).
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirflowVersion {
    V2,
    V3,
}

impl AirflowVersion {
    pub fn api_path(self) -> &'static str {
        match self {
            AirflowVersion::V2 => "api/v1",
            AirflowVersion::V3 => "api/v2",
        }
    }

    pub fn major(self) -> u8 {
        match self {
            AirflowVersion::V2 => 2,
            AirflowVersion::V3 => 3,
        }
    }

    pub fn from_major(major: u64) -> Option<Self> {
        match major {
            2 => Some(AirflowVersion::V2),
            3 => Some(AirflowVersion::V3),
            _ => None,
        }
    }
}

impl Display for AirflowVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Airflow {} (REST {})", self.major(), self.api_path())
    }
}

#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &"***redacted***")
            .finish()
    }
}

/// Credential capability of a server: exactly one mode is active.
#[derive(Clone, PartialEq)]
pub enum Credentials {
    /// Pre-issued bearer token.
    Token(String),
    /// Username/password, used for basic auth or token exchange.
    Basic(BasicAuth),
    /// Nothing configured; token exchange is attempted without credentials.
    Anonymous,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(***redacted***)"),
            Credentials::Basic(auth) => write!(f, "Basic({auth:?})"),
            Credentials::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// One Airflow server target.
#[derive(Deserialize, Serialize, Clone, PartialEq)]
pub struct AirflowConfig {
    pub name: String,
    pub endpoint: String,
    /// Forces an API generation and skips version detection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<AirflowVersion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl std::fmt::Debug for AirflowConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirflowConfig")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("version", &self.version)
            .field("proxy", &self.proxy)
            .field("token", &self.token.as_ref().map(|_| "***redacted***"))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***redacted***"))
            .finish()
    }
}

impl AirflowConfig {
    pub fn new(name: &str, endpoint: &str) -> Self {
        Self {
            name: name.to_string(),
            endpoint: endpoint.to_string(),
            version: None,
            proxy: None,
            token: None,
            username: None,
            password: None,
        }
    }

    /// Builds a target from `AIRFLOW_BASE_URL`, `AIRFLOW_TOKEN`,
    /// `AIRFLOW_USERNAME` and `AIRFLOW_PASSWORD`.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("AIRFLOW_BASE_URL").ok()?;
        let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
        Some(Self {
            token: non_empty("AIRFLOW_TOKEN"),
            username: non_empty("AIRFLOW_USERNAME"),
            password: non_empty("AIRFLOW_PASSWORD"),
            ..Self::new("env", &endpoint)
        })
    }

    pub fn resolved_endpoint(&self) -> Result<String, AdapterError> {
        expand_env_vars(self.endpoint.trim())
    }

    pub fn resolved_proxy(&self) -> Result<Option<String>, AdapterError> {
        self.proxy.as_deref().map(expand_env_vars).transpose()
    }

    /// Resolves the active credential mode. A static token wins over a
    /// username/password pair; a username without a password is rejected.
    pub fn credentials(&self) -> Result<Credentials, AdapterError> {
        if let Some(token) = &self.token {
            let token = expand_env_vars(token.trim())?;
            if !token.is_empty() {
                return Ok(Credentials::Token(token));
            }
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Ok(Credentials::Basic(BasicAuth {
                username: expand_env_vars(username)?,
                password: expand_env_vars(password)?,
            })),
            (Some(_), None) | (None, Some(_)) => Err(AdapterError::Config {
                message: format!(
                    "server '{}' needs both username and password, or neither",
                    self.name
                ),
            }),
            (None, None) => Ok(Credentials::Anonymous),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct BridgeConfig {
    pub servers: Option<Vec<AirflowConfig>>,
    pub active_server: Option<String>,
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl BridgeConfig {
    pub fn from_file(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path.map_or_else(
            || {
                let default_path = default_config_path();
                info!("Using configuration path: {}", default_path.display());
                default_path
            },
            Path::to_path_buf,
        );

        // A missing default file is an empty config, an explicit one must exist
        let toml_config = if path.exists() {
            std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?
        } else if config_path.is_some() {
            anyhow::bail!("Config file {} does not exist", path.display());
        } else {
            String::new()
        };
        let mut config = Self::from_str(&toml_config)?;
        config.path = Some(path);
        Ok(config)
    }

    pub fn from_str(config: &str) -> Result<Self> {
        let config: BridgeConfig = toml::from_str(config).context("Failed to parse config")?;
        let num_servers = config.servers.as_ref().map_or(0, Vec::len);
        info!("Loaded config: servers={num_servers}");
        Ok(config)
    }

    /// Picks the named server, else the active one, else the first one, else
    /// falls back to the `AIRFLOW_*` environment variables.
    pub fn select_server(&self, name: Option<&str>) -> Result<AirflowConfig> {
        let servers = self.servers.as_deref().unwrap_or_default();
        if let Some(name) = name.or(self.active_server.as_deref()) {
            return servers
                .iter()
                .find(|s| s.name == name)
                .cloned()
                .with_context(|| format!("No server named '{name}' in config"));
        }
        if let Some(server) = servers.first() {
            return Ok(server.clone());
        }
        AirflowConfig::from_env()
            .context("No server configured: add one to the config file or set AIRFLOW_BASE_URL")
    }
}
