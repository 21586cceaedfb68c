// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Intake Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub llm: LLMConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:5000")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Enable CORS (any origin, method and header)
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct LLMConfig {
    /// Gemini API key. Required: the server refuses to start without it.
    pub gemini_api_key: Option<String>,

    /// Base URL of the generative-language API
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Model used for `generateContent`
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,

    /// Upper bound on a single upstream call, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

// Keep the credential out of startup logs
impl std::fmt::Debug for LLMConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LLMConfig")
            .field(
                "gemini_api_key",
                &self.gemini_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("gemini_base_url", &self.gemini_base_url)
            .field("gemini_model", &self.gemini_model)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_enable_cors() -> bool {
    true
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-pro".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_base_url: default_gemini_base_url(),
            gemini_model: default_gemini_model(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl LLMConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from environment variables
    ///
    /// Supported environment variables:
    /// - INTAKE_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:5000)
    /// - INTAKE_ENABLE_CORS: Enable CORS (default: true)
    /// - GEMINI_API_KEY: Gemini API key (required)
    /// - GEMINI_BASE_URL: API base URL (default: https://generativelanguage.googleapis.com/v1beta)
    /// - GEMINI_MODEL: Model name (default: gemini-pro)
    /// - GEMINI_TIMEOUT_SECS: Upstream request timeout in seconds (default: 30)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("INTAKE_HTTP_ADDR") {
            config.server.listen_addr = addr;
        }

        if let Ok(cors) = std::env::var("INTAKE_ENABLE_CORS") {
            config.server.enable_cors = cors.parse().unwrap_or(true);
        }

        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            config.llm.gemini_api_key = Some(key);
        }

        if let Ok(base_url) = std::env::var("GEMINI_BASE_URL") {
            config.llm.gemini_base_url = base_url;
        }

        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            config.llm.gemini_model = model;
        }

        if let Ok(timeout) = std::env::var("GEMINI_TIMEOUT_SECS") {
            if let Ok(val) = timeout.parse() {
                config.llm.request_timeout_secs = val;
            }
        }

        config
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        Ok(Self::merge_with_env(config))
    }

    /// Merge config with environment variables (env takes priority)
    fn merge_with_env(mut config: Self) -> Self {
        let env_config = Self::from_env();

        // Only override if env var was explicitly set
        if std::env::var("INTAKE_HTTP_ADDR").is_ok() {
            config.server.listen_addr = env_config.server.listen_addr;
        }
        if std::env::var("INTAKE_ENABLE_CORS").is_ok() {
            config.server.enable_cors = env_config.server.enable_cors;
        }
        if std::env::var("GEMINI_API_KEY").is_ok() {
            config.llm.gemini_api_key = env_config.llm.gemini_api_key;
        }
        if std::env::var("GEMINI_BASE_URL").is_ok() {
            config.llm.gemini_base_url = env_config.llm.gemini_base_url;
        }
        if std::env::var("GEMINI_MODEL").is_ok() {
            config.llm.gemini_model = env_config.llm.gemini_model;
        }
        if std::env::var("GEMINI_TIMEOUT_SECS").is_ok() {
            config.llm.request_timeout_secs = env_config.llm.request_timeout_secs;
        }

        config
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// The configured API key, or an error if it is missing or blank
    pub fn gemini_api_key(&self) -> Result<&str> {
        match self.llm.gemini_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(key),
            _ => anyhow::bail!("GEMINI_API_KEY not set in environment variables"),
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        self.gemini_api_key()?;

        if self.llm.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }

        Ok(())
    }
}
