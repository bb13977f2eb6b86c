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
use pagestats_core::StatisticsConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Pagestats Server Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub statistics: StatisticsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:8080")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

/// Which event store implementation to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            other => anyhow::bail!("Unknown storage backend '{}' (expected memory or file)", other),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory holding the page-load log
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Upper bound for a single store call
    #[serde(default = "default_operation_timeout")]
    pub operation_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DirectoryConfig {
    /// Base URL of the user service; `user/me` is resolved against it
    #[serde(default = "default_directory_url")]
    pub base_url: String,

    /// Tag marking a user as admin
    #[serde(default = "default_admin_tag")]
    pub admin_tag: String,

    #[serde(default = "default_directory_timeout")]
    pub timeout_secs: u64,

    /// Fixed admin ids; when non-empty the user service is not contacted
    #[serde(default)]
    pub static_admins: Vec<String>,
}

fn default_http_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_enable_cors() -> bool {
    true
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./pagestats-data")
}

fn default_operation_timeout() -> u64 {
    10
}

fn default_directory_url() -> String {
    "https://gapi.kt.academy/".to_string()
}

fn default_admin_tag() -> String {
    "ADMIN".to_string()
}

fn default_directory_timeout() -> u64 {
    60
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            request_timeout_secs: default_request_timeout(),
            enable_cors: default_enable_cors(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
            operation_timeout_secs: default_operation_timeout(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_url(),
            admin_tag: default_admin_tag(),
            timeout_secs: default_directory_timeout(),
            static_admins: Vec::new(),
        }
    }
}

impl StorageConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl ServerConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variables on top of `self`
    ///
    /// Supported environment variables:
    /// - PAGESTATS_HTTP_ADDR: HTTP listen address (default: 127.0.0.1:8080)
    /// - PAGESTATS_DATA_DIR: Data directory path (default: ./pagestats-data)
    /// - PAGESTATS_STORAGE_BACKEND: `memory` or `file` (default: file)
    /// - PAGESTATS_DIRECTORY_URL: User service base URL
    /// - PAGESTATS_ADMIN_TAG: Tag granting admin rights (default: ADMIN)
    /// - PAGESTATS_STATIC_ADMINS: Comma-separated admin user ids
    /// - PAGESTATS_ARTICLE_PATTERN: Regex selecting article page keys
    pub fn apply_env(mut self) -> Result<Self> {
        if let Ok(addr) = std::env::var("PAGESTATS_HTTP_ADDR") {
            self.server.listen_addr = addr;
        }

        if let Ok(data_dir) = std::env::var("PAGESTATS_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(backend) = std::env::var("PAGESTATS_STORAGE_BACKEND") {
            self.storage.backend = backend.parse()?;
        }

        if let Ok(url) = std::env::var("PAGESTATS_DIRECTORY_URL") {
            self.directory.base_url = url;
        }

        if let Ok(tag) = std::env::var("PAGESTATS_ADMIN_TAG") {
            self.directory.admin_tag = tag;
        }

        if let Ok(admins) = std::env::var("PAGESTATS_STATIC_ADMINS") {
            self.directory.static_admins = parse_list(&admins);
        }

        if let Ok(pattern) = std::env::var("PAGESTATS_ARTICLE_PATTERN") {
            self.statistics.article_pattern = pattern;
        }

        Ok(self)
    }

    /// Load configuration: defaults, then the TOML file, then environment variables
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

        config.apply_env()
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;
        self.statistics.validate()?;

        if self.directory.static_admins.is_empty() && self.directory.base_url.trim().is_empty() {
            anyhow::bail!("No user directory configured: set directory.base_url or directory.static_admins");
        }

        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be greater than 0");
        }

        if self.storage.operation_timeout_secs == 0 {
            anyhow::bail!("storage.operation_timeout_secs must be greater than 0");
        }

        // The file backend needs a writable data directory
        if self.storage.backend == StorageBackend::File && !self.storage.data_dir.exists() {
            std::fs::create_dir_all(&self.storage.data_dir)?;
        }

        Ok(())
    }
}
