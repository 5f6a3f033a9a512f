//! Server configuration types.
//!
//! Every knob has a serde default so an empty (or absent) TOML file yields
//! a runnable configuration:
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8064
//!
//! [canvas]
//! id_generation_attempts = 10
//!
//! [sse]
//! keep_alive_secs = 5
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable naming the config file to load.
pub const CONFIG_PATH_ENV: &str = "PIXELBOARD_CONFIG";

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Canvas domain settings.
    #[serde(default)]
    pub canvas: CanvasConfig,
    /// SSE stream settings.
    #[serde(default)]
    pub sse: SseConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load the file named by `PIXELBOARD_CONFIG`, or fall back to defaults.
    pub fn load_from_env() -> Result<Self> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => Ok(Self::default()),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Canvas domain settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Bound for the image-ID generation retry loop.
    #[serde(default = "default_id_generation_attempts")]
    pub id_generation_attempts: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            id_generation_attempts: default_id_generation_attempts(),
        }
    }
}

/// SSE stream settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SseConfig {
    /// Seconds between keepalive comment frames.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
}

impl Default for SseConfig {
    fn default() -> Self {
        Self {
            keep_alive_secs: default_keep_alive_secs(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8064
}

fn default_id_generation_attempts() -> u32 {
    pixelboard_canvas::DEFAULT_ID_GENERATION_ATTEMPTS
}

fn default_keep_alive_secs() -> u64 {
    5
}
