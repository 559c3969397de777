//! On-disk configuration: snapshot ring-buffer depth, CDP timeouts, batch
//! sizes. Load/init/save are kept distinct so a failed parse never
//! silently overwrites a config file a human may be mid-edit on.

use crate::error::{CharlotteError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default ring-buffer depth.
pub const DEFAULT_SNAPSHOT_DEPTH: u16 = 50;
pub const MIN_SNAPSHOT_DEPTH: u16 = 5;
pub const MAX_SNAPSHOT_DEPTH: u16 = 500;

/// Default bound on in-flight `DOM.getBoxModel` requests per batch.
pub const DEFAULT_LAYOUT_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Ring-buffer capacity, clamped to [5, 500] on load and on `set_depth`.
    #[serde(default = "default_snapshot_depth")]
    pub snapshot_depth: u16,

    /// `DOM.getBoxModel` in-flight batch size.
    #[serde(default = "default_layout_batch_size")]
    pub layout_batch_size: usize,

    /// Deadline for the initial WebSocket handshake against the driver.
    #[serde(default = "default_connect_timeout_ms")]
    pub cdp_connect_timeout_ms: u64,

    /// Deadline for an individual CDP request/response round-trip.
    #[serde(default = "default_request_timeout_ms")]
    pub cdp_request_timeout_ms: u64,

    /// Host the browser driver's HTTP/WebSocket endpoint listens on.
    #[serde(default = "default_driver_host")]
    pub driver_host: String,

    /// Port the browser driver's HTTP/WebSocket endpoint listens on.
    #[serde(default = "default_driver_port")]
    pub driver_port: u16,
}

fn default_snapshot_depth() -> u16 {
    DEFAULT_SNAPSHOT_DEPTH
}
fn default_layout_batch_size() -> usize {
    DEFAULT_LAYOUT_BATCH_SIZE
}
fn default_connect_timeout_ms() -> u64 {
    15_000
}
fn default_request_timeout_ms() -> u64 {
    10_000
}
fn default_driver_host() -> String {
    "127.0.0.1".to_string()
}
fn default_driver_port() -> u16 {
    9222
}

impl Default for Config {
    fn default() -> Self {
        Self {
            snapshot_depth: default_snapshot_depth(),
            layout_batch_size: default_layout_batch_size(),
            cdp_connect_timeout_ms: default_connect_timeout_ms(),
            cdp_request_timeout_ms: default_request_timeout_ms(),
            driver_host: default_driver_host(),
            driver_port: default_driver_port(),
        }
    }
}

impl Config {
    /// Clamp `snapshot_depth` into the supported [5, 500] range.
    pub fn clamped_snapshot_depth(&self) -> u16 {
        self.snapshot_depth.clamp(MIN_SNAPSHOT_DEPTH, MAX_SNAPSHOT_DEPTH)
    }
}

/// Platform config file location.
pub fn config_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .map(|p| p.join("charlotte"))
        .unwrap_or_else(|| PathBuf::from("."));
    config_dir.join("config.toml")
}

/// Load configuration from disk, creating a default file if none exists.
/// Parse failures are logged and fall back to in-memory defaults rather
/// than overwriting a file a human may be mid-edit on.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if !path.exists() {
        tracing::info!("config file not found at {:?}, creating default", path);
        return init_config();
    }

    let content = std::fs::read_to_string(&path).map_err(|e| {
        CharlotteError::Config(format!("failed to read config from {:?}: {}", path, e))
    })?;

    match toml::from_str(&content) {
        Ok(config) => {
            tracing::info!("loaded config from {:?}", path);
            Ok(config)
        }
        Err(e) => {
            tracing::warn!(
                "failed to parse config at {:?} ({}); using in-memory defaults",
                path,
                e
            );
            Ok(Config::default())
        }
    }
}

/// Write configuration to disk.
pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)?;
    tracing::info!("saved config to {:?}", path);
    Ok(())
}

fn init_config() -> Result<Config> {
    let config = Config::default();
    save_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let config = Config::default();
        assert_eq!(config.snapshot_depth, DEFAULT_SNAPSHOT_DEPTH);
        assert_eq!(config.clamped_snapshot_depth(), DEFAULT_SNAPSHOT_DEPTH);
    }

    #[test]
    fn clamp_out_of_range_depth() {
        let mut config = Config::default();
        config.snapshot_depth = 1;
        assert_eq!(config.clamped_snapshot_depth(), MIN_SNAPSHOT_DEPTH);
        config.snapshot_depth = 10_000;
        assert_eq!(config.clamped_snapshot_depth(), MAX_SNAPSHOT_DEPTH);
    }

    #[test]
    fn config_path_ends_with_expected_file() {
        assert!(config_path().ends_with("config.toml"));
    }
}
