// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::app_info::APP_DIR_NAME;
use crate::constants::device::DEFAULT_USB_IP;
use crate::constants::limits::RAW_NATIVE_DIMENSION;
use crate::constants::timing::{DEFAULT_RETRY_DELAY_MS, DEFAULT_RPC_TIMEOUT_MS};
use crate::constants::DEFAULT_LOG_CAPACITY;
use crate::errors::{AppError, AppResult};
use crate::ui::{DemosaicFilter, ImageConfig, PixelFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Name of the config file inside the app config directory
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address of the board's JSON-RPC server
    pub host_ip: String,
    /// Directory the host writes frames to
    pub frame_dir: PathBuf,
    /// Log console scrollback, in entries
    pub log_capacity: usize,
    /// Pause after a failed frame request
    pub retry_delay_ms: u64,
    /// HTTP timeout for device requests
    pub rpc_timeout_ms: u64,
    /// Start the video feed as soon as the UI is up
    pub autostart: bool,
    /// Initial values of the settings form
    pub form: ImageConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host_ip: DEFAULT_USB_IP.to_string(),
            frame_dir: default_cache_dir(),
            log_capacity: DEFAULT_LOG_CAPACITY,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            rpc_timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
            autostart: true,
            form: ImageConfig {
                rotation: 0,
                format: PixelFormat::Rgb,
                width: RAW_NATIVE_DIMENSION,
                height: RAW_NATIVE_DIMENSION,
                filter: DemosaicFilter::Bilinear,
                awb: true,
            },
        }
    }
}

impl Config {
    /// Load the config from `path`, or from the default location
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()
                .ok_or_else(|| AppError::Config("No config directory on this platform".to_string()))?,
        };

        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// `<config_dir>/camera-streaming/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_millis(self.rpc_timeout_ms)
    }
}

/// `<cache_dir>/camera-streaming`, falling back to the temp directory
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}
