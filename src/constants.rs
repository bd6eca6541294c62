// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

/// Window layout constants, in pixels
pub mod layout {
    /// Height of the title container above the video feed
    pub const TITLE_CONTAINER_HEIGHT: u32 = 45;

    /// Height of the log console below the video feed
    pub const LOG_CONSOLE_HEIGHT: u32 = 150;

    /// Height of the settings panel when it is shown
    pub const SETTING_MENU_HEIGHT: u32 = 100;

    /// Fixed window width
    pub const WINDOW_WIDTH: u32 = 1005;

    /// Padding and borders not covered by the other sections
    pub const WINDOW_CHROME_EXTRA: u32 = 35;

    /// Window height before the first frame arrives
    pub const INITIAL_WINDOW_HEIGHT: u32 = 900;
}

/// Terminal cell size used to map pixel geometry onto the terminal grid
pub mod cells {
    /// Pixels per terminal column
    pub const CELL_WIDTH_PX: u32 = 8;

    /// Pixels per terminal row
    pub const CELL_HEIGHT_PX: u32 = 16;
}

/// Image request limits
pub mod limits {
    /// Smallest width/height the device accepts
    pub const MIN_DIMENSION: i64 = 1;

    /// Largest width/height the device accepts
    pub const MAX_DIMENSION: i64 = 1000;

    /// RAW frames are only available at the sensor's native resolution
    pub const RAW_NATIVE_DIMENSION: u32 = 324;

    /// Rotations offered by the rotation selector
    pub const ROTATIONS: [i32; 4] = [0, 90, 180, 270];
}

/// Device connection constants
pub mod device {
    /// Address the board exposes over USB networking
    pub const DEFAULT_USB_IP: &str = "10.10.10.1";

    /// HTTP port of the JSON-RPC server
    pub const RPC_PORT: u16 = 80;

    /// Path of the JSON-RPC endpoint
    pub const RPC_PATH: &str = "/jsonrpc";

    /// Default attempts for `wifi_connect`
    pub const WIFI_CONNECT_RETRIES: u32 = 5;
}

/// Frame exchange between host and UI
pub mod frames {
    /// File name the host writes each frame to, relative to the frame directory
    pub const FRAME_FILE_NAME: &str = "img_data.jpg";

    /// Scratch name used while a frame is being written
    pub const FRAME_TEMP_FILE_NAME: &str = ".img_data.jpg.part";

    /// JPEG quality of saved frames
    pub const JPEG_QUALITY: u8 = 90;
}

/// Timing constants
pub mod timing {
    /// Terminal input poll interval (~60 fps redraw)
    pub const INPUT_POLL_MS: u64 = 16;

    /// Default pause after a failed frame request
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

    /// Default HTTP timeout for device requests
    pub const DEFAULT_RPC_TIMEOUT_MS: u64 = 5000;
}

/// Default number of log console entries kept
pub const DEFAULT_LOG_CAPACITY: usize = 1000;

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }

    /// Directory name used under the platform config/cache directories
    pub const APP_DIR_NAME: &str = "camera-streaming";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_dimension_within_limits() {
        let raw = limits::RAW_NATIVE_DIMENSION as i64;
        assert!(raw >= limits::MIN_DIMENSION && raw <= limits::MAX_DIMENSION);
    }

    #[test]
    fn test_window_fits_max_frame_width() {
        assert!(layout::WINDOW_WIDTH as i64 >= limits::MAX_DIMENSION);
    }
}
