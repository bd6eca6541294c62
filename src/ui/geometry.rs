// SPDX-License-Identifier: GPL-3.0-only

//! Window geometry derived from the displayed frame

use crate::constants::layout::{
    INITIAL_WINDOW_HEIGHT, LOG_CONSOLE_HEIGHT, SETTING_MENU_HEIGHT, TITLE_CONTAINER_HEIGHT,
    WINDOW_CHROME_EXTRA, WINDOW_WIDTH,
};

/// Window size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH,
            height: INITIAL_WINDOW_HEIGHT,
        }
    }
}

/// Window size that fits an image of `image_height` plus the UI chrome
pub fn window_geometry(image_height: u32, settings_visible: bool) -> WindowSize {
    let mut height = image_height
        .saturating_add(TITLE_CONTAINER_HEIGHT + LOG_CONSOLE_HEIGHT + WINDOW_CHROME_EXTRA);
    if settings_visible {
        height = height.saturating_add(SETTING_MENU_HEIGHT);
    }
    WindowSize {
        width: WINDOW_WIDTH,
        height,
    }
}
