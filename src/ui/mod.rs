// SPDX-License-Identifier: GPL-3.0-only

//! Camera control panel
//!
//! The panel owns the state of every element the streaming host can reach
//! through the bridge: the video feed, the log console, the settings menu and
//! the settings form. All mutation happens on the UI thread, either from key
//! handling or from a queued [`UiCall`](crate::bridge::UiCall).

pub mod form;
pub mod geometry;
pub mod image_config;
pub mod log_console;

pub use form::{FormField, FormState};
pub use geometry::{WindowSize, window_geometry};
pub use image_config::{DemosaicFilter, ImageConfig, PixelFormat};
pub use log_console::LogConsole;

use crate::bridge::{HostCalls, UiCall};
use crate::constants::limits::{MAX_DIMENSION, MIN_DIMENSION, RAW_NATIVE_DIMENSION};
use tracing::{debug, info, warn};

/// The `video-feed` element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFeed {
    /// Image source relative to the frame directory
    pub src: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Bumped on every frame update so renderers know to reload `src`
    pub generation: u64,
}

/// Menu button whose "change" class mirrors the settings menu state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuButton {
    change: bool,
}

impl MenuButton {
    /// Toggle the "change" class, returning whether it is now set
    pub fn toggle_class(&mut self) -> bool {
        self.change = !self.change;
        self.change
    }

    pub fn has_class(&self) -> bool {
        self.change
    }
}

/// Display style of the `setting-menu` element
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Display {
    Shown,
    #[default]
    Hidden,
}

/// Camera control panel state
#[derive(Debug, Clone)]
pub struct ControlPanel {
    pub form: FormState,
    video_feed: VideoFeed,
    log_console: LogConsole,
    menu_button: MenuButton,
    setting_menu: Display,
    window: WindowSize,
}

impl ControlPanel {
    pub fn new(form_defaults: &ImageConfig, log_capacity: usize) -> Self {
        Self {
            form: FormState::from_defaults(form_defaults),
            video_feed: VideoFeed::default(),
            log_console: LogConsole::new(log_capacity),
            menu_button: MenuButton::default(),
            setting_menu: Display::default(),
            window: WindowSize::default(),
        }
    }

    /// Ask the host to begin streaming frames
    pub fn start_video_feed<H: HostCalls + ?Sized>(&self, host: &H) {
        info!("Starting video feed");
        host.video_feed();
    }

    /// Flip the menu button's state and show/hide the settings menu to match
    ///
    /// Returns whether the menu is now shown.
    pub fn toggle_setting_menu(&mut self) -> bool {
        let show = self.menu_button.toggle_class();
        self.setting_menu = if show { Display::Shown } else { Display::Hidden };
        debug!(visible = show, "Setting menu toggled");
        show
    }

    /// Show a new frame and resize the window to fit it
    pub fn update_image_src(&mut self, img_src: &str, img_width: u32, img_height: u32) -> WindowSize {
        self.video_feed.src = Some(img_src.to_string());
        self.video_feed.width = img_width;
        self.video_feed.height = img_height;
        self.video_feed.generation = self.video_feed.generation.wrapping_add(1);

        self.window = window_geometry(img_height, self.is_setting_menu_visible());
        debug!(
            src = img_src,
            width = img_width,
            height = img_height,
            window_height = self.window.height,
            "Frame updated"
        );
        self.window
    }

    /// Append a line to the log console and scroll it to the bottom
    pub fn update_log(&mut self, msg: &str) {
        self.log_console.append(msg);
    }

    /// Collect the settings form into a validated [`ImageConfig`]
    ///
    /// Width and height are clamped to [1, 1000]; each clamp is reported on
    /// the log console. RAW frames only exist at the sensor's native size, so
    /// selecting RAW forces 324x324 at 0° and writes those values back into
    /// the form.
    pub fn get_image_config(&mut self) -> ImageConfig {
        let format = self.form.format_selector;
        let filter = self.form.filter_selector;
        let awb = self.form.auto_white_balance;

        if format == PixelFormat::Raw {
            self.form.image_width = RAW_NATIVE_DIMENSION.to_string();
            self.form.image_height = RAW_NATIVE_DIMENSION.to_string();
            self.form.rotation_selector = 0;
            return ImageConfig {
                rotation: 0,
                format,
                width: RAW_NATIVE_DIMENSION,
                height: RAW_NATIVE_DIMENSION,
                filter,
                awb,
            };
        }

        let rotation = self.form.rotation_selector;
        let width_input = self.form.image_width.clone();
        let width = self.clamp_dimension("Width", &width_input);
        let height_input = self.form.image_height.clone();
        let height = self.clamp_dimension("Height", &height_input);

        ImageConfig {
            rotation,
            format,
            width,
            height,
            filter,
            awb,
        }
    }

    /// Apply one queued bridge call
    pub fn dispatch(&mut self, call: UiCall) {
        match call {
            UiCall::UpdateImageSrc {
                img_src,
                img_width,
                img_height,
            } => {
                self.update_image_src(&img_src, img_width, img_height);
            }
            UiCall::UpdateLog(msg) => self.update_log(&msg),
            UiCall::GetImageConfig(reply) => {
                let config = self.get_image_config();
                if reply.send(config).is_err() {
                    debug!("Image config requester went away");
                }
            }
        }
    }

    fn clamp_dimension(&mut self, name: &str, input: &str) -> u32 {
        match parse_dimension(input) {
            Dimension::InRange(value) => value,
            Dimension::TooSmall => {
                warn!(field = name, input, "Dimension below minimum");
                self.update_log(&format!("ERROR: {} must be at least {}", name, MIN_DIMENSION));
                MIN_DIMENSION as u32
            }
            Dimension::TooLarge => {
                warn!(field = name, input, "Dimension above maximum");
                self.update_log(&format!("ERROR: {} must be less than {}", name, MAX_DIMENSION));
                MAX_DIMENSION as u32
            }
        }
    }

    pub fn is_setting_menu_visible(&self) -> bool {
        self.setting_menu == Display::Shown
    }

    pub fn setting_menu(&self) -> Display {
        self.setting_menu
    }

    pub fn menu_button(&self) -> MenuButton {
        self.menu_button
    }

    pub fn video_feed(&self) -> &VideoFeed {
        &self.video_feed
    }

    pub fn log_console(&self) -> &LogConsole {
        &self.log_console
    }

    pub fn window(&self) -> WindowSize {
        self.window
    }
}

enum Dimension {
    InRange(u32),
    TooSmall,
    TooLarge,
}

/// Classify a width/height input
///
/// Empty, negative, zero and non-numeric input counts as too small; a digit
/// string too long to parse counts as too large.
fn parse_dimension(input: &str) -> Dimension {
    let input = input.trim();
    match input.parse::<i64>() {
        Ok(value) if value > MAX_DIMENSION => Dimension::TooLarge,
        Ok(value) if value >= MIN_DIMENSION => Dimension::InRange(value as u32),
        Ok(_) => Dimension::TooSmall,
        Err(_) if !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit()) => {
            Dimension::TooLarge
        }
        Err(_) => Dimension::TooSmall,
    }
}
