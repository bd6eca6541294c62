// SPDX-License-Identifier: MPL-2.0

//! Camera Streaming - a control panel for streaming frames from a Dev Board Micro
//!
//! The board runs a JSON-RPC camera server. A streaming host polls it for
//! frames using the settings currently entered in the control panel, and
//! pushes each frame and any log output back to the panel.
//!
//! # Architecture
//!
//! - [`ui`]: control panel state and its bridge-facing operations
//! - [`bridge`]: the call/callback contracts between panel and host
//! - [`host`]: device RPC client, frame decoding and the video feed loop
//! - [`terminal`]: ratatui front end for the panel
//! - [`config`]: user configuration handling

pub mod bridge;
pub mod config;
pub mod constants;
pub mod errors;
pub mod host;
pub mod terminal;
pub mod ui;

// Re-export commonly used types
pub use bridge::{HostCalls, UiCall, UiHandle, UiHandlers, UiInbox, ui_channel};
pub use config::Config;
pub use errors::{AppError, AppResult, RpcError};
pub use ui::{ControlPanel, DemosaicFilter, ImageConfig, PixelFormat, WindowSize};
