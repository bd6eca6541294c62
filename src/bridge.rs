// SPDX-License-Identifier: GPL-3.0-only

//! Call/callback bridge between the control panel and the streaming host
//!
//! Two disjoint contracts:
//! - [`UiHandlers`]: calls the host makes into the UI (frame pushes, log
//!   lines, config queries)
//! - [`HostCalls`]: calls the UI makes into the host (start streaming)
//!
//! Inbound calls are queued on an unbounded channel and applied by the UI
//! loop one at a time, so each runs to completion against the panel state.

use crate::errors::{AppError, AppResult};
use crate::ui::ImageConfig;
use std::future::Future;
use tokio::sync::{mpsc, oneshot};

/// Functions the UI exposes to the host
pub trait UiHandlers: Send + Sync {
    /// Replace the displayed frame
    fn update_image_src(&self, img_src: &str, img_width: u32, img_height: u32) -> AppResult<()>;

    /// Append a line to the log console
    fn update_log(&self, msg: &str) -> AppResult<()>;

    /// Read and validate the settings form
    fn get_image_config(&self) -> impl Future<Output = AppResult<ImageConfig>> + Send;
}

/// Functions the host exposes to the UI
pub trait HostCalls {
    /// Begin pushing frames; the result is not observed
    fn video_feed(&self);
}

/// A queued inbound call
#[derive(Debug)]
pub enum UiCall {
    UpdateImageSrc {
        img_src: String,
        img_width: u32,
        img_height: u32,
    },
    UpdateLog(String),
    GetImageConfig(oneshot::Sender<ImageConfig>),
}

/// Host-side end of the bridge
#[derive(Debug, Clone)]
pub struct UiHandle {
    sender: mpsc::UnboundedSender<UiCall>,
}

/// UI-side end of the bridge
#[derive(Debug)]
pub struct UiInbox {
    receiver: mpsc::UnboundedReceiver<UiCall>,
}

/// Create a connected handle/inbox pair
pub fn ui_channel() -> (UiHandle, UiInbox) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (UiHandle { sender }, UiInbox { receiver })
}

impl UiHandle {
    fn send(&self, call: UiCall) -> AppResult<()> {
        self.sender
            .send(call)
            .map_err(|_| AppError::Bridge("UI is no longer receiving calls".to_string()))
    }
}

impl UiHandlers for UiHandle {
    fn update_image_src(&self, img_src: &str, img_width: u32, img_height: u32) -> AppResult<()> {
        self.send(UiCall::UpdateImageSrc {
            img_src: img_src.to_string(),
            img_width,
            img_height,
        })
    }

    fn update_log(&self, msg: &str) -> AppResult<()> {
        self.send(UiCall::UpdateLog(msg.to_string()))
    }

    fn get_image_config(&self) -> impl Future<Output = AppResult<ImageConfig>> + Send {
        let (reply, response) = oneshot::channel();
        let sent = self.send(UiCall::GetImageConfig(reply));
        async move {
            sent?;
            response
                .await
                .map_err(|_| AppError::Bridge("UI dropped the config request".to_string()))
        }
    }
}

impl UiInbox {
    /// Next queued call without waiting
    pub fn try_recv(&mut self) -> Option<UiCall> {
        self.receiver.try_recv().ok()
    }

    /// Wait for the next call; `None` once every handle is dropped
    pub async fn recv(&mut self) -> Option<UiCall> {
        self.receiver.recv().await
    }
}
