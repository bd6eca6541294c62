// SPDX-License-Identifier: GPL-3.0-only

//! Streaming host: talks to the board and feeds the control panel

pub mod frame;
pub mod rpc;
pub mod stream;

pub use frame::{CapturedFrame, save_frame};
pub use rpc::{CameraImage, RpcClient};
pub use stream::{FrameSource, StreamSettings, StreamingHost, stream_frame};
