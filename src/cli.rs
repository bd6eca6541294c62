// SPDX-License-Identifier: GPL-3.0-only

//! One-shot CLI commands
//!
//! `snapshot` captures a single frame over USB, Ethernet or Wi-Fi and saves
//! it as a JPEG, without starting the control panel.

use camera_streaming::constants::device::WIFI_CONNECT_RETRIES;
use camera_streaming::constants::limits::RAW_NATIVE_DIMENSION;
use camera_streaming::host::frame::{CapturedFrame, encode_jpeg};
use camera_streaming::host::RpcClient;
use camera_streaming::ui::{DemosaicFilter, ImageConfig, PixelFormat};
use chrono::Local;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// Which interface of the board to fetch the frame over
pub enum Link {
    Usb,
    /// Explicit address, or ask the board for it over USB
    Ethernet(Option<String>),
    /// Optionally join the given network first
    Wifi { ssid: Option<String>, psk: Option<String> },
}

pub struct SnapshotArgs {
    pub usb_ip: String,
    pub link: Link,
    pub width: u32,
    pub height: u32,
    pub rotation: i32,
    pub format: PixelFormat,
    pub filter: DemosaicFilter,
    pub auto_white_balance: bool,
    pub output: Option<PathBuf>,
    pub timeout: Duration,
}

/// Image settings for the snapshot; RAW images can only be taken at native resolution
fn snapshot_config(args: &SnapshotArgs) -> ImageConfig {
    let (width, height) = if args.format == PixelFormat::Raw {
        (RAW_NATIVE_DIMENSION, RAW_NATIVE_DIMENSION)
    } else {
        (args.width, args.height)
    };
    ImageConfig {
        rotation: args.rotation,
        format: args.format,
        width,
        height,
        filter: args.filter,
        awb: args.auto_white_balance,
    }
}

/// Address to fetch the frame from, asking the board over USB where needed
///
/// Returns `None` when the frame is fetched over USB itself.
async fn resolve_link_ip(
    usb: &RpcClient,
    link: Link,
) -> Result<Option<String>, Box<dyn std::error::Error>> {
    match link {
        Link::Usb => Ok(None),
        Link::Ethernet(Some(ip)) => Ok(Some(ip)),
        Link::Ethernet(None) => {
            let ip = usb.get_ethernet_ip().await?;
            println!("Ethernet ip: {}", ip);
            Ok(Some(ip))
        }
        Link::Wifi { ssid, psk } => {
            // Streaming firmware only serves wifi_get_ip; status exists alongside wifi_connect
            if let Some(ssid) = ssid {
                println!("Connecting to {}...", ssid);
                usb.wifi_connect(&ssid, psk.as_deref().unwrap_or(""), WIFI_CONNECT_RETRIES)
                    .await?;
                if !usb.wifi_get_status().await? {
                    return Err(format!("Unable to connect to {}", ssid).into());
                }
            }
            let ip = usb.wifi_get_ip().await?;
            println!("Wifi ip: {}", ip);
            Ok(Some(ip))
        }
    }
}

/// Where to write the photo: inside `output` if it is a directory, at `output`
/// otherwise, or in the default photo directory
fn output_path(output: Option<PathBuf>) -> PathBuf {
    match output {
        Some(path) if path.is_dir() => path.join(default_file_name()),
        Some(path) => path,
        None => get_default_photo_dir().join(default_file_name()),
    }
}

/// Capture one frame and save it
pub fn snapshot(args: SnapshotArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = snapshot_config(&args);
    let SnapshotArgs {
        usb_ip,
        link,
        timeout,
        output,
        ..
    } = args;

    let rt = tokio::runtime::Runtime::new()?;
    let frame = rt.block_on(async move {
        let usb = RpcClient::new(&usb_ip, timeout)?;
        let client = match resolve_link_ip(&usb, link).await? {
            Some(ip) => RpcClient::new(&ip, timeout)?,
            None => usb,
        };

        info!(
            endpoint = client.endpoint(),
            width = config.width,
            height = config.height,
            format = %config.format,
            "Requesting frame"
        );
        let image = client.get_image_from_camera(&config).await?;
        let frame = CapturedFrame::from_base64(
            config.width,
            config.height,
            config.format,
            &image.base64_data,
        )?;
        Ok::<_, Box<dyn std::error::Error>>(frame)
    })?;

    let output_path = output_path(output);
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let jpeg = encode_jpeg(&frame.to_rgb_image()?)?;
    std::fs::write(&output_path, jpeg)?;

    println!("Photo saved: {}", output_path.display());
    Ok(())
}

fn default_file_name() -> String {
    format!("IMG_{}.jpg", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Get default photo directory
fn get_default_photo_dir() -> PathBuf {
    dirs::picture_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("camera-streaming")
}
