// SPDX-License-Identifier: GPL-3.0-only

//! Frame decoding and storage
//!
//! Turns the device's base64 payload into an RGB image and writes it as JPEG
//! where the UI can pick it up.

use crate::constants::frames::{FRAME_FILE_NAME, FRAME_TEMP_FILE_NAME, JPEG_QUALITY};
use crate::errors::{AppError, AppResult};
use crate::ui::PixelFormat;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, RgbImage};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Raw pixels as delivered by the device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl CapturedFrame {
    /// Decode a base64 payload and check it against the frame geometry
    pub fn from_base64(width: u32, height: u32, format: PixelFormat, payload: &str) -> AppResult<Self> {
        let data = STANDARD
            .decode(payload.trim())
            .map_err(|e| AppError::Image(format!("Invalid base64 payload: {}", e)))?;
        Self::new(width, height, format, data)
    }

    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> AppResult<Self> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if width == 0 || height == 0 || data.len() != expected {
            return Err(AppError::Image(format!(
                "{} frame {}x{} needs {} bytes, got {}",
                format,
                width,
                height,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Convert to an RGB image, demosaicing RAW frames
    pub fn to_rgb_image(&self) -> AppResult<RgbImage> {
        let image = match self.format {
            PixelFormat::Rgb => RgbImage::from_raw(self.width, self.height, self.data.clone()),
            PixelFormat::Gray => GrayImage::from_raw(self.width, self.height, self.data.clone())
                .map(|gray| image::DynamicImage::ImageLuma8(gray).to_rgb8()),
            PixelFormat::Raw => RgbImage::from_raw(
                self.width,
                self.height,
                rggb_to_rgb(&self.data, self.width, self.height),
            ),
        };
        image.ok_or_else(|| AppError::Image("Failed to create image".to_string()))
    }
}

/// Convert Bayer RGGB to RGB using a per-block demosaic
///
/// Bayer pattern (RGGB):
/// ```text
/// R G
/// G B
/// ```
/// Each 2x2 block produces 4 pixels with the same RGB values. Odd trailing
/// rows/columns reuse the nearest sample.
pub fn rggb_to_rgb(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let w = width as usize;
    let h = height as usize;
    let mut rgb = vec![0u8; w * h * 3];
    if w == 0 || h == 0 || data.len() < w * h {
        return rgb;
    }

    let at = |x: usize, y: usize| data[y.min(h - 1) * w + x.min(w - 1)] as u16;

    for y in (0..h).step_by(2) {
        for x in (0..w).step_by(2) {
            let r = at(x, y) as u8;
            let g = ((at(x + 1, y) + at(x, y + 1)) / 2) as u8;
            let b = at(x + 1, y + 1) as u8;

            for dy in 0..2 {
                for dx in 0..2 {
                    let (px, py) = (x + dx, y + dy);
                    if px >= w || py >= h {
                        continue;
                    }
                    let idx = (py * w + px) * 3;
                    rgb[idx] = r;
                    rgb[idx + 1] = g;
                    rgb[idx + 2] = b;
                }
            }
        }
    }

    rgb
}

/// Encode an RGB image as JPEG
pub fn encode_jpeg(image: &RgbImage) -> AppResult<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
            std::io::Cursor::new(&mut buffer),
            JPEG_QUALITY,
        );
        encoder.encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )?;
    }
    Ok(buffer)
}

/// Write a frame to `frame_dir/img_data.jpg`
///
/// The JPEG goes to a scratch file first and is renamed into place, so the
/// UI never reads a half-written frame.
pub fn save_frame(frame_dir: &Path, frame: &CapturedFrame) -> AppResult<PathBuf> {
    let jpeg = encode_jpeg(&frame.to_rgb_image()?)?;

    std::fs::create_dir_all(frame_dir)?;
    let temp_path = frame_dir.join(FRAME_TEMP_FILE_NAME);
    let frame_path = frame_dir.join(FRAME_FILE_NAME);
    std::fs::write(&temp_path, &jpeg)?;
    std::fs::rename(&temp_path, &frame_path)?;

    debug!(path = %frame_path.display(), size = jpeg.len(), "Frame saved");
    Ok(frame_path)
}
