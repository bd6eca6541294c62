// SPDX-License-Identifier: GPL-3.0-only

//! Capture parameters returned to the host on every frame request

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixel format of the frame the device sends back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PixelFormat {
    /// 8-bit interleaved RGB
    #[default]
    Rgb,
    /// 8-bit luminance
    Gray,
    /// Undemosaiced Bayer data at native sensor resolution
    Raw,
}

impl PixelFormat {
    /// Get all formats for selector iteration
    pub const ALL: [PixelFormat; 3] = [PixelFormat::Rgb, PixelFormat::Gray, PixelFormat::Raw];

    /// Wire/selector value
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Rgb => "RGB",
            PixelFormat::Gray => "GRAY",
            PixelFormat::Raw => "RAW",
        }
    }

    /// Bytes per pixel in the device payload
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Gray | PixelFormat::Raw => 1,
        }
    }
}

/// Demosaic interpolation the device applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DemosaicFilter {
    #[default]
    Bilinear,
    NearestNeighbor,
}

impl DemosaicFilter {
    /// Get all filters for selector iteration
    pub const ALL: [DemosaicFilter; 2] = [DemosaicFilter::Bilinear, DemosaicFilter::NearestNeighbor];

    /// Wire/selector value
    pub fn as_str(&self) -> &'static str {
        match self {
            DemosaicFilter::Bilinear => "BILINEAR",
            DemosaicFilter::NearestNeighbor => "NEAREST_NEIGHBOR",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DemosaicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PixelFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PixelFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown pixel format: {}", s))
    }
}

impl FromStr for DemosaicFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DemosaicFilter::ALL
            .into_iter()
            .find(|filter| filter.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown demosaic filter: {}", s))
    }
}

/// Validated capture settings, built fresh on each query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Degrees of rotation, passed through from the selector unchecked
    pub rotation: i32,
    pub format: PixelFormat,
    /// Width in pixels, within [1, 1000]
    pub width: u32,
    /// Height in pixels, within [1, 1000]
    pub height: u32,
    pub filter: DemosaicFilter,
    /// Auto white balance
    pub awb: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let config = ImageConfig {
            rotation: 90,
            format: PixelFormat::Gray,
            width: 640,
            height: 480,
            filter: DemosaicFilter::NearestNeighbor,
            awb: false,
        };
        let value = serde_json::to_value(config).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "rotation": 90,
                "format": "GRAY",
                "width": 640,
                "height": 480,
                "filter": "NEAREST_NEIGHBOR",
                "awb": false,
            })
        );
    }

    #[test]
    fn test_selector_values_parse() {
        assert_eq!("raw".parse::<PixelFormat>(), Ok(PixelFormat::Raw));
        assert_eq!(
            "NEAREST_NEIGHBOR".parse::<DemosaicFilter>(),
            Ok(DemosaicFilter::NearestNeighbor)
        );
        assert!("YUV".parse::<PixelFormat>().is_err());
    }
}
