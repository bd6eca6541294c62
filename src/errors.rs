// SPDX-License-Identifier: MPL-2.0

//! Error types for the camera streaming application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Device JSON-RPC errors
    Rpc(RpcError),
    /// Frame decoding/encoding errors
    Image(String),
    /// The other side of the UI bridge went away
    Bridge(String),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
    /// Generic error with message
    Other(String),
}

/// Errors talking to the device's JSON-RPC server
#[derive(Debug, Clone)]
pub enum RpcError {
    /// HTTP transport failed (connection refused, timeout, bad status)
    Transport(String),
    /// Response body was not valid JSON
    InvalidResponse(String),
    /// The device answered with a JSON-RPC error object
    Remote { code: i64, message: String },
    /// A required field is absent from the response
    MissingField(&'static str),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Rpc(e) => write!(f, "RPC error: {}", e),
            AppError::Image(msg) => write!(f, "Image error: {}", msg),
            AppError::Bridge(msg) => write!(f, "Bridge error: {}", msg),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Transport(msg) => write!(f, "Transport failed: {}", msg),
            RpcError::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            RpcError::Remote { code, message } => {
                write!(f, "Device returned error {}: {}", code, message)
            }
            RpcError::MissingField(field) => write!(f, "Unable to parse {} from response", field),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for RpcError {}

impl From<RpcError> for AppError {
    fn from(err: RpcError) -> Self {
        AppError::Rpc(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Image(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RpcError::InvalidResponse(err.to_string())
        } else {
            RpcError::Transport(err.to_string())
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Rpc(err.into())
    }
}
