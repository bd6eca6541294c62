// SPDX-License-Identifier: GPL-3.0-only

//! JSON-RPC 2.0 client for the board's camera server
//!
//! Every method POSTs `{"id", "jsonrpc": "2.0", "method", "params": [{..}]}`
//! to `http://<ip>:80/jsonrpc` and unwraps the `result` member of the reply.

use crate::constants::device::{RPC_PATH, RPC_PORT};
use crate::errors::{AppResult, RpcError};
use crate::ui::ImageConfig;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

/// Image payload returned by `get_image_from_camera`
#[derive(Debug, Clone, Deserialize)]
pub struct CameraImage {
    pub width: u32,
    pub height: u32,
    pub base64_data: String,
}

/// Client bound to one device endpoint
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Client for the device at `ip`
    pub fn new(ip: &str, timeout: Duration) -> AppResult<Self> {
        Self::with_endpoint(format!("http://{}:{}{}", ip, RPC_PORT, RPC_PATH), timeout)
    }

    /// Client for an explicit endpoint URL
    pub fn with_endpoint(endpoint: String, timeout: Duration) -> AppResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint,
            next_id: AtomicU64::new(0),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the request envelope, consuming the next request id
    pub fn request_body(&self, method: &str, params: Value) -> Value {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        json!({
            "id": id,
            "jsonrpc": "2.0",
            "method": method,
            "params": [params],
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let body = self.request_body(method, params);
        debug!(url = %self.endpoint, method, "Sending RPC request");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let reply: Value = response.json().await?;
        parse_response(reply)
    }

    /// Request a frame with the given capture settings
    pub async fn get_image_from_camera(&self, config: &ImageConfig) -> Result<CameraImage, RpcError> {
        let result = self
            .call(
                "get_image_from_camera",
                json!({
                    "width": config.width,
                    "height": config.height,
                    "format": config.format.as_str(),
                    "filter": config.filter.as_str(),
                    "rotation": config.rotation,
                    "auto_white_balance": config.awb,
                }),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|e| RpcError::InvalidResponse(format!("Malformed image result: {}", e)))
    }

    /// Ethernet address of the board
    pub async fn get_ethernet_ip(&self) -> Result<String, RpcError> {
        let result = self.call("get_ethernet_ip", json!({})).await?;
        string_field(&result, "ethernet_ip")
    }

    /// Wi-Fi address of the board
    pub async fn wifi_get_ip(&self) -> Result<String, RpcError> {
        let result = self.call("wifi_get_ip", json!({})).await?;
        string_field(&result, "ip").or_else(|_| string_field(&result, "wifi_ip"))
    }

    /// Whether the board's Wi-Fi is connected
    pub async fn wifi_get_status(&self) -> Result<bool, RpcError> {
        let result = self.call("wifi_get_status", json!({})).await?;
        result
            .get("status")
            .and_then(Value::as_bool)
            .ok_or(RpcError::MissingField("status"))
    }

    /// Join a Wi-Fi network
    pub async fn wifi_connect(&self, ssid: &str, password: &str, retries: u32) -> Result<(), RpcError> {
        self.call(
            "wifi_connect",
            json!({
                "ssid": ssid,
                "password": password,
                "retries": retries,
            }),
        )
        .await
        .map(|_| ())
    }
}

/// Unwrap a JSON-RPC reply into its `result` member
pub fn parse_response(reply: Value) -> Result<Value, RpcError> {
    if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
        return Err(RpcError::Remote {
            code: error.get("code").and_then(Value::as_i64).unwrap_or(0),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
        });
    }
    match reply {
        Value::Object(mut map) => map.remove("result").ok_or(RpcError::MissingField("result")),
        _ => Err(RpcError::InvalidResponse("reply is not an object".to_string())),
    }
}

fn string_field(result: &Value, field: &'static str) -> Result<String, RpcError> {
    result
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(RpcError::MissingField(field))
}
