// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the streaming host and device RPC client

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use camera_streaming::constants::frames::FRAME_FILE_NAME;
use camera_streaming::host::{CapturedFrame, FrameSource, RpcClient, StreamSettings, StreamingHost};
use camera_streaming::{
    AppResult, ControlPanel, DemosaicFilter, ImageConfig, PixelFormat, RpcError,
    ui_channel,
};
use serde_json::{Value, json};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct PatternSource;

impl FrameSource for PatternSource {
    fn fetch(&self, config: &ImageConfig) -> impl Future<Output = AppResult<CapturedFrame>> + Send {
        let len = (config.width * config.height) as usize * config.format.bytes_per_pixel();
        let frame = CapturedFrame::new(config.width, config.height, config.format, vec![200; len]);
        async move { frame }
    }
}

fn form_defaults() -> ImageConfig {
    ImageConfig {
        rotation: 0,
        format: PixelFormat::Rgb,
        width: 8,
        height: 6,
        filter: DemosaicFilter::Bilinear,
        awb: true,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_video_feed_pushes_frames_to_panel() {
    let dir = tempfile::tempdir().unwrap();
    let (handle, mut inbox) = ui_channel();
    let host = StreamingHost::new(
        Arc::new(PatternSource),
        handle,
        StreamSettings {
            frame_dir: dir.path().to_path_buf(),
            retry_delay: Duration::from_millis(10),
        },
        tokio::runtime::Handle::current(),
    );
    let mut panel = ControlPanel::new(&form_defaults(), 100);

    panel.start_video_feed(&host);
    // A second start while running is ignored
    panel.start_video_feed(&host);
    assert!(host.is_running());

    let pump = async {
        while panel.video_feed().generation < 2 {
            let call = inbox.recv().await.expect("host dropped the bridge");
            panel.dispatch(call);
        }
    };
    tokio::time::timeout(Duration::from_secs(10), pump)
        .await
        .expect("no frames pushed");
    host.stop();

    let feed = panel.video_feed();
    assert_eq!(feed.src.as_deref(), Some(FRAME_FILE_NAME));
    assert_eq!((feed.width, feed.height), (8, 6));
    assert_eq!(panel.window().height, 6 + 45 + 150 + 35);

    let first_log: Value =
        serde_json::from_str(panel.log_console().entries().next().unwrap()).unwrap();
    assert_eq!(first_log["format"], "RGB");
    assert_eq!(first_log["width"], 8);

    let saved = image::open(dir.path().join(FRAME_FILE_NAME)).unwrap();
    assert_eq!((saved.width(), saved.height()), (8, 6));
}

/// Serve a single JSON-RPC reply and hand back the request body
async fn serve_once(reply: Value) -> (String, tokio::task::JoinHandle<Value>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/jsonrpc", listener.local_addr().unwrap());

    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let body_start = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };
        let headers = String::from_utf8_lossy(&buf[..body_start]).to_lowercase();
        let content_length: usize = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|v| v.trim().parse().unwrap())
            .unwrap_or(0);
        while buf.len() < body_start + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
        }

        let body = reply.to_string();
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        serde_json::from_slice(&buf[body_start..body_start + content_length]).unwrap()
    });

    (endpoint, server)
}

#[tokio::test]
async fn test_get_image_from_camera_over_http() {
    let pixels = vec![10u8; 2 * 2 * 3];
    let (endpoint, server) = serve_once(json!({
        "id": 0,
        "result": {"width": 2, "height": 2, "base64_data": STANDARD.encode(&pixels)},
    }))
    .await;

    let client = RpcClient::with_endpoint(endpoint, Duration::from_secs(5)).unwrap();
    let config = ImageConfig {
        rotation: 90,
        format: PixelFormat::Rgb,
        width: 2,
        height: 2,
        filter: DemosaicFilter::NearestNeighbor,
        awb: false,
    };
    let frame = client.fetch(&config).await.unwrap();
    assert_eq!(frame.data, pixels);

    let request = server.await.unwrap();
    assert_eq!(request["jsonrpc"], "2.0");
    assert_eq!(request["method"], "get_image_from_camera");
    assert_eq!(
        request["params"][0],
        json!({
            "width": 2,
            "height": 2,
            "format": "RGB",
            "filter": "NEAREST_NEIGHBOR",
            "rotation": 90,
            "auto_white_balance": false,
        })
    );
}

#[tokio::test]
async fn test_remote_error_is_reported() {
    let (endpoint, server) = serve_once(json!({
        "id": 0,
        "error": {"code": -32000, "message": "Camera unavailable"},
    }))
    .await;

    let client = RpcClient::with_endpoint(endpoint, Duration::from_secs(5)).unwrap();
    let err = client.wifi_get_status().await.unwrap_err();
    assert!(matches!(err, RpcError::Remote { code: -32000, .. }));

    let request = server.await.unwrap();
    assert_eq!(request["params"], json!([{}]));
}
