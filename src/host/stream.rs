// SPDX-License-Identifier: GPL-3.0-only

//! The video feed loop
//!
//! Each iteration:
//! 1) asks the UI for the current image config
//! 2) echoes that config to the UI log
//! 3) requests a frame from the device with those settings
//! 4) writes the frame into the frame directory
//! 5) tells the UI to show the new frame

use super::frame::{CapturedFrame, save_frame};
use super::rpc::RpcClient;
use crate::bridge::{HostCalls, UiHandlers};
use crate::constants::frames::FRAME_FILE_NAME;
use crate::errors::{AppError, AppResult};
use crate::ui::ImageConfig;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info};

/// Anything that can produce a frame for a given config
pub trait FrameSource: Send + Sync + 'static {
    fn fetch(&self, config: &ImageConfig) -> impl Future<Output = AppResult<CapturedFrame>> + Send;
}

impl FrameSource for RpcClient {
    fn fetch(&self, config: &ImageConfig) -> impl Future<Output = AppResult<CapturedFrame>> + Send {
        let config = *config;
        async move {
            let image = self.get_image_from_camera(&config).await?;
            // The frame is laid out with the requested geometry, whatever the reply echoes
            if (image.width, image.height) != (config.width, config.height) {
                debug!(
                    requested_width = config.width,
                    requested_height = config.height,
                    width = image.width,
                    height = image.height,
                    "Device reported different frame size"
                );
            }
            CapturedFrame::from_base64(config.width, config.height, config.format, &image.base64_data)
        }
    }
}

/// Host-side loop settings
#[derive(Debug, Clone)]
pub struct StreamSettings {
    /// Directory frames are written to; the UI resolves image sources against it
    pub frame_dir: PathBuf,
    /// Pause after a failed iteration
    pub retry_delay: Duration,
}

/// Run one iteration of the feed, returning the config the frame was taken with
pub async fn stream_frame<S, U>(source: &S, ui: &U, settings: &StreamSettings) -> AppResult<ImageConfig>
where
    S: FrameSource,
    U: UiHandlers,
{
    let config = ui.get_image_config().await?;
    let config_json = serde_json::to_string(&config)?;
    ui.update_log(&config_json)?;

    let frame = source.fetch(&config).await?;
    let (width, height) = (frame.width, frame.height);

    let frame_dir = settings.frame_dir.clone();
    tokio::task::spawn_blocking(move || save_frame(&frame_dir, &frame))
        .await
        .map_err(|e| AppError::Other(format!("Frame task error: {}", e)))??;

    ui.update_image_src(FRAME_FILE_NAME, width, height)?;
    Ok(config)
}

/// Loop until a newer run or `stop` bumps the epoch past `run`, or the UI goes away
async fn feed_loop<S, U>(source: Arc<S>, ui: U, settings: StreamSettings, epoch: Arc<AtomicU64>, run: u64)
where
    S: FrameSource,
    U: UiHandlers,
{
    let mut frames: u64 = 0;
    while epoch.load(Ordering::SeqCst) == run {
        match stream_frame(source.as_ref(), &ui, &settings).await {
            Ok(config) => {
                frames += 1;
                debug!(frames, width = config.width, height = config.height, "Frame streamed");
            }
            Err(AppError::Bridge(msg)) => {
                info!(reason = %msg, "UI closed, stopping video feed");
                break;
            }
            Err(e) => {
                error!(error = %e, "Frame request failed");
                if ui.update_log(&format!("ERROR: {}", e)).is_err() {
                    break;
                }
                tokio::time::sleep(settings.retry_delay).await;
            }
        }
    }
    info!(frames, "Video feed stopped");
}

/// Streaming host reachable from the UI through [`HostCalls`]
pub struct StreamingHost<S, U> {
    source: Arc<S>,
    ui: U,
    settings: StreamSettings,
    runtime: tokio::runtime::Handle,
    running: Arc<AtomicBool>,
    epoch: Arc<AtomicU64>,
}

impl<S, U> StreamingHost<S, U>
where
    S: FrameSource,
    U: UiHandlers + Clone + 'static,
{
    pub fn new(source: Arc<S>, ui: U, settings: StreamSettings, runtime: tokio::runtime::Handle) -> Self {
        Self {
            source,
            ui,
            settings,
            runtime,
            running: Arc::new(AtomicBool::new(false)),
            epoch: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the loop to exit after the current iteration
    ///
    /// The host counts as stopped right away, so a following `video_feed`
    /// starts a fresh loop instead of being dropped as a duplicate.
    pub fn stop(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.running.store(false, Ordering::SeqCst);
    }
}

impl<S, U> HostCalls for StreamingHost<S, U>
where
    S: FrameSource,
    U: UiHandlers + Clone + 'static,
{
    fn video_feed(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Video feed already running");
            return;
        }
        let run = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        let source = Arc::clone(&self.source);
        let ui = self.ui.clone();
        let settings = self.settings.clone();
        let epoch = Arc::clone(&self.epoch);
        let running = Arc::clone(&self.running);

        info!(run, frame_dir = %settings.frame_dir.display(), "Video feed started");
        self.runtime.spawn(async move {
            feed_loop(source, ui, settings, Arc::clone(&epoch), run).await;
            // A stopped or superseded run leaves the flag to its successor
            if epoch.load(Ordering::SeqCst) == run {
                running.store(false, Ordering::SeqCst);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RpcError;
    use crate::ui::{DemosaicFilter, PixelFormat};
    use std::sync::Mutex;

    #[derive(Debug, PartialEq)]
    enum Event {
        ConfigQuery,
        Log(String),
        Frame(String, u32, u32),
    }

    #[derive(Default)]
    struct RecordingUi {
        events: Mutex<Vec<Event>>,
    }

    impl UiHandlers for RecordingUi {
        fn update_image_src(&self, img_src: &str, img_width: u32, img_height: u32) -> AppResult<()> {
            self.events
                .lock()
                .unwrap()
                .push(Event::Frame(img_src.to_string(), img_width, img_height));
            Ok(())
        }

        fn update_log(&self, msg: &str) -> AppResult<()> {
            self.events.lock().unwrap().push(Event::Log(msg.to_string()));
            Ok(())
        }

        fn get_image_config(&self) -> impl Future<Output = AppResult<ImageConfig>> + Send {
            self.events.lock().unwrap().push(Event::ConfigQuery);
            async {
                Ok(ImageConfig {
                    rotation: 0,
                    format: PixelFormat::Gray,
                    width: 2,
                    height: 2,
                    filter: DemosaicFilter::Bilinear,
                    awb: true,
                })
            }
        }
    }

    struct GraySource;

    impl FrameSource for GraySource {
        fn fetch(&self, config: &ImageConfig) -> impl Future<Output = AppResult<CapturedFrame>> + Send {
            let frame = CapturedFrame::new(
                config.width,
                config.height,
                config.format,
                vec![64; (config.width * config.height) as usize],
            );
            async move { frame }
        }
    }

    struct OfflineSource;

    impl FrameSource for OfflineSource {
        fn fetch(&self, _config: &ImageConfig) -> impl Future<Output = AppResult<CapturedFrame>> + Send {
            async { Err(RpcError::Transport("connection refused".to_string()).into()) }
        }
    }

    /// Shareable handle so the host and the test observe the same events
    #[derive(Clone, Default)]
    struct SharedUi(Arc<RecordingUi>);

    impl SharedUi {
        fn frames(&self) -> usize {
            let events = self.0.events.lock().unwrap();
            events.iter().filter(|e| matches!(e, Event::Frame(..))).count()
        }
    }

    impl UiHandlers for SharedUi {
        fn update_image_src(&self, img_src: &str, img_width: u32, img_height: u32) -> AppResult<()> {
            self.0.update_image_src(img_src, img_width, img_height)
        }

        fn update_log(&self, msg: &str) -> AppResult<()> {
            self.0.update_log(msg)
        }

        fn get_image_config(&self) -> impl Future<Output = AppResult<ImageConfig>> + Send {
            self.0.get_image_config()
        }
    }

    /// Takes a while to deliver each frame
    struct SlowSource;

    impl FrameSource for SlowSource {
        fn fetch(&self, config: &ImageConfig) -> impl Future<Output = AppResult<CapturedFrame>> + Send {
            let frame = CapturedFrame::new(
                config.width,
                config.height,
                config.format,
                vec![64; (config.width * config.height) as usize],
            );
            async move {
                tokio::time::sleep(Duration::from_millis(50)).await;
                frame
            }
        }
    }

    fn settings(dir: &std::path::Path) -> StreamSettings {
        StreamSettings {
            frame_dir: dir.to_path_buf(),
            retry_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_iteration_order() {
        let dir = tempfile::tempdir().unwrap();
        let ui = RecordingUi::default();

        stream_frame(&GraySource, &ui, &settings(dir.path())).await.unwrap();

        let events = ui.events.into_inner().unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], Event::ConfigQuery);
        assert!(matches!(&events[1], Event::Log(msg) if msg.contains("\"format\":\"GRAY\"")));
        assert_eq!(events[2], Event::Frame(FRAME_FILE_NAME.to_string(), 2, 2));
        assert!(dir.path().join(FRAME_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_fetch_failure_pushes_no_frame() {
        let dir = tempfile::tempdir().unwrap();
        let ui = RecordingUi::default();

        let err = stream_frame(&OfflineSource, &ui, &settings(dir.path()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Rpc(RpcError::Transport(_))));

        let events = ui.events.into_inner().unwrap();
        assert!(!events.iter().any(|e| matches!(e, Event::Frame(..))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_restart_right_after_stop_keeps_streaming() {
        let dir = tempfile::tempdir().unwrap();
        let ui = SharedUi::default();
        let host = StreamingHost::new(
            Arc::new(SlowSource),
            ui.clone(),
            settings(dir.path()),
            tokio::runtime::Handle::current(),
        );

        host.video_feed();
        // First run is now waiting on its fetch
        tokio::time::sleep(Duration::from_millis(10)).await;

        host.stop();
        assert!(!host.is_running());
        host.video_feed();
        assert!(host.is_running());

        // The first run finishes its iteration and exits; the restarted one keeps going
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(host.is_running());
        let frames = ui.frames();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(ui.frames() > frames);

        host.stop();
        assert!(!host.is_running());
    }
}
