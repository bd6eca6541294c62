// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the control panel's bridge-facing operations

use camera_streaming::ui::Display;
use camera_streaming::{ControlPanel, DemosaicFilter, HostCalls, ImageConfig, PixelFormat};
use std::cell::Cell;

fn panel() -> ControlPanel {
    ControlPanel::new(
        &ImageConfig {
            rotation: 180,
            format: PixelFormat::Rgb,
            width: 324,
            height: 324,
            filter: DemosaicFilter::NearestNeighbor,
            awb: false,
        },
        100,
    )
}

fn config_with_width(width: &str) -> (ImageConfig, String) {
    let mut panel = panel();
    panel.form.image_width = width.to_string();
    let config = panel.get_image_config();
    (config, panel.log_console().value())
}

fn config_with_height(height: &str) -> (ImageConfig, String) {
    let mut panel = panel();
    panel.form.image_height = height.to_string();
    let config = panel.get_image_config();
    (config, panel.log_console().value())
}

#[test]
fn test_width_below_minimum_clamps_to_one() {
    for input in ["", "0", "-5"] {
        let (config, log) = config_with_width(input);
        assert_eq!(config.width, 1, "input {:?}", input);
        assert_eq!(log, "\nERROR: Width must be at least 1");
    }
}

#[test]
fn test_width_above_maximum_clamps_to_thousand() {
    let (config, log) = config_with_width("1001");
    assert_eq!(config.width, 1000);
    assert_eq!(log, "\nERROR: Width must be less than 1000");
}

#[test]
fn test_width_in_range_passes_without_log() {
    for (input, expected) in [("1", 1), ("640", 640), ("1000", 1000)] {
        let (config, log) = config_with_width(input);
        assert_eq!(config.width, expected);
        assert!(log.is_empty());
    }
}

#[test]
fn test_height_clamps_symmetrically() {
    let (config, log) = config_with_height("");
    assert_eq!(config.height, 1);
    assert_eq!(log, "\nERROR: Height must be at least 1");

    let (config, log) = config_with_height("5000");
    assert_eq!(config.height, 1000);
    assert_eq!(log, "\nERROR: Height must be less than 1000");

    let (config, log) = config_with_height("480");
    assert_eq!(config.height, 480);
    assert!(log.is_empty());
}

#[test]
fn test_selectors_pass_through() {
    let mut panel = panel();
    panel.form.rotation_selector = 45;
    let config = panel.get_image_config();
    assert_eq!(config.rotation, 45);
    assert_eq!(config.filter, DemosaicFilter::NearestNeighbor);
    assert!(!config.awb);
}

#[test]
fn test_raw_forces_native_resolution_and_writes_back() {
    let mut panel = panel();
    panel.form.format_selector = PixelFormat::Raw;
    panel.form.image_width = "".to_string();
    panel.form.image_height = "2000".to_string();

    let config = panel.get_image_config();

    assert_eq!((config.width, config.height, config.rotation), (324, 324, 0));
    assert_eq!(config.format, PixelFormat::Raw);
    assert_eq!(panel.form.image_width, "324");
    assert_eq!(panel.form.image_height, "324");
    assert_eq!(panel.form.rotation_selector, 0);
    assert!(panel.log_console().is_empty());
}

#[test]
fn test_frame_update_resizes_window() {
    let mut panel = panel();
    let size = panel.update_image_src("x.jpg", 400, 300);
    assert_eq!((size.width, size.height), (1005, 530));
    assert_eq!(panel.window(), size);

    let feed = panel.video_feed();
    assert_eq!(feed.src.as_deref(), Some("x.jpg"));
    assert_eq!((feed.width, feed.height), (400, 300));

    panel.toggle_setting_menu();
    let size = panel.update_image_src("x.jpg", 400, 300);
    assert_eq!((size.width, size.height), (1005, 630));
}

#[test]
fn test_log_appends_in_order_and_scrolls() {
    let mut panel = panel();

    panel.update_log("hi");
    let console = panel.log_console();
    assert_eq!(console.scroll_top(), console.scroll_height());

    panel.update_log("hi");
    let console = panel.log_console();
    assert_eq!(console.value(), "\nhi\nhi");
    assert_eq!(console.scroll_top(), console.scroll_height());
}

#[test]
fn test_setting_menu_alternates_from_hidden() {
    let mut panel = panel();
    assert_eq!(panel.setting_menu(), Display::Hidden);

    assert!(panel.toggle_setting_menu());
    assert_eq!(panel.setting_menu(), Display::Shown);
    assert!(!panel.toggle_setting_menu());
    assert_eq!(panel.setting_menu(), Display::Hidden);
    assert!(panel.toggle_setting_menu());
}

#[test]
fn test_start_video_feed_calls_host() {
    struct CountingHost(Cell<u32>);

    impl HostCalls for CountingHost {
        fn video_feed(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    let host = CountingHost(Cell::new(0));
    panel().start_video_feed(&host);
    assert_eq!(host.0.get(), 1);
}
