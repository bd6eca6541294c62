// SPDX-License-Identifier: GPL-3.0-only

use camera_streaming::config::{Config, default_cache_dir};
use camera_streaming::constants::device::DEFAULT_USB_IP;
use camera_streaming::ui::{DemosaicFilter, PixelFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Mutex;

mod cli;

#[derive(Parser)]
#[command(name = "camera-streaming")]
#[command(about = "Stream frames from a Dev Board Micro camera")]
#[command(version = camera_streaming::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    /// Config file (default: <config dir>/camera-streaming/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Board IP address, overriding the config file
    #[arg(long, global = true)]
    host_ip: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the control panel in the terminal (default)
    Run,

    /// Capture a single frame and save it
    Snapshot {
        /// Board address over USB
        #[arg(long, default_value = DEFAULT_USB_IP)]
        usb_ip: String,

        /// Fetch the frame over Ethernet
        #[arg(long, conflicts_with = "wifi")]
        ethernet: bool,

        /// Ethernet address (default: ask the board over USB)
        #[arg(long, requires = "ethernet")]
        ethernet_ip: Option<String>,

        /// Fetch the frame over Wi-Fi
        #[arg(long)]
        wifi: bool,

        /// Wi-Fi network to join before fetching
        #[arg(long, requires = "wifi")]
        wifi_ssid: Option<String>,

        /// Wi-Fi network password
        #[arg(long, requires = "wifi_ssid")]
        wifi_psk: Option<String>,

        #[arg(long, default_value = "700")]
        width: u32,

        #[arg(long, default_value = "700")]
        height: u32,

        /// Rotation in degrees
        #[arg(long, default_value = "270", value_parser = ["0", "90", "180", "270"])]
        rotation: String,

        /// Pixel format (RGB, GRAY, RAW)
        #[arg(long, default_value = "RGB")]
        format: PixelFormat,

        /// Demosaic filter (BILINEAR, NEAREST_NEIGHBOR)
        #[arg(long, default_value = "BILINEAR")]
        filter: DemosaicFilter,

        /// Disable auto white balance
        #[arg(long)]
        no_auto_white_balance: bool,

        /// Output file path (default: ~/Pictures/camera-streaming/IMG_TIMESTAMP.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Run));

    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=camera_streaming=debug, RUST_LOG=info
    init_logging(interactive)?;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host_ip) = cli.host_ip {
        config.host_ip = host_ip;
    }

    match cli.command {
        None | Some(Commands::Run) => camera_streaming::terminal::run(config),
        Some(Commands::Snapshot {
            usb_ip,
            ethernet,
            ethernet_ip,
            wifi,
            wifi_ssid,
            wifi_psk,
            width,
            height,
            rotation,
            format,
            filter,
            no_auto_white_balance,
            output,
        }) => cli::snapshot(cli::SnapshotArgs {
            usb_ip,
            link: if ethernet {
                cli::Link::Ethernet(ethernet_ip)
            } else if wifi {
                cli::Link::Wifi {
                    ssid: wifi_ssid,
                    psk: wifi_psk,
                }
            } else {
                cli::Link::Usb
            },
            width,
            height,
            rotation: rotation.parse()?,
            format,
            filter,
            auto_white_balance: !no_auto_white_balance,
            output,
            timeout: config.rpc_timeout(),
        }),
        Some(Commands::Config) => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

/// Log to stderr, or to a file while the terminal UI owns the screen
fn init_logging(interactive: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true);

    if interactive {
        let log_dir = default_cache_dir();
        std::fs::create_dir_all(&log_dir)?;
        let file = std::fs::File::create(log_dir.join("camera-streaming.log"))?;
        builder.with_ansi(false).with_writer(Mutex::new(file)).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
    Ok(())
}
