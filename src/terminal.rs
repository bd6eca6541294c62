// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front end for the control panel
//!
//! Renders the panel inside a "window" sized from the window geometry: the
//! video feed using Unicode half-block characters, the settings menu when it
//! is open, and the log console.

use crate::bridge::{UiHandle, UiInbox, ui_channel};
use crate::config::Config;
use crate::constants::app_info;
use crate::constants::cells::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use crate::constants::layout::{LOG_CONSOLE_HEIGHT, SETTING_MENU_HEIGHT};
use crate::constants::timing::INPUT_POLL_MS;
use crate::host::{RpcClient, StreamSettings, StreamingHost};
use crate::ui::{ControlPanel, FormField, WindowSize};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::RgbImage;
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

type Host = StreamingHost<RpcClient, UiHandle>;

/// Run the control panel in the terminal
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    let client = RpcClient::new(&config.host_ip, config.rpc_timeout())?;
    info!(endpoint = client.endpoint(), "Using device");

    let (handle, inbox) = ui_channel();
    let host = StreamingHost::new(
        Arc::new(client),
        handle,
        StreamSettings {
            frame_dir: config.frame_dir.clone(),
            retry_delay: config.retry_delay(),
        },
        runtime.handle().clone(),
    );
    let mut app = App::new(&config, inbox, host);

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    if config.autostart {
        app.panel.start_video_feed(&app.host);
    }

    // Run the app
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    app.host.stop();
    runtime.shutdown_timeout(Duration::from_secs(1));

    result
}

/// Terminal-side state around the control panel
struct App {
    panel: ControlPanel,
    inbox: UiInbox,
    host: Host,
    frame_dir: PathBuf,
    frame_widget: FrameWidget,
    shown_generation: u64,
    focus: FormField,
}

impl App {
    fn new(config: &Config, inbox: UiInbox, host: Host) -> Self {
        Self {
            panel: ControlPanel::new(&config.form, config.log_capacity),
            inbox,
            host,
            frame_dir: config.frame_dir.clone(),
            frame_widget: FrameWidget::new(),
            shown_generation: 0,
            focus: FormField::default(),
        }
    }

    /// Apply every queued bridge call, then reload the frame if it changed
    fn drain_bridge(&mut self) {
        while let Some(call) = self.inbox.try_recv() {
            self.panel.dispatch(call);
        }

        let feed = self.panel.video_feed();
        if feed.generation == self.shown_generation {
            return;
        }
        self.shown_generation = feed.generation;

        let Some(src) = feed.src.clone() else {
            return;
        };
        let path = self.frame_dir.join(&src);
        match image::open(&path) {
            Ok(img) => self.frame_widget.update_frame(img.to_rgb8()),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load frame");
                self.panel.update_log(&format!("ERROR: Failed to load {}: {}", src, e));
            }
        }
    }

    /// Returns false when the user asked to quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return false,
            KeyCode::Char('m') => {
                self.panel.toggle_setting_menu();
            }
            KeyCode::Char('v') => self.panel.start_video_feed(&self.host),
            _ if self.panel.is_setting_menu_visible() => self.handle_settings_key(key.code),
            _ => {}
        }
        true
    }

    fn handle_settings_key(&mut self, code: KeyCode) {
        let form = &mut self.panel.form;
        match code {
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.previous(),
            KeyCode::Left => form.cycle_selector(self.focus, false),
            KeyCode::Right => form.cycle_selector(self.focus, true),
            KeyCode::Char(' ') if self.focus == FormField::AutoWhiteBalance => form.toggle_checkbox(),
            KeyCode::Char(c) => form.push_char(self.focus, c),
            KeyCode::Backspace => form.pop_char(self.focus),
            _ => {}
        }
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.drain_bridge();

        terminal.draw(|f| draw(f.area(), f.buffer_mut(), &*app))?;

        // Handle input with timeout for frame updates
        if event::poll(Duration::from_millis(INPUT_POLL_MS))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key)
        {
            break;
        }
    }

    Ok(())
}

fn draw(area: Rect, buf: &mut Buffer, app: &App) {
    let window = window_rect(app.panel.window(), area);
    let block = Block::bordered().title(format!(" Camera Streaming {} ", app_info::version()));
    let inner = block.inner(window);
    block.render(window, buf);

    let settings_rows = if app.panel.is_setting_menu_visible() {
        px_to_rows(SETTING_MENU_HEIGHT)
    } else {
        0
    };
    let [video_area, settings_area, log_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(settings_rows),
        Constraint::Length(px_to_rows(LOG_CONSOLE_HEIGHT)),
        Constraint::Length(1),
    ])
    .areas(inner);

    (&app.frame_widget).render(video_area, buf);
    if settings_rows > 0 {
        SettingsMenu {
            panel: &app.panel,
            focus: app.focus,
        }
        .render(settings_area, buf);
    }
    LogConsoleView { panel: &app.panel }.render(log_area, buf);
    StatusBar {
        message: &build_status_message(app),
    }
    .render(status_area, buf);
}

/// Map the window geometry onto the terminal, centered and clamped
fn window_rect(size: WindowSize, area: Rect) -> Rect {
    let width = ((size.width / CELL_WIDTH_PX) as u16).min(area.width);
    let height = ((size.height / CELL_HEIGHT_PX) as u16).min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn px_to_rows(px: u32) -> u16 {
    px.div_ceil(CELL_HEIGHT_PX) as u16
}

fn build_status_message(app: &App) -> String {
    let window = app.panel.window();
    let mut msg = String::new();
    if !app.host.is_running() {
        msg.push_str("'v' start feed | ");
    }
    if app.panel.is_setting_menu_visible() {
        msg.push_str("Tab field | ←/→ change | Space toggle | ");
    }
    msg.push_str("'m' settings | 'q' quit");
    msg.push_str(&format!(" | {}x{}", window.width, window.height));
    msg
}

/// Widget that renders the current frame using half-block characters
struct FrameWidget {
    frame: Option<RgbImage>,
}

impl FrameWidget {
    fn new() -> Self {
        Self { frame: None }
    }

    fn update_frame(&mut self, frame: RgbImage) {
        self.frame = Some(frame);
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let Some(frame) = &self.frame else {
            // No frame yet - show placeholder
            let msg = "Waiting for camera...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            buf.set_string(x, y, msg, Style::default());
            return;
        };
        if frame.width() == 0 || frame.height() == 0 {
            return;
        }

        // Each terminal cell displays 2 vertical pixels
        let frame_aspect = frame.width() as f64 / frame.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            ((h * frame_aspect) as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            (w as u16, (w / frame_aspect / 2.0) as u16)
        };
        let display_width = display_width.clamp(1, area.width);
        let display_height = display_height.clamp(1, area.height);

        let x_offset = area.x + (area.width - display_width) / 2;
        let y_offset = area.y + (area.height - display_height) / 2;

        let x_scale = frame.width() as f64 / display_width as f64;
        let y_scale = frame.height() as f64 / (display_height * 2) as f64;

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(frame, src_x, src_y_top));
                    cell.set_bg(sample_pixel(frame, src_x, src_y_bottom));
                }
            }
        }
    }
}

fn sample_pixel(frame: &RgbImage, x: u32, y: u32) -> Color {
    let [r, g, b] = frame
        .get_pixel(x.min(frame.width() - 1), y.min(frame.height() - 1))
        .0;
    Color::Rgb(r, g, b)
}

/// The settings menu: one cell per form control, focused control highlighted
struct SettingsMenu<'a> {
    panel: &'a ControlPanel,
    focus: FormField,
}

impl Widget for SettingsMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = FormField::ALL
            .chunks(3)
            .map(|row| {
                let mut spans = Vec::new();
                for field in row {
                    let style = if *field == self.focus {
                        Style::default().add_modifier(Modifier::REVERSED)
                    } else {
                        Style::default()
                    };
                    spans.push(Span::raw(format!("{}: ", field.label())));
                    spans.push(Span::styled(self.panel.form.display_value(*field), style));
                    spans.push(Span::raw("    "));
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines)
            .block(Block::bordered().title(" Settings "))
            .render(area, buf);
    }
}

/// The log console, kept scrolled to the console's scroll position
struct LogConsoleView<'a> {
    panel: &'a ControlPanel,
}

impl Widget for LogConsoleView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let console = self.panel.log_console();
        let visible = area.height.saturating_sub(2) as usize;
        let offset = console.scroll_top().saturating_sub(visible);

        let lines: Vec<Line> = console.lines().map(Line::raw).collect();
        Paragraph::new(lines)
            .block(Block::bordered().title(" Log "))
            .scroll((offset.min(u16::MAX as usize) as u16, 0))
            .render(area, buf);
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(Color::White).bg(Color::DarkGray);
        buf.set_style(area, style);

        let text: String = self.message.chars().take(area.width as usize).collect();
        buf.set_string(area.x, area.y, text, style);
    }
}
