// SPDX-License-Identifier: GPL-3.0-only

//! Terminal preview
//!
//! Renders the latest processed frame to the terminal using Unicode
//! half-block characters for improved vertical resolution. The filter mode
//! can be switched while frames keep flowing.

use crate::backends::SourceLoop;
use crate::backends::sources::FrameSource;
use crate::config::Config;
use crate::constants::timing;
use crate::errors::{AppResult, ExportError};
use crate::filters::FilterMode;
use crate::frame_processor::{FrameProcessor, ProcessedFrame, StatsSnapshot, ThreadExecutor};
use crate::storage;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::sync::Arc;
use tracing::{error, info};

/// Run the terminal preview on `source`
pub fn run<S>(source: S, config: &Config) -> AppResult<()>
where
    S: FrameSource + 'static,
{
    let processor = FrameProcessor::builder(Arc::new(ThreadExecutor::new("visionedge-filter")))
        .initial_mode(config.default_mode)
        .build();

    let mut source_loop = SourceLoop::drive(source, processor.clone(), config.fps)?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &processor, config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    source_loop.stop();
    info!(stats = ?processor.stats(), "Preview finished");

    result
}

/// Action bound to a key in the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreviewCommand {
    SetMode(FilterMode),
    CycleMode,
    Export,
    ToggleHelp,
    Quit,
}

fn command_for_key(key: &KeyEvent) -> Option<PreviewCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(PreviewCommand::Quit);
    }
    match key.code {
        KeyCode::Char('o') => Some(PreviewCommand::SetMode(FilterMode::Passthrough)),
        KeyCode::Char('g') => Some(PreviewCommand::SetMode(FilterMode::Grayscale)),
        KeyCode::Char('e') => Some(PreviewCommand::SetMode(FilterMode::Edge)),
        KeyCode::Char('m') | KeyCode::Tab => Some(PreviewCommand::CycleMode),
        KeyCode::Char('p') => Some(PreviewCommand::Export),
        KeyCode::Char('h') => Some(PreviewCommand::ToggleHelp),
        KeyCode::Char('q') | KeyCode::Esc => Some(PreviewCommand::Quit),
        _ => None,
    }
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    processor: &FrameProcessor,
    config: &Config,
) -> AppResult<()> {
    let mut frame_widget = FrameWidget::new();
    let mut show_help = false;
    let mut notice: Option<String> = None;

    loop {
        frame_widget.update_frame(processor.latest_processed_frame());

        let message = match &notice {
            Some(notice) => notice.clone(),
            None if show_help => build_help_message(),
            None => build_status_message(processor.mode(), &processor.stats()),
        };

        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let frame_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };

            f.render_widget(&frame_widget, frame_area);

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };

            f.render_widget(StatusBar { message: &message }, status_area);
        })?;

        // Handle input with timeout for frame updates
        if event::poll(timing::INPUT_POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && let Some(command) = command_for_key(&key)
        {
            notice = None;
            match command {
                PreviewCommand::SetMode(mode) => processor.set_mode(mode),
                PreviewCommand::CycleMode => {
                    processor.mode_controller().cycle();
                }
                PreviewCommand::Export => {
                    notice = Some(export_latest(processor, config));
                }
                PreviewCommand::ToggleHelp => show_help = !show_help,
                PreviewCommand::Quit => break,
            }
        }
    }

    Ok(())
}

/// Export the latest processed frame, returning a status line
fn export_latest(processor: &FrameProcessor, config: &Config) -> String {
    match storage::export_latest(processor, config) {
        Ok(path) => format!("Saved: {}", path.display()),
        Err(ExportError::NoFrameAvailable) => "No frame to export yet".to_string(),
        Err(e) => {
            error!("Failed to export frame: {}", e);
            format!("Error: {}", e)
        }
    }
}

fn build_status_message(mode: FilterMode, stats: &StatsSnapshot) -> String {
    format!(
        "{} | frames {} dropped {} | 'o'/'g'/'e' mode | 'p' export | 'h' help | 'q' quit",
        mode.display_name(),
        stats.completed,
        stats.dropped
    )
}

fn build_help_message() -> String {
    "o: Original | g: Grayscale | e: Edge | m/Tab: Cycle mode | p: Export PNG | h: Toggle help | q/Ctrl+C: Quit"
        .to_string()
}

/// Widget that renders a processed frame using half-block characters
struct FrameWidget {
    frame: Option<Arc<ProcessedFrame>>,
}

impl FrameWidget {
    fn new() -> Self {
        Self { frame: None }
    }

    fn update_frame(&mut self, frame: Option<Arc<ProcessedFrame>>) {
        if frame.is_some() {
            self.frame = frame;
        }
    }
}

/// Largest size with the frame's aspect ratio that fits `area`, in cells
///
/// Each cell shows two vertically stacked pixels.
fn fit_to_area(frame_width: u32, frame_height: u32, area: Rect) -> (u16, u16) {
    let frame_aspect = frame_width as f64 / frame_height as f64;
    let term_width = area.width as f64;
    let term_height = (area.height as f64) * 2.0;

    if term_height == 0.0 || term_width == 0.0 {
        return (0, 0);
    }

    if term_width / term_height > frame_aspect {
        // Terminal is wider - fit to height
        let w = term_height * frame_aspect;
        (w as u16, area.height)
    } else {
        // Terminal is taller - fit to width
        let h = term_width / frame_aspect;
        (area.width, (h / 2.0) as u16)
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = &self.frame else {
            let msg = "Waiting for frames...";
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        };

        let (display_width, display_height) = fit_to_area(frame.width(), frame.height(), area);
        if display_width == 0 || display_height == 0 {
            return;
        }

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width() as f64 / display_width as f64;
        let y_scale = frame.height() as f64 / (display_height as f64 * 2.0);

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(sample_pixel(frame, src_x, src_y_top));
                    cell.set_bg(sample_pixel(frame, src_x, src_y_bottom));
                }
            }
        }
    }
}

fn sample_pixel(frame: &ProcessedFrame, x: u32, y: u32) -> Color {
    let x = x.min(frame.width() - 1);
    let y = y.min(frame.height() - 1);
    let index = y as usize * frame.width() as usize + x as usize;
    match frame.buffer.pixels().get(index) {
        Some(p) => Color::Rgb(p.r, p.g, p.b),
        None => Color::Black,
    }
}

/// Status bar widget
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        let text: String = self.message.chars().take(area.width as usize).collect();

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::{PixelBuffer, Rgba};
    use std::time::Duration;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn processed(width: u32, height: u32, pixel: Rgba) -> Arc<ProcessedFrame> {
        Arc::new(ProcessedFrame {
            buffer: PixelBuffer::filled(width, height, pixel).unwrap(),
            mode: FilterMode::Passthrough,
            sequence: 1,
            processing_time: Duration::ZERO,
        })
    }

    #[test]
    fn test_mode_keys() {
        assert_eq!(
            command_for_key(&press(KeyCode::Char('o'))),
            Some(PreviewCommand::SetMode(FilterMode::Passthrough))
        );
        assert_eq!(
            command_for_key(&press(KeyCode::Char('g'))),
            Some(PreviewCommand::SetMode(FilterMode::Grayscale))
        );
        assert_eq!(
            command_for_key(&press(KeyCode::Char('e'))),
            Some(PreviewCommand::SetMode(FilterMode::Edge))
        );
        assert_eq!(
            command_for_key(&press(KeyCode::Char('m'))),
            Some(PreviewCommand::CycleMode)
        );
        assert_eq!(command_for_key(&press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(
            command_for_key(&press(KeyCode::Char('q'))),
            Some(PreviewCommand::Quit)
        );
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(command_for_key(&ctrl_c), Some(PreviewCommand::Quit));
    }

    #[test]
    fn test_fit_keeps_aspect_ratio() {
        // 4:3 frame into an 80x24 cell area (80x48 pixels): height bound
        let (w, h) = fit_to_area(640, 480, Rect::new(0, 0, 80, 24));
        assert_eq!((w, h), (64, 24));

        // Wide frame into a tall area: width bound
        let (w, h) = fit_to_area(200, 50, Rect::new(0, 0, 40, 40));
        assert_eq!((w, h), (40, 5));

        assert_eq!(fit_to_area(10, 10, Rect::new(0, 0, 0, 10)), (0, 0));
    }

    #[test]
    fn test_frame_widget_renders_half_blocks() {
        let mut widget = FrameWidget::new();
        widget.update_frame(Some(processed(4, 4, Rgba::new(10, 20, 30, 255))));

        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        (&widget).render(area, &mut buf);

        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(10, 20, 30));
        assert_eq!(cell.bg, Color::Rgb(10, 20, 30));
    }

    #[test]
    fn test_widget_keeps_last_frame() {
        let mut widget = FrameWidget::new();
        widget.update_frame(Some(processed(2, 2, Rgba::OPAQUE_BLACK)));
        widget.update_frame(None);
        assert!(widget.frame.is_some());
    }

    #[test]
    fn test_status_message_shows_mode() {
        let msg = build_status_message(FilterMode::Grayscale, &StatsSnapshot::default());
        assert!(msg.starts_with("GRAYSCALE"));
    }
}
