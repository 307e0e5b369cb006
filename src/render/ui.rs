//! Terminal UI for the live waveform.
//!
//! Draws the visible sample window as a stroked polyline on a logical
//! 800x300 canvas mapped onto the terminal, with a one-line footer showing
//! session state, duration, and drop counters. The whole frame is redrawn
//! on every render call.

use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    prelude::*,
    symbols,
    widgets::canvas::{Canvas, Line as CanvasLine},
    widgets::Paragraph,
};
use std::io::{stdout, Stdout};
use std::time::Duration;

use crate::capture::CaptureState;
use crate::render::path;

/// Stroke color of the waveform polyline (steelblue).
const STROKE_COLOR: Color = Color::Rgb(70, 130, 180);

/// User input command during a scope session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeCommand {
    /// Keep going (no key or an unrecognized key)
    Continue,
    /// Start, stop, or restart the capture (Space or Enter)
    Toggle,
    /// Leave the scope (Escape, 'q', or Ctrl+C)
    Quit,
}

/// Per-frame session info shown in the footer.
pub struct FrameStatus {
    pub state: CaptureState,
    pub sample_rate: u32,
    pub blocks_dropped: usize,
    pub elapsed: Duration,
}

/// Full-screen waveform display.
pub struct ScopeTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    canvas_width: f64,
    canvas_height: f64,
}

impl ScopeTui {
    /// Enters the alternate screen and raw mode.
    ///
    /// # Errors
    /// - If the terminal cannot be initialized
    pub fn new(canvas_width: f64, canvas_height: f64) -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            canvas_width,
            canvas_height,
        })
    }

    /// Renders one frame: waveform polyline plus footer. With no visible
    /// samples the canvas is left empty.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, samples: &[f32], status: &FrameStatus) -> anyhow::Result<()> {
        let points = path::project(samples, self.canvas_width, self.canvas_height);

        let width = self.canvas_width;
        let height = self.canvas_height;
        let footer = footer_line(status, samples.len());

        self.terminal.draw(|frame| {
            let area = frame.area();
            let footer_height = 1;

            let content_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            // The canvas origin is bottom-left while path points use
            // top-left screen coordinates, so y is flipped on draw.
            let canvas = Canvas::default()
                .x_bounds([0.0, width])
                .y_bounds([0.0, height])
                .marker(symbols::Marker::Braille)
                .paint(|ctx| {
                    for pair in points.windows(2) {
                        let (x1, y1) = pair[0];
                        let (x2, y2) = pair[1];
                        ctx.draw(&CanvasLine {
                            x1,
                            y1: height - y1,
                            x2,
                            y2: height - y2,
                            color: STROKE_COLOR,
                        });
                    }
                });
            frame.render_widget(canvas, content_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };
            frame.render_widget(Paragraph::new(footer), footer_area);
        })?;

        Ok(())
    }

    /// Polls for user input for up to 50ms.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> anyhow::Result<ScopeCommand> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Char(' ') | KeyCode::Enter => {
                        tracing::debug!("Toggle key pressed");
                        ScopeCommand::Toggle
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Quit key pressed");
                        ScopeCommand::Quit
                    }
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        tracing::debug!("Ctrl+C pressed");
                        ScopeCommand::Quit
                    }
                    _ => ScopeCommand::Continue,
                });
            }
        }
        Ok(ScopeCommand::Continue)
    }

    /// Restores the terminal.
    ///
    /// # Errors
    /// - If raw mode cannot be disabled
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

fn footer_line(status: &FrameStatus, visible: usize) -> Line<'static> {
    let indicator = match status.state {
        CaptureState::Idle => Span::styled("○ idle ", Style::default().fg(Color::DarkGray)),
        CaptureState::Capturing => Span::styled("● rec ", Style::default().fg(Color::Red)),
        CaptureState::Stopped => Span::styled("■ stopped ", Style::default().fg(Color::Yellow)),
    };

    let secs = status.elapsed.as_secs();
    let duration = Span::raw(format!("{}:{:02}", secs / 60, secs % 60));

    let mut spans = vec![
        indicator,
        duration,
        Span::raw(format!(" / {visible} samples")),
    ];

    if status.sample_rate > 0 {
        spans.push(Span::raw(format!(" / {}Hz", status.sample_rate)));
    }
    if status.blocks_dropped > 0 {
        spans.push(Span::styled(
            format!(" / {} dropped", status.blocks_dropped),
            Style::default().fg(Color::Red),
        ));
    }

    spans.push(Span::styled(
        "   space: start/stop  q: quit",
        Style::default().fg(Color::DarkGray),
    ));

    Line::from(spans)
}
