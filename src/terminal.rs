//! Presenting a [`PixelCanvas`] in a terminal and turning terminal input
//! into host events.
//!
//! Each character cell shows two device pixels stacked vertically using the
//! upper half block, foreground on top and background below.

use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
    KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::{debug, info};

use crate::graphics::PixelCanvas;
use crate::host::HostEvent;
use crate::surface::SurfaceSize;

const UPPER_HALF: char = '\u{2580}';

/// Colour behind every scene.
pub const BACKDROP: [u8; 3] = [10, 10, 10];

/// Logical scroll distance of one wheel notch.
pub const SCROLL_STEP: f64 = 40.0;

/// Raw mode, alternate screen, mouse and focus reporting for as long as the
/// guard lives.
#[derive(Debug)]
pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let guard = Self { _private: () };
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange,
            Hide
        )?;
        info!("terminal session started");
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        let _ = execute!(
            stdout,
            ResetColor,
            Show,
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = disable_raw_mode();
        let _ = stdout.flush();
        info!("terminal restored");
    }
}

/// Logical surface covering a grid of `columns` x `rows` cells.
pub fn surface_for_cells(columns: u16, rows: u16, pixel_ratio: f64) -> SurfaceSize {
    let probe = SurfaceSize::with_pixel_ratio(1.0, 1.0, pixel_ratio);
    SurfaceSize::with_pixel_ratio(
        columns as f64 / probe.pixel_ratio,
        rows as f64 * 2.0 / probe.pixel_ratio,
        probe.pixel_ratio,
    )
}

/// Logical coordinates of the centre of a cell.
pub fn cell_to_logical(column: u16, row: u16, pixel_ratio: f64) -> [f64; 2] {
    [
        (column as f64 + 0.5) / pixel_ratio,
        (row as f64 * 2.0 + 1.0) / pixel_ratio,
    ]
}

/// Straight-alpha pixel composited over the backdrop.
fn over_backdrop(pixel: [u8; 4]) -> Color {
    let alpha = pixel[3] as f64 / 255.0;
    let mix = |src: u8, dst: u8| (src as f64 * alpha + dst as f64 * (1.0 - alpha)).round() as u8;
    Color::Rgb {
        r: mix(pixel[0], BACKDROP[0]),
        g: mix(pixel[1], BACKDROP[1]),
        b: mix(pixel[2], BACKDROP[2]),
    }
}

/// Top and bottom colours of the cell at `(column, row)`.
pub fn cell_colors(canvas: &PixelCanvas, column: usize, row: usize) -> (Color, Color) {
    (
        over_backdrop(canvas.pixel(column, row * 2)),
        over_backdrop(canvas.pixel(column, row * 2 + 1)),
    )
}

/// Writes the whole canvas to `out` as half-block cells, clipped to
/// `columns` x `rows`.
pub fn present(
    canvas: &PixelCanvas,
    columns: u16,
    rows: u16,
    out: &mut impl Write,
) -> io::Result<()> {
    let columns = (columns as usize).min(canvas.width());
    let rows = (rows as usize).min(canvas.height().div_ceil(2));
    let mut current: Option<(Color, Color)> = None;

    for row in 0..rows {
        queue!(out, MoveTo(0, row as u16))?;
        for column in 0..columns {
            let (top, bottom) = cell_colors(canvas, column, row);
            if current.map_or(true, |(fg, _)| fg != top) {
                queue!(out, SetForegroundColor(top))?;
            }
            if current.map_or(true, |(_, bg)| bg != bottom) {
                queue!(out, SetBackgroundColor(bottom))?;
            }
            current = Some((top, bottom));
            queue!(out, Print(UPPER_HALF))?;
        }
    }
    queue!(out, ResetColor)?;
    out.flush()
}

/// What the binary should do with a terminal event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Forward(HostEvent),
    /// The terminal grid changed to `columns` x `rows`.
    Resize { columns: u16, rows: u16 },
    Quit,
}

/// Maps crossterm events onto host events, tracking the scroll offset.
#[derive(Debug, Clone)]
pub struct InputTranslator {
    pixel_ratio: f64,
    scroll: f64,
}

impl InputTranslator {
    pub fn new(pixel_ratio: f64) -> Self {
        Self {
            pixel_ratio: SurfaceSize::with_pixel_ratio(1.0, 1.0, pixel_ratio).pixel_ratio,
            scroll: 0.0,
        }
    }

    pub fn scroll(&self) -> f64 {
        self.scroll
    }

    pub fn translate(&mut self, event: &Event) -> Option<Action> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(Action::Quit)
                }
                _ => None,
            },
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::Moved | MouseEventKind::Drag(_) | MouseEventKind::Down(_) => {
                    let [x, y] = cell_to_logical(mouse.column, mouse.row, self.pixel_ratio);
                    Some(Action::Forward(HostEvent::PointerMove { x, y }))
                }
                MouseEventKind::ScrollDown => Some(self.scroll_by(SCROLL_STEP)),
                MouseEventKind::ScrollUp => Some(self.scroll_by(-SCROLL_STEP)),
                _ => None,
            },
            Event::FocusLost => Some(Action::Forward(HostEvent::PointerLeave)),
            Event::Resize(columns, rows) => {
                debug!(columns, rows, "terminal resized");
                Some(Action::Resize {
                    columns: *columns,
                    rows: *rows,
                })
            }
            _ => None,
        }
    }

    fn scroll_by(&mut self, delta: f64) -> Action {
        self.scroll = (self.scroll + delta).max(0.0);
        Action::Forward(HostEvent::Scroll {
            offset: self.scroll,
        })
    }
}
