//! App — the interactive runtime.
//!
//! Owns the single `LetterGrid`, drives the frame clock, and maps keyboard
//! input onto grid operations. The terminal is the app's concern alone:
//! raw mode, the alternate screen, the menu and status chrome, and flushing
//! renderer diffs to stdout all live here.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use crossterm::{cursor, event, execute, queue, style, terminal};
use log::info;

use crate::config::AppConfig;
use crate::grid::LetterGrid;
use crate::grid::layout::Viewport;
use crate::renderer::Renderer;
use crate::scene::{self, Palette};
use crate::types::{Color, NamedColor, Style};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;
/// Rows reserved below the canvas for the status line.
const STATUS_ROWS: u16 = 1;

const MIN_DIM: u16 = 1;
const MAX_DIM: u16 = 99;

/// What a key event asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Continue,
    Generate,
    Shuffle,
    Quit,
}

pub struct App {
    config: AppConfig,
    palette: Palette,
    grid: LetterGrid,
    renderer: Renderer,
    pending_width: u16,
    pending_height: u16,
    last_status: String,
}

impl App {
    pub fn new(config: AppConfig, width: u16, height: u16) -> Self {
        let palette = Palette::from_config(&config);
        let grid = LetterGrid::new(&config);
        App {
            config,
            palette,
            grid,
            renderer: Renderer::new(0, 0),
            pending_width: width.clamp(MIN_DIM, MAX_DIM),
            pending_height: height.clamp(MIN_DIM, MAX_DIM),
            last_status: String::new(),
        }
    }

    /// Run the interactive session.
    ///
    /// Sets up the terminal, enters the frame loop, and restores the
    /// terminal on exit (even on error).
    pub fn run(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        // +2: one row for menu bar, one row for status bar.
        if term_w < 20 || term_h < 10 + CANVAS_OFFSET + STATUS_ROWS {
            bail!("Terminal too small: need at least 20x12, have {term_w}x{term_h}");
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout, term_w, term_h);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout, term_w: u16, term_h: u16) -> Result<()> {
        let mut viewport = canvas_viewport(term_w, term_h);
        self.renderer.invalidate(viewport.width, viewport.height);
        self.grid
            .generate(self.pending_width, self.pending_height, viewport);
        info!(
            "session started with a {}x{} grid",
            self.pending_width, self.pending_height
        );

        self.render_menubar(stdout)?;

        let frame_budget = Duration::from_secs_f32(1.0 / self.config.fps.max(1) as f32);
        let mut last_tick = Instant::now();

        loop {
            if event::poll(frame_budget)? {
                match event::read()? {
                    event::Event::Key(key) => match self.handle_key(key) {
                        Action::Quit => break,
                        Action::Generate => {
                            self.grid
                                .generate(self.pending_width, self.pending_height, viewport);
                        }
                        Action::Shuffle => self.grid.shuffle(Instant::now()),
                        Action::Continue => {}
                    },
                    event::Event::Resize(w, h) => {
                        viewport = canvas_viewport(w, h);
                        self.renderer.invalidate(viewport.width, viewport.height);
                        self.grid.relayout(viewport);
                        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                        self.render_menubar(stdout)?;
                        self.last_status.clear();
                    }
                    _ => {}
                }
            }

            let now = Instant::now();
            let dt = now.duration_since(last_tick).as_secs_f32();
            last_tick = now;
            self.grid.tick(dt, now);

            self.draw_frame(stdout, viewport)?;
            self.render_status(stdout, viewport.height)?;
        }

        Ok(())
    }

    /// Map a key event to an action. Dimension keys mutate the pending size
    /// directly (the status line picks the change up next frame); grid
    /// operations are returned so the loop can supply the viewport and clock.
    fn handle_key(&mut self, key: event::KeyEvent) -> Action {
        use event::KeyCode::*;
        match key.code {
            Char('q') | Esc => Action::Quit,
            Char('g') => Action::Generate,
            Char('s') => Action::Shuffle,
            Right => {
                self.pending_width = (self.pending_width + 1).min(MAX_DIM);
                Action::Continue
            }
            Left => {
                self.pending_width = self.pending_width.saturating_sub(1).max(MIN_DIM);
                Action::Continue
            }
            Up => {
                self.pending_height = (self.pending_height + 1).min(MAX_DIM);
                Action::Continue
            }
            Down => {
                self.pending_height = self.pending_height.saturating_sub(1).max(MIN_DIM);
                Action::Continue
            }
            _ => Action::Continue,
        }
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    /// Resolve, rasterize, and write this frame's cell diffs.
    fn draw_frame(&mut self, stdout: &mut io::Stdout, viewport: Viewport) -> Result<()> {
        let resolved = scene::compose(&self.grid, &self.palette, viewport.width, viewport.height);
        let changes = self.renderer.frame(&resolved);
        if changes.is_empty() {
            return Ok(());
        }
        for change in &changes {
            let cs = to_content_style(&change.cell.style);
            queue!(
                stdout,
                cursor::MoveTo(change.x, change.y + CANVAS_OFFSET),
                style::PrintStyledContent(style::StyledContent::new(cs, change.cell.ch)),
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        let items: &[&str] = &[
            "[\u{2190}\u{2192}] width",
            "[\u{2191}\u{2193}] height",
            "[g] generate",
            "[s] shuffle",
            "[q] quit",
        ];

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(" "),
        )?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                queue!(stdout, style::Print("  "))?;
            }
            print_hint(stdout, item)?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_status(&mut self, stdout: &mut io::Stdout, canvas_height: u16) -> Result<()> {
        let state = if self.grid.is_shuffling() {
            "shuffling"
        } else if self.grid.cells().is_empty() {
            "empty"
        } else {
            "ready"
        };
        let status = format!(
            " grid {}x{} | next {}x{} | {state} ",
            self.grid.cols(),
            self.grid.rows(),
            self.pending_width,
            self.pending_height,
        );
        if status == self.last_status {
            return Ok(());
        }
        self.last_status = status.clone();

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);
        queue!(
            stdout,
            cursor::MoveTo(0, canvas_height + CANVAS_OFFSET),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// The canvas rectangle between the menu and status rows, in canvas-local
/// coordinates (the draw path adds `CANVAS_OFFSET` when writing out).
fn canvas_viewport(term_w: u16, term_h: u16) -> Viewport {
    Viewport {
        x: 0,
        y: 0,
        width: term_w,
        height: term_h.saturating_sub(CANVAS_OFFSET + STATUS_ROWS),
    }
}

/// Print a hint string, bolding the `[key]` part and dimming the rest.
fn print_hint(stdout: &mut io::Stdout, item: &str) -> Result<()> {
    let mut in_brackets = false;
    let mut chunk = String::new();
    for ch in item.chars() {
        match ch {
            '[' => {
                flush_chunk(stdout, &mut chunk, false)?;
                in_brackets = true;
                chunk.push(ch);
            }
            ']' => {
                chunk.push(ch);
                flush_chunk(stdout, &mut chunk, true)?;
                in_brackets = false;
            }
            _ => chunk.push(ch),
        }
    }
    flush_chunk(stdout, &mut chunk, in_brackets)?;
    Ok(())
}

fn flush_chunk(stdout: &mut io::Stdout, chunk: &mut String, bold: bool) -> Result<()> {
    if chunk.is_empty() {
        return Ok(());
    }
    let attr = if bold {
        style::Attribute::Bold
    } else {
        style::Attribute::Dim
    };
    queue!(
        stdout,
        style::SetAttribute(attr),
        style::Print(chunk.as_str()),
        style::SetAttribute(style::Attribute::Reset),
    )?;
    chunk.clear();
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.fg {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.bg {
        cs.background_color = Some(to_ct_color(bg));
    }
    if s.bold {
        cs.attributes.set(style::Attribute::Bold);
    }
    if s.dim {
        cs.attributes.set(style::Attribute::Dim);
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}
