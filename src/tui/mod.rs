//! Full-screen interaction without a widget framework.
//!
//! Components draw into a [`Canvas`] cell grid which a [`Screen`] presents in
//! one pass. The crossterm-backed [`Terminal`] is the only real screen; it
//! owns raw mode and the alternate screen for as long as it lives.

pub mod list;
pub mod prompt;

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseEventKind,
};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{
    self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
};
use crossterm::{execute, queue};

use crate::error::UiError;
use self::list::ListView;
use self::prompt::Prompt;

// ── input ──────────────────────────────────────────────────

/// Terminal events reduced to what the components react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    WheelUp,
    WheelDown,
    Confirm,
    Cancel,
    Interrupt,
    Backspace,
    Char(char),
    Resize,
    Other,
}

impl Input {
    pub fn from_event(event: &Event) -> Self {
        match event {
            Event::Key(key) => Self::from_key(key),
            Event::Mouse(mouse) => match mouse.kind {
                MouseEventKind::ScrollUp => Input::WheelUp,
                MouseEventKind::ScrollDown => Input::WheelDown,
                _ => Input::Other,
            },
            Event::Resize(..) => Input::Resize,
            _ => Input::Other,
        }
    }

    fn from_key(key: &KeyEvent) -> Self {
        if key.kind == KeyEventKind::Release {
            return Input::Other;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') | KeyCode::Char('C') => Input::Interrupt,
                _ => Input::Other,
            };
        }
        match key.code {
            KeyCode::Up => Input::Up,
            KeyCode::Down => Input::Down,
            KeyCode::Left => Input::Left,
            KeyCode::Right => Input::Right,
            KeyCode::PageUp => Input::PageUp,
            KeyCode::PageDown => Input::PageDown,
            KeyCode::Enter => Input::Confirm,
            KeyCode::Esc => Input::Cancel,
            KeyCode::Backspace | KeyCode::Delete => Input::Backspace,
            KeyCode::Char(c) => Input::Char(c),
            _ => Input::Other,
        }
    }
}

// ── canvas ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Plain,
    Title,
    Content,
    Cursor,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Tone::Plain => Color::Reset,
            Tone::Title | Tone::Cursor => Color::Green,
            Tone::Content => Color::White,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub tone: Tone,
}

const BLANK: Cell = Cell {
    ch: ' ',
    tone: Tone::Plain,
};

/// Off-screen cell grid. Writes outside the grid are clipped.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![BLANK; usize::from(width) * usize::from(height)],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok().filter(|x| *x < usize::from(self.width))?;
        let y = usize::try_from(y).ok().filter(|y| *y < usize::from(self.height))?;
        Some(y * usize::from(self.width) + x)
    }

    pub fn set(&mut self, x: i32, y: i32, ch: char, tone: Tone) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = Cell { ch, tone };
        }
    }

    pub fn text(&mut self, x: i32, y: i32, text: &str, tone: Tone) {
        for (offset, ch) in (0..).zip(text.chars()) {
            self.set(x + offset, y, ch, tone);
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Cell> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Characters of row `y`, trailing blanks removed.
    pub fn row(&self, y: u16) -> String {
        let start = usize::from(y) * usize::from(self.width);
        let end = start + usize::from(self.width);
        self.cells
            .get(start..end)
            .map(|cells| cells.iter().map(|c| c.ch).collect::<String>())
            .unwrap_or_default()
            .trim_end()
            .to_string()
    }

    /// Rectangle outline with inclusive corners.
    pub fn frame(&mut self, left: i32, top: i32, right: i32, bottom: i32) {
        for x in left + 1..right {
            self.set(x, top, '─', Tone::Plain);
            self.set(x, bottom, '─', Tone::Plain);
        }
        for y in top + 1..bottom {
            self.set(left, y, '│', Tone::Plain);
            self.set(right, y, '│', Tone::Plain);
        }
        self.set(left, top, '┌', Tone::Plain);
        self.set(right, top, '┐', Tone::Plain);
        self.set(left, bottom, '└', Tone::Plain);
        self.set(right, bottom, '┘', Tone::Plain);
    }
}

/// Display width in terminal columns.
pub fn text_width(text: &str) -> i32 {
    i32::try_from(console::measure_text_width(text)).unwrap_or(i32::MAX)
}

// ── screen ─────────────────────────────────────────────────

/// The drawable surface plus its event source. One owner at a time.
pub trait Screen {
    fn size(&self) -> io::Result<(u16, u16)>;
    fn present(&mut self, canvas: &Canvas) -> io::Result<()>;
    /// Block until the next input or resize.
    fn next_input(&mut self) -> io::Result<Input>;
}

/// Fresh canvas matching the current screen size.
pub fn blank_canvas<S: Screen>(screen: &S) -> io::Result<Canvas> {
    let (width, height) = screen.size()?;
    Ok(Canvas::new(width, height))
}

/// Raw-mode alternate screen with mouse reporting. Restored on drop.
pub struct Terminal {
    out: Stdout,
}

impl Terminal {
    pub fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        if let Err(e) = execute!(out, EnterAlternateScreen, EnableMouseCapture, Hide) {
            let _ = execute!(out, Show, DisableMouseCapture, LeaveAlternateScreen);
            let _ = disable_raw_mode();
            return Err(e);
        }
        Ok(Self { out })
    }
}

impl Screen for Terminal {
    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn present(&mut self, canvas: &Canvas) -> io::Result<()> {
        queue!(self.out, Clear(ClearType::All))?;
        for y in 0..canvas.height() {
            queue!(self.out, MoveTo(0, y))?;
            let mut tone = None;
            for x in 0..canvas.width() {
                let cell = canvas.get(i32::from(x), i32::from(y)).unwrap_or(BLANK);
                if tone != Some(cell.tone) {
                    queue!(self.out, SetForegroundColor(cell.tone.color()))?;
                    tone = Some(cell.tone);
                }
                queue!(self.out, Print(cell.ch))?;
            }
        }
        queue!(self.out, ResetColor)?;
        self.out.flush()
    }

    fn next_input(&mut self) -> io::Result<Input> {
        loop {
            match Input::from_event(&event::read()?) {
                Input::Other => continue,
                input => return Ok(input),
            }
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = execute!(self.out, ResetColor, Show, DisableMouseCapture, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

// ── console ────────────────────────────────────────────────

/// Interactive sessions the run flow needs.
pub trait Console {
    /// Let the operator pick one of `items`; returns its index.
    fn select(&mut self, title: &str, items: Vec<String>) -> Result<usize, UiError>;
    /// Ask for one line of text.
    fn ask(&mut self, label: &str) -> Result<String, UiError>;
}

/// Runs each session on its own [`Terminal`], released before returning.
pub struct TerminalConsole;

impl Console for TerminalConsole {
    fn select(&mut self, title: &str, items: Vec<String>) -> Result<usize, UiError> {
        let mut screen = Terminal::acquire().map_err(UiError::Surface)?;
        ListView::new(title, items).run(&mut screen)
    }

    fn ask(&mut self, label: &str) -> Result<String, UiError> {
        let mut screen = Terminal::acquire().map_err(UiError::Surface)?;
        Prompt::new(label).run(&mut screen)
    }
}
