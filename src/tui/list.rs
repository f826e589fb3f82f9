//! Bordered, centered menu with a movable cursor.

use super::{Canvas, Input, Screen, Tone, blank_canvas, text_width};
use crate::error::UiError;

/// Columns added to the widest row: cursor margin plus breathing room.
const ROW_PADDING: i32 = 12;
const CURSOR_COLUMN: i32 = 2;
const CONTENT_COLUMN: i32 = 4;
const CURSOR: char = '>';

/// Box placement for one redraw. Always derived from terminal size and
/// content, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub origin_x: i32,
    pub origin_y: i32,
    pub width: i32,
    pub height: i32,
    pub title_x: i32,
    pub title_y: i32,
}

/// Result of feeding one input to the view.
#[derive(Debug)]
pub enum Step {
    Redraw,
    Ignore,
    Done(Result<usize, UiError>),
}

pub struct ListView {
    title: String,
    items: Vec<String>,
    selected: usize,
}

impl ListView {
    pub fn new(title: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            title: title.into(),
            items,
            selected: 0,
        }
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Returns whether the cursor moved. Stops at the first row.
    pub fn move_up(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        true
    }

    /// Returns whether the cursor moved. Stops at the last row.
    pub fn move_down(&mut self) -> bool {
        if self.selected + 1 >= self.items.len() {
            return false;
        }
        self.selected += 1;
        true
    }

    pub fn geometry(&self, term_width: u16, term_height: u16) -> Geometry {
        let rows = i32::try_from(self.items.len()).unwrap_or(i32::MAX - 2);
        let widest = self.items.iter().map(|l| text_width(l)).max().unwrap_or(0);
        let title_width = text_width(&self.title);

        let height = rows + 2;
        let width = (widest + ROW_PADDING).max(title_width);
        let center_x = i32::from(term_width) / 2;
        let center_y = i32::from(term_height) / 2;

        Geometry {
            origin_x: center_x - width / 2,
            origin_y: center_y - height / 2,
            width,
            height,
            title_x: center_x - title_width / 2,
            title_y: center_y - height / 2 - 2,
        }
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let g = self.geometry(canvas.width(), canvas.height());
        canvas.frame(
            g.origin_x,
            g.origin_y,
            g.origin_x + g.width - 1,
            g.origin_y + g.height - 1,
        );
        canvas.text(g.title_x, g.title_y, &self.title, Tone::Title);

        for (row, line) in (0..).zip(&self.items) {
            let y = g.origin_y + 1 + row;
            if usize::try_from(row).is_ok_and(|r| r == self.selected) {
                canvas.set(g.origin_x + CURSOR_COLUMN, y, CURSOR, Tone::Cursor);
            }
            canvas.text(g.origin_x + CONTENT_COLUMN, y, line, Tone::Content);
        }
    }

    pub fn handle(&mut self, input: Input) -> Step {
        match input {
            Input::Up
            | Input::Left
            | Input::PageUp
            | Input::WheelUp
            | Input::Char('k')
            | Input::Char('K') => {
                self.move_up();
                Step::Redraw
            }
            Input::Down
            | Input::Right
            | Input::PageDown
            | Input::WheelDown
            | Input::Char('j')
            | Input::Char('J') => {
                self.move_down();
                Step::Redraw
            }
            Input::Resize => Step::Redraw,
            Input::Confirm => Step::Done(Ok(self.selected)),
            Input::Cancel | Input::Char('q') | Input::Char('Q') => {
                Step::Done(Err(UiError::Cancelled))
            }
            Input::Interrupt => Step::Done(Err(UiError::Interrupted)),
            _ => Step::Ignore,
        }
    }

    fn draw<S: Screen>(&self, screen: &mut S) -> Result<(), UiError> {
        let mut canvas = blank_canvas(screen).map_err(UiError::Surface)?;
        self.render(&mut canvas);
        screen.present(&canvas).map_err(UiError::Surface)
    }

    /// Show the menu until the operator confirms or cancels.
    pub fn run<S: Screen>(&mut self, screen: &mut S) -> Result<usize, UiError> {
        if self.items.is_empty() {
            return Err(UiError::NothingToSelect);
        }
        self.draw(screen)?;
        loop {
            let input = screen.next_input().map_err(UiError::Surface)?;
            match self.handle(input) {
                Step::Redraw => self.draw(screen)?,
                Step::Ignore => {}
                Step::Done(result) => return result,
            }
        }
    }
}
