//! Single-line text entry in a centered box.

use super::{Canvas, Input, Screen, Tone, blank_canvas, text_width};
use crate::error::UiError;

const MIN_WIDTH: i32 = 20;

#[derive(Debug)]
pub enum Step {
    Redraw,
    Ignore,
    Done(Result<String, UiError>),
}

pub struct Prompt {
    label: String,
    buffer: Vec<char>,
}

impl Prompt {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            buffer: Vec::new(),
        }
    }

    pub fn text(&self) -> String {
        self.buffer.iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn push(&mut self, ch: char) {
        self.buffer.push(ch);
    }

    /// Drop the last character; no-op when empty.
    pub fn erase(&mut self) {
        self.buffer.pop();
    }

    pub fn box_width(&self) -> i32 {
        let text = i32::try_from(self.buffer.len()).unwrap_or(i32::MAX - 2);
        (text + 2).max(MIN_WIDTH)
    }

    pub fn render(&self, canvas: &mut Canvas) {
        let center_x = i32::from(canvas.width()) / 2;
        let center_y = i32::from(canvas.height()) / 2;
        let half = self.box_width() / 2;

        canvas.frame(center_x - half, center_y - 1, center_x + half, center_y + 1);

        let label_width = text_width(&self.label);
        canvas.text(center_x - label_width / 2, center_y - 2, &self.label, Tone::Title);

        let text = self.text();
        let width = text_width(&text);
        canvas.text(center_x - width / 2, center_y, &text, Tone::Plain);
    }

    pub fn handle(&mut self, input: Input) -> Step {
        match input {
            Input::Char(ch) if !ch.is_control() => {
                self.push(ch);
                Step::Redraw
            }
            Input::Backspace => {
                self.erase();
                Step::Redraw
            }
            Input::Resize => Step::Redraw,
            Input::Confirm => Step::Done(Ok(self.text())),
            Input::Cancel => Step::Done(Err(UiError::Cancelled)),
            Input::Interrupt => Step::Done(Err(UiError::Interrupted)),
            _ => Step::Ignore,
        }
    }

    fn draw<S: Screen>(&self, screen: &mut S) -> Result<(), UiError> {
        let mut canvas = blank_canvas(screen).map_err(UiError::Surface)?;
        self.render(&mut canvas);
        screen.present(&canvas).map_err(UiError::Surface)
    }

    /// Collect text until Enter; Esc and Ctrl+C give up without a value.
    pub fn run<S: Screen>(&mut self, screen: &mut S) -> Result<String, UiError> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::testing::ScriptedScreen;

    fn typed(s: &str) -> Vec<Input> {
        s.chars().map(Input::Char).collect()
    }

    #[test]
    fn typing_and_submitting() {
        let mut inputs = typed("admin");
        inputs.push(Input::Confirm);
        let mut screen = ScriptedScreen::new((80, 24), inputs);
        assert_eq!(Prompt::new("user?").run(&mut screen).unwrap(), "admin");
        assert_eq!(screen.frames.len(), 6);
        assert!(screen.last_frame().row(12).contains("admin"));
    }

    #[test]
    fn backspace_removes_last_character() {
        let mut inputs = typed("roots");
        inputs.push(Input::Backspace);
        inputs.push(Input::Confirm);
        let mut screen = ScriptedScreen::new((80, 24), inputs);
        assert_eq!(Prompt::new("user?").run(&mut screen).unwrap(), "root");
    }

    #[test]
    fn backspace_on_empty_buffer_is_noop() {
        let mut p = Prompt::new("user?");
        for _ in 0..5 {
            p.handle(Input::Backspace);
        }
        assert!(p.is_empty());
        p.handle(Input::Char('a'));
        for _ in 0..3 {
            p.handle(Input::Backspace);
        }
        assert!(p.is_empty());
        p.handle(Input::Char('b'));
        assert_eq!(p.text(), "b");
    }

    #[test]
    fn control_characters_are_ignored() {
        let mut p = Prompt::new("user?");
        assert!(matches!(p.handle(Input::Char('\u{7}')), Step::Ignore));
        assert!(matches!(p.handle(Input::Up), Step::Ignore));
        assert!(p.is_empty());
    }

    #[test]
    fn space_is_kept() {
        let mut p = Prompt::new("user?");
        for input in typed("a b") {
            p.handle(input);
        }
        assert_eq!(p.text(), "a b");
    }

    #[test]
    fn cancel_and_interrupt() {
        let mut screen = ScriptedScreen::new((80, 24), [Input::Char('x'), Input::Cancel]);
        assert!(matches!(Prompt::new("u").run(&mut screen), Err(UiError::Cancelled)));

        let mut screen = ScriptedScreen::new((80, 24), [Input::Interrupt]);
        assert!(matches!(Prompt::new("u").run(&mut screen), Err(UiError::Interrupted)));

        let mut screen = ScriptedScreen::new((80, 24), Vec::new()).then_fail();
        assert!(matches!(Prompt::new("u").run(&mut screen), Err(UiError::Surface(_))));
    }

    #[test]
    fn box_grows_with_text() {
        let mut p = Prompt::new("u");
        assert_eq!(p.box_width(), 20);
        for input in typed(&"x".repeat(25)) {
            p.handle(input);
        }
        assert_eq!(p.box_width(), 27);
    }

    #[test]
    fn render_layout() {
        let mut p = Prompt::new("Enter your username for dev (10.0.0.2)");
        for input in typed("bob") {
            p.handle(input);
        }
        let mut canvas = Canvas::new(60, 20);
        p.render(&mut canvas);

        assert_eq!(canvas.row(8).trim(), "Enter your username for dev (10.0.0.2)");
        assert_eq!(canvas.row(9).trim(), format!("┌{}┐", "─".repeat(19)));
        assert_eq!(canvas.row(10).trim(), format!("│{}bob{}│", " ".repeat(8), " ".repeat(8)));
        assert_eq!(canvas.row(11).trim(), format!("└{}┘", "─".repeat(19)));
    }
}
