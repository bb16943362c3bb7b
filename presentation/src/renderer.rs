use crossterm::{
    cursor::MoveLeft,
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use domain::ports::StreamSink;
use infrastructure::stream_decoder::CURSOR_GLYPH;
use std::io::Write;

/// Prints a growing answer in place, keeping one cursor glyph at the end.
pub struct TerminalSink<W: Write> {
    out: W,
    printed: usize,
    cursor_shown: bool,
}

impl TerminalSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            cursor_shown: false,
        }
    }

    pub fn has_output(&self) -> bool {
        self.printed > 0
    }

    fn erase_cursor(&mut self) {
        if self.cursor_shown {
            let _ = queue!(self.out, MoveLeft(1), Clear(ClearType::UntilNewLine));
            self.cursor_shown = false;
        }
    }

    fn print_suffix(&mut self, text: &str) {
        if let Some(fresh) = text.get(self.printed..) {
            if !fresh.is_empty() {
                let _ = queue!(self.out, Print(fresh));
            }
            self.printed = text.len();
        }
    }

    /// Drop the cursor after an aborted stream and move to a fresh line.
    pub fn abandon(&mut self) {
        self.erase_cursor();
        if self.printed > 0 {
            let _ = queue!(self.out, Print("\n"));
        }
        let _ = self.out.flush();
        self.printed = 0;
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> StreamSink for TerminalSink<W> {
    fn on_partial(&mut self, display: &str) {
        let text = display.strip_suffix(CURSOR_GLYPH).unwrap_or(display);
        self.erase_cursor();
        self.print_suffix(text);
        let _ = queue!(self.out, Print(CURSOR_GLYPH));
        self.cursor_shown = true;
        let _ = self.out.flush();
    }

    fn on_complete(&mut self, text: &str) {
        self.erase_cursor();
        self.print_suffix(text);
        let _ = queue!(self.out, Print("\n"));
        let _ = self.out.flush();
        self.printed = 0;
    }
}
