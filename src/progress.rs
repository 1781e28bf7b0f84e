// Line-addressed live progress block shared by all workers
use crossterm::{
    cursor::{Hide, MoveToNextLine, MoveToPreviousLine, Show},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// Braille spinner cycle, advanced once per progress update.
pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠶', '⠷', '⠧', '⠏'];

#[derive(Debug, Clone, Default)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Iterator for Spinner {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        let glyph = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        self.frame = self.frame.wrapping_add(1);
        Some(glyph)
    }
}

/// A block of `lines` terminal lines reserved above the cursor.
///
/// Each worker owns one line (its slot) for the whole batch. Every `log` is
/// rendered into one buffer and written with a single `write_all` under the
/// lock, so escape sequences from concurrent workers never interleave.
pub struct ProgressReporter<W: Write> {
    lines: usize,
    width: Option<usize>,
    out: Mutex<W>,
    cursor_hidden: AtomicBool,
}

impl<W: Write> ProgressReporter<W> {
    /// Reserve `lines` blank lines and hide the cursor.
    pub fn new(lines: usize, mut out: W) -> io::Result<Self> {
        let mut buf = Vec::new();
        for _ in 0..lines {
            queue!(buf, Clear(ClearType::UntilNewLine), Print('\n'))?;
        }
        queue!(buf, Hide)?;
        out.write_all(&buf)?;
        out.flush()?;

        Ok(Self {
            lines,
            width: None,
            out: Mutex::new(out),
            cursor_hidden: AtomicBool::new(true),
        })
    }

    /// Cut messages to fit a terminal `width` columns wide. A message that
    /// wraps would push every line below it out of place.
    pub fn with_width(mut self, width: Option<usize>) -> Self {
        self.width = width;
        self
    }

    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Replace the content of `line` (0 = top of the block) with `message`.
    ///
    /// Display problems never fail the caller; they are traced and dropped.
    pub fn log(&self, line: usize, message: &str) {
        if let Err(e) = self.try_log(line, message) {
            trace!("progress line {} not updated: {}", line, e);
        }
    }

    pub fn try_log(&self, line: usize, message: &str) -> io::Result<()> {
        if line >= self.lines {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("line {} outside progress block of {}", line, self.lines),
            ));
        }
        let offset = u16::try_from(self.lines - line)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let message = fit_line(message, self.width);

        let mut buf = Vec::with_capacity(message.len() + 16);
        queue!(
            buf,
            MoveToPreviousLine(offset),
            Clear(ClearType::CurrentLine),
            Print(message),
            MoveToNextLine(offset)
        )?;
        self.write_unit(&buf)
    }

    /// Make the cursor visible again. Only the first call writes anything.
    pub fn restore_cursor(&self) -> io::Result<()> {
        if !self.cursor_hidden.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        let mut buf = Vec::new();
        queue!(buf, Show)?;
        self.write_unit(&buf)
    }

    fn write_unit(&self, buf: &[u8]) -> io::Result<()> {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        out.write_all(buf)?;
        out.flush()
    }
}

/// Keeps the terminal usable: the cursor is shown again when the guard goes
/// out of scope, whether the batch finished, failed, panicked or was
/// interrupted.
pub struct CursorGuard<W: Write> {
    reporter: Arc<ProgressReporter<W>>,
}

impl<W: Write> CursorGuard<W> {
    pub fn new(reporter: Arc<ProgressReporter<W>>) -> Self {
        Self { reporter }
    }
}

impl<W: Write> Drop for CursorGuard<W> {
    fn drop(&mut self) {
        let _ = self.reporter.restore_cursor();
    }
}

/// Flatten line breaks and keep the message short of the last column, where
/// the terminal would wrap.
fn fit_line(message: &str, width: Option<usize>) -> String {
    let line: String = message
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    let Some(width) = width else {
        return line;
    };

    let max = width.saturating_sub(1);
    if line.chars().count() <= max {
        return line;
    }
    if max == 0 {
        return String::new();
    }
    let mut cut: String = line.chars().take(max - 1).collect();
    cut.push('…');
    cut
}
