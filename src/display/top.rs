//! Full-screen dashboard backend.
//!
//! Each frame is assembled in memory and written in one go on `refresh`, so
//! a frame never appears half drawn. Output past the last row or column is
//! dropped.

use std::io::{self, Stdout, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{Attribute, SetAttribute};
use crossterm::terminal::{
    self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use crossterm::{execute, queue};
use tracing::debug;

use super::{Attr, Display, WindowSize};

#[derive(Debug)]
pub struct TopDisplay<W: Write = Stdout> {
    out: W,
    frame: Vec<u8>,
    size: Option<WindowSize>,
    row: u16,
    col: u16,
    active: bool,
}

impl TopDisplay<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TopDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            frame: Vec::with_capacity(16 * 1024),
            size: None,
            row: 0,
            col: 0,
            active: false,
        }
    }

    /// Pins the window size instead of asking the terminal.
    pub fn with_size(mut self, size: WindowSize) -> Self {
        self.size = Some(size);
        self
    }

    fn query_size() -> WindowSize {
        match terminal::size() {
            Ok((cols, rows)) if cols > 0 && rows > 0 => WindowSize { rows, cols },
            _ => WindowSize::default(),
        }
    }

    fn bounds(&mut self) -> WindowSize {
        *self.size.get_or_insert_with(Self::query_size)
    }
}

impl<W: Write> Display for TopDisplay<W> {
    fn setup(&mut self) -> io::Result<()> {
        enable_raw_mode()?;
        execute!(self.out, EnterAlternateScreen, Hide)?;
        self.active = true;
        debug!("Dashboard terminal set up");
        Ok(())
    }

    fn teardown(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;
        execute!(self.out, SetAttribute(Attribute::Reset), Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        debug!("Dashboard terminal restored");
        Ok(())
    }

    fn clear(&mut self) -> io::Result<()> {
        self.frame.clear();
        self.row = 0;
        self.col = 0;
        queue!(self.frame, MoveTo(0, 0), Clear(ClearType::All))
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.out.write_all(&self.frame)?;
        self.frame.clear();
        self.out.flush()
    }

    fn window_size(&mut self, force: bool) -> io::Result<WindowSize> {
        if force {
            self.size = Some(Self::query_size());
        }
        Ok(self.bounds())
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        let size = self.bounds();
        let mut buf = [0u8; 4];

        for ch in text.chars() {
            if ch == '\n' {
                self.row = self.row.saturating_add(1);
                self.col = 0;
                if self.row < size.rows {
                    self.frame.extend_from_slice(b"\r\n");
                }
                continue;
            }
            if self.row < size.rows && self.col < size.cols {
                self.frame
                    .extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                self.col += 1;
            }
        }
        Ok(())
    }

    fn set_attributes(&mut self, attr: Attr) -> io::Result<()> {
        queue!(self.frame, SetAttribute(Attribute::Reset))?;
        if attr.contains(Attr::BOLD) {
            queue!(self.frame, SetAttribute(Attribute::Bold))?;
        }
        if attr.contains(Attr::UNDERLINE) {
            queue!(self.frame, SetAttribute(Attribute::Underlined))?;
        }
        Ok(())
    }

    fn is_interactive(&self) -> bool {
        true
    }
}

impl<W: Write> Drop for TopDisplay<W> {
    fn drop(&mut self) {
        let _ = self.teardown();
    }
}
