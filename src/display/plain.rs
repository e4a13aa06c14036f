//! Line-oriented backend for periodic text and JSON output.

use std::io::{self, Stdout, Write};

use super::{Attr, Display, WindowSize};

/// Writes straight through to `out`. Attributes are ignored and nothing is
/// ever clipped.
#[derive(Debug)]
pub struct PlainDisplay<W: Write = Stdout> {
    out: W,
}

impl PlainDisplay<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> PlainDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for PlainDisplay<W> {
    fn setup(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn teardown(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn clear(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn refresh(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    fn window_size(&mut self, _force: bool) -> io::Result<WindowSize> {
        Ok(WindowSize::UNBOUNDED)
    }

    fn print(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())
    }

    fn set_attributes(&mut self, _attr: Attr) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prints_verbatim_without_attributes() {
        let mut display = PlainDisplay::new(Vec::new());
        display.setup().unwrap();
        display.set_attributes(Attr::BOLD | Attr::UNDERLINE).unwrap();
        display.print("  PID Major\n").unwrap();
        display.set_attributes(Attr::NORMAL).unwrap();
        display.print("    1     0\n").unwrap();
        display.refresh().unwrap();
        display.teardown().unwrap();

        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(out, "  PID Major\n    1     0\n");
    }

    #[test]
    fn test_window_is_unbounded() {
        let mut display = PlainDisplay::new(Vec::new());
        assert_eq!(display.window_size(true).unwrap(), WindowSize::UNBOUNDED);
        assert!(!display.is_interactive());
    }
}
