//! Display contract shared by the rendering backends.
//!
//! The sampling loop and the renderer only ever talk to a `dyn Display`;
//! which backend is behind it is decided once at startup:
//! - `plain`: line-oriented writer for periodic text and JSON output
//! - `top`: full-screen dashboard on the alternate screen

pub mod plain;
pub mod top;

use std::io;
use std::ops::BitOr;

pub use plain::PlainDisplay;
pub use top::TopDisplay;

/// Text attribute bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Attr(u8);

impl Attr {
    pub const NORMAL: Attr = Attr(0);
    pub const BOLD: Attr = Attr(1);
    pub const UNDERLINE: Attr = Attr(1 << 1);

    pub fn contains(self, other: Attr) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Attr {
    type Output = Attr;

    fn bitor(self, rhs: Attr) -> Attr {
        Attr(self.0 | rhs.0)
    }
}

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
}

impl WindowSize {
    /// Size reported by backends that never clip.
    pub const UNBOUNDED: WindowSize = WindowSize {
        rows: u16::MAX,
        cols: u16::MAX,
    };
}

impl Default for WindowSize {
    fn default() -> Self {
        WindowSize { rows: 24, cols: 80 }
    }
}

/// Rendering surface.
pub trait Display {
    /// Prepares the terminal. Called once before the first frame.
    fn setup(&mut self) -> io::Result<()>;

    /// Restores the terminal. Must be safe to call more than once.
    fn teardown(&mut self) -> io::Result<()>;

    /// Starts a new frame.
    fn clear(&mut self) -> io::Result<()>;

    /// Makes everything printed since the last `clear` visible.
    fn refresh(&mut self) -> io::Result<()>;

    /// Current dimensions; `force` re-queries the terminal instead of
    /// returning the cached value.
    fn window_size(&mut self, force: bool) -> io::Result<WindowSize>;

    fn print(&mut self, text: &str) -> io::Result<()>;

    fn set_attributes(&mut self, attr: Attr) -> io::Result<()>;

    /// True for backends that own the whole screen and read keystrokes.
    fn is_interactive(&self) -> bool {
        false
    }
}
