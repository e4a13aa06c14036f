//! Keystroke handling between ticks.

use std::collections::VecDeque;
use std::io::IsTerminal;

/// What a single keystroke asks the loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Quit,
    ToggleArrows,
    ToggleTotals,
    NextSort,
}

impl KeyCommand {
    /// Interprets one input byte. Ctrl-C arrives as byte 3 while the
    /// dashboard holds the terminal in raw mode.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'q' | b'Q' | 27 | 3 => Some(KeyCommand::Quit),
            b'a' => Some(KeyCommand::ToggleArrows),
            b't' => Some(KeyCommand::ToggleTotals),
            b's' => Some(KeyCommand::NextSort),
            _ => None,
        }
    }
}

/// Non-blocking source of input bytes.
pub trait KeySource {
    /// Returns the next pending byte, or `None` without waiting.
    fn poll_key(&mut self) -> Option<u8>;
}

/// Reads single bytes from stdin when some are pending.
#[derive(Debug, Default)]
pub struct StdinKeys;

impl KeySource for StdinKeys {
    fn poll_key(&mut self) -> Option<u8> {
        let mut fds = [libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        }];
        // SAFETY: fds is a valid one-element array for the duration of the call.
        let ready = unsafe { libc::poll(fds.as_mut_ptr(), 1, 0) };
        if ready <= 0 || fds[0].revents & libc::POLLIN == 0 {
            return None;
        }

        let mut byte = 0u8;
        // SAFETY: reading at most one byte into a live stack variable.
        let n = unsafe { libc::read(libc::STDIN_FILENO, &mut byte as *mut u8 as *mut libc::c_void, 1) };
        (n == 1).then_some(byte)
    }
}

/// Source that never yields a key, for non-terminal stdin.
#[derive(Debug, Default)]
pub struct NoKeys;

impl KeySource for NoKeys {
    fn poll_key(&mut self) -> Option<u8> {
        None
    }
}

/// Replays a fixed byte sequence, one byte per poll.
#[derive(Debug, Default)]
pub struct ScriptedKeys {
    bytes: VecDeque<u8>,
}

impl ScriptedKeys {
    pub fn new(bytes: impl IntoIterator<Item = u8>) -> Self {
        Self {
            bytes: bytes.into_iter().collect(),
        }
    }
}

impl KeySource for ScriptedKeys {
    fn poll_key(&mut self) -> Option<u8> {
        self.bytes.pop_front()
    }
}

/// Key source for this process: stdin when it is a terminal, nothing otherwise.
pub fn default_key_source() -> Box<dyn KeySource> {
    if std::io::stdin().is_terminal() {
        Box::new(StdinKeys)
    } else {
        Box::new(NoKeys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_bytes() {
        for b in [b'q', b'Q', 27, 3] {
            assert_eq!(KeyCommand::from_byte(b), Some(KeyCommand::Quit), "byte {b}");
        }
    }

    #[test]
    fn test_toggle_bytes() {
        assert_eq!(KeyCommand::from_byte(b'a'), Some(KeyCommand::ToggleArrows));
        assert_eq!(KeyCommand::from_byte(b't'), Some(KeyCommand::ToggleTotals));
        assert_eq!(KeyCommand::from_byte(b's'), Some(KeyCommand::NextSort));
    }

    #[test]
    fn test_other_bytes_are_ignored() {
        for b in [b'A', b'T', b'S', b'x', b' ', b'\n', 0] {
            assert_eq!(KeyCommand::from_byte(b), None, "byte {b}");
        }
    }

    #[test]
    fn test_scripted_keys_yield_in_order() {
        let mut keys = ScriptedKeys::new(*b"as");
        assert_eq!(keys.poll_key(), Some(b'a'));
        assert_eq!(keys.poll_key(), Some(b's'));
        assert_eq!(keys.poll_key(), None);
        assert_eq!(NoKeys.poll_key(), None);
    }
}
