//! Keyboard source — non-blocking key presses for the controller's main loop.

use crossterm::event::{Event, EventStream, KeyCode, KeyEventKind};
use futures::StreamExt;

use crate::error::{Error, Result};

/// A single key the controller's main loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    /// `s` — snapshot the world to a PGM file.
    Save,
    /// `p` — toggle pause/resume.
    Pause,
    /// `q` — stop processing and quit without persisting the world.
    Quit,
    /// `k` — shut the broker down and quit, persisting the final world.
    Kill,
    /// Any other character key; the main loop ignores these.
    Other(char),
}

impl KeyPress {
    fn from_char(c: char) -> Self {
        match c {
            's' => KeyPress::Save,
            'p' => KeyPress::Pause,
            'q' => KeyPress::Quit,
            'k' => KeyPress::Kill,
            other => KeyPress::Other(other),
        }
    }
}

/// A source of [`KeyPress`]es, polled concurrently with RPC calls and
/// timers inside the controller's `select!` loop.
pub trait KeySource {
    /// Wait for the next key press. Returns `Ok(None)` if the input
    /// stream ended (e.g. stdin closed) rather than erroring — the
    /// controller treats that the same as no key pressed this tick.
    async fn next_key(&mut self) -> Result<Option<KeyPress>>;
}

/// Reads key presses from the real terminal via `crossterm`'s
/// event stream, ignoring everything but key-down events.
pub struct CrosstermKeySource {
    events: EventStream,
}

impl CrosstermKeySource {
    pub fn new() -> Self {
        Self {
            events: EventStream::new(),
        }
    }
}

impl Default for CrosstermKeySource {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for CrosstermKeySource {
    async fn next_key(&mut self) -> Result<Option<KeyPress>> {
        loop {
            let Some(event) = self.events.next().await else {
                return Ok(None);
            };
            let event = event.map_err(|err| Error::Key(err.to_string()))?;

            if let Event::Key(key) = event {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if let KeyCode::Char(c) = key.code {
                    return Ok(Some(KeyPress::from_char(c)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_letters_to_commands() {
        assert_eq!(KeyPress::from_char('s'), KeyPress::Save);
        assert_eq!(KeyPress::from_char('p'), KeyPress::Pause);
        assert_eq!(KeyPress::from_char('q'), KeyPress::Quit);
        assert_eq!(KeyPress::from_char('k'), KeyPress::Kill);
        assert_eq!(KeyPress::from_char('x'), KeyPress::Other('x'));
    }
}
