//! Modal editors that own the keyboard until they finish.

use crossterm::event::KeyEvent;

use crate::profile::Profile;

/// What a modal editor reports after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Still editing; repaint to echo the change.
    Continue,
    /// Finished. The session returns to Normal mode.
    Done {
        /// The watch-list changed in a way only a fresh fetch can show.
        refresh_quotes: bool,
    },
}

/// An editor receives every key while active, including ones that would be
/// commands in Normal mode.
pub trait ModalEditor {
    fn handle(&mut self, key: KeyEvent, profile: &mut Profile) -> EditOutcome;
}
