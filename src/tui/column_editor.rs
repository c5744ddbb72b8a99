//! Sort-column picker.
//!
//! Left/Right walk the table header, Enter sorts by the highlighted column
//! (again on the same column flips the direction), Esc closes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::warn;

use crate::market::Column;
use crate::profile::Profile;

use super::editor::{EditOutcome, ModalEditor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnEditor {
    selected: Column,
}

impl ColumnEditor {
    pub fn new(profile: &Profile) -> Self {
        Self {
            selected: profile.sort_column(),
        }
    }

    pub fn selected(&self) -> Column {
        self.selected
    }
}

impl ModalEditor for ColumnEditor {
    fn handle(&mut self, key: KeyEvent, profile: &mut Profile) -> EditOutcome {
        match key.code {
            KeyCode::Esc => return EditOutcome::Done { refresh_quotes: false },
            KeyCode::Char('[') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return EditOutcome::Done { refresh_quotes: false }
            }
            KeyCode::Left => self.selected = self.selected.left(),
            KeyCode::Right => self.selected = self.selected.right(),
            KeyCode::Enter => {
                if let Err(e) = profile.reorder(self.selected) {
                    warn!(error = %e, column = ?self.selected, "could not change sort order");
                }
            }
            _ => {}
        }
        EditOutcome::Continue
    }
}
