//! The session's modal state machine.
//!
//! Owns who gets the next key (the current [`Mode`]), the pause flag and the
//! scroll offset. Never talks to the feed or the terminal: every handler
//! answers with an [`Outcome`] and the runner performs it.

use crossterm::event::KeyEvent;
use tracing::{debug, warn};

use crate::profile::Profile;

use super::column_editor::ColumnEditor;
use super::editor::{EditOutcome, ModalEditor};
use super::event::{InputEvent, Outcome, Redraw};
use super::input::{classify, Command};
use super::line_editor::{LineEditor, PromptKind};
use super::scheduler::{gate, Cadence};
use super::scroll::ScrollOffset;

/// Rows moved by one PageUp/PageDown (or arrow) press.
pub const PAGE_LINES: usize = 10;

/// Who owns the keyboard. Editors live inside their mode, so an editor
/// exists exactly when the session is editing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Help,
    LineEdit(LineEditor),
    ColumnEdit(ColumnEditor),
}

/// [`Mode`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeKind {
    Normal,
    Help,
    LineEdit,
    ColumnEdit,
}

impl Mode {
    pub fn kind(&self) -> ModeKind {
        match self {
            Mode::Normal => ModeKind::Normal,
            Mode::Help => ModeKind::Help,
            Mode::LineEdit(_) => ModeKind::LineEdit,
            Mode::ColumnEdit(_) => ModeKind::ColumnEdit,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    mode: Mode,
    paused: bool,
    scroll: ScrollOffset,
}

impl Session {
    pub fn new(visible_rows: usize) -> Self {
        Self {
            mode: Mode::Normal,
            paused: false,
            scroll: ScrollOffset::new(visible_rows),
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn kind(&self) -> ModeKind {
        self.mode.kind()
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn offset(&self) -> usize {
        self.scroll.get()
    }

    pub fn showing_help(&self) -> bool {
        matches!(self.mode, Mode::Help)
    }

    /// Adopt a new table height and pull the offset back in range.
    pub fn set_visible_rows(&mut self, rows: usize, ticker_count: usize) {
        self.scroll.set_visible_rows(rows);
        self.scroll.clamp(ticker_count);
    }

    pub fn handle_input(&mut self, event: InputEvent, profile: &mut Profile) -> Outcome {
        match event {
            InputEvent::Resize(..) => Outcome::Redraw(Redraw::Resize),
            InputEvent::Key(key) => self.handle_key(key, profile),
        }
    }

    /// A timer fired. Its effect is dropped while help is up or paused.
    pub fn handle_tick(&self, cadence: Cadence) -> Outcome {
        gate(cadence, self.showing_help(), self.paused).map_or(Outcome::Continue, Outcome::Redraw)
    }

    fn handle_key(&mut self, key: KeyEvent, profile: &mut Profile) -> Outcome {
        let edit = match &mut self.mode {
            Mode::Normal => return self.dispatch(classify(&key), profile),
            Mode::Help => {
                self.mode = Mode::Normal;
                return Outcome::Redraw(Redraw::Dashboard);
            }
            Mode::LineEdit(editor) => editor.handle(key, profile),
            Mode::ColumnEdit(editor) => editor.handle(key, profile),
        };

        match edit {
            EditOutcome::Continue => Outcome::Redraw(Redraw::Frame),
            EditOutcome::Done { refresh_quotes } => {
                debug!(mode = ?self.kind(), "editor done");
                self.mode = Mode::Normal;
                self.scroll.clamp(profile.tickers.len());
                if refresh_quotes {
                    Outcome::Redraw(Redraw::Quotes)
                } else {
                    Outcome::Redraw(Redraw::Frame)
                }
            }
        }
    }

    fn dispatch(&mut self, command: Command, profile: &mut Profile) -> Outcome {
        match command {
            Command::Quit => Outcome::Quit,
            Command::AddTickers => self.prompt(PromptKind::AddTickers, profile),
            Command::RemoveTickers => self.prompt(PromptKind::RemoveTickers, profile),
            Command::SetFilter => self.prompt(PromptKind::Filter, profile),
            Command::ClearFilter => {
                if let Err(e) = profile.set_filter("") {
                    warn!(error = %e, "could not clear filter");
                }
                Outcome::Continue
            }
            Command::EditColumns => {
                self.mode = Mode::ColumnEdit(ColumnEditor::new(profile));
                Outcome::Redraw(Redraw::Frame)
            }
            Command::Regroup => match profile.regroup() {
                Ok(()) => Outcome::Redraw(Redraw::Frame),
                Err(e) => {
                    warn!(error = %e, "regroup failed");
                    Outcome::Continue
                }
            },
            Command::TogglePause => {
                self.paused = !self.paused;
                debug!(paused = self.paused, "pause toggled");
                Outcome::Redraw(Redraw::Clock)
            }
            Command::ShowHelp => {
                self.mode = Mode::Help;
                Outcome::Redraw(Redraw::Help)
            }
            Command::ScrollDown => {
                self.scroll.increase(PAGE_LINES, profile.tickers.len());
                Outcome::Redraw(Redraw::Dashboard)
            }
            Command::ScrollUp => {
                self.scroll.decrease(PAGE_LINES);
                Outcome::Redraw(Redraw::Dashboard)
            }
            Command::Ignore => Outcome::Continue,
        }
    }

    fn prompt(&mut self, kind: PromptKind, profile: &Profile) -> Outcome {
        self.mode = Mode::LineEdit(LineEditor::new(kind, profile));
        Outcome::Redraw(Redraw::Frame)
    }
}
