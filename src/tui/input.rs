//! Key classification for Normal mode.
//!
//! A key carries two independent discriminants: the printable character it
//! produced, and a special key code (Esc, arrows, paging). Terminals disagree
//! on which one a physical key shows up in, e.g. Esc may arrive as Ctrl-[.
//! Special keys decide navigation and quit; everything else is decided by
//! the character alone.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Non-printable keys the router cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialKey {
    Esc,
    PageUp,
    PageDown,
    Up,
    Down,
}

/// Both channels of a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawKey {
    pub ch: Option<char>,
    pub special: Option<SpecialKey>,
}

impl From<&KeyEvent> for RawKey {
    fn from(key: &KeyEvent) -> Self {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Self::special(SpecialKey::Esc),
            KeyCode::Char('[') if ctrl => Self::special(SpecialKey::Esc),
            KeyCode::Char(_) if ctrl => Self::default(),
            KeyCode::Char(c) => Self {
                ch: Some(c),
                special: None,
            },
            KeyCode::PageUp => Self::special(SpecialKey::PageUp),
            KeyCode::PageDown => Self::special(SpecialKey::PageDown),
            KeyCode::Up => Self::special(SpecialKey::Up),
            KeyCode::Down => Self::special(SpecialKey::Down),
            _ => Self::default(),
        }
    }
}

impl RawKey {
    fn special(key: SpecialKey) -> Self {
        Self {
            ch: None,
            special: Some(key),
        }
    }
}

/// Normal-mode commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    AddTickers,
    RemoveTickers,
    SetFilter,
    ClearFilter,
    EditColumns,
    Regroup,
    TogglePause,
    ShowHelp,
    ScrollDown,
    ScrollUp,
    Ignore,
}

/// Classify a key event pressed in Normal mode.
pub fn classify(key: &KeyEvent) -> Command {
    classify_raw(RawKey::from(key))
}

pub fn classify_raw(raw: RawKey) -> Command {
    match raw.special {
        Some(SpecialKey::Esc) => return Command::Quit,
        Some(SpecialKey::PageDown | SpecialKey::Down) => return Command::ScrollDown,
        Some(SpecialKey::PageUp | SpecialKey::Up) => return Command::ScrollUp,
        None => {}
    }

    match raw.ch {
        Some('q' | 'Q') => Command::Quit,
        Some('+') => Command::AddTickers,
        Some('-') => Command::RemoveTickers,
        // f and F are different commands
        Some('f') => Command::SetFilter,
        Some('F') => Command::ClearFilter,
        Some('o' | 'O') => Command::EditColumns,
        Some('g' | 'G') => Command::Regroup,
        Some('p' | 'P') => Command::TogglePause,
        Some('?' | 'h' | 'H') => Command::ShowHelp,
        _ => Command::Ignore,
    }
}
