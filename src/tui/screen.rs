//! The screen collaborator: something that can show a [`View`].
//!
//! The runner only talks to the [`Screen`] trait, so tests can record frames
//! instead of painting a terminal.

use std::io::{self, Stdout};

use chrono::{DateTime, Local};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::market::{Column, MarketSnapshot, Quote};

use super::app::Mode;
use super::layout;

/// What is drawn on top of (or instead of) the normal view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    /// Full-screen help.
    Help,
    /// Line editor prompt on the bottom row.
    Prompt {
        label: &'static str,
        text: String,
        cursor: usize,
    },
    /// Column picker highlight in the table header.
    Columns { selected: Column },
}

impl From<&Mode> for Overlay {
    fn from(mode: &Mode) -> Self {
        match mode {
            Mode::Normal => Overlay::None,
            Mode::Help => Overlay::Help,
            Mode::LineEdit(editor) => Overlay::Prompt {
                label: editor.label(),
                text: editor.text(),
                cursor: editor.cursor(),
            },
            Mode::ColumnEdit(editor) => Overlay::Columns {
                selected: editor.selected(),
            },
        }
    }
}

/// Everything one frame needs. Borrowed from the runner for the draw only.
#[derive(Debug, Clone)]
pub struct View<'a> {
    pub market: &'a MarketSnapshot,
    /// Filtered and sorted, before scrolling.
    pub quotes: Vec<&'a Quote>,
    pub clock: DateTime<Local>,
    pub paused: bool,
    pub offset: usize,
    pub sort_column: Column,
    pub ascending: bool,
    pub filter: &'a str,
    pub overlay: Overlay,
}

pub trait Screen {
    /// Table rows that fit at the current size.
    fn visible_rows(&self) -> usize;
    fn clear(&mut self) -> anyhow::Result<()>;
    /// Pick up a new terminal size.
    fn resize(&mut self) -> anyhow::Result<()>;
    fn draw(&mut self, view: &View<'_>) -> anyhow::Result<()>;
}

/// A real terminal on stdout. The caller owns raw mode and the alternate
/// screen.
pub struct TerminalScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalScreen {
    pub fn new() -> anyhow::Result<Self> {
        let terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
        Ok(Self { terminal })
    }
}

impl Screen for TerminalScreen {
    fn visible_rows(&self) -> usize {
        self.terminal
            .size()
            .map(|size| layout::visible_rows(size.height))
            .unwrap_or(0)
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.terminal.clear()?;
        Ok(())
    }

    fn resize(&mut self) -> anyhow::Result<()> {
        self.terminal.autoresize()?;
        Ok(())
    }

    fn draw(&mut self, view: &View<'_>) -> anyhow::Result<()> {
        self.terminal.draw(|f| layout::draw(f, view))?;
        Ok(())
    }
}
