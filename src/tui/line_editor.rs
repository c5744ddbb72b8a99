//! One-line prompt for ticker lists and filter expressions.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::profile::Profile;

use super::editor::{EditOutcome, ModalEditor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    AddTickers,
    RemoveTickers,
    Filter,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::AddTickers => "Add tickers: ",
            PromptKind::RemoveTickers => "Remove tickers: ",
            PromptKind::Filter => "Set filter: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEditor {
    kind: PromptKind,
    input: Vec<char>,
    /// Char index, `0..=input.len()`.
    cursor: usize,
}

impl LineEditor {
    /// Open a prompt. The filter prompt starts with the current expression.
    pub fn new(kind: PromptKind, profile: &Profile) -> Self {
        let input: Vec<char> = match kind {
            PromptKind::Filter => profile.filter().chars().collect(),
            _ => Vec::new(),
        };
        let cursor = input.len();
        Self {
            kind,
            input,
            cursor,
        }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    pub fn label(&self) -> &'static str {
        self.kind.label()
    }

    pub fn text(&self) -> String {
        self.input.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn insert(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.input.remove(self.cursor);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.input.len() {
            self.input.remove(self.cursor);
        }
    }

    /// Run the prompt's action. Returns whether quotes need refetching.
    fn execute(&self, profile: &mut Profile) -> bool {
        let text = self.text();
        match self.kind {
            PromptKind::AddTickers => match profile.add_tickers(&tokenize(&text)) {
                Ok(added) => {
                    info!(added, "tickers added");
                    added > 0
                }
                Err(e) => {
                    warn!(error = %e, "could not add tickers");
                    false
                }
            },
            PromptKind::RemoveTickers => {
                match profile.remove_tickers(&tokenize(&text)) {
                    Ok(removed) => info!(removed, "tickers removed"),
                    Err(e) => warn!(error = %e, "could not remove tickers"),
                }
                false
            }
            PromptKind::Filter => {
                if let Err(e) = profile.set_filter(&text) {
                    warn!(error = %e, filter = %text, "filter rejected");
                }
                false
            }
        }
    }
}

impl ModalEditor for LineEditor {
    fn handle(&mut self, key: KeyEvent, profile: &mut Profile) -> EditOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => return EditOutcome::Done { refresh_quotes: false },
            KeyCode::Char('[') if ctrl => return EditOutcome::Done { refresh_quotes: false },
            KeyCode::Enter => {
                return EditOutcome::Done {
                    refresh_quotes: self.execute(profile),
                }
            }
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.input.len(),
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Char(c) => self.insert(c),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.input.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.input.len(),
            _ => {}
        }
        EditOutcome::Continue
    }
}

/// Split a ticker list on commas and whitespace.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn profile(dir: &TempDir) -> Profile {
        Profile::reinitialize(&dir.path().join("profile")).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_text(editor: &mut LineEditor, profile: &mut Profile, text: &str) {
        for c in text.chars() {
            assert_eq!(
                editor.handle(key(KeyCode::Char(c)), profile),
                EditOutcome::Continue
            );
        }
    }

    #[test]
    fn tokenize_commas_and_spaces() {
        assert_eq!(tokenize("msft, tsla  nvda,,"), vec!["msft", "tsla", "nvda"]);
        assert!(tokenize("  , ").is_empty());
    }

    #[test]
    fn cursor_editing() {
        let dir = TempDir::new().unwrap();
        let mut p = profile(&dir);
        let mut ed = LineEditor::new(PromptKind::AddTickers, &p);
        type_text(&mut ed, &mut p, "ac");
        ed.handle(key(KeyCode::Left), &mut p);
        type_text(&mut ed, &mut p, "b");
        assert_eq!(ed.text(), "abc");
        assert_eq!(ed.cursor(), 2);

        ed.handle(ctrl('a'), &mut p);
        assert_eq!(ed.cursor(), 0);
        ed.handle(key(KeyCode::Delete), &mut p);
        assert_eq!(ed.text(), "bc");
        ed.handle(ctrl('e'), &mut p);
        ed.handle(key(KeyCode::Backspace), &mut p);
        assert_eq!(ed.text(), "b");
        ed.handle(key(KeyCode::Right), &mut p);
        assert_eq!(ed.cursor(), 1);
    }

    #[test]
    fn command_letters_are_text() {
        let dir = TempDir::new().unwrap();
        let mut p = profile(&dir);
        let mut ed = LineEditor::new(PromptKind::AddTickers, &p);
        type_text(&mut ed, &mut p, "qpQ");
        assert_eq!(ed.text(), "qpQ");
    }

    #[test]
    fn esc_discards() {
        let dir = TempDir::new().unwrap();
        let mut p = profile(&dir);
        let before = p.tickers.clone();
        let mut ed = LineEditor::new(PromptKind::AddTickers, &p);
        type_text(&mut ed, &mut p, "MSFT");
        assert_eq!(
            ed.handle(key(KeyCode::Esc), &mut p),
            EditOutcome::Done { refresh_quotes: false }
        );
        assert_eq!(p.tickers, before);
    }

    #[test]
    fn add_requests_refresh() {
        let dir = TempDir::new().unwrap();
        let mut p = profile(&dir);
        let mut ed = LineEditor::new(PromptKind::AddTickers, &p);
        type_text(&mut ed, &mut p, "msft, tsla");
        assert_eq!(
            ed.handle(key(KeyCode::Enter), &mut p),
            EditOutcome::Done { refresh_quotes: true }
        );
        assert!(p.tickers.contains(&"MSFT".to_string()));
        assert!(p.tickers.contains(&"TSLA".to_string()));
    }

    #[test]
    fn adding_known_ticker_does_not_refresh() {
        let dir = TempDir::new().unwrap();
        let mut p = profile(&dir);
        let mut ed = LineEditor::new(PromptKind::AddTickers, &p);
        type_text(&mut ed, &mut p, "AAPL");
        assert_eq!(
            ed.handle(key(KeyCode::Enter), &mut p),
            EditOutcome::Done { refresh_quotes: false }
        );
    }

    #[test]
    fn remove_tickers() {
        let dir = TempDir::new().unwrap();
        let mut p = profile(&dir);
        let mut ed = LineEditor::new(PromptKind::RemoveTickers, &p);
        type_text(&mut ed, &mut p, "aapl ibm");
        ed.handle(key(KeyCode::Enter), &mut p);
        assert!(!p.tickers.contains(&"AAPL".to_string()));
        assert!(!p.tickers.contains(&"IBM".to_string()));
        assert_eq!(p.tickers.len(), 5);
    }

    #[test]
    fn filter_prompt_prefilled_and_applied() {
        let dir = TempDir::new().unwrap();
        let mut p = profile(&dir);
        p.set_filter("last > 10").unwrap();

        let mut ed = LineEditor::new(PromptKind::Filter, &p);
        assert_eq!(ed.text(), "last > 10");
        assert_eq!(ed.cursor(), 9);
        type_text(&mut ed, &mut p, "0");
        ed.handle(key(KeyCode::Enter), &mut p);
        assert_eq!(p.filter(), "last > 100");
    }

    #[test]
    fn bad_filter_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let mut p = profile(&dir);
        p.set_filter("last > 10").unwrap();

        let mut ed = LineEditor::new(PromptKind::Filter, &p);
        type_text(&mut ed, &mut p, " &&");
        assert_eq!(
            ed.handle(key(KeyCode::Enter), &mut p),
            EditOutcome::Done { refresh_quotes: false }
        );
        assert_eq!(p.filter(), "last > 10");
    }

    #[test]
    fn deeply_nested_filter_rejected() {
        let dir = TempDir::new().unwrap();
        let mut p = profile(&dir);
        p.set_filter("last > 10").unwrap();

        let mut ed = LineEditor::new(PromptKind::Filter, &p);
        ed.handle(ctrl('a'), &mut p);
        type_text(&mut ed, &mut p, &"(".repeat(5_000));
        ed.handle(ctrl('e'), &mut p);
        type_text(&mut ed, &mut p, &")".repeat(5_000));
        assert_eq!(
            ed.handle(key(KeyCode::Enter), &mut p),
            EditOutcome::Done { refresh_quotes: false }
        );
        assert_eq!(p.filter(), "last > 10");
    }
}
