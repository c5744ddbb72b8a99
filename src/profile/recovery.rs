//! Startup prompt for a corrupted profile.
//!
//! Runs before the dashboard takes over the terminal and is never re-entered
//! once the session starts.

use std::io::{self, Write};
use std::path::Path;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use super::ProfileError;

/// What the user chose to do about a corrupted profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Overwrite the profile with the default one and carry on.
    Reinitialize,
    /// Leave the file alone and exit.
    Abort,
}

/// Report `error` on `out` and ask until the answer is `y` or `n`.
///
/// `next_key` returns one key press as text; anything other than `y`/`n`
/// (case-insensitive) is reported and asked again.
pub fn confirm_overwrite<W, K>(
    out: &mut W,
    path: &Path,
    error: &ProfileError,
    mut next_key: K,
) -> io::Result<Recovery>
where
    W: Write,
    K: FnMut() -> io::Result<String>,
{
    write!(
        out,
        "The profile read from `{}` is corrupted.\n\tError: {error}\n\n",
        path.display()
    )?;

    loop {
        writeln!(
            out,
            "Do you want to overwrite the current profile with the default one? [y/n]"
        )?;
        out.flush()?;

        let answer = next_key()?.to_lowercase();
        match answer.as_str() {
            "y" => return Ok(Recovery::Reinitialize),
            "n" => return Ok(Recovery::Abort),
            _ => write!(out, "Invalid answer `{answer}`\n\n")?,
        }
    }
}

/// Block for a single key press in raw mode and return it as text.
///
/// Printable keys come back as the character itself; other keys as their
/// key-code name, which never matches `y`/`n`.
pub fn read_single_key() -> io::Result<String> {
    enable_raw_mode()?;
    let result = wait_for_key();
    disable_raw_mode()?;
    result
}

fn wait_for_key() -> io::Result<String> {
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Release {
                continue;
            }
            return Ok(match key.code {
                KeyCode::Char(c) => c.to_string(),
                other => format!("{other:?}"),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn corrupt() -> ProfileError {
        ProfileError::Corrupt {
            path: PathBuf::from("/home/u/.marketdeckrc"),
            reason: "bad yaml".into(),
        }
    }

    fn keys(answers: &[&str]) -> impl FnMut() -> io::Result<String> {
        let mut answers: Vec<String> = answers.iter().rev().map(|s| s.to_string()).collect();
        move || {
            answers
                .pop()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more keys"))
        }
    }

    #[test]
    fn yes_reinitializes() {
        let mut out = Vec::new();
        let path = PathBuf::from("/home/u/.marketdeckrc");
        let choice = confirm_overwrite(&mut out, &path, &corrupt(), keys(&["Y"])).unwrap();
        assert_eq!(choice, Recovery::Reinitialize);
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("The profile read from `/home/u/.marketdeckrc` is corrupted."));
        assert!(text.contains("bad yaml"));
    }

    #[test]
    fn no_aborts() {
        let mut out = Vec::new();
        let path = PathBuf::from("p");
        let choice = confirm_overwrite(&mut out, &path, &corrupt(), keys(&["n"])).unwrap();
        assert_eq!(choice, Recovery::Abort);
    }

    #[test]
    fn invalid_answers_repeat_the_question() {
        let mut out = Vec::new();
        let path = PathBuf::from("p");
        let choice =
            confirm_overwrite(&mut out, &path, &corrupt(), keys(&["x", "Enter", "n"])).unwrap();
        assert_eq!(choice, Recovery::Abort);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Invalid answer `x`"));
        assert!(text.contains("Invalid answer `enter`"));
        assert_eq!(text.matches("[y/n]").count(), 3);
    }
}
