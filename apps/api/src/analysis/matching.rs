use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// How taxonomy phrases are located in a normalized document.
///
/// `Substring` is the scoring contract: a phrase matches anywhere, including
/// inside unrelated words ("java" matches "javascript"). `WordBoundary` is an
/// opt-in mode that requires non-alphanumeric neighbours on both sides. It
/// shifts every score, so it is never the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchMode {
    #[default]
    Substring,
    WordBoundary,
}

#[derive(Debug, Error)]
#[error("unknown match mode '{0}' (expected 'substring' or 'word_boundary')")]
pub struct UnknownMatchMode(String);

impl FromStr for MatchMode {
    type Err = UnknownMatchMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "substring" => Ok(MatchMode::Substring),
            "word_boundary" | "word-boundary" => Ok(MatchMode::WordBoundary),
            other => Err(UnknownMatchMode(other.to_string())),
        }
    }
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Substring => write!(f, "substring"),
            MatchMode::WordBoundary => write!(f, "word_boundary"),
        }
    }
}

impl MatchMode {
    /// Returns true if `phrase` occurs in `text` under this mode.
    /// Both inputs are expected to be case-folded already.
    pub fn contains(self, text: &str, phrase: &str) -> bool {
        if phrase.is_empty() {
            return false;
        }
        match self {
            MatchMode::Substring => text.contains(phrase),
            MatchMode::WordBoundary => text.match_indices(phrase).any(|(start, matched)| {
                let end = start + matched.len();
                let before = text[..start].chars().next_back();
                let after = text[end..].chars().next();
                !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
            }),
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
