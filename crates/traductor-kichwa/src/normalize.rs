//! Text normalization: fold, trim punctuation, split into tokens.

use std::fmt;

use kichwa_types::fold;

use crate::engine::TranslateError;

/// A normalized word: lowercase, without diacritics, no surrounding
/// punctuation. Only the normalizer creates tokens.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split raw text into normalized tokens.
///
/// Fails with [`TranslateError::EmptyInput`] when nothing but whitespace and
/// punctuation is left.
pub fn normalize(text: &str) -> Result<Vec<Token>, TranslateError> {
    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Err(TranslateError::EmptyInput);
    }
    Ok(tokens)
}

/// Normalized text as a single string with single-space separators.
///
/// Meant for cleaning recognized speech before echoing it back; empty input
/// yields an empty string instead of an error.
pub fn normalize_text(text: &str) -> String {
    let tokens = tokenize(text);
    let mut out = String::with_capacity(text.len());
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(token.as_str());
    }
    out
}

fn tokenize(text: &str) -> Vec<Token> {
    fold(text).split_whitespace().filter_map(clean_word).collect()
}

fn clean_word(word: &str) -> Option<Token> {
    let word = word.trim_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        None
    } else {
        Some(Token(word.to_string()))
    }
}
