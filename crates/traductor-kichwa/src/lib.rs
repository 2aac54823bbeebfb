//! Rule-based Spanish to Kichwa sentence translation.
//!
//! The engine modules (`normalize`, `parse`, `resolve`, `assemble`,
//! `engine`) are pure functions over a read-only [`kichwa_lexicon::Lexicon`].
//! `handlers` and `rate_limit` put an HTTP boundary in front of them.

pub mod assemble;
pub mod engine;
pub mod handlers;
pub mod normalize;
pub mod parse;
pub mod rate_limit;
pub mod resolve;

pub use engine::{
    ErrorKind, TranslateError, Translation, TranslationOutcome, Translator, VerbSummary, install,
    installed, is_ready, translate_sentence,
};
pub use handlers::{AppState, DEFAULT_MAX_INPUT_CHARS, router};
pub use normalize::{Token, normalize, normalize_text};
pub use parse::{ParsedSentence, parse};
