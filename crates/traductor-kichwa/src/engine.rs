//! The translation pipeline and its process-wide entry point.
//!
//! `raw text -> normalize -> parse -> {resolve verb, translate complement}
//! -> assemble`. Every stage either hands its output to the next one or ends
//! the call with a [`TranslateError`]; nothing is retried and no state
//! outlives a call. The only shared resource is the read-only [`Lexicon`],
//! which [`install`] publishes once for [`translate_sentence`].
//!
//! ```
//! use std::sync::Arc;
//!
//! use kichwa_lexicon::Lexicon;
//! use traductor_kichwa::{TranslationOutcome, Translator};
//!
//! # fn main() -> anyhow::Result<()> {
//! let translator = Translator::new(Arc::new(Lexicon::bundled()?));
//! match translator.translate_sentence("Yo juego con mis amigos") {
//!     TranslationOutcome::Success { text, degraded, .. } => {
//!         assert_eq!(text, "ñuka pukllani wan ñukapak mashikuna");
//!         assert!(!degraded);
//!     }
//!     TranslationOutcome::Failure { detail, .. } => panic!("{detail}"),
//! }
//! # Ok(()) }
//! ```

use std::sync::{Arc, OnceLock};

use kichwa_lexicon::Lexicon;
use kichwa_morph::Morphology;
use kichwa_types::{Person, Tense};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assemble::assemble;
use crate::normalize::normalize;
use crate::parse::parse;
use crate::resolve::{
    PERIPHRASTIC_TOKENS, VerbSource, resolve_periphrastic_future, resolve_verb,
    translate_complement,
};

static INSTALLED: OnceLock<Translator> = OnceLock::new();

/// Why a sentence could not be translated. `Display` is the user-facing
/// message.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TranslateError {
    #[error("please enter a sentence to translate")]
    EmptyInput,
    #[error("the sentence needs at least a subject and a verb (found {found} word(s))")]
    InsufficientWords { found: usize },
    #[error("no verb found after the pronoun")]
    MissingVerb,
    #[error("verb not recognized: {0}")]
    UnknownVerb(String),
    #[error("the lexicon has not been loaded yet")]
    LexiconNotLoaded,
}

impl TranslateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TranslateError::EmptyInput => ErrorKind::EmptyInput,
            TranslateError::InsufficientWords { .. } => ErrorKind::InsufficientWords,
            TranslateError::MissingVerb => ErrorKind::MissingVerb,
            TranslateError::UnknownVerb(_) => ErrorKind::UnknownVerb,
            TranslateError::LexiconNotLoaded => ErrorKind::LexiconNotLoaded,
        }
    }
}

/// Serializable discriminant of [`TranslateError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EmptyInput,
    InsufficientWords,
    MissingVerb,
    UnknownVerb,
    LexiconNotLoaded,
}

/// Tagged result handed to callers outside the engine.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TranslationOutcome {
    Success {
        text: String,
        /// At least one complement word had no Kichwa entry.
        degraded: bool,
        unknown_words: Vec<String>,
    },
    Failure {
        kind: ErrorKind,
        detail: String,
    },
}

impl TranslationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TranslationOutcome::Success { .. })
    }
}

impl From<Translation> for TranslationOutcome {
    fn from(translation: Translation) -> Self {
        TranslationOutcome::Success {
            degraded: translation.degraded(),
            text: translation.text,
            unknown_words: translation.unknown_words,
        }
    }
}

impl From<TranslateError> for TranslationOutcome {
    fn from(err: TranslateError) -> Self {
        TranslationOutcome::Failure {
            kind: err.kind(),
            detail: err.to_string(),
        }
    }
}

impl From<Result<Translation, TranslateError>> for TranslationOutcome {
    fn from(result: Result<Translation, TranslateError>) -> Self {
        match result {
            Ok(translation) => translation.into(),
            Err(err) => err.into(),
        }
    }
}

/// Verb details of a successful translation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerbSummary {
    pub root: String,
    pub tense: Tense,
    pub person: Option<Person>,
    pub kichwa: String,
    pub periphrastic: bool,
}

/// A completed translation with the pieces it was built from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Translation {
    pub text: String,
    /// Kichwa pronoun, when the sentence had an explicit subject.
    pub pronoun: Option<String>,
    pub verb: VerbSummary,
    /// Complement tokens passed through untranslated, in order.
    pub unknown_words: Vec<String>,
}

impl Translation {
    pub fn degraded(&self) -> bool {
        !self.unknown_words.is_empty()
    }
}

/// Stateless translator over a shared lexicon. Cheap to clone.
#[derive(Clone)]
pub struct Translator {
    lexicon: Arc<Lexicon>,
    morphology: Morphology,
}

impl Translator {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self {
            lexicon,
            morphology: Morphology::spanish(),
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Run the full pipeline on raw Spanish text.
    pub fn translate(&self, raw: &str) -> Result<Translation, TranslateError> {
        let lexicon = self.lexicon.as_ref();
        let tokens = normalize(raw)?;
        let parsed = parse(&tokens, lexicon)?;
        let pronoun = parsed
            .pronoun
            .as_ref()
            .and_then(|t| lexicon.pronoun(t.as_str()));

        let (verb, complement) = match resolve_periphrastic_future(
            lexicon,
            &self.morphology,
            &parsed.verb,
            pronoun,
            &parsed.complement,
        ) {
            Some(verb) => (verb, &parsed.complement[PERIPHRASTIC_TOKENS..]),
            None => (
                resolve_verb(lexicon, &self.morphology, &parsed.verb, pronoun)?,
                &parsed.complement[..],
            ),
        };

        let translated = translate_complement(lexicon, complement);
        let text = assemble(pronoun.map(|p| p.kichwa), verb.kichwa, &translated.forms);

        Ok(Translation {
            text,
            pronoun: pronoun.map(|p| p.kichwa.to_string()),
            verb: VerbSummary {
                root: verb.root.into_owned(),
                tense: verb.tense,
                person: verb.person,
                kichwa: verb.kichwa.to_string(),
                periphrastic: verb.source == VerbSource::PeriphrasticFuture,
            },
            unknown_words: translated.unknown.iter().map(|w| w.to_string()).collect(),
        })
    }

    /// [`Translator::translate`] flattened into a [`TranslationOutcome`].
    pub fn translate_sentence(&self, raw: &str) -> TranslationOutcome {
        self.translate(raw).into()
    }
}

/// Publish the process-wide translator. The first call wins; later calls
/// return the already installed translator and drop their lexicon.
pub fn install(lexicon: Arc<Lexicon>) -> &'static Translator {
    INSTALLED.get_or_init(|| Translator::new(lexicon))
}

/// The installed translator, or [`TranslateError::LexiconNotLoaded`].
pub fn installed() -> Result<&'static Translator, TranslateError> {
    INSTALLED.get().ok_or(TranslateError::LexiconNotLoaded)
}

pub fn is_ready() -> bool {
    INSTALLED.get().is_some()
}

/// Translate with the installed translator.
pub fn translate_sentence(raw: &str) -> TranslationOutcome {
    installed()
        .and_then(|translator| translator.translate(raw))
        .into()
}
