//! Shared vocabulary types for the Spanish to Kichwa translator.
//!
//! Lexicon tables and the morphology rules speak the same small language:
//! a [`Tense`] (present/past/future), an optional grammatical [`Person`]
//! and a [`VerbForm`] tying a conjugated Spanish surface to its infinitive
//! root. Both sides key their lookups on [`fold`]ed text so that a table
//! entry written as `tú` matches the input `TU`.
//!
//! ```rust
//! use kichwa_types::{Person, Tense, fold};
//!
//! assert_eq!(Tense::from_code("past"), Some(Tense::Past));
//! assert_eq!(Person::from_code("1p"), Some(Person::FirstPlural));
//! assert_eq!(fold("Él Jugó"), "el jugo");
//! ```

use std::fmt;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Grammatical time of a verb as approximated by the suffix rules.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Tense {
    Present,
    Past,
    Future,
}

impl Tense {
    pub const ALL: [Tense; 3] = [Tense::Present, Tense::Past, Tense::Future];

    /// Parse the tense code used in lexicon tables.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "present" => Some(Tense::Present),
            "past" => Some(Tense::Past),
            "future" => Some(Tense::Future),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Tense::Present => "present",
            Tense::Past => "past",
            Tense::Future => "future",
        }
    }
}

impl fmt::Display for Tense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// Grammatical person and number of a subject.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum Person {
    FirstSingular,
    SecondSingular,
    ThirdSingular,
    FirstPlural,
    SecondPlural,
    ThirdPlural,
}

impl Person {
    pub const ALL: [Person; 6] = [
        Person::FirstSingular,
        Person::SecondSingular,
        Person::ThirdSingular,
        Person::FirstPlural,
        Person::SecondPlural,
        Person::ThirdPlural,
    ];

    /// Parse a two-character person code (`1s`, `3p`, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "1s" => Some(Person::FirstSingular),
            "2s" => Some(Person::SecondSingular),
            "3s" => Some(Person::ThirdSingular),
            "1p" => Some(Person::FirstPlural),
            "2p" => Some(Person::SecondPlural),
            "3p" => Some(Person::ThirdPlural),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Person::FirstSingular => "1s",
            Person::SecondSingular => "2s",
            Person::ThirdSingular => "3s",
            Person::FirstPlural => "1p",
            Person::SecondPlural => "2p",
            Person::ThirdPlural => "3p",
        }
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.code())
    }
}

/// Decode a person column that may hold the generic marker `*`.
///
/// Returns `Some(None)` for `*`, `Some(Some(person))` for a valid code and
/// `None` when the field is malformed.
pub fn decode_person_slot(field: &str) -> Option<Option<Person>> {
    if field == "*" {
        return Some(None);
    }
    Person::from_code(field).map(Some)
}

/// A Spanish conjugated form resolved to its infinitive root.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct VerbForm<'a> {
    pub root: &'a str,
    pub tense: Tense,
    /// `None` when the surface form does not pin down a single person.
    pub person: Option<Person>,
}

/// Lowercase and strip diacritics.
///
/// Lowercasing happens first because it can itself emit combining marks
/// (`İ` lowercases to `i` + U+0307). The result is decomposed (NFD) and
/// combining marks are dropped, so `á` becomes `a` and `ñ` becomes `n`.
/// Whitespace and punctuation pass through.
pub fn fold(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}
