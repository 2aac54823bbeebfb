//! Join translated slots into the output sentence.

use std::iter;

/// Concatenate pronoun, verb and complement in that order.
///
/// Word order follows the Spanish subject-verb-complement template; Kichwa's
/// verb-final order is not reconstructed. Each part may hold several words;
/// whitespace is collapsed to single spaces.
pub fn assemble(pronoun: Option<&str>, verb: &str, complement: &[&str]) -> String {
    let words: Vec<&str> = pronoun
        .into_iter()
        .chain(iter::once(verb))
        .chain(complement.iter().copied())
        .flat_map(str::split_whitespace)
        .collect();
    words.join(" ")
}
