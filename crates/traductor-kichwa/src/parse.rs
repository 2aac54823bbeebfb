//! Split a token sequence into pronoun, verb and complement slots.

use kichwa_lexicon::Lexicon;

use crate::engine::TranslateError;
use crate::normalize::Token;

/// Fewest words a translatable sentence can have (subject + verb).
pub const MIN_WORDS: usize = 2;

/// Grammatical slots of a sentence, in input order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParsedSentence {
    /// Present only when the first word is a known pronoun. No subject is
    /// guessed when it is missing.
    pub pronoun: Option<Token>,
    pub verb: Token,
    pub complement: Vec<Token>,
}

/// Assign slots by position: optional leading pronoun, then the verb, then
/// everything else.
pub fn parse(tokens: &[Token], lexicon: &Lexicon) -> Result<ParsedSentence, TranslateError> {
    if tokens.len() < MIN_WORDS {
        return Err(TranslateError::InsufficientWords {
            found: tokens.len(),
        });
    }

    let pronoun = tokens
        .first()
        .filter(|t| lexicon.pronoun(t.as_str()).is_some())
        .cloned();
    let consumed = usize::from(pronoun.is_some());

    let mut rest = tokens[consumed..].iter().cloned();
    let verb = rest.next().ok_or(TranslateError::MissingVerb)?;
    let complement = rest.collect();

    Ok(ParsedSentence {
        pronoun,
        verb,
        complement,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn lexicon() -> Lexicon {
        Lexicon::bundled().expect("bundled lexicon")
    }

    #[test]
    fn assigns_pronoun_verb_and_complement() {
        let tokens = normalize("Yo juego con mis amigos").unwrap();
        let parsed = parse(&tokens, &lexicon()).unwrap();
        assert_eq!(parsed.pronoun.as_ref().map(Token::as_str), Some("yo"));
        assert_eq!(parsed.verb.as_str(), "juego");
        let complement: Vec<&str> = parsed.complement.iter().map(Token::as_str).collect();
        assert_eq!(complement, ["con", "mis", "amigos"]);
    }

    #[test]
    fn missing_pronoun_leaves_slot_empty() {
        let tokens = normalize("jugamos en la casa").unwrap();
        let parsed = parse(&tokens, &lexicon()).unwrap();
        assert!(parsed.pronoun.is_none());
        assert_eq!(parsed.verb.as_str(), "jugamos");
        assert_eq!(parsed.complement.len(), 3);
    }

    #[test]
    fn two_words_leave_empty_complement() {
        let tokens = normalize("ella canta").unwrap();
        let parsed = parse(&tokens, &lexicon()).unwrap();
        assert_eq!(parsed.verb.as_str(), "canta");
        assert!(parsed.complement.is_empty());
    }

    #[test]
    fn rejects_short_sentences() {
        let lex = lexicon();
        let one = normalize("yo").unwrap();
        assert_eq!(
            parse(&one, &lex),
            Err(TranslateError::InsufficientWords { found: 1 })
        );
        assert_eq!(
            parse(&[], &lex),
            Err(TranslateError::InsufficientWords { found: 0 })
        );
    }
}
