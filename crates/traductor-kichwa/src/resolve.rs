//! Verb resolution and complement translation against the lexicon.

use std::borrow::Cow;

use kichwa_lexicon::{FormSource, Lexicon, Pronoun};
use kichwa_morph::{AnalysisSource, Morphology, VerbAnalysis};
use kichwa_types::{Person, Tense};

use crate::engine::TranslateError;
use crate::normalize::Token;

/// Root of the Spanish motion verb used in the `ir a <infinitive>` future.
const PERIPHRASTIC_AUX: &str = "ir";
const PERIPHRASTIC_LINK: &str = "a";
/// Complement tokens consumed by the periphrastic future (`a` + infinitive).
pub const PERIPHRASTIC_TOKENS: usize = 2;

/// How the Spanish verb was recognized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VerbSource {
    Analysis(AnalysisSource),
    /// `ir a <infinitive>`, read as the future of the infinitive.
    PeriphrasticFuture,
}

/// A Spanish verb mapped to its Kichwa conjugated form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedVerb<'a> {
    pub root: Cow<'a, str>,
    pub tense: Tense,
    /// The person that selected the Kichwa form, if any was known.
    pub person: Option<Person>,
    pub kichwa: &'a str,
    pub form: FormSource,
    pub source: VerbSource,
}

/// Resolve a verb token to its Kichwa form.
///
/// The person comes from the pronoun when there is one, otherwise from what
/// the verb ending implies.
pub fn resolve_verb<'a>(
    lexicon: &'a Lexicon,
    morphology: &Morphology,
    verb: &Token,
    pronoun: Option<Pronoun<'a>>,
) -> Result<ResolvedVerb<'a>, TranslateError> {
    let mut analysis = analyze(lexicon, morphology, verb)
        .ok_or_else(|| TranslateError::UnknownVerb(verb.to_string()))?;
    agree_with_subject(&mut analysis, pronoun);
    let person = pronoun.map(|p| p.person).or(analysis.person);
    let conjugation = lexicon
        .conjugation(&analysis.root, analysis.tense, person)
        .ok_or_else(|| TranslateError::UnknownVerb(verb.to_string()))?;

    Ok(ResolvedVerb {
        root: analysis.root,
        tense: analysis.tense,
        person,
        kichwa: conjugation.kichwa,
        form: conjugation.source,
        source: VerbSource::Analysis(analysis.source),
    })
}

/// Recognize `ir (present) + a + <known infinitive>` and resolve it as the
/// future of the infinitive. Returns `None` when the pattern does not apply.
pub fn resolve_periphrastic_future<'a>(
    lexicon: &'a Lexicon,
    morphology: &Morphology,
    verb: &Token,
    pronoun: Option<Pronoun<'a>>,
    complement: &[Token],
) -> Option<ResolvedVerb<'a>> {
    let [link, infinitive, ..] = complement else {
        return None;
    };
    if link.as_str() != PERIPHRASTIC_LINK || !lexicon.root_exists(infinitive.as_str()) {
        return None;
    }

    let aux = analyze(lexicon, morphology, verb)?;
    if aux.root != PERIPHRASTIC_AUX || aux.tense != Tense::Present {
        return None;
    }

    let person = pronoun.map(|p| p.person).or(aux.person);
    let conjugation = lexicon.conjugation(infinitive.as_str(), Tense::Future, person)?;
    Some(ResolvedVerb {
        root: Cow::Owned(infinitive.to_string()),
        tense: Tense::Future,
        person,
        kichwa: conjugation.kichwa,
        form: conjugation.source,
        source: VerbSource::PeriphrasticFuture,
    })
}

/// Folding turns the `-ar` preterite `-ó` into `-o`, which the rules read as
/// first-person present. A subject other than `yo` cannot take that ending,
/// so the form is the third-person preterite.
fn agree_with_subject(analysis: &mut VerbAnalysis<'_>, pronoun: Option<Pronoun<'_>>) {
    if let AnalysisSource::Rule {
        suffix: "o",
        replacement: "ar",
    } = analysis.source
        && pronoun.is_some_and(|p| p.person != Person::FirstSingular)
    {
        analysis.tense = Tense::Past;
        analysis.person = Some(Person::ThirdSingular);
    }
}

fn analyze<'a>(
    lexicon: &'a Lexicon,
    morphology: &Morphology,
    verb: &Token,
) -> Option<VerbAnalysis<'a>> {
    morphology.analyze(
        verb.as_str(),
        |s| lexicon.surface_form(s),
        |root| lexicon.root_exists(root),
    )
}

/// Word-by-word translation of the complement span.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TranslatedComplement<'a> {
    /// Output words in input order; omitted words are absent.
    pub forms: Vec<&'a str>,
    /// Tokens with no vocabulary entry, passed through unchanged.
    pub unknown: Vec<&'a str>,
}

/// Translate each token through the vocabulary.
///
/// Unknown tokens are kept as-is and recorded in `unknown`; tokens mapped to
/// an empty Kichwa value are dropped.
pub fn translate_complement<'a>(
    lexicon: &'a Lexicon,
    tokens: &'a [Token],
) -> TranslatedComplement<'a> {
    let mut out = TranslatedComplement::default();
    for token in tokens {
        match lexicon.vocabulary(token.as_str()) {
            Some("") => {}
            Some(kichwa) => out.forms.push(kichwa),
            None => {
                out.forms.push(token.as_str());
                out.unknown.push(token.as_str());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    fn lexicon() -> Lexicon {
        Lexicon::bundled().expect("bundled lexicon")
    }

    fn token(word: &str) -> Token {
        normalize(word).unwrap().remove(0)
    }

    #[test]
    fn pronoun_person_selects_form() {
        let lex = lexicon();
        let morph = Morphology::spanish();
        let yo = lex.pronoun("yo");
        let verb = resolve_verb(&lex, &morph, &token("juego"), yo).unwrap();
        assert_eq!(verb.kichwa, "pukllani");
        assert_eq!(verb.form, FormSource::Person);

        // Pronoun overrides what the ending implies.
        let ellos = lex.pronoun("ellos");
        let verb = resolve_verb(&lex, &morph, &token("juego"), ellos).unwrap();
        assert_eq!(verb.kichwa, "pukllankuna");
    }

    #[test]
    fn ending_implies_person_without_pronoun() {
        let lex = lexicon();
        let morph = Morphology::spanish();
        let verb = resolve_verb(&lex, &morph, &token("comemos"), None).unwrap();
        assert_eq!(verb.person, Some(Person::FirstPlural));
        assert_eq!(verb.kichwa, "mikunchik");
    }

    #[test]
    fn ambiguous_ending_uses_third_person_row() {
        let lex = lexicon();
        let morph = Morphology::spanish();
        // "-aba" does not pin down a person.
        let verb = resolve_verb(&lex, &morph, &token("caminaba"), None).unwrap();
        assert_eq!(verb.person, None);
        assert_eq!(verb.tense, Tense::Past);
        assert_eq!(verb.form, FormSource::ThirdPersonDefault);
        assert_eq!(verb.kichwa, "purirka");
    }

    #[test]
    fn third_person_subject_reads_folded_o_as_preterite() {
        let lex = lexicon();
        let morph = Morphology::spanish();
        let verb = resolve_verb(&lex, &morph, &token("habló"), lex.pronoun("él")).unwrap();
        assert_eq!(verb.root, "hablar");
        assert_eq!(verb.tense, Tense::Past);
        assert_eq!(verb.kichwa, "rimarka");

        // `yo` keeps the present reading; so do forms from the exact table.
        let verb = resolve_verb(&lex, &morph, &token("hablo"), lex.pronoun("yo")).unwrap();
        assert_eq!(verb.tense, Tense::Present);
        assert_eq!(verb.kichwa, "rimani");
        let verb = resolve_verb(&lex, &morph, &token("juego"), lex.pronoun("ellos")).unwrap();
        assert_eq!(verb.tense, Tense::Present);

        // Without a subject there is nothing to agree with.
        let verb = resolve_verb(&lex, &morph, &token("habló"), None).unwrap();
        assert_eq!(verb.tense, Tense::Present);
    }

    #[test]
    fn generic_only_verbs_use_generic_form() {
        let lex = lexicon();
        let morph = Morphology::spanish();
        let verb = resolve_verb(&lex, &morph, &token("bebo"), lex.pronoun("yo")).unwrap();
        assert_eq!(verb.form, FormSource::Generic);
        assert_eq!(verb.kichwa, "upyan");
    }

    #[test]
    fn unknown_verb_names_token() {
        let lex = lexicon();
        let morph = Morphology::spanish();
        let err = resolve_verb(&lex, &morph, &token("xyzzyverb"), None).unwrap_err();
        assert_eq!(err, TranslateError::UnknownVerb("xyzzyverb".into()));
    }

    #[test]
    fn periphrastic_future_consumes_link_and_infinitive() {
        let lex = lexicon();
        let morph = Morphology::spanish();
        let complement = normalize("a comer con su familia").unwrap();
        let verb = resolve_periphrastic_future(
            &lex,
            &morph,
            &token("va"),
            lex.pronoun("el"),
            &complement,
        )
        .unwrap();
        assert_eq!(verb.root, "comer");
        assert_eq!(verb.tense, Tense::Future);
        assert_eq!(verb.kichwa, "mikunka");
        assert_eq!(verb.source, VerbSource::PeriphrasticFuture);
    }

    #[test]
    fn periphrastic_future_needs_known_infinitive() {
        let lex = lexicon();
        let morph = Morphology::spanish();
        let not_infinitive = normalize("a la casa").unwrap();
        assert!(
            resolve_periphrastic_future(&lex, &morph, &token("voy"), None, &not_infinitive)
                .is_none()
        );
        let past_aux = normalize("a comer").unwrap();
        assert!(
            resolve_periphrastic_future(&lex, &morph, &token("fui"), None, &past_aux).is_none()
        );
    }

    #[test]
    fn complement_passes_unknown_words_through() {
        let lex = lexicon();
        let tokens = normalize("con la xyznoun en casa").unwrap();
        let translated = translate_complement(&lex, &tokens);
        assert_eq!(translated.forms, ["wan", "xyznoun", "pi", "wasi"]);
        assert_eq!(translated.unknown, ["xyznoun"]);
    }
}
