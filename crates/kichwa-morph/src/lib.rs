//! Tense and person detection for conjugated Spanish verbs.
//!
//! A small, deliberately approximate take on Spanish verb morphology: it does
//! not model the conjugation grammar, it only recovers the infinitive, the
//! tense and (when the ending pins it down) the person of a surface form.
//! Like the lexicon it runs against, it works on folded text (`jugará` is
//! seen as `jugara`).
//!
//! # How it works
//! 1. Check the exact surface-form table (irregular and stem-changing verbs).
//! 2. Accept the surface itself if it is a known infinitive (present tense).
//! 3. Walk the ordered suffix rules: future endings, then past, then present.
//!    Each rule strips its suffix, appends the infinitive ending and asks the
//!    caller whether that root exists. The first rule producing a known root
//!    wins.
//!
//! Existence checks are caller-provided so the crate stays ignorant of how
//! the lexicon is stored.
//!
//! # Example
//! ```
//! use kichwa_morph::{AnalysisSource, Morphology};
//! use kichwa_types::Tense;
//!
//! let morph = Morphology::spanish();
//! let exists = |root: &str| root == "jugar";
//! let analysis = morph.analyze("jugaba", |_| None, exists).unwrap();
//! assert_eq!(analysis.root, "jugar");
//! assert_eq!(analysis.tense, Tense::Past);
//! assert!(matches!(analysis.source, AnalysisSource::Rule { suffix: "aba", .. }));
//! ```
//!
//! For a runnable demo, see `cargo run -p kichwa-morph --example analyze -- <word>...`.

use std::borrow::Cow;

use kichwa_types::Person::{
    FirstPlural as P1, FirstSingular as S1, SecondPlural as P2, SecondSingular as S2,
    ThirdPlural as P3, ThirdSingular as S3,
};
use kichwa_types::Tense::{Future, Past, Present};
use kichwa_types::{Person, Tense, VerbForm};

/// Where an analysis came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AnalysisSource {
    /// Listed verbatim in the surface-form table.
    Exact,
    /// The surface already is an infinitive.
    Infinitive,
    Rule {
        suffix: &'static str,
        replacement: &'static str,
    },
}

/// Infinitive, tense and person recovered from a surface form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerbAnalysis<'a> {
    pub root: Cow<'a, str>,
    pub tense: Tense,
    pub person: Option<Person>,
    pub source: AnalysisSource,
}

/// One ending pattern: `surface = stem + suffix`, `root = stem + replacement`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SuffixRule {
    pub suffix: &'static str,
    pub replacement: &'static str,
    pub tense: Tense,
    pub person: Option<Person>,
}

const fn rule(
    suffix: &'static str,
    replacement: &'static str,
    tense: Tense,
    person: Option<Person>,
) -> SuffixRule {
    SuffixRule {
        suffix,
        replacement,
        tense,
        person,
    }
}

/// Spanish endings in match order. Order is significant: within a tense the
/// longer endings come first, and tenses are tried future, past, present.
pub const SPANISH_RULES: &[SuffixRule] = &[
    // Future.
    rule("aremos", "ar", Future, Some(P1)),
    rule("eremos", "er", Future, Some(P1)),
    rule("iremos", "ir", Future, Some(P1)),
    rule("areis", "ar", Future, Some(P2)),
    rule("ereis", "er", Future, Some(P2)),
    rule("ireis", "ir", Future, Some(P2)),
    rule("aran", "ar", Future, Some(P3)),
    rule("eran", "er", Future, Some(P3)),
    rule("iran", "ir", Future, Some(P3)),
    rule("aras", "ar", Future, Some(S2)),
    rule("eras", "er", Future, Some(S2)),
    rule("iras", "ir", Future, Some(S2)),
    rule("are", "ar", Future, Some(S1)),
    rule("ere", "er", Future, Some(S1)),
    rule("ire", "ir", Future, Some(S1)),
    rule("ara", "ar", Future, Some(S3)),
    rule("era", "er", Future, Some(S3)),
    rule("ira", "ir", Future, Some(S3)),
    // Past: imperfect.
    rule("abamos", "ar", Past, Some(P1)),
    rule("abais", "ar", Past, Some(P2)),
    rule("aban", "ar", Past, Some(P3)),
    rule("abas", "ar", Past, Some(S2)),
    rule("aba", "ar", Past, None),
    rule("iamos", "er", Past, Some(P1)),
    rule("iamos", "ir", Past, Some(P1)),
    rule("iais", "er", Past, Some(P2)),
    rule("iais", "ir", Past, Some(P2)),
    rule("ian", "er", Past, Some(P3)),
    rule("ian", "ir", Past, Some(P3)),
    rule("ias", "er", Past, Some(S2)),
    rule("ias", "ir", Past, Some(S2)),
    rule("ia", "er", Past, None),
    rule("ia", "ir", Past, None),
    // Past: preterite.
    rule("asteis", "ar", Past, Some(P2)),
    rule("aste", "ar", Past, Some(S2)),
    rule("aron", "ar", Past, Some(P3)),
    rule("isteis", "er", Past, Some(P2)),
    rule("isteis", "ir", Past, Some(P2)),
    rule("iste", "er", Past, Some(S2)),
    rule("iste", "ir", Past, Some(S2)),
    rule("ieron", "er", Past, Some(P3)),
    rule("ieron", "ir", Past, Some(P3)),
    rule("io", "er", Past, Some(S3)),
    rule("io", "ir", Past, Some(S3)),
    // `-ar` and `-ir` share this with the present; only `-er` reaches it.
    rule("imos", "er", Past, Some(P1)),
    rule("e", "ar", Past, Some(S1)),
    rule("i", "er", Past, Some(S1)),
    rule("i", "ir", Past, Some(S1)),
    // Present.
    rule("amos", "ar", Present, Some(P1)),
    rule("emos", "er", Present, Some(P1)),
    rule("imos", "ir", Present, Some(P1)),
    rule("ais", "ar", Present, Some(P2)),
    rule("eis", "er", Present, Some(P2)),
    rule("is", "ir", Present, Some(P2)),
    rule("an", "ar", Present, Some(P3)),
    rule("en", "er", Present, Some(P3)),
    rule("en", "ir", Present, Some(P3)),
    rule("as", "ar", Present, Some(S2)),
    rule("es", "er", Present, Some(S2)),
    rule("es", "ir", Present, Some(S2)),
    rule("o", "ar", Present, Some(S1)),
    rule("o", "er", Present, Some(S1)),
    rule("o", "ir", Present, Some(S1)),
    rule("a", "ar", Present, Some(S3)),
    rule("e", "er", Present, Some(S3)),
    rule("e", "ir", Present, Some(S3)),
];

/// Suffix-rule analyzer parameterised by caller-provided lookups.
#[derive(Clone, Copy, Debug)]
pub struct Morphology {
    rules: &'static [SuffixRule],
}

impl Default for Morphology {
    fn default() -> Self {
        Self::spanish()
    }
}

impl Morphology {
    pub fn spanish() -> Self {
        Self::with_rules(SPANISH_RULES)
    }

    pub fn with_rules(rules: &'static [SuffixRule]) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &'static [SuffixRule] {
        self.rules
    }

    /// Return the first analysis for `surface`, following the documented
    /// precedence (exact, infinitive, then rules in table order).
    pub fn analyze<'a, E, R>(
        &self,
        surface: &str,
        exact: E,
        root_exists: R,
    ) -> Option<VerbAnalysis<'a>>
    where
        E: Fn(&str) -> Option<VerbForm<'a>>,
        R: Fn(&str) -> bool,
    {
        if let Some(form) = exact(surface) {
            return Some(VerbAnalysis {
                root: Cow::Borrowed(form.root),
                tense: form.tense,
                person: form.person,
                source: AnalysisSource::Exact,
            });
        }

        if root_exists(surface) {
            return Some(VerbAnalysis {
                root: Cow::Owned(surface.to_string()),
                tense: Tense::Present,
                person: None,
                source: AnalysisSource::Infinitive,
            });
        }

        self.rules.iter().find_map(|r| {
            apply_rule(surface, r)
                .filter(|root| root_exists(root))
                .map(|root| VerbAnalysis {
                    root: Cow::Owned(root),
                    tense: r.tense,
                    person: r.person,
                    source: AnalysisSource::Rule {
                        suffix: r.suffix,
                        replacement: r.replacement,
                    },
                })
        })
    }

    /// Every analysis the rules can produce, in precedence order.
    ///
    /// Useful for debugging ambiguous forms; translation only uses the first.
    pub fn candidates<'a, E, R>(
        &self,
        surface: &str,
        exact: E,
        root_exists: R,
    ) -> Vec<VerbAnalysis<'a>>
    where
        E: Fn(&str) -> Option<VerbForm<'a>>,
        R: Fn(&str) -> bool,
    {
        let mut out = Vec::new();
        if let Some(form) = exact(surface) {
            out.push(VerbAnalysis {
                root: Cow::Borrowed(form.root),
                tense: form.tense,
                person: form.person,
                source: AnalysisSource::Exact,
            });
        }
        if root_exists(surface) {
            out.push(VerbAnalysis {
                root: Cow::Owned(surface.to_string()),
                tense: Tense::Present,
                person: None,
                source: AnalysisSource::Infinitive,
            });
        }
        for r in self.rules {
            if let Some(root) = apply_rule(surface, r)
                && root_exists(&root)
            {
                out.push(VerbAnalysis {
                    root: Cow::Owned(root),
                    tense: r.tense,
                    person: r.person,
                    source: AnalysisSource::Rule {
                        suffix: r.suffix,
                        replacement: r.replacement,
                    },
                });
            }
        }
        out
    }
}

fn apply_rule(surface: &str, rule: &SuffixRule) -> Option<String> {
    surface
        .strip_suffix(rule.suffix)
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{stem}{}", rule.replacement))
}
