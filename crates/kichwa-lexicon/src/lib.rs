//! Load the Spanish to Kichwa lookup tables into read-only maps.
//!
//! A lexicon is four flat, tab-separated tables:
//!
//! | file                | columns                              |
//! |---------------------|--------------------------------------|
//! | `pronouns.tsv`      | `spanish  person  kichwa`            |
//! | `surface_forms.tsv` | `surface  root  tense  person`       |
//! | `conjugations.tsv`  | `root  tense  person  kichwa`        |
//! | `vocabulary.tsv`    | `spanish  kichwa`                    |
//!
//! Blank lines and lines starting with `#` are ignored. Spanish keys are
//! [`fold`]ed on load, Kichwa values are kept verbatim. A person column may
//! hold `*`: in `surface_forms.tsv` it means the form does not pin down a
//! person, in `conjugations.tsv` it declares the generic form used for any
//! person without a dedicated row. An empty Kichwa value in the vocabulary
//! marks a Spanish word (typically an article) with no Kichwa counterpart.
//!
//! Tables are validated as a whole: every surface form must point at a root
//! with a conjugation row for its tense, and duplicate keys are rejected.
//!
//! # Example
//! ```
//! use kichwa_lexicon::Lexicon;
//! use kichwa_types::{Person, Tense};
//!
//! # fn main() -> anyhow::Result<()> {
//! let lex = Lexicon::bundled()?;
//! let yo = lex.pronoun("yo").expect("yo is bundled");
//! assert_eq!(yo.person, Person::FirstSingular);
//!
//! let form = lex
//!     .conjugation("jugar", Tense::Present, Some(Person::FirstSingular))
//!     .expect("jugar is bundled");
//! assert_eq!(form.kichwa, "pukllani");
//! # Ok(()) }
//! ```
//!
//! For a runnable demo, see `cargo run -p kichwa-lexicon --example stats -- [<dir>]`.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use kichwa_types::{Person, Tense, VerbForm, decode_person_slot, fold};
use memmap2::Mmap;

pub const PRONOUNS_FILE: &str = "pronouns.tsv";
pub const SURFACE_FORMS_FILE: &str = "surface_forms.tsv";
pub const CONJUGATIONS_FILE: &str = "conjugations.tsv";
pub const VOCABULARY_FILE: &str = "vocabulary.tsv";

const BUNDLED: LexiconSources<'static> = LexiconSources {
    pronouns: include_str!("../data/pronouns.tsv"),
    surface_forms: include_str!("../data/surface_forms.tsv"),
    conjugations: include_str!("../data/conjugations.tsv"),
    vocabulary: include_str!("../data/vocabulary.tsv"),
};

/// Strategy for reading table files from disk.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each table file.
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// Raw text of the four tables, however it was obtained.
#[derive(Clone, Copy, Debug)]
pub struct LexiconSources<'a> {
    pub pronouns: &'a str,
    pub surface_forms: &'a str,
    pub conjugations: &'a str,
    pub vocabulary: &'a str,
}

/// A subject pronoun and the person it denotes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Pronoun<'a> {
    pub person: Person,
    pub kichwa: &'a str,
}

/// Which row of a paradigm answered a conjugation lookup.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FormSource {
    /// A row for the requested person.
    Person,
    /// The generic `*` row.
    Generic,
    /// Neither existed; the third-person singular row stood in.
    ThirdPersonDefault,
}

/// A Kichwa conjugated verb plus the row that produced it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Conjugation<'a> {
    pub kichwa: &'a str,
    pub source: FormSource,
}

/// Persons covered for a `(root, tense)` pair.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Coverage {
    pub persons: Vec<Person>,
    pub generic: bool,
}

impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.persons.len() == Person::ALL.len()
    }
}

/// Table sizes, handy for startup logging.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct LexiconStats {
    pub pronouns: usize,
    pub surface_forms: usize,
    pub roots: usize,
    pub conjugations: usize,
    pub vocabulary: usize,
    /// `(root, tense)` pairs missing at least one person row.
    pub partial_pairs: usize,
}

struct PronounData {
    person: Person,
    kichwa: String,
}

struct SurfaceData {
    root: String,
    tense: Tense,
    person: Option<Person>,
}

#[derive(Default)]
struct Paradigm {
    forms: HashMap<(Tense, Option<Person>), String>,
}

impl Paradigm {
    fn has_tense(&self, tense: Tense) -> bool {
        self.forms.keys().any(|(t, _)| *t == tense)
    }
}

/// Read-only Spanish to Kichwa lookup tables.
pub struct Lexicon {
    pronouns: HashMap<String, PronounData>,
    surface_forms: HashMap<String, SurfaceData>,
    paradigms: HashMap<String, Paradigm>,
    vocabulary: HashMap<String, String>,
}

impl Lexicon {
    /// Tables compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_sources(BUNDLED).context("bundled lexicon")
    }

    /// Load the four tables from a directory, memory-mapping each file.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(dir, LoadMode::Mmap)
    }

    /// Load the four tables from a directory choosing the backing at runtime.
    pub fn load_with_mode(dir: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let dir = dir.as_ref();
        for name in [PRONOUNS_FILE, SURFACE_FORMS_FILE, CONJUGATIONS_FILE, VOCABULARY_FILE] {
            let path = dir.join(name);
            if !path.exists() {
                bail!("missing required lexicon file: {}", path.display());
            }
        }

        let pronouns = load_file(dir.join(PRONOUNS_FILE), mode)?;
        let surface_forms = load_file(dir.join(SURFACE_FORMS_FILE), mode)?;
        let conjugations = load_file(dir.join(CONJUGATIONS_FILE), mode)?;
        let vocabulary = load_file(dir.join(VOCABULARY_FILE), mode)?;

        let sources = LexiconSources {
            pronouns: as_text(&pronouns, PRONOUNS_FILE)?,
            surface_forms: as_text(&surface_forms, SURFACE_FORMS_FILE)?,
            conjugations: as_text(&conjugations, CONJUGATIONS_FILE)?,
            vocabulary: as_text(&vocabulary, VOCABULARY_FILE)?,
        };
        Self::from_sources(sources).with_context(|| format!("lexicon at {}", dir.display()))
    }

    /// Parse and validate tables from in-memory text.
    pub fn from_sources(sources: LexiconSources<'_>) -> Result<Self> {
        let paradigms = parse_conjugations(sources.conjugations)?;
        let pronouns = parse_pronouns(sources.pronouns)?;
        let surface_forms = parse_surface_forms(sources.surface_forms, &paradigms)?;
        let vocabulary = parse_vocabulary(sources.vocabulary)?;

        Ok(Self {
            pronouns,
            surface_forms,
            paradigms,
            vocabulary,
        })
    }

    /// Look up a subject pronoun.
    pub fn pronoun(&self, word: &str) -> Option<Pronoun<'_>> {
        self.pronouns.get(key(word).as_ref()).map(|p| Pronoun {
            person: p.person,
            kichwa: p.kichwa.as_str(),
        })
    }

    /// Look up a conjugated form listed verbatim in `surface_forms.tsv`.
    pub fn surface_form(&self, word: &str) -> Option<VerbForm<'_>> {
        self.surface_forms
            .get(key(word).as_ref())
            .map(|s| VerbForm {
                root: s.root.as_str(),
                tense: s.tense,
                person: s.person,
            })
    }

    /// Whether an infinitive has any conjugation rows.
    pub fn root_exists(&self, root: &str) -> bool {
        self.paradigms.contains_key(key(root).as_ref())
    }

    /// Iterate over every known infinitive.
    pub fn roots(&self) -> impl Iterator<Item = &str> + '_ {
        self.paradigms.keys().map(String::as_str)
    }

    /// Resolve the Kichwa form for `(root, tense, person)`.
    ///
    /// Tries the person-specific row, then the generic `*` row, then the
    /// third-person singular row. With `person == None` the first step is
    /// skipped.
    pub fn conjugation(
        &self,
        root: &str,
        tense: Tense,
        person: Option<Person>,
    ) -> Option<Conjugation<'_>> {
        let paradigm = self.paradigms.get(key(root).as_ref())?;
        let lookup = move |slot: Option<Person>| paradigm.forms.get(&(tense, slot)).map(String::as_str);

        if let Some(p) = person
            && let Some(kichwa) = lookup(Some(p))
        {
            return Some(Conjugation {
                kichwa,
                source: FormSource::Person,
            });
        }
        if let Some(kichwa) = lookup(None) {
            return Some(Conjugation {
                kichwa,
                source: FormSource::Generic,
            });
        }
        lookup(Some(Person::ThirdSingular)).map(|kichwa| Conjugation {
            kichwa,
            source: FormSource::ThirdPersonDefault,
        })
    }

    /// Report which persons have their own row for `(root, tense)`.
    pub fn coverage(&self, root: &str, tense: Tense) -> Option<Coverage> {
        let paradigm = self.paradigms.get(key(root).as_ref())?;
        if !paradigm.has_tense(tense) {
            return None;
        }
        let persons = Person::ALL
            .into_iter()
            .filter(|p| paradigm.forms.contains_key(&(tense, Some(*p))))
            .collect();
        Some(Coverage {
            persons,
            generic: paradigm.forms.contains_key(&(tense, None)),
        })
    }

    /// Look up a general vocabulary word. `Some("")` means "omit".
    pub fn vocabulary(&self, word: &str) -> Option<&str> {
        self.vocabulary.get(key(word).as_ref()).map(String::as_str)
    }

    pub fn stats(&self) -> LexiconStats {
        let mut partial_pairs = 0usize;
        for root in self.paradigms.keys() {
            for tense in Tense::ALL {
                if let Some(cov) = self.coverage(root, tense)
                    && !cov.is_complete()
                {
                    partial_pairs += 1;
                }
            }
        }
        LexiconStats {
            pronouns: self.pronouns.len(),
            surface_forms: self.surface_forms.len(),
            roots: self.paradigms.len(),
            conjugations: self.paradigms.values().map(|p| p.forms.len()).sum(),
            vocabulary: self.vocabulary.len(),
            partial_pairs,
        }
    }
}

fn load_file(path: PathBuf, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            let len = file
                .metadata()
                .with_context(|| format!("stat {}", path.display()))?
                .len();
            // Zero-length mappings are rejected by the OS.
            if len == 0 {
                return Ok(Buffer::Owned(Vec::new()));
            }
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(&path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

fn as_text<'a>(buffer: &'a Buffer, name: &str) -> Result<&'a str> {
    std::str::from_utf8(buffer.as_slice()).with_context(|| format!("{name} is not valid UTF-8"))
}

/// Yield `(line number, fields)` for every record line of a table.
fn records<'a>(
    text: &'a str,
    table: &'static str,
    columns: usize,
) -> impl Iterator<Item = Result<(usize, Vec<&'a str>)>> + 'a {
    text.lines().enumerate().filter_map(move |(idx, raw)| {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            return None;
        }
        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
        if fields.len() != columns {
            return Some(Err(anyhow::anyhow!(
                "{table}:{} expected {columns} columns, found {}",
                idx + 1,
                fields.len()
            )));
        }
        if fields[0].is_empty() {
            return Some(Err(anyhow::anyhow!("{table}:{} empty key", idx + 1)));
        }
        Some(Ok((idx + 1, fields)))
    })
}

fn parse_tense(raw: &str, table: &str, lineno: usize) -> Result<Tense> {
    Tense::from_code(raw).with_context(|| format!("{table}:{lineno} unknown tense `{raw}`"))
}

fn parse_person(raw: &str, table: &str, lineno: usize) -> Result<Person> {
    Person::from_code(raw).with_context(|| format!("{table}:{lineno} unknown person `{raw}`"))
}

fn parse_slot(raw: &str, table: &str, lineno: usize) -> Result<Option<Person>> {
    decode_person_slot(raw).with_context(|| format!("{table}:{lineno} unknown person `{raw}`"))
}

fn parse_conjugations(text: &str) -> Result<HashMap<String, Paradigm>> {
    let mut paradigms: HashMap<String, Paradigm> = HashMap::new();
    for record in records(text, CONJUGATIONS_FILE, 4) {
        let (lineno, fields) = record?;
        let root = fold(fields[0]);
        let tense = parse_tense(fields[1], CONJUGATIONS_FILE, lineno)?;
        let slot = parse_slot(fields[2], CONJUGATIONS_FILE, lineno)?;
        let kichwa = fields[3];
        if kichwa.is_empty() {
            bail!("{CONJUGATIONS_FILE}:{lineno} empty Kichwa form for `{root}`");
        }
        let paradigm = paradigms.entry(root.clone()).or_default();
        if paradigm
            .forms
            .insert((tense, slot), kichwa.to_string())
            .is_some()
        {
            bail!(
                "{CONJUGATIONS_FILE}:{lineno} duplicate row for `{root}` {tense} {}",
                fields[2]
            );
        }
    }
    Ok(paradigms)
}

fn parse_pronouns(text: &str) -> Result<HashMap<String, PronounData>> {
    let mut pronouns = HashMap::new();
    for record in records(text, PRONOUNS_FILE, 3) {
        let (lineno, fields) = record?;
        let spanish = fold(fields[0]);
        let person = parse_person(fields[1], PRONOUNS_FILE, lineno)?;
        let data = PronounData {
            person,
            kichwa: fields[2].to_string(),
        };
        if pronouns.insert(spanish.clone(), data).is_some() {
            bail!("{PRONOUNS_FILE}:{lineno} duplicate pronoun `{spanish}`");
        }
    }
    Ok(pronouns)
}

fn parse_surface_forms(
    text: &str,
    paradigms: &HashMap<String, Paradigm>,
) -> Result<HashMap<String, SurfaceData>> {
    let mut forms = HashMap::new();
    for record in records(text, SURFACE_FORMS_FILE, 4) {
        let (lineno, fields) = record?;
        let surface = fold(fields[0]);
        let root = fold(fields[1]);
        let tense = parse_tense(fields[2], SURFACE_FORMS_FILE, lineno)?;
        let person = parse_slot(fields[3], SURFACE_FORMS_FILE, lineno)?;

        let Some(paradigm) = paradigms.get(&root) else {
            bail!("{SURFACE_FORMS_FILE}:{lineno} root `{root}` has no conjugations");
        };
        if !paradigm.has_tense(tense) {
            bail!("{SURFACE_FORMS_FILE}:{lineno} root `{root}` has no {tense} conjugations");
        }

        let data = SurfaceData {
            root,
            tense,
            person,
        };
        if forms.insert(surface.clone(), data).is_some() {
            bail!("{SURFACE_FORMS_FILE}:{lineno} duplicate surface form `{surface}`");
        }
    }
    Ok(forms)
}

fn parse_vocabulary(text: &str) -> Result<HashMap<String, String>> {
    let mut vocabulary = HashMap::new();
    for record in records(text, VOCABULARY_FILE, 2) {
        let (lineno, fields) = record?;
        let spanish = fold(fields[0]);
        if vocabulary
            .insert(spanish.clone(), fields[1].to_string())
            .is_some()
        {
            bail!("{VOCABULARY_FILE}:{lineno} duplicate word `{spanish}`");
        }
    }
    Ok(vocabulary)
}

/// Fold a lookup key, borrowing when it is already folded ASCII.
fn key(word: &str) -> Cow<'_, str> {
    let word = word.trim();
    if word.bytes().all(|b| b.is_ascii() && !b.is_ascii_uppercase()) {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(fold(word))
    }
}
