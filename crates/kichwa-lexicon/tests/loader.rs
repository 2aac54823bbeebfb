use std::path::PathBuf;

use kichwa_lexicon::{FormSource, LoadMode, Lexicon};
use kichwa_types::{Person, Tense};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("lex")
}

#[test]
fn loads_fixture_tables_in_both_modes() {
    for mode in [LoadMode::Mmap, LoadMode::Owned] {
        let lex = Lexicon::load_with_mode(fixture_dir(), mode).expect("load fixtures");
        let stats = lex.stats();
        assert_eq!(stats.pronouns, 2);
        assert_eq!(stats.surface_forms, 2);
        assert_eq!(stats.roots, 2);
        assert_eq!(stats.conjugations, 4);
        assert_eq!(stats.vocabulary, 3);
    }
}

#[test]
fn resolves_surface_forms_and_conjugations() {
    let lex = Lexicon::load(fixture_dir()).expect("load fixtures");

    let juego = lex.surface_form("juego").expect("juego listed");
    assert_eq!(juego.root, "jugar");
    assert_eq!(juego.tense, Tense::Present);
    assert_eq!(juego.person, Some(Person::FirstSingular));

    let iba = lex.surface_form("iba").expect("iba listed");
    assert_eq!(iba.person, None);

    // Trailing carriage returns are not part of the value.
    let rirka = lex.conjugation("ir", Tense::Past, None).unwrap();
    assert_eq!(rirka.kichwa, "rirka");
    assert_eq!(rirka.source, FormSource::Generic);

    let pukllan = lex
        .conjugation("jugar", Tense::Present, Some(Person::FirstPlural))
        .unwrap();
    assert_eq!(pukllan.kichwa, "pukllan");
    assert_eq!(pukllan.source, FormSource::ThirdPersonDefault);
}

#[test]
fn missing_table_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pronouns.tsv"), "yo\t1s\tñuka\n").unwrap();
    let err = Lexicon::load(dir.path()).err().expect("load must fail");
    assert!(err.to_string().contains("missing required lexicon file"));
}

#[test]
fn empty_tables_load_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "pronouns.tsv",
        "surface_forms.tsv",
        "conjugations.tsv",
        "vocabulary.tsv",
    ] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    let lex = Lexicon::load_with_mode(dir.path(), LoadMode::Mmap).expect("empty lexicon");
    assert_eq!(lex.stats(), Default::default());
}

#[test]
fn malformed_row_names_file_and_line() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("pronouns.tsv"), "yo\t1s\tñuka\ntú\t9s\tkan\n").unwrap();
    std::fs::write(dir.path().join("surface_forms.tsv"), "").unwrap();
    std::fs::write(dir.path().join("conjugations.tsv"), "").unwrap();
    std::fs::write(dir.path().join("vocabulary.tsv"), "").unwrap();
    let err = Lexicon::load(dir.path()).err().expect("load must fail");
    let message = format!("{err:#}");
    assert!(message.contains("pronouns.tsv:2"), "{message}");
    assert!(message.contains("unknown person"), "{message}");
}
