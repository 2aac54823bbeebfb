use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use kichwa_lexicon::{LoadMode, Lexicon};
use kichwa_types::Tense;

fn main() -> Result<()> {
    let dir = env::args().nth(1).map(PathBuf::from);

    let lex = match &dir {
        Some(dir) => Lexicon::load_with_mode(dir, LoadMode::Mmap)
            .with_context(|| format!("loading lexicon from {}", dir.display()))?,
        None => Lexicon::bundled()?,
    };

    let stats = lex.stats();
    match &dir {
        Some(dir) => println!("Lexicon: {}", dir.display()),
        None => println!("Lexicon: bundled"),
    }
    println!("Pronouns     : {}", stats.pronouns);
    println!("Surface forms: {}", stats.surface_forms);
    println!("Verb roots   : {}", stats.roots);
    println!("Conjugations : {}", stats.conjugations);
    println!("Vocabulary   : {}", stats.vocabulary);
    println!("Partial (root, tense) pairs: {}", stats.partial_pairs);

    let mut roots: Vec<&str> = lex.roots().collect();
    roots.sort_unstable();
    for root in roots {
        let mut line = format!("  {root:<10}");
        for tense in Tense::ALL {
            if let Some(cov) = lex.coverage(root, tense) {
                let marker = if cov.is_complete() {
                    "full".to_string()
                } else if cov.generic {
                    format!("{}+*", cov.persons.len())
                } else {
                    format!("{}", cov.persons.len())
                };
                line.push_str(&format!(" {tense}={marker:<5}"));
            }
        }
        println!("{line}");
    }

    Ok(())
}
