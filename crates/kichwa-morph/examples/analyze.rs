use std::env;

use anyhow::{Result, bail};
use kichwa_lexicon::Lexicon;
use kichwa_morph::Morphology;
use kichwa_types::fold;

fn main() -> Result<()> {
    let words: Vec<String> = env::args().skip(1).collect();
    if words.is_empty() {
        bail!("usage: cargo run -p kichwa-morph --example analyze -- <word>...");
    }

    let lex = Lexicon::bundled()?;
    let morph = Morphology::spanish();

    for word in words {
        let surface = fold(&word);
        println!("\nSurface: {surface}");
        let candidates =
            morph.candidates(&surface, |s| lex.surface_form(s), |r| lex.root_exists(r));
        if candidates.is_empty() {
            println!("  (no analysis)");
            continue;
        }
        for cand in candidates {
            let person = cand.person.map_or("*", |p| p.code());
            println!(
                "  {:<10} {:<8} {:<3} [{:?}]",
                cand.root, cand.tense, person, cand.source
            );
        }
    }

    Ok(())
}
