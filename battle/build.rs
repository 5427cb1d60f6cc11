//! Build script: validates /cards/cards.json and generates a Rust module
//! that embeds it, so a broken card reference fails the build instead of
//! surfacing as a skipped spawn mid-combat.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;

// ── JSON schema types (build-time only) ──────────────────────────────────────

#[derive(Deserialize)]
struct JsonCard {
    id: String,
    name: String,
    #[serde(default)]
    abilities: Vec<serde_json::Value>,
}

/// Keys whose string values name another catalog entry.
const REFERENCE_KEYS: [&str; 2] = ["card", "enchantment"];

fn collect_references<'a>(value: &'a serde_json::Value, out: &mut Vec<&'a str>) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, inner) in map {
                match inner.as_str() {
                    Some(reference) if REFERENCE_KEYS.contains(&key.as_str()) => out.push(reference),
                    _ => collect_references(inner, out),
                }
            }
        }
        serde_json::Value::Array(items) => {
            for item in items {
                collect_references(item, out);
            }
        }
        _ => {}
    }
}

// ── Main ─────────────────────────────────────────────────────────────────────

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let cards_path = Path::new(&manifest_dir).join("../cards/cards.json");

    println!("cargo:rerun-if-changed={}", cards_path.display());

    let cards_json = fs::read_to_string(&cards_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", cards_path.display()));
    let cards: Vec<JsonCard> =
        serde_json::from_str(&cards_json).expect("Failed to parse cards.json");

    let mut ids = BTreeSet::new();
    for card in &cards {
        assert!(!card.name.is_empty(), "card `{}` has no name", card.id);
        assert!(ids.insert(card.id.as_str()), "duplicate card id `{}`", card.id);
    }

    for card in &cards {
        let mut references = Vec::new();
        for ability in &card.abilities {
            collect_references(ability, &mut references);
        }
        for reference in references {
            assert!(
                ids.contains(reference),
                "card `{}` references unknown card `{reference}`",
                card.id
            );
        }
    }

    // ── Write output ─────────────────────────────────────────────────────────
    let out_dir = env::var("OUT_DIR").unwrap();
    let dest = Path::new(&out_dir).join("cards_generated.rs");
    let canonical = fs::canonicalize(&cards_path)
        .unwrap_or_else(|e| panic!("Failed to resolve {}: {e}", cards_path.display()));

    let generated = format!(
        r#"// Auto-generated from cards.json - DO NOT EDIT

/// The standard card set, validated at build time.
pub const STANDARD_CARDS_JSON: &str = include_str!({path:?});

/// Number of entries in [`STANDARD_CARDS_JSON`].
pub const STANDARD_CARD_COUNT: usize = {count};
"#,
        path = canonical.display().to_string(),
        count = cards.len(),
    );

    fs::write(&dest, generated).expect("Failed to write generated cards file");
}
