//! Output formatting for narrate results.
//!
//! Covers the two scan artifacts and the terminal listings:
//! - Dictionary: JSON object of lexeme records keyed by canonical occurrence
//! - Index: one `key:CATEGORY` line per lexeme, the editorialisation skeleton
//! - Pretty: colored exposition listings and pipeline stage dumps

use colored::*;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::granulate::{Grain, GrainKind, Precursor};
use crate::lexicography::{ExpoTag, Lexeme};
use crate::store::{EtymologyIndex, LexemeStore};
use crate::token::Token;

// =============================================================================
// Dictionary and index
// =============================================================================

/// One lexeme as written to the dictionary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryRecord {
    pub category: String,
    pub canonical: String,
    pub content: String,
    pub reference: String,
}

impl From<&Lexeme> for DictionaryRecord {
    fn from(lexeme: &Lexeme) -> Self {
        Self {
            category: lexeme.category.as_str().to_string(),
            canonical: lexeme.canonical.to_string(),
            content: lexeme.content.replace("\r\n", "\n\n"),
            reference: lexeme.reference.to_string(),
        }
    }
}

/// Serializes a store as a JSON object in store order.
struct Dictionary<'a>(&'a LexemeStore);

impl Serialize for Dictionary<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for lexeme in self.0 {
            map.serialize_entry(&lexeme.canonical.to_string(), &DictionaryRecord::from(lexeme))?;
        }
        map.end()
    }
}

/// Pretty-printed dictionary JSON.
pub fn to_dictionary(store: &LexemeStore) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(&Dictionary(store))?)
}

/// `key:CATEGORY` lines, one per lexeme.
pub fn to_index(store: &LexemeStore) -> String {
    store
        .iter()
        .map(|lexeme| format!("{}:{}\n", lexeme.canonical, lexeme.category))
        .collect()
}

/// Write the dictionary, and the index when a path for it is given.
pub fn save(store: &LexemeStore, dictionary: &Path, index: Option<&Path>) -> anyhow::Result<()> {
    fs::write(dictionary, to_dictionary(store)?)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {}", dictionary.display(), e))?;

    if let Some(index) = index {
        fs::write(index, to_index(store))
            .map_err(|e| anyhow::anyhow!("failed to write {}: {}", index.display(), e))?;
    }

    Ok(())
}

// =============================================================================
// Listings
// =============================================================================

/// Sorted lexeme summaries, optionally limited to one category.
pub fn list_expositions(store: &LexemeStore, filter: Option<ExpoTag>) -> Vec<String> {
    let mut summaries: Vec<String> = store
        .iter()
        .filter(|lexeme| filter.map_or(true, |tag| lexeme.category == tag))
        .map(Lexeme::summary)
        .collect();
    summaries.sort();
    summaries
}

/// Every identity reference, `!`-marked where canonical.
pub fn attestations(grains: &[Grain]) -> Vec<String> {
    grains
        .iter()
        .filter(|g| g.kind == GrainKind::Identity)
        .map(|g| {
            let marker = if g.is_canonical { "!" } else { "" };
            format!("{}[{}]:{}.{}", marker, g.location, g.lineage, g.substance)
        })
        .collect()
}

/// Each distinct identity once, at its canonical reference.
pub fn identities(grains: &[Grain]) -> Vec<String> {
    EtymologyIndex::from_grains(grains)
        .iter()
        .filter_map(|etymology| {
            let reference = etymology.canonical_reference()?;
            Some(format!(
                "[{}]:{}.{}",
                reference, etymology.occurrence.attestation, etymology.occurrence.lexical
            ))
        })
        .collect()
}

/// Indent every line by `level` steps of three spaces.
fn indent(text: &str, level: usize) -> String {
    let pad = "   ".repeat(level);
    text.split_inclusive('\n')
        .map(|line| format!("{}{}", pad, line))
        .collect()
}

/// A lexeme laid out for the terminal, indented by its attestation depth.
///
/// PROSE lexemes have no heading line of their own.
pub fn format_exposition(lexeme: &Lexeme) -> String {
    let depth = lexeme.canonical.diachronic().len().saturating_sub(1);
    let mut out = String::new();

    if depth == 0 {
        out.push_str(&indent(&"-".repeat(20), depth));
        out.push('\n');
    }

    if lexeme.category != ExpoTag::Prose {
        let heading = indent(&lexeme.canonical.to_string(), depth);
        out.push_str(&format!("{}:{};\n", heading.bold(), lexeme.category.as_str().cyan()));
    }

    out.push_str(indent(&lexeme.content, depth + 1).trim_end());
    out.push('\n');
    out
}

/// Print every exposition, optionally limited to one category.
pub fn write_expositions(store: &LexemeStore, filter: Option<ExpoTag>) {
    for lexeme in store
        .iter()
        .filter(|lexeme| filter.map_or(true, |tag| lexeme.category == tag))
    {
        print!("{}", format_exposition(lexeme));
    }
}

/// Print the sorted summaries with a header and footer rule.
pub fn write_summary(store: &LexemeStore) {
    println!("{}", "=== ALL FOUND EXPOSITIONS:".bold());
    for summary in list_expositions(store, None) {
        println!("{}", summary);
    }
    println!("{}", "=".repeat(80).dimmed());
}

// =============================================================================
// Stage dumps
// =============================================================================

/// One line per token.
pub fn dump_tokens(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(Token::to_string).collect()
}

/// Rows of `|`-separated fields with the first column padded to the widest.
fn dump_rows(rows: Vec<Vec<String>>) -> Vec<String> {
    let widest = rows
        .iter()
        .filter_map(|row| row.first())
        .map(|first| first.chars().count())
        .max()
        .unwrap_or(0);

    rows.into_iter()
        .map(|row| {
            let mut fields = row.into_iter();
            let first = fields.next().unwrap_or_default();
            let mut line = format!("{:<width$}", first, width = widest);
            for field in fields {
                line.push('|');
                line.push_str(&field);
            }
            line
        })
        .collect()
}

pub fn dump_precursors(precursors: &[Precursor]) -> Vec<String> {
    dump_rows(
        precursors
            .iter()
            .map(|p| vec![p.lineage.clone(), p.new_line.to_string(), p.particle.to_string()])
            .collect(),
    )
}

pub fn dump_grains(grains: &[Grain]) -> Vec<String> {
    dump_rows(
        grains
            .iter()
            .map(|g| {
                vec![
                    g.lineage.clone(),
                    g.kind.to_string(),
                    format!("{:?}", g.substance),
                    g.location.to_string(),
                    g.is_canonical.to_string(),
                ]
            })
            .collect(),
    )
}
