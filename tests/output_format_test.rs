//! Tests for the dictionary, index and narration formats.
//!
//! The dictionary and index written by a scan are consumed by hand
//! editorialisation and by `narrate render`, so their shape is a contract.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use narrate::cli::{collect_files, scan_files};
use narrate::narration::{render_files, with_suffix};
use narrate::report::{self, DictionaryRecord};
use narrate::{Config, LexemeStore};

fn story_store() -> LexemeStore {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/story");
    let files = collect_files(&root, &Config::default()).expect("should walk testdata");
    scan_files(&root, &files, true).store
}

#[test]
fn test_dictionary_records() {
    let json = report::to_dictionary(&story_store()).unwrap();
    let records: HashMap<String, DictionaryRecord> =
        serde_json::from_str(&json).expect("dictionary should be valid JSON");

    let flaw = &records["lexicon.UnknownWord"];
    assert_eq!(flaw.category, "FLAW");
    assert_eq!(flaw.canonical, "lexicon.UnknownWord");
    assert_eq!(flaw.content, "raised when a word is unknown");
    assert_eq!(flaw.reference, "(23, 0)");
}

#[test]
fn test_dictionary_is_ordered_and_indented() {
    let json = report::to_dictionary(&story_store()).unwrap();
    assert!(json.starts_with("{\n  \"lexicon\": {\n    \"category\": \"THROUGHLINE\","));

    let throughline = json.find("\"lexicon\":").unwrap();
    let scopes = json.find("\"pkg.scopes.A.n\":").unwrap();
    assert!(throughline < scopes);
}

#[test]
fn test_index_format() {
    let index = report::to_index(&story_store());
    let lines: Vec<&str> = index.lines().collect();
    assert_eq!(lines[0], "lexicon:THROUGHLINE");
    assert_eq!(lines[4], "lexicon.Keeper.add:BEHAVIOUR");
    assert_eq!(lines.len(), 8);
    assert!(index.ends_with('\n'));
}

#[test]
fn test_editorialised_render() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path().join("expo");
    report::save(
        &story_store(),
        &with_suffix(&base, "json"),
        Some(&with_suffix(&base, "txt")),
    )
    .unwrap();

    // Reorder by hand, add glue, and reference something that is not there.
    fs::write(
        with_suffix(&base, "txt"),
        "The Keeper\n\nlexicon.Keeper.add:BEHAVIOUR\nlexicon:THROUGHLINE\nlexicon.Gone:SKILL\n",
    )
    .unwrap();

    let output = dir.path().join("narration.md");
    render_files(&base, &output).unwrap();
    let markdown = fs::read_to_string(&output).unwrap();

    let expected = "The Keeper\n\
        \n\
        ## lexicon.Keeper.add · *BEHAVIOUR*\n\
        \n\
        adds a word\n\
        \n\
        adding is simple\n\
        \n\
        - first we check\n\
        - then we append\n\
        \n\
        # lexicon · *THROUGHLINE*\n\
        \n\
        a small lexicon of words\n\
        \n\
        # lexicon.Gone · *[Missing]*\n\
        \n\
        > ⚠️ Lexeme not found in archive.\n\
        \n";
    assert_eq!(markdown, expected);
}

#[test]
fn test_save_without_index() {
    let dir = tempfile::tempdir().unwrap();
    let dictionary = dir.path().join("expo.json");
    report::save(&story_store(), &dictionary, None).unwrap();
    assert!(dictionary.exists());
    assert!(!dir.path().join("expo.txt").exists());
}
