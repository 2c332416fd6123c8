//! Narration: pouring lexemes into an editorialised index to produce markdown.
//!
//! The index file written by a scan is edited by hand: lines are reordered,
//! removed, and interleaved with free text. Each `key:CATEGORY` line pulls the
//! matching lexeme from the dictionary; everything else is copied through.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::report::DictionaryRecord;

const MAX_HEADING_DEPTH: usize = 6;

/// Errors while rendering a narration.
#[derive(Error, Debug)]
pub enum NarrationError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed dictionary: {0}")]
    Dictionary(#[from] serde_json::Error),
}

/// Heading level for a dotted key: one per dot, at least 1 and at most 6.
fn heading_depth(key: &str) -> usize {
    key.matches('.').count().clamp(1, MAX_HEADING_DEPTH)
}

/// Render markdown from dictionary JSON and index text.
pub fn render(dictionary_json: &str, index: &str) -> Result<String, NarrationError> {
    let dictionary: HashMap<String, DictionaryRecord> = serde_json::from_str(dictionary_json)?;
    let mut out = String::new();

    for line in index.lines() {
        let line = line.trim_end();

        if line.trim().is_empty() {
            out.push('\n');
            continue;
        }

        let Some((key, category)) = line.rsplit_once(':') else {
            out.push_str(line);
            out.push('\n');
            continue;
        };

        let key = key.trim();
        let category = category.trim();
        let hashes = "#".repeat(heading_depth(key));

        match dictionary.get(key) {
            Some(record) => {
                out.push_str(&format!("{} {} · *{}*\n\n", hashes, key, category));
                out.push_str(&format!("{}\n\n", record.content.trim_end()));
            }
            None => {
                if std::env::var("NARRATE_DEBUG").is_ok() {
                    eprintln!("[debug] no lexeme for index key {:?}", key);
                }
                out.push_str(&format!("{} {} · *[Missing]*\n\n", hashes, key));
                out.push_str("> ⚠️ Lexeme not found in archive.\n\n");
            }
        }
    }

    Ok(out)
}

/// Render `<base>.json` and `<base>.txt` into `output`.
pub fn render_files(base: &Path, output: &Path) -> Result<(), NarrationError> {
    let dictionary_path = with_suffix(base, "json");
    let index_path = with_suffix(base, "txt");

    let dictionary = read(&dictionary_path)?;
    let index = read(&index_path)?;
    let markdown = render(&dictionary, &index)?;

    fs::write(output, markdown).map_err(|source| NarrationError::Write {
        path: output.to_path_buf(),
        source,
    })
}

/// `base` with `.ext` appended, leaving any dots already in the name alone.
pub fn with_suffix(base: &Path, ext: &str) -> PathBuf {
    let mut name = base.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn read(path: &Path) -> Result<String, NarrationError> {
    fs::read_to_string(path).map_err(|source| NarrationError::Read {
        path: path.to_path_buf(),
        source,
    })
}
