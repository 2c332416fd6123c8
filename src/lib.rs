//! Narrate - marrying narrative to source code.
//!
//! Narrate reads source written with exposition tags (`KNOWLEDGE:`,
//! `BEHAVIOUR:`, `PROSE:` and friends) in comments and string literals, binds
//! each tagged text to the scoped identity it describes, and produces a
//! dictionary of lexemes plus an index that can be reordered by hand and
//! rendered as markdown.
//!
//! # Architecture
//!
//! - `token`: token model and the indentation-aware source tokenizer
//! - `codex`: classification vocabulary and match predicates
//! - `lineage`: the scope automaton assigning dotted lineages
//! - `granulate`: purify, mix, evaporate and refine tokens into grains
//! - `lexicography`: exposition tags, cleaning and binding into lexemes
//! - `store`: ordered lexeme store and identity etymologies
//! - `report`: dictionary/index output and terminal listings
//! - `narration`: markdown rendering of an editorialised index
//! - `config`: YAML configuration
//! - `cli`: command-line driver

pub mod cli;
pub mod codex;
pub mod config;
pub mod granulate;
pub mod lexicography;
pub mod lineage;
pub mod narration;
pub mod report;
pub mod store;
pub mod token;

pub use config::Config;
pub use granulate::{Grain, GrainKind, GranulateError, Granulation, Granulator};
pub use lexicography::{Diagnostic, ExpoTag, Extraction, LexicalOccurrence, Lexeme, Lexicographer};
pub use lineage::Registrar;
pub use narration::{render, NarrationError};
pub use store::{Etymology, EtymologyIndex, LexemeStore};
pub use token::{tokenize, Position, Token, TokenKind, TokenizeError};
