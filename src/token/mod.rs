//! Token model shared by every stage of the pipeline.
//!
//! The core only ever sees `(kind, text, start)` triples. Where they come from
//! is the caller's business; `tokenize` is the stock source for Python files.

mod tokenizer;

pub use tokenizer::{tokenize, TokenizeError, Tokenizer};

use phf::phf_map;
use std::fmt;

/// Kinds of token emitted by the source tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    EndMarker,
    Name,
    Number,
    String,
    Newline,
    Indent,
    Dedent,
    Op,
    Comment,
    Nl,
    Encoding,
    ErrorToken,
}

/// Kind names as the tokenizer documentation spells them.
static KIND_NAMES: phf::Map<&'static str, TokenKind> = phf_map! {
    "ENDMARKER" => TokenKind::EndMarker,
    "NAME" => TokenKind::Name,
    "NUMBER" => TokenKind::Number,
    "STRING" => TokenKind::String,
    "NEWLINE" => TokenKind::Newline,
    "INDENT" => TokenKind::Indent,
    "DEDENT" => TokenKind::Dedent,
    "OP" => TokenKind::Op,
    "COMMENT" => TokenKind::Comment,
    "NL" => TokenKind::Nl,
    "ENCODING" => TokenKind::Encoding,
    "ERRORTOKEN" => TokenKind::ErrorToken,
};

impl TokenKind {
    /// Resolve a kind from its upper-case name (e.g. "NAME", "DEDENT").
    pub fn from_name(name: &str) -> Option<Self> {
        KIND_NAMES.get(name).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::EndMarker => "ENDMARKER",
            TokenKind::Name => "NAME",
            TokenKind::Number => "NUMBER",
            TokenKind::String => "STRING",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::Op => "OP",
            TokenKind::Comment => "COMMENT",
            TokenKind::Nl => "NL",
            TokenKind::Encoding => "ENCODING",
            TokenKind::ErrorToken => "ERRORTOKEN",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Start position of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    /// Line number (1-indexed; the encoding marker sits on line 0).
    pub line: usize,
    /// Column in characters (0-indexed).
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.column)
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, start: Position) -> Self {
        Self {
            kind,
            text: text.into(),
            start,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {:?}", self.kind, self.start, self.text)
    }
}
