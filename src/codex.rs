//! Classification vocabulary and compound match predicates.
//!
//! A token knows *what* it is (a NAME, an OP) but not what it *means*.
//! `Lexicon` names the handful of word sets that carry meaning for us, and an
//! `Entity` layers kind-only or kind-plus-lexicon rules over tokens:
//!
//! ```text
//! HONOURIFICS = Entity::new(&[Rule::valued(Name, Lexicon::Reserved)])
//! ```
//!
//! matches any NAME whose lower-cased text is a reserved word. Each pipeline
//! stage declares its own entities as `const` tables.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::token::{Token, TokenKind};

/// Word and operator sets that steer classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lexicon {
    /// Marks the start of a decorator.
    Decorator,
    /// Member access.
    Accessor,
    /// Keywords that open a named scope.
    Encapsulators,
    /// Reserved words of the language.
    Reserved,
}

const DECORATOR: &[&str] = &["@"];
const ACCESSOR: &[&str] = &["."];
const ENCAPSULATORS: &[&str] = &["class", "def"];

// Stored case-folded; membership is tested against the lower-cased token text.
const RESERVED: &[&str] = &[
    "and", "as", "assert", "async", "await", "break", "class", "continue", "def", "del", "elif",
    "else", "except", "false", "finally", "for", "from", "global", "if", "import", "in", "is",
    "lambda", "none", "nonlocal", "not", "or", "pass", "raise", "return", "true", "try", "while",
    "with", "yield",
];

static RESERVED_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| RESERVED.iter().copied().collect());

impl Lexicon {
    /// The words in this set.
    pub fn words(&self) -> &'static [&'static str] {
        match self {
            Lexicon::Decorator => DECORATOR,
            Lexicon::Accessor => ACCESSOR,
            Lexicon::Encapsulators => ENCAPSULATORS,
            Lexicon::Reserved => RESERVED,
        }
    }

    /// Case-insensitive membership.
    pub fn contains(&self, text: &str) -> bool {
        let folded = text.to_lowercase();
        match self {
            Lexicon::Reserved => RESERVED_SET.contains(folded.as_str()),
            other => other.words().contains(&folded.as_str()),
        }
    }
}

/// One matching rule: a token kind, optionally narrowed to a lexicon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub kind: TokenKind,
    pub values: Option<Lexicon>,
}

impl Rule {
    /// Match every token of `kind`.
    pub const fn kind(kind: TokenKind) -> Self {
        Self { kind, values: None }
    }

    /// Match tokens of `kind` whose text belongs to `lexicon`.
    pub const fn valued(kind: TokenKind, lexicon: Lexicon) -> Self {
        Self {
            kind,
            values: Some(lexicon),
        }
    }
}

/// A compound matcher over `(kind, text)`.
///
/// At most one rule applies per kind; the first rule registered for a kind
/// wins. Tokens of a kind with no rule never match.
#[derive(Debug, Clone, Copy)]
pub struct Entity {
    rules: &'static [Rule],
}

impl Entity {
    pub const fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// The rule registered for `kind`, if any.
    pub fn rule_for(&self, kind: TokenKind) -> Option<&Rule> {
        self.rules.iter().find(|r| r.kind == kind)
    }

    /// Whether this entity recognises the token.
    pub fn is_entity(&self, token: &Token) -> bool {
        match self.rule_for(token.kind) {
            Some(Rule {
                values: Some(lexicon),
                ..
            }) => lexicon.contains(&token.text),
            Some(_) => true,
            None => false,
        }
    }
}
