//! Lexemes: bound text blocks keyed by the identity they describe.

use std::fmt;

use super::clean::dedent;
use super::ExpoTag;
use crate::token::Position;

/// Where a lexeme was attested and which identity it belongs to.
///
/// Two occurrences are the same key only if both parts match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LexicalOccurrence {
    /// Lineage the text was found in.
    pub attestation: String,
    /// Identity that immediately followed the text, or empty.
    pub lexical: String,
}

impl LexicalOccurrence {
    pub fn new(attestation: impl Into<String>, lexical: impl Into<String>) -> Self {
        Self {
            attestation: attestation.into(),
            lexical: lexical.into(),
        }
    }

    /// The attestation split into its scope segments.
    pub fn diachronic(&self) -> Vec<&str> {
        self.attestation.split('.').collect()
    }
}

impl fmt::Display for LexicalOccurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = format!("{}.{}", self.attestation, self.lexical);
        write!(f, "{}", joined.trim_matches('.'))
    }
}

/// A unit of documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub category: ExpoTag,
    pub canonical: LexicalOccurrence,
    pub content: String,
    /// Source position of the text that produced it.
    pub reference: Position,
}

impl Lexeme {
    pub fn new(
        category: ExpoTag,
        canonical: LexicalOccurrence,
        content: impl Into<String>,
        reference: Position,
    ) -> Self {
        Self {
            category,
            canonical,
            content: content.into(),
            reference,
        }
    }

    /// Build a lexeme from `TAG: content` text.
    ///
    /// The head before the first `:` names the category; the tail is trimmed
    /// and dedented. Returns `None` when the head is not a known tag.
    pub fn from_parts(canonical: LexicalOccurrence, semantic: &str, reference: Position) -> Option<Self> {
        let (head, tail) = semantic.split_once(':').unwrap_or((semantic, ""));
        let category = head.parse::<ExpoTag>().ok()?;
        Some(Self::new(category, canonical, dedent(tail.trim()), reference))
    }

    /// Append a prose package: the first line as a paragraph, the rest as
    /// bullet items.
    pub fn extend_with_prose(&mut self, lines: &[String]) {
        let Some((first, rest)) = lines.split_first() else {
            return;
        };
        self.content.push_str("\n\n");
        self.content.push_str(first);
        if !rest.is_empty() {
            self.content.push_str("\n\n- ");
            self.content.push_str(&rest.join("\n- "));
        }
    }

    /// One-line listing form: `[(l, c)]CATEGORY: canonical`.
    pub fn summary(&self) -> String {
        format!("[{}]{}: {}", self.reference, self.category, self.canonical)
    }
}
