//! Binding text grains to the identities they describe.
//!
//! Tagged text binds to the identity grain that immediately follows it. Plain
//! comments survive extraction only long enough to be swept into a PROSE
//! block; prose is appended to whichever lexeme was bound most recently.

use std::fmt;

use super::clean::{clean, dedent, is_commentary, is_expo, strip_comment_marker};
use super::{ExpoTag, LexicalOccurrence, Lexeme};
use crate::granulate::{Grain, GrainKind};
use crate::store::LexemeStore;
use crate::token::Position;

const PROSE_OPENER: &str = "PROSE:";

/// A TEXT grain that survived cleaning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEntry {
    pub occurrence: LexicalOccurrence,
    /// Cleaned text; still starts with `#` for untagged or PROSE comments.
    pub semantic: String,
    pub reference: Position,
}

impl TextEntry {
    /// Whether the entry is raw commentary rather than a bound exposition.
    pub fn is_commentary(&self) -> bool {
        is_commentary(&self.semantic)
    }

    /// Whether the entry is a comment that opens a PROSE block.
    pub fn opens_prose(&self) -> bool {
        self.is_commentary()
            && self
                .semantic
                .trim_start_matches('#')
                .to_uppercase()
                .trim_start()
                .starts_with(PROSE_OPENER)
    }
}

/// Something the extractor had to give up on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A PROSE block appeared before anything was bound and its anchor
    /// identity was already documented, so it had nowhere to go.
    ProseDropped {
        occurrence: LexicalOccurrence,
        reference: Position,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ProseDropped {
                occurrence,
                reference,
            } => write!(
                f,
                "misplaced PROSE block at {} dropped: {} already documented",
                reference, occurrence
            ),
        }
    }
}

/// Outcome of one extraction.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub lexemes: LexemeStore,
    pub diagnostics: Vec<Diagnostic>,
}

/// Unpack a TEXT grain, pairing it with the identity that follows.
///
/// Returns `None` for non-TEXT grains, for strings that carry no tag, and for
/// strings whose unquoted body merely looks like a comment. Comments are kept
/// even when untagged.
pub fn unpack_text_entry(this: &Grain, next: Option<&Grain>) -> Option<TextEntry> {
    if this.kind != GrainKind::Text {
        return None;
    }

    let lexical = match next {
        Some(grain) if grain.kind == GrainKind::Identity => grain.substance.as_str(),
        _ => "",
    };

    let was_comment = is_commentary(&this.substance);
    let semantic = clean(&this.substance);
    if !was_comment && is_commentary(semantic) {
        return None;
    }
    if !is_expo(semantic) && !is_commentary(semantic) {
        return None;
    }

    Some(TextEntry {
        occurrence: LexicalOccurrence::new(this.lineage.clone(), lexical),
        semantic: semantic.to_string(),
        reference: this.location,
    })
}

/// A PROSE block being collected.
#[derive(Debug, Default)]
struct ProsePackage {
    lines: Vec<String>,
    anchor: Option<(LexicalOccurrence, Position)>,
}

impl ProsePackage {
    fn push(&mut self, entry: &TextEntry) {
        let content = strip_comment_marker(&entry.semantic);
        if self.anchor.is_none() {
            let tail = content.split_once(':').map(|(_, tail)| tail).unwrap_or("");
            self.anchor = Some((entry.occurrence.clone(), entry.reference));
            self.lines.push(tail.trim_start().to_string());
        } else {
            self.lines.push(content.to_string());
        }
    }

    fn take(&mut self) -> Option<(Vec<String>, LexicalOccurrence, Position)> {
        let lines = std::mem::take(&mut self.lines);
        let (occurrence, reference) = self.anchor.take()?;
        if lines.is_empty() {
            return None;
        }
        Some((lines, occurrence, reference))
    }
}

/// Builds a lexeme store from a file's grains.
#[derive(Debug, Default)]
pub struct Lexicographer {
    lexemes: LexemeStore,
    latest: Option<LexicalOccurrence>,
    package: ProsePackage,
    diagnostics: Vec<Diagnostic>,
}

impl Lexicographer {
    /// Extract and bind every exposition in `grains`.
    pub fn extract(grains: &[Grain]) -> Extraction {
        let texts: Vec<TextEntry> = grains
            .iter()
            .enumerate()
            .filter_map(|(i, grain)| unpack_text_entry(grain, grains.get(i + 1)))
            .collect();

        let mut lexicographer = Self::default();
        lexicographer.package_prose(&texts);
        Extraction {
            lexemes: lexicographer.lexemes,
            diagnostics: lexicographer.diagnostics,
        }
    }

    fn package_prose(&mut self, texts: &[TextEntry]) {
        let mut merging = false;
        for entry in texts {
            merging = if merging {
                entry.is_commentary()
            } else {
                entry.opens_prose()
            };

            if merging {
                self.package.push(entry);
            } else {
                self.update_survivors(entry);
            }
        }
        self.flush_package();
    }

    fn update_survivors(&mut self, entry: &TextEntry) {
        self.flush_package();
        if entry.is_commentary() {
            return;
        }

        match Lexeme::from_parts(entry.occurrence.clone(), &entry.semantic, entry.reference) {
            Some(lexeme) => {
                self.latest = Some(entry.occurrence.clone());
                self.lexemes.insert(lexeme);
            }
            None => {
                if std::env::var("NARRATE_DEBUG").is_ok() {
                    eprintln!("[debug] unbindable text at {}: {:?}", entry.reference, entry.semantic);
                }
            }
        }
    }

    fn flush_package(&mut self) {
        let Some((lines, anchor, reference)) = self.package.take() else {
            return;
        };

        if let Some(latest) = &self.latest {
            if let Some(lexeme) = self.lexemes.get_mut(latest) {
                lexeme.extend_with_prose(&lines);
            }
            return;
        }

        if self.lexemes.contains(&anchor) {
            self.diagnostics.push(Diagnostic::ProseDropped {
                occurrence: anchor,
                reference,
            });
            return;
        }

        let content = dedent(lines.join("\n").trim());
        self.lexemes
            .insert(Lexeme::new(ExpoTag::Prose, anchor.clone(), content, reference));
        self.latest = Some(anchor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grain(kind: GrainKind, lineage: &str, substance: &str, line: usize) -> Grain {
        Grain {
            lineage: lineage.to_string(),
            kind,
            substance: substance.to_string(),
            location: Position::new(line, 0),
            is_canonical: true,
        }
    }

    fn text(lineage: &str, substance: &str, line: usize) -> Grain {
        grain(GrainKind::Text, lineage, substance, line)
    }

    fn ident(lineage: &str, substance: &str, line: usize) -> Grain {
        grain(GrainKind::Identity, lineage, substance, line)
    }

    #[test]
    fn test_unpack_pairs_with_following_identity() {
        let this = text("m", "# KNOWLEDGE: the lexicon", 1);
        let next = ident("m", "LEXICON", 2);
        let entry = unpack_text_entry(&this, Some(&next)).unwrap();
        assert_eq!(entry.occurrence, LexicalOccurrence::new("m", "LEXICON"));
        assert_eq!(entry.semantic, "KNOWLEDGE: the lexicon");
    }

    #[test]
    fn test_unpack_without_identity_has_empty_lexical() {
        let this = text("m", "'''THROUGHLINE: x'''", 1);
        let next = text("m", "# other", 2);
        let entry = unpack_text_entry(&this, Some(&next)).unwrap();
        assert_eq!(entry.occurrence.lexical, "");
        assert!(unpack_text_entry(&this, None).is_some());
    }

    #[test]
    fn test_unpack_drops_untagged_strings() {
        assert!(unpack_text_entry(&text("m", "'hello'", 1), None).is_none());
        assert!(unpack_text_entry(&ident("m", "x", 1), None).is_none());
    }

    #[test]
    fn test_unpack_drops_strings_posing_as_comments() {
        assert!(unpack_text_entry(&text("m", "'# PROSE: not really'", 1), None).is_none());
    }

    #[test]
    fn test_unpack_keeps_plain_comments() {
        let entry = unpack_text_entry(&text("m", "# just a note", 1), None).unwrap();
        assert!(entry.is_commentary());
        assert!(!entry.opens_prose());
    }

    #[test]
    fn test_opens_prose() {
        let entry = unpack_text_entry(&text("m", "#  prose: once", 1), None).unwrap();
        assert!(entry.opens_prose());
    }

    #[test]
    fn test_tagged_text_binds_to_next_identity() {
        let grains = vec![
            text("pkg.mod", "\"\"\"BEHAVIOUR:\n    strains the powder\n    \"\"\"", 3),
            ident("pkg.mod", "sieve", 6),
        ];
        let extraction = Lexicographer::extract(&grains);
        let key = LexicalOccurrence::new("pkg.mod", "sieve");
        let lexeme = extraction.lexemes.get(&key).unwrap();
        assert_eq!(lexeme.category, ExpoTag::Behaviour);
        assert_eq!(lexeme.content, "strains the powder");
        assert_eq!(lexeme.reference, Position::new(3, 0));
    }

    #[test]
    fn test_prose_extends_latest_lexeme() {
        let grains = vec![
            text("m", "# KNOWLEDGE: the lexicon", 1),
            ident("m", "LEXICON", 2),
            text("m", "# PROSE: Once upon a time", 4),
            text("m", "# a comment", 5),
            text("m", "# another", 6),
            text("m", "# SKILL: does stuff", 8),
            ident("m", "f", 9),
        ];
        let extraction = Lexicographer::extract(&grains);
        let lexicon = extraction
            .lexemes
            .get(&LexicalOccurrence::new("m", "LEXICON"))
            .unwrap();
        assert_eq!(
            lexicon.content,
            "the lexicon\n\nOnce upon a time\n\n- a comment\n- another"
        );
        let skill = extraction.lexemes.get(&LexicalOccurrence::new("m", "f")).unwrap();
        assert_eq!(skill.category, ExpoTag::Skill);
        assert_eq!(skill.content, "does stuff");
        assert_eq!(extraction.lexemes.len(), 2);
    }

    #[test]
    fn test_stray_comments_are_discarded() {
        let grains = vec![
            text("m", "# just a note", 1),
            text("m", "# KNOWLEDGE: x", 2),
            ident("m", "X", 3),
            text("m", "# another note", 4),
        ];
        let extraction = Lexicographer::extract(&grains);
        assert_eq!(extraction.lexemes.len(), 1);
        let x = extraction.lexemes.get(&LexicalOccurrence::new("m", "X")).unwrap();
        assert_eq!(x.content, "x");
    }

    #[test]
    fn test_leading_prose_becomes_its_own_lexeme() {
        let grains = vec![
            text("m", "# PROSE: In the beginning", 1),
            text("m", "# there was sludge", 2),
            ident("m", "sludge", 3),
        ];
        let extraction = Lexicographer::extract(&grains);
        let lexeme = extraction.lexemes.get(&LexicalOccurrence::new("m", "")).unwrap();
        assert_eq!(lexeme.category, ExpoTag::Prose);
        assert_eq!(lexeme.content, "In the beginning\nthere was sludge");
        assert!(extraction.diagnostics.is_empty());
    }

    #[test]
    fn test_prose_split_by_untagged_string_merges_into_one_block() {
        let grains = vec![
            text("m", "# PROSE: first", 1),
            text("m", "'just a string'", 2),
            text("m", "# PROSE: second", 3),
        ];
        let extraction = Lexicographer::extract(&grains);
        assert_eq!(extraction.lexemes.len(), 1);
        assert!(extraction.diagnostics.is_empty());
    }

    #[test]
    fn test_colliding_leading_prose_is_dropped_with_diagnostic() {
        let mut lexicographer = Lexicographer::default();
        lexicographer
            .lexemes
            .insert(Lexeme::new(ExpoTag::Flaw, LexicalOccurrence::new("m", ""), "x", Position::new(9, 0)));
        let entry = unpack_text_entry(&text("m", "# PROSE: late", 10), None).unwrap();
        lexicographer.package_prose(&[entry]);
        assert_eq!(
            lexicographer.diagnostics,
            vec![Diagnostic::ProseDropped {
                occurrence: LexicalOccurrence::new("m", ""),
                reference: Position::new(10, 0),
            }]
        );
        assert_eq!(lexicographer.lexemes.len(), 1);
    }

    #[test]
    fn test_rebinding_overwrites_in_place() {
        let grains = vec![
            text("m", "# KNOWLEDGE: first", 1),
            ident("m", "X", 2),
            text("m", "# SKILL: y", 3),
            ident("m", "Y", 4),
            text("m", "# FLAW: second", 5),
            ident("m", "X", 6),
        ];
        let extraction = Lexicographer::extract(&grains);
        let keys: Vec<String> = extraction.lexemes.iter().map(|l| l.canonical.to_string()).collect();
        assert_eq!(keys, vec!["m.X", "m.Y"]);
        let x = extraction.lexemes.get(&LexicalOccurrence::new("m", "X")).unwrap();
        assert_eq!(x.category, ExpoTag::Flaw);
        assert_eq!(x.content, "second");
    }

    #[test]
    fn test_empty_grains() {
        let extraction = Lexicographer::extract(&[]);
        assert!(extraction.lexemes.is_empty());
    }
}
