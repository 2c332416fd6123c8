//! Ordered lexeme storage and the identity etymology index.

use std::collections::HashMap;

use crate::granulate::{Grain, GrainKind};
use crate::lexicography::{LexicalOccurrence, Lexeme};
use crate::token::Position;

/// Lexemes keyed by their canonical occurrence, in first-insertion order.
///
/// Re-inserting a key replaces the lexeme but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LexemeStore {
    entries: Vec<Lexeme>,
    index: HashMap<LexicalOccurrence, usize>,
}

impl LexemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the lexeme that was replaced.
    pub fn insert(&mut self, lexeme: Lexeme) -> Option<Lexeme> {
        match self.index.get(&lexeme.canonical) {
            Some(&slot) => Some(std::mem::replace(&mut self.entries[slot], lexeme)),
            None => {
                self.index.insert(lexeme.canonical.clone(), self.entries.len());
                self.entries.push(lexeme);
                None
            }
        }
    }

    pub fn get(&self, key: &LexicalOccurrence) -> Option<&Lexeme> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    pub fn get_mut(&mut self, key: &LexicalOccurrence) -> Option<&mut Lexeme> {
        self.index.get(key).map(|&slot| &mut self.entries[slot])
    }

    pub fn contains(&self, key: &LexicalOccurrence) -> bool {
        self.index.contains_key(key)
    }

    /// Look up by the dotted display form of the key.
    pub fn find(&self, canonical: &str) -> Option<&Lexeme> {
        self.entries
            .iter()
            .find(|lexeme| lexeme.canonical.to_string() == canonical)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lexeme> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold `other` in; its lexemes win on key collisions.
    pub fn merge(&mut self, other: LexemeStore) {
        for lexeme in other.entries {
            self.insert(lexeme);
        }
    }
}

impl<'a> IntoIterator for &'a LexemeStore {
    type Item = &'a Lexeme;
    type IntoIter = std::slice::Iter<'a, Lexeme>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Lexeme> for LexemeStore {
    fn from_iter<T: IntoIterator<Item = Lexeme>>(iter: T) -> Self {
        let mut store = Self::new();
        for lexeme in iter {
            store.insert(lexeme);
        }
        store
    }
}

/// Every place one identity was referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Etymology {
    pub occurrence: LexicalOccurrence,
    pub references: Vec<Position>,
    /// Index into `references` of the canonical attestation.
    pub canonical_index: usize,
}

impl Etymology {
    pub fn canonical_reference(&self) -> Option<Position> {
        self.references.get(self.canonical_index).copied()
    }
}

/// Identity grains grouped by occurrence, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct EtymologyIndex {
    entries: Vec<Etymology>,
    index: HashMap<LexicalOccurrence, usize>,
}

impl EtymologyIndex {
    /// Index every identity grain. The canonical reference is the last one
    /// flagged canonical, falling back to the first seen.
    pub fn from_grains(grains: &[Grain]) -> Self {
        let mut etymologies = Self::default();

        for grain in grains.iter().filter(|g| g.kind == GrainKind::Identity) {
            let key = LexicalOccurrence::new(grain.lineage.clone(), grain.substance.clone());
            let slot = match etymologies.index.get(&key) {
                Some(&slot) => slot,
                None => {
                    etymologies.index.insert(key.clone(), etymologies.entries.len());
                    etymologies.entries.push(Etymology {
                        occurrence: key,
                        references: Vec::new(),
                        canonical_index: 0,
                    });
                    etymologies.entries.len() - 1
                }
            };

            let etymology = &mut etymologies.entries[slot];
            etymology.references.push(grain.location);
            if grain.is_canonical {
                etymology.canonical_index = etymology.references.len() - 1;
            }
        }

        etymologies
    }

    pub fn get(&self, key: &LexicalOccurrence) -> Option<&Etymology> {
        self.index.get(key).map(|&slot| &self.entries[slot])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Etymology> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
