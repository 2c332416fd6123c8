//! Evaporation (lineage assignment) and refinement (distillation into grains).

use std::collections::HashSet;

use crate::codex::{Entity, Lexicon, Rule};
use crate::lineage::Registrar;
use crate::token::{Token, TokenKind};

use super::{Grain, GrainKind, Precursor};

/// Member access folds neighbouring identities together.
const DISTILLANT: Entity = Entity::new(&[Rule::valued(TokenKind::Op, Lexicon::Accessor)]);

const IDENTITY_GRAINS: Entity = Entity::new(&[Rule::kind(TokenKind::Name)]);

const TEXT_GRAINS: Entity = Entity::new(&[Rule::kind(TokenKind::Comment), Rule::kind(TokenKind::String)]);

pub fn is_distillant(token: &Token) -> bool {
    DISTILLANT.is_entity(token)
}

/// Grain kind a token would refine into, if any.
pub fn grain_kind(token: &Token) -> Option<GrainKind> {
    if TEXT_GRAINS.is_entity(token) {
        return Some(GrainKind::Text);
    }
    if IDENTITY_GRAINS.is_entity(token) {
        return Some(GrainKind::Identity);
    }
    None
}

/// Run the mixed tokens through the registrar.
///
/// Tokens without a lineage (dents, honourifics) evaporate. The first
/// precursor seen for each lineage is always flagged as starting a new line,
/// whatever the registrar reported.
pub fn evaporate(order: &[usize], hopper: &[Token], registrar: &mut Registrar) -> Vec<Precursor> {
    let mut classifications: HashSet<String> = HashSet::new();
    let mut intermediate = Vec::new();

    for &index in order {
        let particle = &hopper[index];
        let record = registrar.record_history(particle);
        let Some(lineage) = record.lineage else {
            continue;
        };

        // Recorded even when the registrar already flagged this token, so a
        // lineage first seen at an heir is not flagged again afterwards.
        let first_sight = classifications.insert(lineage.clone());
        intermediate.push(Precursor {
            lineage,
            new_line: record.new_family_line || first_sight,
            particle: particle.clone(),
        });
    }

    intermediate
}

/// Distil precursors into grains.
///
/// An accessor and the token after it are appended to the previous grain, so
/// `a`, `.`, `b`, `.`, `c` becomes the single identity `a.b.c`.
pub fn refine(hopper: &[Precursor]) -> Vec<Grain> {
    let mut grains: Vec<Grain> = Vec::new();
    let mut distil = false;

    for precursor in hopper {
        let particle = &precursor.particle;

        if !distil {
            distil = is_distillant(particle);
        }

        if distil {
            if let Some(last) = grains.last_mut() {
                last.substance.push_str(&particle.text);
            }
            distil = is_distillant(particle);
            continue;
        }

        let Some(kind) = grain_kind(particle) else {
            continue;
        };

        grains.push(Grain {
            lineage: precursor.lineage.clone(),
            kind,
            substance: particle.text.clone(),
            location: particle.start,
            is_canonical: precursor.new_line,
        });
    }

    grains
}
