//! Purification and mixing: the token-level clean-up before lineage tracking.

use crate::codex::{Entity, Lexicon, Rule};
use crate::token::{Token, TokenKind};

/// Token kinds that make it through the sieve.
const SIEVE: Entity = Entity::new(&[
    Rule::kind(TokenKind::Name),
    Rule::kind(TokenKind::Op),
    Rule::kind(TokenKind::Comment),
    Rule::kind(TokenKind::String),
    Rule::kind(TokenKind::Indent),
    Rule::kind(TokenKind::Dedent),
]);

/// Start of decorator noise.
const SLUDGE: Entity = Entity::new(&[Rule::valued(TokenKind::Op, Lexicon::Decorator)]);

/// End of decorator noise: the decorated `class`/`def`.
const DESLUDGE: Entity = Entity::new(&[Rule::valued(TokenKind::Name, Lexicon::Encapsulators)]);

/// Kinds that have a fine-scale filter...
const FILTERED: Entity = Entity::new(&[Rule::kind(TokenKind::Op)]);

/// ...and the filter itself.
const FILTER: Entity = Entity::new(&[Rule::valued(TokenKind::Op, Lexicon::Accessor)]);

/// Tokens that may sit in suspension before a dent.
const SUSPENSIONS: Entity = Entity::new(&[Rule::kind(TokenKind::Comment)]);

const BUBBLE_UP: Entity = Entity::new(&[Rule::kind(TokenKind::Dedent), Rule::kind(TokenKind::Indent)]);

pub fn sieved(token: &Token) -> bool {
    SIEVE.is_entity(token)
}

pub fn has_sludged(token: &Token) -> bool {
    SLUDGE.is_entity(token)
}

pub fn has_desludged(token: &Token) -> bool {
    DESLUDGE.is_entity(token)
}

/// Passes if the fine-scale filter for the token's kind accepts it, or if
/// there is no filter for that kind at all.
pub fn is_filtrate(token: &Token) -> bool {
    if FILTER.is_entity(token) {
        return true;
    }
    !FILTERED.is_entity(token)
}

/// A comment immediately followed by an indent or dedent.
pub fn is_suspension(token: &Token, next: &Token) -> bool {
    SUSPENSIONS.is_entity(token) && BUBBLE_UP.is_entity(next)
}

/// Drop uninteresting tokens and decorator noise.
///
/// Everything from a decorator marker up to (not including) the next
/// `class`/`def` is discarded; the opener is then judged like any other token.
pub fn purify(powder: &[Token]) -> Vec<Token> {
    let mut purified = Vec::new();
    let mut sludge = false;

    for particle in powder {
        if sludge {
            sludge = !has_desludged(particle);
        }
        if sludge {
            continue;
        }

        sludge = has_sludged(particle);
        if sludge {
            continue;
        }

        if sieved(particle) && is_filtrate(particle) {
            purified.push(particle.clone());
        }
    }

    purified
}

/// Break up comment/dent suspensions.
///
/// Returns an ordering of indices into `hopper`. A single left-to-right pass
/// swaps each adjacent (comment, dent) pair it meets; a comment swapped
/// forward is compared again at the next position, so it can travel past a
/// run of dents, but earlier comments are never revisited.
pub fn mix(hopper: &[Token]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..hopper.len()).collect();
    for i in 0..order.len().saturating_sub(1) {
        if is_suspension(&hopper[order[i]], &hopper[order[i + 1]]) {
            order.swap(i, i + 1);
        }
    }
    order
}
