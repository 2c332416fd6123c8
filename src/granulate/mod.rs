//! Granulation: from a raw token stream to scope-qualified grains.
//!
//! The pipeline runs in four phases over one file's tokens:
//!
//! 1. `purify` - sieve out uninteresting kinds, desludge decorator arguments,
//!    drop every operator except member access.
//! 2. `mix` - swap comments past a directly following indent/dedent so that
//!    trailing block comments stay with the scope they describe.
//! 3. `evaporate` - run the scope automaton; dents and reserved words drop out
//!    and everything else gets a lineage.
//! 4. `refine` - fold dotted runs into single identities and emit grains.

mod refine;
mod sample;

pub use refine::{evaporate, grain_kind, is_distillant, refine};
pub use sample::{is_filtrate, is_suspension, mix, purify, sieved};

use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::lineage::Registrar;
use crate::token::{tokenize, Position, Token};

/// Errors that cross the granulation boundary.
#[derive(Error, Debug)]
pub enum GranulateError {
    /// The token source could not be read.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// What a grain is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrainKind {
    Text,
    Identity,
}

impl GrainKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GrainKind::Text => "TEXT",
            GrainKind::Identity => "IDENTITY",
        }
    }
}

impl fmt::Display for GrainKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A token with its lineage, ready for refinement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precursor {
    pub lineage: String,
    /// First occurrence within a new line of descent.
    pub new_line: bool,
    pub particle: Token,
}

/// A classified, scope-qualified unit of output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grain {
    /// Dotted scope path the grain was found in.
    pub lineage: String,
    pub kind: GrainKind,
    /// Literal text, or the joined dotted name for identities.
    pub substance: String,
    pub location: Position,
    pub is_canonical: bool,
}

impl fmt::Display for Grain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = if self.is_canonical { "*" } else { "" };
        write!(
            f,
            "<Grain {}@{}{}: {:?} from {}>",
            self.kind, marker, self.location, self.substance, self.lineage
        )
    }
}

/// Every stage of one granulation run.
#[derive(Debug, Clone, Default)]
pub struct Granulation {
    /// All tokens, as read.
    pub powder: Vec<Token>,
    pub purified: Vec<Token>,
    /// Indices into `purified` after mixing.
    pub mix: Vec<usize>,
    pub precursors: Vec<Precursor>,
    pub grains: Vec<Grain>,
}

/// Turns one file's tokens into grains.
pub struct Granulator {
    batch_id: String,
}

impl Granulator {
    /// Create a granulator whose outermost lineage is `batch_id`.
    pub fn new(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
        }
    }

    /// Create a granulator for `path`, named by its location under `root`.
    pub fn for_path(root: &Path, path: &Path) -> Self {
        Self::new(batch_id(root, path))
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// Granulate a token stream.
    ///
    /// Any error from the source aborts the run with `InvalidInput`; an empty
    /// stream is a normal, empty result.
    pub fn granulate<I, E>(self, tokens: I) -> Result<Granulation, GranulateError>
    where
        I: IntoIterator<Item = Result<Token, E>>,
        E: fmt::Display,
    {
        let powder = tokens
            .into_iter()
            .collect::<Result<Vec<Token>, E>>()
            .map_err(|e| GranulateError::InvalidInput(e.to_string()))?;

        if powder.is_empty() {
            return Ok(Granulation::default());
        }

        let purified = purify(&powder);
        let order = mix(&purified);
        let mut registrar = Registrar::new(self.batch_id);
        let precursors = evaporate(&order, &purified, &mut registrar);
        let grains = refine(&precursors);

        Ok(Granulation {
            powder,
            purified,
            mix: order,
            precursors,
            grains,
        })
    }

    /// Decode and tokenize raw source bytes, then granulate.
    pub fn granulate_source(self, source: &[u8]) -> Result<Granulation, GranulateError> {
        let text = std::str::from_utf8(source)
            .map_err(|e| GranulateError::InvalidInput(format!("source is not UTF-8: {}", e)))?;
        self.granulate(tokenize(text))
    }
}

/// Dotted identity of a file: its path under `root`, extension dropped,
/// separators turned into dots.
pub fn batch_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let stem = relative.with_extension("");
    stem.to_string_lossy()
        .replace(['/', '\\'], ".")
        .trim_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;
    use std::path::PathBuf;

    fn grains(source: &str) -> Vec<Grain> {
        Granulator::new("module")
            .granulate_source(source.as_bytes())
            .unwrap()
            .grains
    }

    #[test]
    fn test_batch_id() {
        let root = PathBuf::from("/src");
        assert_eq!(batch_id(&root, &PathBuf::from("/src/pkg/mod.py")), "pkg.mod");
        assert_eq!(batch_id(&root, &PathBuf::from("/src/top.py")), "top");
        assert_eq!(batch_id(Path::new("."), Path::new("./a/b.py")), "a.b");
    }

    #[test]
    fn test_empty_stream_is_not_an_error() {
        let empty: Vec<Result<Token, String>> = vec![];
        let result = Granulator::new("m").granulate(empty).unwrap();
        assert!(result.grains.is_empty());
    }

    #[test]
    fn test_failing_source_is_invalid_input() {
        let source: Vec<Result<Token, String>> = vec![Err("read failed".to_string())];
        let err = Granulator::new("m").granulate(source).unwrap_err();
        assert!(matches!(err, GranulateError::InvalidInput(ref msg) if msg == "read failed"));
    }

    #[test]
    fn test_non_utf8_source_is_invalid_input() {
        let err = Granulator::new("m")
            .granulate_source(&[0x66, 0xff, 0xfe])
            .unwrap_err();
        assert!(matches!(err, GranulateError::InvalidInput(_)));
    }

    #[test]
    fn test_attribute_access_grain() {
        let g = grains("self.powder = x\n");
        assert_eq!(g[0].substance, "self.powder");
        assert_eq!(g[0].kind, GrainKind::Identity);
        assert_eq!(g[1].substance, "x");
    }

    #[test]
    fn test_trailing_comment_rejoins_outer_scope() {
        let source = "class A:\n    x = 1\n    # about B\nclass B:\n    pass\n";
        let g = grains(source);
        let comment = g.iter().find(|g| g.substance == "# about B").unwrap();
        assert_eq!(comment.lineage, "module");
    }

    #[test]
    fn test_reserved_words_never_become_grains() {
        let g = grains("def f(x):\n    return None if x else True\n");
        assert!(g
            .iter()
            .all(|g| !["def", "return", "None", "if", "else", "True"].contains(&g.substance.as_str())));
    }

    #[test]
    fn test_stages_are_retained() {
        let result = Granulator::new("m").granulate_source(b"x.y\n").unwrap();
        assert_eq!(result.powder[0].kind, TokenKind::Encoding);
        assert_eq!(result.purified.len(), 3);
        assert_eq!(result.mix, vec![0, 1, 2]);
        assert_eq!(result.precursors.len(), 3);
        assert_eq!(result.grains.len(), 1);
    }
}
