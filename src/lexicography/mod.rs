//! Lexicography: turning TEXT grains into lexemes.
//!
//! Text is cleaned of its delimiters, checked for a leading exposition tag and
//! bound to the identity that follows it. See [`Lexicographer::extract`].

mod clean;
mod extract;
mod lexeme;
mod tags;

pub use clean::{clean, dedent, is_commentary, is_expo, strip_comment_marker, COMMENT_MARKER};
pub use extract::{unpack_text_entry, Diagnostic, Extraction, Lexicographer, TextEntry};
pub use lexeme::{LexicalOccurrence, Lexeme};
pub use tags::ExpoTag;
