//! Non-judgemental cleaning of TEXT grains.
//!
//! Delimiters are only removed when both ends agree; a badly terminated
//! literal keeps its unverifiable side rather than being guessed at.

use super::ExpoTag;

pub const COMMENT_MARKER: char = '#';

const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

/// Whether the (already cleaned) text opens with an exposition tag.
pub fn is_expo(text: &str) -> bool {
    ExpoTag::leading(text).is_some()
}

/// Whether the text is a raw inline comment.
pub fn is_commentary(text: &str) -> bool {
    text.starts_with(COMMENT_MARKER)
}

/// Comment body without its marker and leading whitespace.
pub fn strip_comment_marker(text: &str) -> &str {
    text.trim_start_matches(COMMENT_MARKER).trim_start()
}

/// Strip comment markers and string delimiters from a TEXT substance.
///
/// - Tagged comments (other than PROSE) lose their marker.
/// - Other comments, PROSE included, come back untouched so prose blocks can
///   be assembled later.
/// - Strings lose matching triple or single quotes plus leading whitespace.
///   An unterminated literal only loses its opening delimiter.
pub fn clean(text: &str) -> &str {
    if is_commentary(text) {
        let semantic = strip_comment_marker(text);
        match ExpoTag::leading(semantic) {
            Some(ExpoTag::Prose) | None => return text,
            Some(_) => return semantic,
        }
    }

    if !text.starts_with(['"', '\'']) {
        return text;
    }

    if let Some(delimiter) = TRIPLE_QUOTES.iter().find(|d| text.starts_with(**d)) {
        return strip_delimiter(text, delimiter);
    }

    let delimiter = &text[..1];
    strip_delimiter(text, delimiter)
}

fn strip_delimiter<'a>(text: &'a str, delimiter: &str) -> &'a str {
    let width = delimiter.len();
    if !text.ends_with(delimiter) {
        return text[width..].trim_start();
    }
    if text.len() < 2 * width {
        return "";
    }
    text[width..text.len() - width].trim_start()
}

/// Remove the common margin of every line after the first.
///
/// The first line is expected to be dedented already. Whitespace-only lines
/// do not count towards the margin.
pub fn dedent(text: &str) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    if lines.len() < 2 {
        return text.to_string();
    }

    let margin = lines[1..]
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    let mut out = String::with_capacity(text.len());
    out.push_str(lines[0]);
    for line in &lines[1..] {
        let strip = margin.min(leading_whitespace(line));
        let offset = line
            .char_indices()
            .nth(strip)
            .map(|(i, _)| i)
            .unwrap_or(line.len());
        out.push_str(&line[offset..]);
    }
    out
}

/// Leading whitespace characters, not counting line terminators.
fn leading_whitespace(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace() && *c != '\n' && *c != '\r')
        .count()
}
