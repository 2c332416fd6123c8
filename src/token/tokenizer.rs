//! Line-oriented Python tokenizer.
//!
//! Mirrors the behaviour of the standard library tokenizer closely enough for
//! scope tracking: INDENT/DEDENT are only decided on lines that carry code, so
//! comment-only and blank lines never move the indentation stack. A DEDENT
//! therefore lands immediately before the first de-indented line, after any
//! comments that trail the block.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::VecDeque;
use std::str::SplitInclusive;
use thiserror::Error;

use super::{Position, Token, TokenKind};

const TAB_SIZE: usize = 8;

lazy_static! {
    /// Numeric literals: hex, binary, octal, then decimal/float/imaginary.
    static ref NUMBER: Regex = Regex::new(
        r"^(?:0[xX](?:_?[0-9a-fA-F])+|0[bB](?:_?[01])+|0[oO](?:_?[0-7])+|(?:(?:[0-9](?:_?[0-9])*)?\.[0-9](?:_?[0-9])*|[0-9](?:_?[0-9])*\.?)(?:[eE][-+]?[0-9](?:_?[0-9])*)?[jJ]?)"
    ).unwrap();

    /// Identifiers (digits are consumed by NUMBER first).
    static ref NAME: Regex = Regex::new(r"^\w+").unwrap();

    /// Optional string prefix followed by the opening delimiter.
    static ref STRING_START: Regex =
        Regex::new(r#"^(?i:rb|br|fr|rf|r|b|u|f)?('''|"""|'|")"#).unwrap();

    /// Operators, longest first.
    static ref OPERATOR: Regex = Regex::new(
        r"^(?:\*\*=|//=|>>=|<<=|\.\.\.|->|:=|!=|%=|&=|\*\*|\*=|\+=|-=|//|/=|<<|<=|==|>=|>>|@=|\^=|\|=|[~%&()*+,\-./:;<=>@\[\]^{|}])"
    ).unwrap();
}

/// Errors raised while tokenizing source text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("EOF in multi-line string starting at line {line}")]
    UnterminatedString { line: usize },
    #[error("EOF in multi-line statement at line {line}")]
    UnterminatedStatement { line: usize },
    #[error("unindent does not match any outer indentation level (line {line})")]
    InconsistentDedent { line: usize },
}

/// A string literal that spans more than one physical line.
struct ContinuedString {
    start: Position,
    text: String,
    quote: String,
    triple: bool,
}

/// Lazy token stream over a source text.
pub struct Tokenizer<'a> {
    lines: SplitInclusive<'a, char>,
    lnum: usize,
    last_line: &'a str,
    pending: VecDeque<Token>,
    indents: Vec<usize>,
    parenlev: usize,
    continued: bool,
    contstr: Option<ContinuedString>,
    started: bool,
    finished: bool,
}

/// Tokenize Python source text.
///
/// The iterator yields `Err` at most once and then stops.
pub fn tokenize(source: &str) -> Tokenizer<'_> {
    Tokenizer {
        lines: source.split_inclusive('\n'),
        lnum: 0,
        last_line: "",
        pending: VecDeque::new(),
        indents: vec![0],
        parenlev: 0,
        continued: false,
        contstr: None,
        started: false,
        finished: false,
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Some(Ok(token));
            }
            if self.finished {
                return None;
            }
            if !self.started {
                self.started = true;
                return Some(Ok(Token::new(
                    TokenKind::Encoding,
                    "utf-8",
                    Position::new(0, 0),
                )));
            }

            let step = match self.lines.next() {
                Some(line) => {
                    self.lnum += 1;
                    self.last_line = line;
                    self.scan_line(line)
                }
                None => {
                    self.finished = true;
                    self.finish()
                }
            };

            if let Err(e) = step {
                self.finished = true;
                self.pending.clear();
                return Some(Err(e));
            }
        }
    }
}

impl<'a> Tokenizer<'a> {
    fn push(&mut self, kind: TokenKind, text: &str, start: Position) {
        self.pending.push_back(Token::new(kind, text, start));
    }

    fn position_at(&self, line: &str, pos: usize) -> Position {
        Position::new(self.lnum, line[..pos].chars().count())
    }

    fn scan_line(&mut self, line: &'a str) -> Result<(), TokenizeError> {
        let bytes = line.as_bytes();
        let max = line.len();
        let mut pos = 0;

        if let Some(mut contstr) = self.contstr.take() {
            match find_string_end(line, 0, &contstr.quote, contstr.triple) {
                Some(end) => {
                    contstr.text.push_str(&line[..end]);
                    self.pending
                        .push_back(Token::new(TokenKind::String, contstr.text, contstr.start));
                    pos = end;
                }
                None if !contstr.triple && !ends_with_line_continuation(line) => {
                    contstr.text.push_str(line);
                    self.pending.push_back(Token::new(
                        TokenKind::ErrorToken,
                        contstr.text,
                        contstr.start,
                    ));
                    return Ok(());
                }
                None => {
                    contstr.text.push_str(line);
                    self.contstr = Some(contstr);
                    return Ok(());
                }
            }
        } else if self.parenlev == 0 && !self.continued {
            // Start of a logical line: measure indentation.
            let mut column = 0;
            while pos < max {
                match bytes[pos] {
                    b' ' => column += 1,
                    b'\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
                    0x0c => column = 0,
                    _ => break,
                }
                pos += 1;
            }
            if pos == max {
                return Ok(());
            }

            if matches!(bytes[pos], b'#' | b'\r' | b'\n') {
                if bytes[pos] == b'#' {
                    let comment = line[pos..].trim_end_matches(['\r', '\n']);
                    let start = self.position_at(line, pos);
                    self.push(TokenKind::Comment, comment, start);
                    pos += comment.len();
                }
                let start = self.position_at(line, pos);
                self.push(TokenKind::Nl, &line[pos..], start);
                return Ok(());
            }

            let current = self.indents.last().copied().unwrap_or(0);
            if column > current {
                self.indents.push(column);
                self.push(TokenKind::Indent, &line[..pos], Position::new(self.lnum, 0));
            }
            while column < self.indents.last().copied().unwrap_or(0) {
                if !self.indents.contains(&column) {
                    return Err(TokenizeError::InconsistentDedent { line: self.lnum });
                }
                self.indents.pop();
                let start = self.position_at(line, pos);
                self.push(TokenKind::Dedent, "", start);
            }
        } else {
            self.continued = false;
        }

        while pos < max {
            while pos < max && matches!(bytes[pos], b' ' | b'\t' | 0x0c) {
                pos += 1;
            }
            if pos >= max {
                break;
            }

            let rest = &line[pos..];
            let start = self.position_at(line, pos);
            let first = bytes[pos];

            if first == b'\r' || first == b'\n' {
                let kind = if self.parenlev > 0 {
                    TokenKind::Nl
                } else {
                    TokenKind::Newline
                };
                self.push(kind, rest, start);
                break;
            }

            if first == b'#' {
                let comment = rest.trim_end_matches(['\r', '\n']);
                self.push(TokenKind::Comment, comment, start);
                pos += comment.len();
                continue;
            }

            if first == b'\\' && (rest[1..].starts_with('\n') || rest[1..].starts_with("\r\n")) {
                self.continued = true;
                break;
            }

            let starts_number = first.is_ascii_digit()
                || (first == b'.' && bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit()));
            if starts_number {
                if let Some(m) = NUMBER.find(rest) {
                    self.push(TokenKind::Number, m.as_str(), start);
                    pos += m.end();
                    continue;
                }
            }

            if let Some(caps) = STRING_START.captures(rest) {
                let opening = caps.get(0).map(|m| m.end()).unwrap_or(0);
                let quote = caps.get(1).map(|m| m.as_str()).unwrap_or("\"");
                let triple = quote.len() == 3;

                match find_string_end(line, pos + opening, quote, triple) {
                    Some(end) => {
                        self.push(TokenKind::String, &line[pos..end], start);
                        pos = end;
                    }
                    None if triple || ends_with_line_continuation(line) => {
                        self.contstr = Some(ContinuedString {
                            start,
                            text: rest.to_string(),
                            quote: quote.to_string(),
                            triple,
                        });
                        return Ok(());
                    }
                    None => {
                        self.push(TokenKind::ErrorToken, &rest[..opening], start);
                        pos += opening;
                    }
                }
                continue;
            }

            if let Some(m) = NAME.find(rest) {
                self.push(TokenKind::Name, m.as_str(), start);
                pos += m.end();
                continue;
            }

            if let Some(m) = OPERATOR.find(rest) {
                match m.as_str() {
                    "(" | "[" | "{" => self.parenlev += 1,
                    ")" | "]" | "}" => self.parenlev = self.parenlev.saturating_sub(1),
                    _ => {}
                }
                self.push(TokenKind::Op, m.as_str(), start);
                pos += m.end();
                continue;
            }

            let width = rest.chars().next().map(char::len_utf8).unwrap_or(1);
            self.push(TokenKind::ErrorToken, &rest[..width], start);
            pos += width;
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<(), TokenizeError> {
        if let Some(contstr) = &self.contstr {
            return Err(TokenizeError::UnterminatedString {
                line: contstr.start.line,
            });
        }
        if self.parenlev > 0 || self.continued {
            return Err(TokenizeError::UnterminatedStatement { line: self.lnum });
        }

        let last = self.last_line;
        if !last.is_empty()
            && !last.ends_with(['\r', '\n'])
            && !last.trim().starts_with('#')
        {
            let start = self.position_at(last, last.len());
            self.push(TokenKind::Newline, "", start);
        }

        let closing = Position::new(self.lnum + 1, 0);
        for _ in 1..self.indents.len() {
            self.push(TokenKind::Dedent, "", closing);
        }
        self.indents.truncate(1);
        self.push(TokenKind::EndMarker, "", closing);
        Ok(())
    }
}

/// Byte offset just past the closing delimiter, honouring backslash escapes.
fn find_string_end(line: &str, from: usize, quote: &str, triple: bool) -> Option<usize> {
    let bytes = line.as_bytes();
    let quote = quote.as_bytes();
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' if !triple => return None,
            _ if bytes[i..].starts_with(quote) => return Some(i + quote.len()),
            _ => i += 1,
        }
    }
    None
}

fn ends_with_line_continuation(line: &str) -> bool {
    line.ends_with("\\\n") || line.ends_with("\\\r\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        tokenize(source)
            .map(|t| t.unwrap())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    fn kind_names(source: &str) -> Vec<&'static str> {
        tokenize(source)
            .map(|t| t.unwrap().kind.as_str())
            .collect()
    }

    #[test]
    fn test_simple_function() {
        let names = kind_names("def f(x):\n    return x\n");
        assert_eq!(
            names,
            vec![
                "ENCODING", "NAME", "NAME", "OP", "NAME", "OP", "OP", "NEWLINE", "INDENT", "NAME",
                "NAME", "NEWLINE", "DEDENT", "ENDMARKER"
            ]
        );
    }

    #[test]
    fn test_trailing_comment_precedes_dedent() {
        let source = "def f():\n    x = 1\n    # trailing\ny = 2\n";
        let tokens: Vec<Token> = tokenize(source).map(|t| t.unwrap()).collect();
        let comment = tokens
            .iter()
            .position(|t| t.kind == TokenKind::Comment)
            .unwrap();
        let dedent = tokens
            .iter()
            .position(|t| t.kind == TokenKind::Dedent)
            .unwrap();
        assert!(comment < dedent, "comment should arrive before the dedent");
        assert_eq!(tokens[comment].text, "# trailing");
        assert_eq!(tokens[comment].start, Position::new(3, 4));
        assert_eq!(tokens[dedent].start, Position::new(4, 0));
    }

    #[test]
    fn test_multiline_triple_string() {
        let source = "x = \"\"\"KNOWLEDGE: one\n    two\n\"\"\"\n";
        let strings: Vec<Token> = tokenize(source)
            .map(|t| t.unwrap())
            .filter(|t| t.kind == TokenKind::String)
            .collect();
        assert_eq!(strings.len(), 1);
        assert_eq!(strings[0].text, "\"\"\"KNOWLEDGE: one\n    two\n\"\"\"");
        assert_eq!(strings[0].start, Position::new(1, 4));
    }

    #[test]
    fn test_prefixed_and_escaped_strings() {
        let tokens = kinds("a = r'x\\'y' + b\"z\"\n");
        assert!(tokens.contains(&(TokenKind::String, "r'x\\'y'".to_string())));
        assert!(tokens.contains(&(TokenKind::String, "b\"z\"".to_string())));
    }

    #[test]
    fn test_operators_and_numbers() {
        let tokens = kinds("x **= 0x1F + 1.5e3j // .5\n");
        assert!(tokens.contains(&(TokenKind::Op, "**=".to_string())));
        assert!(tokens.contains(&(TokenKind::Number, "0x1F".to_string())));
        assert!(tokens.contains(&(TokenKind::Number, "1.5e3j".to_string())));
        assert!(tokens.contains(&(TokenKind::Op, "//".to_string())));
        assert!(tokens.contains(&(TokenKind::Number, ".5".to_string())));
    }

    #[test]
    fn test_brackets_suppress_newline() {
        let names = kind_names("f(a,\n  b)\n");
        assert_eq!(
            names,
            vec!["ENCODING", "NAME", "OP", "NAME", "OP", "NL", "NAME", "OP", "NEWLINE", "ENDMARKER"]
        );
    }

    #[test]
    fn test_missing_final_newline() {
        let tokens = kinds("class A:\n    pass");
        let tail: Vec<TokenKind> = tokens.iter().rev().take(3).map(|t| t.0).collect();
        assert_eq!(
            tail,
            vec![TokenKind::EndMarker, TokenKind::Dedent, TokenKind::Newline]
        );
    }

    #[test]
    fn test_unterminated_triple_string_errors() {
        let results: Vec<_> = tokenize("x = '''never closed\n").collect();
        let last = results.last().unwrap();
        assert_eq!(
            last,
            &Err(TokenizeError::UnterminatedString { line: 1 })
        );
    }

    #[test]
    fn test_inconsistent_dedent_errors() {
        let source = "if x:\n        y\n    z\n";
        let err = tokenize(source).find_map(|t| t.err()).unwrap();
        assert_eq!(err, TokenizeError::InconsistentDedent { line: 3 });
    }

    #[test]
    fn test_unclosed_bracket_errors() {
        let err = tokenize("f(a,\n").find_map(|t| t.err()).unwrap();
        assert_eq!(err, TokenizeError::UnterminatedStatement { line: 1 });
    }
}
