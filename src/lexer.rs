//! Lexer: source text to a flat token list with source locations.
//!
//! Recognition order at each position (first match wins): whitespace,
//! comment, type keyword, bool literal, int literal, identifier, operator,
//! punctuation. Type keywords and bool literals are recognized before the
//! general identifier rule so `Int`, `Bool`, `true`, `false` never become
//! plain identifiers.

use crate::errors::LexError;
use crate::location::Location;
use crate::token::{Token, TokenKind};

const TYPE_KEYWORDS: &[&str] = &["Int", "Bool"];
const BOOL_LITERALS: &[&str] = &["true", "false"];
const TWO_CHAR_OPERATORS: &[&str] = &["==", "!=", "<=", ">="];
const ONE_CHAR_OPERATORS: &[char] = &['=', '<', '>', '+', '-', '*', '/', '%'];
const PUNCTUATION: &[char] = &['(', ')', '{', '}', ',', ';', ':'];

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let rest = &source[i..];
        let ch = rest.chars().next().unwrap();

        if ch.is_whitespace() {
            i += ch.len_utf8();
            continue;
        }

        if let Some(len) = match_comment(rest) {
            let text = &source[i..i + len];
            tokens.push(Token::new(
                TokenKind::Comment,
                text,
                Location::from_offset(source, i),
            ));
            i += len;
            continue;
        }

        if let Some(len) = match_prefix_word(rest, TYPE_KEYWORDS) {
            let text = &source[i..i + len];
            tokens.push(Token::new(
                TokenKind::Type,
                text,
                Location::from_offset(source, i),
            ));
            i += len;
            continue;
        }

        if let Some(len) = match_prefix_word(rest, BOOL_LITERALS) {
            let text = &source[i..i + len];
            tokens.push(Token::new(
                TokenKind::BoolLiteral,
                text,
                Location::from_offset(source, i),
            ));
            i += len;
            continue;
        }

        if ch.is_ascii_digit() {
            let len = rest.chars().take_while(|c| c.is_ascii_digit()).count();
            let text = &source[i..i + len];
            tokens.push(Token::new(
                TokenKind::IntLiteral,
                text,
                Location::from_offset(source, i),
            ));
            i += len;
            continue;
        }

        if ch.is_ascii_alphabetic() || ch == '_' {
            let len = rest
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
                .count();
            let text = &source[i..i + len];
            tokens.push(Token::new(
                TokenKind::Identifier,
                text,
                Location::from_offset(source, i),
            ));
            i += len;
            continue;
        }

        if let Some(op) = TWO_CHAR_OPERATORS.iter().find(|op| rest.starts_with(*op)) {
            tokens.push(Token::new(
                TokenKind::Operator,
                *op,
                Location::from_offset(source, i),
            ));
            i += op.len();
            continue;
        }

        if ONE_CHAR_OPERATORS.contains(&ch) {
            tokens.push(Token::new(
                TokenKind::Operator,
                ch.to_string(),
                Location::from_offset(source, i),
            ));
            i += ch.len_utf8();
            continue;
        }

        if PUNCTUATION.contains(&ch) {
            tokens.push(Token::new(
                TokenKind::Punctuation,
                ch.to_string(),
                Location::from_offset(source, i),
            ));
            i += ch.len_utf8();
            continue;
        }

        return Err(LexError::UnrecognizedByte {
            byte: bytes[i],
            location: Location::from_offset(source, i),
        });
    }

    Ok(tokens)
}

/// Match one of `words` at the start of `rest`, requiring the next byte
/// (if any) to not continue an identifier — otherwise `Integer` would
/// match the `Int` prefix, and `truest` would match `true`.
fn match_prefix_word(rest: &str, words: &[&str]) -> Option<usize> {
    for word in words {
        if let Some(tail) = rest.strip_prefix(word) {
            let continues = tail
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_');
            if !continues {
                return Some(word.len());
            }
        }
    }
    None
}

/// Match a comment at the start of `rest`: `# ... EOL`, `// ... EOL`, or a
/// non-greedy `/* ... */` that may span multiple lines.
fn match_comment(rest: &str) -> Option<usize> {
    if let Some(stripped) = rest.strip_prefix('#') {
        let len = stripped.find('\n').unwrap_or(stripped.len());
        return Some(1 + len);
    }
    if let Some(stripped) = rest.strip_prefix("//") {
        let len = stripped.find('\n').unwrap_or(stripped.len());
        return Some(2 + len);
    }
    if let Some(stripped) = rest.strip_prefix("/*") {
        return stripped.find("*/").map(|idx| 2 + idx + 2);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        tokenize(source).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn recognizes_each_kind() {
        assert_eq!(kinds("Int"), vec![TokenKind::Type]);
        assert_eq!(kinds("Bool"), vec![TokenKind::Type]);
        assert_eq!(kinds("true"), vec![TokenKind::BoolLiteral]);
        assert_eq!(kinds("false"), vec![TokenKind::BoolLiteral]);
        assert_eq!(kinds("42"), vec![TokenKind::IntLiteral]);
        assert_eq!(kinds("abc_1"), vec![TokenKind::Identifier]);
        assert_eq!(kinds("=="), vec![TokenKind::Operator]);
        assert_eq!(kinds("("), vec![TokenKind::Punctuation]);
    }

    #[test]
    fn type_keyword_wins_over_identifier_prefix() {
        assert_eq!(kinds("Int"), vec![TokenKind::Type]);
        // but an identifier that merely starts with "Int" is still an identifier
        assert_eq!(kinds("Integer"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn bool_literal_wins_over_identifier_prefix() {
        assert_eq!(kinds("true"), vec![TokenKind::BoolLiteral]);
        assert_eq!(kinds("truest"), vec![TokenKind::Identifier]);
    }

    #[test]
    fn two_char_operators_tried_before_one_char() {
        assert_eq!(texts("<="), vec!["<="]);
        assert_eq!(texts("<"), vec!["<"]);
        assert_eq!(texts("!="), vec!["!="]);
    }

    #[test]
    fn whitespace_is_discarded() {
        assert_eq!(texts("  1   +  2 "), vec!["1", "+", "2"]);
    }

    #[test]
    fn hash_and_slash_comments_run_to_end_of_line() {
        let tokens = tokenize("1 # comment\n+ 2 // another\n").unwrap();
        assert_eq!(tokens.len(), 4); // 1, comment, +, 2, comment -> but comments included
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert!(texts.contains(&"# comment"));
        assert!(texts.contains(&"// another"));
    }

    #[test]
    fn block_comment_can_span_multiple_lines() {
        let tokens = tokenize("1 /* multi\nline */ + 2").unwrap();
        let comment = tokens.iter().find(|t| t.kind == TokenKind::Comment).unwrap();
        assert_eq!(comment.text, "/* multi\nline */");
    }

    #[test]
    fn locations_match_source_substring() {
        let source = "var\n  a = 1;";
        let tokens = tokenize(source).unwrap();
        for tok in &tokens {
            let Location { line, column } = tok.location.clone();
            let line_text = source.lines().nth(line - 1).unwrap();
            let start = column - 1;
            assert!(line_text[start..].starts_with(tok.text.as_str()));
        }
    }

    #[test]
    fn unrecognized_byte_is_fatal() {
        assert!(tokenize("1 @ 2").is_err());
    }
}
