//! Builds tokens from resolved lexemes.
//!
//! The scan routines decide *what shape* a lexeme has and hand the shape,
//! the lexeme text and its span to [`build`], which decodes payloads. One
//! `match`, no fallible paths: every shape the lexer resolves has a token.

use tabql_ast::{IntegerSuffix, TextSpan};

use crate::keywords::{lookup_keyword, lookup_phrase, lookup_schema_keyword};
use crate::token::{KeyAccessKey, Token, TokenKind};

/// Shape of a scanned lexeme, resolved by the lexer before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexemeKind {
    WhiteSpace,
    Comment,
    /// Plain word in query mode: keyword or identifier.
    Word,
    /// Plain word in schema mode: schema keyword or identifier.
    SchemaWord,
    Property,
    Function,
    MethodAccess,
    AliasedStar,
    ArrayIndex,
    KeyAccess,
    QuotedIdentifier,
    Schema,
    FieldLink,
    Phrase,
    Integer,
    Decimal,
    Hexadecimal,
    Binary,
    Octal,
    String,
    Symbol,
    Error,
}

/// Decode `lexeme` of shape `kind` into a token spanning `span`.
#[must_use]
pub fn build(kind: LexemeKind, lexeme: &str, span: TextSpan) -> Token {
    let kind = match kind {
        LexemeKind::WhiteSpace => TokenKind::WhiteSpace,
        LexemeKind::Comment => TokenKind::Comment,
        LexemeKind::Word => {
            lookup_keyword(lexeme).unwrap_or_else(|| TokenKind::Identifier(lexeme.to_owned()))
        }
        LexemeKind::SchemaWord => lookup_schema_keyword(lexeme).map_or_else(
            || TokenKind::Identifier(lexeme.to_owned()),
            TokenKind::SchemaKeyword,
        ),
        LexemeKind::Property => TokenKind::Property(lexeme.to_owned()),
        LexemeKind::Function => TokenKind::Function(lexeme.to_owned()),
        LexemeKind::MethodAccess => match lexeme.split_once('.') {
            Some((alias, method)) => TokenKind::MethodAccess {
                alias: alias.to_owned(),
                method: method.to_owned(),
            },
            None => TokenKind::Function(lexeme.to_owned()),
        },
        LexemeKind::AliasedStar => {
            TokenKind::AliasedStar(lexeme.strip_suffix(".*").unwrap_or(lexeme).to_owned())
        }
        LexemeKind::ArrayIndex => {
            let (name, inner) = split_bracketed(lexeme);
            TokenKind::ArrayIndex {
                name: name.to_owned(),
                index: inner.parse().unwrap_or_default(),
            }
        }
        LexemeKind::KeyAccess => {
            let (name, inner) = split_bracketed(lexeme);
            let key = if is_single_string(inner) {
                KeyAccessKey::Literal(unescape(&inner[1..inner.len() - 1]))
            } else {
                KeyAccessKey::Expression(TextSpan::new(span.start + name.len() + 1, inner.len()))
            };
            TokenKind::KeyAccess {
                name: name.to_owned(),
                key,
            }
        }
        LexemeKind::QuotedIdentifier => TokenKind::QuotedIdentifier(
            lexeme
                .strip_prefix('[')
                .and_then(|s| s.strip_suffix(']'))
                .unwrap_or(lexeme)
                .to_owned(),
        ),
        LexemeKind::Schema => TokenKind::Schema(lexeme.to_owned()),
        LexemeKind::FieldLink => {
            TokenKind::FieldLink(lexeme.get(2..).unwrap_or("").parse().unwrap_or_default())
        }
        LexemeKind::Phrase => {
            let normalized = lexeme
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_ascii_lowercase();
            lookup_phrase(&normalized).unwrap_or_else(|| TokenKind::Identifier(lexeme.to_owned()))
        }
        LexemeKind::Integer => {
            let body = lexeme.strip_prefix('-').unwrap_or(lexeme);
            let digits_end = body
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(body.len());
            let sign = lexeme.len() - body.len();
            TokenKind::Integer {
                digits: lexeme[..sign + digits_end].to_owned(),
                suffix: IntegerSuffix::from_suffix(&body[digits_end..]),
            }
        }
        LexemeKind::Decimal => TokenKind::Decimal(
            lexeme
                .strip_suffix(['d', 'D'])
                .unwrap_or(lexeme)
                .to_owned(),
        ),
        LexemeKind::Hexadecimal => TokenKind::Hexadecimal(radix_digits(lexeme)),
        LexemeKind::Binary => TokenKind::Binary(radix_digits(lexeme)),
        LexemeKind::Octal => TokenKind::Octal(radix_digits(lexeme)),
        LexemeKind::String => {
            let inner = lexeme
                .strip_prefix('\'')
                .and_then(|s| s.strip_suffix('\''))
                .unwrap_or(lexeme);
            TokenKind::StringLiteral(unescape(inner))
        }
        LexemeKind::Symbol => symbol(lexeme),
        LexemeKind::Error => TokenKind::Error(lexeme.to_owned()),
    };
    Token::new(kind, span)
}

fn symbol(lexeme: &str) -> TokenKind {
    match lexeme {
        "+" => TokenKind::Plus,
        "-" => TokenKind::Minus,
        "*" => TokenKind::Star,
        "/" => TokenKind::Slash,
        "%" => TokenKind::Percent,
        "&" => TokenKind::Ampersand,
        "|" => TokenKind::Pipe,
        "^" => TokenKind::Caret,
        "<<" => TokenKind::ShiftLeft,
        ">>" => TokenKind::ShiftRight,
        "=" => TokenKind::Equality,
        "<>" | "!=" => TokenKind::Diff,
        ">" => TokenKind::Greater,
        ">=" => TokenKind::GreaterEqual,
        "<" => TokenKind::Less,
        "<=" => TokenKind::LessEqual,
        "=>" => TokenKind::FatArrow,
        "." => TokenKind::Dot,
        "::" => TokenKind::DoubleColon,
        ":" => TokenKind::Colon,
        "," => TokenKind::Comma,
        ";" => TokenKind::Semicolon,
        "(" => TokenKind::LeftParen,
        ")" => TokenKind::RightParen,
        "[" => TokenKind::LeftSquare,
        "]" => TokenKind::RightSquare,
        "{" => TokenKind::LeftCurly,
        "}" => TokenKind::RightCurly,
        other => TokenKind::Error(other.to_owned()),
    }
}

/// `name[inner]` → (`name`, `inner`).
fn split_bracketed(lexeme: &str) -> (&str, &str) {
    match lexeme.split_once('[') {
        Some((name, rest)) => (name, rest.strip_suffix(']').unwrap_or(rest)),
        None => (lexeme, ""),
    }
}

/// Whether `inner` is exactly one quoted string, e.g. `'a'` but not
/// `'a' + 'b'`.
fn is_single_string(inner: &str) -> bool {
    let Some(body) = inner.strip_prefix('\'') else {
        return false;
    };
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '\'' => return i + 1 == body.len(),
            _ => {}
        }
    }
    false
}

/// Digits after a two-character radix prefix.
fn radix_digits(lexeme: &str) -> String {
    lexeme.get(2..).unwrap_or("").to_owned()
}

/// Resolve backslash escapes. Unknown escapes keep their backslash.
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::SchemaKeyword;

    fn kind(k: LexemeKind, lexeme: &str) -> TokenKind {
        build(k, lexeme, TextSpan::new(0, lexeme.len())).kind
    }

    #[test]
    fn test_words() {
        assert_eq!(kind(LexemeKind::Word, "Select"), TokenKind::Select);
        assert_eq!(
            kind(LexemeKind::Word, "Name"),
            TokenKind::Identifier("Name".into())
        );
        assert_eq!(
            kind(LexemeKind::SchemaWord, "int"),
            TokenKind::SchemaKeyword(SchemaKeyword::Int)
        );
        assert_eq!(
            kind(LexemeKind::SchemaWord, "select"),
            TokenKind::Identifier("select".into())
        );
        assert_eq!(
            kind(LexemeKind::Property, "end"),
            TokenKind::Property("end".into())
        );
    }

    #[test]
    fn test_compound_words() {
        assert_eq!(
            kind(LexemeKind::MethodAccess, "x.Method"),
            TokenKind::MethodAccess {
                alias: "x".into(),
                method: "Method".into()
            }
        );
        assert_eq!(
            kind(LexemeKind::AliasedStar, "a.*"),
            TokenKind::AliasedStar("a".into())
        );
        assert_eq!(
            kind(LexemeKind::ArrayIndex, "Items[3]"),
            TokenKind::ArrayIndex {
                name: "Items".into(),
                index: 3
            }
        );
        assert_eq!(
            kind(LexemeKind::QuotedIdentifier, "[My Column]"),
            TokenKind::QuotedIdentifier("My Column".into())
        );
        assert_eq!(kind(LexemeKind::FieldLink, "::2"), TokenKind::FieldLink(2));
    }

    #[test]
    fn test_key_access_keys() {
        assert_eq!(
            kind(LexemeKind::KeyAccess, "Map['k\\'1']"),
            TokenKind::KeyAccess {
                name: "Map".into(),
                key: KeyAccessKey::Literal("k'1".into())
            }
        );
        let token = build(LexemeKind::KeyAccess, "Map[a + 1]", TextSpan::new(10, 10));
        assert_eq!(
            token.kind,
            TokenKind::KeyAccess {
                name: "Map".into(),
                key: KeyAccessKey::Expression(TextSpan::new(14, 5))
            }
        );
    }

    #[test]
    fn test_key_with_two_strings_is_an_expression() {
        let token = build(LexemeKind::KeyAccess, "M['a' + 'b']", TextSpan::new(0, 12));
        assert!(matches!(
            token.kind,
            TokenKind::KeyAccess {
                key: KeyAccessKey::Expression(_),
                ..
            }
        ));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kind(LexemeKind::Integer, "42"),
            TokenKind::Integer {
                digits: "42".into(),
                suffix: None
            }
        );
        assert_eq!(
            kind(LexemeKind::Integer, "-7ub"),
            TokenKind::Integer {
                digits: "-7".into(),
                suffix: Some(IntegerSuffix::U8)
            }
        );
        assert_eq!(
            kind(LexemeKind::Decimal, "1.5D"),
            TokenKind::Decimal("1.5".into())
        );
        assert_eq!(
            kind(LexemeKind::Hexadecimal, "0xFF"),
            TokenKind::Hexadecimal("FF".into())
        );
        assert_eq!(
            kind(LexemeKind::Binary, "0b101"),
            TokenKind::Binary("101".into())
        );
        assert_eq!(
            kind(LexemeKind::Octal, "0o17"),
            TokenKind::Octal("17".into())
        );
    }

    #[test]
    fn test_phrase_normalization() {
        assert_eq!(kind(LexemeKind::Phrase, "GROUP\n  BY"), TokenKind::GroupBy);
        assert_eq!(
            kind(LexemeKind::Phrase, "left outer join"),
            TokenKind::LeftOuterJoin
        );
    }

    #[test]
    fn test_symbols() {
        assert_eq!(kind(LexemeKind::Symbol, "!="), TokenKind::Diff);
        assert_eq!(kind(LexemeKind::Symbol, "<>"), TokenKind::Diff);
        assert_eq!(kind(LexemeKind::Symbol, "=>"), TokenKind::FatArrow);
        assert_eq!(kind(LexemeKind::Symbol, "::"), TokenKind::DoubleColon);
        assert_eq!(kind(LexemeKind::Symbol, "?"), TokenKind::Error("?".into()));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r"it\'s"), "it's");
        assert_eq!(unescape(r"\\"), "\\");
        assert_eq!(unescape(r"\q"), "\\q");
        assert_eq!(unescape("tail\\"), "tail\\");
        assert_eq!(
            kind(LexemeKind::String, r"'x\ty'"),
            TokenKind::StringLiteral("x\ty".into())
        );
    }
}
