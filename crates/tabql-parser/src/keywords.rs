//! Keyword tables.
//!
//! Three read-only tables, built once per process:
//! - query keywords, case-insensitive,
//! - schema-definition keywords, consulted only inside a schema body,
//! - multi-word phrases, bucketed by their lower-cased first letter so the
//!   lexer only tries the one to three phrases that could match.

use std::sync::LazyLock;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::classifier::is_ident_continue;
use crate::token::{SchemaKeyword, TokenKind};

/// Longest keyword spelling we bother lower-casing on the stack.
const MAX_KEYWORD_LEN: usize = 16;

static KEYWORDS: LazyLock<HashMap<&'static str, TokenKind>> = LazyLock::new(|| {
    HashMap::from([
        ("select", TokenKind::Select),
        ("from", TokenKind::From),
        ("where", TokenKind::Where),
        ("having", TokenKind::Having),
        ("asc", TokenKind::Asc),
        ("desc", TokenKind::Desc),
        ("skip", TokenKind::Skip),
        ("take", TokenKind::Take),
        ("with", TokenKind::With),
        ("as", TokenKind::As),
        ("and", TokenKind::And),
        ("or", TokenKind::Or),
        ("not", TokenKind::Not),
        ("is", TokenKind::Is),
        ("null", TokenKind::Null),
        ("true", TokenKind::True),
        ("false", TokenKind::False),
        ("in", TokenKind::In),
        ("like", TokenKind::Like),
        ("rlike", TokenKind::RLike),
        ("contains", TokenKind::Contains),
        ("case", TokenKind::Case),
        ("when", TokenKind::When),
        ("then", TokenKind::Then),
        ("else", TokenKind::Else),
        ("end", TokenKind::End),
        ("union", TokenKind::Union),
        ("except", TokenKind::Except),
        ("intersect", TokenKind::Intersect),
        ("join", TokenKind::InnerJoin),
        ("on", TokenKind::On),
        ("distinct", TokenKind::Distinct),
        ("table", TokenKind::Table),
        ("couple", TokenKind::Couple),
    ])
});

static SCHEMA_KEYWORDS: LazyLock<HashMap<&'static str, SchemaKeyword>> = LazyLock::new(|| {
    HashMap::from([
        ("byte", SchemaKeyword::Byte),
        ("sbyte", SchemaKeyword::SByte),
        ("short", SchemaKeyword::Short),
        ("ushort", SchemaKeyword::UShort),
        ("int", SchemaKeyword::Int),
        ("uint", SchemaKeyword::UInt),
        ("long", SchemaKeyword::Long),
        ("ulong", SchemaKeyword::ULong),
        ("float", SchemaKeyword::Float),
        ("double", SchemaKeyword::Double),
        ("bool", SchemaKeyword::Bool),
        ("string", SchemaKeyword::String),
        ("le", SchemaKeyword::Le),
        ("be", SchemaKeyword::Be),
        ("utf8", SchemaKeyword::Utf8),
        ("ascii", SchemaKeyword::Ascii),
        ("until", SchemaKeyword::Until),
        ("between", SchemaKeyword::Between),
        ("pattern", SchemaKeyword::Pattern),
        ("literal", SchemaKeyword::Literal),
        ("token", SchemaKeyword::Token),
        ("whitespace", SchemaKeyword::Whitespace),
        ("rest", SchemaKeyword::Rest),
        ("trim", SchemaKeyword::Trim),
    ])
});

/// Lower-case `word` into a stack buffer. `None` for words that cannot be a
/// keyword (non-ASCII or too long).
fn lowercase(word: &str) -> Option<SmallVec<[u8; MAX_KEYWORD_LEN]>> {
    if word.len() > MAX_KEYWORD_LEN || !word.is_ascii() {
        return None;
    }
    Some(word.bytes().map(|b| b.to_ascii_lowercase()).collect())
}

/// Look up a query keyword, case-insensitively.
#[must_use]
pub fn lookup_keyword(word: &str) -> Option<TokenKind> {
    let lower = lowercase(word)?;
    let key = std::str::from_utf8(&lower).ok()?;
    KEYWORDS.get(key).cloned()
}

#[must_use]
pub fn is_keyword(word: &str) -> bool {
    lookup_keyword(word).is_some()
}

/// Look up a schema-definition keyword, case-insensitively.
#[must_use]
pub fn lookup_schema_keyword(word: &str) -> Option<SchemaKeyword> {
    let lower = lowercase(word)?;
    let key = std::str::from_utf8(&lower).ok()?;
    SCHEMA_KEYWORDS.get(key).copied()
}

// ---------------------------------------------------------------------------
// Multi-word phrases
// ---------------------------------------------------------------------------

/// A keyword spelled as two or three words.
#[derive(Debug)]
pub struct Phrase {
    pub words: &'static [&'static str],
    pub kind: TokenKind,
}

static PHRASES_C: [Phrase; 1] = [Phrase {
    words: &["cross", "apply"],
    kind: TokenKind::CrossApply,
}];

static PHRASES_G: [Phrase; 1] = [Phrase {
    words: &["group", "by"],
    kind: TokenKind::GroupBy,
}];

static PHRASES_I: [Phrase; 1] = [Phrase {
    words: &["inner", "join"],
    kind: TokenKind::InnerJoin,
}];

static PHRASES_L: [Phrase; 2] = [
    Phrase {
        words: &["left", "outer", "join"],
        kind: TokenKind::LeftOuterJoin,
    },
    Phrase {
        words: &["left", "join"],
        kind: TokenKind::LeftOuterJoin,
    },
];

static PHRASES_N: [Phrase; 3] = [
    Phrase {
        words: &["not", "in"],
        kind: TokenKind::NotIn,
    },
    Phrase {
        words: &["not", "like"],
        kind: TokenKind::NotLike,
    },
    Phrase {
        words: &["not", "rlike"],
        kind: TokenKind::NotRLike,
    },
];

static PHRASES_O: [Phrase; 2] = [
    Phrase {
        words: &["order", "by"],
        kind: TokenKind::OrderBy,
    },
    Phrase {
        words: &["outer", "apply"],
        kind: TokenKind::OuterApply,
    },
];

static PHRASES_R: [Phrase; 2] = [
    Phrase {
        words: &["right", "outer", "join"],
        kind: TokenKind::RightOuterJoin,
    },
    Phrase {
        words: &["right", "join"],
        kind: TokenKind::RightOuterJoin,
    },
];

static PHRASES_U: [Phrase; 1] = [Phrase {
    words: &["union", "all"],
    kind: TokenKind::UnionAll,
}];

/// Phrases that may start with `first` (any case). Longer phrases come
/// before their prefixes.
#[must_use]
pub fn multi_word_candidates(first: u8) -> &'static [Phrase] {
    match first.to_ascii_lowercase() {
        b'c' => &PHRASES_C,
        b'g' => &PHRASES_G,
        b'i' => &PHRASES_I,
        b'l' => &PHRASES_L,
        b'n' => &PHRASES_N,
        b'o' => &PHRASES_O,
        b'r' => &PHRASES_R,
        b'u' => &PHRASES_U,
        _ => &[],
    }
}

/// Try to match `phrase` at the start of `input`. Words are separated by
/// one or more whitespace characters and the last word must end at a word
/// boundary. Returns the matched byte length.
#[must_use]
pub fn match_phrase(input: &str, phrase: &Phrase) -> Option<usize> {
    let bytes = input.as_bytes();
    let mut pos = 0;
    for (i, word) in phrase.words.iter().enumerate() {
        if i > 0 {
            let ws = input[pos..]
                .char_indices()
                .find(|&(_, c)| !c.is_whitespace())
                .map_or(input.len() - pos, |(idx, _)| idx);
            if ws == 0 {
                return None;
            }
            pos += ws;
        }
        let end = pos + word.len();
        if end > bytes.len() || !bytes[pos..end].eq_ignore_ascii_case(word.as_bytes()) {
            return None;
        }
        pos = end;
    }
    match input[pos..].chars().next() {
        Some(c) if is_ident_continue(c) => None,
        _ => Some(pos),
    }
}

/// Look up the phrase keyword for normalized text such as `"left join"`.
#[must_use]
pub fn lookup_phrase(text: &str) -> Option<TokenKind> {
    let first = *text.as_bytes().first()?;
    multi_word_candidates(first)
        .iter()
        .find(|p| match_phrase(text, p) == Some(text.len()))
        .map(|p| p.kind.clone())
}
