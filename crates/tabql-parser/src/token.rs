//! Token model.
//!
//! Every token carries a discriminant with its decoded payload and the byte
//! span it covers. Keywords are their own variants so the parser matches
//! them in O(1).

use tabql_ast::{IntegerSuffix, TextSpan};

/// A single token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: TextSpan,
}

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, span: TextSpan) -> Self {
        Self { kind, span }
    }

    /// End-of-input marker at `offset`.
    #[must_use]
    pub const fn eof(offset: usize) -> Self {
        Self {
            kind: TokenKind::Eof,
            span: TextSpan::empty(offset),
        }
    }
}

/// The key inside `name[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAccessKey {
    /// `name['key']`, unescaped.
    Literal(String),
    /// `name[expr]`: span of the bracket contents, parsed on demand.
    Expression(TextSpan),
}

/// Keywords that only exist inside a schema definition body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKeyword {
    Byte,
    SByte,
    Short,
    UShort,
    Int,
    UInt,
    Long,
    ULong,
    Float,
    Double,
    Bool,
    String,
    Le,
    Be,
    Utf8,
    Ascii,
    Until,
    Between,
    Pattern,
    Literal,
    Token,
    Whitespace,
    Rest,
    Trim,
}

/// Token discriminant.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // === Literals ===
    /// `42`, `-7`, `5ub`.
    Integer {
        digits: String,
        suffix: Option<IntegerSuffix>,
    },
    /// `1.5`, `.5`, `2d`. Text excludes the `d` suffix.
    Decimal(String),
    /// `0xff`, digits only.
    Hexadecimal(String),
    /// `0b101`, digits only.
    Binary(String),
    /// `0o17`, digits only.
    Octal(String),
    /// `'text'`, unescaped.
    StringLiteral(String),

    // === Words ===
    Identifier(String),
    /// `[My Column]`, brackets stripped.
    QuotedIdentifier(String),
    /// A word directly after a `.` token.
    Property(String),
    /// A word directly followed by `(`.
    Function(String),
    /// `alias.method` directly followed by `(`.
    MethodAccess { alias: String, method: String },
    /// `alias.*`
    AliasedStar(String),
    /// `name[3]`
    ArrayIndex { name: String, index: i64 },
    /// `name['key']` or `name[expr]`
    KeyAccess { name: String, key: KeyAccessKey },
    /// `#name`, hash included.
    Schema(String),
    /// `::3`
    FieldLink(u32),
    SchemaKeyword(SchemaKeyword),

    // === Operators ===
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Ampersand,
    Pipe,
    Caret,
    ShiftLeft,
    ShiftRight,
    Equality,
    /// `<>` or `!=`
    Diff,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    /// `=>`
    FatArrow,
    Dot,
    /// `::`
    DoubleColon,
    Colon,

    // === Punctuation ===
    Comma,
    Semicolon,
    LeftParen,
    RightParen,
    LeftSquare,
    RightSquare,
    LeftCurly,
    RightCurly,

    // === Keywords ===
    Select,
    From,
    Where,
    GroupBy,
    Having,
    OrderBy,
    Asc,
    Desc,
    Skip,
    Take,
    With,
    As,
    And,
    Or,
    Not,
    Is,
    Null,
    True,
    False,
    In,
    NotIn,
    Like,
    NotLike,
    RLike,
    NotRLike,
    Contains,
    Case,
    When,
    Then,
    Else,
    End,
    Union,
    UnionAll,
    Except,
    Intersect,
    InnerJoin,
    LeftOuterJoin,
    RightOuterJoin,
    On,
    CrossApply,
    OuterApply,
    Distinct,
    Table,
    Couple,

    // === Trivia and special ===
    WhiteSpace,
    Comment,
    Eof,
    /// Lexical error recorded in recovery mode; payload is the lexeme.
    Error(String),
}

impl TokenKind {
    /// Whether a token of this kind can end an operand. Decides whether a
    /// following `-5` or `.5` is folded into a literal.
    #[must_use]
    pub const fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::Integer { .. }
                | Self::Decimal(_)
                | Self::Hexadecimal(_)
                | Self::Binary(_)
                | Self::Octal(_)
                | Self::StringLiteral(_)
                | Self::Identifier(_)
                | Self::QuotedIdentifier(_)
                | Self::Property(_)
                | Self::AliasedStar(_)
                | Self::ArrayIndex { .. }
                | Self::KeyAccess { .. }
                | Self::Schema(_)
                | Self::FieldLink(_)
                | Self::SchemaKeyword(_)
                | Self::RightParen
                | Self::RightSquare
                | Self::True
                | Self::False
                | Self::Null
                | Self::End
        )
    }

    /// Whitespace and comments.
    #[must_use]
    pub const fn is_trivia(&self) -> bool {
        matches!(self, Self::WhiteSpace | Self::Comment)
    }

    /// Whether this kind is one of the query keywords.
    #[must_use]
    pub const fn is_keyword(&self) -> bool {
        matches!(
            self,
            Self::Select
                | Self::From
                | Self::Where
                | Self::GroupBy
                | Self::Having
                | Self::OrderBy
                | Self::Asc
                | Self::Desc
                | Self::Skip
                | Self::Take
                | Self::With
                | Self::As
                | Self::And
                | Self::Or
                | Self::Not
                | Self::Is
                | Self::Null
                | Self::True
                | Self::False
                | Self::In
                | Self::NotIn
                | Self::Like
                | Self::NotLike
                | Self::RLike
                | Self::NotRLike
                | Self::Contains
                | Self::Case
                | Self::When
                | Self::Then
                | Self::Else
                | Self::End
                | Self::Union
                | Self::UnionAll
                | Self::Except
                | Self::Intersect
                | Self::InnerJoin
                | Self::LeftOuterJoin
                | Self::RightOuterJoin
                | Self::On
                | Self::CrossApply
                | Self::OuterApply
                | Self::Distinct
                | Self::Table
                | Self::Couple
        )
    }

    /// Short name used in syntax errors: the variant name without payload.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Integer { .. } => "Integer",
            Self::Decimal(_) => "Decimal",
            Self::Hexadecimal(_) => "Hexadecimal",
            Self::Binary(_) => "Binary",
            Self::Octal(_) => "Octal",
            Self::StringLiteral(_) => "StringLiteral",
            Self::Identifier(_) => "Identifier",
            Self::QuotedIdentifier(_) => "QuotedIdentifier",
            Self::Property(_) => "Property",
            Self::Function(_) => "Function",
            Self::MethodAccess { .. } => "MethodAccess",
            Self::AliasedStar(_) => "AliasedStar",
            Self::ArrayIndex { .. } => "ArrayIndex",
            Self::KeyAccess { .. } => "KeyAccess",
            Self::Schema(_) => "Schema",
            Self::FieldLink(_) => "FieldLink",
            Self::SchemaKeyword(_) => "SchemaKeyword",
            Self::Plus => "Plus",
            Self::Minus => "Minus",
            Self::Star => "Star",
            Self::Slash => "Slash",
            Self::Percent => "Percent",
            Self::Ampersand => "Ampersand",
            Self::Pipe => "Pipe",
            Self::Caret => "Caret",
            Self::ShiftLeft => "ShiftLeft",
            Self::ShiftRight => "ShiftRight",
            Self::Equality => "Equality",
            Self::Diff => "Diff",
            Self::Greater => "Greater",
            Self::GreaterEqual => "GreaterEqual",
            Self::Less => "Less",
            Self::LessEqual => "LessEqual",
            Self::FatArrow => "FatArrow",
            Self::Dot => "Dot",
            Self::DoubleColon => "DoubleColon",
            Self::Colon => "Colon",
            Self::Comma => "Comma",
            Self::Semicolon => "Semicolon",
            Self::LeftParen => "LeftParen",
            Self::RightParen => "RightParen",
            Self::LeftSquare => "LeftSquare",
            Self::RightSquare => "RightSquare",
            Self::LeftCurly => "LeftCurly",
            Self::RightCurly => "RightCurly",
            Self::Select => "Select",
            Self::From => "From",
            Self::Where => "Where",
            Self::GroupBy => "GroupBy",
            Self::Having => "Having",
            Self::OrderBy => "OrderBy",
            Self::Asc => "Asc",
            Self::Desc => "Desc",
            Self::Skip => "Skip",
            Self::Take => "Take",
            Self::With => "With",
            Self::As => "As",
            Self::And => "And",
            Self::Or => "Or",
            Self::Not => "Not",
            Self::Is => "Is",
            Self::Null => "Null",
            Self::True => "True",
            Self::False => "False",
            Self::In => "In",
            Self::NotIn => "NotIn",
            Self::Like => "Like",
            Self::NotLike => "NotLike",
            Self::RLike => "RLike",
            Self::NotRLike => "NotRLike",
            Self::Contains => "Contains",
            Self::Case => "Case",
            Self::When => "When",
            Self::Then => "Then",
            Self::Else => "Else",
            Self::End => "End",
            Self::Union => "Union",
            Self::UnionAll => "UnionAll",
            Self::Except => "Except",
            Self::Intersect => "Intersect",
            Self::InnerJoin => "InnerJoin",
            Self::LeftOuterJoin => "LeftOuterJoin",
            Self::RightOuterJoin => "RightOuterJoin",
            Self::On => "On",
            Self::CrossApply => "CrossApply",
            Self::OuterApply => "OuterApply",
            Self::Distinct => "Distinct",
            Self::Table => "Table",
            Self::Couple => "Couple",
            Self::WhiteSpace => "WhiteSpace",
            Self::Comment => "Comment",
            Self::Eof => "Eof",
            Self::Error(_) => "Error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ends_operand() {
        assert!(TokenKind::Identifier("a".into()).ends_operand());
        assert!(TokenKind::RightParen.ends_operand());
        assert!(TokenKind::Null.ends_operand());
        assert!(!TokenKind::Minus.ends_operand());
        assert!(!TokenKind::Select.ends_operand());
        assert!(!TokenKind::Comma.ends_operand());
        assert!(!TokenKind::LeftParen.ends_operand());
    }

    #[test]
    fn test_name_strips_payload() {
        assert_eq!(TokenKind::Comma.name(), "Comma");
        assert_eq!(TokenKind::Identifier("x".into()).name(), "Identifier");
        assert_eq!(
            TokenKind::ArrayIndex {
                name: "a".into(),
                index: 1
            }
            .name(),
            "ArrayIndex"
        );
        assert_eq!(
            TokenKind::SchemaKeyword(SchemaKeyword::Int).name(),
            "SchemaKeyword"
        );
        assert_eq!(
            TokenKind::Integer {
                digits: "1".into(),
                suffix: None
            }
            .name(),
            "Integer"
        );
        assert_eq!(TokenKind::NotRLike.name(), "NotRLike");
        assert_eq!(TokenKind::Error("?".into()).name(), "Error");
    }

    #[test]
    fn test_keyword_and_trivia_flags() {
        assert!(TokenKind::UnionAll.is_keyword());
        assert!(!TokenKind::Identifier("union".into()).is_keyword());
        assert!(TokenKind::Comment.is_trivia());
        assert!(!TokenKind::Eof.is_trivia());
    }
}
