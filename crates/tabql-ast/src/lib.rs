//! Abstract syntax tree node types for TabQL.
//!
//! Every query parsed by `tabql-parser` produces a tree of these nodes rooted
//! at a [`Program`]. The tree is strict (no shared sub-nodes) and immutable
//! once built. All nodes that represent user-written syntax carry a
//! [`TextSpan`] for error reporting.
//!
//! Node families:
//! - literals and operators ([`Literal`], [`BinaryOperator`], [`Expr`]),
//! - query clauses ([`Query`] and its clause structs),
//! - from sources ([`FromSource`]),
//! - set operators ([`SetExpr`]),
//! - CTEs ([`CteExpression`]),
//! - statements that are not queries ([`DescStatement`], [`CreateTable`],
//!   [`Couple`], [`SchemaDefinition`]).
//!
//! Traversal goes through [`Visitable::accept`] and the [`Visitor`] trait in
//! [`visit`]; rendering back to query text goes through `Display`.

mod display;
pub mod visit;

use std::fmt;

pub use tabql_error::TextSpan;
pub use visit::{Visitable, Visitor};

// ---------------------------------------------------------------------------
// Program and statements
// ---------------------------------------------------------------------------

/// Root of every parse: one or more `;`-separated statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
    pub span: TextSpan,
}

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A query or a set operation over queries.
    Query(SetExpr),
    /// `WITH name AS (...), ... outer`.
    Cte(CteExpression),
    /// `DESC ...` introspection.
    Desc(DescStatement),
    /// `TABLE Name { ... }` in-memory table declaration.
    CreateTable(CreateTable),
    /// `COUPLE #s.m WITH TABLE Name AS Alias`.
    Couple(Couple),
    /// `binary Name { ... }` / `text Name { ... }` record layout.
    SchemaDefinition(SchemaDefinition),
}

impl Statement {
    #[must_use]
    pub fn span(&self) -> TextSpan {
        match self {
            Self::Query(q) => q.span(),
            Self::Cte(c) => c.span,
            Self::Desc(d) => d.span,
            Self::CreateTable(t) => t.span,
            Self::Couple(c) => c.span,
            Self::SchemaDefinition(s) => s.span,
        }
    }
}

// ---------------------------------------------------------------------------
// Set operations
// ---------------------------------------------------------------------------

/// Set operators combining two query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperator {
    Union,
    UnionAll,
    Except,
    Intersect,
}

/// Either a single query or a binary set operation.
#[derive(Debug, Clone, PartialEq)]
pub enum SetExpr {
    Single(Box<Query>),
    Operation(SetOperation),
}

impl SetExpr {
    #[must_use]
    pub fn span(&self) -> TextSpan {
        match self {
            Self::Single(q) => q.span,
            Self::Operation(op) => op.span,
        }
    }
}

/// `left op (keys) right`.
///
/// Set operations associate to the right: in `a union b except c` the right
/// operand of the union is the `except` node.
#[derive(Debug, Clone, PartialEq)]
pub struct SetOperation {
    pub kind: SetOperator,
    pub left: Box<SetExpr>,
    pub right: Box<SetExpr>,
    /// Columns used to match rows across the operands. Empty means
    /// positional matching over all columns.
    pub keys: Vec<String>,
    /// 0 for a top-level composition, larger when embedded in a CTE arm or
    /// the right operand of another set operation.
    pub nesting_level: u32,
    pub span: TextSpan,
}

impl SetOperation {
    /// Whether this operation is embedded in another construct.
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        self.nesting_level > 0
    }
}

// ---------------------------------------------------------------------------
// CTE
// ---------------------------------------------------------------------------

/// `WITH a AS (...), b AS (...) outer`.
#[derive(Debug, Clone, PartialEq)]
pub struct CteExpression {
    pub inner: Vec<CteInner>,
    pub outer: SetExpr,
    pub span: TextSpan,
}

/// One named arm of a CTE.
#[derive(Debug, Clone, PartialEq)]
pub struct CteInner {
    pub name: String,
    pub value: SetExpr,
    pub span: TextSpan,
}

// ---------------------------------------------------------------------------
// Query and clauses
// ---------------------------------------------------------------------------

/// Which clause the query text opened with. Both orders produce the same
/// node shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryOrder {
    SelectFirst,
    FromFirst,
}

/// A single query.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub order: QueryOrder,
    pub select: SelectClause,
    pub from: FromClause,
    pub where_clause: Option<WhereClause>,
    pub group_by: Option<GroupByClause>,
    pub order_by: Option<OrderByClause>,
    pub skip: Option<SkipClause>,
    pub take: Option<TakeClause>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub distinct: bool,
    pub fields: Vec<Field>,
    pub span: TextSpan,
}

/// A selected, grouped or ordered expression with its display name.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub expression: Expr,
    /// Explicit alias, or empty when none was written.
    pub alias: String,
    /// Zero-based position within its list.
    pub ordinal: usize,
    pub span: TextSpan,
}

impl Field {
    #[must_use]
    pub fn has_alias(&self) -> bool {
        !self.alias.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub expression: Expr,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupByClause {
    pub fields: Vec<Field>,
    pub having: Option<HavingClause>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub expression: Expr,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByClause {
    pub fields: Vec<OrderField>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderField {
    pub field: Field,
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipClause {
    pub value: i64,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TakeClause {
    pub value: i64,
    pub span: TextSpan,
}

// ---------------------------------------------------------------------------
// FROM sources
// ---------------------------------------------------------------------------

/// The FROM clause of one query.
#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub source: FromSource,
    /// Ordinal assigned in parse order, strictly increasing across the whole
    /// program.
    pub position: u32,
    pub span: TextSpan,
}

/// `#schema.method(args) alias`.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaSource {
    /// Schema name including the leading `#`.
    pub schema: String,
    pub method: String,
    pub args: Vec<Expr>,
    pub alias: String,
    pub span: TextSpan,
}

/// `method(args) alias` used directly as a source.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSource {
    pub method: String,
    pub args: Vec<Expr>,
    pub alias: String,
    pub span: TextSpan,
}

/// `a.method(args) alias` where `a` is an alias already bound in this query.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasMethodSource {
    pub source_alias: String,
    pub method: String,
    pub args: Vec<Expr>,
    pub alias: String,
    pub span: TextSpan,
}

/// `a.prop.prop alias`.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChainSource {
    pub source_alias: String,
    pub properties: Vec<String>,
    pub alias: String,
    pub span: TextSpan,
}

/// A bare name, typically an earlier CTE arm or in-memory table.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedSource {
    pub name: String,
    pub alias: String,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    RightOuter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinSource {
    pub left: FromSource,
    pub right: FromSource,
    pub condition: Expr,
    pub kind: JoinKind,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApplyKind {
    Cross,
    Outer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplySource {
    pub left: FromSource,
    pub right: FromSource,
    pub kind: ApplyKind,
    pub span: TextSpan,
}

/// A FROM source.
///
/// A chain of joins is built left-deep out of `Join` links and then wrapped
/// once in `Joins`; applies likewise use `Apply` and `Applies`. The wrapper
/// holds the outermost link.
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    Schema(SchemaSource),
    Function(FunctionSource),
    AliasMethod(AliasMethodSource),
    PropertyChain(PropertyChainSource),
    Named(NamedSource),
    Join(Box<JoinSource>),
    Joins(Box<JoinSource>),
    Apply(Box<ApplySource>),
    Applies(Box<ApplySource>),
}

impl FromSource {
    /// Alias of a leaf source. Composite sources have none.
    #[must_use]
    pub fn alias(&self) -> Option<&str> {
        match self {
            Self::Schema(s) => Some(&s.alias),
            Self::Function(s) => Some(&s.alias),
            Self::AliasMethod(s) => Some(&s.alias),
            Self::PropertyChain(s) => Some(&s.alias),
            Self::Named(s) => Some(&s.alias),
            Self::Join(_) | Self::Joins(_) | Self::Apply(_) | Self::Applies(_) => None,
        }
    }

    #[must_use]
    pub fn span(&self) -> TextSpan {
        match self {
            Self::Schema(s) => s.span,
            Self::Function(s) => s.span,
            Self::AliasMethod(s) => s.span,
            Self::PropertyChain(s) => s.span,
            Self::Named(s) => s.span,
            Self::Join(j) | Self::Joins(j) => j.span,
            Self::Apply(a) | Self::Applies(a) => a.span,
        }
    }
}

// ---------------------------------------------------------------------------
// Literals
// ---------------------------------------------------------------------------

/// Type-size suffix on an integer literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerSuffix {
    /// `b`, signed 8-bit.
    I8,
    /// `ub`
    U8,
    /// `s`
    I16,
    /// `us`
    U16,
    /// `i`
    I32,
    /// `ui`
    U32,
    /// `l`
    I64,
    /// `ul`
    U64,
}

impl IntegerSuffix {
    /// Parse a suffix, case-insensitively.
    #[must_use]
    pub fn from_suffix(text: &str) -> Option<Self> {
        let suffix = match text.to_ascii_lowercase().as_str() {
            "b" => Self::I8,
            "ub" => Self::U8,
            "s" => Self::I16,
            "us" => Self::U16,
            "i" => Self::I32,
            "ui" => Self::U32,
            "l" => Self::I64,
            "ul" => Self::U64,
            _ => return None,
        };
        Some(suffix)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I8 => "b",
            Self::U8 => "ub",
            Self::I16 => "s",
            Self::U16 => "us",
            Self::I32 => "i",
            Self::U32 => "ui",
            Self::I64 => "l",
            Self::U64 => "ul",
        }
    }

    /// Inclusive value range of the suffixed type.
    #[must_use]
    pub const fn range(self) -> (i128, i128) {
        match self {
            Self::I8 => (i8::MIN as i128, i8::MAX as i128),
            Self::U8 => (0, u8::MAX as i128),
            Self::I16 => (i16::MIN as i128, i16::MAX as i128),
            Self::U16 => (0, u16::MAX as i128),
            Self::I32 => (i32::MIN as i128, i32::MAX as i128),
            Self::U32 => (0, u32::MAX as i128),
            Self::I64 => (i64::MIN as i128, i64::MAX as i128),
            Self::U64 => (0, u64::MAX as i128),
        }
    }
}

/// Decimal integer text with an optional size suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IntegerLiteral {
    /// Digits, with a leading `-` for folded negative literals.
    pub digits: String,
    pub suffix: Option<IntegerSuffix>,
}

impl IntegerLiteral {
    #[must_use]
    pub fn new(digits: impl Into<String>, suffix: Option<IntegerSuffix>) -> Self {
        Self {
            digits: digits.into(),
            suffix,
        }
    }

    /// Numeric value, if it fits in `i128` and in the suffixed type.
    #[must_use]
    pub fn value(&self) -> Option<i128> {
        let value: i128 = self.digits.parse().ok()?;
        match self.suffix {
            Some(suffix) => {
                let (lo, hi) = suffix.range();
                (lo..=hi).contains(&value).then_some(value)
            }
            None => Some(value),
        }
    }
}

/// Literal constants.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Literal {
    Integer(IntegerLiteral),
    /// Decimal text without the optional `d` suffix, e.g. `1.5` or `.5`.
    Decimal(String),
    /// Hex digits without the `0x` prefix.
    Hexadecimal(String),
    /// Binary digits without the `0b` prefix.
    Binary(String),
    /// Octal digits without the `0o` prefix.
    Octal(String),
    /// Unescaped string contents.
    String(String),
    Boolean(bool),
    Null,
}

impl Literal {
    /// Integer value of the integral forms.
    #[must_use]
    pub fn integer_value(&self) -> Option<i128> {
        match self {
            Self::Integer(lit) => lit.value(),
            Self::Hexadecimal(d) => i128::from_str_radix(d, 16).ok(),
            Self::Binary(d) => i128::from_str_radix(d, 2).ok(),
            Self::Octal(d) => i128::from_str_radix(d, 8).ok(),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Binary operators across the arithmetic, comparison and logical tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Star,
    Divide,
    Modulo,

    // Bitwise
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,

    // Comparison
    Equality,
    Diff,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Like,
    NotLike,
    RLike,
    NotRLike,

    // Logical
    And,
    Or,
}

impl BinaryOperator {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Star => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
            Self::BitAnd => "&",
            Self::BitOr => "|",
            Self::BitXor => "^",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Equality => "=",
            Self::Diff => "<>",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Like => "like",
            Self::NotLike => "not like",
            Self::RLike => "rlike",
            Self::NotRLike => "not rlike",
            Self::And => "and",
            Self::Or => "or",
        }
    }

    #[must_use]
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Subtract
                | Self::Star
                | Self::Divide
                | Self::Modulo
                | Self::BitAnd
                | Self::BitOr
                | Self::BitXor
                | Self::ShiftLeft
                | Self::ShiftRight
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------------

/// An expression node. Every variant carries its [`TextSpan`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal, TextSpan),

    /// `left op right`.
    Binary {
        op: BinaryOperator,
        left: Box<Self>,
        right: Box<Self>,
        span: TextSpan,
    },

    /// `NOT expr`.
    Not { expr: Box<Self>, span: TextSpan },

    /// `-expr`. A minus glued to a number is folded into the literal by
    /// the lexer instead.
    Negate { expr: Box<Self>, span: TextSpan },

    /// `expr IS [NOT] NULL`.
    IsNull {
        expr: Box<Self>,
        negated: bool,
        span: TextSpan,
    },

    /// `expr [NOT] IN (values)`.
    In {
        expr: Box<Self>,
        values: Vec<Self>,
        negated: bool,
        span: TextSpan,
    },

    /// `expr CONTAINS (values)`.
    Contains {
        expr: Box<Self>,
        values: Vec<Self>,
        span: TextSpan,
    },

    /// `CASE WHEN c THEN r ... ELSE e END`. `ELSE` is mandatory.
    Case {
        when_then: Vec<(Self, Self)>,
        else_expr: Box<Self>,
        span: TextSpan,
    },

    /// A column name, plain or bracket-quoted.
    Column { name: String, span: TextSpan },

    /// A member name on the right of a `.`.
    Property { name: String, span: TextSpan },

    /// `name(args)` or `alias.name(args)`.
    MethodCall {
        alias: Option<String>,
        name: String,
        args: Vec<Self>,
        span: TextSpan,
    },

    /// `name[3]`.
    ArrayIndex {
        name: String,
        index: i64,
        span: TextSpan,
    },

    /// `name['key']` or `name[expr]`.
    KeyAccess {
        name: String,
        key: Box<Self>,
        span: TextSpan,
    },

    /// `root.expression`.
    Dot {
        root: Box<Self>,
        expression: Box<Self>,
        span: TextSpan,
    },

    /// `::N`, a reference to the N-th grouping field.
    FieldLink { index: u32, span: TextSpan },

    /// `*` or `alias.*`.
    AllColumns {
        alias: Option<String>,
        span: TextSpan,
    },
}

impl Expr {
    #[must_use]
    pub const fn span(&self) -> TextSpan {
        match self {
            Self::Literal(_, s) => *s,
            Self::Binary { span, .. }
            | Self::Not { span, .. }
            | Self::Negate { span, .. }
            | Self::IsNull { span, .. }
            | Self::In { span, .. }
            | Self::Contains { span, .. }
            | Self::Case { span, .. }
            | Self::Column { span, .. }
            | Self::Property { span, .. }
            | Self::MethodCall { span, .. }
            | Self::ArrayIndex { span, .. }
            | Self::KeyAccess { span, .. }
            | Self::Dot { span, .. }
            | Self::FieldLink { span, .. }
            | Self::AllColumns { span, .. } => *span,
        }
    }

    /// Build a binary node spanning both operands.
    #[must_use]
    pub fn binary(op: BinaryOperator, left: Self, right: Self) -> Self {
        let span = left.span().merge(right.span());
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
            span,
        }
    }

    #[must_use]
    pub fn column(name: impl Into<String>, span: TextSpan) -> Self {
        Self::Column {
            name: name.into(),
            span,
        }
    }

    /// Whether this is an operator node that needs parentheses when nested.
    #[must_use]
    pub const fn is_compound(&self) -> bool {
        matches!(
            self,
            Self::Binary { .. }
                | Self::Not { .. }
                | Self::Negate { .. }
                | Self::IsNull { .. }
                | Self::In { .. }
                | Self::Contains { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// DESC, TABLE and COUPLE
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DescKind {
    /// `desc #s`
    Schema,
    /// `desc #s.m`
    Constructors,
    /// `desc #s.m(args)`
    Constructor,
    /// `desc #s.m(args) column Name`
    Column,
    /// `desc functions #s[.m[(args)]]`
    Functions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescStatement {
    pub kind: DescKind,
    /// Schema name including the leading `#`.
    pub schema: String,
    pub method: Option<String>,
    /// `Some` when an argument list was written, even an empty one.
    pub args: Option<Vec<Expr>>,
    pub column: Option<String>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub name: String,
    pub type_name: String,
    pub span: TextSpan,
}

/// `TABLE Name { Column type, ... }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTable {
    pub name: String,
    pub columns: Vec<TableColumn>,
    pub span: TextSpan,
}

/// `COUPLE #schema.method WITH TABLE table AS alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Couple {
    pub schema: String,
    pub method: String,
    pub table: String,
    pub alias: String,
    pub span: TextSpan,
}

// ---------------------------------------------------------------------------
// Schema definitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Binary,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
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
}

impl PrimitiveType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Byte => "byte",
            Self::SByte => "sbyte",
            Self::Short => "short",
            Self::UShort => "ushort",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Long => "long",
            Self::ULong => "ulong",
            Self::Float => "float",
            Self::Double => "double",
            Self::Bool => "bool",
        }
    }

    /// Width in bytes.
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Self::Byte | Self::SByte | Self::Bool => 1,
            Self::Short | Self::UShort => 2,
            Self::Int | Self::UInt | Self::Float => 4,
            Self::Long | Self::ULong | Self::Double => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringEncoding {
    Utf8,
    Ascii,
}

/// How a text field finds its value in the input line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TextMatcher {
    /// Everything up to the delimiter.
    Until(String),
    /// Content between an opening and closing marker.
    Between(String, String),
    /// First match of a regular expression.
    Pattern(String),
    /// Exactly this text.
    Literal(String),
    /// The next run of non-whitespace.
    Token,
    /// A run of whitespace.
    Whitespace,
    /// The remainder of the input.
    Rest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Primitive {
        ty: PrimitiveType,
        endianness: Option<Endianness>,
    },
    /// `element[length]`.
    Array {
        element: Box<Self>,
        length: Expr,
    },
    /// `string[length] [utf8|ascii]`.
    String {
        length: Expr,
        encoding: Option<StringEncoding>,
    },
    /// Another schema by name.
    Reference(String),
    Text {
        matcher: TextMatcher,
        trim: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub ty: FieldType,
    pub span: TextSpan,
}

/// `binary Name { ... }` or `text Name { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    pub kind: SchemaKind,
    pub name: String,
    pub fields: Vec<SchemaField>,
    pub span: TextSpan,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(n: &str) -> Expr {
        Expr::Literal(
            Literal::Integer(IntegerLiteral::new(n, None)),
            TextSpan::ZERO,
        )
    }

    #[test]
    fn test_integer_suffix_parse_is_case_insensitive() {
        assert_eq!(IntegerSuffix::from_suffix("UB"), Some(IntegerSuffix::U8));
        assert_eq!(IntegerSuffix::from_suffix("ul"), Some(IntegerSuffix::U64));
        assert_eq!(IntegerSuffix::from_suffix("x"), None);
        assert_eq!(IntegerSuffix::U32.as_str(), "ui");
    }

    #[test]
    fn test_integer_literal_value_respects_suffix_range() {
        assert_eq!(IntegerLiteral::new("127", Some(IntegerSuffix::I8)).value(), Some(127));
        assert_eq!(IntegerLiteral::new("128", Some(IntegerSuffix::I8)).value(), None);
        assert_eq!(IntegerLiteral::new("-5", Some(IntegerSuffix::U8)).value(), None);
        assert_eq!(IntegerLiteral::new("-5", None).value(), Some(-5));
    }

    #[test]
    fn test_radix_literal_values() {
        assert_eq!(Literal::Hexadecimal("ff".into()).integer_value(), Some(255));
        assert_eq!(Literal::Binary("101".into()).integer_value(), Some(5));
        assert_eq!(Literal::Octal("17".into()).integer_value(), Some(15));
        assert_eq!(Literal::String("1".into()).integer_value(), None);
    }

    #[test]
    fn test_binary_constructor_merges_spans() {
        let left = Expr::column("a", TextSpan::new(0, 1));
        let right = Expr::column("b", TextSpan::new(4, 1));
        let e = Expr::binary(BinaryOperator::Add, left, right);
        assert_eq!(e.span(), TextSpan::new(0, 5));
        assert!(e.is_compound());
        assert!(!lit("1").is_compound());
    }

    #[test]
    fn test_from_source_alias() {
        let schema = FromSource::Schema(SchemaSource {
            schema: "#a".into(),
            method: "b".into(),
            args: vec![],
            alias: "x".into(),
            span: TextSpan::ZERO,
        });
        assert_eq!(schema.alias(), Some("x"));
        let apply = FromSource::Applies(Box::new(ApplySource {
            left: schema.clone(),
            right: schema,
            kind: ApplyKind::Cross,
            span: TextSpan::ZERO,
        }));
        assert_eq!(apply.alias(), None);
    }

    #[test]
    fn test_primitive_sizes() {
        assert_eq!(PrimitiveType::Byte.size(), 1);
        assert_eq!(PrimitiveType::UShort.size(), 2);
        assert_eq!(PrimitiveType::Float.size(), 4);
        assert_eq!(PrimitiveType::ULong.size(), 8);
    }

    #[test]
    fn test_set_operation_nesting_flag() {
        let q = || {
            SetExpr::Single(Box::new(Query {
                order: QueryOrder::SelectFirst,
                select: SelectClause {
                    distinct: false,
                    fields: vec![],
                    span: TextSpan::ZERO,
                },
                from: FromClause {
                    source: FromSource::Named(NamedSource {
                        name: "p".into(),
                        alias: String::new(),
                        span: TextSpan::ZERO,
                    }),
                    position: 0,
                    span: TextSpan::ZERO,
                },
                where_clause: None,
                group_by: None,
                order_by: None,
                skip: None,
                take: None,
                span: TextSpan::ZERO,
            }))
        };
        let op = SetOperation {
            kind: SetOperator::Union,
            left: Box::new(q()),
            right: Box::new(q()),
            keys: vec![],
            nesting_level: 0,
            span: TextSpan::ZERO,
        };
        assert!(!op.is_nested());
    }
}
