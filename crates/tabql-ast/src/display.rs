//! Query text rendering via `fmt::Display` for AST nodes.
//!
//! Rendering is canonical rather than faithful: keywords come out lower
//! case, every nested operator node is parenthesized, and spacing is
//! normalized. Parsing the rendered text and rendering again yields the same
//! string.

#[allow(clippy::wildcard_imports)]
use crate::*;
use std::fmt;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn comma_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Words that cannot appear as a bare column name or alias.
const RESERVED: &[&str] = &[
    "all", "and", "apply", "as", "asc", "by", "case", "contains", "couple", "cross", "desc",
    "distinct", "else", "end", "except", "false", "from", "group", "having", "in", "inner",
    "intersect", "is", "join", "left", "like", "not", "null", "on", "or", "order", "outer",
    "right", "rlike", "select", "skip", "table", "take", "then", "true", "union", "when",
    "where", "with",
];

fn needs_quoting(name: &str) -> bool {
    let Some(first) = name.bytes().next() else {
        return true;
    };
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return true;
    }
    if name.bytes().any(|b| !(b.is_ascii_alphanumeric() || b == b'_')) {
        return true;
    }
    RESERVED.iter().any(|kw| kw.eq_ignore_ascii_case(name))
}

fn write_ident(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    if needs_quoting(name) {
        write!(f, "[{name}]")
    } else {
        f.write_str(name)
    }
}

fn write_alias(f: &mut fmt::Formatter<'_>, alias: &str) -> fmt::Result {
    if alias.is_empty() {
        return Ok(());
    }
    f.write_str(" ")?;
    write_ident(f, alias)
}

fn write_string(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_str("'")?;
    for ch in value.chars() {
        match ch {
            '\'' => f.write_str("\\'")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\0' => f.write_str("\\0")?,
            c => write!(f, "{c}")?,
        }
    }
    f.write_str("'")
}

/// Write an operand, parenthesized when it is itself an operator node.
fn write_operand(f: &mut fmt::Formatter<'_>, expr: &Expr) -> fmt::Result {
    if expr.is_compound() {
        write!(f, "({expr})")
    } else {
        write!(f, "{expr}")
    }
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
    f.write_str("(")?;
    comma_list(f, args)?;
    f.write_str(")")
}

// ---------------------------------------------------------------------------
// Program and statements
// ---------------------------------------------------------------------------

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(q) => write!(f, "{q}"),
            Self::Cte(c) => write!(f, "{c}"),
            Self::Desc(d) => write!(f, "{d}"),
            Self::CreateTable(t) => write!(f, "{t}"),
            Self::Couple(c) => write!(f, "{c}"),
            Self::SchemaDefinition(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Set operations and CTEs
// ---------------------------------------------------------------------------

impl fmt::Display for SetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Union => "union",
            Self::UnionAll => "union all",
            Self::Except => "except",
            Self::Intersect => "intersect",
        })
    }
}

impl fmt::Display for SetExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(q) => write!(f, "{q}"),
            Self::Operation(op) => {
                write!(f, "{} {}", op.left, op.kind)?;
                if !op.keys.is_empty() {
                    f.write_str(" (")?;
                    for (i, key) in op.keys.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write_ident(f, key)?;
                    }
                    f.write_str(")")?;
                }
                write!(f, " {}", op.right)
            }
        }
    }
}

impl fmt::Display for CteExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("with ")?;
        for (i, inner) in self.inner.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_ident(f, &inner.name)?;
            write!(f, " as ({})", inner.value)?;
        }
        write!(f, " {}", self.outer)
    }
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)?;
        if self.has_alias() {
            f.write_str(" as ")?;
            write_ident(f, &self.alias)?;
        }
        Ok(())
    }
}

impl fmt::Display for SelectClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("select ")?;
        if self.distinct {
            f.write_str("distinct ")?;
        }
        comma_list(f, &self.fields)
    }
}

impl fmt::Display for FromClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {}", self.source)
    }
}

impl fmt::Display for WhereClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "where {}", self.expression)
    }
}

impl fmt::Display for GroupByClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("group by ")?;
        comma_list(f, &self.fields)?;
        if let Some(having) = &self.having {
            write!(f, " having {}", having.expression)?;
        }
        Ok(())
    }
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if self.direction == SortDirection::Descending {
            f.write_str(" desc")?;
        }
        Ok(())
    }
}

impl fmt::Display for OrderByClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("order by ")?;
        comma_list(f, &self.fields)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order {
            QueryOrder::SelectFirst => write!(f, "{} {}", self.select, self.from)?,
            QueryOrder::FromFirst => write!(f, "{}", self.from)?,
        }
        if let Some(w) = &self.where_clause {
            write!(f, " {w}")?;
        }
        if let Some(g) = &self.group_by {
            write!(f, " {g}")?;
        }
        if self.order == QueryOrder::FromFirst {
            write!(f, " {}", self.select)?;
        }
        if let Some(o) = &self.order_by {
            write!(f, " {o}")?;
        }
        if let Some(s) = &self.skip {
            write!(f, " skip {}", s.value)?;
        }
        if let Some(t) = &self.take {
            write!(f, " take {}", t.value)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FROM sources
// ---------------------------------------------------------------------------

impl fmt::Display for FromSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema(s) => {
                write!(f, "{}.{}", s.schema, s.method)?;
                write_args(f, &s.args)?;
                write_alias(f, &s.alias)
            }
            Self::Function(s) => {
                f.write_str(&s.method)?;
                write_args(f, &s.args)?;
                write_alias(f, &s.alias)
            }
            Self::AliasMethod(s) => {
                write!(f, "{}.{}", s.source_alias, s.method)?;
                write_args(f, &s.args)?;
                write_alias(f, &s.alias)
            }
            Self::PropertyChain(s) => {
                f.write_str(&s.source_alias)?;
                for property in &s.properties {
                    write!(f, ".{property}")?;
                }
                write_alias(f, &s.alias)
            }
            Self::Named(s) => {
                write_ident(f, &s.name)?;
                write_alias(f, &s.alias)
            }
            Self::Join(j) | Self::Joins(j) => {
                let kind = match j.kind {
                    JoinKind::Inner => "inner join",
                    JoinKind::LeftOuter => "left outer join",
                    JoinKind::RightOuter => "right outer join",
                };
                write!(f, "{} {kind} {} on {}", j.left, j.right, j.condition)
            }
            Self::Apply(a) | Self::Applies(a) => {
                let kind = match a.kind {
                    ApplyKind::Cross => "cross apply",
                    ApplyKind::Outer => "outer apply",
                };
                write!(f, "{} {kind} {}", a.left, a.right)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Literals and expressions
// ---------------------------------------------------------------------------

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(lit) => {
                f.write_str(&lit.digits)?;
                if let Some(suffix) = lit.suffix {
                    f.write_str(suffix.as_str())?;
                }
                Ok(())
            }
            Self::Decimal(text) if text.contains('.') => f.write_str(text),
            Self::Decimal(text) => write!(f, "{text}d"),
            Self::Hexadecimal(d) => write!(f, "0x{d}"),
            Self::Binary(d) => write!(f, "0b{d}"),
            Self::Octal(d) => write!(f, "0o{d}"),
            Self::String(s) => write_string(f, s),
            Self::Boolean(true) => f.write_str("true"),
            Self::Boolean(false) => f.write_str("false"),
            Self::Null => f.write_str("null"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(lit, _) => write!(f, "{lit}"),
            Self::Binary {
                op, left, right, ..
            } => {
                write_operand(f, left)?;
                write!(f, " {op} ")?;
                write_operand(f, right)
            }
            Self::Not { expr, .. } => {
                f.write_str("not ")?;
                write_operand(f, expr)
            }
            Self::Negate { expr, .. } => write!(f, "-({expr})"),
            Self::IsNull { expr, negated, .. } => {
                write_operand(f, expr)?;
                f.write_str(if *negated { " is not null" } else { " is null" })
            }
            Self::In {
                expr,
                values,
                negated,
                ..
            } => {
                write_operand(f, expr)?;
                f.write_str(if *negated { " not in " } else { " in " })?;
                write_args(f, values)
            }
            Self::Contains { expr, values, .. } => {
                write_operand(f, expr)?;
                f.write_str(" contains ")?;
                write_args(f, values)
            }
            Self::Case {
                when_then,
                else_expr,
                ..
            } => {
                f.write_str("case")?;
                for (when, then) in when_then {
                    write!(f, " when {when} then {then}")?;
                }
                write!(f, " else {else_expr} end")
            }
            Self::Column { name, .. } => write_ident(f, name),
            Self::Property { name, .. } => f.write_str(name),
            Self::MethodCall {
                alias, name, args, ..
            } => {
                if let Some(alias) = alias {
                    write!(f, "{alias}.")?;
                }
                f.write_str(name)?;
                write_args(f, args)
            }
            Self::ArrayIndex { name, index, .. } => write!(f, "{name}[{index}]"),
            Self::KeyAccess { name, key, .. } => write!(f, "{name}[{key}]"),
            Self::Dot {
                root, expression, ..
            } => {
                write_operand(f, root)?;
                write!(f, ".{expression}")
            }
            Self::FieldLink { index, .. } => write!(f, "::{index}"),
            Self::AllColumns { alias: None, .. } => f.write_str("*"),
            Self::AllColumns {
                alias: Some(alias), ..
            } => write!(f, "{alias}.*"),
        }
    }
}

// ---------------------------------------------------------------------------
// DESC, TABLE, COUPLE
// ---------------------------------------------------------------------------

impl fmt::Display for DescStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("desc ")?;
        if self.kind == DescKind::Functions {
            f.write_str("functions ")?;
        }
        f.write_str(&self.schema)?;
        if let Some(method) = &self.method {
            write!(f, ".{method}")?;
        }
        if let Some(args) = &self.args {
            write_args(f, args)?;
        }
        if let Some(column) = &self.column {
            f.write_str(" column ")?;
            write_ident(f, column)?;
        }
        Ok(())
    }
}

impl fmt::Display for CreateTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("table ")?;
        write_ident(f, &self.name)?;
        f.write_str(" { ")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_ident(f, &column.name)?;
            f.write_str(" ")?;
            write_string(f, &column.type_name)?;
        }
        f.write_str(" }")
    }
}

impl fmt::Display for Couple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "couple {}.{} with table {} as {}",
            self.schema, self.method, self.table, self.alias
        )
    }
}

// ---------------------------------------------------------------------------
// Schema definitions
// ---------------------------------------------------------------------------

impl fmt::Display for Endianness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Little => "le",
            Self::Big => "be",
        })
    }
}

impl fmt::Display for StringEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Utf8 => "utf8",
            Self::Ascii => "ascii",
        })
    }
}

impl fmt::Display for TextMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Until(d) => {
                f.write_str("until ")?;
                write_string(f, d)
            }
            Self::Between(open, close) => {
                f.write_str("between ")?;
                write_string(f, open)?;
                f.write_str(" ")?;
                write_string(f, close)
            }
            Self::Pattern(p) => {
                f.write_str("pattern ")?;
                write_string(f, p)
            }
            Self::Literal(l) => {
                f.write_str("literal ")?;
                write_string(f, l)
            }
            Self::Token => f.write_str("token"),
            Self::Whitespace => f.write_str("whitespace"),
            Self::Rest => f.write_str("rest"),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive { ty, endianness } => {
                f.write_str(ty.as_str())?;
                if let Some(e) = endianness {
                    write!(f, " {e}")?;
                }
                Ok(())
            }
            Self::Array { element, length } => match element.as_ref() {
                Self::Primitive { ty, endianness } => {
                    write!(f, "{}[{length}]", ty.as_str())?;
                    if let Some(e) = endianness {
                        write!(f, " {e}")?;
                    }
                    Ok(())
                }
                other => write!(f, "{other}[{length}]"),
            },
            Self::String { length, encoding } => {
                write!(f, "string[{length}]")?;
                if let Some(e) = encoding {
                    write!(f, " {e}")?;
                }
                Ok(())
            }
            Self::Reference(name) => f.write_str(name),
            Self::Text { matcher, trim } => {
                write!(f, "{matcher}")?;
                if *trim {
                    f.write_str(" trim")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for SchemaDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SchemaKind::Binary => "binary",
            SchemaKind::Text => "text",
        };
        write!(f, "{kind} {} {{ ", self.name)?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", field.name, field.ty)?;
        }
        f.write_str(" }")
    }
}
