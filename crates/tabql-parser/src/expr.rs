// Expression parsing.
//
// Tiers, loosest to tightest:
//   OR
//   AND
//   NOT (prefix)
//   = <> > >= < <= [NOT] LIKE [NOT] RLIKE IS [NOT] NULL [NOT] IN CONTAINS
//   arithmetic, by binding power (all left-associative):
//     |   ^   &   << >>   + -   * / %   . (member access)
//   unary -
//   primary
//
// The logical and comparison tiers are separate functions; only the
// arithmetic tier is table driven.

use tabql_ast::{BinaryOperator, Expr, IntegerLiteral, Literal, TextSpan};
use tabql_error::Result;

use crate::lexer::Lexer;
use crate::options::ParserOptions;
use crate::parser::Parser;
use crate::token::{KeyAccessKey, TokenKind};

// Binding powers for the arithmetic tier: higher binds tighter.
mod bp {
    pub const BIT_OR: u8 = 1;
    pub const BIT_XOR: u8 = 2;
    pub const BIT_AND: u8 = 3;
    pub const SHIFT: u8 = 4;
    pub const ADD: u8 = 5;
    pub const MUL: u8 = 6;
    pub const MEMBER: u8 = 7;
    // Unary minus takes member access into its operand and nothing else.
    pub const UNARY: u8 = MEMBER;
}

/// An infix operator of the arithmetic tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Infix {
    Binary(BinaryOperator),
    /// `.`: the right side is a member, not an expression.
    Member,
}

fn infix_bp(kind: &TokenKind) -> Option<(Infix, u8)> {
    let entry = match kind {
        TokenKind::Pipe => (Infix::Binary(BinaryOperator::BitOr), bp::BIT_OR),
        TokenKind::Caret => (Infix::Binary(BinaryOperator::BitXor), bp::BIT_XOR),
        TokenKind::Ampersand => (Infix::Binary(BinaryOperator::BitAnd), bp::BIT_AND),
        TokenKind::ShiftLeft => (Infix::Binary(BinaryOperator::ShiftLeft), bp::SHIFT),
        TokenKind::ShiftRight => (Infix::Binary(BinaryOperator::ShiftRight), bp::SHIFT),
        TokenKind::Plus => (Infix::Binary(BinaryOperator::Add), bp::ADD),
        TokenKind::Minus => (Infix::Binary(BinaryOperator::Subtract), bp::ADD),
        TokenKind::Star => (Infix::Binary(BinaryOperator::Star), bp::MUL),
        TokenKind::Slash => (Infix::Binary(BinaryOperator::Divide), bp::MUL),
        TokenKind::Percent => (Infix::Binary(BinaryOperator::Modulo), bp::MUL),
        TokenKind::Dot => (Infix::Member, bp::MEMBER),
        _ => return None,
    };
    Some(entry)
}

const fn comparison_operator(kind: &TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::Equality => BinaryOperator::Equality,
        TokenKind::Diff => BinaryOperator::Diff,
        TokenKind::Greater => BinaryOperator::Greater,
        TokenKind::GreaterEqual => BinaryOperator::GreaterOrEqual,
        TokenKind::Less => BinaryOperator::Less,
        TokenKind::LessEqual => BinaryOperator::LessOrEqual,
        TokenKind::Like => BinaryOperator::Like,
        TokenKind::NotLike => BinaryOperator::NotLike,
        TokenKind::RLike => BinaryOperator::RLike,
        TokenKind::NotRLike => BinaryOperator::NotRLike,
        _ => return None,
    };
    Some(op)
}

impl Parser<'_> {
    /// Parse one expression.
    ///
    /// # Errors
    ///
    /// A syntax error at the first token that cannot continue the
    /// expression, or [`tabql_error::TabqlError::NestingTooDeep`].
    pub fn parse_expr(&mut self) -> Result<Expr> {
        self.enter()?;
        let result = self.parse_or();
        self.leave();
        result
    }

    // ── Logical tiers ────────────────────────────────────────────────────

    fn parse_or(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_and()?;
        while self.eat(&TokenKind::Or)? {
            let rhs = self.parse_and()?;
            lhs = Expr::binary(BinaryOperator::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_not()?;
        while self.eat(&TokenKind::And)? {
            let rhs = self.parse_not()?;
            lhs = Expr::binary(BinaryOperator::And, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if !self.check(&TokenKind::Not) {
            return self.parse_comparison();
        }
        let start = self.current.span.start;
        self.advance()?;
        self.enter()?;
        let operand = self.parse_not();
        self.leave();
        Ok(Expr::Not {
            expr: Box::new(operand?),
            span: self.span_from(start),
        })
    }

    fn parse_comparison(&mut self) -> Result<Expr> {
        let mut lhs = self.parse_arith(0)?;
        loop {
            let start = lhs.span().start;
            match self.current.kind {
                TokenKind::Is => {
                    self.advance()?;
                    let negated = self.eat(&TokenKind::Not)?;
                    self.expect(&TokenKind::Null, "NULL after IS")?;
                    lhs = Expr::IsNull {
                        expr: Box::new(lhs),
                        negated,
                        span: self.span_from(start),
                    };
                }
                TokenKind::In | TokenKind::NotIn => {
                    let negated = self.check(&TokenKind::NotIn);
                    self.advance()?;
                    let values = self.parse_args()?;
                    lhs = Expr::In {
                        expr: Box::new(lhs),
                        values,
                        negated,
                        span: self.span_from(start),
                    };
                }
                TokenKind::Contains => {
                    self.advance()?;
                    let values = self.parse_args()?;
                    lhs = Expr::Contains {
                        expr: Box::new(lhs),
                        values,
                        span: self.span_from(start),
                    };
                }
                _ => {
                    let Some(op) = comparison_operator(&self.current.kind) else {
                        break;
                    };
                    self.advance()?;
                    let rhs = self.parse_arith(0)?;
                    lhs = Expr::binary(op, lhs, rhs);
                }
            }
        }
        Ok(lhs)
    }

    // ── Arithmetic tier ──────────────────────────────────────────────────

    fn parse_arith(&mut self, min_bp: u8) -> Result<Expr> {
        let mut lhs = self.parse_unary()?;
        while let Some((infix, l_bp)) = infix_bp(&self.current.kind) {
            if l_bp < min_bp {
                break;
            }
            self.advance()?;
            lhs = match infix {
                Infix::Binary(op) => {
                    let rhs = self.parse_arith(l_bp + 1)?;
                    Expr::binary(op, lhs, rhs)
                }
                Infix::Member => {
                    let member = self.parse_member()?;
                    let span = lhs.span().merge(member.span());
                    Expr::Dot {
                        root: Box::new(lhs),
                        expression: Box::new(member),
                        span,
                    }
                }
            };
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if !self.check(&TokenKind::Minus) {
            return self.parse_primary();
        }
        let start = self.current.span.start;
        self.advance()?;
        self.enter()?;
        let operand = self.parse_arith(bp::UNARY);
        self.leave();
        Ok(Expr::Negate {
            expr: Box::new(operand?),
            span: self.span_from(start),
        })
    }

    /// The right side of a `.`.
    fn parse_member(&mut self) -> Result<Expr> {
        let start = self.current.span.start;
        let span = self.current.span;
        match self.current.kind.clone() {
            TokenKind::Property(name) => {
                self.advance()?;
                Ok(Expr::Property { name, span })
            }
            TokenKind::Function(name) => {
                self.advance()?;
                let args = self.parse_args()?;
                Ok(Expr::MethodCall {
                    alias: None,
                    name,
                    args,
                    span: self.span_from(start),
                })
            }
            TokenKind::ArrayIndex { name, index } => {
                self.advance()?;
                Ok(Expr::ArrayIndex { name, index, span })
            }
            TokenKind::KeyAccess { name, key } => {
                self.advance()?;
                self.key_access(name, &key, span)
            }
            _ => Err(self.err_expected("a member name after '.'")),
        }
    }

    // ── Primary ──────────────────────────────────────────────────────────

    fn parse_primary(&mut self) -> Result<Expr> {
        let start = self.current.span.start;
        let span = self.current.span;
        let literal = match self.current.kind.clone() {
            TokenKind::Integer { digits, suffix } => {
                Some(Literal::Integer(IntegerLiteral::new(digits, suffix)))
            }
            TokenKind::Decimal(text) => Some(Literal::Decimal(text)),
            TokenKind::Hexadecimal(digits) => Some(Literal::Hexadecimal(digits)),
            TokenKind::Binary(digits) => Some(Literal::Binary(digits)),
            TokenKind::Octal(digits) => Some(Literal::Octal(digits)),
            TokenKind::StringLiteral(value) => Some(Literal::String(value)),
            TokenKind::True => Some(Literal::Boolean(true)),
            TokenKind::False => Some(Literal::Boolean(false)),
            TokenKind::Null => Some(Literal::Null),
            _ => None,
        };
        if let Some(literal) = literal {
            self.advance()?;
            return Ok(Expr::Literal(literal, span));
        }

        match self.current.kind.clone() {
            TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => {
                self.advance()?;
                Ok(Expr::Column { name, span })
            }
            TokenKind::Function(name) => {
                self.advance()?;
                let args = self.parse_args()?;
                Ok(Expr::MethodCall {
                    alias: None,
                    name,
                    args,
                    span: self.span_from(start),
                })
            }
            TokenKind::MethodAccess { alias, method } => {
                self.advance()?;
                let args = self.parse_args()?;
                Ok(Expr::MethodCall {
                    alias: Some(alias),
                    name: method,
                    args,
                    span: self.span_from(start),
                })
            }
            TokenKind::ArrayIndex { name, index } => {
                self.advance()?;
                Ok(Expr::ArrayIndex { name, index, span })
            }
            TokenKind::KeyAccess { name, key } => {
                self.advance()?;
                self.key_access(name, &key, span)
            }
            TokenKind::AliasedStar(alias) => {
                self.advance()?;
                Ok(Expr::AllColumns {
                    alias: Some(alias),
                    span,
                })
            }
            TokenKind::Star => {
                self.advance()?;
                Ok(Expr::AllColumns { alias: None, span })
            }
            TokenKind::FieldLink(index) => {
                self.advance()?;
                Ok(Expr::FieldLink { index, span })
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RightParen, "')' after expression")?;
                Ok(inner)
            }
            TokenKind::Case => self.parse_case(),
            _ => Err(self.err_expected("an expression")),
        }
    }

    /// `(expr, ...)`, possibly empty.
    pub(crate) fn parse_args(&mut self) -> Result<Vec<Expr>> {
        self.expect(&TokenKind::LeftParen, "'('")?;
        let mut args = Vec::new();
        if self.eat(&TokenKind::RightParen)? {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RightParen, "')' after arguments")?;
        Ok(args)
    }

    fn parse_case(&mut self) -> Result<Expr> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Case, "CASE")?;

        let mut when_then = Vec::new();
        while self.eat(&TokenKind::When)? {
            let condition = self.parse_expr()?;
            self.expect(&TokenKind::Then, "THEN in CASE expression")?;
            let result = self.parse_expr()?;
            when_then.push((condition, result));
        }
        if when_then.is_empty() {
            return Err(self.err_msg("CASE requires at least one WHEN"));
        }
        if !self.eat(&TokenKind::Else)? {
            return Err(self.err_msg("CASE requires ELSE"));
        }
        let else_expr = self.parse_expr()?;
        if !self.eat(&TokenKind::End)? {
            return Err(self.err_msg("CASE requires END"));
        }

        Ok(Expr::Case {
            when_then,
            else_expr: Box::new(else_expr),
            span: self.span_from(start),
        })
    }

    /// `name['key']` or `name[expr]`. An expression key is parsed by a
    /// sub-parser over the bracket contents.
    fn key_access(&mut self, name: String, key: &KeyAccessKey, span: TextSpan) -> Result<Expr> {
        let key = match key {
            KeyAccessKey::Literal(value) => {
                let inner = TextSpan::new(
                    span.start + name.len() + 1,
                    span.length.saturating_sub(name.len() + 2),
                );
                Expr::Literal(Literal::String(value.clone()), inner)
            }
            KeyAccessKey::Expression(inner) => self.parse_key_expression(*inner)?,
        };
        Ok(Expr::KeyAccess {
            name,
            key: Box::new(key),
            span,
        })
    }

    fn parse_key_expression(&mut self, inner: TextSpan) -> Result<Expr> {
        let lexer = Lexer::over_range(
            self.source,
            inner.start,
            inner.end(),
            self.options.lexer_options(),
        )?;
        let mut sub = Parser::with_lexer(self.source, lexer, self.options, self.depth)?;
        let expr = sub.parse_expr()?;
        if !sub.check(&TokenKind::Eof) {
            return Err(sub.err_expected("']' after key expression"));
        }
        self.diagnostics.append(&mut sub.diagnostics);
        self.diagnostics.append(&mut sub.lexer.take_diagnostics());
        Ok(expr)
    }
}

/// Parse a standalone expression such as `a + 1`.
///
/// # Errors
///
/// A syntax error when `text` is not exactly one expression.
pub fn parse_expr(text: &str) -> Result<Expr> {
    let mut parser = Parser::new(text, ParserOptions::default())?;
    let expr = parser.parse_expr()?;
    if !parser.check(&TokenKind::Eof) {
        return Err(parser.err_expected("end of expression"));
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use tabql_error::TabqlError;

    use super::*;

    fn parse(text: &str) -> Expr {
        match parse_expr(text) {
            Ok(expr) => expr,
            Err(err) => unreachable!("parse error for `{text}`: {err}"),
        }
    }

    fn render(text: &str) -> String {
        parse(text).to_string()
    }

    fn syntax_message(text: &str) -> String {
        match parse_expr(text) {
            Err(TabqlError::Syntax { message, .. }) => message,
            other => unreachable!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_mul_binds_tighter_than_add() {
        let expr = parse("1 + 2 * 3");
        let Expr::Binary {
            op: BinaryOperator::Add,
            right,
            ..
        } = &expr
        else {
            unreachable!("expected Add at the root, got {expr:?}");
        };
        assert!(matches!(
            right.as_ref(),
            Expr::Binary {
                op: BinaryOperator::Star,
                ..
            }
        ));
        assert_eq!(expr.to_string(), "1 + (2 * 3)");
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(render("1 - 2 - 3"), "(1 - 2) - 3");
        assert_eq!(render("8 / 4 % 3"), "(8 / 4) % 3");
    }

    #[test]
    fn test_bitwise_levels() {
        assert_eq!(render("a | b ^ c & d << 1 + 2"), "a | (b ^ (c & (d << (1 + 2))))");
    }

    #[test]
    fn test_logical_tiers_above_arithmetic() {
        assert_eq!(
            render("a + 1 > b and c = 2 or not d < 3"),
            "(((a + 1) > b) and (c = 2)) or (not (d < 3))"
        );
    }

    #[test]
    fn test_is_null_and_negation() {
        let expr = parse("Name is not null");
        assert!(matches!(
            expr,
            Expr::IsNull {
                negated: true,
                ..
            }
        ));
        assert_eq!(render("a is null"), "a is null");
    }

    #[test]
    fn test_membership_predicates() {
        assert_eq!(render("a in (1, 2)"), "a in (1, 2)");
        assert_eq!(render("a not in ('x')"), "a not in ('x')");
        assert_eq!(render("Tags contains ('a', 'b')"), "Tags contains ('a', 'b')");
        assert_eq!(render("a not like 'x%'"), "a not like 'x%'");
        assert_eq!(render("a rlike '^x'"), "a rlike '^x'");
    }

    #[test]
    fn test_case_expression() {
        let expr = parse("case when a > 1 then 'big' when a > 0 then 'small' else 'none' end");
        let Expr::Case { when_then, .. } = &expr else {
            unreachable!("expected CASE");
        };
        assert_eq!(when_then.len(), 2);
        assert_eq!(
            expr.to_string(),
            "case when a > 1 then 'big' when a > 0 then 'small' else 'none' end"
        );
    }

    #[test]
    fn test_case_requires_else_and_end() {
        assert_eq!(
            syntax_message("case when a then 1 end"),
            "CASE requires ELSE"
        );
        assert_eq!(
            syntax_message("case when a then 1 else 2"),
            "CASE requires END"
        );
        assert_eq!(
            syntax_message("case else 2 end"),
            "CASE requires at least one WHEN"
        );
    }

    #[test]
    fn test_member_access_chain() {
        let expr = parse("a.b.Count()");
        let Expr::Dot {
            root, expression, ..
        } = &expr
        else {
            unreachable!("expected Dot, got {expr:?}");
        };
        assert!(matches!(expression.as_ref(), Expr::MethodCall { name, .. } if name == "Count"));
        assert!(matches!(root.as_ref(), Expr::Dot { .. }));
        assert_eq!(expr.to_string(), "a.b.Count()");
    }

    #[test]
    fn test_keyword_member_is_property() {
        assert_eq!(render("a.end + 1"), "a.end + 1");
    }

    #[test]
    fn test_method_calls() {
        let expr = parse("x.Format(a, 'y')");
        assert!(matches!(
            &expr,
            Expr::MethodCall { alias: Some(alias), name, args, .. }
                if alias == "x" && name == "Format" && args.len() == 2
        ));
        assert_eq!(render("Count(*)"), "Count(*)");
        assert_eq!(render("Now()"), "Now()");
    }

    #[test]
    fn test_indexing() {
        assert!(matches!(parse("Items[3]"), Expr::ArrayIndex { index: 3, .. }));
        let expr = parse("Map['k']");
        let Expr::KeyAccess { key, .. } = &expr else {
            unreachable!("expected key access");
        };
        assert!(matches!(key.as_ref(), Expr::Literal(Literal::String(s), _) if s == "k"));
        assert_eq!(render("Map[a + 1]"), "Map[a + 1]");
    }

    #[test]
    fn test_key_access_with_bracket_in_literal_or_nested_index() {
        let expr = parse("Map['a]b']");
        let Expr::KeyAccess { key, .. } = &expr else {
            unreachable!("expected key access");
        };
        assert!(matches!(key.as_ref(), Expr::Literal(Literal::String(s), _) if s == "a]b"));

        let expr = parse("Map[Items[0]]");
        let Expr::KeyAccess { key, .. } = &expr else {
            unreachable!("expected key access");
        };
        assert!(matches!(key.as_ref(), Expr::ArrayIndex { name, index: 0, .. } if name == "Items"));
        assert_eq!(expr.to_string(), "Map[Items[0]]");
    }

    #[test]
    fn test_key_expression_spans_are_absolute() {
        let expr = parse("Map[a + 1]");
        let Expr::KeyAccess { key, .. } = &expr else {
            unreachable!("expected key access");
        };
        assert_eq!(key.span(), TextSpan::new(4, 5));
    }

    #[test]
    fn test_unary_minus() {
        assert!(matches!(parse("-a"), Expr::Negate { .. }));
        assert_eq!(render("-a.b * 2"), "(-(a.b)) * 2");
        assert!(matches!(
            parse("-5"),
            Expr::Literal(Literal::Integer(lit), _) if lit.digits == "-5"
        ));
    }

    #[test]
    fn test_parentheses_and_field_links() {
        assert_eq!(render("(1 + 2) * 3"), "(1 + 2) * 3");
        assert_eq!(render("::1 + ::2"), "::1 + ::2");
        assert_eq!(render("t.*"), "t.*");
    }

    #[test]
    fn test_spans_cover_operands() {
        let expr = parse("ab + cd");
        assert_eq!(expr.span(), TextSpan::new(0, 7));
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert_eq!(syntax_message("a b"), "expected end of expression");
    }

    #[test]
    fn test_nesting_limit() {
        let options = ParserOptions {
            max_depth: 8,
            ..ParserOptions::default()
        };
        let text = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        let mut parser = Parser::new(&text, options).expect("parser");
        assert!(matches!(
            parser.parse_expr(),
            Err(TabqlError::NestingTooDeep { max: 8, .. })
        ));
        let mut parser = Parser::new("((1))", options).expect("parser");
        assert!(parser.parse_expr().is_ok());
    }
}
