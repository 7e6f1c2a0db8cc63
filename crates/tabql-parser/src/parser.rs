// TabQL parser.
//
// Hand-written recursive descent over a pull-based token stream. The parser
// holds exactly one token and asks the lexer for the next one on demand, so
// the lexer's schema context can be switched between any two tokens.
// Expression parsing lives in expr.rs, the schema-definition sub-grammar in
// schema.rs.

use hashbrown::HashSet;
use tabql_ast::{
    AliasMethodSource, ApplyKind, ApplySource, Couple, CreateTable, CteExpression, CteInner,
    DescKind, DescStatement, Field, FromClause, FromSource, FunctionSource, GroupByClause,
    HavingClause, JoinKind, JoinSource, NamedSource, OrderByClause, OrderField, Program,
    PropertyChainSource, Query, QueryOrder, SchemaSource, SelectClause, SetExpr, SetOperation,
    SetOperator, SkipClause, SortDirection, Statement, TableColumn, TakeClause, TextSpan,
    WhereClause,
};
use tabql_error::{Diagnostic, Result, TabqlError};

use crate::lexer::Lexer;
use crate::metrics;
use crate::options::ParserOptions;
use crate::token::{Token, TokenKind};

/// Recursive descent parser over one query text.
pub struct Parser<'a> {
    pub(crate) source: &'a str,
    pub(crate) lexer: Lexer<'a>,
    pub(crate) current: Token,
    /// Token fetched ahead of time by the SKIP/TAKE reinterpretation,
    /// consumed before the lexer is asked again.
    override_slot: Option<Token>,
    /// End offset of the last consumed token.
    pub(crate) prev_end: usize,
    /// FROM aliases, one set per query being parsed.
    alias_scopes: Vec<HashSet<String>>,
    from_position: u32,
    pub(crate) depth: usize,
    pub(crate) options: ParserOptions,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    /// Create a parser and read the first token.
    ///
    /// # Errors
    ///
    /// [`TabqlError::Configuration`] for empty input, or a lexical error on
    /// the first token.
    pub fn new(query: &'a str, options: ParserOptions) -> Result<Self> {
        let lexer = Lexer::new(query, options.lexer_options())?;
        Self::with_lexer(query, lexer, options, 0)
    }

    pub(crate) fn with_lexer(
        source: &'a str,
        lexer: Lexer<'a>,
        options: ParserOptions,
        depth: usize,
    ) -> Result<Self> {
        let start = lexer.position();
        let mut parser = Self {
            source,
            lexer,
            current: Token::eof(start),
            override_slot: None,
            prev_end: start,
            alias_scopes: Vec::new(),
            from_position: 0,
            depth,
            options,
            diagnostics: Vec::new(),
        };
        parser.advance()?;
        parser.prev_end = start;
        Ok(parser)
    }

    /// Parse the whole input into a [`Program`].
    ///
    /// # Errors
    ///
    /// The first syntax error, lexical error (outside recovery mode) or
    /// nesting violation encountered.
    pub fn parse(&mut self) -> Result<Program> {
        let span = tracing::debug_span!(
            target: "tabql.parse",
            "parse_program",
            statements = tracing::field::Empty,
            tokens = tracing::field::Empty,
        );
        let _guard = span.enter();

        let result = self.parse_program();
        self.diagnostics.append(&mut self.lexer.take_diagnostics());

        span.record("tokens", self.lexer.tokens_resolved());
        match &result {
            Ok(program) => {
                span.record("statements", program.statements.len() as u64);
                metrics::record_program();
            }
            Err(err) => {
                if matches!(err, TabqlError::Syntax { .. }) {
                    metrics::record_syntax_error();
                }
                tracing::debug!(target: "tabql.parse", error = %err, "parse failed");
            }
        }
        result
    }

    /// Lexical diagnostics collected in recovery mode.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // -----------------------------------------------------------------------
    // Token navigation
    // -----------------------------------------------------------------------

    /// Move to the next token, applying the SKIP/TAKE reinterpretation.
    pub(crate) fn advance(&mut self) -> Result<()> {
        let next = match self.override_slot.take() {
            Some(token) => token,
            None => self.next_significant()?,
        };
        let next = if matches!(next.kind, TokenKind::Skip | TokenKind::Take)
            && !self.lexer.is_schema_context()
        {
            let after = self.next_significant()?;
            let reinterpreted = if after.kind == TokenKind::LeftParen {
                Token::new(
                    TokenKind::Function(next.span.slice(self.source).to_owned()),
                    next.span,
                )
            } else {
                next
            };
            self.override_slot = Some(after);
            reinterpreted
        } else {
            next
        };
        self.prev_end = self.current.span.end();
        self.current = next;
        Ok(())
    }

    /// Next lexer token that is not whitespace.
    fn next_significant(&mut self) -> Result<Token> {
        loop {
            let token = self.lexer.next_token()?;
            if token.kind != TokenKind::WhiteSpace {
                return Ok(token);
            }
        }
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.current.kind == *kind
    }

    pub(crate) fn eat(&mut self, kind: &TokenKind) -> Result<bool> {
        if self.check(kind) {
            self.advance()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<TextSpan> {
        if self.check(kind) {
            let span = self.current.span;
            self.advance()?;
            Ok(span)
        } else {
            Err(self.err_expected(what))
        }
    }

    /// A plain or bracket-quoted name.
    pub(crate) fn expect_name(&mut self, what: &str) -> Result<String> {
        match &self.current.kind {
            TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            _ => Err(self.err_expected(what)),
        }
    }

    /// Whether the current token is an identifier spelled `word`, in any
    /// case. Used for contextual words that are not reserved.
    fn check_word(&self, word: &str) -> bool {
        matches!(&self.current.kind, TokenKind::Identifier(w) if w.eq_ignore_ascii_case(word))
    }

    pub(crate) fn span_from(&self, start: usize) -> TextSpan {
        TextSpan::from_bounds(start, self.prev_end)
    }

    pub(crate) fn err_expected(&self, what: &str) -> TabqlError {
        self.err_msg(format!("expected {what}"))
    }

    pub(crate) fn err_msg(&self, message: impl Into<String>) -> TabqlError {
        TabqlError::syntax(
            message,
            self.current.kind.name(),
            self.current.span,
            self.lexer.already_resolved_query_part(),
        )
    }

    /// Guard one level of recursion.
    pub(crate) fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(TabqlError::NestingTooDeep {
                max: self.options.max_depth,
                span: self.current.span,
            });
        }
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Program and statements
    // -----------------------------------------------------------------------

    fn parse_program(&mut self) -> Result<Program> {
        let start = self.current.span.start;
        let mut statements = Vec::new();
        loop {
            statements.push(self.parse_statement()?);
            if self.eat(&TokenKind::Semicolon)? {
                if self.check(&TokenKind::Eof) {
                    break;
                }
                continue;
            }
            if self.check(&TokenKind::Eof) {
                break;
            }
            return Err(self.err_expected("';' or end of input"));
        }
        Ok(Program {
            statements,
            span: self.span_from(start),
        })
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        match &self.current.kind {
            TokenKind::Select | TokenKind::From => Ok(Statement::Query(self.parse_set_expr(0)?)),
            TokenKind::With => Ok(Statement::Cte(self.parse_cte()?)),
            TokenKind::Desc => Ok(Statement::Desc(self.parse_desc()?)),
            TokenKind::Table => Ok(Statement::CreateTable(self.parse_create_table()?)),
            TokenKind::Couple => Ok(Statement::Couple(self.parse_couple()?)),
            TokenKind::Identifier(word)
                if word.eq_ignore_ascii_case("binary") || word.eq_ignore_ascii_case("text") =>
            {
                Ok(Statement::SchemaDefinition(self.parse_schema_definition()?))
            }
            _ => Err(self.err_expected("a statement")),
        }
    }

    // -----------------------------------------------------------------------
    // Set operations and CTEs
    // -----------------------------------------------------------------------

    /// A query optionally followed by set operators. Right-recursive: the
    /// right operand sits one nesting level deeper.
    pub(crate) fn parse_set_expr(&mut self, level: u32) -> Result<SetExpr> {
        self.enter()?;
        let result = self.parse_set_expr_inner(level);
        self.leave();
        result
    }

    fn parse_set_expr_inner(&mut self, level: u32) -> Result<SetExpr> {
        let start = self.current.span.start;
        let left = SetExpr::Single(Box::new(self.parse_query()?));

        let kind = match self.current.kind {
            TokenKind::Union => SetOperator::Union,
            TokenKind::UnionAll => SetOperator::UnionAll,
            TokenKind::Except => SetOperator::Except,
            TokenKind::Intersect => SetOperator::Intersect,
            _ => return Ok(left),
        };
        self.advance()?;

        let keys = if self.eat(&TokenKind::LeftParen)? {
            self.parse_key_list()?
        } else {
            Vec::new()
        };
        let right = self.parse_set_expr(level + 1)?;

        Ok(SetExpr::Operation(SetOperation {
            kind,
            left: Box::new(left),
            right: Box::new(right),
            keys,
            nesting_level: level,
            span: self.span_from(start),
        }))
    }

    /// `(a, b)` after a set operator; the opening paren is consumed.
    fn parse_key_list(&mut self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        if self.eat(&TokenKind::RightParen)? {
            return Ok(keys);
        }
        loop {
            keys.push(self.expect_name("a key column")?);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RightParen, "')' after key columns")?;
        Ok(keys)
    }

    fn parse_cte(&mut self) -> Result<CteExpression> {
        let start = self.current.span.start;
        self.expect(&TokenKind::With, "WITH")?;
        let mut inner = Vec::new();
        loop {
            let arm_start = self.current.span.start;
            let name = self.expect_name("a CTE name")?;
            self.expect(&TokenKind::As, "AS after CTE name")?;
            self.expect(&TokenKind::LeftParen, "'(' before CTE query")?;
            let value = self.parse_set_expr(1)?;
            self.expect(&TokenKind::RightParen, "')' after CTE query")?;
            inner.push(CteInner {
                name,
                value,
                span: self.span_from(arm_start),
            });
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        if !matches!(self.current.kind, TokenKind::Select | TokenKind::From) {
            return Err(self.err_expected("a query after the CTE list"));
        }
        let outer = self.parse_set_expr(0)?;
        Ok(CteExpression {
            inner,
            outer,
            span: self.span_from(start),
        })
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    fn parse_query(&mut self) -> Result<Query> {
        self.alias_scopes.push(HashSet::new());
        let result = self.parse_query_inner();
        self.alias_scopes.pop();
        result
    }

    fn parse_query_inner(&mut self) -> Result<Query> {
        let start = self.current.span.start;
        let order = match self.current.kind {
            TokenKind::Select => QueryOrder::SelectFirst,
            TokenKind::From => QueryOrder::FromFirst,
            _ => return Err(self.err_expected("SELECT or FROM")),
        };

        let (select, from, where_clause, group_by) = match order {
            QueryOrder::SelectFirst => {
                let select = self.parse_select()?;
                if !self.check(&TokenKind::From) {
                    return Err(self.err_expected("FROM"));
                }
                let from = self.parse_from()?;
                let where_clause = self.parse_where()?;
                let group_by = self.parse_group_by()?;
                (select, from, where_clause, group_by)
            }
            QueryOrder::FromFirst => {
                let from = self.parse_from()?;
                let where_clause = self.parse_where()?;
                let group_by = self.parse_group_by()?;
                if !self.check(&TokenKind::Select) {
                    return Err(self.err_expected("SELECT"));
                }
                let select = self.parse_select()?;
                (select, from, where_clause, group_by)
            }
        };

        let order_by = self.parse_order_by()?;
        let skip = self.parse_skip()?;
        let take = self.parse_take()?;

        Ok(Query {
            order,
            select,
            from,
            where_clause,
            group_by,
            order_by,
            skip,
            take,
            span: self.span_from(start),
        })
    }

    fn parse_select(&mut self) -> Result<SelectClause> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Select, "SELECT")?;
        let distinct = self.eat(&TokenKind::Distinct)?;
        if self.check(&TokenKind::Comma) {
            return Err(self.err_msg("unnecessary comma after SELECT"));
        }
        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_field(fields.len())?);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
            if self.check(&TokenKind::From) {
                return Err(self.err_msg("unnecessary comma before FROM"));
            }
        }
        Ok(SelectClause {
            distinct,
            fields,
            span: self.span_from(start),
        })
    }

    /// An expression with an optional display alias.
    fn parse_field(&mut self, ordinal: usize) -> Result<Field> {
        let start = self.current.span.start;
        let expression = self.parse_expr()?;
        let alias = self.parse_field_alias()?;
        Ok(Field {
            expression,
            alias,
            ordinal,
            span: self.span_from(start),
        })
    }

    /// `AS name`, a bare trailing word or a bare quoted identifier. Empty
    /// when absent.
    fn parse_field_alias(&mut self) -> Result<String> {
        if self.eat(&TokenKind::As)? {
            return match &self.current.kind {
                TokenKind::Identifier(name)
                | TokenKind::QuotedIdentifier(name)
                | TokenKind::StringLiteral(name) => {
                    let name = name.clone();
                    self.advance()?;
                    Ok(name)
                }
                _ => Err(self.err_expected("an alias after AS")),
            };
        }
        match &self.current.kind {
            TokenKind::Identifier(name) | TokenKind::QuotedIdentifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            _ => Ok(String::new()),
        }
    }

    fn parse_where(&mut self) -> Result<Option<WhereClause>> {
        let start = self.current.span.start;
        if !self.eat(&TokenKind::Where)? {
            return Ok(None);
        }
        let expression = self.parse_expr()?;
        Ok(Some(WhereClause {
            expression,
            span: self.span_from(start),
        }))
    }

    fn parse_group_by(&mut self) -> Result<Option<GroupByClause>> {
        let start = self.current.span.start;
        if !self.eat(&TokenKind::GroupBy)? {
            return Ok(None);
        }
        if self.check(&TokenKind::Comma) {
            return Err(self.err_msg("dangling comma after GROUP BY"));
        }
        if ends_clause(&self.current.kind) {
            return Err(self.err_msg("empty GROUP BY"));
        }
        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_field(fields.len())?);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
            if ends_clause(&self.current.kind) {
                return Err(self.err_msg("dangling comma after GROUP BY"));
            }
        }

        let having_start = self.current.span.start;
        let having = if self.eat(&TokenKind::Having)? {
            let expression = self.parse_expr()?;
            Some(HavingClause {
                expression,
                span: self.span_from(having_start),
            })
        } else {
            None
        };

        Ok(Some(GroupByClause {
            fields,
            having,
            span: self.span_from(start),
        }))
    }

    fn parse_order_by(&mut self) -> Result<Option<OrderByClause>> {
        let start = self.current.span.start;
        if !self.eat(&TokenKind::OrderBy)? {
            return Ok(None);
        }
        let mut fields = Vec::new();
        loop {
            let field = self.parse_field(fields.len())?;
            let direction = if self.eat(&TokenKind::Desc)? {
                SortDirection::Descending
            } else {
                self.eat(&TokenKind::Asc)?;
                SortDirection::Ascending
            };
            fields.push(OrderField { field, direction });
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        Ok(Some(OrderByClause {
            fields,
            span: self.span_from(start),
        }))
    }

    fn parse_skip(&mut self) -> Result<Option<SkipClause>> {
        let start = self.current.span.start;
        if !self.eat(&TokenKind::Skip)? {
            return Ok(None);
        }
        let value = self.expect_count("a row count after SKIP")?;
        Ok(Some(SkipClause {
            value,
            span: self.span_from(start),
        }))
    }

    fn parse_take(&mut self) -> Result<Option<TakeClause>> {
        let start = self.current.span.start;
        if !self.eat(&TokenKind::Take)? {
            return Ok(None);
        }
        let value = self.expect_count("a row count after TAKE")?;
        Ok(Some(TakeClause {
            value,
            span: self.span_from(start),
        }))
    }

    fn expect_count(&mut self, what: &str) -> Result<i64> {
        let value = match &self.current.kind {
            TokenKind::Integer { digits, .. } => digits.parse::<i64>().ok(),
            _ => None,
        };
        match value {
            Some(v) if v >= 0 => {
                self.advance()?;
                Ok(v)
            }
            _ => Err(self.err_expected(what)),
        }
    }

    // -----------------------------------------------------------------------
    // FROM
    // -----------------------------------------------------------------------

    fn parse_from(&mut self) -> Result<FromClause> {
        let start = self.current.span.start;
        self.expect(&TokenKind::From, "FROM")?;
        let position = self.from_position;
        self.from_position += 1;

        let mut source = self.parse_from_source()?;
        loop {
            let link_start = source.span().start;
            let join = match self.current.kind {
                TokenKind::InnerJoin => Some(JoinKind::Inner),
                TokenKind::LeftOuterJoin => Some(JoinKind::LeftOuter),
                TokenKind::RightOuterJoin => Some(JoinKind::RightOuter),
                _ => None,
            };
            if let Some(kind) = join {
                self.advance()?;
                let right = self.parse_from_source()?;
                self.expect(&TokenKind::On, "ON after joined source")?;
                let condition = self.parse_expr()?;
                source = FromSource::Join(Box::new(JoinSource {
                    left: source,
                    right,
                    condition,
                    kind,
                    span: self.span_from(link_start),
                }));
                continue;
            }
            let apply = match self.current.kind {
                TokenKind::CrossApply => Some(ApplyKind::Cross),
                TokenKind::OuterApply => Some(ApplyKind::Outer),
                _ => None,
            };
            if let Some(kind) = apply {
                self.advance()?;
                let right = self.parse_from_source()?;
                source = FromSource::Apply(Box::new(ApplySource {
                    left: source,
                    right,
                    kind,
                    span: self.span_from(link_start),
                }));
                continue;
            }
            break;
        }

        let source = match source {
            FromSource::Join(join) => FromSource::Joins(join),
            FromSource::Apply(apply) => FromSource::Applies(apply),
            other => other,
        };

        Ok(FromClause {
            source,
            position,
            span: self.span_from(start),
        })
    }

    fn parse_from_source(&mut self) -> Result<FromSource> {
        let start = self.current.span.start;
        let source = match self.current.kind.clone() {
            TokenKind::Schema(schema) => {
                self.advance()?;
                self.expect(&TokenKind::Dot, "'.' after schema name")?;
                let TokenKind::Function(method) = self.current.kind.clone() else {
                    return Err(self.err_expected("a schema method call"));
                };
                self.advance()?;
                let args = self.parse_args()?;
                let alias = self.parse_source_alias()?;
                FromSource::Schema(SchemaSource {
                    schema,
                    method,
                    args,
                    alias,
                    span: self.span_from(start),
                })
            }
            TokenKind::Function(method) => {
                self.advance()?;
                let args = self.parse_args()?;
                let alias = self.parse_source_alias()?;
                FromSource::Function(FunctionSource {
                    method,
                    args,
                    alias,
                    span: self.span_from(start),
                })
            }
            TokenKind::MethodAccess { alias: owner, method } => {
                self.advance()?;
                let args = self.parse_args()?;
                let alias = self.parse_source_alias()?;
                if self.alias_in_scope(&owner) {
                    FromSource::AliasMethod(AliasMethodSource {
                        source_alias: owner,
                        method,
                        args,
                        alias,
                        span: self.span_from(start),
                    })
                } else {
                    FromSource::Schema(SchemaSource {
                        schema: format!("#{owner}"),
                        method,
                        args,
                        alias,
                        span: self.span_from(start),
                    })
                }
            }
            TokenKind::Identifier(name) => {
                self.advance()?;
                let mut properties = Vec::new();
                while self.eat(&TokenKind::Dot)? {
                    let TokenKind::Property(property) = self.current.kind.clone() else {
                        return Err(self.err_expected("a property name after '.'"));
                    };
                    self.advance()?;
                    properties.push(property);
                }
                let alias = self.parse_source_alias()?;
                if properties.is_empty() {
                    FromSource::Named(NamedSource {
                        name,
                        alias,
                        span: self.span_from(start),
                    })
                } else {
                    FromSource::PropertyChain(PropertyChainSource {
                        source_alias: name,
                        properties,
                        alias,
                        span: self.span_from(start),
                    })
                }
            }
            TokenKind::QuotedIdentifier(name) => {
                self.advance()?;
                let alias = self.parse_source_alias()?;
                FromSource::Named(NamedSource {
                    name,
                    alias,
                    span: self.span_from(start),
                })
            }
            _ => return Err(self.err_expected("a FROM source")),
        };

        if let Some(alias) = source.alias() {
            if !alias.is_empty() {
                let alias = alias.to_owned();
                if let Some(scope) = self.alias_scopes.last_mut() {
                    scope.insert(alias);
                }
            }
        }
        Ok(source)
    }

    /// Same forms as a field alias.
    fn parse_source_alias(&mut self) -> Result<String> {
        self.parse_field_alias()
    }

    fn alias_in_scope(&self, alias: &str) -> bool {
        self.alias_scopes
            .last()
            .is_some_and(|scope| scope.contains(alias))
    }

    // -----------------------------------------------------------------------
    // DESC, TABLE, COUPLE
    // -----------------------------------------------------------------------

    fn parse_desc(&mut self) -> Result<DescStatement> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Desc, "DESC")?;
        let functions = self.check_word("functions");
        if functions {
            self.advance()?;
        }

        let TokenKind::Schema(schema) = self.current.kind.clone() else {
            return Err(self.err_expected("a schema name"));
        };
        self.advance()?;

        let mut method = None;
        let mut args = None;
        if self.eat(&TokenKind::Dot)? {
            match self.current.kind.clone() {
                TokenKind::Function(name) => {
                    self.advance()?;
                    method = Some(name);
                    args = Some(self.parse_args()?);
                }
                TokenKind::Property(name) => {
                    self.advance()?;
                    method = Some(name);
                }
                _ => return Err(self.err_expected("a method name")),
            }
        }

        let mut column = None;
        if !functions && args.is_some() && self.check_word("column") {
            self.advance()?;
            column = Some(self.expect_name("a column name")?);
        }

        let kind = if functions {
            DescKind::Functions
        } else if column.is_some() {
            DescKind::Column
        } else if args.is_some() {
            DescKind::Constructor
        } else if method.is_some() {
            DescKind::Constructors
        } else {
            DescKind::Schema
        };

        Ok(DescStatement {
            kind,
            schema,
            method,
            args,
            column,
            span: self.span_from(start),
        })
    }

    fn parse_create_table(&mut self) -> Result<CreateTable> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Table, "TABLE")?;
        let name = self.expect_name("a table name")?;
        self.expect(&TokenKind::LeftCurly, "'{' after table name")?;

        let mut columns = Vec::new();
        while !self.check(&TokenKind::RightCurly) {
            let column_start = self.current.span.start;
            let column_name = match &self.current.kind {
                TokenKind::Identifier(n) | TokenKind::QuotedIdentifier(n) => n.clone(),
                _ => return Err(self.err_expected("a column name")),
            };
            let type_name = self.parse_column_type()?;
            columns.push(TableColumn {
                name: column_name,
                type_name,
                span: self.span_from(column_start),
            });
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RightCurly, "'}' after table columns")?;

        Ok(CreateTable {
            name,
            columns,
            span: self.span_from(start),
        })
    }

    /// Type of a table column, read while the column name is still current.
    /// An unquoted dotted type name is scanned directly from the source; a
    /// quoted one comes through as a string literal.
    fn parse_column_type(&mut self) -> Result<String> {
        if self.override_slot.is_none() {
            let scanned = self.lexer.next_of(type_name_len, |text, span| {
                Token::new(TokenKind::Identifier(text.to_owned()), span)
            });
            if let Some(token) = scanned {
                let type_name = token.span.slice(self.source).to_owned();
                self.prev_end = self.current.span.end();
                self.current = token;
                self.advance()?;
                return Ok(type_name);
            }
        }
        self.advance()?;
        let TokenKind::StringLiteral(type_name) = self.current.kind.clone() else {
            return Err(self.err_expected("a column type"));
        };
        self.advance()?;
        Ok(type_name)
    }

    fn parse_couple(&mut self) -> Result<Couple> {
        let start = self.current.span.start;
        self.expect(&TokenKind::Couple, "COUPLE")?;
        let TokenKind::Schema(schema) = self.current.kind.clone() else {
            return Err(self.err_expected("a schema name"));
        };
        self.advance()?;
        self.expect(&TokenKind::Dot, "'.' after schema name")?;
        let TokenKind::Property(method) = self.current.kind.clone() else {
            return Err(self.err_expected("a method name"));
        };
        self.advance()?;
        self.expect(&TokenKind::With, "WITH")?;
        self.expect(&TokenKind::Table, "TABLE")?;
        let table = self.expect_name("a table name")?;
        self.expect(&TokenKind::As, "AS")?;
        let alias = self.expect_name("an alias")?;
        Ok(Couple {
            schema,
            method,
            table,
            alias,
            span: self.span_from(start),
        })
    }
}

/// Tokens after which a clause has nothing more to read.
const fn ends_clause(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Having
            | TokenKind::Select
            | TokenKind::From
            | TokenKind::Where
            | TokenKind::OrderBy
            | TokenKind::Skip
            | TokenKind::Take
            | TokenKind::Union
            | TokenKind::UnionAll
            | TokenKind::Except
            | TokenKind::Intersect
            | TokenKind::RightParen
            | TokenKind::Semicolon
            | TokenKind::Eof
    )
}

/// Length of an unquoted column type such as `System.Int32`,
/// `Namespace.Type[]` or `int?`.
fn type_name_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let first = *bytes.first()?;
    if !(first.is_ascii_alphabetic() || first == b'_') {
        return None;
    }
    let mut len = 1 + bytes[1..]
        .iter()
        .take_while(|&&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
        .count();
    if bytes[len..].starts_with(b"[]") {
        len += 2;
    }
    if bytes.get(len) == Some(&b'?') {
        len += 1;
    }
    Some(len)
}

/// Parse `query` with default options.
///
/// # Errors
///
/// See [`Parser::parse`].
pub fn parse(query: &str) -> Result<Program> {
    Parser::new(query, ParserOptions::default())?.parse()
}
