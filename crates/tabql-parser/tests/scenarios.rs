//! End-to-end parses of complete statements.

use tabql_ast::visit::walk_from;
use tabql_ast::{
    BinaryOperator, Expr, FromClause, FromSource, Literal, Program, SetExpr, SetOperator,
    Statement, Visitable, Visitor,
};
use tabql_error::{DiagnosticCode, TabqlError};
use tabql_parser::{
    LexerOptions, Parser, ParserOptions, TokenKind, parse, parse_metrics_snapshot, tokenize,
};

fn program(query: &str) -> Program {
    match parse(query) {
        Ok(program) => program,
        Err(err) => unreachable!("parse error for `{query}`: {err}"),
    }
}

fn single_query(query: &str) -> tabql_ast::Query {
    let mut program = program(query);
    match program.statements.remove(0) {
        Statement::Query(SetExpr::Single(q)) => *q,
        other => unreachable!("expected a single query, got {other:?}"),
    }
}

fn int(expr: &Expr) -> &str {
    match expr {
        Expr::Literal(Literal::Integer(lit), _) => &lit.digits,
        other => unreachable!("expected an integer literal, got {other:?}"),
    }
}

#[derive(Default)]
struct FromPositions(Vec<u32>);

impl Visitor for FromPositions {
    fn visit_from(&mut self, from: &FromClause) {
        self.0.push(from.position);
        walk_from(self, from);
    }
}

fn from_positions(query: &str) -> Vec<u32> {
    let mut visitor = FromPositions::default();
    program(query).accept(&mut visitor);
    visitor.0
}

// ---------------------------------------------------------------------------
// Reference scenarios
// ---------------------------------------------------------------------------

#[test]
fn multiplication_nests_under_addition() {
    let q = single_query("select 1+2*3 from #a.b()");
    let Expr::Binary {
        op: BinaryOperator::Add,
        left,
        right,
        ..
    } = &q.select.fields[0].expression
    else {
        unreachable!("expected Add at the root");
    };
    assert_eq!(int(left), "1");
    let Expr::Binary {
        op: BinaryOperator::Star,
        left,
        right,
        ..
    } = right.as_ref()
    else {
        unreachable!("expected Star on the right");
    };
    assert_eq!((int(left), int(right)), ("2", "3"));

    let FromSource::Schema(source) = &q.from.source else {
        unreachable!("expected a schema source");
    };
    assert_eq!(source.schema, "#a");
    assert_eq!(source.method, "b");
    assert!(source.args.is_empty());
}

#[test]
fn where_wraps_negated_null_test() {
    let q = single_query("select Name from #A.Entities() where Name is not null");
    let where_clause = q.where_clause.expect("where clause");
    let Expr::IsNull { expr, negated, .. } = where_clause.expression else {
        unreachable!("expected IS NULL");
    };
    assert!(negated);
    assert!(matches!(*expr, Expr::Column { ref name, .. } if name == "Name"));
}

#[test]
fn group_by_with_having() {
    let q = single_query(
        "select Country, City from #A.Entities() group by Country, City having Count(City) > 1",
    );
    let group_by = q.group_by.expect("group by");
    assert_eq!(group_by.fields.len(), 2);
    let having = group_by.having.expect("having");
    let Expr::Binary {
        op: BinaryOperator::Greater,
        left,
        ..
    } = having.expression
    else {
        unreachable!("expected a comparison");
    };
    assert!(matches!(*left, Expr::MethodCall { ref name, .. } if name == "Count"));
}

#[test]
fn union_with_key_list() {
    let mut program = program(
        "select Country from #A.Entities() union (Country) select Country from #B.Entities()",
    );
    let Statement::Query(SetExpr::Operation(op)) = program.statements.remove(0) else {
        unreachable!("expected a union");
    };
    assert_eq!(op.kind, SetOperator::Union);
    assert_eq!(op.keys, vec!["Country"]);
    assert_eq!(op.nesting_level, 0);
}

#[test]
fn union_without_keys_matches_positionally() {
    let mut program = program("select a from #A.x() union select a from #B.y()");
    let Statement::Query(SetExpr::Operation(op)) = program.statements.remove(0) else {
        unreachable!("expected a union");
    };
    assert!(op.keys.is_empty());
}

#[test]
fn cte_outer_query_reads_named_source() {
    let mut program = program("with p as (select City from #A.Entities()) select City from p");
    let Statement::Cte(cte) = program.statements.remove(0) else {
        unreachable!("expected a CTE");
    };
    assert_eq!(cte.inner.len(), 1);
    assert_eq!(cte.inner[0].name, "p");
    let SetExpr::Single(outer) = cte.outer else {
        unreachable!("expected a single outer query");
    };
    assert!(matches!(&outer.from.source, FromSource::Named(n) if n.name == "p"));
}

#[test]
fn comma_after_select_is_rejected() {
    let err = parse("select , Name from #A.Entities()").expect_err("must fail");
    let TabqlError::Syntax {
        message, token, ..
    } = err
    else {
        unreachable!("expected a syntax error");
    };
    assert_eq!(message, "unnecessary comma after SELECT");
    assert_eq!(token, "Comma");
}

// ---------------------------------------------------------------------------
// Structural properties
// ---------------------------------------------------------------------------

#[test]
fn from_positions_follow_source_order() {
    assert_eq!(
        from_positions(
            "with p as (select a from #x.y()), q as (select a from p) \
             select a from q union select a from #x.z()"
        ),
        vec![0, 1, 2, 3]
    );
    assert_eq!(
        from_positions("select a from #x.y(); from #x.z() select b"),
        vec![0, 1]
    );
}

#[test]
fn aliases_do_not_leak_between_sibling_queries() {
    let mut program = program(
        "select 1 from #s.a() a cross apply a.Items() i \
         union select 1 from a.Items() i",
    );
    let Statement::Query(SetExpr::Operation(op)) = program.statements.remove(0) else {
        unreachable!("expected a union");
    };
    let (SetExpr::Single(left), SetExpr::Single(right)) = (op.left.as_ref(), op.right.as_ref())
    else {
        unreachable!("expected two single queries");
    };
    let FromSource::Applies(apply) = &left.from.source else {
        unreachable!("expected an apply chain");
    };
    assert!(matches!(apply.right, FromSource::AliasMethod(_)));
    assert!(matches!(
        &right.from.source,
        FromSource::Schema(s) if s.schema == "#a" && s.method == "Items"
    ));
}

#[test]
fn keyword_after_dot_is_a_member() {
    let q = single_query("select x.end, x.select from #s.a() x");
    let members: Vec<_> = q
        .select
        .fields
        .iter()
        .map(|f| match &f.expression {
            Expr::Dot { expression, .. } => match expression.as_ref() {
                Expr::Property { name, .. } => name.clone(),
                other => unreachable!("expected a property, got {other:?}"),
            },
            other => unreachable!("expected a dot, got {other:?}"),
        })
        .collect();
    assert_eq!(members, vec!["end", "select"]);
}

#[test]
fn skip_and_take_work_as_both_clause_and_function() {
    let q = single_query("select Take(Name, 2) from #s.a() skip 1 take 2");
    assert!(matches!(
        &q.select.fields[0].expression,
        Expr::MethodCall { name, args, .. } if name == "Take" && args.len() == 2
    ));
    assert_eq!(q.skip.map(|s| s.value), Some(1));
    assert_eq!(q.take.map(|t| t.value), Some(2));
}

#[test]
fn schema_definition_then_query() {
    let program = program(
        "binary Header { Size: int le, Body: byte[Size] }; \
         select h.Size from #bin.file('a.bin', 'Header') h",
    );
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(
        &program.statements[0],
        Statement::SchemaDefinition(def) if def.fields.len() == 2
    ));
}

#[test]
fn whitespace_tokens_are_ignored_by_the_parser() {
    let options = ParserOptions {
        skip_whitespace: false,
        ..ParserOptions::default()
    };
    let mut parser = Parser::new("select  a\n from\t#s.b()", options).expect("parser");
    let program = parser.parse().expect("parse");
    assert_eq!(program.to_string(), "select a from #s.b()");
}

// ---------------------------------------------------------------------------
// Errors and recovery
// ---------------------------------------------------------------------------

#[test]
fn syntax_error_reports_position_and_context() {
    let err = parse("select a from #s.b() where a = = 1").expect_err("must fail");
    assert_eq!(err.span().map(|s| s.start), Some(31));
    let TabqlError::Syntax { context, token, .. } = err else {
        unreachable!("expected a syntax error");
    };
    assert_eq!(token, "Equality");
    assert!(context.ends_with("where a = ="), "context was {context:?}");
}

#[test]
fn lexical_error_aborts_by_default() {
    let err = parse("select a € from #s.b()").expect_err("must fail");
    assert!(matches!(
        err,
        TabqlError::Lexical(ref d) if d.code == DiagnosticCode::UnknownCharacter
    ));
}

#[test]
fn recovery_mode_collects_diagnostics() {
    let options = LexerOptions {
        recover: true,
        ..LexerOptions::default()
    };
    let tokens = tokenize("select 'open from t", options).expect("tokenize");
    assert!(tokens
        .iter()
        .any(|t| matches!(t.kind, TokenKind::Error(_))));

    let options = ParserOptions {
        recover_lexical_errors: true,
        ..ParserOptions::default()
    };
    let mut parser = Parser::new("select a from #s.b() where a = 'open", options).expect("parser");
    assert!(matches!(parser.parse(), Err(TabqlError::Syntax { .. })));
    let codes: Vec<_> = parser.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![DiagnosticCode::UnterminatedString]);
}

#[test]
fn empty_input_is_a_configuration_error() {
    assert!(matches!(parse(""), Err(TabqlError::Configuration { .. })));
    assert!(matches!(parse(" \n\t"), Err(TabqlError::Configuration { .. })));
}

// ---------------------------------------------------------------------------
// Rendering and ambient behavior
// ---------------------------------------------------------------------------

#[test]
fn rendering_round_trips() {
    for query in [
        "select a + 1 as Total, b from #s.m(1, 'x') t where a > 2 order by b desc take 3",
        "from #s.m() t group by t.Country select t.Country, Count(t.City)",
        "with p as (select a from #x.y()) select a from p",
        "select a.Name from #s.a() a inner join #s.b() b on a.Id = b.Id",
        "desc functions #os.files",
        "table Items { Id 'System.Int32' }",
        "couple #csv.file with table Items as Source",
        "text Line { Word: token trim, Tail: rest }",
    ] {
        let first = program(query).to_string();
        let second = program(&first).to_string();
        assert_eq!(first, second, "rendering of `{query}` is not stable");
    }
}

#[test]
fn metrics_advance_with_parses() {
    let before = parse_metrics_snapshot();
    program("select a from #s.b()");
    let _ = parse("select , a from #s.b()");
    let after = parse_metrics_snapshot();
    assert!(after.tabql_programs_parsed_total > before.tabql_programs_parsed_total);
    assert!(after.tabql_syntax_errors_total > before.tabql_syntax_errors_total);
    assert!(after.tabql_tokens_total >= before.tabql_tokens_total + 5);
}

#[test]
fn parse_under_debug_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
    let program = program("binary H { A: int }; select a from #s.b()");
    assert_eq!(program.statements.len(), 2);
}
