//! Property tests over the lexer and parser.

use proptest::prelude::*;
use tabql_ast::visit::walk_from;
use tabql_ast::{FromClause, Visitable, Visitor};
use tabql_parser::{LexerOptions, TokenKind, parse, parse_expr, tokenize};

/// Comment-free fragments that each lex on their own when separated by
/// whitespace.
const FRAGMENTS: &[&str] = &[
    "abc", "x1", "Name", "_tmp", "42", "7l", "3.5", "0xff", "0b101", "'s'", "'a\\'b'", "+",
    "-", "*", "/", "%", "(", ")", ",", ";", "=", "<>", ">=", "<", "<<", "&", "|", "^", ".",
    "::2", "#os", "[My Col]", "select", "from", "where", "group", "by", "order", "union",
    "all", "left", "join", "end",
];

const SEPARATORS: &[&str] = &[" ", "  ", "\t", "\n", " \r\n "];

fn lexable_input() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (
            prop::sample::select(FRAGMENTS),
            prop::sample::select(SEPARATORS),
        ),
        1..24,
    )
    .prop_map(|parts| {
        let mut text = String::new();
        for (i, (fragment, separator)) in parts.into_iter().enumerate() {
            if i > 0 {
                text.push_str(separator);
            }
            text.push_str(fragment);
        }
        text
    })
}

const BINARY_OPS: &[&str] = &[
    "+", "-", "*", "/", "%", "&", "|", "^", "<<", ">>", "=", "<>", ">", ">=", "<", "<=", "and",
    "or", "like", "not like",
];

const COLUMNS: &[&str] = &["a", "b", "Name", "col_1", "x"];

const ATOMS: &[&str] = &["'s'", "'it\\'s'", "true", "null", "1.25", "::1"];

fn expr_text() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        prop::sample::select(COLUMNS).prop_map(str::to_owned),
        (0u32..1000).prop_map(|n| n.to_string()),
        prop::sample::select(ATOMS).prop_map(str::to_owned),
    ];
    leaf.prop_recursive(4, 48, 3, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(BINARY_OPS), inner.clone())
                .prop_map(|(l, op, r)| format!("({l}) {op} ({r})")),
            inner.clone().prop_map(|e| format!("-({e})")),
            inner.clone().prop_map(|e| format!("not ({e})")),
            inner.clone().prop_map(|e| format!("({e}) is not null")),
            (inner.clone(), inner.clone())
                .prop_map(|(e, v)| format!("({e}) in ({v}, 1)")),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(w, t, e)| format!("case when {w} then {t} else {e} end")),
            (inner.clone(), inner).prop_map(|(a, b)| format!("Fn({a}, {b})")),
        ]
    })
}

#[derive(Default)]
struct FromPositions(Vec<u32>);

impl Visitor for FromPositions {
    fn visit_from(&mut self, from: &FromClause) {
        self.0.push(from.position);
        walk_from(self, from);
    }
}

proptest! {
    #[test]
    fn token_spans_cover_input_exactly(input in lexable_input()) {
        let options = LexerOptions { skip_whitespace: false, recover: false };
        let tokens = tokenize(&input, options).expect("fragments always lex");
        let mut rebuilt = String::new();
        let mut cursor = 0;
        for token in &tokens {
            prop_assert_eq!(token.span.start, cursor, "gap before {:?}", token.kind);
            rebuilt.push_str(token.span.slice(&input));
            cursor = token.span.end();
        }
        prop_assert_eq!(rebuilt, input);
        prop_assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
    }

    #[test]
    fn expression_rendering_is_stable(text in expr_text()) {
        let first = parse_expr(&text).expect("generated expressions parse").to_string();
        let second = parse_expr(&first).expect("rendered expressions parse").to_string();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn from_positions_count_every_from(arms in 1usize..6) {
        let query = (0..arms)
            .map(|i| format!("select a from #s.t{i}()"))
            .collect::<Vec<_>>()
            .join(" union all ");
        let program = parse(&query).expect("union chain parses");
        let mut visitor = FromPositions::default();
        program.accept(&mut visitor);
        let expected: Vec<u32> = (0..arms as u32).collect();
        prop_assert_eq!(visitor.0, expected);
    }
}
