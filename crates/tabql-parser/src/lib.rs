// TabQL lexer and parser.
//
// A pull-based lexer with a switchable schema context, feeding a hand-written
// recursive descent parser with binding-power climbing for arithmetic.
// Produces the tree defined in `tabql-ast`.

pub mod classifier;
pub mod expr;
pub mod keywords;
pub mod lexer;
pub mod metrics;
pub mod options;
pub mod parser;
mod schema;
pub mod token;
mod token_factory;

pub use expr::parse_expr;
pub use lexer::{Lexer, tokenize};
pub use metrics::{ParseMetricsSnapshot, parse_metrics_snapshot, reset_parse_metrics};
pub use options::{DEFAULT_MAX_DEPTH, LexerOptions, ParserOptions};
pub use parser::{Parser, parse};
pub use token::{KeyAccessKey, SchemaKeyword, Token, TokenKind};
