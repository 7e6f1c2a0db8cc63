//! Lexer and parser configuration.
//!
//! Both option structs deserialize with `#[serde(default)]`, so an embedder
//! can load a partial JSON or TOML table and get defaults for the rest.

use serde::{Deserialize, Serialize};

/// Default limit on expression and query nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerOptions {
    /// Drop whitespace tokens instead of returning them. Comments are
    /// always dropped.
    pub skip_whitespace: bool,
    /// Record lexical errors as diagnostics and return an error token
    /// instead of failing.
    pub recover: bool,
}

impl Default for LexerOptions {
    fn default() -> Self {
        Self {
            skip_whitespace: true,
            recover: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Passed to the lexer. The parser ignores whitespace tokens either way.
    pub skip_whitespace: bool,
    /// Passed to the lexer as [`LexerOptions::recover`]. Syntax errors still
    /// abort the parse.
    pub recover_lexical_errors: bool,
    /// Nesting limit for expressions and set operations.
    pub max_depth: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            skip_whitespace: true,
            recover_lexical_errors: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserOptions {
    #[must_use]
    pub const fn lexer_options(&self) -> LexerOptions {
        LexerOptions {
            skip_whitespace: self.skip_whitespace,
            recover: self.recover_lexical_errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let lexer = LexerOptions::default();
        assert!(lexer.skip_whitespace);
        assert!(!lexer.recover);
        let parser = ParserOptions::default();
        assert_eq!(parser.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(parser.lexer_options(), lexer);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let opts: ParserOptions =
            serde_json::from_str(r#"{"recover_lexical_errors": true}"#).expect("valid json");
        assert!(opts.recover_lexical_errors);
        assert!(opts.skip_whitespace);
        assert_eq!(opts.max_depth, DEFAULT_MAX_DEPTH);
        assert!(opts.lexer_options().recover);
    }

    #[test]
    fn test_options_round_trip_json() {
        let opts = ParserOptions {
            skip_whitespace: false,
            recover_lexical_errors: true,
            max_depth: 8,
        };
        let json = serde_json::to_string(&opts).expect("serialize");
        let back: ParserOptions = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, opts);
    }
}
