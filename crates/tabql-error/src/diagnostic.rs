//! Diagnostic records produced while scanning and parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TextSpan;

/// Stable diagnostic codes.
///
/// Lexical problems live in the `TQL1xxx` range, syntactic ones in
/// `TQL2xxx`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    /// A character that cannot start any token.
    UnknownCharacter,
    /// A string literal with no closing quote.
    UnterminatedString,
    /// A token the grammar did not expect.
    UnexpectedToken,
}

impl DiagnosticCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownCharacter => "TQL1001",
            Self::UnterminatedString => "TQL1002",
            Self::UnexpectedToken => "TQL2001",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        })
    }
}

/// One reported problem: what, how bad, where, and the text around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub message: String,
    pub span: TextSpan,
    /// Short excerpt of the source surrounding `span`.
    pub context: String,
}

impl Diagnostic {
    /// Number of bytes of source kept on either side of the span.
    pub const CONTEXT_RADIUS: usize = 16;

    #[must_use]
    pub fn error(
        code: DiagnosticCode,
        message: impl Into<String>,
        span: TextSpan,
        source: &str,
    ) -> Self {
        Self {
            code,
            severity: Severity::Error,
            message: message.into(),
            span,
            context: context_snippet(source, span, Self::CONTEXT_RADIUS),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} at {}: {}",
            self.severity, self.code, self.span, self.message
        )?;
        if !self.context.is_empty() {
            write!(f, " (near '{}')", self.context)?;
        }
        Ok(())
    }
}

/// Cut `radius` bytes around `span` out of `source`, widened to character
/// boundaries.
#[must_use]
pub fn context_snippet(source: &str, span: TextSpan, radius: usize) -> String {
    let mut start = span.start.saturating_sub(radius).min(source.len());
    while start > 0 && !source.is_char_boundary(start) {
        start -= 1;
    }
    let mut end = span.end().saturating_add(radius).min(source.len());
    while end < source.len() && !source.is_char_boundary(end) {
        end += 1;
    }
    source[start..end].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_strings_are_stable() {
        assert_eq!(DiagnosticCode::UnknownCharacter.as_str(), "TQL1001");
        assert_eq!(DiagnosticCode::UnterminatedString.as_str(), "TQL1002");
        assert_eq!(DiagnosticCode::UnexpectedToken.to_string(), "TQL2001");
    }

    #[test]
    fn test_context_snippet_clamps_to_source() {
        let src = "select 'abc from x";
        let snippet = context_snippet(src, TextSpan::new(7, 4), 3);
        assert_eq!(snippet, "ct 'abc fr");
        assert_eq!(context_snippet(src, TextSpan::new(0, 1), 100), src);
    }

    #[test]
    fn test_context_snippet_respects_char_boundaries() {
        let src = "ééé ? ééé";
        let snippet = context_snippet(src, TextSpan::new(7, 1), 2);
        assert!(snippet.contains('?'));
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::error(
            DiagnosticCode::UnknownCharacter,
            "unknown character '?'",
            TextSpan::new(7, 1),
            "select ? from x",
        );
        let rendered = d.to_string();
        assert!(rendered.starts_with("error TQL1001 at 7..8"));
        assert!(rendered.contains("unknown character"));
    }

    #[test]
    fn test_diagnostic_serializes() {
        let d = Diagnostic::error(
            DiagnosticCode::UnterminatedString,
            "unterminated string literal",
            TextSpan::new(0, 3),
            "'ab",
        );
        let json = serde_json::to_string(&d).expect("serialize");
        assert!(json.contains("UnterminatedString"));
        let back: Diagnostic = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, d);
    }
}
