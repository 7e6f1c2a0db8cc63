//! Error type, diagnostics and source spans for the TabQL front end.
//!
//! Every other crate in the workspace reports problems through
//! [`TabqlError`]. Lexical problems are carried as a [`Diagnostic`] so that
//! recovery mode can collect the very same records instead of aborting.

mod diagnostic;
mod span;

pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, context_snippet};
pub use span::TextSpan;

use thiserror::Error;

/// Primary error type for TabQL parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TabqlError {
    /// A token the grammar did not expect at this point.
    #[error("syntax error at {span}: {message} (got {token}, after '{context}')")]
    Syntax {
        message: String,
        /// Kind of the offending token.
        token: String,
        span: TextSpan,
        /// Recently resolved query text preceding the offending token.
        context: String,
    },

    /// Unknown character or unterminated string literal.
    #[error("{0}")]
    Lexical(Diagnostic),

    /// Expression or query nesting exceeded the configured depth.
    #[error("nesting deeper than {max} levels at {span}")]
    NestingTooDeep { max: usize, span: TextSpan },

    /// The caller handed in something that is not a query at all.
    #[error("invalid configuration: {reason}")]
    Configuration { reason: String },

    /// Internal consistency check on an argument failed.
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },
}

/// Coarse error classification, stable across message wording changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    Syntax,
    Lexical,
    TooDeep,
    Configuration,
    InvalidArgument,
}

impl TabqlError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Syntax { .. } => ErrorCode::Syntax,
            Self::Lexical(_) => ErrorCode::Lexical,
            Self::NestingTooDeep { .. } => ErrorCode::TooDeep,
            Self::Configuration { .. } => ErrorCode::Configuration,
            Self::InvalidArgument { .. } => ErrorCode::InvalidArgument,
        }
    }

    /// Source location of the problem, when there is one.
    #[must_use]
    pub const fn span(&self) -> Option<TextSpan> {
        match self {
            Self::Syntax { span, .. } | Self::NestingTooDeep { span, .. } => Some(*span),
            Self::Lexical(d) => Some(d.span),
            Self::Configuration { .. } | Self::InvalidArgument { .. } => None,
        }
    }

    /// Diagnostic code for errors that map onto one.
    #[must_use]
    pub const fn diagnostic_code(&self) -> Option<DiagnosticCode> {
        match self {
            Self::Lexical(d) => Some(d.code),
            Self::Syntax { .. } => Some(DiagnosticCode::UnexpectedToken),
            _ => None,
        }
    }

    /// Errors caused by the query text itself, as opposed to caller bugs.
    #[must_use]
    pub const fn is_query_error(&self) -> bool {
        matches!(
            self,
            Self::Syntax { .. } | Self::Lexical(_) | Self::NestingTooDeep { .. }
        )
    }

    pub fn syntax(
        message: impl Into<String>,
        token: impl Into<String>,
        span: TextSpan,
        context: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            token: token.into(),
            span,
            context: context.into(),
        }
    }

    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }
}

/// Result type alias using [`TabqlError`].
pub type Result<T> = std::result::Result<T, TabqlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display() {
        let err = TabqlError::syntax(
            "unnecessary comma after SELECT",
            "Comma",
            TextSpan::new(7, 1),
            "select",
        );
        let msg = err.to_string();
        assert!(msg.contains("7..8"));
        assert!(msg.contains("unnecessary comma after SELECT"));
        assert!(msg.contains("Comma"));
        assert!(msg.contains("'select'"));
    }

    #[test]
    fn lexical_error_wraps_diagnostic() {
        let d = Diagnostic::error(
            DiagnosticCode::UnknownCharacter,
            "unknown character '?'",
            TextSpan::new(2, 1),
            "a ? b",
        );
        let err = TabqlError::Lexical(d.clone());
        assert_eq!(err.to_string(), d.to_string());
        assert_eq!(err.span(), Some(TextSpan::new(2, 1)));
        assert_eq!(
            err.diagnostic_code(),
            Some(DiagnosticCode::UnknownCharacter)
        );
    }

    #[test]
    fn error_code_mapping() {
        assert_eq!(
            TabqlError::configuration("empty").error_code(),
            ErrorCode::Configuration
        );
        assert_eq!(
            TabqlError::invalid_argument("range").error_code(),
            ErrorCode::InvalidArgument
        );
        let deep = TabqlError::NestingTooDeep {
            max: 4,
            span: TextSpan::ZERO,
        };
        assert_eq!(deep.error_code(), ErrorCode::TooDeep);
        assert!(deep.is_query_error());
        assert!(!TabqlError::configuration("x").is_query_error());
        assert_eq!(TabqlError::configuration("x").span(), None);
    }
}
