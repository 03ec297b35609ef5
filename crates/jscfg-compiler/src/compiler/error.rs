//! Compilation errors
//!
//! Errors are collected, not thrown: the lowering context records each one in
//! an `ErrorSink` and every entry point turns into a no-op once the sink has
//! seen an error.

use crate::ast::Span;
use std::path::Path;
use thiserror::Error;

/// A single compile-time error with its source location
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CompileError {
    #[error("SyntaxError: {message}")]
    Syntax { message: String, span: Span },

    #[error("ReferenceError: {message}")]
    Reference { message: String, span: Span },
}

impl CompileError {
    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        CompileError::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn reference(span: Span, message: impl Into<String>) -> Self {
        CompileError::Reference {
            message: message.into(),
            span,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CompileError::Syntax { message, .. } | CompileError::Reference { message, .. } => {
                message
            }
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileError::Syntax { span, .. } | CompileError::Reference { span, .. } => *span,
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, CompileError::Syntax { .. })
    }
}

/// All errors of a failed compilation, in the order they were found
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{} compile error(s), first: {}", .0.len(), first_message(.0))]
pub struct CompileErrors(pub Vec<CompileError>);

fn first_message(errors: &[CompileError]) -> String {
    errors.first().map(ToString::to_string).unwrap_or_default()
}

impl CompileErrors {
    pub fn first(&self) -> Option<&CompileError> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CompileError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Error record in the shape an embedding host reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostError {
    pub url: String,
    pub line: u32,
    pub column: u32,
    pub description: String,
}

impl HostError {
    pub fn from_error(error: &CompileError, file_name: &str, file_name_is_url: bool) -> Self {
        let span = error.span();
        Self {
            url: file_url(file_name, file_name_is_url),
            line: span.line,
            column: span.column,
            description: error.message().to_string(),
        }
    }
}

/// URL of a source file for host diagnostics
pub fn file_url(file_name: &str, is_url: bool) -> String {
    if is_url || file_name.is_empty() {
        file_name.to_string()
    } else if Path::new(file_name).is_absolute() {
        format!("file://{}", file_name)
    } else {
        format!("file:{}", file_name)
    }
}

/// Ordered error list plus the "stop emitting" flag
#[derive(Debug, Default, Clone)]
pub struct ErrorSink {
    errors: Vec<CompileError>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn push(&mut self, error: CompileError) {
        log::warn!("{} at {}", error, error.span());
        self.errors.push(error);
    }

    pub fn syntax(&mut self, span: Span, message: impl Into<String>) {
        self.push(CompileError::syntax(span, message));
    }

    pub fn reference(&mut self, span: Span, message: impl Into<String>) {
        self.push(CompileError::reference(span, message));
    }

    pub fn errors(&self) -> &[CompileError] {
        &self.errors
    }

    pub fn extend(&mut self, other: ErrorSink) {
        self.errors.extend(other.errors);
    }

    pub fn into_errors(self) -> Vec<CompileError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sink_keeps_order() {
        let mut sink = ErrorSink::new();
        assert!(!sink.has_error());
        sink.syntax(Span::default(), "first");
        sink.reference(Span::default(), "second");
        assert!(sink.has_error());

        let messages: Vec<_> = sink.errors().iter().map(CompileError::message).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert!(sink.errors()[0].is_syntax());
        assert!(!sink.errors()[1].is_syntax());
    }

    #[test]
    fn test_display() {
        let err = CompileError::syntax(Span::default(), "Break outside of loop");
        assert_eq!(err.to_string(), "SyntaxError: Break outside of loop");
        let all = CompileErrors(vec![err]);
        assert_eq!(
            all.to_string(),
            "1 compile error(s), first: SyntaxError: Break outside of loop"
        );
    }

    #[test]
    fn test_file_url() {
        assert_eq!(file_url("/tmp/a.js", false), "file:///tmp/a.js");
        assert_eq!(file_url("a.js", false), "file:a.js");
        assert_eq!(file_url("qrc:/a.js", true), "qrc:/a.js");
        assert_eq!(file_url("", false), "");
    }

    #[test]
    fn test_host_error_location() {
        let err = CompileError::reference(Span::new(4, 5, 3, 7), "bad");
        let host = HostError::from_error(&err, "/x.js", false);
        assert_eq!(host.url, "file:///x.js");
        assert_eq!((host.line, host.column), (3, 7));
        assert_eq!(host.description, "bad");
    }
}
