//! Diagnostic rendering for compile errors
//!
//! Turns recorded `CompileError`s into codespan diagnostics with stable error
//! codes, rendered against the source text or serialized as JSON.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, LabelStyle, Severity};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use serde::{Deserialize, Serialize};

use crate::ast::Span;
use crate::compiler::error::CompileError;

/// Error code for a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub fn as_str(&self) -> &str {
        self.0
    }
}

/// A diagnostic message with source code context
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
    code: Option<ErrorCode>,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            inner: CsDiagnostic::new(severity).with_message(message),
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self.inner = self.inner.with_code(code.0);
        self
    }

    /// Add the primary label (main error location)
    pub fn with_primary_label(
        mut self,
        file_id: usize,
        span: Span,
        message: impl Into<String>,
    ) -> Self {
        let label = Label::primary(file_id, span.start..span.end).with_message(message);
        self.inner.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.inner.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.inner.notes.push(format!("help: {}", help.into()));
        self
    }

    /// Create a diagnostic from a recorded compile error
    pub fn from_compile_error(error: &CompileError, file_id: usize) -> Self {
        let span = error.span();
        let (kind, label) = match error {
            CompileError::Syntax { .. } => ("SyntaxError", "invalid syntax"),
            CompileError::Reference { .. } => ("ReferenceError", "invalid reference"),
        };
        let code = error_code(error);

        let mut diag = Diagnostic::error(format!("{}: {}", kind, error.message())).with_code(code);
        // Errors without a real location (nesting guard) get no label
        if !span.is_empty() {
            diag = diag.with_primary_label(file_id, span, label);
        }
        diag = diag.with_note(format!("at line {}, column {}", span.line, span.column));

        match code.0 {
            "E1003" => diag.with_help("rename one of the parameters"),
            "E1007" => diag.with_help("break and continue must name an enclosing statement"),
            "E2001" | "E2002" => {
                diag.with_help("only variables and property accesses can be assigned")
            }
            _ => diag,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Emit the diagnostic to stderr with colors
    pub fn emit(
        &self,
        files: &SimpleFiles<String, String>,
    ) -> Result<(), codespan_reporting::files::Error> {
        let mut writer = StandardStream::stderr(ColorChoice::Auto);
        self.emit_to(&mut writer, files)
    }

    /// Emit the diagnostic to any color-capable writer
    pub fn emit_to(
        &self,
        writer: &mut dyn WriteColor,
        files: &SimpleFiles<String, String>,
    ) -> Result<(), codespan_reporting::files::Error> {
        let config = term::Config::default();
        term::emit(writer, &config, files, &self.inner)
    }

    /// Get the underlying codespan diagnostic
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }

    /// Convert to JSON representation for tool integration
    pub fn to_json(
        &self,
        files: &SimpleFiles<String, String>,
    ) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&JsonDiagnostic::from_diagnostic(self, files))
    }
}

/// JSON representation of a diagnostic
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub code: Option<String>,
    pub severity: String,
    pub message: String,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

/// JSON representation of a diagnostic label
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLabel {
    pub file: String,
    /// Start line (1-indexed)
    pub start_line: usize,
    /// Start column (1-indexed)
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
    pub message: Option<String>,
    /// "primary" or "secondary"
    pub style: String,
}

impl JsonDiagnostic {
    pub fn from_diagnostic(diag: &Diagnostic, files: &SimpleFiles<String, String>) -> Self {
        let severity = match diag.inner.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
            Severity::Bug => "bug",
        };

        let labels = diag
            .inner
            .labels
            .iter()
            .filter_map(|label| {
                let file = files.get(label.file_id).ok()?;
                let start = file.location((), label.range.start).ok()?;
                let end = file.location((), label.range.end).ok()?;
                Some(JsonLabel {
                    file: file.name().to_string(),
                    start_line: start.line_number,
                    start_column: start.column_number,
                    end_line: end.line_number,
                    end_column: end.column_number,
                    message: Some(label.message.clone()),
                    style: match label.style {
                        LabelStyle::Primary => "primary",
                        LabelStyle::Secondary => "secondary",
                    }
                    .to_string(),
                })
            })
            .collect();

        JsonDiagnostic {
            code: diag.code.map(|c| c.0.to_string()),
            severity: severity.to_string(),
            message: diag.inner.message.clone(),
            labels,
            notes: diag.inner.notes.clone(),
        }
    }
}

/// Stable code for a compile error: `E1xxx` for syntax errors, `E2xxx` for
/// reference errors
pub fn error_code(error: &CompileError) -> ErrorCode {
    let message = error.message();
    match error {
        CompileError::Syntax { .. } => {
            if message.starts_with("Unexpected strict mode reserved word") {
                ErrorCode("E1001")
            } else if message.contains("may not be eval or arguments")
                || message.contains("cannot be used as parameter name")
            {
                ErrorCode("E1002")
            } else if message.starts_with("Duplicate parameter name") {
                ErrorCode("E1003")
            } else if message.starts_with("conditional function or closure declaration") {
                ErrorCode("E1004")
            } else if message.starts_with("unexpected token") {
                ErrorCode("E1005")
            } else if message.starts_with("'with' statement") {
                ErrorCode("E1006")
            } else if message.starts_with("Break outside of loop")
                || message.starts_with("continue outside of loop")
                || message.starts_with("Undefined label")
            {
                ErrorCode("E1007")
            } else if message.starts_with("Label '") {
                ErrorCode("E1008")
            } else if message.starts_with("Return statement outside of function") {
                ErrorCode("E1009")
            } else if message.starts_with("Delete of an unqualified identifier") {
                ErrorCode("E1010")
            } else if message.starts_with("Illegal duplicate key") {
                ErrorCode("E1011")
            } else if message.starts_with("left-hand side of inplace operator") {
                ErrorCode("E1012")
            } else if message.starts_with("Maximum nesting depth exceeded") {
                ErrorCode("E1013")
            } else {
                ErrorCode("E1000")
            }
        }
        CompileError::Reference { .. } => {
            if message.starts_with("left-hand side of assignment operator") {
                ErrorCode("E2001")
            } else if message.starts_with("Prefix ++ operator")
                || message.starts_with("Invalid left-hand side expression in postfix")
            {
                ErrorCode("E2002")
            } else {
                ErrorCode("E2000")
            }
        }
    }
}

/// Helper to create a `SimpleFiles` instance holding one source file
pub fn create_files(
    name: impl Into<String>,
    source: impl Into<String>,
) -> (SimpleFiles<String, String>, usize) {
    let mut files = SimpleFiles::new();
    let id = files.add(name.into(), source.into());
    (files, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_by_kind() {
        let syntax = CompileError::syntax(Span::new(0, 5, 1, 1), "Break outside of loop");
        assert_eq!(error_code(&syntax), ErrorCode("E1007"));

        let reference = CompileError::reference(
            Span::new(0, 5, 1, 1),
            "left-hand side of assignment operator is not an lvalue",
        );
        assert_eq!(error_code(&reference), ErrorCode("E2001"));

        let other = CompileError::syntax(Span::default(), "something else");
        assert_eq!(error_code(&other), ErrorCode("E1000"));
    }

    #[test]
    fn test_duplicate_parameter_code() {
        let error = CompileError::syntax(
            Span::new(14, 15, 1, 15),
            "Duplicate parameter name 'a' is not allowed in strict mode",
        );
        let diag = Diagnostic::from_compile_error(&error, 0);
        assert_eq!(diag.code(), Some(ErrorCode("E1003")));
        assert!(diag.message().contains("SyntaxError"));
        assert_eq!(diag.inner().labels.len(), 1);
    }

    #[test]
    fn test_unlocated_error_has_no_label() {
        let error = CompileError::syntax(Span::default(), "Maximum nesting depth exceeded");
        let diag = Diagnostic::from_compile_error(&error, 0);
        assert!(diag.inner().labels.is_empty());
        assert_eq!(diag.code(), Some(ErrorCode("E1013")));
    }

    #[test]
    fn test_json_output() {
        let source = "x = 1;\n3 = y;";
        let error = CompileError::reference(
            Span::new(7, 12, 2, 1),
            "left-hand side of assignment operator is not an lvalue",
        );
        let (files, id) = create_files("test.js", source);
        let json = Diagnostic::from_compile_error(&error, id).to_json(&files).unwrap();

        assert!(json.contains("\"E2001\""));
        assert!(json.contains("\"start_line\": 2"));
        assert!(json.contains("\"primary\""));
    }

    #[test]
    fn test_emit_to_buffer() {
        let source = "break;";
        let error = CompileError::syntax(Span::new(0, 6, 1, 1), "Break outside of loop");
        let (files, id) = create_files("loop.js", source);
        let mut buffer = termcolor::Buffer::no_color();
        Diagnostic::from_compile_error(&error, id)
            .emit_to(&mut buffer, &files)
            .unwrap();
        let rendered = String::from_utf8(buffer.into_inner()).unwrap();
        assert!(rendered.contains("E1007"));
        assert!(rendered.contains("loop.js"));
    }
}
