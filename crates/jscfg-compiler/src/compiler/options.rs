//! Compilation options

use serde::{Deserialize, Serialize};

/// How the code being compiled is evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompilationMode {
    /// Script at global scope; variables are named, not slotted
    #[default]
    Global,
    /// Code passed to `eval`; completion value is returned
    Eval,
    /// Function body; variables get frame slots
    Function,
    /// Single binding expression evaluated for its value
    #[serde(alias = "binding")]
    BindingExpression,
}

/// Options controlling one compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Mode of the outermost program
    pub mode: CompilationMode,

    /// Treat every scope as strict, with or without a directive
    pub strict: bool,

    /// File name recorded in the module and in host diagnostics
    pub file_name: String,

    /// `file_name` is already a URL
    pub file_name_is_url: bool,

    /// Mark every function as containing a direct eval
    pub debug_mode: bool,

    /// Deepest statement/expression nesting lowered before giving up
    pub max_nesting_depth: Option<usize>,

    /// Names visible from the calling scope (Global/Eval only)
    pub inherited_locals: Vec<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            mode: CompilationMode::Global,
            strict: false,
            file_name: String::new(),
            file_name_is_url: false,
            debug_mode: false,
            max_nesting_depth: None,
            inherited_locals: Vec::new(),
        }
    }
}

impl CompileOptions {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: CompilationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
