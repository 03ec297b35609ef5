//! Compiler
//!
//! Scope analysis and lowering of ECMAScript syntax trees into a
//! control-flow-graph IR.
//!
//! # Pipeline
//!
//! ```text
//! AST ──► ScopeAnalyzer ──► EnvironmentTree ──► Lowerer ──► ir::Module
//! ```
//!
//! Both passes share one `ErrorSink`; once it holds an error, lowering turns
//! into a no-op and the module must be discarded.

pub mod diagnostic;
pub mod error;
pub mod ir;
pub mod lower;
pub mod options;
pub mod scope;

pub use diagnostic::{Diagnostic, ErrorCode};
pub use error::{CompileError, CompileErrors, ErrorSink, HostError};
pub use ir::{FunctionId, Module};
pub use lower::Lowerer;
pub use options::{CompilationMode, CompileOptions};
pub use scope::{EnvironmentTree, ScopeAnalyzer};

use crate::ast::{Function, Program};

/// Code generator: runs analysis and lowering into a caller-owned module
pub struct Codegen {
    options: CompileOptions,
    errors: ErrorSink,
}

impl Codegen {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            errors: ErrorSink::new(),
        }
    }

    /// Compile a program into `module`, returning the id of its `%entry`
    /// function.
    ///
    /// In non-strict Global and Eval code `inherited_locals` are declared
    /// alongside the program's own variables.
    pub fn generate_from_program(
        &mut self,
        module: &mut Module,
        program: &Program,
        source: &str,
        mode: CompilationMode,
        inherited_locals: &[String],
    ) -> Option<FunctionId> {
        let envs = ScopeAnalyzer::new(source, &self.options, &mut self.errors)
            .analyze_program(program, mode);
        if self.errors.has_error() {
            return None;
        }

        let root = Lowerer::new(module, &envs, &self.options, &mut self.errors)
            .lower_program(program, inherited_locals);
        module.root = root;
        log::debug!(
            "generated {} function(s) for `{}` ({} error(s))",
            module.function_count(),
            module.file_name,
            self.errors.errors().len()
        );
        root
    }

    /// Compile a lone function expression into `module`
    pub fn generate_from_function_expression(
        &mut self,
        module: &mut Module,
        function: &Function,
        source: &str,
    ) -> Option<FunctionId> {
        let envs = ScopeAnalyzer::new(source, &self.options, &mut self.errors)
            .analyze_function_expression(function);
        if self.errors.has_error() {
            return None;
        }

        let root = Lowerer::new(module, &envs, &self.options, &mut self.errors)
            .lower_function_expression(function);
        module.root = root;
        root
    }

    pub fn has_error(&self) -> bool {
        self.errors.has_error()
    }

    /// Errors in the order they were recorded
    pub fn errors(&self) -> &[CompileError] {
        self.errors.errors()
    }

    /// Errors translated into host-level records
    pub fn host_errors(&self) -> Vec<HostError> {
        self.errors
            .errors()
            .iter()
            .map(|e| {
                HostError::from_error(e, &self.options.file_name, self.options.file_name_is_url)
            })
            .collect()
    }

    pub fn into_errors(self) -> Vec<CompileError> {
        self.errors.into_errors()
    }
}

/// Compile a program with the given options
pub fn compile(
    program: &Program,
    source: &str,
    options: &CompileOptions,
) -> Result<Module, CompileErrors> {
    let mut module = Module::new(options.file_name.clone());
    let mut codegen = Codegen::new(options.clone());
    codegen.generate_from_program(
        &mut module,
        program,
        source,
        options.mode,
        &options.inherited_locals,
    );

    if codegen.has_error() {
        return Err(CompileErrors(codegen.into_errors()));
    }
    Ok(module)
}

/// Compile a lone function expression with the given options
pub fn compile_function(
    function: &Function,
    source: &str,
    options: &CompileOptions,
) -> Result<Module, CompileErrors> {
    let mut module = Module::new(options.file_name.clone());
    let mut codegen = Codegen::new(options.clone());
    codegen.generate_from_function_expression(&mut module, function, source);

    if codegen.has_error() {
        return Err(CompileErrors(codegen.into_errors()));
    }
    Ok(module)
}
