//! Scope and closure analysis
//!
//! - `environment` - Environment model and the arena holding it
//! - `analyzer` - The pre-pass that builds environments from the tree

pub mod analyzer;
pub mod environment;

pub use analyzer::ScopeAnalyzer;
pub use environment::{ArgumentsUsage, EnvId, Environment, EnvironmentTree, Member, MemberKind};

use crate::ast::Program;
use crate::compiler::error::{CompileError, ErrorSink};
use crate::compiler::options::{CompilationMode, CompileOptions};

/// Analyze a program on its own, returning its environments and any errors
pub fn analyze<'a>(
    program: &'a Program,
    source: &'a str,
    mode: CompilationMode,
) -> (EnvironmentTree<'a>, Vec<CompileError>) {
    let mut errors = ErrorSink::new();
    let options = CompileOptions::default().with_mode(mode);
    let tree = ScopeAnalyzer::new(source, &options, &mut errors).analyze_program(program, mode);
    (tree, errors.into_errors())
}
