//! jscfg Compiler - ECMAScript AST to Control-Flow-Graph IR
//!
//! This crate takes a parsed ECMAScript 5 syntax tree, resolves every name
//! against its lexical environment, and lowers each function into basic
//! blocks of three-address style IR for an external backend.

pub mod ast;
pub mod compiler;
pub mod interner;

pub use compiler::{
    compile, compile_function, CompilationMode, Codegen, CompileError, CompileErrors,
    CompileOptions, HostError,
};
pub use interner::{Interner, Symbol};

// Re-export IR types for convenience
pub use compiler::ir::{
    BasicBlock, BasicBlockId, Builtin, Expr, Function, FunctionId, Module, PrettyPrint, Stmt,
};
