//! Intermediate Representation (IR)
//!
//! The IR is the hand-off point between lowering and an external backend. It
//! is a control-flow graph of basic blocks holding three-address style
//! statements.
//!
//! # Structure
//!
//! - `Module` - Top-level container with functions and shared tables
//! - `Function` - Formals, locals, flags and basic blocks
//! - `BasicBlock` - Statements ending in exactly one terminator
//! - `Stmt` - Move, expression statement, jump, conditional jump, return
//! - `Expr` - Shallow expression trees over temps, slots and names

pub mod block;
pub mod builtin;
pub mod expr;
pub mod function;
pub mod module;
pub mod pretty;
pub mod stmt;
pub mod visit;

pub use block::{BasicBlock, BasicBlockId};
pub use builtin::Builtin;
pub use expr::{ArgLocal, ArgLocalKind, BinaryOp, Const, Expr, TempId, UnaryOp};
pub use function::Function;
pub use module::{ClassId, FunctionId, JsClass, JsClassMember, Module, RegExpId, RegExpLiteral};
pub use pretty::{format_expr, format_stmt, pretty_print_function, PrettyPrint};
pub use stmt::Stmt;
pub use visit::{ExprVisitor, StmtVisitor};
