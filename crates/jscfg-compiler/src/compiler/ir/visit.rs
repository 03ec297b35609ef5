//! Dispatch interface for IR consumers
//!
//! Backends implement `ExprVisitor` and `StmtVisitor` and call `accept` to get
//! one method call per variant, so adding a variant is a compile error in
//! every consumer.

use super::block::BasicBlockId;
use super::builtin::Builtin;
use super::expr::{ArgLocal, BinaryOp, Const, Expr, TempId, UnaryOp};
use super::module::{FunctionId, RegExpId};
use super::stmt::Stmt;
use crate::interner::Symbol;

pub trait ExprVisitor {
    type Output;

    fn visit_const(&mut self, value: &Const) -> Self::Output;
    fn visit_temp(&mut self, temp: TempId) -> Self::Output;
    fn visit_arg_local(&mut self, slot: &ArgLocal) -> Self::Output;
    fn visit_name(&mut self, name: Symbol) -> Self::Output;
    fn visit_global_name(&mut self, name: Symbol) -> Self::Output;
    fn visit_member(&mut self, base: &Expr, name: Symbol) -> Self::Output;
    fn visit_subscript(&mut self, base: &Expr, index: &Expr) -> Self::Output;
    fn visit_unop(&mut self, op: UnaryOp, expr: &Expr) -> Self::Output;
    fn visit_binop(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> Self::Output;
    fn visit_call(&mut self, callee: &Expr, args: &[Expr]) -> Self::Output;
    fn visit_new(&mut self, callee: &Expr, args: &[Expr]) -> Self::Output;
    fn visit_builtin(&mut self, builtin: Builtin) -> Self::Output;
    fn visit_closure(&mut self, function: FunctionId) -> Self::Output;
    fn visit_regexp(&mut self, regexp: RegExpId) -> Self::Output;
    fn visit_string(&mut self, value: Symbol) -> Self::Output;
}

pub trait StmtVisitor {
    type Output;

    fn visit_move(&mut self, target: &Expr, source: &Expr, op: Option<BinaryOp>) -> Self::Output;
    fn visit_exp(&mut self, expr: &Expr) -> Self::Output;
    fn visit_jump(&mut self, target: BasicBlockId) -> Self::Output;
    fn visit_cjump(
        &mut self,
        cond: &Expr,
        iftrue: BasicBlockId,
        iffalse: BasicBlockId,
    ) -> Self::Output;
    fn visit_ret(&mut self, value: &Expr) -> Self::Output;
}

impl Expr {
    pub fn accept<V: ExprVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Expr::Const(c) => visitor.visit_const(c),
            Expr::Temp(t) => visitor.visit_temp(*t),
            Expr::ArgLocal(slot) => visitor.visit_arg_local(slot),
            Expr::Name(name) => visitor.visit_name(*name),
            Expr::GlobalName(name) => visitor.visit_global_name(*name),
            Expr::Member { base, name } => visitor.visit_member(base, *name),
            Expr::Subscript { base, index } => visitor.visit_subscript(base, index),
            Expr::Unop { op, expr } => visitor.visit_unop(*op, expr),
            Expr::Binop { op, left, right } => visitor.visit_binop(*op, left, right),
            Expr::Call { callee, args } => visitor.visit_call(callee, args),
            Expr::New { callee, args } => visitor.visit_new(callee, args),
            Expr::Builtin(builtin) => visitor.visit_builtin(*builtin),
            Expr::Closure(id) => visitor.visit_closure(*id),
            Expr::RegExp(id) => visitor.visit_regexp(*id),
            Expr::String(value) => visitor.visit_string(*value),
        }
    }
}

impl Stmt {
    pub fn accept<V: StmtVisitor + ?Sized>(&self, visitor: &mut V) -> V::Output {
        match self {
            Stmt::Move { target, source, op } => visitor.visit_move(target, source, *op),
            Stmt::Exp(expr) => visitor.visit_exp(expr),
            Stmt::Jump(target) => visitor.visit_jump(*target),
            Stmt::CJump {
                cond,
                iftrue,
                iffalse,
            } => visitor.visit_cjump(cond, *iftrue, *iffalse),
            Stmt::Ret(value) => visitor.visit_ret(value),
        }
    }
}
