//! AST to IR Lowering
//!
//! The second pass: walks the tree again together with the environments the
//! scope analyzer built and emits one IR [`Function`] per function-like node.
//!
//! Every expression is lowered against a requested [`Format`]. Conditions ask
//! for `Cx` so comparisons and `&&`/`||` turn straight into conditional jumps;
//! expression statements ask for `Nx` so assignments and updates skip the
//! temporary that would hold their value.

mod control_flow;
mod expr;
mod fold;
mod stmt;

pub use control_flow::{JumpError, JumpTarget, LoopContext, LoopStack, ScopeFrame};
pub use fold::{fold_binop, fold_unop, to_int32, to_uint32};

use crate::ast::{self, Identifier, Program, Span, Statement};
use crate::compiler::error::ErrorSink;
use crate::compiler::ir::{
    ArgLocal, BasicBlockId, BinaryOp, Builtin, Const, Expr, Function, FunctionId, Module, Stmt,
    TempId, UnaryOp,
};
use crate::compiler::options::{CompilationMode, CompileOptions};
use crate::compiler::scope::{EnvId, Environment, EnvironmentTree};
use std::collections::BTreeSet;

/// Argument slots every activation frame reserves
pub const RESERVED_ARGUMENT_COUNT: u32 = 6;

/// Result requested from an expression
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Produce a value
    Ex,
    /// Branch to one of two blocks on the value's truthiness
    Cx {
        iftrue: BasicBlockId,
        iffalse: BasicBlockId,
    },
    /// Evaluate for side effects only
    Nx,
}

/// Lowering state of one function under construction
struct FunctionState<'a> {
    func: Function,
    /// None only for the placeholder that sits below the outermost function
    env: Option<EnvId>,
    block: BasicBlockId,
    exit: BasicBlockId,
    return_temp: TempId,
    loops: LoopStack,
    /// Active exception handlers, innermost last
    handlers: Vec<BasicBlockId>,
    /// with/catch/try frames the current position is nested in
    scope_chain: Vec<ScopeFrame<'a>>,
    /// Label waiting to be attached to the next loop or switch
    pending_label: Option<String>,
    inside_with_or_catch: u32,
    name: String,
}

impl<'a> FunctionState<'a> {
    fn new(func: Function, env: Option<EnvId>, return_temp: TempId, name: String) -> Self {
        Self {
            block: func.entry,
            exit: func.exit,
            func,
            env,
            return_temp,
            loops: LoopStack::new(),
            handlers: Vec::new(),
            scope_chain: Vec::new(),
            pending_label: None,
            inside_with_or_catch: 0,
            name,
        }
    }
}

/// AST to IR lowerer
pub struct Lowerer<'a, 'm> {
    module: &'m mut Module,
    envs: &'m EnvironmentTree<'a>,
    options: &'m CompileOptions,
    errors: &'m mut ErrorSink,
    /// Function being lowered
    current: FunctionState<'a>,
    /// Enclosing functions, outermost first
    outer: Vec<FunctionState<'a>>,
}

impl<'a, 'm> Lowerer<'a, 'm> {
    pub fn new(
        module: &'m mut Module,
        envs: &'m EnvironmentTree<'a>,
        options: &'m CompileOptions,
        errors: &'m mut ErrorSink,
    ) -> Self {
        let name = module.intern("");
        let placeholder = Function::new(FunctionId(0), name, None);
        Self {
            module,
            envs,
            options,
            errors,
            current: FunctionState::new(placeholder, None, TempId(0), String::new()),
            outer: Vec::new(),
        }
    }

    /// Lower a whole program into a function named `%entry`
    pub fn lower_program(
        &mut self,
        program: &'a Program,
        inherited_locals: &[String],
    ) -> Option<FunctionId> {
        let env = self.envs.lookup(program)?;
        self.define_function(
            "%entry",
            env,
            &[],
            &program.body,
            program.span,
            inherited_locals,
        )
    }

    /// Lower a lone function expression
    pub fn lower_function_expression(&mut self, function: &'a ast::Function) -> Option<FunctionId> {
        let env = self.envs.lookup(function)?;
        self.define_function(
            function.name_str(),
            env,
            &function.params,
            &function.body,
            function.span,
            &[],
        )
    }

    // ========================================================================
    // Functions
    // ========================================================================

    fn define_function(
        &mut self,
        name: &str,
        env_id: EnvId,
        formals: &'a [Identifier],
        body: &'a [Statement],
        span: Span,
        inherited_locals: &[String],
    ) -> Option<FunctionId> {
        let envs = self.envs;
        let env = envs.get(env_id)?;

        let outer = self.current.env.map(|_| self.current.func.id);
        let name_sym = self.module.intern(name);
        let id = self.module.new_function(name_sym, outer);

        let mut func = Function::new(id, name_sym, outer);
        let entry = func.new_block(None, true);
        let exit = func.new_block(None, false);
        func.entry = entry;
        func.exit = exit;
        func.has_direct_eval =
            env.has_direct_eval || env.mode == CompilationMode::Eval || self.options.debug_mode;
        func.uses_arguments_object = env.needs_arguments_object();
        func.uses_this = env.uses_this;
        func.max_number_of_arguments = env.max_number_of_arguments.max(RESERVED_ARGUMENT_COUNT);
        func.is_strict = env.is_strict;
        func.is_named_expression = env.is_named_function_expression;
        func.is_binding = env.mode == CompilationMode::BindingExpression;
        func.line = span.line;
        func.column = span.column;
        func.formals = formals.iter().map(|p| self.module.intern(&p.name)).collect();

        if env.is_slotted() {
            for (local, member) in &env.members {
                func.locals.push(self.module.intern(local));
                if let Some(index) = member.index {
                    func.append(
                        entry,
                        Stmt::Move {
                            target: Expr::ArgLocal(ArgLocal::local(index, 0)),
                            source: Expr::undefined(),
                            op: None,
                        },
                    );
                }
            }
        } else {
            let mut names: BTreeSet<&str> = env.members.keys().map(String::as_str).collect();
            if !env.is_strict {
                for local in inherited_locals {
                    func.locals.push(self.module.intern(local));
                    names.insert(local.as_str());
                }
            }
            for local in names {
                let sym = self.module.intern(local);
                func.append(
                    entry,
                    Stmt::Exp(Expr::builtin_call(
                        Builtin::DeclareVar,
                        vec![Expr::String(sym), Expr::boolean(false)],
                    )),
                );
            }
        }

        let return_temp = func.new_temp();
        func.append(
            entry,
            Stmt::Move {
                target: Expr::Temp(return_temp),
                source: Expr::undefined(),
                op: None,
            },
        );
        func.append(exit, Stmt::Ret(Expr::Temp(return_temp)));

        let uses_arguments = func.uses_arguments_object;
        let convert_this = func.uses_this && !func.is_strict;

        let state = FunctionState::new(func, Some(env_id), return_temp, name.to_string());
        let parent = std::mem::replace(&mut self.current, state);
        self.outer.push(parent);

        self.define_nested_functions(env);

        if uses_arguments {
            let target = self.identifier("arguments");
            self.move_to(
                target,
                Expr::builtin_call(Builtin::SetupArgumentsObject, vec![]),
            );
        }
        if convert_this {
            self.exp(Expr::builtin_call(Builtin::ConvertThisToObject, vec![]));
        }

        self.source_elements(body);

        let exit = self.current.exit;
        self.current.func.insert_block(exit);
        self.jump(exit);

        let parent = self.outer.pop()?;
        let mut finished = std::mem::replace(&mut self.current, parent).func;
        finished.prune_unreachable();
        log::debug!(
            "lowered function {} `{}`: {} block(s), {} temp(s)",
            id,
            name,
            finished.block_count(),
            finished.temp_count()
        );
        if self.current.env.is_some() {
            self.current.func.nested.push(id);
        }
        self.module.install(finished);
        Some(id)
    }

    /// Bind every hoisted function of the environment at function entry
    fn define_nested_functions(&mut self, env: &'m Environment<'a>) {
        for member in env.members.values() {
            let Some(function) = member.function else {
                continue;
            };
            let closure = self.closure(function);
            let target = if env.parent.is_none() {
                Expr::Name(self.module.intern(function.name_str()))
            } else {
                match member.index {
                    Some(index) => Expr::ArgLocal(ArgLocal::local(index, 0)),
                    None => continue,
                }
            };
            self.move_to(target, closure);
        }
    }

    /// Define a nested function and return its closure
    pub(super) fn closure(&mut self, function: &'a ast::Function) -> Expr {
        let defined = self.envs.lookup(function).and_then(|env| {
            self.define_function(
                function.name_str(),
                env,
                &function.params,
                &function.body,
                function.span,
                &[],
            )
        });
        match defined {
            Some(id) => Expr::Closure(id),
            None => {
                log::warn!("no environment recorded for function `{}`", function.name_str());
                Expr::undefined()
            }
        }
    }

    fn current_env(&self) -> Option<&'m Environment<'a>> {
        let envs = self.envs;
        self.current.env.and_then(|id| envs.get(id))
    }

    fn compilation_mode(&self) -> CompilationMode {
        self.current_env()
            .map(|env| env.mode)
            .unwrap_or_default()
    }

    fn is_strict(&self) -> bool {
        self.current.func.is_strict
    }

    // ========================================================================
    // Name resolution
    // ========================================================================

    /// Resolve a name to a slot, a dynamic name or a global name
    pub(super) fn identifier(&mut self, name: &str) -> Expr {
        let sym = self.module.intern(name);
        let envs = self.envs;

        let mut frames = std::iter::once(&self.current)
            .chain(self.outer.iter().rev())
            .filter(|frame| frame.env.is_some());
        let mut frame = frames.next();
        let mut env_id = self.current.env;
        let mut scope = 0;

        while let (Some(f), Some(env)) = (frame, env_id.and_then(|id| envs.get(id))) {
            if env.parent.is_none() {
                break;
            }
            if f.inside_with_or_catch > 0 || (f.func.is_named_expression && f.name == name) {
                return Expr::Name(sym);
            }
            if let Some(index) = env.find_member(name) {
                let mut local = ArgLocal::local(index, scope);
                local.is_arguments_or_eval = name == "arguments" || name == "eval";
                return Expr::ArgLocal(local);
            }
            if let Some(index) = env.find_argument(name) {
                return Expr::ArgLocal(ArgLocal::formal(index, scope));
            }
            if !f.func.is_strict && f.func.has_direct_eval {
                return Expr::Name(sym);
            }
            scope += 1;
            env_id = env.parent;
            frame = frames.next();
        }

        let env = env_id.and_then(|id| envs.get(id));
        let at_root = env.map_or(true, |e| e.parent.is_none());
        let in_binding = env.is_some_and(|e| e.mode == CompilationMode::BindingExpression);
        let in_with = frame.is_some_and(|f| f.inside_with_or_catch > 0);
        let in_eval = self.compilation_mode() == CompilationMode::Eval;

        if at_root && !in_with && !in_eval && !in_binding {
            Expr::GlobalName(sym)
        } else {
            Expr::Name(sym)
        }
    }

    // ========================================================================
    // Blocks and statements
    // ========================================================================

    fn has_error(&self) -> bool {
        self.errors.has_error()
    }

    fn syntax_error(&mut self, span: Span, message: impl Into<String>) {
        self.errors.syntax(span, message);
    }

    fn reference_error(&mut self, span: Span, message: impl Into<String>) {
        self.errors.reference(span, message);
    }

    fn exception_handler(&self) -> Option<BasicBlockId> {
        self.current.handlers.last().copied()
    }

    /// New block in layout order, guarded by the active exception handler
    fn new_block(&mut self) -> BasicBlockId {
        let handler = self.exception_handler();
        self.current.func.new_block(handler, true)
    }

    fn new_temp(&mut self) -> TempId {
        self.current.func.new_temp()
    }

    fn set_block(&mut self, block: BasicBlockId) {
        self.current.block = block;
    }

    /// Append to the current block; dropped once the block is terminated
    fn emit(&mut self, stmt: Stmt) {
        let block = self.current.block;
        self.current.func.append(block, stmt);
    }

    fn emit_in(&mut self, block: BasicBlockId, stmt: Stmt) {
        self.current.func.append(block, stmt);
    }

    fn jump(&mut self, target: BasicBlockId) {
        self.emit(Stmt::Jump(target));
    }

    fn exp(&mut self, expr: Expr) {
        self.emit(Stmt::Exp(expr));
    }

    fn builtin(&mut self, builtin: Builtin, args: Vec<Expr>) {
        self.exp(Expr::builtin_call(builtin, args));
    }

    fn return_value(&self) -> Expr {
        Expr::Temp(self.current.return_temp)
    }

    // ========================================================================
    // Expression shaping
    // ========================================================================

    /// Move a value into a fresh temporary
    fn materialize(&mut self, expr: Expr) -> Expr {
        let temp = self.new_temp();
        self.move_to(Expr::Temp(temp), expr);
        Expr::Temp(temp)
    }

    fn slot(&mut self, expr: Expr) -> Expr {
        if expr.is_slot() {
            expr
        } else {
            self.materialize(expr)
        }
    }

    fn temp(&mut self, expr: Expr) -> Expr {
        if expr.is_temp() {
            expr
        } else {
            self.materialize(expr)
        }
    }

    /// Store `source` into `target`.
    ///
    /// At least one side of every move is a temporary or slot; anything else
    /// goes through a fresh temporary.
    fn move_to(&mut self, target: Expr, source: Expr) {
        if !target.is_slot() && !source.is_slot() {
            let temp = self.materialize(source);
            self.emit(Stmt::Move {
                target,
                source: temp,
                op: None,
            });
            return;
        }
        self.emit(Stmt::Move {
            target,
            source,
            op: None,
        });
    }

    /// Store `target op source` into `target`
    fn move_with(&mut self, target: Expr, source: Expr, op: BinaryOp) {
        let value = self.binop(op, target.clone(), source);
        self.move_to(target, value);
    }

    fn cjump(&mut self, cond: Expr, iftrue: BasicBlockId, iffalse: BasicBlockId) {
        let cond = if cond.is_temp() || cond.is_binop() {
            cond
        } else {
            self.materialize(cond)
        };
        self.emit(Stmt::CJump {
            cond,
            iftrue,
            iffalse,
        });
    }

    fn member(&mut self, base: Expr, name: &str) -> Expr {
        let base = self.slot(base);
        Expr::Member {
            base: Box::new(base),
            name: self.module.intern(name),
        }
    }

    fn subscript(&mut self, base: Expr, index: Expr) -> Expr {
        let base = self.temp(base);
        let index = self.temp(index);
        Expr::Subscript {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    fn argument(&mut self, expr: Expr) -> Expr {
        self.temp(expr)
    }

    /// Keep references as they are so the callee still sees the base object
    fn reference(&mut self, expr: Expr) -> Expr {
        match expr {
            Expr::Temp(_)
            | Expr::ArgLocal(_)
            | Expr::Name(_)
            | Expr::GlobalName(_)
            | Expr::Member { .. }
            | Expr::Subscript { .. } => expr,
            other => self.materialize(other),
        }
    }

    fn call(&mut self, base: Expr, args: Vec<Expr>) -> Expr {
        let callee = self.reference(base);
        Expr::call(callee, args)
    }

    fn unop(&mut self, op: UnaryOp, expr: Expr) -> Expr {
        if let Expr::Const(Const::Number(value)) = expr {
            if op == UnaryOp::UPlus {
                return expr;
            }
            return Expr::Const(fold_unop(op, value));
        }
        let expr = self.slot(expr);
        Expr::Unop {
            op,
            expr: Box::new(expr),
        }
    }

    fn binop(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        match (&left, &right) {
            (Expr::Const(Const::Number(l)), Expr::Const(Const::Number(r))) => {
                if let Some(folded) = fold_binop(op, *l, *r) {
                    return Expr::Const(folded);
                }
            }
            (Expr::String(l), Expr::String(r)) if op == BinaryOp::Add => {
                let joined = format!("{}{}", self.module.resolve(*l), self.module.resolve(*r));
                return Expr::String(self.module.intern(&joined));
            }
            _ => {}
        }
        let left = self.slot(left);
        let right = self.slot(right);
        Expr::binop(op, left, right)
    }

    // ========================================================================
    // Entry points
    // ========================================================================

    /// Lower an expression for its value
    fn expression(&mut self, expression: &'a ast::Expression) -> Option<Expr> {
        self.accept(expression, Format::Ex)
    }

    /// Lower an expression as a branch to `iftrue` or `iffalse`
    fn condition(
        &mut self,
        expression: &'a ast::Expression,
        iftrue: BasicBlockId,
        iffalse: BasicBlockId,
    ) {
        if let Some(value) = self.accept(expression, Format::Cx { iftrue, iffalse }) {
            self.cjump(value, iftrue, iffalse);
        }
    }

    /// Lower an expression for its side effects
    fn expression_statement(&mut self, expression: &'a ast::Expression) {
        match self.accept(expression, Format::Nx) {
            Some(value) if value.is_call() => self.exp(value),
            Some(value) if value.is_slot() => {}
            Some(value) => {
                self.materialize(value);
            }
            None => {}
        }
    }

    /// Strict code may not assign to `eval` or `arguments`
    fn check_eval_or_arguments(&mut self, target: &Expr, span: Span) -> bool {
        if !self.is_strict() {
            return false;
        }
        let hit = match target {
            Expr::Name(sym) | Expr::GlobalName(sym) => {
                matches!(self.module.resolve(*sym), "eval" | "arguments")
            }
            Expr::ArgLocal(local) => local.is_arguments_or_eval,
            _ => false,
        };
        if hit {
            self.syntax_error(
                span,
                "Variable name may not be eval or arguments in strict mode",
            );
        }
        hit
    }
}
