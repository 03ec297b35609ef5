//! Statement lowering

use super::control_flow::{LoopContext, ScopeFrame};
use super::Lowerer;
use crate::ast::{
    self, BreakStatement, ContinueStatement, DoWhileStatement, ExpressionStatement, ForInStatement,
    ForInTarget, ForInit, ForStatement, IfStatement, LabelledStatement, ReturnStatement,
    Statement, SwitchStatement, ThrowStatement, TryStatement, VariableDeclarator,
    VariableStatement, WhileStatement, WithStatement,
};
use crate::compiler::ir::{BasicBlockId, BinaryOp, Builtin, Const, Expr, Stmt};
use crate::compiler::options::CompilationMode;

impl<'a, 'm> Lowerer<'a, 'm> {
    /// Lower the top-level statements of a program or function body
    pub(super) fn source_elements(&mut self, body: &'a [Statement]) {
        for statement in body {
            if self.has_error() {
                return;
            }
            match statement {
                // Hoisted: bound at function entry
                Statement::FunctionDecl(function) => self.function_declaration(function),
                other => self.statement(other),
            }
        }
    }

    fn function_declaration(&mut self, function: &'a ast::Function) {
        if self.compilation_mode() == CompilationMode::BindingExpression {
            let name = Expr::Name(self.module.intern(function.name_str()));
            let ret = self.return_value();
            self.move_to(ret, name);
        }
    }

    fn statement_list(&mut self, body: &'a [Statement]) {
        for statement in body {
            self.statement(statement);
        }
    }

    pub(super) fn statement(&mut self, statement: &'a Statement) {
        if self.has_error() {
            return;
        }

        match statement {
            Statement::Variable(var) => self.variable_statement(var),
            // Bound at function entry like top-level declarations
            Statement::FunctionDecl(_) => {}
            Statement::Expression(stmt) => self.expression_stmt(stmt),
            Statement::Block(block) => self.statement_list(&block.body),
            Statement::Empty(_) | Statement::Debugger(_) => {}
            Statement::If(stmt) => self.if_statement(stmt),
            Statement::While(stmt) => self.while_statement(stmt),
            Statement::DoWhile(stmt) => self.do_while_statement(stmt),
            Statement::For(stmt) => self.for_statement(stmt),
            Statement::ForIn(stmt) => self.for_in_statement(stmt),
            Statement::Continue(stmt) => self.continue_statement(stmt),
            Statement::Break(stmt) => self.break_statement(stmt),
            Statement::Return(stmt) => self.return_statement(stmt),
            Statement::With(stmt) => self.with_statement(stmt),
            Statement::Switch(stmt) => self.switch_statement(stmt),
            Statement::Labelled(stmt) => self.labelled_statement(stmt),
            Statement::Throw(stmt) => self.throw_statement(stmt),
            Statement::Try(stmt) => self.try_statement(stmt),
        }
    }

    // ========================================================================
    // Simple statements
    // ========================================================================

    fn variable_statement(&mut self, var: &'a VariableStatement) {
        for declarator in &var.declarations {
            self.variable_declaration(declarator);
        }
    }

    fn variable_declaration(&mut self, declarator: &'a VariableDeclarator) {
        let Some(init) = &declarator.init else {
            return;
        };
        let Some(value) = self.expression(init) else {
            return;
        };
        let value = self.materialize(value);
        let target = self.identifier(&declarator.name.name);
        self.move_to(target, value);
    }

    /// Eval code and binding expressions return the value of their last
    /// expression statement
    fn expression_stmt(&mut self, stmt: &'a ExpressionStatement) {
        match self.compilation_mode() {
            CompilationMode::Eval | CompilationMode::BindingExpression => {
                if let Some(value) = self.expression(&stmt.expression) {
                    let ret = self.return_value();
                    self.move_to(ret, value);
                }
            }
            CompilationMode::Global | CompilationMode::Function => {
                self.expression_statement(&stmt.expression)
            }
        }
    }

    fn throw_statement(&mut self, stmt: &'a ThrowStatement) {
        let Some(value) = self.expression(&stmt.argument) else {
            return;
        };
        let ret = self.return_value();
        self.move_to(ret.clone(), value);
        self.builtin(Builtin::Throw, vec![ret]);
    }

    fn return_statement(&mut self, stmt: &'a ReturnStatement) {
        if !matches!(
            self.compilation_mode(),
            CompilationMode::Function | CompilationMode::BindingExpression
        ) {
            self.syntax_error(stmt.span, "Return statement outside of function");
            return;
        }

        if let Some(argument) = &stmt.argument {
            let Some(value) = self.expression(argument) else {
                return;
            };
            let ret = self.return_value();
            self.move_to(ret, value);
        }

        // Finalizers inlined by the unwind run outside every handler
        let leave = self.current.func.new_block(None, true);
        self.jump(leave);
        self.set_block(leave);
        self.unwind(0);
        let exit = self.current.exit;
        self.jump(exit);
    }

    // ========================================================================
    // Conditionals and loops
    // ========================================================================

    fn if_statement(&mut self, stmt: &'a IfStatement) {
        let iftrue = self.new_block();
        let iffalse = stmt.alternate.as_ref().map(|_| self.new_block());
        let endif = self.new_block();

        self.condition(&stmt.test, iftrue, iffalse.unwrap_or(endif));

        self.set_block(iftrue);
        self.statement(&stmt.consequent);
        self.jump(endif);

        if let (Some(alternate), Some(iffalse)) = (&stmt.alternate, iffalse) {
            self.set_block(iffalse);
            self.statement(alternate);
            self.jump(endif);
        }

        self.set_block(endif);
    }

    fn enter_loop(&mut self, break_block: BasicBlockId, continue_block: Option<BasicBlockId>) {
        let label = self.current.pending_label.take();
        let depth = self.current.scope_chain.len();
        self.current
            .loops
            .push(LoopContext::new(break_block, continue_block, depth).with_label(label));
    }

    fn leave_loop(&mut self) {
        self.current.loops.pop();
    }

    fn while_statement(&mut self, stmt: &'a WhileStatement) {
        let cond = self.new_block();
        let body = self.new_block();
        let end = self.new_block();

        self.enter_loop(end, Some(cond));

        self.jump(cond);
        self.set_block(cond);
        self.condition(&stmt.test, body, end);

        self.set_block(body);
        self.statement(&stmt.body);
        self.jump(cond);

        self.set_block(end);
        self.leave_loop();
    }

    fn do_while_statement(&mut self, stmt: &'a DoWhileStatement) {
        let body = self.new_block();
        let cond = self.new_block();
        let end = self.new_block();

        self.enter_loop(end, Some(cond));
        self.jump(body);

        self.set_block(body);
        self.statement(&stmt.body);
        self.jump(cond);

        self.set_block(cond);
        self.condition(&stmt.test, body, end);

        self.set_block(end);
        self.leave_loop();
    }

    fn for_statement(&mut self, stmt: &'a ForStatement) {
        let cond = self.new_block();
        let body = self.new_block();
        let step = self.new_block();
        let end = self.new_block();

        match &stmt.init {
            Some(ForInit::Variable(var)) => self.variable_statement(var),
            Some(ForInit::Expression(init)) => self.expression_statement(&init.expression),
            None => {}
        }

        self.enter_loop(end, Some(step));
        self.jump(cond);

        self.set_block(cond);
        match &stmt.test {
            Some(test) => self.condition(test, body, end),
            None => self.jump(body),
        }

        self.set_block(body);
        self.statement(&stmt.body);
        self.jump(step);

        self.set_block(step);
        if let Some(update) = &stmt.update {
            self.expression_statement(update);
        }
        self.jump(cond);

        self.set_block(end);
        self.leave_loop();
    }

    fn for_in_statement(&mut self, stmt: &'a ForInStatement) {
        let next = self.new_block();
        let body = self.new_block();
        let end = self.new_block();

        let iterator = match &stmt.left {
            ForInTarget::Variable(declarator) => {
                self.variable_declaration(declarator);
                let Some(object) = self.expression(&stmt.right) else {
                    return;
                };
                let iterator = self.materialize(object);
                self.move_to(
                    iterator.clone(),
                    Expr::builtin_call(Builtin::ForeachIteratorObject, vec![iterator.clone()]),
                );
                iterator
            }
            ForInTarget::Expression(_) => {
                let Some(object) = self.expression(&stmt.right) else {
                    return;
                };
                let object = self.materialize(object);
                self.materialize(Expr::builtin_call(
                    Builtin::ForeachIteratorObject,
                    vec![object],
                ))
            }
        };

        self.enter_loop(end, Some(next));
        self.jump(next);

        self.set_block(body);
        let name = Expr::Temp(self.new_temp());
        let target = match &stmt.left {
            ForInTarget::Variable(declarator) => Some(self.identifier(&declarator.name.name)),
            ForInTarget::Expression(target) => {
                let value = self.expression(&target.expression);
                if value.as_ref().is_some_and(|value| !value.is_lvalue()) {
                    self.reference_error(
                        target.span,
                        "left-hand side of assignment operator is not an lvalue",
                    );
                    return;
                }
                value
            }
        };
        if let Some(target) = target {
            self.move_to(target, name.clone());
        }
        self.statement(&stmt.body);
        self.jump(next);

        self.set_block(next);
        self.move_to(
            name.clone(),
            Expr::builtin_call(Builtin::ForeachNextPropertyName, vec![iterator]),
        );
        let null = Expr::Temp(self.new_temp());
        self.move_to(null.clone(), Expr::Const(Const::Null));
        self.cjump(Expr::binop(BinaryOp::StrictNotEqual, name, null), body, end);

        self.set_block(end);
        self.leave_loop();
    }

    fn switch_statement(&mut self, stmt: &'a SwitchStatement) {
        let switch_end = self.new_block();

        let Some(discriminant) = self.expression(&stmt.discriminant) else {
            return;
        };
        let lhs = Expr::Temp(self.new_temp());
        self.move_to(lhs.clone(), discriminant);

        let switch_cond = self.new_block();
        self.jump(switch_cond);

        self.enter_loop(switch_end, None);
        let mut case_blocks = Vec::with_capacity(stmt.cases.len());
        for case in &stmt.cases {
            let block = self.new_block();
            // Fallthrough from the previous case
            self.jump(block);
            self.set_block(block);
            self.statement_list(&case.consequent);
            case_blocks.push(block);
        }
        self.leave_loop();
        self.jump(switch_end);

        self.set_block(switch_cond);
        let mut default_block = None;
        for (case, block) in stmt.cases.iter().zip(case_blocks) {
            let Some(test) = &case.test else {
                default_block = Some(block);
                continue;
            };
            let Some(rhs) = self.expression(test) else {
                return;
            };
            let iffalse = self.new_block();
            let cond = self.binop(BinaryOp::StrictEqual, lhs.clone(), rhs);
            self.cjump(cond, block, iffalse);
            self.set_block(iffalse);
        }
        if let Some(default_block) = default_block {
            self.jump(default_block);
        }
        self.jump(switch_end);

        self.set_block(switch_end);
    }

    fn labelled_statement(&mut self, stmt: &'a LabelledStatement) {
        let label = &stmt.label.name;
        if self.current.loops.find_by_label(label).is_some() {
            self.syntax_error(
                stmt.label.span,
                format!("Label '{}' has already been declared", label),
            );
            return;
        }

        self.current.pending_label = Some(label.clone());
        if stmt.body.is_breakable() {
            self.statement(&stmt.body);
            return;
        }

        let break_block = self.new_block();
        self.enter_loop(break_block, None);
        self.statement(&stmt.body);
        self.jump(break_block);
        self.set_block(break_block);
        self.leave_loop();
    }

    fn break_statement(&mut self, stmt: &'a BreakStatement) {
        let label = stmt.label.as_ref().map(|l| l.name.as_str());
        match self.current.loops.break_target(label) {
            Ok(target) => {
                self.unwind(target.unwind_depth);
                self.jump(target.block);
            }
            Err(err) => self.syntax_error(stmt.span, err.to_string()),
        }
    }

    fn continue_statement(&mut self, stmt: &'a ContinueStatement) {
        let label = stmt.label.as_ref().map(|l| l.name.as_str());
        match self.current.loops.continue_target(label) {
            Ok(target) => {
                self.unwind(target.unwind_depth);
                self.jump(target.block);
            }
            Err(err) => self.syntax_error(stmt.span, err.to_string()),
        }
    }

    // ========================================================================
    // Scopes and exceptions
    // ========================================================================

    /// Emit the cleanup for every frame above `depth`: pop with/catch scopes
    /// and inline pending finalizers. The frame state itself is left as is.
    fn unwind(&mut self, depth: usize) {
        let saved_chain = self.current.scope_chain.clone();
        let saved_inside = self.current.inside_with_or_catch;

        while self.current.scope_chain.len() > depth {
            let Some(frame) = self.current.scope_chain.pop() else {
                break;
            };
            if frame.pops_scope() {
                self.builtin(Builtin::PopScope, vec![]);
                self.current.inside_with_or_catch =
                    self.current.inside_with_or_catch.saturating_sub(1);
            } else if let ScopeFrame::Try {
                finalizer: Some(finalizer),
            } = frame
            {
                self.statement_list(&finalizer.body);
            }
        }

        self.current.scope_chain = saved_chain;
        self.current.inside_with_or_catch = saved_inside;
    }

    fn with_statement(&mut self, stmt: &'a WithStatement) {
        self.current.func.has_with = true;

        let Some(object) = self.expression(&stmt.object) else {
            return;
        };
        let scope_object = Expr::Temp(self.new_temp());
        self.emit(Stmt::Move {
            target: scope_object.clone(),
            source: object,
            op: None,
        });

        let surrounding = self.exception_handler();
        let handler = self.new_block();
        self.emit_in(
            handler,
            Stmt::Exp(Expr::builtin_call(Builtin::PopScope, vec![])),
        );
        match surrounding {
            Some(surrounding) => {
                self.emit_in(handler, Stmt::Jump(surrounding));
            }
            None => {
                self.emit_in(
                    handler,
                    Stmt::Exp(Expr::builtin_call(Builtin::ReThrow, vec![])),
                );
                let exit = self.current.exit;
                self.emit_in(handler, Stmt::Jump(exit));
            }
        }

        self.current.handlers.push(handler);
        let with_block = self.new_block();
        self.jump(with_block);
        self.set_block(with_block);

        self.builtin(Builtin::PushWithScope, vec![scope_object]);
        self.current.inside_with_or_catch += 1;
        self.current.scope_chain.push(ScopeFrame::With);
        self.statement(&stmt.body);
        self.current.scope_chain.pop();
        self.current.inside_with_or_catch -= 1;
        self.builtin(Builtin::PopScope, vec![]);
        self.current.handlers.pop();

        let next = self.new_block();
        self.jump(next);
        self.set_block(next);
    }

    fn try_statement(&mut self, stmt: &'a TryStatement) {
        self.current.func.has_try = true;

        if let Some(handler) = &stmt.handler {
            let param = &handler.param;
            if self.is_strict() && (param.is("eval") || param.is("arguments")) {
                self.syntax_error(
                    param.span,
                    "Catch variable name may not be eval or arguments in strict mode",
                );
                return;
            }
        }

        let surrounding = self.exception_handler();
        let end = self.current.func.new_block(surrounding, false);
        let finally = stmt
            .finalizer
            .as_ref()
            .map(|_| self.current.func.new_block(surrounding, false));
        let catch_blocks = stmt.handler.as_ref().map(|_| {
            let catch_handler = self.current.func.new_block(None, false);
            let catch_body = self.current.func.new_block(Some(catch_handler), false);
            (catch_handler, catch_body)
        });
        let after_try = finally.unwrap_or(end);

        let guard = catch_blocks.map(|(_, body)| body).or(finally);
        if let Some(guard) = guard {
            self.current.handlers.push(guard);
        }

        let try_body = self.new_block();
        self.jump(try_body);
        self.set_block(try_body);

        self.current.scope_chain.push(ScopeFrame::Try {
            finalizer: stmt.finalizer.as_ref(),
        });
        self.statement_list(&stmt.block.body);
        self.jump(after_try);
        if guard.is_some() {
            self.current.handlers.pop();
        }

        if let (Some(clause), Some((catch_handler, catch_body))) = (&stmt.handler, catch_blocks) {
            self.current.handlers.push(catch_handler);
            self.current.func.insert_block(catch_body);
            self.set_block(catch_body);

            self.current.inside_with_or_catch += 1;
            let name = Expr::String(self.module.intern(&clause.param.name));
            self.builtin(Builtin::PushCatchScope, vec![name]);
            self.current.scope_chain.push(ScopeFrame::Catch);
            self.statement_list(&clause.body.body);
            self.current.scope_chain.pop();
            self.builtin(Builtin::PopScope, vec![]);
            self.current.inside_with_or_catch -= 1;
            self.jump(after_try);
            self.current.handlers.pop();

            self.current.func.insert_block(catch_handler);
            self.set_block(catch_handler);
            self.builtin(Builtin::PopScope, vec![]);
            match finally.or(surrounding) {
                Some(target) => self.jump(target),
                None => {
                    self.builtin(Builtin::ReThrow, vec![]);
                    let exit = self.current.exit;
                    self.jump(exit);
                }
            }
        }

        self.current.scope_chain.pop();

        if let (Some(finalizer), Some(finally)) = (&stmt.finalizer, finally) {
            self.current.func.insert_block(finally);
            self.set_block(finally);

            let has_exception = Expr::Temp(self.new_temp());
            self.move_to(
                has_exception.clone(),
                Expr::builtin_call(Builtin::UnwindException, vec![]),
            );
            self.statement_list(&finalizer.body);

            let rethrow = self.current.func.new_block(surrounding, true);
            self.cjump(has_exception, rethrow, end);
            self.set_block(rethrow);
            self.builtin(Builtin::ReThrow, vec![]);
            let exit = self.current.exit;
            self.jump(exit);
        }

        self.current.func.insert_block(end);
        self.set_block(end);
    }
}
