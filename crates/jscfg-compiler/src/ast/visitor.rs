//! AST visitor pattern for traversing the syntax tree
//!
//! Each visit method has a default implementation that calls the matching
//! `walk_*` function, so an implementor overrides only the nodes it cares
//! about and calls `walk_*` itself to keep descending. The `'ast` lifetime
//! lets a visitor keep references to the nodes it sees.
//!
//! # Example
//!
//! ```rust,ignore
//! use jscfg_compiler::ast::*;
//!
//! struct CountIdentifiers {
//!     count: usize,
//! }
//!
//! impl<'ast> Visitor<'ast> for CountIdentifiers {
//!     fn visit_identifier(&mut self, _id: &'ast Identifier) {
//!         self.count += 1;
//!     }
//! }
//! ```

use super::*;

/// AST visitor trait
pub trait Visitor<'ast>: Sized {
    fn visit_program(&mut self, program: &'ast Program) {
        walk_program(self, program);
    }

    // Statements
    fn visit_statement(&mut self, stmt: &'ast Statement) {
        walk_statement(self, stmt);
    }

    fn visit_variable_declarator(&mut self, decl: &'ast VariableDeclarator) {
        walk_variable_declarator(self, decl);
    }

    fn visit_function(&mut self, func: &'ast Function) {
        walk_function(self, func);
    }

    fn visit_block(&mut self, block: &'ast BlockStatement) {
        walk_block(self, block);
    }

    // Expressions
    fn visit_expression(&mut self, expr: &'ast Expression) {
        walk_expression(self, expr);
    }

    fn visit_identifier(&mut self, _id: &'ast Identifier) {}

    fn visit_call_expression(&mut self, expr: &'ast CallExpression) {
        walk_call_expression(self, expr);
    }

    fn visit_new_expression(&mut self, expr: &'ast NewExpression) {
        walk_new_expression(self, expr);
    }

    fn visit_array_expression(&mut self, expr: &'ast ArrayExpression) {
        walk_array_expression(self, expr);
    }

    fn visit_object_expression(&mut self, expr: &'ast ObjectExpression) {
        walk_object_expression(self, expr);
    }

    fn visit_property(&mut self, prop: &'ast Property) {
        walk_property(self, prop);
    }
}

// ============================================================================
// Walk functions
// ============================================================================

pub fn walk_program<'ast, V: Visitor<'ast>>(visitor: &mut V, program: &'ast Program) {
    for stmt in &program.body {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_statement<'ast, V: Visitor<'ast>>(visitor: &mut V, stmt: &'ast Statement) {
    match stmt {
        Statement::Variable(var) => {
            for decl in &var.declarations {
                visitor.visit_variable_declarator(decl);
            }
        }
        Statement::FunctionDecl(func) => visitor.visit_function(func),
        Statement::Expression(expr) => visitor.visit_expression(&expr.expression),
        Statement::Block(block) => visitor.visit_block(block),
        Statement::Empty(_) | Statement::Debugger(_) => {}
        Statement::If(if_stmt) => {
            visitor.visit_expression(&if_stmt.test);
            visitor.visit_statement(&if_stmt.consequent);
            if let Some(alternate) = &if_stmt.alternate {
                visitor.visit_statement(alternate);
            }
        }
        Statement::While(while_stmt) => {
            visitor.visit_expression(&while_stmt.test);
            visitor.visit_statement(&while_stmt.body);
        }
        Statement::DoWhile(do_while) => {
            visitor.visit_statement(&do_while.body);
            visitor.visit_expression(&do_while.test);
        }
        Statement::For(for_stmt) => {
            match &for_stmt.init {
                Some(ForInit::Variable(var)) => {
                    for decl in &var.declarations {
                        visitor.visit_variable_declarator(decl);
                    }
                }
                Some(ForInit::Expression(expr)) => visitor.visit_expression(&expr.expression),
                None => {}
            }
            if let Some(test) = &for_stmt.test {
                visitor.visit_expression(test);
            }
            if let Some(update) = &for_stmt.update {
                visitor.visit_expression(update);
            }
            visitor.visit_statement(&for_stmt.body);
        }
        Statement::ForIn(for_in) => {
            match &for_in.left {
                ForInTarget::Variable(decl) => visitor.visit_variable_declarator(decl),
                ForInTarget::Expression(expr) => visitor.visit_expression(&expr.expression),
            }
            visitor.visit_expression(&for_in.right);
            visitor.visit_statement(&for_in.body);
        }
        Statement::Continue(_) | Statement::Break(_) => {}
        Statement::Return(ret) => {
            if let Some(argument) = &ret.argument {
                visitor.visit_expression(argument);
            }
        }
        Statement::With(with) => {
            visitor.visit_expression(&with.object);
            visitor.visit_statement(&with.body);
        }
        Statement::Switch(switch) => {
            visitor.visit_expression(&switch.discriminant);
            for case in &switch.cases {
                if let Some(test) = &case.test {
                    visitor.visit_expression(test);
                }
                for stmt in &case.consequent {
                    visitor.visit_statement(stmt);
                }
            }
        }
        Statement::Labelled(labelled) => visitor.visit_statement(&labelled.body),
        Statement::Throw(throw) => visitor.visit_expression(&throw.argument),
        Statement::Try(try_stmt) => {
            visitor.visit_block(&try_stmt.block);
            if let Some(handler) = &try_stmt.handler {
                visitor.visit_block(&handler.body);
            }
            if let Some(finalizer) = &try_stmt.finalizer {
                visitor.visit_block(finalizer);
            }
        }
    }
}

pub fn walk_variable_declarator<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    decl: &'ast VariableDeclarator,
) {
    if let Some(init) = &decl.init {
        visitor.visit_expression(init);
    }
}

pub fn walk_function<'ast, V: Visitor<'ast>>(visitor: &mut V, func: &'ast Function) {
    for stmt in &func.body {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_block<'ast, V: Visitor<'ast>>(visitor: &mut V, block: &'ast BlockStatement) {
    for stmt in &block.body {
        visitor.visit_statement(stmt);
    }
}

pub fn walk_expression<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast Expression) {
    match expr {
        Expression::This(_)
        | Expression::Null(_)
        | Expression::Boolean(_)
        | Expression::Number(_)
        | Expression::String(_)
        | Expression::RegExp(_) => {}
        Expression::Identifier(id) => visitor.visit_identifier(id),
        Expression::Array(array) => visitor.visit_array_expression(array),
        Expression::Object(object) => visitor.visit_object_expression(object),
        Expression::Function(func) => visitor.visit_function(func),
        Expression::Paren(paren) => visitor.visit_expression(&paren.expression),
        Expression::Member(member) => visitor.visit_expression(&member.object),
        Expression::Index(index) => {
            visitor.visit_expression(&index.object);
            visitor.visit_expression(&index.index);
        }
        Expression::Call(call) => visitor.visit_call_expression(call),
        Expression::New(new) => visitor.visit_new_expression(new),
        Expression::Unary(unary) => visitor.visit_expression(&unary.argument),
        Expression::Update(update) => visitor.visit_expression(&update.argument),
        Expression::Binary(binary) => {
            visitor.visit_expression(&binary.left);
            visitor.visit_expression(&binary.right);
        }
        Expression::Logical(logical) => {
            visitor.visit_expression(&logical.left);
            visitor.visit_expression(&logical.right);
        }
        Expression::Assignment(assign) => {
            visitor.visit_expression(&assign.target);
            visitor.visit_expression(&assign.value);
        }
        Expression::Conditional(cond) => {
            visitor.visit_expression(&cond.test);
            visitor.visit_expression(&cond.consequent);
            visitor.visit_expression(&cond.alternate);
        }
        Expression::Sequence(seq) => {
            for expr in &seq.expressions {
                visitor.visit_expression(expr);
            }
        }
    }
}

pub fn walk_call_expression<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast CallExpression) {
    visitor.visit_expression(&expr.callee);
    for arg in &expr.arguments {
        visitor.visit_expression(arg);
    }
}

pub fn walk_new_expression<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast NewExpression) {
    visitor.visit_expression(&expr.callee);
    for arg in expr.arguments.iter().flatten() {
        visitor.visit_expression(arg);
    }
}

pub fn walk_array_expression<'ast, V: Visitor<'ast>>(visitor: &mut V, expr: &'ast ArrayExpression) {
    for element in expr.elements.iter().flatten() {
        visitor.visit_expression(element);
    }
}

pub fn walk_object_expression<'ast, V: Visitor<'ast>>(
    visitor: &mut V,
    expr: &'ast ObjectExpression,
) {
    for prop in &expr.properties {
        visitor.visit_property(prop);
    }
}

pub fn walk_property<'ast, V: Visitor<'ast>>(visitor: &mut V, prop: &'ast Property) {
    match &prop.value {
        PropertyValue::Init(value) => visitor.visit_expression(value),
        PropertyValue::Get(func) | PropertyValue::Set(func) => visitor.visit_function(func),
    }
}
