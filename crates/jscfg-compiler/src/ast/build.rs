//! Programmatic tree construction
//!
//! `AstBuilder` produces nodes together with a synthetic source text. String
//! literals append their raw quoted token to that text so code that inspects
//! the source (directive prologues, diagnostics) sees what a parser would have
//! produced. All other nodes get an empty span at the builder's current
//! line/column, which `at` moves.
//!
//! Every method takes `&self`, so calls nest freely:
//! `b.expr_stmt(b.call(b.ident("f"), vec![b.num(1.0)]))`.

use super::*;
use std::cell::{Cell, RefCell};

/// Tree builder with an attached synthetic source text
#[derive(Debug)]
pub struct AstBuilder {
    source: RefCell<String>,
    line: Cell<u32>,
    column: Cell<u32>,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        Self {
            source: RefCell::new(String::new()),
            line: Cell::new(1),
            column: Cell::new(1),
        }
    }

    /// Source text accumulated so far
    pub fn source(&self) -> String {
        self.source.borrow().clone()
    }

    /// Set the position given to nodes built from now on
    pub fn at(&self, line: u32, column: u32) -> &Self {
        self.line.set(line);
        self.column.set(column);
        self
    }

    fn span(&self) -> Span {
        let offset = self.source.borrow().len();
        Span::new(offset, offset, self.line.get(), self.column.get())
    }

    /// Append raw text to the source and return the span covering it
    pub fn raw(&self, text: &str) -> Span {
        let mut source = self.source.borrow_mut();
        let start = source.len();
        source.push_str(text);
        let span = Span::new(start, source.len(), self.line.get(), self.column.get());
        source.push('\n');
        span
    }

    pub fn program(&self, body: Vec<Statement>) -> Program {
        Program {
            body,
            span: self.span(),
        }
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    pub fn id(&self, name: &str) -> Identifier {
        Identifier::new(name, self.span())
    }

    pub fn ident(&self, name: &str) -> Expression {
        Expression::Identifier(self.id(name))
    }

    pub fn this(&self) -> Expression {
        Expression::This(self.span())
    }

    pub fn null(&self) -> Expression {
        Expression::Null(self.span())
    }

    pub fn boolean(&self, value: bool) -> Expression {
        Expression::Boolean(BooleanLiteral {
            value,
            span: self.span(),
        })
    }

    pub fn num(&self, value: f64) -> Expression {
        Expression::Number(NumberLiteral {
            value,
            span: self.span(),
        })
    }

    /// String literal whose raw token is the value in double quotes
    pub fn string(&self, value: &str) -> Expression {
        self.string_with_raw(&format!("\"{}\"", value), value)
    }

    /// String literal with an explicit raw token (quotes included)
    pub fn string_with_raw(&self, raw: &str, value: &str) -> Expression {
        Expression::String(StringLiteral {
            value: value.to_string(),
            span: self.raw(raw),
        })
    }

    pub fn regexp(&self, pattern: &str, flags: &str) -> Expression {
        Expression::RegExp(RegExpLiteral {
            pattern: pattern.to_string(),
            flags: flags.to_string(),
            span: self.span(),
        })
    }

    pub fn array(&self, elements: Vec<Option<Expression>>) -> Expression {
        Expression::Array(ArrayExpression {
            elements,
            span: self.span(),
        })
    }

    pub fn object(&self, properties: Vec<Property>) -> Expression {
        Expression::Object(ObjectExpression {
            properties,
            span: self.span(),
        })
    }

    /// `name: value`
    pub fn prop(&self, name: &str, value: Expression) -> Property {
        Property {
            key: PropertyKey::Identifier(self.id(name)),
            value: PropertyValue::Init(value),
            span: self.span(),
        }
    }

    /// `17: value`
    pub fn prop_number(&self, key: f64, value: Expression) -> Property {
        Property {
            key: PropertyKey::Number(NumberLiteral {
                value: key,
                span: self.span(),
            }),
            value: PropertyValue::Init(value),
            span: self.span(),
        }
    }

    /// `get name() { body }`
    pub fn getter(&self, name: &str, body: Vec<Statement>) -> Property {
        Property {
            key: PropertyKey::Identifier(self.id(name)),
            value: PropertyValue::Get(self.function(None, &[], body)),
            span: self.span(),
        }
    }

    /// `set name(param) { body }`
    pub fn setter(&self, name: &str, param: &str, body: Vec<Statement>) -> Property {
        Property {
            key: PropertyKey::Identifier(self.id(name)),
            value: PropertyValue::Set(self.function(None, &[param], body)),
            span: self.span(),
        }
    }

    pub fn function(&self, name: Option<&str>, params: &[&str], body: Vec<Statement>) -> Function {
        Function {
            name: name.map(|n| self.id(n)),
            params: params.iter().map(|p| self.id(p)).collect(),
            body,
            span: self.span(),
        }
    }

    pub fn func_expr(
        &self,
        name: Option<&str>,
        params: &[&str],
        body: Vec<Statement>,
    ) -> Expression {
        Expression::Function(self.function(name, params, body))
    }

    pub fn paren(&self, expression: Expression) -> Expression {
        Expression::Paren(ParenthesizedExpression {
            expression: Box::new(expression),
            span: self.span(),
        })
    }

    pub fn member(&self, object: Expression, property: &str) -> Expression {
        Expression::Member(MemberExpression {
            object: Box::new(object),
            property: self.id(property),
            span: self.span(),
        })
    }

    pub fn index(&self, object: Expression, index: Expression) -> Expression {
        Expression::Index(IndexExpression {
            object: Box::new(object),
            index: Box::new(index),
            span: self.span(),
        })
    }

    pub fn call(&self, callee: Expression, arguments: Vec<Expression>) -> Expression {
        Expression::Call(CallExpression {
            callee: Box::new(callee),
            arguments,
            span: self.span(),
        })
    }

    pub fn new_expr(&self, callee: Expression, arguments: Option<Vec<Expression>>) -> Expression {
        Expression::New(NewExpression {
            callee: Box::new(callee),
            arguments,
            span: self.span(),
        })
    }

    pub fn unary(&self, operator: UnaryOperator, argument: Expression) -> Expression {
        Expression::Unary(UnaryExpression {
            operator,
            argument: Box::new(argument),
            span: self.span(),
        })
    }

    pub fn typeof_(&self, argument: Expression) -> Expression {
        self.unary(UnaryOperator::TypeOf, argument)
    }

    pub fn delete(&self, argument: Expression) -> Expression {
        self.unary(UnaryOperator::Delete, argument)
    }

    pub fn not(&self, argument: Expression) -> Expression {
        self.unary(UnaryOperator::Not, argument)
    }

    pub fn update(
        &self,
        operator: UpdateOperator,
        prefix: bool,
        argument: Expression,
    ) -> Expression {
        Expression::Update(UpdateExpression {
            operator,
            prefix,
            argument: Box::new(argument),
            span: self.span(),
        })
    }

    /// `x++`
    pub fn post_inc(&self, argument: Expression) -> Expression {
        self.update(UpdateOperator::Increment, false, argument)
    }

    /// `++x`
    pub fn pre_inc(&self, argument: Expression) -> Expression {
        self.update(UpdateOperator::Increment, true, argument)
    }

    pub fn binary(
        &self,
        operator: BinaryOperator,
        left: Expression,
        right: Expression,
    ) -> Expression {
        Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span: self.span(),
        })
    }

    pub fn logical(
        &self,
        operator: LogicalOperator,
        left: Expression,
        right: Expression,
    ) -> Expression {
        Expression::Logical(LogicalExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            span: self.span(),
        })
    }

    pub fn and(&self, left: Expression, right: Expression) -> Expression {
        self.logical(LogicalOperator::And, left, right)
    }

    pub fn or(&self, left: Expression, right: Expression) -> Expression {
        self.logical(LogicalOperator::Or, left, right)
    }

    pub fn assign(&self, target: Expression, value: Expression) -> Expression {
        self.assign_op(AssignmentOperator::Assign, target, value)
    }

    pub fn assign_op(
        &self,
        operator: AssignmentOperator,
        target: Expression,
        value: Expression,
    ) -> Expression {
        Expression::Assignment(AssignmentExpression {
            operator,
            target: Box::new(target),
            value: Box::new(value),
            span: self.span(),
        })
    }

    pub fn cond(
        &self,
        test: Expression,
        consequent: Expression,
        alternate: Expression,
    ) -> Expression {
        Expression::Conditional(ConditionalExpression {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            span: self.span(),
        })
    }

    pub fn seq(&self, expressions: Vec<Expression>) -> Expression {
        Expression::Sequence(SequenceExpression {
            expressions,
            span: self.span(),
        })
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    pub fn declarator(&self, name: &str, init: Option<Expression>) -> VariableDeclarator {
        VariableDeclarator {
            name: self.id(name),
            init,
            span: self.span(),
        }
    }

    /// `var name = init;`
    pub fn var(&self, name: &str, init: Option<Expression>) -> Statement {
        self.vars(vec![self.declarator(name, init)])
    }

    pub fn vars(&self, declarations: Vec<VariableDeclarator>) -> Statement {
        Statement::Variable(VariableStatement {
            declarations,
            span: self.span(),
        })
    }

    pub fn function_decl(&self, name: &str, params: &[&str], body: Vec<Statement>) -> Statement {
        Statement::FunctionDecl(self.function(Some(name), params, body))
    }

    pub fn expr_stmt(&self, expression: Expression) -> Statement {
        Statement::Expression(self.expression_statement(expression))
    }

    fn expression_statement(&self, expression: Expression) -> ExpressionStatement {
        ExpressionStatement {
            expression,
            span: self.span(),
        }
    }

    /// `"text";` as a directive-prologue candidate
    pub fn directive(&self, text: &str) -> Statement {
        self.expr_stmt(self.string(text))
    }

    pub fn block_stmt(&self, body: Vec<Statement>) -> BlockStatement {
        BlockStatement {
            body,
            span: self.span(),
        }
    }

    pub fn block(&self, body: Vec<Statement>) -> Statement {
        Statement::Block(self.block_stmt(body))
    }

    pub fn empty(&self) -> Statement {
        Statement::Empty(self.span())
    }

    pub fn debugger(&self) -> Statement {
        Statement::Debugger(self.span())
    }

    pub fn if_else(
        &self,
        test: Expression,
        consequent: Statement,
        alternate: Option<Statement>,
    ) -> Statement {
        Statement::If(IfStatement {
            test,
            consequent: Box::new(consequent),
            alternate: alternate.map(Box::new),
            span: self.span(),
        })
    }

    pub fn while_loop(&self, test: Expression, body: Statement) -> Statement {
        Statement::While(WhileStatement {
            test,
            body: Box::new(body),
            span: self.span(),
        })
    }

    pub fn do_while(&self, body: Statement, test: Expression) -> Statement {
        Statement::DoWhile(DoWhileStatement {
            body: Box::new(body),
            test,
            span: self.span(),
        })
    }

    /// `var` initializer clause for `for`
    pub fn for_var_init(&self, declarations: Vec<VariableDeclarator>) -> ForInit {
        ForInit::Variable(VariableStatement {
            declarations,
            span: self.span(),
        })
    }

    /// Expression initializer clause for `for`
    pub fn for_expr_init(&self, expression: Expression) -> ForInit {
        ForInit::Expression(self.expression_statement(expression))
    }

    pub fn for_loop(
        &self,
        init: Option<ForInit>,
        test: Option<Expression>,
        update: Option<Expression>,
        body: Statement,
    ) -> Statement {
        Statement::For(ForStatement {
            init,
            test,
            update,
            body: Box::new(body),
            span: self.span(),
        })
    }

    /// `for (var name in right) body`
    pub fn for_in_var(&self, name: &str, right: Expression, body: Statement) -> Statement {
        Statement::ForIn(ForInStatement {
            left: ForInTarget::Variable(self.declarator(name, None)),
            right,
            body: Box::new(body),
            span: self.span(),
        })
    }

    /// `for (target in right) body`
    pub fn for_in(&self, target: Expression, right: Expression, body: Statement) -> Statement {
        Statement::ForIn(ForInStatement {
            left: ForInTarget::Expression(self.expression_statement(target)),
            right,
            body: Box::new(body),
            span: self.span(),
        })
    }

    pub fn continue_stmt(&self, label: Option<&str>) -> Statement {
        Statement::Continue(ContinueStatement {
            label: label.map(|l| self.id(l)),
            span: self.span(),
        })
    }

    pub fn break_stmt(&self, label: Option<&str>) -> Statement {
        Statement::Break(BreakStatement {
            label: label.map(|l| self.id(l)),
            span: self.span(),
        })
    }

    pub fn return_stmt(&self, argument: Option<Expression>) -> Statement {
        Statement::Return(ReturnStatement {
            argument,
            span: self.span(),
        })
    }

    pub fn with(&self, object: Expression, body: Statement) -> Statement {
        Statement::With(WithStatement {
            object,
            body: Box::new(body),
            span: self.span(),
        })
    }

    pub fn case(&self, test: Option<Expression>, consequent: Vec<Statement>) -> SwitchCase {
        SwitchCase {
            test,
            consequent,
            span: self.span(),
        }
    }

    pub fn switch(&self, discriminant: Expression, cases: Vec<SwitchCase>) -> Statement {
        Statement::Switch(SwitchStatement {
            discriminant,
            cases,
            span: self.span(),
        })
    }

    pub fn labelled(&self, label: &str, body: Statement) -> Statement {
        Statement::Labelled(LabelledStatement {
            label: self.id(label),
            body: Box::new(body),
            span: self.span(),
        })
    }

    pub fn throw(&self, argument: Expression) -> Statement {
        Statement::Throw(ThrowStatement {
            argument,
            span: self.span(),
        })
    }

    pub fn try_stmt(
        &self,
        block: Vec<Statement>,
        handler: Option<(&str, Vec<Statement>)>,
        finalizer: Option<Vec<Statement>>,
    ) -> Statement {
        Statement::Try(TryStatement {
            block: self.block_stmt(block),
            handler: handler.map(|(param, body)| CatchClause {
                param: self.id(param),
                body: self.block_stmt(body),
                span: self.span(),
            }),
            finalizer: finalizer.map(|body| self.block_stmt(body)),
            span: self.span(),
        })
    }
}
