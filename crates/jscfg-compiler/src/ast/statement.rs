//! Statement AST nodes
//!
//! This module defines all statement kinds, including:
//! - `var` declarations and function declarations
//! - Control flow statements (if, loops, switch, labelled, break/continue)
//! - Exception handling (throw, try/catch/finally) and `with`

use super::*;

/// Source element or statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Statement {
    /// `var a = 1, b;`
    Variable(VariableStatement),

    /// Function declaration
    FunctionDecl(Function),

    /// Expression statement (e.g., function call)
    Expression(ExpressionStatement),

    /// `{ ... }`
    Block(BlockStatement),

    /// `;`
    Empty(Span),

    /// If statement
    If(IfStatement),

    /// While loop
    While(WhileStatement),

    /// Do-while loop
    DoWhile(DoWhileStatement),

    /// For loop
    For(ForStatement),

    /// For-in loop
    ForIn(ForInStatement),

    /// Continue statement
    Continue(ContinueStatement),

    /// Break statement
    Break(BreakStatement),

    /// Return statement
    Return(ReturnStatement),

    /// With statement
    With(WithStatement),

    /// Switch statement
    Switch(SwitchStatement),

    /// `label: statement`
    Labelled(LabelledStatement),

    /// Throw statement
    Throw(ThrowStatement),

    /// Try-catch-finally
    Try(TryStatement),

    /// `debugger;`
    Debugger(Span),
}

impl Statement {
    /// Get the span of this statement
    pub fn span(&self) -> &Span {
        match self {
            Statement::Variable(s) => &s.span,
            Statement::FunctionDecl(s) => &s.span,
            Statement::Expression(s) => &s.span,
            Statement::Block(s) => &s.span,
            Statement::Empty(span) => span,
            Statement::If(s) => &s.span,
            Statement::While(s) => &s.span,
            Statement::DoWhile(s) => &s.span,
            Statement::For(s) => &s.span,
            Statement::ForIn(s) => &s.span,
            Statement::Continue(s) => &s.span,
            Statement::Break(s) => &s.span,
            Statement::Return(s) => &s.span,
            Statement::With(s) => &s.span,
            Statement::Switch(s) => &s.span,
            Statement::Labelled(s) => &s.span,
            Statement::Throw(s) => &s.span,
            Statement::Try(s) => &s.span,
            Statement::Debugger(span) => span,
        }
    }

    /// Check if this statement owns a loop or switch context that a label
    /// can attach to
    pub fn is_breakable(&self) -> bool {
        matches!(
            self,
            Statement::While(_)
                | Statement::DoWhile(_)
                | Statement::For(_)
                | Statement::ForIn(_)
                | Statement::Switch(_)
        )
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// `var` statement with one or more declarators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableStatement {
    pub declarations: Vec<VariableDeclarator>,

    #[serde(default)]
    pub span: Span,
}

/// Single `name = init` entry of a `var` statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDeclarator {
    pub name: Identifier,

    #[serde(default)]
    pub init: Option<Expression>,

    #[serde(default)]
    pub span: Span,
}

// ============================================================================
// Simple statements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionStatement {
    pub expression: Expression,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockStatement {
    pub body: Vec<Statement>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement {
    #[serde(default)]
    pub argument: Option<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowStatement {
    pub argument: Expression,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakStatement {
    #[serde(default)]
    pub label: Option<Identifier>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinueStatement {
    #[serde(default)]
    pub label: Option<Identifier>,

    #[serde(default)]
    pub span: Span,
}

// ============================================================================
// Control flow
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IfStatement {
    pub test: Expression,
    pub consequent: Box<Statement>,

    #[serde(default)]
    pub alternate: Option<Box<Statement>>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhileStatement {
    pub test: Expression,
    pub body: Box<Statement>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoWhileStatement {
    pub body: Box<Statement>,
    pub test: Expression,

    #[serde(default)]
    pub span: Span,
}

/// `for (init; test; update) body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForStatement {
    #[serde(default)]
    pub init: Option<ForInit>,

    #[serde(default)]
    pub test: Option<Expression>,

    #[serde(default)]
    pub update: Option<Expression>,

    pub body: Box<Statement>,

    #[serde(default)]
    pub span: Span,
}

/// Initializer clause of a `for` loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForInit {
    /// `for (var i = 0, j; ...)`
    Variable(VariableStatement),
    /// `for (i = 0; ...)`
    Expression(ExpressionStatement),
}

/// `for (left in right) body`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForInStatement {
    pub left: ForInTarget,
    pub right: Expression,
    pub body: Box<Statement>,

    #[serde(default)]
    pub span: Span,
}

/// Binding target of a `for-in` loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ForInTarget {
    /// `for (var key in obj)`
    Variable(VariableDeclarator),
    /// `for (obj.key in other)`
    Expression(ExpressionStatement),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchStatement {
    pub discriminant: Expression,

    /// Clauses in source order; the default clause has no test
    pub cases: Vec<SwitchCase>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchCase {
    /// Case label value (`None` for `default:`)
    #[serde(default)]
    pub test: Option<Expression>,

    #[serde(default)]
    pub consequent: Vec<Statement>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelledStatement {
    pub label: Identifier,
    pub body: Box<Statement>,

    #[serde(default)]
    pub span: Span,
}

// ============================================================================
// Scopes and exceptions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithStatement {
    pub object: Expression,
    pub body: Box<Statement>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TryStatement {
    pub block: BlockStatement,

    #[serde(default)]
    pub handler: Option<CatchClause>,

    #[serde(default)]
    pub finalizer: Option<BlockStatement>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchClause {
    pub param: Identifier,
    pub body: BlockStatement,

    #[serde(default)]
    pub span: Span,
}
