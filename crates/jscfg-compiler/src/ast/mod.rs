//! Abstract Syntax Tree
//!
//! The tree handed over by the external parser. Node kinds are closed enums of
//! span-carrying structs:
//! - Statements (declarations, control flow, exception handling)
//! - Expressions (literals, operators, calls, function expressions)
//!
//! The compiler only borrows the tree. Per-node compiler state lives in side
//! tables keyed by [`NodeKey`].

pub mod build;
pub mod expression;
pub mod span;
pub mod statement;
pub mod visitor;

pub use expression::*;
pub use span::Span;
pub use statement::*;
pub use visitor::*;

use serde::{Deserialize, Serialize};

/// Root node of a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Source elements in order
    pub body: Vec<Statement>,

    #[serde(default)]
    pub span: Span,
}

impl Program {
    pub fn new(body: Vec<Statement>) -> Self {
        Self {
            body,
            span: Span::default(),
        }
    }

    /// Read a program from its JSON interchange form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the program to its JSON interchange form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Identifier with its location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identifier {
    pub name: String,

    #[serde(default)]
    pub span: Span,
}

impl Identifier {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Function-like node: declaration, expression, or accessor body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// Name (absent for anonymous expressions and accessors)
    #[serde(default)]
    pub name: Option<Identifier>,

    /// Formal parameters in order
    #[serde(default)]
    pub params: Vec<Identifier>,

    /// Body statements
    #[serde(default)]
    pub body: Vec<Statement>,

    /// Location of the whole function, starting at the `function` keyword
    #[serde(default)]
    pub span: Span,
}

impl Function {
    pub fn name_str(&self) -> &str {
        self.name.as_ref().map(|n| n.name.as_str()).unwrap_or("")
    }

    pub fn is_named(&self) -> bool {
        self.name.as_ref().is_some_and(|n| !n.name.is_empty())
    }
}

/// Identity of a borrowed AST node, used to key compiler side tables.
///
/// Valid only while the tree it was taken from is borrowed and unmoved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

impl NodeKey {
    pub fn of<T>(node: &T) -> Self {
        NodeKey(node as *const T as usize)
    }
}
