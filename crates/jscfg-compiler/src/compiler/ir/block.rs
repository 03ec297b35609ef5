//! Basic Blocks and Control Flow
//!
//! Basic blocks are sequences of statements with a single entry point and a
//! single exit point (the terminator). Each block also records the block that
//! receives control when one of its statements throws.

use super::stmt::Stmt;

/// Basic block identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BasicBlockId(pub u32);

impl std::fmt::Display for BasicBlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A basic block: sequence of statements with single entry and exit
#[derive(Debug, Clone)]
pub struct BasicBlock {
    /// Unique identifier for this block
    pub id: BasicBlockId,
    /// Block that handles exceptions raised in this block
    pub handler: Option<BasicBlockId>,
    /// Statements, the last of which is the terminator once one is appended
    statements: Vec<Stmt>,
}

impl BasicBlock {
    pub fn new(id: BasicBlockId, handler: Option<BasicBlockId>) -> Self {
        Self {
            id,
            handler,
            statements: Vec::new(),
        }
    }

    /// Append a statement.
    ///
    /// Statements appended after the terminator are dropped; returns whether
    /// the statement was kept.
    pub fn append(&mut self, stmt: Stmt) -> bool {
        if self.is_terminated() {
            return false;
        }
        self.statements.push(stmt);
        true
    }

    pub fn statements(&self) -> &[Stmt] {
        &self.statements
    }

    /// Statements before the terminator
    pub fn body(&self) -> &[Stmt] {
        match self.statements.split_last() {
            Some((last, rest)) if last.is_terminator() => rest,
            _ => &self.statements,
        }
    }

    pub fn terminator(&self) -> Option<&Stmt> {
        self.statements.last().filter(|s| s.is_terminator())
    }

    pub fn is_terminated(&self) -> bool {
        self.terminator().is_some()
    }

    /// Successor blocks through the terminator
    pub fn successors(&self) -> Vec<BasicBlockId> {
        self.terminator().map(Stmt::successors).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}
