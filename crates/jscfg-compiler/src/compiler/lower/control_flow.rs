//! Control Flow Lowering Utilities
//!
//! Helper structures for break/continue resolution and unwinding during
//! lowering.

use crate::ast::BlockStatement;
use crate::compiler::ir::BasicBlockId;
use thiserror::Error;

/// Context for a loop, switch or labelled statement
#[derive(Debug, Clone)]
pub struct LoopContext {
    /// Block to jump to for 'break'
    pub break_block: BasicBlockId,
    /// Block to jump to for 'continue' (none for switch and plain labels)
    pub continue_block: Option<BasicBlockId>,
    /// Label attached to the statement
    pub label: Option<String>,
    /// Length of the scope chain when the context was entered
    pub unwind_depth: usize,
}

impl LoopContext {
    pub fn new(
        break_block: BasicBlockId,
        continue_block: Option<BasicBlockId>,
        unwind_depth: usize,
    ) -> Self {
        Self {
            break_block,
            continue_block,
            label: None,
            unwind_depth,
        }
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    fn is_labelled(&self, label: &str) -> bool {
        self.label.as_deref() == Some(label)
    }
}

/// Where a break or continue goes and how much of the scope chain it leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JumpTarget {
    pub block: BasicBlockId,
    pub unwind_depth: usize,
}

/// Unresolvable break or continue
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JumpError {
    #[error("Break outside of loop")]
    BreakOutsideLoop,

    #[error("continue outside of loop")]
    ContinueOutsideLoop,

    #[error("Undefined label '{0}'")]
    UndefinedLabel(String),
}

/// Stack of active loop contexts for nested loops
#[derive(Debug, Default)]
pub struct LoopStack {
    stack: Vec<LoopContext>,
}

impl LoopStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ctx: LoopContext) {
        self.stack.push(ctx);
    }

    pub fn pop(&mut self) -> Option<LoopContext> {
        self.stack.pop()
    }

    /// Get the current (innermost) loop context
    pub fn current(&self) -> Option<&LoopContext> {
        self.stack.last()
    }

    /// Find the innermost context carrying `label`
    pub fn find_by_label(&self, label: &str) -> Option<&LoopContext> {
        self.stack.iter().rev().find(|ctx| ctx.is_labelled(label))
    }

    /// Resolve the target of a `break`
    pub fn break_target(&self, label: Option<&str>) -> Result<JumpTarget, JumpError> {
        let innermost = self.current().ok_or(JumpError::BreakOutsideLoop)?;
        let ctx = match label {
            None => innermost,
            Some(label) => self
                .find_by_label(label)
                .ok_or_else(|| JumpError::UndefinedLabel(label.to_string()))?,
        };
        Ok(JumpTarget {
            block: ctx.break_block,
            unwind_depth: ctx.unwind_depth,
        })
    }

    /// Resolve the target of a `continue`.
    ///
    /// Unlabelled, it skips contexts without a continue block (switches and
    /// labelled blocks). Labelled, the named context must be a loop.
    pub fn continue_target(&self, label: Option<&str>) -> Result<JumpTarget, JumpError> {
        let found = match label {
            None => self
                .stack
                .iter()
                .rev()
                .find(|ctx| ctx.continue_block.is_some())
                .ok_or(JumpError::ContinueOutsideLoop)?,
            Some(label) => self
                .find_by_label(label)
                .filter(|ctx| ctx.continue_block.is_some())
                .ok_or_else(|| JumpError::UndefinedLabel(label.to_string()))?,
        };
        match found.continue_block {
            Some(block) => Ok(JumpTarget {
                block,
                unwind_depth: found.unwind_depth,
            }),
            None => Err(JumpError::ContinueOutsideLoop),
        }
    }
}

/// Entry of the unwind chain: something that must be undone when control
/// leaves it by break, continue or return
#[derive(Debug, Clone, Copy)]
pub enum ScopeFrame<'a> {
    /// Inside a `with` body; leaving pops the with scope
    With,
    /// Inside a `catch` body; leaving pops the catch scope
    Catch,
    /// Inside a `try` or `catch` body; leaving runs the finalizer
    Try { finalizer: Option<&'a BlockStatement> },
}

impl ScopeFrame<'_> {
    pub fn pops_scope(&self) -> bool {
        matches!(self, ScopeFrame::With | ScopeFrame::Catch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_stack() {
        let mut stack = LoopStack::new();
        assert!(stack.break_target(None).is_err());

        stack.push(LoopContext::new(BasicBlockId(1), Some(BasicBlockId(2)), 0));
        assert_eq!(stack.break_target(None).unwrap().block, BasicBlockId(1));
        assert_eq!(stack.continue_target(None).unwrap().block, BasicBlockId(2));

        stack.push(
            LoopContext::new(BasicBlockId(3), Some(BasicBlockId(4)), 1)
                .with_label(Some("outer".to_string())),
        );
        let target = stack.break_target(Some("outer")).unwrap();
        assert_eq!(target.block, BasicBlockId(3));
        assert_eq!(target.unwind_depth, 1);

        stack.pop();
        stack.pop();
        assert!(stack.continue_target(None).is_err());
    }

    #[test]
    fn test_break_errors() {
        let mut stack = LoopStack::new();
        assert_eq!(stack.break_target(None), Err(JumpError::BreakOutsideLoop));
        assert_eq!(
            stack.break_target(Some("l")),
            Err(JumpError::BreakOutsideLoop)
        );

        stack.push(LoopContext::new(BasicBlockId(1), None, 0));
        assert_eq!(
            stack.break_target(Some("l")),
            Err(JumpError::UndefinedLabel("l".to_string()))
        );
    }

    #[test]
    fn test_continue_skips_switch_contexts() {
        let mut stack = LoopStack::new();
        stack.push(LoopContext::new(BasicBlockId(1), Some(BasicBlockId(2)), 0));
        stack.push(LoopContext::new(BasicBlockId(5), None, 0));
        assert_eq!(stack.continue_target(None).unwrap().block, BasicBlockId(2));
    }

    #[test]
    fn test_continue_errors() {
        let mut stack = LoopStack::new();
        assert_eq!(
            stack.continue_target(None),
            Err(JumpError::ContinueOutsideLoop)
        );

        stack.push(
            LoopContext::new(BasicBlockId(5), None, 0).with_label(Some("sw".to_string())),
        );
        assert_eq!(
            stack.continue_target(None),
            Err(JumpError::ContinueOutsideLoop)
        );
        assert_eq!(
            stack.continue_target(Some("sw")),
            Err(JumpError::UndefinedLabel("sw".to_string()))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(JumpError::BreakOutsideLoop.to_string(), "Break outside of loop");
        assert_eq!(
            JumpError::UndefinedLabel("x".to_string()).to_string(),
            "Undefined label 'x'"
        );
    }

    #[test]
    fn test_scope_frames() {
        assert!(ScopeFrame::With.pops_scope());
        assert!(ScopeFrame::Catch.pops_scope());
        assert!(!ScopeFrame::Try { finalizer: None }.pops_scope());
    }
}
