//! IR statements
//!
//! `Jump`, `CJump` and `Ret` terminate a basic block; `Move` and `Exp` are
//! ordinary straight-line statements.

use super::block::BasicBlockId;
use super::expr::{BinaryOp, Expr};

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    /// `target = source`, or `target op= source` for compound moves
    Move {
        target: Expr,
        source: Expr,
        op: Option<BinaryOp>,
    },
    /// Expression evaluated for its side effects (calls)
    Exp(Expr),
    Jump(BasicBlockId),
    CJump {
        cond: Expr,
        iftrue: BasicBlockId,
        iffalse: BasicBlockId,
    },
    Ret(Expr),
}

impl Stmt {
    pub fn is_terminator(&self) -> bool {
        matches!(self, Stmt::Jump(_) | Stmt::CJump { .. } | Stmt::Ret(_))
    }

    /// Blocks control may flow to after this statement
    pub fn successors(&self) -> Vec<BasicBlockId> {
        match self {
            Stmt::Jump(target) => vec![*target],
            Stmt::CJump { iftrue, iffalse, .. } => vec![*iftrue, *iffalse],
            Stmt::Move { .. } | Stmt::Exp(_) | Stmt::Ret(_) => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::ir::TempId;

    #[test]
    fn test_terminator_successors() {
        let jump = Stmt::Jump(BasicBlockId(1));
        assert!(jump.is_terminator());
        assert_eq!(jump.successors(), vec![BasicBlockId(1)]);

        let branch = Stmt::CJump {
            cond: Expr::Temp(TempId(0)),
            iftrue: BasicBlockId(1),
            iffalse: BasicBlockId(2),
        };
        assert_eq!(branch.successors(), vec![BasicBlockId(1), BasicBlockId(2)]);

        let ret = Stmt::Ret(Expr::Temp(TempId(0)));
        assert!(ret.is_terminator());
        assert!(ret.successors().is_empty());

        assert!(!Stmt::Exp(Expr::undefined()).is_terminator());
    }
}
