//! IR expressions
//!
//! Expressions are trees, but the lowering pass keeps them shallow: operands
//! of operators, calls and property accesses are almost always temporaries or
//! argument/local slots, so the backend sees three-address style code.

use super::builtin::Builtin;
use super::module::{FunctionId, RegExpId};
use crate::interner::Symbol;

/// Temporary identifier, unique within one function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TempId(pub u32);

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Constant operand
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Const {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    /// Array hole marker passed to `defineArray`
    Missing,
    /// Unsigned integer used for counts and array indices in builtin calls
    UInt32(u32),
}

impl Const {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Const::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// Whether an `ArgLocal` names a formal parameter or a slotted local
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgLocalKind {
    Formal,
    Local,
}

/// Statically resolved parameter or local variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgLocal {
    pub kind: ArgLocalKind,
    /// Formal index or member slot
    pub index: u32,
    /// Number of function scopes between the use and the declaring scope
    pub scope: u32,
    /// Set when the slot belongs to a variable called `eval` or `arguments`
    pub is_arguments_or_eval: bool,
}

impl ArgLocal {
    pub fn formal(index: u32, scope: u32) -> Self {
        Self {
            kind: ArgLocalKind::Formal,
            index,
            scope,
            is_arguments_or_eval: false,
        }
    }

    pub fn local(index: u32, scope: u32) -> Self {
        Self {
            kind: ArgLocalKind::Local,
            index,
            scope,
            is_arguments_or_eval: false,
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    UMinus,
    UPlus,
    Compl,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::UMinus => "-",
            UnaryOp::UPlus => "+",
            UnaryOp::Compl => "~",
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitAnd,
    BitOr,
    BitXor,
    LShift,
    RShift,
    URShift,
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    InstanceOf,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::URShift => ">>>",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::StrictEqual => "===",
            BinaryOp::StrictNotEqual => "!==",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::In => "in",
            BinaryOp::InstanceOf => "instanceof",
        }
    }
}

/// IR expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(Const),
    Temp(TempId),
    ArgLocal(ArgLocal),
    /// Variable resolved by name at runtime
    Name(Symbol),
    /// Variable resolved on the global object
    GlobalName(Symbol),
    Member {
        base: Box<Expr>,
        name: Symbol,
    },
    Subscript {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Unop {
        op: UnaryOp,
        expr: Box<Expr>,
    },
    Binop {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// Runtime service; only ever used as a call target
    Builtin(Builtin),
    /// Function object for a module function
    Closure(FunctionId),
    RegExp(RegExpId),
    String(Symbol),
}

impl Expr {
    pub fn temp(id: TempId) -> Self {
        Expr::Temp(id)
    }

    pub fn undefined() -> Self {
        Expr::Const(Const::Undefined)
    }

    pub fn number(value: f64) -> Self {
        Expr::Const(Const::Number(value))
    }

    pub fn boolean(value: bool) -> Self {
        Expr::Const(Const::Bool(value))
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn builtin_call(builtin: Builtin, args: Vec<Expr>) -> Self {
        Self::call(Expr::Builtin(builtin), args)
    }

    pub fn binop(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binop {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn is_temp(&self) -> bool {
        matches!(self, Expr::Temp(_))
    }

    pub fn is_arg_local(&self) -> bool {
        matches!(self, Expr::ArgLocal(_))
    }

    /// Temp or ArgLocal: a slot the backend can address directly
    pub fn is_slot(&self) -> bool {
        matches!(self, Expr::Temp(_) | Expr::ArgLocal(_))
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Expr::Const(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Expr::String(_))
    }

    pub fn is_name(&self) -> bool {
        matches!(self, Expr::Name(_) | Expr::GlobalName(_))
    }

    pub fn is_call(&self) -> bool {
        matches!(self, Expr::Call { .. })
    }

    pub fn is_binop(&self) -> bool {
        matches!(self, Expr::Binop { .. })
    }

    /// Expressions that may appear as the target of a move
    pub fn is_lvalue(&self) -> bool {
        matches!(
            self,
            Expr::Temp(_)
                | Expr::ArgLocal(_)
                | Expr::Name(_)
                | Expr::GlobalName(_)
                | Expr::Member { .. }
                | Expr::Subscript { .. }
        )
    }

    pub fn as_const(&self) -> Option<&Const> {
        match self {
            Expr::Const(c) => Some(c),
            _ => None,
        }
    }


    pub fn as_arg_local(&self) -> Option<&ArgLocal> {
        match self {
            Expr::ArgLocal(a) => Some(a),
            _ => None,
        }
    }
}
