//! Literal constant folding
//!
//! Only numeric literals are folded, using the same conversions the runtime
//! applies (ToInt32/ToUint32 for bitwise and shift operators, JavaScript
//! truthiness for `!`, `&&` and `||`).

use crate::compiler::ir::{BinaryOp, Const, UnaryOp};

const TWO_POW_32: f64 = 4_294_967_296.0;
const TWO_POW_31: f64 = 2_147_483_648.0;

/// ECMAScript ToInt32
pub fn to_int32(value: f64) -> i32 {
    if !value.is_finite() || value == 0.0 {
        return 0;
    }
    let wrapped = value.trunc().rem_euclid(TWO_POW_32);
    if wrapped >= TWO_POW_31 {
        (wrapped - TWO_POW_32) as i32
    } else {
        wrapped as i32
    }
}

/// ECMAScript ToUint32
pub fn to_uint32(value: f64) -> u32 {
    to_int32(value) as u32
}

fn truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Fold a unary operator over a numeric literal
pub fn fold_unop(op: UnaryOp, value: f64) -> Const {
    match op {
        UnaryOp::Not => Const::Bool(!truthy(value)),
        UnaryOp::UMinus => Const::Number(-value),
        UnaryOp::UPlus => Const::Number(value),
        UnaryOp::Compl => Const::Number(f64::from(!to_int32(value))),
    }
}

/// Fold a binary operator over two numeric literals.
///
/// Returns `None` for `in` and `instanceof`, which depend on runtime objects.
pub fn fold_binop(op: BinaryOp, left: f64, right: f64) -> Option<Const> {
    let shift = to_uint32(right) & 0x1f;
    let folded = match op {
        BinaryOp::Add => Const::Number(left + right),
        BinaryOp::Sub => Const::Number(left - right),
        BinaryOp::Mul => Const::Number(left * right),
        BinaryOp::Div => Const::Number(left / right),
        BinaryOp::Mod => Const::Number(left % right),

        BinaryOp::BitAnd => Const::Number(f64::from(to_int32(left) & to_int32(right))),
        BinaryOp::BitOr => Const::Number(f64::from(to_int32(left) | to_int32(right))),
        BinaryOp::BitXor => Const::Number(f64::from(to_int32(left) ^ to_int32(right))),
        BinaryOp::LShift => Const::Number(f64::from(to_int32(left).wrapping_shl(shift))),
        BinaryOp::RShift => Const::Number(f64::from(to_int32(left) >> shift)),
        BinaryOp::URShift => Const::Number(f64::from(to_uint32(left) >> shift)),

        BinaryOp::Equal | BinaryOp::StrictEqual => Const::Bool(left == right),
        BinaryOp::NotEqual | BinaryOp::StrictNotEqual => Const::Bool(left != right),
        BinaryOp::Gt => Const::Bool(left > right),
        BinaryOp::Ge => Const::Bool(left >= right),
        BinaryOp::Lt => Const::Bool(left < right),
        BinaryOp::Le => Const::Bool(left <= right),

        BinaryOp::In | BinaryOp::InstanceOf => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(c: Option<Const>) -> f64 {
        match c {
            Some(Const::Number(n)) => n,
            other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test]
    fn test_to_int32_wraps() {
        assert_eq!(to_int32(1.9), 1);
        assert_eq!(to_int32(-1.9), -1);
        assert_eq!(to_int32(2147483648.0), -2147483648);
        assert_eq!(to_int32(4294967296.0 + 5.0), 5);
        assert_eq!(to_int32(f64::NAN), 0);
        assert_eq!(to_int32(f64::INFINITY), 0);
        assert_eq!(to_uint32(-1.0), 4294967295);
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(number(fold_binop(BinaryOp::Add, 1.0, 2.0)), 3.0);
        assert_eq!(number(fold_binop(BinaryOp::Mod, 7.5, 2.0)), 1.5);
        assert_eq!(number(fold_binop(BinaryOp::Mod, -7.0, 2.0)), -1.0);
        assert!(number(fold_binop(BinaryOp::Div, 0.0, 0.0)).is_nan());
        assert_eq!(number(fold_binop(BinaryOp::Div, 1.0, 0.0)), f64::INFINITY);
    }

    #[test]
    fn test_bitwise_and_shifts() {
        assert_eq!(number(fold_binop(BinaryOp::BitOr, 1.5, 2.0)), 3.0);
        assert_eq!(number(fold_binop(BinaryOp::LShift, 1.0, 33.0)), 2.0);
        assert_eq!(number(fold_binop(BinaryOp::RShift, -8.0, 1.0)), -4.0);
        assert_eq!(number(fold_binop(BinaryOp::URShift, -1.0, 0.0)), 4294967295.0);
        assert_eq!(number(fold_binop(BinaryOp::LShift, 1.0, 31.0)), -2147483648.0);
    }

    #[test]
    fn test_comparisons_follow_ieee() {
        assert_eq!(fold_binop(BinaryOp::Lt, 1.0, 2.0), Some(Const::Bool(true)));
        assert_eq!(
            fold_binop(BinaryOp::Equal, f64::NAN, f64::NAN),
            Some(Const::Bool(false))
        );
        assert_eq!(
            fold_binop(BinaryOp::StrictNotEqual, f64::NAN, f64::NAN),
            Some(Const::Bool(true))
        );
        assert_eq!(fold_binop(BinaryOp::Ge, 0.0, -0.0), Some(Const::Bool(true)));
    }

    #[test]
    fn test_never_folds_object_operators() {
        assert_eq!(fold_binop(BinaryOp::In, 1.0, 2.0), None);
        assert_eq!(fold_binop(BinaryOp::InstanceOf, 1.0, 2.0), None);
    }

    #[test]
    fn test_unary() {
        assert_eq!(fold_unop(UnaryOp::Not, 0.0), Const::Bool(true));
        assert_eq!(fold_unop(UnaryOp::Not, f64::NAN), Const::Bool(true));
        assert_eq!(fold_unop(UnaryOp::Not, 3.0), Const::Bool(false));
        assert_eq!(fold_unop(UnaryOp::UMinus, 3.0), Const::Number(-3.0));
        assert_eq!(fold_unop(UnaryOp::Compl, 5.0), Const::Number(-6.0));
    }
}
