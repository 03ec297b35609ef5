//! Expression AST nodes
//!
//! This module defines all expression kinds:
//! - Literals (null, boolean, number, string, regexp, array, object)
//! - Identifiers, `this`, member and index access
//! - Operators (unary, update, binary, logical, assignment, conditional, comma)
//! - Calls, `new`, and function expressions

use super::*;

/// Expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Expression {
    /// `this`
    This(Span),

    /// Variable reference
    Identifier(Identifier),

    /// `null`
    Null(Span),

    /// `true` / `false`
    Boolean(BooleanLiteral),

    /// Numeric literal
    Number(NumberLiteral),

    /// String literal
    String(StringLiteral),

    /// `/pattern/flags`
    RegExp(RegExpLiteral),

    /// `[a, , b]`
    Array(ArrayExpression),

    /// `{ a: 1, get b() {} }`
    Object(ObjectExpression),

    /// Function expression
    Function(Function),

    /// `(expr)`
    Paren(ParenthesizedExpression),

    /// `object.property`
    Member(MemberExpression),

    /// `object[index]`
    Index(IndexExpression),

    /// `callee(args)`
    Call(CallExpression),

    /// `new callee(args)` / `new callee`
    New(NewExpression),

    /// `op argument`
    Unary(UnaryExpression),

    /// `++x`, `x--`
    Update(UpdateExpression),

    /// Arithmetic, comparison, bitwise, `in`, `instanceof`
    Binary(BinaryExpression),

    /// `&&` / `||`
    Logical(LogicalExpression),

    /// `target op= value`
    Assignment(AssignmentExpression),

    /// `test ? consequent : alternate`
    Conditional(ConditionalExpression),

    /// `a, b, c`
    Sequence(SequenceExpression),
}

impl Expression {
    /// Get the span of this expression
    pub fn span(&self) -> &Span {
        match self {
            Expression::This(span) => span,
            Expression::Identifier(e) => &e.span,
            Expression::Null(span) => span,
            Expression::Boolean(e) => &e.span,
            Expression::Number(e) => &e.span,
            Expression::String(e) => &e.span,
            Expression::RegExp(e) => &e.span,
            Expression::Array(e) => &e.span,
            Expression::Object(e) => &e.span,
            Expression::Function(e) => &e.span,
            Expression::Paren(e) => &e.span,
            Expression::Member(e) => &e.span,
            Expression::Index(e) => &e.span,
            Expression::Call(e) => &e.span,
            Expression::New(e) => &e.span,
            Expression::Unary(e) => &e.span,
            Expression::Update(e) => &e.span,
            Expression::Binary(e) => &e.span,
            Expression::Logical(e) => &e.span,
            Expression::Assignment(e) => &e.span,
            Expression::Conditional(e) => &e.span,
            Expression::Sequence(e) => &e.span,
        }
    }

    /// Identifier name if this is a plain identifier reference
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(id) => Some(id),
            _ => None,
        }
    }
}

// ============================================================================
// Literals
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanLiteral {
    pub value: bool,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumberLiteral {
    pub value: f64,

    #[serde(default)]
    pub span: Span,
}

/// String literal; `value` is the cooked text, `span` covers the quoted token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringLiteral {
    pub value: String,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegExpLiteral {
    pub pattern: String,

    #[serde(default)]
    pub flags: String,

    #[serde(default)]
    pub span: Span,
}

/// Array literal; `None` entries are holes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayExpression {
    pub elements: Vec<Option<Expression>>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectExpression {
    pub properties: Vec<Property>,

    #[serde(default)]
    pub span: Span,
}

/// Object literal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub key: PropertyKey,
    pub value: PropertyValue,

    #[serde(default)]
    pub span: Span,
}

/// Key of an object literal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PropertyKey {
    Identifier(Identifier),
    String(StringLiteral),
    Number(NumberLiteral),
}

impl PropertyKey {
    /// Property name as the runtime sees it
    pub fn name(&self) -> String {
        match self {
            PropertyKey::Identifier(id) => id.name.clone(),
            PropertyKey::String(s) => s.value.clone(),
            PropertyKey::Number(n) => number_to_string(n.value),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            PropertyKey::Identifier(id) => &id.span,
            PropertyKey::String(s) => &s.span,
            PropertyKey::Number(n) => &n.span,
        }
    }
}

/// Value half of an object literal entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum PropertyValue {
    /// `key: value`
    Init(Expression),
    /// `get key() { ... }`
    Get(Function),
    /// `set key(v) { ... }`
    Set(Function),
}

/// Format a number the way property keys are spelled at runtime.
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else {
        format!("{}", value)
    }
}

/// Canonical array index of a property name (`"0"`, `"17"`, never `"017"`).
pub fn array_index(name: &str) -> Option<u32> {
    if name.is_empty() || (name.len() > 1 && name.starts_with('0')) {
        return None;
    }
    if !name.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    name.parse::<u32>().ok().filter(|&index| index != u32::MAX)
}

// ============================================================================
// Access, calls and grouping
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParenthesizedExpression {
    pub expression: Box<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberExpression {
    pub object: Box<Expression>,
    pub property: Identifier,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexExpression {
    pub object: Box<Expression>,
    pub index: Box<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpression {
    pub callee: Box<Expression>,

    #[serde(default)]
    pub arguments: Vec<Expression>,

    #[serde(default)]
    pub span: Span,
}

/// `new` expression; `arguments` is `None` when no argument list was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewExpression {
    pub callee: Box<Expression>,

    #[serde(default)]
    pub arguments: Option<Vec<Expression>>,

    #[serde(default)]
    pub span: Span,
}

// ============================================================================
// Operators
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub argument: Box<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOperator {
    Delete,
    Void,
    TypeOf,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `~`
    BitNot,
    /// `!`
    Not,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateExpression {
    pub operator: UpdateOperator,
    pub prefix: bool,
    pub argument: Box<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOperator {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    StrictEqual,
    StrictNotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    LeftShift,
    RightShift,
    UnsignedRightShift,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitOr,
    BitXor,
    BitAnd,
    In,
    InstanceOf,
}

impl BinaryOperator {
    /// Comparison operators (including `in` and `instanceof`) produce a
    /// boolean and can drive a conditional jump directly.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Equal
                | BinaryOperator::NotEqual
                | BinaryOperator::StrictEqual
                | BinaryOperator::StrictNotEqual
                | BinaryOperator::Less
                | BinaryOperator::LessEqual
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEqual
                | BinaryOperator::In
                | BinaryOperator::InstanceOf
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalExpression {
    pub operator: LogicalOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicalOperator {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentExpression {
    pub operator: AssignmentOperator,
    pub target: Box<Expression>,
    pub value: Box<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssignmentOperator {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
}

impl AssignmentOperator {
    /// Underlying binary operator of a compound assignment
    pub fn binary_operator(self) -> Option<BinaryOperator> {
        match self {
            AssignmentOperator::Assign => None,
            AssignmentOperator::AddAssign => Some(BinaryOperator::Add),
            AssignmentOperator::SubAssign => Some(BinaryOperator::Sub),
            AssignmentOperator::MulAssign => Some(BinaryOperator::Mul),
            AssignmentOperator::DivAssign => Some(BinaryOperator::Div),
            AssignmentOperator::ModAssign => Some(BinaryOperator::Mod),
            AssignmentOperator::LeftShiftAssign => Some(BinaryOperator::LeftShift),
            AssignmentOperator::RightShiftAssign => Some(BinaryOperator::RightShift),
            AssignmentOperator::UnsignedRightShiftAssign => {
                Some(BinaryOperator::UnsignedRightShift)
            }
            AssignmentOperator::BitAndAssign => Some(BinaryOperator::BitAnd),
            AssignmentOperator::BitOrAssign => Some(BinaryOperator::BitOr),
            AssignmentOperator::BitXorAssign => Some(BinaryOperator::BitXor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalExpression {
    pub test: Box<Expression>,
    pub consequent: Box<Expression>,
    pub alternate: Box<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceExpression {
    pub expressions: Vec<Expression>,

    #[serde(default)]
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_index_is_canonical() {
        assert_eq!(array_index("0"), Some(0));
        assert_eq!(array_index("42"), Some(42));
        assert_eq!(array_index("042"), None);
        assert_eq!(array_index("-1"), None);
        assert_eq!(array_index("4294967295"), None);
        assert_eq!(array_index("4294967294"), Some(4294967294));
        assert_eq!(array_index("length"), None);
    }

    #[test]
    fn test_numeric_keys_spelled_like_runtime() {
        assert_eq!(number_to_string(1.0), "1");
        assert_eq!(number_to_string(-0.0), "0");
        assert_eq!(number_to_string(2.5), "2.5");
        assert_eq!(number_to_string(f64::NAN), "NaN");
    }

    #[test]
    fn test_compound_assignment_operator() {
        assert_eq!(AssignmentOperator::Assign.binary_operator(), None);
        assert_eq!(
            AssignmentOperator::UnsignedRightShiftAssign.binary_operator(),
            Some(BinaryOperator::UnsignedRightShift)
        );
    }
}
