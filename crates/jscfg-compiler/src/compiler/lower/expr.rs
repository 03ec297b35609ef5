//! Expression lowering

use super::{Format, Lowerer};
use crate::ast::{
    array_index, ArrayExpression, AssignmentExpression, BinaryExpression, BinaryOperator,
    CallExpression, ConditionalExpression, Expression, LogicalExpression, LogicalOperator,
    NewExpression, ObjectExpression, PropertyValue, SequenceExpression, Span, UnaryExpression,
    UnaryOperator, UpdateExpression, UpdateOperator,
};
use crate::compiler::ir::{ArgLocalKind, BinaryOp, Builtin, Const, Expr, JsClassMember, UnaryOp};
use std::collections::BTreeMap;

/// Map a source binary operator to its IR counterpart
pub(super) fn binary_op(op: BinaryOperator) -> BinaryOp {
    match op {
        BinaryOperator::Equal => BinaryOp::Equal,
        BinaryOperator::NotEqual => BinaryOp::NotEqual,
        BinaryOperator::StrictEqual => BinaryOp::StrictEqual,
        BinaryOperator::StrictNotEqual => BinaryOp::StrictNotEqual,
        BinaryOperator::Less => BinaryOp::Lt,
        BinaryOperator::LessEqual => BinaryOp::Le,
        BinaryOperator::Greater => BinaryOp::Gt,
        BinaryOperator::GreaterEqual => BinaryOp::Ge,
        BinaryOperator::LeftShift => BinaryOp::LShift,
        BinaryOperator::RightShift => BinaryOp::RShift,
        BinaryOperator::UnsignedRightShift => BinaryOp::URShift,
        BinaryOperator::Add => BinaryOp::Add,
        BinaryOperator::Sub => BinaryOp::Sub,
        BinaryOperator::Mul => BinaryOp::Mul,
        BinaryOperator::Div => BinaryOp::Div,
        BinaryOperator::Mod => BinaryOp::Mod,
        BinaryOperator::BitOr => BinaryOp::BitOr,
        BinaryOperator::BitXor => BinaryOp::BitXor,
        BinaryOperator::BitAnd => BinaryOp::BitAnd,
        BinaryOperator::In => BinaryOp::In,
        BinaryOperator::InstanceOf => BinaryOp::InstanceOf,
    }
}

/// What an object literal binds to one key
#[derive(Debug, Default)]
struct PropertySlot {
    value: Option<Expr>,
    getter: Option<Expr>,
    setter: Option<Expr>,
}

impl PropertySlot {
    fn has_accessor(&self) -> bool {
        self.getter.is_some() || self.setter.is_some()
    }

    /// Flag, then value or getter/setter pair, as `defineObjectLiteral` reads them
    fn push_args(self, args: &mut Vec<Expr>) {
        match self.value {
            Some(value) => {
                args.push(Expr::boolean(true));
                args.push(value);
            }
            None => {
                args.push(Expr::boolean(false));
                args.push(self.getter.unwrap_or_else(Expr::undefined));
                args.push(self.setter.unwrap_or_else(Expr::undefined));
            }
        }
    }
}

impl<'a, 'm> Lowerer<'a, 'm> {
    /// Lower `expression` against the requested format.
    ///
    /// Returns `None` once an error has been recorded, when a `Cx` request
    /// already emitted its jumps, or when an `Nx` request left no value.
    pub(super) fn accept(&mut self, expression: &'a Expression, format: Format) -> Option<Expr> {
        if self.has_error() {
            return None;
        }

        match expression {
            Expression::This(_) => Some(Expr::Name(self.module.intern("this"))),
            Expression::Identifier(id) => Some(self.identifier(&id.name)),
            Expression::Null(_) => match format {
                Format::Cx { iffalse, .. } => {
                    self.jump(iffalse);
                    None
                }
                _ => Some(Expr::Const(Const::Null)),
            },
            Expression::Boolean(lit) => self.literal(Const::Bool(lit.value), lit.value, format),
            Expression::Number(lit) => self.literal(
                Const::Number(lit.value),
                lit.value != 0.0 && !lit.value.is_nan(),
                format,
            ),
            Expression::String(lit) => Some(Expr::String(self.module.intern(&lit.value))),
            Expression::RegExp(lit) => {
                Some(Expr::RegExp(self.module.add_regexp(&lit.pattern, &lit.flags)))
            }
            Expression::Array(array) => self.array_literal(array),
            Expression::Object(object) => self.object_literal(object),
            Expression::Function(function) => Some(self.closure(function)),
            Expression::Paren(paren) => self.accept(&paren.expression, format),
            Expression::Member(member) => {
                let base = self.expression(&member.object)?;
                Some(self.member(base, &member.property.name))
            }
            Expression::Index(index) => {
                let base = self.expression(&index.object)?;
                let subscript = self.expression(&index.index)?;
                Some(self.subscript(base, subscript))
            }
            Expression::Call(call) => self.call_expression(call),
            Expression::New(new) => self.new_expression(new),
            Expression::Unary(unary) => self.unary_expression(unary),
            Expression::Update(update) => self.update_expression(update, format),
            Expression::Binary(binary) => self.binary_expression(binary, format),
            Expression::Logical(logical) => self.logical_expression(logical, format),
            Expression::Assignment(assign) => self.assignment_expression(assign, format),
            Expression::Conditional(cond) => self.conditional_expression(cond),
            Expression::Sequence(seq) => self.sequence_expression(seq, format),
        }
    }

    /// Constants branch directly in a condition
    fn literal(&mut self, value: Const, truthy: bool, format: Format) -> Option<Expr> {
        match format {
            Format::Cx { iftrue, iffalse } => {
                self.jump(if truthy { iftrue } else { iffalse });
                None
            }
            _ => Some(Expr::Const(value)),
        }
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn array_literal(&mut self, array: &'a ArrayExpression) -> Option<Expr> {
        let mut args = Vec::with_capacity(array.elements.len());
        for element in &array.elements {
            let value = match element {
                Some(element) => self.expression(element)?,
                None => Expr::Const(Const::Missing),
            };
            let value = if value.is_slot() || value.is_const() {
                value
            } else {
                self.materialize(value)
            };
            args.push(value);
        }
        let result = self.new_temp();
        self.move_to(
            Expr::Temp(result),
            Expr::builtin_call(Builtin::DefineArray, args),
        );
        Some(Expr::Temp(result))
    }

    fn object_literal(&mut self, object: &'a ObjectExpression) -> Option<Expr> {
        let mut slots: BTreeMap<String, PropertySlot> = BTreeMap::new();

        for property in &object.properties {
            let key = property.key.name();
            match &property.value {
                PropertyValue::Init(init) => {
                    let value = self.expression(init)?;
                    let value = self.temp(value);
                    let slot = slots.entry(key.clone()).or_default();
                    if slot.has_accessor() || (self.is_strict() && slot.value.is_some()) {
                        self.duplicate_key(property.span, &key);
                        return None;
                    }
                    slot.value = Some(value);
                }
                PropertyValue::Get(function) | PropertyValue::Set(function) => {
                    let is_getter = matches!(property.value, PropertyValue::Get(_));
                    let closure = self.closure(function);
                    let slot = slots.entry(key.clone()).or_default();
                    let taken = if is_getter {
                        slot.getter.is_some()
                    } else {
                        slot.setter.is_some()
                    };
                    if slot.value.is_some() || taken {
                        self.duplicate_key(property.span, &key);
                        return None;
                    }
                    if is_getter {
                        slot.getter = Some(closure);
                    } else {
                        slot.setter = Some(closure);
                    }
                }
            }
        }

        let mut named = Vec::new();
        let mut indexed = Vec::new();
        for (key, slot) in slots {
            match array_index(&key) {
                Some(index) => indexed.push((index, slot)),
                None => named.push((key, slot)),
            }
        }

        let members = named
            .iter()
            .map(|(key, slot)| JsClassMember {
                name: self.module.intern(key),
                is_accessor: slot.value.is_none(),
            })
            .collect();
        let class = self.module.register_js_class(members);
        log::trace!("object literal shape {:?} with {} named key(s)", class, named.len());

        let mut args = vec![Expr::Const(Const::UInt32(named.len() as u32))];
        for (key, slot) in named {
            args.push(Expr::Name(self.module.intern(&key)));
            slot.push_args(&mut args);
        }
        for (index, slot) in indexed {
            args.push(Expr::Const(Const::UInt32(index)));
            slot.push_args(&mut args);
        }

        let result = self.new_temp();
        self.move_to(
            Expr::Temp(result),
            Expr::builtin_call(Builtin::DefineObjectLiteral, args),
        );
        Some(Expr::Temp(result))
    }

    fn duplicate_key(&mut self, span: Span, key: &str) {
        self.syntax_error(
            span,
            format!("Illegal duplicate key '{}' in object literal", key),
        );
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn call_expression(&mut self, call: &'a CallExpression) -> Option<Expr> {
        let base = self.expression(&call.callee)?;
        let mut args = Vec::with_capacity(call.arguments.len());
        for arg in &call.arguments {
            let value = self.expression(arg)?;
            args.push(self.argument(value));
        }
        Some(self.call(base, args))
    }

    fn new_expression(&mut self, new: &'a NewExpression) -> Option<Expr> {
        let base = self.expression(&new.callee)?;
        let callee = match base {
            Expr::Temp(_)
            | Expr::ArgLocal(_)
            | Expr::Name(_)
            | Expr::GlobalName(_)
            | Expr::Member { .. } => base,
            other => self.materialize(other),
        };

        let Some(arguments) = &new.arguments else {
            return Some(Expr::New {
                callee: Box::new(callee),
                args: Vec::new(),
            });
        };

        let mut args = Vec::with_capacity(arguments.len());
        for arg in arguments {
            let value = self.expression(arg)?;
            args.push(self.argument(value));
        }
        let result = self.new_temp();
        self.move_to(
            Expr::Temp(result),
            Expr::New {
                callee: Box::new(callee),
                args,
            },
        );
        Some(Expr::Temp(result))
    }

    // ========================================================================
    // Unary operators
    // ========================================================================

    fn unary_expression(&mut self, unary: &'a UnaryExpression) -> Option<Expr> {
        let op = match unary.operator {
            UnaryOperator::Void => {
                self.expression_statement(&unary.argument);
                return Some(Expr::undefined());
            }
            UnaryOperator::TypeOf => return self.typeof_expression(&unary.argument),
            UnaryOperator::Delete => return self.delete_expression(&unary.argument, unary.span),
            UnaryOperator::Plus => UnaryOp::UPlus,
            UnaryOperator::Minus => UnaryOp::UMinus,
            UnaryOperator::BitNot => UnaryOp::Compl,
            UnaryOperator::Not => UnaryOp::Not,
        };

        let value = self.expression(&unary.argument)?;
        let result = self.new_temp();
        let value = self.unop(op, value);
        self.move_to(Expr::Temp(result), value);
        Some(Expr::Temp(result))
    }

    fn typeof_expression(&mut self, argument: &'a Expression) -> Option<Expr> {
        let value = self.expression(argument)?;
        let (builtin, args) = match self.reference(value) {
            Expr::Name(name) | Expr::GlobalName(name) => {
                (Builtin::TypeofName, vec![Expr::String(name)])
            }
            Expr::Member { base, name } => (Builtin::TypeofMember, vec![*base, Expr::String(name)]),
            Expr::Subscript { base, index } => (Builtin::TypeofSubscript, vec![*base, *index]),
            other => (Builtin::TypeofValue, vec![other]),
        };
        Some(Expr::builtin_call(builtin, args))
    }

    fn delete_expression(&mut self, argument: &'a Expression, span: Span) -> Option<Expr> {
        let value = self.expression(argument)?;

        if let Expr::ArgLocal(local) = &value {
            let declared = local.kind == ArgLocalKind::Formal
                || self
                    .current_env()
                    .is_some_and(|env| local.index < env.member_count());
            if declared {
                if self.is_strict() {
                    self.syntax_error(span, "Delete of an unqualified identifier in strict mode.");
                    return None;
                }
                return Some(Expr::boolean(false));
            }
        }
        if self.is_strict() && value.is_name() {
            self.syntax_error(span, "Delete of an unqualified identifier in strict mode.");
            return None;
        }

        let call = match value {
            Expr::Const(_) | Expr::String(_) | Expr::Temp(_) | Expr::ArgLocal(_) => {
                return Some(Expr::boolean(true));
            }
            call @ Expr::Call { .. } => {
                self.exp(call);
                return Some(Expr::boolean(true));
            }
            Expr::Member { base, name } => {
                Expr::builtin_call(Builtin::DeleteMember, vec![*base, Expr::String(name)])
            }
            Expr::Subscript { base, index } => {
                Expr::builtin_call(Builtin::DeleteSubscript, vec![*base, *index])
            }
            Expr::Name(name) | Expr::GlobalName(name) => {
                Expr::builtin_call(Builtin::DeleteName, vec![Expr::String(name)])
            }
            other => {
                self.materialize(other);
                return Some(Expr::boolean(true));
            }
        };
        Some(call)
    }

    fn update_expression(&mut self, update: &'a UpdateExpression, format: Format) -> Option<Expr> {
        let value = self.expression(&update.argument)?;
        let span = update.span;

        if update.prefix {
            if !value.is_lvalue() {
                self.reference_error(
                    span,
                    "Prefix ++ operator applied to value that is not a reference.",
                );
                return None;
            }
            if self.check_eval_or_arguments(&value, span) {
                return None;
            }

            let op = match update.operator {
                UpdateOperator::Increment => {
                    let number = self.unop(UnaryOp::UPlus, value.clone());
                    self.binop(BinaryOp::Add, number, Expr::number(1.0))
                }
                UpdateOperator::Decrement => {
                    self.binop(BinaryOp::Sub, value.clone(), Expr::number(1.0))
                }
            };
            if format == Format::Nx {
                self.move_to(value, op);
                return None;
            }
            let result = self.materialize(op);
            self.move_to(value, result.clone());
            return Some(result);
        }

        if !value.is_lvalue() {
            self.reference_error(span, "Invalid left-hand side expression in postfix operation");
            return None;
        }
        if self.check_eval_or_arguments(&value, span) {
            return None;
        }

        let number = self.unop(UnaryOp::UPlus, value.clone());
        let old = self.materialize(number);
        let op = match update.operator {
            UpdateOperator::Increment => BinaryOp::Add,
            UpdateOperator::Decrement => BinaryOp::Sub,
        };
        let updated = self.binop(op, old.clone(), Expr::number(1.0));
        let updated = self.materialize(updated);
        self.move_to(value, updated);

        if format == Format::Nx {
            None
        } else {
            Some(old)
        }
    }

    // ========================================================================
    // Binary operators
    // ========================================================================

    fn binary_expression(&mut self, binary: &'a BinaryExpression, format: Format) -> Option<Expr> {
        let op = binary_op(binary.operator);

        let left = self.expression(&binary.left)?;
        let left = if left.is_slot() || left.is_const() || left.is_string() {
            left
        } else {
            self.materialize(left)
        };
        let right = self.expression(&binary.right)?;

        if binary.operator.is_comparison() {
            if let Format::Cx { iftrue, iffalse } = format {
                let cond = self.binop(op, left, right);
                self.cjump(cond, iftrue, iffalse);
                return None;
            }
        }

        let value = self.binop(op, left, right);
        if value.is_const() || value.is_string() {
            Some(value)
        } else {
            Some(self.materialize(value))
        }
    }

    fn logical_expression(
        &mut self,
        logical: &'a LogicalExpression,
        format: Format,
    ) -> Option<Expr> {
        if let Format::Cx { iftrue, iffalse } = format {
            let rhs = self.new_block();
            match logical.operator {
                LogicalOperator::And => self.condition(&logical.left, rhs, iffalse),
                LogicalOperator::Or => self.condition(&logical.left, iftrue, rhs),
            }
            self.set_block(rhs);
            self.condition(&logical.right, iftrue, iffalse);
            return None;
        }

        let rhs = self.new_block();
        let endif = self.new_block();
        let result = self.new_temp();

        let left = self.expression(&logical.left)?;
        self.move_to(Expr::Temp(result), left);
        match logical.operator {
            LogicalOperator::And => self.cjump(Expr::Temp(result), rhs, endif),
            LogicalOperator::Or => self.cjump(Expr::Temp(result), endif, rhs),
        }

        self.set_block(rhs);
        let right = self.expression(&logical.right)?;
        self.move_to(Expr::Temp(result), right);
        self.jump(endif);

        self.set_block(endif);
        Some(Expr::Temp(result))
    }

    fn assignment_expression(
        &mut self,
        assign: &'a AssignmentExpression,
        format: Format,
    ) -> Option<Expr> {
        let span = assign.span;
        let left = self.expression(&assign.target)?;
        if self.check_eval_or_arguments(&left, span) {
            return None;
        }
        let right = self.expression(&assign.value)?;

        let Some(op) = assign.operator.binary_operator() else {
            if !left.is_lvalue() {
                self.reference_error(
                    span,
                    "left-hand side of assignment operator is not an lvalue",
                );
                return None;
            }
            if format == Format::Nx {
                self.move_to(left, right);
                return None;
            }
            let result = self.materialize(right);
            self.move_to(left, result.clone());
            return Some(result);
        };

        if !left.is_lvalue() {
            self.syntax_error(span, "left-hand side of inplace operator is not an lvalue");
            return None;
        }
        let op = binary_op(op);
        if format == Format::Nx {
            self.move_with(left, right, op);
            return None;
        }
        let value = self.materialize(right);
        self.move_with(left.clone(), value, op);
        Some(left)
    }

    // ========================================================================
    // Conditional and comma
    // ========================================================================

    fn conditional_expression(&mut self, cond: &'a ConditionalExpression) -> Option<Expr> {
        let iftrue = self.new_block();
        let iffalse = self.new_block();
        let endif = self.new_block();

        let result = self.new_temp();
        self.condition(&cond.test, iftrue, iffalse);

        self.set_block(iftrue);
        let ok = self.expression(&cond.consequent)?;
        self.move_to(Expr::Temp(result), ok);
        self.jump(endif);

        self.set_block(iffalse);
        let ko = self.expression(&cond.alternate)?;
        self.move_to(Expr::Temp(result), ko);
        self.jump(endif);

        self.set_block(endif);
        Some(Expr::Temp(result))
    }

    fn sequence_expression(&mut self, seq: &'a SequenceExpression, format: Format) -> Option<Expr> {
        let Some((last, rest)) = seq.expressions.split_last() else {
            return Some(Expr::undefined());
        };
        for expression in rest {
            self.expression_statement(expression);
        }
        self.accept(last, format)
    }
}
