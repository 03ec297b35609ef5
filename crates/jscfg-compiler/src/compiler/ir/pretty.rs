//! Pretty-printing for IR
//!
//! Provides human-readable output for debugging IR structures.

use super::block::{BasicBlock, BasicBlockId};
use super::builtin::Builtin;
use super::expr::{ArgLocal, ArgLocalKind, BinaryOp, Const, Expr, TempId, UnaryOp};
use super::function::Function;
use super::module::{FunctionId, Module, RegExpId};
use super::stmt::Stmt;
use super::visit::{ExprVisitor, StmtVisitor};
use crate::ast::number_to_string;
use crate::interner::Symbol;
use std::fmt::{self, Write};

/// Trait for pretty-printing IR constructs
pub trait PrettyPrint {
    fn pretty_print(&self) -> String;
}

impl PrettyPrint for Module {
    fn pretty_print(&self) -> String {
        let mut output = String::new();
        // Writing into a String cannot fail
        let _ = write_module(&mut output, self);
        output
    }
}

/// Render one function of a module
pub fn pretty_print_function(module: &Module, func: &Function) -> String {
    let mut output = String::new();
    let _ = write_function(&mut output, module, func);
    output
}

/// Render one expression against the module's tables
pub fn format_expr(module: &Module, expr: &Expr) -> String {
    expr.accept(&mut Printer { module })
}

/// Render one statement against the module's tables
pub fn format_stmt(module: &Module, stmt: &Stmt) -> String {
    stmt.accept(&mut Printer { module })
}

fn write_module(out: &mut String, module: &Module) -> fmt::Result {
    writeln!(out, "; module {}", module.file_name)?;
    writeln!(out)?;

    for (i, class) in module.js_classes.iter().enumerate() {
        let members: Vec<String> = class
            .members
            .iter()
            .map(|m| {
                let name = module.resolve(m.name);
                if m.is_accessor {
                    format!("{} (accessor)", name)
                } else {
                    name.to_string()
                }
            })
            .collect();
        writeln!(out, "; class c{} {{ {} }}", i, members.join(", "))?;
    }
    if !module.js_classes.is_empty() {
        writeln!(out)?;
    }

    for func in &module.functions {
        write_function(out, module, func)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_function(out: &mut String, module: &Module, func: &Function) -> fmt::Result {
    let formals: Vec<&str> = func.formals.iter().map(|s| module.resolve(*s)).collect();
    write!(
        out,
        "function {} {}({})",
        func.id,
        module.resolve(func.name),
        formals.join(", ")
    )?;

    let mut flags = Vec::new();
    if func.is_strict {
        flags.push("strict");
    }
    if func.uses_this {
        flags.push("this");
    }
    if func.uses_arguments_object {
        flags.push("arguments");
    }
    if func.has_direct_eval {
        flags.push("eval");
    }
    if func.has_try {
        flags.push("try");
    }
    if func.has_with {
        flags.push("with");
    }
    if func.is_named_expression {
        flags.push("named");
    }
    if !flags.is_empty() {
        write!(out, " [{}]", flags.join(" "))?;
    }
    writeln!(out, " {{ ; {}:{}", func.line, func.column)?;

    if !func.locals.is_empty() {
        let locals: Vec<&str> = func.locals.iter().map(|s| module.resolve(*s)).collect();
        writeln!(out, "  ; locals: {}", locals.join(", "))?;
    }

    let mut printer = Printer { module };
    for block in func.blocks() {
        write_block(out, &mut printer, block, func.exit)?;
    }

    writeln!(out, "}}")
}

fn write_block(
    out: &mut String,
    printer: &mut Printer<'_>,
    block: &BasicBlock,
    exit: BasicBlockId,
) -> fmt::Result {
    write!(out, "  {}:", block.id)?;
    if let Some(handler) = block.handler {
        write!(out, " ; handler {}", handler)?;
    }
    if block.id == exit {
        write!(out, " ; exit")?;
    }
    writeln!(out)?;

    for stmt in block.statements() {
        writeln!(out, "    {}", stmt.accept(printer))?;
    }
    Ok(())
}

struct Printer<'m> {
    module: &'m Module,
}

impl Printer<'_> {
    fn list(&mut self, args: &[Expr]) -> String {
        let args: Vec<String> = args.iter().map(|a| a.accept(self)).collect();
        args.join(", ")
    }
}

impl ExprVisitor for Printer<'_> {
    type Output = String;

    fn visit_const(&mut self, value: &Const) -> String {
        match value {
            Const::Undefined => "undefined".to_string(),
            Const::Null => "null".to_string(),
            Const::Bool(b) => b.to_string(),
            Const::Number(n) => number_to_string(*n),
            Const::Missing => "missing".to_string(),
            Const::UInt32(n) => format!("{}u", n),
        }
    }

    fn visit_temp(&mut self, temp: TempId) -> String {
        temp.to_string()
    }

    fn visit_arg_local(&mut self, slot: &ArgLocal) -> String {
        let tag = match slot.kind {
            ArgLocalKind::Formal => "ARG",
            ArgLocalKind::Local => "LOCAL",
        };
        format!("{}({},{})", tag, slot.index, slot.scope)
    }

    fn visit_name(&mut self, name: Symbol) -> String {
        self.module.resolve(name).to_string()
    }

    fn visit_global_name(&mut self, name: Symbol) -> String {
        format!("global::{}", self.module.resolve(name))
    }

    fn visit_member(&mut self, base: &Expr, name: Symbol) -> String {
        format!("{}.{}", base.accept(self), self.module.resolve(name))
    }

    fn visit_subscript(&mut self, base: &Expr, index: &Expr) -> String {
        format!("{}[{}]", base.accept(self), index.accept(self))
    }

    fn visit_unop(&mut self, op: UnaryOp, expr: &Expr) -> String {
        format!("{}{}", op.symbol(), expr.accept(self))
    }

    fn visit_binop(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> String {
        format!("{} {} {}", left.accept(self), op.symbol(), right.accept(self))
    }

    fn visit_call(&mut self, callee: &Expr, args: &[Expr]) -> String {
        format!("{}({})", callee.accept(self), self.list(args))
    }

    fn visit_new(&mut self, callee: &Expr, args: &[Expr]) -> String {
        format!("new {}({})", callee.accept(self), self.list(args))
    }

    fn visit_builtin(&mut self, builtin: Builtin) -> String {
        format!("@{}", builtin)
    }

    fn visit_closure(&mut self, function: FunctionId) -> String {
        format!("closure {}", function)
    }

    fn visit_regexp(&mut self, regexp: RegExpId) -> String {
        match self.module.regexp(regexp) {
            Some(literal) => format!(
                "/{}/{}",
                self.module.resolve(literal.pattern),
                self.module.resolve(literal.flags)
            ),
            None => format!("regexp#{}", regexp.0),
        }
    }

    fn visit_string(&mut self, value: Symbol) -> String {
        format!("\"{}\"", self.module.resolve(value).escape_debug())
    }
}

impl StmtVisitor for Printer<'_> {
    type Output = String;

    fn visit_move(&mut self, target: &Expr, source: &Expr, op: Option<BinaryOp>) -> String {
        let assign = match op {
            Some(op) => format!("{}=", op.symbol()),
            None => "=".to_string(),
        };
        format!("{} {} {}", target.accept(self), assign, source.accept(self))
    }

    fn visit_exp(&mut self, expr: &Expr) -> String {
        expr.accept(self)
    }

    fn visit_jump(&mut self, target: BasicBlockId) -> String {
        format!("goto {}", target)
    }

    fn visit_cjump(&mut self, cond: &Expr, iftrue: BasicBlockId, iffalse: BasicBlockId) -> String {
        format!("if {} goto {} else goto {}", cond.accept(self), iftrue, iffalse)
    }

    fn visit_ret(&mut self, value: &Expr) -> String {
        format!("return {}", value.accept(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pretty_print_function() {
        let mut module = Module::new("test.js");
        let name = module.intern("f");
        let x = module.intern("x");
        let id = module.new_function(name, None);

        let mut func = Function::new(id, name, None);
        func.is_strict = true;
        func.locals.push(x);
        func.entry = func.new_block(None, true);
        func.exit = func.new_block(None, true);
        let t = func.new_temp();
        func.append(
            func.entry,
            Stmt::Move {
                target: Expr::Temp(t),
                source: Expr::builtin_call(Builtin::TypeofName, vec![Expr::String(x)]),
                op: None,
            },
        );
        func.append(func.entry, Stmt::Jump(func.exit));
        func.append(func.exit, Stmt::Ret(Expr::Temp(t)));
        module.install(func);

        let text = module.pretty_print();
        assert!(text.contains("function f0 f() [strict]"));
        assert!(text.contains("; locals: x"));
        assert!(text.contains("%0 = @typeofName(\"x\")"));
        assert!(text.contains("goto bb1"));
        assert!(text.contains("bb1: ; exit"));
        assert!(text.contains("return %0"));
    }

    #[test]
    fn test_format_expressions() {
        let mut module = Module::new("test.js");
        let y = module.intern("y");
        let member = Expr::Member {
            base: Box::new(Expr::ArgLocal(ArgLocal::formal(0, 1))),
            name: y,
        };
        assert_eq!(format_expr(&module, &member), "ARG(0,1).y");

        let sum = Expr::binop(BinaryOp::Add, Expr::Temp(TempId(1)), Expr::number(2.5));
        assert_eq!(format_expr(&module, &sum), "%1 + 2.5");

        let compound = Stmt::Move {
            target: Expr::GlobalName(y),
            source: Expr::number(1.0),
            op: Some(BinaryOp::Sub),
        };
        assert_eq!(format_stmt(&module, &compound), "global::y -= 1");
    }
}
