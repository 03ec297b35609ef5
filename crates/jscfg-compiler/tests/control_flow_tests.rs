//! Control-flow graph shape tests for statements

use jscfg_compiler::ast::build::AstBuilder;
use jscfg_compiler::ast::{BinaryOperator, Statement};
use jscfg_compiler::compiler::ir::{pretty_print_function, BinaryOp, Expr, Function, Stmt};
use jscfg_compiler::{compile, BasicBlockId, CompileOptions, Module};

fn compile_ok(b: &AstBuilder, body: Vec<Statement>) -> Module {
    let program = b.program(body);
    let source = b.source();
    let module =
        compile(&program, &source, &CompileOptions::new("test.js")).expect("Failed to compile");
    module.validate().expect("Invalid module");
    module
}

fn compile_error(b: &AstBuilder, body: Vec<Statement>) -> String {
    let program = b.program(body);
    let source = b.source();
    let errors = compile(&program, &source, &CompileOptions::new("test.js"))
        .expect_err("Expected a compile error");
    errors.first().expect("No error recorded").message().to_string()
}

/// Conditional branches in layout order: (block, iftrue, iffalse)
fn branches(func: &Function) -> Vec<(BasicBlockId, BasicBlockId, BasicBlockId)> {
    func.blocks()
        .filter_map(|block| match block.terminator() {
            Some(Stmt::CJump { iftrue, iffalse, .. }) => Some((block.id, *iftrue, *iffalse)),
            _ => None,
        })
        .collect()
}

fn jump_target(func: &Function, block: BasicBlockId) -> Option<BasicBlockId> {
    match func.block(block)?.terminator()? {
        Stmt::Jump(target) => Some(*target),
        _ => None,
    }
}

fn root(module: &Module) -> &Function {
    module.root_function().expect("No root function")
}

// ============================================================================
// Loops
// ============================================================================

#[test]
fn test_for_loop_with_break() {
    // for (var i = 0; i < n; i++) { if (x) break; }
    let b = AstBuilder::new();
    let body = b.block(vec![b.if_else(b.ident("x"), b.break_stmt(None), None)]);
    let for_loop = b.for_loop(
        Some(b.for_var_init(vec![b.declarator("i", Some(b.num(0.0)))])),
        Some(b.binary(BinaryOperator::Less, b.ident("i"), b.ident("n"))),
        Some(b.post_inc(b.ident("i"))),
        body,
    );
    let module = compile_ok(&b, vec![for_loop]);
    let func = root(&module);

    // entry, cond, body, step, end, then, merge, exit
    assert_eq!(func.block_count(), 8);

    let branches = branches(func);
    assert_eq!(branches.len(), 2);
    let (cond, loop_body, end) = branches[0];
    let (if_block, then, merge) = branches[1];
    assert_eq!(if_block, loop_body);

    let cond_expr = match func.block(cond).and_then(|b| b.terminator()) {
        Some(Stmt::CJump { cond, .. }) => cond.clone(),
        other => panic!("expected a conditional jump, got {:?}", other),
    };
    assert!(matches!(cond_expr, Expr::Binop { op: BinaryOp::Lt, .. }));

    // break leaves the loop without running the step
    assert_eq!(jump_target(func, then), Some(end));
    let step = jump_target(func, merge).unwrap();
    assert_eq!(jump_target(func, step), Some(cond));
    assert_eq!(jump_target(func, end), Some(func.exit));
}

#[test]
fn test_while_continue_jumps_to_condition() {
    let b = AstBuilder::new();
    let module = compile_ok(
        &b,
        vec![b.while_loop(b.ident("a"), b.block(vec![b.continue_stmt(None)]))],
    );
    let func = root(&module);

    let branches = branches(func);
    assert_eq!(branches.len(), 1);
    let (cond, body, _) = branches[0];
    assert_eq!(jump_target(func, body), Some(cond));
}

#[test]
fn test_do_while_runs_body_first() {
    let b = AstBuilder::new();
    let call = b.expr_stmt(b.call(b.ident("f"), vec![]));
    let module = compile_ok(&b, vec![b.do_while(call, b.ident("a"))]);
    let func = root(&module);

    let (cond, body, _) = branches(func)[0];
    assert_eq!(jump_target(func, func.entry), Some(body));
    assert_eq!(jump_target(func, body), Some(cond));
}

#[test]
fn test_labelled_break_leaves_outer_loop() {
    // outer: while (a) { while (b) { break outer; } }
    let b = AstBuilder::new();
    let inner = b.while_loop(b.ident("b"), b.block(vec![b.break_stmt(Some("outer"))]));
    let outer = b.labelled("outer", b.while_loop(b.ident("a"), b.block(vec![inner])));
    let module = compile_ok(&b, vec![outer]);
    let func = root(&module);

    let branches = branches(func);
    assert_eq!(branches.len(), 2);
    let (_, _, outer_end) = branches[0];
    let (_, inner_body, inner_end) = branches[1];
    assert_ne!(outer_end, inner_end);
    assert_eq!(jump_target(func, inner_body), Some(outer_end));
}

#[test]
fn test_labelled_block_break() {
    // done: { break done; f(); }
    let b = AstBuilder::new();
    let labelled = b.labelled(
        "done",
        b.block(vec![
            b.break_stmt(Some("done")),
            b.expr_stmt(b.call(b.ident("f"), vec![])),
        ]),
    );
    let module = compile_ok(&b, vec![labelled]);

    // the call after the break is never emitted
    assert!(!pretty_print_function(&module, root(&module)).contains("global::f()"));
}

#[test]
fn test_for_in_iterates_property_names() {
    let b = AstBuilder::new();
    let module = compile_ok(&b, vec![b.for_in_var("k", b.ident("o"), b.block(vec![]))]);
    let text = pretty_print_function(&module, root(&module));

    assert!(text.contains("@foreachIteratorObject(%"));
    assert!(text.contains("@foreachNextPropertyName(%"));
    assert!(text.contains("global::k = %"));
    assert!(text.contains(" !== "));
}

// ============================================================================
// Jump errors
// ============================================================================

#[test]
fn test_break_outside_loop() {
    let b = AstBuilder::new();
    assert_eq!(compile_error(&b, vec![b.break_stmt(None)]), "Break outside of loop");
}

#[test]
fn test_continue_inside_switch_only() {
    let b = AstBuilder::new();
    let switch = b.switch(
        b.ident("x"),
        vec![b.case(Some(b.num(1.0)), vec![b.continue_stmt(None)])],
    );
    assert_eq!(compile_error(&b, vec![switch]), "continue outside of loop");
}

#[test]
fn test_undefined_label() {
    let b = AstBuilder::new();
    let body = b.block(vec![b.break_stmt(Some("nope"))]);
    assert_eq!(
        compile_error(&b, vec![b.while_loop(b.ident("a"), body)]),
        "Undefined label 'nope'"
    );
}

#[test]
fn test_duplicate_label() {
    let b = AstBuilder::new();
    let inner = b.labelled("l", b.while_loop(b.ident("a"), b.block(vec![])));
    let outer = b.labelled("l", inner);
    assert_eq!(compile_error(&b, vec![outer]), "Label 'l' has already been declared");
}

#[test]
fn test_only_first_error_is_recorded() {
    let b = AstBuilder::new();
    let program = b.program(vec![b.break_stmt(None), b.continue_stmt(None)]);
    let source = b.source();
    let errors = compile(&program, &source, &CompileOptions::default()).unwrap_err();
    assert_eq!(errors.len(), 1);
}

// ============================================================================
// Switch
// ============================================================================

#[test]
fn test_switch_dispatch_and_fallthrough() {
    // switch (x) { case 1: a(); case 2: b(); break; default: c(); }
    let b = AstBuilder::new();
    let call = |name: &str| b.expr_stmt(b.call(b.ident(name), vec![]));
    let switch = b.switch(
        b.ident("x"),
        vec![
            b.case(Some(b.num(1.0)), vec![call("a")]),
            b.case(Some(b.num(2.0)), vec![call("b"), b.break_stmt(None)]),
            b.case(None, vec![call("c")]),
        ],
    );
    let module = compile_ok(&b, vec![switch]);
    let func = root(&module);

    let branches = branches(func);
    assert_eq!(branches.len(), 2);
    let (_, case1, next) = branches[0];
    let (second, case2, no_match) = branches[1];
    assert_eq!(second, next);

    // case 1 falls through into case 2
    assert_eq!(jump_target(func, case1), Some(case2));
    // no match dispatches to the default clause, which ends the switch
    let default = jump_target(func, no_match).unwrap();
    let end = jump_target(func, default).unwrap();
    assert_eq!(jump_target(func, case2), Some(end));

    let text = pretty_print_function(&module, func);
    assert_eq!(text.matches(" === ").count(), 2);
}

// ============================================================================
// Exceptions and scopes
// ============================================================================

#[test]
fn test_try_finally_rethrows_pending_exception() {
    let b = AstBuilder::new();
    let call = |name: &str| b.expr_stmt(b.call(b.ident(name), vec![]));
    let module = compile_ok(&b, vec![b.try_stmt(vec![call("f")], None, Some(vec![call("g")]))]);
    let func = root(&module);
    assert!(func.has_try);

    let finally = func
        .blocks()
        .find(|block| {
            block.statements().iter().any(|stmt| match stmt {
                Stmt::Move { source, .. } => {
                    let unwind = Expr::Builtin(jscfg_compiler::Builtin::UnwindException);
                    matches!(source, Expr::Call { callee, .. } if **callee == unwind)
                }
                _ => false,
            })
        })
        .expect("No finally block");
    // the protected body hands exceptions to the finally block
    assert!(func.blocks().any(|block| block.handler == Some(finally.id)));

    let text = pretty_print_function(&module, func);
    assert!(text.contains("@reThrow()"));
    assert!(text.contains("global::g()"));
}

#[test]
fn test_return_inlines_finalizer() {
    let b = AstBuilder::new();
    let cleanup = b.expr_stmt(b.call(b.ident("g"), vec![]));
    let f = b.function_decl(
        "f",
        &[],
        vec![b.try_stmt(vec![b.return_stmt(Some(b.num(1.0)))], None, Some(vec![cleanup]))],
    );
    let module = compile_ok(&b, vec![f]);
    let func = module.function_by_name("f").unwrap();

    let text = pretty_print_function(&module, func);
    // once on the return path, once in the finally block
    assert_eq!(text.matches("global::g()").count(), 2);
}

fn loop_around_try(
    b: &AstBuilder,
    block: Vec<Statement>,
    handler: Option<(&str, Vec<Statement>)>,
) -> String {
    let cleanup = b.expr_stmt(b.call(b.ident("fin"), vec![]));
    let body = b.block(vec![b.try_stmt(block, handler, Some(vec![cleanup]))]);
    let module = compile_ok(b, vec![b.while_loop(b.ident("a"), body)]);
    pretty_print_function(&module, root(&module))
}

#[test]
fn test_break_out_of_try_runs_finalizer_once() {
    let b = AstBuilder::new();
    let text = loop_around_try(&b, vec![b.break_stmt(None)], None);

    // once on the break path, once in the finally block
    assert_eq!(text.matches("global::fin()").count(), 2);
    assert_eq!(text.matches("@popScope()").count(), 0);
}

#[test]
fn test_continue_out_of_try_runs_finalizer_once() {
    let b = AstBuilder::new();
    let text = loop_around_try(&b, vec![b.continue_stmt(None)], None);

    assert_eq!(text.matches("global::fin()").count(), 2);
    assert_eq!(text.matches("@popScope()").count(), 0);
}

#[test]
fn test_break_out_of_catch_pops_scope_and_runs_finalizer() {
    let b = AstBuilder::new();
    let text = loop_around_try(
        &b,
        vec![b.expr_stmt(b.call(b.ident("f"), vec![]))],
        Some(("e", vec![b.break_stmt(None)])),
    );

    assert_eq!(text.matches("global::fin()").count(), 2);
    // once on the break path, once in the catch handler
    assert_eq!(text.matches("@popScope()").count(), 2);
    assert!(text.contains("@pushCatchScope(\"e\")"));
}

#[test]
fn test_catch_pushes_and_pops_scope() {
    let b = AstBuilder::new();
    let module = compile_ok(
        &b,
        vec![b.try_stmt(
            vec![b.expr_stmt(b.call(b.ident("f"), vec![]))],
            Some(("e", vec![b.expr_stmt(b.call(b.ident("log"), vec![b.ident("e")]))])),
            None,
        )],
    );
    let text = pretty_print_function(&module, root(&module));

    assert!(text.contains("@pushCatchScope(\"e\")"));
    assert!(text.contains("@popScope()"));
    // the catch parameter is resolved dynamically
    assert!(!text.contains("global::e"));
}

#[test]
fn test_with_resolves_names_dynamically() {
    let b = AstBuilder::new();
    let body = b.block(vec![b.expr_stmt(b.assign(b.ident("x"), b.num(1.0)))]);
    let module = compile_ok(&b, vec![b.with(b.ident("o"), body)]);
    let func = root(&module);
    assert!(func.has_with);

    let text = pretty_print_function(&module, func);
    assert!(text.contains("@pushWithScope(%"));
    assert!(text.contains("x = %"));
    assert!(!text.contains("global::x"));
}

#[test]
fn test_break_out_of_with_pops_scope() {
    // while (a) { with (o) { break; } }
    let b = AstBuilder::new();
    let with = b.with(b.ident("o"), b.block(vec![b.break_stmt(None)]));
    let module = compile_ok(&b, vec![b.while_loop(b.ident("a"), b.block(vec![with]))]);
    let text = pretty_print_function(&module, root(&module));

    // one pop in the exception handler, one on the break path
    assert_eq!(text.matches("@popScope()").count(), 2);
}

#[test]
fn test_strict_with_is_rejected() {
    let b = AstBuilder::new();
    let message = compile_error(
        &b,
        vec![b.directive("use strict"), b.with(b.ident("o"), b.empty())],
    );
    assert_eq!(message, "'with' statement is not allowed in strict mode");
}
