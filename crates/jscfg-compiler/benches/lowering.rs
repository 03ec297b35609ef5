use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jscfg_compiler::ast::build::AstBuilder;
use jscfg_compiler::ast::{BinaryOperator, Program};
use jscfg_compiler::{compile, CompileOptions};

/// `count` functions, each with a counting loop, a branch and an object literal
fn synthetic_program(count: usize) -> (Program, String) {
    let b = AstBuilder::new();
    let mut body = Vec::with_capacity(count);
    for i in 0..count {
        let loop_body = b.block(vec![
            b.if_else(
                b.binary(BinaryOperator::Greater, b.ident("i"), b.ident("limit")),
                b.break_stmt(None),
                None,
            ),
            b.expr_stmt(b.assign(
                b.ident("total"),
                b.binary(BinaryOperator::Add, b.ident("total"), b.ident("i")),
            )),
        ]);
        let counting = b.for_loop(
            Some(b.for_var_init(vec![b.declarator("i", Some(b.num(0.0)))])),
            Some(b.binary(BinaryOperator::Less, b.ident("i"), b.num(100.0))),
            Some(b.post_inc(b.ident("i"))),
            loop_body,
        );
        let result = b.object(vec![
            b.prop("total", b.ident("total")),
            b.prop("limit", b.ident("limit")),
        ]);
        body.push(b.function_decl(
            &format!("f{}", i),
            &["limit"],
            vec![
                b.var("total", Some(b.num(0.0))),
                counting,
                b.return_stmt(Some(result)),
            ],
        ));
    }
    body.push(b.expr_stmt(b.call(b.ident("f0"), vec![b.num(10.0)])));
    let program = b.program(body);
    (program, b.source())
}

fn bench_lowering(c: &mut Criterion) {
    let mut group = c.benchmark_group("lowering");

    for count in [10usize, 100, 500] {
        let (program, source) = synthetic_program(count);
        let options = CompileOptions::new("bench.js");
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("functions", count), &program, |b, program| {
            b.iter(|| compile(black_box(program), &source, &options).unwrap());
        });
    }

    group.finish();
}

fn bench_nested_functions(c: &mut Criterion) {
    let b = AstBuilder::new();
    let mut inner = b.function_decl("leaf", &["x"], vec![b.return_stmt(Some(b.ident("x")))]);
    for depth in 0..32 {
        inner = b.function_decl(&format!("level{}", depth), &["x"], vec![inner]);
    }
    let program = b.program(vec![inner]);
    let source = b.source();
    let options = CompileOptions::new("nested.js");

    c.bench_function("nested_functions", |bench| {
        bench.iter(|| compile(black_box(&program), &source, &options).unwrap());
    });
}

criterion_group!(benches, bench_lowering, bench_nested_functions);
criterion_main!(benches);
