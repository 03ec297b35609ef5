//! Scope analysis pre-pass
//!
//! Walks the tree once before any IR is emitted and builds one `Environment`
//! per program and function-like node. Along the way it collects the facts
//! lowering depends on (declared names, strictness, direct eval, `arguments`
//! and `this` usage, argument counts) and reports the strict-mode errors that
//! are visible from declarations alone.

use super::environment::{ArgumentsUsage, EnvId, Environment, EnvironmentTree, MemberKind};
use crate::ast::*;
use crate::compiler::error::ErrorSink;
use crate::compiler::options::{CompilationMode, CompileOptions};

/// Words reserved in strict mode code
const STRICT_RESERVED: &[&str] = &[
    "implements",
    "interface",
    "let",
    "package",
    "private",
    "protected",
    "public",
    "static",
    "yield",
];

fn is_eval_or_arguments(name: &str) -> bool {
    name == "eval" || name == "arguments"
}

pub struct ScopeAnalyzer<'a, 'e> {
    source: &'a str,
    force_strict: bool,
    max_depth: Option<usize>,
    errors: &'e mut ErrorSink,
    tree: EnvironmentTree<'a>,
    stack: Vec<EnvId>,
    /// Whether a function may appear in statement position here
    allow_func_decls: bool,
    depth: usize,
    depth_exceeded: bool,
}

impl<'a, 'e> ScopeAnalyzer<'a, 'e> {
    pub fn new(source: &'a str, options: &CompileOptions, errors: &'e mut ErrorSink) -> Self {
        Self {
            source,
            force_strict: options.strict,
            max_depth: options.max_nesting_depth,
            errors,
            tree: EnvironmentTree::new(),
            stack: Vec::new(),
            allow_func_decls: true,
            depth: 0,
            depth_exceeded: false,
        }
    }

    /// Analyze a whole program compiled in `mode`
    pub fn analyze_program(
        mut self,
        program: &'a Program,
        mode: CompilationMode,
    ) -> EnvironmentTree<'a> {
        self.enter_environment(Some(NodeKey::of(program)), mode);
        self.check_directive_prologue(&program.body);
        self.source_elements(&program.body);
        self.leave_environment();
        self.finish()
    }

    /// Analyze a lone function expression under a synthetic function scope
    pub fn analyze_function_expression(mut self, function: &'a Function) -> EnvironmentTree<'a> {
        self.enter_environment(None, CompilationMode::Function);
        self.function(function, false, true);
        self.leave_environment();
        self.finish()
    }

    fn finish(mut self) -> EnvironmentTree<'a> {
        for env in self.tree.iter_mut() {
            if env.needs_arguments_object() {
                env.enter("arguments", MemberKind::VariableDeclaration, None);
            }
            if env.is_slotted() {
                env.assign_slots();
            }
        }
        log::debug!("scope analysis built {} environment(s)", self.tree.len());
        self.tree
    }

    // ========================================================================
    // Environment stack
    // ========================================================================

    fn enter_environment(&mut self, node: Option<NodeKey>, mode: CompilationMode) {
        let parent = self.stack.last().copied();
        let mut env = Environment::new(parent, node, mode);
        env.is_strict = self.force_strict || parent.is_some_and(|p| self.is_strict_env(p));
        let id = self.tree.push(env);
        log::trace!("enter environment {:?} ({:?}, parent {:?})", id, mode, parent);
        self.stack.push(id);
    }

    fn leave_environment(&mut self) {
        self.stack.pop();
    }

    fn env(&mut self) -> Option<&mut Environment<'a>> {
        let id = *self.stack.last()?;
        self.tree.get_mut(id)
    }

    fn is_strict_env(&self, id: EnvId) -> bool {
        self.tree.get(id).is_some_and(|env| env.is_strict)
    }

    fn is_strict(&self) -> bool {
        self.stack.last().is_some_and(|id| self.is_strict_env(*id))
    }

    fn note_argument_count(&mut self, count: usize) {
        if let Some(env) = self.env() {
            env.max_number_of_arguments = env.max_number_of_arguments.max(count as u32);
        }
    }

    /// Run `f` with the function-declaration policy set to `allow`
    fn with_func_decls(&mut self, allow: bool, f: impl FnOnce(&mut Self)) {
        let saved = std::mem::replace(&mut self.allow_func_decls, allow);
        f(self);
        self.allow_func_decls = saved;
    }

    fn descend(&mut self) -> bool {
        if let Some(max) = self.max_depth {
            if self.depth >= max {
                if !self.depth_exceeded {
                    self.depth_exceeded = true;
                    self.errors
                        .syntax(Span::default(), "Maximum nesting depth exceeded");
                }
                return false;
            }
        }
        self.depth += 1;
        true
    }

    fn ascend(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    // ========================================================================
    // Checks
    // ========================================================================

    /// Scan leading string-literal statements for an exact `"use strict"`.
    ///
    /// The raw token is compared, so a directive spelled with escapes does not
    /// count.
    fn check_directive_prologue(&mut self, body: &[Statement]) {
        for stmt in body {
            let Statement::Expression(expr_stmt) = stmt else {
                break;
            };
            let Expression::String(literal) = &expr_stmt.expression else {
                break;
            };
            let Some(raw) = literal.span.slice(self.source) else {
                continue;
            };
            if raw.len() < 2 {
                continue;
            }
            if raw.get(1..raw.len() - 1) == Some("use strict") {
                if let Some(env) = self.env() {
                    env.is_strict = true;
                }
            }
        }
    }

    fn check_name(&mut self, name: &str, span: Span) {
        if self.is_strict() && STRICT_RESERVED.contains(&name) {
            self.errors.syntax(span, "Unexpected strict mode reserved word");
        }
    }

    /// First identifier-like token of a statement, read from the source text
    fn first_token(&self, span: &Span) -> &'a str {
        let rest = self.source.get(span.start..).unwrap_or("");
        let end = rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(rest.len());
        &rest[..end]
    }

    // ========================================================================
    // Functions
    // ========================================================================

    /// Function bodies and programs: top-level function declarations are
    /// hoisted declarations, everything else is an ordinary statement.
    fn source_elements(&mut self, body: &'a [Statement]) {
        for stmt in body {
            match stmt {
                Statement::FunctionDecl(function) => self.function(function, true, false),
                _ => self.visit_statement(stmt),
            }
        }
    }

    /// Enter, scan and leave a function.
    ///
    /// `enter_name` binds the function's name in the enclosing scope;
    /// `is_expression` marks a named function expression.
    fn function(&mut self, function: &'a Function, enter_name: bool, is_expression: bool) {
        if let Some(name) = &function.name {
            if self.is_strict() && is_eval_or_arguments(&name.name) {
                self.errors.syntax(
                    name.span,
                    "Function name may not be eval or arguments in strict mode",
                );
            }
        }
        let member = enter_name.then_some(function);
        self.enter_function(function, function.name_str(), member, is_expression);
        self.source_elements(&function.body);
        self.leave_environment();
    }

    fn accessor(&mut self, function: &'a Function) {
        self.with_func_decls(true, |this| {
            this.enter_function(function, "", None, false);
            this.source_elements(&function.body);
            this.leave_environment();
        });
    }

    fn enter_function(
        &mut self,
        function: &'a Function,
        name: &str,
        member: Option<&'a Function>,
        is_expression: bool,
    ) {
        let mut was_strict = false;
        if let Some(env) = self.env() {
            env.has_nested_functions = true;
            if let Some(function) = member {
                env.enter(name, MemberKind::FunctionDefinition, Some(function));
            }
            if name == "arguments" {
                env.uses_arguments_object = ArgumentsUsage::NotUsed;
            }
            was_strict = env.is_strict;
        }

        self.enter_environment(Some(NodeKey::of(function)), CompilationMode::Function);
        if let Some(env) = self.env() {
            env.formals = function.params.iter().map(|p| p.name.clone()).collect();
            if function.params.iter().any(|p| p.is("arguments")) {
                env.uses_arguments_object = ArgumentsUsage::NotUsed;
            }
            env.is_named_function_expression = is_expression && !name.is_empty();
        }
        self.check_directive_prologue(&function.body);

        if was_strict || self.is_strict() {
            let mut seen: Vec<&str> = Vec::new();
            for param in &function.params {
                if seen.contains(&param.name.as_str()) {
                    self.errors.syntax(
                        param.span,
                        format!(
                            "Duplicate parameter name '{}' is not allowed in strict mode",
                            param.name
                        ),
                    );
                    return;
                }
                if is_eval_or_arguments(&param.name) {
                    self.errors.syntax(
                        param.span,
                        format!("'{}' cannot be used as parameter name in strict mode", param.name),
                    );
                    return;
                }
                seen.push(&param.name);
            }
        }
    }

    /// A function in statement position that is not a top-level declaration
    fn statement_function(&mut self, function: &'a Function) {
        if !self.allow_func_decls {
            self.errors
                .syntax(function.span, "conditional function or closure declaration");
        }
        self.function(function, true, true);
    }

    fn object_literal(&mut self, object: &'a ObjectExpression) {
        let mut count = 0;
        for prop in &object.properties {
            if array_index(&prop.key.name()).is_some() {
                count += 1;
            }
            count += 1;
            if !matches!(prop.value, PropertyValue::Init(_)) {
                count += 1;
            }
        }
        self.note_argument_count(count);

        self.with_func_decls(true, |this| {
            for prop in &object.properties {
                match &prop.value {
                    PropertyValue::Init(value) => this.visit_expression(value),
                    PropertyValue::Get(function) | PropertyValue::Set(function) => {
                        this.accessor(function)
                    }
                }
            }
        });
    }
}

impl<'a> Visitor<'a> for ScopeAnalyzer<'a, '_> {
    fn visit_statement(&mut self, stmt: &'a Statement) {
        if !self.descend() {
            return;
        }
        match stmt {
            Statement::FunctionDecl(function) => self.statement_function(function),
            Statement::Expression(expr_stmt) => match &expr_stmt.expression {
                Expression::Function(function) => self.statement_function(function),
                expression => {
                    if self.first_token(&expr_stmt.span) == "function" {
                        self.errors.syntax(expr_stmt.span, "unexpected token");
                    }
                    self.visit_expression(expression);
                }
            },
            Statement::With(with) => {
                if self.is_strict() {
                    self.errors
                        .syntax(with.span, "'with' statement is not allowed in strict mode");
                } else {
                    walk_statement(self, stmt);
                }
            }
            Statement::DoWhile(do_while) => {
                let allow = !self.is_strict();
                self.with_func_decls(allow, |this| this.visit_statement(&do_while.body));
                self.visit_expression(&do_while.test);
            }
            Statement::For(for_stmt) => {
                match &for_stmt.init {
                    Some(ForInit::Variable(var)) => {
                        for decl in &var.declarations {
                            self.visit_variable_declarator(decl);
                        }
                    }
                    Some(ForInit::Expression(expr)) => self.visit_expression(&expr.expression),
                    None => {}
                }
                if let Some(test) = &for_stmt.test {
                    self.visit_expression(test);
                }
                if let Some(update) = &for_stmt.update {
                    self.visit_expression(update);
                }
                let allow = !self.is_strict();
                self.with_func_decls(allow, |this| this.visit_statement(&for_stmt.body));
            }
            Statement::ForIn(for_in) => {
                match &for_in.left {
                    ForInTarget::Variable(decl) => self.visit_variable_declarator(decl),
                    ForInTarget::Expression(expr) => self.visit_expression(&expr.expression),
                }
                self.visit_expression(&for_in.right);
                let allow = !self.is_strict();
                self.with_func_decls(allow, |this| this.visit_statement(&for_in.body));
            }
            _ => walk_statement(self, stmt),
        }
        self.ascend();
    }

    fn visit_block(&mut self, block: &'a BlockStatement) {
        let allow = !self.is_strict() && self.allow_func_decls;
        self.with_func_decls(allow, |this| walk_block(this, block));
    }

    fn visit_variable_declarator(&mut self, decl: &'a VariableDeclarator) {
        let name = &decl.name;
        if self.is_strict() && is_eval_or_arguments(&name.name) {
            self.errors.syntax(
                name.span,
                "Variable name may not be eval or arguments in strict mode",
            );
        }
        self.check_name(&name.name, name.span);
        let kind = if decl.init.is_some() {
            MemberKind::VariableDefinition
        } else {
            MemberKind::VariableDeclaration
        };
        if let Some(env) = self.env() {
            if name.is("arguments") {
                env.uses_arguments_object = ArgumentsUsage::NotUsed;
            }
            env.enter(&name.name, kind, None);
        }
        walk_variable_declarator(self, decl);
    }

    fn visit_function(&mut self, function: &'a Function) {
        self.function(function, false, true);
    }

    fn visit_expression(&mut self, expr: &'a Expression) {
        if !self.descend() {
            return;
        }
        match expr {
            Expression::This(_) => {
                if let Some(env) = self.env() {
                    env.uses_this = true;
                }
            }
            Expression::Function(function) => self.function(function, false, true),
            Expression::Object(object) => self.object_literal(object),
            _ => walk_expression(self, expr),
        }
        self.ascend();
    }

    fn visit_identifier(&mut self, id: &'a Identifier) {
        self.check_name(&id.name, id.span);
        if id.is("arguments") {
            if let Some(env) = self.env() {
                if env.uses_arguments_object == ArgumentsUsage::Unknown {
                    env.uses_arguments_object = ArgumentsUsage::Used;
                }
            }
        }
    }

    fn visit_call_expression(&mut self, call: &'a CallExpression) {
        if let Expression::Identifier(callee) = call.callee.as_ref() {
            if callee.is("eval") {
                if let Some(env) = self.env() {
                    if !env.has_direct_eval {
                        if env.uses_arguments_object == ArgumentsUsage::Unknown {
                            env.uses_arguments_object = ArgumentsUsage::Used;
                        }
                        env.has_direct_eval = true;
                    }
                }
            }
        }
        self.note_argument_count(call.arguments.len());
        walk_call_expression(self, call);
    }

    fn visit_new_expression(&mut self, new: &'a NewExpression) {
        if let Some(arguments) = &new.arguments {
            self.note_argument_count(arguments.len());
        }
        walk_new_expression(self, new);
    }

    fn visit_array_expression(&mut self, array: &'a ArrayExpression) {
        self.note_argument_count(array.elements.len());
        walk_array_expression(self, array);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build::AstBuilder;

    fn analyze<'a>(program: &'a Program, source: &'a str) -> (EnvironmentTree<'a>, ErrorSink) {
        let mut errors = ErrorSink::new();
        let options = CompileOptions::default();
        let tree = ScopeAnalyzer::new(source, &options, &mut errors)
            .analyze_program(program, CompilationMode::Global);
        (tree, errors)
    }

    #[test]
    fn test_program_environment_collects_vars() {
        let b = AstBuilder::new();
        let program = b.program(vec![b.var("a", None), b.var("b", Some(b.num(1.0)))]);
        let source = b.source();
        let (tree, errors) = analyze(&program, &source);

        assert!(!errors.has_error());
        let env = tree.get(tree.lookup(&program).unwrap()).unwrap();
        assert_eq!(env.member("a").unwrap().kind, MemberKind::VariableDeclaration);
        assert_eq!(env.member("b").unwrap().kind, MemberKind::VariableDefinition);
        // global code is never slotted
        assert_eq!(env.find_member("a"), None);
    }

    #[test]
    fn test_use_strict_directive() {
        let b = AstBuilder::new();
        let inner = b.function(Some("g"), &[], vec![]);
        let program = b.program(vec![
            b.directive("use strict"),
            Statement::FunctionDecl(inner),
        ]);
        let source = b.source();
        let (tree, _) = analyze(&program, &source);

        assert!(tree.iter().all(|(_, env)| env.is_strict));
    }

    #[test]
    fn test_escaped_directive_is_not_strict() {
        let b = AstBuilder::new();
        let program = b.program(vec![Statement::Expression(ExpressionStatement {
            expression: b.string_with_raw("\"use\\x20strict\"", "use strict"),
            span: Span::default(),
        })]);
        let source = b.source();
        let (tree, _) = analyze(&program, &source);
        let env = tree.get(tree.lookup(&program).unwrap()).unwrap();
        assert!(!env.is_strict);
    }

    #[test]
    fn test_direct_eval_marks_arguments_used() {
        let b = AstBuilder::new();
        let f = b.function(
            Some("f"),
            &[],
            vec![b.expr_stmt(b.call(b.ident("eval"), vec![b.string("x")]))],
        );
        let program = b.program(vec![Statement::FunctionDecl(f)]);
        let source = b.source();
        let (tree, _) = analyze(&program, &source);

        let Statement::FunctionDecl(f) = &program.body[0] else {
            unreachable!()
        };
        let env = tree.get(tree.lookup(f).unwrap()).unwrap();
        assert!(env.has_direct_eval);
        assert_eq!(env.uses_arguments_object, ArgumentsUsage::Used);
        // the arguments object gets a slot of its own
        assert_eq!(env.find_member("arguments"), Some(0));
    }

    #[test]
    fn test_max_number_of_arguments() {
        let b = AstBuilder::new();
        let program = b.program(vec![
            b.expr_stmt(b.call(b.ident("f"), vec![b.num(1.0), b.num(2.0)])),
            b.expr_stmt(b.array(vec![Some(b.num(1.0)), None, None, Some(b.num(2.0))])),
        ]);
        let source = b.source();
        let (tree, _) = analyze(&program, &source);
        let env = tree.get(tree.lookup(&program).unwrap()).unwrap();
        assert_eq!(env.max_number_of_arguments, 4);
    }

    #[test]
    fn test_strict_duplicate_parameter() {
        let b = AstBuilder::new();
        let f = b.function(Some("f"), &["a", "a"], vec![b.directive("use strict")]);
        let program = b.program(vec![Statement::FunctionDecl(f)]);
        let source = b.source();
        let (_, errors) = analyze(&program, &source);

        assert_eq!(errors.errors().len(), 1);
        assert_eq!(
            errors.errors()[0].message(),
            "Duplicate parameter name 'a' is not allowed in strict mode"
        );
    }

    #[test]
    fn test_function_in_loop_body_is_allowed_when_sloppy() {
        let b = AstBuilder::new();
        let program = b.program(vec![b.for_loop(
            None,
            None,
            None,
            b.block(vec![b.function_decl("g", &[], vec![])]),
        )]);
        let source = b.source();
        let (_, errors) = analyze(&program, &source);
        assert!(!errors.has_error());
    }

    #[test]
    fn test_function_in_strict_block_is_rejected() {
        let b = AstBuilder::new();
        let program = b.program(vec![
            b.directive("use strict"),
            b.block(vec![b.function_decl("g", &[], vec![])]),
        ]);
        let source = b.source();
        let (_, errors) = analyze(&program, &source);
        assert_eq!(
            errors.errors()[0].message(),
            "conditional function or closure declaration"
        );
    }

    #[test]
    fn test_nesting_guard() {
        let b = AstBuilder::new();
        let mut expr = b.num(1.0);
        for _ in 0..64 {
            expr = b.paren(expr);
        }
        let program = b.program(vec![b.expr_stmt(expr)]);
        let source = b.source();

        let mut errors = ErrorSink::new();
        let options = CompileOptions {
            max_nesting_depth: Some(16),
            ..CompileOptions::default()
        };
        ScopeAnalyzer::new(&source, &options, &mut errors)
            .analyze_program(&program, CompilationMode::Global);
        assert_eq!(errors.errors().len(), 1);
        assert_eq!(errors.errors()[0].message(), "Maximum nesting depth exceeded");
    }
}
