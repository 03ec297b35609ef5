//! Subcommand implementations.

pub mod check;
pub mod files;
pub mod lower;

use jscfg_compiler::ast::Program;
use jscfg_compiler::compiler::diagnostic::{create_files, Diagnostic};
use jscfg_compiler::{CompileErrors, CompileOptions, HostError, Module};

use crate::output::StyledOutput;
use files::AstInput;

/// Why an input produced no module
pub enum Failure {
    /// The file is not a valid AST
    Parse(serde_json::Error),
    Compile(CompileErrors),
}

/// Deserialize and compile one input
pub fn compile_input(
    input: &AstInput,
    options: &CompileOptions,
    function: bool,
) -> Result<Module, Failure> {
    let result = if function {
        let function: jscfg_compiler::ast::Function =
            serde_json::from_str(&input.json).map_err(Failure::Parse)?;
        jscfg_compiler::compile_function(&function, &input.source, options)
    } else {
        let program = Program::from_json(&input.json).map_err(Failure::Parse)?;
        jscfg_compiler::compile(&program, &input.source, options)
    };
    result.map_err(Failure::Compile)
}

/// Print compile errors to stderr.
///
/// With source text the errors are rendered as codespan diagnostics; without
/// it (or if rendering fails) they are printed in the host `url:line:column`
/// shape.
pub fn report_errors(
    out: &mut StyledOutput,
    input: &AstInput,
    options: &CompileOptions,
    errors: &CompileErrors,
) {
    let (files, file_id) = create_files(options.file_name.clone(), input.source.clone());

    for error in errors.iter() {
        if !input.source.is_empty() {
            let diag = Diagnostic::from_compile_error(error, file_id);
            match diag.emit_to(out.stderr(), &files) {
                Ok(()) => continue,
                Err(e) => log::debug!("cannot render diagnostic against source: {}", e),
            }
        }

        let host = HostError::from_error(error, &options.file_name, options.file_name_is_url);
        out.error("error");
        out.plain_err(&format!(
            ": {}:{}:{}: {}\n",
            host.url, host.line, host.column, host.description
        ));
    }
}
