//! `jscfg check`: compile syntax trees and report errors without printing IR.

use jscfg_compiler::compiler::diagnostic::{create_files, Diagnostic, JsonDiagnostic};
use jscfg_compiler::CompileOptions;
use serde::Serialize;
use termcolor::ColorChoice;

use super::files::{collect_ast_files, AstInput};
use super::{compile_input, report_errors, Failure};
use crate::output::StyledOutput;

/// Per-file entry of `--format json` output
#[derive(Serialize)]
struct FileReport {
    file: String,
    ok: bool,
    diagnostics: Vec<JsonDiagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_error: Option<String>,
}

pub fn execute(
    paths: &[String],
    format: &str,
    options: CompileOptions,
    color: ColorChoice,
) -> anyhow::Result<()> {
    let json = match format {
        "pretty" => false,
        "json" => true,
        other => anyhow::bail!("Unknown format: {} (expected pretty or json)", other),
    };

    let files = collect_ast_files(paths)?;
    let mut out = StyledOutput::new(color);
    if files.is_empty() {
        out.warning("warning");
        out.plain_err(": no AST files found\n");
        out.flush();
        return Ok(());
    }

    let mut reports = Vec::new();
    let mut failed = 0;

    for path in &files {
        let input = AstInput::read(path, None)?;
        let options = input.options(&options);

        let report = match compile_input(&input, &options, false) {
            Ok(module) => {
                log::debug!("{}: {} function(s)", input.display_name(), module.function_count());
                FileReport {
                    file: input.display_name(),
                    ok: true,
                    diagnostics: Vec::new(),
                    parse_error: None,
                }
            }
            Err(Failure::Parse(e)) => {
                if !json {
                    out.error("error");
                    out.plain_err(&format!(
                        ": {} is not a valid syntax tree: {}\n",
                        path.display(),
                        e
                    ));
                }
                FileReport {
                    file: input.display_name(),
                    ok: false,
                    diagnostics: Vec::new(),
                    parse_error: Some(e.to_string()),
                }
            }
            Err(Failure::Compile(errors)) => {
                let diagnostics = if json {
                    let (sources, file_id) =
                        create_files(options.file_name.clone(), input.source.clone());
                    errors
                        .iter()
                        .map(|e| {
                            let diag = Diagnostic::from_compile_error(e, file_id);
                            JsonDiagnostic::from_diagnostic(&diag, &sources)
                        })
                        .collect()
                } else {
                    report_errors(&mut out, &input, &options, &errors);
                    Vec::new()
                };
                FileReport {
                    file: input.display_name(),
                    ok: false,
                    diagnostics,
                    parse_error: None,
                }
            }
        };

        if !report.ok {
            failed += 1;
        }
        reports.push(report);
    }

    if json {
        out.plain(&serde_json::to_string_pretty(&reports)?);
        out.newline();
    } else if failed == 0 {
        out.success("ok");
        out.plain(&format!(": checked {} file(s)\n", files.len()));
    }
    out.flush();

    if failed > 0 {
        anyhow::bail!("{} of {} file(s) failed to compile", failed, files.len());
    }
    Ok(())
}
