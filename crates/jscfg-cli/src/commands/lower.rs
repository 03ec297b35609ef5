//! `jscfg lower`: compile one syntax tree and print its IR.

use anyhow::Context;
use jscfg_compiler::{CompileOptions, PrettyPrint};
use std::path::Path;
use termcolor::ColorChoice;

use super::files::AstInput;
use super::{compile_input, report_errors, Failure};
use crate::output::StyledOutput;

pub fn execute(
    file: &Path,
    source: Option<&Path>,
    function: bool,
    output: Option<&Path>,
    options: CompileOptions,
    color: ColorChoice,
) -> anyhow::Result<()> {
    let input = AstInput::read(file, source)?;
    let options = input.options(&options);
    let mut out = StyledOutput::new(color);

    let module = match compile_input(&input, &options, function) {
        Ok(module) => module,
        Err(Failure::Parse(e)) => {
            return Err(e).with_context(|| format!("{} is not a valid syntax tree", file.display()));
        }
        Err(Failure::Compile(errors)) => {
            report_errors(&mut out, &input, &options, &errors);
            out.flush();
            anyhow::bail!("could not compile {}", input.display_name());
        }
    };

    if let Err(problems) = module.validate() {
        for problem in &problems {
            log::warn!("malformed IR: {}", problem);
        }
    }

    let text = module.pretty_print();
    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::info!("wrote {} function(s) to {}", module.function_count(), path.display());
        }
        None => out.plain(&text),
    }
    out.flush();
    Ok(())
}
