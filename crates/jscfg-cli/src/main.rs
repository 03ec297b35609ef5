//! jscfg command-line front end
//!
//! Reads syntax trees serialized as JSON by an external parser, lowers them
//! to control-flow-graph IR and prints the IR or the compile diagnostics.

mod commands;
mod config;
mod output;

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jscfg")]
#[command(about = "ECMAScript syntax tree to control-flow-graph compiler", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Color output: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    /// Configuration file (defaults to ./jscfg.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lower one syntax tree and print its IR
    Lower {
        /// AST file (JSON)
        file: PathBuf,
        /// Source text the AST was parsed from (defaults to the sibling .js file)
        #[arg(short, long)]
        source: Option<PathBuf>,
        /// The AST is a lone function expression instead of a program
        #[arg(long)]
        function: bool,
        /// Write the IR to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        flags: CompileFlags,
    },

    /// Compile syntax trees and report errors without printing IR
    Check {
        /// AST files or directories to check
        #[arg(default_value = ".")]
        files: Vec<String>,
        /// Diagnostic format: pretty or json
        #[arg(long, default_value = "pretty")]
        format: String,
        #[command(flatten)]
        flags: CompileFlags,
    },
}

/// Compile options settable from the command line; each one overrides the
/// configuration file
#[derive(Args, Debug, Default, Clone)]
pub struct CompileFlags {
    /// Compilation mode: global, eval, function, binding
    #[arg(long, value_parser = ["global", "eval", "function", "binding"])]
    pub mode: Option<String>,

    /// Compile everything as strict mode code
    #[arg(long)]
    pub strict: bool,

    /// File name used in the module and in diagnostics
    #[arg(long)]
    pub file_name: Option<String>,

    /// Mark every function as containing a direct eval
    #[arg(long)]
    pub debug_mode: bool,

    /// Deepest nesting compiled before giving up
    #[arg(long)]
    pub max_nesting_depth: Option<usize>,

    /// Name visible from the calling scope (repeatable)
    #[arg(long = "inherit", value_name = "NAME")]
    pub inherited_locals: Vec<String>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let color = output::resolve_color_choice(cli.color.as_deref());
    let config = config::Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Lower {
            file,
            source,
            function,
            output,
            flags,
        } => {
            let options = config.compile_options(&flags)?;
            commands::lower::execute(
                &file,
                source.as_deref(),
                function,
                output.as_deref(),
                options,
                color,
            )
        }

        Commands::Check {
            files,
            format,
            flags,
        } => {
            let options = config.compile_options(&flags)?;
            commands::check::execute(&files, &format, options, color)
        }
    }
}
