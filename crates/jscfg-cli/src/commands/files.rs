//! AST input discovery and loading.

use anyhow::Context;
use jscfg_compiler::CompileOptions;
use std::path::{Path, PathBuf};

/// One syntax tree read from disk, with the source text it came from
pub struct AstInput {
    pub path: PathBuf,
    pub json: String,
    pub source_path: Option<PathBuf>,
    /// Empty when no source file was found
    pub source: String,
}

impl AstInput {
    /// Read `path`, plus `source` or else the sibling source file if it exists.
    pub fn read(path: &Path, source: Option<&Path>) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let source_path = match source {
            Some(source) => Some(source.to_path_buf()),
            None => Some(sibling_source(path)).filter(|p| p.is_file()),
        };
        let source = match &source_path {
            Some(p) => std::fs::read_to_string(p)
                .with_context(|| format!("Failed to read {}", p.display()))?,
            None => {
                log::info!(
                    "no source text for {}; diagnostics will not show snippets",
                    path.display()
                );
                String::new()
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            json,
            source_path,
            source,
        })
    }

    /// Name shown in diagnostics: the source file if known, else the AST file
    pub fn display_name(&self) -> String {
        self.source_path
            .as_deref()
            .unwrap_or(&self.path)
            .display()
            .to_string()
    }

    /// `options` with the file name filled in when the configuration left it
    /// empty
    pub fn options(&self, options: &CompileOptions) -> CompileOptions {
        let mut options = options.clone();
        if options.file_name.is_empty() {
            options.file_name = self.display_name();
        }
        options
    }
}

/// Source file next to an AST file: `app.json` and `app.ast.json` both map to
/// `app.js`.
pub fn sibling_source(ast: &Path) -> PathBuf {
    let stem = ast
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem.strip_suffix(".ast").unwrap_or(&stem);
    ast.with_file_name(format!("{}.js", stem))
}

/// Collect all .json AST files from the given paths (files or directories).
pub fn collect_ast_files(paths: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path_str in paths {
        let path = Path::new(path_str);
        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            collect_in_dir(path, &mut files)?;
        } else {
            anyhow::bail!("No such file or directory: {}", path_str);
        }
    }

    Ok(files)
}

/// Recursively collect .json files in a directory, in name order.
fn collect_in_dir(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            // Skip hidden dirs, build output and node_modules
            if name.starts_with('.') || name == "target" || name == "node_modules" {
                continue;
            }
            collect_in_dir(&path, files)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some("json") {
            files.push(path);
        }
    }
    Ok(())
}
