//! Configuration file parsing (jscfg.toml)
//!
//! ```toml
//! [compile]
//! mode = "function"
//! strict = true
//! max_nesting_depth = 512
//! inherited_locals = ["window", "document"]
//! ```

use jscfg_compiler::{CompilationMode, CompileOptions};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::CompileFlags;

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "jscfg.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Unknown compilation mode: {0}")]
    UnknownMode(String),
}

/// Contents of `jscfg.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub compile: CompileOptions,
}

impl Config {
    /// Load `path`, or `./jscfg.toml` when no path is given and that file
    /// exists, or the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(CONFIG_FILE).is_file() => Self::from_file(Path::new(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_str(&content)?;
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// File options with command-line flags applied on top
    pub fn compile_options(&self, flags: &CompileFlags) -> Result<CompileOptions, ConfigError> {
        let mut options = self.compile.clone();
        if let Some(mode) = &flags.mode {
            options.mode = parse_mode(mode)?;
        }
        if flags.strict {
            options.strict = true;
        }
        if let Some(file_name) = &flags.file_name {
            options.file_name = file_name.clone();
        }
        if flags.debug_mode {
            options.debug_mode = true;
        }
        if flags.max_nesting_depth.is_some() {
            options.max_nesting_depth = flags.max_nesting_depth;
        }
        if !flags.inherited_locals.is_empty() {
            options.inherited_locals = flags.inherited_locals.clone();
        }
        Ok(options)
    }
}

fn parse_mode(mode: &str) -> Result<CompilationMode, ConfigError> {
    match mode {
        "global" => Ok(CompilationMode::Global),
        "eval" => Ok(CompilationMode::Eval),
        "function" => Ok(CompilationMode::Function),
        "binding" => Ok(CompilationMode::BindingExpression),
        other => Err(ConfigError::UnknownMode(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_compile_table() {
        let config = Config::from_str(
            r#"
[compile]
mode = "eval"
strict = true
max_nesting_depth = 64
inherited_locals = ["window"]
"#,
        )
        .unwrap();

        assert_eq!(config.compile.mode, CompilationMode::Eval);
        assert!(config.compile.strict);
        assert_eq!(config.compile.max_nesting_depth, Some(64));
        assert_eq!(config.compile.inherited_locals, vec!["window".to_string()]);
        assert!(!config.compile.debug_mode);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.compile, CompileOptions::default());
    }

    #[test]
    fn test_flags_override_file() {
        let config =
            Config::from_str("[compile]\nmode = \"eval\"\ninherited_locals = [\"a\"]\n").unwrap();
        let flags = CompileFlags {
            mode: Some("binding".to_string()),
            strict: true,
            inherited_locals: vec!["b".to_string()],
            ..CompileFlags::default()
        };

        let options = config.compile_options(&flags).unwrap();
        assert_eq!(options.mode, CompilationMode::BindingExpression);
        assert!(options.strict);
        assert_eq!(options.inherited_locals, vec!["b".to_string()]);
    }

    #[test]
    fn test_unset_flags_keep_file_values() {
        let config = Config::from_str("[compile]\nstrict = true\nmax_nesting_depth = 8\n").unwrap();
        let options = config.compile_options(&CompileFlags::default()).unwrap();
        assert!(options.strict);
        assert_eq!(options.max_nesting_depth, Some(8));
    }

    #[test]
    fn test_invalid_toml() {
        let err = Config::from_str("[compile\nstrict = true").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_unknown_mode_flag() {
        let flags = CompileFlags {
            mode: Some("module".to_string()),
            ..CompileFlags::default()
        };
        let err = Config::default().compile_options(&flags).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMode(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[compile]\nfile_name = \"main.js\"").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.compile.file_name, "main.js");
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("missing.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
