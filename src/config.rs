//! Engine configuration
//!
//! `defaults/blanks.default.toml` is embedded into the crate so that the documented defaults and
//! runtime behavior stay in sync. Callers layer user files and single-key overrides on top of it
//! with [`Loader`] before deserializing into [`BlanksConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/blanks.default.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BlanksConfig {
    pub engine: EngineConfig,
    pub hints: HintConfig,
}

/// Knobs of the realized tree and its search
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    pub indent_unit: String,
    pub recursion_limit: usize,
    pub memoize_optionality: bool,
}

/// Suggestions offered at identifier positions
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HintConfig {
    pub functions: Vec<String>,
    pub variables: Vec<String>,
    pub var_color: u32,
    pub func_color: u32,
}

impl Default for BlanksConfig {
    fn default() -> Self {
        BlanksConfig {
            engine: EngineConfig::default(),
            hints: HintConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            indent_unit: "    ".to_string(),
            recursion_limit: 2000,
            memoize_optionality: true,
        }
    }
}

impl Default for HintConfig {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        HintConfig {
            functions: owned(&["print", "len", "int", "input", "float"]),
            variables: owned(&["self", "lst", "result", "some_var"]),
            var_color: 0xFF6A_8759,
            func_color: 0xFFFF_C66D,
        }
    }
}

/// Layers user overrides over the built-in defaults
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder =
            Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Missing files are an error
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Single key/value override, e.g. `engine.indent_unit` from the command line
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<BlanksConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<BlanksConfig, ConfigError> {
    Loader::new().build()
}
