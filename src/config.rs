//! Generator configuration, loaded from `formgen.toml`.
//!
//! ```toml
//! [output]
//! component = "components/generated-form.tsx"
//! schema = "lib/form-schema.ts"
//! setup = "lib/form-setup.tsx"
//!
//! [codegen]
//! component_name = "GeneratedForm"
//! schema_import = "@/lib/form-schema"
//!
//! [install]
//! max_inline_length = 8000
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::install::DEFAULT_MAX_INLINE;
use crate::markup::CodegenOptions;

pub const CONFIG_FILE: &str = "formgen.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormgenConfig {
    pub output: OutputConfig,
    pub codegen: CodegenOptions,
    pub install: InstallConfig,
}

/// Where the artifacts are written, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub component: String,
    pub schema: String,
    pub setup: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            component: "components/generated-form.tsx".to_string(),
            schema: "lib/form-schema.ts".to_string(),
            setup: "lib/form-setup.tsx".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Longest one-liner before falling back to a script.
    pub max_inline_length: usize,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            max_inline_length: DEFAULT_MAX_INLINE,
        }
    }
}

impl FormgenConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&content)?)
    }

    /// `formgen.toml` in the current directory, or defaults if it is missing
    /// or unreadable.
    pub fn load_or_default() -> Self {
        match Self::load_from_file(CONFIG_FILE) {
            Ok(config) => config,
            Err(ConfigError::Io(_)) => Self::default(),
            Err(e) => {
                log::warn!("{}: {}, using defaults", CONFIG_FILE, e);
                Self::default()
            }
        }
    }

    /// Environment variables override file values.
    pub fn merge_with_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(name) = var("FORMGEN_COMPONENT_NAME") {
            self.codegen.component_name = name;
        }
        if let Some(path) = var("FORMGEN_SCHEMA_IMPORT") {
            self.codegen.schema_import = path;
        }
        if let Some(val) = var("FORMGEN_MAX_INLINE") {
            match val.parse::<usize>() {
                Ok(max) => self.install.max_inline_length = max,
                Err(_) => log::warn!("ignoring FORMGEN_MAX_INLINE={}", val),
            }
        }
    }

    /// Explicit file if given, else the default location, then the
    /// environment on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_or_default(),
        };
        config.merge_with_env();
        Ok(config)
    }
}
