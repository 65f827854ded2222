use std::fs;
use std::path::{Path, PathBuf};

use irbind_sys::DiagnosticSeverity;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Settings for a [`Session`](crate::Session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Initial sizes of the interning tables
    #[serde(default)]
    pub cache: CacheConfig,

    /// Routing of native diagnostics
    #[serde(default)]
    pub diagnostics: DiagnosticConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub value_capacity: usize,
    pub metadata_capacity: usize,
    pub type_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            value_capacity: 256,
            metadata_capacity: 64,
            type_capacity: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticConfig {
    /// Install a native diagnostic handler that logs through `log`
    pub forward_to_log: bool,

    /// Less severe diagnostics are dropped
    pub min_severity: DiagnosticSeverity,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        Self {
            forward_to_log: true,
            min_severity: DiagnosticSeverity::Warning,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}")]
    #[diagnostic(code("BIND-CONFIG-001"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid session config: {0}")]
    #[diagnostic(code("BIND-CONFIG-002"))]
    Parse(#[from] toml::de::Error),
}

impl SessionConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(SessionConfig::from_toml_str("").unwrap(), SessionConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = SessionConfig::from_toml_str(
            r#"
            [cache]
            value_capacity = 1024

            [diagnostics]
            min_severity = "note"
            "#,
        )
        .unwrap();
        assert_eq!(config.cache.value_capacity, 1024);
        assert_eq!(config.cache.type_capacity, 32);
        assert!(config.diagnostics.forward_to_log);
        assert_eq!(config.diagnostics.min_severity, DiagnosticSeverity::Note);
    }

    #[test]
    fn bad_severity_is_a_parse_error() {
        let err = SessionConfig::from_toml_str("[diagnostics]\nmin_severity = \"loud\"\n");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = SessionConfig::load("/definitely/not/here/irbind.toml");
        assert!(matches!(err, Err(ConfigError::Io { .. })));
    }
}
