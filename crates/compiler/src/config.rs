//! Compiler configuration
//!
//! ```json
//! { "strategy": "provenance", "emit_debug_info": false }
//! ```
//!
//! Missing fields take their defaults: semi-naive evaluation with debug
//! info.

use crate::error::CompileError;
use ast2ram::TranslationStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerConfig {
    pub strategy: TranslationStrategy,
    /// Wrap every clause query in a `DEBUG` statement with the clause text
    pub emit_debug_info: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            strategy: TranslationStrategy::Seminaive,
            emit_debug_info: true,
        }
    }
}

impl CompilerConfig {
    pub fn from_json(json: &str) -> Result<Self, CompileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CompileError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = CompilerConfig::from_json(r#"{ "strategy": "provenance" }"#).unwrap();
        assert_eq!(config.strategy, TranslationStrategy::Provenance);
        assert!(config.emit_debug_info);
        assert_eq!(CompilerConfig::from_json("{}").unwrap(), CompilerConfig::default());
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let err = CompilerConfig::from_json(r#"{ "strategy": "magic" }"#).unwrap_err();
        assert!(matches!(err, CompileError::Config(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = CompilerConfig::from_file("/nonexistent/backend.json").unwrap_err();
        assert!(matches!(err, CompileError::Io(_)));
    }
}
