use ast2ram::TranslationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid compiler configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("translation failed: {0}")]
    Translation(#[from] TranslationError),
}
