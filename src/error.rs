//! Error types for the speech engine.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Voice catalog error: {0}")]
    Catalog(String),

    #[error("Synthesizer error: {0}")]
    Synthesizer(String),

    #[error("Speech engine has shut down")]
    Closed,

    #[error("Config error: {0}")]
    Config(#[from] serde_yml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
