//! Error handling for the skill matcher

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillMatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Data file error: {0}")]
    DataFile(String),

    #[error("Embedding cache error: {0}")]
    Cache(String),

    #[error("Embedding generation error: {0}")]
    Embedding(String),

    #[error("Matching error: {0}")]
    Matching(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("PDF extraction error: {0}")]
    PdfExtraction(String),

    #[error("File format not supported: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkillMatchError>;

/// The embedding backend reports failures through anyhow
impl From<anyhow::Error> for SkillMatchError {
    fn from(err: anyhow::Error) -> Self {
        SkillMatchError::Embedding(format!("{:#}", err))
    }
}

impl From<bincode::Error> for SkillMatchError {
    fn from(err: bincode::Error) -> Self {
        SkillMatchError::Cache(err.to_string())
    }
}
