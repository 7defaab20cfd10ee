use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Failed to load document: {0}")]
    DocumentLoad(String),

    #[error("Failed to extract text: {0}")]
    TextExtraction(String),

    #[error("Invalid header pattern: {0}")]
    InvalidPattern(String),
}
