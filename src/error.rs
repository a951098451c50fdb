//! Error type shared by every report assembler.

use thiserror::Error;

/// Failures the engine can report once it has been given input.
///
/// Image fetch problems are deliberately absent: they degrade to a
/// placeholder instead of failing the document.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The input would produce corrupted layout (e.g. a label column wider
    /// than the content area).
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// The display list could not be turned into PDF bytes.
    #[error("render error: {0}")]
    Render(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
