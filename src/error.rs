//! Error types for the lecture quiz engine.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our custom error.
pub type Result<T> = std::result::Result<T, QuizError>;

/// Errors that can occur while loading, indexing, generating or checking.
///
/// A quiz that comes back with fewer questions than requested is not an
/// error; see [`QuestionBatch::is_partial`](crate::question::QuestionBatch::is_partial).
#[derive(Error, Debug)]
pub enum QuizError {
    /// Error reading or writing files.
    #[error("I/O error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The lecture file does not exist.
    #[error("Document not found at '{0}'")]
    DocumentNotFound(PathBuf),

    /// The document has no usable sentences.
    #[error("Document '{0}' contains no usable sentences")]
    EmptyDocument(String),

    /// The query, topic or term was blank.
    #[error("Query is empty")]
    EmptyQuery,

    /// No sentence in the document is relevant to the query.
    #[error("Nothing in the lecture matches '{0}'")]
    NotFound(String),

    /// A session lookup asked for a question that does not exist.
    #[error("Question {number} not found (quiz has {total} questions)")]
    QuestionOutOfRange { number: usize, total: usize },

    /// The saved report file does not exist.
    #[error("Report file not found at '{0}'")]
    ReportNotFound(PathBuf),

    /// Error during serialization/deserialization.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QuizError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this is an input problem (blank document or query) rather
    /// than a failed lookup or an environment failure.
    pub fn is_input_error(&self) -> bool {
        matches!(self, QuizError::EmptyDocument(_) | QuizError::EmptyQuery)
    }
}

impl From<serde_json::Error> for QuizError {
    fn from(err: serde_json::Error) -> Self {
        QuizError::Serialization(err.to_string())
    }
}
