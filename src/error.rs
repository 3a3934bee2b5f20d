//! The closed error surface the core returns to callers.
//!
//! Every public operation in [`crate`] returns `Result<T, CoreError>` (aliased
//! as [`Result`]). Per-file failures during a whole-project index are recorded
//! on the job instead of aborting it; see [`crate::indexer`].

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unsupported language for file: {0}")]
    UnsupportedLanguage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error in {path}: {message}")]
    Parse { path: String, message: String },

    #[error("extract error in {path}: {message}")]
    Extract { path: String, message: String },

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("job not found: {0}")]
    JobNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid byte range [{start}, {end}) for file of length {len}")]
    InvalidByteRange {
        start: usize,
        end: usize,
        len: usize,
    },
}

impl From<rusqlite::Error> for CoreError {
    fn from(e: rusqlite::Error) -> Self {
        CoreError::Storage(e.to_string())
    }
}
</content>
