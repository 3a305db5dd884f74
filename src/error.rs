use thiserror::Error;

/// Convenience result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Error type returned by catalog ingestion, execution and reporting.
///
/// Malformed fields inside a line are never reported here: they degrade to the
/// [`crate::types::UNKNOWN`] sentinel while the line is parsed.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Underlying I/O error (e.g. catalog not found, permission denied, read failure mid-file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV report rendering error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON report rendering error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The worker pool for parallel execution could not be built.
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Execution options are out of range.
    #[error("invalid options: {message}")]
    InvalidOptions { message: String },
}
