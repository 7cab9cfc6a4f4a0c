use thiserror::Error;

/// Error kinds surfaced by store operations that propagate failures.
///
/// Lifecycle, backup, consolidation and seeding catch these internally and
/// fold them into their structured reports; callers of those check the
/// report's `success` flag instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
