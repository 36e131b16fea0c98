//! Error types for snvmap
//!
//! Provides a unified error type for all store operations.
//!
//! Precondition failures (a delimiter inside a set member, a colon inside
//! an exon id) are not represented here: they panic at the call site.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for snvmap operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // Handle Lifecycle Errors
    // -------------------------------------------------------------------------
    /// An operation was attempted before `open()` succeeded (or after `close()`)
    #[error("store is not opened")]
    StoreNotOpened,

    /// The backing path is inaccessible, or a read-only open targets a
    /// store that was never created
    #[error("store unavailable at {}: {reason}", .path.display())]
    StoreUnavailable { path: PathBuf, reason: String },

    /// A write was attempted through a read-only handle
    #[error("store at {} is opened read-only", .0.display())]
    ReadOnly(PathBuf),

    // -------------------------------------------------------------------------
    // Data Errors
    // -------------------------------------------------------------------------
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    // -------------------------------------------------------------------------
    // Engine / I/O Errors
    // -------------------------------------------------------------------------
    #[error("engine error: {0}")]
    Engine(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::StoreUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn corrupt(detail: impl Into<String>) -> Self {
        StoreError::CorruptRecord(detail.into())
    }
}
