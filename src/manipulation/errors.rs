use crate::ts::TreeSitterError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures raised by structural edits.
///
/// Every variant except `Parse`, `Io` and `ReconciliationMismatch` is raised
/// before any text is touched, so a failed call leaves the source unchanged.
#[derive(Error, Debug)]
pub enum ManipulationError {
    #[error("insert position {insert_pos} is outside parent range [{start}, {end}]")]
    InvalidInsertPosition {
        insert_pos: usize,
        start: usize,
        end: usize,
    },

    #[error("invalid replace range [{start}, {end}): {reason}")]
    InvalidReplaceRange {
        start: usize,
        end: usize,
        reason: String,
    },

    #[error("byte offset {pos} is not on a UTF-8 character boundary")]
    NotCharBoundary { pos: usize },

    #[error("index {index} is out of range for {count} {what}")]
    IndexOutOfRange {
        index: usize,
        count: usize,
        what: &'static str,
    },

    #[error("not implemented for value: {value}")]
    NotImplementedForValue { value: String },

    #[error("expected {expected} in {parent}, but none was found")]
    NotFound {
        expected: String,
        parent: &'static str,
    },

    #[error("expected a node of kind {expected}, found {found}")]
    UnexpectedKind {
        expected: String,
        found: &'static str,
    },

    #[error("handle to {kind} at [{start}, {end}) is stale after an edit; re-acquire it")]
    StaleNode {
        kind: &'static str,
        start: usize,
        end: usize,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("expected {expected} {what} after the edit, found {found}")]
    ReconciliationMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("tree-sitter error: {0}")]
    Parse(#[from] TreeSitterError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} changed on disk since it was loaded")]
    ModifiedOnDisk { path: PathBuf },

    #[error("source file has no path to save to")]
    NoPath,
}

impl ManipulationError {
    pub(crate) fn not_found(expected: impl Into<String>, parent: &'static str) -> Self {
        ManipulationError::NotFound {
            expected: expected.into(),
            parent,
        }
    }
}
