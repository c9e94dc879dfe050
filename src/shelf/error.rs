use crate::model::Format;
use crate::validation::IdValidationError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShelfError {
    #[error("Invalid id '{id}': {reason}")]
    InvalidId {
        id: String,
        reason: IdValidationError,
    },

    #[error("Id '{0}' is already in use")]
    DuplicateId(String),

    #[error("Source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("Unreadable {format} document: {reason}")]
    UnreadableDocument { format: Format, reason: String },

    #[error("No item with id '{0}'")]
    NotFound(String),

    #[error("Item '{id}' is corrupt: {reason}")]
    CorruptItem { id: String, reason: String },

    #[error("Storage failure: {0}")]
    StorageFailure(#[from] std::io::Error),
}

impl ShelfError {
    pub fn unreadable(format: Format, reason: impl fmt::Display) -> Self {
        ShelfError::UnreadableDocument {
            format,
            reason: reason.to_string(),
        }
    }

    pub fn corrupt(id: impl Into<String>, reason: impl Into<String>) -> Self {
        ShelfError::CorruptItem {
            id: id.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ShelfError::InvalidId { .. } => ErrorKind::InvalidId,
            ShelfError::DuplicateId(_) => ErrorKind::DuplicateId,
            ShelfError::SourceNotFound(_) => ErrorKind::SourceNotFound,
            ShelfError::UnreadableDocument { .. } => ErrorKind::UnreadableDocument,
            ShelfError::NotFound(_) => ErrorKind::NotFound,
            ShelfError::CorruptItem { .. } => ErrorKind::CorruptItem,
            ShelfError::StorageFailure(_) => ErrorKind::StorageFailure,
        }
    }
}

/// Fieldless mirror of [`ShelfError`], used by clients to report an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidId,
    DuplicateId,
    SourceNotFound,
    UnreadableDocument,
    NotFound,
    CorruptItem,
    StorageFailure,
}

impl ErrorKind {
    /// Process exit status for a command that failed with this kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::InvalidId => 2,
            ErrorKind::DuplicateId => 3,
            ErrorKind::SourceNotFound => 4,
            ErrorKind::UnreadableDocument => 5,
            ErrorKind::NotFound => 6,
            ErrorKind::CorruptItem => 7,
            ErrorKind::StorageFailure => 8,
        }
    }

    /// Only storage failures may succeed on a retry (disk full, permission race).
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorKind::StorageFailure)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidId => "InvalidId",
            ErrorKind::DuplicateId => "DuplicateId",
            ErrorKind::SourceNotFound => "SourceNotFound",
            ErrorKind::UnreadableDocument => "UnreadableDocument",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::CorruptItem => "CorruptItem",
            ErrorKind::StorageFailure => "StorageFailure",
        };
        f.write_str(name)
    }
}

pub type Result<T> = std::result::Result<T, ShelfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_have_distinct_exit_codes() {
        let kinds = [
            ErrorKind::InvalidId,
            ErrorKind::DuplicateId,
            ErrorKind::SourceNotFound,
            ErrorKind::UnreadableDocument,
            ErrorKind::NotFound,
            ErrorKind::CorruptItem,
            ErrorKind::StorageFailure,
        ];
        let mut codes: Vec<i32> = kinds.iter().map(|k| k.exit_code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
        assert!(codes.iter().all(|c| *c != 0));
    }

    #[test]
    fn io_errors_become_storage_failures() {
        let err: ShelfError = std::io::Error::other("disk full").into();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(err.kind().is_transient());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn unreadable_names_the_format() {
        let err = ShelfError::unreadable(Format::Pdf, "bad xref");
        assert_eq!(err.kind(), ErrorKind::UnreadableDocument);
        assert_eq!(err.to_string(), "Unreadable pdf document: bad xref");
    }
}
