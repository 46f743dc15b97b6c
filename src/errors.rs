use std::fmt;

use thiserror::Error;
use uuid::Uuid;

use crate::config::ConfigError;
use crate::domain::EntityKind;
use crate::history::Direction;

/// Failures reported by an entity store.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("Entity store unavailable")]
    Unavailable,
    #[error("Validation rejected: {0}")]
    ValidationRejected(String),
    #[error("Record missing: {kind} {id}")]
    RecordMissing { kind: EntityKind, id: Uuid },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Error type returned by commands and the undo/redo manager.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("Entity store unavailable")]
    StoreUnavailable,
    #[error("Validation rejected: {0}")]
    ValidationRejected(String),
    #[error("Record missing: {kind} {id}")]
    RecordMissing { kind: EntityKind, id: Uuid },
    #[error("Nothing to {0}")]
    EmptyStack(Direction),
    #[error("{0}")]
    PartialBatchFailure(Box<BatchFailure>),
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
    #[error("Operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, HistoryError>;

impl HistoryError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            HistoryError::StoreUnavailable => ErrorCategory::StoreUnavailable,
            HistoryError::ValidationRejected(_) => ErrorCategory::ValidationRejected,
            HistoryError::RecordMissing { .. } => ErrorCategory::RecordMissing,
            HistoryError::EmptyStack(_) => ErrorCategory::EmptyStack,
            HistoryError::PartialBatchFailure(_) => ErrorCategory::PartialBatchFailure,
            HistoryError::PersistenceFailure(_) => ErrorCategory::PersistenceFailure,
            HistoryError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    /// Whether a UI should surface this error as a visible message.
    pub fn is_user_visible(&self) -> bool {
        self.category().is_user_visible()
    }

    pub fn batch_failure(&self) -> Option<&BatchFailure> {
        match self {
            HistoryError::PartialBatchFailure(failure) => Some(&**failure),
            _ => None,
        }
    }
}

impl From<StoreError> for HistoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable => HistoryError::StoreUnavailable,
            StoreError::ValidationRejected(reason) => HistoryError::ValidationRejected(reason),
            StoreError::RecordMissing { kind, id } => HistoryError::RecordMissing { kind, id },
        }
    }
}

impl From<BatchFailure> for HistoryError {
    fn from(failure: BatchFailure) -> Self {
        HistoryError::PartialBatchFailure(Box::new(failure))
    }
}

impl From<std::io::Error> for HistoryError {
    fn from(err: std::io::Error) -> Self {
        HistoryError::PersistenceFailure(err.to_string())
    }
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::PersistenceFailure(err.to_string())
    }
}

/// Errors that stop the interactive shell itself.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}

/// Coarse error classes a UI maps to messages, disabled actions or logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    StoreUnavailable,
    ValidationRejected,
    RecordMissing,
    EmptyStack,
    PartialBatchFailure,
    PersistenceFailure,
    Cancelled,
}

impl ErrorCategory {
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            ErrorCategory::StoreUnavailable
                | ErrorCategory::ValidationRejected
                | ErrorCategory::RecordMissing
                | ErrorCategory::PartialBatchFailure
        )
    }
}

/// Which batch operation stopped partway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOperation {
    Execute,
    Undo,
    Redo,
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BatchOperation::Execute => "execute",
            BatchOperation::Undo => "undo",
            BatchOperation::Redo => "redo",
        };
        f.write_str(label)
    }
}

/// Details of a batch that stopped partway through its children.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchFailure {
    pub operation: BatchOperation,
    /// Index of the child that failed, in the batch's forward order.
    pub failed_index: usize,
    pub total: usize,
    /// Forward-order indices of children whose operation succeeded before the failure.
    pub completed: Vec<usize>,
    /// Forward-order indices of children whose rollback failed (execute/redo only).
    pub rollback_failures: Vec<usize>,
    pub cause: StoreError,
}

impl BatchFailure {
    /// True when the store ended up exactly as it was before the batch call.
    pub fn store_unchanged(&self) -> bool {
        match self.operation {
            BatchOperation::Undo => self.completed.is_empty(),
            BatchOperation::Execute | BatchOperation::Redo => self.rollback_failures.is_empty(),
        }
    }
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Batch {} stopped at change {} of {}: {}",
            self.operation,
            self.failed_index + 1,
            self.total,
            self.cause
        )?;
        match self.operation {
            BatchOperation::Undo => write!(f, " ({} reverted)", self.completed.len()),
            BatchOperation::Execute | BatchOperation::Redo => {
                if self.rollback_failures.is_empty() {
                    write!(f, " (rolled back {})", self.completed.len())
                } else {
                    write!(
                        f,
                        " (rollback failed for {} of {})",
                        self.rollback_failures.len(),
                        self.completed.len()
                    )
                }
            }
        }
    }
}
