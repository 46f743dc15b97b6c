//! Reversible commands recorded by the undo/redo history.

pub mod batch;
pub mod record;

use chrono::{DateTime, Utc};

use crate::{
    domain::Record,
    errors::{HistoryError, Result},
    storage::EntityStore,
};

pub use batch::BatchCommand;
pub use record::{CommandKind, Operation, RecordCommand};

/// Type tag written for batch entries in the history file.
pub const BATCH_TYPE: &str = "Batch";

/// A history entry: either a single record change or a batch of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Record(RecordCommand),
    Batch(BatchCommand),
}

impl Command {
    pub fn create(after: impl Into<Record>) -> Self {
        Command::Record(RecordCommand::create(after))
    }

    pub fn update(before: impl Into<Record>, after: impl Into<Record>) -> Result<Self> {
        Ok(Command::Record(RecordCommand::update(before, after)?))
    }

    pub fn delete(before: impl Into<Record>, soft: bool) -> Self {
        Command::Record(RecordCommand::delete(before).soft_delete(soft))
    }

    pub fn batch(description: impl Into<String>, children: Vec<RecordCommand>) -> Result<Self> {
        Ok(Command::Batch(BatchCommand::new(description, children)?))
    }

    pub fn execute(&self, store: &mut dyn EntityStore) -> Result<()> {
        match self {
            Command::Record(command) => command.execute(store).map_err(HistoryError::from),
            Command::Batch(batch) => batch.execute(store).map_err(HistoryError::from),
        }
    }

    pub fn undo(&self, store: &mut dyn EntityStore) -> Result<()> {
        match self {
            Command::Record(command) => command.undo(store).map_err(HistoryError::from),
            Command::Batch(batch) => batch.undo(store).map_err(HistoryError::from),
        }
    }

    pub fn redo(&self, store: &mut dyn EntityStore) -> Result<()> {
        match self {
            Command::Record(command) => command.redo(store).map_err(HistoryError::from),
            Command::Batch(batch) => batch.redo(store).map_err(HistoryError::from),
        }
    }

    /// User-facing description; batches append their change count.
    pub fn description(&self) -> String {
        match self {
            Command::Record(command) => command.description().to_string(),
            Command::Batch(batch) => batch.display_description(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Command::Record(command) => command.timestamp(),
            Command::Batch(batch) => batch.timestamp(),
        }
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Command::Batch(_))
    }

    /// `CreateTransaction`, ..., or `Batch`.
    pub fn type_name(&self) -> String {
        match self {
            Command::Record(command) => command.kind().to_string(),
            Command::Batch(_) => BATCH_TYPE.to_string(),
        }
    }
}

impl From<RecordCommand> for Command {
    fn from(command: RecordCommand) -> Self {
        Command::Record(command)
    }
}

impl From<BatchCommand> for Command {
    fn from(batch: BatchCommand) -> Self {
        Command::Batch(batch)
    }
}
