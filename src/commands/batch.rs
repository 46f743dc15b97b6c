use chrono::{DateTime, Utc};
use tracing::{debug, error, warn};

use crate::{
    errors::{BatchFailure, BatchOperation, StoreError, StoreResult},
    storage::EntityStore,
};

use super::record::RecordCommand;

/// An ordered group of record commands applied and reverted as one history entry.
///
/// Execute and redo run the children in order and roll back the completed
/// prefix on failure. Undo runs them in reverse and stops at the first failure.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchCommand {
    description: String,
    timestamp: DateTime<Utc>,
    children: Vec<RecordCommand>,
}

impl BatchCommand {
    pub fn new(description: impl Into<String>, children: Vec<RecordCommand>) -> StoreResult<Self> {
        Self::from_parts(description.into(), Utc::now(), children)
    }

    pub fn from_parts(
        description: String,
        timestamp: DateTime<Utc>,
        children: Vec<RecordCommand>,
    ) -> StoreResult<Self> {
        if children.is_empty() {
            return Err(StoreError::ValidationRejected(
                "a batch needs at least one change".into(),
            ));
        }
        Ok(Self {
            description,
            timestamp,
            children,
        })
    }

    /// The caller-supplied description, without the change count.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Description shown in menus and history, e.g. `Importar CSV (3 cambios)`.
    pub fn display_description(&self) -> String {
        format!("{} ({} cambios)", self.description, self.children.len())
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn children(&self) -> &[RecordCommand] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn execute(&self, store: &mut dyn EntityStore) -> Result<(), BatchFailure> {
        self.run_forward(store, BatchOperation::Execute)
    }

    pub fn redo(&self, store: &mut dyn EntityStore) -> Result<(), BatchFailure> {
        self.run_forward(store, BatchOperation::Redo)
    }

    pub fn undo(&self, store: &mut dyn EntityStore) -> Result<(), BatchFailure> {
        let total = self.children.len();
        for index in (0..total).rev() {
            if let Err(cause) = self.children[index].undo(store) {
                let completed: Vec<usize> = (index + 1..total).collect();
                if !completed.is_empty() {
                    warn!(
                        batch = %self.description,
                        reverted = completed.len(),
                        "batch undo stopped partway"
                    );
                }
                return Err(BatchFailure {
                    operation: BatchOperation::Undo,
                    failed_index: index,
                    total,
                    completed,
                    rollback_failures: Vec::new(),
                    cause,
                });
            }
        }
        debug!(batch = %self.description, changes = total, "batch reverted");
        Ok(())
    }

    fn run_forward(
        &self,
        store: &mut dyn EntityStore,
        operation: BatchOperation,
    ) -> Result<(), BatchFailure> {
        let total = self.children.len();
        for (index, child) in self.children.iter().enumerate() {
            let result = match operation {
                BatchOperation::Redo => child.redo(store),
                _ => child.execute(store),
            };
            let Err(cause) = result else {
                continue;
            };

            let mut rollback_failures = Vec::new();
            for done in (0..index).rev() {
                if let Err(err) = self.children[done].undo(store) {
                    error!(
                        batch = %self.description,
                        change = done + 1,
                        "rollback failed: {err}"
                    );
                    rollback_failures.push(done);
                }
            }
            rollback_failures.sort_unstable();
            return Err(BatchFailure {
                operation,
                failed_index: index,
                total,
                completed: (0..index).collect(),
                rollback_failures,
                cause,
            });
        }
        debug!(batch = %self.description, changes = total, "batch applied");
        Ok(())
    }
}
