use std::fmt;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::{
    domain::{EntityKind, Record},
    errors::{StoreError, StoreResult},
    storage::EntityStore,
};

const MAX_LABEL_CHARS: usize = 30;

/// The three reversible operations a command can perform on one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Create, Operation::Update, Operation::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "Create",
            Operation::Update => "Update",
            Operation::Delete => "Delete",
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Operation::Create => "Crear",
            Operation::Update => "Editar",
            Operation::Delete => "Eliminar",
        }
    }
}

/// Discriminator of the twelve concrete command types (`CreateTransaction`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandKind {
    pub operation: Operation,
    pub entity_kind: EntityKind,
}

impl CommandKind {
    pub fn new(operation: Operation, entity_kind: EntityKind) -> Self {
        Self {
            operation,
            entity_kind,
        }
    }

    /// Parses a type tag such as `UpdateBudget`.
    pub fn parse(tag: &str) -> Option<Self> {
        Operation::ALL.into_iter().find_map(|operation| {
            tag.strip_prefix(operation.as_str())
                .and_then(EntityKind::from_type_name)
                .map(|entity_kind| Self::new(operation, entity_kind))
        })
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}",
            self.operation.as_str(),
            self.entity_kind.type_name()
        )
    }
}

/// One reversible create/update/delete against a single record.
///
/// The command carries every snapshot it needs, so it can be replayed from its
/// serialized form in a later session.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordCommand {
    kind: CommandKind,
    target_id: Uuid,
    before_state: Option<Record>,
    after_state: Option<Record>,
    description: String,
    timestamp: DateTime<Utc>,
    soft: bool,
}

impl RecordCommand {
    /// Inserts `after` at its own (client-generated) id.
    pub fn create(after: impl Into<Record>) -> Self {
        let after = after.into();
        let kind = CommandKind::new(Operation::Create, after.kind());
        Self::assemble(kind, after.id(), None, Some(after))
    }

    /// Replaces `before` with `after`. `before` must be the state the user last saw.
    pub fn update(before: impl Into<Record>, after: impl Into<Record>) -> StoreResult<Self> {
        let before = before.into();
        let after = after.into();
        let kind = CommandKind::new(Operation::Update, before.kind());
        let target_id = before.id();
        check_payload(kind, target_id, Some(&before), Some(&after))?;
        Ok(Self::assemble(kind, target_id, Some(before), Some(after)))
    }

    /// Removes the record captured in `before`.
    pub fn delete(before: impl Into<Record>) -> Self {
        let before = before.into();
        let kind = CommandKind::new(Operation::Delete, before.kind());
        Self::assemble(kind, before.id(), Some(before), None)
    }

    /// Rebuilds a command from its persisted parts, checking they are consistent.
    pub fn from_parts(
        kind: CommandKind,
        target_id: Uuid,
        before_state: Option<Record>,
        after_state: Option<Record>,
        description: String,
        timestamp: DateTime<Utc>,
        soft: bool,
    ) -> StoreResult<Self> {
        check_payload(kind, target_id, before_state.as_ref(), after_state.as_ref())?;
        Ok(Self {
            kind,
            target_id,
            before_state,
            after_state,
            description,
            timestamp,
            soft: soft && kind.operation == Operation::Delete,
        })
    }

    fn assemble(
        kind: CommandKind,
        target_id: Uuid,
        before_state: Option<Record>,
        after_state: Option<Record>,
    ) -> Self {
        let label = after_state
            .as_ref()
            .map(Record::label)
            .filter(|label| !label.is_empty())
            .or_else(|| before_state.as_ref().map(Record::label))
            .unwrap_or_default();
        let description = describe(kind, &label);
        Self {
            kind,
            target_id,
            before_state,
            after_state,
            description,
            timestamp: Utc::now(),
            soft: false,
        }
    }

    /// Marks a delete as soft: the record is flagged inactive instead of removed.
    pub fn soft_delete(mut self, soft: bool) -> Self {
        self.soft = soft && self.kind.operation == Operation::Delete;
        self
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn operation(&self) -> Operation {
        self.kind.operation
    }

    pub fn entity_kind(&self) -> EntityKind {
        self.kind.entity_kind
    }

    pub fn target_id(&self) -> Uuid {
        self.target_id
    }

    pub fn before_state(&self) -> Option<&Record> {
        self.before_state.as_ref()
    }

    pub fn after_state(&self) -> Option<&Record> {
        self.after_state.as_ref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_soft(&self) -> bool {
        self.soft
    }

    pub fn execute(&self, store: &mut dyn EntityStore) -> StoreResult<()> {
        let kind = self.entity_kind();
        let id = self.target_id;
        match self.operation() {
            Operation::Create => store.create(kind, id, self.required_after()?)?,
            Operation::Update => store.update(kind, id, self.required_after()?)?,
            Operation::Delete => store.delete(kind, id, self.soft)?,
        }
        debug!(command = %self.kind, %id, "applied");
        Ok(())
    }

    pub fn undo(&self, store: &mut dyn EntityStore) -> StoreResult<()> {
        let kind = self.entity_kind();
        let id = self.target_id;
        match self.operation() {
            // The record did not exist before, so undo never soft-deletes.
            Operation::Create => store.delete(kind, id, false)?,
            Operation::Update => store.update(kind, id, self.required_before()?)?,
            Operation::Delete => {
                let before = self.required_before()?;
                if store.exists(kind, id)? {
                    store.update(kind, id, before)?;
                } else {
                    store.create(kind, id, before)?;
                }
            }
        }
        debug!(command = %self.kind, %id, "reverted");
        Ok(())
    }

    pub fn redo(&self, store: &mut dyn EntityStore) -> StoreResult<()> {
        self.execute(store)
    }

    fn required_after(&self) -> StoreResult<&Record> {
        self.after_state
            .as_ref()
            .ok_or_else(|| StoreError::ValidationRejected(format!("{} has no after state", self.kind)))
    }

    fn required_before(&self) -> StoreResult<&Record> {
        self.before_state
            .as_ref()
            .ok_or_else(|| StoreError::ValidationRejected(format!("{} has no before state", self.kind)))
    }
}

fn describe(kind: CommandKind, label: &str) -> String {
    let label = match kind.entity_kind {
        EntityKind::Transaction => truncate_label(label),
        _ => label.to_string(),
    };
    format!(
        "{} {}: {}",
        kind.operation.verb(),
        kind.entity_kind.noun(),
        label
    )
}

fn truncate_label(label: &str) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let head: String = label.chars().take(MAX_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

fn check_payload(
    kind: CommandKind,
    target_id: Uuid,
    before: Option<&Record>,
    after: Option<&Record>,
) -> StoreResult<()> {
    let (needs_before, needs_after) = match kind.operation {
        Operation::Create => (false, true),
        Operation::Update => (true, true),
        Operation::Delete => (true, false),
    };
    for (state, required, name) in [(before, needs_before, "before"), (after, needs_after, "after")] {
        match state {
            None if required => {
                return Err(StoreError::ValidationRejected(format!(
                    "{kind} requires a {name} state"
                )))
            }
            Some(record) if record.kind() != kind.entity_kind || record.id() != target_id => {
                return Err(StoreError::ValidationRejected(format!(
                    "{kind} {name} state does not describe {} {}",
                    kind.entity_kind, target_id
                )))
            }
            _ => {}
        }
    }
    Ok(())
}
