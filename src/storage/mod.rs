pub mod ledger_store;

use uuid::Uuid;

use crate::domain::{EntityKind, Record};
use crate::errors::{StoreError, StoreResult};

/// Narrow CRUD + snapshot interface commands replay themselves against.
///
/// Implementations own record state; commands only ever hold the copies
/// returned by [`EntityStore::snapshot`].
pub trait EntityStore {
    /// Whether the backend is reachable. Every other call fails with
    /// [`StoreError::Unavailable`] while this returns `false`.
    fn is_available(&self) -> bool;

    fn get(&self, kind: EntityKind, id: Uuid) -> StoreResult<Record>;

    /// Every stored record of `kind`, including soft-deleted ones.
    fn list(&self, kind: EntityKind) -> StoreResult<Vec<Record>>;

    /// Independent copy suitable for a command's `before_state`.
    fn snapshot(&self, kind: EntityKind, id: Uuid) -> StoreResult<Record> {
        self.get(kind, id)
    }

    fn create(&mut self, kind: EntityKind, id: Uuid, record: &Record) -> StoreResult<()>;

    fn update(&mut self, kind: EntityKind, id: Uuid, record: &Record) -> StoreResult<()>;

    /// Removes the record, or marks it inactive when `soft` is set.
    fn delete(&mut self, kind: EntityKind, id: Uuid, soft: bool) -> StoreResult<()>;

    fn exists(&self, kind: EntityKind, id: Uuid) -> StoreResult<bool> {
        match self.get(kind, id) {
            Ok(_) => Ok(true),
            Err(StoreError::RecordMissing { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}

/// Rejects payloads whose kind or id disagree with the addressed record.
pub fn ensure_addressed(kind: EntityKind, id: Uuid, record: &Record) -> StoreResult<()> {
    if record.kind() != kind {
        return Err(StoreError::ValidationRejected(format!(
            "expected a {} payload, got {}",
            kind,
            record.kind()
        )));
    }
    if record.id() != id {
        return Err(StoreError::ValidationRejected(format!(
            "payload id {} does not match target {}",
            record.id(),
            id
        )));
    }
    Ok(())
}

pub use ledger_store::LedgerStore;
