use std::path::PathBuf;

use tracing::{debug, error};
use uuid::Uuid;

use crate::{
    domain::{ledger::CURRENT_SCHEMA_VERSION, EntityKind, Ledger, Record},
    errors::{StoreError, StoreResult},
    utils::persistence::{self, PersistError},
};

use super::{ensure_addressed, EntityStore};

/// Entity store over an in-memory [`Ledger`], optionally mirrored to a JSON file.
///
/// With a backing file every mutation is staged on a copy, written atomically,
/// and only then committed to memory, so a failed write leaves both untouched.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    ledger: Ledger,
    path: Option<PathBuf>,
    connected: bool,
}

impl LedgerStore {
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self {
            ledger: Ledger::new(name),
            path: None,
            connected: true,
        }
    }

    /// Opens (or starts) a file-backed ledger at `path`.
    pub fn open(path: impl Into<PathBuf>, name: &str) -> Result<Self, PersistError> {
        let path = path.into();
        let ledger = match persistence::load_json::<Ledger>(&path)? {
            Some(ledger) => {
                if ledger.schema_version > CURRENT_SCHEMA_VERSION {
                    return Err(PersistError::Io(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!(
                            "ledger schema v{} is newer than supported v{}",
                            ledger.schema_version, CURRENT_SCHEMA_VERSION
                        ),
                    )));
                }
                ledger
            }
            None => Ledger::new(name),
        };
        debug!(path = %path.display(), "opened ledger store");
        Ok(Self {
            ledger,
            path: Some(path),
            connected: true,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn connect(&mut self) {
        self.connected = true;
    }

    /// Simulates losing the backend connection.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    /// Lists dangling references left behind by deletes.
    pub fn warnings(&self) -> Vec<String> {
        let ledger = &self.ledger;
        let mut warnings = Vec::new();

        for txn in &ledger.transactions {
            if ledger.account(txn.account_id).is_none() {
                warnings.push(format!(
                    "transaction {} references unknown account {}",
                    txn.id, txn.account_id
                ));
            }
            if let Some(category) = txn.category_id {
                if ledger.category(category).is_none() {
                    warnings.push(format!(
                        "transaction {} references missing category {}",
                        txn.id, category
                    ));
                }
            }
        }
        for budget in &ledger.budgets {
            if ledger.category(budget.category_id).is_none() {
                warnings.push(format!(
                    "budget {} references missing category {}",
                    budget.id, budget.category_id
                ));
            }
        }
        warnings
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.connected {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }

    fn commit<F>(&mut self, mutate: F) -> StoreResult<()>
    where
        F: FnOnce(&mut Ledger) -> StoreResult<()>,
    {
        self.ensure_available()?;
        let Some(path) = self.path.as_ref() else {
            return mutate(&mut self.ledger);
        };
        let mut staged = self.ledger.clone();
        mutate(&mut staged)?;
        if let Err(err) = persistence::save_json(&staged, path) {
            error!(path = %path.display(), "failed to write ledger: {err}");
            return Err(StoreError::Unavailable);
        }
        self.ledger = staged;
        Ok(())
    }
}

impl EntityStore for LedgerStore {
    fn is_available(&self) -> bool {
        self.connected
    }

    fn get(&self, kind: EntityKind, id: Uuid) -> StoreResult<Record> {
        self.ensure_available()?;
        self.ledger
            .get(kind, id)
            .ok_or(StoreError::RecordMissing { kind, id })
    }

    fn list(&self, kind: EntityKind) -> StoreResult<Vec<Record>> {
        self.ensure_available()?;
        let ledger = &self.ledger;
        Ok(match kind {
            EntityKind::Transaction => ledger.transactions.iter().cloned().map(Record::from).collect(),
            EntityKind::Account => ledger.accounts.iter().cloned().map(Record::from).collect(),
            EntityKind::Category => ledger.categories.iter().cloned().map(Record::from).collect(),
            EntityKind::Budget => ledger.budgets.iter().cloned().map(Record::from).collect(),
        })
    }

    fn create(&mut self, kind: EntityKind, id: Uuid, record: &Record) -> StoreResult<()> {
        ensure_addressed(kind, id, record)?;
        self.commit(|ledger| {
            if ledger.contains(kind, id) {
                return Err(StoreError::ValidationRejected(format!(
                    "{} {} already exists",
                    kind, id
                )));
            }
            validate(ledger, record)?;
            ledger.insert(record.clone());
            Ok(())
        })
    }

    fn update(&mut self, kind: EntityKind, id: Uuid, record: &Record) -> StoreResult<()> {
        ensure_addressed(kind, id, record)?;
        self.commit(|ledger| {
            if !ledger.contains(kind, id) {
                return Err(StoreError::RecordMissing { kind, id });
            }
            validate(ledger, record)?;
            ledger.replace(record.clone());
            Ok(())
        })
    }

    fn delete(&mut self, kind: EntityKind, id: Uuid, soft: bool) -> StoreResult<()> {
        self.commit(|ledger| {
            let mut record = ledger
                .get(kind, id)
                .ok_or(StoreError::RecordMissing { kind, id })?;
            if soft {
                record.set_active(false);
                ledger.replace(record);
            } else {
                ledger.remove(kind, id);
            }
            Ok(())
        })
    }
}

/// Field-level checks the store applies to every write.
fn validate(ledger: &Ledger, record: &Record) -> StoreResult<()> {
    match record {
        Record::Transaction(txn) => {
            if !txn.amount.is_finite() || txn.amount < 0.0 {
                return Err(StoreError::ValidationRejected(format!(
                    "transaction amount must be a non-negative number, got {}",
                    txn.amount
                )));
            }
        }
        Record::Account(account) => {
            require_name(&account.name, EntityKind::Account)?;
            if !account.balance.is_finite() {
                return Err(StoreError::ValidationRejected(
                    "account balance must be a finite number".into(),
                ));
            }
            let normalized = account.name.trim().to_ascii_lowercase();
            let duplicate = account.active
                && ledger.accounts.iter().any(|other| {
                    other.active
                        && other.id != account.id
                        && other.name.trim().to_ascii_lowercase() == normalized
                });
            if duplicate {
                return Err(StoreError::ValidationRejected(format!(
                    "Account `{}` already exists",
                    account.name
                )));
            }
        }
        Record::Category(category) => {
            require_name(&category.name, EntityKind::Category)?;
            if category.parent_id == Some(category.id) {
                return Err(StoreError::ValidationRejected(
                    "category cannot be its own parent".into(),
                ));
            }
        }
        Record::Budget(budget) => {
            if !budget.limit.is_finite() || budget.limit < 0.0 {
                return Err(StoreError::ValidationRejected(format!(
                    "budget limit must be a non-negative number, got {}",
                    budget.limit
                )));
            }
        }
    }
    Ok(())
}

fn require_name(name: &str, kind: EntityKind) -> StoreResult<()> {
    if name.trim().is_empty() {
        Err(StoreError::ValidationRejected(format!(
            "{} name cannot be empty",
            kind
        )))
    } else {
        Ok(())
    }
}
