use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    account::AccountRecord, budget::BudgetRecord, category::CategoryRecord, record::EntityKind,
    record::Record, transaction::TransactionRecord,
};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// In-memory image of every record held by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub name: String,
    #[serde(default)]
    pub accounts: Vec<AccountRecord>,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
    #[serde(default)]
    pub budgets: Vec<BudgetRecord>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            accounts: Vec::new(),
            categories: Vec::new(),
            transactions: Vec::new(),
            budgets: Vec::new(),
            updated_at: Utc::now(),
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn get(&self, kind: EntityKind, id: Uuid) -> Option<Record> {
        match kind {
            EntityKind::Transaction => find(&self.transactions, id, |r| r.id).map(Record::from),
            EntityKind::Account => find(&self.accounts, id, |r| r.id).map(Record::from),
            EntityKind::Category => find(&self.categories, id, |r| r.id).map(Record::from),
            EntityKind::Budget => find(&self.budgets, id, |r| r.id).map(Record::from),
        }
    }

    pub fn contains(&self, kind: EntityKind, id: Uuid) -> bool {
        match kind {
            EntityKind::Transaction => self.transactions.iter().any(|r| r.id == id),
            EntityKind::Account => self.accounts.iter().any(|r| r.id == id),
            EntityKind::Category => self.categories.iter().any(|r| r.id == id),
            EntityKind::Budget => self.budgets.iter().any(|r| r.id == id),
        }
    }

    /// Appends a record. Callers check for duplicates first.
    pub fn insert(&mut self, record: Record) {
        match record {
            Record::Transaction(r) => self.transactions.push(r),
            Record::Account(r) => self.accounts.push(r),
            Record::Category(r) => self.categories.push(r),
            Record::Budget(r) => self.budgets.push(r),
        }
        self.touch();
    }

    /// Replaces the record sharing `record`'s id. Returns `false` when absent.
    pub fn replace(&mut self, record: Record) -> bool {
        let replaced = match record {
            Record::Transaction(r) => replace_in(&mut self.transactions, r, |x| x.id),
            Record::Account(r) => replace_in(&mut self.accounts, r, |x| x.id),
            Record::Category(r) => replace_in(&mut self.categories, r, |x| x.id),
            Record::Budget(r) => replace_in(&mut self.budgets, r, |x| x.id),
        };
        if replaced {
            self.touch();
        }
        replaced
    }

    /// Removes a record. Returns `false` when absent.
    pub fn remove(&mut self, kind: EntityKind, id: Uuid) -> bool {
        let removed = match kind {
            EntityKind::Transaction => remove_from(&mut self.transactions, id, |r| r.id),
            EntityKind::Account => remove_from(&mut self.accounts, id, |r| r.id),
            EntityKind::Category => remove_from(&mut self.categories, id, |r| r.id),
            EntityKind::Budget => remove_from(&mut self.budgets, id, |r| r.id),
        };
        if removed {
            self.touch();
        }
        removed
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Transaction => self.transactions.len(),
            EntityKind::Account => self.accounts.len(),
            EntityKind::Category => self.categories.len(),
            EntityKind::Budget => self.budgets.len(),
        }
    }

    pub fn account(&self, id: Uuid) -> Option<&AccountRecord> {
        self.accounts.iter().find(|account| account.id == id)
    }

    pub fn category(&self, id: Uuid) -> Option<&CategoryRecord> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new("default")
    }
}

fn find<T: Clone>(items: &[T], id: Uuid, key: impl Fn(&T) -> Uuid) -> Option<T> {
    items.iter().find(|item| key(item) == id).cloned()
}

fn replace_in<T>(items: &mut [T], record: T, key: impl Fn(&T) -> Uuid) -> bool {
    let id = key(&record);
    match items.iter_mut().find(|item| key(item) == id) {
        Some(slot) => {
            *slot = record;
            true
        }
        None => false,
    }
}

fn remove_from<T>(items: &mut Vec<T>, id: Uuid, key: impl Fn(&T) -> Uuid) -> bool {
    let before = items.len();
    items.retain(|item| key(item) != id);
    items.len() != before
}
