use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{
    account::AccountRecord,
    budget::BudgetRecord,
    category::CategoryRecord,
    common::{Identifiable, NamedEntity, SoftDeletable},
    transaction::TransactionRecord,
};

/// The four kinds of records the store manages.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Transaction,
    Account,
    Category,
    Budget,
}

impl EntityKind {
    pub const ALL: [EntityKind; 4] = [
        EntityKind::Transaction,
        EntityKind::Account,
        EntityKind::Category,
        EntityKind::Budget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Transaction => "transaction",
            EntityKind::Account => "account",
            EntityKind::Category => "category",
            EntityKind::Budget => "budget",
        }
    }

    /// Noun used in the user-facing history descriptions.
    pub fn noun(&self) -> &'static str {
        match self {
            EntityKind::Transaction => "transacción",
            EntityKind::Account => "cuenta",
            EntityKind::Category => "categoría",
            EntityKind::Budget => "presupuesto",
        }
    }

    /// Name fragment used in command type tags (`CreateTransaction`, ...).
    pub fn type_name(&self) -> &'static str {
        match self {
            EntityKind::Transaction => "Transaction",
            EntityKind::Account => "Account",
            EntityKind::Category => "Category",
            EntityKind::Budget => "Budget",
        }
    }

    pub fn from_type_name(value: &str) -> Option<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.type_name() == value)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full snapshot of one record, tagged by entity kind.
///
/// Serialized without a tag: the owning command carries `entity_kind`, and
/// [`Record::from_value`] uses it to pick the payload type on the way back.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Record {
    Transaction(TransactionRecord),
    Account(AccountRecord),
    Category(CategoryRecord),
    Budget(BudgetRecord),
}

impl Record {
    pub fn kind(&self) -> EntityKind {
        match self {
            Record::Transaction(_) => EntityKind::Transaction,
            Record::Account(_) => EntityKind::Account,
            Record::Category(_) => EntityKind::Category,
            Record::Budget(_) => EntityKind::Budget,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Record::Transaction(record) => record.id(),
            Record::Account(record) => record.id(),
            Record::Category(record) => record.id(),
            Record::Budget(record) => record.id(),
        }
    }

    /// Short label naming the record in history descriptions.
    pub fn label(&self) -> String {
        match self {
            Record::Transaction(record) => record.name().to_string(),
            Record::Account(record) => record.name().to_string(),
            Record::Category(record) => record.name().to_string(),
            Record::Budget(record) => record.label(),
        }
    }

    pub fn is_active(&self) -> bool {
        match self {
            Record::Transaction(record) => record.is_active(),
            Record::Account(record) => record.is_active(),
            Record::Category(record) => record.is_active(),
            Record::Budget(record) => record.is_active(),
        }
    }

    pub fn set_active(&mut self, active: bool) {
        match self {
            Record::Transaction(record) => record.set_active(active),
            Record::Account(record) => record.set_active(active),
            Record::Category(record) => record.set_active(active),
            Record::Budget(record) => record.set_active(active),
        }
    }

    /// Decodes a payload whose kind is known from context.
    pub fn from_value(kind: EntityKind, value: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match kind {
            EntityKind::Transaction => Record::Transaction(serde_json::from_value(value)?),
            EntityKind::Account => Record::Account(serde_json::from_value(value)?),
            EntityKind::Category => Record::Category(serde_json::from_value(value)?),
            EntityKind::Budget => Record::Budget(serde_json::from_value(value)?),
        })
    }
}

impl From<TransactionRecord> for Record {
    fn from(record: TransactionRecord) -> Self {
        Record::Transaction(record)
    }
}

impl From<AccountRecord> for Record {
    fn from(record: AccountRecord) -> Self {
        Record::Account(record)
    }
}

impl From<CategoryRecord> for Record {
    fn from(record: CategoryRecord) -> Self {
        Record::Category(record)
    }
}

impl From<BudgetRecord> for Record {
    fn from(record: BudgetRecord) -> Self {
        Record::Budget(record)
    }
}
