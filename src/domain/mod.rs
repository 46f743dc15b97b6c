//! Typed record payloads for the four entity kinds and the ledger that holds them.

pub mod account;
pub mod budget;
pub mod category;
pub mod common;
pub mod ledger;
pub mod record;
pub mod transaction;

pub use account::{AccountKind, AccountRecord};
pub use budget::{BudgetPeriod, BudgetRecord};
pub use category::{CategoryKind, CategoryRecord};
pub use common::{Identifiable, NamedEntity, SoftDeletable};
pub use ledger::Ledger;
pub use record::{EntityKind, Record};
pub use transaction::{TransactionKind, TransactionRecord};
