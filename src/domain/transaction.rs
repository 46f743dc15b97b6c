use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub account_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    pub date: NaiveDate,
    pub amount: f64,
    pub kind: TransactionKind,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl TransactionRecord {
    pub fn new(
        account_id: Uuid,
        date: NaiveDate,
        amount: f64,
        kind: TransactionKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            account_id,
            category_id: None,
            date,
            amount,
            kind,
            description: description.into(),
            notes: None,
            active: true,
        }
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Signed effect of the transaction on its account balance.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense | TransactionKind::Transfer => -self.amount,
        }
    }
}

impl Identifiable for TransactionRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for TransactionRecord {
    fn name(&self) -> &str {
        &self.description
    }
}

impl SoftDeletable for TransactionRecord {
    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "income" | "ingreso" => Some(Self::Income),
            "expense" | "gasto" => Some(Self::Expense),
            "transfer" | "transferencia" => Some(Self::Transfer),
            _ => None,
        }
    }
}
