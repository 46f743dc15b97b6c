use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// Represents a financial account tracked by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountRecord {
    pub id: Uuid,
    pub name: String,
    pub kind: AccountKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default)]
    pub balance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl AccountRecord {
    /// Creates a new active account with a zero balance.
    pub fn new(name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            currency: None,
            balance: 0.0,
            notes: None,
            active: true,
        }
    }

    pub fn with_balance(mut self, balance: f64) -> Self {
        self.balance = balance;
        self
    }
}

impl Identifiable for AccountRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl NamedEntity for AccountRecord {
    fn name(&self) -> &str {
        &self.name
    }
}

impl SoftDeletable for AccountRecord {
    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Enumerates the supported account classifications.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AccountKind {
    Bank,
    Cash,
    Savings,
    CreditCard,
    Investment,
    Other,
}

impl AccountKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bank" => Some(Self::Bank),
            "cash" => Some(Self::Cash),
            "savings" => Some(Self::Savings),
            "credit" | "creditcard" | "credit-card" => Some(Self::CreditCard),
            "investment" => Some(Self::Investment),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}
