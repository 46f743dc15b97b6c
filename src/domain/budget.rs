use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::*;

/// A spending guardrail for a specific category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetRecord {
    pub id: Uuid,
    pub category_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    pub limit: f64,
    pub period: BudgetPeriod,
    #[serde(default = "default_active")]
    pub active: bool,
}

impl BudgetRecord {
    pub fn new(category_id: Uuid, limit: f64, period: BudgetPeriod) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            category_name: None,
            limit,
            period,
            active: true,
        }
    }

    pub fn with_category_name(mut self, name: impl Into<String>) -> Self {
        self.category_name = Some(name.into());
        self
    }

    /// Label shown in descriptions: the category name, or its id when unnamed.
    pub fn label(&self) -> String {
        self.category_name
            .clone()
            .unwrap_or_else(|| self.category_id.to_string())
    }
}

impl Identifiable for BudgetRecord {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl SoftDeletable for BudgetRecord {
    fn is_active(&self) -> bool {
        self.active
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}

/// Enumeration of budgeting periods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum BudgetPeriod {
    #[default]
    Monthly,
    Quarterly,
    Yearly,
}

impl BudgetPeriod {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }
}
