use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A spending guardrail for a specific expense category. At most one
/// limit exists per category; setting it again replaces the amount.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetLimit {
    pub category_id: Uuid,
    pub limit: Decimal,
}

impl BudgetLimit {
    pub fn new(category_id: Uuid, limit: Decimal) -> Self {
        Self { category_id, limit }
    }
}
