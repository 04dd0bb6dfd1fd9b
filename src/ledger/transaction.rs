use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::CategoryKind;

/// A single income or expense event in the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: CategoryKind,
    pub amount: Decimal,
    pub category_id: Uuid,
    #[serde(default)]
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Transaction as drafted by a caller; the store assigns the id on
/// acceptance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionDraft {
    pub kind: CategoryKind,
    pub amount: Decimal,
    pub category_id: Uuid,
    #[serde(default)]
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

impl TransactionDraft {
    pub fn new(
        kind: CategoryKind,
        amount: Decimal,
        category_id: Uuid,
        description: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind,
            amount,
            category_id,
            description: description.into(),
            timestamp,
        }
    }

    pub(crate) fn finalize(self, id: Uuid) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            amount: self.amount,
            category_id: self.category_id,
            description: self.description,
            timestamp: self.timestamp,
        }
    }
}
