use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::LedgerError;

use super::{
    budget::BudgetLimit,
    category::{CategoryKind, CategoryRegistry},
    ids::IdSource,
    transaction::{Transaction, TransactionDraft},
};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The full ledger state: categories, the transaction log, and budget
/// limits. This is the snapshot persisted as a whole and handed to the
/// aggregation and budget engines, which never mutate it.
///
/// Mutations validate first and mutate second; a rejected operation
/// leaves the snapshot untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub categories: CategoryRegistry,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub budget_limits: Vec<BudgetLimit>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Ledger::schema_version_default")]
    pub schema_version: u8,
}

impl Ledger {
    /// Fresh ledger seeded with the stock category set.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_categories(name, CategoryRegistry::with_defaults())
    }

    pub fn with_categories(name: impl Into<String>, categories: CategoryRegistry) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            categories,
            transactions: Vec::new(),
            budget_limits: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    /// Validates and records a drafted transaction, assigning it a
    /// fresh id. New records are prepended so the log reads
    /// most-recent-first.
    pub fn add_transaction(
        &mut self,
        draft: TransactionDraft,
        ids: &mut dyn IdSource,
    ) -> Result<&Transaction, LedgerError> {
        self.validate_entry(draft.kind, draft.amount, draft.category_id)?;
        let record = draft.finalize(ids.next_id());
        tracing::debug!(id = %record.id, kind = ?record.kind, "transaction added");
        self.transactions.insert(0, record);
        self.touch();
        Ok(&self.transactions[0])
    }

    /// Replaces the stored transaction with the same id.
    pub fn update_transaction(&mut self, record: Transaction) -> Result<(), LedgerError> {
        self.validate_entry(record.kind, record.amount, record.category_id)?;
        let slot = self
            .transactions
            .iter_mut()
            .find(|txn| txn.id == record.id)
            .ok_or_else(|| LedgerError::not_found(format!("Transaction {}", record.id)))?;
        tracing::debug!(id = %record.id, "transaction updated");
        *slot = record;
        self.touch();
        Ok(())
    }

    /// Removes the transaction if present. Deleting an unknown id is a
    /// silent no-op, not an error.
    pub fn delete_transaction(&mut self, id: Uuid) {
        let before = self.transactions.len();
        self.transactions.retain(|txn| txn.id != id);
        if self.transactions.len() != before {
            tracing::debug!(id = %id, "transaction deleted");
            self.touch();
        }
    }

    /// Sets the budget limit for an expense category, replacing any
    /// existing limit rather than duplicating it.
    pub fn upsert_budget_limit(
        &mut self,
        category_id: Uuid,
        limit: Decimal,
    ) -> Result<(), LedgerError> {
        if limit <= Decimal::ZERO {
            return Err(LedgerError::validation("Budget limit must be positive"));
        }
        let category = self
            .categories
            .resolve(category_id)
            .ok_or_else(|| LedgerError::validation(format!("Category {} not found", category_id)))?;
        match category.kind {
            CategoryKind::Expense => {}
            CategoryKind::Income => {
                return Err(LedgerError::validation(
                    "Budgets only apply to expense categories",
                ));
            }
        }
        match self
            .budget_limits
            .iter_mut()
            .find(|budget| budget.category_id == category_id)
        {
            Some(existing) => existing.limit = limit,
            None => self.budget_limits.push(BudgetLimit::new(category_id, limit)),
        }
        tracing::debug!(category = %category_id, %limit, "budget limit set");
        self.touch();
        Ok(())
    }

    pub fn budget_limit(&self, category_id: Uuid) -> Option<&BudgetLimit> {
        self.budget_limits
            .iter()
            .find(|budget| budget.category_id == category_id)
    }

    pub fn transaction(&self, id: Uuid) -> Option<&Transaction> {
        self.transactions.iter().find(|txn| txn.id == id)
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    fn validate_entry(
        &self,
        kind: CategoryKind,
        amount: Decimal,
        category_id: Uuid,
    ) -> Result<(), LedgerError> {
        if amount < Decimal::ZERO {
            return Err(LedgerError::validation("Amount cannot be negative"));
        }
        let category = self
            .categories
            .resolve(category_id)
            .ok_or_else(|| LedgerError::validation(format!("Category {} not found", category_id)))?;
        if category.kind != kind {
            return Err(LedgerError::validation(format!(
                "Category `{}` is {:?}, transaction is {:?}",
                category.name, category.kind, kind
            )));
        }
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
