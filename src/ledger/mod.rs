//! Ledger domain models, persistence-friendly types, and helpers.

pub mod budget;
pub mod category;
pub mod ids;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod transaction;

pub use budget::BudgetLimit;
pub use category::{Category, CategoryKind, CategoryRegistry};
pub use ids::{IdSource, SequentialIdSource, UuidSource};
pub use ledger::Ledger;
pub use transaction::{Transaction, TransactionDraft};
