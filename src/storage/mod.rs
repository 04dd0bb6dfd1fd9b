pub mod json_backend;

use std::path::Path;

use crate::{errors::LedgerError, ledger::Ledger};

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Abstraction over persistence backends storing the whole ledger
/// blob. A save failure is returned to the host, which keeps operating
/// on its in-memory snapshot.
pub trait StorageBackend: Send + Sync {
    /// Persists the full snapshot, replacing the previous blob.
    fn save(&self, ledger: &Ledger) -> Result<()>;
    /// Loads the stored snapshot; `None` means empty state (first run).
    fn load(&self) -> Result<Option<Ledger>>;

    /// Optional helpers for ad-hoc file operations. Default
    /// implementations forward to plain JSON files.
    fn save_to_path(&self, ledger: &Ledger, path: &Path) -> Result<()> {
        json_backend::save_ledger_to_path(ledger, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Ledger> {
        json_backend::load_ledger_from_path(path)
    }
}

pub use json_backend::JsonStorage;
