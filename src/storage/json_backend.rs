use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use chrono::{NaiveDateTime, Utc};

use crate::{config::Config, errors::LedgerError, ledger::Ledger};

use super::{Result, StorageBackend};

const DATA_FILE: &str = "ledger.json";
const BACKUP_EXTENSION: &str = "json";
const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const TMP_SUFFIX: &str = "tmp";
const DEFAULT_RETENTION: usize = 5;

/// File-backed storage: one pretty-printed JSON blob for the whole
/// ledger, written atomically, with rotating timestamped backups of
/// the previous blob.
#[derive(Debug, Clone)]
pub struct JsonStorage {
    data_file: PathBuf,
    backups_dir: PathBuf,
    retention: usize,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>, retention: Option<usize>) -> Result<Self> {
        let root = root.unwrap_or_else(default_root);
        ensure_dir(&root)?;
        let backups_dir = root.join("backups");
        ensure_dir(&backups_dir)?;
        Ok(Self {
            data_file: root.join(DATA_FILE),
            backups_dir,
            retention: retention.unwrap_or(DEFAULT_RETENTION).max(1),
        })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None, None)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.data_dir.clone(), None)
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Backup file names, newest first.
    pub fn list_backups(&self) -> Result<Vec<String>> {
        if !self.backups_dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.backups_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(BACKUP_EXTENSION) {
                continue;
            }
            let file_name = match path.file_name().and_then(|name| name.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            entries.push(file_name);
        }
        entries.sort_by(|a, b| parse_backup_timestamp(b).cmp(&parse_backup_timestamp(a)));
        Ok(entries)
    }

    fn backup_existing_file(&self) -> Result<()> {
        if !self.data_file.exists() {
            return Ok(());
        }
        ensure_dir(&self.backups_dir)?;
        let timestamp = Utc::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_name = format!("ledger_{}.{}", timestamp, BACKUP_EXTENSION);
        fs::copy(&self.data_file, self.backups_dir.join(backup_name))?;
        self.prune_backups()?;
        Ok(())
    }

    fn prune_backups(&self) -> Result<()> {
        let backups = self.list_backups()?;
        if backups.len() <= self.retention {
            return Ok(());
        }
        for entry in backups.iter().skip(self.retention) {
            let _ = fs::remove_file(self.backups_dir.join(entry));
        }
        Ok(())
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, ledger: &Ledger) -> Result<()> {
        if let Some(parent) = self.data_file.parent() {
            ensure_dir(parent)?;
        }
        self.backup_existing_file()?;
        save_ledger_to_path(ledger, &self.data_file)?;
        tracing::debug!(path = %self.data_file.display(), "ledger saved");
        Ok(())
    }

    fn load(&self) -> Result<Option<Ledger>> {
        if !self.data_file.exists() {
            return Ok(None);
        }
        load_ledger_from_path(&self.data_file).map(Some)
    }
}

/// Writes the ledger to disk atomically by staging to a temporary
/// file.
pub fn save_ledger_to_path(ledger: &Ledger, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(ledger)?;
    write_atomic(path, &json)
}

/// Loads a ledger snapshot from disk, returning structured errors on
/// failure.
pub fn load_ledger_from_path(path: &Path) -> Result<Ledger> {
    if !path.exists() {
        return Err(LedgerError::not_found(format!(
            "ledger file `{}`",
            path.display()
        )));
    }
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn default_root() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fintrack")
}

fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension(TMP_SUFFIX)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = tmp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn parse_backup_timestamp(file_name: &str) -> Option<NaiveDateTime> {
    let stem = file_name.strip_suffix(&format!(".{}", BACKUP_EXTENSION))?;
    let timestamp = stem.strip_prefix("ledger_")?;
    NaiveDateTime::parse_from_str(timestamp, BACKUP_TIMESTAMP_FORMAT).ok()
}
