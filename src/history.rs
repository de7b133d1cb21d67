use std::path::{Path, PathBuf};

use crate::models::BorrowerRecord;
use crate::normalize::digits;

/// Most-recent-first cap on stored searches.
const MAX_HISTORY: usize = 20;
const HISTORY_FILE: &str = "borrower_history.json";

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("autodebit-console")
}

/// Default on-disk location for the history file.
pub fn default_history_path() -> PathBuf {
    config_dir().join(HISTORY_FILE)
}

/// Borrower search history, most recent first. Entries are unique by
/// digits-only account number OR digits-only SSN: adding a record evicts any
/// prior entry sharing either key. A missing or corrupt file is treated as
/// empty history; write failures are logged and ignored.
pub struct SearchHistory {
    entries: Vec<BorrowerRecord>,
    path: PathBuf,
}

impl SearchHistory {
    /// Load history from `path`, tolerating absent or unparseable content.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str::<Vec<BorrowerRecord>>(&content).ok())
            .unwrap_or_default();
        Self { entries, path }
    }

    pub fn load_default() -> Self {
        Self::load(default_history_path())
    }

    pub fn entries(&self) -> &[BorrowerRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a record to the front, evicting any prior entry that shares its
    /// account-number or SSN key, then persist.
    pub fn add(&mut self, record: BorrowerRecord) {
        let account_key = digits(&record.account_number);
        let ssn_key = digits(&record.ssn);

        self.entries.retain(|existing| {
            let a = digits(&existing.account_number);
            let s = digits(&existing.ssn);
            let same_account = !a.is_empty() && !account_key.is_empty() && a == account_key;
            let same_ssn = !s.is_empty() && !ssn_key.is_empty() && s == ssn_key;
            !same_account && !same_ssn
        });

        self.entries.insert(0, record);
        self.entries.truncate(MAX_HISTORY);
        self.persist();
    }

    /// Drop all entries and remove the backing file.
    pub fn clear(&mut self) {
        self.entries.clear();
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(error = %e, "failed to remove history file");
            }
        }
    }

    fn persist(&self) {
        if let Some(dir) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!(error = %e, "failed to create history dir");
                return;
            }
        }
        match serde_json::to_string_pretty(&self.entries) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, format!("{json}\n")) {
                    tracing::warn!(error = %e, "failed to write history file");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize history"),
        }
    }
}
