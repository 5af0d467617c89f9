// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! File-based JSON storage backend.
//!
//! [`FileStore`] persists the audit log and named configs to a single JSON
//! file on disk. Every mutation flushes the file atomically (write-rename)
//! so a crash mid-write never corrupts existing data.
//!
//! ## Layout
//!
//! ```json
//! {
//!   "audit":   [ AuditRecord, ... ],
//!   "configs": { "<config_id>": GovernanceConfig, ... }
//! }
//! ```
//!
//! ## Caveats
//!
//! * [`FileStore`] holds the full in-memory state and flushes on every
//!   mutation. It is not intended for high-frequency write workloads.
//! * Concurrent access from multiple processes is not supported.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trustgate_core::store::{Store, GENESIS_HASH};
use trustgate_core::types::{AuditFilter, AuditRecord, GovernanceConfig};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreSnapshot {
    audit: Vec<AuditRecord>,
    configs: HashMap<String, GovernanceConfig>,
}

/// A file-backed [`Store`] implementation that persists state as JSON.
///
/// # Examples
///
/// ```rust,no_run
/// use trustgate_std::store::file::FileStore;
/// use trustgate_core::store::Store;
///
/// let store = FileStore::open("/tmp/trustgate.json").expect("could not open store");
/// assert_eq!(store.audit_len(), 0);
/// ```
pub struct FileStore {
    path: PathBuf,
    data: StoreSnapshot,
}

impl FileStore {
    /// Open an existing JSON store file, or create a new empty one if the
    /// path does not exist.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if the file exists but cannot be read or if
    /// the JSON is malformed.
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)
                .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, format!("trustgate store JSON parse error: {error}")))?
        } else {
            StoreSnapshot::default()
        };

        Ok(Self { path, data })
    }

    /// Flush the current in-memory state to disk using an atomic
    /// write-rename: the file is written to `<path>.tmp` first, then
    /// renamed over the target.
    ///
    /// # Errors
    ///
    /// Returns an [`io::Error`] if serialization fails or the file cannot be
    /// written or renamed.
    pub fn flush(&self) -> io::Result<()> {
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, format!("trustgate store serialization error: {error}")))?;

        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, json)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl Store for FileStore {
    fn append_audit(&mut self, record: AuditRecord) {
        self.data.audit.push(record);
        // Errors are silently ignored here; callers that need guaranteed
        // durability should call flush() explicitly and handle the Result.
        let _ = self.flush();
    }

    fn get_audit(&self, audit_id: &str) -> Option<AuditRecord> {
        self.data.audit.iter().find(|r| r.audit_id == audit_id).cloned()
    }

    fn query_audit(&self, filter: &AuditFilter) -> Vec<AuditRecord> {
        self.data
            .audit
            .iter()
            .filter(|record| {
                if let Some(domain) = filter.domain {
                    if record.domain != domain {
                        return false;
                    }
                }
                if let Some(status) = filter.status {
                    if record.status != status {
                        return false;
                    }
                }
                if let Some(since_ms) = filter.since_ms {
                    if record.timestamp_ms < since_ms {
                        return false;
                    }
                }
                if let Some(until_ms) = filter.until_ms {
                    if record.timestamp_ms > until_ms {
                        return false;
                    }
                }
                true
            })
            .take(filter.limit.unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }

    fn chain_tip(&self) -> String {
        self.data.audit.last().map(|r| r.hash.clone()).unwrap_or_else(|| GENESIS_HASH.to_string())
    }

    fn audit_len(&self) -> usize {
        self.data.audit.len()
    }

    fn put_config(&mut self, config: GovernanceConfig) {
        self.data.configs.insert(config.config_id.clone(), config);
        let _ = self.flush();
    }

    fn get_config(&self, config_id: &str) -> Option<GovernanceConfig> {
        self.data.configs.get(config_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trustgate_core::types::{DomainType, TrustStatus};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("trustgate-test-{name}-{}.json", std::process::id()))
    }

    fn sample_record(audit_id: &str) -> AuditRecord {
        AuditRecord {
            audit_id: audit_id.into(),
            timestamp_ms: 0,
            domain: DomainType::General,
            user: None,
            model: None,
            plugin: None,
            trust_score: 90,
            status: TrustStatus::Pass,
            checks_run: Vec::new(),
            flags_count: 0,
            flags: Vec::new(),
            review_required: false,
            input_summary: String::new(),
            output_summary: String::new(),
            hash: "hash1".into(),
            prev_hash: GENESIS_HASH.to_string(),
        }
    }

    #[test]
    fn round_trips_through_disk() {
        let path = temp_path("roundtrip");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.append_audit(sample_record("aud_1"));
        }
        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.audit_len(), 1);
        assert_eq!(reopened.get_audit("aud_1").unwrap().trust_score, 90);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn missing_file_starts_empty() {
        let path = temp_path("missing");
        std::fs::remove_file(&path).ok();
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.chain_tip(), GENESIS_HASH);
        std::fs::remove_file(&path).ok();
    }
}
