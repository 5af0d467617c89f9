// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Storage abstraction for verification audit records and org
//! configurations (C10).
//!
//! Mirrors the shape of the engine's original [`crate::storage::Storage`]
//! trait (same `no_std`-friendly interface, same volatile in-memory
//! reference implementation), generalized to the types this crate
//! actually persists: an immutable, hash-chained audit log keyed by
//! `audit_id`, and named `GovernanceConfig`s keyed by `config_id`.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::types::{AuditFilter, AuditRecord, GovernanceConfig};

/// Pluggable persistence interface used by the orchestrator.
///
/// Implementations MUST be `Send + Sync` so the orchestrator can be shared
/// across threads when wrapped in `Arc<Mutex<...>>` (or an async-aware
/// equivalent under the `async` feature).
pub trait Store: Send + Sync {
    /// Append an immutable audit record. Implementations should not allow
    /// callers to overwrite an existing `audit_id`.
    fn append_audit(&mut self, record: AuditRecord);

    /// Retrieve a single audit record by id.
    fn get_audit(&self, audit_id: &str) -> Option<AuditRecord>;

    /// Return all audit records matching `filter`.
    fn query_audit(&self, filter: &AuditFilter) -> Vec<AuditRecord>;

    /// Hash of the most recently appended audit record, or an all-zero
    /// genesis hash if the log is empty. Used to chain the next record.
    fn chain_tip(&self) -> String;

    /// Total number of audit records stored.
    fn audit_len(&self) -> usize;

    /// Persist or overwrite a named configuration.
    fn put_config(&mut self, config: GovernanceConfig);

    /// Retrieve a configuration by id.
    fn get_config(&self, config_id: &str) -> Option<GovernanceConfig>;
}

/// Genesis hash used as `prev_hash` for the first record in the chain.
pub const GENESIS_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// A volatile, heap-allocated [`Store`] implementation backed by
/// [`hashbrown::HashMap`] plus an append-only `Vec` preserving insertion
/// order for the audit log.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    audit: Vec<AuditRecord>,
    audit_index: HashMap<String, usize>,
    configs: HashMap<String, GovernanceConfig>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for InMemoryStore {
    fn append_audit(&mut self, record: AuditRecord) {
        self.audit_index.insert(record.audit_id.clone(), self.audit.len());
        self.audit.push(record);
    }

    fn get_audit(&self, audit_id: &str) -> Option<AuditRecord> {
        self.audit_index.get(audit_id).and_then(|&index| self.audit.get(index)).cloned()
    }

    fn query_audit(&self, filter: &AuditFilter) -> Vec<AuditRecord> {
        self.audit
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
        self.audit.last().map(|r| r.hash.clone()).unwrap_or_else(|| String::from(GENESIS_HASH))
    }

    fn audit_len(&self) -> usize {
        self.audit.len()
    }

    fn put_config(&mut self, config: GovernanceConfig) {
        self.configs.insert(config.config_id.clone(), config);
    }

    fn get_config(&self, config_id: &str) -> Option<GovernanceConfig> {
        self.configs.get(config_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DomainType, TrustStatus};

    fn sample_record(audit_id: &str, prev_hash: &str, hash: &str) -> AuditRecord {
        AuditRecord {
            audit_id: audit_id.into(),
            timestamp_ms: 0,
            domain: DomainType::Legal,
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
            hash: hash.into(),
            prev_hash: prev_hash.into(),
        }
    }

    #[test]
    fn empty_store_chain_tip_is_genesis() {
        let store = InMemoryStore::new();
        assert_eq!(store.chain_tip(), GENESIS_HASH);
    }

    #[test]
    fn append_and_lookup_round_trips() {
        let mut store = InMemoryStore::new();
        store.append_audit(sample_record("aud_1", GENESIS_HASH, "hash1"));
        assert_eq!(store.chain_tip(), "hash1");
        let record = store.get_audit("aud_1").unwrap();
        assert_eq!(record.trust_score, 90);
        assert_eq!(store.audit_len(), 1);
    }

    #[test]
    fn query_filters_by_status() {
        let mut store = InMemoryStore::new();
        store.append_audit(sample_record("aud_1", GENESIS_HASH, "hash1"));
        let mut blocked = sample_record("aud_2", "hash1", "hash2");
        blocked.status = TrustStatus::Block;
        store.append_audit(blocked);

        let filter = AuditFilter { status: Some(TrustStatus::Block), ..Default::default() };
        let results = store.query_audit(&filter);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].audit_id, "aud_2");
    }

    #[test]
    fn config_round_trips() {
        let mut store = InMemoryStore::new();
        let config = GovernanceConfig { config_id: "cfg_acme_1".into(), ..Default::default() };
        store.put_config(config.clone());
        assert_eq!(store.get_config("cfg_acme_1").unwrap().config_id, "cfg_acme_1");
        assert!(store.get_config("missing").is_none());
    }
}
