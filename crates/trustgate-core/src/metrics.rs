// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Dashboard metrics (C11): aggregate trust scores, flag frequency, and
//! compliance trend computed directly from the audit log.
//!
//! Unlike the demo this crate is modeled on, no synthetic baseline or
//! random jitter is injected here -- with a real [`Store`] behind the
//! orchestrator, the audit log itself is the source of truth and an empty
//! log simply produces zeroed metrics.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

use crate::store::Store;
use crate::types::{AuditFilter, DashboardMetrics, FlagCount, Trend, TrustStatus};

/// Compute dashboard metrics over every audit record with `timestamp_ms >=
/// since_ms`, labeling the report with `period_label`.
pub fn compute_metrics(store: &dyn Store, since_ms: u64, period_label: impl Into<String>) -> DashboardMetrics {
    let filter = AuditFilter { since_ms: Some(since_ms), ..Default::default() };
    let records = store.query_audit(&filter);

    let total = records.len();
    let approved = records.iter().filter(|r| r.status == TrustStatus::Pass).count();
    let flagged = records.iter().filter(|r| r.status == TrustStatus::Flag).count();
    let blocked = records.iter().filter(|r| r.status == TrustStatus::Block).count();

    let average_trust_score = if total > 0 {
        records.iter().map(|r| r.trust_score as f64).sum::<f64>() / total as f64
    } else {
        0.0
    };

    let compliance_score = if total > 0 { approved as f64 / total as f64 * 100.0 } else { 100.0 };

    let injection_blocks = records
        .iter()
        .filter(|r| r.checks_run.iter().any(|c| c == "shield") && r.status == TrustStatus::Block)
        .count();

    let mut flag_counts: HashMap<String, usize> = HashMap::new();
    for record in &records {
        for flag in &record.flags {
            *flag_counts.entry(flag.clone()).or_insert(0) += 1;
        }
    }
    let mut top_flags: Vec<FlagCount> = flag_counts.into_iter().map(|(flag, count)| FlagCount { flag, count }).collect();
    top_flags.sort_by(|a, b| b.count.cmp(&a.count));
    top_flags.truncate(6);

    let trend = if average_trust_score > 83.0 {
        Trend::Improving
    } else if average_trust_score < 78.0 {
        Trend::Declining
    } else {
        Trend::Stable
    };

    DashboardMetrics {
        period: period_label.into(),
        total_verifications: total,
        approved,
        flagged,
        blocked,
        injection_blocks,
        average_trust_score,
        compliance_score,
        top_flags,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::types::{AuditRecord, DomainType};

    fn record(audit_id: &str, status: TrustStatus, trust_score: u32) -> AuditRecord {
        AuditRecord {
            audit_id: audit_id.into(),
            timestamp_ms: 100,
            domain: DomainType::General,
            user: None,
            model: None,
            plugin: None,
            trust_score,
            status,
            checks_run: alloc::vec![String::from("entailment")],
            flags_count: if matches!(status, TrustStatus::Pass) { 0 } else { 1 },
            flags: if matches!(status, TrustStatus::Pass) { alloc::vec![] } else { alloc::vec![String::from("contradicted_claims")] },
            review_required: matches!(status, TrustStatus::Flag),
            input_summary: String::new(),
            output_summary: String::new(),
            hash: String::from("h"),
            prev_hash: String::from("p"),
        }
    }

    #[test]
    fn empty_log_yields_full_compliance() {
        let store = InMemoryStore::new();
        let metrics = compute_metrics(&store, 0, "test period");
        assert_eq!(metrics.total_verifications, 0);
        assert_eq!(metrics.compliance_score, 100.0);
    }

    #[test]
    fn mixed_log_computes_real_aggregates() {
        let mut store = InMemoryStore::new();
        store.append_audit(record("a1", TrustStatus::Pass, 90));
        store.append_audit(record("a2", TrustStatus::Flag, 60));
        store.append_audit(record("a3", TrustStatus::Block, 20));

        let metrics = compute_metrics(&store, 0, "test period");
        assert_eq!(metrics.total_verifications, 3);
        assert_eq!(metrics.approved, 1);
        assert_eq!(metrics.flagged, 1);
        assert_eq!(metrics.blocked, 1);
        assert!((metrics.average_trust_score - 56.666666666666664).abs() < 1e-6);
    }
}
