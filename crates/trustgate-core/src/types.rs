// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Shared data types used across all governance sub-systems.
//!
//! All types implement [`Clone`], [`Debug`], [`serde::Serialize`], and
//! [`serde::Deserialize`] so they can be serialised to JSON, stored, and
//! transmitted across process boundaries without additional conversion
//! steps.

use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Domain / checks
// ---------------------------------------------------------------------------

/// The business domain a verification request is scoped to.
///
/// Domain selects which [`ToleranceRule`] table and implicit-preference
/// keyword set apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainType {
    Legal,
    Financial,
    Healthcare,
    Pharma,
    General,
}

impl Default for DomainType {
    fn default() -> Self {
        DomainType::General
    }
}

/// One analyzer that can be enabled on a [`VerifyRequest`].
///
/// Declaration order here is the canonical check-dispatch order used for
/// recommendation ordering and default-weight lookup.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceCheck {
    Entailment = 0,
    SemanticEntropy = 1,
    ImplicitPreference = 2,
    ClaimExtraction = 3,
    NumericalVerify = 4,
}

impl GovernanceCheck {
    pub const ALL: [GovernanceCheck; 5] = [
        GovernanceCheck::Entailment,
        GovernanceCheck::SemanticEntropy,
        GovernanceCheck::ImplicitPreference,
        GovernanceCheck::ClaimExtraction,
        GovernanceCheck::NumericalVerify,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GovernanceCheck::Entailment => "entailment",
            GovernanceCheck::SemanticEntropy => "semantic_entropy",
            GovernanceCheck::ImplicitPreference => "implicit_preference",
            GovernanceCheck::ClaimExtraction => "claim_extraction",
            GovernanceCheck::NumericalVerify => "numerical_verify",
        }
    }

    /// Default fusion weight, renormalized over the set of enabled checks.
    pub fn default_weight(self) -> f64 {
        match self {
            GovernanceCheck::Entailment => 0.40,
            GovernanceCheck::SemanticEntropy => 0.25,
            GovernanceCheck::ImplicitPreference => 0.20,
            GovernanceCheck::ClaimExtraction => 0.15,
            GovernanceCheck::NumericalVerify => 0.15,
        }
    }
}

/// Overall trust status assigned to a [`TrustVerdict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrustStatus {
    Pass,
    Flag,
    Block,
}

// ---------------------------------------------------------------------------
// Verify request / response
// ---------------------------------------------------------------------------

/// A request to score one AI output against its input and (optional) source
/// context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub input: String,
    pub output: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub domain: DomainType,
    pub checks: Vec<GovernanceCheck>,
    #[serde(default)]
    pub config_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Per-claim verification outcome, nested inside [`ClaimCheckResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    Verified,
    Contradicted,
    Unverified,
    Ungrounded,
}

/// A single extracted factual-claim sentence and its verification outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub text: String,
    pub source_sentence: String,
    pub entities: Vec<String>,
    pub status: ClaimStatus,
    /// Entailment confidence in `[0, 1]`; see the C6 verification ladder.
    pub entailment_score: f64,
}

/// The base result shared by every check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub score: f64,
    pub flags: Vec<String>,
    pub detail: String,
}

impl CheckResult {
    pub fn new(name: impl Into<String>, score: f64, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: score.clamp(0.0, 1.0),
            flags: Vec::new(),
            detail: detail.into(),
        }
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.push(flag.into());
        self
    }
}

/// Extended result for the claim-extraction check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimCheckResult {
    pub base: CheckResult,
    pub total: usize,
    pub verified: usize,
    pub unverified: usize,
    pub contradicted: usize,
    pub ungrounded: usize,
    pub claims: Vec<Claim>,
}

/// A single matched (source, AI) number pair from the numerical comparator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberMatch {
    pub source_value: f64,
    pub ai_value: f64,
    pub unit: String,
    pub context_type: String,
    pub relative_deviation: f64,
    pub severity: ToleranceSeverity,
    pub within_tolerance: bool,
}

/// Extended result for the numerical-verification check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumericalCheckResult {
    pub base: CheckResult,
    pub matches: Vec<NumberMatch>,
    pub ungrounded: Vec<ExtractedNumber>,
    pub critical_mismatches: usize,
}

/// The fused, top-level response to a [`VerifyRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrustVerdict {
    pub trust_score: u32,
    pub status: TrustStatus,
    /// Keyed by check name (`"entailment"`, `"semantic_entropy"`, ...) per
    /// the mapping name→CheckResult the data model specifies.
    pub checks: HashMap<String, CheckResult>,
    pub audit_id: String,
    pub session_id: Option<String>,
    pub latency_ms: u64,
    pub recommendations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Numerical extraction (C4)
// ---------------------------------------------------------------------------

/// Classification of the textual neighbourhood a number was extracted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextType {
    MedicationDose,
    LabValue,
    VitalSign,
    AdverseEventCount,
    MonetaryValue,
    Percentage,
    Duration,
    Default,
}

impl Default for ContextType {
    fn default() -> Self {
        ContextType::Default
    }
}

/// A number pulled out of free text along with its normalized unit and the
/// surrounding context used for matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedNumber {
    pub value: f64,
    pub raw: String,
    pub unit: String,
    pub context: String,
    pub context_type: ContextType,
    pub position: usize,
}

/// Severity tier of a [`ToleranceRule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToleranceSeverity {
    Low = 0,
    Medium = 1,
    High = 2,
    Critical = 3,
}

/// Maximum permitted relative deviation for a `(domain, context_type)` pair.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ToleranceRule {
    pub tolerance: f64,
    pub severity: ToleranceSeverity,
}

// ---------------------------------------------------------------------------
// Semantic entropy (C5)
// ---------------------------------------------------------------------------

/// One sampled completion from the generator, at a fixed index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub text: String,
    pub index: usize,
}

/// A bidirectional-entailment equivalence class over sampled completions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    pub id: usize,
    pub size: usize,
    pub representative: String,
    pub member_indices: Vec<usize>,
}

/// Coarse interpretation bucket for normalized semantic entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntropyInterpretation {
    Certain,
    LowUncertainty,
    ModerateUncertainty,
    HighUncertainty,
    ConfabulationLikely,
}

/// Full output of the semantic-entropy engine, beyond the [`CheckResult`]
/// handed to the orchestrator — useful to callers that want the raw
/// clustering detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntropyDetail {
    pub semantic_entropy: f64,
    pub raw_entropy: f64,
    pub num_clusters: usize,
    pub clusters: Vec<Cluster>,
    pub interpretation: EntropyInterpretation,
    pub ai_output_cluster: i64,
    pub ai_output_in_majority: bool,
    pub completions: Vec<Completion>,
    pub inference_time_ms: u64,
}

// ---------------------------------------------------------------------------
// Implicit preference (C7)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentDetail {
    pub score: f64,
    pub label: String,
    pub positive: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionDetail {
    pub score: f64,
    pub party_a: String,
    pub party_b: String,
    pub lean: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterfactualDetail {
    pub score: f64,
    pub note: String,
}

// ---------------------------------------------------------------------------
// Shield (C8)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PatternSeverity {
    Low = 1,
    Medium = 2,
    High = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    None,
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShieldAction {
    Allow,
    Flag,
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldRequest {
    pub input: String,
    #[serde(default)]
    pub domain: DomainType,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: Sensitivity,
}

fn default_sensitivity() -> Sensitivity {
    Sensitivity::Medium
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShieldResponse {
    pub safe: bool,
    pub threat_level: ThreatLevel,
    pub attack_type: Option<String>,
    pub detail: String,
    pub action: ShieldAction,
    pub sanitized_input: Option<String>,
}

// ---------------------------------------------------------------------------
// Audit (C10)
// ---------------------------------------------------------------------------

/// An immutable, hash-chained record of a single verification decision.
///
/// Records are linked via `prev_hash`, exactly as the governance audit log
/// this crate grew out of chains decisions — tamper evidence is additive
/// texture, not a change to verification semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub audit_id: String,
    pub timestamp_ms: u64,
    pub domain: DomainType,
    pub user: Option<String>,
    pub model: Option<String>,
    pub plugin: Option<String>,
    pub trust_score: u32,
    pub status: TrustStatus,
    pub checks_run: Vec<String>,
    pub flags_count: usize,
    /// Every flag tag raised by any check, in check-dispatch order, feeding
    /// the dashboard's top-flag histogram (C11).
    pub flags: Vec<String>,
    pub review_required: bool,
    pub input_summary: String,
    pub output_summary: String,
    pub hash: String,
    pub prev_hash: String,
}

/// Filter used to narrow the results of an audit query.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    pub domain: Option<DomainType>,
    pub status: Option<TrustStatus>,
    pub since_ms: Option<u64>,
    pub until_ms: Option<u64>,
    pub limit: Option<usize>,
}

// ---------------------------------------------------------------------------
// Config (C10)
// ---------------------------------------------------------------------------

/// Per-organization governance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceConfig {
    pub config_id: String,
    pub org_id: String,
    pub domain: DomainType,
    pub approve_threshold: u32,
    pub block_threshold: u32,
    pub required_checks: Vec<GovernanceCheck>,
    pub optional_checks: Vec<GovernanceCheck>,
    pub alerts_enabled: bool,
    /// Opaque per-domain override data (e.g. custom tolerance overrides)
    /// that callers round-trip through config create/read but that this
    /// crate does not itself interpret.
    #[serde(default)]
    pub domain_rules: HashMap<String, serde_json::Value>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            config_id: String::from("default"),
            org_id: String::from("default"),
            domain: DomainType::General,
            approve_threshold: 75,
            block_threshold: 45,
            required_checks: alloc::vec![GovernanceCheck::Entailment],
            optional_checks: alloc::vec![
                GovernanceCheck::SemanticEntropy,
                GovernanceCheck::ImplicitPreference,
                GovernanceCheck::ClaimExtraction,
                GovernanceCheck::NumericalVerify,
            ],
            alerts_enabled: false,
            domain_rules: HashMap::new(),
        }
    }
}

impl GovernanceConfig {
    /// Assign the PASS/FLAG/BLOCK status for a fused `trust_score`.
    pub fn status_for(&self, trust_score: u32) -> TrustStatus {
        if trust_score >= self.approve_threshold {
            TrustStatus::Pass
        } else if trust_score >= self.block_threshold {
            TrustStatus::Flag
        } else {
            TrustStatus::Block
        }
    }
}

// ---------------------------------------------------------------------------
// Metrics (C11)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlagCount {
    pub flag: String,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMetrics {
    pub period: String,
    pub total_verifications: usize,
    pub approved: usize,
    pub flagged: usize,
    pub blocked: usize,
    pub injection_blocks: usize,
    pub average_trust_score: f64,
    pub compliance_score: f64,
    pub top_flags: Vec<FlagCount>,
    pub trend: Trend,
}

/// Collect audit records into a [`Vec`] for return from query operations.
pub type AuditPage = Vec<AuditRecord>;
