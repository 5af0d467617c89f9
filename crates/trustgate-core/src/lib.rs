// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # trustgate-core
//!
//! Core trust-scoring types and analyzers for an AI output governance
//! gateway.
//!
//! This crate is `no_std`-compatible (requires `alloc`) at its data-model
//! layer. Enable the `std` feature (on by default) to pull in the
//! regex/NLI-backed analyzers; enable `async` for the orchestrator, which
//! needs Tokio to run checks concurrently against the model backends.
//!
//! ## Architecture
//!
//! ```text
//! Orchestrator<S: Store>
//!   ├── entailment::check_entailment        — C1: source-grounded fact check
//!   ├── entropy::compute_entropy             — C5: semantic-entropy uncertainty
//!   ├── preference::{sentiment,direction,..}  — C7: implicit bias detection
//!   ├── claims::check_claims                  — C6: per-claim hallucination check
//!   ├── numerical::compare_numbers            — C4: numeric grounding
//!   └── shield::scan                          — C8: prompt-injection pre-filter
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! # #[cfg(feature = "async")]
//! # async fn run() {
//! use std::sync::Arc;
//! use trustgate_core::{
//!     orchestrator::Orchestrator,
//!     store::InMemoryStore,
//!     traits::{HeuristicGenerator, HeuristicNli},
//!     types::{DomainType, GovernanceCheck, GovernanceConfig, VerifyRequest},
//! };
//!
//! let orchestrator = Orchestrator::new(
//!     InMemoryStore::new(),
//!     Arc::new(HeuristicNli),
//!     Arc::new(HeuristicGenerator),
//!     GovernanceConfig::default(),
//! );
//!
//! let request = VerifyRequest {
//!     input: "What is the lease term?".into(),
//!     output: "The lease runs for 12 months.".into(),
//!     context: Some("Section 2: The lease Term is 12 months.".into()),
//!     domain: DomainType::Legal,
//!     checks: vec![GovernanceCheck::Entailment],
//!     config_id: None,
//!     session_id: None,
//! };
//! let verdict = orchestrator.verify(request, 0).await;
//! assert!(verdict.trust_score <= 100);
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod types;
pub mod union_find;

#[cfg(feature = "std")]
pub mod traits;

#[cfg(feature = "std")]
pub mod numerical;

#[cfg(feature = "std")]
pub mod clinical;

#[cfg(feature = "std")]
pub mod claims;

#[cfg(feature = "std")]
pub mod preference;

#[cfg(feature = "std")]
pub mod shield;

#[cfg(feature = "std")]
pub mod entailment;

#[cfg(feature = "async")]
pub mod entropy;

pub mod metrics;
pub mod store;

// Orchestrator -- only compiled when the "async" feature is enabled.
// Requires the "std" feature (Tokio cannot run in no_std environments).
#[cfg(feature = "async")]
pub mod orchestrator;

// Config loader -- TOML file and environment variable loading.
// Only compiled when the "config-loader" feature is enabled.
#[cfg(feature = "config-loader")]
pub mod config_loader;

// Re-export the most commonly used items at the crate root so consumers can
// write `use trustgate_core::GovernanceConfig;` instead of the fully
// qualified path.
pub use store::{InMemoryStore, Store};
pub use types::{
    AuditFilter, AuditRecord, CheckResult, DomainType, GovernanceCheck, GovernanceConfig, TrustStatus, TrustVerdict,
    VerifyRequest,
};

#[cfg(feature = "async")]
pub use orchestrator::Orchestrator;

// Re-export config loader types at the crate root.
#[cfg(feature = "config-loader")]
pub use config_loader::{load_config, load_config_from_env, ConfigError};
