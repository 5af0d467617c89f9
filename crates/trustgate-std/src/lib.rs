// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! # trustgate-std
//!
//! `std`-only storage and model-client backends for `trustgate-core`.
//!
//! This crate provides [`FileStore`], a JSON file-backed implementation of
//! the [`Store`] trait suitable for CLI tools and single-process server
//! deployments that do not need a full database, plus (behind the
//! `http-clients` feature) [`HttpNli`]/[`HttpGenerator`], thin HTTP clients
//! for a remote entailment/generation backend.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trustgate_std::store::FileStore;
//!
//! let store = FileStore::open("/var/lib/trustgate/audit.json")
//!     .expect("failed to open store file");
//! ```

pub mod store;

#[cfg(feature = "http-clients")]
pub mod http;

pub use store::FileStore;

#[cfg(feature = "http-clients")]
pub use http::{HttpGenerator, HttpNli};
