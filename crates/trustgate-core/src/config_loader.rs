// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Configuration loader for [`GovernanceConfig`].
//!
//! Supports two load strategies:
//!
//! 1. **TOML file** — [`load_config`] reads and deserialises a TOML file
//!    into a [`GovernanceConfig`].
//! 2. **Environment variables** — [`load_config_from_env`] reads
//!    `TRUSTGATE_`-prefixed environment variables and constructs a
//!    [`GovernanceConfig`], falling back to [`GovernanceConfig::default`]
//!    for anything unset.
//!
//! Both loaders are only available when the `config-loader` feature is
//! active (it implies `std`).
//!
//! # File format
//!
//! ```toml
//! config_id         = "cfg_acme_1"
//! org_id            = "acme"
//! domain            = "legal"
//! approve_threshold = 85
//! block_threshold   = 40
//! required_checks   = ["entailment"]
//! optional_checks   = ["semantic_entropy", "claim_extraction"]
//! alerts_enabled    = true
//! ```
//!
//! # Environment variables
//!
//! | Variable                        | Type    | Default   |
//! |----------------------------------|---------|-----------|
//! | `TRUSTGATE_APPROVE_THRESHOLD`    | integer | 75        |
//! | `TRUSTGATE_BLOCK_THRESHOLD`      | integer | 45        |
//! | `TRUSTGATE_DOMAIN`               | string  | "general" |
//! | `TRUSTGATE_ALERTS_ENABLED`       | boolean | false     |

#![cfg(feature = "config-loader")]

use std::fs;
use std::num::ParseIntError;

use crate::types::{DomainType, GovernanceConfig};

/// Errors that can occur while loading or parsing governance configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required file could not be opened.
    #[error("failed to read config file \"{path}\": {source}")]
    FileRead { path: String, source: std::io::Error },
    /// The TOML content could not be deserialised.
    #[error("failed to parse TOML config: {source}")]
    TomlParse { source: toml::de::Error },
    /// A field could not be parsed to its expected type.
    #[error("field \"{field}\": cannot parse \"{value}\" — {reason}")]
    ParseField { field: String, value: String, reason: String },
    /// A field value is outside the permitted range.
    #[error("field \"{field}\": value \"{value}\" out of range — {reason}")]
    InvalidRange { field: String, value: String, reason: String },
}

/// Load a [`GovernanceConfig`] from a TOML file.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or if the TOML
/// content does not match the expected schema.
pub fn load_config(path: &str) -> Result<GovernanceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::FileRead { path: path.to_owned(), source })?;
    toml::from_str::<GovernanceConfig>(&content).map_err(|source| ConfigError::TomlParse { source })
}

/// Load a [`GovernanceConfig`] from `TRUSTGATE_`-prefixed environment
/// variables, falling back to [`GovernanceConfig::default`] fields for
/// anything unset.
///
/// # Errors
///
/// Returns a [`ConfigError::ParseField`] if any variable is set to a value
/// that cannot be parsed, or a [`ConfigError::InvalidRange`] for
/// thresholds outside `0..=100`.
pub fn load_config_from_env() -> Result<GovernanceConfig, ConfigError> {
    let defaults = GovernanceConfig::default();

    let approve_threshold = read_env_u32("TRUSTGATE_APPROVE_THRESHOLD", defaults.approve_threshold)?;
    if approve_threshold > 100 {
        return Err(ConfigError::InvalidRange {
            field: "TRUSTGATE_APPROVE_THRESHOLD".into(),
            value: approve_threshold.to_string(),
            reason: "must be in range 0-100".into(),
        });
    }

    let block_threshold = read_env_u32("TRUSTGATE_BLOCK_THRESHOLD", defaults.block_threshold)?;
    if block_threshold > approve_threshold {
        return Err(ConfigError::InvalidRange {
            field: "TRUSTGATE_BLOCK_THRESHOLD".into(),
            value: block_threshold.to_string(),
            reason: "must not exceed the approve threshold".into(),
        });
    }

    let domain = match std::env::var("TRUSTGATE_DOMAIN") {
        Ok(val) => domain_from_str(&val)?,
        Err(_) => defaults.domain,
    };

    let alerts_enabled = read_env_bool("TRUSTGATE_ALERTS_ENABLED", defaults.alerts_enabled)?;

    Ok(GovernanceConfig { config_id: defaults.config_id, org_id: defaults.org_id, domain, approve_threshold, block_threshold, alerts_enabled, ..defaults })
}

fn domain_from_str(s: &str) -> Result<DomainType, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "general" => Ok(DomainType::General),
        "legal" => Ok(DomainType::Legal),
        "financial" => Ok(DomainType::Financial),
        "healthcare" => Ok(DomainType::Healthcare),
        "pharma" => Ok(DomainType::Pharma),
        other => Err(ConfigError::ParseField {
            field: "TRUSTGATE_DOMAIN".into(),
            value: other.into(),
            reason: "expected one of: general, legal, financial, healthcare, pharma".into(),
        }),
    }
}

fn read_env_u32(key: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(key) {
        Ok(val) => val.trim().parse::<u32>().map_err(|source: ParseIntError| ConfigError::ParseField { field: key.to_owned(), value: val, reason: source.to_string() }),
        Err(_) => Ok(default),
    }
}

fn read_env_bool(key: &str, default: bool) -> Result<bool, ConfigError> {
    match std::env::var(key) {
        Ok(val) => match val.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" => Ok(false),
            other => Err(ConfigError::ParseField { field: key.to_owned(), value: other.to_owned(), reason: "expected one of: true/false, 1/0, yes/no, on/off".into() }),
        },
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_defaults_match_governance_config_default() {
        std::env::remove_var("TRUSTGATE_APPROVE_THRESHOLD");
        std::env::remove_var("TRUSTGATE_BLOCK_THRESHOLD");
        std::env::remove_var("TRUSTGATE_DOMAIN");
        std::env::remove_var("TRUSTGATE_ALERTS_ENABLED");
        let config = load_config_from_env().unwrap();
        assert_eq!(config.approve_threshold, GovernanceConfig::default().approve_threshold);
    }

    #[test]
    fn block_threshold_above_approve_is_rejected() {
        std::env::set_var("TRUSTGATE_APPROVE_THRESHOLD", "50");
        std::env::set_var("TRUSTGATE_BLOCK_THRESHOLD", "90");
        let result = load_config_from_env();
        assert!(result.is_err());
        std::env::remove_var("TRUSTGATE_APPROVE_THRESHOLD");
        std::env::remove_var("TRUSTGATE_BLOCK_THRESHOLD");
    }

    #[test]
    fn unknown_domain_is_rejected() {
        std::env::set_var("TRUSTGATE_DOMAIN", "astrology");
        let result = load_config_from_env();
        assert!(result.is_err());
        std::env::remove_var("TRUSTGATE_DOMAIN");
    }
}
