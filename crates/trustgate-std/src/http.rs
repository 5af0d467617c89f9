// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! HTTP-backed [`NliPredictor`] and [`CompletionGenerator`] implementations.
//!
//! [`HttpNli`] mirrors the DeBERTa entailment microservice call used by the
//! semantic-entropy and entailment checks: a POST of `{premise,
//! hypothesis}` returning `{entailment, contradiction, neutral}` floats.
//! [`HttpGenerator`] hits a sibling completion-sampling endpoint returning
//! `{completions: [String; n]}`.
//!
//! Both degrade to [`NliError::Unreachable`] on transport failure or
//! non-2xx responses; the orchestrator's checks treat that the same as any
//! other upstream failure and fall back to a neutral result rather than
//! aborting (see `trustgate_core::traits`'s `upstream_unavailable` path).

#![cfg(feature = "http-clients")]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use trustgate_core::traits::{CompletionGenerator, NliError, NliLabel, NliPredictor, NliScore};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Serialize)]
struct EntailmentRequest<'a> {
    premise: &'a str,
    hypothesis: &'a str,
}

#[derive(Deserialize)]
struct EntailmentResponse {
    entailment: f64,
    contradiction: f64,
    neutral: f64,
}

/// Calls a remote entailment microservice over HTTP.
pub struct HttpNli {
    client: Client,
    endpoint: String,
}

impl HttpNli {
    /// `endpoint` is the full URL of the entailment service (e.g.
    /// `https://nli.internal/v1/entailment`).
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder().timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).build().expect("failed to build HTTP client");
        Self { client, endpoint: endpoint.into() }
    }
}

#[async_trait]
impl NliPredictor for HttpNli {
    async fn predict(&self, premise: &str, hypothesis: &str) -> Result<NliScore, NliError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&EntailmentRequest { premise, hypothesis })
            .send()
            .await
            .map_err(|error| NliError::Unreachable(error.to_string()))?;

        if !response.status().is_success() {
            return Err(NliError::Unreachable(format!("entailment service returned {}", response.status())));
        }

        let body: EntailmentResponse = response.json().await.map_err(|error| NliError::MalformedResponse(error.to_string()))?;

        let label = if body.entailment >= body.contradiction && body.entailment >= body.neutral {
            NliLabel::Entailment
        } else if body.contradiction >= body.neutral {
            NliLabel::Contradiction
        } else {
            NliLabel::Neutral
        };

        Ok(NliScore { entailment: body.entailment, contradiction: body.contradiction, neutral: body.neutral, label })
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    prompt: &'a str,
    temperature: f64,
    n: usize,
}

#[derive(Deserialize)]
struct GenerateResponse {
    completions: Vec<String>,
}

/// Calls a remote completion-sampling endpoint over HTTP.
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
}

impl HttpGenerator {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = Client::builder().timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS)).build().expect("failed to build HTTP client");
        Self { client, endpoint: endpoint.into() }
    }
}

#[async_trait]
impl CompletionGenerator for HttpGenerator {
    async fn generate(&self, prompt: &str, temperature: f64, n: usize) -> Result<Vec<String>, NliError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { prompt, temperature, n })
            .send()
            .await
            .map_err(|error| NliError::Unreachable(error.to_string()))?;

        if !response.status().is_success() {
            return Err(NliError::Unreachable(format!("generation service returned {}", response.status())));
        }

        let body: GenerateResponse = response.json().await.map_err(|error| NliError::MalformedResponse(error.to_string()))?;
        Ok(body.completions)
    }
}
