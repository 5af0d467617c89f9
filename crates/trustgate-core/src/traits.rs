// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Black-box model contracts (C1/C2) and their heuristic fallback
//! implementations.
//!
//! [`NliPredictor`] and [`CompletionGenerator`] are the only two places the
//! scoring core talks to a real model. Both are plain `async_trait` object
//! traits so the orchestrator can hold `Arc<dyn NliPredictor>` /
//! `Arc<dyn CompletionGenerator>` without knowing whether the concrete
//! implementation is a loopback heuristic or an HTTP client (see
//! `trustgate-std::http` for the latter).
//!
//! The heuristic implementations here back the `upstream_unavailable`
//! fallback path (§7): they are deliberately cheap keyword/regex
//! approximations and are not equivalent to a trained model.

#![cfg(feature = "std")]

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

/// Dominant label returned by an NLI call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NliLabel {
    Entailment,
    Contradiction,
    Neutral,
}

/// Result of one `(premise, hypothesis)` NLI call.
#[derive(Debug, Clone, Copy)]
pub struct NliScore {
    pub entailment: f64,
    pub contradiction: f64,
    pub neutral: f64,
    pub label: NliLabel,
}

impl NliScore {
    pub fn is_entailment(&self) -> bool {
        self.label == NliLabel::Entailment && self.entailment > 0.5
    }

    pub fn is_contradiction(&self) -> bool {
        self.label == NliLabel::Contradiction
    }
}

/// Natural-language-inference backend contract.
#[async_trait]
pub trait NliPredictor: Send + Sync {
    async fn predict(&self, premise: &str, hypothesis: &str) -> Result<NliScore, NliError>;
}

/// Completion-sampling backend contract.
#[async_trait]
pub trait CompletionGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        temperature: f64,
        n: usize,
    ) -> Result<Vec<String>, NliError>;
}

/// Error surfaced by a failed upstream call; always degrades to a fallback
/// result rather than aborting the owning check (§7).
#[derive(Debug, thiserror::Error)]
pub enum NliError {
    #[error("upstream unreachable: {0}")]
    Unreachable(String),
    #[error("upstream returned malformed response: {0}")]
    MalformedResponse(String),
}

/// Bidirectional-entailment test: both `(a, b)` and `(b, a)` must be
/// ENTAIL with `entailment > 0.5`.
pub async fn bidirectional_entails(
    nli: &dyn NliPredictor,
    a: &str,
    b: &str,
) -> bool {
    let forward = nli.predict(a, b).await.ok();
    let backward = nli.predict(b, a).await.ok();
    matches!(forward, Some(ref f) if f.is_entailment())
        && matches!(backward, Some(ref b) if b.is_entailment())
}

// ---------------------------------------------------------------------------
// Heuristic fallback
// ---------------------------------------------------------------------------

static NEGATION_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(not|no|never|isn't|wasn't|doesn't|didn't|won't|cannot|can't)\b").unwrap()
});

fn normalized_tokens(text: &str) -> Vec<String> {
    text.to_ascii_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_string())
        .collect()
}

fn token_overlap_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: std::collections::HashSet<String> = normalized_tokens(a).into_iter().collect();
    let tokens_b: std::collections::HashSet<String> = normalized_tokens(b).into_iter().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }
    let intersection = tokens_a.intersection(&tokens_b).count() as f64;
    intersection / tokens_a.len().max(tokens_b.len()) as f64
}

/// Keyword/token-overlap stand-in for a trained NLI model, used when no
/// `NLI_URL` is configured or the configured service is unreachable.
///
/// High token overlap with no negation mismatch is treated as entailment;
/// high overlap with a negation-word mismatch between the two texts is
/// treated as contradiction; everything else is neutral. This is a coarse
/// approximation and is documented as such, not a substitute for the ML
/// path.
pub struct HeuristicNli;

#[async_trait]
impl NliPredictor for HeuristicNli {
    async fn predict(&self, premise: &str, hypothesis: &str) -> Result<NliScore, NliError> {
        let overlap = token_overlap_ratio(premise, hypothesis);
        let negated_premise = NEGATION_WORDS.is_match(premise);
        let negated_hypothesis = NEGATION_WORDS.is_match(hypothesis);

        let (label, entailment, contradiction, neutral) =
            if overlap > 0.6 && negated_premise == negated_hypothesis {
                (NliLabel::Entailment, 0.5 + overlap * 0.4, 0.05, 1.0 - (0.55 + overlap * 0.4))
            } else if overlap > 0.4 && negated_premise != negated_hypothesis {
                (NliLabel::Contradiction, 0.1, 0.5 + overlap * 0.3, 1.0 - (0.6 + overlap * 0.3))
            } else {
                (NliLabel::Neutral, overlap * 0.3, overlap * 0.2, 1.0 - overlap * 0.5)
            };

        Ok(NliScore { entailment, contradiction, neutral, label })
    }
}

/// Heuristic generator that paraphrases the prompt deterministically `n`
/// times, used for semantic-entropy fallback dry-runs and tests. Never
/// invoked in the success path when a real generator is configured.
pub struct HeuristicGenerator;

#[async_trait]
impl CompletionGenerator for HeuristicGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _temperature: f64,
        n: usize,
    ) -> Result<Vec<String>, NliError> {
        Ok((0..n).map(|i| format!("{prompt} (variant {i})")).collect())
    }
}

/// Convenience alias for the trait-object pair the orchestrator holds.
pub type SharedNli = Arc<dyn NliPredictor>;
pub type SharedGenerator = Arc<dyn CompletionGenerator>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_text_entails_itself() {
        let nli = HeuristicNli;
        let score = nli.predict("The sky is blue.", "The sky is blue.").await.unwrap();
        assert!(score.is_entailment());
    }

    #[tokio::test]
    async fn negated_text_is_not_bidirectionally_entailed() {
        let nli = HeuristicNli;
        let entails =
            bidirectional_entails(&nli, "The patient has diabetes.", "The patient does not have diabetes.").await;
        assert!(!entails);
    }
}
