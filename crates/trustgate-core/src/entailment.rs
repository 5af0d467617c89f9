// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Entailment check: is the AI output logically supported by the source
//! document? The primary hallucination detector, built on top of the C1
//! NLI predictor interface. Weighted separately (0.40) from the fuller
//! claim-extraction-and-verification pipeline in [`crate::claims`] (0.15).
//!
//! Splits the output into sentences, keeps only the ones carrying a
//! checkable fact (a number, a section/clause reference, or a proper
//! noun), and tests each surviving sentence for entailment against the
//! context via the configured [`NliPredictor`]. Contradictions are
//! penalized far more heavily than merely-unverifiable sentences, since a
//! contradiction is active misinformation rather than an omission.

#![cfg(feature = "std")]

use once_cell::sync::Lazy;
use regex::Regex;

use crate::traits::NliPredictor;
use crate::types::CheckResult;

static SECTION_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(?:Section|Clause|Article)\s+\d+(?:\.\d+)*").unwrap());
static HAS_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());
static PROPER_NOUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").unwrap());
static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+\s+").unwrap());

const IGNORED_CAPITALIZED: &[&str] = &["The", "This", "That", "These", "Those", "Section", "Clause", "Article"];

fn has_checkable_fact(sentence: &str) -> bool {
    if HAS_NUMBER.is_match(sentence) || SECTION_REF.is_match(sentence) {
        return true;
    }
    PROPER_NOUN
        .find_iter(sentence)
        .any(|m| m.as_str().len() > 3 && !IGNORED_CAPITALIZED.contains(&m.as_str()))
}

fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_SPLIT.split(text.trim()).filter(|s| s.split_whitespace().count() >= 4).collect()
}

/// Run the entailment check against `context`; returns a neutral 0.5 with
/// a `no_context_provided` flag if no source document was supplied.
pub async fn check_entailment(nli: &dyn NliPredictor, output: &str, context: Option<&str>) -> CheckResult {
    let Some(context) = context.filter(|c| !c.trim().is_empty()) else {
        return CheckResult::new("entailment", 0.5, "No source document provided. Entailment check requires context for accurate scoring.")
            .with_flag("no_context_provided");
    };

    let mut supported = 0usize;
    let mut contradicted = 0usize;
    let mut neutral = 0usize;
    let mut flags = Vec::new();

    let checkable: Vec<&str> = split_sentences(output).into_iter().filter(|s| has_checkable_fact(s)).collect();

    for sentence in &checkable {
        match nli.predict(context, sentence).await {
            Ok(score) if score.is_entailment() => supported += 1,
            Ok(score) if score.is_contradiction() => {
                contradicted += 1;
                flags.push(format!("entailment_contradiction: '{sentence}' conflicts with source"));
            }
            _ => neutral += 1,
        }
    }

    let total_checked = checkable.len();
    let score = if total_checked == 0 {
        0.7
    } else {
        let base = supported as f64 / total_checked as f64;
        let contradiction_penalty = contradicted as f64 * 0.2;
        let neutral_penalty = neutral as f64 * 0.05;
        (base - contradiction_penalty - neutral_penalty).clamp(0.0, 1.0)
    };

    let detail = if contradicted > 0 {
        format!("Found {contradicted} contradiction(s) with the source document. {supported}/{total_checked} claims supported, {contradicted} contradicted, {neutral} unverifiable.")
    } else if total_checked == 0 {
        "No checkable factual statements found in the output.".to_string()
    } else if neutral > 0 && supported == 0 {
        flags.push("weak_entailment".to_string());
        format!("None of the {total_checked} claims could be verified against the source.")
    } else if neutral > 0 {
        format!("{supported}/{total_checked} claims supported by the source. {neutral} could not be verified.")
    } else {
        format!("All {supported} claims are grounded in the source document.")
    };

    let mut result = CheckResult::new("entailment", score, detail);
    for flag in flags {
        result = result.with_flag(flag);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::HeuristicNli;

    #[tokio::test]
    async fn missing_context_is_neutral() {
        let nli = HeuristicNli;
        let result = check_entailment(&nli, "The lease runs for 12 months.", None).await;
        assert_eq!(result.score, 0.5);
    }

    #[tokio::test]
    async fn no_checkable_facts_is_moderate_confidence() {
        let nli = HeuristicNli;
        let result = check_entailment(&nli, "This is fine and good.", Some("Some context with no overlap.")).await;
        assert_eq!(result.score, 0.7);
    }

    #[tokio::test]
    async fn grounded_claim_scores_well() {
        let nli = HeuristicNli;
        let result = check_entailment(
            &nli,
            "The lease Term is 12 months starting January.",
            Some("The lease Term is 12 months starting January 2026 at the designated property."),
        )
        .await;
        assert!(result.score > 0.5);
    }
}
