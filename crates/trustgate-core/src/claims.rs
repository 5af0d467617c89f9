// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Claim extraction and verification (C6).
//!
//! Without a production NER model on hand, sentence-level claim detection
//! falls back to the same signal categories a fine-tuned extractor would
//! use: factual entities (approximated here with a capitalized-phrase and
//! number/date/money regex set), causal language, domain assertions, and
//! hedge filtering. Each surviving claim is matched to the best-overlapping
//! source line, gated for groundedness, then checked bidirectionally with
//! NLI; entities present in the output but absent from the context are
//! flagged as a distinct hallucination signal.

#![cfg(feature = "std")]

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::clinical::{expand_abbreviations, split_clinical_sentences, STOP_WORDS};
use crate::traits::NliPredictor;
use crate::types::{Claim, ClaimCheckResult, ClaimStatus, CheckResult, DomainType};

/// Lines a claim is matched against are capped to this many top-scoring
/// candidates before NLI is invoked, per the verification ladder.
const MAX_MATCHED_LINES: usize = 3;

/// Below this keyword-overlap score (and with no claim entity anywhere in
/// the source), a claim is considered unmatched to any part of the
/// context rather than merely unsupported.
const GROUNDEDNESS_THRESHOLD: f64 = 0.15;

static DURATION_CLAIM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\b(\d+(?:\.\d+)?)\s*(days?|weeks?|months?|years?)\b").unwrap());

static HEDGE_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(may|might|could|possibly|perhaps|probably|it seems|seems to|seems that|appears to|appears that|in my opinion|i think|i believe|arguably|debatable|uncertain)\b").unwrap()
});

static CAUSAL_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(causes?|caused|causing|requires?|required|requiring|leads? to|led to|leading to|results? in|resulted in|resulting in|due to|because of|as a result of|therefore|consequently|hence|thus)\b").unwrap()
});

static DOMAIN_ASSERTION_PATTERNS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(is enforceable|is binding|is prohibited|is unlawful|is lawful|is permitted|in breach|in violation|in compliance|in accordance|shall|must not|is required to|is indicated|is contraindicated|is diagnosed|is prescribed|effective for|effective in|clinically significant|associated with|risk of|risk factor|exceeds threshold|exceeds limit|valued at|priced at|worth)\b").unwrap()
});

static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*(%|percent|dollars?|usd|eur|gbp|kg|mg|ml|km|miles?|months?|years?|days?|hours?|minutes?|weeks?|billion|million|thousand)\b").unwrap()
});

/// Crude entity proxy: runs of capitalized words (`Acme Corp`, `North
/// America`), standing in for a named-entity recognizer.
static CAPITALIZED_PHRASE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Z][a-zA-Z]*(?:\s+[A-Z][a-zA-Z]*)*\b").unwrap()
});

const COMMON_SENTENCE_STARTERS: &[&str] = &[
    "The", "This", "That", "These", "Those", "It", "He", "She", "They", "We", "I", "A", "An",
];

fn is_hedged(sentence: &str) -> bool {
    HEDGE_PATTERNS.is_match(sentence)
}

fn extract_entities(sentence: &str) -> Vec<String> {
    CAPITALIZED_PHRASE
        .find_iter(sentence)
        .map(|m| m.as_str().to_string())
        .filter(|phrase| {
            let first_word = phrase.split_whitespace().next().unwrap_or("");
            phrase.len() > 2 && !(phrase.split_whitespace().count() == 1 && COMMON_SENTENCE_STARTERS.contains(&first_word))
        })
        .collect()
}

fn clean_claim_text(sentence: &str) -> String {
    static LEADING_TRANSITION: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)^(however|additionally|furthermore|moreover|also|in addition),?\s*").unwrap()
    });
    LEADING_TRANSITION.replace(sentence, "").trim().to_string()
}

/// Split `text` into candidate claim sentences, filtering out hedged
/// (opinion-like) ones and those too short to carry a verifiable fact.
fn candidate_claims(text: &str, domain: DomainType) -> Vec<(String, String, Vec<String>)> {
    let normalized = if matches!(domain, DomainType::Healthcare | DomainType::Pharma) {
        expand_abbreviations(text)
    } else {
        text.to_string()
    };

    let sentences = split_clinical_sentences(&normalized);
    let mut claims = Vec::new();

    for sentence in sentences {
        if sentence.len() < 10 || is_hedged(&sentence) {
            continue;
        }
        let entities = extract_entities(&sentence);
        let has_number = NUMBER_PATTERN.is_match(&sentence);
        let has_causal = CAUSAL_PATTERNS.is_match(&sentence);
        let has_domain_assertion = DOMAIN_ASSERTION_PATTERNS.is_match(&sentence);

        if !entities.is_empty() || has_number || has_causal || has_domain_assertion {
            claims.push((clean_claim_text(&sentence), sentence, entities));
        }
    }
    claims
}

/// Entities present in `output` but absent (even after loose substring
/// matching) from `context`; a direct signal of potential hallucination.
pub fn hallucinated_entities(output: &str, context: &str) -> Vec<String> {
    if context.trim().is_empty() {
        return Vec::new();
    }
    let context_lower = context.to_lowercase();
    let output_entities = extract_entities(output);

    let mut seen = HashSet::new();
    let mut hallucinated = Vec::new();
    for entity in output_entities {
        let normalized = entity.to_lowercase();
        if seen.contains(&normalized) {
            continue;
        }
        seen.insert(normalized.clone());
        if !context_lower.contains(&normalized) {
            hallucinated.push(entity);
        }
    }
    hallucinated
}

/// Split source context into lines a claim can be matched against:
/// bullet/line-oriented first, falling back to sentence splitting when the
/// source has no newlines or a line runs past 40 words.
fn source_lines(source: &str) -> Vec<String> {
    let bulleted: Vec<String> = source
        .lines()
        .map(|line| line.trim_start_matches(|c: char| matches!(c, '-' | '•' | '*' | '>')).trim())
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect();

    let too_long = bulleted.iter().any(|line| line.split_whitespace().count() > 40);
    if !bulleted.is_empty() && source.contains('\n') && !too_long {
        return bulleted;
    }
    split_clinical_sentences(source)
}

/// Tokens used for keyword-overlap scoring: letters (≥2 chars) plus bare
/// digit runs, with common stop words filtered out.
fn overlap_tokens(text: &str) -> HashSet<String> {
    text.to_ascii_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .filter(|token| (token.len() >= 2 && token.chars().next().unwrap().is_alphabetic()) || token.chars().all(|c| c.is_ascii_digit()))
        .filter(|token| !STOP_WORDS.contains(token))
        .map(String::from)
        .collect()
}

/// Keyword-overlap score of `claim_tokens`/`entities` against one source
/// `line`, boosted for every claim entity the line mentions verbatim.
fn line_score(claim_tokens: &HashSet<String>, entities: &[String], line: &str) -> f64 {
    if claim_tokens.is_empty() {
        return 0.0;
    }
    let line_tokens = overlap_tokens(line);
    let overlap = claim_tokens.intersection(&line_tokens).count() as f64 / claim_tokens.len() as f64;
    let line_lower = line.to_lowercase();
    let entity_boost = entities.iter().filter(|entity| line_lower.contains(&entity.to_lowercase())).count() as f64 * 0.2;
    overlap + entity_boost
}

/// Whether `claim_text` asserts a duration (a number followed by a
/// day/week/month/year unit), and if so the `(number, unit)` it names.
fn duration_claim(claim_text: &str) -> Option<(String, String)> {
    DURATION_CLAIM.captures(claim_text).map(|caps| (caps[1].to_string(), caps[2].to_ascii_lowercase()))
}

/// Verify one extracted claim against `source` via keyword-overlap
/// groundedness gating followed by bidirectional NLI against the
/// top-matching lines.
async fn verify_claim(nli: &dyn NliPredictor, claim_text: &str, entities: &[String], source: &str, lines: &[String]) -> (ClaimStatus, f64) {
    let claim_tokens = overlap_tokens(claim_text);
    let mut scored: Vec<(&str, f64)> = lines.iter().map(|line| (line.as_str(), line_score(&claim_tokens, entities, line))).collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let best_score = scored.first().map(|&(_, score)| score).unwrap_or(0.0);
    let source_lower = source.to_lowercase();
    let entity_in_source = entities.iter().any(|entity| source_lower.contains(&entity.to_lowercase()));
    if best_score < GROUNDEDNESS_THRESHOLD && !entity_in_source {
        return (ClaimStatus::Ungrounded, 0.0);
    }

    let top_lines: Vec<&str> = scored.iter().take(MAX_MATCHED_LINES).map(|&(line, _)| line).collect();

    if let Some((number, unit)) = duration_claim(claim_text) {
        let unit_stem = unit.trim_end_matches('s');
        for line in &top_lines {
            let line_lower = line.to_lowercase();
            if line_lower.contains(unit_stem) && !line_lower.contains(&number) {
                return (ClaimStatus::Contradicted, 0.0);
            }
        }
    }

    let mut contradiction = false;
    let mut partial = false;
    for line in &top_lines {
        let forward = nli.predict(line, claim_text).await.ok();
        let backward = nli.predict(claim_text, line).await.ok();
        let forward_entails = matches!(forward, Some(ref score) if score.is_entailment());
        let backward_entails = matches!(backward, Some(ref score) if score.is_entailment());
        let either_contradicts = matches!(forward, Some(ref score) if score.is_contradiction()) || matches!(backward, Some(ref score) if score.is_contradiction());

        if forward_entails && backward_entails {
            return (ClaimStatus::Verified, 1.0);
        }
        if either_contradicts {
            contradiction = true;
        } else if forward_entails {
            partial = true;
        }
    }

    if contradiction {
        (ClaimStatus::Contradicted, 0.0)
    } else if partial {
        (ClaimStatus::Verified, 0.8)
    } else {
        (ClaimStatus::Unverified, 0.5)
    }
}

/// Extract claims from `output`, verify each against `context` via
/// keyword-overlap groundedness gating and bidirectional NLI, and
/// cross-reference entities for hallucination.
pub async fn check_claims(
    nli: &dyn NliPredictor,
    output: &str,
    context: Option<&str>,
    domain: DomainType,
) -> ClaimCheckResult {
    let Some(context) = context.filter(|c| !c.trim().is_empty()) else {
        let base = CheckResult::new("claim_extraction", 0.5, "No source context provided; claims cannot be verified.")
            .with_flag("no_context_provided");
        return ClaimCheckResult {
            base,
            total: 0,
            verified: 0,
            unverified: 0,
            contradicted: 0,
            ungrounded: 0,
            claims: Vec::new(),
        };
    };

    let extracted = candidate_claims(output, domain);
    if extracted.is_empty() {
        let mut base = CheckResult::new("claim_extraction", 0.7, "No specific factual claims detected in the output.");
        if output.split_whitespace().count() > 20 {
            base = base.with_flag("no_claims_extracted");
        }
        return ClaimCheckResult {
            base,
            total: 0,
            verified: 0,
            unverified: 0,
            contradicted: 0,
            ungrounded: 0,
            claims: Vec::new(),
        };
    }

    let lines = source_lines(context);
    let mut claims = Vec::with_capacity(extracted.len());
    let mut verified = 0usize;
    let mut contradicted = 0usize;
    let mut unverified = 0usize;
    let mut ungrounded = 0usize;

    for (claim_text, source_sentence, entities) in extracted {
        let (status, entailment_score) = verify_claim(nli, &claim_text, &entities, context, &lines).await;
        match status {
            ClaimStatus::Verified => verified += 1,
            ClaimStatus::Contradicted => contradicted += 1,
            ClaimStatus::Unverified => unverified += 1,
            ClaimStatus::Ungrounded => ungrounded += 1,
        }
        claims.push(Claim { text: claim_text, source_sentence, entities, status, entailment_score });
    }

    let hallucinations = hallucinated_entities(output, context);
    let total = claims.len();
    let score = verified as f64 / total.max(1) as f64;

    let mut detail = format!(
        "Extracted {total} claim(s): {verified} verified, {unverified} unverified, {contradicted} contradicted, {ungrounded} ungrounded."
    );
    if !hallucinations.is_empty() {
        detail.push_str(&format!(" {} entit{} not grounded in source.", hallucinations.len(), if hallucinations.len() == 1 { "y" } else { "ies" }));
    }

    let mut base = CheckResult::new("claim_extraction", score, detail);
    if contradicted > 0 {
        base = base.with_flag("contradicted_claims");
    }
    if unverified as f64 > 0.5 * total as f64 {
        base = base.with_flag("majority_unverified");
    }
    if !hallucinations.is_empty() {
        base = base.with_flag("hallucinated_entities");
    }
    if hallucinations.len() > 3 {
        base = base.with_flag("many_hallucinated_entities");
    }

    ClaimCheckResult { base, total, verified, unverified, contradicted, ungrounded, claims }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::HeuristicNli;

    #[tokio::test]
    async fn no_context_yields_neutral_score() {
        let nli = HeuristicNli;
        let result = check_claims(&nli, "The contract is worth $500,000.", None, DomainType::Legal).await;
        assert_eq!(result.base.score, 0.5);
        assert!(result.base.flags.contains(&"no_context_provided".to_string()));
    }

    #[tokio::test]
    async fn hedged_sentences_are_not_claims() {
        let nli = HeuristicNli;
        let result = check_claims(
            &nli,
            "It might possibly be the case that this could work.",
            Some("Some unrelated context."),
            DomainType::General,
        )
        .await;
        assert_eq!(result.total, 0);
    }

    #[test]
    fn flags_entities_absent_from_context() {
        let hallucinated = hallucinated_entities("Acme Corp signed the agreement.", "TechStart Inc signed nothing.");
        assert!(hallucinated.iter().any(|e| e.contains("Acme")));
    }

    #[tokio::test]
    async fn grounded_duration_claim_is_verified() {
        let nli = HeuristicNli;
        let text = "The lease term is 12 months starting January 2026.";
        let result = check_claims(&nli, text, Some(text), DomainType::Legal).await;
        assert_eq!(result.verified, result.total);
        assert_eq!(result.contradicted, 0);
    }

    #[tokio::test]
    async fn mismatched_duration_claim_is_contradicted() {
        let nli = HeuristicNli;
        let context = "The lease term is 12 months starting January 2026.";
        let output = "The lease term is 24 months starting January 2026.";
        let result = check_claims(&nli, output, Some(context), DomainType::Legal).await;
        assert_eq!(result.contradicted, 1);
        assert!(result.base.flags.contains(&"contradicted_claims".to_string()));
    }

    #[tokio::test]
    async fn unrelated_claim_is_ungrounded() {
        let nli = HeuristicNli;
        let output = "Acme Corp reported revenue growth due to overseas expansion.";
        let context = "Patient was prescribed 500mg of medication twice daily.";
        let result = check_claims(&nli, output, Some(context), DomainType::Healthcare).await;
        assert_eq!(result.ungrounded, 1);
        assert!(!result.base.flags.contains(&"contradicted_claims".to_string()));
    }
}
