// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Implicit preference analyzer (C7).
//!
//! Combines three independent signals into one score: lexical sentiment
//! polarity, domain-keyword recommendation direction, and a counterfactual
//! note produced by the completion generator. Weighted 0.30 sentiment /
//! 0.40 direction / 0.30 counterfactual, matching the relative confidence
//! each signal carries on its own (direction is the most directly on-point
//! for "does this favor one party").

#![cfg(feature = "std")]

use once_cell::sync::Lazy;
use regex::Regex;

use crate::traits::CompletionGenerator;
use crate::types::{CheckResult, CounterfactualDetail, DirectionDetail, DomainType, SentimentDetail};

// ---------------------------------------------------------------------------
// Sentiment (lexical stand-in for distilbert-sst2)
// ---------------------------------------------------------------------------

const POSITIVE_WORDS: &[&str] = &[
    "excellent", "great", "beneficial", "favorable", "strong", "good", "positive", "advantage",
    "recommend", "effective", "improved", "outperform", "attractive", "bullish", "superior",
];
const NEGATIVE_WORDS: &[&str] = &[
    "terrible", "poor", "harmful", "unfavorable", "weak", "bad", "negative", "disadvantage",
    "avoid", "ineffective", "declining", "underperform", "unattractive", "bearish", "inferior",
];

static SENTENCE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?<=[.!?])\s+").unwrap());

fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_SPLIT.split(text.trim()).filter(|s| s.trim().len() > 5).collect()
}

/// Per-sentence positive/negative word-count ratio averaged across the
/// text, approximating a sentence-level sentiment classifier batched and
/// averaged the same way the production model would be.
pub fn analyze_sentiment(text: &str) -> SentimentDetail {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return SentimentDetail { score: 0.0, label: "NEUTRAL".to_string(), positive: 0.5, negative: 0.5 };
    }

    let mut pos_total = 0.0;
    let mut neg_total = 0.0;
    for sentence in &sentences {
        let lower = sentence.to_lowercase();
        let pos_hits = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;
        let neg_hits = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count() as f64;
        let total_hits = pos_hits + neg_hits;
        if total_hits > 0.0 {
            pos_total += pos_hits / total_hits;
            neg_total += neg_hits / total_hits;
        } else {
            pos_total += 0.5;
            neg_total += 0.5;
        }
    }
    let n = sentences.len() as f64;
    let positive = pos_total / n;
    let negative = neg_total / n;

    let label = if (positive - negative).abs() < 0.15 {
        "NEUTRAL"
    } else if positive > negative {
        "POSITIVE"
    } else {
        "NEGATIVE"
    };

    SentimentDetail { score: (positive - negative).abs(), label: label.to_string(), positive, negative }
}

// ---------------------------------------------------------------------------
// Direction (domain-keyword recommendation lean)
// ---------------------------------------------------------------------------

struct DomainKeywords {
    side_a_label: &'static str,
    side_a: &'static [&'static str],
    side_b_label: &'static str,
    side_b: &'static [&'static str],
}

fn domain_keywords(domain: DomainType) -> DomainKeywords {
    match domain {
        DomainType::Legal => DomainKeywords {
            side_a_label: "plaintiff",
            side_a: &["liable", "negligent", "breach", "at fault", "culpable", "violated", "failed to comply", "in violation", "should be held accountable"],
            side_b_label: "defendant",
            side_b: &["not liable", "without fault", "compliant", "within rights", "no breach", "acted reasonably", "no evidence of negligence", "lawfully", "in good faith"],
        },
        DomainType::Financial => DomainKeywords {
            side_a_label: "buy_side",
            side_a: &["strong buy", "undervalued", "upside potential", "growth opportunity", "outperform", "bullish", "attractive valuation", "recommend buying", "accumulate"],
            side_b_label: "sell_side",
            side_b: &["overvalued", "downside risk", "sell", "bearish", "underperform", "reduce position", "take profits", "declining fundamentals", "negative outlook"],
        },
        DomainType::Healthcare | DomainType::Pharma => DomainKeywords {
            side_a_label: "treatment",
            side_a: &["recommend treatment", "beneficial", "effective therapy", "clinically indicated", "evidence supports", "improved outcomes", "significant benefit", "first-line treatment"],
            side_b_label: "conservative",
            side_b: &["watchful waiting", "monitor", "conservative approach", "not clinically indicated", "risks outweigh", "defer treatment", "insufficient evidence", "observation preferred"],
        },
        DomainType::General => DomainKeywords {
            side_a_label: "option_a",
            side_a: &["clearly better", "superior", "strongly recommend", "the best choice", "obvious advantage", "far preferable", "without question"],
            side_b_label: "option_b",
            side_b: &["inferior", "not recommended", "worse option", "should avoid", "disadvantage", "problematic", "less suitable"],
        },
    }
}

/// Count keyword hits for each side of a domain's recommendation axis and
/// report which side the output leans toward.
pub fn analyze_direction(text: &str, domain: DomainType) -> DirectionDetail {
    let lower = text.to_lowercase();
    let keywords = domain_keywords(domain);

    let a_hits = keywords.side_a.iter().filter(|kw| lower.contains(*kw)).count();
    let b_hits = keywords.side_b.iter().filter(|kw| lower.contains(*kw)).count();
    let max_possible = keywords.side_a.len().max(keywords.side_b.len()) as f64;

    let a_norm = if max_possible > 0.0 { a_hits as f64 / max_possible } else { 0.0 };
    let b_norm = if max_possible > 0.0 { b_hits as f64 / max_possible } else { 0.0 };

    let lean = if a_hits == 0 && b_hits == 0 {
        "neutral".to_string()
    } else if a_hits > b_hits {
        format!("favors_{}", keywords.side_a_label)
    } else if b_hits > a_hits {
        format!("favors_{}", keywords.side_b_label)
    } else {
        "balanced".to_string()
    };

    // Score: 1.0 when neutral/balanced, degrading with how lopsided the count is.
    let imbalance = (a_norm - b_norm).abs();
    let score = (1.0 - imbalance).clamp(0.0, 1.0);

    DirectionDetail { score, party_a: keywords.side_a_label.to_string(), party_b: keywords.side_b_label.to_string(), lean }
}

// ---------------------------------------------------------------------------
// Counterfactual (mirror-prompt divergence)
// ---------------------------------------------------------------------------

/// Ask the generator to answer the mirrored question (parties swapped) and
/// report whether a direct opposite was produced, as a coarse divergence
/// signal. A real counterfactual check embeds both responses and compares
/// cosine similarity; here token overlap is used as the stand-in metric.
pub async fn analyze_counterfactual(generator: &dyn CompletionGenerator, output: &str) -> CounterfactualDetail {
    let mirrored_prompt = format!("Answer the same question with the opposing recommendation: {output}");
    let completions = generator.generate(&mirrored_prompt, 0.7, 1).await.unwrap_or_default();
    let Some(mirror) = completions.into_iter().next() else {
        return CounterfactualDetail { score: 0.7, note: "counterfactual generation unavailable".to_string() };
    };

    let original_tokens: std::collections::HashSet<&str> = output.split_whitespace().collect();
    let mirror_tokens: std::collections::HashSet<&str> = mirror.split_whitespace().collect();
    let overlap = original_tokens.intersection(&mirror_tokens).count() as f64;
    let union = original_tokens.union(&mirror_tokens).count().max(1) as f64;
    let similarity = overlap / union;

    // High similarity between "answer normally" and "answer the opposite"
    // means the model refused to actually flip, or there was nothing
    // directional to flip in the first place -- both read as neutral-good.
    CounterfactualDetail { score: similarity.clamp(0.0, 1.0), note: format!("mirror-response token overlap {:.2}", similarity) }
}

/// Combine the three signals into a single implicit-preference
/// [`CheckResult`], weighted 0.30 sentiment / 0.40 direction / 0.30
/// counterfactual.
pub fn combine(sentiment: &SentimentDetail, direction: &DirectionDetail, counterfactual: &CounterfactualDetail) -> CheckResult {
    let sentiment_score = if sentiment.label == "NEUTRAL" { 1.0 } else { (1.0 - sentiment.score).clamp(0.0, 1.0) };
    let score = sentiment_score * 0.30 + direction.score * 0.40 + counterfactual.score * 0.30;

    let mut result = CheckResult::new(
        "implicit_preference",
        score,
        format!(
            "sentiment={} ({:.2}), direction={} ({:.2}), counterfactual_similarity={:.2}",
            sentiment.label, sentiment_score, direction.lean, direction.score, counterfactual.score
        ),
    );

    if direction.lean.starts_with("favors_") {
        result = result.with_flag(format!("directional_lean:{}", direction.lean));
    }
    if sentiment.label != "NEUTRAL" && sentiment.score > 0.4 {
        result = result.with_flag("strong_sentiment_polarity");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_text_scores_near_one() {
        let sentiment = analyze_sentiment("The clause states the terms clearly. The provision provides notice.");
        assert_eq!(sentiment.label, "NEUTRAL");
    }

    #[test]
    fn legal_direction_detects_plaintiff_lean() {
        let direction = analyze_direction(
            "The defendant was clearly negligent and breach of contract is evident; they should be held accountable.",
            DomainType::Legal,
        );
        assert_eq!(direction.lean, "favors_plaintiff");
    }

    #[test]
    fn balanced_text_has_no_lean() {
        let direction = analyze_direction("This is a general statement about the weather.", DomainType::General);
        assert_eq!(direction.lean, "neutral");
    }
}
