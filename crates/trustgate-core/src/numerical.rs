// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Numerical extraction, normalization, and domain-aware comparison (C4).
//!
//! Ported from the regex-driven extractor/normalizer/comparator that this
//! engine's Python predecessor ran as its own microservice. Three ordered
//! extraction passes (blood pressure, bare years, general numbers) feed a
//! greedy context-similarity matcher whose acceptance floor and tolerance
//! tables are reproduced verbatim below.

#![cfg(feature = "std")]

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{
    ContextType, DomainType, ExtractedNumber, NumberMatch, ToleranceRule, ToleranceSeverity,
};

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

static BLOOD_PRESSURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{2,3})\s*/\s*(\d{2,3})\b").unwrap());

static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(19|20)\d{2}\b").unwrap());

// Currency, digit groups (with optional thousands separators and decimal
// part), an optional unit/multiplier word, guarded against swallowing a
// trailing bare temperature/sex letter ("98.6F", "120M").
static GENERAL_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([$€£¥])?(\d[\d,]*(?:\.\d+)?)\s*(mcg|micrograms?|ug|µg|mg|milligrams?|g|grams?|kg|kilograms?|ml|milliliters?|cc|dl|deciliters?|l|liters?|litres?|mm|cm|km|miles?|m|meters?|days?|weeks?|months?|years?|hours?|minutes?|iu|meq|%|percent|pct|thousand|million|billion|trillion|bn|tn|k|mm|b|t)?(?![A-Za-z])",
    )
    .unwrap()
});

static MEDICATION_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "dose", "dosage", "mg", "mcg", "tablet", "tablets", "capsule", "infusion", "metoprolol",
        "lisinopril", "metformin", "insulin", "warfarin", "amoxicillin",
    ]
    .into_iter()
    .collect()
});

static LAB_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["wbc", "cr", "hgb", "glucose", "creatinine", "sodium", "potassium", "hemoglobin", "platelet"]
        .into_iter()
        .collect()
});

static VITAL_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["hr", "bp", "rr", "temp", "spo2", "pulse"].into_iter().collect());

static ADVERSE_WORDS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["adverse", "ae", "sae", "event", "events"].into_iter().collect());

static DURATION_UNITS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["day", "days", "week", "weeks", "month", "months", "year", "years"]
        .into_iter()
        .collect()
});

/// Extract every number from `text`, in three ordered passes.
///
/// Later passes skip any span already claimed by an earlier one, matching
/// the predecessor's overlap-guard behaviour.
pub fn extract_numbers(text: &str) -> Vec<ExtractedNumber> {
    let mut claimed: Vec<(usize, usize)> = Vec::new();
    let mut numbers = Vec::new();

    for caps in BLOOD_PRESSURE.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let (start, end) = (whole.start(), whole.end());
        let sys: f64 = caps[1].parse().unwrap_or(0.0);
        let dia: f64 = caps[2].parse().unwrap_or(0.0);
        let context = narrow_context(text, start, end);
        numbers.push(ExtractedNumber {
            value: sys,
            raw: caps[1].to_string(),
            unit: "mmHg".into(),
            context: context.clone(),
            context_type: ContextType::VitalSign,
            position: start,
        });
        numbers.push(ExtractedNumber {
            value: dia,
            raw: caps[2].to_string(),
            unit: "mmHg".into(),
            context,
            context_type: ContextType::VitalSign,
            position: whole.start() + caps.get(2).unwrap().start() - caps.get(1).unwrap().start(),
        });
        claimed.push((start, end));
    }

    for mat in BARE_YEAR.find_iter(text) {
        if overlaps_nearby(&claimed, mat.start(), mat.end(), 5) {
            continue;
        }
        let value: f64 = mat.as_str().parse().unwrap_or(0.0);
        numbers.push(ExtractedNumber {
            value,
            raw: mat.as_str().to_string(),
            unit: String::new(),
            context: wide_context(text, mat.start(), mat.end()),
            context_type: ContextType::Default,
            position: mat.start(),
        });
        claimed.push((mat.start(), mat.end()));
    }

    for caps in GENERAL_NUMBER.captures_iter(text) {
        let whole = caps.get(0).unwrap();
        let (start, end) = (whole.start(), whole.end());
        if overlaps_nearby(&claimed, start, end, 3) {
            continue;
        }
        let preceding_alpha = start > 0
            && text[..start]
                .chars()
                .next_back()
                .map(|c| c.is_alphabetic())
                .unwrap_or(false);
        let digits = caps[2].replace(',', "");
        if preceding_alpha && digits.trim_start_matches('.').len() <= 1 {
            continue;
        }

        let mut value: f64 = digits.parse().unwrap_or(0.0);
        let mut unit = caps.get(3).map(|m| m.as_str().to_ascii_lowercase()).unwrap_or_default();
        unit = apply_multiplier(&mut value, &unit);
        if unit.is_empty() {
            if let Some(symbol) = caps.get(1) {
                unit = symbol.as_str().to_string();
            } else if let Some(sym) = implicit_currency(text, start) {
                unit = sym;
            }
        }

        let context = wide_context(text, start, end);
        let context_type = classify_context_type(text, start, &unit);

        numbers.push(ExtractedNumber {
            value,
            raw: caps[2].to_string(),
            unit,
            context,
            context_type,
            position: start,
        });
        claimed.push((start, end));
    }

    numbers
}

fn overlaps_nearby(claimed: &[(usize, usize)], start: usize, end: usize, pad: usize) -> bool {
    claimed
        .iter()
        .any(|&(cs, ce)| start < ce + pad && end + pad > cs)
}

fn apply_multiplier(value: &mut f64, unit: &str) -> String {
    let multiplier = match unit {
        "k" | "thousand" => Some(1e3),
        "m" | "mm" | "million" => Some(1e6),
        "b" | "bn" | "billion" => Some(1e9),
        "t" | "tn" | "trillion" => Some(1e12),
        _ => None,
    };
    match multiplier {
        Some(factor) => {
            *value *= factor;
            String::new()
        }
        None => unit.to_string(),
    }
}

fn implicit_currency(text: &str, start: usize) -> Option<String> {
    let lookback_start = start.saturating_sub(3);
    let window = &text[lookback_start..start];
    if window.contains('$') {
        Some("$".into())
    } else if window.contains('€') {
        Some("€".into())
    } else if window.contains('£') {
        Some("£".into())
    } else {
        None
    }
}

fn classify_context_type(text: &str, start: usize, unit: &str) -> ContextType {
    let window_start = start.saturating_sub(15);
    let window = text[window_start..start].to_ascii_lowercase();
    let label = window
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric());

    if MEDICATION_WORDS.contains(label) || unit == "mg" || unit == "mcg" {
        ContextType::MedicationDose
    } else if LAB_WORDS.contains(label) {
        ContextType::LabValue
    } else if ADVERSE_WORDS.contains(label) {
        ContextType::AdverseEventCount
    } else if VITAL_WORDS.contains(label) {
        ContextType::VitalSign
    } else if unit == "$" || unit == "€" || unit == "£" || window.contains("dollar") {
        ContextType::MonetaryValue
    } else if unit == "%" || unit == "percent" || unit == "pct" {
        ContextType::Percentage
    } else if DURATION_UNITS.contains(unit) {
        ContextType::Duration
    } else {
        ContextType::Default
    }
}

fn wide_context(text: &str, start: usize, end: usize) -> String {
    let lo = start.saturating_sub(30);
    let hi = (end + 30).min(text.len());
    text[lo..hi].trim().to_string()
}

fn narrow_context(text: &str, start: usize, end: usize) -> String {
    let lo = start.saturating_sub(15);
    let hi = (end + 10).min(text.len());
    text[lo..hi].trim().to_string()
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize `(value, unit)` to a canonical unit within its dimension.
/// Unrecognized units pass through unchanged (lowercased).
pub fn normalize(value: f64, unit: &str) -> (f64, String) {
    let unit = unit
        .to_ascii_lowercase()
        .trim_end_matches('.')
        .trim_end_matches('s')
        .to_string();

    match unit.as_str() {
        "mcg" | "ug" | "microgram" => (value * 0.001, "mg".into()),
        "mg" | "milligram" => (value, "mg".into()),
        "g" | "gram" => (value * 1000.0, "mg".into()),
        "kg" | "kilogram" => (value * 1_000_000.0, "mg".into()),
        "ml" | "milliliter" | "cc" => (value, "ml".into()),
        "l" | "liter" | "litre" => (value * 1000.0, "ml".into()),
        "dl" | "deciliter" => (value * 100.0, "ml".into()),
        "day" => (value, "day".into()),
        "week" => (value * 7.0, "day".into()),
        "month" => (value * 30.0, "day".into()),
        "year" => (value * 365.0, "day".into()),
        "%" | "percent" | "pct" => (value, "%".into()),
        other => (value, other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Tolerance rules
// ---------------------------------------------------------------------------

/// Look up the tolerance rule for `(domain, context_type)`, falling back to
/// the domain's own default rule, then to a 1% / medium global fallback.
pub fn tolerance_rule(domain: DomainType, context_type: ContextType) -> ToleranceRule {
    use ContextType::*;
    use DomainType::*;
    use ToleranceSeverity::*;

    let rule = |tolerance: f64, severity: ToleranceSeverity| ToleranceRule { tolerance, severity };

    match (domain, context_type) {
        (Healthcare, MedicationDose) => rule(0.0, Critical),
        (Healthcare, LabValue) => rule(0.01, High),
        (Healthcare, VitalSign) => rule(0.02, High),
        (Healthcare, AdverseEventCount) => rule(0.0, High),
        (Healthcare, Duration) => rule(0.0, Critical),
        (Healthcare, _) => rule(0.01, Medium),

        (Pharma, AdverseEventCount) => rule(0.0, Critical),
        (Pharma, MedicationDose) => rule(0.0, Critical),
        (Pharma, Percentage) => rule(0.005, High),
        (Pharma, _) => rule(0.005, Medium),

        (Legal, Duration) => rule(0.0, Critical),
        (Legal, MonetaryValue) => rule(0.0, Critical),
        (Legal, Percentage) => rule(0.01, Medium),
        (Legal, _) => rule(0.0, Medium),

        (Financial, MonetaryValue) => rule(0.005, High),
        (Financial, Percentage) => rule(0.001, High),
        (Financial, _) => rule(0.005, Medium),

        _ => rule(0.01, Medium),
    }
}

// ---------------------------------------------------------------------------
// Matching / comparison
// ---------------------------------------------------------------------------

fn context_words(context: &str) -> HashSet<String> {
    context
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().all(|c| c.is_alphabetic()) && w.len() >= 2)
        .map(|w| w.to_ascii_lowercase())
        .collect()
}

fn immediate_label(number: &ExtractedNumber) -> String {
    let lower = number.context.to_ascii_lowercase();
    let idx = lower.find(&number.raw.to_ascii_lowercase());
    let prefix = match idx {
        Some(i) => &lower[..i],
        None => &lower[..],
    };
    prefix
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

/// Undocumented-but-preserved similarity: jaccard overlap plus additive
/// boosts for label/context_type/unit agreement. Can exceed 1.0; used only
/// for relative ranking among candidates, never against an absolute ceiling
/// other than the 0.3 acceptance floor.
fn context_similarity(a: &ExtractedNumber, b: &ExtractedNumber) -> f64 {
    let words_a = context_words(&a.context);
    let words_b = context_words(&b.context);
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }
    let intersection = words_a.intersection(&words_b).count() as f64;
    let union = words_a.union(&words_b).count() as f64;
    let mut score = if union > 0.0 { intersection / union } else { 0.0 };

    if immediate_label(a) == immediate_label(b) && !immediate_label(a).is_empty() {
        score += 0.4;
    }
    if a.context_type == b.context_type && a.context_type != ContextType::Default {
        score += 0.2;
    }
    if a.unit.eq_ignore_ascii_case(&b.unit) {
        score += 0.15;
    }
    score
}

/// Overall outcome of comparing AI-produced numbers against source numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonStatus {
    Pass,
    Warning,
    Fail,
}

/// Result of [`compare_numbers`].
#[derive(Debug, Clone)]
pub struct ComparisonResult {
    pub score: f64,
    pub status: ComparisonStatus,
    pub matches: Vec<NumberMatch>,
    pub ungrounded: Vec<ExtractedNumber>,
    pub critical_mismatches: usize,
}

/// Greedily match each AI number against the best unused source number,
/// then compare normalized values against the domain's tolerance rule keyed
/// by the **AI-side** context type.
pub fn compare_numbers(
    source: &[ExtractedNumber],
    ai: &[ExtractedNumber],
    domain: DomainType,
) -> ComparisonResult {
    let mut used = vec![false; source.len()];
    let mut matches = Vec::new();
    let mut ungrounded = Vec::new();
    let mut critical_mismatches = 0usize;

    for ai_num in ai {
        let mut best: Option<(usize, f64)> = None;
        for (idx, src_num) in source.iter().enumerate() {
            if used[idx] {
                continue;
            }
            let similarity = context_similarity(ai_num, src_num);
            if similarity > 0.3 && best.map(|(_, s)| similarity > s).unwrap_or(true) {
                best = Some((idx, similarity));
            }
        }

        match best {
            None => ungrounded.push(ai_num.clone()),
            Some((idx, _)) => {
                used[idx] = true;
                let src_num = &source[idx];
                let (src_value, _) = normalize(src_num.value, &src_num.unit);
                let (ai_value, ai_unit) = normalize(ai_num.value, &ai_num.unit);

                let deviation = if src_value == 0.0 {
                    if ai_value == 0.0 { 0.0 } else { 999.0 }
                } else {
                    (ai_value - src_value).abs() / src_value.abs()
                };

                let rule = tolerance_rule(domain, ai_num.context_type);
                let within = deviation <= rule.tolerance;
                if !within && rule.severity == ToleranceSeverity::Critical {
                    critical_mismatches += 1;
                }

                matches.push(NumberMatch {
                    source_value: src_value,
                    ai_value,
                    unit: ai_unit,
                    context_type: format!("{:?}", ai_num.context_type),
                    relative_deviation: deviation,
                    severity: rule.severity,
                    within_tolerance: within,
                });
            }
        }
    }

    let score = if matches.is_empty() && ungrounded.is_empty() {
        1.0
    } else if matches.is_empty() {
        0.5
    } else {
        let within_count = matches.iter().filter(|m| m.within_tolerance).count();
        within_count as f64 / matches.len() as f64
    };

    let status = if critical_mismatches > 0 {
        ComparisonStatus::Fail
    } else if score < 0.5 {
        ComparisonStatus::Fail
    } else if score < 1.0 || !ungrounded.is_empty() {
        ComparisonStatus::Warning
    } else {
        ComparisonStatus::Pass
    };

    ComparisonResult { score, status, matches, ungrounded, critical_mismatches }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_blood_pressure_pair() {
        let numbers = extract_numbers("BP was 120/80 mmHg today.");
        let vitals: Vec<_> =
            numbers.iter().filter(|n| n.context_type == ContextType::VitalSign).collect();
        assert_eq!(vitals.len(), 2);
        assert_eq!(vitals[0].value, 120.0);
        assert_eq!(vitals[1].value, 80.0);
    }

    #[test]
    fn extracts_dose_with_unit() {
        let numbers = extract_numbers("Metoprolol 50 mg BID.");
        assert!(numbers.iter().any(|n| n.value == 50.0 && n.unit == "mg"));
    }

    #[test]
    fn multiplier_is_folded_into_value() {
        let numbers = extract_numbers("Revenue grew to $500 million last year.");
        let money = numbers.iter().find(|n| n.value == 500_000_000.0);
        assert!(money.is_some());
        assert_eq!(money.unwrap().unit, "");
    }

    #[test]
    fn no_ai_numbers_scores_perfect() {
        let result = compare_numbers(&[], &[], DomainType::General);
        assert_eq!(result.score, 1.0);
        assert_eq!(result.status, ComparisonStatus::Pass);
    }

    #[test]
    fn medication_dose_mismatch_is_critical() {
        let source = extract_numbers("Metoprolol 50 mg BID.");
        let ai = extract_numbers("Metoprolol 100 mg daily.");
        let result = compare_numbers(&source, &ai, DomainType::Healthcare);
        assert_eq!(result.status, ComparisonStatus::Fail);
        assert!(result.critical_mismatches >= 1);
    }

    #[test]
    fn identical_text_matches_perfectly() {
        let text = "Patient weight is 70 kg and BP 120/80 mmHg.";
        let source = extract_numbers(text);
        let ai = extract_numbers(text);
        let result = compare_numbers(&source, &ai, DomainType::Healthcare);
        assert_eq!(result.status, ComparisonStatus::Pass);
        assert!(result.ungrounded.is_empty());
    }
}
