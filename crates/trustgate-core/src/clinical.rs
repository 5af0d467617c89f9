// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Clinical-domain text preprocessing used by the claim extractor (C6) when
//! `domain == Healthcare` or `Pharma`.
//!
//! Abbreviation expansion and sentence-boundary handling are tuned for
//! clinical prose, where a plain `. ` split mangles things like "Pt has
//! hx of T2DM, BP 120/80 mmHg q.d." into nonsense fragments.

#![cfg(feature = "std")]

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Clinical shorthand expanded before sentence splitting so downstream
/// regex-based claim/number extraction sees full words instead of
/// ambiguous abbreviations.
static CLINICAL_EXPANSIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        // Frequency
        ("q.d.", "once daily"),
        ("qd", "once daily"),
        ("b.i.d.", "twice daily"),
        ("bid", "twice daily"),
        ("t.i.d.", "three times daily"),
        ("tid", "three times daily"),
        ("q.i.d.", "four times daily"),
        ("qid", "four times daily"),
        ("q.h.s.", "at bedtime"),
        ("qhs", "at bedtime"),
        ("prn", "as needed"),
        ("p.r.n.", "as needed"),
        // Route
        ("p.o.", "by mouth"),
        ("po", "by mouth"),
        ("i.v.", "intravenous"),
        ("iv", "intravenous"),
        ("i.m.", "intramuscular"),
        ("im", "intramuscular"),
        ("s.c.", "subcutaneous"),
        ("subq", "subcutaneous"),
        // Common clinical
        ("pt", "patient"),
        ("pts", "patients"),
        ("dx", "diagnosis"),
        ("tx", "treatment"),
        ("hx", "history"),
        ("sx", "symptoms"),
        ("rx", "prescription"),
        ("f/u", "follow-up"),
        ("w/", "with"),
        ("w/o", "without"),
        ("c/o", "complains of"),
        ("r/o", "rule out"),
        // History / conditions
        ("t2dm", "type 2 diabetes mellitus"),
        ("t1dm", "type 1 diabetes mellitus"),
        ("htn", "hypertension"),
        ("cad", "coronary artery disease"),
        ("chf", "congestive heart failure"),
        ("copd", "chronic obstructive pulmonary disease"),
        ("ckd", "chronic kidney disease"),
        ("afib", "atrial fibrillation"),
        ("mi", "myocardial infarction"),
        ("cva", "cerebrovascular accident"),
        // Procedures
        ("ecg", "electrocardiogram"),
        ("ekg", "electrocardiogram"),
        ("cbc", "complete blood count"),
        ("bmp", "basic metabolic panel"),
        ("cxr", "chest x-ray"),
        ("ct", "computed tomography"),
        ("mri", "magnetic resonance imaging"),
        // Locations
        ("ed", "emergency department"),
        ("er", "emergency room"),
        ("icu", "intensive care unit"),
        ("or", "operating room"),
    ])
});

static NON_SENTENCE_ENDINGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(dr|mr|mrs|ms|vs|etc|approx|e\.g|i\.e|no|fig)\.\s*$").unwrap()
});

/// Maximum tokens per chunk when splitting a long clinical document for
/// relevant-chunk lookup, with overlap to avoid losing context at chunk
/// boundaries.
pub const CHUNK_MAX_TOKENS: usize = 400;
pub const CHUNK_OVERLAP_TOKENS: usize = 50;

/// Expand recognized clinical abbreviations to full words. Case-insensitive
/// whole-word match; longer tokens (with periods) are tried before bare
/// short forms so "q.d." isn't partially matched by a "q" rule that
/// doesn't exist but would otherwise shadow longer entries.
pub fn expand_abbreviations(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);
    for word in text.split_inclusive(char::is_whitespace) {
        let trimmed_end = word.trim_end();
        let trailing_ws = &word[trimmed_end.len()..];
        let lower = trimmed_end.to_ascii_lowercase();
        let bare = lower.trim_end_matches(|c: char| c == ',' || c == ';' || c == ':');
        if let Some(expansion) = CLINICAL_EXPANSIONS.get(bare) {
            result.push_str(expansion);
            result.push_str(&trimmed_end[bare.len()..]);
        } else {
            result.push_str(trimmed_end);
        }
        result.push_str(trailing_ws);
    }
    result
}

/// Split clinical text into sentences, treating a period as a sentence
/// boundary only when it is not immediately preceded by a recognized
/// abbreviation (`Dr.`, `vs.`, `e.g.`, ...) and is followed by whitespace
/// and an uppercase letter or end of text.
pub fn split_clinical_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = text.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        current.push(ch);
        if ch == '.' || ch == '?' || ch == '!' {
            let prefix_is_abbrev = NON_SENTENCE_ENDINGS.is_match(&current);
            let next_is_boundary = match chars.get(i + 1) {
                None => true,
                Some(&next) if next.is_whitespace() => {
                    let next_non_ws = chars[i + 1..].iter().find(|c| !c.is_whitespace());
                    match next_non_ws {
                        None => true,
                        Some(c) => c.is_uppercase() || c.is_numeric(),
                    }
                }
                _ => false,
            };
            if !prefix_is_abbrev && next_is_boundary {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    sentences.push(trimmed);
                }
                current = String::new();
            }
        }
    }
    let trailing = current.trim();
    if !trailing.is_empty() {
        sentences.push(trailing.to_string());
    }
    sentences
}

/// Split `text` into token-count-bounded, overlapping chunks (word count
/// used as a token proxy). Used to bound context passed to per-claim
/// verification on long source documents.
pub fn chunk_context(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + CHUNK_MAX_TOKENS).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end == words.len() {
            break;
        }
        start = end.saturating_sub(CHUNK_OVERLAP_TOKENS);
    }
    chunks
}

pub(crate) const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "of", "to", "in", "on", "at", "for", "and", "or", "is", "was", "are",
    "were", "be", "been", "with", "by", "as", "that", "this", "it", "has", "have", "had",
];

/// Pick the chunk with the highest stop-word-filtered token overlap with
/// `claim_text`. Returns the whole document joined back together if no
/// chunk overlaps at all (better than dropping context entirely).
pub fn find_relevant_chunk<'a>(chunks: &'a [String], claim_text: &str) -> Option<&'a str> {
    let claim_tokens: std::collections::HashSet<String> = claim_text
        .to_ascii_lowercase()
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w))
        .map(String::from)
        .collect();

    chunks
        .iter()
        .map(|chunk| {
            let chunk_tokens: std::collections::HashSet<String> = chunk
                .to_ascii_lowercase()
                .split_whitespace()
                .filter(|w| !STOP_WORDS.contains(w))
                .map(String::from)
                .collect();
            let overlap = claim_tokens.intersection(&chunk_tokens).count();
            (chunk.as_str(), overlap)
        })
        .max_by_key(|&(_, overlap)| overlap)
        .filter(|&(_, overlap)| overlap > 0)
        .map(|(chunk, _)| chunk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_common_abbreviations() {
        let expanded = expand_abbreviations("Pt has hx of T2DM, BP 120/80.");
        assert!(expanded.to_lowercase().contains("patient"));
        assert!(expanded.to_lowercase().contains("history"));
        assert!(expanded.to_lowercase().contains("type 2 diabetes mellitus"));
    }

    #[test]
    fn does_not_split_on_abbreviation_period() {
        let sentences = split_clinical_sentences("Seen by Dr. Smith today. Pt stable.");
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].contains("Dr. Smith"));
    }

    #[test]
    fn chunks_respect_overlap() {
        let words: Vec<String> = (0..1000).map(|i| i.to_string()).collect();
        let text = words.join(" ");
        let chunks = chunk_context(&text);
        assert!(chunks.len() > 1);
    }

    #[test]
    fn finds_best_overlapping_chunk() {
        let chunks = alloc_vec_strings(&["unrelated filler text here", "patient has type 2 diabetes mellitus"]);
        let best = find_relevant_chunk(&chunks, "the patient has diabetes").unwrap();
        assert!(best.contains("diabetes"));
    }

    fn alloc_vec_strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }
}
