// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Semantic-entropy engine (C5).
//!
//! Samples `n` completions for the same prompt, clusters them under the
//! bidirectional-entailment equivalence relation using [`UnionFind`], and
//! computes the Shannon entropy of the resulting cluster-size distribution.
//! High entropy across semantically distinct clusters is the signature of
//! confabulation: the model is not reliably saying the same thing twice.

#![cfg(feature = "async")]

use alloc::string::String;
use alloc::vec::Vec;

use crate::traits::{bidirectional_entails, NliPredictor};
use crate::types::{Cluster, Completion, EntropyDetail, EntropyInterpretation};
use crate::union_find::UnionFind;

/// Maximum number of concurrent NLI calls issued while clustering a batch
/// of completions. Bounds fan-out so a single entropy check cannot starve
/// the rest of the orchestrator's analyzer pool.
pub const MAX_CONCURRENT_NLI_CALLS: usize = 20;

/// Natural-log Shannon entropy of a cluster-size distribution, `-Σ pₖ ln pₖ`.
fn shannon_entropy(cluster_sizes: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    cluster_sizes
        .iter()
        .filter(|&&size| size > 0)
        .map(|&size| {
            let p = size as f64 / total as f64;
            -p * p.ln()
        })
        .sum()
}

fn interpret(semantic_entropy: f64) -> EntropyInterpretation {
    if semantic_entropy < 0.1 {
        EntropyInterpretation::Certain
    } else if semantic_entropy < 0.3 {
        EntropyInterpretation::LowUncertainty
    } else if semantic_entropy < 0.5 {
        EntropyInterpretation::ModerateUncertainty
    } else if semantic_entropy < 0.7 {
        EntropyInterpretation::HighUncertainty
    } else {
        EntropyInterpretation::ConfabulationLikely
    }
}

/// Cluster `prompt_completions` under bidirectional entailment and compute
/// the semantic entropy of the resulting partition, then locate `ai_output`
/// against the already-built clusters.
///
/// `ai_output` never joins the union-find as a member: it is tested for
/// bidirectional entailment against each existing cluster's representative
/// to find which cluster (if any) it falls into, and it never contributes
/// to the completion count `N` the entropy is computed and normalized over.
///
/// Pairwise comparisons are batched `MAX_CONCURRENT_NLI_CALLS` at a time to
/// bound upstream concurrency; within a batch all calls run concurrently
/// via `futures::future::join_all`.
pub async fn compute_entropy(
    nli: &dyn NliPredictor,
    prompt_completions: Vec<String>,
    ai_output: &str,
    inference_time_ms: u64,
) -> EntropyDetail {
    let texts = prompt_completions;
    let n = texts.len();
    let mut uf = UnionFind::new(n);

    let mut pairs = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            pairs.push((i, j));
        }
    }

    for batch in pairs.chunks(MAX_CONCURRENT_NLI_CALLS) {
        let futures_iter = batch
            .iter()
            .map(|&(i, j)| bidirectional_entails(nli, &texts[i], &texts[j]));
        let results = futures::future::join_all(futures_iter).await;
        for (&(i, j), entails) in batch.iter().zip(results.iter()) {
            if *entails {
                uf.union(i, j);
            }
        }
    }

    let groups = uf.clusters();
    let mut cluster_sizes: Vec<usize> = Vec::new();
    let mut clusters: Vec<Cluster> = Vec::new();

    // Stable ordering: sort roots so output is deterministic across runs.
    let mut roots: Vec<usize> = groups.keys().copied().collect();
    roots.sort_unstable();

    for (cluster_id, root) in roots.iter().enumerate() {
        let members = &groups[root];
        cluster_sizes.push(members.len());
        let representative = texts[members[0]].clone();
        clusters.push(Cluster {
            id: cluster_id,
            size: members.len(),
            representative,
            member_indices: members.clone(),
        });
    }

    let mut ai_output_cluster: i64 = -1;
    for cluster in &clusters {
        if bidirectional_entails(nli, ai_output, &cluster.representative).await {
            ai_output_cluster = cluster.id as i64;
            break;
        }
    }

    let raw_entropy = shannon_entropy(&cluster_sizes, n);
    let max_entropy = if n > 1 { (n as f64).ln() } else { 1.0 };
    let semantic_entropy = if max_entropy > 0.0 { (raw_entropy / max_entropy).clamp(0.0, 1.0) } else { 0.0 };

    let ai_output_in_majority = clusters
        .iter()
        .max_by_key(|c| c.size)
        .map(|largest| largest.id as i64 == ai_output_cluster)
        .unwrap_or(false);

    let completions: Vec<Completion> = texts
        .iter()
        .enumerate()
        .map(|(index, text)| Completion { text: text.clone(), index })
        .collect();

    EntropyDetail {
        semantic_entropy,
        raw_entropy,
        num_clusters: clusters.len(),
        clusters,
        interpretation: interpret(semantic_entropy),
        ai_output_cluster,
        ai_output_in_majority,
        completions,
        inference_time_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::HeuristicNli;

    #[tokio::test]
    async fn identical_completions_form_a_single_cluster() {
        let nli = HeuristicNli;
        let completions = alloc::vec![
            String::from("The capital of France is Paris."),
            String::from("The capital of France is Paris."),
            String::from("The capital of France is Paris."),
        ];
        let detail = compute_entropy(&nli, completions, "The capital of France is Paris.", 10).await;
        assert_eq!(detail.num_clusters, 1);
        assert!(matches!(detail.interpretation, EntropyInterpretation::Certain));
        assert!(detail.ai_output_in_majority);
    }

    #[tokio::test]
    async fn contradictory_completions_form_multiple_clusters() {
        let nli = HeuristicNli;
        let completions = alloc::vec![
            String::from("The patient has diabetes."),
            String::from("The patient does not have diabetes."),
            String::from("The weather is sunny today."),
        ];
        let detail = compute_entropy(&nli, completions, "The patient has diabetes.", 10).await;
        assert!(detail.num_clusters >= 2);
    }
}
