// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 MuVeraAI Corporation

//! Disjoint-set forest with path compression and union by rank.
//!
//! Used by the semantic-entropy engine (C5) to cluster sampled completions
//! under the bidirectional-entailment equivalence relation: two indices are
//! joined whenever an NLI call finds each direction entails the other.

use alloc::vec::Vec;
use hashbrown::HashMap;

/// A disjoint-set forest over integer indices `0..n`.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    /// Build a forest of `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: alloc::vec![0; n],
        }
    }

    /// Find the representative of `x`'s set, compressing the path traversed.
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut current = x;
        while self.parent[current] != root {
            let next = self.parent[current];
            self.parent[current] = root;
            current = next;
        }
        root
    }

    /// Merge the sets containing `x` and `y`, attaching the lower-rank root
    /// under the higher-rank one and breaking ties by incrementing rank.
    pub fn union(&mut self, x: usize, y: usize) {
        let root_x = self.find(x);
        let root_y = self.find(y);
        if root_x == root_y {
            return;
        }
        if self.rank[root_x] < self.rank[root_y] {
            self.parent[root_x] = root_y;
        } else if self.rank[root_x] > self.rank[root_y] {
            self.parent[root_y] = root_x;
        } else {
            self.parent[root_y] = root_x;
            self.rank[root_x] += 1;
        }
    }

    /// Group every index by its set's root, returning `{root: [members]}`
    /// with members in ascending insertion order.
    pub fn clusters(&mut self) -> HashMap<usize, Vec<usize>> {
        let n = self.parent.len();
        let mut groups: HashMap<usize, Vec<usize>> = HashMap::new();
        for index in 0..n {
            let root = self.find(index);
            groups.entry(root).or_insert_with(Vec::new).push(index);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singletons_stay_separate() {
        let mut uf = UnionFind::new(4);
        let clusters = uf.clusters();
        assert_eq!(clusters.len(), 4);
    }

    #[test]
    fn union_merges_sets() {
        let mut uf = UnionFind::new(5);
        uf.union(0, 1);
        uf.union(1, 2);
        assert_eq!(uf.find(0), uf.find(2));
        assert_ne!(uf.find(0), uf.find(3));
        let clusters = uf.clusters();
        assert_eq!(clusters.len(), 3);
    }

    #[test]
    fn union_is_idempotent() {
        let mut uf = UnionFind::new(3);
        uf.union(0, 1);
        uf.union(0, 1);
        uf.union(1, 0);
        assert_eq!(uf.find(0), uf.find(1));
    }

    #[test]
    fn partition_covers_every_index() {
        let mut uf = UnionFind::new(10);
        uf.union(0, 1);
        uf.union(2, 3);
        uf.union(3, 4);
        let clusters = uf.clusters();
        let total: usize = clusters.values().map(|members| members.len()).sum();
        assert_eq!(total, 10);
    }
}
