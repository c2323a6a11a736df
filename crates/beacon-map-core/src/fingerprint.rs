//! Rotation- and translation-invariant beacon signatures.
//!
//! A beacon's fingerprint is the multiset of sorted per-axis distances
//! `(|Δx|, |Δy|, |Δz|)` to every other beacon of the same scanner. Since the
//! 24 scanner orientations only permute and negate axes, two scanners seeing
//! the same beacon produce overlapping fingerprints for it, no matter how they
//! are oriented.
//!
//! Fingerprints describe one snapshot of a beacon set. Any change to the set
//! (a merge) requires recomputing them.

use crate::{Coordinate, Scanner};
use std::collections::HashMap;

/// Sorted per-axis absolute difference between two beacons.
pub type DistanceTriple = [u32; 3];

/// Multiset of distance triples from one beacon to its scanner neighbours.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fingerprint {
    counts: HashMap<DistanceTriple, u32>,
    neighbors: usize,
}

impl Fingerprint {
    /// Fingerprint of `center` against `neighbors` (which must not contain
    /// `center` itself).
    pub fn from_neighbors(
        center: Coordinate,
        neighbors: impl IntoIterator<Item = Coordinate>,
    ) -> Self {
        let mut fp = Fingerprint::default();
        for n in neighbors {
            fp.insert(center.sorted_abs_diff(n));
        }
        fp
    }

    fn insert(&mut self, triple: DistanceTriple) {
        *self.counts.entry(triple).or_insert(0) += 1;
        self.neighbors += 1;
    }

    /// Number of neighbours the fingerprint was built from.
    pub fn len(&self) -> usize {
        self.neighbors
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors == 0
    }

    /// How many neighbours produced `triple`.
    pub fn count(&self, triple: &DistanceTriple) -> u32 {
        self.counts.get(triple).copied().unwrap_or(0)
    }

    /// Distinct triples with their multiplicities.
    pub fn iter(&self) -> impl Iterator<Item = (&DistanceTriple, u32)> {
        self.counts.iter().map(|(t, &n)| (t, n))
    }

    /// Number of (neighbour of `self`, neighbour of `other`) pairs whose
    /// triples are equal.
    ///
    /// Each equal pair counts on its own: a triple seen twice here and three
    /// times in `other` contributes six.
    pub fn neighbor_matches(&self, other: &Fingerprint) -> usize {
        let (small, large) = if self.counts.len() <= other.counts.len() {
            (self, other)
        } else {
            (other, self)
        };
        small
            .counts
            .iter()
            .map(|(t, &n)| n as usize * large.count(t) as usize)
            .sum()
    }
}

/// Fingerprints for every position in `positions`, in the same order.
pub fn fingerprint_positions(positions: &[Coordinate]) -> Vec<Fingerprint> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &center)| {
            let neighbors = positions
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, &p)| p);
            Fingerprint::from_neighbors(center, neighbors)
        })
        .collect()
}

/// Fingerprints of a scanner's current beacon set, indexed like its beacons.
pub fn fingerprint(scanner: &Scanner) -> Vec<Fingerprint> {
    scanner.fingerprints()
}
