//! Shared-beacon detection between two scanners.
//!
//! Beacons are matched through their distance fingerprints: `L` (left
//! scanner) and `R` (right scanner) are taken to be the same physical beacon
//! when at least `min_neighbor_matches` of their neighbour triples coincide.
//!
//! This is a counting heuristic, not a proof of correspondence. It relies on
//! the input having no coincidental distance collisions (exact integer
//! positions spread over a large volume), and is not hardened against
//! adversarial data. [`CorrespondenceMatcher`] keeps it swappable.

use crate::RegistrationParams;
use beacon_map_core::{BeaconReport, Fingerprint, Scanner, ScannerId};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A scanner together with the fingerprints of its current beacon set.
///
/// The snapshot owns both, so fingerprints cannot outlive the beacon set they
/// were computed from: every change to the beacons goes through
/// [`ScannerSnapshot::update`], which recomputes them.
#[derive(Clone, Debug)]
pub struct ScannerSnapshot {
    scanner: Scanner,
    fingerprints: Vec<Fingerprint>,
}

impl ScannerSnapshot {
    pub fn new(scanner: Scanner) -> Self {
        let fingerprints = scanner.fingerprints();
        Self {
            scanner,
            fingerprints,
        }
    }

    pub fn scanner(&self) -> &Scanner {
        &self.scanner
    }

    pub fn id(&self) -> ScannerId {
        self.scanner.id()
    }

    pub fn fingerprints(&self) -> &[Fingerprint] {
        &self.fingerprints
    }

    /// Mutate the beacon set, then recompute all fingerprints.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut Scanner) -> R) -> R {
        let out = f(&mut self.scanner);
        self.fingerprints = self.scanner.fingerprints();
        out
    }

    pub fn into_scanner(self) -> Scanner {
        self.scanner
    }

    /// Beacons paired with their fingerprints.
    pub fn iter(&self) -> impl Iterator<Item = (&BeaconReport, &Fingerprint)> {
        self.scanner.beacons().iter().zip(&self.fingerprints)
    }
}

/// Two reports of what is taken to be the same physical beacon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeaconPair {
    /// Report in the left (reference) scanner's frame.
    pub left: BeaconReport,
    /// Report in the right (candidate) scanner's frame.
    pub right: BeaconReport,
}

/// Strategy producing beacon correspondences between two scanners.
pub trait CorrespondenceMatcher: Sync {
    /// Candidate pairs, ordered by left beacon, then right beacon.
    fn match_beacons(&self, left: &ScannerSnapshot, right: &ScannerSnapshot) -> Vec<BeaconPair>;
}

/// Pairs beacons whose fingerprints share enough neighbour triples.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FingerprintMatcher {
    pub min_neighbor_matches: usize,
}

impl FingerprintMatcher {
    pub fn from_params(params: &RegistrationParams) -> Self {
        Self {
            min_neighbor_matches: params.min_neighbor_matches,
        }
    }
}

impl Default for FingerprintMatcher {
    fn default() -> Self {
        Self::from_params(&RegistrationParams::default())
    }
}

impl CorrespondenceMatcher for FingerprintMatcher {
    fn match_beacons(&self, left: &ScannerSnapshot, right: &ScannerSnapshot) -> Vec<BeaconPair> {
        let mut pairs = Vec::new();
        for (l, lfp) in left.iter() {
            for (r, rfp) in right.iter() {
                let matches = lfp.neighbor_matches(rfp);
                if matches >= self.min_neighbor_matches {
                    log::trace!("beacon {l} matches {r} ({matches} shared neighbours)");
                    pairs.push(BeaconPair {
                        left: *l,
                        right: *r,
                    });
                }
            }
        }
        pairs
    }
}

/// Outcome of comparing two scanners.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Overlap {
    pub overlaps: bool,
    pub pairs: Vec<BeaconPair>,
}

/// Compare `left` and `right` with an arbitrary matcher.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip_all, fields(left = left.id(), right = right.id()))
)]
pub fn detect_overlap_with<M: CorrespondenceMatcher + ?Sized>(
    matcher: &M,
    left: &ScannerSnapshot,
    right: &ScannerSnapshot,
    min_shared_beacons: usize,
) -> Overlap {
    let pairs = matcher.match_beacons(left, right);
    let overlaps = pairs.len() >= min_shared_beacons;
    if overlaps {
        log::debug!(
            "scanners {} and {} share {} beacons",
            left.id(),
            right.id(),
            pairs.len()
        );
    }
    Overlap { overlaps, pairs }
}

/// Compare `left` and `right` with the fingerprint matcher.
pub fn detect_overlap(
    left: &ScannerSnapshot,
    right: &ScannerSnapshot,
    params: &RegistrationParams,
) -> Overlap {
    detect_overlap_with(
        &FingerprintMatcher::from_params(params),
        left,
        right,
        params.min_shared_beacons,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{local_view, synthetic_cloud};
    use beacon_map_core::{Alignment, Coordinate, Rotation};

    fn placed(rotation: usize, translation: Coordinate) -> Alignment {
        Alignment {
            rotation: Rotation::from_index(rotation).unwrap(),
            translation,
        }
    }

    #[test]
    fn finds_twelve_pairs_for_twelve_shared_beacons() {
        let world = synthetic_cloud(40, 19);
        let a = ScannerSnapshot::new(Scanner::with_beacons(0, world[0..20].iter().copied()));
        let b = ScannerSnapshot::new(local_view(
            1,
            &world[8..28],
            &placed(14, Coordinate::new(68, -1246, -43)),
        ));

        let overlap = detect_overlap(&a, &b, &RegistrationParams::default());
        assert!(overlap.overlaps);
        assert_eq!(overlap.pairs.len(), 12);
        assert!(overlap.pairs.iter().all(|p| p.left.scanner == 0 && p.right.scanner == 1));
        // Left positions are world positions 8..20, in left order.
        let lefts: Vec<Coordinate> = overlap.pairs.iter().map(|p| p.left.position).collect();
        assert_eq!(lefts, world[8..20].to_vec());
    }

    #[test]
    fn overlap_is_symmetric() {
        let world = synthetic_cloud(40, 19);
        let params = RegistrationParams::default();
        let s0 = ScannerSnapshot::new(Scanner::with_beacons(0, world[0..20].iter().copied()));
        let s1 = ScannerSnapshot::new(local_view(
            1,
            &world[8..28],
            &placed(14, Coordinate::new(68, -1246, -43)),
        ));
        let s2 = ScannerSnapshot::new(local_view(
            2,
            &world[16..36],
            &placed(9, Coordinate::new(1105, -1205, 1229)),
        ));

        for (a, b) in [(&s0, &s1), (&s0, &s2), (&s1, &s2)] {
            let ab = detect_overlap(a, b, &params);
            let ba = detect_overlap(b, a, &params);
            assert_eq!(ab.overlaps, ba.overlaps);
            assert_eq!(ab.pairs.len(), ba.pairs.len());
        }
        assert!(!detect_overlap(&s0, &s2, &params).overlaps);
    }

    #[test]
    fn unrelated_scanners_do_not_overlap() {
        let a = ScannerSnapshot::new(Scanner::with_beacons(0, synthetic_cloud(15, 19)));
        let b = ScannerSnapshot::new(Scanner::with_beacons(1, synthetic_cloud(15, 7)));
        let overlap = detect_overlap(&a, &b, &RegistrationParams::default());
        assert!(!overlap.overlaps);
        assert!(overlap.pairs.len() < 12);
    }

    #[test]
    fn custom_matcher_replaces_fingerprints() {
        struct SamePosition;
        impl CorrespondenceMatcher for SamePosition {
            fn match_beacons(&self, left: &ScannerSnapshot, right: &ScannerSnapshot) -> Vec<BeaconPair> {
                let mut out = Vec::new();
                for l in left.scanner().beacons() {
                    for r in right.scanner().beacons() {
                        if l.position == r.position {
                            out.push(BeaconPair { left: *l, right: *r });
                        }
                    }
                }
                out
            }
        }

        let cloud = synthetic_cloud(3, 5);
        let a = ScannerSnapshot::new(Scanner::with_beacons(0, cloud.iter().copied()));
        let b = ScannerSnapshot::new(Scanner::with_beacons(1, cloud.iter().copied()));
        let overlap = detect_overlap_with(&SamePosition, &a, &b, 3);
        assert!(overlap.overlaps);
        assert_eq!(overlap.pairs.len(), 3);
    }
}
