//! The merge loop: grow the global frame until every scanner is placed.
//!
//! Each round runs in two phases. First every pending scanner is compared
//! against the same root snapshot and, if it overlaps, aligned to it (this
//! phase only reads shared state and may run in parallel). Then the aligned
//! scanners are merged into the root one at a time, and the root fingerprints
//! are rebuilt once before the next round.

use crate::{
    detect_overlap_with, solve_alignment, CorrespondenceMatcher, FingerprintMatcher,
    RegistrationError, RegistrationParams, ScannerSnapshot,
};
use beacon_map_core::{Alignment, Coordinate, Scanner, ScannerId};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Where a scanner ended up in the global frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannerPlacement {
    pub scanner: ScannerId,
    /// Maps the scanner's local frame into the global frame; its translation
    /// is the scanner origin in global coordinates.
    pub alignment: Alignment,
    /// Round in which the scanner was merged (0 for the root).
    pub round: usize,
}

/// Progress of a [`Registration`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistrationState {
    /// Scanners still waiting to be merged.
    Pending(Vec<ScannerId>),
    Done,
}

/// Final global frame.
#[derive(Clone, Debug)]
pub struct RegistrationResult {
    /// Root scanner holding every unique beacon in global coordinates.
    pub root: Scanner,
    /// Placements in merge order, root first.
    pub placements: Vec<ScannerPlacement>,
    /// Number of merge rounds run.
    pub rounds: usize,
}

impl RegistrationResult {
    /// Number of unique beacons in the global frame.
    pub fn beacon_count(&self) -> usize {
        self.root.len()
    }

    /// Global beacon positions in ascending order.
    pub fn sorted_beacons(&self) -> Vec<Coordinate> {
        let mut beacons: Vec<Coordinate> = self.root.positions().collect();
        beacons.sort_unstable();
        beacons
    }

    pub fn placement(&self, scanner: ScannerId) -> Option<&ScannerPlacement> {
        self.placements.iter().find(|p| p.scanner == scanner)
    }
}

/// Registration of a set of scanners into the frame of the first one.
pub struct Registration<M = FingerprintMatcher> {
    params: RegistrationParams,
    matcher: M,
    root: ScannerSnapshot,
    pending: Vec<ScannerSnapshot>,
    placements: Vec<ScannerPlacement>,
    rounds: usize,
}

impl Registration<FingerprintMatcher> {
    /// Start a registration; the first scanner becomes the root.
    pub fn new(
        scanners: Vec<Scanner>,
        params: RegistrationParams,
    ) -> Result<Self, RegistrationError> {
        let matcher = FingerprintMatcher::from_params(&params);
        Self::with_matcher(scanners, params, matcher)
    }
}

impl<M: CorrespondenceMatcher> Registration<M> {
    pub fn with_matcher(
        scanners: Vec<Scanner>,
        params: RegistrationParams,
        matcher: M,
    ) -> Result<Self, RegistrationError> {
        params.validate()?;
        let mut scanners = scanners.into_iter();
        let root = scanners.next().ok_or(RegistrationError::NoScanners)?;
        let placements = vec![ScannerPlacement {
            scanner: root.id(),
            alignment: Alignment::IDENTITY,
            round: 0,
        }];
        Ok(Self {
            params,
            matcher,
            root: ScannerSnapshot::new(root),
            pending: scanners.map(ScannerSnapshot::new).collect(),
            placements,
            rounds: 0,
        })
    }

    pub fn state(&self) -> RegistrationState {
        if self.pending.is_empty() {
            RegistrationState::Done
        } else {
            RegistrationState::Pending(self.pending.iter().map(|s| s.id()).collect())
        }
    }

    pub fn root(&self) -> &Scanner {
        self.root.scanner()
    }

    pub fn placements(&self) -> &[ScannerPlacement] {
        &self.placements
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Run one round; returns the number of scanners merged.
    ///
    /// A round over a non-empty pending set that merges nothing fails with
    /// [`RegistrationError::Stalled`]. On [`RegistrationError::AmbiguousAlignment`]
    /// nothing from the round is merged.
    #[cfg_attr(
        feature = "tracing",
        instrument(
            level = "info",
            skip(self),
            fields(round = self.rounds + 1, pending = self.pending.len())
        )
    )]
    pub fn step(&mut self) -> Result<usize, RegistrationError> {
        if self.pending.is_empty() {
            return Ok(0);
        }
        let round = self.rounds + 1;

        let found = self
            .detect_all()
            .into_iter()
            .collect::<Result<Vec<Option<Alignment>>, RegistrationError>>()?;
        self.rounds = round;

        if found.iter().all(Option::is_none) {
            return Err(RegistrationError::Stalled {
                rounds: round,
                pending: self.pending.iter().map(|s| s.id()).collect(),
            });
        }

        let mut merges = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for (candidate, alignment) in self.pending.drain(..).zip(found) {
            match alignment {
                Some(alignment) => merges.push((candidate.into_scanner(), alignment)),
                None => still_pending.push(candidate),
            }
        }
        self.pending = still_pending;
        let merged = merges.len();

        let placements = &mut self.placements;
        self.root.update(|root| {
            for (scanner, alignment) in merges {
                let id = scanner.id();
                info!(
                    "merging scanner {id} (rotation index={}, delta={})",
                    alignment.rotation.index(),
                    alignment.translation
                );
                let added = root.absorb(scanner, &alignment);
                debug!("scanner {id} added {added} new beacons, global frame has {}", root.len());
                placements.push(ScannerPlacement {
                    scanner: id,
                    alignment,
                    round,
                });
            }
        });

        debug!(
            "round {round}: merged {merged}, {} pending, {} beacons",
            self.pending.len(),
            self.root.scanner().len()
        );
        Ok(merged)
    }

    /// Run rounds until every scanner is merged.
    pub fn run(mut self) -> Result<RegistrationResult, RegistrationError> {
        while !self.pending.is_empty() {
            self.step()?;
        }
        info!(
            "registered {} scanners in {} round(s): {} unique beacons",
            self.placements.len(),
            self.rounds,
            self.root.scanner().len()
        );
        Ok(RegistrationResult {
            root: self.root.into_scanner(),
            placements: self.placements,
            rounds: self.rounds,
        })
    }

    fn detect_one(
        &self,
        candidate: &ScannerSnapshot,
    ) -> Result<Option<Alignment>, RegistrationError> {
        let overlap = detect_overlap_with(
            &self.matcher,
            &self.root,
            candidate,
            self.params.min_shared_beacons,
        );
        if !overlap.overlaps {
            return Ok(None);
        }
        solve_alignment(&overlap.pairs)
            .map(Some)
            .map_err(|source| RegistrationError::AmbiguousAlignment {
                scanner: candidate.id(),
                source,
            })
    }

    #[cfg(feature = "rayon")]
    fn detect_all(&self) -> Vec<Result<Option<Alignment>, RegistrationError>> {
        use rayon::prelude::*;

        if self.params.parallel {
            self.pending.par_iter().map(|c| self.detect_one(c)).collect()
        } else {
            self.pending.iter().map(|c| self.detect_one(c)).collect()
        }
    }

    #[cfg(not(feature = "rayon"))]
    fn detect_all(&self) -> Vec<Result<Option<Alignment>, RegistrationError>> {
        self.pending.iter().map(|c| self.detect_one(c)).collect()
    }
}

/// Register `scanners` into the frame of the first one with the fingerprint
/// matcher.
pub fn register(
    scanners: Vec<Scanner>,
    params: RegistrationParams,
) -> Result<RegistrationResult, RegistrationError> {
    Registration::new(scanners, params)?.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{local_view, synthetic_cloud};
    use crate::{AlignmentError, BeaconPair};
    use beacon_map_core::Rotation;

    fn placed(rotation: usize, translation: Coordinate) -> Alignment {
        Alignment {
            rotation: Rotation::from_index(rotation).unwrap(),
            translation,
        }
    }

    /// Three scanners in a chain: 0 and 2 only meet through 1.
    fn chain() -> (Vec<Coordinate>, Vec<Scanner>, [Alignment; 2]) {
        let world = synthetic_cloud(40, 19);
        let p1 = placed(14, Coordinate::new(68, -1246, -43));
        let p2 = placed(9, Coordinate::new(1105, -1205, 1229));
        let scanners = vec![
            Scanner::with_beacons(0, world[0..20].iter().copied()),
            local_view(1, &world[8..28], &p1),
            local_view(2, &world[16..36], &p2),
        ];
        (world, scanners, [p1, p2])
    }

    #[test]
    fn chain_converges_to_world_cloud() {
        let (world, scanners, [p1, p2]) = chain();
        let result = register(scanners, RegistrationParams::default()).unwrap();

        assert_eq!(result.beacon_count(), 36);
        assert_eq!(result.rounds, 2);
        let mut expected = world[0..36].to_vec();
        expected.sort_unstable();
        assert_eq!(result.sorted_beacons(), expected);

        assert_eq!(result.placement(0).unwrap().alignment, Alignment::IDENTITY);
        assert_eq!(result.placement(1).unwrap().alignment, p1);
        assert_eq!(result.placement(1).unwrap().round, 1);
        assert_eq!(result.placement(2).unwrap().alignment, p2);
        assert_eq!(result.placement(2).unwrap().round, 2);
    }

    #[test]
    fn step_reports_state_transitions() {
        let (_, scanners, _) = chain();
        let mut reg = Registration::new(scanners, RegistrationParams::default()).unwrap();
        assert_eq!(reg.state(), RegistrationState::Pending(vec![1, 2]));
        assert_eq!(reg.step(), Ok(1));
        assert_eq!(reg.state(), RegistrationState::Pending(vec![2]));
        assert_eq!(reg.root().len(), 28);
        assert_eq!(reg.step(), Ok(1));
        assert_eq!(reg.state(), RegistrationState::Done);
        assert_eq!(reg.step(), Ok(0));
        assert_eq!(reg.rounds(), 2);
    }

    #[test]
    fn remerging_a_scanner_keeps_the_count() {
        let (_, scanners, _) = chain();
        let again = scanners[1].clone();
        let mut result = register(scanners, RegistrationParams::default()).unwrap();
        let before = result.beacon_count();
        let alignment = result.placement(1).unwrap().alignment;
        assert_eq!(result.root.absorb(again, &alignment), 0);
        assert_eq!(result.beacon_count(), before);
    }

    #[test]
    fn serial_and_parallel_runs_agree() {
        let (_, scanners, _) = chain();
        let serial = register(
            scanners.clone(),
            RegistrationParams {
                parallel: false,
                ..RegistrationParams::default()
            },
        )
        .unwrap();
        let parallel = register(scanners, RegistrationParams::default()).unwrap();
        assert_eq!(serial.root, parallel.root);
        assert_eq!(serial.placements, parallel.placements);
    }

    #[test]
    fn disconnected_scanners_stall() {
        let scanners = vec![
            Scanner::with_beacons(0, synthetic_cloud(15, 19)),
            Scanner::with_beacons(7, synthetic_cloud(15, 7)),
        ];
        let err = register(scanners, RegistrationParams::default()).unwrap_err();
        assert_eq!(
            err,
            RegistrationError::Stalled {
                rounds: 1,
                pending: vec![7]
            }
        );
    }

    #[test]
    fn partial_progress_then_stall() {
        let (_, mut scanners, _) = chain();
        scanners.push(Scanner::with_beacons(9, synthetic_cloud(20, 99)));
        let mut reg = Registration::new(scanners, RegistrationParams::default()).unwrap();
        assert_eq!(reg.step(), Ok(1));
        assert_eq!(reg.step(), Ok(1));
        assert_eq!(
            reg.step(),
            Err(RegistrationError::Stalled {
                rounds: 3,
                pending: vec![9]
            })
        );
    }

    #[test]
    fn single_scanner_is_already_done() {
        let cloud = synthetic_cloud(5, 1);
        let result = register(
            vec![Scanner::with_beacons(4, cloud.iter().copied())],
            RegistrationParams::default(),
        )
        .unwrap();
        assert_eq!(result.beacon_count(), 5);
        assert_eq!(result.rounds, 0);
        assert_eq!(result.placements.len(), 1);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            Registration::new(Vec::new(), RegistrationParams::default()),
            Err(RegistrationError::NoScanners)
        ));
    }

    #[test]
    fn far_apart_scanners_register() {
        // The offset between the two origins is 4.2e9, beyond i32.
        let world = synthetic_cloud(20, 19);
        let root_origin = Coordinate::new(-2_100_000_000, 0, 0);
        let far = placed(14, Coordinate::new(2_100_000_000, 0, 0));
        let scanners = vec![
            Scanner::with_beacons(0, world.iter().map(|&w| w - root_origin)),
            local_view(1, &world, &far),
        ];

        let result = register(scanners, RegistrationParams::default()).unwrap();
        assert_eq!(result.beacon_count(), 20);
        let mut expected: Vec<Coordinate> = world.iter().map(|&w| w - root_origin).collect();
        expected.sort_unstable();
        assert_eq!(result.sorted_beacons(), expected);

        let alignment = result.placement(1).unwrap().alignment;
        assert_eq!(alignment.rotation.index(), 14);
        assert_eq!(alignment.translation, far.translation - root_origin);
    }

    #[test]
    fn too_small_shared_beacon_threshold_is_rejected() {
        let (_, scanners, _) = chain();
        let params = RegistrationParams {
            min_shared_beacons: 1,
            ..RegistrationParams::default()
        };
        assert!(matches!(
            Registration::new(scanners, params),
            Err(RegistrationError::InvalidSharedBeacons {
                min_shared_beacons: 1
            })
        ));
    }

    #[test]
    fn placement_serializes_rotation_by_index() {
        let placement = ScannerPlacement {
            scanner: 3,
            alignment: placed(9, Coordinate::new(1105, -1205, 1229)),
            round: 2,
        };
        let json = serde_json::to_value(placement).unwrap();
        assert_eq!(json["alignment"]["rotation"], 9);
        assert_eq!(json["alignment"]["translation"]["x"], 1105);
        let back: ScannerPlacement = serde_json::from_value(json).unwrap();
        assert_eq!(back, placement);
    }

    #[test]
    fn ambiguous_alignment_aborts() {
        // Claims every beacon matches the origin: the two reference pairs
        // share a left point and cannot fix a rotation.
        struct EverythingAtOrigin;
        impl CorrespondenceMatcher for EverythingAtOrigin {
            fn match_beacons(&self, left: &ScannerSnapshot, right: &ScannerSnapshot) -> Vec<BeaconPair> {
                let l = left.scanner().beacons()[0];
                right
                    .scanner()
                    .beacons()
                    .iter()
                    .map(|r| BeaconPair { left: l, right: *r })
                    .collect()
            }
        }

        let scanners = vec![
            Scanner::with_beacons(0, [Coordinate::ZERO]),
            Scanner::with_beacons(
                3,
                [Coordinate::new(1, 2, 3), Coordinate::new(4, 5, 6)],
            ),
        ];
        let params = RegistrationParams {
            min_shared_beacons: 2,
            ..RegistrationParams::default()
        };
        let err = Registration::with_matcher(scanners, params, EverythingAtOrigin)
            .unwrap()
            .run()
            .unwrap_err();
        assert_eq!(
            err,
            RegistrationError::AmbiguousAlignment {
                scanner: 3,
                source: AlignmentError::NoConsistentRotation,
            }
        );
    }
}
