//! Scanners and the beacon reports they own.

use crate::{Alignment, Coordinate, Fingerprint};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

pub type ScannerId = u32;

/// A single beacon observation, expressed in the frame of the scanner that
/// reported it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeaconReport {
    pub scanner: ScannerId,
    pub position: Coordinate,
}

impl fmt::Display for BeaconReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{} {}", self.scanner, self.position)
    }
}

/// A scanner and the beacons it reports, all in one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scanner {
    id: ScannerId,
    beacons: Vec<BeaconReport>,
}

impl Scanner {
    pub fn new(id: ScannerId) -> Self {
        Self {
            id,
            beacons: Vec::new(),
        }
    }

    /// Build a scanner from positions in its local frame, keeping their order.
    pub fn with_beacons(id: ScannerId, positions: impl IntoIterator<Item = Coordinate>) -> Self {
        let mut scanner = Scanner::new(id);
        for position in positions {
            scanner.push(position);
        }
        scanner
    }

    pub fn id(&self) -> ScannerId {
        self.id
    }

    pub fn beacons(&self) -> &[BeaconReport] {
        &self.beacons
    }

    pub fn positions(&self) -> impl ExactSizeIterator<Item = Coordinate> + '_ {
        self.beacons.iter().map(|b| b.position)
    }

    pub fn len(&self) -> usize {
        self.beacons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beacons.is_empty()
    }

    pub fn push(&mut self, position: Coordinate) {
        self.beacons.push(BeaconReport {
            scanner: self.id,
            position,
        });
    }

    pub fn contains(&self, position: Coordinate) -> bool {
        self.beacons.iter().any(|b| b.position == position)
    }

    /// Add every position not already reported; returns how many were new.
    ///
    /// Duplicates inside `positions` are inserted once.
    pub fn merge_positions(&mut self, positions: impl IntoIterator<Item = Coordinate>) -> usize {
        let mut known: HashSet<Coordinate> = self.positions().collect();
        let before = self.beacons.len();
        for position in positions {
            if known.insert(position) {
                self.push(position);
            }
        }
        self.beacons.len() - before
    }

    /// Consume `other`, re-express its beacons with `alignment` (other's frame
    /// into this one) and merge them. Returns the number of new beacons.
    pub fn absorb(&mut self, other: Scanner, alignment: &Alignment) -> usize {
        self.merge_positions(other.transformed(alignment))
    }

    /// This scanner's beacon positions mapped through `alignment`.
    pub fn transformed(&self, alignment: &Alignment) -> Vec<Coordinate> {
        self.positions().map(|p| alignment.map(p)).collect()
    }

    /// Distance fingerprints of the current beacon set, indexed like
    /// [`Scanner::beacons`].
    pub fn fingerprints(&self) -> Vec<Fingerprint> {
        crate::fingerprint::fingerprint_positions(&self.positions().collect::<Vec<_>>())
    }
}

impl fmt::Display for Scanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}
