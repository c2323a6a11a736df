//! Core integer geometry for beacon registration.
//!
//! This crate is deliberately small and purely geometric: coordinates, the
//! 24 axis-aligned rotations, scanner beacon sets and the distance
//! fingerprints used to find shared beacons. Matching and the merge loop live
//! in `beacon-map-registration`.

mod coordinate;
mod fingerprint;
mod logger;
mod rotation;
mod scanner;

pub use coordinate::Coordinate;
pub use fingerprint::{fingerprint, fingerprint_positions, DistanceTriple, Fingerprint};
pub use rotation::{Alignment, AxisMap, InvalidRotationIndex, Rotation, AXIS_MAPS_24};
pub use scanner::{BeaconReport, Scanner, ScannerId};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
