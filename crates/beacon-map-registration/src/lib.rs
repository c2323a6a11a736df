//! Registration of beacon scanners into one global frame.
//!
//! Pipeline per round:
//! - fingerprint matching between the global frame and each pending scanner
//!   ([`detect_overlap`]),
//! - exact discrete alignment from two beacon correspondences
//!   ([`solve_alignment`]),
//! - serialized merge of every aligned scanner into the global frame
//!   ([`Registration::step`]).
//!
//! Geometry types live in `beacon-map-core` and are re-exported here.

mod alignment;
mod error;
mod overlap;
mod params;
mod registration;

#[cfg(test)]
mod test_utils;

pub use alignment::solve_alignment;
pub use error::{AlignmentError, RegistrationError};
pub use overlap::{
    detect_overlap, detect_overlap_with, BeaconPair, CorrespondenceMatcher, FingerprintMatcher,
    Overlap, ScannerSnapshot,
};
pub use params::RegistrationParams;
pub use registration::{
    register, Registration, RegistrationResult, RegistrationState, ScannerPlacement,
};

pub use beacon_map_core::{Alignment, Coordinate, Rotation, Scanner, ScannerId};
