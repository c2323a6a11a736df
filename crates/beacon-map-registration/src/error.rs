use beacon_map_core::ScannerId;

/// Failure to pin down a single rotation + translation from correspondences.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AlignmentError {
    #[error("alignment needs at least 2 beacon pairs (got {found})")]
    TooFewPairs { found: usize },
    #[error("no rotation maps both reference pairs consistently")]
    NoConsistentRotation,
    #[error("alignment is ambiguous: rotations {rotations:?} all fit the reference pairs")]
    MultipleRotations { rotations: Vec<usize> },
}

/// Errors returned by the registration loop.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("no scanners to register")]
    NoScanners,
    #[error("min_shared_beacons must be at least 2 to fix an alignment (got {min_shared_beacons})")]
    InvalidSharedBeacons { min_shared_beacons: usize },
    #[error("scanner {scanner} overlaps the global frame but cannot be aligned: {source}")]
    AmbiguousAlignment {
        scanner: ScannerId,
        #[source]
        source: AlignmentError,
    },
    #[error("registration stalled after {rounds} round(s): scanners {pending:?} overlap nothing merged so far")]
    Stalled {
        rounds: usize,
        pending: Vec<ScannerId>,
    },
}
