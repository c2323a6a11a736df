use crate::RegistrationError;
use serde::{Deserialize, Serialize};

/// Thresholds and execution switches for [`crate::Registration`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationParams {
    /// Minimal number of equal neighbour triples for two beacons (one per
    /// scanner) to be treated as the same physical beacon.
    ///
    /// With `min_shared_beacons` truly shared beacons, each of them sees the
    /// other `min_shared_beacons - 1` at identical relative offsets.
    pub min_neighbor_matches: usize,
    /// Minimal number of matched beacon pairs for two scanners to overlap.
    pub min_shared_beacons: usize,
    /// Detect overlaps of all pending scanners in parallel (needs the `rayon`
    /// feature; ignored without it).
    pub parallel: bool,
}

impl Default for RegistrationParams {
    fn default() -> Self {
        Self {
            min_neighbor_matches: 11,
            min_shared_beacons: 12,
            parallel: true,
        }
    }
}

impl RegistrationParams {
    /// Reject thresholds under which an overlap cannot yield an alignment.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.min_shared_beacons < 2 {
            return Err(RegistrationError::InvalidSharedBeacons {
                min_shared_beacons: self.min_shared_beacons,
            });
        }
        Ok(())
    }
}
