//! Discrete rigid alignment from beacon correspondences.

use crate::{AlignmentError, BeaconPair};
use beacon_map_core::{Alignment, Rotation};

/// Find the rotation + translation mapping the right frame onto the left one.
///
/// Only the first two pairs are used. For each of the 24 rotations `t` the
/// first pair fixes `delta = L0 - t(R0)`; `t` survives when the second pair
/// agrees, `L1 - t(R1) == delta`. Exactly one rotation must survive: with
/// correct correspondences the offset `L1 - L0` pins the rotation down, so no
/// survivor or several survivors point at wrong pairs and are reported rather
/// than resolved by picking one.
pub fn solve_alignment(pairs: &[BeaconPair]) -> Result<Alignment, AlignmentError> {
    let [first, second, ..] = pairs else {
        return Err(AlignmentError::TooFewPairs { found: pairs.len() });
    };
    let (l0, r0) = (first.left.position, first.right.position);
    let (l1, r1) = (second.left.position, second.right.position);

    let candidates: Vec<Alignment> = Rotation::all()
        .filter_map(|rotation| {
            let delta = l0 - rotation.apply(r0);
            (l1 - rotation.apply(r1) == delta).then_some(Alignment {
                rotation,
                translation: delta,
            })
        })
        .collect();

    match candidates.as_slice() {
        [alignment] => Ok(*alignment),
        [] => Err(AlignmentError::NoConsistentRotation),
        many => Err(AlignmentError::MultipleRotations {
            rotations: many.iter().map(|a| a.rotation.index()).collect(),
        }),
    }
}
