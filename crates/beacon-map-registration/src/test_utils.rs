use beacon_map_core::{Alignment, Coordinate, Scanner, ScannerId};

/// Deterministic pseudo-random beacon cloud in `[-1000, 1000]^3`.
pub(crate) fn synthetic_cloud(n: usize, seed: u64) -> Vec<Coordinate> {
    let mut state = seed;
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 33) % 2001) as i32 - 1000
    };
    (0..n)
        .map(|_| {
            let x = next();
            let y = next();
            let z = next();
            Coordinate::new(x, y, z)
        })
        .collect()
}

/// The scanner that sees `world` points from the pose `placement` (its local
/// frame mapped into the world frame by `placement`).
pub(crate) fn local_view(id: ScannerId, world: &[Coordinate], placement: &Alignment) -> Scanner {
    let inv = placement.inverse();
    Scanner::with_beacons(id, world.iter().map(|&w| inv.map(w)))
}
