use crate::Coordinate;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Signed axis permutation: `out[k] = signs[k] * in[axes[k]]`.
///
/// Every orientation an axis-aligned scanner can take is one of these maps.
/// Reflections (determinant -1) are signed permutations too, but they never
/// appear in [`AXIS_MAPS_24`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisMap {
    pub axes: [usize; 3],
    pub signs: [i32; 3],
}

impl AxisMap {
    pub const IDENTITY: AxisMap = AxisMap::new([0, 1, 2], [1, 1, 1]);

    pub const fn new(axes: [usize; 3], signs: [i32; 3]) -> Self {
        Self { axes, signs }
    }

    /// Apply the map to `c`.
    #[inline]
    pub fn apply(&self, c: Coordinate) -> Coordinate {
        let v = c.to_array();
        Coordinate::new(
            v[self.axes[0]].wrapping_mul(self.signs[0]),
            v[self.axes[1]].wrapping_mul(self.signs[1]),
            v[self.axes[2]].wrapping_mul(self.signs[2]),
        )
    }

    /// The map as a 3x3 integer matrix, so that `apply(c) == matrix * c`.
    pub fn matrix(&self) -> Matrix3<i32> {
        Matrix3::from_fn(|r, c| if c == self.axes[r] { self.signs[r] } else { 0 })
    }

    /// The map undoing `self` (the transpose of [`AxisMap::matrix`]).
    pub const fn inverse(&self) -> AxisMap {
        let mut axes = [0usize; 3];
        let mut signs = [0i32; 3];
        let mut k = 0;
        while k < 3 {
            axes[self.axes[k]] = k;
            signs[self.axes[k]] = self.signs[k];
            k += 1;
        }
        AxisMap { axes, signs }
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub const fn compose(&self, other: &AxisMap) -> AxisMap {
        let mut axes = [0usize; 3];
        let mut signs = [0i32; 3];
        let mut k = 0;
        while k < 3 {
            axes[k] = other.axes[self.axes[k]];
            signs[k] = self.signs[k] * other.signs[self.axes[k]];
            k += 1;
        }
        AxisMap { axes, signs }
    }

    const fn const_eq(&self, other: &AxisMap) -> bool {
        let mut k = 0;
        while k < 3 {
            if self.axes[k] != other.axes[k] || self.signs[k] != other.signs[k] {
                return false;
            }
            k += 1;
        }
        true
    }
}

/// The 24 proper rotations of the cube, in a fixed order.
///
/// Grouped by which input axis lands on the output `x` axis (`+x`, `-x`,
/// `+y`, `-y`, `+z`, `-z`), four spins around it each. Index 0 is identity.
pub const AXIS_MAPS_24: [AxisMap; 24] = [
    // x, -x
    AxisMap::new([0, 1, 2], [1, 1, 1]),
    AxisMap::new([0, 2, 1], [1, 1, -1]),
    AxisMap::new([0, 1, 2], [1, -1, -1]),
    AxisMap::new([0, 2, 1], [1, -1, 1]),
    AxisMap::new([0, 1, 2], [-1, -1, 1]),
    AxisMap::new([0, 2, 1], [-1, 1, 1]),
    AxisMap::new([0, 1, 2], [-1, 1, -1]),
    AxisMap::new([0, 2, 1], [-1, -1, -1]),
    // y, -y
    AxisMap::new([1, 2, 0], [1, 1, 1]),
    AxisMap::new([1, 0, 2], [1, 1, -1]),
    AxisMap::new([1, 2, 0], [1, -1, -1]),
    AxisMap::new([1, 0, 2], [1, -1, 1]),
    AxisMap::new([1, 2, 0], [-1, -1, 1]),
    AxisMap::new([1, 0, 2], [-1, 1, 1]),
    AxisMap::new([1, 2, 0], [-1, 1, -1]),
    AxisMap::new([1, 0, 2], [-1, -1, -1]),
    // z, -z
    AxisMap::new([2, 0, 1], [1, 1, 1]),
    AxisMap::new([2, 1, 0], [1, 1, -1]),
    AxisMap::new([2, 0, 1], [1, -1, -1]),
    AxisMap::new([2, 1, 0], [1, -1, 1]),
    AxisMap::new([2, 0, 1], [-1, -1, 1]),
    AxisMap::new([2, 1, 0], [-1, 1, 1]),
    AxisMap::new([2, 0, 1], [-1, 1, -1]),
    AxisMap::new([2, 1, 0], [-1, -1, -1]),
];

const fn index_of(map: &AxisMap) -> u8 {
    let mut i = 0;
    while i < AXIS_MAPS_24.len() {
        if AXIS_MAPS_24[i].const_eq(map) {
            return i as u8;
        }
        i += 1;
    }
    panic!("rotation table is not closed under inverse/composition");
}

const fn build_inverses() -> [u8; 24] {
    let mut out = [0u8; 24];
    let mut i = 0;
    while i < 24 {
        out[i] = index_of(&AXIS_MAPS_24[i].inverse());
        i += 1;
    }
    out
}

const fn build_products() -> [[u8; 24]; 24] {
    let mut out = [[0u8; 24]; 24];
    let mut i = 0;
    while i < 24 {
        let mut j = 0;
        while j < 24 {
            out[i][j] = index_of(&AXIS_MAPS_24[i].compose(&AXIS_MAPS_24[j]));
            j += 1;
        }
        i += 1;
    }
    out
}

// Evaluated at compile time: a table that is not a group fails the build.
const INVERSES: [u8; 24] = build_inverses();
const PRODUCTS: [[u8; 24]; 24] = build_products();

/// Rotation index out of `[0, 24)`.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("rotation index {0} is out of range (expected 0..24)")]
pub struct InvalidRotationIndex(pub usize);

/// One of the 24 discrete scanner orientations, identified by its index into
/// [`AXIS_MAPS_24`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Rotation(u8);

impl Rotation {
    pub const COUNT: usize = AXIS_MAPS_24.len();
    pub const IDENTITY: Rotation = Rotation(0);

    pub fn from_index(index: usize) -> Option<Rotation> {
        (index < Self::COUNT).then_some(Rotation(index as u8))
    }

    /// All 24 rotations in table order.
    pub fn all() -> impl ExactSizeIterator<Item = Rotation> + Clone {
        (0..Self::COUNT as u8).map(Rotation)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn axis_map(self) -> &'static AxisMap {
        &AXIS_MAPS_24[self.index()]
    }

    #[inline]
    pub fn apply(self, c: Coordinate) -> Coordinate {
        self.axis_map().apply(c)
    }

    pub fn matrix(self) -> Matrix3<i32> {
        self.axis_map().matrix()
    }

    pub fn inverse(self) -> Rotation {
        Rotation(INVERSES[self.index()])
    }

    /// `self ∘ other`: rotate by `other` first, then by `self`.
    pub fn compose(self, other: Rotation) -> Rotation {
        Rotation(PRODUCTS[self.index()][other.index()])
    }
}

impl TryFrom<usize> for Rotation {
    type Error = InvalidRotationIndex;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Rotation::from_index(index).ok_or(InvalidRotationIndex(index))
    }
}

impl From<Rotation> for usize {
    fn from(r: Rotation) -> usize {
        r.index()
    }
}

/// Rigid map between scanner frames: `dst = rotation(src) + translation`.
///
/// When `src` is a scanner's local frame and `dst` the global frame,
/// `translation` is that scanner's origin in global coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub rotation: Rotation,
    pub translation: Coordinate,
}

impl Alignment {
    pub const IDENTITY: Alignment = Alignment {
        rotation: Rotation::IDENTITY,
        translation: Coordinate::ZERO,
    };

    /// Map a point from the source frame into the destination frame.
    #[inline]
    pub fn map(&self, c: Coordinate) -> Coordinate {
        self.rotation.apply(c) + self.translation
    }

    pub fn inverse(&self) -> Alignment {
        let inv = self.rotation.inverse();
        Alignment {
            rotation: inv,
            translation: inv.apply(-self.translation),
        }
    }

    /// `self ∘ other`: map by `other` first, then by `self`.
    pub fn compose(&self, other: &Alignment) -> Alignment {
        Alignment {
            rotation: self.rotation.compose(other.rotation),
            translation: self.map(other.translation),
        }
    }
}
