use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Integer position of a beacon (or a scanner origin) in some scanner frame.
///
/// Arithmetic wraps on overflow, so `+`, `-` and negation form a group over
/// all of `i32^3`: an offset between two far-apart scanners may wrap, but
/// mapping a point by it lands back on the exact position.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coordinate {
    pub const ZERO: Coordinate = Coordinate { x: 0, y: 0, z: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn from_array([x, y, z]: [i32; 3]) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn to_array(self) -> [i32; 3] {
        [self.x, self.y, self.z]
    }

    /// Per-axis absolute differences, sorted ascending.
    ///
    /// Every one of the 24 axis rotations permutes and negates axes, so this
    /// triple is the same in every scanner that sees both points.
    #[inline]
    pub fn sorted_abs_diff(self, other: Coordinate) -> [u32; 3] {
        let mut d = [
            self.x.abs_diff(other.x),
            self.y.abs_diff(other.y),
            self.z.abs_diff(other.z),
        ];
        d.sort_unstable();
        d
    }
}

impl Add for Coordinate {
    type Output = Coordinate;

    #[inline]
    fn add(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(
            self.x.wrapping_add(rhs.x),
            self.y.wrapping_add(rhs.y),
            self.z.wrapping_add(rhs.z),
        )
    }
}

impl Sub for Coordinate {
    type Output = Coordinate;

    #[inline]
    fn sub(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(
            self.x.wrapping_sub(rhs.x),
            self.y.wrapping_sub(rhs.y),
            self.z.wrapping_sub(rhs.z),
        )
    }
}

impl Neg for Coordinate {
    type Output = Coordinate;

    #[inline]
    fn neg(self) -> Coordinate {
        Coordinate::new(
            self.x.wrapping_neg(),
            self.y.wrapping_neg(),
            self.z.wrapping_neg(),
        )
    }
}

impl From<Vector3<i32>> for Coordinate {
    fn from(v: Vector3<i32>) -> Self {
        Coordinate::new(v.x, v.y, v.z)
    }
}

impl From<Coordinate> for Vector3<i32> {
    fn from(c: Coordinate) -> Self {
        Vector3::new(c.x, c.y, c.z)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
