//! Cube coordinates for hex layers, plus the compass types used to walk
//! around a hex. See the parent module for the layout conventions.

use crate::util;
use derive_more::{Add, Display, Mul, Neg, Sub};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

/// `√3 / 2`, the apothem of a unit-radius hex
const HALF_SQRT_3: f64 = 0.866_025_403_784_438_6;

/// A point in a layered hex lattice. `x`, `y` and `z` are cube coordinates,
/// and a point lies on a layer's plane iff `x + y + z = 0`. Integer cube
/// coordinates are face (hex center) positions. `w` is the layer: integer
/// values are the layer planes, half-integer values are cell centers between
/// them.
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Display,
    Add,
    Sub,
    Mul,
    Neg,
    Serialize,
    Deserialize,
)]
#[display(fmt = "({}, {}, {}; {})", x, y, z, w)]
pub struct CubicPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl CubicPoint {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Build a point from `x` and `y`, deriving `z` from `x + y + z = 0`
    pub fn from_xy(x: f64, y: f64, w: f64) -> Self {
        Self::new(x, y, -x - y, w)
    }

    /// Build a point from `x` and `z`, deriving `y` from `x + y + z = 0`
    pub fn from_xz(x: f64, z: f64, w: f64) -> Self {
        Self::new(x, -x - z, z, w)
    }

    /// Embed this point into unit-radius planar space: corners of the origin
    /// hex are 1 away from its center, and one of them sits on +X. `w` is
    /// passed through as the third component.
    pub fn to_planar(&self) -> Point3<f64> {
        Point3::new(1.5 * self.x, HALF_SQRT_3 * (self.y - self.z), self.w)
    }

    /// Inverse of [Self::to_planar]
    pub fn from_planar(planar: &Point3<f64>) -> Self {
        let x = planar.x / 1.5;
        let y_minus_z = planar.y / HALF_SQRT_3;
        Self::new(x, (-x + y_minus_z) / 2.0, (-x - y_minus_z) / 2.0, planar.z)
    }

    /// Hop distance between the hexes of two face points, ignoring layers
    pub fn distance_to(&self, other: &Self) -> f64 {
        ((self.x - other.x).abs()
            + (self.y - other.y).abs()
            + (self.z - other.z).abs())
            / 2.0
    }

    /// Planar distance in unit-radius space, ignoring layers
    fn planar_distance(&self, other: &Self) -> f64 {
        let a = self.to_planar();
        let b = other.to_planar();
        (a.x - b.x).hypot(a.y - b.y)
    }

    /// Round the cube axes to the nearest face. Each component is rounded on
    /// its own, then the one that moved furthest gets recomputed from the
    /// other two so the result is back on the `x + y + z = 0` plane.
    fn cube_round(&self) -> (f64, f64, f64) {
        let mut rx = self.x.round_ties_even();
        let mut ry = self.y.round_ties_even();
        let mut rz = self.z.round_ties_even();
        let dx = (rx - self.x).abs();
        let dy = (ry - self.y).abs();
        let dz = (rz - self.z).abs();
        if dx > dy && dx > dz {
            rx = -ry - rz;
        } else if dy > dz {
            ry = -rx - rz;
        } else {
            rz = -rx - ry;
        }
        (rx, ry, rz)
    }

    /// The nearest hex center, on the nearest layer plane
    pub fn round_face(&self) -> Self {
        let (x, y, z) = self.cube_round();
        Self::new(x, y, z, self.w.round_ties_even())
    }

    /// The center of the nearest cell: nearest hex, halfway between the two
    /// layer planes around this point
    pub fn round_cell(&self) -> Self {
        let (x, y, z) = self.cube_round();
        Self::new(x, y, z, util::floor_half(self.w))
    }

    /// The nearest hex corner, on the nearest layer plane. Corners are only
    /// checked around the nearest face; if two are equally close the first
    /// one counter-clockwise from [HexCorner::E] wins.
    pub fn round_vertex(&self) -> Self {
        let face = self.round_face();
        let mut best = face.corner(HexCorner::E);
        let mut best_distance = self.planar_distance(&best);
        for corner in &HexCorner::COUNTER_CLOCKWISE[1..] {
            let candidate = face.corner(*corner);
            let distance = self.planar_distance(&candidate);
            if distance < best_distance {
                best = candidate;
                best_distance = distance;
            }
        }
        best
    }

    /// Location of one corner of the hex centered at this point
    pub fn corner(&self, corner: HexCorner) -> Self {
        *self + corner.to_offset()
    }

    /// Center of the adjacent hex in the given direction, on the same layer
    pub fn neighbor(&self, direction: HexDirection) -> Self {
        *self + direction.to_offset()
    }

    /// Move to a different layer
    pub fn with_w(self, w: f64) -> Self {
        Self { w, ..self }
    }

    /// Herringbone `(column, row, layer)`. Columns are cube `x`. With
    /// [Slant::Up], odd columns sit half a hex above even ones, and with
    /// [Slant::Down] they sit half a hex below.
    pub fn to_herringbone(&self, slant: Slant) -> Point3<f64> {
        let parity = if util::is_odd(self.x) { 0.5 } else { 0.0 };
        let row = -self.z - self.x / 2.0;
        let row = match slant {
            Slant::Up => row - parity,
            Slant::Down => row + parity,
        };
        Point3::new(self.x, row, self.w)
    }

    /// Inverse of [Self::to_herringbone]
    pub fn from_herringbone(point: &Point3<f64>, slant: Slant) -> Self {
        let parity = if util::is_odd(point.x) { 0.5 } else { 0.0 };
        let z = -point.y - point.x / 2.0;
        let z = match slant {
            Slant::Up => z - parity,
            Slant::Down => z + parity,
        };
        Self::from_xz(point.x, z, point.z)
    }

    /// Rhombic `(column, row, layer)`. Columns are cube `x`. With
    /// [Slant::Up] each column sits half a hex above the one before it, and
    /// with [Slant::Down] half a hex below.
    pub fn to_rhombic(&self, slant: Slant) -> Point3<f64> {
        match slant {
            Slant::Up => Point3::new(self.x, self.y, self.w),
            Slant::Down => Point3::new(self.x, -self.z, self.w),
        }
    }

    /// Inverse of [Self::to_rhombic]
    pub fn from_rhombic(point: &Point3<f64>, slant: Slant) -> Self {
        match slant {
            Slant::Up => Self::from_xy(point.x, point.y, point.z),
            Slant::Down => Self::from_xz(point.x, -point.y, point.z),
        }
    }
}

/// Which way a column-based hex tiling drifts
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Slant {
    Up,
    Down,
}

/// A set of compass points around a hex, listed counter-clockwise. Corners
/// and neighbors are both compasses.
pub trait HexCompass: 'static + Copy + Eq + Sized {
    const COUNTER_CLOCKWISE: &'static [Self];

    /// Offset from a hex center to this compass point, in cube coordinates
    fn to_offset(self) -> CubicPoint;

    /// Position of this direction in [Self::COUNTER_CLOCKWISE]
    fn index(self) -> usize {
        Self::COUNTER_CLOCKWISE
            .iter()
            .position(|dir| self == *dir)
            .unwrap_or(0)
    }

    /// Step around the compass. Positive steps are counter-clockwise.
    fn rotate(self, steps: i64) -> Self {
        let len = Self::COUNTER_CLOCKWISE.len() as i64;
        let index = (self.index() as i64 + steps).rem_euclid(len);
        Self::COUNTER_CLOCKWISE[index as usize]
    }

    fn opposite(self) -> Self {
        self.rotate(Self::COUNTER_CLOCKWISE.len() as i64 / 2)
    }
}

/// The 6 corners of a hex, named by where they point in the default
/// ([Sides::Pointed](super::Sides::Pointed)) orientation
#[derive(
    Copy, Clone, Debug, EnumIter, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HexCorner {
    E,
    NE,
    NW,
    W,
    SW,
    SE,
}

const THIRD: f64 = 1.0 / 3.0;

impl HexCompass for HexCorner {
    const COUNTER_CLOCKWISE: &'static [Self] =
        &[Self::E, Self::NE, Self::NW, Self::W, Self::SW, Self::SE];

    fn to_offset(self) -> CubicPoint {
        let (x, y, z) = match self {
            Self::E => (2.0 * THIRD, -THIRD, -THIRD),
            Self::NE => (THIRD, THIRD, -2.0 * THIRD),
            Self::NW => (-THIRD, 2.0 * THIRD, -THIRD),
            Self::W => (-2.0 * THIRD, THIRD, THIRD),
            Self::SW => (-THIRD, -THIRD, 2.0 * THIRD),
            Self::SE => (THIRD, -2.0 * THIRD, THIRD),
        };
        CubicPoint::new(x, y, z, 0.0)
    }
}

/// The 6 directions from a hex to its neighbors, named by where they point
/// in the default orientation
#[derive(
    Copy, Clone, Debug, EnumIter, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum HexDirection {
    NE,
    N,
    NW,
    SW,
    S,
    SE,
}

impl HexCompass for HexDirection {
    const COUNTER_CLOCKWISE: &'static [Self] =
        &[Self::NE, Self::N, Self::NW, Self::SW, Self::S, Self::SE];

    fn to_offset(self) -> CubicPoint {
        let (x, y, z) = match self {
            Self::NE => (1.0, 0.0, -1.0),
            Self::N => (0.0, 1.0, -1.0),
            Self::NW => (-1.0, 1.0, 0.0),
            Self::SW => (-1.0, 0.0, 1.0),
            Self::S => (0.0, -1.0, 1.0),
            Self::SE => (1.0, -1.0, 0.0),
        };
        CubicPoint::new(x, y, z, 0.0)
    }
}

impl HexDirection {
    /// The two corners at either end of the side facing this direction,
    /// clockwise one first
    pub fn adjacent_corners(self) -> (HexCorner, HexCorner) {
        let first = HexCorner::COUNTER_CLOCKWISE[self.index()];
        (first, first.rotate(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use strum::IntoEnumIterator;

    #[test]
    fn test_planar_embedding() {
        let ne = CubicPoint::ORIGIN.neighbor(HexDirection::NE).to_planar();
        assert_approx_eq!(ne.x, 1.5);
        assert_approx_eq!(ne.y, HALF_SQRT_3);

        let corner = CubicPoint::ORIGIN.corner(HexCorner::E).to_planar();
        assert_approx_eq!(corner.x, 1.0);
        assert_approx_eq!(corner.y, 0.0);

        // Every corner is one unit out, every neighbor √3 out
        for corner in HexCorner::iter() {
            let p = CubicPoint::ORIGIN.corner(corner).to_planar();
            assert_approx_eq!(p.x.hypot(p.y), 1.0);
        }
        for direction in HexDirection::iter() {
            let p = CubicPoint::ORIGIN.neighbor(direction).to_planar();
            assert_approx_eq!(p.x.hypot(p.y), 3.0_f64.sqrt());
        }
    }

    #[test]
    fn test_planar_round_trip() {
        let point = CubicPoint::from_xy(1.25, -3.5, 2.0);
        let back = CubicPoint::from_planar(&point.to_planar());
        assert_approx_eq!(back.x, point.x);
        assert_approx_eq!(back.y, point.y);
        assert_approx_eq!(back.z, point.z);
        assert_approx_eq!(back.w, point.w);
    }

    #[test]
    fn test_round_face() {
        let point = CubicPoint::from_xy(0.9, 0.2, 1.4);
        assert_eq!(point.round_face(), CubicPoint::new(1.0, 0.0, -1.0, 1.0));
        assert_eq!(point.round_cell(), CubicPoint::new(1.0, 0.0, -1.0, 1.5));
    }

    #[test]
    fn test_round_vertex() {
        // Slightly toward the NE corner of the origin hex
        let planar = Point3::new(0.45, 0.8, 0.2);
        let vertex = CubicPoint::from_planar(&planar).round_vertex();
        let expected = CubicPoint::ORIGIN.corner(HexCorner::NE);
        assert_approx_eq!(vertex.x, expected.x);
        assert_approx_eq!(vertex.y, expected.y);
        assert_approx_eq!(vertex.z, expected.z);
        assert_eq!(vertex.w, 0.0);

        // Snapping a vertex again lands on the same vertex
        let again = vertex.round_vertex();
        assert_approx_eq!(again.x, vertex.x);
        assert_approx_eq!(again.y, vertex.y);
        assert_approx_eq!(again.z, vertex.z);
    }

    #[test]
    fn test_herringbone() {
        // Odd column, sitting half a hex up
        let face = CubicPoint::from_xz(1.0, -1.0, 0.0);
        let up = face.to_herringbone(Slant::Up);
        assert_eq!(up, Point3::new(1.0, 0.0, 0.0));
        let down = face.to_herringbone(Slant::Down);
        assert_eq!(down, Point3::new(1.0, 1.0, 0.0));
        assert_eq!(CubicPoint::from_herringbone(&up, Slant::Up), face);
        assert_eq!(CubicPoint::from_herringbone(&down, Slant::Down), face);
    }

    #[test]
    fn test_rhombic() {
        let face = CubicPoint::from_xy(2.0, -1.0, 3.0);
        let up = face.to_rhombic(Slant::Up);
        assert_eq!(up, Point3::new(2.0, -1.0, 3.0));
        let down = face.to_rhombic(Slant::Down);
        assert_eq!(down, Point3::new(2.0, 1.0, 3.0));
        assert_eq!(CubicPoint::from_rhombic(&down, Slant::Down), face);
    }

    #[test]
    fn test_compass() {
        assert_eq!(HexCorner::E.opposite(), HexCorner::W);
        assert_eq!(HexCorner::E.rotate(-1), HexCorner::SE);
        assert_eq!(HexDirection::S.opposite(), HexDirection::N);
        assert_eq!(
            HexDirection::NE.adjacent_corners(),
            (HexCorner::E, HexCorner::NE)
        );
        assert_eq!(
            HexDirection::SE.adjacent_corners(),
            (HexCorner::SE, HexCorner::E)
        );
    }
}
