//! Rectangular patches of hexes, addressed by column and row in one of the
//! column-based hex tilings.
//!
//! Neighboring hexes share edges and corners, so a naive "six edges per hex"
//! approach would draw most lines twice. Instead, each column draws:
//!
//! - its horizontal edges: the bottom edge of every hex plus the top edge of
//!   the top hex (group X)
//! - its right-hand zig-zag: `SE → E → NE` of every hex (group Y)
//! - the part of its left-hand zig-zag that the previous column didn't
//!   already draw as its own right-hand zig-zag (group Y). For the first
//!   column that's all of it, for every other column it's a single edge at
//!   whichever end the column sticks out past its neighbor.
//!
//! Depth lines (group Z) follow the same rule, one per distinct corner.

use crate::{
    lattice::{
        hex::{CubicPoint, HexCorner, HexagonalLattice, Slant},
        Axis, Lattice,
    },
    lines::{LineWriter, Shape},
    transform::Affine,
    util::range::NumRange,
};
use serde::{Deserialize, Serialize};

/// Which tiling the column/row indices are in
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Tiling {
    Herringbone(Slant),
    Rhombic(Slant),
}

impl Tiling {
    fn center(self, column: i32, row: i32, layer: i32) -> CubicPoint {
        let point = nalgebra::Point3::new(
            f64::from(column),
            f64::from(row),
            f64::from(layer),
        );
        match self {
            Self::Herringbone(slant) => {
                CubicPoint::from_herringbone(&point, slant)
            }
            Self::Rhombic(slant) => CubicPoint::from_rhombic(&point, slant),
        }
    }

    /// Does this column sit half a hex above the column before it?
    fn shifted_up(self, column: i32) -> bool {
        let odd = column.rem_euclid(2) == 1;
        match self {
            Self::Herringbone(Slant::Up) => odd,
            Self::Herringbone(Slant::Down) => !odd,
            Self::Rhombic(Slant::Up) => true,
            Self::Rhombic(Slant::Down) => false,
        }
    }
}

/// Index extents of a patch, shared by both tilings
#[derive(Copy, Clone, Debug)]
struct Patch {
    tiling: Tiling,
    columns: NumRange<i32>,
    rows: NumRange<i32>,
    layers: NumRange<i32>,
}

impl Patch {
    fn count_lines(&self) -> [usize; 3] {
        let columns = self.columns.len();
        let rows = self.rows.len();
        let layers = self.layers.len();
        if columns == 0 || rows == 0 {
            return [0; 3];
        }
        let horizontal = layers * columns * (rows + 1);
        let zig_zag = layers * (2 * columns * rows + 2 * rows + columns - 1);
        let depth = if layers >= 2 {
            (4 * rows + 2) + (columns - 1) * (2 * rows + 2)
        } else {
            0
        };
        [horizontal, zig_zag, depth]
    }

    fn compute_lines(&self, affine: &Affine, writer: &mut LineWriter) {
        if self.columns.is_empty() || self.rows.is_empty() {
            return;
        }
        let world = |point: CubicPoint| affine.apply(&point.to_planar());
        let mut push =
            |axis: Axis, hex: CubicPoint, a: HexCorner, b: HexCorner| {
                writer.push(axis, world(hex.corner(a)), world(hex.corner(b)))
            };

        for layer in self.layers.iter() {
            for column in self.columns.iter() {
                let first = column == self.columns.min;
                for row in self.rows.iter() {
                    let hex = self.tiling.center(column, row, layer);
                    push(Axis::X, hex, HexCorner::SW, HexCorner::SE);
                    if row == self.rows.max {
                        push(Axis::X, hex, HexCorner::NW, HexCorner::NE);
                    }
                    push(Axis::Y, hex, HexCorner::SE, HexCorner::E);
                    push(Axis::Y, hex, HexCorner::E, HexCorner::NE);
                    if first {
                        push(Axis::Y, hex, HexCorner::SW, HexCorner::W);
                        push(Axis::Y, hex, HexCorner::W, HexCorner::NW);
                    }
                }
                if !first {
                    if self.tiling.shifted_up(column) {
                        let top =
                            self.tiling.center(column, self.rows.max, layer);
                        push(Axis::Y, top, HexCorner::W, HexCorner::NW);
                    } else {
                        let bottom =
                            self.tiling.center(column, self.rows.min, layer);
                        push(Axis::Y, bottom, HexCorner::SW, HexCorner::W);
                    }
                }
            }
        }

        if self.layers.len() < 2 {
            return;
        }
        let near = f64::from(self.layers.min);
        let far = f64::from(self.layers.max);
        let mut depth = |corner: CubicPoint| {
            writer.push(
                Axis::Z,
                world(corner.with_w(near)),
                world(corner.with_w(far)),
            )
        };
        for column in self.columns.iter() {
            let first = column == self.columns.min;
            for row in self.rows.iter() {
                let hex = self.tiling.center(column, row, 0);
                depth(hex.corner(HexCorner::SE));
                depth(hex.corner(HexCorner::E));
                if first {
                    depth(hex.corner(HexCorner::SW));
                    depth(hex.corner(HexCorner::W));
                }
            }
            let top = self.tiling.center(column, self.rows.max, 0);
            let bottom = self.tiling.center(column, self.rows.min, 0);
            depth(top.corner(HexCorner::NE));
            if first || self.tiling.shifted_up(column) {
                depth(top.corner(HexCorner::NW));
            } else {
                depth(bottom.corner(HexCorner::SW));
            }
        }
    }
}

/// A block of hexes in herringbone coordinates, where every other column is
/// shifted half a hex
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Herringbone {
    pub slant: Slant,
    pub columns: NumRange<i32>,
    pub rows: NumRange<i32>,
    pub layers: NumRange<i32>,
}

impl Default for Herringbone {
    fn default() -> Self {
        Self {
            slant: Slant::Up,
            columns: NumRange::new(0, 3),
            rows: NumRange::new(0, 3),
            layers: NumRange::new(0, 0),
        }
    }
}

impl Herringbone {
    fn patch(&self) -> Patch {
        Patch {
            tiling: Tiling::Herringbone(self.slant),
            columns: self.columns.sorted(),
            rows: self.rows.sorted(),
            layers: self.layers.sorted(),
        }
    }
}

impl Shape for Herringbone {
    type Lattice = HexagonalLattice;
    const NAME: &'static str = "herringbone";

    fn count_lines(&self, _lattice: &HexagonalLattice) -> [usize; 3] {
        self.patch().count_lines()
    }

    fn compute_lines(
        &self,
        lattice: &HexagonalLattice,
        writer: &mut LineWriter,
    ) {
        self.patch().compute_lines(&lattice.affine(), writer)
    }
}

/// A block of hexes in rhombic coordinates, where each column is shifted
/// half a hex from the one before it
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rhombus {
    pub slant: Slant,
    pub columns: NumRange<i32>,
    pub rows: NumRange<i32>,
    pub layers: NumRange<i32>,
}

impl Default for Rhombus {
    fn default() -> Self {
        Self {
            slant: Slant::Up,
            columns: NumRange::new(0, 3),
            rows: NumRange::new(0, 3),
            layers: NumRange::new(0, 0),
        }
    }
}

impl Rhombus {
    fn patch(&self) -> Patch {
        Patch {
            tiling: Tiling::Rhombic(self.slant),
            columns: self.columns.sorted(),
            rows: self.rows.sorted(),
            layers: self.layers.sorted(),
        }
    }
}

impl Shape for Rhombus {
    type Lattice = HexagonalLattice;
    const NAME: &'static str = "rhombus";

    fn count_lines(&self, _lattice: &HexagonalLattice) -> [usize; 3] {
        self.patch().count_lines()
    }

    fn compute_lines(
        &self,
        lattice: &HexagonalLattice,
        writer: &mut LineWriter,
    ) {
        self.patch().compute_lines(&lattice.affine(), writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lattice::hex::{HexCompass, HexagonalConfig},
        lines::LineSet,
    };
    use nalgebra::Point3;

    /// Count every distinct corner in a patch by brute force, so the closed
    /// forms can be checked against something dumb
    fn distinct_corners(patch: &Patch) -> usize {
        let mut corners: Vec<Point3<f64>> = Vec::new();
        for column in patch.columns.iter() {
            for row in patch.rows.iter() {
                let hex = patch.tiling.center(column, row, 0);
                for corner in HexCorner::COUNTER_CLOCKWISE {
                    let p = hex.corner(*corner).to_planar();
                    if !corners.iter().any(|q| (p - q).norm() < 1.0e-6) {
                        corners.push(p);
                    }
                }
            }
        }
        corners.len()
    }

    #[test]
    fn test_counts_match_brute_force() {
        for tiling in [
            Tiling::Herringbone(Slant::Up),
            Tiling::Herringbone(Slant::Down),
            Tiling::Rhombic(Slant::Up),
            Tiling::Rhombic(Slant::Down),
        ] {
            let patch = Patch {
                tiling,
                columns: NumRange::new(-1, 2),
                rows: NumRange::new(0, 2),
                layers: NumRange::new(0, 1),
            };
            let [_, _, depth] = patch.count_lines();
            assert_eq!(depth, distinct_corners(&patch), "{:?}", tiling);
        }
    }

    #[test]
    fn test_single_hex() {
        let lattice = HexagonalLattice::new(HexagonalConfig::default());
        let shape = Herringbone {
            columns: NumRange::new(0, 0),
            rows: NumRange::new(0, 0),
            layers: NumRange::new(0, 1),
            ..Default::default()
        };
        // Two layers of one hex: 2 horizontal and 4 slanted edges per layer,
        // plus a depth line per corner
        let counts = shape.count_lines(&lattice);
        assert_eq!(counts, [4, 8, 6]);

        let mut lines = LineSet::new();
        lines.resize(counts);
        let mut writer = lines.writer();
        shape.compute_lines(&lattice, &mut writer);
        assert_eq!(writer.written(), counts);
        assert!(lines.is_complete());
    }
}
