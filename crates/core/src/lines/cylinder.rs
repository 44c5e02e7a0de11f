use crate::{
    lattice::{polar::PolarLattice, Axis, Lattice},
    lines::{arc::CircularRange, LineWriter, Shape},
    util::range::NumRange,
};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A slice of a polar lattice: a stack of ring arcs between two radii,
/// optionally only part of the way around.
///
/// - X: radial lines along each whole sector boundary, per whole layer
/// - Y: ring arcs, one polyline per whole ring (except the pole) per whole
///   layer
/// - Z: depth lines at every ring/sector node, plus one at the pole
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cylinder {
    pub sector_from: f64,
    /// Wraps through 0 if less than `sector_from`
    pub sector_to: f64,
    /// Arc segments per sector. Anything below 1 counts as 1.
    pub smoothness: u32,
    /// Ring extent. Negative values are raised to 0.
    pub radial: NumRange<f64>,
    pub layers: NumRange<f64>,
}

impl Default for Cylinder {
    fn default() -> Self {
        Self {
            radial: NumRange::new(0.0, 3.0),
            sector_from: 0.0,
            sector_to: 8.0,
            layers: NumRange::new(0.0, 0.0),
            smoothness: 4,
        }
    }
}

impl Cylinder {
    fn arc(&self, lattice: &PolarLattice) -> CircularRange {
        CircularRange::new(
            self.sector_from,
            self.sector_to,
            f64::from(lattice.sectors()),
        )
    }

    fn radial(&self) -> NumRange<f64> {
        self.radial.sorted().non_negative()
    }

    /// Whole rings that get an arc. Ring 0 is the pole, which has none.
    fn rings(&self) -> impl Iterator<Item = i64> {
        self.radial().integers().filter(|ring| *ring >= 1)
    }

    fn smoothness(&self) -> u32 {
        self.smoothness.max(1)
    }

    fn includes_pole(&self) -> bool {
        self.radial().min <= 0.0
    }
}

impl Shape for Cylinder {
    type Lattice = PolarLattice;
    const NAME: &'static str = "cylinder";

    fn count_lines(&self, lattice: &PolarLattice) -> [usize; 3] {
        let arc = self.arc(lattice);
        let radial = self.radial();
        let layers = self.layers.sorted();
        let layer_count = layers.integer_count();
        let ring_count = self.rings().count();

        let x = if radial.span() > 0.0 {
            layer_count * arc.step_count()
        } else {
            0
        };
        let y = layer_count * ring_count * arc.segments(self.smoothness());
        let z = if layers.span() > 0.0 {
            ring_count * arc.step_count() + usize::from(self.includes_pole())
        } else {
            0
        };
        [x, y, z]
    }

    fn compute_lines(&self, lattice: &PolarLattice, writer: &mut LineWriter) {
        let arc = self.arc(lattice);
        let radial = self.radial();
        let layers = self.layers.sorted();
        let affine = lattice.affine();
        let world = |r: f64, s: f64, z: f64| {
            affine.apply(&lattice.polar_to_local(&Point3::new(r, s, z)))
        };
        let segments = arc.segments(self.smoothness());

        for z in layers.integers().map(|z| z as f64) {
            if radial.span() > 0.0 {
                for step in arc.steps().map(|s| s as f64) {
                    writer.push(
                        Axis::X,
                        world(radial.min, step, z),
                        world(radial.max, step, z),
                    );
                }
            }
            for ring in self.rings().map(|r| r as f64) {
                for i in 0..segments {
                    let from = arc.lerp(i as f64 / segments as f64);
                    let to = arc.lerp((i + 1) as f64 / segments as f64);
                    writer.push(
                        Axis::Y,
                        world(ring, from, z),
                        world(ring, to, z),
                    );
                }
            }
        }

        if layers.span() > 0.0 {
            for ring in self.rings().map(|r| r as f64) {
                for step in arc.steps().map(|s| s as f64) {
                    writer.push(
                        Axis::Z,
                        world(ring, step, layers.min),
                        world(ring, step, layers.max),
                    );
                }
            }
            if self.includes_pole() {
                writer.push(
                    Axis::Z,
                    world(0.0, 0.0, layers.min),
                    world(0.0, 0.0, layers.max),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lattice::polar::PolarConfig, lines::LineSet};

    fn lattice() -> PolarLattice {
        PolarLattice::new(PolarConfig::default()).unwrap()
    }

    #[test]
    fn test_full_cylinder() {
        let lattice = lattice();
        let shape = Cylinder {
            radial: NumRange::new(0.0, 2.0),
            sector_from: 0.0,
            sector_to: 8.0,
            layers: NumRange::new(0.0, 1.0),
            smoothness: 2,
        };
        // 8 radials and 2 rings of 16 segments per layer, then 2 * 8 nodes
        // plus the pole
        let counts = shape.count_lines(&lattice);
        assert_eq!(counts, [16, 64, 17]);

        let mut lines = LineSet::new();
        lines.resize(counts);
        let mut writer = lines.writer();
        shape.compute_lines(&lattice, &mut writer);
        assert_eq!(writer.written(), counts);
        assert!(lines.is_complete());
    }

    #[test]
    fn test_wrapping_cylinder() {
        let shape = Cylinder {
            radial: NumRange::new(3.0, 1.0),
            sector_from: 7.0,
            sector_to: 1.0,
            layers: NumRange::new(0.0, 0.0),
            smoothness: 0,
        };
        // Two sectors through 0, smoothness raised to 1, single layer
        assert_eq!(shape.count_lines(&lattice()), [3, 6, 0]);
    }

    #[test]
    fn test_arc_points_on_ring() {
        let lattice = lattice();
        let shape = Cylinder {
            radial: NumRange::new(2.0, 2.0),
            ..Default::default()
        };
        let counts = shape.count_lines(&lattice);
        assert_eq!(counts[0], 0);
        let mut lines = LineSet::new();
        lines.resize(counts);
        shape.compute_lines(&lattice, &mut lines.writer());
        for segment in lines.group(Axis::Y) {
            for point in segment {
                assert!((point.coords.norm() - 2.0).abs() < 1e-9);
            }
        }
    }
}
