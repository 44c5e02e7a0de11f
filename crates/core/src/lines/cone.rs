use crate::{
    lattice::{
        hex::{CubicPoint, HexCompass, HexDirection, HexagonalLattice},
        Axis, Lattice,
    },
    lines::{arc::CircularRange, LineWriter, Shape},
    util::range::NumRange,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Number of sextants in a full turn around a hex
const SEXTANTS: u32 = 6;

/// Rings of hexes around an origin hex, drawn through hex centers. Ring `k`
/// is the loop of hexes exactly `k` steps from the origin, and is made of six
/// straight sides. Sextant `j` is the side running from the
/// [HexDirection] with counter-clockwise index `j` to the next one, starting
/// at [HexDirection::NE].
///
/// - X: radial lines from the inner ring to the outer ring, one per sextant
///   boundary
/// - Y: ring sides, one segment per hex step
/// - Z: depth lines through every ring node, when there's more than one
///   layer
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Cone {
    /// First sextant boundary, `0..=6`
    #[validate(range(max = 6))]
    pub sextant_from: u32,
    /// Last sextant boundary, `0..=6`. Wraps through 0 if less than
    /// `sextant_from`.
    #[validate(range(max = 6))]
    pub sextant_to: u32,
    /// Center hex. Should be a face position (integer cube coordinates).
    pub origin: CubicPoint,
    /// Ring distances to draw. Negative values are raised to 0.
    pub rings: NumRange<i32>,
    pub layers: NumRange<i32>,
}

impl Default for Cone {
    fn default() -> Self {
        Self {
            origin: CubicPoint::ORIGIN,
            rings: NumRange::new(0, 3),
            sextant_from: 0,
            sextant_to: SEXTANTS,
            layers: NumRange::new(0, 0),
        }
    }
}

impl Cone {
    fn arc(&self) -> CircularRange {
        CircularRange::new(
            f64::from(self.sextant_from),
            f64::from(self.sextant_to),
            f64::from(SEXTANTS),
        )
    }

    fn rings(&self) -> NumRange<i32> {
        self.rings.sorted().non_negative()
    }

    /// Offset from the origin to the corner of ring `k` in direction `index`.
    /// Indices wrap around.
    fn ring_corner(k: i32, index: i64) -> CubicPoint {
        let direction =
            HexDirection::COUNTER_CLOCKWISE[index.rem_euclid(6) as usize];
        direction.to_offset() * f64::from(k)
    }

    /// Number of ring nodes (hex centers) on ring `k` within the arc
    fn node_count(k: i32, arc: &CircularRange) -> usize {
        let k = k as usize;
        if k == 0 {
            1
        } else if arc.is_full() {
            6 * k
        } else {
            arc.span() as usize * k + 1
        }
    }

    /// Every ring node on ring `k` within the arc, as an offset from the
    /// origin
    fn nodes(k: i32, arc: &CircularRange) -> Vec<CubicPoint> {
        if k == 0 {
            return vec![CubicPoint::ORIGIN];
        }
        let from = arc.from() as i64;
        let sides = arc.span() as i64;
        let mut nodes = Vec::with_capacity(Self::node_count(k, arc));
        for side in from..(from + sides) {
            let start = Self::ring_corner(k, side);
            let end = Self::ring_corner(k, side + 1);
            let step = (end - start) * (1.0 / f64::from(k));
            for t in 0..k {
                nodes.push(start + step * f64::from(t));
            }
        }
        if !arc.is_full() {
            nodes.push(Self::ring_corner(k, from + sides));
        }
        nodes
    }
}

impl Shape for Cone {
    type Lattice = HexagonalLattice;
    const NAME: &'static str = "cone";

    fn count_lines(&self, _lattice: &HexagonalLattice) -> [usize; 3] {
        let arc = self.arc();
        let rings = self.rings();
        let layers = self.layers.sorted();
        let sides = arc.span() as usize;

        let radial = if rings.max > rings.min {
            layers.len() * arc.step_count()
        } else {
            0
        };
        let ring_steps: usize = rings
            .iter()
            .filter(|k| *k >= 1)
            .map(|k| sides * k as usize)
            .sum();
        let depth = if layers.len() >= 2 {
            rings.iter().map(|k| Self::node_count(k, &arc)).sum()
        } else {
            0
        };
        [radial, layers.len() * ring_steps, depth]
    }

    fn compute_lines(
        &self,
        lattice: &HexagonalLattice,
        writer: &mut LineWriter,
    ) {
        let arc = self.arc();
        let rings = self.rings();
        let layers = self.layers.sorted();
        let affine = lattice.affine();
        let origin = self.origin;
        let world = |offset: CubicPoint, layer: f64| {
            affine.apply(&(origin + offset).with_w(layer).to_planar())
        };

        for layer in layers.iter().map(f64::from) {
            if rings.max > rings.min {
                for step in arc.steps() {
                    writer.push(
                        Axis::X,
                        world(Self::ring_corner(rings.min, step), layer),
                        world(Self::ring_corner(rings.max, step), layer),
                    );
                }
            }
            for k in rings.iter().filter(|k| *k >= 1) {
                let nodes = Self::nodes(k, &arc);
                // Full rings close back on the first node
                let closing = if arc.is_full() { nodes.first() } else { None };
                let path = nodes.iter().chain(closing);
                for (a, b) in path.clone().zip(path.skip(1)) {
                    writer.push(Axis::Y, world(*a, layer), world(*b, layer));
                }
            }
        }

        if layers.len() >= 2 {
            let near = f64::from(layers.min);
            let far = f64::from(layers.max);
            for k in rings.iter() {
                for node in Self::nodes(k, &arc) {
                    writer.push(Axis::Z, world(node, near), world(node, far));
                }
            }
        }
    }
}
