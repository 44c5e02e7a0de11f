use crate::{
    lattice::{rectangular::RectangularLattice, Axis, Lattice},
    lines::{LineWriter, Shape},
    util::range::NumRange,
};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A box of grid lines in a rectangular lattice, spanning `from` to `to` in
/// lattice coordinates. A line runs along each axis at every integer
/// position of the other two axes. Sheared lattices turn the box into a
/// parallelepiped.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parallelepiped {
    pub from: Point3<f64>,
    pub to: Point3<f64>,
}

impl Default for Parallelepiped {
    fn default() -> Self {
        Self::new(Point3::new(-2.0, -2.0, 0.0), Point3::new(2.0, 2.0, 0.0))
    }
}

impl Parallelepiped {
    pub fn new(from: Point3<f64>, to: Point3<f64>) -> Self {
        Self { from, to }
    }

    /// Per-axis bounds, in ascending order
    fn ranges(&self) -> [NumRange<f64>; 3] {
        let range = |i: usize| NumRange::new(self.from[i], self.to[i]).sorted();
        [range(0), range(1), range(2)]
    }
}

impl Shape for Parallelepiped {
    type Lattice = RectangularLattice;
    const NAME: &'static str = "parallelepiped";

    fn count_lines(&self, _lattice: &RectangularLattice) -> [usize; 3] {
        let ranges = self.ranges();
        let mut counts = [0; 3];
        for axis in Axis::ALL {
            let (b, c) = axis.others();
            if ranges[axis.index()].span() > 0.0 {
                counts[axis.index()] = ranges[b.index()].integer_count()
                    * ranges[c.index()].integer_count();
            }
        }
        counts
    }

    fn compute_lines(
        &self,
        lattice: &RectangularLattice,
        writer: &mut LineWriter,
    ) {
        let ranges = self.ranges();
        let affine = lattice.affine();
        for axis in Axis::ALL {
            let a = axis.index();
            if ranges[a].span() <= 0.0 {
                continue;
            }
            let (b, c) = axis.others();
            for ib in ranges[b.index()].integers() {
                for ic in ranges[c.index()].integers() {
                    let mut start = Point3::origin();
                    start[b.index()] = ib as f64;
                    start[c.index()] = ic as f64;
                    let mut end = start;
                    start[a] = ranges[a].min;
                    end[a] = ranges[a].max;
                    writer.push(axis, affine.apply(&start), affine.apply(&end));
                }
            }
        }
    }
}
