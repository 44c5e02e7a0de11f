use crate::{
    lattice::{spherical::SphericalLattice, Axis, Lattice},
    lines::{
        arc::{self, CircularRange},
        LineWriter, Shape,
    },
    util::range::NumRange,
};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Part of a spherical lattice, bounded by shell, altitude and longitude.
///
/// - X: parallels (circles of constant altitude). The poles are points, so
///   they get none.
/// - Y: meridians (half circles of constant longitude)
/// - Z: radial lines from the inner shell to the outer one, through every
///   parallel/meridian node. Each pole gets exactly one.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sphere {
    pub longitude_from: f64,
    /// Wraps through 0 if less than `longitude_from`
    pub longitude_to: f64,
    /// Segments per altitude or longitude step. Anything below 1 counts as
    /// 1.
    pub smoothness: u32,
    /// Shell extent. Negative values are raised to 0.
    pub shells: NumRange<f64>,
    /// Altitude extent, clamped to `[0, parallels]` of the lattice
    pub altitude: NumRange<f64>,
}

impl Default for Sphere {
    fn default() -> Self {
        Self {
            shells: NumRange::new(0.0, 2.0),
            altitude: NumRange::new(0.0, 6.0),
            longitude_from: 0.0,
            longitude_to: 12.0,
            smoothness: 4,
        }
    }
}

/// Extents of a [Sphere], resolved against a particular lattice
struct Bounds {
    shells: NumRange<f64>,
    altitude: NumRange<f64>,
    longitude: CircularRange,
    parallels: f64,
}

impl Bounds {
    /// Whole shells with a real surface
    fn shells(&self) -> impl Iterator<Item = f64> {
        self.shells.integers().filter(|s| *s >= 1).map(|s| s as f64)
    }

    /// Whole altitudes strictly between the poles
    fn parallels(&self) -> impl Iterator<Item = f64> + '_ {
        self.altitude
            .integers()
            .map(|a| a as f64)
            .filter(move |a| *a > 0.0 && *a < self.parallels)
    }

    /// Poles that fall inside the altitude extent
    fn poles(&self) -> impl Iterator<Item = f64> + '_ {
        [0.0, self.parallels]
            .into_iter()
            .filter(move |pole| self.altitude.contains(*pole))
    }
}

impl Sphere {
    fn bounds(&self, lattice: &SphericalLattice) -> Bounds {
        let parallels = f64::from(lattice.parallels());
        let limits = NumRange::new(0.0, parallels);
        let altitude = self.altitude.sorted();
        Bounds {
            shells: self.shells.sorted().non_negative(),
            altitude: NumRange::new(
                limits.clamp(altitude.min),
                limits.clamp(altitude.max),
            ),
            longitude: CircularRange::new(
                self.longitude_from,
                self.longitude_to,
                f64::from(lattice.meridians()),
            ),
            parallels,
        }
    }

    fn smoothness(&self) -> u32 {
        self.smoothness.max(1)
    }
}

impl Shape for Sphere {
    type Lattice = SphericalLattice;
    const NAME: &'static str = "sphere";

    fn count_lines(&self, lattice: &SphericalLattice) -> [usize; 3] {
        let bounds = self.bounds(lattice);
        let shells = bounds.shells().count();
        let parallels = bounds.parallels().count();
        let steps = bounds.longitude.step_count();

        let around = bounds.longitude.segments(self.smoothness());
        let x = shells * parallels * around;
        let y = shells
            * steps
            * arc::subdivisions(bounds.altitude.span(), self.smoothness());
        let z = if bounds.shells.span() > 0.0 {
            parallels * steps + bounds.poles().count()
        } else {
            0
        };
        [x, y, z]
    }

    fn compute_lines(
        &self,
        lattice: &SphericalLattice,
        writer: &mut LineWriter,
    ) {
        let bounds = self.bounds(lattice);
        let longitude = bounds.longitude;
        let altitude = bounds.altitude;
        let affine = lattice.affine();
        let world = |rho: f64, a: f64, m: f64| {
            affine.apply(&lattice.spheric_to_local(&Point3::new(rho, a, m)))
        };
        let around = longitude.segments(self.smoothness());
        let down = arc::subdivisions(altitude.span(), self.smoothness());

        for rho in bounds.shells() {
            for a in bounds.parallels() {
                for i in 0..around {
                    let from = longitude.lerp(i as f64 / around as f64);
                    let to = longitude.lerp((i + 1) as f64 / around as f64);
                    writer.push(
                        Axis::X,
                        world(rho, a, from),
                        world(rho, a, to),
                    );
                }
            }
            for m in longitude.steps().map(|m| m as f64) {
                for i in 0..down {
                    let from = altitude.lerp(i as f64 / down as f64);
                    let to = altitude.lerp((i + 1) as f64 / down as f64);
                    writer.push(
                        Axis::Y,
                        world(rho, from, m),
                        world(rho, to, m),
                    );
                }
            }
        }

        if bounds.shells.span() > 0.0 {
            let (inner, outer) = (bounds.shells.min, bounds.shells.max);
            for a in bounds.parallels() {
                for m in longitude.steps().map(|m| m as f64) {
                    writer.push(
                        Axis::Z,
                        world(inner, a, m),
                        world(outer, a, m),
                    );
                }
            }
            for pole in bounds.poles() {
                writer.push(
                    Axis::Z,
                    world(inner, pole, 0.0),
                    world(outer, pole, 0.0),
                );
            }
        }
    }
}
