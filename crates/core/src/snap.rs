//! Snapping world points to the nearest vertex, face or cell of a lattice.
//!
//! Every lattice snaps in its own native coordinates and then hands the
//! result back in whatever [CoordinateSystem] the caller asked for. Rounding
//! ties go to the even neighbor everywhere, so snapping is deterministic for
//! points exactly halfway between two vertices.

use crate::{
    lattice::{
        hex::HexagonalLattice, polar::PolarLattice,
        rectangular::RectangularLattice, spherical::SphericalLattice, Axis,
        Coordinate, CoordinateSystem, Lattice,
    },
    util::{self, range::NumRange},
};
use nalgebra::{Point3, Vector3};

/// Nearest-point queries shared by every lattice
pub trait Snap {
    /// The lattice vertex (line intersection) closest to a world point
    fn nearest_vertex(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate>;

    /// The center of the lattice cell containing a world point
    fn nearest_cell(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate>;
}

impl RectangularLattice {
    /// Express a point in lattice coordinates in the requested system
    fn express(
        &self,
        grid: Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        match system {
            CoordinateSystem::World => {
                Ok(Coordinate::Point(self.lattice_to_world(&grid)))
            }
            CoordinateSystem::Grid => Ok(Coordinate::Point(grid)),
            _ => Err(self.unsupported(system)),
        }
    }

    /// Center of the nearest face perpendicular to `normal`. The two in-plane
    /// axes snap to cell centers, the normal axis snaps to the nearest plane.
    pub fn nearest_face(
        &self,
        world: &Point3<f64>,
        normal: Axis,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        let grid = self.world_to_lattice(world);
        let face = Point3::from(Vector3::from_fn(|i, _| {
            if i == normal.index() {
                grid[i].round_ties_even()
            } else {
                util::floor_half(grid[i])
            }
        }));
        self.express(face, system)
    }

    /// Number of whole cells a size covers along each axis. Anything that
    /// rounds to zero still covers one cell.
    fn cells_covered(&self, size: &Vector3<f64>) -> Vector3<f64> {
        size.component_div(&self.spacing())
            .map(|cells| cells.round_ties_even().abs().max(1.0))
    }

    /// Round a size to the nearest whole number of cells on each axis
    pub fn round_to_spacing(&self, size: &Vector3<f64>) -> Vector3<f64> {
        self.cells_covered(size).component_mul(&self.spacing())
    }

    /// Snap the center of an object of the given size so that its footprint
    /// lines up with the grid. On axes where the object covers an even
    /// number of cells its center lands on a grid line, otherwise in the
    /// middle of a cell.
    pub fn align_position(
        &self,
        position: &Point3<f64>,
        size: &Vector3<f64>,
    ) -> Point3<f64> {
        let grid = self.world_to_lattice(position);
        let cells = self.cells_covered(size);
        let aligned = Point3::from(Vector3::from_fn(|i, _| {
            if util::is_odd(cells[i]) {
                util::floor_half(grid[i])
            } else {
                grid[i].round_ties_even()
            }
        }));
        self.lattice_to_world(&aligned)
    }
}

impl Snap for RectangularLattice {
    fn nearest_vertex(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        let grid = self.world_to_lattice(world);
        self.express(grid.map(f64::round_ties_even), system)
    }

    fn nearest_cell(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        let grid = self.world_to_lattice(world);
        self.express(grid.map(util::floor_half), system)
    }
}

impl HexagonalLattice {
    /// Center of the nearest hex, on the nearest layer plane
    pub fn nearest_face(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        self.from_cubic(self.world_to_cubic(world).round_face(), system)
    }
}

impl Snap for HexagonalLattice {
    fn nearest_vertex(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        self.from_cubic(self.world_to_cubic(world).round_vertex(), system)
    }

    fn nearest_cell(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        self.from_cubic(self.world_to_cubic(world).round_cell(), system)
    }
}

impl PolarLattice {
    fn express(
        &self,
        polar: Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        match system {
            CoordinateSystem::World => {
                Ok(Coordinate::Point(self.polar_to_world(&polar)))
            }
            CoordinateSystem::Polar => Ok(Coordinate::Point(polar)),
            _ => Err(self.unsupported(system)),
        }
    }

    /// Center of the nearest ring/sector face, on the nearest layer plane
    pub fn nearest_face(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        let polar = self.world_to_polar(world);
        let face = Point3::new(
            util::floor_half(polar.x),
            self.wrap_sector(util::floor_half(polar.y)),
            polar.z.round_ties_even(),
        );
        self.express(face, system)
    }
}

impl Snap for PolarLattice {
    fn nearest_vertex(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        let polar = self.world_to_polar(world);
        let r = polar.x.round_ties_even();
        // Every sector meets at the pole
        let s = if r == 0.0 {
            0.0
        } else {
            self.wrap_sector(polar.y.round_ties_even())
        };
        self.express(Point3::new(r, s, polar.z.round_ties_even()), system)
    }

    fn nearest_cell(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        let polar = self.world_to_polar(world);
        let cell = Point3::new(
            util::floor_half(polar.x),
            self.wrap_sector(util::floor_half(polar.y)),
            util::floor_half(polar.z),
        );
        self.express(cell, system)
    }
}

impl SphericalLattice {
    fn express(
        &self,
        spheric: Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        match system {
            CoordinateSystem::World => {
                Ok(Coordinate::Point(self.spheric_to_world(&spheric)))
            }
            CoordinateSystem::Spheric => Ok(Coordinate::Point(spheric)),
            _ => Err(self.unsupported(system)),
        }
    }
}

impl Snap for SphericalLattice {
    fn nearest_vertex(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        let spheric = self.world_to_spheric(world);
        let parallels = f64::from(self.parallels());
        let rho = spheric.x.round_ties_even();
        let altitude = NumRange::new(0.0, parallels)
            .clamp(spheric.y.round_ties_even());
        // Every meridian meets at the poles and the center
        let on_axis = rho == 0.0 || altitude == 0.0 || altitude == parallels;
        let longitude = if on_axis {
            0.0
        } else {
            self.wrap_longitude(spheric.z.round_ties_even())
        };
        self.express(Point3::new(rho, altitude, longitude), system)
    }

    fn nearest_cell(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        let spheric = self.world_to_spheric(world);
        let parallels = f64::from(self.parallels());
        let altitude = NumRange::new(0.5, parallels - 0.5)
            .clamp(util::floor_half(spheric.y));
        let cell = Point3::new(
            util::floor_half(spheric.x),
            altitude,
            self.wrap_longitude(util::floor_half(spheric.z)),
        );
        self.express(cell, system)
    }
}
