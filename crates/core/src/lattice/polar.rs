use crate::{
    change::{ChangeKind, ParamValue, Parameter},
    lattice::{
        layered::{layered_forward, LayeredLattice},
        Coordinate, CoordinateSystem, Lattice, LatticeBase,
    },
    transform::Pose,
    util::{self, clamp_logged},
};
use anyhow::anyhow;
use nalgebra::{Matrix4, Point3, UnitQuaternion};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;
use validator::Validate;

/// Persisted state of a [PolarLattice]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PolarConfig {
    /// Distance between two rings
    pub radius: f64,
    /// Number of equal angular slices around the pole
    #[validate(range(min = 1))]
    pub sectors: u32,
    /// Distance between two layers
    pub depth: f64,
    pub pose: Pose,
}

impl Default for PolarConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            sectors: 8,
            depth: 1.0,
            pose: Pose::identity(),
        }
    }
}

/// A layered lattice of concentric rings split into equal sectors. Polar
/// coordinates are `(r, s, z)`: `r` counts rings out from the pole, `s`
/// counts sectors counter-clockwise from local +X, and `z` counts layers.
#[derive(Debug)]
pub struct PolarLattice {
    base: LatticeBase,
    radius: f64,
    sectors: u32,
    depth: f64,
}

impl PolarLattice {
    pub fn new(config: PolarConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            base: LatticeBase::new(config.pose),
            radius: clamp_logged("radius", config.radius),
            sectors: config.sectors,
            depth: clamp_logged("depth", config.depth),
        })
    }

    pub fn config(&self) -> PolarConfig {
        PolarConfig {
            radius: self.radius,
            sectors: self.sectors,
            depth: self.depth,
            pose: self.pose(),
        }
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) -> bool {
        let radius = clamp_logged("radius", radius);
        if !util::differs(self.radius, radius) {
            return false;
        }
        let old = std::mem::replace(&mut self.radius, radius);
        self.base.changed(
            Parameter::Radius,
            ChangeKind::Continuous,
            ParamValue::Scalar(old),
            ParamValue::Scalar(radius),
        );
        true
    }

    pub fn sectors(&self) -> u32 {
        self.sectors
    }

    /// Change the number of sectors. This changes which lines exist, so it's
    /// a structural change. Zero sectors is an error.
    pub fn set_sectors(&mut self, sectors: u32) -> anyhow::Result<bool> {
        if sectors == 0 {
            return Err(anyhow!("Polar lattice needs at least one sector"));
        }
        if self.sectors == sectors {
            return Ok(false);
        }
        let old = std::mem::replace(&mut self.sectors, sectors);
        self.base.changed(
            Parameter::Sectors,
            ChangeKind::Structural,
            ParamValue::Count(old),
            ParamValue::Count(sectors),
        );
        Ok(true)
    }

    /// Angle of a (possibly fractional) sector index, in radians
    pub fn sector_angle(&self, sector: f64) -> f64 {
        TAU * sector / f64::from(self.sectors)
    }

    /// Local planar point for a polar coordinate, before the affine transform
    pub(crate) fn polar_to_local(&self, polar: &Point3<f64>) -> Point3<f64> {
        let (sin, cos) = self.sector_angle(polar.y).sin_cos();
        Point3::new(polar.x * cos, polar.x * sin, polar.z)
    }

    pub fn polar_to_world(&self, polar: &Point3<f64>) -> Point3<f64> {
        self.affine().apply(&self.polar_to_local(polar))
    }

    /// World point to `(r, s, z)`. The sector index is in `[0, sectors)`.
    pub fn world_to_polar(&self, world: &Point3<f64>) -> Point3<f64> {
        let local = self.affine().apply_inverse(world);
        let r = local.x.hypot(local.y);
        let angle = local.y.atan2(local.x).rem_euclid(TAU);
        let s = angle / TAU * f64::from(self.sectors);
        // atan2 can land exactly on TAU after the modulo
        let s = if s >= f64::from(self.sectors) { 0.0 } else { s };
        Point3::new(r, s, local.z)
    }

    /// Wrap a sector index into `[0, sectors)`
    pub fn wrap_sector(&self, sector: f64) -> f64 {
        sector.rem_euclid(f64::from(self.sectors))
    }

    pub fn convert(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        match system {
            CoordinateSystem::World => Ok(Coordinate::Point(*world)),
            CoordinateSystem::Polar => {
                Ok(Coordinate::Point(self.world_to_polar(world)))
            }
            _ => Err(self.unsupported(system)),
        }
    }

    pub fn to_world(
        &self,
        coordinate: &Coordinate,
        system: CoordinateSystem,
    ) -> anyhow::Result<Point3<f64>> {
        let point = coordinate
            .point()
            .ok_or_else(|| anyhow!("Polar lattice can't take {}", coordinate))?;
        match system {
            CoordinateSystem::World => Ok(point),
            CoordinateSystem::Polar => Ok(self.polar_to_world(&point)),
            _ => Err(self.unsupported(system)),
        }
    }
}

impl Lattice for PolarLattice {
    const NAME: &'static str = "polar";

    fn base(&self) -> &LatticeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LatticeBase {
        &mut self.base
    }

    fn build_forward(&self) -> Matrix4<f64> {
        layered_forward(
            &self.pose(),
            self.radius,
            self.depth,
            &UnitQuaternion::identity(),
        )
    }
}

impl LayeredLattice for PolarLattice {
    fn depth(&self) -> f64 {
        self.depth
    }

    fn set_depth(&mut self, depth: f64) -> bool {
        let depth = clamp_logged("depth", depth);
        if !util::differs(self.depth, depth) {
            return false;
        }
        let old = std::mem::replace(&mut self.depth, depth);
        self.base.changed(
            Parameter::Depth,
            ChangeKind::Continuous,
            ParamValue::Scalar(old),
            ParamValue::Scalar(depth),
        );
        true
    }
}
