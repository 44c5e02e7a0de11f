use crate::{
    change::{ChangeKind, ParamValue, Parameter},
    lattice::{Coordinate, CoordinateSystem, Lattice, LatticeBase},
    transform::Pose,
    util::{self, clamp_logged},
};
use anyhow::anyhow;
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use validator::Validate;

/// Persisted state of a [SphericalLattice]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SphericalConfig {
    /// Distance between two shells
    pub radius: f64,
    /// Number of altitude steps from the north pole to the south pole
    #[validate(range(min = 1))]
    pub parallels: u32,
    /// Number of longitude steps around the polar axis
    #[validate(range(min = 1))]
    pub meridians: u32,
    pub pose: Pose,
}

impl Default for SphericalConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            parallels: 6,
            meridians: 12,
            pose: Pose::identity(),
        }
    }
}

/// Concentric spherical shells cut by parallels and meridians. Spheric
/// coordinates are `(ρ, a, m)`: `ρ` counts shells out from the center, `a`
/// counts altitude steps down from the north pole (local +Z) and runs from 0
/// to `parallels`, `m` counts longitude steps counter-clockwise from local +X.
#[derive(Debug)]
pub struct SphericalLattice {
    base: LatticeBase,
    radius: f64,
    parallels: u32,
    meridians: u32,
}

impl SphericalLattice {
    pub fn new(config: SphericalConfig) -> anyhow::Result<Self> {
        config.validate()?;
        Ok(Self {
            base: LatticeBase::new(config.pose),
            radius: clamp_logged("radius", config.radius),
            parallels: config.parallels,
            meridians: config.meridians,
        })
    }

    pub fn config(&self) -> SphericalConfig {
        SphericalConfig {
            radius: self.radius,
            parallels: self.parallels,
            meridians: self.meridians,
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

    pub fn parallels(&self) -> u32 {
        self.parallels
    }

    pub fn set_parallels(&mut self, parallels: u32) -> anyhow::Result<bool> {
        self.set_count(Parameter::Parallels, parallels)
    }

    pub fn meridians(&self) -> u32 {
        self.meridians
    }

    pub fn set_meridians(&mut self, meridians: u32) -> anyhow::Result<bool> {
        self.set_count(Parameter::Meridians, meridians)
    }

    fn set_count(
        &mut self,
        parameter: Parameter,
        value: u32,
    ) -> anyhow::Result<bool> {
        if value == 0 {
            return Err(anyhow!("{} must be at least 1", parameter));
        }
        let field = match parameter {
            Parameter::Parallels => &mut self.parallels,
            _ => &mut self.meridians,
        };
        if *field == value {
            return Ok(false);
        }
        let old = std::mem::replace(field, value);
        self.base.changed(
            parameter,
            ChangeKind::Structural,
            ParamValue::Count(old),
            ParamValue::Count(value),
        );
        Ok(true)
    }

    /// Polar angle (from local +Z) of an altitude index
    pub fn altitude_angle(&self, altitude: f64) -> f64 {
        PI * altitude / f64::from(self.parallels)
    }

    /// Azimuth (from local +X) of a longitude index
    pub fn longitude_angle(&self, longitude: f64) -> f64 {
        TAU * longitude / f64::from(self.meridians)
    }

    /// Local point for a spheric coordinate, before the affine transform
    pub(crate) fn spheric_to_local(&self, spheric: &Point3<f64>) -> Point3<f64> {
        let (sin_theta, cos_theta) = self.altitude_angle(spheric.y).sin_cos();
        let (sin_phi, cos_phi) = self.longitude_angle(spheric.z).sin_cos();
        let rho = spheric.x;
        Point3::new(
            rho * sin_theta * cos_phi,
            rho * sin_theta * sin_phi,
            rho * cos_theta,
        )
    }

    pub fn spheric_to_world(&self, spheric: &Point3<f64>) -> Point3<f64> {
        self.affine().apply(&self.spheric_to_local(spheric))
    }

    /// World point to `(ρ, a, m)`. Altitude lands in `[0, parallels]`,
    /// longitude in `[0, meridians)`. At the center and on the poles the
    /// longitude is 0.
    pub fn world_to_spheric(&self, world: &Point3<f64>) -> Point3<f64> {
        let local = self.affine().apply_inverse(world);
        let rho = local.coords.norm();
        if rho == 0.0 {
            return Point3::origin();
        }
        let theta = (local.z / rho).clamp(-1.0, 1.0).acos();
        let phi = local.y.atan2(local.x).rem_euclid(TAU);
        let altitude = theta / PI * f64::from(self.parallels);
        let longitude = phi / TAU * f64::from(self.meridians);
        let longitude = if longitude >= f64::from(self.meridians) {
            0.0
        } else {
            longitude
        };
        Point3::new(rho, altitude, longitude)
    }

    pub fn wrap_longitude(&self, longitude: f64) -> f64 {
        longitude.rem_euclid(f64::from(self.meridians))
    }

    pub fn convert(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        match system {
            CoordinateSystem::World => Ok(Coordinate::Point(*world)),
            CoordinateSystem::Spheric => {
                Ok(Coordinate::Point(self.world_to_spheric(world)))
            }
            _ => Err(self.unsupported(system)),
        }
    }

    pub fn to_world(
        &self,
        coordinate: &Coordinate,
        system: CoordinateSystem,
    ) -> anyhow::Result<Point3<f64>> {
        let point = coordinate.point().ok_or_else(|| {
            anyhow!("Spherical lattice can't take {}", coordinate)
        })?;
        match system {
            CoordinateSystem::World => Ok(point),
            CoordinateSystem::Spheric => Ok(self.spheric_to_world(&point)),
            _ => Err(self.unsupported(system)),
        }
    }
}

impl Lattice for SphericalLattice {
    const NAME: &'static str = "spherical";

    fn base(&self) -> &LatticeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LatticeBase {
        &mut self.base
    }

    fn build_forward(&self) -> Matrix4<f64> {
        self.pose().to_homogeneous() * Matrix4::new_scaling(self.radius)
    }
}
