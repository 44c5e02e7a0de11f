//! Layered hexagonal lattices.
//!
//! Each layer is a plane of regular hexagons, and layers stack along local Z
//! `depth` apart. Within a layer, hexes are addressed with cube coordinates
//! (see [CubicPoint]), where cube `x` picks a column and moving along `y - z`
//! moves up the column. The circumradius of each hex is the lattice `radius`.
//!
//! With [Sides::Pointed], one corner of each hex points along local +X, so the
//! tops and bottoms of hexes are flat and columns run along Y. [Sides::Flat]
//! rotates that whole layout a quarter turn about the stacking axis.
//!
//! The same lattice can be addressed in a few alternate 2D tilings, all of
//! which are exact linear bijections of cube coordinates:
//!
//! - **Herringbone**: columns of hexes where every other column is shifted
//!   half a hex (up or down)
//! - **Rhombic**: columns of hexes where each column is shifted half a hex
//!   relative to the previous one, forming a rhombus

mod cubic;

pub use cubic::{CubicPoint, HexCompass, HexCorner, HexDirection, Slant};

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
use derive_more::Display;
use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use strum::{EnumIter, EnumString};

/// Which way the hexes face within their layer
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
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
pub enum Sides {
    /// A corner points along local +X
    #[default]
    Pointed,
    /// A side faces local +X
    Flat,
}

impl Sides {
    /// In-plane rotation applied to the pointed layout
    pub fn orientation(self) -> UnitQuaternion<f64> {
        match self {
            Self::Pointed => UnitQuaternion::identity(),
            Self::Flat => {
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2)
            }
        }
    }
}

/// Persisted state of a [HexagonalLattice]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexagonalConfig {
    /// Distance from a hex's center to any of its corners
    pub radius: f64,
    /// Distance between two layers
    pub depth: f64,
    pub sides: Sides,
    pub pose: Pose,
}

impl Default for HexagonalConfig {
    fn default() -> Self {
        Self {
            radius: 1.0,
            depth: 1.0,
            sides: Sides::Pointed,
            pose: Pose::identity(),
        }
    }
}

#[derive(Debug)]
pub struct HexagonalLattice {
    base: LatticeBase,
    radius: f64,
    depth: f64,
    sides: Sides,
}

impl HexagonalLattice {
    pub fn new(config: HexagonalConfig) -> Self {
        Self {
            base: LatticeBase::new(config.pose),
            radius: clamp_logged("radius", config.radius),
            depth: clamp_logged("depth", config.depth),
            sides: config.sides,
        }
    }

    pub fn config(&self) -> HexagonalConfig {
        HexagonalConfig {
            radius: self.radius,
            depth: self.depth,
            sides: self.sides,
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

    pub fn sides(&self) -> Sides {
        self.sides
    }

    /// Switch the hex orientation. This is just an in-plane rotation, so
    /// existing lines can follow it without being recomputed.
    pub fn set_sides(&mut self, sides: Sides) -> bool {
        if self.sides == sides {
            return false;
        }
        let old = std::mem::replace(&mut self.sides, sides);
        self.base.changed(
            Parameter::Sides,
            ChangeKind::Continuous,
            ParamValue::Sides(old),
            ParamValue::Sides(sides),
        );
        true
    }

    pub fn world_to_cubic(&self, world: &Point3<f64>) -> CubicPoint {
        CubicPoint::from_planar(&self.affine().apply_inverse(world))
    }

    pub fn cubic_to_world(&self, cubic: &CubicPoint) -> Point3<f64> {
        self.affine().apply(&cubic.to_planar())
    }

    /// Express a cube coordinate in another system. Used as the last step of
    /// every conversion and snapping query.
    pub fn from_cubic(
        &self,
        cubic: CubicPoint,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        let point = match system {
            CoordinateSystem::Cubic => return Ok(Coordinate::Cubic(cubic)),
            CoordinateSystem::World => self.cubic_to_world(&cubic),
            CoordinateSystem::HerringboneUp => cubic.to_herringbone(Slant::Up),
            CoordinateSystem::HerringboneDown => {
                cubic.to_herringbone(Slant::Down)
            }
            CoordinateSystem::RhombicUp => cubic.to_rhombic(Slant::Up),
            CoordinateSystem::RhombicDown => cubic.to_rhombic(Slant::Down),
            _ => return Err(self.unsupported(system)),
        };
        Ok(Coordinate::Point(point))
    }

    /// Turn a coordinate in some system back into cube coordinates
    pub fn to_cubic(
        &self,
        coordinate: &Coordinate,
        system: CoordinateSystem,
    ) -> anyhow::Result<CubicPoint> {
        let point = match (system, coordinate) {
            (CoordinateSystem::Cubic, Coordinate::Cubic(cubic)) => {
                return Ok(*cubic)
            }
            (CoordinateSystem::Cubic, Coordinate::Point(_)) => {
                return Err(anyhow!(
                    "Expected a cubic coordinate, got {}",
                    coordinate
                ))
            }
            (_, Coordinate::Point(point)) => point,
            (_, Coordinate::Cubic(_)) => {
                return Err(anyhow!(
                    "Cubic coordinate {} passed for {} system",
                    coordinate,
                    system
                ))
            }
        };
        match system {
            CoordinateSystem::World => Ok(self.world_to_cubic(point)),
            CoordinateSystem::HerringboneUp => {
                Ok(CubicPoint::from_herringbone(point, Slant::Up))
            }
            CoordinateSystem::HerringboneDown => {
                Ok(CubicPoint::from_herringbone(point, Slant::Down))
            }
            CoordinateSystem::RhombicUp => {
                Ok(CubicPoint::from_rhombic(point, Slant::Up))
            }
            CoordinateSystem::RhombicDown => {
                Ok(CubicPoint::from_rhombic(point, Slant::Down))
            }
            _ => Err(self.unsupported(system)),
        }
    }

    /// Convert a world point into the given system
    pub fn convert(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        match system {
            CoordinateSystem::World => Ok(Coordinate::Point(*world)),
            _ => self.from_cubic(self.world_to_cubic(world), system),
        }
    }

    /// Convert a coordinate in the given system into world space
    pub fn to_world(
        &self,
        coordinate: &Coordinate,
        system: CoordinateSystem,
    ) -> anyhow::Result<Point3<f64>> {
        match (system, coordinate) {
            (CoordinateSystem::World, Coordinate::Point(point)) => Ok(*point),
            _ => Ok(self.cubic_to_world(&self.to_cubic(coordinate, system)?)),
        }
    }
}

impl Lattice for HexagonalLattice {
    const NAME: &'static str = "hexagonal";

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
            &self.sides.orientation(),
        )
    }
}

impl LayeredLattice for HexagonalLattice {
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
