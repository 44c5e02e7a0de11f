use crate::{
    change::{ChangeKind, ParamValue, Parameter},
    lattice::{Axis, Coordinate, CoordinateSystem, Lattice, LatticeBase},
    transform::Pose,
    util,
};
use log::debug;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Skew factors for a rectangular lattice. Field `ab` is how far axis `a`
/// moves per unit along axis `b`, so `xy = 0.5` tilts the lines of constant X
/// by half a unit for each unit of Y.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Shearing {
    pub xy: f64,
    pub xz: f64,
    pub yx: f64,
    pub yz: f64,
    pub zx: f64,
    pub zy: f64,
}

impl Shearing {
    pub fn to_array(&self) -> [f64; 6] {
        [self.xy, self.xz, self.yx, self.yz, self.zx, self.zy]
    }

    pub fn to_matrix(&self) -> Matrix4<f64> {
        Matrix4::new(
            1.0, self.xy, self.xz, 0.0, //
            self.yx, 1.0, self.yz, 0.0, //
            self.zx, self.zy, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn differs(&self, other: &Self) -> bool {
        self.to_array()
            .iter()
            .zip(other.to_array().iter())
            .any(|(a, b)| util::differs(*a, *b))
    }
}

/// Persisted state of a [RectangularLattice]
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectangularConfig {
    /// Distance between vertices along each lattice axis
    pub spacing: Vector3<f64>,
    pub shearing: Shearing,
    pub pose: Pose,
}

impl Default for RectangularConfig {
    fn default() -> Self {
        Self {
            spacing: Vector3::new(1.0, 1.0, 1.0),
            shearing: Shearing::default(),
            pose: Pose::identity(),
        }
    }
}

/// A grid of boxes, optionally sheared into parallelepipeds. Integer lattice
/// coordinates are vertices, half-integer coordinates are cell centers.
#[derive(Debug)]
pub struct RectangularLattice {
    base: LatticeBase,
    spacing: Vector3<f64>,
    shearing: Shearing,
}

impl RectangularLattice {
    pub fn new(config: RectangularConfig) -> Self {
        Self {
            base: LatticeBase::new(config.pose),
            spacing: clamp_spacing(config.spacing),
            shearing: config.shearing,
        }
    }

    pub fn config(&self) -> RectangularConfig {
        RectangularConfig {
            spacing: self.spacing,
            shearing: self.shearing,
            pose: self.pose(),
        }
    }

    pub fn spacing(&self) -> Vector3<f64> {
        self.spacing
    }

    /// Change the spacing. Components are floored at
    /// [MIN_EXTENT](util::MIN_EXTENT). Returns whether anything changed.
    pub fn set_spacing(&mut self, spacing: Vector3<f64>) -> bool {
        let spacing = clamp_spacing(spacing);
        if !util::vectors_differ(&self.spacing, &spacing) {
            return false;
        }
        let old = std::mem::replace(&mut self.spacing, spacing);
        self.base.changed(
            Parameter::Spacing,
            ChangeKind::Continuous,
            ParamValue::Vector(old),
            ParamValue::Vector(spacing),
        );
        true
    }

    pub fn shearing(&self) -> Shearing {
        self.shearing
    }

    pub fn set_shearing(&mut self, shearing: Shearing) -> bool {
        if !self.shearing.differs(&shearing) {
            return false;
        }
        let old = std::mem::replace(&mut self.shearing, shearing);
        self.base.changed(
            Parameter::Shearing,
            ChangeKind::Continuous,
            ParamValue::Shear(old.to_array()),
            ParamValue::Shear(shearing.to_array()),
        );
        true
    }

    pub fn world_to_lattice(&self, world: &Point3<f64>) -> Point3<f64> {
        self.affine().apply_inverse(world)
    }

    pub fn lattice_to_world(&self, lattice: &Point3<f64>) -> Point3<f64> {
        self.affine().apply(lattice)
    }

    /// World-space vector covering one step along a lattice axis
    pub fn axis(&self, axis: Axis) -> Vector3<f64> {
        let affine = self.affine();
        affine.apply(&Point3::from(axis.unit())) - affine.apply(&Point3::origin())
    }

    /// Like [Self::axis], but with a raw index. Anything outside `0..=2`
    /// is an error.
    pub fn axis_by_index(&self, index: usize) -> anyhow::Result<Vector3<f64>> {
        Ok(self.axis(Axis::try_from(index)?))
    }

    pub fn right(&self) -> Vector3<f64> {
        self.axis(Axis::X)
    }

    pub fn up(&self) -> Vector3<f64> {
        self.axis(Axis::Y)
    }

    pub fn forward(&self) -> Vector3<f64> {
        self.axis(Axis::Z)
    }

    /// Convert a world point into the given system
    pub fn convert(
        &self,
        world: &Point3<f64>,
        system: CoordinateSystem,
    ) -> anyhow::Result<Coordinate> {
        match system {
            CoordinateSystem::World => Ok(Coordinate::Point(*world)),
            CoordinateSystem::Grid => {
                Ok(Coordinate::Point(self.world_to_lattice(world)))
            }
            _ => Err(self.unsupported(system)),
        }
    }
}

impl Lattice for RectangularLattice {
    const NAME: &'static str = "rectangular";

    fn base(&self) -> &LatticeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut LatticeBase {
        &mut self.base
    }

    fn build_forward(&self) -> Matrix4<f64> {
        self.pose().to_homogeneous()
            * self.shearing.to_matrix()
            * Matrix4::new_nonuniform_scaling(&self.spacing)
    }
}

fn clamp_spacing(spacing: Vector3<f64>) -> Vector3<f64> {
    let clamped = util::clamp_extents(spacing);
    if clamped != spacing {
        debug!("Clamped spacing {:?} to {:?}", spacing, clamped);
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::Revision;
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::UnitQuaternion;
    use std::{cell::Cell, f64::consts::FRAC_PI_2, rc::Rc};

    fn lattice(spacing: Vector3<f64>) -> RectangularLattice {
        RectangularLattice::new(RectangularConfig {
            spacing,
            ..Default::default()
        })
    }

    #[test]
    fn test_spacing_clamped() {
        let lattice = lattice(Vector3::new(0.0, -1.0, 2.0));
        assert_eq!(
            lattice.spacing(),
            Vector3::new(util::MIN_EXTENT, util::MIN_EXTENT, 2.0)
        );
        let det = lattice.forward_matrix().determinant();
        assert!(det.abs() > 0.0);
    }

    #[test]
    fn test_conversions() {
        let mut lattice = lattice(Vector3::new(2.0, 3.0, 4.0));
        lattice.set_pose(Pose::from_position(Vector3::new(1.0, 1.0, 1.0)));
        let world = lattice.lattice_to_world(&Point3::new(1.0, 1.0, 1.0));
        assert_approx_eq!(world.x, 3.0);
        assert_approx_eq!(world.y, 4.0);
        assert_approx_eq!(world.z, 5.0);
        let back = lattice.world_to_lattice(&world);
        assert_approx_eq!(back.x, 1.0);
        assert_approx_eq!(back.y, 1.0);
        assert_approx_eq!(back.z, 1.0);
    }

    #[test]
    fn test_axes() {
        let mut lattice = lattice(Vector3::new(2.0, 1.0, 1.0));
        lattice.set_pose(Pose::new(
            Vector3::new(5.0, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        ));
        let right = lattice.right();
        assert_approx_eq!(right.x, 0.0);
        assert_approx_eq!(right.y, 2.0);
        assert_approx_eq!(lattice.forward().z, 1.0);
        assert!(lattice.axis_by_index(2).is_ok());
        let error = lattice.axis_by_index(3).unwrap_err();
        assert_eq!(
            error.downcast_ref::<crate::LatticeError>(),
            Some(&crate::LatticeError::AxisOutOfRange(3))
        );
    }

    #[test]
    fn test_shearing() {
        let mut lattice = lattice(Vector3::new(1.0, 1.0, 1.0));
        assert!(lattice.set_shearing(Shearing {
            xy: 0.5,
            ..Default::default()
        }));
        let world = lattice.lattice_to_world(&Point3::new(0.0, 2.0, 0.0));
        assert_approx_eq!(world.x, 1.0);
        assert_approx_eq!(world.y, 2.0);
    }

    #[test]
    fn test_setter_epsilon() {
        let mut lattice = lattice(Vector3::new(1.0, 1.0, 1.0));
        let events = Rc::new(Cell::new(0));
        let events_clone = Rc::clone(&events);
        lattice.subscribe(ChangeKind::Continuous, move |change| {
            assert_eq!(change.parameter, Parameter::Spacing);
            events_clone.set(events_clone.get() + 1);
        });

        assert!(!lattice.set_spacing(Vector3::new(1.0, 1.0, 1.0 + 1.0e-9)));
        assert_eq!(events.get(), 0);
        assert!(lattice.set_spacing(Vector3::new(2.0, 1.0, 1.0)));
        assert_eq!(events.get(), 1);
        assert_eq!(
            lattice.revision(),
            Revision {
                structural: 0,
                continuous: 1
            }
        );
    }

    #[test]
    fn test_unsupported_system() {
        let lattice = lattice(Vector3::new(1.0, 1.0, 1.0));
        assert!(lattice
            .convert(&Point3::origin(), CoordinateSystem::Cubic)
            .is_err());
    }
}
