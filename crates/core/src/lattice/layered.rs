use crate::{lattice::Lattice, transform::Pose};
use nalgebra::{Matrix4, UnitQuaternion, Vector3};

/// A lattice made of identical 2D layers stacked along local Z. Hexagonal
/// and polar lattices are both layered: they share the stacking logic and
/// only differ in the planar part.
pub trait LayeredLattice: Lattice {
    /// Distance between two adjacent layers
    fn depth(&self) -> f64;

    /// Change the layer distance. Returns whether anything changed.
    fn set_depth(&mut self, depth: f64) -> bool;

    /// World-space vector covering one layer step
    fn stacking_axis(&self) -> Vector3<f64> {
        self.forward_matrix().transform_vector(&Vector3::z())
    }
}

/// Forward transform shared by layered lattices: scale the planar axes and
/// the stacking axis separately, spin the layout within its plane, then place
/// it with the pose.
pub fn layered_forward(
    pose: &Pose,
    planar: f64,
    depth: f64,
    orientation: &UnitQuaternion<f64>,
) -> Matrix4<f64> {
    pose.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(&Vector3::new(planar, planar, depth))
        * orientation.to_homogeneous()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use nalgebra::Point3;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_layered_forward() {
        let pose = Pose::from_position(Vector3::new(0.0, 0.0, 10.0));
        let orientation =
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let forward = layered_forward(&pose, 2.0, 3.0, &orientation);
        let point = forward.transform_point(&Point3::new(1.0, 0.0, 1.0));
        assert_approx_eq!(point.x, 0.0);
        assert_approx_eq!(point.y, 2.0);
        assert_approx_eq!(point.z, 13.0);
    }
}
