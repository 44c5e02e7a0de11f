//! Poses and cached affine transforms. Every lattice maps its own coordinate
//! space into world space with a single 4×4 homogeneous matrix, built from the
//! lattice parameters plus the pose of whatever scene node the host attached
//! the lattice to. Building and inverting that matrix is cheap but not free,
//! and it gets read for every converted point and every generated line, so
//! each lattice memoizes it in an [AffineCache].

use crate::util::CHANGE_EPSILON;
use log::{debug, warn};
use nalgebra::{
    Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3,
};
use serde::{Deserialize, Serialize};
use std::cell::Cell;

/// Position and rotation of a lattice in world space. There is intentionally
/// no scale here: lattices are measured in their own units (spacing, radius,
/// depth), never by the scale of the node they hang off of.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pose {
    pub position: Vector3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl Pose {
    pub fn new(position: Vector3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { position, rotation }
    }

    /// No translation, no rotation
    pub fn identity() -> Self {
        Self::new(Vector3::zeros(), UnitQuaternion::identity())
    }

    /// A pose that only translates
    pub fn from_position(position: Vector3<f64>) -> Self {
        Self::new(position, UnitQuaternion::identity())
    }

    /// The rigid-body transform of this pose as a homogeneous matrix
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        Isometry3::from_parts(Translation3::from(self.position), self.rotation)
            .to_homogeneous()
    }

    /// Are these two poses the same, give or take float noise? Used to drop
    /// pose updates that wouldn't visibly move anything.
    pub fn approx_eq(&self, other: &Self) -> bool {
        (self.position - other.position).amax() <= CHANGE_EPSILON
            && self.rotation.angle_to(&other.rotation) <= CHANGE_EPSILON
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

/// A forward transform (lattice space to world space) along with its inverse.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Affine {
    pub forward: Matrix4<f64>,
    pub inverse: Matrix4<f64>,
    /// `forward` had no true inverse, so `inverse` is only a pseudo-inverse.
    /// Points mapped through it can't be recovered.
    pub singular: bool,
}

impl Affine {
    /// Tolerance on singular values when falling back to a pseudo-inverse
    const PSEUDO_INVERSE_EPSILON: f64 = 1.0e-12;

    /// Pair a forward matrix with its inverse. Lattice parameters are clamped
    /// so that the scale part is never singular, but an extreme shear can
    /// still collapse the matrix. In that case we fall back to the SVD
    /// pseudo-inverse, which at least maps points back onto the collapsed
    /// image.
    pub fn from_forward(forward: Matrix4<f64>) -> Self {
        match forward.try_inverse() {
            Some(inverse) => Self {
                forward,
                inverse,
                singular: false,
            },
            None => {
                warn!("Lattice transform is singular, using pseudo-inverse");
                let inverse = forward
                    .pseudo_inverse(Self::PSEUDO_INVERSE_EPSILON)
                    .unwrap_or_else(|_| Matrix4::identity());
                Self {
                    forward,
                    inverse,
                    singular: true,
                }
            }
        }
    }

    pub fn identity() -> Self {
        Self {
            forward: Matrix4::identity(),
            inverse: Matrix4::identity(),
            singular: false,
        }
    }

    /// Map a point from lattice space to world space
    pub fn apply(&self, point: &Point3<f64>) -> Point3<f64> {
        self.forward.transform_point(point)
    }

    /// Map a point from world space to lattice space
    pub fn apply_inverse(&self, point: &Point3<f64>) -> Point3<f64> {
        self.inverse.transform_point(point)
    }
}

/// Everything needed to decide whether a cached transform is still good: the
/// pose it was built for, and the transform itself.
#[derive(Copy, Clone, Debug)]
struct CachedTransform {
    pose: Pose,
    affine: Affine,
}

/// Memoized forward/inverse transform for one lattice.
///
/// The cache is either empty (dirty) or holds the transform together with the
/// pose it was computed for. A read only hits the cache when the stored pose
/// matches the live one, so a moved scene node invalidates it without anyone
/// having to remember to clear it. Parameter setters clear it explicitly via
/// [AffineCache::invalidate].
///
/// The cache lives in a [Cell] so that reads can go through `&self`. This is
/// a single-thread, single-writer structure: the only writer is the lattice
/// itself, from inside [AffineCache::get].
#[derive(Clone, Debug, Default)]
pub struct AffineCache {
    cached: Cell<Option<CachedTransform>>,
}

impl AffineCache {
    /// Mark the cache dirty. The next read will rebuild the transform.
    pub fn invalidate(&self) {
        self.cached.set(None);
    }

    /// Would a read with the given pose have to rebuild?
    pub fn is_stale(&self, pose: &Pose) -> bool {
        match self.cached.get() {
            Some(cached) => cached.pose != *pose,
            None => true,
        }
    }

    /// Get the transform for the given pose. If the cache is dirty or was
    /// filled for a different pose, `build` is called to produce a fresh
    /// forward matrix, which is then inverted and stored.
    pub fn get(
        &self,
        pose: &Pose,
        build: impl FnOnce() -> Matrix4<f64>,
    ) -> Affine {
        match self.cached.get() {
            Some(cached) if cached.pose == *pose => cached.affine,
            _ => {
                let affine = Affine::from_forward(build());
                debug!("Rebuilt lattice transform for pose {:?}", pose);
                self.cached.set(Some(CachedTransform {
                    pose: *pose,
                    affine,
                }));
                affine
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_pose_to_homogeneous() {
        let pose = Pose::new(
            Vector3::new(1.0, 2.0, 3.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2),
        );
        let point = pose
            .to_homogeneous()
            .transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert_approx_eq!(point.x, 1.0);
        assert_approx_eq!(point.y, 3.0);
        assert_approx_eq!(point.z, 3.0);
    }

    #[test]
    fn test_pose_approx_eq() {
        let pose = Pose::from_position(Vector3::new(1.0, 1.0, 1.0));
        let nudged = Pose::from_position(Vector3::new(1.0, 1.0 + 1.0e-9, 1.0));
        let moved = Pose::from_position(Vector3::new(1.0, 1.1, 1.0));
        assert!(pose.approx_eq(&nudged));
        assert!(!pose.approx_eq(&moved));
    }

    #[test]
    fn test_cache_reuses_until_invalidated() {
        let cache = AffineCache::default();
        let pose = Pose::identity();
        let mut builds = 0;

        cache.get(&pose, || {
            builds += 1;
            Matrix4::new_scaling(2.0)
        });
        cache.get(&pose, || {
            builds += 1;
            Matrix4::new_scaling(2.0)
        });
        assert_eq!(builds, 1);

        cache.invalidate();
        assert!(cache.is_stale(&pose));
        let affine = cache.get(&pose, || {
            builds += 1;
            Matrix4::new_scaling(4.0)
        });
        assert_eq!(builds, 2);
        assert_approx_eq!(affine.inverse[(0, 0)], 0.25);
    }

    #[test]
    fn test_cache_rebuilds_on_pose_change() {
        let cache = AffineCache::default();
        let mut builds = 0;
        cache.get(&Pose::identity(), || {
            builds += 1;
            Matrix4::identity()
        });
        let moved = Pose::from_position(Vector3::new(0.0, 5.0, 0.0));
        assert!(cache.is_stale(&moved));
        cache.get(&moved, || {
            builds += 1;
            moved.to_homogeneous()
        });
        assert_eq!(builds, 2);
    }

    #[test]
    fn test_singular_falls_back() {
        let mut forward = Matrix4::identity();
        forward[(0, 0)] = 0.0;
        let affine = Affine::from_forward(forward);
        assert!(affine.singular);
        assert!(affine.inverse.iter().all(|v| v.is_finite()));

        let affine = Affine::from_forward(Matrix4::new_scaling(2.0));
        assert!(!affine.singular);
        assert!(!Affine::identity().singular);
    }
}
