//! Lattices: parametrized grids that map their own coordinate space into
//! world space. Every lattice owns a [LatticeBase] (pose, transform cache,
//! change notifier) and implements [Lattice] by describing how to build its
//! forward transform. Everything else (caching, inversion, pose tracking,
//! change events) comes for free from the trait's provided methods.
//!
//! ## Coordinate systems
//!
//! Each lattice understands a subset of [CoordinateSystem]s. Conversions and
//! snapping queries take a system tag and fail with
//! [LatticeError::UnsupportedSystem] if the lattice can't speak it.
//!
//! | Lattice       | Systems                                                   |
//! |---------------|-----------------------------------------------------------|
//! | Rectangular   | `world`, `grid`                                           |
//! | Hexagonal     | `world`, `cubic`, `herringbone_{up,down}`, `rhombic_{up,down}` |
//! | Polar         | `world`, `polar`                                          |
//! | Spherical     | `world`, `spheric`                                        |

pub mod hex;
pub mod layered;
pub mod polar;
pub mod rectangular;
pub mod spherical;

use crate::{
    change::{
        ChangeKind, ChangeNotifier, LatticeChange, ListenerId, ParamValue,
        Parameter, Revision,
    },
    lattice::hex::CubicPoint,
    transform::{Affine, AffineCache, Pose},
};
use derive_more::Display;
use log::debug;
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use strum::{EnumIter, EnumString};

/// Typed failures that callers may want to downcast out of an
/// [anyhow::Error].
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum LatticeError {
    /// The caller asked for a coordinate system the lattice doesn't support
    #[display(fmt = "{} lattice does not support the {} system", lattice, system)]
    UnsupportedSystem {
        system: CoordinateSystem,
        lattice: &'static str,
    },
    /// An axis/group index outside of `0..=2`
    #[display(fmt = "axis index {} out of range (expected 0-2)", _0)]
    AxisOutOfRange(usize),
}

impl std::error::Error for LatticeError {}

/// Tags for every coordinate system a lattice might understand
#[derive(
    Copy,
    Clone,
    Debug,
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
pub enum CoordinateSystem {
    /// Plain world space
    World,
    /// Rectangular lattice space, where integer coordinates are vertices
    Grid,
    /// Hex cube coordinates plus a layer
    Cubic,
    /// Hex columns, where odd columns sit half a cell higher
    HerringboneUp,
    /// Hex columns, where odd columns sit half a cell lower
    HerringboneDown,
    /// Hex columns, each one half a cell higher than the one before
    RhombicUp,
    /// Hex columns, each one half a cell lower than the one before
    RhombicDown,
    /// `(ring, sector, layer)`
    Polar,
    /// `(shell, altitude, longitude)`
    Spheric,
}

/// The result of a conversion or snapping query. Hex cube coordinates have
/// four components so they get their own variant; every other system fits in
/// a 3D point.
#[derive(Copy, Clone, Debug, Display, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coordinate {
    #[display(fmt = "{}", _0)]
    Cubic(CubicPoint),
    #[display(fmt = "({}, {}, {})", "_0.x", "_0.y", "_0.z")]
    Point(Point3<f64>),
}

impl Coordinate {
    /// Get the 3D point, if this isn't a cube coordinate
    pub fn point(&self) -> Option<Point3<f64>> {
        match self {
            Self::Point(point) => Some(*point),
            Self::Cubic(_) => None,
        }
    }

    /// Get the cube coordinate, if this is one
    pub fn cubic(&self) -> Option<CubicPoint> {
        match self {
            Self::Cubic(cubic) => Some(*cubic),
            Self::Point(_) => None,
        }
    }
}

/// One of the three lattice axes. Also used to index the three groups of a
/// [LineSet](crate::LineSet).
#[derive(
    Copy,
    Clone,
    Debug,
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
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Self; 3] = [Self::X, Self::Y, Self::Z];

    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The unit vector along this axis
    pub fn unit(self) -> Vector3<f64> {
        let mut v = Vector3::zeros();
        v[self.index()] = 1.0;
        v
    }

    /// The other two axes, in cyclic order
    pub fn others(self) -> (Self, Self) {
        match self {
            Self::X => (Self::Y, Self::Z),
            Self::Y => (Self::Z, Self::X),
            Self::Z => (Self::X, Self::Y),
        }
    }
}

impl TryFrom<usize> for Axis {
    type Error = LatticeError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(LatticeError::AxisOutOfRange(index))
    }
}

/// State that every lattice carries regardless of its shape
#[derive(Debug, Default)]
pub struct LatticeBase {
    pose: Pose,
    cache: AffineCache,
    notifier: ChangeNotifier,
}

impl LatticeBase {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            ..Default::default()
        }
    }

    /// Record a parameter change: clear the cached transform, then tell
    /// listeners. The caller has already stored the new value and decided
    /// that it's a real change.
    pub fn changed(
        &mut self,
        parameter: Parameter,
        kind: ChangeKind,
        old: ParamValue,
        new: ParamValue,
    ) {
        debug!("{} changed ({}): {:?} -> {:?}", parameter, kind, old, new);
        self.cache.invalidate();
        self.notifier.emit(LatticeChange {
            parameter,
            kind,
            old,
            new,
        });
    }
}

/// A grid with a cached affine transform from lattice space to world space.
/// Implementors supply the pure transform construction, the trait handles
/// everything around it.
pub trait Lattice {
    /// Human-readable lattice kind, used in errors and logs
    const NAME: &'static str;

    fn base(&self) -> &LatticeBase;

    fn base_mut(&mut self) -> &mut LatticeBase;

    /// Build the forward transform from the current parameters and pose. This
    /// should be a pure function; it's only called on a cache miss.
    fn build_forward(&self) -> Matrix4<f64>;

    fn pose(&self) -> Pose {
        self.base().pose
    }

    /// Move the lattice. Updates that don't actually move anything (within
    /// float noise) are dropped. Returns whether the pose changed.
    fn set_pose(&mut self, pose: Pose) -> bool {
        let base = self.base_mut();
        if base.pose.approx_eq(&pose) {
            return false;
        }
        let old = base.pose;
        base.pose = pose;
        // No explicit invalidation here, the cache sees the pose mismatch on
        // its own
        base.notifier.emit(LatticeChange {
            parameter: Parameter::Pose,
            kind: ChangeKind::Continuous,
            old: ParamValue::Pose(old),
            new: ParamValue::Pose(pose),
        });
        true
    }

    /// The current forward/inverse transform pair. Rebuilt first if any
    /// parameter changed or the pose moved since the last read.
    fn affine(&self) -> Affine {
        let base = self.base();
        base.cache.get(&base.pose, || self.build_forward())
    }

    fn forward_matrix(&self) -> Matrix4<f64> {
        self.affine().forward
    }

    fn inverse_matrix(&self) -> Matrix4<f64> {
        self.affine().inverse
    }

    fn revision(&self) -> Revision {
        self.base().notifier.revision()
    }

    fn subscribe(
        &mut self,
        kind: ChangeKind,
        listener: impl FnMut(&LatticeChange) + 'static,
    ) -> ListenerId
    where
        Self: Sized,
    {
        self.base_mut().notifier.subscribe(kind, listener)
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.base_mut().notifier.unsubscribe(id)
    }

    /// Build the error for a coordinate system this lattice doesn't support
    fn unsupported(&self, system: CoordinateSystem) -> anyhow::Error {
        LatticeError::UnsupportedSystem {
            system,
            lattice: Self::NAME,
        }
        .into()
    }
}
