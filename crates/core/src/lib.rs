//! Gridline is a lattice geometry engine. Given a parametrized lattice
//! (rectangular, hexagonal, polar or spherical) it converts points between
//! world space and the lattice's own coordinate systems, and it generates
//! the line segments that draw the lattice inside a bounded region.
//!
//! ```
//! use gridline::{
//!     HexagonalConfig, HexagonalLattice, Herringbone, RenderSettings,
//!     Renderer,
//! };
//! use std::{cell::RefCell, rc::Rc};
//!
//! let lattice = Rc::new(RefCell::new(HexagonalLattice::new(
//!     HexagonalConfig::default(),
//! )));
//! let mut renderer = Renderer::new(
//!     Rc::clone(&lattice),
//!     Herringbone::default(),
//!     RenderSettings::default(),
//! );
//! renderer.refresh();
//! println!("{:?}", renderer.lines().counts());
//! ```
//!
//! Lattices are owned by the host and shared with renderers through
//! `Rc<RefCell<_>>`. Editing a lattice bumps its [Revision], and the next
//! [Renderer::refresh] either re-places or regenerates its lines to match.

mod change;
mod export;
pub mod lattice;
pub mod lines;
mod registry;
mod snap;
mod transform;
pub mod util;

pub use crate::{
    change::{
        ChangeKind, ChangeNotifier, LatticeChange, ListenerId, ParamValue,
        Parameter, Revision,
    },
    lattice::{
        hex::{
            CubicPoint, HexCompass, HexCorner, HexDirection, HexagonalConfig,
            HexagonalLattice, Sides, Slant,
        },
        layered::LayeredLattice,
        polar::{PolarConfig, PolarLattice},
        rectangular::{RectangularConfig, RectangularLattice, Shearing},
        spherical::{SphericalConfig, SphericalLattice},
        Axis, Coordinate, CoordinateSystem, Lattice, LatticeError,
    },
    lines::{
        CircularRange, Cone, Cylinder, Herringbone, LineRenderer, LineSet,
        LineSetState, LineWriter, Parallelepiped, Refresh, RenderSettings,
        Renderer, Rhombus, Segment, Shape, Sphere,
    },
    registry::{RendererRegistry, SharedRenderer},
    snap::Snap,
    transform::{Affine, AffineCache, Pose},
};

#[cfg(feature = "json")]
pub use crate::export::to_json;
#[cfg(feature = "svg")]
pub use crate::export::to_svg;
