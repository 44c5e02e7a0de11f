//! Line sets, and the shapes that fill them.
//!
//! Every shape draws itself in two passes against its lattice:
//!
//! 1. [Shape::count_lines] works out exactly how many segments each of the
//!    three groups needs, in closed form
//! 2. [Shape::compute_lines] fills those segments in, again in closed form
//!
//! A [Renderer] owns one shape plus its line set and decides which passes to
//! re-run when something changes. If the lattice only moved or stretched
//! (a continuous change), the existing endpoints are pushed through
//! `new_forward * old_inverse` instead, which is a lot cheaper than deriving
//! the topology again.

mod arc;
mod cone;
mod cylinder;
mod hex_patch;
mod parallelepiped;
mod sphere;

pub use arc::CircularRange;
pub use cone::Cone;
pub use cylinder::Cylinder;
pub use hex_patch::{Herringbone, Rhombus};
pub use parallelepiped::Parallelepiped;
pub use sphere::Sphere;

use crate::{
    change::Revision,
    lattice::{Axis, Lattice},
    timed,
    transform::Affine,
};
use log::{debug, trace};
use nalgebra::{Matrix4, Point3};
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, convert::TryFrom, rc::Rc};

/// Two world-space endpoints
pub type Segment = [Point3<f64>; 2];

/// Placeholder for a slot that's been counted but not computed yet
fn unfilled() -> Segment {
    let nan = Point3::new(f64::NAN, f64::NAN, f64::NAN);
    [nan, nan]
}

fn is_unfilled(segment: &Segment) -> bool {
    segment.iter().any(|p| p.iter().any(|v| v.is_nan()))
}

/// Segments to draw, split into exactly three groups. What each group holds
/// depends on the shape, but by convention X is radial, Y is angular and Z is
/// depth.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LineSet {
    groups: [Vec<Segment>; 3],
}

impl LineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of segments in each group
    pub fn counts(&self) -> [usize; 3] {
        [
            self.groups[0].len(),
            self.groups[1].len(),
            self.groups[2].len(),
        ]
    }

    /// Total number of segments across all groups
    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Set every group to the given size, with every slot unfilled. Existing
    /// allocations are reused.
    pub fn resize(&mut self, counts: [usize; 3]) {
        for (group, count) in self.groups.iter_mut().zip(counts.iter()) {
            group.clear();
            group.resize(*count, unfilled());
        }
    }

    /// Has every counted slot been filled in?
    pub fn is_complete(&self) -> bool {
        !self.groups.iter().flatten().any(is_unfilled)
    }

    pub fn group(&self, axis: Axis) -> &[Segment] {
        &self.groups[axis.index()]
    }

    /// Like [Self::group], with a raw index. Anything outside `0..=2` is an
    /// error.
    pub fn group_by_index(&self, index: usize) -> anyhow::Result<&[Segment]> {
        Ok(self.group(Axis::try_from(index)?))
    }

    /// Every segment, tagged with its group
    pub fn iter(&self) -> impl Iterator<Item = (Axis, &Segment)> {
        Axis::ALL.iter().flat_map(move |axis| {
            self.groups[axis.index()]
                .iter()
                .map(move |segment| (*axis, segment))
        })
    }

    /// Push every endpoint through a matrix, in place
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for segment in self.groups.iter_mut().flatten() {
            for point in segment.iter_mut() {
                *point = matrix.transform_point(point);
            }
        }
    }

    pub fn writer(&mut self) -> LineWriter<'_> {
        LineWriter {
            lines: self,
            cursors: [0; 3],
        }
    }
}

/// Fills in the slots of a sized [LineSet], front to back, one group at a
/// time. Never allocates.
#[derive(Debug)]
pub struct LineWriter<'a> {
    lines: &'a mut LineSet,
    cursors: [usize; 3],
}

impl<'a> LineWriter<'a> {
    /// Write the next segment of a group.
    ///
    /// ## Panics
    ///
    /// If the group is already full. That means a shape's count and compute
    /// passes disagree, which is a bug in the shape.
    pub fn push(&mut self, axis: Axis, from: Point3<f64>, to: Point3<f64>) {
        let index = axis.index();
        let cursor = self.cursors[index];
        let group = &mut self.lines.groups[index];
        assert!(
            cursor < group.len(),
            "Wrote more than {} segments to group {}",
            group.len(),
            axis
        );
        group[cursor] = [from, to];
        self.cursors[index] += 1;
    }

    /// Number of segments written so far, per group
    pub fn written(&self) -> [usize; 3] {
        self.cursors
    }
}

/// Something that knows how to draw itself against a particular kind of
/// lattice
pub trait Shape {
    type Lattice: Lattice;

    /// Name used in logs
    const NAME: &'static str;

    /// Exact number of segments per group for the current parameters
    fn count_lines(&self, lattice: &Self::Lattice) -> [usize; 3];

    /// Write exactly as many segments per group as [Self::count_lines] said
    fn compute_lines(&self, lattice: &Self::Lattice, writer: &mut LineWriter);
}

/// Host-facing knobs for a renderer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Renderers with higher priority are handed to the host first
    pub priority: i32,
    /// Disabled renderers stay registered, but don't get drawn
    pub enabled: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            priority: 0,
            enabled: true,
        }
    }
}

/// Lifecycle of a renderer's line set
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LineSetState {
    /// Nothing counted yet
    Uninitialized,
    /// Slots allocated, not filled
    Sized,
    /// Every slot holds a real segment
    Populated,
}

/// What [Renderer::refresh] ended up doing
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Refresh {
    Unchanged,
    Retransformed,
    Recomputed,
}

/// Owns a shape and the line set it draws, and keeps the two in sync with a
/// shared lattice.
pub struct Renderer<S: Shape> {
    lattice: Rc<RefCell<S::Lattice>>,
    shape: S,
    settings: RenderSettings,
    lines: LineSet,
    state: LineSetState,
    /// Structural lattice revision the slot counts were taken at
    counted: u64,
    /// Lattice revision the line set currently reflects
    seen: Revision,
    /// Lattice transform the line set was last placed with. Only its inverse
    /// is needed, unless it was singular.
    placed: Affine,
}

impl<S: Shape> Renderer<S> {
    pub fn new(
        lattice: Rc<RefCell<S::Lattice>>,
        shape: S,
        settings: RenderSettings,
    ) -> Self {
        Self {
            lattice,
            shape,
            settings,
            lines: LineSet::new(),
            state: LineSetState::Uninitialized,
            counted: 0,
            seen: Revision::default(),
            placed: Affine::identity(),
        }
    }

    pub fn lattice(&self) -> &Rc<RefCell<S::Lattice>> {
        &self.lattice
    }

    pub fn shape(&self) -> &S {
        &self.shape
    }

    /// Edit the shape. Any access through here counts as a change, so the
    /// current counts are dropped and the next pass starts with a recount.
    pub fn shape_mut(&mut self) -> &mut S {
        self.state = LineSetState::Uninitialized;
        &mut self.shape
    }

    pub fn set_shape(&mut self, shape: S) {
        self.shape = shape;
        self.state = LineSetState::Uninitialized;
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.settings
    }

    pub fn state(&self) -> LineSetState {
        self.state
    }

    pub fn lines(&self) -> &LineSet {
        &self.lines
    }

    /// Run the count pass and size the line set to match. Any previous
    /// segments are discarded.
    pub fn count_lines(&mut self) -> [usize; 3] {
        let lattice = self.lattice.borrow();
        let counts = self.shape.count_lines(&lattice);
        self.counted = lattice.revision().structural;
        self.lines.resize(counts);
        self.state = LineSetState::Sized;
        debug!("{} counted {:?} lines", S::NAME, counts);
        counts
    }

    /// Run the compute pass. Counts first if the current counts are missing
    /// or were taken before a structural lattice change or a shape edit.
    pub fn compute_lines(&mut self) {
        let structural = self.lattice.borrow().revision().structural;
        if self.state == LineSetState::Uninitialized
            || structural != self.counted
        {
            self.count_lines();
        }
        let lattice = self.lattice.borrow();
        let mut writer = self.lines.writer();
        self.shape.compute_lines(&lattice, &mut writer);
        let written = writer.written();
        debug_assert_eq!(
            written,
            self.lines.counts(),
            "{} wrote a different number of lines than it counted",
            S::NAME
        );
        self.placed = lattice.affine();
        self.seen = lattice.revision();
        self.state = LineSetState::Populated;
    }

    /// Bring the line set up to date with the lattice and shape. Structural
    /// lattice changes and shape edits mean a full count and compute;
    /// continuous lattice changes just re-place the existing endpoints. A
    /// singular transform on either side of the change can't be undone, so
    /// that case recomputes too.
    pub fn refresh(&mut self) -> Refresh {
        let (revision, affine) = {
            let lattice = self.lattice.borrow();
            (lattice.revision(), lattice.affine())
        };
        let continuous = revision.continuous != self.seen.continuous;
        if self.state != LineSetState::Populated
            || revision.structural != self.seen.structural
            || (continuous && (self.placed.singular || affine.singular))
        {
            timed!(format!("{} recompute", S::NAME), {
                self.count_lines();
                self.compute_lines();
            });
            Refresh::Recomputed
        } else if continuous {
            self.lines.transform(&(affine.forward * self.placed.inverse));
            self.placed = affine;
            self.seen = revision;
            trace!("{} re-transformed {} lines", S::NAME, self.lines.len());
            Refresh::Retransformed
        } else {
            Refresh::Unchanged
        }
    }
}

/// Object-safe view of a [Renderer], so renderers for different shapes can
/// live in the same registry
pub trait LineRenderer {
    fn settings(&self) -> &RenderSettings;

    fn settings_mut(&mut self) -> &mut RenderSettings;

    fn refresh(&mut self) -> Refresh;

    fn lines(&self) -> &LineSet;
}

impl<S: Shape> LineRenderer for Renderer<S> {
    fn settings(&self) -> &RenderSettings {
        Renderer::settings(self)
    }

    fn settings_mut(&mut self) -> &mut RenderSettings {
        Renderer::settings_mut(self)
    }

    fn refresh(&mut self) -> Refresh {
        Renderer::refresh(self)
    }

    fn lines(&self) -> &LineSet {
        Renderer::lines(self)
    }
}

/// Point at parameter `t` along the segment from `a` to `b`
pub(crate) fn lerp_point(
    a: &Point3<f64>,
    b: &Point3<f64>,
    t: f64,
) -> Point3<f64> {
    a + (b - a) * t
}
