//! Change notification for lattice parameters. Lattice edits fall into two
//! categories that drive very different amounts of downstream work:
//!
//! - **Structural** changes alter which lines exist (sector/parallel counts)
//!   so every dependent line set must be recounted and recomputed.
//! - **Continuous** changes only move things around (spacing, shearing,
//!   radius, pose), so dependent line sets can be re-transformed in place.
//!
//! Consumers can either subscribe a callback for one category, or poll the
//! [Revision] counters once per frame and compare against what they saw last.

use crate::{lattice::hex::Sides, transform::Pose};
use derive_more::Display;
use fnv::FnvHashMap;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use strum::{EnumIter, EnumString};

/// The category of a lattice change
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
pub enum ChangeKind {
    Structural,
    Continuous,
}

/// Every lattice parameter that can raise a change event
#[derive(
    Copy, Clone, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Spacing,
    Shearing,
    Radius,
    Depth,
    Sides,
    Sectors,
    Parallels,
    Meridians,
    Pose,
}

/// The value of a parameter, before or after a change
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParamValue {
    Scalar(f64),
    Count(u32),
    Vector(Vector3<f64>),
    /// Shear factors in `xy, xz, yx, yz, zx, zy` order
    Shear([f64; 6]),
    Sides(Sides),
    Pose(Pose),
}

/// One parameter edit, carrying both the old and the new value so listeners
/// can see the delta.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatticeChange {
    pub parameter: Parameter,
    pub kind: ChangeKind,
    pub old: ParamValue,
    pub new: ParamValue,
}

impl LatticeChange {
    /// Difference between the new and old value, for parameters where that
    /// is meaningful. Vectors give a component-wise difference, encoded as a
    /// vector value. `None` for sides and poses.
    pub fn delta(&self) -> Option<ParamValue> {
        match (self.old, self.new) {
            (ParamValue::Scalar(old), ParamValue::Scalar(new)) => {
                Some(ParamValue::Scalar(new - old))
            }
            (ParamValue::Count(old), ParamValue::Count(new)) => {
                Some(ParamValue::Scalar(f64::from(new) - f64::from(old)))
            }
            (ParamValue::Vector(old), ParamValue::Vector(new)) => {
                Some(ParamValue::Vector(new - old))
            }
            (ParamValue::Shear(old), ParamValue::Shear(new)) => {
                let mut delta = [0.0; 6];
                for (i, d) in delta.iter_mut().enumerate() {
                    *d = new[i] - old[i];
                }
                Some(ParamValue::Shear(delta))
            }
            _ => None,
        }
    }
}

/// Monotonic change counters for one lattice. A consumer stores the revision
/// it last synced against, then compares on the next frame to figure out what
/// kind of work it has to do.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Revision {
    pub structural: u64,
    pub continuous: u64,
}

impl Revision {
    fn bump(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Structural => self.structural += 1,
            ChangeKind::Continuous => self.continuous += 1,
        }
    }
}

/// Handle returned from [ChangeNotifier::subscribe], used to unsubscribe
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash)]
#[display(fmt = "listener#{}", _0)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&LatticeChange)>;

/// Holds listener callbacks for one lattice, split by [ChangeKind], plus the
/// lattice's [Revision].
#[derive(Default)]
pub struct ChangeNotifier {
    revision: Revision,
    next_id: u64,
    listeners: FnvHashMap<ListenerId, (ChangeKind, Listener)>,
}

impl ChangeNotifier {
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Register a callback for one category of change
    pub fn subscribe(
        &mut self,
        kind: ChangeKind,
        listener: impl FnMut(&LatticeChange) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, (kind, Box::new(listener)));
        id
    }

    /// Remove a callback. Returns `false` if it was never registered (or
    /// already removed).
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Bump the revision for the change's category and run every listener
    /// subscribed to that category
    pub fn emit(&mut self, change: LatticeChange) {
        self.revision.bump(change.kind);
        for (kind, listener) in self.listeners.values_mut() {
            if *kind == change.kind {
                listener(&change);
            }
        }
    }
}

// Closures aren't Debug, so only show the counts
impl Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("revision", &self.revision)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    fn radius_change(old: f64, new: f64) -> LatticeChange {
        LatticeChange {
            parameter: Parameter::Radius,
            kind: ChangeKind::Continuous,
            old: ParamValue::Scalar(old),
            new: ParamValue::Scalar(new),
        }
    }

    #[test]
    fn test_delta() {
        assert_eq!(
            radius_change(1.0, 3.0).delta(),
            Some(ParamValue::Scalar(2.0))
        );
        let sectors = LatticeChange {
            parameter: Parameter::Sectors,
            kind: ChangeKind::Structural,
            old: ParamValue::Count(8),
            new: ParamValue::Count(6),
        };
        assert_eq!(sectors.delta(), Some(ParamValue::Scalar(-2.0)));
        let sides = LatticeChange {
            parameter: Parameter::Sides,
            kind: ChangeKind::Continuous,
            old: ParamValue::Sides(Sides::Pointed),
            new: ParamValue::Sides(Sides::Flat),
        };
        assert_eq!(sides.delta(), None);
    }

    #[test]
    fn test_listeners_by_kind() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::default();

        let seen_clone = Rc::clone(&seen);
        let id = notifier.subscribe(ChangeKind::Continuous, move |change| {
            seen_clone.borrow_mut().push(change.parameter)
        });
        notifier.subscribe(ChangeKind::Structural, |_| {
            panic!("structural listener called for continuous change")
        });

        notifier.emit(radius_change(1.0, 2.0));
        assert_eq!(*seen.borrow(), vec![Parameter::Radius]);
        assert_eq!(
            notifier.revision(),
            Revision {
                structural: 0,
                continuous: 1
            }
        );

        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.emit(radius_change(2.0, 3.0));
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(notifier.listener_count(), 1);
    }
}
