//! Ordered collection of renderers, handed to the host in priority order.

use crate::lines::{LineRenderer, LineSet};
use fnv::FnvBuildHasher;
use indexmap::IndexMap;
use log::debug;
use std::{cell::RefCell, rc::Rc};

/// A renderer shared between the host and a registry
pub type SharedRenderer = Rc<RefCell<dyn LineRenderer>>;

/// Identity of a shared renderer, based on its allocation. Two clones of the
/// same `Rc` have the same key.
fn key(renderer: &SharedRenderer) -> usize {
    Rc::as_ptr(renderer) as *const () as usize
}

#[derive(Clone)]
struct Entry {
    renderer: SharedRenderer,
    /// Priority as of the last sort. Compared against the renderer's live
    /// settings to catch edits made behind our back.
    priority: i32,
}

/// Renderers sorted by descending priority. Renderers with equal priority
/// keep the order they were registered in.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    entries: IndexMap<usize, Entry, FnvBuildHasher>,
}

impl RendererRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, renderer: &SharedRenderer) -> bool {
        self.entries.contains_key(&key(renderer))
    }

    /// Add a renderer. Returns `false` (and does nothing) if it's already
    /// registered.
    pub fn register(&mut self, renderer: SharedRenderer) -> bool {
        let key = key(&renderer);
        if self.entries.contains_key(&key) {
            return false;
        }
        let priority = renderer.borrow().settings().priority;
        self.entries.insert(key, Entry { renderer, priority });
        self.sort();
        debug!(
            "Registered renderer with priority {} ({} total)",
            priority,
            self.entries.len()
        );
        true
    }

    /// Remove a renderer. Returns `false` if it wasn't registered.
    pub fn unregister(&mut self, renderer: &SharedRenderer) -> bool {
        let removed = self.entries.shift_remove(&key(renderer)).is_some();
        if removed {
            debug!("Unregistered renderer ({} left)", self.entries.len());
        }
        removed
    }

    /// Change a registered renderer's priority. The registry only re-sorts if
    /// the value actually changed. Returns whether the order was touched.
    pub fn set_priority(
        &mut self,
        renderer: &SharedRenderer,
        priority: i32,
    ) -> bool {
        let entry = match self.entries.get_mut(&key(renderer)) {
            Some(entry) => entry,
            None => return false,
        };
        renderer.borrow_mut().settings_mut().priority = priority;
        if entry.priority == priority {
            return false;
        }
        entry.priority = priority;
        self.sort();
        true
    }

    /// Pick up priority edits made directly on renderers' settings. Returns
    /// whether anything changed.
    pub fn sync_priorities(&mut self) -> bool {
        let mut changed = false;
        for entry in self.entries.values_mut() {
            let live = entry.renderer.borrow().settings().priority;
            if live != entry.priority {
                entry.priority = live;
                changed = true;
            }
        }
        if changed {
            self.sort();
        }
        changed
    }

    /// Every registered renderer, highest priority first
    pub fn iter(&self) -> impl Iterator<Item = &SharedRenderer> {
        self.entries.values().map(|entry| &entry.renderer)
    }

    /// Like [Self::iter], but skip disabled renderers
    pub fn enabled(&self) -> impl Iterator<Item = &SharedRenderer> {
        self.iter().filter(|renderer| renderer.borrow().settings().enabled)
    }

    /// Bring every enabled renderer up to date and pass its lines to the
    /// host, in priority order. Returns the number of renderers drawn.
    pub fn draw(&mut self, mut host: impl FnMut(&LineSet)) -> usize {
        self.sync_priorities();
        let mut drawn = 0;
        for renderer in self.enabled() {
            let mut renderer = renderer.borrow_mut();
            renderer.refresh();
            host(renderer.lines());
            drawn += 1;
        }
        drawn
    }

    fn sort(&mut self) {
        // Stable, so ties stay in registration order
        self.entries.sort_by(|_, a, _, b| b.priority.cmp(&a.priority));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lines::{Refresh, RenderSettings};

    /// Renderer that never has anything to draw
    struct Blank {
        settings: RenderSettings,
        lines: LineSet,
    }

    impl LineRenderer for Blank {
        fn settings(&self) -> &RenderSettings {
            &self.settings
        }

        fn settings_mut(&mut self) -> &mut RenderSettings {
            &mut self.settings
        }

        fn refresh(&mut self) -> Refresh {
            Refresh::Unchanged
        }

        fn lines(&self) -> &LineSet {
            &self.lines
        }
    }

    fn blank(priority: i32) -> SharedRenderer {
        Rc::new(RefCell::new(Blank {
            settings: RenderSettings {
                priority,
                enabled: true,
            },
            lines: LineSet::new(),
        }))
    }

    fn priorities(registry: &RendererRegistry) -> Vec<i32> {
        registry
            .iter()
            .map(|renderer| renderer.borrow().settings().priority)
            .collect()
    }

    #[test]
    fn test_register_twice() {
        let mut registry = RendererRegistry::new();
        let renderer = blank(0);
        assert!(registry.register(Rc::clone(&renderer)));
        assert!(!registry.register(Rc::clone(&renderer)));
        assert_eq!(registry.len(), 1);
        assert!(registry.unregister(&renderer));
        assert!(!registry.unregister(&renderer));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ties_keep_registration_order() {
        let mut registry = RendererRegistry::new();
        let first = blank(1);
        let second = blank(1);
        registry.register(Rc::clone(&first));
        registry.register(Rc::clone(&second));
        registry.register(blank(2));
        let order: Vec<usize> = registry.iter().map(key).collect();
        assert_eq!(order[1..], [key(&first), key(&second)]);
    }

    #[test]
    fn test_set_priority_only_sorts_on_change() {
        let mut registry = RendererRegistry::new();
        let renderer = blank(4);
        registry.register(Rc::clone(&renderer));
        registry.register(blank(2));
        assert!(!registry.set_priority(&renderer, 4));
        assert!(registry.set_priority(&renderer, 1));
        assert_eq!(priorities(&registry), vec![2, 1]);
        assert!(!registry.set_priority(&blank(9), 9));
    }

    #[test]
    fn test_sync_priorities() {
        let mut registry = RendererRegistry::new();
        let renderer = blank(0);
        registry.register(Rc::clone(&renderer));
        registry.register(blank(3));
        assert!(!registry.sync_priorities());

        renderer.borrow_mut().settings_mut().priority = 7;
        assert!(registry.sync_priorities());
        assert_eq!(priorities(&registry), vec![7, 3]);
    }

    #[test]
    fn test_draw_skips_disabled() {
        let mut registry = RendererRegistry::new();
        let disabled = blank(5);
        disabled.borrow_mut().settings_mut().enabled = false;
        registry.register(disabled);
        registry.register(blank(1));
        registry.register(blank(0));

        let mut handed = 0;
        assert_eq!(registry.draw(|_| handed += 1), 2);
        assert_eq!(handed, 2);
        assert_eq!(registry.enabled().count(), 2);
    }
}
