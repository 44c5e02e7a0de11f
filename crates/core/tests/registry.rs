use gridline::{
    LineRenderer, Parallelepiped, RectangularConfig, RectangularLattice,
    RenderSettings, Renderer, RendererRegistry, SharedRenderer,
};
use nalgebra::{Point3, Vector3};
use std::{cell::RefCell, rc::Rc};

fn renderer(
    lattice: &Rc<RefCell<RectangularLattice>>,
    priority: i32,
) -> SharedRenderer {
    Rc::new(RefCell::new(Renderer::new(
        Rc::clone(lattice),
        Parallelepiped::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(f64::from(priority), 1.0, 0.0),
        ),
        RenderSettings {
            priority,
            enabled: true,
        },
    )))
}

fn priorities(registry: &RendererRegistry) -> Vec<i32> {
    registry
        .iter()
        .map(|r| r.borrow().settings().priority)
        .collect()
}

#[test]
fn test_priority_order() {
    let lattice = Rc::new(RefCell::new(RectangularLattice::new(
        RectangularConfig::default(),
    )));
    let mut registry = RendererRegistry::new();
    let three = renderer(&lattice, 3);
    let one = renderer(&lattice, 1);
    let two = renderer(&lattice, 2);
    for r in [&three, &one, &two] {
        assert!(registry.register(Rc::clone(r)));
    }
    assert_eq!(priorities(&registry), vec![3, 2, 1]);

    // Bump the renderer that's currently in the middle
    assert!(registry.set_priority(&two, 5));
    assert_eq!(priorities(&registry), vec![5, 3, 1]);

    assert!(registry.unregister(&three));
    assert_eq!(priorities(&registry), vec![5, 1]);
}

#[test]
fn test_draw_refreshes_in_order() {
    let lattice = Rc::new(RefCell::new(RectangularLattice::new(
        RectangularConfig::default(),
    )));
    let mut registry = RendererRegistry::new();
    registry.register(renderer(&lattice, 1));
    registry.register(renderer(&lattice, 2));

    // Each box is `priority` cells long, so the Y group sizes give away the
    // draw order
    let mut drawn = Vec::new();
    registry.draw(|lines| drawn.push(lines.counts()));
    assert_eq!(drawn, vec![[2, 3, 0], [2, 2, 0]]);

    // A spacing change re-places the lines without changing their counts
    lattice
        .borrow_mut()
        .set_spacing(Vector3::new(2.0, 2.0, 2.0));
    let mut lengths = Vec::new();
    registry.draw(|lines| {
        let [from, to] = lines.group(gridline::Axis::X)[0];
        lengths.push((to - from).norm());
    });
    assert_eq!(lengths, vec![4.0, 2.0]);
}
