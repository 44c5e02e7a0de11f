use assert_approx_eq::assert_approx_eq;
use gridline::{
    CoordinateSystem, CubicPoint, HexagonalConfig, HexagonalLattice, Lattice,
    Pose, RectangularConfig, RectangularLattice, Shearing, Sides, Slant, Snap,
};
use nalgebra::{Point3, UnitQuaternion, Vector3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

const SAMPLES: usize = 200;

fn random_pose(rng: &mut Pcg64) -> Pose {
    Pose::new(
        Vector3::new(
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
            rng.gen_range(-10.0..10.0),
        ),
        UnitQuaternion::from_euler_angles(
            rng.gen_range(-3.0..3.0),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(-3.0..3.0),
        ),
    )
}

fn random_point(rng: &mut Pcg64) -> Point3<f64> {
    Point3::new(
        rng.gen_range(-50.0..50.0),
        rng.gen_range(-50.0..50.0),
        rng.gen_range(-50.0..50.0),
    )
}

fn assert_points_close(a: &Point3<f64>, b: &Point3<f64>) {
    assert!((a - b).norm() < 1e-4, "{} != {}", a, b);
}

#[test]
fn test_rectangular_round_trip() {
    let mut rng = Pcg64::seed_from_u64(1);
    for _ in 0..SAMPLES {
        let lattice = RectangularLattice::new(RectangularConfig {
            spacing: Vector3::new(
                rng.gen_range(0.1..5.0),
                rng.gen_range(0.1..5.0),
                rng.gen_range(0.1..5.0),
            ),
            shearing: Shearing {
                xy: rng.gen_range(-0.5..0.5),
                zx: rng.gen_range(-0.5..0.5),
                ..Default::default()
            },
            pose: random_pose(&mut rng),
        });
        let world = random_point(&mut rng);
        let grid = lattice.world_to_lattice(&world);
        assert_points_close(&lattice.lattice_to_world(&grid), &world);
    }
}

#[test]
fn test_cubic_round_trip() {
    let mut rng = Pcg64::seed_from_u64(2);
    for i in 0..SAMPLES {
        let lattice = HexagonalLattice::new(HexagonalConfig {
            radius: rng.gen_range(0.2..4.0),
            depth: rng.gen_range(0.2..4.0),
            sides: if i % 2 == 0 { Sides::Pointed } else { Sides::Flat },
            pose: random_pose(&mut rng),
        });
        let world = random_point(&mut rng);
        let cubic = lattice.world_to_cubic(&world);
        assert_approx_eq!(cubic.x + cubic.y + cubic.z, 0.0, 1e-9);
        assert_points_close(&lattice.cubic_to_world(&cubic), &world);
    }
}

#[test]
fn test_herringbone_round_trip() {
    let mut rng = Pcg64::seed_from_u64(3);
    for _ in 0..SAMPLES {
        let x = f64::from(rng.gen_range(-20..20_i32));
        let y = f64::from(rng.gen_range(-20..20_i32));
        let w = f64::from(rng.gen_range(-3..3_i32));
        let face = CubicPoint::from_xy(x, y, w);
        for slant in [Slant::Up, Slant::Down] {
            let herringbone = face.to_herringbone(slant);
            let back = CubicPoint::from_herringbone(&herringbone, slant);
            assert_eq!(back, face);
        }
    }
}

#[test]
fn test_every_system_round_trips_through_world() {
    let lattice = HexagonalLattice::new(HexagonalConfig {
        radius: 2.0,
        ..Default::default()
    });
    let world = Point3::new(3.3, -7.1, 0.6);
    for system in [
        CoordinateSystem::Cubic,
        CoordinateSystem::HerringboneUp,
        CoordinateSystem::HerringboneDown,
        CoordinateSystem::RhombicUp,
        CoordinateSystem::RhombicDown,
    ] {
        let coordinate = lattice.convert(&world, system).unwrap();
        let back = lattice.to_world(&coordinate, system).unwrap();
        assert_points_close(&back, &world);
    }
    assert!(lattice.convert(&world, CoordinateSystem::Polar).is_err());
}

#[test]
fn test_spacing_is_clamped() {
    let lattice = RectangularLattice::new(RectangularConfig {
        spacing: Vector3::new(0.0, -1.0, 2.0),
        ..Default::default()
    });
    let epsilon = gridline::util::MIN_EXTENT;
    assert_eq!(lattice.spacing(), Vector3::new(epsilon, epsilon, 2.0));
    assert!(lattice.forward_matrix().determinant() != 0.0);
}

#[test]
fn test_snapping_half_points() {
    let lattice = RectangularLattice::new(RectangularConfig::default());
    let world = Point3::new(2.5, -1.5, 3.5);
    let cell = lattice
        .nearest_cell(&world, CoordinateSystem::World)
        .unwrap()
        .point()
        .unwrap();
    assert_points_close(&cell, &world);
    // Ties round to even
    let vertex = lattice
        .nearest_vertex(&world, CoordinateSystem::World)
        .unwrap()
        .point()
        .unwrap();
    assert_eq!(vertex, Point3::new(2.0, -2.0, 4.0));
}

#[test]
fn test_vertex_snap_idempotent() {
    let mut rng = Pcg64::seed_from_u64(4);
    let lattice = HexagonalLattice::new(HexagonalConfig {
        pose: random_pose(&mut rng),
        ..Default::default()
    });
    for _ in 0..SAMPLES {
        let world = random_point(&mut rng);
        let once = lattice
            .nearest_vertex(&world, CoordinateSystem::World)
            .unwrap()
            .point()
            .unwrap();
        let twice = lattice
            .nearest_vertex(&once, CoordinateSystem::World)
            .unwrap()
            .point()
            .unwrap();
        assert_points_close(&once, &twice);
    }
}
