use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gridline::{
    util::range::NumRange, Cone, HexagonalConfig, HexagonalLattice,
    Herringbone, LineSet, Shape, Sphere, SphericalConfig, SphericalLattice,
};
use nalgebra::{Matrix4, Vector3};

/// Count and compute once, from scratch
fn generate<S: Shape>(shape: &S, lattice: &S::Lattice) -> LineSet {
    let mut lines = LineSet::new();
    lines.resize(shape.count_lines(lattice));
    shape.compute_lines(lattice, &mut lines.writer());
    lines
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("line-generation");
    group.sample_size(20);

    let hex = HexagonalLattice::new(HexagonalConfig::default());
    let herringbone = Herringbone {
        columns: NumRange::new(-50, 50),
        rows: NumRange::new(-50, 50),
        layers: NumRange::new(0, 2),
        ..Default::default()
    };
    group.bench_function("herringbone 100x100", |b| {
        b.iter(|| generate(black_box(&herringbone), &hex))
    });

    let cone = Cone {
        rings: NumRange::new(0, 100),
        layers: NumRange::new(0, 1),
        ..Default::default()
    };
    group.bench_function("cone 100 rings", |b| {
        b.iter(|| generate(black_box(&cone), &hex))
    });

    let spherical = SphericalLattice::new(SphericalConfig {
        parallels: 36,
        meridians: 72,
        ..Default::default()
    })
    .unwrap();
    let sphere = Sphere {
        shells: NumRange::new(0.0, 10.0),
        altitude: NumRange::new(0.0, 36.0),
        longitude_to: 72.0,
        ..Default::default()
    };
    group.bench_function("sphere 10 shells", |b| {
        b.iter(|| generate(black_box(&sphere), &spherical))
    });

    let mut lines = generate(&herringbone, &hex);
    let shift = Matrix4::new_translation(&Vector3::new(0.5, 0.0, 0.0));
    group.bench_function("herringbone retransform", |b| {
        b.iter(|| lines.transform(black_box(&shift)))
    });
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
