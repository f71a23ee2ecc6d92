use criterion::{criterion_group, criterion_main, Criterion};
use diffraction_core::cell::UnitCell;
use diffraction_core::geometry::{
    find_intersections, polarisation_correction, update_partialities, Beam, Crystal,
    PartialityModel,
};
use nalgebra::UnitQuaternion;
use std::hint::black_box;

fn test_crystal(a: f64) -> Crystal {
    let right = 90f64.to_radians();
    let cell = UnitCell::from_parameters(a, a * 1.2, a * 1.5, right, 100f64.to_radians(), right)
        .unwrap()
        .classified()
        .rotated(&UnitQuaternion::from_euler_angles(0.3, 0.2, 0.1))
        .unwrap();
    Crystal::new(cell, 1e-3, 1e8)
}

/// Prediction over the full index box, per partiality model, plus the per-pass update.
fn bench_prediction(c: &mut Criterion) {
    let mut group = c.benchmark_group("prediction");
    group.sample_size(20);

    let beam = Beam::new(1.3e-10, 0.01, 1e-3).unwrap();
    let crystal = test_crystal(20e-10);

    for (name, model) in [
        ("unity", PartialityModel::Unity),
        ("sphere", PartialityModel::Sphere),
        ("gaussian", PartialityModel::Gaussian),
    ] {
        group.bench_function(format!("find_intersections_{}", name), |b| {
            b.iter(|| find_intersections(black_box(&crystal), black_box(&beam), None, model))
        });
    }

    let predicted = find_intersections(&crystal, &beam, None, PartialityModel::Sphere).unwrap();
    let mut refining = crystal.clone().with_reflections(predicted.clone());
    group.bench_function("update_partialities", |b| {
        b.iter(|| update_partialities(black_box(&mut refining), &beam, None, PartialityModel::Sphere))
    });

    group.bench_function("polarisation_correction", |b| {
        b.iter(|| {
            let mut list = predicted.clone();
            polarisation_correction(black_box(&mut list), &crystal.cell, &beam);
            list
        })
    });

    group.finish();
}

criterion_group!(benches, bench_prediction);
criterion_main!(benches);
