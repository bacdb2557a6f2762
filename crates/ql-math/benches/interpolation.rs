use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use ql_math::integrals::{GaussLobattoIntegral, Integrator};
use ql_math::interpolations::{BicubicSpline, CubicNaturalSpline, Interpolation1D, Interpolation2D};
use std::hint::black_box;

fn bench_natural_spline(c: &mut Criterion) {
    let xs: Vec<f64> = (0..200).map(|i| -3.0 + 6.0 * i as f64 / 199.0).collect();
    let ys: Vec<f64> = xs.iter().map(|x| (x.exp() - 1.0).max(0.0)).collect();
    let queries: Vec<f64> = (0..10_000).map(|i| -3.0 + 6.0 * i as f64 / 10_000.0).collect();

    let mut group = c.benchmark_group("cubic_natural_spline");
    group.bench_function("build_200", |b| {
        b.iter(|| black_box(CubicNaturalSpline::new(black_box(&xs), black_box(&ys)).unwrap()))
    });
    let spline = CubicNaturalSpline::new(&xs, &ys).unwrap();
    group.throughput(Throughput::Elements(queries.len() as u64));
    group.bench_function("value_and_derivatives", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for x in &queries {
                acc += spline.operator(*x) + spline.derivative(*x) + spline.second_derivative(*x);
            }
            black_box(acc)
        })
    });
    group.finish();
}

fn bench_bicubic(c: &mut Criterion) {
    let xs: Vec<f64> = (0..100).map(|i| i as f64 * 0.05).collect();
    let ys: Vec<f64> = (0..50).map(|j| j as f64 * 0.02).collect();
    let z: Vec<f64> = ys
        .iter()
        .flat_map(|y| xs.iter().map(move |x| (x * y).sin()))
        .collect();
    let surface = BicubicSpline::new(&xs, &ys, &z).unwrap();
    c.bench_function("bicubic_spline_query", |b| {
        b.iter(|| black_box(surface.operator(black_box(2.345), black_box(0.567))))
    });
}

fn bench_gauss_lobatto(c: &mut Criterion) {
    let integrator = GaussLobattoIntegral::new(1e-8, 100_000);
    c.bench_function("gauss_lobatto_kinked_payoff", |b| {
        b.iter(|| {
            black_box(
                integrator
                    .integrate(|x| (x.exp() - 1.0).max(0.0), black_box(-1.0), black_box(1.0))
                    .unwrap(),
            )
        })
    });
}

criterion_group!(benches, bench_natural_spline, bench_bicubic, bench_gauss_lobatto);
criterion_main!(benches);
