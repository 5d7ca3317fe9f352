use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hedgehog::Active64;

fn rosenbrock_f64(x: &[f64]) -> f64 {
    let mut sum = 0.0;
    for i in 0..x.len() - 1 {
        let t1 = 1.0 - x[i];
        let t2 = x[i + 1] - x[i] * x[i];
        sum += t1 * t1 + 100.0 * t2 * t2;
    }
    sum
}

fn rosenbrock_active(x: &[Active64]) -> Active64 {
    let mut sum = x[0] * 0.0;
    for i in 0..x.len() - 1 {
        let t1 = 1.0 - x[i];
        let t2 = x[i + 1] - x[i] * x[i];
        sum += t1 * t1 + 100.0 * t2 * t2;
    }
    sum
}

fn finite_diff_hessian(x: &[f64], h: f64) -> Vec<Vec<f64>> {
    // O(n²) function evaluations; the baseline a single reverse sweep replaces.
    let n = x.len();
    let mut hess = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..n {
            let mut xpp = x.to_vec();
            let mut xpm = x.to_vec();
            let mut xmp = x.to_vec();
            let mut xmm = x.to_vec();
            xpp[i] += h;
            xpp[j] += h;
            xpm[i] += h;
            xpm[j] -= h;
            xmp[i] -= h;
            xmp[j] += h;
            xmm[i] -= h;
            xmm[j] -= h;
            hess[i][j] = (rosenbrock_f64(&xpp) - rosenbrock_f64(&xpm) - rosenbrock_f64(&xmp)
                + rosenbrock_f64(&xmm))
                / (4.0 * h * h);
        }
    }
    hess
}

fn bench_hessian(c: &mut Criterion) {
    let mut group = c.benchmark_group("hessian");
    for n in [2, 10, 50] {
        let x: Vec<f64> = (0..n).map(|i| 0.5 + 0.01 * i as f64).collect();

        group.bench_with_input(BenchmarkId::new("f64_eval", n), &x, |b, x| {
            b.iter(|| black_box(rosenbrock_f64(black_box(x))))
        });

        group.bench_with_input(BenchmarkId::new("edge_pushing", n), &x, |b, x| {
            b.iter(|| black_box(hedgehog::hessian(rosenbrock_active, black_box(x))))
        });

        group.bench_with_input(BenchmarkId::new("finite_diff_n2", n), &x, |b, x| {
            b.iter(|| black_box(finite_diff_hessian(black_box(x), 1e-4)))
        });
    }
    group.finish();
}

fn bench_gradient(c: &mut Criterion) {
    let mut group = c.benchmark_group("gradient");
    for n in [10, 100] {
        let x: Vec<f64> = (0..n).map(|i| 0.5 + 0.01 * i as f64).collect();
        group.bench_with_input(BenchmarkId::new("reverse_sweep", n), &x, |b, x| {
            b.iter(|| black_box(hedgehog::grad(rosenbrock_active, black_box(x))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hessian, bench_gradient);
criterion_main!(benches);
