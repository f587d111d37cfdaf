//! Benchmarks for the CVRP local-search engine.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use cvrp_ls::{Amount, Config, Input, Job, LocalSearch, Matrix, SkillSet, Vehicle};

/// Create a benchmark instance: jobs on a grid, depot-based vehicles with
/// room for five jobs each.
fn create_benchmark_input(size: usize) -> Input {
    let mut rng = StdRng::seed_from_u64(size as u64);

    let mut points: Vec<(i64, i64)> = vec![(0, 0)];
    let grid = (size as f64).sqrt().ceil() as i64;
    for i in 0..size as i64 {
        let jitter = rng.gen_range(0..3);
        points.push(((i % grid) * 10 + jitter, (i / grid) * 10));
    }

    let rows: Vec<Vec<u64>> = points
        .iter()
        .map(|&(x1, y1)| {
            points
                .iter()
                .map(|&(x2, y2)| ((x1 - x2).abs() + (y1 - y2).abs()) as u64)
                .collect()
        })
        .collect();
    let matrix = Matrix::new(rows).unwrap();

    let jobs = (0..size)
        .map(|j| Job::new(j + 1, SkillSet::new(), Amount::new(vec![1])))
        .collect();
    let vehicle_count = (size / 5).max(1);
    let vehicles = (0..vehicle_count)
        .map(|_| Vehicle::new(Some(0), Some(0), Amount::new(vec![5]), SkillSet::new()))
        .collect();

    Input::new(matrix, jobs, vehicles).unwrap()
}

fn benchmark_full_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_search");
    group.sample_size(10);

    for size in [20, 40, 80].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let input = create_benchmark_input(size);
            let vehicle_count = input.vehicles().len();

            b.iter(|| {
                let mut sol = vec![Vec::new(); vehicle_count];
                let mut engine = LocalSearch::new(&input, &mut sol, Config::new()).unwrap();
                engine.run();
                engine.indicators()
            });
        });
    }

    group.finish();
}

fn benchmark_job_additions(c: &mut Criterion) {
    let mut group = c.benchmark_group("job_additions");

    for size in [20, 40].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            let input = create_benchmark_input(size);
            let vehicle_count = input.vehicles().len();

            // Cancelled up front: the run reduces to the initial
            // job-addition pass.
            let flag = std::sync::Arc::new(std::sync::atomic::AtomicBool::new(true));

            b.iter(|| {
                let mut sol = vec![Vec::new(); vehicle_count];
                let mut engine = LocalSearch::new(&input, &mut sol, Config::new()).unwrap();
                engine.set_cancel_flag(std::sync::Arc::clone(&flag));
                engine.run();
                engine.indicators()
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_full_search, benchmark_job_additions);
criterion_main!(benches);
