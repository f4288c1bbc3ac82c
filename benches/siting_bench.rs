//! Criterion benchmarks for u-siting.
//!
//! Uses seeded random demand maps so runs are comparable across machines.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use u_siting::problem::RandomProblemGenerator;
use u_siting::tabu::{SitingProblem, SolverConfig, TabuSearchSolver};
use u_siting::{CostModel, DemandMap, DistanceMasks, NeighborhoodGenerator};

fn demand(side: usize) -> DemandMap {
    let clients = (side * side) as u64 * 3 / 2;
    RandomProblemGenerator::new((side, side), clients, 4)
        .with_seed(42)
        .generate()
        .expect("valid generator parameters")
}

fn config(facilities: usize) -> SolverConfig {
    SolverConfig::default()
        .with_facilities(facilities)
        .with_capacity(60)
        .with_service_radius(3)
        .with_short_term_tenure(10)
        .with_long_term_tenure(3)
        .with_iteration_limit(50)
}

fn bench_tabu_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("tabu_solve");
    group.sample_size(10);

    for &side in &[20, 40, 60] {
        let problem = SitingProblem::new(demand(side));
        let config = config(side / 3);
        group.bench_with_input(
            BenchmarkId::from_parameter(side),
            &(problem, config),
            |b, (p, c)| {
                b.iter(|| {
                    let solver = TabuSearchSolver::new(black_box(p), c.clone()).expect("valid config");
                    black_box(solver.solve())
                })
            },
        );
    }
    group.finish();
}

fn bench_cost(c: &mut Criterion) {
    let mut group = c.benchmark_group("cost");

    for &side in &[20, 40, 60] {
        let problem = SitingProblem::new(demand(side));
        let solver = TabuSearchSolver::new(&problem, config(side / 3)).expect("valid config");
        let placement = solver.starting_solution().expect("feasible start");
        let masks = DistanceMasks::new(side, side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &placement, |b, p| {
            let model = CostModel::new(problem.demand(), 3, &masks).expect("matching masks");
            b.iter(|| black_box(model.cost(black_box(p))))
        });
    }
    group.finish();
}

fn bench_neighborhood(c: &mut Criterion) {
    let mut group = c.benchmark_group("neighborhood");

    for &radius in &[1, 2, 3] {
        let problem = SitingProblem::new(demand(40));
        let solver = TabuSearchSolver::new(&problem, config(13)).expect("valid config");
        let placement = solver.starting_solution().expect("feasible start");
        group.bench_with_input(BenchmarkId::from_parameter(radius), &placement, |b, p| {
            b.iter(|| black_box(NeighborhoodGenerator::new(p, radius).count()))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_tabu_solve, bench_cost, bench_neighborhood);
criterion_main!(benches);
