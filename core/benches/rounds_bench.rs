use criterion::{Criterion, criterion_group, criterion_main};
use opbench_core::perf::scenarios::scenarios;
use opbench_core::workload::{AccumulatorMode, Workload};
use std::hint::black_box;

// Production rounds run a million operations; keep Criterion samples short.
const BENCH_ROUND_SIZE: usize = 10_000;
const BENCH_FIB_INPUT: usize = 20;

fn bench_scenario_rounds(c: &mut Criterion) {
    for scenario in scenarios() {
        let round_size = if scenario.key() == "fib_calls" {
            BENCH_FIB_INPUT
        } else {
            BENCH_ROUND_SIZE
        };
        scenario
            .run_checked(round_size)
            .expect("scenario should verify before benchmarking");

        c.bench_function(&scenario.bench_case_name(), |b| {
            let mut workload = scenario.build(AccumulatorMode::Reset);
            b.iter(|| {
                let outcome = workload
                    .run_round(black_box(round_size))
                    .expect("round failed during benchmarking");
                black_box(outcome);
            });
        });
    }
}

criterion_group!(rounds, bench_scenario_rounds);
criterion_main!(rounds);
