//! Shared performance benchmarking scaffolding used by the CLI, the Criterion
//! benches, and the run recorder.
//!
//! Centralizing the workloads here keeps every tool running the same
//! scenarios with the same default round sizes.

pub mod scenarios;
