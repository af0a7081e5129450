pub mod clock;
pub mod config;
pub mod record;
pub mod report;
pub mod runner;
pub mod util;
pub mod val;
pub mod workload;

// Scenario registry shared by the CLI and the benches
pub mod perf;
