//! Drives a benchmark run on a blocking thread while watching for Ctrl-C.

use anyhow::Context;
use chrono::Utc;
use opbench_core::{
    clock::MonotonicClock,
    config::RunConfig,
    perf::scenarios::{Scenario, find_scenario},
    record::{RecordingSink, RunRecord, write_record},
    report::WriterSink,
    runner::{CancelToken, RoundBound, RunSummary, Runner},
};

pub(crate) fn run_until_done(config: RunConfig) -> anyhow::Result<()> {
    let scenario = find_scenario(&config.scenario)?;
    let runner = Runner::new(config.effective_round_size()?, RoundBound::from_limit(config.rounds));
    let cancel = runner.cancel_token();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;

    let summary = runtime.block_on(async move {
        let watcher = tokio::spawn(watch_interrupts(cancel));
        let joined = tokio::task::spawn_blocking(move || execute(&runner, scenario, &config)).await;
        watcher.abort();
        joined.context("benchmark thread panicked")?
    })?;

    tracing::info!(
        scenario = %summary.scenario,
        rounds = summary.rounds_completed,
        total_ops = summary.total_ops,
        cancelled = summary.cancelled,
        "run complete"
    );
    Ok(())
}

/// First Ctrl-C stops at the next round boundary; a second one exits at once.
async fn watch_interrupts(cancel: CancelToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    cancel.cancel();
    eprintln!("Interrupted; stopping after the current round (Ctrl-C again to abort)");
    if tokio::signal::ctrl_c().await.is_ok() {
        std::process::exit(130);
    }
}

fn execute(runner: &Runner, scenario: &'static Scenario, config: &RunConfig) -> anyhow::Result<RunSummary> {
    let mut workload = scenario.build(config.accumulator);
    let sink = WriterSink::new(std::io::stdout().lock(), config.format);
    let clock = MonotonicClock::start();

    let Some(dir) = &config.record_dir else {
        let mut sink = sink;
        return runner.run(&mut workload, &clock, &mut sink);
    };

    let mut sink = RecordingSink::new(sink);
    let summary = runner.run(&mut workload, &clock, &mut sink)?;
    let (_, rounds) = sink.into_parts();

    let now = Utc::now();
    let record = RunRecord::new(now, config.notes.clone(), summary.clone(), rounds);
    let paths = write_record(dir, &record, now, config.history_limit)?;
    eprintln!(
        "Run record written -> {}, {}, {}",
        paths.latest_json.display(),
        paths.latest_csv.display(),
        paths.history_json.display()
    );
    Ok(summary)
}
