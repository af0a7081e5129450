//! Round loop: runs a workload under a round bound or until cancelled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::report::{RoundReport, RoundSink};
use crate::workload::Workload;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundBound {
    Rounds(u64),
    /// Run until the cancel token fires.
    Forever,
}

impl RoundBound {
    pub fn from_limit(rounds: Option<u64>) -> Self {
        rounds.map_or(RoundBound::Forever, RoundBound::Rounds)
    }

    fn allows(&self, round: u64) -> bool {
        match self {
            RoundBound::Rounds(limit) => round <= *limit,
            RoundBound::Forever => true,
        }
    }
}

/// Shared flag checked at every round boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub scenario: String,
    pub round_size: usize,
    pub rounds_completed: u64,
    pub total_ops: u64,
    pub elapsed_secs: f64,
    pub cancelled: bool,
    pub last: Option<RoundReport>,
}

#[derive(Debug, Clone)]
pub struct Runner {
    round_size: usize,
    bound: RoundBound,
    cancel: CancelToken,
}

impl Runner {
    pub fn new(round_size: usize, bound: RoundBound) -> Self {
        Self {
            round_size,
            bound,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Runs rounds until the bound is reached or the token is cancelled,
    /// handing every report to `sink`.
    pub fn run<W, C, S>(&self, workload: &mut W, clock: &C, sink: &mut S) -> Result<RunSummary>
    where
        W: Workload + ?Sized,
        C: Clock + ?Sized,
        S: RoundSink + ?Sized,
    {
        let scenario = workload.key();
        workload.validate(self.round_size)?;

        let timing = workload.timing();
        info!(scenario, round_size = self.round_size, bound = ?self.bound, "starting benchmark run");

        let start = clock.elapsed();
        let mut summary = RunSummary {
            scenario: scenario.to_string(),
            round_size: self.round_size,
            rounds_completed: 0,
            total_ops: 0,
            elapsed_secs: 0.0,
            cancelled: false,
            last: None,
        };

        let mut round = 1u64;
        while self.bound.allows(round) {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            let outcome = workload
                .run_round(self.round_size)
                .with_context(|| format!("round {} of '{}' failed", round, scenario))?;
            let elapsed_secs = clock.elapsed().saturating_sub(start).as_secs_f64();

            let report = RoundReport::new(scenario, timing, round, outcome.ops, elapsed_secs, outcome.value);
            debug!(scenario, round, ops = report.ops, avg_secs = report.avg_secs, "round finished");
            sink.emit(&report)?;

            summary.rounds_completed = round;
            summary.total_ops = summary.total_ops.saturating_add(report.ops);
            summary.elapsed_secs = elapsed_secs;
            summary.last = Some(report);
            round += 1;
        }

        info!(
            scenario,
            rounds = summary.rounds_completed,
            cancelled = summary.cancelled,
            elapsed_secs = summary.elapsed_secs,
            "benchmark run finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod runner_test;
