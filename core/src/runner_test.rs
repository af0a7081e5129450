use std::time::Duration;

use anyhow::{Result, bail};

use super::*;
use crate::clock::ManualClock;
use crate::report::CollectSink;
use crate::val::Val;
use crate::workload::{AppendSquares, FibonacciCalls, RoundOutcome, Timing};

/// Cancels its own token after a fixed number of rounds.
struct CancelAfter {
    remaining: u32,
    token: CancelToken,
}

impl Workload for CancelAfter {
    fn key(&self) -> &'static str {
        "cancel_after"
    }

    fn timing(&self) -> Timing {
        Timing::PerOp
    }

    fn run_round(&mut self, round_size: usize) -> Result<RoundOutcome> {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.token.cancel();
        }
        Ok(RoundOutcome {
            ops: round_size as u64,
            value: Val::Nil,
        })
    }
}

struct Failing;

impl Workload for Failing {
    fn key(&self) -> &'static str {
        "failing"
    }

    fn timing(&self) -> Timing {
        Timing::PerOp
    }

    fn run_round(&mut self, _round_size: usize) -> Result<RoundOutcome> {
        bail!("boom")
    }
}

#[test]
fn bounded_run_emits_one_report_per_round() {
    let clock = ManualClock::stepping(Duration::from_millis(10));
    let mut sink = CollectSink::default();
    let summary = Runner::new(8, RoundBound::Rounds(3))
        .run(&mut AppendSquares, &clock, &mut sink)
        .unwrap();

    assert_eq!(summary.rounds_completed, 3);
    assert_eq!(summary.total_ops, 24);
    assert!(!summary.cancelled);
    let rounds: Vec<u64> = sink.reports.iter().map(|r| r.round).collect();
    assert_eq!(rounds, vec![1, 2, 3]);
    assert!(sink.reports.iter().all(|r| r.value == Val::Int(8)));
}

#[test]
fn averages_are_cumulative_since_start() {
    // Every read advances one second; the first read marks the start.
    let clock = ManualClock::stepping(Duration::from_secs(1));
    let mut sink = CollectSink::default();
    Runner::new(2, RoundBound::Rounds(2))
        .run(&mut AppendSquares, &clock, &mut sink)
        .unwrap();

    assert_eq!(sink.reports[0].elapsed_secs, 1.0);
    assert_eq!(sink.reports[0].avg_secs, 0.5);
    assert_eq!(sink.reports[1].elapsed_secs, 2.0);
    assert_eq!(sink.reports[1].avg_secs, 0.5);
}

#[test]
fn frozen_clock_yields_zero_average() {
    let clock = ManualClock::new();
    let mut sink = CollectSink::default();
    Runner::new(4, RoundBound::Rounds(2))
        .run(&mut AppendSquares, &clock, &mut sink)
        .unwrap();
    assert!(sink.reports.iter().all(|r| r.avg_secs == 0.0));
}

#[test]
fn identical_runs_produce_identical_reports() {
    let run = || {
        let clock = ManualClock::stepping(Duration::from_millis(3));
        let mut sink = CollectSink::default();
        Runner::new(12, RoundBound::Rounds(2))
            .run(&mut FibonacciCalls, &clock, &mut sink)
            .unwrap();
        sink.reports
    };
    assert_eq!(run(), run());
}

#[test]
fn zero_round_size_fails_before_any_round() {
    let clock = ManualClock::new();
    let mut sink = CollectSink::default();
    let err = Runner::new(0, RoundBound::Rounds(1))
        .run(&mut AppendSquares, &clock, &mut sink)
        .unwrap_err();
    assert!(err.to_string().contains("round size must be positive"));
    assert!(sink.reports.is_empty());
}

#[test]
fn pre_cancelled_token_runs_nothing() {
    let token = CancelToken::new();
    token.cancel();
    let clock = ManualClock::new();
    let mut sink = CollectSink::default();
    let summary = Runner::new(4, RoundBound::Forever)
        .with_cancel(token)
        .run(&mut AppendSquares, &clock, &mut sink)
        .unwrap();
    assert_eq!(summary.rounds_completed, 0);
    assert!(summary.cancelled);
    assert!(summary.last.is_none());
}

#[test]
fn forever_stops_at_round_boundary_after_cancel() {
    let runner = Runner::new(1, RoundBound::Forever);
    let mut workload = CancelAfter {
        remaining: 5,
        token: runner.cancel_token(),
    };
    let clock = ManualClock::new();
    let mut sink = CollectSink::default();
    let summary = runner.run(&mut workload, &clock, &mut sink).unwrap();
    assert_eq!(summary.rounds_completed, 5);
    assert!(summary.cancelled);
}

#[test]
fn round_errors_carry_context() {
    let clock = ManualClock::new();
    let mut sink = CollectSink::default();
    let err = Runner::new(1, RoundBound::Rounds(1))
        .run(&mut Failing, &clock, &mut sink)
        .unwrap_err();
    assert!(format!("{:#}", err).contains("round 1 of 'failing' failed: boom"));
}

#[test]
fn bound_from_limit() {
    assert_eq!(RoundBound::from_limit(None), RoundBound::Forever);
    assert_eq!(RoundBound::from_limit(Some(2)), RoundBound::Rounds(2));
}
