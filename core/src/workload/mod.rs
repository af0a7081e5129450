//! Benchmark workloads.
//!
//! Each workload performs one round of operations per call to
//! [`Workload::run_round`]. Structures built during a round are owned by that
//! call and released before it returns, so nothing survives into the next
//! round unless the workload keeps it as explicit state.

mod append;
mod fib;
mod leibniz;
mod mutation;


use anyhow::{Result, bail};

use crate::val::Val;

pub use append::{AppendSquares, build_squares};
pub use fib::{FibonacciCalls, MAX_FIB_INPUT, fib_with_self};
pub use leibniz::{AccumulatorMode, LeibnizPi, SeriesState, leibniz_round};
pub use mutation::{NestedMutation, build_nested};

/// How a workload's timing is averaged and printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timing {
    /// Seconds per operation; the line carries only the timing.
    PerOp,
    /// Seconds per round; the line reads `<secs> secs, <label> is <value>`.
    PerRound { label: &'static str },
}

/// Result of a single round.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub ops: u64,
    /// Observable result of the round (element count, approximation, ...).
    pub value: Val,
}

pub trait Workload {
    fn key(&self) -> &'static str;

    fn timing(&self) -> Timing;

    /// Rejects round sizes the workload cannot run.
    fn validate(&self, round_size: usize) -> Result<()> {
        if round_size == 0 {
            bail!("round size must be positive for '{}'", self.key());
        }
        Ok(())
    }

    fn run_round(&mut self, round_size: usize) -> Result<RoundOutcome>;
}

impl<W: Workload + ?Sized> Workload for Box<W> {
    fn key(&self) -> &'static str {
        (**self).key()
    }

    fn timing(&self) -> Timing {
        (**self).timing()
    }

    fn validate(&self, round_size: usize) -> Result<()> {
        (**self).validate(round_size)
    }

    fn run_round(&mut self, round_size: usize) -> Result<RoundOutcome> {
        (**self).run_round(round_size)
    }
}
