use anyhow::{Result, bail};

use super::{RoundOutcome, Timing, Workload};
use crate::val::Val;

/// Largest input whose result and call count stay within `i64`.
pub const MAX_FIB_INPUT: usize = 90;

/// A function value that is handed itself as an argument, so recursion goes
/// through an indirect call instead of a direct self-reference.
struct SelfCall {
    f: fn(&SelfCall, u64, &mut u64) -> u64,
}

fn fib_body(g: &SelfCall, n: u64, calls: &mut u64) -> u64 {
    *calls += 1;
    if n <= 2 {
        return 1;
    }
    (g.f)(g, n - 1, calls) + (g.f)(g, n - 2, calls)
}

/// Returns `(fib(n), calls)`.
pub fn fib_with_self(n: u64) -> (u64, u64) {
    let g = SelfCall { f: fib_body };
    let mut calls = 0;
    let value = (g.f)(&g, n, &mut calls);
    (value, calls)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FibonacciCalls;

impl Workload for FibonacciCalls {
    fn key(&self) -> &'static str {
        "fib_calls"
    }

    fn timing(&self) -> Timing {
        Timing::PerRound { label: "fib" }
    }

    fn validate(&self, round_size: usize) -> Result<()> {
        if round_size == 0 {
            bail!("round size must be positive for '{}'", self.key());
        }
        if round_size > MAX_FIB_INPUT {
            bail!(
                "round size {} exceeds the largest fib input {}",
                round_size,
                MAX_FIB_INPUT
            );
        }
        Ok(())
    }

    fn run_round(&mut self, round_size: usize) -> Result<RoundOutcome> {
        let (value, calls) = fib_with_self(round_size as u64);
        Ok(RoundOutcome {
            ops: calls,
            value: Val::Int(value as i64),
        })
    }
}
