use std::f64::consts::PI;

use anyhow::{Context, Result, anyhow};

use crate::val::Val;
use crate::workload::{
    AccumulatorMode, AppendSquares, FibonacciCalls, LeibnizPi, NestedMutation, RoundOutcome, Workload,
};

/// Registered benchmark workload.
pub struct Scenario {
    key: &'static str,
    title: &'static str,
    default_round_size: usize,
    build: fn(AccumulatorMode) -> Box<dyn Workload + Send>,
    expected: ExpectedValue,
}

impl Scenario {
    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn default_round_size(&self) -> usize {
        self.default_round_size
    }

    pub fn bench_case_name(&self) -> String {
        format!("{}_round", self.key)
    }

    /// Fresh workload instance; `mode` only matters for the series scenario.
    pub fn build(&self, mode: AccumulatorMode) -> Box<dyn Workload + Send> {
        (self.build)(mode)
    }

    /// Checks a round's value as produced with [`AccumulatorMode::Reset`].
    pub fn verify(&self, round_size: usize, value: &Val) -> Result<()> {
        self.expected.verify(round_size, value)
    }

    /// Runs one round on a fresh workload and verifies its value.
    pub fn run_checked(&self, round_size: usize) -> Result<RoundOutcome> {
        let mut workload = self.build(AccumulatorMode::Reset);
        workload.validate(round_size)?;
        let outcome = workload
            .run_round(round_size)
            .with_context(|| format!("scenario '{}' failed", self.key))?;
        self.verify(round_size, &outcome.value)
            .with_context(|| format!("scenario '{}' produced an unexpected value", self.key))?;
        Ok(outcome)
    }
}

#[derive(Clone, Copy, Debug)]
enum ExpectedValue {
    /// Value equals the round size.
    Count,
    /// Within the alternating-series error bound of π.
    Pi,
    /// The round size-th Fibonacci number.
    Fib,
}

impl ExpectedValue {
    fn verify(&self, round_size: usize, actual: &Val) -> Result<()> {
        let matches = match self {
            ExpectedValue::Count => actual.as_int() == Some(round_size as i64),
            ExpectedValue::Pi => match actual {
                // Error of a truncated alternating series is below its next term.
                Val::Float(v) => (v - PI).abs() <= 4.0 / (2 * round_size + 1) as f64,
                _ => false,
            },
            ExpectedValue::Fib => actual.as_int() == Some(iterative_fib(round_size) as i64),
        };
        if matches {
            Ok(())
        } else {
            Err(anyhow!(
                "expected {:?} for round size {} but observed {}",
                self,
                round_size,
                actual
            ))
        }
    }
}

fn iterative_fib(n: usize) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        (a, b) = (b, a + b);
    }
    a
}

fn build_append_squares(_: AccumulatorMode) -> Box<dyn Workload + Send> {
    Box::new(AppendSquares)
}

fn build_nested_mutation(_: AccumulatorMode) -> Box<dyn Workload + Send> {
    Box::new(NestedMutation)
}

fn build_leibniz_pi(mode: AccumulatorMode) -> Box<dyn Workload + Send> {
    Box::new(LeibnizPi::new(mode))
}

fn build_fib_calls(_: AccumulatorMode) -> Box<dyn Workload + Send> {
    Box::new(FibonacciCalls)
}

static SCENARIOS: &[Scenario] = &[
    Scenario {
        key: "append_squares",
        title: "List append of squared integers",
        default_round_size: 1_000_000,
        build: build_append_squares,
        expected: ExpectedValue::Count,
    },
    Scenario {
        key: "nested_mutation",
        title: "Nested map field set and list append",
        default_round_size: 1_000_000,
        build: build_nested_mutation,
        expected: ExpectedValue::Count,
    },
    Scenario {
        key: "leibniz_pi",
        title: "Leibniz series approximation of pi",
        default_round_size: 1_000_000,
        build: build_leibniz_pi,
        expected: ExpectedValue::Pi,
    },
    Scenario {
        key: "fib_calls",
        title: "Self-passing recursive Fibonacci",
        default_round_size: 30,
        build: build_fib_calls,
        expected: ExpectedValue::Fib,
    },
];

pub fn scenarios() -> &'static [Scenario] {
    SCENARIOS
}

pub fn scenario_keys() -> impl Iterator<Item = &'static str> {
    SCENARIOS.iter().map(|s| s.key)
}

pub fn find_scenario(key: &str) -> Result<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.key == key).ok_or_else(|| {
        anyhow!(
            "unknown scenario '{}' (available: {})",
            key,
            scenario_keys().collect::<Vec<_>>().join(", ")
        )
    })
}
