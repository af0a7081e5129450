use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{RoundOutcome, Timing, Workload};
use crate::val::Val;

/// Whether the series accumulator starts over every round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccumulatorMode {
    #[default]
    Reset,
    /// Keep sign and sum across rounds; each round re-adds the same index range
    /// and scales the carried sum by 4.
    Carry,
}

/// Running state of `1 - 1/3 + 1/5 - ...`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesState {
    pub sign: f64,
    pub sum: f64,
}

impl SeriesState {
    /// State holding only the first term.
    pub fn seeded() -> Self {
        Self { sign: 1.0, sum: 1.0 }
    }

    pub fn pi(&self) -> f64 {
        self.sum * 4.0
    }
}

impl Default for SeriesState {
    fn default() -> Self {
        Self::seeded()
    }
}

/// Adds terms `2..=terms` of the series; the seed counts as the first term.
pub fn leibniz_round(state: &mut SeriesState, terms: usize) {
    for i in 2..=terms {
        state.sign = -state.sign;
        state.sum += state.sign / (2 * i - 1) as f64;
    }
}

#[derive(Debug, Default, Clone)]
pub struct LeibnizPi {
    mode: AccumulatorMode,
    state: SeriesState,
}

impl LeibnizPi {
    pub fn new(mode: AccumulatorMode) -> Self {
        Self {
            mode,
            state: SeriesState::seeded(),
        }
    }

    pub fn state(&self) -> SeriesState {
        self.state
    }
}

impl Workload for LeibnizPi {
    fn key(&self) -> &'static str {
        "leibniz_pi"
    }

    fn timing(&self) -> Timing {
        Timing::PerRound { label: "pi" }
    }

    fn run_round(&mut self, round_size: usize) -> Result<RoundOutcome> {
        let pi = match self.mode {
            AccumulatorMode::Reset => {
                self.state = SeriesState::seeded();
                leibniz_round(&mut self.state, round_size);
                self.state.pi()
            }
            AccumulatorMode::Carry => {
                // The scaled sum is what the next round keeps adding onto.
                leibniz_round(&mut self.state, round_size);
                self.state.sum *= 4.0;
                self.state.sum
            }
        };
        Ok(RoundOutcome {
            ops: round_size as u64,
            value: Val::Float(pi),
        })
    }
}
