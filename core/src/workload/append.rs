use std::hint::black_box;

use anyhow::Result;

use super::{RoundOutcome, Timing, Workload};
use crate::val::Val;

/// `arr[j] = j * j` for `j` in `0..round_size`, into a fresh list.
pub fn build_squares(round_size: usize) -> Result<Val> {
    let mut arr = Val::empty_list();
    for j in 0..round_size {
        let v = Val::Int(j as i64);
        arr.set_index(j, v.mul(&v)?)?;
    }
    Ok(arr)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AppendSquares;

impl Workload for AppendSquares {
    fn key(&self) -> &'static str {
        "append_squares"
    }

    fn timing(&self) -> Timing {
        Timing::PerOp
    }

    fn run_round(&mut self, round_size: usize) -> Result<RoundOutcome> {
        let arr = black_box(build_squares(round_size)?);
        let len = arr.len().unwrap_or_default();
        Ok(RoundOutcome {
            ops: round_size as u64,
            value: Val::Int(len as i64),
        })
    }
}
