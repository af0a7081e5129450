use std::hint::black_box;

use anyhow::{Result, anyhow};

use super::{RoundOutcome, Timing, Workload};
use crate::val::Val;

const ROOT_KEY: &str = "foo";
const FIELD_KEY: &str = "bar";

/// Builds `{"foo": [{}, []]}` and applies `round_size` mutations:
/// `obj.foo[0].bar = j; obj.foo[1][j] = "Hello," + "World!"`.
pub fn build_nested(round_size: usize) -> Result<Val> {
    let mut obj = Val::empty_map();
    obj.set_field(ROOT_KEY, Val::List(vec![Val::empty_map(), Val::empty_list()]))?;

    let head = Val::from("Hello,");
    let tail = Val::from("World!");
    for j in 0..round_size {
        let foo = obj.field_mut(ROOT_KEY)?;
        foo.index_mut(0)?.set_field(FIELD_KEY, Val::Int(j as i64))?;
        foo.index_mut(1)?.set_index(j, head.add(&tail)?)?;
    }
    Ok(obj)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NestedMutation;

impl Workload for NestedMutation {
    fn key(&self) -> &'static str {
        "nested_mutation"
    }

    fn timing(&self) -> Timing {
        Timing::PerOp
    }

    fn run_round(&mut self, round_size: usize) -> Result<RoundOutcome> {
        let obj = black_box(build_nested(round_size)?);
        let appended = obj
            .field(ROOT_KEY)?
            .index(1)?
            .len()
            .ok_or_else(|| anyhow!("foo[1] is not a list"))?;
        Ok(RoundOutcome {
            ops: round_size as u64,
            value: Val::Int(appended as i64),
        })
    }
}
