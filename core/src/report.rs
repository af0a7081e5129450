//! Per-round reports and the sinks that receive them.

use std::io::Write;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::val::Val;
use crate::workload::Timing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// One human-readable line per round.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundReport {
    pub scenario: String,
    pub round: u64,
    pub ops: u64,
    /// Seconds since the run started.
    pub elapsed_secs: f64,
    /// Running average: per operation or per round depending on `label`.
    pub avg_secs: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    pub value: Val,
}

impl RoundReport {
    pub fn new(scenario: &str, timing: Timing, round: u64, ops: u64, elapsed_secs: f64, value: Val) -> Self {
        let (divisor, label) = match timing {
            Timing::PerOp => (round as f64 * ops as f64, None),
            Timing::PerRound { label } => (round as f64, Some(label)),
        };
        let avg_secs = if divisor > 0.0 && elapsed_secs.is_finite() {
            (elapsed_secs / divisor).max(0.0)
        } else {
            0.0
        };
        Self {
            scenario: scenario.to_string(),
            round,
            ops,
            elapsed_secs,
            avg_secs,
            label,
            value,
        }
    }

    /// `<avg>` or `<avg> secs, <label> is <value>`.
    pub fn to_line(&self) -> String {
        match self.label {
            Some(label) => format!("{} secs, {} is {}", self.avg_secs, label, self.value),
            None => format!("{}", self.avg_secs),
        }
    }
}

pub trait RoundSink {
    fn emit(&mut self, report: &RoundReport) -> Result<()>;
}

/// Writes each report as soon as it arrives and flushes per line.
pub struct WriterSink<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RoundSink for WriterSink<W> {
    fn emit(&mut self, report: &RoundReport) -> Result<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.writer, "{}", report.to_line()).context("write round report")?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut self.writer, report).context("serialize round report")?;
                writeln!(self.writer).context("write round report")?;
            }
        }
        self.writer.flush().context("flush round report")
    }
}

#[derive(Debug, Default)]
pub struct CollectSink {
    pub reports: Vec<RoundReport>,
}

impl RoundSink for CollectSink {
    fn emit(&mut self, report: &RoundReport) -> Result<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}
