//! Run records: `latest.json`/`latest.csv` plus a pruned timestamped history.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use crate::report::{RoundReport, RoundSink};
use crate::runner::RunSummary;

#[derive(Debug, Serialize)]
pub struct RunRecord {
    pub generated_at: String,
    pub git_rev: Option<String>,
    pub notes: Option<String>,
    pub summary: RunSummary,
    pub rounds: Vec<RoundReport>,
}

impl RunRecord {
    pub fn new(timestamp: DateTime<Utc>, notes: Option<String>, summary: RunSummary, rounds: Vec<RoundReport>) -> Self {
        let git_rev = std::env::var("GITHUB_SHA")
            .ok()
            .map(|sha| sha.chars().take(8).collect::<String>());
        Self {
            generated_at: timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            git_rev,
            notes,
            summary,
            rounds,
        }
    }
}

/// Rounds kept in a run record when no other limit is given.
pub const MAX_RECORDED_ROUNDS: usize = 1_000;

/// Forwards reports to `inner` and keeps the most recent `keep_last` for the run record.
pub struct RecordingSink<S> {
    inner: S,
    reports: VecDeque<RoundReport>,
    keep_last: usize,
}

impl<S: RoundSink> RecordingSink<S> {
    pub fn new(inner: S) -> Self {
        Self::with_limit(inner, MAX_RECORDED_ROUNDS)
    }

    pub fn with_limit(inner: S, keep_last: usize) -> Self {
        Self {
            inner,
            reports: VecDeque::new(),
            keep_last: keep_last.max(1),
        }
    }

    pub fn into_parts(self) -> (S, Vec<RoundReport>) {
        (self.inner, self.reports.into())
    }
}

impl<S: RoundSink> RoundSink for RecordingSink<S> {
    fn emit(&mut self, report: &RoundReport) -> Result<()> {
        self.inner.emit(report)?;
        if self.reports.len() == self.keep_last {
            self.reports.pop_front();
        }
        self.reports.push_back(report.clone());
        Ok(())
    }
}

/// Paths written by [`write_record`].
#[derive(Debug, Clone)]
pub struct RecordPaths {
    pub latest_json: PathBuf,
    pub latest_csv: PathBuf,
    pub history_json: PathBuf,
}

pub fn write_record(
    output_dir: &Path,
    record: &RunRecord,
    timestamp: DateTime<Utc>,
    history_limit: usize,
) -> Result<RecordPaths> {
    let history_dir = output_dir.join("history");
    fs::create_dir_all(&history_dir)
        .with_context(|| format!("create history directory {}", history_dir.display()))?;

    let stamp = format!("{}_{}", timestamp.format("%Y%m%dT%H%M%SZ"), record.summary.scenario);
    let paths = RecordPaths {
        latest_json: output_dir.join("latest.json"),
        latest_csv: output_dir.join("latest.csv"),
        history_json: history_dir.join(format!("{}.json", stamp)),
    };

    write_json(&paths.latest_json, record)?;
    write_csv(&paths.latest_csv, &record.rounds)?;
    write_json(&paths.history_json, record)?;
    write_csv(&history_dir.join(format!("{}.csv", stamp)), &record.rounds)?;

    prune_history(&history_dir, history_limit)?;
    debug!(dir = %output_dir.display(), rounds = record.rounds.len(), "run record written");
    Ok(paths)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).with_context(|| format!("write {}", path.display()))?;
    writer.flush().with_context(|| format!("flush {}", path.display()))
}

fn write_csv(path: &Path, rounds: &[RoundReport]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path).with_context(|| format!("create {}", path.display()))?);
    writeln!(writer, "scenario,round,ops,elapsed_secs,avg_secs,value")?;
    for report in rounds {
        writeln!(
            writer,
            "{},{},{},{:.9},{:.12},{}",
            report.scenario, report.round, report.ops, report.elapsed_secs, report.avg_secs, report.value
        )?;
    }
    writer.flush()?;
    Ok(())
}

fn prune_history(history_dir: &Path, limit: usize) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(history_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().map(|ext| ext == "json").unwrap_or(false))
        .collect();
    entries.sort_by_key(|entry| entry.file_name());
    while entries.len() > limit {
        let entry = entries.remove(0);
        let path = entry.path();
        fs::remove_file(&path).with_context(|| format!("remove old history snapshot {}", path.display()))?;
        let csv_path = path.with_extension("csv");
        if csv_path.exists() {
            if let Err(err) = fs::remove_file(&csv_path) {
                warn!(path = %csv_path.display(), error = %err, "failed to prune history csv");
            }
        }
    }
    Ok(())
}
