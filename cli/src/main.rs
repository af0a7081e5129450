use std::path::{Component, Path, PathBuf};
use std::sync::Once;

static TRACE_INIT: Once = Once::new();
/// Round-level events from the runner and record writer; run start/end elsewhere.
const DEFAULT_TRACE_FILTER: &str = "opbench_core::runner=debug,opbench_core::record=debug,opbench_core=info,opbench_cli=info";

use clap::{Parser, Subcommand, ValueEnum};
use opbench_core::{
    config::RunConfig,
    perf::scenarios::{find_scenario, scenarios},
    report::OutputFormat,
    workload::AccumulatorMode,
};

mod run;

#[derive(Debug, Parser)]
#[command(
    name = "opbench",
    author,
    version,
    about = "Per-operation timing of basic dynamic-language operations",
    long_about = None
)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatCli {
    Text,
    Json,
}

impl From<FormatCli> for OutputFormat {
    fn from(value: FormatCli) -> Self {
        match value {
            FormatCli::Text => OutputFormat::Text,
            FormatCli::Json => OutputFormat::Json,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a scenario round after round; unbounded until Ctrl-C unless `--rounds` is given.
    Run {
        /// Scenario key (see `opbench list`); defaults to the config file's scenario
        #[arg(value_name = "SCENARIO")]
        scenario: Option<String>,
        /// Operations per round
        #[arg(long)]
        round_size: Option<usize>,
        /// Stop after this many rounds
        #[arg(long)]
        rounds: Option<u64>,
        /// Keep the series accumulator across rounds instead of resetting it
        #[arg(long)]
        carry: bool,
        /// Per-round output format
        #[arg(long, value_enum)]
        format: Option<FormatCli>,
        /// Directory receiving latest.json, latest.csv and history/
        #[arg(long, value_name = "DIR", value_parser = parse_sanitized_path)]
        record: Option<PathBuf>,
        /// Max history snapshots kept under the record directory
        #[arg(long)]
        history_limit: Option<usize>,
        /// Attach notes to the run record
        #[arg(long)]
        notes: Option<String>,
        /// TOML, YAML or JSON run configuration; flags override its values
        #[arg(long, value_name = "FILE", value_parser = parse_sanitized_path)]
        config: Option<PathBuf>,
    },
    /// List registered scenarios.
    List,
    /// Run one round of each scenario and check its result.
    Verify {
        /// Scenario keys; all scenarios when omitted
        #[arg(value_name = "SCENARIO")]
        scenarios: Vec<String>,
        /// Operations per round; scenario default when omitted
        #[arg(long)]
        round_size: Option<usize>,
    },
}

fn sanitize_path(raw: &str) -> anyhow::Result<PathBuf> {
    let path = PathBuf::from(raw);
    if path.components().any(|comp| comp == Component::ParentDir) {
        anyhow::bail!("Parent directory components ('..') are not allowed in record paths: {}", raw);
    }
    Ok(path)
}

fn parse_sanitized_path(raw: &str) -> Result<PathBuf, String> {
    sanitize_path(raw).map_err(|e| e.to_string())
}

/// What `OPBENCH_TRACE` asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TraceSetting {
    Off,
    /// Per-module defaults, or `RUST_LOG` when set.
    Default,
    Filter(String),
}

impl TraceSetting {
    fn parse(raw: &str) -> Self {
        let value = raw.trim().to_ascii_lowercase();
        match value.as_str() {
            "" | "0" | "false" | "off" | "no" => TraceSetting::Off,
            "1" | "true" | "on" | "yes" => TraceSetting::Default,
            // A bare level applies to both opbench crates only.
            "error" | "warn" | "info" | "debug" | "trace" => {
                TraceSetting::Filter(format!("opbench_core={value},opbench_cli={value}"))
            }
            _ => TraceSetting::Filter(raw.trim().to_string()),
        }
    }

    fn filter_expr(&self) -> Option<String> {
        match self {
            TraceSetting::Off => None,
            TraceSetting::Default => Some(std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_TRACE_FILTER.to_string())),
            TraceSetting::Filter(expr) => Some(expr.clone()),
        }
    }
}

fn init_tracing_from_env() {
    let Ok(raw) = std::env::var("OPBENCH_TRACE") else {
        return;
    };
    let Some(expr) = TraceSetting::parse(&raw).filter_expr() else {
        return;
    };

    TRACE_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_new(&expr).unwrap_or_else(|err| {
            eprintln!("Ignoring OPBENCH_TRACE filter '{}': {}", expr, err);
            EnvFilter::new(DEFAULT_TRACE_FILTER)
        });
        let _ = tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_env_filter(filter)
            .try_init();
    });
}

/// Overrides applied on top of a loaded or default config.
#[derive(Debug, Default)]
pub(crate) struct RunOverrides {
    scenario: Option<String>,
    round_size: Option<usize>,
    rounds: Option<u64>,
    carry: bool,
    format: Option<OutputFormat>,
    record: Option<PathBuf>,
    history_limit: Option<usize>,
    notes: Option<String>,
}

pub(crate) fn resolve_run_config(config_path: Option<&Path>, overrides: RunOverrides) -> anyhow::Result<RunConfig> {
    let mut config = match config_path {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };

    if let Some(scenario) = overrides.scenario {
        config.scenario = scenario;
    }
    if overrides.round_size.is_some() {
        config.round_size = overrides.round_size;
    }
    if overrides.rounds.is_some() {
        config.rounds = overrides.rounds;
    }
    if overrides.carry {
        config.accumulator = AccumulatorMode::Carry;
    }
    if let Some(format) = overrides.format {
        config.format = format;
    }
    if overrides.record.is_some() {
        config.record_dir = overrides.record;
    }
    if let Some(limit) = overrides.history_limit {
        config.history_limit = limit;
    }
    if overrides.notes.is_some() {
        config.notes = overrides.notes;
    }

    config.validate()?;
    Ok(config)
}

fn list_scenarios() {
    for scenario in scenarios() {
        println!(
            "{:<16} {} (default round size {})",
            scenario.key(),
            scenario.title(),
            scenario.default_round_size()
        );
    }
}

fn verify_scenarios(keys: &[String], round_size: Option<usize>) -> anyhow::Result<()> {
    let selected = if keys.is_empty() {
        scenarios().iter().collect::<Vec<_>>()
    } else {
        keys.iter().map(|k| find_scenario(k)).collect::<anyhow::Result<Vec<_>>>()?
    };

    for scenario in selected {
        let size = round_size.unwrap_or(scenario.default_round_size());
        let outcome = scenario.run_checked(size)?;
        println!(
            "ok {:<16} round size {}, {} ops, value {}",
            scenario.key(),
            size,
            outcome.ops,
            outcome.value
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_tracing_from_env();

    let CliArgs { command } = CliArgs::parse();

    match command {
        Commands::Run {
            scenario,
            round_size,
            rounds,
            carry,
            format,
            record,
            history_limit,
            notes,
            config,
        } => {
            let overrides = RunOverrides {
                scenario,
                round_size,
                rounds,
                carry,
                format: format.map(OutputFormat::from),
                record,
                history_limit,
                notes,
            };
            let config = resolve_run_config(config.as_deref(), overrides)?;
            run::run_until_done(config)
        }
        Commands::List => {
            list_scenarios();
            Ok(())
        }
        Commands::Verify { scenarios, round_size } => verify_scenarios(&scenarios, round_size),
    }
}
