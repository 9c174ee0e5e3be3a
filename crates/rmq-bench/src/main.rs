use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand, builder::BoolishValueParser};
use log::info;
use rmq::engine::EngineKind;
use rmq_bench::{
    aggregate,
    alloc::TrackingAllocator,
    config::{BenchConfig, MemorySource},
    dataset,
    driver::{Contender, Driver},
    export,
    generate::{self, Distribution},
};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator::new();

#[derive(Parser, Debug)]
#[command(version, about = "Benchmark range minimum query structures")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Benchmark every engine on every dataset and export the aggregated results
    Run(RunArgs),
    /// Write synthetic datasets
    Generate(GenerateArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Trials per dataset and engine
    #[arg(long, env = "NUM_RUNS", default_value_t = 5)]
    num_runs: usize,

    /// Random queries per trial
    #[arg(long, env = "NUM_QUERIES", default_value_t = 500)]
    num_queries: usize,

    /// Random updates per trial
    #[arg(long, env = "NUM_UPDATES", default_value_t = 500)]
    num_updates: usize,

    /// Directory holding the datasets
    #[arg(long, env = "DATASET_DIR", default_value = "datasets")]
    dataset_dir: PathBuf,

    /// Write the aggregated results as CSV
    #[arg(
        long,
        env = "EXPORT_CSV",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    export_csv: bool,

    /// Deadline in seconds for a single build, query batch or update batch
    #[arg(long = "timeout", env = "TIMEOUT_SECONDS", default_value = "120", value_parser = parse_seconds)]
    timeout: Duration,

    /// CSV output path
    #[arg(short, long, default_value = "results/benchmark_results.csv")]
    output: PathBuf,

    /// Engines to benchmark, all if not given
    #[arg(short, long, value_delimiter = ',')]
    engines: Vec<EngineKind>,

    /// Seed for the query and update workload
    #[arg(long, env = "SEED")]
    seed: Option<u64>,

    /// How the build memory is measured
    #[arg(long, value_enum, default_value_t = MemorySource::Peak)]
    memory: MemorySource,

    /// Keep benchmarking an engine on larger datasets after it timed out
    #[arg(long)]
    keep_larger_after_timeout: bool,
}

impl RunArgs {
    fn into_config(self) -> BenchConfig {
        BenchConfig {
            num_runs: self.num_runs,
            num_queries: self.num_queries,
            num_updates: self.num_updates,
            dataset_dir: self.dataset_dir,
            export_csv: self.export_csv,
            output: self.output,
            timeout: self.timeout,
            engines: if self.engines.is_empty() {
                EngineKind::ALL.to_vec()
            } else {
                self.engines
            },
            seed: self.seed,
            memory: self.memory,
            skip_larger_after_timeout: !self.keep_larger_after_timeout,
        }
    }
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Output directory
    #[arg(long, env = "DATASET_DIR", default_value = "datasets")]
    dir: PathBuf,

    /// Dataset sizes
    #[arg(short, long, value_delimiter = ',', default_values_t = generate::DEFAULT_SIZES)]
    sizes: Vec<usize>,

    /// Seed for the value generator
    #[arg(long, default_value_t = generate::DEFAULT_SEED)]
    seed: u64,

    /// Distributions to generate, all if not given
    #[arg(short, long, value_enum, value_delimiter = ',')]
    distributions: Vec<Distribution>,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let seconds = s.parse::<f64>().map_err(|e| e.to_string())?;
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

fn run(args: RunArgs) -> Result<()> {
    let config = args.into_config();
    config.validate()?;

    let datasets = dataset::load_dir(&config.dataset_dir)
        .with_context(|| format!("loading datasets from {}", config.dataset_dir.display()))?;

    let contenders = config
        .engines
        .iter()
        .map(|&kind| Arc::new(kind) as Arc<dyn Contender>)
        .collect::<Vec<_>>();

    let mut driver = Driver::new(config)?;
    let samples = driver.sweep(&datasets, &contenders);
    let records = aggregate::aggregate(&samples);

    let config = driver.config();
    if config.export_csv {
        export::export_csv(&config.output, &records)
            .with_context(|| format!("writing {}", config.output.display()))?;
    }
    Ok(())
}

fn generate(args: GenerateArgs) -> Result<()> {
    let distributions = if args.distributions.is_empty() {
        Distribution::ALL.to_vec()
    } else {
        args.distributions
    };
    let paths = generate::write_datasets(&args.dir, &distributions, &args.sizes, args.seed)?;
    info!("Wrote {} datasets to {}", paths.len(), args.dir.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Run(args) => run(args),
        Command::Generate(args) => generate(args),
    }
}
