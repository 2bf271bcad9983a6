// convbench: time the four convolution strategies against one BGR image.
//
// The image is either synthesised (default, 1920x1080 with 4-byte row
// alignment) or read as headerless BGR24 from --raw. Logging goes to stderr
// and is controlled by RUST_LOG; the report goes to stdout.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use env_logger::Env;
use log::{debug, info};
use serde_json::json;

use convbench::{
    BenchmarkParameters, Orchestrator, PixelSource, Profile, RawFileSource, ReclamationPolicy,
    Report, Strategy, SyntheticSource,
};

#[derive(Parser, Debug)]
#[command(
    name = "convbench",
    version,
    about = "Benchmark memory-access strategies for a 5x5 edge-detection kernel"
)]
struct Cli {
    /// Parameter preset; the flags below override individual settings
    #[arg(long, value_enum, default_value_t = Profile::Baseline)]
    profile: Profile,

    /// Strategy identifier to run (repeatable), or `all`
    #[arg(long = "strategy", short = 's', default_value = "all")]
    strategies: Vec<String>,

    /// Iterations per strategy
    #[arg(long, short = 'n')]
    iterations: Option<u32>,

    /// Run iterations on the rayon pool
    #[arg(long)]
    parallel: bool,

    /// Run iterations one after another, even if the profile is parallel
    #[arg(long, conflicts_with = "parallel")]
    sequential: bool,

    /// Keep every output buffer alive until the run has been timed
    #[arg(long)]
    keep_buffers: bool,

    /// Scratch-pool reclamation policy
    #[arg(long, value_enum)]
    reclamation: Option<ReclamationPolicy>,

    /// Worker threads for parallel runs (default: one per core)
    #[arg(long)]
    threads: Option<usize>,

    /// Read headerless BGR24 pixels from this file instead of synthesising
    #[arg(long)]
    raw: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long, default_value_t = 1920)]
    width: usize,

    /// Image height in pixels
    #[arg(long, default_value_t = 1080)]
    height: usize,

    /// Row pitch of the --raw file in bytes (default: width * 3)
    #[arg(long, requires = "raw")]
    stride: Option<usize>,

    /// Row alignment of the synthetic image in bytes
    #[arg(long, default_value_t = 4)]
    row_align: usize,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// List strategy identifiers and profiles, then exit
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn parameters(&self) -> BenchmarkParameters {
        let defaults = self.profile.parameters();
        let mut builder = self.profile.builder();
        if let Some(n) = self.iterations {
            builder = builder.iterations(n);
        }
        if self.parallel {
            builder = builder.parallel(true);
        } else if self.sequential {
            builder = builder.parallel(false);
        }
        if self.keep_buffers {
            builder = builder.auto_dispose(false);
        }
        builder
            .reclamation(self.reclamation.unwrap_or(defaults.reclamation))
            .build()
    }

    fn source(&self) -> Box<dyn PixelSource> {
        match &self.raw {
            Some(path) => {
                let mut source = RawFileSource::new(path, self.width, self.height);
                if let Some(stride) = self.stride {
                    source = source.with_stride(stride);
                }
                Box::new(source)
            }
            None => Box::new(
                SyntheticSource::new(self.width, self.height).with_row_align(self.row_align),
            ),
        }
    }

    fn strategy_ids(&self) -> Vec<String> {
        if self.strategies.iter().any(|s| s.eq_ignore_ascii_case("all")) {
            Strategy::ALL.iter().map(|s| s.id().to_owned()).collect()
        } else {
            self.strategies.clone()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let orchestrator = Orchestrator::new();

    if cli.list {
        list(&orchestrator);
        return Ok(());
    }

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .with_context(|| format!("failed to start {threads} worker threads"))?;
    }

    let params = cli.parameters();
    let source = cli.source();
    let ids = cli.strategy_ids();
    info!(
        "profile {}: {} iterations, {}, auto_dispose={}, reclamation={}",
        cli.profile.name(),
        params.iterations,
        if params.parallel { "parallel" } else { "sequential" },
        params.auto_dispose,
        params.reclamation
    );
    debug!("strategies: {ids:?}");

    let outcomes = orchestrator
        .run(ids.as_slice(), source.as_ref(), &params)
        .with_context(|| format!("cannot benchmark {}", source.describe()))?;
    let report = Report::from_outcomes(outcomes);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&to_json(&report))?);
    } else {
        print!("{report}");
    }

    if report.ranked().is_empty() && !report.failures().is_empty() {
        bail!("every strategy failed");
    }
    Ok(())
}

fn list(orchestrator: &Orchestrator<'_>) {
    let registry = orchestrator.registry();
    println!("Strategies:");
    for id in registry.identifiers() {
        println!("  {:<16} {}", id, registry.resolve(id));
    }
    println!("  (unknown identifiers run {})", registry.default_strategy());
    println!("Profiles:");
    for profile in Profile::ALL {
        let p = profile.parameters();
        println!(
            "  {:<12} parallel={:<5} auto_dispose={:<5} reclamation={}",
            profile.name(),
            p.parallel,
            p.auto_dispose,
            p.reclamation
        );
    }
}

fn to_json(report: &Report) -> serde_json::Value {
    let ms = |d: std::time::Duration| d.as_secs_f64() * 1000.0;
    let results: Vec<_> = report
        .ranked()
        .iter()
        .map(|r| {
            json!({
                "strategy": r.strategy,
                "iterations": r.iterations,
                "total_ms": ms(r.total),
                "average_ms": ms(r.average),
            })
        })
        .collect();
    let failures: Vec<_> = report
        .failures()
        .iter()
        .map(|f| json!({ "strategy": f.strategy, "error": f.message }))
        .collect();
    json!({
        "results": results,
        "failures": failures,
        "fastest": report.fastest().map(|r| r.strategy.clone()),
        "speedup": report.speedup(),
    })
}
