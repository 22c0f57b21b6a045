//! Trace-driven cache simulator CLI.

use clap::Parser;
use log::LevelFilter;
use std::path::PathBuf;
use std::process;

use cachesim::cache::Cache;
use cachesim::config::{Config, RecencyTracking, WritePolicy};
use cachesim::sim;
use cachesim::stats::Report;

#[derive(Parser, Debug)]
#[command(
    name = "cachesim",
    author,
    version,
    about = "Trace-driven set-associative cache simulator",
    long_about = None,
)]
struct Cli {
    /// Memory access trace (`r <hex>` / `w <hex>` records).
    trace: PathBuf,

    /// Print the program banner before simulating.
    #[arg(short = 'v', long = "banner")]
    banner: bool,

    /// Log every access: decoded address fields and hit/miss outcome.
    #[arg(short = 't', long = "trace-accesses")]
    trace_accesses: bool,

    /// Dump the final contents of every block after the report.
    #[arg(short = 'd', long)]
    dump: bool,

    /// TOML configuration file with a `[cache]` table.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Total cache size in bytes.
    #[arg(long)]
    size_bytes: Option<u64>,

    /// Number of sets.
    #[arg(long)]
    sets: Option<u64>,

    /// Ways per set.
    #[arg(long)]
    ways: Option<u64>,

    /// Block size in bytes.
    #[arg(long)]
    line_bytes: Option<u64>,

    #[arg(long, value_enum)]
    write_policy: Option<WritePolicy>,

    /// LRU bookkeeping strategy.
    #[arg(long, value_enum)]
    recency: Option<RecencyTracking>,

    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.trace_accesses);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_logging(trace_accesses: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if trace_accesses {
        builder.filter_module("cachesim", LevelFilter::Trace);
    }
    builder
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    apply_overrides(&cli, &mut config);

    if cli.banner {
        print_banner();
    }

    let mut cache = Cache::new(&config.cache)?;
    sim::run_file(&mut cache, &cli.trace)?;
    cache.check_invariants()?;

    let report = Report::new(&cache);
    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{report}");
    }

    if cli.dump {
        print!("{}", cache.dump());
    }
    Ok(())
}

fn apply_overrides(cli: &Cli, config: &mut Config) {
    let cache = &mut config.cache;
    if cli.size_bytes.is_some() {
        cache.size_bytes = cli.size_bytes;
        // An explicit size on the command line wins over a file's set count.
        if cli.sets.is_none() {
            cache.sets = None;
        }
    }
    if cli.sets.is_some() {
        cache.sets = cli.sets;
        if cli.size_bytes.is_none() {
            cache.size_bytes = None;
        }
    }
    if let Some(ways) = cli.ways {
        cache.ways = ways;
    }
    if let Some(line_bytes) = cli.line_bytes {
        cache.line_bytes = line_bytes;
    }
    if let Some(policy) = cli.write_policy {
        cache.write_policy = policy;
    }
    if let Some(recency) = cli.recency {
        cache.recency = recency;
    }
}

fn print_banner() {
    println!(
        "\n\n************************ cachesim v{} ************************",
        env!("CARGO_PKG_VERSION")
    );
    println!("{}\n", env!("CARGO_PKG_DESCRIPTION"));
}
