// # Input
//
// - Format of measurements.txt:
//      - `<string: station name>;<double: measurement>`
//      - eg: "Hamburg;12.0"
//
// - Station name:
//      - non empty UTF-8 string containing neither ; nor \n
//
// - Temperature value:
//      - optional '-', integer digits, '.', exactly one fractional digit
//
// - Anything else aborts the run with a "malformed record" error.
//
// # Output
//
//      - `{<station name>=<min>/<mean>/<max>, ...}` sorted by name bytes
//
// # Running
//
//      - Run as normal: `cargo run --release -- measurements.txt`
//
//      - Profiling:
//          - `cargo build --profile profiling`
//          - `samply record ./target/profiling/obrc measurements.txt`
//          - heap: `cargo run --release --features dhat-heap`

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::{Context, bail};
use clap::Parser;

use obrc::{
    config::{Config, DEFAULT_BLOCK_SIZE},
    pipeline, verify,
};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

#[derive(Debug, Parser)]
#[command(version, about = "Min/mean/max temperature per weather station", long_about = None)]
struct Args {
    /// Measurements file, one `<station>;<temperature>` per line.
    #[arg(default_value = "measurements.txt")]
    path: PathBuf,

    /// Bytes read per chunk.
    #[arg(long, default_value_t = DEFAULT_BLOCK_SIZE)]
    block_size: usize,

    /// Aggregation threads, defaults to the number of cores.
    #[arg(long)]
    workers: Option<usize>,

    /// Reference report to check the result against.
    #[arg(long)]
    expected: Option<PathBuf>,

    /// Also store the report in this file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print progress and timing to stderr.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = match self.workers {
            Some(workers) => Config::with_workers(workers),
            None => Config::default(),
        }
        .block_size(self.block_size);
        config.verbose = self.verbose;
        config
    }
}

fn main() -> anyhow::Result<()> {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    let args = Args::parse();
    let start = Instant::now();

    let results = pipeline::run(&args.path, &args.config())
        .with_context(|| format!("processing {}", args.path.display()))?
        .format();

    println!("{results}");

    if args.verbose {
        eprintln!("Run completed in: {:?} seconds", start.elapsed().as_secs_f32());
    }

    if let Some(output) = &args.output {
        store_result(&results, output)?;
    }

    if let Some(expected) = &args.expected {
        check_correct(&results, expected)?;
    }

    Ok(())
}

fn store_result(results: &str, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, results).with_context(|| format!("writing {}", path.display()))?;
    eprintln!("Results stored in {:?}", path.display().to_string());
    Ok(())
}

fn check_correct(results: &str, path: &Path) -> anyhow::Result<()> {
    let correct = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let (fatal, notes): (Vec<_>, Vec<_>) = verify::compare(results, &correct)?
        .into_iter()
        .partition(|m| m.is_fatal());
    for note in &notes {
        eprintln!("note: {note}");
    }
    if fatal.is_empty() {
        eprintln!("PASSED!");
        return Ok(());
    }

    eprintln!("ERROR, output does not match expected!");
    for mismatch in &fatal {
        eprintln!("{mismatch}");
    }
    bail!("{} difference(s) against {}", fatal.len(), path.display());
}
