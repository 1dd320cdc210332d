use std::io::stdout;
use std::path::PathBuf;

use clap::Parser;
use closed_huim::{Dataset, Emitter, Miner, Options, DEFAULT_MERGE_SIZE_CAP};

/// Mine closed high-utility itemsets from a transaction file
#[derive(Parser, Debug)]
#[command(name = "closed-huim", version)]
#[command(about = "Mine closed high-utility itemsets", long_about = None)]
struct Args {
    /// Transaction file, one `items:total:utilities` line per transaction
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Minimum utility of a reported itemset
    #[arg(short, long)]
    min_utility: u64,

    /// Write patterns to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Do not merge identical projected transactions
    #[arg(long)]
    no_merge: bool,

    /// Do not prune candidates by subtree utility
    #[arg(long)]
    no_subtree_pruning: bool,

    /// Do not emit closures directly
    #[arg(long)]
    no_closure_jump: bool,

    /// Longest projected suffix considered for merging
    #[arg(long, default_value_t = DEFAULT_MERGE_SIZE_CAP)]
    merge_cap: usize,

    /// Read at most this many transactions
    #[arg(long)]
    max_transactions: Option<usize>,

    /// Explore top-level branches in parallel
    #[arg(short, long)]
    parallel: bool,

    /// Log progress and print search statistics to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut options = Options::new()
        .with_merging(!args.no_merge)
        .with_subtree_pruning(!args.no_subtree_pruning)
        .with_closure_jumping(!args.no_closure_jump)
        .with_merge_size_cap(args.merge_cap)
        .with_parallel(args.parallel);
    if let Some(max) = args.max_transactions {
        options = options.with_max_transactions(max);
    }
    options.validate()?;

    let dataset = Dataset::load(&args.input, options.max_transactions)?;
    let mut emitter = match &args.output {
        Some(path) => Emitter::to_file(path)?,
        None => Emitter::to_writer(stdout()),
    };

    let stats = Miner::new(options).mine_into(&dataset, args.min_utility, &mut emitter)?;
    emitter.finish()?;

    if args.verbose {
        eprintln!("{}", stats);
    }
    Ok(())
}
