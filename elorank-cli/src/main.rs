mod config;
mod discovery;
mod output;
mod session;
mod simulate;
mod store;

use clap::Parser;
use elorank_core::{EngineConfig, RatingEngine};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::config::ElorankConfig;

pub fn bail(msg: impl std::fmt::Display) -> ! {
    eprintln!("Error: {msg}");
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "elorank", version, about = "Rank images by judging them two at a time")]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: ~/.config/elorank/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Judge pairs of images from a directory interactively
    Rank(RankArgs),
    /// Print the rankings stored in a state file
    Rankings(RankingsArgs),
    /// Measure how well the engine recovers a hidden ranking
    Simulate(SimulateArgs),
    /// Create a default config file at ~/.config/elorank/config.toml
    Init,
}

#[derive(clap::Args)]
struct EngineArgs {
    /// Rating given to images never compared before
    #[arg(long)]
    default_rating: Option<f64>,

    /// Maximum rating change per comparison
    #[arg(long)]
    k_factor: Option<f64>,

    /// Random candidate pairs drawn per selection
    #[arg(long)]
    candidate_pairs: Option<usize>,

    /// Seed for reproducible pair selection
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(clap::Args)]
struct RankArgs {
    /// Directory to search (recursively) for images
    dir: PathBuf,

    /// JSON state file: loaded on start if present, saved after every judgment
    #[arg(long)]
    state: Option<PathBuf>,

    /// Image extension to include (repeatable, replaces the default list)
    #[arg(long = "ext")]
    extensions: Vec<String>,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(clap::Args)]
struct RankingsArgs {
    /// JSON state file written by `elorank rank`
    #[arg(long)]
    state: Option<PathBuf>,

    /// Output JSON instead of table
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
struct SimulateArgs {
    /// Number of items with hidden ratings
    #[arg(long, default_value_t = 50)]
    items: usize,

    /// Number of simulated judgments
    #[arg(long, default_value_t = 2000)]
    comparisons: usize,

    /// Output JSON instead of text
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    engine: EngineArgs,
}

/// Merge CLI flags over config values over built-in defaults.
fn engine_config(args: &EngineArgs, cfg: &ElorankConfig) -> EngineConfig {
    let defaults = EngineConfig::default();
    EngineConfig {
        default_rating: args.default_rating.or(cfg.default_rating).unwrap_or(defaults.default_rating),
        k_factor: args.k_factor.or(cfg.k_factor).unwrap_or(defaults.k_factor),
        max_candidate_pairs: args.candidate_pairs.or(cfg.candidate_pairs).unwrap_or(defaults.max_candidate_pairs),
        seed: args.seed.or(cfg.seed),
    }
}

fn new_engine(config: EngineConfig) -> RatingEngine {
    RatingEngine::new(config).unwrap_or_else(|e| bail(e))
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .unwrap_or_else(|e| bail(format!("Failed to install logger: {e}")));

    let config_path = cli.config.clone().unwrap_or_else(config::config_path);

    match cli.command {
        Commands::Rank(args) => run_rank(args, &config::load_config(&config_path)),
        Commands::Rankings(args) => run_rankings(args, &config::load_config(&config_path)),
        Commands::Simulate(args) => run_simulate(args, &config::load_config(&config_path)),
        Commands::Init => {
            config::create_default_config(&config_path);
            println!("Created config at {}", config_path.display());
            println!("Edit it to set your default K-factor, state file, etc.");
        }
    }
}

fn run_rank(args: RankArgs, cfg: &ElorankConfig) {
    if !args.dir.is_dir() {
        bail(format!("{} is not a directory", args.dir.display()));
    }

    let extensions = if !args.extensions.is_empty() {
        args.extensions.clone()
    } else {
        cfg.extensions.clone().unwrap_or_else(discovery::default_extensions)
    };
    let images = discovery::find_images(&args.dir, &extensions);
    if images.is_empty() {
        bail(format!("No supported image files found in {}", args.dir.display()));
    }

    let mut engine = new_engine(engine_config(&args.engine, cfg));
    let state_file = args.state.clone().or_else(|| cfg.state_file.clone());
    if let Some(ref path) = state_file {
        match store::load_state(&mut engine, path) {
            Ok(true) => eprintln!(
                "Resumed {} comparisons from {}",
                engine.total_comparisons(),
                path.display()
            ),
            Ok(false) => {}
            Err(e) => bail(format!("Failed to load state from {}: {e}", path.display())),
        }
    }

    let source = args.dir.canonicalize().unwrap_or_else(|_| args.dir.clone());
    let added = engine
        .load_pool(
            Some(source.display().to_string()),
            images.iter().map(|img| img.id.clone()),
        )
        .unwrap_or_else(|e| bail(e));
    eprintln!("Loaded {} images ({} new)", images.len(), added);

    let paths: HashMap<String, PathBuf> = images.into_iter().map(|img| (img.id, img.path)).collect();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let summary = session::run_session(&mut engine, &paths, state_file.as_deref(), stdin.lock(), &mut stdout)
        .unwrap_or_else(|e| bail(format!("Terminal I/O failed: {e}")));

    if let Some(ref path) = state_file {
        save_or_bail(&engine, path);
    }
    eprintln!(
        "Session over: {} judged, {} skipped, {} total comparisons",
        summary.judged,
        summary.skipped,
        engine.total_comparisons(),
    );
    output::print_table(&engine.rankings(), engine.total_comparisons());
}

fn save_or_bail(engine: &RatingEngine, path: &Path) {
    store::save_state(engine, path)
        .unwrap_or_else(|e| bail(format!("Failed to save state to {}: {e}", path.display())));
}

fn run_rankings(args: RankingsArgs, cfg: &ElorankConfig) {
    let path = args.state.clone().or_else(|| cfg.state_file.clone()).unwrap_or_else(|| {
        bail("No state file specified. Pass --state or set state_file in the config.")
    });

    let mut engine = new_engine(EngineConfig {
        default_rating: cfg.default_rating.unwrap_or(EngineConfig::default().default_rating),
        ..EngineConfig::default()
    });
    match store::load_state(&mut engine, &path) {
        Ok(true) => {}
        Ok(false) => bail(format!("State file {} does not exist", path.display())),
        Err(e) => bail(format!("Failed to load state from {}: {e}", path.display())),
    }

    let rankings = engine.rankings();
    if args.json {
        output::print_json(&rankings, engine.total_comparisons(), engine.source());
    } else {
        if let Some(source) = engine.source() {
            println!("Source: {source}\n");
        }
        output::print_table(&rankings, engine.total_comparisons());
    }
}

fn run_simulate(args: SimulateArgs, cfg: &ElorankConfig) {
    let config = engine_config(&args.engine, cfg);
    let report = simulate::run_simulation(args.items, args.comparisons, config)
        .unwrap_or_else(|e| bail(e));

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| bail(format!("Failed to encode report: {e}")));
        println!("{json}");
    } else {
        simulate::print_report(&report);
    }
}
