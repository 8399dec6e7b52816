//! CLI binary for the mention tracker.

use anyhow::{Context, bail};
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mention_search::{ProgressCallback, ProgressEvent, SortOrder, StrategyKind};
use mention_tracker::export::{default_file_name, write_csv_file};
use mention_tracker::{SearchOverrides, Summary, TrackerConfig, build_request, run_search};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Track recent Reddit mentions of a term and export them to CSV.
#[derive(Parser)]
#[command(name = "mention-tracker", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Command,
}

/// Available commands.
#[derive(Subcommand)]
enum Command {
    /// Search Reddit for recent mentions of a term.
    Search(SearchArgs),

    /// Write the default configuration file.
    InitConfig {
        /// Destination. Defaults to `~/.config/mention-tracker/config.toml`.
        path: Option<PathBuf>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// Length of the search progress bar.
const PROGRESS_STEPS: u64 = 100;

/// Bar position for events that carry a completion fraction.
fn bar_position(event: &ProgressEvent) -> Option<u64> {
    event
        .fraction()
        .map(|f| (f64::from(f.clamp(0.0, 1.0)) * PROGRESS_STEPS as f64).round() as u64)
}

#[derive(Args)]
struct SearchArgs {
    /// Brand, product or phrase to look for.
    term: String,

    /// Trailing window in days.
    #[arg(short, long, conflicts_with = "since")]
    days: Option<i64>,

    /// First day to include (YYYY-MM-DD, UTC).
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD, UTC). Defaults to now.
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Maximum mentions to keep.
    #[arg(short, long = "max")]
    max: Option<usize>,

    /// Reddit sort order: relevance, hot, new, top, comments.
    #[arg(long)]
    sort: Option<SortOrder>,

    /// Strategy to run, in priority order. Repeatable: json-api, browser, subreddit-sweep.
    #[arg(short, long = "strategy")]
    strategies: Vec<StrategyKind>,

    /// CSV output path. Defaults to `reddit_mentions_<term>_<YYYYMMDD>.csv`
    /// in the configured output directory.
    #[arg(short, long, conflicts_with = "no_export")]
    output: Option<PathBuf>,

    /// Print the summary only.
    #[arg(long)]
    no_export: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so the summary on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("mention_tracker=info,mention_search=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Search(args) => {
            let config = TrackerConfig::load(cli.config.as_deref())?;
            run_search_command(config, args).await
        }
        Command::InitConfig { path, force } => init_config(path.or(cli.config), force),
    }
}

async fn run_search_command(config: TrackerConfig, args: SearchArgs) -> anyhow::Result<()> {
    let overrides = SearchOverrides {
        days: args.days,
        since: args.since,
        until: args.until,
        max_results: args.max,
        sort: args.sort,
        strategies: args.strategies,
    };
    let request = build_request(&args.term, &config.search, &overrides, Utc::now())?;

    let bar = ProgressBar::new(PROGRESS_STEPS);
    if let Ok(style) =
        ProgressStyle::with_template("  {spinner} [{bar:30}] {msg} [{elapsed}]")
    {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.enable_steady_tick(Duration::from_millis(120));
    bar.set_message(format!("Searching Reddit for '{}'", request.term));

    let pb = bar.clone();
    let callback: ProgressCallback = Box::new(move |event| {
        if let Some(position) = bar_position(&event) {
            pb.set_position(position);
        }
        match event {
            ProgressEvent::StrategyStarted {
                strategy,
                position,
                total,
            } => pb.set_message(format!("[{position}/{total}] {strategy}")),
            ProgressEvent::StrategyFinished {
                strategy,
                status,
                collected,
            } => pb.println(format!("  {strategy}: {status} ({collected} held)")),
            ProgressEvent::Finished { mentions } => {
                pb.set_message(format!("done, {mentions} mentions"));
            }
        }
    });

    let outcome = run_search(&config, &request, Some(&callback)).await;
    bar.finish_and_clear();
    let result = outcome?;

    if result.all_failed() && !result.strategies.is_empty() {
        eprintln!(
            "Warning: every strategy failed. Reddit may be blocking requests; try again later."
        );
    }

    if !args.no_export {
        let path = args.output.unwrap_or_else(|| {
            config
                .export
                .output_dir
                .join(default_file_name(&request.term, Utc::now().date_naive()))
        });
        write_csv_file(&path, &result.mentions)?;
        println!("Saved {} mentions to {}\n", result.len(), path.display());
    }

    print!("{}", Summary::from_result(&result));
    Ok(())
}

fn init_config(path: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(TrackerConfig::default_config_path);
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    TrackerConfig::default()
        .save_to_file(&path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
