#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use output::OutputMode;
use recur_core::config::Config;
use recur_core::db::SqliteStore;
use std::env;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "recur: spaced-repetition review scheduler for coding problems",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output.
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags and environment.
    fn output_mode(&self) -> OutputMode {
        output::resolve_output_mode(self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Reviews",
        about = "Register a problem and schedule its reviews",
        long_about = "Register a problem and schedule a spaced-repetition review ladder for it.",
        after_help = "EXAMPLES:\n    # Schedule the default ladder\n    rq add \"(E) 1. Two Sum\"\n\n    # Six reviews, no randomization\n    rq add 42 --times 6 --no-jitter\n\n    # A single ad-hoc review on a specific date\n    rq add 42 --date 2026-09-01\n\n    # Emit machine-readable output\n    rq add 42 --json"
    )]
    Add(cmd::add::AddArgs),

    #[command(
        next_help_heading = "Reviews",
        about = "Complete the earliest pending review",
        long_about = "Mark the earliest pending review completed; a late completion shifts every later review in its chain.",
        after_help = "EXAMPLES:\n    # Check in today's review\n    rq checkin 42\n\n    # Emit machine-readable output\n    rq checkin 42 --json"
    )]
    Checkin(cmd::checkin::CheckinArgs),

    #[command(
        next_help_heading = "Read",
        about = "List reviews due today",
        long_about = "List pending reviews scheduled on or before the end of the current local day.",
        after_help = "EXAMPLES:\n    # What is due today?\n    rq list\n\n    # Emit machine-readable output\n    rq list --json"
    )]
    List(cmd::list::ListArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show recent and upcoming reviews",
        long_about = "Show completed reviews from the last N days and pending reviews for the next N days.",
        after_help = "EXAMPLES:\n    # The default one-week window\n    rq review\n\n    # A month-long window\n    rq review --days 30"
    )]
    Review(cmd::review::ReviewArgs),

    #[command(
        next_help_heading = "Read",
        about = "Preview a cascade without applying it",
        long_about = "Show how future reviews would shift if the earliest pending review were completed at a given date. Persists nothing.",
        after_help = "EXAMPLES:\n    # If I finished right now?\n    rq preview 42\n\n    # If I finished next Monday?\n    rq preview 42 --at 2026-08-10"
    )]
    Preview(cmd::preview::PreviewArgs),

    #[command(
        next_help_heading = "Read",
        about = "Delay statistics for a review chain",
        after_help = "EXAMPLES:\n    # Most recent chain\n    rq stats 42\n\n    # A specific chain\n    rq stats 42 --chain 42-1754000000"
    )]
    Stats(cmd::stats::StatsArgs),

    #[command(
        next_help_heading = "Sessions",
        about = "Start a practice timer",
        after_help = "EXAMPLES:\n    rq start 42"
    )]
    Start(cmd::session::StartArgs),

    #[command(
        next_help_heading = "Sessions",
        about = "Stop the timer and check in",
        long_about = "Stop the active practice timer for a problem and automatically check in its review.",
        after_help = "EXAMPLES:\n    rq end 42"
    )]
    End(cmd::session::EndArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    rq completions bash\n\n    # Generate zsh completions\n    rq completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RECUR_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "recur=debug,info"
        } else {
            "recur=info,warn"
        })
    });

    let format = env::var("RECUR_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry.with(fmt::layer().json().with_ansi(false)).init();
        }
        _ => {
            registry.with(fmt::layer().compact()).init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let output = cli.output_mode();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    // Completions need no configuration or database.
    if let Commands::Completions(ref args) = cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let config = Config::load()?;
    let store = SqliteStore::open(&config.db_path())?;

    match cli.command {
        Commands::Add(ref args) => cmd::add::run_add(args, &config, &store, output),
        Commands::Checkin(ref args) => cmd::checkin::run_checkin(args, &store, output),
        Commands::List(ref args) => cmd::list::run_list(args, &store, output),
        Commands::Review(ref args) => cmd::review::run_review(args, &store, output),
        Commands::Preview(ref args) => cmd::preview::run_preview(args, &store, output),
        Commands::Stats(ref args) => cmd::stats::run_stats(args, &store, output),
        Commands::Start(ref args) => cmd::session::run_start(args, &store, output),
        Commands::End(ref args) => cmd::session::run_end(args, &store, output),
        Commands::Completions(_) => unreachable!("handled before config load"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_flag_parses_before_subcommand() {
        let cli = Cli::parse_from(["rq", "--json", "list"]);
        assert!(cli.json);
    }

    #[test]
    fn json_flag_parses_after_subcommand() {
        let cli = Cli::parse_from(["rq", "list", "--json"]);
        assert!(cli.json);
    }

    #[test]
    fn quiet_flag_parsed() {
        let cli = Cli::parse_from(["rq", "-q", "list"]);
        assert!(cli.quiet);
    }

    #[test]
    fn add_subcommand_parses() {
        let cli = Cli::parse_from(["rq", "add", "42", "--times", "4"]);
        assert!(matches!(cli.command, Commands::Add(_)));
    }

    #[test]
    fn checkin_subcommand_parses() {
        let cli = Cli::parse_from(["rq", "checkin", "42"]);
        assert!(matches!(cli.command, Commands::Checkin(_)));
    }

    #[test]
    fn review_subcommand_parses_window() {
        let cli = Cli::parse_from(["rq", "review", "--days", "14"]);
        match cli.command {
            Commands::Review(args) => assert_eq!(args.days, 14),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn completions_subcommand_parses() {
        let cli = Cli::parse_from(["rq", "completions", "zsh"]);
        assert!(matches!(cli.command, Commands::Completions(_)));
    }
}
