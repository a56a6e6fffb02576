//! `rq stats` — delay statistics for a problem's review chain.

use std::io::{self, Write};

use clap::Args;

use recur_core::db::SqliteStore;
use recur_core::input;
use recur_core::schedule::cascade;

use crate::cmd::{core_failure, store_failure};
use crate::output::{OutputMode, pretty_kv, pretty_section, render_json, render_success};

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Problem to report on: '1', '1. Two Sum', or '(E) 1. Two Sum'.
    pub problem: String,

    /// Report on a specific chain instead of the most recent one.
    #[arg(long)]
    pub chain: Option<String>,
}

pub fn run_stats(args: &StatsArgs, store: &SqliteStore, output: OutputMode) -> anyhow::Result<()> {
    let parsed =
        input::parse_problem_input(&args.problem).map_err(|e| core_failure(output, &e))?;

    let chain_id = match args.chain {
        Some(ref explicit) => Some(explicit.clone()),
        None => store
            .latest_chain_id(&parsed.problem_id)
            .map_err(|e| store_failure(output, e))?,
    };
    let Some(chain_id) = chain_id else {
        render_success(
            output,
            &format!("No review chains recorded for problem {}", parsed.problem_id),
        )?;
        return Ok(());
    };

    let stats =
        cascade::chain_statistics(store, &chain_id).map_err(|e| core_failure(output, &e))?;

    if output.is_json() {
        return render_json(&serde_json::json!({
            "problem_id": parsed.problem_id,
            "chain_id": chain_id,
            "stats": stats,
        }));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    pretty_section(&mut out, &format!("Chain statistics for {}", parsed.problem_id))?;
    pretty_kv(&mut out, "chain", &chain_id)?;
    pretty_kv(&mut out, "total", stats.total_reviews.to_string())?;
    pretty_kv(&mut out, "completed", stats.completed_reviews.to_string())?;
    pretty_kv(&mut out, "pending", stats.pending_reviews.to_string())?;
    pretty_kv(&mut out, "total delay", format!("{} day(s)", stats.total_delay_days))?;
    pretty_kv(
        &mut out,
        "mean delay",
        format!("{:.1} day(s)", stats.average_delay_days),
    )?;
    pretty_kv(&mut out, "max delay", format!("{} day(s)", stats.max_delay_days))?;
    pretty_kv(&mut out, "late", stats.reviews_with_delay.to_string())?;
    Ok(())
}
