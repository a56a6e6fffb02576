//! `rq review` — history window: what was completed, what is coming up.

use std::io::{self, Write};

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use serde::Serialize;

use recur_core::datetime;
use recur_core::db::SqliteStore;
use recur_core::model::Review;

use crate::cmd::store_failure;
use crate::output::{OutputMode, pretty_section, render_json, render_success};

#[derive(Args, Debug)]
pub struct ReviewArgs {
    /// Days of history and lookahead to include.
    #[arg(short, long, default_value = "7")]
    pub days: i64,
}

#[derive(Debug, Serialize)]
struct HistoryEntry {
    problem_id: String,
    iteration: u32,
    scheduled_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    delay_days: i64,
}

#[derive(Debug, Serialize)]
struct HistoryReport {
    completed: Vec<HistoryEntry>,
    upcoming: Vec<HistoryEntry>,
}

fn to_entry(review: &Review) -> HistoryEntry {
    HistoryEntry {
        problem_id: review.problem_id.clone(),
        iteration: review.iteration,
        scheduled_at: review.scheduled_at,
        completed_at: review.completed_at,
        delay_days: review.delay_days(),
    }
}

pub fn run_review(
    args: &ReviewArgs,
    store: &SqliteStore,
    output: OutputMode,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let window = Duration::days(args.days.max(0));

    let completed = store
        .completed_between(now - window, now)
        .map_err(|e| store_failure(output, e))?;
    let upcoming = store
        .pending_between(now, now + window)
        .map_err(|e| store_failure(output, e))?;

    let report = HistoryReport {
        completed: completed.iter().map(to_entry).collect(),
        upcoming: upcoming.iter().map(to_entry).collect(),
    };

    if output.is_json() {
        return render_json(&report);
    }

    if report.completed.is_empty() && report.upcoming.is_empty() {
        render_success(
            output,
            &format!("No reviews within ±{} day(s)", args.days),
        )?;
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !report.completed.is_empty() {
        pretty_section(&mut out, "Past reviews (completed)")?;
        for entry in &report.completed {
            let status = if entry.delay_days > 0 {
                format!("{} day(s) late", entry.delay_days)
            } else {
                "on time".to_string()
            };
            let completed_on = entry
                .completed_at
                .map_or_else(|| "-".to_string(), datetime::format_date_local);
            writeln!(
                out,
                "  {:<8} #{:<3} scheduled {}  completed {}  ({status})",
                entry.problem_id,
                entry.iteration,
                datetime::format_date_local(entry.scheduled_at),
                completed_on
            )?;
        }
        writeln!(out)?;
    }

    if !report.upcoming.is_empty() {
        pretty_section(&mut out, "Upcoming reviews (scheduled)")?;
        for entry in &report.upcoming {
            writeln!(
                out,
                "  {:<8} #{:<3} {}  ({})",
                entry.problem_id,
                entry.iteration,
                datetime::format_date_local(entry.scheduled_at),
                datetime::format_relative(entry.scheduled_at, now)
            )?;
        }
    }
    Ok(())
}
