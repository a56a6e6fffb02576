//! `rq list` — the reviews due as of today (local calendar day).

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

use recur_core::datetime;
use recur_core::db::SqliteStore;
use recur_core::schedule::due;

use crate::cmd::{core_failure, store_failure};
use crate::output::{OutputMode, pretty_section, render_json, render_success};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Maximum reviews to show.
    #[arg(short = 'n', long, default_value = "50")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
struct DueRow {
    problem_id: String,
    title: Option<String>,
    difficulty: Option<String>,
    iteration: u32,
    scheduled_at: DateTime<Utc>,
    overdue_days: i64,
}

pub fn run_list(args: &ListArgs, store: &SqliteStore, output: OutputMode) -> anyhow::Result<()> {
    let now = Utc::now();
    let due = due::due_as_of(store, now).map_err(|e| core_failure(output, &e))?;

    let mut rows = Vec::new();
    for review in due.into_iter().take(args.limit) {
        let problem = store
            .get_problem(&review.problem_id)
            .map_err(|e| store_failure(output, e))?;
        rows.push(DueRow {
            problem_id: review.problem_id.clone(),
            title: problem.as_ref().and_then(|p| p.title.clone()),
            difficulty: problem
                .as_ref()
                .and_then(|p| p.difficulty)
                .map(|d| d.to_string()),
            iteration: review.iteration,
            scheduled_at: review.scheduled_at,
            overdue_days: datetime::days_late(review.scheduled_at, now),
        });
    }

    if output.is_json() {
        return render_json(&rows);
    }

    if rows.is_empty() {
        render_success(output, "No reviews due today")?;
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match output {
        OutputMode::Pretty => {
            pretty_section(&mut out, "Due reviews")?;
            for row in &rows {
                let overdue = if row.overdue_days > 0 {
                    format!("{} day(s) overdue", row.overdue_days)
                } else {
                    "due today".to_string()
                };
                writeln!(
                    out,
                    "  {:<8} {:<4} #{:<3} {}  {}  [{}]",
                    row.problem_id,
                    row.difficulty.as_deref().unwrap_or("-"),
                    row.iteration,
                    datetime::format_date_local(row.scheduled_at),
                    row.title.as_deref().unwrap_or("N/A"),
                    overdue
                )?;
            }
            writeln!(out, "Total: {} review(s) due", rows.len())?;
        }
        OutputMode::Text | OutputMode::Json => {
            for row in &rows {
                writeln!(
                    out,
                    "{}\t{}\t{}\t{}\t{}",
                    row.problem_id,
                    row.iteration,
                    datetime::format_date_local(row.scheduled_at),
                    row.overdue_days,
                    row.title.as_deref().unwrap_or("N/A")
                )?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_args_defaults() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: ListArgs,
        }
        let w = Wrapper::parse_from(["test"]);
        assert_eq!(w.args.limit, 50);
    }
}
