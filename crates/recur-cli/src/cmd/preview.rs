//! `rq preview` — dry-run of the delay cascade for a problem's earliest
//! pending review. Nothing is persisted.

use std::io::{self, Write};

use chrono::Utc;
use clap::Args;

use recur_core::db::SqliteStore;
use recur_core::schedule::cascade;
use recur_core::{datetime, input};

use crate::cmd::{core_failure, store_failure};
use crate::output::{OutputMode, pretty_section, render_json, render_success};

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Problem to preview: '1', '1. Two Sum', or '(E) 1. Two Sum'.
    pub problem: String,

    /// Hypothetical completion date (defaults to now).
    #[arg(long)]
    pub at: Option<String>,
}

pub fn run_preview(
    args: &PreviewArgs,
    store: &SqliteStore,
    output: OutputMode,
) -> anyhow::Result<()> {
    let parsed =
        input::parse_problem_input(&args.problem).map_err(|e| core_failure(output, &e))?;

    let Some(review) = store
        .earliest_pending_for_problem(&parsed.problem_id)
        .map_err(|e| store_failure(output, e))?
    else {
        render_success(
            output,
            &format!("No pending review for problem {}", parsed.problem_id),
        )?;
        return Ok(());
    };

    // An explicit date inherits the review's time of day so a date N days
    // out previews an exactly-N-day delay.
    let completed_at = match args.at {
        Some(ref raw) => {
            let date = datetime::parse_date(raw).map_err(|e| core_failure(output, &e))?;
            date.and_time(review.scheduled_at.time()).and_utc()
        }
        None => Utc::now(),
    };

    let shifts =
        cascade::preview(store, &review, Some(completed_at)).map_err(|e| core_failure(output, &e))?;

    if output.is_json() {
        return render_json(&shifts);
    }

    if shifts.is_empty() {
        render_success(
            output,
            &format!(
                "Completing review #{} of {} then would be on time; nothing shifts",
                review.iteration, parsed.problem_id
            ),
        )?;
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    pretty_section(
        &mut out,
        &format!(
            "Cascade preview for {} (+{} day delay)",
            parsed.problem_id, shifts[0].delay_days
        ),
    )?;
    for shift in &shifts {
        writeln!(
            out,
            "  #{:<3} {}  ->  {}",
            shift.iteration,
            datetime::format_date_local(shift.old_date),
            datetime::format_date_local(shift.new_date)
        )?;
    }
    writeln!(out, "{} review(s) would shift", shifts.len())?;
    Ok(())
}
