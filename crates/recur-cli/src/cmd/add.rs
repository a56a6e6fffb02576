//! `rq add` — register a problem and schedule its review ladder.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tracing::debug;

use recur_core::config::Config;
use recur_core::db::SqliteStore;
use recur_core::model::NewReview;
use recur_core::schedule::Scheduler;
use recur_core::store::ReviewStore;
use recur_core::{datetime, input};

use crate::cmd::{core_failure, store_failure};
use crate::output::{OutputMode, pretty_section, render_json, render_success};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Problem to register: '1', '1. Two Sum', or '(E) 1. Two Sum'.
    pub problem: String,

    /// Number of review intervals to schedule.
    #[arg(short, long)]
    pub times: Option<u32>,

    /// Schedule a single ad-hoc review on this date instead of a ladder.
    #[arg(short, long)]
    pub date: Option<String>,

    /// Problem title (overrides any title embedded in the input).
    #[arg(long)]
    pub title: Option<String>,

    /// Disable interval randomization for this registration.
    #[arg(long)]
    pub no_jitter: bool,
}

#[derive(Debug, Serialize)]
struct ScheduledReview {
    iteration: u32,
    scheduled_at: DateTime<Utc>,
    days_from_now: i64,
}

#[derive(Debug, Serialize)]
struct AddResult {
    problem_id: String,
    chain_id: String,
    created: usize,
    skipped: usize,
    schedule: Vec<ScheduledReview>,
}

pub fn run_add(
    args: &AddArgs,
    config: &Config,
    store: &SqliteStore,
    output: OutputMode,
) -> anyhow::Result<()> {
    let parsed =
        input::parse_problem_input(&args.problem).map_err(|e| core_failure(output, &e))?;

    // An explicit --title wins over whatever was embedded in the input.
    let title_source = args.title.as_deref().unwrap_or(&parsed.display_title);
    let (difficulty, clean_title) = input::parse_title(title_source);
    let title = if clean_title.is_empty() || clean_title == parsed.problem_id {
        None
    } else {
        Some(clean_title)
    };

    store
        .get_or_create_problem(&parsed.problem_id, title.as_deref(), difficulty)
        .map_err(|e| store_failure(output, e))?;

    let now = Utc::now();
    let chain_id = format!("{}-{}", parsed.problem_id, now.timestamp());

    if let Some(ref raw_date) = args.date {
        return add_single(store, output, &parsed.problem_id, &chain_id, raw_date);
    }

    let times = args.times.unwrap_or(config.defaults.review_times);
    let table = config.interval_table().map_err(|e| core_failure(output, &e))?;
    let scheduler = Scheduler::new(table);
    let mut rng = rand::thread_rng();

    let schedule = scheduler
        .schedule(now, times, !args.no_jitter, &mut rng)
        .map_err(|e| core_failure(output, &e))?;

    let mut created = Vec::new();
    let mut skipped = 0_usize;
    for (iteration, scheduled_at) in (1_u32..).zip(schedule.iter()) {
        let duplicate = store
            .check_duplicate(&parsed.problem_id, scheduled_at.date_naive(), &chain_id)
            .map_err(|e| store_failure(output, e))?;
        if duplicate.is_some() {
            skipped += 1;
            debug!(problem = %parsed.problem_id, iteration, "skipped duplicate review day");
            continue;
        }

        store
            .insert(&NewReview {
                problem_id: parsed.problem_id.clone(),
                chain_id: chain_id.clone(),
                iteration,
                scheduled_at: *scheduled_at,
            })
            .map_err(|e| store_failure(output, e))?;
        created.push(ScheduledReview {
            iteration,
            scheduled_at: *scheduled_at,
            days_from_now: datetime::days_between(now, *scheduled_at),
        });
    }

    let result = AddResult {
        problem_id: parsed.problem_id.clone(),
        chain_id,
        created: created.len(),
        skipped,
        schedule: created,
    };

    match output {
        OutputMode::Json => render_json(&result)?,
        OutputMode::Pretty => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            pretty_section(
                &mut out,
                &format!("Review schedule for {}", result.problem_id),
            )?;
            for entry in &result.schedule {
                writeln!(
                    out,
                    "  #{:<3} {}  (+{} days)",
                    entry.iteration,
                    datetime::format_date_local(entry.scheduled_at),
                    entry.days_from_now
                )?;
            }
            writeln!(out, "Created {} review(s)", result.created)?;
            if result.skipped > 0 {
                writeln!(out, "Skipped {} duplicate review(s)", result.skipped)?;
            }
        }
        OutputMode::Text => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            for entry in &result.schedule {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    entry.iteration,
                    datetime::format_date_local(entry.scheduled_at),
                    entry.days_from_now
                )?;
            }
        }
    }
    Ok(())
}

fn add_single(
    store: &SqliteStore,
    output: OutputMode,
    problem_id: &str,
    chain_id: &str,
    raw_date: &str,
) -> anyhow::Result<()> {
    let date = datetime::parse_date(raw_date).map_err(|e| core_failure(output, &e))?;
    let scheduled_at = datetime::utc_midnight(date);

    let duplicate = store
        .check_duplicate(problem_id, date, chain_id)
        .map_err(|e| store_failure(output, e))?;
    if duplicate.is_some() {
        render_success(
            output,
            &format!("Review for problem {problem_id} on {date} already exists"),
        )?;
        return Ok(());
    }

    store
        .insert(&NewReview {
            problem_id: problem_id.to_string(),
            chain_id: chain_id.to_string(),
            iteration: 0,
            scheduled_at,
        })
        .map_err(|e| store_failure(output, e))?;

    render_success(
        output,
        &format!("Added review for problem {problem_id} on {date}"),
    )?;
    Ok(())
}
