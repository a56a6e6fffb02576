//! `rq checkin` — complete the earliest pending review and cascade.

use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;
use tracing::info;

use recur_core::db::SqliteStore;
use recur_core::model::{NewReview, Review};
use recur_core::schedule::cascade;
use recur_core::store::ReviewStore;
use recur_core::{CoreError, datetime, input};

use crate::cmd::{core_failure, store_failure};
use crate::output::{CliError, OutputMode, render_error, render_json, render_success};

#[derive(Args, Debug)]
pub struct CheckinArgs {
    /// Problem to check in: '1', '1. Two Sum', or '(E) 1. Two Sum'.
    pub problem: String,
}

/// What a check-in did, for rendering and for the `end` command's
/// auto-checkin path.
#[derive(Debug, Serialize)]
pub struct CheckinResult {
    pub problem_id: String,
    /// True when no pending review existed and a standalone completion
    /// was logged instead.
    pub orphan: bool,
    pub delay_days: i64,
    pub updated_count: usize,
    pub next_scheduled_at: Option<DateTime<Utc>>,
}

/// Perform the check-in flow against the store. Shared by `checkin` and
/// the session `end` command.
pub fn checkin_problem(
    store: &SqliteStore,
    problem_id: &str,
    now: DateTime<Utc>,
) -> Result<CheckinResult, CoreError> {
    let Some(review) = store.earliest_pending_for_problem(problem_id)? else {
        // Orphan check-in: no pending review, log a standalone completion
        // in its own single-entry chain. No siblings, no cascade.
        let chain_id = format!("{problem_id}-orphan-{}", now.timestamp());
        let orphan = store.insert(&NewReview {
            problem_id: problem_id.to_string(),
            chain_id,
            iteration: 0,
            scheduled_at: now,
        })?;
        let completed = orphan.complete(now)?;
        store.save(&completed)?;
        info!(problem = problem_id, "logged orphan completion");

        return Ok(CheckinResult {
            problem_id: problem_id.to_string(),
            orphan: true,
            delay_days: 0,
            updated_count: 0,
            next_scheduled_at: None,
        });
    };

    let outcome = cascade::complete_and_cascade(store, review, now)?;
    let next = store
        .earliest_pending_for_problem(problem_id)?
        .map(|r: Review| r.scheduled_at);

    Ok(CheckinResult {
        problem_id: problem_id.to_string(),
        orphan: false,
        delay_days: outcome.delay_days,
        updated_count: outcome.updated_count,
        next_scheduled_at: next,
    })
}

/// Render a check-in result in the requested output mode.
pub fn render_checkin(
    result: &CheckinResult,
    now: DateTime<Utc>,
    output: OutputMode,
) -> anyhow::Result<()> {
    if output.is_json() {
        return render_json(result);
    }

    if result.orphan {
        render_success(
            output,
            &format!(
                "Logged completion for problem {} (no pending review)",
                result.problem_id
            ),
        )?;
        return Ok(());
    }

    if result.delay_days > 0 {
        render_success(
            output,
            &format!(
                "Completed review for {} ({} day(s) late)",
                result.problem_id, result.delay_days
            ),
        )?;
        if result.updated_count > 0 {
            println!(
                "  shifted {} future review(s) by +{} day(s)",
                result.updated_count, result.delay_days
            );
        }
    } else {
        render_success(
            output,
            &format!("Completed review for {} on time", result.problem_id),
        )?;
    }

    if let Some(next) = result.next_scheduled_at {
        println!(
            "  next review: {} ({})",
            datetime::format_date_local(next),
            datetime::format_relative(next, now)
        );
    }
    Ok(())
}

pub fn run_checkin(
    args: &CheckinArgs,
    store: &SqliteStore,
    output: OutputMode,
) -> anyhow::Result<()> {
    let parsed =
        input::parse_problem_input(&args.problem).map_err(|e| core_failure(output, &e))?;

    let problem = store
        .get_problem(&parsed.problem_id)
        .map_err(|e| store_failure(output, e))?;
    if problem.is_none() {
        let error = CliError::with_details(
            format!("problem {} not found", parsed.problem_id),
            "Register the problem with `rq add` first.",
            recur_core::ErrorCode::ProblemNotFound.code(),
        );
        render_error(output, &error)?;
        anyhow::bail!("{}", error.message);
    }

    let now = Utc::now();
    let result =
        checkin_problem(store, &parsed.problem_id, now).map_err(|e| core_failure(output, &e))?;
    render_checkin(&result, now, output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkin_args_parse() {
        use clap::Parser;

        #[derive(Parser)]
        struct Wrapper {
            #[command(flatten)]
            args: CheckinArgs,
        }
        let w = Wrapper::parse_from(["test", "215. Kth Largest"]);
        assert_eq!(w.args.problem, "215. Kth Largest");
    }
}
