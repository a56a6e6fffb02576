//! `rq start` / `rq end` — the practice session timer. Ending a session
//! automatically performs the check-in flow.

use chrono::Utc;
use clap::Args;

use recur_core::db::SqliteStore;
use recur_core::{datetime, input};

use crate::cmd::checkin::{checkin_problem, render_checkin};
use crate::cmd::{core_failure, store_failure};
use crate::output::{CliError, OutputMode, render_error, render_json, render_success};

#[derive(Args, Debug)]
pub struct StartArgs {
    /// Problem to start a timer for.
    pub problem: String,
}

#[derive(Args, Debug)]
pub struct EndArgs {
    /// Problem whose timer should be stopped.
    pub problem: String,
}

pub fn run_start(args: &StartArgs, store: &SqliteStore, output: OutputMode) -> anyhow::Result<()> {
    let parsed =
        input::parse_problem_input(&args.problem).map_err(|e| core_failure(output, &e))?;
    store
        .get_or_create_problem(&parsed.problem_id, None, None)
        .map_err(|e| store_failure(output, e))?;

    if let Some(active) = store
        .active_session_for_problem(&parsed.problem_id)
        .map_err(|e| store_failure(output, e))?
    {
        render_success(
            output,
            &format!(
                "Session already active for {} (started {})",
                parsed.problem_id,
                datetime::format_relative(active.started_at, Utc::now())
            ),
        )?;
        return Ok(());
    }

    let now = Utc::now();
    let session = store
        .create_session(&parsed.problem_id, now)
        .map_err(|e| store_failure(output, e))?;

    if output.is_json() {
        return render_json(&session);
    }
    render_success(
        output,
        &format!("Timer started for problem {}", parsed.problem_id),
    )
}

pub fn run_end(args: &EndArgs, store: &SqliteStore, output: OutputMode) -> anyhow::Result<()> {
    let parsed =
        input::parse_problem_input(&args.problem).map_err(|e| core_failure(output, &e))?;

    if store
        .get_problem(&parsed.problem_id)
        .map_err(|e| store_failure(output, e))?
        .is_none()
    {
        let error = CliError::with_details(
            format!("problem {} not found", parsed.problem_id),
            "Register the problem with `rq add` first.",
            recur_core::ErrorCode::ProblemNotFound.code(),
        );
        render_error(output, &error)?;
        anyhow::bail!("{}", error.message);
    }

    let Some(session) = store
        .active_session_for_problem(&parsed.problem_id)
        .map_err(|e| store_failure(output, e))?
    else {
        render_success(
            output,
            &format!("No active session for problem {}", parsed.problem_id),
        )?;
        return Ok(());
    };

    let now = Utc::now();
    let ended = session.end(now);
    store
        .save_session(&ended)
        .map_err(|e| store_failure(output, e))?;

    if !output.is_json() {
        render_success(
            output,
            &format!(
                "Timer stopped for problem {} ({})",
                parsed.problem_id,
                ended.format_duration()
            ),
        )?;
    }

    // Auto check-in, same flow as `rq checkin`.
    let result =
        checkin_problem(store, &parsed.problem_id, now).map_err(|e| core_failure(output, &e))?;
    render_checkin(&result, now, output)
}
