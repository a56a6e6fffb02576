//! Command handlers for the `rq` binary. One module per subcommand.

pub mod add;
pub mod checkin;
pub mod completions;
pub mod list;
pub mod preview;
pub mod review;
pub mod session;
pub mod stats;

use recur_core::CoreError;

use crate::output::{CliError, OutputMode, render_error};

/// Render a core error in the requested mode and convert it into the
/// `anyhow` failure that sets the exit code.
pub(crate) fn core_failure(output: OutputMode, error: &CoreError) -> anyhow::Error {
    let cli = CliError::from_core(error);
    let _ = render_error(output, &cli);
    anyhow::anyhow!("{}", cli.message)
}

/// Same, for store errors crossing the collaborator boundary.
pub(crate) fn store_failure(output: OutputMode, error: recur_core::StoreError) -> anyhow::Error {
    core_failure(output, &CoreError::from(error))
}
