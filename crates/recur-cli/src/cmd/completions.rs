//! `rq completions` — shell completion scripts.

use clap::{Args, Command};
use clap_complete::{Shell, generate};
use std::io;

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

pub fn run_completions(shell: Shell, command: &mut Command) -> anyhow::Result<()> {
    let name = command.get_name().to_string();
    generate(shell, command, name, &mut io::stdout());
    Ok(())
}
