//! Built-in commands executed in-process: `cd`, `status`, and `exit`.
//!
//! Built-ins are parsed with the [`argh`] crate (`FromArgs`) and run directly
//! in the shell process, without forking. `exit` and `status` are recognized
//! from the first token of a line before command construction; `cd` is
//! recognized from `args[0]` of a fully built command.

use crate::ExitCode;
use crate::state::ShellState;
use anyhow::{Context, Result};
use argh::{EarlyExit, FromArgs};
use std::env;
use std::io::Write;
use std::path::PathBuf;

/// Built-in commands known to the shell at compile time.
pub trait BuiltinCommand: Sized + FromArgs {
    /// Canonical name of the command, e.g. "cd" or "status".
    fn name() -> &'static str;

    /// Executes the command against the shared shell state.
    ///
    /// Return value follows shell conventions: 0 for success, non-zero for error.
    fn execute(self, state: &mut ShellState, stdout: &mut dyn Write) -> Result<ExitCode>;
}

/// Parse `args` for the built-in `T` and execute it.
///
/// Argument-parsing failures (including `--help`) are written to `stdout`
/// instead of aborting the loop, mirroring how a shell reports usage errors.
pub fn run<T: BuiltinCommand>(
    args: &[&str],
    state: &mut ShellState,
    stdout: &mut dyn Write,
) -> Result<ExitCode> {
    match T::from_args(&[T::name()], args) {
        Ok(cmd) => cmd.execute(state, stdout),
        Err(EarlyExit { output, status }) => {
            writeln!(stdout, "{output}")?;
            Ok(if status.is_err() { 1 } else { 0 })
        }
    }
}

#[derive(FromArgs)]
/// Change the current working directory.
/// If no target is provided, changes to the directory named by the HOME
/// environment variable.
pub struct Cd {
    #[argh(positional)]
    /// directory to switch to; absolute or relative to the current directory.
    /// Defaults to $HOME when omitted.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn execute(
        self,
        _state: &mut ShellState,
        _stdout: &mut dyn Write,
    ) -> Result<ExitCode> {
        let target = match self.target {
            Some(t) if !t.is_empty() => PathBuf::from(t),
            _ => {
                let home = env::var("HOME").context("cd: no target and HOME not set")?;
                PathBuf::from(home)
            }
        };

        env::set_current_dir(&target)
            .with_context(|| format!("cd: can't chdir to {}", target.display()))?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Report how the most recent foreground child terminated: its exit status,
/// or the signal that killed it.
pub struct Status {
    #[argh(positional, greedy)]
    /// extra tokens are accepted and ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Status {
    fn name() -> &'static str {
        "status"
    }

    fn execute(self, state: &mut ShellState, stdout: &mut dyn Write) -> Result<ExitCode> {
        writeln!(stdout, "{}", state.last_status)?;
        Ok(0)
    }
}

#[derive(FromArgs)]
/// Terminate the shell.
pub struct Exit {
    #[argh(positional, greedy)]
    /// extra tokens are accepted and ignored.
    pub _args: Vec<String>,
}

impl BuiltinCommand for Exit {
    fn name() -> &'static str {
        "exit"
    }

    fn execute(self, state: &mut ShellState, _stdout: &mut dyn Write) -> Result<ExitCode> {
        state.should_exit = true;
        Ok(0)
    }
}
