//! A small interactive shell with foreground/background job control.
//!
//! This crate implements a minimal command interpreter: it reads a line of
//! input, expands every `$$` into the shell's process id, parses the line
//! into a [`parser::Command`], and runs it either as a built-in (`cd`,
//! `status`, `exit`) or as a forked child process. Commands support `<` and
//! `>` redirection and a trailing `&` for background execution; SIGTSTP
//! toggles a foreground-only mode in which the trailing `&` is ignored.
//!
//! The main entry point is [`Interpreter`], which owns the shared shell
//! state and drives the read-eval loop. The public modules expose the
//! individual stages for reuse and testing.

pub mod builtin;
pub mod executor;
pub mod jobs;
pub mod lexer;
pub mod parser;
pub mod signals;
pub mod state;

mod interpreter;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::Interpreter;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
/// This mirrors the convention used by POSIX shells and many command-line tools.
pub type ExitCode = i32;
