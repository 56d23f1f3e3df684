//! Background job reaping and child termination reporting.

use crate::state::ShellState;
use nix::sys::wait::{WaitPidFlag, WaitStatus, waitpid};
use std::fmt;
use std::process;

/// Exit status used when the non-blocking background reap itself fails.
pub const EXIT_REAP_FAILURE: i32 = 3;

/// How a child process ended: a normal exit or a terminating signal.
///
/// These are the only two outcomes the shell reports; the `Display` form is
/// the exact text the `status` built-in and the reaper print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildStatus {
    /// Normal termination with the given exit code.
    Exited(i32),
    /// Abnormal termination by the given signal number.
    Signaled(i32),
}

impl ChildStatus {
    /// Translate a wait result into a termination descriptor.
    ///
    /// Returns `None` for states that are not terminations (stopped,
    /// continued, still alive); the caller keeps waiting in that case.
    pub fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(ChildStatus::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(ChildStatus::Signaled(signal as i32)),
            _ => None,
        }
    }
}

impl Default for ChildStatus {
    fn default() -> Self {
        ChildStatus::Exited(0)
    }
}

impl fmt::Display for ChildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildStatus::Exited(code) => write!(f, "exit status {code}"),
            ChildStatus::Signaled(signal) => write!(f, "terminated by signal {signal}"),
        }
    }
}

/// Non-blocking check on the tracked background child, once per loop pass.
///
/// If the child has terminated, its pid and termination reason are printed
/// and the tracking slot is cleared so a later background launch can use it.
/// A failure of the underlying wait call is fatal to the whole shell.
pub fn reap_background(state: &mut ShellState) {
    let Some(pid) = state.background else {
        return;
    };

    match waitpid(pid, Some(WaitPidFlag::WNOHANG)) {
        Ok(WaitStatus::StillAlive) => {}
        Ok(status) => {
            if let Some(done) = ChildStatus::from_wait(status) {
                println!("background pid {pid} is done {done}");
                state.background = None;
            }
        }
        Err(err) => {
            eprintln!("waitpid: {err}");
            process::exit(EXIT_REAP_FAILURE);
        }
    }
}
