//! Shared shell state threaded through the read-eval loop.

use crate::jobs::ChildStatus;
use nix::unistd::Pid;

/// Mutable context owned by the interpreter for the lifetime of the run.
///
/// This replaces what would otherwise be free-standing process globals: the
/// loop, the built-ins, and the job reaper all read and write it. The one
/// piece of state *not* held here is the foreground-only flag, which lives in
/// [`crate::signals`] as a process-wide atomic because it must be safe to
/// mutate from signal-handler context.
#[derive(Debug)]
pub struct ShellState {
    /// Termination descriptor of the most recent foreground child; reported
    /// by the `status` built-in. Starts as a normal exit with code 0.
    pub last_status: ChildStatus,
    /// The single tracked background child, if one is outstanding. Launching
    /// a new background command while one is tracked overwrites this slot;
    /// the shell tracks at most one background job at a time.
    pub background: Option<Pid>,
    /// Set by the `exit` built-in; the loop terminates once it is true.
    pub should_exit: bool,
}

impl ShellState {
    pub fn new() -> Self {
        Self {
            last_status: ChildStatus::default(),
            background: None,
            should_exit: false,
        }
    }
}

impl Default for ShellState {
    fn default() -> Self {
        Self::new()
    }
}
