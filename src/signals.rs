//! Foreground-only mode controller and signal dispositions for the shell.
//!
//! SIGTSTP toggles a process-wide foreground-only flag; while it is set, the
//! parser drops a trailing `&` and every command runs in the foreground. The
//! handler is restricted to async-signal-safe work: one atomic flip and one
//! `write` of a fixed message. SIGINT is ignored by the shell itself and
//! restored to its default disposition inside foreground children, so the
//! interrupt key reaches the child but never kills the shell.

use nix::sys::signal::{
    SaFlags, SigAction, SigHandler, SigSet, Signal, SigmaskHow, sigaction, sigprocmask,
};
use nix::unistd;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_MSG: &[u8] = b"entering foreground only mode\n";
const EXIT_MSG: &[u8] = b"exiting foreground only mode\n";

/// Current state of foreground-only mode.
pub fn foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

/// SIGTSTP handler: flip the mode flag and announce the new state.
///
/// Only async-signal-safe operations are allowed here, so the messages are
/// fixed byte strings written straight to standard output.
extern "C" fn toggle_foreground_only(_signal: nix::libc::c_int) {
    let was_on = FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst);
    let msg = if was_on { EXIT_MSG } else { ENTER_MSG };
    let _ = unistd::write(io::stdout(), msg);
}

/// Install the shell's signal dispositions: SIGINT ignored, SIGTSTP toggling
/// foreground-only mode. Children adjust their own dispositions after fork.
pub fn install() -> nix::Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    unsafe { sigaction(Signal::SIGINT, &ignore)? };

    let toggle = SigAction::new(
        SigHandler::Handler(toggle_foreground_only),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    unsafe { sigaction(Signal::SIGTSTP, &toggle)? };

    Ok(())
}

/// Block SIGTSTP delivery. The loop blocks it for the duration of a line
/// read so the mode-change message never interleaves with the prompt; a
/// toggle requested mid-read is delivered as soon as the read completes.
pub fn block_sigtstp() -> nix::Result<()> {
    sigprocmask(SigmaskHow::SIG_BLOCK, Some(&tstp_set()), None)
}

/// Unblock SIGTSTP delivery, releasing any toggle that arrived while blocked.
pub fn unblock_sigtstp() -> nix::Result<()> {
    sigprocmask(SigmaskHow::SIG_UNBLOCK, Some(&tstp_set()), None)
}

fn tstp_set() -> SigSet {
    let mut set = SigSet::empty();
    set.add(Signal::SIGTSTP);
    set
}
