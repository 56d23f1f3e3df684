//! Process execution: fork, child-side redirection and signal setup, execvp,
//! and the parent-side foreground wait / background handoff.

use crate::ExitCode;
use crate::jobs::{self, ChildStatus};
use crate::parser::Command;
use crate::state::ShellState;
use anyhow::{Context, Result};
use nix::fcntl::{OFlag, open};
use nix::libc::{STDIN_FILENO, STDOUT_FILENO};
use nix::sys::signal::{SaFlags, SigAction, SigHandler, SigSet, Signal, sigaction};
use nix::sys::stat::Mode;
use nix::sys::wait::waitpid;
use nix::unistd::{ForkResult, dup2, execvp, fork};
use std::ffi::CString;
use std::os::fd::RawFd;
use std::process;

/// Shell exit status when fork itself fails.
pub const EXIT_FORK_FAILURE: i32 = 1;
/// Child exit status when a redirection target cannot be opened.
pub const EXIT_REDIRECT_OPEN: ExitCode = 1;
/// Child exit status when duplicating a descriptor onto stdin/stdout fails.
pub const EXIT_REDIRECT_DUP: ExitCode = 2;
/// Child exit status when the program image cannot be replaced.
pub const EXIT_EXEC_FAILURE: ExitCode = 2;

/// Default redirection target for background streams left on the terminal.
pub const NULL_DEVICE: &str = "/dev/null";

/// Fork and run an external command.
///
/// In the foreground case this blocks until the child terminates and records
/// the result in `state.last_status`. In the background case the child's pid
/// becomes the tracked background job, a notice is printed, and one
/// non-blocking check runs immediately so the prompt is never delayed.
pub fn run_command(cmd: &Command, state: &mut ShellState) -> Result<()> {
    // Argument vectors are prepared before forking; the exec primitive needs
    // NUL-terminated strings and the child must not allocate.
    let program = CString::new(cmd.args[0].as_str())
        .with_context(|| format!("invalid program name: {}", cmd.args[0]))?;
    let argv: Vec<CString> = cmd
        .args
        .iter()
        .map(|arg| CString::new(arg.as_str()))
        .collect::<std::result::Result<_, _>>()
        .context("argument contains an interior NUL byte")?;

    match unsafe { fork() } {
        Err(err) => {
            eprintln!("fork: {err}");
            process::exit(EXIT_FORK_FAILURE);
        }
        Ok(ForkResult::Child) => exec_child(cmd, &program, &argv),
        Ok(ForkResult::Parent { child }) => {
            if cmd.background {
                // Single-job tracking: any previously tracked pid is
                // silently overwritten.
                state.background = Some(child);
                println!("background pid is {child}");
                jobs::reap_background(state);
            } else {
                match waitpid(child, None) {
                    Ok(status) => {
                        if let Some(finished) = ChildStatus::from_wait(status) {
                            if let ChildStatus::Signaled(signal) = finished {
                                println!("terminated by signal {signal}");
                            }
                            state.last_status = finished;
                        }
                    }
                    Err(err) => eprintln!("waitpid: {err}"),
                }
            }
            Ok(())
        }
    }
}

/// Child-side setup and exec; never returns.
///
/// Children never handle the foreground-only toggle, and a foreground child
/// gets the default interrupt disposition back so Ctrl-C reaches it while
/// the shell stays immune.
fn exec_child(cmd: &Command, program: &CString, argv: &[CString]) -> ! {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    let _ = unsafe { sigaction(Signal::SIGTSTP, &ignore) };

    if !cmd.background {
        let default = SigAction::new(SigHandler::SigDfl, SaFlags::empty(), SigSet::empty());
        let _ = unsafe { sigaction(Signal::SIGINT, &default) };
    }

    if let Err(code) = set_up_redirections(cmd) {
        process::exit(code);
    }

    let err = match execvp(program, argv) {
        Err(err) => err,
        Ok(never) => match never {},
    };
    eprintln!("{}: {err}", cmd.args[0]);
    process::exit(EXIT_EXEC_FAILURE);
}

/// Apply the command's redirections onto stdin/stdout.
///
/// Explicit paths win; a background command's unredirected streams fall back
/// to the null device so it never reads from or writes to the terminal. On
/// failure the returned code distinguishes open errors from dup errors.
fn set_up_redirections(cmd: &Command) -> std::result::Result<(), ExitCode> {
    if let Some(path) = &cmd.input_path {
        redirect(path, OFlag::O_RDONLY, Mode::empty(), STDIN_FILENO)?;
    } else if cmd.background {
        redirect(NULL_DEVICE, OFlag::O_RDONLY, Mode::empty(), STDIN_FILENO)?;
    }

    if let Some(path) = &cmd.output_path {
        redirect(
            path,
            OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC,
            Mode::S_IRUSR | Mode::S_IWUSR,
            STDOUT_FILENO,
        )?;
    } else if cmd.background {
        redirect(NULL_DEVICE, OFlag::O_WRONLY, Mode::empty(), STDOUT_FILENO)?;
    }

    Ok(())
}

fn redirect(
    path: &str,
    flags: OFlag,
    mode: Mode,
    target: RawFd,
) -> std::result::Result<(), ExitCode> {
    let fd = match open(path, flags, mode) {
        Ok(fd) => fd,
        Err(err) => {
            eprintln!("cannot open {path}: {err}");
            return Err(EXIT_REDIRECT_OPEN);
        }
    };
    if let Err(err) = dup2(fd, target) {
        eprintln!("dup2: {err}");
        return Err(EXIT_REDIRECT_DUP);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::thread;
    use std::time::{Duration, Instant};

    fn command(args: &[&str]) -> Command {
        Command {
            args: args.iter().map(|s| s.to_string()).collect(),
            ..Command::default()
        }
    }

    #[test]
    fn foreground_exit_codes_are_recorded() {
        let mut state = ShellState::new();

        run_command(&command(&["true"]), &mut state).unwrap();
        assert_eq!(state.last_status, ChildStatus::Exited(0));

        run_command(&command(&["false"]), &mut state).unwrap();
        assert_eq!(state.last_status, ChildStatus::Exited(1));
    }

    #[test]
    fn output_redirection_creates_and_truncates_the_file() {
        let path = std::env::temp_dir().join(format!("smallsh_out_{}", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut cmd = command(&["echo", "hello"]);
        cmd.output_path = Some(path.to_string_lossy().into_owned());

        let mut state = ShellState::new();
        run_command(&cmd, &mut state).unwrap();

        assert_eq!(state.last_status, ChildStatus::Exited(0));
        assert_eq!(fs::read_to_string(&path).expect("redirect target"), "hello\n");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_input_file_fails_the_child_with_the_open_status() {
        let mut cmd = command(&["cat"]);
        cmd.input_path = Some("/no/such/file/for/smallsh".to_string());

        let mut state = ShellState::new();
        run_command(&cmd, &mut state).unwrap();

        assert_eq!(state.last_status, ChildStatus::Exited(EXIT_REDIRECT_OPEN));
    }

    #[test]
    fn unknown_program_fails_the_child_with_the_exec_status() {
        let mut state = ShellState::new();
        run_command(&command(&["definitely-not-a-real-program"]), &mut state).unwrap();
        assert_eq!(state.last_status, ChildStatus::Exited(EXIT_EXEC_FAILURE));
    }

    #[test]
    fn background_command_is_tracked_and_eventually_reaped() {
        let mut cmd = command(&["sleep", "1"]);
        cmd.background = true;

        let mut state = ShellState::new();
        run_command(&cmd, &mut state).unwrap();
        assert!(
            state.background.is_some(),
            "a live background child must be tracked right after launch"
        );
        // The foreground status is untouched by a background launch.
        assert_eq!(state.last_status, ChildStatus::Exited(0));

        let deadline = Instant::now() + Duration::from_secs(10);
        while state.background.is_some() {
            assert!(Instant::now() < deadline, "background child was never reaped");
            thread::sleep(Duration::from_millis(50));
            jobs::reap_background(&mut state);
        }
    }
}
