//! The read-eval loop tying the stages together.

use crate::builtin::{self, Cd, Exit, Status};
use crate::executor;
use crate::jobs;
use crate::lexer;
use crate::parser;
use crate::signals;
use crate::state::ShellState;
use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::Write;

/// The prompt printed before each line read.
const PROMPT: &str = ": ";

/// The interactive shell: owns the shared state and drives the loop.
///
/// [`Interpreter::eval_line`] is the per-line core (expansion, parsing,
/// built-in dispatch, execution); [`Interpreter::repl`] wraps it in a
/// rustyline read loop with the signal masking the mode controller needs.
pub struct Interpreter {
    state: ShellState,
}

impl Interpreter {
    pub fn new() -> Self {
        Self {
            state: ShellState::new(),
        }
    }

    /// Shared state, exposed for inspection in tests and embedding.
    pub fn state(&self) -> &ShellState {
        &self.state
    }

    /// Evaluate one line of input.
    ///
    /// Blank lines and `#` comments are ignored. `exit` and `status` are
    /// dispatched from the first token before a command is built; `cd` is
    /// dispatched from `args[0]` afterwards; anything else forks.
    pub fn eval_line(&mut self, line: &str, stdout: &mut dyn Write) -> Result<()> {
        if lexer::is_blank_or_comment(line) {
            return Ok(());
        }

        let expanded = lexer::expand_pid(line, std::process::id());
        let tokens: Vec<&str> = lexer::split_into_tokens(&expanded).collect();

        // exit and status bypass command construction entirely.
        match tokens.first() {
            Some(&"exit") => {
                builtin::run::<Exit>(&tokens[1..], &mut self.state, stdout)?;
                return Ok(());
            }
            Some(&"status") => {
                builtin::run::<Status>(&tokens[1..], &mut self.state, stdout)?;
                return Ok(());
            }
            _ => {}
        }

        let cmd = parser::build_command(tokens.into_iter(), signals::foreground_only())?;

        if cmd.args[0] == "cd" {
            let args: Vec<&str> = cmd.args[1..].iter().map(String::as_str).collect();
            builtin::run::<Cd>(&args, &mut self.state, stdout)?;
            return Ok(());
        }

        executor::run_command(&cmd, &mut self.state)
    }

    /// The interactive read-eval loop.
    ///
    /// SIGTSTP is blocked for the duration of each line read, so the mode
    /// toggle is announced only between prompts. After every evaluation the
    /// tracked background job gets one non-blocking reap pass.
    pub fn repl(&mut self) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        let mut stdout = std::io::stdout();

        loop {
            signals::block_sigtstp()?;
            let readline = rl.readline(PROMPT);
            signals::unblock_sigtstp()?;

            match readline {
                Ok(line) => {
                    rl.add_history_entry(line.as_str())?;
                    if let Err(err) = self.eval_line(&line, &mut stdout) {
                        eprintln!("{err:#}");
                    }
                    if self.state.should_exit {
                        break;
                    }
                }
                // The shell itself is immune to the interrupt key.
                Err(ReadlineError::Interrupted) => {}
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }

            jobs::reap_background(&mut self.state);
        }

        Ok(())
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::ChildStatus;
    use std::fs;

    #[test]
    fn blank_and_comment_lines_change_nothing() {
        let mut sh = Interpreter::new();
        let mut out = Vec::new();

        sh.eval_line("", &mut out).unwrap();
        sh.eval_line("   ", &mut out).unwrap();
        sh.eval_line("# echo this never runs", &mut out).unwrap();

        assert!(out.is_empty(), "ignored lines must produce no output");
        assert_eq!(sh.state().last_status, ChildStatus::Exited(0));
        assert!(!sh.state().should_exit);
    }

    #[test]
    fn exit_sets_the_termination_flag() {
        let mut sh = Interpreter::new();
        let mut out = Vec::new();
        sh.eval_line("exit", &mut out).unwrap();
        assert!(sh.state().should_exit);
    }

    #[test]
    fn status_reports_before_any_child_has_run() {
        let mut sh = Interpreter::new();
        let mut out = Vec::new();
        sh.eval_line("status", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "exit status 0\n");
    }

    #[test]
    fn malformed_redirect_is_a_reported_error() {
        let mut sh = Interpreter::new();
        let mut out = Vec::new();
        let res = sh.eval_line("wc <", &mut out);
        assert!(res.is_err(), "a redirect with no target must not execute");
        assert_eq!(sh.state().last_status, ChildStatus::Exited(0));
    }

    #[test]
    fn redirected_echo_then_status_round_trip() {
        let path = std::env::temp_dir().join(format!("smallsh_eval_{}", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut sh = Interpreter::new();
        let mut out = Vec::new();
        sh.eval_line(&format!("echo hello > {}", path.display()), &mut out)
            .unwrap();
        assert_eq!(fs::read_to_string(&path).expect("redirect target"), "hello\n");

        let mut out = Vec::new();
        sh.eval_line("status", &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "exit status 0\n");

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn pid_marker_expands_before_execution() {
        let path = std::env::temp_dir().join(format!("smallsh_pid_{}", std::process::id()));
        let _ = fs::remove_file(&path);

        let mut sh = Interpreter::new();
        let mut out = Vec::new();
        sh.eval_line(&format!("echo $$ > {}", path.display()), &mut out)
            .unwrap();

        let written = fs::read_to_string(&path).expect("redirect target");
        assert_eq!(written.trim(), std::process::id().to_string());

        let _ = fs::remove_file(&path);
    }
}
