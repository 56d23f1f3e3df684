//! Token classification: builds a [`Command`] from the lexed token stream.

use std::error::Error;
use std::fmt;

/// Input redirection operator.
pub const REDIRECT_IN: &str = "<";
/// Output redirection operator.
pub const REDIRECT_OUT: &str = ">";
/// Background marker; only meaningful as the last token of a line.
pub const BACKGROUND_MARKER: &str = "&";

/// A single parsed command line.
///
/// Rebuilt fresh for every loop iteration; nothing here outlives one pass of
/// the read-eval loop.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Command {
    /// Program name followed by its arguments, in order. Never empty for a
    /// successfully parsed command.
    pub args: Vec<String>,
    /// Path standard input is redirected from, if any.
    pub input_path: Option<String>,
    /// Path standard output is redirected to, if any.
    pub output_path: Option<String>,
    /// True when the line ended with `&` and foreground-only mode was off.
    pub background: bool,
}

/// Errors that can occur while classifying the token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsingError {
    /// A redirection operator was the last token of the line, so there is no
    /// target path to consume.
    MissingRedirectTarget(&'static str),
    /// The line contained tokens but none of them became an argument
    /// (e.g. only redirections), so there is no program to run.
    EmptyCommand,
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsingError::MissingRedirectTarget(op) => {
                write!(f, "syntax error: `{op}` with no target path")
            }
            ParsingError::EmptyCommand => write!(f, "syntax error: no command given"),
        }
    }
}

impl Error for ParsingError {}

/// Consume the token stream in order and classify each token.
///
/// - `<` and `>` each take the following token as a redirection path;
/// - a final `&` requests background execution, which `foreground_only`
///   silently suppresses;
/// - an `&` anywhere else is an ordinary argument;
/// - everything else is appended to `args`.
pub fn build_command<'a, I>(tokens: I, foreground_only: bool) -> Result<Command, ParsingError>
where
    I: Iterator<Item = &'a str>,
{
    let mut tokens = tokens.peekable();
    let mut cmd = Command::default();

    while let Some(tok) = tokens.next() {
        match tok {
            REDIRECT_IN => {
                let target = tokens
                    .next()
                    .ok_or(ParsingError::MissingRedirectTarget(REDIRECT_IN))?;
                cmd.input_path = Some(target.to_string());
            }
            REDIRECT_OUT => {
                let target = tokens
                    .next()
                    .ok_or(ParsingError::MissingRedirectTarget(REDIRECT_OUT))?;
                cmd.output_path = Some(target.to_string());
            }
            BACKGROUND_MARKER if tokens.peek().is_none() => {
                cmd.background = !foreground_only;
            }
            other => cmd.args.push(other.to_string()),
        }
    }

    if cmd.args.is_empty() {
        return Err(ParsingError::EmptyCommand);
    }

    Ok(cmd)
}
