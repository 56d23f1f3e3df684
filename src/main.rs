use anyhow::Context;
use smallsh::{Interpreter, signals};

fn main() -> anyhow::Result<()> {
    signals::install().context("installing signal handlers")?;
    Interpreter::new().repl()
}
