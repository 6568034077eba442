#[macro_use]
mod macros;

pub mod builtin;
pub mod config;
pub mod dispatch;
pub mod errno;
pub mod execution;
pub mod parser;
pub mod shell;
pub mod sig;

#[cfg(test)]
mod test_util;

use std::error::Error;
use std::io;

use rustyline::DefaultEditor;

use crate::config::Config;
use crate::shell::Shell;
use crate::sig::{ignore_interrupt, install_sighandler};

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env();

    install_sighandler(libc::SIGINT, ignore_interrupt)?;

    let mut editor = DefaultEditor::new()?;
    let mut shell = Shell::new(&config);
    shell.run(&mut editor, config::PROMPT, &mut io::stdout())?;

    Ok(())
}
