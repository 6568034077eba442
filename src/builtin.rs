use std::env;
use std::fmt;
use std::fs::DirBuilder;
use std::io::{self, Write};
use std::os::unix::fs::DirBuilderExt;

use crate::dispatch::{Dispatcher, Invocation, Signal};
use crate::parser::{echo_breakdown, tokenize};

pub(crate) const CLEAR_SCREEN: &str = "\x1b[H\x1b[J";
pub(crate) const RECALL_MARKER: &str = "!!";

const DIRECTORY_MODE: u32 = 0o755;

/// A command executed inside the shell process.
pub(crate) trait Builtin {
    fn name(&self) -> &'static str;

    /// One line description shown by `help`.
    fn summary(&self) -> &'static str;

    fn run(
        &self,
        dispatcher: &Dispatcher,
        invocation: &Invocation<'_>,
        out: &mut dyn Write,
    ) -> io::Result<Signal>;
}

impl<'a> fmt::Debug for dyn Builtin + 'a {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Builtin").field(&self.name()).finish()
    }
}

/// Built-ins in lookup order; the first one with a matching name wins.
pub(crate) struct Registry {
    builtins: Vec<Box<dyn Builtin>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            builtins: vec![
                Box::new(Help),
                Box::new(ChangeDirectory),
                Box::new(MakeDirectory),
                Box::new(Exit),
                Box::new(Recall),
                Box::new(Clear),
            ],
        }
    }
}

impl Registry {
    pub(crate) fn lookup(&self, name: &str) -> Option<&dyn Builtin> {
        self.iter().find(|builtin| builtin.name() == name)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &dyn Builtin> {
        self.builtins.iter().map(|builtin| builtin.as_ref())
    }
}

/// Takes the single argument of `cd`/`mkdir`, reporting when there is none or
/// more than one.
fn single_argument<'a>(name: &str, invocation: &Invocation<'a>) -> Option<&'a str> {
    match invocation.args().as_slice() {
        [_, argument] => Some(*argument),
        [_] => {
            report!("expected argument to \"{}\"", name);
            None
        }
        _ => {
            report!("{}: too many arguments", name);
            None
        }
    }
}

struct Help;

impl Builtin for Help {
    fn name(&self) -> &'static str {
        "help"
    }

    fn summary(&self) -> &'static str {
        "displays this text"
    }

    fn run(
        &self,
        dispatcher: &Dispatcher,
        _: &Invocation<'_>,
        out: &mut dyn Write,
    ) -> io::Result<Signal> {
        let registry = dispatcher.registry();
        let width = registry.iter().map(|b| b.name().len()).max().unwrap_or(0);

        writeln!(out, "Here are all the built-in commands:")?;
        for builtin in registry.iter() {
            writeln!(
                out,
                "\x1b[1;32m{}\x1b[0m{:pad$}  - {}",
                builtin.name(),
                "",
                builtin.summary(),
                pad = width - builtin.name().len()
            )?;
        }

        Ok(Signal::Continue)
    }
}

struct ChangeDirectory;

impl Builtin for ChangeDirectory {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn summary(&self) -> &'static str {
        "changes the current working directory"
    }

    fn run(
        &self,
        _: &Dispatcher,
        invocation: &Invocation<'_>,
        _: &mut dyn Write,
    ) -> io::Result<Signal> {
        if let Some(path) = single_argument(self.name(), invocation) {
            if let Err(err) = env::set_current_dir(path) {
                report!("cd: {}: {}", path, err);
            }
        }

        Ok(Signal::Continue)
    }
}

struct MakeDirectory;

impl Builtin for MakeDirectory {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn summary(&self) -> &'static str {
        "makes a new directory"
    }

    fn run(
        &self,
        _: &Dispatcher,
        invocation: &Invocation<'_>,
        _: &mut dyn Write,
    ) -> io::Result<Signal> {
        if let Some(path) = single_argument(self.name(), invocation) {
            if let Err(err) = DirBuilder::new().mode(DIRECTORY_MODE).create(path) {
                report!("mkdir: {}: {}", path, err);
            }
        }

        Ok(Signal::Continue)
    }
}

struct Exit;

impl Builtin for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn summary(&self) -> &'static str {
        "exits this shell"
    }

    fn run(
        &self,
        _: &Dispatcher,
        _: &Invocation<'_>,
        _: &mut dyn Write,
    ) -> io::Result<Signal> {
        Ok(Signal::Stop)
    }
}

struct Recall;

impl Builtin for Recall {
    fn name(&self) -> &'static str {
        RECALL_MARKER
    }

    fn summary(&self) -> &'static str {
        "repeats the last command"
    }

    fn run(
        &self,
        dispatcher: &Dispatcher,
        invocation: &Invocation<'_>,
        out: &mut dyn Write,
    ) -> io::Result<Signal> {
        if invocation.previous.is_empty() {
            report!("no previous command to execute");
            return Ok(Signal::Continue);
        }

        if invocation.depth >= dispatcher.max_recall_depth() {
            report!(
                "!!: recalled more than {} times in one line",
                dispatcher.max_recall_depth()
            );
            return Ok(Signal::Continue);
        }

        let line = recall_line(invocation.previous, invocation.line);
        writeln!(out, "{}", line)?;

        let tokens = tokenize(&line);
        let recalled = Invocation {
            tokens: &tokens,
            previous: invocation.previous,
            line: &line,
            depth: invocation.depth + 1,
        };

        Ok(dispatcher.dispatch(&recalled, out))
    }
}

/// The previous line followed by whatever comes after the leading `!!`.
pub(crate) fn recall_line(previous: &str, line: &str) -> String {
    let start = line.trim_start_matches(|chr: char| matches!(chr, ' ' | '\t' | '\r' | '\n'));
    let rest = start.strip_prefix(RECALL_MARKER).unwrap_or(start);

    let mut recalled = String::with_capacity(previous.len() + rest.len());
    recalled.push_str(previous);
    recalled.push_str(rest);

    recalled
}

struct Clear;

impl Builtin for Clear {
    fn name(&self) -> &'static str {
        "clear"
    }

    fn summary(&self) -> &'static str {
        "clears the screen"
    }

    fn run(
        &self,
        _: &Dispatcher,
        _: &Invocation<'_>,
        out: &mut dyn Write,
    ) -> io::Result<Signal> {
        out.write_all(CLEAR_SCREEN.as_bytes())?;
        out.flush()?;

        Ok(Signal::Continue)
    }
}

/// Echo mode, entered when a line ends in `echo` or `ECHO`.
pub(crate) fn echo(line: &str, out: &mut dyn Write) -> io::Result<Signal> {
    for piece in echo_breakdown(line) {
        writeln!(out, "{}", piece)?;
    }

    Ok(Signal::Continue)
}
