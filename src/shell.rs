use std::io::Write;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::builtin::RECALL_MARKER;
use crate::config::Config;
use crate::dispatch::{Dispatcher, Invocation, Signal};
use crate::parser::{tokenize, Token};

/// Where the shell gets its input lines from.
pub(crate) trait LineSource {
    /// Returns `None` at end of input.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ReadlineError>;

    fn add_history(&mut self, _line: &str) {}
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>, ReadlineError> {
        loop {
            match self.readline(prompt) {
                Ok(line) => return Ok(Some(line)),
                // ctrl-c drops the line being edited
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => return Ok(None),
                Err(err) => return Err(err),
            }
        }
    }

    fn add_history(&mut self, line: &str) {
        if let Err(err) = self.add_history_entry(line) {
            report!("history: {}", err);
        }
    }
}

/// The last line that was neither empty nor a recall.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct PreviousLine(String);

impl PreviousLine {
    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    fn update(&mut self, line: &str, tokens: &[Token]) {
        match tokens.first() {
            None => {}
            Some(first) if first.as_str() == RECALL_MARKER => {}
            Some(_) => {
                self.0.clear();
                self.0.push_str(line);
            }
        }
    }
}

pub(crate) struct Shell {
    dispatcher: Dispatcher,
    previous: PreviousLine,
}

impl Shell {
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            dispatcher: Dispatcher::new(config.max_recall_depth),
            previous: PreviousLine::default(),
        }
    }

    /// Tokenizes and dispatches one raw line. The previous line is only
    /// replaced after dispatch, so a recall always sees the line from before.
    pub(crate) fn execute_line(&mut self, line: &str, out: &mut dyn Write) -> Signal {
        let tokens = tokenize(line);
        let signal = self
            .dispatcher
            .dispatch(&Invocation::new(&tokens, self.previous.as_str(), line), out);

        self.previous.update(line, &tokens);

        signal
    }

    /// Reads and executes lines until `exit` or the end of input.
    pub(crate) fn run(
        &mut self,
        source: &mut dyn LineSource,
        prompt: &str,
        out: &mut dyn Write,
    ) -> Result<(), ReadlineError> {
        while let Some(line) = source.read_line(prompt)? {
            if !line.trim().is_empty() {
                source.add_history(&line);
            }

            if self.execute_line(&line, out) == Signal::Stop {
                break;
            }
        }

        Ok(())
    }
}
