use std::io::Write;

use crate::builtin::{echo, Builtin, Registry};
use crate::execution;
use crate::parser::{Operator, Token, ECHO_MARKERS};

/// Whether the shell keeps reading lines after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    Continue,
    Stop,
}

/// Everything a command sees while it is being dispatched.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Invocation<'a> {
    pub(crate) tokens: &'a [Token],
    pub(crate) previous: &'a str,
    pub(crate) line: &'a str,
    /// Number of `!!` recalls this dispatch is nested in.
    pub(crate) depth: usize,
}

impl<'a> Invocation<'a> {
    pub(crate) fn new(tokens: &'a [Token], previous: &'a str, line: &'a str) -> Self {
        Self {
            tokens,
            previous,
            line,
            depth: 0,
        }
    }

    pub(crate) fn args(&self) -> Vec<&'a str> {
        self.tokens.iter().map(Token::as_str).collect()
    }
}

#[derive(Debug)]
pub(crate) enum Route<'r> {
    Empty,
    Echo,
    Pipe {
        left: Vec<String>,
        right: Vec<String>,
    },
    RedirectOutput {
        args: Vec<String>,
        target: Option<String>,
    },
    RedirectInput {
        args: Vec<String>,
        source: Option<String>,
    },
    Builtin(&'r dyn Builtin),
    External(Vec<String>),
}

fn render(tokens: &[Token]) -> Vec<String> {
    tokens.iter().map(|t| t.as_str().to_owned()).collect()
}

pub(crate) struct Dispatcher {
    registry: Registry,
    max_recall_depth: usize,
}

impl Dispatcher {
    pub(crate) fn new(max_recall_depth: usize) -> Self {
        Self {
            registry: Registry::default(),
            max_recall_depth,
        }
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn max_recall_depth(&self) -> usize {
        self.max_recall_depth
    }

    /// Decides what a token sequence runs as. Only the first operator counts;
    /// tokens after it go to the right hand side unexamined.
    pub(crate) fn route(&self, tokens: &[Token]) -> Route<'_> {
        let Some(last) = tokens.last() else {
            return Route::Empty;
        };

        if ECHO_MARKERS.contains(&last.as_str()) {
            return Route::Echo;
        }

        let operator = tokens
            .iter()
            .enumerate()
            .find_map(|(position, token)| match token {
                Token::Operator(operator) => Some((position, *operator)),
                Token::Word(_) => None,
            });

        if let Some((position, operator)) = operator {
            let args = render(&tokens[..position]);
            let rest = &tokens[position + 1..];
            let operand = rest.first().map(|token| token.as_str().to_owned());

            return match operator {
                Operator::Pipe => Route::Pipe {
                    left: args,
                    right: render(rest),
                },
                Operator::RedirectOutput => Route::RedirectOutput {
                    args,
                    target: operand,
                },
                Operator::RedirectInput => Route::RedirectInput {
                    args,
                    source: operand,
                },
            };
        }

        match self.registry.lookup(command_name(tokens)) {
            Some(builtin) => Route::Builtin(builtin),
            None => Route::External(render(tokens)),
        }
    }

    /// Runs one token sequence. Failures are reported here and never stop the
    /// shell; only the exit built-in returns [`Signal::Stop`].
    pub(crate) fn dispatch(&self, invocation: &Invocation<'_>, out: &mut dyn Write) -> Signal {
        let route = self.route(invocation.tokens);

        let result = match route {
            Route::Empty => Ok(Signal::Continue),
            Route::Echo => echo(invocation.line, out),
            Route::Builtin(builtin) => builtin.run(self, invocation, out),
            route => {
                // children write straight to the inherited descriptors
                if let Err(err) = out.flush() {
                    report!("{}", err);
                }
                launch(route);
                Ok(Signal::Continue)
            }
        };

        result.unwrap_or_else(|err| {
            report!("{}", err);
            Signal::Continue
        })
    }
}

fn command_name(tokens: &[Token]) -> &str {
    tokens.first().map(Token::as_str).unwrap_or_default()
}

fn launch(route: Route<'_>) {
    let result = match route {
        Route::Pipe { left, right } => execution::launch_pipe(&left, &right).map(drop),
        Route::RedirectOutput {
            args,
            target: Some(target),
        } => execution::launch_with_output_redirection(&args, &target).map(drop),
        Route::RedirectInput {
            args,
            source: Some(source),
        } => execution::launch_with_input_redirection(&args, &source).map(drop),
        Route::RedirectOutput { target: None, .. } => {
            report!("expected a file name after '>'");
            Ok(())
        }
        Route::RedirectInput { source: None, .. } => {
            report!("expected a file name after '<'");
            Ok(())
        }
        Route::External(args) => execution::launch(&args).map(drop),
        Route::Empty | Route::Echo | Route::Builtin(_) => Ok(()),
    };

    if let Err(err) = result {
        report!("{}", err);
    }
}
