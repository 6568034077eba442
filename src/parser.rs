// https://github.com/Geal/nom/blob/master/doc/choosing_a_combinator.md

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{is_not, take_till1, take_while},
    character::complete::char,
    combinator::{map, value},
    multi::many0,
    sequence::preceded,
    IResult,
};

/// Trailing words that switch a line into echo mode.
pub(crate) const ECHO_MARKERS: [&str; 2] = ["echo", "ECHO"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operator {
    Pipe,
    RedirectOutput,
    RedirectInput,
}

impl Operator {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Operator::Pipe => "|",
            Operator::RedirectOutput => ">",
            Operator::RedirectInput => "<",
        }
    }
}

/// One unit of a command line. Words are never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Word(String),
    Operator(Operator),
}

impl Token {
    pub(crate) fn word(word: &str) -> Self {
        Token::Word(word.to_owned())
    }

    pub(crate) fn as_str(&self) -> &str {
        match self {
            Token::Word(word) => word,
            Token::Operator(operator) => operator.as_str(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_separator(chr: char) -> bool {
    matches!(chr, ' ' | '\t' | '\r' | '\n')
}

fn is_operator(chr: char) -> bool {
    matches!(chr, '|' | '>' | '<')
}

// same set as C's isspace()
fn is_trailing_space(chr: char) -> bool {
    matches!(chr, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}

fn operator(input: &str) -> IResult<&str, Token> {
    alt((
        value(Token::Operator(Operator::Pipe), char('|')),
        value(Token::Operator(Operator::RedirectOutput), char('>')),
        value(Token::Operator(Operator::RedirectInput), char('<')),
    ))(input)
}

fn word(input: &str) -> IResult<&str, Token> {
    map(
        take_till1(|chr: char| is_separator(chr) || is_operator(chr)),
        Token::word,
    )(input)
}

fn token(input: &str) -> IResult<&str, Token> {
    preceded(take_while(is_separator), alt((operator, word)))(input)
}

/// Splits a raw line into words and single character operators.
pub(crate) fn tokenize(line: &str) -> Vec<Token> {
    // many0 stops at the first error, which is either the end of the
    // line or a run of trailing separators
    match many0(token)(line) {
        Ok((_, tokens)) => tokens,
        Err(_) => Vec::new(),
    }
}

fn echo_piece(input: &str) -> IResult<&str, String> {
    alt((
        map(char(' '), |_| String::from("SPACE")),
        map(char('|'), |_| String::from("PIPE")),
        map(is_not(" |"), String::from),
    ))(input)
}

/// Breaks a line ending in an echo marker into the lines echo mode prints.
///
/// The marker and the whitespace around it are dropped. Every run of
/// characters other than space and `|` becomes one line, every space becomes
/// `SPACE` and every `|` becomes `PIPE`.
pub(crate) fn echo_breakdown(line: &str) -> Vec<String> {
    let trimmed = line.trim_end_matches(is_trailing_space);
    let body = ECHO_MARKERS
        .iter()
        .find_map(|marker| trimmed.strip_suffix(marker))
        .unwrap_or(trimmed)
        .trim_end_matches(is_trailing_space);

    match many0(echo_piece)(body) {
        Ok((_, lines)) => lines,
        Err(_) => Vec::new(),
    }
}
