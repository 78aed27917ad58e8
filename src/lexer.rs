//! Leaf scanners for the tracker notation
//!
//! Each scanner recognizes one lexical element at the start of its input
//! and returns the unconsumed remainder. The parser drives them from a
//! position-tracked cursor; none of them skips leading whitespace.

use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, is_not, take_while},
    character::complete::{anychar, char, digit1, multispace0, satisfy},
    combinator::{map, opt, recognize, value},
    sequence::{delimited, pair, preceded},
    IResult,
};

/// An integer literal with an optional leading minus: `42`, `-7`
pub fn integer(input: &str) -> IResult<&str, &str> {
    recognize(pair(opt(char('-')), digit1))(input)
}

/// An identifier: `[A-Za-z_][A-Za-z0-9]*`
pub fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric()),
    ))(input)
}

/// A double-quoted text literal. `\n` becomes a newline, any other escaped
/// character stands for itself.
pub fn quoted_text(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\"\\"),
                '\\',
                alt((value('\n', char('n')), anychar)),
            )),
            |o| o.unwrap_or_default(),
        ),
        char('"'),
    )(input)
}

/// The word of a boolean literal: `$TRUE` yields `TRUE`
pub fn boolean_word(input: &str) -> IResult<&str, &str> {
    preceded(char('$'), identifier)(input)
}

/// The digits of an argument placeholder: `#2` yields `2`
pub fn argument_index(input: &str) -> IResult<&str, &str> {
    preceded(char('#'), integer)(input)
}

/// Leading whitespace, newlines included
pub fn whitespace(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

/// Whether `c` can begin a term or an anchor
pub fn starts_term(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '"' | '#' | '$' | '{' | '<' | '(' | '[')
}

/// Escape text so that [`quoted_text`] reads it back unchanged
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('"');
    for c in text.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped.push('"');
    escaped
}
