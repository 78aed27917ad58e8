//! Parser for the tracker notation
//!
//! A recursive-descent parser over a position-tracked character cursor.
//! Leaf elements (integers, names, text) are recognized by the scanners in
//! [`crate::lexer`]; this module owns the grammar:
//!
//! ```text
//! value       -> sum ['=' sum]
//! sum         -> product (('+' | '-') product)*
//! product     -> dice (('*' | '/') dice)*
//! dice        -> addressable [('d'|'D') addressable [('L'|'l'|'H'|'h') addressable]]
//! addressable -> ':' dots [addressable] | '.' dots [addressable] | call ['.' dots [addressable]]
//! call        -> term ['(' [value (',' value)*] ')']
//! ```
//!
//! Parsing never needs the store; a line becomes a [`Value`] or a [`ParseError`].

use crate::ast::{BinaryOp, Keep, Value};
use crate::lexer::{
    argument_index, boolean_word, identifier, integer, quoted_text, starts_term, whitespace,
};
use nom::IResult;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Attempting to read '{expected}', but read '{found}'.")]
    Expected { expected: String, found: String },
    #[error("Attempting to read '{0}', but reached the end of the input.")]
    UnexpectedEnd(String),
    #[error("Attempting to read a term at '{0}', but no term found.")]
    NoTerm(String),
    #[error("Attempting to read a term, but encountered the end of the input.")]
    EndOfInput,
    #[error("The number {0} is invalid as an argument number.")]
    InvalidArgument(String),
    #[error("The number {0} does not fit in an integer.")]
    IntegerOverflow(String),
    #[error("Only '$TRUE' and '$FALSE' are allowed, not '${0}'.")]
    InvalidBoolean(String),
    #[error("May not contain whitespace after '$'.")]
    SpaceAfterDollar,
    #[error("Can not read variable '{0}', since: A variable {0} already exists.")]
    DuplicateName(String),
    #[error("Unexpected input '{0}' after the value.")]
    Trailing(String),
    #[error("Can not read values nested deeper than {0} levels.")]
    TooDeep(usize),
}

/// A top-level line: a value and the arguments it is evaluated with
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub value: Value,
    pub args: Vec<Value>,
}

/// How deep values and sub values may nest in one parse
pub const MAX_NESTING: usize = 128;

/// Parser state
struct Parser<'a> {
    src: &'a str,
    pos: usize,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Parser {
            src,
            pos: 0,
            nesting: 0,
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Peek at the next character without skipping whitespace
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume and return the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        let _ = self.scan(whitespace);
    }

    /// Peek at the next character after any whitespace
    fn peek_token(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.peek()
    }

    fn is_at_end(&mut self) -> bool {
        self.peek_token().is_none()
    }

    /// Consume `c` if it is the next character after whitespace
    fn eat(&mut self, c: char) -> bool {
        if self.peek_token() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> Result<(), ParseError> {
        match self.peek_token() {
            Some(found) if found == c => {
                self.advance();
                Ok(())
            }
            Some(_) => Err(ParseError::Expected {
                expected: c.to_string(),
                found: self.rest().to_string(),
            }),
            None => Err(ParseError::UnexpectedEnd(c.to_string())),
        }
    }

    /// Run a scanner at the cursor, advancing past what it recognized
    fn scan<T>(&mut self, mut scanner: impl FnMut(&'a str) -> IResult<&'a str, T>) -> Option<T> {
        let rest = self.rest();
        match scanner(rest) {
            Ok((remaining, output)) => {
                self.pos += rest.len() - remaining.len();
                Some(output)
            }
            Err(_) => None,
        }
    }

    /// Run a rule one nesting level deeper
    fn nested<T>(
        &mut self,
        rule: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(ParseError::TooDeep(MAX_NESTING));
        }
        self.nesting += 1;
        let result = rule(self);
        self.nesting -= 1;
        result
    }

    fn value(&mut self) -> Result<Value, ParseError> {
        self.nested(Self::equality)
    }

    fn equality(&mut self) -> Result<Value, ParseError> {
        let lhs = self.sum()?;
        if self.eat('=') {
            let rhs = self.sum()?;
            return Ok(Value::Equals(Box::new(lhs), Box::new(rhs)));
        }
        Ok(lhs)
    }

    fn sum(&mut self) -> Result<Value, ParseError> {
        let mut lhs = self.product()?;
        loop {
            let op = match self.peek_token() {
                Some('+') => BinaryOp::Add,
                Some('-') => BinaryOp::Subtract,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.product()?;
            lhs = Value::binary(op, lhs, rhs);
        }
    }

    fn product(&mut self) -> Result<Value, ParseError> {
        let mut lhs = self.dice()?;
        loop {
            let op = match self.peek_token() {
                Some('*') => BinaryOp::Multiply,
                Some('/') => BinaryOp::Divide,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.dice()?;
            lhs = Value::binary(op, lhs, rhs);
        }
    }

    /// The dice letter and the keep letter must touch the operand before them
    fn dice(&mut self) -> Result<Value, ParseError> {
        let amount = self.addressable()?;
        if !matches!(self.peek(), Some('d' | 'D')) {
            return Ok(amount);
        }
        self.advance();
        let size = self.addressable()?;
        let keep = match self.peek() {
            Some('l' | 'L') => {
                self.advance();
                Some(Keep::Lowest(Box::new(self.addressable()?)))
            }
            Some('h' | 'H') => {
                self.advance();
                Some(Keep::Highest(Box::new(self.addressable()?)))
            }
            _ => None,
        };
        Ok(Value::Dice {
            amount: Box::new(amount),
            size: Box::new(size),
            keep,
        })
    }

    fn addressable(&mut self) -> Result<Value, ParseError> {
        match self.peek_token() {
            Some(':') => {
                self.advance();
                let level = self.count_dots();
                self.sub_value(Value::Global, level)
            }
            Some('.') => {
                self.advance();
                let level = self.count_dots();
                self.sub_value(Value::Current, level)
            }
            _ => {
                let reference = self.call()?;
                if self.peek() == Some('.') {
                    self.advance();
                    let level = self.count_dots();
                    self.sub_value(reference, level)
                } else {
                    Ok(reference)
                }
            }
        }
    }

    fn count_dots(&mut self) -> usize {
        let mut level = 0;
        while self.peek() == Some('.') {
            self.advance();
            level += 1;
        }
        level
    }

    /// The part after the dots; absent unless a term follows directly
    fn sub_value(&mut self, reference: Value, level: usize) -> Result<Value, ParseError> {
        let sub = match self.peek() {
            Some(c) if starts_term(c) => Some(self.nested(Self::addressable)?),
            _ => None,
        };
        Ok(Value::sub(reference, sub, level))
    }

    fn call(&mut self) -> Result<Value, ParseError> {
        let target = self.term()?;
        if self.peek() != Some('(') {
            return Ok(target);
        }
        self.advance();
        let mut args = Vec::new();
        if !self.eat(')') {
            loop {
                args.push(self.value()?);
                if self.eat(',') {
                    continue;
                }
                self.expect(')')?;
                break;
            }
        }
        Ok(Value::Composite {
            target: Box::new(target),
            args,
        })
    }

    fn term(&mut self) -> Result<Value, ParseError> {
        let c = self.peek_token().ok_or(ParseError::EndOfInput)?;
        match c {
            '(' => {
                self.advance();
                if self.eat(')') {
                    return Ok(Value::Void);
                }
                let inner = self.value()?;
                self.expect(')')?;
                Ok(inner)
            }
            '[' => self.deferred(),
            '-' | '0'..='9' => self.integer(),
            'a'..='z' | 'A'..='Z' | '_' => {
                let name = self.scan(identifier).unwrap_or_default();
                Ok(Value::Named(name.to_string()))
            }
            '"' => {
                let start = self.rest();
                self.scan(quoted_text)
                    .map(Value::Text)
                    .ok_or_else(|| ParseError::UnexpectedEnd(format!("\" to close {start}")))
            }
            '#' => self.argument(),
            '$' => self.boolean(),
            '{' => self.record(),
            '<' => {
                self.advance();
                let inner = self.value()?;
                self.expect('>')?;
                Ok(Value::Interpreted(Box::new(inner)))
            }
            _ => Err(ParseError::NoTerm(self.rest().to_string())),
        }
    }

    fn deferred(&mut self) -> Result<Value, ParseError> {
        let mut delay = 0;
        while self.eat('[') {
            delay += 1;
        }
        let value = self.value()?;
        for _ in 0..delay {
            self.expect(']')?;
        }
        Ok(Value::Deferred {
            value: Box::new(value),
            delay,
        })
    }

    fn integer(&mut self) -> Result<Value, ParseError> {
        let found = self.rest().to_string();
        let digits = self.scan(integer).ok_or(ParseError::Expected {
            expected: "digit".into(),
            found,
        })?;
        digits
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ParseError::IntegerOverflow(digits.to_string()))
    }

    fn argument(&mut self) -> Result<Value, ParseError> {
        let found = self.rest().to_string();
        let digits = self.scan(argument_index).ok_or(ParseError::Expected {
            expected: "#<number>".into(),
            found,
        })?;
        match digits.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(Value::Argument(n)),
            _ => Err(ParseError::InvalidArgument(digits.to_string())),
        }
    }

    fn boolean(&mut self) -> Result<Value, ParseError> {
        if self.rest()[1..].starts_with(char::is_whitespace) {
            return Err(ParseError::SpaceAfterDollar);
        }
        let found = self.rest().to_string();
        let word = self.scan(boolean_word).ok_or(ParseError::Expected {
            expected: "$TRUE".into(),
            found,
        })?;
        if word.eq_ignore_ascii_case("true") {
            Ok(Value::Bool(true))
        } else if word.eq_ignore_ascii_case("false") {
            Ok(Value::Bool(false))
        } else {
            Err(ParseError::InvalidBoolean(word.to_string()))
        }
    }

    fn record(&mut self) -> Result<Value, ParseError> {
        self.expect('{')?;
        let mut fields: Vec<(String, Value)> = Vec::new();
        if self.eat('}') {
            return Ok(Value::Record(fields));
        }
        loop {
            self.skip_whitespace();
            let found = self.rest().to_string();
            let name = self
                .scan(identifier)
                .ok_or(ParseError::Expected {
                    expected: "name".into(),
                    found,
                })?
                .to_string();
            self.expect('=')?;
            let value = self.value()?;
            if fields.iter().any(|(existing, _)| *existing == name) {
                return Err(ParseError::DuplicateName(name));
            }
            fields.push((name, value));
            if self.eat(',') {
                continue;
            }
            self.expect('}')?;
            return Ok(Value::Record(fields));
        }
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        let value = self.value()?;
        let mut args = Vec::new();
        while !self.is_at_end() {
            self.eat(',');
            args.push(self.value()?);
        }
        Ok(Statement { value, args })
    }
}

/// Parse text that must hold exactly one value
pub fn parse_value(input: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(input);
    let value = parser.value()?;
    if !parser.is_at_end() {
        return Err(ParseError::Trailing(parser.rest().to_string()));
    }
    Ok(value)
}

/// Parse one line: a value followed by optionally comma-separated arguments
pub fn parse_statement(input: &str) -> Result<Statement, ParseError> {
    Parser::new(input).statement()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Value {
        Value::Named(name.to_string())
    }

    #[test]
    fn parse_precedence() {
        let value = parse_value("1 + 2 * 3").unwrap();
        assert_eq!(
            value,
            Value::binary(
                BinaryOp::Add,
                Value::Int(1),
                Value::binary(BinaryOp::Multiply, Value::Int(2), Value::Int(3))
            )
        );
    }

    #[test]
    fn parse_left_associative() {
        let value = parse_value("10 - 4 - 3").unwrap();
        assert_eq!(value.to_string(), "((10-4)-3)");
    }

    #[test]
    fn parse_equality() {
        let value = parse_value("a + 1 = 3").unwrap();
        assert!(matches!(value, Value::Equals(..)));
        assert_eq!(value.to_string(), "((a+1) = 3)");
    }

    #[test]
    fn parse_dice() {
        assert_eq!(parse_value("3d6L2").unwrap().to_string(), "(3D6L2)");
        assert_eq!(parse_value("4D6h3").unwrap().to_string(), "(4D6H3)");
        assert_eq!(parse_value("(1+1)d20 + 5").unwrap().to_string(), "(((1+1)D20)+5)");
    }

    #[test]
    fn parse_dice_needs_adjacent_letter() {
        let statement = parse_statement("set dmg 5").unwrap();
        assert_eq!(statement.value, named("set"));
        assert_eq!(statement.args, vec![named("dmg"), Value::Int(5)]);
        let roll = parse_statement("hp d6").unwrap();
        assert_eq!(roll.args, vec![named("d6")]);
    }

    #[test]
    fn parse_paths() {
        let value = parse_value(":party.alice.hp").unwrap();
        assert_eq!(value.to_string(), ":party.alice.hp");
        let value = parse_value("a..b").unwrap();
        assert!(matches!(value, Value::Sub { level: 1, .. }));
        let value = parse_value(".x").unwrap();
        assert_eq!(value, Value::sub(Value::Current, Some(named("x")), 0));
    }

    #[test]
    fn parse_path_without_sub_value() {
        assert_eq!(parse_value("a.").unwrap(), Value::sub(named("a"), None, 0));
        assert_eq!(parse_value(":").unwrap(), Value::sub(Value::Global, None, 0));
        let call = parse_value("list(:)").unwrap();
        assert_eq!(call.to_string(), "list(:)");
    }

    #[test]
    fn parse_terms() {
        assert_eq!(parse_value("()").unwrap(), Value::Void);
        assert_eq!(parse_value("-12").unwrap(), Value::Int(-12));
        assert_eq!(parse_value("$true").unwrap(), Value::Bool(true));
        assert_eq!(parse_value("$FALSE").unwrap(), Value::Bool(false));
        assert_eq!(parse_value("#2").unwrap(), Value::Argument(2));
        assert_eq!(parse_value("\"a\\nb\"").unwrap(), Value::Text("a\nb".into()));
        assert_eq!(
            parse_value("<\"x\">").unwrap(),
            Value::Interpreted(Box::new(Value::Text("x".into())))
        );
    }

    #[test]
    fn parse_deferred() {
        let value = parse_value("[[ 1d6 ]]").unwrap();
        assert!(matches!(value, Value::Deferred { delay: 2, .. }));
        assert!(parse_value("[[1]").is_err());
    }

    #[test]
    fn parse_record() {
        let value = parse_value("{hp = 10, name = \"Bob\", inner = {x = 1}}").unwrap();
        match value {
            Value::Record(fields) => {
                let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["hp", "name", "inner"]);
            }
            other => panic!("expected record, got {:?}", other),
        }
        assert_eq!(parse_value("{}").unwrap(), Value::Record(vec![]));
    }

    #[test]
    fn parse_record_rejects_duplicates() {
        let err = parse_value("{a = 1, a = 2}").unwrap_err();
        assert_eq!(err, ParseError::DuplicateName("a".into()));
    }

    #[test]
    fn parse_composite() {
        let value = parse_value("f(1, #1)").unwrap();
        assert_eq!(value.to_string(), "f(1,#1)");
        let spaced = parse_statement("f (1)").unwrap();
        assert_eq!(spaced.value, named("f"));
        assert_eq!(spaced.args.len(), 1);
    }

    #[test]
    fn parse_statement_args() {
        let statement = parse_statement("set hp, 3d6, $TRUE").unwrap();
        assert_eq!(statement.value, named("set"));
        assert_eq!(statement.args.len(), 3);
        let statement = parse_statement("print 1 2").unwrap();
        assert_eq!(statement.args, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn parse_errors() {
        assert!(matches!(parse_value("#0"), Err(ParseError::InvalidArgument(_))));
        assert!(matches!(parse_value("$maybe"), Err(ParseError::InvalidBoolean(_))));
        assert!(matches!(parse_value("$ TRUE"), Err(ParseError::SpaceAfterDollar)));
        assert!(matches!(parse_value("1 +"), Err(ParseError::EndOfInput)));
        assert!(matches!(parse_value("(1"), Err(ParseError::UnexpectedEnd(_))));
        assert!(matches!(parse_value("?"), Err(ParseError::NoTerm(_))));
        assert!(matches!(parse_value("1 2"), Err(ParseError::Trailing(_))));
        assert!(matches!(
            parse_value("99999999999999999999"),
            Err(ParseError::IntegerOverflow(_))
        ));
    }

    #[test]
    fn parse_rejects_deep_nesting() {
        let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(parse_value(&deep), Err(ParseError::TooDeep(MAX_NESTING)));
        let deep = format!("{}1{}", "{a=".repeat(10_000), "}".repeat(10_000));
        assert_eq!(parse_value(&deep), Err(ParseError::TooDeep(MAX_NESTING)));
        let path = vec!["a"; 10_000].join(".");
        assert_eq!(parse_value(&path), Err(ParseError::TooDeep(MAX_NESTING)));
        let calls = format!("{}1{}", "f(".repeat(10_000), ")".repeat(10_000));
        assert_eq!(parse_value(&calls), Err(ParseError::TooDeep(MAX_NESTING)));

        let shallow = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(parse_value(&shallow), Ok(Value::Int(1)));
    }

    #[test]
    fn parse_error_names_remainder() {
        let err = parse_value("{a 1}").unwrap_err();
        assert_eq!(
            err,
            ParseError::Expected {
                expected: "=".into(),
                found: "1}".into()
            }
        );
    }

    #[test]
    fn canonical_form_reparses() {
        for source in ["(a+(2*b))", "f(1,\"x\")", ":a.b", "..c", "(2D6H1)", "<#1>", "[ x ]"] {
            let value = parse_value(source).unwrap();
            assert_eq!(parse_value(&value.to_string()).unwrap(), value, "{}", source);
        }
    }
}
