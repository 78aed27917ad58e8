//! Expression trees for the tracker notation
//!
//! A parsed line is a [`Value`]: literals, references into the store,
//! arithmetic combinators, calls, placeholders and built-in commands.
//! Evaluation reduces a tree to a [`Primitive`].

use std::fmt;

use crate::command::Command;
use crate::env::ContainerId;
use crate::lexer::escape_text;

/// One of the four arithmetic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BinaryOp {
    pub fn symbol(self) -> char {
        match self {
            BinaryOp::Add => '+',
            BinaryOp::Subtract => '-',
            BinaryOp::Multiply => '*',
            BinaryOp::Divide => '/',
        }
    }

    /// Name of the hidden binding that overloads this operator on a container
    pub fn hook(self) -> &'static str {
        match self {
            BinaryOp::Add => "_add",
            BinaryOp::Subtract => "_subtract",
            BinaryOp::Multiply => "_product",
            BinaryOp::Divide => "_divide",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Subtract => "subtract",
            BinaryOp::Multiply => "multiply",
            BinaryOp::Divide => "divide",
        }
    }

    /// Noun used in "can not be part of ..." messages
    pub fn noun(self) -> &'static str {
        match self {
            BinaryOp::Add => "an addition",
            BinaryOp::Subtract => "a subtraction",
            BinaryOp::Multiply => "a product",
            BinaryOp::Divide => "a division",
        }
    }
}

/// Which sorted dice a roll keeps
#[derive(Debug, Clone, PartialEq)]
pub enum Keep {
    Lowest(Box<Value>),
    Highest(Box<Value>),
}

/// A node of the expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit integer
    Int(i64),
    /// `$TRUE` or `$FALSE`
    Bool(bool),
    /// Quoted text
    Text(String),
    /// `()`, the identity of every operator
    Void,
    /// An inline `{name = value, ...}` literal not yet placed in the store
    Record(Vec<(String, Value)>),
    /// A container living in the store
    Container(ContainerId),
    /// A name resolved by scoped lookup
    Named(String),
    /// `:`, the top-level container
    Global,
    /// A leading `.`, the container being evaluated in
    Current,
    /// `reference.sub`; each extra dot climbs one more level
    Sub {
        reference: Box<Value>,
        sub: Option<Box<Value>>,
        level: usize,
    },
    /// `target(args...)`
    Composite { target: Box<Value>, args: Vec<Value> },
    /// `#n`, the n-th argument (1-based)
    Argument(usize),
    /// `[ value ]`, evaluated by a pre-evaluation pass once `delay` runs out
    Deferred { value: Box<Value>, delay: usize },
    /// `<value>`, evaluated and then read as a name or a value
    Interpreted(Box<Value>),
    /// `a = b`
    Equals(Box<Value>, Box<Value>),
    /// `a + b`, `a - b`, `a * b`, `a / b`
    Binary {
        op: BinaryOp,
        lhs: Box<Value>,
        rhs: Box<Value>,
    },
    /// `amount d size`, optionally keeping the lowest or highest rolls
    Dice {
        amount: Box<Value>,
        size: Box<Value>,
        keep: Option<Keep>,
    },
    /// A built-in verb
    Command(Command),
}

impl Value {
    pub fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> Value {
        Value::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn sub(reference: Value, sub: Option<Value>, level: usize) -> Value {
        Value::Sub {
            reference: Box::new(reference),
            sub: sub.map(Box::new),
            level,
        }
    }

    /// Primary type name followed by the accepted aliases
    pub fn type_names(&self) -> &'static [&'static str] {
        match self {
            Value::Int(_) => &["integer", "int"],
            Value::Bool(_) => &["boolean", "bool"],
            Value::Text(_) => &["text", "txt", "string"],
            Value::Void => &["empty", "void"],
            Value::Record(_) | Value::Container(_) => &["collection", "col"],
            Value::Named(_) => &["variable", "var"],
            Value::Global => &["global", "all"],
            Value::Current => &["currentEnvironment", "current", "local"],
            Value::Sub { .. } => &["subvariable", "subvar"],
            Value::Composite { .. } => &["composite", "function", "fun"],
            Value::Argument(_) => &["argument", "arg"],
            Value::Deferred { .. } => &["prevaluate"],
            Value::Interpreted(_) => &["interpretation"],
            Value::Equals(..) => &["comparison", "compare"],
            Value::Binary { op, .. } => match op {
                BinaryOp::Add => &["sum"],
                BinaryOp::Subtract => &["subtraction", "sub"],
                BinaryOp::Multiply => &["product"],
                BinaryOp::Divide => &["division", "div"],
            },
            Value::Dice { .. } => &["diceroll", "dice", "d"],
            Value::Command(_) => &["command", "com", "c"],
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_names()[0]
    }

    /// Replace every `#n` placeholder with the n-th of `args` (void when absent)
    pub fn substitute(&self, args: &[Value]) -> Value {
        let boxed = |v: &Value| Box::new(v.substitute(args));
        match self {
            Value::Argument(n) => n
                .checked_sub(1)
                .and_then(|i| args.get(i))
                .cloned()
                .unwrap_or(Value::Void),
            Value::Record(fields) => Value::Record(
                fields
                    .iter()
                    .map(|(name, v)| (name.clone(), v.substitute(args)))
                    .collect(),
            ),
            Value::Sub {
                reference,
                sub,
                level,
            } => Value::Sub {
                reference: boxed(reference),
                sub: sub.as_deref().map(boxed),
                level: *level,
            },
            Value::Composite { target, args: own } => Value::Composite {
                target: boxed(target),
                args: own.iter().map(|a| a.substitute(args)).collect(),
            },
            Value::Deferred { value, delay } => Value::Deferred {
                value: boxed(value),
                delay: *delay,
            },
            Value::Interpreted(inner) => Value::Interpreted(boxed(inner)),
            Value::Equals(a, b) => Value::Equals(boxed(a), boxed(b)),
            Value::Binary { op, lhs, rhs } => Value::Binary {
                op: *op,
                lhs: boxed(lhs),
                rhs: boxed(rhs),
            },
            Value::Dice { amount, size, keep } => Value::Dice {
                amount: boxed(amount),
                size: boxed(size),
                keep: keep.as_ref().map(|k| match k {
                    Keep::Lowest(n) => Keep::Lowest(boxed(n)),
                    Keep::Highest(n) => Keep::Highest(boxed(n)),
                }),
            },
            other => other.clone(),
        }
    }

    /// Visit every container handle held anywhere inside this tree
    pub fn for_each_container(&self, f: &mut dyn FnMut(ContainerId)) {
        match self {
            Value::Container(id) => f(*id),
            Value::Record(fields) => fields.iter().for_each(|(_, v)| v.for_each_container(f)),
            Value::Sub { reference, sub, .. } => {
                reference.for_each_container(f);
                if let Some(sub) = sub {
                    sub.for_each_container(f);
                }
            }
            Value::Composite { target, args } => {
                target.for_each_container(f);
                args.iter().for_each(|a| a.for_each_container(f));
            }
            Value::Deferred { value, .. } | Value::Interpreted(value) => value.for_each_container(f),
            Value::Equals(a, b)
            | Value::Binary {
                lhs: a, rhs: b, ..
            } => {
                a.for_each_container(f);
                b.for_each_container(f);
            }
            Value::Dice { amount, size, keep } => {
                amount.for_each_container(f);
                size.for_each_container(f);
                if let Some(Keep::Lowest(n) | Keep::Highest(n)) = keep {
                    n.for_each_container(f);
                }
            }
            _ => {}
        }
    }

    /// Write the canonical form, delegating container handles to `container`
    pub fn write_with(
        &self,
        out: &mut String,
        container: &mut dyn FnMut(ContainerId, &mut String),
    ) {
        match self {
            Value::Int(n) => out.push_str(&n.to_string()),
            Value::Bool(true) => out.push_str("$TRUE"),
            Value::Bool(false) => out.push_str("$FALSE"),
            Value::Text(text) => out.push_str(&escape_text(text)),
            Value::Void => out.push_str("()"),
            Value::Record(fields) => {
                out.push('{');
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push_str(name);
                    out.push('=');
                    value.write_with(out, container);
                }
                out.push('}');
            }
            Value::Container(id) => container(*id, out),
            Value::Named(name) => out.push_str(name),
            Value::Global => out.push(':'),
            Value::Current => {}
            Value::Sub {
                reference,
                sub,
                level,
            } => {
                reference.write_with(out, container);
                let dots = if matches!(**reference, Value::Global) {
                    *level
                } else {
                    level + 1
                };
                out.extend(std::iter::repeat('.').take(dots));
                if let Some(sub) = sub {
                    sub.write_with(out, container);
                }
            }
            Value::Composite { target, args } => {
                target.write_with(out, container);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    arg.write_with(out, container);
                }
                out.push(')');
            }
            Value::Argument(n) => {
                out.push('#');
                out.push_str(&n.to_string());
            }
            Value::Deferred { value, delay } => {
                out.extend(std::iter::repeat('[').take(*delay));
                out.push(' ');
                value.write_with(out, container);
                out.push(' ');
                out.extend(std::iter::repeat(']').take(*delay));
            }
            Value::Interpreted(inner) => {
                out.push('<');
                inner.write_with(out, container);
                out.push('>');
            }
            Value::Equals(a, b) => {
                out.push('(');
                a.write_with(out, container);
                out.push_str(" = ");
                b.write_with(out, container);
                out.push(')');
            }
            Value::Binary { op, lhs, rhs } => {
                out.push('(');
                lhs.write_with(out, container);
                out.push(op.symbol());
                rhs.write_with(out, container);
                out.push(')');
            }
            Value::Dice { amount, size, keep } => {
                out.push('(');
                amount.write_with(out, container);
                out.push('D');
                size.write_with(out, container);
                match keep {
                    Some(Keep::Lowest(n)) => {
                        out.push('L');
                        n.write_with(out, container);
                    }
                    Some(Keep::Highest(n)) => {
                        out.push('H');
                        n.write_with(out, container);
                    }
                    None => {}
                }
                out.push(')');
            }
            Value::Command(command) => {
                out.push_str("{SYSTEM COMMAND: ");
                out.push_str(command.name());
                out.push('}');
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_with(&mut out, &mut |_, out| out.push_str("{...}"));
        f.write_str(&out)
    }
}

/// The result of evaluating a tree: something arithmetic can work with
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Int(i64),
    Bool(bool),
    Text(String),
    Void,
    Container(ContainerId),
}

impl Primitive {
    /// Void and `$FALSE` are false; everything else, zero included, is true
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Primitive::Void | Primitive::Bool(false))
    }

    pub fn into_value(self) -> Value {
        match self {
            Primitive::Int(n) => Value::Int(n),
            Primitive::Bool(b) => Value::Bool(b),
            Primitive::Text(t) => Value::Text(t),
            Primitive::Void => Value::Void,
            Primitive::Container(id) => Value::Container(id),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Primitive::Int(_) => "integer",
            Primitive::Bool(_) => "boolean",
            Primitive::Text(_) => "text",
            Primitive::Void => "empty",
            Primitive::Container(_) => "collection",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_forms() {
        let sum = Value::binary(BinaryOp::Add, Value::Named("a".into()), Value::Int(2));
        assert_eq!(sum.to_string(), "(a+2)");
        assert_eq!(Value::Bool(true).to_string(), "$TRUE");
        assert_eq!(Value::Void.to_string(), "()");
        assert_eq!(Value::Text("a\"b".into()).to_string(), r#""a\"b""#);
        let path = Value::sub(Value::Global, Some(Value::Named("hp".into())), 0);
        assert_eq!(path.to_string(), ":hp");
        let up = Value::sub(Value::Named("a".into()), Some(Value::Named("b".into())), 1);
        assert_eq!(up.to_string(), "a..b");
        let here = Value::sub(Value::Current, Some(Value::Named("b".into())), 0);
        assert_eq!(here.to_string(), ".b");
    }

    #[test]
    fn test_dice_and_deferred_forms() {
        let dice = Value::Dice {
            amount: Box::new(Value::Int(3)),
            size: Box::new(Value::Int(6)),
            keep: Some(Keep::Lowest(Box::new(Value::Int(2)))),
        };
        assert_eq!(dice.to_string(), "(3D6L2)");
        let deferred = Value::Deferred {
            value: Box::new(Value::Named("x".into())),
            delay: 2,
        };
        assert_eq!(deferred.to_string(), "[[ x ]]");
    }

    #[test]
    fn test_substitute_placeholders() {
        let body = Value::binary(BinaryOp::Add, Value::Argument(1), Value::Argument(3));
        let replaced = body.substitute(&[Value::Int(4), Value::Int(5)]);
        assert_eq!(replaced, Value::binary(BinaryOp::Add, Value::Int(4), Value::Void));
    }

    #[test]
    fn test_substitute_reaches_nested_calls() {
        let call = Value::Composite {
            target: Box::new(Value::Named("f".into())),
            args: vec![Value::Argument(1)],
        };
        let replaced = call.substitute(&[Value::Text("x".into())]);
        assert_eq!(replaced.to_string(), r#"f("x")"#);
    }

    #[test]
    fn test_truthiness() {
        assert!(Primitive::Int(0).is_truthy());
        assert!(Primitive::Text(String::new()).is_truthy());
        assert!(!Primitive::Void.is_truthy());
        assert!(!Primitive::Bool(false).is_truthy());
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Int(1).type_name(), "integer");
        assert!(Value::Text(String::new()).type_names().contains(&"string"));
        assert_eq!(Value::Command(Command::Set).type_name(), "command");
    }
}
