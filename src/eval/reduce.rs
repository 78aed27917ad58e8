//! Reduction of expression trees to primitives

use super::{EvalError, Evaluator};
use crate::ast::{BinaryOp, Keep, Primitive, Value};
use crate::env::{ContainerId, VALUE_NAME};
use crate::io::Sink;
use crate::parser::parse_value;

/// What the caller needs out of a reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// A primitive; containers yield their `_value`
    Full,
    /// An operand of `op`; containers that overload `op` stay containers
    Operand(BinaryOp),
    /// A container
    Collection,
}

impl Evaluator {
    pub(crate) fn reduce(
        &mut self,
        value: &Value,
        env: ContainerId,
        args: &[Value],
        mode: Mode,
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        if self.depth >= self.config.max_depth {
            return Err(EvalError::Guard(format!(
                "Reached maximal evaluation depth ({}).",
                self.config.max_depth
            )));
        }
        self.depth += 1;
        let result = self.reduce_node(value, env, args, mode, sink);
        self.depth -= 1;
        result
    }

    fn reduce_node(
        &mut self,
        value: &Value,
        env: ContainerId,
        args: &[Value],
        mode: Mode,
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        match value {
            Value::Int(n) => self.scalar(Primitive::Int(*n), mode),
            Value::Bool(b) => self.scalar(Primitive::Bool(*b), mode),
            Value::Text(t) => self.scalar(Primitive::Text(t.clone()), mode),
            Value::Void => self.scalar(Primitive::Void, mode),
            Value::Record(fields) => {
                let c = self.store.materialize(fields)?;
                self.reduce_container(c, mode, sink)
            }
            Value::Container(c) => self.reduce_container(*c, mode, sink),
            Value::Named(name) => {
                let b = self.store.lookup(env, name)?;
                let bound = self.store.value(b).clone();
                self.reduce(&bound, env, args, mode, sink)
            }
            Value::Global => self.reduce_container(self.store.root(), mode, sink),
            Value::Current => self.reduce_container(env, mode, sink),
            Value::Sub {
                reference,
                sub,
                level,
            } => {
                let local = self.sub_environment(reference, *level, env, args, sink)?;
                match sub {
                    Some(sub) => self.reduce(sub, local, args, mode, sink),
                    None => self.reduce_container(local, mode, sink),
                }
            }
            Value::Composite {
                target,
                args: actuals,
            } => {
                let substituted: Vec<Value> = actuals.iter().map(|a| a.substitute(args)).collect();
                let actuals = self.pre_evaluate_all(&substituted, env, sink)?;
                self.reduce(target, env, &actuals, mode, sink)
            }
            Value::Argument(n) => match n.checked_sub(1).and_then(|i| args.get(i)) {
                Some(arg) => {
                    let arg = arg.clone();
                    self.reduce(&arg, env, &[], mode, sink)
                }
                None if mode == Mode::Full => Ok(Primitive::Void),
                None => Err(EvalError::Lookup(format!("No argument #{} was given.", n))),
            },
            Value::Deferred { value, .. } => self.reduce(value, env, args, mode, sink),
            Value::Interpreted(inner) => {
                let target = self.interpret(inner, env, args, sink)?;
                self.reduce(&target, env, args, mode, sink)
            }
            Value::Equals(a, b) => {
                let left = self.reduce(a, env, args, Mode::Full, sink)?;
                let right = self.reduce(b, env, args, Mode::Full, sink)?;
                let equal = self.primitives_equal(&left, &right);
                self.settle(Primitive::Bool(equal), mode, sink)
            }
            Value::Binary { op, lhs, rhs } => {
                let left = self.reduce(lhs, env, args, Mode::Operand(*op), sink)?;
                let right = self.reduce(rhs, env, args, Mode::Operand(*op), sink)?;
                let result = self.combine(*op, left, right, sink)?;
                self.settle(result, mode, sink)
            }
            Value::Dice { amount, size, keep } => {
                let result = self.roll_dice(amount, size, keep.as_ref(), env, args, sink)?;
                self.settle(result, mode, sink)
            }
            Value::Command(command) => {
                let result = self.run_command(*command, env, args, sink)?;
                self.settle(result, mode, sink)
            }
        }
    }

    fn scalar(&self, value: Primitive, mode: Mode) -> Result<Primitive, EvalError> {
        match mode {
            Mode::Collection => Err(not_a_collection(value.type_name())),
            _ => Ok(value),
        }
    }

    /// What a container stands for in the requested mode
    pub(crate) fn reduce_container(
        &mut self,
        c: ContainerId,
        mode: Mode,
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        match mode {
            Mode::Collection => Ok(Primitive::Container(c)),
            Mode::Full => match self.store.find_with_template(c, VALUE_NAME) {
                Some(b) => {
                    let inner = self.store.value(b).clone();
                    self.reduce(&inner, c, &[], mode, sink)
                }
                None => Ok(Primitive::Container(c)),
            },
            Mode::Operand(op) => {
                if self.store.find_with_template(c, op.hook()).is_some() {
                    return Ok(Primitive::Container(c));
                }
                match self.store.find_with_template(c, VALUE_NAME) {
                    Some(b) => {
                        let inner = self.store.value(b).clone();
                        self.reduce(&inner, c, &[], mode, sink)
                    }
                    None => Err(EvalError::Type(format!(
                        "A value of type '{}' can not be part of {}.",
                        self.store.type_name_of(&Value::Container(c)),
                        op.noun()
                    ))),
                }
            }
        }
    }

    /// Bring a computed primitive into the requested mode
    fn settle(
        &mut self,
        result: Primitive,
        mode: Mode,
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        match (mode, result) {
            (Mode::Full, result) => Ok(result),
            (_, Primitive::Container(c)) => self.reduce_container(c, mode, sink),
            (Mode::Collection, other) => Err(not_a_collection(other.type_name())),
            (Mode::Operand(_), other) => Ok(other),
        }
    }

    /// The container a value reduces to
    pub(crate) fn collection(
        &mut self,
        value: &Value,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<ContainerId, EvalError> {
        match self.reduce(value, env, args, Mode::Collection, sink)? {
            Primitive::Container(c) => Ok(c),
            other => Err(not_a_collection(other.type_name())),
        }
    }

    /// The container the sub value of `reference.sub` is reduced in. Every
    /// dot beyond the first climbs one level, stopping at the top.
    fn sub_environment(
        &mut self,
        reference: &Value,
        level: usize,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<ContainerId, EvalError> {
        if level == 0 {
            return self.collection(reference, env, args, sink);
        }
        let mut local = match reference {
            Value::Global => self.store.root(),
            Value::Named(_) | Value::Interpreted(_) => env,
            Value::Current => self.store.level_above(env),
            other => {
                let c = self.collection(other, env, args, sink)?;
                self.store.level_above(c)
            }
        };
        for _ in 1..level {
            local = self.store.level_above(local);
        }
        Ok(local)
    }

    /// `<v>`: an integer n names the hidden binding `_n`, a text is read as a value
    pub(crate) fn interpret(
        &mut self,
        inner: &Value,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Value, EvalError> {
        match self.reduce(inner, env, args, Mode::Full, sink)? {
            Primitive::Int(n) => Ok(Value::Named(format!("_{}", n))),
            Primitive::Text(text) => parse_value(&text)
                .map_err(|e| EvalError::from(e).context(format!("Can not interpret \"{}\"", text))),
            other => Err(EvalError::Type(format!(
                "Can not interpret a value of type '{}'.",
                other.type_name()
            ))),
        }
    }

    pub(crate) fn pre_evaluate_all(
        &mut self,
        values: &[Value],
        env: ContainerId,
        sink: &mut dyn Sink,
    ) -> Result<Vec<Value>, EvalError> {
        values
            .iter()
            .map(|v| self.pre_evaluate(v, env, sink))
            .collect()
    }

    /// One pre-evaluation pass: `[ v ]` is replaced by the result of `v`,
    /// `[[ v ]]` loses one bracket pair
    pub(crate) fn pre_evaluate(
        &mut self,
        value: &Value,
        env: ContainerId,
        sink: &mut dyn Sink,
    ) -> Result<Value, EvalError> {
        Ok(match value {
            Value::Deferred { value, delay } if *delay > 1 => Value::Deferred {
                value: value.clone(),
                delay: delay - 1,
            },
            Value::Deferred { value, .. } => {
                self.reduce(value, env, &[], Mode::Full, sink)?.into_value()
            }
            Value::Record(fields) => Value::Record(
                fields
                    .iter()
                    .map(|(name, v)| Ok((name.clone(), self.pre_evaluate(v, env, sink)?)))
                    .collect::<Result<_, EvalError>>()?,
            ),
            Value::Sub {
                reference,
                sub,
                level,
            } => Value::Sub {
                reference: self.pre_box(reference, env, sink)?,
                sub: match sub {
                    Some(sub) => Some(self.pre_box(sub, env, sink)?),
                    None => None,
                },
                level: *level,
            },
            Value::Composite { target, args } => Value::Composite {
                target: self.pre_box(target, env, sink)?,
                args: self.pre_evaluate_all(args, env, sink)?,
            },
            Value::Interpreted(inner) => Value::Interpreted(self.pre_box(inner, env, sink)?),
            Value::Equals(a, b) => {
                Value::Equals(self.pre_box(a, env, sink)?, self.pre_box(b, env, sink)?)
            }
            Value::Binary { op, lhs, rhs } => Value::Binary {
                op: *op,
                lhs: self.pre_box(lhs, env, sink)?,
                rhs: self.pre_box(rhs, env, sink)?,
            },
            Value::Dice { amount, size, keep } => Value::Dice {
                amount: self.pre_box(amount, env, sink)?,
                size: self.pre_box(size, env, sink)?,
                keep: match keep {
                    Some(Keep::Lowest(n)) => Some(Keep::Lowest(self.pre_box(n, env, sink)?)),
                    Some(Keep::Highest(n)) => Some(Keep::Highest(self.pre_box(n, env, sink)?)),
                    None => None,
                },
            },
            other => other.clone(),
        })
    }

    fn pre_box(
        &mut self,
        value: &Value,
        env: ContainerId,
        sink: &mut dyn Sink,
    ) -> Result<Box<Value>, EvalError> {
        self.pre_evaluate(value, env, sink).map(Box::new)
    }
}

fn not_a_collection(type_name: &str) -> EvalError {
    EvalError::Type(format!(
        "A value of type '{}' does not evaluate to a collection.",
        type_name
    ))
}
