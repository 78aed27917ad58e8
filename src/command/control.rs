//! if, while and for

use crate::ast::{Primitive, Value};
use crate::env::{is_hidden, ContainerId};
use crate::eval::{EvalError, Evaluator, Mode};
use crate::io::Sink;

/// Body runs a `while` may make before it is aborted
pub const MAX_LOOPS: usize = 1000;

impl Evaluator {
    pub(crate) fn if_command(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        if self.argument(&args[0], env, sink)?.is_truthy() {
            self.argument(&args[1], env, sink)
        } else {
            match args.get(2) {
                Some(otherwise) => self.argument(otherwise, env, sink),
                None => Ok(Primitive::Void),
            }
        }
    }

    pub(crate) fn while_command(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let mut runs = 0;
        while self.argument(&args[0], env, sink)?.is_truthy() {
            if runs == MAX_LOOPS {
                return Err(EvalError::Guard(format!(
                    "Reached maximal number of loops ({}).",
                    MAX_LOOPS
                )));
            }
            self.argument(&args[1], env, sink)?;
            runs += 1;
        }
        Ok(Primitive::Void)
    }

    /// Evaluate the body inside the collection once per binding, with the
    /// binding's path as `#1`
    pub(crate) fn for_command(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let collection = self.collection(&args[0], env, &[], sink)?;
        let include_hidden = self.flag(args, 2, false, env, sink)?;
        let snapshot = self.store.bindings(collection).to_vec();
        for binding in snapshot {
            if !self.store.is_attached(binding) {
                continue;
            }
            if !include_hidden && is_hidden(self.store.name(binding)) {
                continue;
            }
            let element = self.store.binding_path(binding).to_value(self.store.root());
            self.reduce(&args[1], collection, &[element], Mode::Full, sink)?;
        }
        Ok(Primitive::Void)
    }
}
