//! Turning command arguments into store paths

use super::{EvalError, Evaluator};
use crate::ast::Value;
use crate::env::{ContainerId, Path};
use crate::io::Sink;

impl Evaluator {
    /// The path an argument addresses, relative to `env`. Interpretations
    /// inside the argument are evaluated first; nothing else is.
    pub(crate) fn path_of_value(
        &mut self,
        value: &Value,
        env: ContainerId,
        sink: &mut dyn Sink,
    ) -> Result<Path, EvalError> {
        let resolved = self.resolve_path_value(value, env, sink)?;
        let within = self.store.path_of(env);
        self.store.convert_static(&resolved, &within)
    }

    fn resolve_path_value(
        &mut self,
        value: &Value,
        env: ContainerId,
        sink: &mut dyn Sink,
    ) -> Result<Value, EvalError> {
        match value {
            Value::Interpreted(inner) => {
                let target = self.interpret(inner, env, &[], sink)?;
                self.resolve_path_value(&target, env, sink)
            }
            Value::Deferred { value, .. } => self.resolve_path_value(value, env, sink),
            Value::Sub {
                reference,
                sub,
                level,
            } => {
                let reference = self.resolve_path_value(reference, env, sink)?;
                let sub = match sub {
                    Some(sub) => Some(self.resolve_path_value(sub, env, sink)?),
                    None => None,
                };
                Ok(Value::sub(reference, sub, *level))
            }
            other => Ok(other.clone()),
        }
    }
}
