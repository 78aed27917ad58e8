//! print, text and void

use crate::ast::{Primitive, Value};
use crate::env::ContainerId;
use crate::eval::{EvalError, Evaluator};
use crate::io::Sink;

impl Evaluator {
    pub(crate) fn print(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        for arg in args {
            match self.argument(arg, env, sink)? {
                Primitive::Text(text) => sink.write_line(&text),
                other => {
                    let shown = self.render(&other.into_value(), sink);
                    sink.write_line(&shown);
                }
            }
        }
        Ok(Primitive::Void)
    }

    /// The argument's written form as text, without evaluating it
    pub(crate) fn text(&mut self, args: &[Value], sink: &mut dyn Sink) -> Result<Primitive, EvalError> {
        match &args[0] {
            Value::Text(text) => Ok(Primitive::Text(text.clone())),
            other => Ok(Primitive::Text(self.render(other, sink))),
        }
    }

    pub(crate) fn void(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        for arg in args {
            self.argument(arg, env, sink)?;
        }
        Ok(Primitive::Void)
    }
}
