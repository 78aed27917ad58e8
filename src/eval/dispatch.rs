//! One line in, formatted output out

use tracing::debug;

use super::{EvalError, Evaluator, Mode};
use crate::ast::Primitive;
use crate::io::Sink;
use crate::parser::parse_statement;

impl Evaluator {
    /// Evaluate one line and write its outcome to the sink.
    /// Returns false for a blank line, true otherwise.
    pub fn dispatch(&mut self, line: &str, sink: &mut dyn Sink) -> bool {
        if line.trim().is_empty() {
            return false;
        }
        debug!(line, "dispatching statement");
        self.nesting += 1;
        let result = self.execute(line, sink);
        self.nesting -= 1;

        match result {
            Ok(Primitive::Void) => {}
            Ok(Primitive::Text(text)) => sink.write_line(&text),
            Ok(other) => {
                let shown = self.render(&other.into_value(), sink);
                sink.write_line(&format!("Result: {}", shown));
            }
            Err(e) => {
                debug!(error = %e, kind = ?e.kind(), "statement failed");
                sink.write_line(&format!("Error: {}", e));
            }
        }

        if self.nesting == 0 {
            self.collect_garbage();
        }
        true
    }

    /// Parse a statement and reduce it in the current container
    pub fn execute(&mut self, line: &str, sink: &mut dyn Sink) -> Result<Primitive, EvalError> {
        let statement = parse_statement(line)?;
        let env = self.current;
        let args = self.pre_evaluate_all(&statement.args, env, sink)?;
        self.reduce(&statement.value, env, &args, Mode::Full, sink)
    }

    fn collect_garbage(&mut self) {
        if !self.store.is_live(self.current) || self.store.is_detached(self.current) {
            self.current = self.store.root();
        }
        self.store.collect_garbage(&[]);
    }
}
