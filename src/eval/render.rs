//! Display forms of values that may hold containers

use tracing::warn;

use super::{Evaluator, Mode};
use crate::ast::{Primitive, Value};
use crate::env::{is_hidden, ContainerId, TO_STRING_NAME};
use crate::io::Sink;

impl Evaluator {
    /// Canonical form of a value; containers use their `_toString` hook or
    /// list their visible bindings
    pub fn render(&mut self, value: &Value, sink: &mut dyn Sink) -> String {
        let mut out = String::new();
        value.write_with(&mut out, &mut |c, out| self.write_container(c, out, sink));
        out
    }

    fn write_container(&mut self, c: ContainerId, out: &mut String, sink: &mut dyn Sink) {
        if self.depth >= self.config.max_depth || !self.store.is_live(c) {
            out.push_str("{...}");
            return;
        }
        self.depth += 1;
        if !self.write_to_string_hook(c, out, sink) {
            self.write_listing(c, out, sink);
        }
        self.depth -= 1;
    }

    /// Returns false when the container has no usable hook
    fn write_to_string_hook(&mut self, c: ContainerId, out: &mut String, sink: &mut dyn Sink) -> bool {
        let Some(b) = self.store.find_with_template(c, TO_STRING_NAME) else {
            return false;
        };
        let hook = self.store.value(b).clone();
        match self.reduce(&hook, c, &[], Mode::Full, sink) {
            Ok(Primitive::Text(text)) => out.push_str(&text),
            Ok(Primitive::Container(_)) => return false,
            Ok(other) => out.push_str(&other.into_value().to_string()),
            Err(e) => {
                warn!(error = %e, "_toString hook failed");
                sink.write_line(&format!("Error: {}", e));
                return false;
            }
        }
        true
    }

    fn write_listing(&mut self, c: ContainerId, out: &mut String, sink: &mut dyn Sink) {
        out.push('{');
        let mut first = true;
        for b in self.store.bindings(c).to_vec() {
            let name = self.store.name(b).to_string();
            if is_hidden(&name) {
                continue;
            }
            if !first {
                out.push(',');
            }
            first = false;
            out.push_str(&name);
            out.push('=');
            let value = self.store.value(b).clone();
            value.write_with(out, &mut |inner, out| self.write_container(inner, out, sink));
        }
        out.push('}');
    }
}
