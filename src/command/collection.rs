//! sort, list and environment

use crate::ast::{Primitive, Value};
use crate::env::{is_hidden, ContainerId};
use crate::eval::{EvalError, Evaluator};
use crate::io::Sink;

const INDENT: &str = "   ";

impl Evaluator {
    /// Order the visible bindings of a collection and record the order in
    /// `_1`, `_2`, ... as names of the sorted bindings
    pub(crate) fn sort(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let path = self.path_of_value(&args[0], env, sink)?;
        let collection = self.store.container_at(&path)?;
        let key = match args.get(1) {
            Some(key) => sort_key(key)?,
            None => Vec::new(),
        };

        let visible: Vec<_> = self
            .store
            .bindings(collection)
            .iter()
            .copied()
            .filter(|b| !is_hidden(self.store.name(*b)))
            .collect();
        let mut entries = Vec::with_capacity(visible.len());
        for binding in visible {
            let name = self.store.name(binding).to_string();
            let at = self.store.binding_path(binding).extend(&key);
            let (value, scope) = match self.store.value_at(&at) {
                Ok(value) => {
                    let scope = self.store.container_at(&at.truncated(1)).unwrap_or(collection);
                    (value, scope)
                }
                Err(_) => (Value::Void, collection),
            };
            let order = self.argument(&value, scope, sink)?;
            entries.push((name, order));
        }
        entries.sort_by(|a, b| self.compare(&a.1, &b.1));

        let count = entries.len();
        for (index, (name, _)) in entries.into_iter().enumerate() {
            let slot = format!("_{}", index + 1);
            let binding = match self.store.find_local(collection, &slot) {
                Some(binding) => binding,
                None => self.store.add_binding(collection, &slot, Value::Void)?,
            };
            self.store.replace_value(binding, Value::Named(name))?;
        }
        let mut stale = count + 1;
        while let Some(binding) = self.store.find_local(collection, &format!("_{}", stale)) {
            self.store.detach(binding);
            stale += 1;
        }
        Ok(Primitive::Void)
    }

    /// Print `name: value` per binding, indented per nesting level
    pub(crate) fn list(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let collection = match args.first() {
            Some(value) => self.collection(value, env, &[], sink)?,
            None => env,
        };
        let nested = self.flag(args, 1, false, env, sink)?;
        let hidden = self.flag(args, 2, false, env, sink)?;
        self.list_container(collection, 0, nested, hidden, sink);
        Ok(Primitive::Void)
    }

    fn list_container(
        &mut self,
        collection: ContainerId,
        level: usize,
        nested: bool,
        hidden: bool,
        sink: &mut dyn Sink,
    ) {
        let indent = INDENT.repeat(level);
        for binding in self.store.bindings(collection).to_vec() {
            let name = self.store.name(binding).to_string();
            if !hidden && is_hidden(&name) {
                continue;
            }
            match self.store.sub_container(binding) {
                Some(inner) if nested => {
                    sink.write_line(&format!("{}{}:", indent, name));
                    self.list_container(inner, level + 1, nested, hidden, sink);
                }
                Some(_) => sink.write_line(&format!("{}{}: {{...}}", indent, name)),
                None => {
                    let value = self.store.value(binding).clone();
                    let shown = self.render(&value, sink);
                    sink.write_line(&format!("{}{}: {}", indent, name, shown));
                }
            }
        }
    }

    /// Make a collection the container statements are evaluated in
    pub(crate) fn environment(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        if let Some(target) = args.first() {
            let path = self.path_of_value(target, env, sink)?;
            self.current = if path.depth() == 0 {
                path.anchor()
            } else {
                let binding = self.store.binding_at(&path)?;
                self.store.ensure_container(binding)?
            };
        }
        sink.write_line(&format!(
            "Currently working in '{}'.",
            self.store.path_of(self.current)
        ));
        Ok(Primitive::Void)
    }
}

/// Names below each element to sort by: `hp`, `stats.dex`, `()`
fn sort_key(value: &Value) -> Result<Vec<String>, EvalError> {
    match value {
        Value::Named(name) => Ok(vec![name.clone()]),
        Value::Sub { reference, sub, .. } => {
            let mut names = sort_key(reference)?;
            if let Some(sub) = sub {
                names.extend(sort_key(sub)?);
            }
            Ok(names)
        }
        Value::Void => Ok(Vec::new()),
        other => Err(EvalError::Type(format!(
            "Can not use '{}' as a criterium to sort by.",
            other
        ))),
    }
}
