//! set, copy, move, create and remove

use super::system_command;
use crate::ast::{Primitive, Value};
use crate::env::{BindingId, ContainerId, Path};
use crate::eval::{EvalError, Evaluator};
use crate::io::Sink;

impl Evaluator {
    /// Store the second argument, unevaluated, at the path of the first
    pub(crate) fn set(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let path = self.path_of_value(&args[0], env, sink)?;
        let create = self.flag(args, 2, false, env, sink)?;
        self.store.set_at(&path, args[1].clone(), create)?;
        let shown = self.render(&args[1], sink);
        sink.write_line(&format!("Value of '{}' set to '{}'.", path, shown));
        Ok(Primitive::Void)
    }

    pub(crate) fn copy(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let (source, destination) = self.duplicate(env, args, true, sink)?;
        sink.write_line(&format!(
            "Variable '{}' copied to '{}'.",
            self.store.binding_path(source),
            destination
        ));
        Ok(Primitive::Void)
    }

    pub(crate) fn move_variable(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let (source, destination) = self.duplicate(env, &args[..args.len().min(2)], true, sink)?;
        let from = self.store.binding_path(source);
        self.store.detach(source);
        sink.write_line(&format!("Variable '{}' moved to '{}'.", from, destination));
        Ok(Primitive::Void)
    }

    /// Copy the binding at `args[0]` to `args[1]`, or to the same name in
    /// `env`. Returns the source binding and the destination path.
    fn duplicate(
        &mut self,
        env: ContainerId,
        args: &[Value],
        create_default: bool,
        sink: &mut dyn Sink,
    ) -> Result<(BindingId, Path), EvalError> {
        let source_path = self.path_of_value(&args[0], env, sink)?;
        let source = self.store.binding_at(&source_path)?;
        if self.store.is_protected(source) {
            return Err(system_command(self.store.name(source)));
        }
        let value = self.store.value(source).clone();
        let copy = self.store.deep_copy(&value)?;
        match args.get(1) {
            Some(destination) => {
                let destination = self.path_of_value(destination, env, sink)?;
                let create = self.flag(args, 2, create_default, env, sink)?;
                self.store.set_at(&destination, copy, create)?;
                Ok((source, destination))
            }
            None => {
                let name = self.store.name(source).to_string();
                let copied = self.store.add_binding(env, &name, copy)?;
                Ok((source, self.store.binding_path(copied)))
            }
        }
    }

    pub(crate) fn create(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let path = self.path_of_value(&args[0], env, sink)?;
        self.store.create_path(&path)?;
        sink.write_line(&format!("Variable '{}' created.", path));
        if let Some(value) = args.get(1) {
            self.store.set_at(&path, value.clone(), false)?;
            let shown = self.render(value, sink);
            sink.write_line(&format!("Value of '{}' set to '{}'.", path, shown));
        }
        Ok(Primitive::Void)
    }

    pub(crate) fn remove(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let path = self.path_of_value(&args[0], env, sink)?;
        let binding = self.store.binding_at(&path)?;
        if self.store.is_protected(binding) {
            return Err(system_command(self.store.name(binding)));
        }
        self.store.detach(binding);
        sink.write_line(&format!("Variable {} removed.", path));
        Ok(Primitive::Void)
    }
}
