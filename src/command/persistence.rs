//! load, save and run

use tracing::info;

use super::{system_command, with_default_extension};
use crate::ast::{Primitive, Value};
use crate::env::ContainerId;
use crate::eval::{EvalError, Evaluator};
use crate::io::Sink;
use crate::parser::parse_value;

const TAB: &str = "    ";

impl Evaluator {
    /// Read a `.dat` value or the lines of a `.txt` file into a variable
    pub(crate) fn load(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let file = self.file_name(&args[0], "dat", env, sink)?;
        let path = self.path_of_value(&args[1], env, sink)?;
        let extension = file
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if extension != "dat" && extension != "txt" {
            return Err(EvalError::Type(format!(
                "Can not load files with extension {}.",
                extension
            )));
        }

        self.store.create_path(&path)?;
        let binding = self.store.binding_at(&path)?;
        if self.store.is_protected(binding) {
            return Err(system_command(self.store.name(binding)));
        }
        let contents = self.read_file(&file)?;
        info!(file = %file, path = %path, "loading file");

        if extension == "dat" {
            let value = parse_value(&contents)
                .map_err(|e| EvalError::from(e).context("Could not load"))?;
            self.store.replace_value(binding, value)?;
        } else {
            let lines = self.store.ensure_container(binding)?;
            for (index, line) in contents.lines().enumerate() {
                let name = format!("line{}", index + 1);
                if let Some(old) = self.store.find_local(lines, &name) {
                    self.store.detach(old);
                }
                self.store
                    .add_binding(lines, &name, Value::Text(line.to_string()))?;
            }
        }
        sink.write_line(&format!(
            "File \"{}\" loaded to '{}'.",
            file,
            self.store.binding_path(binding)
        ));
        Ok(Primitive::Void)
    }

    /// Write a variable (the current container by default) in the brace format
    pub(crate) fn save(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let file = self.file_name(&args[0], "dat", env, sink)?;
        let value = match args.get(1) {
            Some(variable) => {
                let path = self.path_of_value(variable, env, sink)?;
                if path.depth() == 0 {
                    return Err(EvalError::Type("Can not save ':'.".to_string()));
                }
                self.store.value_at(&path)?
            }
            None => Value::Container(env),
        };
        let mut contents = String::new();
        self.write_saved(&value, 0, &mut Vec::new(), &mut contents)?;
        self.files
            .write(&file, &contents)
            .map_err(|source| EvalError::Io {
                path: file.clone(),
                source,
            })?;
        info!(file = %file, "saved variable");
        sink.write_line(&format!("Variable saved to {}.", file));
        Ok(Primitive::Void)
    }

    /// Write `value` in the brace format. Collections held inside an
    /// expression are written out in full so the file loads back.
    fn write_saved(
        &self,
        value: &Value,
        level: usize,
        within: &mut Vec<ContainerId>,
        out: &mut String,
    ) -> Result<(), EvalError> {
        let Value::Container(c) = value else {
            let mut failure = None;
            value.write_with(out, &mut |c, out| {
                if failure.is_none() {
                    if let Err(e) = self.write_saved(&Value::Container(c), level, within, out) {
                        failure = Some(e);
                    }
                }
            });
            return failure.map_or(Ok(()), Err);
        };
        if within.contains(c) {
            return Err(EvalError::Guard(format!(
                "Can not save '{}', since it contains itself.",
                self.store.path_of(*c)
            )));
        }
        let entries: Vec<_> = self
            .store
            .bindings(*c)
            .iter()
            .copied()
            .filter(|b| !self.store.is_protected(*b))
            .collect();
        if entries.is_empty() {
            out.push_str("{ }");
            return Ok(());
        }
        within.push(*c);
        out.push_str("{\n");
        for (i, binding) in entries.iter().enumerate() {
            if i > 0 {
                out.push_str(" ,\n");
            }
            out.push_str(&TAB.repeat(level + 1));
            out.push_str(self.store.name(*binding));
            out.push_str(" = ");
            self.write_saved(self.store.value(*binding), level + 1, within, out)?;
        }
        out.push_str(" }");
        within.pop();
        Ok(())
    }

    /// Dispatch every line of a script until one of them quits
    pub(crate) fn run_script(
        &mut self,
        env: ContainerId,
        args: &[Value],
        sink: &mut dyn Sink,
    ) -> Result<Primitive, EvalError> {
        let file = self.file_name(&args[0], "scr", env, sink)?;
        let contents = self.read_file(&file)?;
        info!(file = %file, "running script");
        for line in contents.lines() {
            self.dispatch(line, sink);
            if self.quit_requested {
                break;
            }
        }
        Ok(Primitive::Void)
    }

    fn file_name(
        &mut self,
        value: &Value,
        extension: &str,
        env: ContainerId,
        sink: &mut dyn Sink,
    ) -> Result<String, EvalError> {
        match self.argument(value, env, sink)? {
            Primitive::Text(name) => Ok(with_default_extension(&name, extension)),
            other => Err(EvalError::Type(format!(
                "A file name should evaluate to a value of type 'text', not of type '{}'.",
                self.store.type_name_of(&other.into_value())
            ))),
        }
    }

    fn read_file(&self, file: &str) -> Result<String, EvalError> {
        self.files
            .read_to_string(file)
            .map_err(|source| EvalError::Io {
                path: file.to_string(),
                source,
            })
    }
}
