//! Paths: a container plus a list of names below it

use std::fmt;

use super::{BindingId, ContainerId, Store, VALUE_NAME};
use crate::ast::Value;
use crate::eval::EvalError;

/// An address in the store, displayed as `:a.b.c`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    anchor: ContainerId,
    names: Vec<String>,
}

impl Path {
    pub fn new(anchor: ContainerId) -> Self {
        Path {
            anchor,
            names: Vec::new(),
        }
    }

    pub fn from_names(anchor: ContainerId, names: Vec<String>) -> Self {
        Path { anchor, names }
    }

    pub fn anchor(&self) -> ContainerId {
        self.anchor
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    pub fn last(&self) -> Option<&str> {
        self.names.last().map(String::as_str)
    }

    pub fn child(&self, name: &str) -> Path {
        let mut names = self.names.clone();
        names.push(name.to_string());
        Path::from_names(self.anchor, names)
    }

    /// Append the names of `other`
    pub fn extend(&self, other: &[String]) -> Path {
        let mut names = self.names.clone();
        names.extend_from_slice(other);
        Path::from_names(self.anchor, names)
    }

    /// Drop `levels` trailing names, stopping at the anchor
    pub fn truncated(&self, levels: usize) -> Path {
        let keep = self.names.len().saturating_sub(levels);
        Path::from_names(self.anchor, self.names[..keep].to_vec())
    }

    /// The expression that addresses this path: `:a.b` for a path below the top level
    pub fn to_value(&self, root: ContainerId) -> Value {
        let anchor = if self.anchor == root {
            Value::Global
        } else {
            Value::Container(self.anchor)
        };
        let chain = self.names.iter().rev().fold(None, |tail, name| {
            let named = Value::Named(name.clone());
            Some(match tail {
                None => named,
                Some(tail) => Value::sub(named, Some(tail), 0),
            })
        });
        Value::sub(anchor, chain, 0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.names.join("."))
    }
}

fn system_command(name: &str) -> EvalError {
    EvalError::Type(format!(
        "Can not manipulate {} as it is a system command.",
        name
    ))
}

impl Store {
    /// The binding a path ends in
    pub fn binding_at(&self, path: &Path) -> Result<BindingId, EvalError> {
        let (last, init) = path.names().split_last().ok_or_else(|| {
            EvalError::Lookup(format!("The path '{}' contains no variables.", path))
        })?;
        let mut current = path.anchor();
        for (depth, name) in init.iter().enumerate() {
            let b = self.local_or_missing(current, name, path, depth)?;
            current = self.sub_container(b).ok_or_else(|| {
                EvalError::Lookup(format!(
                    "The variable '{}' contains no subvariables.",
                    path.truncated(path.depth() - depth - 1)
                ))
            })?;
        }
        self.local_or_missing(current, last, path, init.len())
    }

    fn local_or_missing(
        &self,
        id: ContainerId,
        name: &str,
        path: &Path,
        depth: usize,
    ) -> Result<BindingId, EvalError> {
        self.find_local(id, name).ok_or_else(|| {
            EvalError::Lookup(format!(
                "No variable '{}' exists in '{}'.",
                name,
                path.truncated(path.depth() - depth)
            ))
        })
    }

    /// The value a path addresses; the empty path addresses its anchor
    pub fn value_at(&self, path: &Path) -> Result<Value, EvalError> {
        if path.depth() == 0 {
            return Ok(Value::Container(path.anchor()));
        }
        Ok(self.value(self.binding_at(path)?).clone())
    }

    /// The container a path addresses
    pub fn container_at(&self, path: &Path) -> Result<ContainerId, EvalError> {
        match self.value_at(path)? {
            Value::Container(c) => Ok(c),
            _ => Err(EvalError::Type(format!(
                "The variable '{}' did not contain a collection.",
                path
            ))),
        }
    }

    /// Create every missing binding along the path. Intermediate bindings
    /// holding something other than a container are wrapped into one.
    /// Returns the binding at the end of the path, if the path has names.
    pub fn create_path(&mut self, path: &Path) -> Result<Option<BindingId>, EvalError> {
        let mut current = path.anchor();
        let mut last = None;
        for (depth, name) in path.names().iter().enumerate() {
            let b = match self.find_local(current, name) {
                Some(b) => b,
                None => self.add_binding(current, name, Value::Void)?,
            };
            if depth + 1 < path.depth() {
                current = self.ensure_container(b)?;
            }
            last = Some(b);
        }
        Ok(last)
    }

    /// The container held by the binding, wrapping its scalar value into
    /// `_value` of a new container when needed
    pub fn ensure_container(&mut self, id: BindingId) -> Result<ContainerId, EvalError> {
        if let Some(c) = self.sub_container(id) {
            return Ok(c);
        }
        if self.is_protected(id) {
            return Err(system_command(self.name(id)));
        }
        let wrapper = self.new_container();
        let old = self.replace_value(id, Value::Container(wrapper))?;
        if old != Value::Void {
            self.add_binding(wrapper, VALUE_NAME, old)?;
        }
        Ok(wrapper)
    }

    /// Store a value at a path. A binding holding a container with a `_value`
    /// receives the value there instead.
    pub fn set_at(&mut self, path: &Path, value: Value, create: bool) -> Result<(), EvalError> {
        if create {
            self.create_path(path)?;
        }
        let b = self.binding_at(path)?;
        self.set_binding(b, value)
    }

    pub fn set_binding(&mut self, id: BindingId, value: Value) -> Result<(), EvalError> {
        if self.is_protected(id) {
            return Err(system_command(self.name(id)));
        }
        let boxed = self
            .sub_container(id)
            .and_then(|c| self.find_local(c, VALUE_NAME));
        match boxed {
            Some(inner) => self.set_binding(inner, value),
            None => {
                self.replace_value(id, value)?;
                Ok(())
            }
        }
    }

    /// Read a path expression without evaluating anything
    pub fn convert_static(&self, value: &Value, within: &Path) -> Result<Path, EvalError> {
        match value {
            Value::Global => Ok(Path::new(within.anchor())),
            Value::Named(name) => Ok(within.child(name)),
            Value::Current | Value::Void => Ok(within.clone()),
            Value::Container(c) => Ok(self.path_of(*c)),
            Value::Sub {
                reference,
                sub,
                level,
            } => {
                let base = self.convert_static(reference, within)?.truncated(*level);
                match sub {
                    Some(sub) => self.convert_static(sub, &base),
                    None => Ok(base),
                }
            }
            Value::Deferred { value, .. } => self.convert_static(value, within),
            other => Err(EvalError::Lookup(format!(
                "Can not make a path from arguments of type '{}'.",
                self.type_name_of(other)
            ))),
        }
    }
}
