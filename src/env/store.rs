//! Arena of containers and bindings

use std::collections::HashSet;

use tracing::trace;

use super::{is_hidden, BindingId, ContainerId, Path, TEMPLATE_NAME, TYPE_NAME};
use crate::ast::Value;
use crate::eval::EvalError;

#[derive(Debug)]
struct ContainerSlot {
    /// Attached bindings in insertion order
    bindings: Vec<BindingId>,
    /// The binding whose value is this container
    host: Option<BindingId>,
    live: bool,
}

#[derive(Debug)]
struct BindingSlot {
    name: String,
    value: Value,
    owner: ContainerId,
    /// Built-in commands can not be changed, copied over or removed
    protected: bool,
    /// False once the binding was removed from its owner
    attached: bool,
    live: bool,
}

/// All containers and bindings of one evaluator
#[derive(Debug)]
pub struct Store {
    containers: Vec<ContainerSlot>,
    bindings: Vec<BindingSlot>,
    free_containers: Vec<usize>,
    free_bindings: Vec<usize>,
    root: ContainerId,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    pub fn new() -> Self {
        let mut store = Store {
            containers: Vec::new(),
            bindings: Vec::new(),
            free_containers: Vec::new(),
            free_bindings: Vec::new(),
            root: ContainerId(0),
        };
        store.root = store.new_container();
        store
    }

    /// The top-level container, addressed as `:`
    pub fn root(&self) -> ContainerId {
        self.root
    }

    fn container(&self, id: ContainerId) -> &ContainerSlot {
        &self.containers[id.0]
    }

    fn container_mut(&mut self, id: ContainerId) -> &mut ContainerSlot {
        &mut self.containers[id.0]
    }

    fn binding(&self, id: BindingId) -> &BindingSlot {
        &self.bindings[id.0]
    }

    fn binding_mut(&mut self, id: BindingId) -> &mut BindingSlot {
        &mut self.bindings[id.0]
    }

    pub fn is_live(&self, id: ContainerId) -> bool {
        self.containers.get(id.0).map_or(false, |slot| slot.live)
    }

    /// Attached bindings of a container, in insertion order
    pub fn bindings(&self, id: ContainerId) -> &[BindingId] {
        &self.container(id).bindings
    }

    pub fn name(&self, id: BindingId) -> &str {
        &self.binding(id).name
    }

    pub fn value(&self, id: BindingId) -> &Value {
        &self.binding(id).value
    }

    pub fn owner(&self, id: BindingId) -> ContainerId {
        self.binding(id).owner
    }

    pub fn is_protected(&self, id: BindingId) -> bool {
        self.binding(id).protected
    }

    pub fn is_attached(&self, id: BindingId) -> bool {
        let slot = self.binding(id);
        slot.live && slot.attached
    }

    /// The container held by a binding, if it holds one
    pub fn sub_container(&self, id: BindingId) -> Option<ContainerId> {
        match self.value(id) {
            Value::Container(c) => Some(*c),
            _ => None,
        }
    }

    /// The container one level up, through the binding that holds `id`
    pub fn parent(&self, id: ContainerId) -> Option<ContainerId> {
        let host = self.container(id).host?;
        self.is_attached(host).then(|| self.owner(host))
    }

    /// Whether the container is not the top level and no attached binding holds it
    pub fn is_detached(&self, id: ContainerId) -> bool {
        id != self.root && self.parent(id).is_none()
    }

    /// The enclosing container, or the container itself at the top
    pub fn level_above(&self, id: ContainerId) -> ContainerId {
        self.parent(id).unwrap_or(id)
    }

    /// Whether `ancestor` is `id` or one of the containers enclosing it
    pub fn encloses(&self, ancestor: ContainerId, id: ContainerId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.parent(c);
        }
        false
    }

    pub fn find_local(&self, id: ContainerId, name: &str) -> Option<BindingId> {
        self.container(id)
            .bindings
            .iter()
            .copied()
            .find(|b| self.binding(*b).name == name)
    }

    /// A fresh detached container
    pub fn new_container(&mut self) -> ContainerId {
        let slot = ContainerSlot {
            bindings: Vec::new(),
            host: None,
            live: true,
        };
        match self.free_containers.pop() {
            Some(index) => {
                self.containers[index] = slot;
                ContainerId(index)
            }
            None => {
                self.containers.push(slot);
                ContainerId(self.containers.len() - 1)
            }
        }
    }

    fn new_binding(&mut self, owner: ContainerId, name: &str, protected: bool) -> BindingId {
        let slot = BindingSlot {
            name: name.to_string(),
            value: Value::Void,
            owner,
            protected,
            attached: true,
            live: true,
        };
        let id = match self.free_bindings.pop() {
            Some(index) => {
                self.bindings[index] = slot;
                BindingId(index)
            }
            None => {
                self.bindings.push(slot);
                BindingId(self.bindings.len() - 1)
            }
        };
        self.container_mut(owner).bindings.push(id);
        id
    }

    /// Add a new binding; the name must not exist in the container yet
    pub fn add_binding(
        &mut self,
        owner: ContainerId,
        name: &str,
        value: Value,
    ) -> Result<BindingId, EvalError> {
        if self.find_local(owner, name).is_some() {
            return Err(EvalError::Lookup(format!("A variable {} already exists.", name)));
        }
        let id = self.new_binding(owner, name, false);
        self.replace_value(id, value)?;
        Ok(id)
    }

    /// Bind a built-in command under a protected name
    pub fn add_command(&mut self, owner: ContainerId, name: &str, value: Value) -> BindingId {
        let id = self.new_binding(owner, name, true);
        self.binding_mut(id).value = value;
        id
    }

    /// Store `value` in the binding and return what it held before.
    /// A container held before becomes detached.
    pub fn replace_value(&mut self, id: BindingId, value: Value) -> Result<Value, EvalError> {
        let old = std::mem::replace(&mut self.binding_mut(id).value, Value::Void);
        if let Value::Container(c) = old {
            if self.container(c).host == Some(id) {
                self.container_mut(c).host = None;
            }
        }
        let value = self.adopt(id, value)?;
        self.binding_mut(id).value = value;
        Ok(old)
    }

    /// Turn a value into something the binding may own: literals are
    /// materialized, detached containers are taken over and containers
    /// held elsewhere are copied.
    fn adopt(&mut self, id: BindingId, value: Value) -> Result<Value, EvalError> {
        let c = match value {
            Value::Record(fields) => self.materialize(&fields)?,
            Value::Container(c) => {
                let owner = self.owner(id);
                if self.is_detached(c) && !self.encloses(c, owner) {
                    c
                } else {
                    self.copy_container(c)?
                }
            }
            other => return Ok(other),
        };
        self.container_mut(c).host = Some(id);
        Ok(Value::Container(c))
    }

    /// Take the binding out of its container. Its container, if any, becomes detached.
    pub fn detach(&mut self, id: BindingId) {
        let owner = self.owner(id);
        self.container_mut(owner).bindings.retain(|b| *b != id);
        self.binding_mut(id).attached = false;
    }

    /// Copy a value; containers are copied binding by binding
    pub fn deep_copy(&mut self, value: &Value) -> Result<Value, EvalError> {
        match value {
            Value::Container(c) => Ok(Value::Container(self.copy_container(*c)?)),
            other => Ok(other.clone()),
        }
    }

    /// A detached copy of a container and everything below it
    pub fn copy_container(&mut self, id: ContainerId) -> Result<ContainerId, EvalError> {
        let copy = self.new_container();
        let originals = self.bindings(id).to_vec();
        for b in originals {
            let value = self.value(b).clone();
            let value = self.deep_copy(&value)?;
            let name = self.name(b).to_string();
            if self.is_protected(b) {
                self.add_command(copy, &name, value);
            } else {
                self.add_binding(copy, &name, value)?;
            }
        }
        Ok(copy)
    }

    /// A detached container holding the fields of a `{...}` literal
    pub fn materialize(&mut self, fields: &[(String, Value)]) -> Result<ContainerId, EvalError> {
        let c = self.new_container();
        for (name, value) in fields {
            self.add_binding(c, name, value.clone())?;
        }
        Ok(c)
    }

    /// Absolute path of a container, anchored at its topmost enclosing container
    pub fn path_of(&self, id: ContainerId) -> Path {
        let mut names = Vec::new();
        let mut current = id;
        while let Some(host) = self.container(current).host {
            if !self.is_attached(host) {
                break;
            }
            names.push(self.name(host).to_string());
            current = self.owner(host);
        }
        names.reverse();
        Path::from_names(current, names)
    }

    pub fn binding_path(&self, id: BindingId) -> Path {
        self.path_of(self.owner(id)).child(self.name(id))
    }

    /// Scoped lookup: own bindings, then the template chain, then the
    /// enclosing containers up to the top level
    pub fn lookup(&self, from: ContainerId, name: &str) -> Result<BindingId, EvalError> {
        let mut current = from;
        loop {
            if let Some(b) = self.find_with_template(current, name) {
                return Ok(b);
            }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Err(EvalError::Lookup(format!(
            "No variable '{}' exists in '{}'.",
            name,
            self.path_of(from)
        )))
    }

    /// Local bindings of the container, then of its template, its template's template, ...
    pub fn find_with_template(&self, id: ContainerId, name: &str) -> Option<BindingId> {
        let mut seen = HashSet::new();
        let mut current = id;
        loop {
            if let Some(b) = self.find_local(current, name) {
                return Some(b);
            }
            seen.insert(current);
            match self.template_of(current) {
                Some(template) if !seen.contains(&template) => current = template,
                _ => return None,
            }
        }
    }

    /// The container addressed by `_template`, relative to the container's own path
    pub fn template_of(&self, id: ContainerId) -> Option<ContainerId> {
        let b = self.find_local(id, TEMPLATE_NAME)?;
        let path = self.convert_static(self.value(b), &self.path_of(id)).ok()?;
        match self.value_at(&path).ok()? {
            Value::Container(template) => Some(template),
            _ => None,
        }
    }

    /// Type name of a value, honoring a container's `_type` override
    pub fn type_name_of(&self, value: &Value) -> String {
        if let Value::Container(c) = value {
            if let Some(Value::Text(name)) = self.find_local(*c, TYPE_NAME).map(|b| self.value(b)) {
                return name.clone();
            }
        }
        value.type_name().to_string()
    }

    /// Structural equality: containers compare by their bindings, in order
    pub fn values_equal(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Container(x), Value::Container(y)) => self.containers_equal(*x, *y),
            _ => a == b,
        }
    }

    pub fn containers_equal(&self, a: ContainerId, b: ContainerId) -> bool {
        if a == b {
            return true;
        }
        let (left, right) = (self.bindings(a), self.bindings(b));
        left.len() == right.len()
            && left.iter().zip(right).all(|(x, y)| {
                self.name(*x) == self.name(*y) && self.values_equal(self.value(*x), self.value(*y))
            })
    }

    /// Names that a lookup from `id` could resolve, nearest first
    pub fn visible_names(&self, id: ContainerId) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let mut current = Some(id);
        while let Some(c) = current {
            let mut seen = HashSet::new();
            let mut scope = Some(c);
            while let Some(s) = scope.filter(|s| seen.insert(*s)) {
                for b in self.bindings(s) {
                    let name = self.name(*b);
                    if !is_hidden(name) && !names.iter().any(|n| n == name) {
                        names.push(name.to_string());
                    }
                }
                scope = self.template_of(s);
            }
            current = self.parent(c);
        }
        names
    }

    /// Free every container and binding not reachable from the top level or
    /// from `keep`. Returns the number of containers reclaimed.
    pub fn collect_garbage(&mut self, keep: &[ContainerId]) -> usize {
        let mut marked = vec![false; self.containers.len()];
        let mut pending: Vec<ContainerId> = vec![self.root];
        pending.extend(keep.iter().copied().filter(|c| self.is_live(*c)));
        while let Some(c) = pending.pop() {
            if std::mem::replace(&mut marked[c.0], true) {
                continue;
            }
            for b in &self.container(c).bindings {
                self.binding(*b).value.for_each_container(&mut |held| {
                    if !marked[held.0] {
                        pending.push(held);
                    }
                });
            }
        }

        let mut reclaimed = 0;
        for (index, slot) in self.containers.iter_mut().enumerate() {
            if slot.live && !marked[index] {
                slot.live = false;
                slot.bindings.clear();
                slot.host = None;
                self.free_containers.push(index);
                reclaimed += 1;
            }
        }
        for (index, slot) in self.bindings.iter_mut().enumerate() {
            let owner_live = marked.get(slot.owner.0).copied().unwrap_or(false);
            if slot.live && (!slot.attached || !owner_live) {
                slot.live = false;
                slot.value = Value::Void;
                self.free_bindings.push(index);
            }
        }
        let bindings = &self.bindings;
        for slot in self.containers.iter_mut().filter(|slot| slot.live) {
            if slot.host.map_or(false, |h| !bindings[h.0].live) {
                slot.host = None;
            }
        }
        trace!(reclaimed, "swept detached containers");
        reclaimed
    }
}
