//! The variable store
//!
//! Containers and bindings live in an arena owned by [`Store`] and are
//! addressed by copyable handles. Every container except the top level is
//! held by exactly one binding; a container whose binding was removed (or
//! that was never placed) is *detached* and reclaimed by
//! [`Store::collect_garbage`] once nothing reachable refers to it.

mod path;
mod store;

pub use path::Path;
pub use store::Store;

/// Handle to a container in the [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub(crate) usize);

/// Handle to a binding in the [`Store`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub(crate) usize);

/// Names starting with `_` are hidden from listings, loops and sorting
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('_')
}

pub const VALUE_NAME: &str = "_value";
pub const TEMPLATE_NAME: &str = "_template";
pub const TO_STRING_NAME: &str = "_toString";
pub const TYPE_NAME: &str = "_type";
