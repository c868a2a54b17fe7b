//! Module Node
//!
//! A `Module` is a node in the module tree: an open, insertion-ordered bag of
//! named attributes plus a `compiled` lifecycle flag. `Module` is a shared
//! handle; clones refer to the same node.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::{PathError, PathResult};
use super::path::is_identifier;
use super::value::{NodeId, Value};

/// The node data behind a module handle.
struct ModuleData {
    /// Human-readable label (e.g. the composite type name), used by `Debug`.
    label: String,

    /// Set by an external optimizer once parameters are tuned.
    compiled: bool,

    /// Attributes in insertion order; re-assignment keeps the original slot.
    attrs: Vec<(String, Value)>,
}

/// A composable computation unit holding named attributes.
///
/// Attributes may be scalars, other modules, parameters, or containers of any
/// of these nested to arbitrary depth. Aliasing and cycles are allowed.
#[derive(Clone)]
pub struct Module {
    id: NodeId,
    data: Arc<RwLock<ModuleData>>,
}

impl Module {
    /// Create a new empty, uncompiled module.
    pub fn new() -> Self {
        Self::labeled("Module")
    }

    /// Create a new module with a descriptive label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            id: NodeId::fresh(),
            data: Arc::new(RwLock::new(ModuleData {
                label: label.into(),
                compiled: false,
                attrs: Vec::new(),
            })),
        }
    }

    /// Get the module's identity.
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> String {
        self.data.read().label.clone()
    }

    pub fn is_compiled(&self) -> bool {
        self.data.read().compiled
    }

    /// Set the compiled flag. Only optimizers call this; the registry never does.
    pub fn set_compiled(&self, compiled: bool) {
        self.data.write().compiled = compiled;
    }

    /// Read an attribute.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.data
            .read()
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    pub fn has(&self, name: &str) -> bool {
        self.data.read().attrs.iter().any(|(n, _)| n == name)
    }

    /// Assign an attribute, returning the previous value if there was one.
    ///
    /// # Panics
    /// Panics if `name` is not an identifier; use [`Module::try_set`] for
    /// names that are not known to be valid.
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        match self.try_set(name, value) {
            Ok(previous) => previous,
            Err(err) => panic!("{}", err),
        }
    }

    /// Assign an attribute, returning the previous value if there was one.
    ///
    /// Attribute names are path segments, so they must be identifiers
    /// (`[A-Za-z_][A-Za-z0-9_]*`); anything else is a `MalformedPath`.
    pub fn try_set(&self, name: impl Into<String>, value: impl Into<Value>) -> PathResult<Option<Value>> {
        let name = name.into();
        if !is_identifier(&name) {
            return Err(PathError::malformed(&name, "attribute name is not an identifier"));
        }
        let value = value.into();
        let mut data = self.data.write();
        if let Some((_, slot)) = data.attrs.iter_mut().find(|(n, _)| *n == name) {
            return Ok(Some(std::mem::replace(slot, value)));
        }
        data.attrs.push((name, value));
        Ok(None)
    }

    /// Builder-style `set`. Panics on the same names as [`Module::set`].
    pub fn with(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Remove an attribute.
    pub fn remove(&self, name: &str) -> Option<Value> {
        let mut data = self.data.write();
        let pos = data.attrs.iter().position(|(n, _)| n == name)?;
        Some(data.attrs.remove(pos).1)
    }

    /// Attribute names in insertion order.
    pub fn attribute_names(&self) -> Vec<String> {
        self.data.read().attrs.iter().map(|(n, _)| n.clone()).collect()
    }

    /// Snapshot of `(name, value)` pairs in insertion order.
    ///
    /// Values are handles, so the snapshot is a view over live nodes; only the
    /// attribute list itself is copied.
    pub fn attributes(&self) -> Vec<(String, Value)> {
        self.data.read().attrs.clone()
    }

    /// Get the number of attributes.
    pub fn attribute_count(&self) -> usize {
        self.data.read().attrs.len()
    }

    /// True if both handles refer to the same module.
    pub fn ptr_eq(&self, other: &Module) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// Chains of sole-owner modules are released iteratively so dropping a very
/// deep tree does not recurse once per level.
impl Drop for ModuleData {
    fn drop(&mut self) {
        let mut orphans: Vec<Value> = self.attrs.drain(..).map(|(_, v)| v).collect();
        while let Some(value) = orphans.pop() {
            if let Value::Module(Module { data, .. }) = value {
                if let Some(lock) = Arc::into_inner(data) {
                    let mut inner = lock.into_inner();
                    orphans.extend(inner.attrs.drain(..).map(|(_, v)| v));
                }
            }
        }
    }
}

impl Default for Module {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Module {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Module {}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.read();
        f.debug_struct(&data.label)
            .field("id", &self.id)
            .field("compiled", &data.compiled)
            .field(
                "attrs",
                &data.attrs.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
