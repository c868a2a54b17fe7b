//! Attribute Values
//!
//! Everything a module attribute can hold. Modules, parameters and the mutable
//! containers are shared handles: cloning a `Value` clones the handle, never the
//! node, so a mutation through one path is visible through every alias.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::module::Module;
use super::parameter::ParamRef;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a node in the object graph.
///
/// Assigned once, at construction, from a process-wide counter. Two handles
/// refer to the same node exactly when their ids are equal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Structural classification used by the container walker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    Sequence,
    Mapping,
    Parameter,
    Opaque,
}

/// A value stored in a module attribute or a container slot.
#[derive(Clone)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Module(Module),
    Parameter(ParamRef),
    List(List),
    Tuple(Tuple),
    Map(Map),
    /// Anything else. Never expanded by the walker.
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Build a mutable list value.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(List::from_iter(items))
    }

    /// Build an immutable tuple value.
    pub fn tuple<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::Tuple(Tuple::new(items.into_iter().collect()))
    }

    /// Build a mapping value; later duplicate keys replace earlier ones.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map = Map::new();
        for (k, v) in entries {
            map.insert(k, v);
        }
        Value::Map(map)
    }

    /// Wrap an arbitrary payload as an opaque leaf.
    pub fn opaque<T: Any + Send + Sync>(payload: T) -> Self {
        Value::Opaque(Arc::new(payload))
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Value::Module(_) => NodeKind::Module,
            Value::Parameter(_) => NodeKind::Parameter,
            Value::List(_) | Value::Tuple(_) => NodeKind::Sequence,
            Value::Map(_) => NodeKind::Mapping,
            Value::None
            | Value::Bool(_)
            | Value::Int(_)
            | Value::Float(_)
            | Value::Str(_)
            | Value::Opaque(_) => NodeKind::Opaque,
        }
    }

    /// Short type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Module(_) => "module",
            Value::Parameter(_) => "parameter",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "map",
            Value::Opaque(_) => "opaque",
        }
    }

    /// Identity of the underlying node, for handle variants.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Value::Module(m) => Some(m.id()),
            Value::Parameter(p) => Some(p.id()),
            Value::List(l) => Some(l.id()),
            Value::Tuple(t) => Some(t.id()),
            Value::Map(m) => Some(m.id()),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&Module> {
        match self {
            Value::Module(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_parameter(&self) -> Option<&ParamRef> {
        match self {
            Value::Parameter(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// True when both values are the same node (handles) or equal scalars.
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => match (self.node_id(), other.node_id()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl fmt::Debug for Value {
    // Containers print their identity only; the graph may be cyclic.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Module(m) => write!(f, "{:?}", m),
            Value::Parameter(p) => write!(f, "{:?}", p),
            Value::List(l) => write!(f, "List({}, len={})", l.id(), l.len()),
            Value::Tuple(t) => write!(f, "Tuple({}, len={})", t.id(), t.len()),
            Value::Map(m) => write!(f, "Map({}, len={})", m.id(), m.len()),
            Value::Opaque(_) => write!(f, "Opaque"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Module> for Value {
    fn from(m: Module) -> Self {
        Value::Module(m)
    }
}

impl From<&Module> for Value {
    fn from(m: &Module) -> Self {
        Value::Module(m.clone())
    }
}

impl From<ParamRef> for Value {
    fn from(p: ParamRef) -> Self {
        Value::Parameter(p)
    }
}

impl From<List> for Value {
    fn from(l: List) -> Self {
        Value::List(l)
    }
}

impl From<Tuple> for Value {
    fn from(t: Tuple) -> Self {
        Value::Tuple(t)
    }
}

impl From<Map> for Value {
    fn from(m: Map) -> Self {
        Value::Map(m)
    }
}

/// Mutable, ordered, 0-indexed sequence.
#[derive(Clone)]
pub struct List {
    id: NodeId,
    items: Arc<RwLock<Vec<Value>>>,
}

impl List {
    pub fn new() -> Self {
        Self {
            id: NodeId::fresh(),
            items: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.read().get(index).cloned()
    }

    /// Replace the element at `index`. Returns false when out of range.
    pub fn set(&self, index: usize, value: Value) -> bool {
        match self.items.write().get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn push(&self, value: Value) {
        self.items.write().push(value);
    }

    /// Copy of the current element handles.
    pub fn snapshot(&self) -> Vec<Value> {
        self.items.read().clone()
    }

    pub fn ptr_eq(&self, other: &List) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl Default for List {
    fn default() -> Self {
        Self::new()
    }
}

impl FromIterator<Value> for List {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            id: NodeId::fresh(),
            items: Arc::new(RwLock::new(iter.into_iter().collect())),
        }
    }
}

/// Immutable, ordered, 0-indexed sequence. Elements may still be mutable handles.
#[derive(Clone)]
pub struct Tuple {
    id: NodeId,
    items: Arc<[Value]>,
}

impl Tuple {
    pub fn new(items: Vec<Value>) -> Self {
        Self {
            id: NodeId::fresh(),
            items: items.into(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.items.get(index).cloned()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }
}

/// Mapping from string keys to values.
///
/// Entries keep insertion order, so names derived from a map are reproducible;
/// replacing an existing key keeps its position.
#[derive(Clone)]
pub struct Map {
    id: NodeId,
    entries: Arc<RwLock<Vec<(String, Value)>>>,
}

impl Map {
    pub fn new() -> Self {
        Self {
            id: NodeId::fresh(),
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .read()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.read().iter().any(|(k, _)| k == key)
    }

    /// Insert or replace; returns the previous value for `key`.
    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        let mut entries = self.entries.write();
        if let Some((_, slot)) = entries.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(slot, value));
        }
        entries.push((key, value));
        None
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.write();
        let pos = entries.iter().position(|(k, _)| k == key)?;
        Some(entries.remove(pos).1)
    }

    pub fn keys(&self) -> Vec<String> {
        self.entries.read().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Copy of the current entries, in insertion order.
    pub fn snapshot(&self) -> Vec<(String, Value)> {
        self.entries.read().clone()
    }

    pub fn ptr_eq(&self, other: &Map) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_ids_are_unique() {
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        assert_ne!(a, b);
        assert!(b.value() > a.value());
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(Value::from(Module::new()).kind(), NodeKind::Module);
        assert_eq!(Value::list([]).kind(), NodeKind::Sequence);
        assert_eq!(Value::tuple([]).kind(), NodeKind::Sequence);
        assert_eq!(Value::map::<&str, _>([]).kind(), NodeKind::Mapping);
        assert_eq!(Value::from("x").kind(), NodeKind::Opaque);
        assert_eq!(Value::opaque(vec![1u8, 2]).kind(), NodeKind::Opaque);
    }

    #[test]
    fn test_list_clone_shares_storage() {
        let list = List::from_iter([Value::Int(1)]);
        let alias = list.clone();
        alias.push(Value::Int(2));
        assert_eq!(list.len(), 2);
        assert!(list.ptr_eq(&alias));
        assert!(list.set(0, Value::Int(7)));
        assert!(!list.set(5, Value::Int(7)));
        assert!(alias.get(0).is_some_and(|v| v.same(&Value::Int(7))));
    }

    #[test]
    fn test_map_keeps_insertion_order() {
        let map = Map::new();
        map.insert("b", Value::Int(1));
        map.insert("a", Value::Int(2));
        map.insert("b", Value::Int(3));
        assert_eq!(map.keys(), vec!["b".to_string(), "a".to_string()]);
        assert!(map.get("b").is_some_and(|v| v.same(&Value::Int(3))));
        assert!(map.remove("b").is_some());
        assert!(!map.contains_key("b"));
    }

    #[test]
    fn test_same_is_identity_for_handles() {
        let m = Module::new();
        let a = Value::from(&m);
        let b = Value::from(&m);
        assert!(a.same(&b));
        assert!(!a.same(&Value::from(Module::new())));
        assert!(!Value::list([]).same(&Value::list([])));
    }
}
