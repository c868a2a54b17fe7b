//! Container Walker
//!
//! Classifies a value and enumerates how to re-enter whatever is nested in it:
//! - Module, Parameter, scalars, opaque payloads: not expanded
//! - List / Tuple: `(Index(i), element)` in index order
//! - Map: `(Key(k), value)` in insertion order
//!
//! `walk_nested` applies `expand` repeatedly so a list of maps of tuples of
//! modules resolves to one suffix per module.

use smallvec::SmallVec;
use tracing::{trace, warn};

use super::path::{is_identifier, PathStep};
use super::value::{NodeId, NodeKind, Value};

/// Children of one container level.
pub type Children = smallvec::IntoIter<[(PathStep, Value); 4]>;

/// How mapping keys are rendered in suffixes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyStyle {
    /// `[key]` for identifier keys, `['k y']` otherwise.
    Bare,
    /// Always `['key']`.
    Quoted,
}

/// Enumerate the direct children of a container value.
///
/// The returned pairs are handles to live nodes; only the container's slot list
/// is snapshotted, so no lock is held while the caller iterates.
pub fn expand(value: &Value) -> Children {
    let children: SmallVec<[(PathStep, Value); 4]> = match value {
        Value::List(list) => list
            .snapshot()
            .into_iter()
            .enumerate()
            .map(|(i, v)| (PathStep::Index(i), v))
            .collect(),
        Value::Tuple(tuple) => tuple
            .items()
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, v)| (PathStep::Index(i), v))
            .collect(),
        Value::Map(map) => map
            .snapshot()
            .into_iter()
            .map(|(k, v)| (PathStep::Key(k), v))
            .collect(),
        _ => SmallVec::new(),
    };
    children.into_iter()
}

/// Render a step as a suffix appended to a path.
pub fn suffix(step: &PathStep, style: KeyStyle) -> String {
    match (step, style) {
        (PathStep::Key(k), KeyStyle::Bare) if is_identifier(k) => format!("[{}]", k),
        _ => step.render(),
    }
}

/// One container being expanded by `walk_nested`.
struct Frame {
    id: NodeId,
    children: Children,
    /// Suffix length before this container's own step was appended.
    len: usize,
}

/// Descend through nested containers below `value`, calling `visit` with the
/// accumulated suffix for every non-container value found (including `value`
/// itself when it is not a container).
///
/// A container already being expanded further up the current descent is not
/// re-entered, so self-containing containers terminate. Descent uses an
/// explicit frame stack, so nesting depth is bounded only by memory.
pub fn walk_nested<F>(value: &Value, style: KeyStyle, visit: &mut F)
where
    F: FnMut(&str, &Value),
{
    let mut path = String::new();
    let mut stack: Vec<Frame> = Vec::new();
    enter(value, 0, &mut path, &mut stack, visit);

    while let Some(frame) = stack.last_mut() {
        let Some((step, child)) = frame.children.next() else {
            if let Some(done) = stack.pop() {
                path.truncate(done.len);
            }
            continue;
        };
        let len = path.len();
        path.push_str(&suffix(&step, style));
        trace!(target: "modtree::walker", suffix = path.as_str(), kind = ?child.kind(), "Expanded");
        if !enter(&child, len, &mut path, &mut stack, visit) {
            path.truncate(len);
        }
    }
}

/// Push a frame for `value` if it is a container not already on the stack,
/// otherwise hand it to `visit`. Returns true if a frame was pushed.
fn enter<F>(value: &Value, len: usize, path: &mut String, stack: &mut Vec<Frame>, visit: &mut F) -> bool
where
    F: FnMut(&str, &Value),
{
    match (value.kind(), value.node_id()) {
        (NodeKind::Sequence | NodeKind::Mapping, Some(id)) => {
            if stack.iter().any(|frame| frame.id == id) {
                warn!(target: "modtree::walker", %id, suffix = path.as_str(), "Container contains itself; not re-entered");
                return false;
            }
            stack.push(Frame {
                id,
                children: expand(value),
                len,
            });
            true
        }
        _ => {
            visit(path.as_str(), value);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::module::Module;
    use crate::registry::value::List;

    fn collect(value: &Value, style: KeyStyle) -> Vec<(String, Value)> {
        let mut out = Vec::new();
        walk_nested(value, style, &mut |s: &str, v: &Value| out.push((s.to_string(), v.clone())));
        out
    }

    #[test]
    fn test_expand_leaves() {
        assert_eq!(expand(&Value::Int(3)).count(), 0);
        assert_eq!(expand(&Value::from(Module::new())).count(), 0);
        assert_eq!(expand(&Value::opaque(42u32)).count(), 0);
    }

    #[test]
    fn test_expand_sequence_in_order() {
        let value = Value::tuple([Value::Int(1), Value::Int(2)]);
        let steps: Vec<PathStep> = expand(&value).map(|(s, _)| s).collect();
        assert_eq!(steps, vec![PathStep::Index(0), PathStep::Index(1)]);
    }

    #[test]
    fn test_expand_mapping() {
        let value = Value::map([("b", Value::Int(1)), ("a", Value::Int(2))]);
        let steps: Vec<PathStep> = expand(&value).map(|(s, _)| s).collect();
        assert_eq!(
            steps,
            vec![PathStep::Key("b".to_string()), PathStep::Key("a".to_string())]
        );
    }

    #[test]
    fn test_suffix_styles() {
        let key = PathStep::Key("key".to_string());
        let odd = PathStep::Key("two words".to_string());
        assert_eq!(suffix(&key, KeyStyle::Bare), "[key]");
        assert_eq!(suffix(&key, KeyStyle::Quoted), "['key']");
        assert_eq!(suffix(&odd, KeyStyle::Bare), "['two words']");
        assert_eq!(suffix(&PathStep::Index(4), KeyStyle::Bare), "[4]");
    }

    #[test]
    fn test_walk_nested_mixed_containers() {
        let a = Module::new();
        let b = Module::new();
        let c = Module::new();
        let value = Value::list([
            Value::from(&a),
            Value::map([("key", Value::tuple([Value::from(&b), Value::from(&c)]))]),
        ]);
        let found = collect(&value, KeyStyle::Bare);
        let suffixes: Vec<&str> = found.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(suffixes, vec!["[0]", "[1][key][0]", "[1][key][1]"]);
        assert!(found[2].1.same(&Value::from(&c)));
    }

    #[test]
    fn test_walk_nested_visits_plain_value() {
        let found = collect(&Value::Int(1), KeyStyle::Bare);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "");
    }

    #[test]
    fn test_walk_nested_self_containing_list() {
        let list = List::new();
        list.push(Value::Int(1));
        list.push(Value::List(list.clone()));
        let found = collect(&Value::List(list), KeyStyle::Bare);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "[0]");
    }

    #[test]
    fn test_walk_nested_deep_nesting() {
        let leaf = Module::new();
        let mut value = Value::from(&leaf);
        for _ in 0..20_000 {
            value = Value::list([value]);
        }
        let found = collect(&value, KeyStyle::Bare);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0, "[0]".repeat(20_000));
        assert!(found[0].1.same(&Value::from(&leaf)));
        // Unwind the nesting level by level before it is dropped.
        while let Value::List(list) = value {
            value = list.get(0).unwrap_or(Value::None);
        }
    }

    #[test]
    fn test_walk_nested_sibling_alias_is_walked_twice() {
        let inner = List::from_iter([Value::Int(1)]);
        let value = Value::list([Value::List(inner.clone()), Value::List(inner)]);
        let found = collect(&value, KeyStyle::Bare);
        let suffixes: Vec<&str> = found.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(suffixes, vec!["[0][0]", "[1][0]"]);
    }
}
