//! Attribute Path Setter
//!
//! Applies a parsed path to a module tree. All but the last step are resolved
//! by reading; the last step is a mutation of exactly one node. Because every
//! handle is shared, the change is visible through all aliases.
//!
//! A leading `self` step denotes the root, so any name produced by
//! `named_sub_modules` can be extended and passed back in.

use tracing::debug;

use super::error::{PathError, PathResult};
use super::module::Module;
use super::path::{parse_path, ModulePath, PathStep};
use super::value::Value;

const ROOT_NAME: &str = "self";

/// A resolved assignment target: the value owning the final step, already
/// checked to accept it.
pub(crate) struct Slot {
    path: String,
    at: String,
    target: Value,
    last: PathStep,
}

impl Slot {
    /// Write `value` into the slot.
    pub(crate) fn assign(self, value: Value) -> PathResult<()> {
        match (&self.last, &self.target) {
            (PathStep::Attr(name), Value::Module(module)) => {
                module.try_set(name.clone(), value)?;
            }
            (PathStep::Index(i), Value::List(list)) => {
                // The list may have shrunk since the slot was resolved.
                if !list.set(*i, value) {
                    return Err(PathError::resolution(
                        &self.path,
                        self.at,
                        format!("index {} out of range for list of length {}", i, list.len()),
                    ));
                }
            }
            (PathStep::Key(key), Value::Map(map)) => {
                map.insert(key.clone(), value);
            }
            (step, other) => {
                return Err(PathError::resolution(&self.path, self.at, mismatch(step, other)));
            }
        }
        debug!(target: "modtree::setter", path = self.path.as_str(), "Attribute set");
        Ok(())
    }
}

/// Resolve everything but the final step of `path` and check that the final
/// step can be written, without mutating anything.
pub(crate) fn resolve_slot(root: &Module, path: &str) -> PathResult<Slot> {
    let parsed = parse_path(path)?;
    let Some((last, init)) = parsed.split_last() else {
        return Err(PathError::malformed(path, "empty path"));
    };
    if init.is_empty() && is_root_step(last) {
        return Err(PathError::resolution(path, ROOT_NAME, "cannot replace the root module"));
    }

    let target = resolve_steps(root, path, &parsed, init.len())?;
    let at = parsed.render_prefix(parsed.len());

    match (last, &target) {
        (PathStep::Attr(_), Value::Module(_)) | (PathStep::Key(_), Value::Map(_)) => {}
        (PathStep::Index(i), Value::List(list)) => {
            if *i >= list.len() {
                return Err(PathError::resolution(
                    path,
                    at,
                    format!("index {} out of range for list of length {}", i, list.len()),
                ));
            }
        }
        (PathStep::Index(_), Value::Tuple(_)) => return Err(PathError::immutable(path, at)),
        (step, other) => {
            return Err(PathError::resolution(path, at, mismatch(step, other)));
        }
    }

    Ok(Slot {
        path: path.to_string(),
        at,
        target,
        last: last.clone(),
    })
}

/// Set the value addressed by `path` below `root`.
///
/// # Errors
/// - `MalformedPath` if `path` does not parse
/// - `PathResolution` if an intermediate step is missing or mismatched, or the
///   final step does not fit the resolved value
/// - `ImmutableContainer` if the final step indexes into a tuple
pub fn set_attribute_by_name(root: &Module, path: &str, value: Value) -> PathResult<()> {
    resolve_slot(root, path)?.assign(value)
}

/// Read the value addressed by `path` below `root`. A bare `self` yields the root.
pub fn get_attribute_by_name(root: &Module, path: &str) -> PathResult<Value> {
    let parsed = parse_path(path)?;
    resolve_steps(root, path, &parsed, parsed.len())
}

fn is_root_step(step: &PathStep) -> bool {
    matches!(step, PathStep::Attr(name) if name == ROOT_NAME)
}

/// Resolve the first `count` steps of `parsed`, starting at `root`.
fn resolve_steps(root: &Module, path: &str, parsed: &ModulePath, count: usize) -> PathResult<Value> {
    let mut current = Value::Module(root.clone());
    for (i, step) in parsed.steps()[..count].iter().enumerate() {
        if i == 0 && is_root_step(step) {
            continue;
        }
        current = step_into(&current, step)
            .map_err(|reason| PathError::resolution(path, parsed.render_prefix(i + 1), reason))?;
    }
    Ok(current)
}

fn step_into(value: &Value, step: &PathStep) -> Result<Value, String> {
    match (step, value) {
        (PathStep::Attr(name), Value::Module(module)) => module
            .get(name)
            .ok_or_else(|| format!("{} has no attribute '{}'", module.label(), name)),
        (PathStep::Index(i), Value::List(list)) => list
            .get(*i)
            .ok_or_else(|| format!("index {} out of range for list of length {}", i, list.len())),
        (PathStep::Index(i), Value::Tuple(tuple)) => tuple
            .get(*i)
            .ok_or_else(|| format!("index {} out of range for tuple of length {}", i, tuple.len())),
        (PathStep::Key(key), Value::Map(map)) => {
            map.get(key).ok_or_else(|| format!("no key '{}'", key))
        }
        (step, other) => Err(mismatch(step, other)),
    }
}

fn mismatch(step: &PathStep, value: &Value) -> String {
    match step {
        PathStep::Attr(name) => format!("cannot access attribute '{}' on {}", name, value.type_name()),
        PathStep::Index(i) => format!("cannot index [{}] into {}", i, value.type_name()),
        PathStep::Key(key) => format!("cannot look up key '{}' in {}", key, value.type_name()),
    }
}

impl Module {
    /// See [`set_attribute_by_name`].
    pub fn set_attribute_by_name(&self, path: &str, value: impl Into<Value>) -> PathResult<()> {
        set_attribute_by_name(self, path, value.into())
    }

    /// See [`get_attribute_by_name`].
    pub fn get_attribute_by_name(&self, path: &str) -> PathResult<Value> {
        get_attribute_by_name(self, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::value::{List, Map};

    fn marker(root: &Module, path: &str) -> Option<bool> {
        get_attribute_by_name(root, path).ok().and_then(|v| v.as_bool())
    }

    #[test]
    fn test_set_top_level_attribute() {
        let root = Module::new();
        set_attribute_by_name(&root, "test_attrib", Value::Bool(true)).unwrap();
        assert_eq!(root.get("test_attrib").and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn test_leading_self_is_root() {
        let root = Module::new().with("sub", Module::new());
        root.set_attribute_by_name("self.sub.marker", true).unwrap();
        assert_eq!(marker(&root, "sub.marker"), Some(true));
        assert!(get_attribute_by_name(&root, "self")
            .unwrap()
            .same(&Value::from(&root)));
    }

    #[test]
    fn test_cannot_replace_root() {
        let root = Module::new();
        let err = root.set_attribute_by_name("self", true).unwrap_err();
        assert!(matches!(err, PathError::PathResolution { .. }));
    }

    #[test]
    fn test_assign_into_list_and_map() {
        let list = List::from_iter([Value::Int(0), Value::Int(1)]);
        let map = Map::new();
        let root = Module::new().with("items", list.clone()).with("table", map.clone());

        root.set_attribute_by_name("items[1]", 9i64).unwrap();
        root.set_attribute_by_name("table['new key']", "v").unwrap();

        assert!(list.get(1).is_some_and(|v| v.same(&Value::Int(9))));
        assert_eq!(map.get("new key").and_then(|v| v.as_str().map(String::from)), Some("v".to_string()));
    }

    #[test]
    fn test_list_index_out_of_range() {
        let root = Module::new().with("items", Value::list([Value::Int(0)]));
        let err = root.set_attribute_by_name("items[3]", 1i64).unwrap_err();
        match err {
            PathError::PathResolution { at, .. } => assert_eq!(at, "items[3]"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_tuple_is_immutable() {
        let root = Module::new().with("pair", Value::tuple([Value::Int(0), Value::Int(1)]));
        let err = root.set_attribute_by_name("pair[0]", 5i64).unwrap_err();
        assert!(matches!(err, PathError::ImmutableContainer { .. }));
    }

    #[test]
    fn test_tuple_element_is_still_mutable() {
        let inner = Module::new();
        let root = Module::new().with("pair", Value::tuple([Value::from(&inner)]));
        root.set_attribute_by_name("pair[0].marker", true).unwrap();
        assert_eq!(inner.get("marker").and_then(|v| v.as_bool()), Some(true));
    }

    #[test]
    fn test_missing_attribute() {
        let root = Module::new().with("sub", Module::new());
        let err = root.set_attribute_by_name("sub.missing.marker", true).unwrap_err();
        match err {
            PathError::PathResolution { at, reason, .. } => {
                assert_eq!(at, "sub.missing");
                assert!(reason.contains("missing"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_type_mismatches() {
        let root = Module::new()
            .with("sub", Module::new())
            .with("items", Value::list([Value::Int(0)]))
            .with("name", "x");

        for path in ["sub[0].x", "items['k'].x", "items.x", "name.x", "sub[0]", "items['k']", "name.x.y"] {
            let err = root.set_attribute_by_name(path, true).unwrap_err();
            assert!(
                matches!(err, PathError::PathResolution { .. }),
                "expected PathResolution for {}, got {:?}",
                path,
                err
            );
        }
    }

    #[test]
    fn test_malformed_path_is_reported() {
        let root = Module::new();
        let err = root.set_attribute_by_name("sub[0", true).unwrap_err();
        assert!(matches!(err, PathError::MalformedPath { .. }));
    }

    #[test]
    fn test_mutation_visible_through_alias() {
        let shared = Module::new();
        let root = Module::new().with("a", &shared).with("b", &shared);
        root.set_attribute_by_name("a.marker", true).unwrap();
        assert_eq!(marker(&root, "b.marker"), Some(true));
    }
}
