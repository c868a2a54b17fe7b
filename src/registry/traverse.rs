//! Module Tree Traversal
//!
//! Two walks over the same addressing scheme:
//!
//! **Structural discovery** (`named_sub_modules`) reports every module reachable
//! through attributes and nested containers, starting with `("self", root)`.
//! It does not deduplicate by identity: a module reachable over two edges is
//! reported under both paths. Termination comes from a visited-edge set keyed
//! by `(owner, local suffix)`, so each literal attribute/container edge is
//! followed at most once per traversal, which also bounds self-referencing
//! structures.
//!
//! **Parameter collection** (`named_predictors` and friends) reports every
//! parameter exactly once, under the first path met in a depth-first pre-order
//! walk (parent before children, attributes in insertion order, container
//! elements in index/key order). Modules are entered at most once.

use std::collections::HashSet;

use tracing::{debug, trace};

use super::error::PathResult;
use super::module::Module;
use super::options::WalkOptions;
use super::parameter::ParamRef;
use super::setter::resolve_slot;
use super::value::{NodeId, Value};
use super::walker::{walk_nested, KeyStyle};

const ROOT_NAME: &str = "self";

/// Lazy iterator over `(path, module)` pairs, depth-first pre-order.
///
/// Each module's attributes are read when the module is yielded, so the
/// iterator views live nodes rather than a snapshot of the tree.
pub struct NamedSubModules {
    /// Modules still to be yielded; the top is next.
    pending: Vec<(String, Module)>,

    /// Edges already followed: (owning module, attribute name + container suffix).
    edges: HashSet<(NodeId, String)>,

    options: WalkOptions,
}

impl NamedSubModules {
    fn new(root: &Module, options: WalkOptions) -> Self {
        Self {
            pending: vec![(ROOT_NAME.to_string(), root.clone())],
            edges: HashSet::new(),
            options,
        }
    }

    /// Push the not-yet-followed sub-module edges of `module`.
    fn discover(&mut self, path: &str, module: &Module) {
        let mut found = Vec::new();
        for (name, value) in module.attributes() {
            let edges = &mut self.edges;
            walk_nested(&value, KeyStyle::Bare, &mut |suffix: &str, leaf: &Value| {
                if let Value::Module(sub) = leaf {
                    let local = format!("{}{}", name, suffix);
                    let child_path = format!("{}.{}", path, local);
                    if edges.insert((module.id(), local)) {
                        found.push((child_path, sub.clone()));
                    } else {
                        trace!(target: "modtree::traverse", path = child_path.as_str(), "Edge already followed");
                    }
                }
            });
        }
        self.pending.extend(found.into_iter().rev());
    }
}

impl Iterator for NamedSubModules {
    type Item = (String, Module);

    fn next(&mut self) -> Option<Self::Item> {
        let (path, module) = self.pending.pop()?;
        if self.options.skip_compiled && module.is_compiled() {
            trace!(target: "modtree::traverse", path = path.as_str(), "Compiled module not entered");
        } else {
            self.discover(&path, &module);
        }
        trace!(target: "modtree::traverse", path = path.as_str(), id = %module.id(), "Sub-module");
        Some((path, module))
    }
}

/// One module being visited by the parameter collector.
///
/// Each attribute is walked into its parameter and module leaves only when the
/// previous attribute's leaves are used up, which keeps the interleaved
/// pre-order: earlier attributes, then a sub-module's whole subtree, then later
/// attributes.
struct Frame {
    attrs: std::vec::IntoIter<(String, Value)>,
    /// Leaves of the current attribute, keyed by attribute name + suffix.
    leaves: std::vec::IntoIter<(String, Value)>,
    /// Length of the shared path buffer before this module's own segment.
    len: usize,
}

impl Frame {
    fn new(module: &Module, len: usize) -> Self {
        Self {
            attrs: module.attributes().into_iter(),
            leaves: Vec::new().into_iter(),
            len,
        }
    }

    /// Next parameter or module leaf below this module's attributes.
    fn next_leaf(&mut self) -> Option<(String, Value)> {
        loop {
            if let Some(leaf) = self.leaves.next() {
                return Some(leaf);
            }
            let (name, value) = self.attrs.next()?;
            let mut found = Vec::new();
            walk_nested(&value, KeyStyle::Quoted, &mut |suffix: &str, leaf: &Value| {
                if matches!(leaf, Value::Parameter(_) | Value::Module(_)) {
                    found.push((format!("{}{}", name, suffix), leaf.clone()));
                }
            });
            self.leaves = found.into_iter();
        }
    }
}

/// Identity-deduplicating parameter collector.
struct ParamCollector<'a> {
    options: &'a WalkOptions,
    seen_params: HashSet<NodeId>,
    seen_modules: HashSet<NodeId>,
    out: Vec<(String, ParamRef)>,
}

impl<'a> ParamCollector<'a> {
    fn new(options: &'a WalkOptions) -> Self {
        Self {
            options,
            seen_params: HashSet::new(),
            seen_modules: HashSet::new(),
            out: Vec::new(),
        }
    }

    fn collect(&mut self, root: &Module) {
        self.seen_modules.insert(root.id());
        let mut path = String::new();
        let mut stack = vec![Frame::new(root, 0)];

        while let Some(frame) = stack.last_mut() {
            let Some((local, leaf)) = frame.next_leaf() else {
                if let Some(done) = stack.pop() {
                    path.truncate(done.len);
                }
                continue;
            };
            let len = path.len();
            if len > 0 {
                path.push('.');
            }
            path.push_str(&local);

            match leaf {
                Value::Parameter(param) => {
                    if self.seen_params.insert(param.id()) {
                        self.out.push((path.clone(), param));
                    } else {
                        trace!(target: "modtree::traverse", path = path.as_str(), "Parameter already collected");
                    }
                }
                Value::Module(sub) => {
                    if self.options.skip_compiled && sub.is_compiled() {
                        trace!(target: "modtree::traverse", path = path.as_str(), "Compiled module skipped");
                    } else if self.seen_modules.insert(sub.id()) {
                        stack.push(Frame::new(&sub, len));
                        continue;
                    }
                }
                _ => {}
            }
            path.truncate(len);
        }
    }
}

impl Module {
    /// All reachable sub-modules, starting with `("self", self)`.
    ///
    /// Compiled modules are entered; see [`Module::named_sub_modules_with`].
    pub fn named_sub_modules(&self) -> NamedSubModules {
        self.named_sub_modules_with(&WalkOptions::exhaustive())
    }

    /// All reachable sub-modules under the given options.
    pub fn named_sub_modules_with(&self, options: &WalkOptions) -> NamedSubModules {
        NamedSubModules::new(self, options.clone())
    }

    /// `(path, parameter)` for every distinct parameter, paths relative to `self`.
    ///
    /// Compiled sub-modules are frozen and not entered.
    pub fn named_predictors(&self) -> Vec<(String, ParamRef)> {
        self.named_predictors_with(&WalkOptions::default())
    }

    pub fn named_predictors_with(&self, options: &WalkOptions) -> Vec<(String, ParamRef)> {
        let mut collector = ParamCollector::new(options);
        collector.collect(self);
        debug!(
            target: "modtree::traverse",
            root = %self.id(),
            parameters = collector.out.len(),
            modules = collector.seen_modules.len(),
            "Collected parameters"
        );
        collector.out
    }

    /// The parameters of [`Module::named_predictors`], in the same order.
    pub fn predictors(&self) -> Vec<ParamRef> {
        self.named_predictors().into_iter().map(|(_, p)| p).collect()
    }

    /// Parameters are the only parameter-bearing leaves, so this is
    /// [`Module::named_predictors`].
    pub fn named_parameters(&self) -> Vec<(String, ParamRef)> {
        self.named_predictors()
    }

    pub fn parameters(&self) -> Vec<ParamRef> {
        self.predictors()
    }

    /// Replace every predictor with `f(path, predictor)`, writing it back at its
    /// path. The replacement is visible through every alias of the owning node.
    ///
    /// Every target is resolved before `f` is first called, so a predictor
    /// that cannot be written back (one held in a tuple) fails the whole call
    /// with the tree untouched.
    pub fn map_named_predictors<F>(&self, mut f: F) -> PathResult<()>
    where
        F: FnMut(&str, ParamRef) -> ParamRef,
    {
        let targets = self
            .named_predictors()
            .into_iter()
            .map(|(path, param)| resolve_slot(self, &path).map(|slot| (path, param, slot)))
            .collect::<PathResult<Vec<_>>>()?;

        for (path, param, slot) in targets {
            let replacement = f(&path, param);
            slot.assign(Value::Parameter(replacement))?;
        }
        Ok(())
    }
}
