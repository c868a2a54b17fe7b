//! modtree - Module-Tree Registry
//!
//! Organizes composable computation units ("modules") into a hierarchy and
//! addresses every reachable node by a stable path.
//!
//! # Architecture
//!
//! 1. **Registry** (`registry` module)
//!    - `Module` nodes hold an insertion-ordered attribute bag
//!    - Attributes may be modules, parameters, or lists / tuples / maps of them,
//!      nested to any depth, with aliasing and cycles allowed
//!    - `named_sub_modules` discovers every module edge (duplicates kept)
//!    - `named_predictors` collects parameters, deduplicated by identity
//!    - `set_attribute_by_name` mutates any reachable node through a path string
//!
//! 2. **Forward contract** (`predict` module)
//!    - `Predict` parameters with `"inputs -> outputs"` signatures
//!    - `LanguageModel` backend seam and the deterministic `DummyLm`
//!
//! # Example
//!
//! ```rust
//! use modtree::{Module, Predict, Value};
//!
//! let root = Module::new();
//! root.set("hop", Module::new().with("predict1", Predict::param("question -> query").unwrap()));
//! root.set("branches", Value::list([Value::from(Module::new())]));
//!
//! let names: Vec<String> = root.named_sub_modules().map(|(name, _)| name).collect();
//! assert_eq!(names, vec!["self", "self.hop", "self.branches[0]"]);
//!
//! let params = root.named_parameters();
//! assert_eq!(params[0].0, "hop.predict1");
//!
//! root.set_attribute_by_name("branches[0].marker", true).unwrap();
//! ```
//!
//! # Path Syntax
//!
//! - `name.other` - attribute access
//! - `[3]` - sequence index
//! - `['key']` / `["key"]` / `[key]` - mapping key
//! - a leading `self` refers to the root module

pub mod predict;
pub mod registry;

pub use predict::{DummyLm, Example, Forward, ForwardError, LanguageModel, Predict, Signature};
pub use registry::{
    get_attribute_by_name, parse_path, set_attribute_by_name, List, Map, Module, ModulePath,
    NamedSubModules, NodeId, NodeKind, ParamRef, Parameter, PathError, PathResult, PathStep,
    Tuple, Value, WalkOptions,
};
