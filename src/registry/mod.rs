//! Module Tree Registry
//!
//! This module provides the core types and operations of the registry:
//! - `Module` - A node with an insertion-ordered attribute bag and a `compiled` flag
//! - `Parameter` / `ParamRef` - Capability marker and shared handle for tunable leaves
//! - `Value` - Closed set of attribute values (modules, parameters, containers, scalars)
//! - `parse_path` / `ModulePath` - Dotted/bracketed path parsing and rendering
//! - `expand` / `walk_nested` - Container walker
//! - `named_sub_modules` / `named_predictors` - Structural discovery and parameter collection
//! - `set_attribute_by_name` - Path-addressed mutation
//! - `WalkOptions` - Traversal configuration

mod error;
mod module;
mod options;
mod parameter;
mod path;
mod setter;
mod traverse;
mod value;
mod walker;

pub use error::{PathError, PathResult};
pub use module::Module;
pub use options::WalkOptions;
pub use parameter::{ParamRef, Parameter};
pub use path::{is_identifier, parse_path, ModulePath, PathStep};
pub use setter::{get_attribute_by_name, set_attribute_by_name};
pub use traverse::NamedSubModules;
pub use value::{List, Map, NodeId, NodeKind, Tuple, Value};
pub use walker::{expand, suffix, walk_nested, Children, KeyStyle};
