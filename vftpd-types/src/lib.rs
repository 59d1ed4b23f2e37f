//! The permission lattice, the access-tree data model built on top of it,
//! and the [`TreeBuilder`] that turns a parsed access-map [`Value`] into a
//! forest of per-principal trees.

mod permission;
mod tree;
mod builder;

pub use builder::{build_forest, TreeBuildError};
pub use permission::Permission;
pub use tree::{AccessForest, AccessNode, AccessTree};
