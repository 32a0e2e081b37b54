//! # Layoutsmith Relations
//!
//! Relation paths and the pickers built over them.
//!
//! ## Core Concepts
//!
//! - **RelationPath**: A route from the current row across foreign and
//!   inbound keys, with a canonical dotted string form
//! - **SchemaSnapshot**: The tables and keys a path is checked against
//! - **RelationGraph**: The permitted paths of one table folded into a tree
//! - **RelationPicker**: Flyout-menu selection over a graph, eager or on demand
//!

pub mod cache;
pub mod graph;
pub mod path;
pub mod picker;
pub mod schema;

pub use cache::RelationGraphCache;
pub use graph::{Branch, RejectedPath, RelationGraph, RelationGraphNode};
pub use path::{
    CURRENT_ROW, LegacyPrefix, PathContext, RelationHop, RelationKind, RelationPath, parse, render,
};
pub use picker::{
    DEFAULT_MAX_DEPTH, EagerPicker, MenuItem, MenuStack, NodeAddress, OnDemandPicker, OnSelect,
    RelationPicker, menu_label,
};
pub use schema::{ForeignKey, SchemaSnapshot, TableSchema};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
