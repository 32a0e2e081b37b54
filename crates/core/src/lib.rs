//! # Layoutsmith Core
//!
//! Core types, traits, and error handling for layoutsmith.
//!
//! This crate provides the foundational building blocks used by the relation,
//! layout and CLI crates, including:
//!
//! - **Types**: Editor node identifiers, component props, edit modes
//! - **Traits**: Common behaviors like `Validatable` and `Persistable`
//! - **Errors**: Unified error handling with `BuilderError` and `BuilderResult`
//!

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use error::{BuilderError, BuilderResult, ResultExt};
pub use traits::{Persistable, Validatable};
pub use types::{
    EditMode, NodeId, Props, ROOT_NODE_ID, new_node_id, prop_str, prop_usize,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
