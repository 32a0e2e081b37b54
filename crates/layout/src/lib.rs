//! # Layoutsmith Layout
//!
//! The stored layout tree and its translation to and from a visual editor.
//!
//! ## Core Concepts
//!
//! - **LayoutSegment**: The declarative layout tree the server stores
//! - **EditorGraph**: The node graph of a visual editor; [`Document`] is the
//!   in-memory implementation
//! - **Serializer**: [`to_layout`] and [`to_nodes`] translate between the two
//! - **ArrayManager**: Adds, deletes and moves the slots of columns, tabs,
//!   tables and list columns
//! - **EditingSession**: One open editor with its previews, relation graphs
//!   and configuration
//!
//! ## Example
//!
//! ```rust,ignore
//! use layoutsmith_layout::{Document, EditorGraph, LayoutSegment, to_layout, to_nodes};
//!
//! let mut doc = Document::new();
//! let root = doc.root_id().to_string();
//! to_nodes(&mut doc, &layout, &root, None)?;
//! let output = to_layout(&doc, &root)?;
//! assert_eq!(output.layout, layout.normalized());
//! ```

pub mod array_manager;
pub mod column;
pub mod config;
pub mod editor;
pub mod kinds;
pub mod payload;
pub mod preview;
pub mod segment;
pub mod serialization;
pub mod serializer;
pub mod session;
pub mod validation;

pub use array_manager::{ArrayManager, ArrayOp, Direction, SlotArray, SlotControls};
pub use column::{ColumnKind, ColumnSpec};
pub use config::{BuilderConfig, FieldChoice, RoleChoice};
pub use editor::{Document, EditorGraph, EditorNode, NodeDescriptor};
pub use kinds::{CANVAS_TYPE, CONTAINER_TYPE, ComponentKind, LeafKind, SlotKind};
pub use payload::{SavePayload, SaveRequest, SaveTarget, SnippetPayload};
pub use preview::{Preview, PreviewStore, PreviewTicket};
pub use segment::{Container, LayoutSegment, Leaf, MultiSlot};
pub use serialization::{
    LAYOUT_EXTENSION, LayoutFile, ensure_extension, load_layout, load_layout_from_string,
    save_layout, save_layout_to_string,
};
pub use serializer::{LayoutOutput, descriptor_for, to_layout, to_nodes};
pub use session::EditingSession;
pub use validation::{IssueCode, ValidationIssue, ValidationResult, ValidationRule, Validator};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
