//! Core types used throughout layoutsmith
//!
//! Identifiers and property bags shared by the relation, layout and editor
//! graph layers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a node in the host editor graph
pub type NodeId = String;

/// Identifier of the root canvas in every editor document
pub const ROOT_NODE_ID: &str = "ROOT";

/// Generate a fresh editor node identifier
pub fn new_node_id() -> NodeId {
    uuid::Uuid::new_v4().simple().to_string()
}

// ============================================================================
// Props
// ============================================================================

/// Free-form component configuration, as snapshotted from the editor
pub type Props = Map<String, Value>;

/// Read a string prop
pub fn prop_str<'a>(props: &'a Props, key: &str) -> Option<&'a str> {
    props.get(key).and_then(Value::as_str)
}

/// Read a non-negative integer prop
pub fn prop_usize(props: &Props, key: &str) -> Option<usize> {
    props
        .get(key)
        .and_then(Value::as_u64)
        .and_then(|n| usize::try_from(n).ok())
}

// ============================================================================
// Edit Mode
// ============================================================================

/// What kind of layout the builder is editing
///
/// The mode decides which leaf components the session offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Read-only presentation of one row
    #[default]
    Show,
    /// Form for editing one row
    Edit,
    /// One row of a list view
    List,
    /// Filter widgets above a list
    Filter,
    /// Free-standing page
    Page,
}

impl EditMode {
    /// Get the display name for this mode
    pub fn display_name(&self) -> &'static str {
        match self {
            EditMode::Show => "Show",
            EditMode::Edit => "Edit",
            EditMode::List => "List",
            EditMode::Filter => "Filter",
            EditMode::Page => "Page",
        }
    }

    /// Whether layouts in this mode are bound to a table row
    pub fn has_row(&self) -> bool {
        matches!(self, EditMode::Show | EditMode::Edit | EditMode::List)
    }
}

impl std::fmt::Display for EditMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// Tests
// ============================================================================
