//! Component kinds
//!
//! Every editor node type maps to exactly one [`ComponentKind`], and every
//! layout `type` tag maps to exactly one leaf, container or slot kind. The
//! mapping is a closed match in both directions: a name with no adapter is
//! reported as `UnmappedLeafVariant` instead of falling through to some
//! other component.

use crate::column::ColumnKind;
use layoutsmith_core::{BuilderError, BuilderResult, EditMode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Editor type of plain canvases (the root and every slot body)
pub const CANVAS_TYPE: &str = "Canvas";

/// Editor type of the container component
pub const CONTAINER_TYPE: &str = "Container";

/// Layout tag of the container component
pub const CONTAINER_TAG: &str = "container";

// ============================================================================
// LeafKind
// ============================================================================

/// Components without child content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    /// Static text
    #[serde(rename = "blank")]
    Text,
    /// A field of the current row
    Field,
    /// A field reached through a relation
    JoinField,
    /// A link to another view
    ViewLink,
    /// A button running an action
    Action,
    LineBreak,
    Image,
    Link,
    /// Raw HTML markup
    RawHtml,
    /// An aggregate over related rows
    Aggregation,
    /// An embedded view
    View,
    /// An embedded page
    Page,
    SearchBar,
    DropdownFilter,
    ToggleFilter,
}

impl LeafKind {
    /// Get all leaf kinds
    pub fn all() -> &'static [LeafKind] {
        &[
            LeafKind::Text,
            LeafKind::Field,
            LeafKind::JoinField,
            LeafKind::ViewLink,
            LeafKind::Action,
            LeafKind::LineBreak,
            LeafKind::Image,
            LeafKind::Link,
            LeafKind::RawHtml,
            LeafKind::Aggregation,
            LeafKind::View,
            LeafKind::Page,
            LeafKind::SearchBar,
            LeafKind::DropdownFilter,
            LeafKind::ToggleFilter,
        ]
    }

    /// Layout `type` tag
    pub fn tag(&self) -> &'static str {
        match self {
            LeafKind::Text => "blank",
            LeafKind::Field => "field",
            LeafKind::JoinField => "join_field",
            LeafKind::ViewLink => "view_link",
            LeafKind::Action => "action",
            LeafKind::LineBreak => "line_break",
            LeafKind::Image => "image",
            LeafKind::Link => "link",
            LeafKind::RawHtml => "raw_html",
            LeafKind::Aggregation => "aggregation",
            LeafKind::View => "view",
            LeafKind::Page => "page",
            LeafKind::SearchBar => "search_bar",
            LeafKind::DropdownFilter => "dropdown_filter",
            LeafKind::ToggleFilter => "toggle_filter",
        }
    }

    /// Look up a kind by layout tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.tag() == tag)
    }

    /// Editor node type
    pub fn node_type(&self) -> &'static str {
        match self {
            LeafKind::Text => "Text",
            LeafKind::Field => "Field",
            LeafKind::JoinField => "JoinField",
            LeafKind::ViewLink => "ViewLink",
            LeafKind::Action => "Action",
            LeafKind::LineBreak => "LineBreak",
            LeafKind::Image => "Image",
            LeafKind::Link => "Link",
            LeafKind::RawHtml => "HTMLCode",
            LeafKind::Aggregation => "Aggregation",
            LeafKind::View => "View",
            LeafKind::Page => "Page",
            LeafKind::SearchBar => "SearchBar",
            LeafKind::DropdownFilter => "DropDownFilter",
            LeafKind::ToggleFilter => "ToggleFilter",
        }
    }

    /// Look up a kind by editor node type
    pub fn from_node_type(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.node_type() == name)
    }

    /// Get the display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            LeafKind::Text => "Text",
            LeafKind::Field => "Field",
            LeafKind::JoinField => "Join field",
            LeafKind::ViewLink => "View link",
            LeafKind::Action => "Action",
            LeafKind::LineBreak => "Line break",
            LeafKind::Image => "Image",
            LeafKind::Link => "Link",
            LeafKind::RawHtml => "HTML code",
            LeafKind::Aggregation => "Aggregation",
            LeafKind::View => "Embedded view",
            LeafKind::Page => "Embedded page",
            LeafKind::SearchBar => "Search bar",
            LeafKind::DropdownFilter => "Dropdown filter",
            LeafKind::ToggleFilter => "Toggle filter",
        }
    }

    /// Column this leaf contributes to the flat columns list, if any
    pub fn column_kind(&self) -> Option<ColumnKind> {
        match self {
            LeafKind::Field => Some(ColumnKind::Field),
            LeafKind::JoinField => Some(ColumnKind::JoinField),
            LeafKind::ViewLink => Some(ColumnKind::ViewLink),
            LeafKind::Action => Some(ColumnKind::Action),
            _ => None,
        }
    }

    /// Prop holding a relation path string, for relation-capable leaves
    pub fn relation_prop(&self) -> Option<&'static str> {
        match self {
            LeafKind::JoinField => Some("join_field"),
            LeafKind::ViewLink | LeafKind::View | LeafKind::Aggregation => Some("relation"),
            _ => None,
        }
    }

    /// Whether the builder offers this kind in `mode` by default
    pub fn offered_in(&self, mode: EditMode) -> bool {
        match self {
            LeafKind::Field | LeafKind::JoinField | LeafKind::Aggregation => mode.has_row(),
            LeafKind::ViewLink => mode.has_row() || mode == EditMode::Page,
            LeafKind::SearchBar | LeafKind::DropdownFilter | LeafKind::ToggleFilter => {
                matches!(mode, EditMode::Filter | EditMode::Page)
            }
            LeafKind::Page => mode == EditMode::Page,
            _ => true,
        }
    }
}

impl std::fmt::Display for LeafKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// SlotKind
// ============================================================================

/// Components holding an ordered, resizable set of child slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Side-by-side columns (the horizontal split)
    Columns,
    Tabs,
    /// Table rows
    Table,
    /// Columns of a list view
    ListColumns,
}

impl SlotKind {
    /// Get all slot kinds
    pub fn all() -> &'static [SlotKind] {
        &[
            SlotKind::Columns,
            SlotKind::Tabs,
            SlotKind::Table,
            SlotKind::ListColumns,
        ]
    }

    /// Layout `type` tag (columns are written as `besides` instead)
    pub fn tag(&self) -> &'static str {
        match self {
            SlotKind::Columns => "columns",
            SlotKind::Tabs => "tabs",
            SlotKind::Table => "table",
            SlotKind::ListColumns => "list_columns",
        }
    }

    /// Look up a kind by layout tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.tag() == tag)
    }

    /// Editor node type
    pub fn node_type(&self) -> &'static str {
        match self {
            SlotKind::Columns => "Columns",
            SlotKind::Tabs => "Tabs",
            SlotKind::Table => "Table",
            SlotKind::ListColumns => "ListColumns",
        }
    }

    /// Look up a kind by editor node type
    pub fn from_node_type(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|k| k.node_type() == name)
    }

    /// Get the display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            SlotKind::Columns => "Columns",
            SlotKind::Tabs => "Tabs",
            SlotKind::Table => "Table",
            SlotKind::ListColumns => "List columns",
        }
    }

    /// Name of the linked editor child holding slot `index`
    pub fn slot_name(&self, index: usize) -> String {
        let prefix = match self {
            SlotKind::Columns => "Col",
            SlotKind::Tabs => "Tab",
            SlotKind::Table => "Row",
            SlotKind::ListColumns => "ListCol",
        };
        format!("{}{}", prefix, index)
    }

    /// Props that hold one entry per slot
    pub fn per_slot_keys(&self) -> &'static [&'static str] {
        match self {
            SlotKind::Columns => &["widths"],
            SlotKind::Tabs => &["titles", "show_if"],
            SlotKind::Table => &[],
            SlotKind::ListColumns => &["header_labels", "col_widths", "alignments"],
        }
    }

    /// Entry given to a per-slot prop when a slot is added
    pub fn slot_default(&self, key: &str) -> Option<Value> {
        match (self, key) {
            (SlotKind::Columns, "widths") => Some(json!(2)),
            (SlotKind::Tabs, "titles") => Some(json!("Tab")),
            (SlotKind::Tabs, "show_if") => Some(json!("")),
            (SlotKind::ListColumns, "header_labels") => Some(json!("")),
            (SlotKind::ListColumns, "alignments") => Some(json!("Default")),
            _ => None,
        }
    }
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

// ============================================================================
// ComponentKind
// ============================================================================

/// What an editor node is, as far as the serializer is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Plain canvas holding positional children
    Canvas,
    /// Styled wrapper around one canvas of children
    Container,
    Leaf(LeafKind),
    Slots(SlotKind),
}

impl ComponentKind {
    /// Resolve an editor node type
    pub fn resolve(type_name: &str) -> BuilderResult<Self> {
        match type_name {
            CANVAS_TYPE => Ok(ComponentKind::Canvas),
            CONTAINER_TYPE => Ok(ComponentKind::Container),
            other => LeafKind::from_node_type(other)
                .map(ComponentKind::Leaf)
                .or_else(|| SlotKind::from_node_type(other).map(ComponentKind::Slots))
                .ok_or_else(|| BuilderError::UnmappedLeafVariant(other.to_string())),
        }
    }

    /// Editor node type
    pub fn node_type(&self) -> &'static str {
        match self {
            ComponentKind::Canvas => CANVAS_TYPE,
            ComponentKind::Container => CONTAINER_TYPE,
            ComponentKind::Leaf(kind) => kind.node_type(),
            ComponentKind::Slots(kind) => kind.node_type(),
        }
    }

    /// Get the display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            ComponentKind::Canvas => "Canvas",
            ComponentKind::Container => "Container",
            ComponentKind::Leaf(kind) => kind.display_name(),
            ComponentKind::Slots(kind) => kind.display_name(),
        }
    }

    /// Whether nodes of this kind hold positional children
    pub fn is_canvas(&self) -> bool {
        matches!(self, ComponentKind::Canvas | ComponentKind::Container)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_tags_round_trip() {
        for kind in LeafKind::all() {
            assert_eq!(LeafKind::from_tag(kind.tag()), Some(*kind));
            assert_eq!(LeafKind::from_node_type(kind.node_type()), Some(*kind));
            // serde and the manual tag table agree
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                Value::String(kind.tag().to_string())
            );
        }
    }

    #[test]
    fn test_resolve_component() {
        assert_eq!(ComponentKind::resolve("Canvas").unwrap(), ComponentKind::Canvas);
        assert_eq!(
            ComponentKind::resolve("HTMLCode").unwrap(),
            ComponentKind::Leaf(LeafKind::RawHtml)
        );
        assert_eq!(
            ComponentKind::resolve("Tabs").unwrap(),
            ComponentKind::Slots(SlotKind::Tabs)
        );
        let err = ComponentKind::resolve("Carousel").unwrap_err();
        assert!(matches!(err, BuilderError::UnmappedLeafVariant(ref n) if n == "Carousel"));
    }

    #[test]
    fn test_column_kinds() {
        let contributing: Vec<_> = LeafKind::all()
            .iter()
            .filter(|k| k.column_kind().is_some())
            .collect();
        assert_eq!(
            contributing,
            vec![
                &LeafKind::Field,
                &LeafKind::JoinField,
                &LeafKind::ViewLink,
                &LeafKind::Action
            ]
        );
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(SlotKind::Columns.slot_name(0), "Col0");
        assert_eq!(SlotKind::Tabs.slot_name(2), "Tab2");
        assert_eq!(SlotKind::ListColumns.slot_name(1), "ListCol1");
        assert_eq!(SlotKind::from_tag("list_columns"), Some(SlotKind::ListColumns));
    }

    #[test]
    fn test_offered_in_mode() {
        assert!(LeafKind::Field.offered_in(EditMode::Show));
        assert!(!LeafKind::Field.offered_in(EditMode::Page));
        assert!(LeafKind::DropdownFilter.offered_in(EditMode::Filter));
        assert!(!LeafKind::DropdownFilter.offered_in(EditMode::Edit));
        assert!(LeafKind::Text.offered_in(EditMode::Filter));
    }
}
