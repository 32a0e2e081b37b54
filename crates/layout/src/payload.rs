//! Payloads produced for the server

use crate::column::ColumnSpec;
use crate::segment::LayoutSegment;
use crate::serializer::LayoutOutput;
use chrono::{DateTime, Utc};
use layoutsmith_core::Persistable;
use serde::{Deserialize, Serialize};

// ============================================================================
// Save payload
// ============================================================================

/// What a save submits: the layout and its columns list
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SavePayload {
    pub columns: Vec<ColumnSpec>,
    pub layout: Option<LayoutSegment>,
}

impl SavePayload {
    /// Create a payload for a layout, deriving its columns
    pub fn from_layout(layout: Option<LayoutSegment>) -> Self {
        let columns = layout.as_ref().map(LayoutSegment::columns).unwrap_or_default();
        Self { columns, layout }
    }
}

impl From<LayoutOutput> for SavePayload {
    fn from(output: LayoutOutput) -> Self {
        Self {
            columns: output.columns,
            layout: output.layout,
        }
    }
}

impl Persistable for SavePayload {
    fn file_extension() -> &'static str {
        "layout.json"
    }
}

/// Where a save goes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SaveTarget {
    View(String),
    Page(String),
}

impl SaveTarget {
    /// Get the display name for this target
    pub fn display_name(&self) -> String {
        match self {
            SaveTarget::View(id) => format!("view {}", id),
            SaveTarget::Page(id) => format!("page {}", id),
        }
    }
}

/// A save ready to submit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub target: SaveTarget,
    pub payload: SavePayload,
    pub requested_at: DateTime<Utc>,
}

// ============================================================================
// Library snippet
// ============================================================================

/// A subtree saved as a reusable library entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnippetPayload {
    pub layout: LayoutSegment,
    #[serde(default)]
    pub icon: String,
    pub name: String,
}

impl SnippetPayload {
    /// Create a snippet
    pub fn new(name: impl Into<String>, icon: impl Into<String>, layout: LayoutSegment) -> Self {
        Self {
            layout,
            icon: icon.into(),
            name: name.into(),
        }
    }
}

impl Persistable for SnippetPayload {
    fn file_extension() -> &'static str {
        "snippet.json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::LeafKind;
    use crate::segment::Leaf;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_save_payload_wire_form() {
        let layout = LayoutSegment::Leaf(Leaf::bare(LeafKind::Field).with_prop("field_name", "title"));
        let payload = SavePayload::from_layout(Some(layout));
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "columns": [{"type": "Field", "field_name": "title"}],
                "layout": {"type": "field", "field_name": "title"}
            })
        );

        let empty: SavePayload = serde_json::from_value(json!({"columns": [], "layout": null})).unwrap();
        assert_eq!(empty, SavePayload::default());
    }

    #[test]
    fn test_save_target_wire_form() {
        let target = SaveTarget::Page("12".into());
        assert_eq!(serde_json::to_value(&target).unwrap(), json!({"kind": "page", "id": "12"}));
        assert_eq!(target.display_name(), "page 12");
    }

    #[test]
    fn test_snippet_json() {
        let snippet = SnippetPayload::new(
            "Header",
            "fas fa-heading",
            LayoutSegment::leaf(LeafKind::LineBreak, Default::default()),
        );
        let json = snippet.to_json().unwrap();
        let back = SnippetPayload::from_json(&json).unwrap();
        assert_eq!(back, snippet);
    }
}
