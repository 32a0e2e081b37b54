//! Flat column projection
//!
//! List and edit views also need their data-bearing leaves as a flat list.
//! Each field, join field, view link and action leaf adds one
//! [`ColumnSpec`], in the order the layout traversal reaches it.

use layoutsmith_core::Props;
use serde::{Deserialize, Serialize};

/// Leaf kinds that contribute a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Field,
    JoinField,
    ViewLink,
    Action,
}

impl ColumnKind {
    /// Get the display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            ColumnKind::Field => "Field",
            ColumnKind::JoinField => "Join field",
            ColumnKind::ViewLink => "View link",
            ColumnKind::Action => "Action",
        }
    }
}

/// One entry of the columns list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    #[serde(rename = "type")]
    pub kind: ColumnKind,

    /// Props of the leaf, copied as-is
    #[serde(flatten)]
    pub props: Props,
}

impl ColumnSpec {
    /// Create a column from a leaf's props
    pub fn new(kind: ColumnKind, props: Props) -> Self {
        Self { kind, props }
    }

    /// Get a string prop
    pub fn prop(&self, key: &str) -> Option<&str> {
        layoutsmith_core::prop_str(&self.props, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_column_wire_form() {
        let mut props = Props::new();
        props.insert("field_name".into(), json!("name"));
        props.insert("fieldview".into(), json!("as_text"));
        let column = ColumnSpec::new(ColumnKind::Field, props);

        let value = serde_json::to_value(&column).unwrap();
        assert_eq!(
            value,
            json!({"type": "Field", "field_name": "name", "fieldview": "as_text"})
        );

        let back: ColumnSpec = serde_json::from_value(value).unwrap();
        assert_eq!(back, column);
        assert_eq!(back.prop("field_name"), Some("name"));
    }
}
