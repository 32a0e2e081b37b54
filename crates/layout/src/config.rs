//! Session bootstrap configuration
//!
//! The server hands the builder one read-only configuration object per view
//! or page. It fixes what the palette offers and which relations may be
//! picked for the whole editing session.

use crate::kinds::LeafKind;
use crate::payload::SnippetPayload;
use layoutsmith_core::{BuilderError, BuilderResult, EditMode, Validatable};
use layoutsmith_relations::SchemaSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A field of the current table and how it can be shown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChoice {
    pub name: String,

    #[serde(default)]
    pub label: String,

    /// Presentation variants (`as_text`, `show_with_html`, ...)
    #[serde(default)]
    pub fieldviews: Vec<String>,
}

impl FieldChoice {
    /// Create a field choice
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            fieldviews: Vec::new(),
        }
    }

    /// Builder: add a presentation variant
    pub fn with_fieldview(mut self, fieldview: impl Into<String>) -> Self {
        self.fieldviews.push(fieldview.into());
        self
    }
}

/// A role visibility can be restricted to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleChoice {
    pub id: u32,
    pub role: String,
}

/// Read-only configuration of one editing session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    #[serde(default)]
    pub mode: EditMode,

    /// Table the layout shows rows of (absent for pages)
    #[serde(default)]
    pub table_name: Option<String>,

    #[serde(default)]
    pub view_name: Option<String>,

    #[serde(default)]
    pub fields: Vec<FieldChoice>,

    /// Leaf kinds the palette offers; empty means the defaults for the mode
    #[serde(default)]
    pub leaf_kinds: Vec<LeafKind>,

    /// Permitted relation paths, keyed by the view they lead to
    #[serde(default)]
    pub permitted_relations: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub actions: Vec<String>,

    #[serde(default)]
    pub roles: Vec<RoleChoice>,

    #[serde(default)]
    pub library: Vec<SnippetPayload>,

    #[serde(default)]
    pub schema: SchemaSnapshot,
}

impl BuilderConfig {
    /// Create an empty configuration for a mode
    pub fn new(mode: EditMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Builder: set the table
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table_name = Some(table.into());
        self
    }

    /// Builder: set the schema snapshot
    pub fn with_schema(mut self, schema: SchemaSnapshot) -> Self {
        self.schema = schema;
        self
    }

    /// Builder: add a field choice
    pub fn with_field(mut self, field: FieldChoice) -> Self {
        self.fields.push(field);
        self
    }

    /// Builder: permit relation paths towards a view
    pub fn with_relations<S: Into<String>>(
        mut self,
        view: impl Into<String>,
        paths: impl IntoIterator<Item = S>,
    ) -> Self {
        self.permitted_relations
            .insert(view.into(), paths.into_iter().map(Into::into).collect());
        self
    }

    /// Builder: add a library snippet
    pub fn with_snippet(mut self, snippet: SnippetPayload) -> Self {
        self.library.push(snippet);
        self
    }

    /// Parse a configuration from JSON and check it
    pub fn from_json(json: &str) -> BuilderResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| BuilderError::InvalidConfig(format!("malformed builder config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Whether the palette offers a leaf kind
    pub fn offers(&self, kind: LeafKind) -> bool {
        if self.leaf_kinds.is_empty() {
            kind.offered_in(self.mode)
        } else {
            self.leaf_kinds.contains(&kind)
        }
    }

    /// Look up a field choice
    pub fn field(&self, name: &str) -> Option<&FieldChoice> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Permitted relation paths towards a view
    pub fn permitted_paths(&self, view: &str) -> &[String] {
        self.permitted_relations
            .get(view)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Look up a library snippet
    pub fn snippet(&self, name: &str) -> Option<&SnippetPayload> {
        self.library.iter().find(|s| s.name == name)
    }
}

impl Validatable for BuilderConfig {
    fn validate(&self) -> BuilderResult<()> {
        if self.mode.has_row() && self.table_name.as_deref().is_none_or(str::is_empty) {
            return Err(BuilderError::InvalidConfig(format!(
                "{} mode needs a table name",
                self.mode.display_name()
            )));
        }
        if let Some(table) = &self.table_name {
            if !self.schema.tables.is_empty() && !self.schema.has_table(table) {
                return Err(BuilderError::InvalidConfig(format!(
                    "table '{}' is not in the schema snapshot",
                    table
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use layoutsmith_relations::TableSchema;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_json() {
        let json = r#"{
            "mode": "list",
            "table_name": "books",
            "fields": [{"name": "title", "fieldviews": ["as_text"]}],
            "leaf_kinds": ["field", "action"],
            "permitted_relations": {"authors_show": [".books.author"]},
            "roles": [{"id": 1, "role": "admin"}],
            "schema": {"tables": [
                {"name": "books", "foreign_keys": [{"name": "author", "references": "authors"}]},
                {"name": "authors"}
            ]}
        }"#;
        let config = BuilderConfig::from_json(json).unwrap();
        assert_eq!(config.mode, EditMode::List);
        assert_eq!(config.field("title").unwrap().fieldviews, vec!["as_text"]);
        assert!(config.offers(LeafKind::Action));
        assert!(!config.offers(LeafKind::Text));
        assert_eq!(config.permitted_paths("authors_show"), &[".books.author".to_string()]);
        assert!(config.permitted_paths("other").is_empty());
        assert!(config.schema.foreign_key("books", "author").is_some());
    }

    #[test]
    fn test_default_offers_follow_mode() {
        let config = BuilderConfig::new(EditMode::Page);
        assert!(config.offers(LeafKind::Page));
        assert!(!config.offers(LeafKind::Field));
    }

    #[test]
    fn test_row_mode_needs_table() {
        let err = BuilderConfig::from_json(r#"{"mode": "edit"}"#).unwrap_err();
        assert!(matches!(err, BuilderError::InvalidConfig(_)));

        let config = BuilderConfig::new(EditMode::Show)
            .with_table("ghosts")
            .with_schema(SchemaSnapshot::new().with_table(TableSchema::new("books")));
        assert!(!config.is_valid());

        assert!(matches!(
            BuilderConfig::from_json("{not json").unwrap_err(),
            BuilderError::InvalidConfig(_)
        ));
    }
}
