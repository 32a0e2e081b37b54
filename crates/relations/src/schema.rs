//! Schema snapshot used to validate relation paths
//!
//! The server ships the tables reachable from the edited view together with
//! their foreign keys. Relation hops are checked against this snapshot.

use serde::{Deserialize, Serialize};

// ============================================================================
// ForeignKey
// ============================================================================

/// A key column on one table referencing another table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    /// Column name on the owning table (e.g., "artist")
    pub name: String,

    /// Name of the referenced table
    pub references: String,

    /// Whether the key is unique (one-to-one)
    #[serde(default)]
    pub unique: bool,
}

impl ForeignKey {
    /// Create a new foreign key
    pub fn new(name: impl Into<String>, references: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            references: references.into(),
            unique: false,
        }
    }

    /// Mark the key as unique
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

// ============================================================================
// TableSchema
// ============================================================================

/// A table and the keys it owns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name
    pub name: String,

    /// Foreign keys owned by this table
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl TableSchema {
    /// Create a table without keys
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            foreign_keys: Vec::new(),
        }
    }

    /// Add a foreign key
    pub fn with_key(mut self, name: impl Into<String>, references: impl Into<String>) -> Self {
        self.foreign_keys.push(ForeignKey::new(name, references));
        self
    }

    /// Add a unique foreign key
    pub fn with_unique_key(
        mut self,
        name: impl Into<String>,
        references: impl Into<String>,
    ) -> Self {
        self.foreign_keys.push(ForeignKey::new(name, references).unique());
        self
    }

    /// Get a key by column name
    pub fn key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|k| k.name == name)
    }
}

// ============================================================================
// SchemaSnapshot
// ============================================================================

/// The tables visible to one editing session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    #[serde(default)]
    pub tables: Vec<TableSchema>,
}

impl SchemaSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table
    pub fn with_table(mut self, table: TableSchema) -> Self {
        self.tables.push(table);
        self
    }

    /// Get a table by name
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Check if a table exists
    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Get the key `key` on `table`
    pub fn foreign_key(&self, table: &str, key: &str) -> Option<&ForeignKey> {
        self.table(table).and_then(|t| t.key(key))
    }

    /// Iterate over every `(owning table, key)` pair referencing `table`
    pub fn inbound_keys<'a>(
        &'a self,
        table: &'a str,
    ) -> impl Iterator<Item = (&'a TableSchema, &'a ForeignKey)> + 'a {
        self.tables.iter().flat_map(move |t| {
            t.foreign_keys
                .iter()
                .filter(move |k| k.references == table)
                .map(move |k| (t, k))
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
