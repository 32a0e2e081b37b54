//! Per-session cache of relation graphs
//!
//! Permitted paths are fixed for an editing session, so a graph built for a
//! `(table, view)` pair is reused until the session ends.

use crate::graph::RelationGraph;
use crate::schema::SchemaSnapshot;
use std::collections::HashMap;
use std::rc::Rc;

/// Relation graphs keyed by `(table, view)`
#[derive(Debug, Default)]
pub struct RelationGraphCache {
    graphs: HashMap<(String, String), Rc<RelationGraph>>,
}

impl RelationGraphCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached graph, building it on first use
    pub fn get_or_build<S: AsRef<str>>(
        &mut self,
        table: &str,
        view: &str,
        permitted: &[S],
        schema: &SchemaSnapshot,
    ) -> Rc<RelationGraph> {
        let key = (table.to_string(), view.to_string());
        if let Some(graph) = self.graphs.get(&key) {
            tracing::trace!(table, view, "relation graph cache hit");
            return Rc::clone(graph);
        }
        let graph = Rc::new(RelationGraph::build(permitted, table, schema));
        self.graphs.insert(key, Rc::clone(&graph));
        graph
    }

    /// Get a cached graph without building
    pub fn get(&self, table: &str, view: &str) -> Option<Rc<RelationGraph>> {
        self.graphs
            .get(&(table.to_string(), view.to_string()))
            .cloned()
    }

    /// Number of cached graphs
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Drop every cached graph
    pub fn clear(&mut self) {
        self.graphs.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableSchema;

    #[test]
    fn test_builds_once_per_key() {
        let schema = SchemaSnapshot::new()
            .with_table(TableSchema::new("artists"))
            .with_table(TableSchema::new("fan_club").with_key("artist", "artists"));
        let mut cache = RelationGraphCache::new();

        let first = cache.get_or_build("artists", "fans", &[".artists.fan_club$artist"], &schema);
        // Permitted paths are not consulted again for a cached key
        let second = cache.get_or_build("artists", "fans", &["."], &schema);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);

        let other = cache.get_or_build("artists", "summary", &["."], &schema);
        assert!(!Rc::ptr_eq(&first, &other));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("artists", "summary").is_some());

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("artists", "fans").is_none());
    }
}
