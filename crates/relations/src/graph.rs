//! Relation graph builder
//!
//! Folds the flat list of permitted relation paths for one table into a tree
//! of reachable tables. Hops that share `(kind, key, table)` at the same
//! position merge into one node, and children keep the order in which the
//! permitted list first mentioned them.

use crate::path::{PathContext, RelationHop, RelationKind, RelationPath};
use crate::schema::SchemaSnapshot;
use layoutsmith_core::BuilderError;
use serde::Serialize;

// ============================================================================
// Branch
// ============================================================================

/// One step from a graph node to one of its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Branch {
    /// Index into `fkeys`
    Foreign(usize),
    /// Index into `inbound_keys`
    Inbound(usize),
    /// Index into `shortcuts`
    Shortcut(usize),
}

// ============================================================================
// RelationGraphNode
// ============================================================================

/// A table reachable from the root by some permitted path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationGraphNode {
    /// Table this node stands for
    pub table: String,

    /// How the parent reaches this node (`None` at the root)
    pub kind: Option<RelationKind>,

    /// Key followed from the parent (empty at the root)
    pub key: String,

    /// Children reached through a key on this table
    pub fkeys: Vec<RelationGraphNode>,

    /// Children reached through another table's key pointing here
    pub inbound_keys: Vec<RelationGraphNode>,

    /// Single-hop legacy relations
    pub shortcuts: Vec<RelationGraphNode>,

    /// Permitted path ending here; navigation-only nodes have none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_path: Option<String>,
}

impl RelationGraphNode {
    /// Create a root node
    pub fn root(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            kind: None,
            key: String::new(),
            fkeys: Vec::new(),
            inbound_keys: Vec::new(),
            shortcuts: Vec::new(),
            rel_path: None,
        }
    }

    fn from_hop(hop: &RelationHop) -> Self {
        Self {
            kind: Some(hop.kind),
            key: hop.key.clone(),
            ..Self::root(hop.table.clone())
        }
    }

    fn reached_by(&self, hop: &RelationHop) -> bool {
        self.kind == Some(hop.kind) && self.key == hop.key && self.table == hop.table
    }

    /// Find or create the child reached by `hop`
    fn child_mut(&mut self, hop: &RelationHop) -> &mut RelationGraphNode {
        let list = match hop.kind {
            RelationKind::Foreign => &mut self.fkeys,
            RelationKind::Inbound => &mut self.inbound_keys,
            _ => &mut self.shortcuts,
        };
        let index = match list.iter().position(|n| n.reached_by(hop)) {
            Some(index) => index,
            None => {
                list.push(RelationGraphNode::from_hop(hop));
                list.len() - 1
            }
        };
        &mut list[index]
    }

    /// Whether a permitted path ends here
    pub fn is_selectable(&self) -> bool {
        self.rel_path.is_some()
    }

    /// Whether the node has any children
    pub fn has_children(&self) -> bool {
        !(self.fkeys.is_empty() && self.inbound_keys.is_empty() && self.shortcuts.is_empty())
    }

    /// Iterate over children with their branch, in display order
    pub fn children(&self) -> impl Iterator<Item = (Branch, &RelationGraphNode)> {
        let fkeys = self
            .fkeys
            .iter()
            .enumerate()
            .map(|(i, n)| (Branch::Foreign(i), n));
        let inbound = self
            .inbound_keys
            .iter()
            .enumerate()
            .map(|(i, n)| (Branch::Inbound(i), n));
        let shortcuts = self
            .shortcuts
            .iter()
            .enumerate()
            .map(|(i, n)| (Branch::Shortcut(i), n));
        fkeys.chain(inbound).chain(shortcuts)
    }

    /// Get a direct child
    pub fn child(&self, branch: Branch) -> Option<&RelationGraphNode> {
        match branch {
            Branch::Foreign(i) => self.fkeys.get(i),
            Branch::Inbound(i) => self.inbound_keys.get(i),
            Branch::Shortcut(i) => self.shortcuts.get(i),
        }
    }

    /// Follow a sequence of branches
    pub fn descendant(&self, address: &[Branch]) -> Option<&RelationGraphNode> {
        address
            .iter()
            .try_fold(self, |node, branch| node.child(*branch))
    }

    /// Count this node and every descendant
    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .map(|(_, child)| child.node_count())
            .sum::<usize>()
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(path) = &self.rel_path {
            out.push(path);
        }
        for (_, child) in self.children() {
            child.collect_paths(out);
        }
    }
}

// ============================================================================
// RelationGraph
// ============================================================================

/// A permitted path that could not be placed in the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedPath {
    pub path: String,
    pub reason: String,
}

/// The tree of relations selectable from one table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationGraph {
    root: RelationGraphNode,
    rejected: Vec<RejectedPath>,
    warnings: Vec<String>,
}

impl RelationGraph {
    /// Build the graph for `root_table` from the server's permitted paths
    ///
    /// Paths that fail to parse are left out and logged. A single
    /// user-facing warning names the first of them.
    pub fn build<S: AsRef<str>>(
        permitted: &[S],
        root_table: &str,
        schema: &SchemaSnapshot,
    ) -> Self {
        let ctx = PathContext::new(schema, root_table);
        let mut root = RelationGraphNode::root(root_table);
        let mut rejected = Vec::new();

        for original in permitted.iter().map(AsRef::as_ref) {
            let path = match RelationPath::parse(original, &ctx) {
                Ok(path) => path,
                Err(err) => {
                    tracing::warn!(path = %original, table = %root_table, "dropping relation path: {}", err);
                    rejected.push(rejected_path(original, err));
                    continue;
                }
            };

            let mut node = &mut root;
            for hop in path.hops() {
                node = node.child_mut(hop);
            }
            if let Some(kept) = node.rel_path.as_deref() {
                if kept != original {
                    tracing::debug!(
                        path = %original,
                        kept = %kept,
                        table = %root_table,
                        "relation path ends on an already selectable node"
                    );
                }
            } else {
                node.rel_path = Some(original.to_string());
            }
        }

        let mut warnings = Vec::new();
        if let Some(first) = rejected.first() {
            warnings.push(format!(
                "{} relation path(s) could not be used, starting with '{}': {}",
                rejected.len(),
                first.path,
                first.reason
            ));
        }

        tracing::debug!(
            table = %root_table,
            nodes = root.node_count(),
            rejected = rejected.len(),
            "built relation graph"
        );

        Self {
            root,
            rejected,
            warnings,
        }
    }

    /// The root node (the current table)
    pub fn root(&self) -> &RelationGraphNode {
        &self.root
    }

    /// Paths that were dropped
    pub fn rejected(&self) -> &[RejectedPath] {
        &self.rejected
    }

    /// User-facing warnings (at most one)
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Every selectable path, depth first
    pub fn selectable_paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.root.collect_paths(&mut out);
        out
    }

    /// Get the node at an address (empty address is the root)
    pub fn node_at(&self, address: &[Branch]) -> Option<&RelationGraphNode> {
        self.root.descendant(address)
    }
}

fn rejected_path(original: &str, err: BuilderError) -> RejectedPath {
    match err {
        BuilderError::InvalidRelationPath { path, reason } => RejectedPath { path, reason },
        other => RejectedPath {
            path: original.to_string(),
            reason: other.to_string(),
        },
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableSchema;
    use pretty_assertions::assert_eq;

    fn schema() -> SchemaSnapshot {
        SchemaSnapshot::new()
            .with_table(TableSchema::new("artists"))
            .with_table(TableSchema::new("album").with_key("label", "labels"))
            .with_table(TableSchema::new("labels"))
            .with_table(
                TableSchema::new("artist_plays_on_album")
                    .with_key("artist", "artists")
                    .with_key("album", "album"),
            )
            .with_table(TableSchema::new("fan_club").with_key("artist", "artists"))
    }

    #[test]
    fn test_shared_prefix_merges() {
        let graph = RelationGraph::build(
            &[
                ".artists.artist_plays_on_album$artist.album",
                ".artists.artist_plays_on_album$artist.album.label",
            ],
            "artists",
            &schema(),
        );

        let root = graph.root();
        assert_eq!(root.inbound_keys.len(), 1);
        let link = &root.inbound_keys[0];
        assert_eq!(link.table, "artist_plays_on_album");
        assert!(!link.is_selectable());
        assert_eq!(link.fkeys.len(), 1);
        let album = &link.fkeys[0];
        assert!(album.is_selectable());
        assert_eq!(album.fkeys[0].table, "labels");
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn test_first_seen_order() {
        let graph = RelationGraph::build(
            &[".artists.fan_club$artist", ".artists.artist_plays_on_album$artist"],
            "artists",
            &schema(),
        );
        let tables: Vec<_> = graph
            .root()
            .inbound_keys
            .iter()
            .map(|n| n.table.as_str())
            .collect();
        assert_eq!(tables, vec!["fan_club", "artist_plays_on_album"]);
    }

    #[test]
    fn test_current_row_marks_root() {
        let graph = RelationGraph::build(&["."], "artists", &schema());
        assert_eq!(graph.root().rel_path.as_deref(), Some("."));
        assert_eq!(graph.selectable_paths(), vec!["."]);
    }

    #[test]
    fn test_aliases_keep_first_path() {
        let graph = RelationGraph::build(&[".", ".artists"], "artists", &schema());
        assert_eq!(graph.root().rel_path.as_deref(), Some("."));
        assert_eq!(graph.selectable_paths(), vec!["."]);
        assert!(graph.rejected().is_empty());
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn test_legacy_paths_become_shortcuts() {
        let graph = RelationGraph::build(&["Own:", "Independent:album"], "artists", &schema());
        assert_eq!(graph.root().shortcuts.len(), 2);
        assert_eq!(graph.root().shortcuts[0].kind, Some(RelationKind::Own));
        assert_eq!(graph.selectable_paths(), vec!["Own:", "Independent:album"]);
    }

    #[test]
    fn test_rejected_paths_warn_once() {
        let graph = RelationGraph::build(
            &[".artists.nope", ".", ".artists.bogus$x"],
            "artists",
            &schema(),
        );
        assert_eq!(graph.rejected().len(), 2);
        assert_eq!(graph.rejected()[0].path, ".artists.nope");
        assert_eq!(graph.warnings().len(), 1);
        assert!(graph.warnings()[0].contains("'.artists.nope'"));
        assert_eq!(graph.selectable_paths(), vec!["."]);
    }

    #[test]
    fn test_node_at() {
        let graph = RelationGraph::build(
            &[".artists.artist_plays_on_album$artist.album"],
            "artists",
            &schema(),
        );
        let node = graph
            .node_at(&[Branch::Inbound(0), Branch::Foreign(0)])
            .unwrap();
        assert_eq!(node.table, "album");
        assert!(graph.node_at(&[Branch::Foreign(0)]).is_none());
        assert_eq!(graph.node_at(&[]).unwrap().table, "artists");
    }
}
