//! Editor graph
//!
//! The visual editor keeps its canvas as a flat map of nodes keyed by id.
//! Canvas nodes own an ordered list of children. Multi-slot components own
//! named "linked" canvases instead (`Col0`, `Tab1`, ...), one per slot.
//!
//! [`EditorGraph`] is the narrow interface the serializer and the array
//! manager need from an editor. [`Document`] is the in-memory
//! implementation, readable from and writable to the editor's node-map JSON.

use crate::kinds::{CANVAS_TYPE, ComponentKind};
use layoutsmith_core::{
    BuilderError, BuilderResult, NodeId, Props, ROOT_NODE_ID, new_node_id,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

// ============================================================================
// Nodes
// ============================================================================

/// A node as stored by the editor
#[derive(Debug, Clone, PartialEq)]
pub struct EditorNode {
    pub id: NodeId,

    /// Component type name (`Text`, `Columns`, `Canvas`, ...)
    pub type_name: String,

    pub display_name: String,

    /// Whether the node holds positional children
    pub is_canvas: bool,

    pub props: Props,

    pub parent: Option<NodeId>,

    /// Positional children, in order
    pub child_ids: Vec<NodeId>,

    /// Named child canvases of multi-slot components
    pub linked_node_ids: BTreeMap<String, NodeId>,
}

/// A subtree to be created in the editor
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    pub type_name: String,
    pub display_name: String,
    pub is_canvas: bool,
    pub props: Props,
    pub children: Vec<NodeDescriptor>,
    pub linked: BTreeMap<String, NodeDescriptor>,
}

impl NodeDescriptor {
    /// Create a descriptor for a component kind
    pub fn new(kind: ComponentKind, props: Props) -> Self {
        Self {
            type_name: kind.node_type().to_string(),
            display_name: kind.display_name().to_string(),
            is_canvas: kind.is_canvas(),
            props,
            children: Vec::new(),
            linked: BTreeMap::new(),
        }
    }

    /// Create an empty plain canvas
    pub fn canvas() -> Self {
        Self::new(ComponentKind::Canvas, Props::new())
    }

    /// Builder: set positional children
    pub fn with_children(mut self, children: Vec<NodeDescriptor>) -> Self {
        self.children = children;
        self
    }

    /// Builder: add a linked canvas
    pub fn with_linked(mut self, name: impl Into<String>, node: NodeDescriptor) -> Self {
        self.linked.insert(name.into(), node);
        self
    }

    /// Count this node and every node below it
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeDescriptor::node_count).sum::<usize>()
            + self.linked.values().map(NodeDescriptor::node_count).sum::<usize>()
    }
}

// ============================================================================
// EditorGraph
// ============================================================================

/// The operations the builder needs from a visual editor
pub trait EditorGraph {
    /// Id of the root canvas
    fn root_id(&self) -> &str;

    /// Look up a node
    fn node(&self, id: &str) -> Option<&EditorNode>;

    /// Create a subtree under `parent` at `index` (`None` appends)
    ///
    /// Returns the id of the subtree's top node.
    fn add(&mut self, tree: NodeDescriptor, parent: &str, index: Option<usize>) -> BuilderResult<NodeId>;

    /// Remove a node and everything below it
    fn delete(&mut self, id: &str) -> BuilderResult<()>;

    /// Change a node's props in place
    fn set_prop(&mut self, id: &str, mutate: &mut dyn FnMut(&mut Props)) -> BuilderResult<()>;

    /// Change the selection
    fn select_node(&mut self, id: Option<&str>);

    /// Currently selected node
    fn selected(&self) -> Option<&str>;

    /// Parent canvas of a node and the node's index among its children
    fn position_in_parent(&self, id: &str) -> BuilderResult<(NodeId, usize)> {
        let node = self
            .node(id)
            .ok_or_else(|| BuilderError::node_not_found(id))?;
        let parent_id = node
            .parent
            .clone()
            .ok_or_else(|| BuilderError::Detached(id.to_string()))?;
        let parent = self
            .node(&parent_id)
            .ok_or_else(|| BuilderError::node_not_found(parent_id.clone()))?;
        let index = parent
            .child_ids
            .iter()
            .position(|c| c == id)
            .ok_or_else(|| BuilderError::Detached(id.to_string()))?;
        Ok((parent_id, index))
    }

    /// Ids of a node and every node below it, parents first
    fn subtree_ids(&self, id: &str) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut pending = vec![id.to_string()];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.node(&next) {
                pending.extend(node.linked_node_ids.values().rev().cloned());
                pending.extend(node.child_ids.iter().rev().cloned());
                out.push(next);
            }
        }
        out
    }
}

// ============================================================================
// Document
// ============================================================================

/// In-memory editor graph
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: HashMap<NodeId, EditorNode>,
    selected: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding an empty root canvas
    pub fn new() -> Self {
        let root = EditorNode {
            id: ROOT_NODE_ID.to_string(),
            type_name: CANVAS_TYPE.to_string(),
            display_name: CANVAS_TYPE.to_string(),
            is_canvas: true,
            props: Props::new(),
            parent: None,
            child_ids: Vec::new(),
            linked_node_ids: BTreeMap::new(),
        };
        let mut nodes = HashMap::new();
        nodes.insert(root.id.clone(), root);
        Self {
            nodes,
            selected: None,
        }
    }

    /// Number of nodes, the root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the empty root is left
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Whether a node exists
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    fn insert_tree(&mut self, tree: NodeDescriptor, parent: &str) -> NodeId {
        let id = new_node_id();
        let child_ids = tree
            .children
            .into_iter()
            .map(|child| self.insert_tree(child, &id))
            .collect();
        let linked_node_ids = tree
            .linked
            .into_iter()
            .map(|(name, child)| (name, self.insert_tree(child, &id)))
            .collect();
        self.nodes.insert(
            id.clone(),
            EditorNode {
                id: id.clone(),
                type_name: tree.type_name,
                display_name: tree.display_name,
                is_canvas: tree.is_canvas,
                props: tree.props,
                parent: Some(parent.to_string()),
                child_ids,
                linked_node_ids,
            },
        );
        id
    }

    /// Read the editor's node-map JSON
    pub fn from_node_map(json: &str) -> BuilderResult<Self> {
        let raw: BTreeMap<NodeId, SerializedNode> = serde_json::from_str(json)?;
        if !raw.contains_key(ROOT_NODE_ID) {
            return Err(BuilderError::invalid_layout(format!(
                "node map has no '{}' node",
                ROOT_NODE_ID
            )));
        }

        let nodes: HashMap<NodeId, EditorNode> = raw
            .into_iter()
            .map(|(id, node)| {
                let editor_node = node.into_editor_node(id.clone());
                (id, editor_node)
            })
            .collect();

        check_tree(&nodes)?;

        tracing::debug!(nodes = nodes.len(), "loaded editor node map");
        Ok(Self {
            nodes,
            selected: None,
        })
    }

    /// Write the editor's node-map JSON
    pub fn to_node_map(&self) -> BuilderResult<String> {
        let raw: BTreeMap<&str, SerializedNode> = self
            .nodes
            .values()
            .map(|node| (node.id.as_str(), SerializedNode::from(node)))
            .collect();
        serde_json::to_string_pretty(&raw).map_err(Into::into)
    }
}

/// Every listed node exists, names its lister as parent, is listed once,
/// and is reachable from a node nobody lists
fn check_tree(nodes: &HashMap<NodeId, EditorNode>) -> BuilderResult<()> {
    let mut listed_by: HashMap<&str, &str> = HashMap::new();
    for node in nodes.values() {
        for child in node.child_ids.iter().chain(node.linked_node_ids.values()) {
            let Some(child_node) = nodes.get(child) else {
                return Err(BuilderError::invalid_layout(format!(
                    "node '{}' refers to missing node '{}'",
                    node.id, child
                )));
            };
            if child == ROOT_NODE_ID || child_node.parent.as_deref() != Some(node.id.as_str()) {
                return Err(BuilderError::invalid_layout(format!(
                    "node '{}' lists '{}', whose parent is {:?}",
                    node.id, child, child_node.parent
                )));
            }
            if let Some(first) = listed_by.insert(child.as_str(), node.id.as_str()) {
                return Err(BuilderError::invalid_layout(format!(
                    "node '{}' is listed by both '{}' and '{}'",
                    child, first, node.id
                )));
            }
        }
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&str> = nodes
        .keys()
        .map(String::as_str)
        .filter(|id| !listed_by.contains_key(id))
        .collect();
    while let Some(id) = pending.pop() {
        if !visited.insert(id) {
            return Err(BuilderError::invalid_layout(format!("node '{}' is reached twice", id)));
        }
        if let Some(node) = nodes.get(id) {
            pending.extend(
                node.child_ids
                    .iter()
                    .chain(node.linked_node_ids.values())
                    .map(String::as_str),
            );
        }
    }

    // Whatever the walk missed sits on a cycle
    match nodes.keys().find(|id| !visited.contains(id.as_str())) {
        Some(id) => Err(BuilderError::invalid_layout(format!(
            "node '{}' is part of a cycle",
            id
        ))),
        None => Ok(()),
    }
}

impl EditorGraph for Document {
    fn root_id(&self) -> &str {
        ROOT_NODE_ID
    }

    fn node(&self, id: &str) -> Option<&EditorNode> {
        self.nodes.get(id)
    }

    fn add(&mut self, tree: NodeDescriptor, parent: &str, index: Option<usize>) -> BuilderResult<NodeId> {
        let target = self
            .nodes
            .get(parent)
            .ok_or_else(|| BuilderError::node_not_found(parent))?;
        if !target.is_canvas {
            return Err(BuilderError::NotACanvas(parent.to_string()));
        }

        let id = self.insert_tree(tree, parent);
        let target = self
            .nodes
            .get_mut(parent)
            .ok_or_else(|| BuilderError::node_not_found(parent))?;
        let at = index
            .unwrap_or(target.child_ids.len())
            .min(target.child_ids.len());
        target.child_ids.insert(at, id.clone());
        Ok(id)
    }

    fn delete(&mut self, id: &str) -> BuilderResult<()> {
        if id == ROOT_NODE_ID {
            return Err(BuilderError::internal("the root canvas cannot be deleted"));
        }
        let parent = self
            .nodes
            .get(id)
            .ok_or_else(|| BuilderError::node_not_found(id))?
            .parent
            .clone();

        let removed = self.subtree_ids(id);
        for gone in &removed {
            self.nodes.remove(gone);
        }
        if let Some(parent_id) = parent {
            if let Some(parent) = self.nodes.get_mut(&parent_id) {
                parent.child_ids.retain(|c| c != id);
                parent.linked_node_ids.retain(|_, c| c != id);
            }
        }
        if self
            .selected
            .as_ref()
            .is_some_and(|s| removed.contains(s))
        {
            self.selected = None;
        }
        Ok(())
    }

    fn set_prop(&mut self, id: &str, mutate: &mut dyn FnMut(&mut Props)) -> BuilderResult<()> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| BuilderError::node_not_found(id))?;
        mutate(&mut node.props);
        Ok(())
    }

    fn select_node(&mut self, id: Option<&str>) {
        self.selected = id.filter(|id| self.nodes.contains_key(*id)).map(str::to_string);
    }

    fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

// ============================================================================
// Node map wire form
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum TypeRef {
    Resolved {
        #[serde(rename = "resolvedName")]
        resolved_name: String,
    },
    Plain(String),
}

impl TypeRef {
    fn name(self) -> String {
        match self {
            TypeRef::Resolved { resolved_name } => resolved_name,
            TypeRef::Plain(name) => name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerializedNode {
    #[serde(rename = "type")]
    type_ref: TypeRef,

    #[serde(default)]
    is_canvas: bool,

    #[serde(default)]
    props: Props,

    #[serde(default)]
    display_name: String,

    #[serde(default)]
    parent: Option<NodeId>,

    #[serde(default)]
    nodes: Vec<NodeId>,

    #[serde(default)]
    linked_nodes: BTreeMap<String, NodeId>,

    #[serde(default)]
    hidden: bool,
}

impl SerializedNode {
    fn into_editor_node(self, id: NodeId) -> EditorNode {
        let type_name = self.type_ref.name();
        // The root canvas is stored with a plain element type
        let type_name = if id == ROOT_NODE_ID {
            CANVAS_TYPE.to_string()
        } else {
            type_name
        };
        EditorNode {
            display_name: if self.display_name.is_empty() {
                type_name.clone()
            } else {
                self.display_name
            },
            id,
            type_name,
            is_canvas: self.is_canvas,
            props: self.props,
            parent: self.parent,
            child_ids: self.nodes,
            linked_node_ids: self.linked_nodes,
        }
    }
}

impl From<&EditorNode> for SerializedNode {
    fn from(node: &EditorNode) -> Self {
        Self {
            type_ref: TypeRef::Resolved {
                resolved_name: node.type_name.clone(),
            },
            is_canvas: node.is_canvas,
            props: node.props.clone(),
            display_name: node.display_name.clone(),
            parent: node.parent.clone(),
            nodes: node.child_ids.clone(),
            linked_nodes: node.linked_node_ids.clone(),
            hidden: false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kinds::{LeafKind, SlotKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn text() -> NodeDescriptor {
        NodeDescriptor::new(ComponentKind::Leaf(LeafKind::Text), Props::new())
    }

    #[test]
    fn test_new_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.root_id(), "ROOT");
        assert!(doc.node("ROOT").unwrap().is_canvas);
    }

    #[test]
    fn test_add_at_index() {
        let mut doc = Document::new();
        let a = doc.add(text(), "ROOT", None).unwrap();
        let b = doc.add(text(), "ROOT", None).unwrap();
        let c = doc.add(text(), "ROOT", Some(1)).unwrap();
        assert_eq!(doc.node("ROOT").unwrap().child_ids, vec![a.clone(), c.clone(), b]);
        assert_eq!(doc.position_in_parent(&c).unwrap(), ("ROOT".to_string(), 1));

        // An index past the end appends
        let d = doc.add(text(), "ROOT", Some(99)).unwrap();
        assert_eq!(doc.node("ROOT").unwrap().child_ids.last(), Some(&d));
    }

    #[test]
    fn test_add_to_leaf_fails() {
        let mut doc = Document::new();
        let a = doc.add(text(), "ROOT", None).unwrap();
        let err = doc.add(text(), &a, None).unwrap_err();
        assert!(matches!(err, BuilderError::NotACanvas(_)));
        assert!(doc.add(text(), "missing", None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_linked_nodes_and_delete() {
        let mut doc = Document::new();
        let tabs = NodeDescriptor::new(ComponentKind::Slots(SlotKind::Tabs), Props::new())
            .with_linked("Tab0", NodeDescriptor::canvas().with_children(vec![text()]))
            .with_linked("Tab1", NodeDescriptor::canvas());
        assert_eq!(tabs.node_count(), 4);

        let id = doc.add(tabs, "ROOT", None).unwrap();
        assert_eq!(doc.len(), 5);
        let node = doc.node(&id).unwrap();
        assert_eq!(node.linked_node_ids.len(), 2);
        assert!(node.child_ids.is_empty());

        let tab0 = node.linked_node_ids["Tab0"].clone();
        assert_eq!(doc.node(&tab0).unwrap().parent.as_deref(), Some(id.as_str()));
        // Linked canvases are not positional children
        assert!(doc.position_in_parent(&tab0).is_err());

        doc.select_node(Some(&tab0));
        doc.delete(&id).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.selected(), None);
        assert!(doc.delete("ROOT").is_err());
    }

    #[test]
    fn test_set_prop() {
        let mut doc = Document::new();
        let a = doc.add(text(), "ROOT", None).unwrap();
        doc.set_prop(&a, &mut |props| {
            props.insert("contents".into(), json!("hi"));
        })
        .unwrap();
        assert_eq!(doc.node(&a).unwrap().props["contents"], json!("hi"));
    }

    #[test]
    fn test_node_map_round_trip() {
        let mut doc = Document::new();
        let columns = NodeDescriptor::new(ComponentKind::Slots(SlotKind::Columns), Props::new())
            .with_linked("Col0", NodeDescriptor::canvas().with_children(vec![text()]));
        doc.add(columns, "ROOT", None).unwrap();

        let json = doc.to_node_map().unwrap();
        let back = Document::from_node_map(&json).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_node_map_plain_root_type() {
        let json = r#"{
            "ROOT": {"type": "div", "isCanvas": true, "props": {}, "nodes": ["a"]},
            "a": {"type": {"resolvedName": "Text"}, "props": {"text": "hi"}, "parent": "ROOT"}
        }"#;
        let doc = Document::from_node_map(json).unwrap();
        assert_eq!(doc.node("ROOT").unwrap().type_name, "Canvas");
        assert_eq!(doc.node("a").unwrap().display_name, "Text");
    }

    #[test]
    fn test_node_map_missing_child() {
        let json = r#"{"ROOT": {"type": "div", "isCanvas": true, "nodes": ["ghost"]}}"#;
        let err = Document::from_node_map(json).unwrap_err();
        assert!(err.is_layout());
        assert!(Document::from_node_map("{}").is_err());
    }

    #[test]
    fn test_node_map_rejects_cycles() {
        // ROOT listed as a child of its own child
        let back_edge = r#"{
            "ROOT": {"type": "div", "isCanvas": true, "nodes": ["a"]},
            "a": {"type": "Container", "isCanvas": true, "nodes": ["ROOT"], "parent": "ROOT"}
        }"#;
        assert!(Document::from_node_map(back_edge).unwrap_err().is_layout());

        // Two nodes listing each other, detached from ROOT, with matching parents
        let loop_pair = r#"{
            "ROOT": {"type": "div", "isCanvas": true},
            "a": {"type": "Container", "isCanvas": true, "nodes": ["b"], "parent": "b"},
            "b": {"type": "Container", "isCanvas": true, "nodes": ["a"], "parent": "a"}
        }"#;
        assert!(Document::from_node_map(loop_pair).unwrap_err().is_layout());
    }

    #[test]
    fn test_node_map_rejects_mismatched_parent() {
        let wrong_parent = r#"{
            "ROOT": {"type": "div", "isCanvas": true, "nodes": ["a"]},
            "a": {"type": "Container", "isCanvas": true, "nodes": ["b"], "parent": "ROOT"},
            "b": {"type": "Text", "parent": "ROOT"}
        }"#;
        assert!(Document::from_node_map(wrong_parent).unwrap_err().is_layout());

        let shared = r#"{
            "ROOT": {"type": "div", "isCanvas": true, "nodes": ["a", "b"]},
            "a": {"type": "Container", "isCanvas": true, "nodes": ["b"], "parent": "ROOT"},
            "b": {"type": "Text", "parent": "ROOT"}
        }"#;
        assert!(Document::from_node_map(shared).unwrap_err().is_layout());
    }
}
