//! Editor graph ⇄ layout translation
//!
//! [`to_layout`] walks an editor subtree and produces the stored layout
//! together with the flat columns list. [`to_nodes`] goes the other way and
//! materializes a layout as editor nodes.
//!
//! For any layout in normalized form (see [`LayoutSegment::normalized`]),
//! materializing it into an empty canvas and serializing that canvas gives
//! the same layout back.

use crate::column::ColumnSpec;
use crate::editor::{EditorGraph, EditorNode, NodeDescriptor};
use crate::kinds::{ComponentKind, SlotKind};
use crate::segment::{CURRENT_SLOT, Container, LayoutSegment, Leaf, MultiSlot, SLOT_COUNT};
use layoutsmith_core::{BuilderError, BuilderResult, NodeId, Props, prop_usize};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Result of serializing an editor subtree
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutOutput {
    /// `None` when the subtree holds nothing
    pub layout: Option<LayoutSegment>,
    pub columns: Vec<ColumnSpec>,
}

// ============================================================================
// Editor graph → layout
// ============================================================================

/// Serialize the subtree rooted at `root_id`
///
/// Nodes whose type has no adapter are logged and left out, together with
/// everything below them.
pub fn to_layout<G: EditorGraph + ?Sized>(graph: &G, root_id: &str) -> BuilderResult<LayoutOutput> {
    if graph.node(root_id).is_none() {
        return Err(BuilderError::node_not_found(root_id));
    }
    let mut walk = Walk {
        graph,
        columns: Vec::new(),
    };
    let layout = walk.segment(root_id);
    debug!(
        root = %root_id,
        columns = walk.columns.len(),
        empty = layout.is_none(),
        "serialized editor subtree"
    );
    Ok(LayoutOutput {
        layout,
        columns: walk.columns,
    })
}

struct Walk<'g, G: ?Sized> {
    graph: &'g G,
    columns: Vec<ColumnSpec>,
}

impl<'g, G: EditorGraph + ?Sized> Walk<'g, G> {
    fn segment(&mut self, id: &str) -> Option<LayoutSegment> {
        let graph = self.graph;
        let Some(node) = graph.node(id) else {
            warn!(node = %id, "editor node vanished during serialization");
            return None;
        };
        let kind = match ComponentKind::resolve(&node.type_name) {
            Ok(kind) => kind,
            Err(err) => {
                warn!(node = %id, "skipping subtree: {}", err);
                return None;
            }
        };

        match kind {
            ComponentKind::Canvas => self.canvas(node),
            ComponentKind::Container => Some(LayoutSegment::Container(Container {
                contents: self.canvas(node).map(Box::new),
                props: node.props.clone(),
            })),
            ComponentKind::Leaf(kind) => {
                if let Some(column) = kind.column_kind() {
                    self.columns.push(ColumnSpec::new(column, node.props.clone()));
                }
                Some(LayoutSegment::Leaf(Leaf::new(kind, node.props.clone())))
            }
            ComponentKind::Slots(kind) => Some(LayoutSegment::Slots(self.slots(kind, node))),
        }
    }

    /// Positional children: none, one (elided) or a stack
    fn canvas(&mut self, node: &EditorNode) -> Option<LayoutSegment> {
        let mut segments: Vec<_> = node
            .child_ids
            .iter()
            .filter_map(|child| self.segment(child))
            .collect();
        match segments.len() {
            0 => None,
            1 => segments.pop(),
            _ => Some(LayoutSegment::Stack(segments)),
        }
    }

    fn slots(&mut self, kind: SlotKind, node: &EditorNode) -> MultiSlot {
        let mut props = node.props.clone();
        let slot_count = prop_usize(&props, SLOT_COUNT).unwrap_or(node.linked_node_ids.len());
        let current_slot = prop_usize(&props, CURRENT_SLOT).unwrap_or(0);
        props.remove(SLOT_COUNT);
        props.remove(CURRENT_SLOT);

        let mut slot_props = BTreeMap::new();
        for key in kind.per_slot_keys() {
            if let Some(Value::Array(values)) = props.remove(*key) {
                slot_props.insert(key.to_string(), values);
            }
        }

        let contents = (0..slot_count)
            .map(|index| {
                let name = kind.slot_name(index);
                match node.linked_node_ids.get(&name) {
                    Some(child) => self.segment(child),
                    None => {
                        warn!(node = %node.id, slot = %name, "slot canvas missing");
                        None
                    }
                }
            })
            .collect();

        MultiSlot {
            kind,
            slot_count,
            current_slot,
            contents,
            slot_props,
            props,
        }
    }
}

// ============================================================================
// Layout → editor graph
// ============================================================================

/// Materialize `layout` under `parent_id`, starting at `index`
///
/// A top-level stack is spliced into the parent, one node per child.
/// Returns the ids of the nodes created directly under the parent.
pub fn to_nodes<G: EditorGraph + ?Sized>(
    graph: &mut G,
    layout: &LayoutSegment,
    parent_id: &str,
    index: Option<usize>,
) -> BuilderResult<Vec<NodeId>> {
    let descriptors = canvas_children(Some(layout));
    let mut ids = Vec::with_capacity(descriptors.len());
    for (offset, descriptor) in descriptors.into_iter().enumerate() {
        let at = index.map(|i| i + offset);
        ids.push(graph.add(descriptor, parent_id, at)?);
    }
    debug!(parent = %parent_id, created = ids.len(), "materialized layout");
    Ok(ids)
}

/// Editor subtree for one segment
///
/// A stack becomes a plain canvas holding its children.
pub fn descriptor_for(segment: &LayoutSegment) -> NodeDescriptor {
    match segment {
        LayoutSegment::Stack(_) => {
            NodeDescriptor::canvas().with_children(canvas_children(Some(segment)))
        }
        LayoutSegment::Leaf(leaf) => {
            NodeDescriptor::new(ComponentKind::Leaf(leaf.kind), leaf.props.clone())
        }
        LayoutSegment::Container(container) => {
            NodeDescriptor::new(ComponentKind::Container, container.props.clone())
                .with_children(canvas_children(container.contents.as_deref()))
        }
        LayoutSegment::Slots(slots) => slots_descriptor(slots),
    }
}

fn canvas_children(segment: Option<&LayoutSegment>) -> Vec<NodeDescriptor> {
    match segment {
        None => Vec::new(),
        Some(LayoutSegment::Stack(children)) => children.iter().map(descriptor_for).collect(),
        Some(other) => vec![descriptor_for(other)],
    }
}

fn slots_descriptor(slots: &MultiSlot) -> NodeDescriptor {
    let mut props: Props = slots.props.clone();
    for (key, values) in &slots.slot_props {
        props.insert(key.clone(), Value::Array(values.clone()));
    }
    props.insert(SLOT_COUNT.into(), slots.slot_count.into());
    props.insert(CURRENT_SLOT.into(), slots.current_slot.into());

    slots.contents.iter().enumerate().fold(
        NodeDescriptor::new(ComponentKind::Slots(slots.kind), props),
        |node, (index, content)| {
            node.with_linked(
                slots.kind.slot_name(index),
                NodeDescriptor::canvas().with_children(canvas_children(content.as_ref())),
            )
        },
    )
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnKind;
    use crate::editor::Document;
    use crate::kinds::LeafKind;
    use layoutsmith_core::ROOT_NODE_ID;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn text(s: &str) -> LayoutSegment {
        LayoutSegment::Leaf(Leaf::bare(LeafKind::Text).with_prop("contents", s))
    }

    fn field(name: &str) -> LayoutSegment {
        LayoutSegment::Leaf(Leaf::bare(LeafKind::Field).with_prop("field_name", name))
    }

    #[test]
    fn test_empty_canvas() {
        let doc = Document::new();
        let out = to_layout(&doc, ROOT_NODE_ID).unwrap();
        assert_eq!(out, LayoutOutput::default());
        assert!(to_layout(&doc, "nope").unwrap_err().is_not_found());
    }

    #[test]
    fn test_single_child_is_elided() {
        let mut doc = Document::new();
        to_nodes(&mut doc, &text("hello"), ROOT_NODE_ID, None).unwrap();
        let out = to_layout(&doc, ROOT_NODE_ID).unwrap();
        assert_eq!(out.layout, Some(text("hello")));
    }

    #[test]
    fn test_top_level_stack_is_spliced() {
        let mut doc = Document::new();
        let layout = LayoutSegment::Stack(vec![text("a"), text("b"), text("c")]);
        let ids = to_nodes(&mut doc, &layout, ROOT_NODE_ID, None).unwrap();
        assert_eq!(ids.len(), 3);
        assert_eq!(doc.node(ROOT_NODE_ID).unwrap().child_ids, ids);
    }

    #[test]
    fn test_nested_stack_becomes_canvas() {
        let mut doc = Document::new();
        let layout = LayoutSegment::Stack(vec![
            text("a"),
            LayoutSegment::Stack(vec![text("b"), text("c")]),
        ]);
        let ids = to_nodes(&mut doc, &layout, ROOT_NODE_ID, None).unwrap();
        assert_eq!(doc.node(&ids[1]).unwrap().type_name, "Canvas");
        assert_eq!(to_layout(&doc, ROOT_NODE_ID).unwrap().layout, Some(layout));
    }

    #[test]
    fn test_insert_at_index() {
        let mut doc = Document::new();
        to_nodes(&mut doc, &LayoutSegment::Stack(vec![text("a"), text("d")]), ROOT_NODE_ID, None).unwrap();
        to_nodes(&mut doc, &LayoutSegment::Stack(vec![text("b"), text("c")]), ROOT_NODE_ID, Some(1)).unwrap();
        assert_eq!(
            to_layout(&doc, ROOT_NODE_ID).unwrap().layout,
            Some(LayoutSegment::Stack(vec![text("a"), text("b"), text("c"), text("d")]))
        );
    }

    #[test]
    fn test_columns_follow_traversal_order() {
        let mut doc = Document::new();
        let layout = LayoutSegment::Stack(vec![
            field("name"),
            LayoutSegment::split(
                vec![
                    Some(LayoutSegment::leaf(LeafKind::Action, Props::new())),
                    Some(field("age")),
                ],
                vec![json!(6), json!(6)],
            ),
        ]);
        to_nodes(&mut doc, &layout, ROOT_NODE_ID, None).unwrap();
        let out = to_layout(&doc, ROOT_NODE_ID).unwrap();
        let kinds: Vec<_> = out.columns.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![ColumnKind::Field, ColumnKind::Action, ColumnKind::Field]);
        assert_eq!(out.columns, layout.columns());
    }

    #[test]
    fn test_slot_contents_use_linked_canvases() {
        let mut doc = Document::new();
        let tabs = LayoutSegment::Slots(
            MultiSlot::from_contents(
                SlotKind::Tabs,
                vec![Some(LayoutSegment::Stack(vec![text("x"), text("y")])), None],
            )
            .with_slot_prop("titles", vec![json!("A"), json!("B")])
            .with_current_slot(1),
        );
        let ids = to_nodes(&mut doc, &tabs, ROOT_NODE_ID, None).unwrap();
        let node = doc.node(&ids[0]).unwrap();
        assert_eq!(node.props["slot_count"], json!(2));
        assert_eq!(node.props["titles"], json!(["A", "B"]));
        let tab0 = doc.node(&node.linked_node_ids["Tab0"]).unwrap();
        assert_eq!(tab0.child_ids.len(), 2);

        assert_eq!(to_layout(&doc, ROOT_NODE_ID).unwrap().layout, Some(tabs));
    }

    #[test]
    fn test_unmapped_node_is_skipped() {
        let mut doc = Document::new();
        to_nodes(&mut doc, &text("kept"), ROOT_NODE_ID, None).unwrap();
        let odd = NodeDescriptor {
            type_name: "Carousel".into(),
            display_name: "Carousel".into(),
            is_canvas: true,
            props: Props::new(),
            children: vec![descriptor_for(&field("hidden"))],
            linked: BTreeMap::new(),
        };
        doc.add(odd, ROOT_NODE_ID, None).unwrap();

        let out = to_layout(&doc, ROOT_NODE_ID).unwrap();
        assert_eq!(out.layout, Some(text("kept")));
        assert!(out.columns.is_empty());
    }

    #[test]
    fn test_container_round_trip() {
        let mut container = Container::new(Some(LayoutSegment::Stack(vec![text("a"), field("b")])));
        container.props.insert("borderWidth".into(), json!(1));
        let layout = LayoutSegment::Container(container);

        let mut doc = Document::new();
        to_nodes(&mut doc, &layout, ROOT_NODE_ID, None).unwrap();
        let out = to_layout(&doc, ROOT_NODE_ID).unwrap();
        assert_eq!(out.layout, Some(layout));
        assert_eq!(out.columns.len(), 1);
    }
}
