//! Slot array manager
//!
//! Multi-slot components keep several arrays aligned: the per-slot props
//! (`widths`, `titles`, ...) and, for managed components, the slot contents
//! themselves. [`ArrayManager`] adds, deletes and moves slots so that every
//! array changes at the same index and the count and current index follow.
//!
//! Contents live in linked editor canvases that cannot be re-keyed in
//! place, so a managed operation serializes the component, edits the
//! value, deletes the old node and materializes the result at the same
//! position.

use crate::editor::{EditorGraph, EditorNode};
use crate::kinds::SlotKind;
use crate::segment::{CURRENT_SLOT, LayoutSegment, MultiSlot, SLOT_COUNT};
use crate::serializer::{to_layout, to_nodes};
use layoutsmith_core::{BuilderError, BuilderResult, NodeId, Props, prop_usize};
use serde_json::Value;
use tracing::{debug, info};

// ============================================================================
// Operations
// ============================================================================

/// Direction of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards index 0
    Previous,
    Next,
}

/// An edit to the slot arrays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayOp {
    /// Append a slot and make it current
    Add,
    /// Remove the current slot
    Delete,
    /// Swap the current slot with a neighbour; the current index follows
    Move(Direction),
}

impl ArrayOp {
    /// Build a move from a signed offset (`-1` or `+1`)
    pub fn shift(delta: i32) -> Option<Self> {
        match delta {
            -1 => Some(ArrayOp::Move(Direction::Previous)),
            1 => Some(ArrayOp::Move(Direction::Next)),
            _ => None,
        }
    }

    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ArrayOp::Add => "add",
            ArrayOp::Delete => "delete",
            ArrayOp::Move(Direction::Previous) => "move previous",
            ArrayOp::Move(Direction::Next) => "move next",
        }
    }

    /// Whether the op applies to `count` slots with `current` selected
    pub fn is_enabled(&self, count: usize, current: usize) -> bool {
        match self {
            ArrayOp::Add => true,
            ArrayOp::Delete => current < count,
            ArrayOp::Move(Direction::Previous) => current > 0 && current < count,
            ArrayOp::Move(Direction::Next) => current + 1 < count,
        }
    }

    /// Count and current index after the op
    fn next_position(&self, count: usize, current: usize) -> (usize, usize) {
        match self {
            ArrayOp::Add => (count + 1, count),
            ArrayOp::Delete => {
                let count = count - 1;
                (count, current.min(count.saturating_sub(1)))
            }
            ArrayOp::Move(Direction::Previous) => (count, current - 1),
            ArrayOp::Move(Direction::Next) => (count, current + 1),
        }
    }

    /// Apply the op to one array already sized to `count`
    fn splice<T>(&self, items: &mut Vec<T>, current: usize, fill: impl FnOnce() -> T) {
        match self {
            ArrayOp::Add => items.push(fill()),
            ArrayOp::Delete => {
                items.remove(current);
            }
            ArrayOp::Move(Direction::Previous) => items.swap(current, current - 1),
            ArrayOp::Move(Direction::Next) => items.swap(current, current + 1),
        }
    }
}

/// What a slot toolbar may offer right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotControls {
    pub count: usize,
    pub current: usize,
    pub can_add: bool,
    pub can_delete: bool,
    pub can_move_previous: bool,
    pub can_move_next: bool,
}

impl SlotControls {
    fn new(count: usize, current: usize) -> Self {
        Self {
            count,
            current,
            can_add: ArrayOp::Add.is_enabled(count, current),
            can_delete: ArrayOp::Delete.is_enabled(count, current),
            can_move_previous: ArrayOp::Move(Direction::Previous).is_enabled(count, current),
            can_move_next: ArrayOp::Move(Direction::Next).is_enabled(count, current),
        }
    }

    /// Whether `op` is enabled
    pub fn allows(&self, op: ArrayOp) -> bool {
        match op {
            ArrayOp::Add => self.can_add,
            ArrayOp::Delete => self.can_delete,
            ArrayOp::Move(Direction::Previous) => self.can_move_previous,
            ArrayOp::Move(Direction::Next) => self.can_move_next,
        }
    }
}

// ============================================================================
// ArrayManager
// ============================================================================

/// One array kept aligned with the slots
#[derive(Debug, Clone, PartialEq)]
pub struct SlotArray {
    pub name: String,

    /// Entry for new slots (`null` when unset)
    pub default: Option<Value>,
}

/// Keeps a component's slot arrays aligned
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayManager {
    pub count_prop: String,
    pub current_prop: String,
    pub arrays: Vec<SlotArray>,

    /// Whether slot contents move with the arrays
    pub manage_contents: bool,
}

impl ArrayManager {
    /// Create a manager for the given count and current-index props
    pub fn new(count_prop: impl Into<String>, current_prop: impl Into<String>) -> Self {
        Self {
            count_prop: count_prop.into(),
            current_prop: current_prop.into(),
            arrays: Vec::new(),
            manage_contents: false,
        }
    }

    /// The manager of a multi-slot component kind, contents included
    pub fn for_slots(kind: SlotKind) -> Self {
        kind.per_slot_keys()
            .iter()
            .fold(Self::new(SLOT_COUNT, CURRENT_SLOT), |manager, key| {
                manager.with_array(*key, kind.slot_default(key))
            })
            .managing_contents()
    }

    /// Builder: keep another prop array aligned
    pub fn with_array(mut self, name: impl Into<String>, default: Option<Value>) -> Self {
        self.arrays.push(SlotArray {
            name: name.into(),
            default,
        });
        self
    }

    /// Builder: move slot contents too
    pub fn managing_contents(mut self) -> Self {
        self.manage_contents = true;
        self
    }

    fn position(&self, props: &Props, fallback_count: usize) -> (usize, usize) {
        let count = prop_usize(props, &self.count_prop).unwrap_or(fallback_count);
        let current = prop_usize(props, &self.current_prop).unwrap_or(0);
        (count, current.min(count.saturating_sub(1)))
    }

    /// Toolbar state for a node's props
    pub fn controls(&self, props: &Props) -> SlotControls {
        let (count, current) = self.position(props, 0);
        SlotControls::new(count, current)
    }

    /// Toolbar state for an editor node
    ///
    /// Without a count prop the node's linked slots are counted, as the
    /// serializer does.
    pub fn controls_for(&self, node: &EditorNode) -> SlotControls {
        let (count, current) = self.position(&node.props, node.linked_node_ids.len());
        SlotControls::new(count, current)
    }

    fn fill(&self, array: &SlotArray) -> Value {
        array.default.clone().unwrap_or(Value::Null)
    }

    /// Apply `op` to a prop map; returns `false` if the op is disabled
    pub fn apply_to_props(&self, props: &mut Props, op: ArrayOp) -> bool {
        let (count, current) = self.position(props, 0);
        if !op.is_enabled(count, current) {
            return false;
        }
        for array in &self.arrays {
            let mut values = match props.remove(&array.name) {
                Some(Value::Array(values)) => values,
                _ => Vec::new(),
            };
            values.resize(count, self.fill(array));
            op.splice(&mut values, current, || self.fill(array));
            props.insert(array.name.clone(), Value::Array(values));
        }
        let (count, current) = op.next_position(count, current);
        props.insert(self.count_prop.clone(), count.into());
        props.insert(self.current_prop.clone(), current.into());
        true
    }

    /// Apply `op` to a multi-slot value; returns `false` if the op is disabled
    pub fn apply_to_slots(&self, slots: &mut MultiSlot, op: ArrayOp) -> bool {
        let count = slots.slot_count;
        let current = slots.current_slot.min(count.saturating_sub(1));
        if !op.is_enabled(count, current) {
            return false;
        }
        for array in &self.arrays {
            let values = slots.slot_props.entry(array.name.clone()).or_default();
            values.resize(count, self.fill(array));
            op.splice(values, current, || self.fill(array));
        }
        slots.contents.resize(count, None);
        op.splice(&mut slots.contents, current, || None);

        let (count, current) = op.next_position(count, current);
        slots.slot_count = count;
        slots.current_slot = current;
        true
    }

    /// Apply `op` to a component in the editor
    ///
    /// Returns the id of the component afterwards, which changes when
    /// contents are managed. A disabled op leaves the graph untouched.
    pub fn apply<G: EditorGraph + ?Sized>(
        &self,
        graph: &mut G,
        node_id: &str,
        op: ArrayOp,
    ) -> BuilderResult<NodeId> {
        let node = graph
            .node(node_id)
            .ok_or_else(|| BuilderError::node_not_found(node_id))?;
        let controls = self.controls_for(node);
        if !controls.allows(op) {
            debug!(node = %node_id, op = op.name(), count = controls.count, "slot operation disabled");
            return Ok(node_id.to_string());
        }

        if !self.manage_contents {
            graph.set_prop(node_id, &mut |props: &mut Props| {
                self.apply_to_props(props, op);
            })?;
            return Ok(node_id.to_string());
        }

        let (parent, index) = graph.position_in_parent(node_id)?;
        let output = to_layout(&*graph, node_id)?;
        let Some(LayoutSegment::Slots(mut slots)) = output.layout else {
            return Err(BuilderError::invalid_layout(format!(
                "node '{}' is not a multi-slot component",
                node_id
            )));
        };
        self.apply_to_slots(&mut slots, op);

        graph.delete(node_id)?;
        let created = to_nodes(graph, &LayoutSegment::Slots(slots), &parent, Some(index))?;
        let new_id = created
            .into_iter()
            .next()
            .ok_or_else(|| BuilderError::internal("rebuilt component produced no node"))?;
        graph.select_node(Some(&new_id));

        info!(old = %node_id, new = %new_id, op = op.name(), "rebuilt multi-slot component");
        Ok(new_id)
    }

    /// Make slot `index` current
    pub fn select_slot<G: EditorGraph + ?Sized>(
        &self,
        graph: &mut G,
        node_id: &str,
        index: usize,
    ) -> BuilderResult<()> {
        let node = graph
            .node(node_id)
            .ok_or_else(|| BuilderError::node_not_found(node_id))?;
        let count = self.controls_for(node).count;
        if index >= count {
            return Err(BuilderError::OutOfRangeSlotOperation {
                op: "select".to_string(),
                index,
                count,
            });
        }
        let current_prop = self.current_prop.clone();
        graph.set_prop(node_id, &mut |props: &mut Props| {
            props.insert(current_prop.clone(), index.into());
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
