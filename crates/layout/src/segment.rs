//! Layout values
//!
//! A [`LayoutSegment`] is the tree the server stores and renders. It is
//! written as JSON with a small set of shape rules:
//!
//! - a vertical stack is `{"above": [...]}`
//! - columns are `{"besides": [...], "widths": [...]}`
//! - other multi-slot components, the container and the leaves carry a
//!   `"type"` tag, with their props spread alongside it
//!
//! The shape rules do not fit a derived serde representation, so
//! [`LayoutSegment::to_value`] and [`LayoutSegment::from_value`] do the
//! conversion by hand and the serde impls delegate to them.

use crate::column::ColumnSpec;
use crate::kinds::{CONTAINER_TAG, LeafKind, SlotKind};
use layoutsmith_core::{BuilderError, BuilderResult, Props, Validatable};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Key of a vertical stack's children
pub const ABOVE: &str = "above";

/// Key of a column split's children
pub const BESIDES: &str = "besides";

/// Key of the component tag
pub const TYPE: &str = "type";

/// Key of a container's or slot component's children
pub const CONTENTS: &str = "contents";

/// Number of slots of a multi-slot component
pub const SLOT_COUNT: &str = "slot_count";

/// Index of the slot being edited
pub const CURRENT_SLOT: &str = "current_slot";

// ============================================================================
// Leaf
// ============================================================================

/// A component without child content
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub kind: LeafKind,
    pub props: Props,
}

impl Leaf {
    /// Create a leaf
    pub fn new(kind: LeafKind, props: Props) -> Self {
        Self { kind, props }
    }

    /// Create a leaf with no props
    pub fn bare(kind: LeafKind) -> Self {
        Self::new(kind, Props::new())
    }

    /// Builder: set a prop
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Relation path carried by a relation-capable leaf
    pub fn relation(&self) -> Option<&str> {
        self.kind
            .relation_prop()
            .and_then(|key| layoutsmith_core::prop_str(&self.props, key))
            .filter(|path| !path.is_empty())
    }
}

// ============================================================================
// Container
// ============================================================================

/// A styled wrapper around one region of content
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    pub contents: Option<Box<LayoutSegment>>,
    pub props: Props,
}

impl Container {
    /// Create a container around `contents`
    pub fn new(contents: Option<LayoutSegment>) -> Self {
        Self {
            contents: contents.map(Box::new),
            props: Props::new(),
        }
    }
}

// ============================================================================
// MultiSlot
// ============================================================================

/// A component holding an ordered set of child slots
///
/// Well-formed values keep `contents.len() == slot_count`, every per-slot
/// array at length `slot_count`, and `current_slot < slot_count` whenever
/// there is at least one slot.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiSlot {
    pub kind: SlotKind,
    pub slot_count: usize,
    pub current_slot: usize,

    /// One entry per slot; `None` is an empty slot
    pub contents: Vec<Option<LayoutSegment>>,

    /// Props holding one entry per slot, keyed by prop name
    pub slot_props: BTreeMap<String, Vec<Value>>,

    /// Remaining props
    pub props: Props,
}

impl MultiSlot {
    /// Create a component with `slot_count` empty slots
    ///
    /// Per-slot props start at their defaults.
    pub fn new(kind: SlotKind, slot_count: usize) -> Self {
        let slot_props = kind
            .per_slot_keys()
            .iter()
            .filter_map(|key| {
                kind.slot_default(key)
                    .map(|d| (key.to_string(), vec![d; slot_count]))
            })
            .collect();
        Self {
            kind,
            slot_count,
            current_slot: 0,
            contents: vec![None; slot_count],
            slot_props,
            props: Props::new(),
        }
    }

    /// Create a component from its slot contents
    pub fn from_contents(kind: SlotKind, contents: Vec<Option<LayoutSegment>>) -> Self {
        let mut slots = Self::new(kind, contents.len());
        slots.contents = contents;
        slots
    }

    /// Builder: set a per-slot prop
    pub fn with_slot_prop(mut self, key: impl Into<String>, values: Vec<Value>) -> Self {
        self.slot_props.insert(key.into(), values);
        self
    }

    /// Builder: set the slot being edited
    pub fn with_current_slot(mut self, current: usize) -> Self {
        self.current_slot = current;
        self
    }

    /// Get a per-slot prop
    pub fn slot_prop(&self, key: &str) -> Option<&[Value]> {
        self.slot_props.get(key).map(Vec::as_slice)
    }

    /// Check the slot invariants
    pub fn check(&self) -> BuilderResult<()> {
        let kind = self.kind.display_name();
        if self.contents.len() != self.slot_count {
            return Err(BuilderError::slot_invariant(
                kind,
                format!(
                    "{} content entries for {} slots",
                    self.contents.len(),
                    self.slot_count
                ),
            ));
        }
        for (key, values) in &self.slot_props {
            if values.len() != self.slot_count {
                return Err(BuilderError::slot_invariant(
                    kind,
                    format!(
                        "'{}' has {} entries for {} slots",
                        key,
                        values.len(),
                        self.slot_count
                    ),
                ));
            }
        }
        if self.slot_count > 0 && self.current_slot >= self.slot_count {
            return Err(BuilderError::slot_invariant(
                kind,
                format!(
                    "current slot {} is past the last slot {}",
                    self.current_slot,
                    self.slot_count - 1
                ),
            ));
        }
        Ok(())
    }

    fn to_value(&self) -> Value {
        let mut map = self.props.clone();
        for (key, values) in &self.slot_props {
            map.insert(key.clone(), Value::Array(values.clone()));
        }
        map.insert(SLOT_COUNT.into(), self.slot_count.into());
        map.insert(CURRENT_SLOT.into(), self.current_slot.into());

        let contents = Value::Array(self.contents.iter().map(optional_to_value).collect());
        match self.kind {
            SlotKind::Columns => {
                map.insert(BESIDES.into(), contents);
            }
            other => {
                map.insert(TYPE.into(), other.tag().into());
                map.insert(CONTENTS.into(), contents);
            }
        }
        Value::Object(map)
    }

    fn from_wire(kind: SlotKind, contents: Value, mut map: Map<String, Value>) -> BuilderResult<Self> {
        let contents = match contents {
            Value::Array(items) => items
                .into_iter()
                .map(optional_from_value)
                .collect::<BuilderResult<Vec<_>>>()?,
            other => {
                return Err(BuilderError::invalid_layout(format!(
                    "{} contents must be a list, found {}",
                    kind.display_name(),
                    other
                )));
            }
        };

        let slot_count = match map.remove(SLOT_COUNT) {
            Some(value) => value.as_u64().map(|n| n as usize).ok_or_else(|| {
                BuilderError::invalid_layout(format!("slot_count must be a count, found {}", value))
            })?,
            None => contents.len(),
        };
        let current_slot = map
            .remove(CURRENT_SLOT)
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(0);

        let mut slot_props = BTreeMap::new();
        for key in kind.per_slot_keys() {
            match map.remove(*key) {
                Some(Value::Array(values)) => {
                    slot_props.insert(key.to_string(), values);
                }
                Some(other) => {
                    return Err(BuilderError::invalid_layout(format!(
                        "'{}' must be a list, found {}",
                        key, other
                    )));
                }
                None => {}
            }
        }

        Ok(Self {
            kind,
            slot_count,
            current_slot,
            contents,
            slot_props,
            props: map,
        })
    }
}

// ============================================================================
// LayoutSegment
// ============================================================================

/// A node of the stored layout tree
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutSegment {
    Leaf(Leaf),
    Container(Container),
    /// Children laid out top to bottom
    Stack(Vec<LayoutSegment>),
    /// Columns, tabs, table rows or list columns
    Slots(MultiSlot),
}

impl LayoutSegment {
    /// Create a leaf segment
    pub fn leaf(kind: LeafKind, props: Props) -> Self {
        LayoutSegment::Leaf(Leaf::new(kind, props))
    }

    /// Create a column split from its children and widths
    pub fn split(children: Vec<Option<LayoutSegment>>, widths: Vec<Value>) -> Self {
        LayoutSegment::Slots(
            MultiSlot::from_contents(SlotKind::Columns, children).with_slot_prop("widths", widths),
        )
    }

    /// Get the multi-slot component, if this is one
    pub fn as_slots(&self) -> Option<&MultiSlot> {
        match self {
            LayoutSegment::Slots(slots) => Some(slots),
            _ => None,
        }
    }

    /// Get the leaf, if this is one
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            LayoutSegment::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    /// Short name used in logs and validation messages
    pub fn describe(&self) -> &'static str {
        match self {
            LayoutSegment::Leaf(leaf) => leaf.kind.display_name(),
            LayoutSegment::Container(_) => "Container",
            LayoutSegment::Stack(_) => "Stack",
            LayoutSegment::Slots(slots) => slots.kind.display_name(),
        }
    }

    /// Convert to the stored JSON shape
    pub fn to_value(&self) -> Value {
        match self {
            LayoutSegment::Leaf(leaf) => {
                let mut map = leaf.props.clone();
                map.insert(TYPE.into(), leaf.kind.tag().into());
                Value::Object(map)
            }
            LayoutSegment::Container(container) => {
                let mut map = container.props.clone();
                map.insert(TYPE.into(), CONTAINER_TAG.into());
                map.insert(
                    CONTENTS.into(),
                    container
                        .contents
                        .as_deref()
                        .map_or(Value::Null, LayoutSegment::to_value),
                );
                Value::Object(map)
            }
            LayoutSegment::Stack(children) => {
                let mut map = Map::new();
                map.insert(
                    ABOVE.into(),
                    Value::Array(children.iter().map(LayoutSegment::to_value).collect()),
                );
                Value::Object(map)
            }
            LayoutSegment::Slots(slots) => slots.to_value(),
        }
    }

    /// Parse the stored JSON shape
    pub fn from_value(value: Value) -> BuilderResult<Self> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(BuilderError::invalid_layout(format!(
                    "expected a layout object, found {}",
                    other
                )));
            }
        };

        if let Some(above) = map.remove(ABOVE) {
            let children = match above {
                Value::Array(items) => items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(LayoutSegment::from_value)
                    .collect::<BuilderResult<Vec<_>>>()?,
                other => {
                    return Err(BuilderError::invalid_layout(format!(
                        "'above' must be a list, found {}",
                        other
                    )));
                }
            };
            return Ok(LayoutSegment::Stack(children));
        }

        if let Some(besides) = map.remove(BESIDES) {
            return MultiSlot::from_wire(SlotKind::Columns, besides, map).map(LayoutSegment::Slots);
        }

        let tag = match map.remove(TYPE) {
            Some(Value::String(tag)) => tag,
            Some(other) => {
                return Err(BuilderError::invalid_layout(format!(
                    "'type' must be a string, found {}",
                    other
                )));
            }
            None => {
                return Err(BuilderError::invalid_layout(
                    "segment has neither 'above', 'besides' nor 'type'",
                ));
            }
        };

        if tag == CONTAINER_TAG {
            let contents = match map.remove(CONTENTS) {
                Some(value) => optional_from_value(value)?,
                None => None,
            };
            return Ok(LayoutSegment::Container(Container {
                contents: contents.map(Box::new),
                props: map,
            }));
        }

        if let Some(kind) = SlotKind::from_tag(&tag) {
            let contents = map.remove(CONTENTS).unwrap_or(Value::Array(Vec::new()));
            return MultiSlot::from_wire(kind, contents, map).map(LayoutSegment::Slots);
        }

        match LeafKind::from_tag(&tag) {
            Some(kind) => Ok(LayoutSegment::leaf(kind, map)),
            None => Err(BuilderError::UnmappedLeafVariant(tag)),
        }
    }

    /// Collapse the value into the form the editor round-trips
    ///
    /// Empty stacks and containers vanish, single-child stacks are replaced
    /// by their child. Returns `None` when nothing is left.
    pub fn normalized(self) -> Option<LayoutSegment> {
        match self {
            LayoutSegment::Leaf(leaf) => Some(LayoutSegment::Leaf(leaf)),
            LayoutSegment::Container(container) => Some(LayoutSegment::Container(Container {
                contents: container
                    .contents
                    .and_then(|c| c.normalized())
                    .map(Box::new),
                props: container.props,
            })),
            LayoutSegment::Stack(children) => {
                let mut children: Vec<_> = children
                    .into_iter()
                    .filter_map(LayoutSegment::normalized)
                    .collect();
                match children.len() {
                    0 => None,
                    1 => children.pop(),
                    _ => Some(LayoutSegment::Stack(children)),
                }
            }
            LayoutSegment::Slots(mut slots) => {
                slots.contents = slots
                    .contents
                    .into_iter()
                    .map(|c| c.and_then(LayoutSegment::normalized))
                    .collect();
                Some(LayoutSegment::Slots(slots))
            }
        }
    }

    /// Visit every segment depth first, parents before children
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a LayoutSegment)) {
        f(self);
        match self {
            LayoutSegment::Leaf(_) => {}
            LayoutSegment::Container(container) => {
                if let Some(contents) = container.contents.as_deref() {
                    contents.visit(f);
                }
            }
            LayoutSegment::Stack(children) => {
                for child in children {
                    child.visit(f);
                }
            }
            LayoutSegment::Slots(slots) => {
                for child in slots.contents.iter().flatten() {
                    child.visit(f);
                }
            }
        }
    }

    /// Every leaf, in traversal order
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.visit(&mut |segment| {
            if let LayoutSegment::Leaf(leaf) = segment {
                out.push(leaf);
            }
        });
        out
    }

    /// The columns list of this layout
    pub fn columns(&self) -> Vec<ColumnSpec> {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| {
                leaf.kind
                    .column_kind()
                    .map(|kind| ColumnSpec::new(kind, leaf.props.clone()))
            })
            .collect()
    }

    /// Number of segments in the tree
    pub fn segment_count(&self) -> usize {
        let mut count = 0;
        self.visit(&mut |_| count += 1);
        count
    }
}

fn optional_to_value(segment: &Option<LayoutSegment>) -> Value {
    segment.as_ref().map_or(Value::Null, LayoutSegment::to_value)
}

fn optional_from_value(value: Value) -> BuilderResult<Option<LayoutSegment>> {
    match value {
        Value::Null => Ok(None),
        other => LayoutSegment::from_value(other).map(Some),
    }
}

impl Serialize for LayoutSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LayoutSegment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        LayoutSegment::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl Validatable for LayoutSegment {
    fn validate(&self) -> BuilderResult<()> {
        let mut result = Ok(());
        self.visit(&mut |segment| {
            if let LayoutSegment::Slots(slots) = segment {
                if result.is_ok() {
                    result = slots.check();
                }
            }
        });
        result
    }

    fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        self.visit(&mut |segment| {
            if let LayoutSegment::Slots(slots) = segment {
                if let Err(err) = slots.check() {
                    errors.push(err.to_string());
                }
            }
        });
        errors
    }
}

// ============================================================================
// Tests
// ============================================================================
