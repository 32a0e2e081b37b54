//! Relation pickers
//!
//! Two front ends over a [`RelationGraph`] present it as nested flyout
//! menus. [`EagerPicker`] lays out every menu up front, down to a depth
//! ceiling. [`OnDemandPicker`] only mounts a menu once it is opened, which
//! keeps wide graphs cheap.
//!
//! Both keep the open submenus in a [`MenuStack`]: opening a submenu at
//! level `L` closes every open submenu at level `L` or deeper, so siblings
//! never stay open together.

use crate::graph::{Branch, RelationGraph, RelationGraphNode};
use crate::path::RelationKind;
use heck::ToTitleCase;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Default depth ceiling of the eager picker
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Callback receiving the selected relation path
pub type OnSelect = Box<dyn FnMut(&str)>;

/// Address of a graph node: the branches followed from the root
pub type NodeAddress = Vec<Branch>;

// ============================================================================
// MenuItem
// ============================================================================

/// One entry in a picker menu
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItem {
    /// Address of the graph node behind this entry
    pub address: NodeAddress,

    /// Text shown for the entry
    pub label: String,

    /// Path emitted when the entry is picked (`None` for navigation-only entries)
    pub rel_path: Option<String>,

    /// Whether the entry opens a submenu
    pub has_submenu: bool,

    /// Submenu entries (only filled by the eager picker)
    pub children: Vec<MenuItem>,
}

impl MenuItem {
    fn shallow(node: &RelationGraphNode, address: NodeAddress) -> Self {
        Self {
            address,
            label: menu_label(node),
            rel_path: node.rel_path.clone(),
            has_submenu: node.has_children(),
            children: Vec::new(),
        }
    }

    /// Count this entry and every nested entry
    pub fn item_count(&self) -> usize {
        1 + self.children.iter().map(MenuItem::item_count).sum::<usize>()
    }
}

/// Text shown for a graph node in a menu
pub fn menu_label(node: &RelationGraphNode) -> String {
    let table = node.table.to_title_case();
    match node.kind {
        None => table,
        Some(RelationKind::Foreign) => format!("{} ({})", node.key, table),
        Some(RelationKind::Inbound) => format!("{} via {}", table, node.key),
        Some(RelationKind::Own) => "This row".to_string(),
        Some(RelationKind::Independent) => format!("Any {}", table),
        Some(RelationKind::OneToOneShortcut) => format!("{} via {} (one-to-one)", table, node.key),
    }
}

fn child_items(node: &RelationGraphNode, address: &[Branch]) -> Vec<MenuItem> {
    node.children()
        .map(|(branch, child)| {
            let mut child_address = address.to_vec();
            child_address.push(branch);
            MenuItem::shallow(child, child_address)
        })
        .collect()
}

// ============================================================================
// MenuStack
// ============================================================================

/// Which submenus are open, one per level
///
/// `open[i]` is the address of the entry whose submenu is open at level `i`,
/// and each entry extends the one before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MenuStack {
    open: Vec<NodeAddress>,
}

impl MenuStack {
    /// Create a stack with nothing open
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the submenu of the entry at `address`
    ///
    /// Closes any open submenu at the same level or deeper. Returns `false`
    /// if the entry's own menu is not visible.
    pub fn open(&mut self, address: &[Branch]) -> bool {
        let Some(level) = address.len().checked_sub(1) else {
            return false;
        };
        if level > self.open.len() {
            return false;
        }
        if level > 0 && self.open[level - 1].as_slice() != &address[..level] {
            return false;
        }
        self.open.truncate(level);
        self.open.push(address.to_vec());
        true
    }

    /// Close every submenu
    pub fn close_all(&mut self) {
        self.open.clear();
    }

    /// Open submenus from the root down
    pub fn open_menus(&self) -> &[NodeAddress] {
        &self.open
    }

    /// Whether the submenu of `address` is open
    pub fn is_open(&self, address: &[Branch]) -> bool {
        self.open.iter().any(|a| a.as_slice() == address)
    }

    /// Whether the menu holding the entry at `address` is visible
    pub fn is_visible(&self, address: &[Branch]) -> bool {
        match address.len() {
            0 | 1 => true,
            n => self.is_open(&address[..n - 1]),
        }
    }
}

// ============================================================================
// RelationPicker
// ============================================================================

/// Interactive selection over a relation graph
pub trait RelationPicker {
    /// The graph being picked from
    fn graph(&self) -> &RelationGraph;

    /// Open the submenu of the entry at `address`
    fn open(&mut self, address: &[Branch]) -> bool;

    /// Open submenus from the root down
    fn open_menus(&self) -> &[NodeAddress];

    /// Pick the entry at `address`
    ///
    /// Calls back with its path and closes every submenu. The empty address
    /// picks the root (the current row). Returns the path, or `None` if the
    /// entry is not visible or is navigation-only.
    fn select(&mut self, address: &[Branch]) -> Option<String>;
}

// ============================================================================
// EagerPicker
// ============================================================================

/// Picker that lays out the whole graph up front
pub struct EagerPicker {
    graph: Rc<RelationGraph>,
    max_depth: usize,
    menu: Vec<MenuItem>,
    stack: MenuStack,
    on_select: OnSelect,
}

impl EagerPicker {
    /// Create a picker with the default depth ceiling
    pub fn new(graph: Rc<RelationGraph>, on_select: OnSelect) -> Self {
        Self::with_max_depth(graph, DEFAULT_MAX_DEPTH, on_select)
    }

    /// Create a picker laying out at most `max_depth` menu levels
    pub fn with_max_depth(graph: Rc<RelationGraph>, max_depth: usize, on_select: OnSelect) -> Self {
        let menu = if max_depth == 0 {
            Vec::new()
        } else {
            build_menu(graph.root(), &[], max_depth)
        };
        Self {
            graph,
            max_depth,
            menu,
            stack: MenuStack::new(),
            on_select,
        }
    }

    /// Root menu entries
    pub fn menu(&self) -> &[MenuItem] {
        &self.menu
    }

    /// Depth ceiling
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of entries laid out
    pub fn rendered_item_count(&self) -> usize {
        self.menu.iter().map(MenuItem::item_count).sum()
    }

    /// Find a laid-out entry
    pub fn item(&self, address: &[Branch]) -> Option<&MenuItem> {
        let (first, rest) = address.split_first()?;
        let mut item = self.menu.iter().find(|i| i.address.last() == Some(first))?;
        for branch in rest {
            item = item
                .children
                .iter()
                .find(|i| i.address.last() == Some(branch))?;
        }
        Some(item)
    }
}

fn build_menu(node: &RelationGraphNode, address: &[Branch], max_depth: usize) -> Vec<MenuItem> {
    node.children()
        .map(|(branch, child)| {
            let mut child_address = address.to_vec();
            child_address.push(branch);
            let mut item = MenuItem::shallow(child, child_address);
            if item.address.len() < max_depth {
                item.children = build_menu(child, &item.address, max_depth);
            }
            item.has_submenu = !item.children.is_empty();
            item
        })
        .collect()
}

impl RelationPicker for EagerPicker {
    fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    fn open(&mut self, address: &[Branch]) -> bool {
        match self.item(address) {
            Some(item) if item.has_submenu => self.stack.open(address),
            _ => false,
        }
    }

    fn open_menus(&self) -> &[NodeAddress] {
        self.stack.open_menus()
    }

    fn select(&mut self, address: &[Branch]) -> Option<String> {
        if !self.stack.is_visible(address) {
            return None;
        }
        let rel_path = if address.is_empty() {
            self.graph.root().rel_path.clone()
        } else {
            self.item(address)?.rel_path.clone()
        }?;
        tracing::debug!(path = %rel_path, "relation selected");
        (self.on_select)(&rel_path);
        self.stack.close_all();
        Some(rel_path)
    }
}

// ============================================================================
// OnDemandPicker
// ============================================================================

/// Picker that mounts each menu only while it is open
pub struct OnDemandPicker {
    graph: Rc<RelationGraph>,
    mounted: BTreeMap<NodeAddress, Vec<MenuItem>>,
    stack: MenuStack,
    on_select: OnSelect,
}

impl OnDemandPicker {
    /// Create a picker with only the root menu mounted
    pub fn new(graph: Rc<RelationGraph>, on_select: OnSelect) -> Self {
        let mut mounted = BTreeMap::new();
        mounted.insert(Vec::new(), child_items(graph.root(), &[]));
        Self {
            graph,
            mounted,
            stack: MenuStack::new(),
            on_select,
        }
    }

    /// Entries of the menu opened from `address` (empty address: root menu)
    pub fn menu(&self, address: &[Branch]) -> Option<&[MenuItem]> {
        self.mounted.get(address).map(Vec::as_slice)
    }

    /// Number of menus currently mounted, the root menu included
    pub fn mounted_menu_count(&self) -> usize {
        self.mounted.len()
    }

    fn unmount_closed(&mut self) {
        let stack = &self.stack;
        self.mounted
            .retain(|address, _| address.is_empty() || stack.is_open(address));
    }
}

impl RelationPicker for OnDemandPicker {
    fn graph(&self) -> &RelationGraph {
        &self.graph
    }

    fn open(&mut self, address: &[Branch]) -> bool {
        let Some(node) = self.graph.node_at(address) else {
            return false;
        };
        if !node.has_children() || !self.stack.open(address) {
            return false;
        }
        let items = child_items(node, address);
        self.mounted.insert(address.to_vec(), items);
        self.unmount_closed();
        true
    }

    fn open_menus(&self) -> &[NodeAddress] {
        self.stack.open_menus()
    }

    fn select(&mut self, address: &[Branch]) -> Option<String> {
        if !self.stack.is_visible(address) {
            return None;
        }
        let rel_path = self.graph.node_at(address)?.rel_path.clone()?;
        tracing::debug!(path = %rel_path, "relation selected");
        (self.on_select)(&rel_path);
        self.stack.close_all();
        self.unmount_closed();
        Some(rel_path)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SchemaSnapshot, TableSchema};
    use std::cell::RefCell;

    fn schema() -> SchemaSnapshot {
        SchemaSnapshot::new()
            .with_table(TableSchema::new("artists").with_key("agent", "agents"))
            .with_table(TableSchema::new("agents").with_key("agency", "agencies"))
            .with_table(TableSchema::new("agencies"))
            .with_table(TableSchema::new("album"))
            .with_table(
                TableSchema::new("artist_plays_on_album")
                    .with_key("artist", "artists")
                    .with_key("album", "album"),
            )
    }

    fn graph() -> Rc<RelationGraph> {
        Rc::new(RelationGraph::build(
            &[
                ".",
                ".artists.agent",
                ".artists.agent.agency",
                ".artists.artist_plays_on_album$artist.album",
            ],
            "artists",
            &schema(),
        ))
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, OnSelect) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let on_select: OnSelect = Box::new(move |p: &str| sink.borrow_mut().push(p.to_string()));
        (seen, on_select)
    }

    #[test]
    fn test_menu_labels() {
        let graph = graph();
        let agent = graph.node_at(&[Branch::Foreign(0)]).unwrap();
        assert_eq!(menu_label(agent), "agent (Agents)");
        let link = graph.node_at(&[Branch::Inbound(0)]).unwrap();
        assert_eq!(menu_label(link), "Artist Plays On Album via artist");
    }

    #[test]
    fn test_menu_stack_closes_deeper_levels() {
        let mut stack = MenuStack::new();
        let a = vec![Branch::Foreign(0)];
        let a1 = vec![Branch::Foreign(0), Branch::Foreign(0)];
        let b = vec![Branch::Inbound(0)];

        assert!(stack.open(&a));
        assert!(stack.open(&a1));
        assert_eq!(stack.open_menus().len(), 2);

        // Opening a sibling at level 0 closes a and everything under it
        assert!(stack.open(&b));
        assert_eq!(stack.open_menus(), &[b.clone()]);

        // A submenu whose parent menu is closed cannot open
        assert!(!stack.open(&a1));
        assert!(!stack.open(&[]));
    }

    #[test]
    fn test_eager_select_emits_path_and_closes() {
        let (seen, on_select) = recorder();
        let mut picker = EagerPicker::new(graph(), on_select);

        assert!(picker.open(&[Branch::Foreign(0)]));
        let picked = picker.select(&[Branch::Foreign(0), Branch::Foreign(0)]);
        assert_eq!(picked.as_deref(), Some(".artists.agent.agency"));
        assert!(picker.open_menus().is_empty());
        assert_eq!(*seen.borrow(), vec![".artists.agent.agency".to_string()]);
    }

    #[test]
    fn test_eager_navigation_only_entry() {
        let (seen, on_select) = recorder();
        let mut picker = EagerPicker::new(graph(), on_select);
        assert_eq!(picker.select(&[Branch::Inbound(0)]), None);
        assert!(seen.borrow().is_empty());
        assert_eq!(picker.select(&[]).as_deref(), Some("."));
    }

    #[test]
    fn test_eager_depth_ceiling() {
        let (_, on_select) = recorder();
        let picker = EagerPicker::with_max_depth(graph(), 1, on_select);
        assert_eq!(picker.rendered_item_count(), 2);
        assert!(picker.menu().iter().all(|i| !i.has_submenu));

        let (_, on_select) = recorder();
        let full = EagerPicker::new(graph(), on_select);
        assert_eq!(full.max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(full.rendered_item_count(), 4);
    }

    #[test]
    fn test_eager_hidden_entry_not_selectable() {
        let (_, on_select) = recorder();
        let mut picker = EagerPicker::new(graph(), on_select);
        // The submenu of agent is closed
        assert_eq!(picker.select(&[Branch::Foreign(0), Branch::Foreign(0)]), None);
    }

    #[test]
    fn test_on_demand_mounts_lazily() {
        let (seen, on_select) = recorder();
        let mut picker = OnDemandPicker::new(graph(), on_select);
        assert_eq!(picker.mounted_menu_count(), 1);
        assert_eq!(picker.menu(&[]).unwrap().len(), 2);

        assert!(picker.open(&[Branch::Inbound(0)]));
        assert_eq!(picker.mounted_menu_count(), 2);
        assert_eq!(
            picker.menu(&[Branch::Inbound(0)]).unwrap()[0].label,
            "album (Album)"
        );

        // Switching to a sibling unmounts the closed menu
        assert!(picker.open(&[Branch::Foreign(0)]));
        assert_eq!(picker.mounted_menu_count(), 2);
        assert!(picker.menu(&[Branch::Inbound(0)]).is_none());

        let picked = picker.select(&[Branch::Foreign(0), Branch::Foreign(0)]);
        assert_eq!(picked.as_deref(), Some(".artists.agent.agency"));
        assert_eq!(picker.mounted_menu_count(), 1);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_on_demand_leaf_has_no_submenu() {
        let (_, on_select) = recorder();
        let mut picker = OnDemandPicker::new(graph(), on_select);
        assert!(picker.open(&[Branch::Foreign(0)]));
        assert!(!picker.open(&[Branch::Foreign(0), Branch::Foreign(0)]));
    }
}
