//! Editing session
//!
//! One open layout editor: the document being edited, the previews shown
//! in it, the relation graphs built for its pickers and the read-only
//! configuration it was opened with. Everything that mutates the document
//! goes through here so previews and selection stay consistent with it.

use crate::array_manager::{ArrayManager, ArrayOp};
use crate::config::BuilderConfig;
use crate::editor::{Document, EditorGraph};
use crate::kinds::ComponentKind;
use crate::payload::{SavePayload, SaveRequest, SaveTarget, SnippetPayload};
use crate::preview::PreviewStore;
use crate::segment::LayoutSegment;
use crate::serializer::{to_layout, to_nodes};
use chrono::{DateTime, Utc};
use layoutsmith_core::{BuilderError, BuilderResult, NodeId};
use layoutsmith_relations::{RelationGraph, RelationGraphCache};
use std::rc::Rc;
use tracing::info;

/// State of one open editor
#[derive(Debug)]
pub struct EditingSession {
    config: BuilderConfig,
    document: Document,
    previews: PreviewStore,
    relations: RelationGraphCache,
    opened_at: DateTime<Utc>,
}

impl EditingSession {
    /// Open an empty editor
    pub fn new(config: BuilderConfig) -> Self {
        info!(mode = %config.mode, table = ?config.table_name, "opened editing session");
        Self {
            config,
            document: Document::new(),
            previews: PreviewStore::new(),
            relations: RelationGraphCache::new(),
            opened_at: Utc::now(),
        }
    }

    /// Open an editor on a saved layout
    pub fn open(config: BuilderConfig, layout: Option<&LayoutSegment>) -> BuilderResult<Self> {
        let mut session = Self::new(config);
        if let Some(layout) = layout {
            let root = session.document.root_id().to_string();
            to_nodes(&mut session.document, layout, &root, None)?;
        }
        Ok(session)
    }

    /// Session configuration
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// The document being edited
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable access to the document, for edits made by the host editor
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    /// Previews shown in the editor
    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }

    /// Mutable access to the previews
    pub fn previews_mut(&mut self) -> &mut PreviewStore {
        &mut self.previews
    }

    /// When the session was opened
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Insert a layout under `parent` at `index`
    pub fn insert(
        &mut self,
        layout: &LayoutSegment,
        parent: &str,
        index: Option<usize>,
    ) -> BuilderResult<Vec<NodeId>> {
        to_nodes(&mut self.document, layout, parent, index)
    }

    /// Insert a library snippet by name
    pub fn insert_snippet(
        &mut self,
        name: &str,
        parent: &str,
        index: Option<usize>,
    ) -> BuilderResult<Vec<NodeId>> {
        let layout = self
            .config
            .snippet(name)
            .map(|s| s.layout.clone())
            .ok_or_else(|| BuilderError::InvalidConfig(format!("no library snippet named '{}'", name)))?;
        let ids = to_nodes(&mut self.document, &layout, parent, index)?;
        info!(snippet = %name, nodes = ids.len(), "inserted library snippet");
        Ok(ids)
    }

    /// Delete a node, dropping the previews of everything under it
    pub fn delete_node(&mut self, id: &str) -> BuilderResult<()> {
        let removed = self.document.subtree_ids(id);
        self.document.delete(id)?;
        for gone in &removed {
            self.previews.unmount(gone);
        }
        Ok(())
    }

    /// Apply a slot operation to a multi-slot component
    ///
    /// Returns the id of the component afterwards.
    pub fn apply_slot_op(&mut self, id: &str, op: ArrayOp) -> BuilderResult<NodeId> {
        let node = self
            .document
            .node(id)
            .ok_or_else(|| BuilderError::node_not_found(id))?;
        let ComponentKind::Slots(kind) = ComponentKind::resolve(&node.type_name)? else {
            return Err(BuilderError::invalid_layout(format!(
                "'{}' is a {}, not a multi-slot component",
                id, node.display_name
            )));
        };

        let before = self.document.subtree_ids(id);
        let new_id = ArrayManager::for_slots(kind).apply(&mut self.document, id, op)?;
        for gone in before.iter().filter(|n| !self.document.contains(n)) {
            self.previews.unmount(gone);
        }
        Ok(new_id)
    }

    /// Serialize the whole document
    pub fn save_payload(&self) -> BuilderResult<SavePayload> {
        to_layout(&self.document, self.document.root_id()).map(SavePayload::from)
    }

    /// Build the save for a view or page
    pub fn save_request(&self, target: SaveTarget) -> BuilderResult<SaveRequest> {
        let payload = self.save_payload()?;
        info!(
            target = %target.display_name(),
            columns = payload.columns.len(),
            "prepared save"
        );
        Ok(SaveRequest {
            target,
            payload,
            requested_at: Utc::now(),
        })
    }

    /// Promote the subtree at `id` to a library snippet
    pub fn library_snippet(&self, id: &str, name: &str, icon: &str) -> BuilderResult<SnippetPayload> {
        let layout = to_layout(&self.document, id)?
            .layout
            .ok_or_else(|| BuilderError::invalid_layout(format!("'{}' holds nothing to save", id)))?;
        info!(snippet = %name, "promoted subtree to library snippet");
        Ok(SnippetPayload::new(name, icon, layout))
    }

    /// Relation graph for pickers leading to `view`
    ///
    /// Built once per view and reused for the rest of the session.
    pub fn relation_graph(&mut self, view: &str) -> BuilderResult<Rc<RelationGraph>> {
        let table = self
            .config
            .table_name
            .as_deref()
            .ok_or_else(|| BuilderError::InvalidConfig("relation pickers need a table".to_string()))?;
        Ok(self.relations.get_or_build(
            table,
            view,
            self.config.permitted_paths(view),
            &self.config.schema,
        ))
    }

    /// Close the editor, dropping previews and cached graphs
    pub fn close(mut self) {
        self.previews.clear();
        self.relations.clear();
        info!(
            open_for_ms = (Utc::now() - self.opened_at).num_milliseconds(),
            "closed editing session"
        );
    }
}

// ============================================================================
// Tests
// ============================================================================
