//! Server-rendered previews
//!
//! Components that need the server to render them (fields, embedded views,
//! aggregations) request a preview and get the HTML back later. Only the
//! latest request per node counts: an older response, or one for a node
//! that has since been removed, is dropped.

use chrono::{DateTime, Utc};
use layoutsmith_core::NodeId;
use std::collections::HashMap;

/// Handle for one outstanding preview request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTicket {
    node_id: NodeId,
    generation: u64,
}

impl PreviewTicket {
    /// Node the preview is for
    pub fn node_id(&self) -> &str {
        &self.node_id
    }
}

/// A received preview
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub html: String,
    pub received_at: DateTime<Utc>,
}

/// Latest preview per node
#[derive(Debug, Default)]
pub struct PreviewStore {
    pending: HashMap<NodeId, u64>,
    previews: HashMap<NodeId, Preview>,
    next_generation: u64,
}

impl PreviewStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `node_id`, superseding any earlier one
    pub fn request(&mut self, node_id: &str) -> PreviewTicket {
        self.next_generation += 1;
        self.pending
            .insert(node_id.to_string(), self.next_generation);
        PreviewTicket {
            node_id: node_id.to_string(),
            generation: self.next_generation,
        }
    }

    /// Deliver a response; returns `false` if it was stale and dropped
    pub fn receive(&mut self, ticket: &PreviewTicket, html: impl Into<String>) -> bool {
        if self.pending.get(&ticket.node_id) != Some(&ticket.generation) {
            tracing::trace!(node = %ticket.node_id, "dropping stale preview");
            return false;
        }
        self.pending.remove(&ticket.node_id);
        self.previews.insert(
            ticket.node_id.clone(),
            Preview {
                html: html.into(),
                received_at: Utc::now(),
            },
        );
        true
    }

    /// Latest preview of a node
    pub fn get(&self, node_id: &str) -> Option<&Preview> {
        self.previews.get(node_id)
    }

    /// Whether a request for the node is outstanding
    pub fn is_pending(&self, node_id: &str) -> bool {
        self.pending.contains_key(node_id)
    }

    /// Forget a node that left the editor
    pub fn unmount(&mut self, node_id: &str) {
        self.pending.remove(node_id);
        self.previews.remove(node_id);
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.pending.clear();
        self.previews.clear();
    }

    /// Number of stored previews
    pub fn len(&self) -> usize {
        self.previews.len()
    }

    /// Whether no preview is stored
    pub fn is_empty(&self) -> bool {
        self.previews.is_empty()
    }
}
