//! Error types for layoutsmith
//!
//! This module provides unified error handling across the builder data layer,
//! including relation path errors, editor graph errors, layout wire errors,
//! and IO/serialization errors.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for layoutsmith
#[derive(Debug, Error)]
pub enum BuilderError {
    // ========================================================================
    // Relation Errors
    // ========================================================================
    /// A relation path failed to parse or names a table/key absent from the schema
    #[error("Invalid relation path '{path}': {reason}")]
    InvalidRelationPath { path: String, reason: String },

    // ========================================================================
    // Layout Errors
    // ========================================================================
    /// The serializer met a component type it has no adapter for
    #[error("No adapter for component type '{0}'")]
    UnmappedLeafVariant(String),

    /// A slot operation was asked for outside the valid index range
    #[error("Slot operation '{op}' out of range at index {index} (slot count {count})")]
    OutOfRangeSlotOperation {
        op: String,
        index: usize,
        count: usize,
    },

    /// A multi-slot component broke its slot invariants
    #[error("Slot invariant violated on '{kind}': {message}")]
    SlotInvariant { kind: String, message: String },

    /// Malformed layout wire data
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    // ========================================================================
    // Editor Graph Errors
    // ========================================================================
    /// Editor node not found
    #[error("Editor node not found: {0}")]
    NodeNotFound(String),

    /// Children were added to a node that cannot hold them
    #[error("Editor node '{0}' is not a canvas")]
    NotACanvas(String),

    /// The operation needs a node that lives in a parent canvas
    #[error("Editor node '{0}' has no parent canvas")]
    Detached(String),

    // ========================================================================
    // IO Errors
    // ========================================================================
    /// File IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// File read error
    #[error("Failed to read file '{path}': {message}")]
    FileRead { path: PathBuf, message: String },

    /// File write error
    #[error("Failed to write file '{path}': {message}")]
    FileWrite { path: PathBuf, message: String },

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, found {found}")]
    SchemaVersionMismatch { expected: u32, found: u32 },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error with context
    #[error("{context}: {message}")]
    WithContext { context: String, message: String },
}

impl BuilderError {
    /// Create an invalid relation path error
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        BuilderError::InvalidRelationPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid layout error
    pub fn invalid_layout(msg: impl Into<String>) -> Self {
        BuilderError::InvalidLayout(msg.into())
    }

    /// Create a slot invariant error
    pub fn slot_invariant(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        BuilderError::SlotInvariant {
            kind: kind.into(),
            message: msg.into(),
        }
    }

    /// Create a node not found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        BuilderError::NodeNotFound(id.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        BuilderError::Internal(msg.into())
    }

    /// Create an error with context
    pub fn with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        BuilderError::WithContext {
            context: context.into(),
            message: msg.into(),
        }
    }

    /// Check if this error concerns a relation path
    pub fn is_relation(&self) -> bool {
        matches!(self, BuilderError::InvalidRelationPath { .. })
    }

    /// Check if this error is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, BuilderError::NodeNotFound(_))
    }

    /// Check if this error concerns layout structure
    pub fn is_layout(&self) -> bool {
        matches!(
            self,
            BuilderError::InvalidLayout(_)
                | BuilderError::UnmappedLeafVariant(_)
                | BuilderError::SlotInvariant { .. }
                | BuilderError::OutOfRangeSlotOperation { .. }
        )
    }

    /// Check if this error is an IO error
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            BuilderError::Io(_) | BuilderError::FileRead { .. } | BuilderError::FileWrite { .. }
        )
    }
}

/// Result type alias using BuilderError
pub type BuilderResult<T> = Result<T, BuilderError>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn with_context<C: Into<String>>(self, context: C) -> BuilderResult<T>;
}

impl<T, E: Into<BuilderError>> ResultExt<T> for Result<T, E> {
    fn with_context<C: Into<String>>(self, context: C) -> BuilderResult<T> {
        self.map_err(|e| {
            let err: BuilderError = e.into();
            BuilderError::WithContext {
                context: context.into(),
                message: err.to_string(),
            }
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_path_error() {
        let err = BuilderError::invalid_path(".artists.nope", "no key 'nope' on 'artists'");
        assert!(err.is_relation());
        assert!(!err.is_layout());
        assert_eq!(
            err.to_string(),
            "Invalid relation path '.artists.nope': no key 'nope' on 'artists'"
        );
    }

    #[test]
    fn test_layout_errors() {
        let err = BuilderError::UnmappedLeafVariant("Carousel".to_string());
        assert!(err.is_layout());
        assert_eq!(err.to_string(), "No adapter for component type 'Carousel'");

        let err = BuilderError::OutOfRangeSlotOperation {
            op: "move".to_string(),
            index: 3,
            count: 3,
        };
        assert!(err.is_layout());
        assert_eq!(
            err.to_string(),
            "Slot operation 'move' out of range at index 3 (slot count 3)"
        );
    }

    #[test]
    fn test_slot_invariant_error() {
        let err = BuilderError::slot_invariant("tabs", "titles has 2 entries, expected 3");
        assert_eq!(
            err.to_string(),
            "Slot invariant violated on 'tabs': titles has 2 entries, expected 3"
        );
    }

    #[test]
    fn test_not_found_error() {
        let err = BuilderError::node_not_found("abc");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Editor node not found: abc");
    }

    #[test]
    fn test_error_with_context() {
        let err = BuilderError::with_context("Saving layout", "Permission denied");
        assert_eq!(err.to_string(), "Saving layout: Permission denied");
    }

    #[test]
    fn test_result_ext_wraps_json_error() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{");
        let err = result.with_context("Reading node map").unwrap_err();
        assert!(err.to_string().starts_with("Reading node map: JSON serialization error"));
    }

    #[test]
    fn test_io_error_classification() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BuilderError = io_err.into();
        assert!(err.is_io());
    }
}
