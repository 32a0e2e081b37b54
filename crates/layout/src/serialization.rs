//! Saving and loading layout files
//!
//! A layout file wraps a [`SavePayload`] with a schema version so older
//! files can be migrated on load. Bare payloads without the wrapper are
//! still accepted.

use crate::payload::SavePayload;
use layoutsmith_core::{BuilderError, BuilderResult, Persistable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// Constants
// ============================================================================

/// File extension for layout files
pub const LAYOUT_EXTENSION: &str = "layout.json";

/// Current layout file schema version
pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Layout File Wrapper
// ============================================================================

/// Wrapper for layout files that includes version information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutFile {
    /// Schema version for migration purposes
    pub schema_version: u32,

    /// The saved layout
    pub payload: SavePayload,
}

impl LayoutFile {
    /// Wrap a payload at the current schema version
    pub fn new(payload: SavePayload) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            payload,
        }
    }

    /// Check the schema version, migrating older files
    pub fn migrate(&mut self) -> BuilderResult<()> {
        if self.schema_version > SCHEMA_VERSION {
            return Err(BuilderError::SchemaVersionMismatch {
                expected: SCHEMA_VERSION,
                found: self.schema_version,
            });
        }
        // Version 1 is the first format; nothing to migrate yet
        self.schema_version = SCHEMA_VERSION;
        Ok(())
    }
}

// ============================================================================
// Save Functions
// ============================================================================

/// Save a layout payload to a file, creating parent directories
pub fn save_layout(payload: &SavePayload, path: impl AsRef<Path>) -> BuilderResult<()> {
    let path = path.as_ref();
    let json = save_layout_to_string(payload).map_err(|e| BuilderError::FileWrite {
        path: path.to_path_buf(),
        message: format!("Failed to serialize layout: {}", e),
    })?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| BuilderError::FileWrite {
                path: parent.to_path_buf(),
                message: e.to_string(),
            })?;
        }
    }

    std::fs::write(path, json).map_err(|e| BuilderError::FileWrite {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::info!(path = %path.display(), "saved layout");
    Ok(())
}

/// Save a layout payload to a JSON string
pub fn save_layout_to_string(payload: &SavePayload) -> BuilderResult<String> {
    serde_json::to_string_pretty(&LayoutFile::new(payload.clone())).map_err(Into::into)
}

// ============================================================================
// Load Functions
// ============================================================================

/// Load a layout payload from a file
pub fn load_layout(path: impl AsRef<Path>) -> BuilderResult<SavePayload> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|e| BuilderError::FileRead {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    load_layout_from_string(&json).map_err(|e| match e {
        BuilderError::JsonSerialization(je) => BuilderError::FileRead {
            path: path.to_path_buf(),
            message: format!("Invalid layout file format: {}", je),
        },
        other => other,
    })
}

/// Load a layout payload from a JSON string
pub fn load_layout_from_string(json: &str) -> BuilderResult<SavePayload> {
    if let Ok(mut file) = serde_json::from_str::<LayoutFile>(json) {
        file.migrate()?;
        return Ok(file.payload);
    }

    // Bare payload, as submitted to the server
    SavePayload::from_json(json)
}

// ============================================================================
// Utility Functions
// ============================================================================

/// Ensure a path ends in the layout extension
pub fn ensure_extension(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let has_extension = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(&format!(".{}", LAYOUT_EXTENSION)));
    if has_extension {
        return path.to_path_buf();
    }
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(LAYOUT_EXTENSION);
    PathBuf::from(name)
}

/// Default file name for a view's layout
pub fn default_file_name(view_name: &str) -> String {
    let safe_name: String = view_name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}.{}", safe_name.to_lowercase(), LAYOUT_EXTENSION)
}

// ============================================================================
// Tests
// ============================================================================
