//! Core traits for layoutsmith
//!
//! This module defines the traits that layout values and payloads implement
//! for consistent validation and persistence.

use crate::error::BuilderResult;
use serde::{Serialize, de::DeserializeOwned};

// ============================================================================
// Validatable Trait
// ============================================================================

/// Trait for types that can be validated
///
/// Types implementing this trait can check their internal consistency
/// and return validation errors if the state is invalid.
///
/// # Example
///
/// ```rust,ignore
/// use layoutsmith_core::{Validatable, BuilderResult, BuilderError};
///
/// struct Widths(Vec<u32>);
///
/// impl Validatable for Widths {
///     fn validate(&self) -> BuilderResult<()> {
///         if self.0.iter().sum::<u32>() > 12 {
///             return Err(BuilderError::invalid_layout("widths exceed 12"));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait Validatable {
    /// Validate the current state of the object
    ///
    /// Returns `Ok(())` if valid, or a `BuilderError` describing the problem.
    fn validate(&self) -> BuilderResult<()>;

    /// Check if the object is valid without returning error details
    fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Get all validation errors (for types that can have multiple errors)
    fn validation_errors(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

// ============================================================================
// Persistable Trait
// ============================================================================

/// Trait for types that can be serialized to and deserialized from files
///
/// Layout payloads and snippets are stored as JSON.
pub trait Persistable: Serialize + DeserializeOwned + Sized {
    /// Get the file extension for this type (without the dot)
    fn file_extension() -> &'static str;

    /// Get the schema version for migration purposes
    fn schema_version() -> u32 {
        1
    }

    /// Save to a JSON string
    fn to_json(&self) -> BuilderResult<String> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Load from a JSON string
    fn from_json(json: &str) -> BuilderResult<Self> {
        serde_json::from_str(json).map_err(Into::into)
    }

    /// Save to a file
    fn save_to_file(&self, path: &std::path::Path) -> BuilderResult<()> {
        let json = self.to_json()?;
        std::fs::write(path, json).map_err(|e| crate::error::BuilderError::FileWrite {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Load from a file
    fn load_from_file(path: &std::path::Path) -> BuilderResult<Self> {
        let json =
            std::fs::read_to_string(path).map_err(|e| crate::error::BuilderError::FileRead {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_json(&json)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    struct TestValidatable {
        valid: bool,
    }

    impl Validatable for TestValidatable {
        fn validate(&self) -> BuilderResult<()> {
            if self.valid {
                Ok(())
            } else {
                Err(crate::error::BuilderError::invalid_layout("Invalid state"))
            }
        }
    }

    #[test]
    fn test_validatable_trait() {
        let valid = TestValidatable { valid: true };
        assert!(valid.is_valid());
        assert!(valid.validation_errors().is_empty());

        let invalid = TestValidatable { valid: false };
        assert!(!invalid.is_valid());
        assert_eq!(
            invalid.validation_errors(),
            vec!["Invalid layout: Invalid state".to_string()]
        );
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Snippet {
        name: String,
        icon: String,
    }

    impl Persistable for Snippet {
        fn file_extension() -> &'static str {
            "snippet.json"
        }
    }

    #[test]
    fn test_persistable_file_round_trip() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("card.snippet.json");
        let snippet = Snippet {
            name: "Card".to_string(),
            icon: "fas fa-square".to_string(),
        };

        snippet.save_to_file(&path).unwrap();
        let loaded = Snippet::load_from_file(&path).unwrap();
        assert_eq!(loaded, snippet);
        assert_eq!(Snippet::schema_version(), 1);
    }

    #[test]
    fn test_persistable_missing_file() {
        let err = Snippet::load_from_file(std::path::Path::new("/nonexistent/x.json")).unwrap_err();
        assert!(err.is_io());
    }
}
