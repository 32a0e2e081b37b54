//! Layout validation
//!
//! Structural slot checks live on [`LayoutSegment`] through `Validatable`.
//! This module adds the checks that need the session configuration:
//! relation paths against the schema snapshot, components the palette does
//! not offer, and fields the table does not have.

use crate::config::BuilderConfig;
use crate::kinds::{LeafKind, SlotKind};
use crate::segment::LayoutSegment;
use layoutsmith_core::{BuilderError, BuilderResult, prop_str};
use layoutsmith_relations::{PathContext, RelationPath};

// ============================================================================
// ValidationResult
// ============================================================================

/// Result of a validation operation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the validation passed
    pub valid: bool,

    /// List of errors (empty if valid)
    pub errors: Vec<ValidationIssue>,

    /// List of warnings (non-fatal issues)
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Create a successful validation result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, error: ValidationIssue) {
        self.valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result
    pub fn add_warning(&mut self, warning: ValidationIssue) {
        self.warnings.push(warning);
    }

    /// Merge another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.valid {
            self.valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Check if there are any warnings
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Convert to BuilderResult (fails if any errors)
    pub fn to_result(self) -> BuilderResult<()> {
        if self.valid {
            Ok(())
        } else {
            let msg = self
                .errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            Err(BuilderError::invalid_layout(msg))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

// ============================================================================
// ValidationIssue
// ============================================================================

/// Codes for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IssueCode {
    SlotInvariant,
    InvalidRelationPath,
    MissingRelation,
    UnofferedComponent,
    UnknownField,
}

/// One finding, located by its position in the layout
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    pub code: IssueCode,
    pub message: String,

    /// Location in the tree (e.g. `above[1].contents[0]`)
    pub path: String,
}

impl ValidationIssue {
    /// Create an issue
    pub fn new(code: IssueCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: path.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "[{}] {}", self.path, self.message)
        }
    }
}

// ============================================================================
// ValidationRule Trait
// ============================================================================

/// A check run on every segment of a layout
pub trait ValidationRule {
    /// Get the rule name
    fn name(&self) -> &'static str;

    /// Check one segment at `path`
    fn check(&self, segment: &LayoutSegment, path: &str, config: &BuilderConfig, result: &mut ValidationResult);
}

// ============================================================================
// Validator
// ============================================================================

/// Layout validator that runs multiple rules over every segment
#[derive(Default)]
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a validator without rules
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Create a validator with the built-in rules
    pub fn with_default_rules() -> Self {
        let mut validator = Self::new();
        validator.add_rule(Box::new(SlotInvariantRule));
        validator.add_rule(Box::new(RelationPathRule));
        validator.add_rule(Box::new(OfferedComponentRule));
        validator.add_rule(Box::new(KnownFieldRule));
        validator
    }

    /// Add a validation rule
    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Validate a layout with all rules
    pub fn validate(&self, layout: &LayoutSegment, config: &BuilderConfig) -> ValidationResult {
        let mut result = ValidationResult::ok();
        self.walk(layout, String::new(), config, &mut result);
        result
    }

    /// Validate and return Result
    pub fn validate_result(&self, layout: &LayoutSegment, config: &BuilderConfig) -> BuilderResult<()> {
        self.validate(layout, config).to_result()
    }

    fn walk(&self, segment: &LayoutSegment, path: String, config: &BuilderConfig, result: &mut ValidationResult) {
        for rule in &self.rules {
            rule.check(segment, &path, config, result);
        }
        match segment {
            LayoutSegment::Leaf(_) => {}
            LayoutSegment::Container(container) => {
                if let Some(contents) = container.contents.as_deref() {
                    self.walk(contents, child_path(&path, "contents", None), config, result);
                }
            }
            LayoutSegment::Stack(children) => {
                for (i, child) in children.iter().enumerate() {
                    self.walk(child, child_path(&path, "above", Some(i)), config, result);
                }
            }
            LayoutSegment::Slots(slots) => {
                let key = match slots.kind {
                    SlotKind::Columns => "besides",
                    _ => "contents",
                };
                for (i, child) in slots.contents.iter().enumerate() {
                    if let Some(child) = child {
                        self.walk(child, child_path(&path, key, Some(i)), config, result);
                    }
                }
            }
        }
    }
}

fn child_path(parent: &str, key: &str, index: Option<usize>) -> String {
    let step = match index {
        Some(i) => format!("{}[{}]", key, i),
        None => key.to_string(),
    };
    if parent.is_empty() {
        step
    } else {
        format!("{}.{}", parent, step)
    }
}

// ============================================================================
// Built-in Validation Rules
// ============================================================================

/// Slot counts, per-slot arrays and current index agree
pub struct SlotInvariantRule;

impl ValidationRule for SlotInvariantRule {
    fn name(&self) -> &'static str {
        "slot_invariants"
    }

    fn check(&self, segment: &LayoutSegment, path: &str, _config: &BuilderConfig, result: &mut ValidationResult) {
        if let LayoutSegment::Slots(slots) = segment {
            if let Err(err) = slots.check() {
                result.add_error(ValidationIssue::new(IssueCode::SlotInvariant, path, err.to_string()));
            }
        }
    }
}

/// Relation paths parse against the schema snapshot
pub struct RelationPathRule;

impl ValidationRule for RelationPathRule {
    fn name(&self) -> &'static str {
        "relation_paths"
    }

    fn check(&self, segment: &LayoutSegment, path: &str, config: &BuilderConfig, result: &mut ValidationResult) {
        let Some(leaf) = segment.as_leaf() else {
            return;
        };
        let Some(prop) = leaf.kind.relation_prop() else {
            return;
        };
        let Some(relation) = leaf.relation() else {
            if leaf.kind == LeafKind::JoinField {
                result.add_error(ValidationIssue::new(
                    IssueCode::MissingRelation,
                    path,
                    format!("join field has no '{}' path", prop),
                ));
            }
            return;
        };
        let Some(table) = config.table_name.as_deref() else {
            result.add_warning(ValidationIssue::new(
                IssueCode::InvalidRelationPath,
                path,
                format!("relation '{}' cannot be checked without a table", relation),
            ));
            return;
        };
        let ctx = PathContext::new(&config.schema, table);
        if let Err(err) = RelationPath::parse(relation, &ctx) {
            result.add_error(ValidationIssue::new(
                IssueCode::InvalidRelationPath,
                path,
                err.to_string(),
            ));
        }
    }
}

/// Leaves are ones the palette offers in this mode
pub struct OfferedComponentRule;

impl ValidationRule for OfferedComponentRule {
    fn name(&self) -> &'static str {
        "offered_components"
    }

    fn check(&self, segment: &LayoutSegment, path: &str, config: &BuilderConfig, result: &mut ValidationResult) {
        if let Some(leaf) = segment.as_leaf() {
            if !config.offers(leaf.kind) {
                result.add_warning(ValidationIssue::new(
                    IssueCode::UnofferedComponent,
                    path,
                    format!("{} is not offered in {} mode", leaf.kind, config.mode),
                ));
            }
        }
    }
}

/// Field leaves name a field of the table
pub struct KnownFieldRule;

impl ValidationRule for KnownFieldRule {
    fn name(&self) -> &'static str {
        "known_fields"
    }

    fn check(&self, segment: &LayoutSegment, path: &str, config: &BuilderConfig, result: &mut ValidationResult) {
        if config.fields.is_empty() {
            return;
        }
        let Some(leaf) = segment.as_leaf() else {
            return;
        };
        if leaf.kind != LeafKind::Field {
            return;
        }
        match prop_str(&leaf.props, "field_name") {
            Some(name) if config.field(name).is_some() => {}
            Some(name) => result.add_warning(ValidationIssue::new(
                IssueCode::UnknownField,
                path,
                format!("unknown field '{}'", name),
            )),
            None => result.add_warning(ValidationIssue::new(
                IssueCode::UnknownField,
                path,
                "field leaf has no field_name",
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldChoice;
    use crate::segment::{Leaf, MultiSlot};
    use layoutsmith_core::EditMode;
    use layoutsmith_relations::{SchemaSnapshot, TableSchema};

    fn config() -> BuilderConfig {
        BuilderConfig::new(EditMode::Show)
            .with_table("books")
            .with_field(FieldChoice::new("title"))
            .with_schema(
                SchemaSnapshot::new()
                    .with_table(TableSchema::new("books").with_key("publisher", "publishers"))
                    .with_table(TableSchema::new("publishers")),
            )
    }

    fn leaf(kind: LeafKind, key: &str, value: &str) -> LayoutSegment {
        LayoutSegment::Leaf(Leaf::bare(kind).with_prop(key, value))
    }

    #[test]
    fn test_valid_layout() {
        let layout = LayoutSegment::Stack(vec![
            leaf(LeafKind::Field, "field_name", "title"),
            leaf(LeafKind::JoinField, "join_field", ".books.publisher"),
        ]);
        let result = Validator::with_default_rules().validate(&layout, &config());
        assert!(result.valid, "{:?}", result.errors);
        assert!(!result.has_warnings());
    }

    #[test]
    fn test_bad_relation_is_error() {
        let layout = LayoutSegment::Stack(vec![
            leaf(LeafKind::Text, "contents", "x"),
            leaf(LeafKind::JoinField, "join_field", ".books.nope"),
        ]);
        let result = Validator::with_default_rules().validate(&layout, &config());
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].code, IssueCode::InvalidRelationPath);
        assert_eq!(result.errors[0].path, "above[1]");
        assert!(result.to_result().is_err());
    }

    #[test]
    fn test_missing_join_path() {
        let layout = LayoutSegment::Leaf(Leaf::bare(LeafKind::JoinField));
        let result = Validator::with_default_rules().validate(&layout, &config());
        assert_eq!(result.errors[0].code, IssueCode::MissingRelation);
    }

    #[test]
    fn test_warnings() {
        let layout = LayoutSegment::split(
            vec![
                Some(leaf(LeafKind::Field, "field_name", "isbn")),
                Some(LayoutSegment::Leaf(Leaf::bare(LeafKind::SearchBar))),
            ],
            vec![serde_json::json!(6), serde_json::json!(6)],
        );
        let result = Validator::with_default_rules().validate(&layout, &config());
        assert!(result.valid);
        let codes: Vec<_> = result.warnings.iter().map(|w| w.code).collect();
        assert_eq!(codes, vec![IssueCode::UnknownField, IssueCode::UnofferedComponent]);
        assert_eq!(result.warnings[1].path, "besides[1]");
        assert!(result.warnings[1].to_string().starts_with("[besides[1]]"));
    }

    #[test]
    fn test_slot_invariant_rule() {
        let mut slots = MultiSlot::new(SlotKind::Table, 2);
        slots.slot_count = 3;
        let layout = LayoutSegment::Slots(slots);
        let result = Validator::with_default_rules().validate(&layout, &config());
        assert_eq!(result.errors[0].code, IssueCode::SlotInvariant);
        assert_eq!(result.errors[0].path, "");
    }
}
