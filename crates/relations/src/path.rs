//! Relation path codec
//!
//! A relation path names a route from the row being edited to the rows a
//! component should read. Two syntaxes are accepted:
//!
//! - **Dotted**: `.source.hop.hop...` where a foreign hop is the bare key on
//!   the current table and an inbound hop is written `table$key`.
//!   The bare `.` means "the current row".
//! - **Legacy**: `Prefix:rest`, with `Prefix` one of [`LegacyPrefix`].
//!
//! Dotted paths are canonical. Rendering a parsed path always yields a string
//! that parses back to the same hops.

use crate::schema::SchemaSnapshot;
use layoutsmith_core::{BuilderError, BuilderResult};
use serde::{Deserialize, Serialize};

/// The path meaning "operate on the current row"
pub const CURRENT_ROW: &str = ".";

// ============================================================================
// RelationKind
// ============================================================================

/// How a hop moves from one table to the next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RelationKind {
    /// Follow a key on the current table
    Foreign,
    /// Follow another table's key pointing at the current table
    Inbound,
    /// Legacy: rows of another table, unrelated to the current row
    Independent,
    /// Legacy: the current row itself
    Own,
    /// Legacy: one-to-one inbound reference
    OneToOneShortcut,
}

impl RelationKind {
    /// Whether this kind only exists in the legacy colon syntax
    pub fn is_legacy(&self) -> bool {
        matches!(
            self,
            RelationKind::Independent | RelationKind::Own | RelationKind::OneToOneShortcut
        )
    }

    /// Get the display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            RelationKind::Foreign => "Foreign key",
            RelationKind::Inbound => "Inbound key",
            RelationKind::Independent => "Independent",
            RelationKind::Own => "Own",
            RelationKind::OneToOneShortcut => "One-to-one",
        }
    }
}

// ============================================================================
// LegacyPrefix
// ============================================================================

/// Prefixes of the colon-separated legacy syntax
///
/// - `Own:` or `Own:<table>`: the current row
/// - `Independent:<table>`: any row of `<table>`
/// - `ChildList:<table>.<key>`: rows of `<table>` whose `<key>` points here
/// - `OneToOneShow:<table>.<key>`: the single row of `<table>` whose `<key>` points here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyPrefix {
    Own,
    Independent,
    ChildList,
    OneToOneShow,
}

impl LegacyPrefix {
    /// Prefix text as written before the colon
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyPrefix::Own => "Own",
            LegacyPrefix::Independent => "Independent",
            LegacyPrefix::ChildList => "ChildList",
            LegacyPrefix::OneToOneShow => "OneToOneShow",
        }
    }

    /// Parse prefix text
    pub fn from_prefix(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.as_str() == s)
    }

    /// Get all prefixes
    pub fn all() -> &'static [LegacyPrefix] {
        &[
            LegacyPrefix::Own,
            LegacyPrefix::Independent,
            LegacyPrefix::ChildList,
            LegacyPrefix::OneToOneShow,
        ]
    }
}

// ============================================================================
// RelationHop
// ============================================================================

/// One step of a relation path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationHop {
    /// Direction of the step
    pub kind: RelationKind,

    /// Key column followed (empty for `Own` and `Independent`)
    pub key: String,

    /// Table the step lands on
    pub table: String,
}

impl RelationHop {
    /// Create a hop of the given kind
    pub fn new(kind: RelationKind, key: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            table: table.into(),
        }
    }

    /// Follow `key` on the current table, landing on `table`
    pub fn foreign(key: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(RelationKind::Foreign, key, table)
    }

    /// Follow `table.key` back to the current table, landing on `table`
    pub fn inbound(key: impl Into<String>, table: impl Into<String>) -> Self {
        Self::new(RelationKind::Inbound, key, table)
    }

    /// Whether two hops lead through the same key to the same table
    pub fn same_route(&self, other: &RelationHop) -> bool {
        self.kind == other.kind && self.key == other.key && self.table == other.table
    }
}

impl std::fmt::Display for RelationHop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            RelationKind::Foreign => write!(f, "{}", self.key),
            RelationKind::Inbound => write!(f, "{}${}", self.table, self.key),
            RelationKind::Own => write!(f, "{}:{}", LegacyPrefix::Own.as_str(), self.table),
            RelationKind::Independent => {
                write!(f, "{}:{}", LegacyPrefix::Independent.as_str(), self.table)
            }
            RelationKind::OneToOneShortcut => write!(
                f,
                "{}:{}.{}",
                LegacyPrefix::OneToOneShow.as_str(),
                self.table,
                self.key
            ),
        }
    }
}

// ============================================================================
// PathContext
// ============================================================================

/// What a path is parsed against: the schema and the table of the current row
#[derive(Debug, Clone, Copy)]
pub struct PathContext<'a> {
    pub schema: &'a SchemaSnapshot,
    pub table: &'a str,
}

impl<'a> PathContext<'a> {
    /// Create a context
    pub fn new(schema: &'a SchemaSnapshot, table: &'a str) -> Self {
        Self { schema, table }
    }
}

// ============================================================================
// RelationPath
// ============================================================================

/// A parsed relation path
///
/// `source` is the table the path starts from; it is `None` only for the
/// bare current-row path `.`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationPath {
    source: Option<String>,
    hops: Vec<RelationHop>,
}

impl RelationPath {
    /// The path meaning "the current row"
    pub fn current_row() -> Self {
        Self {
            source: None,
            hops: Vec::new(),
        }
    }

    /// Assemble a path from hops
    ///
    /// Legacy hops must stand alone, and hops need a source table.
    pub fn from_hops(source: Option<String>, hops: Vec<RelationHop>) -> BuilderResult<Self> {
        let legacy = hops.iter().filter(|h| h.kind.is_legacy()).count();
        if legacy > 0 && hops.len() > 1 {
            return Err(BuilderError::invalid_path(
                render_parts(source.as_deref(), &hops),
                "legacy hops cannot be chained",
            ));
        }
        if source.is_none() && !hops.is_empty() {
            return Err(BuilderError::invalid_path(
                hops.iter().map(ToString::to_string).collect::<Vec<_>>().join("."),
                "hops need a source table",
            ));
        }
        Ok(Self { source, hops })
    }

    /// Parse a path string against a schema snapshot
    pub fn parse(path: &str, ctx: &PathContext<'_>) -> BuilderResult<Self> {
        if let Some(rest) = path.strip_prefix('.') {
            parse_dotted(path, rest, ctx)
        } else if let Some((prefix, rest)) = path.split_once(':') {
            parse_legacy(path, prefix, rest, ctx)
        } else {
            Err(BuilderError::invalid_path(
                path,
                "expected a leading '.' or a legacy prefix",
            ))
        }
    }

    /// Table the path starts from
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Ordered hops
    pub fn hops(&self) -> &[RelationHop] {
        &self.hops
    }

    /// Whether this is the bare current-row path
    pub fn is_current_row(&self) -> bool {
        self.source.is_none() && self.hops.is_empty()
    }

    /// Whether the path uses the legacy syntax
    pub fn is_legacy(&self) -> bool {
        self.hops.iter().any(|h| h.kind.is_legacy())
    }

    /// Table the path lands on, if it leaves the current table
    pub fn target_table(&self) -> Option<&str> {
        self.hops
            .last()
            .map(|h| h.table.as_str())
            .or(self.source.as_deref())
    }

    /// Render the canonical string form
    pub fn render(&self) -> String {
        render_parts(self.source.as_deref(), &self.hops)
    }
}

impl std::fmt::Display for RelationPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Parse a path into its hops
pub fn parse(path: &str, ctx: &PathContext<'_>) -> BuilderResult<Vec<RelationHop>> {
    RelationPath::parse(path, ctx).map(|p| p.hops)
}

/// Render a path to its canonical string form
pub fn render(path: &RelationPath) -> String {
    path.render()
}

fn render_parts(source: Option<&str>, hops: &[RelationHop]) -> String {
    match (source, hops) {
        (None, []) => CURRENT_ROW.to_string(),
        (_, [hop]) if hop.kind.is_legacy() => hop.to_string(),
        (source, hops) => {
            let mut out = String::from(CURRENT_ROW);
            out.push_str(source.unwrap_or_default());
            for hop in hops {
                out.push('.');
                out.push_str(&hop.to_string());
            }
            out
        }
    }
}

fn parse_dotted(path: &str, rest: &str, ctx: &PathContext<'_>) -> BuilderResult<RelationPath> {
    if rest.is_empty() {
        return Ok(RelationPath::current_row());
    }

    let mut segments = rest.split('.');
    let source = segments.next().unwrap_or_default();
    if source != ctx.table {
        return Err(BuilderError::invalid_path(
            path,
            format!("starts at '{}' but the current table is '{}'", source, ctx.table),
        ));
    }
    if !ctx.schema.has_table(source) {
        return Err(BuilderError::invalid_path(
            path,
            format!("unknown table '{}'", source),
        ));
    }

    let mut current = source.to_string();
    let mut hops = Vec::new();
    for segment in segments {
        if segment.is_empty() {
            return Err(BuilderError::invalid_path(path, "empty hop"));
        }
        let hop = match segment.split_once('$') {
            Some((table, key)) => inbound_hop(path, table, key, &current, ctx)?,
            None => foreign_hop(path, segment, &current, ctx)?,
        };
        current = hop.table.clone();
        hops.push(hop);
    }

    Ok(RelationPath {
        source: Some(source.to_string()),
        hops,
    })
}

fn parse_legacy(
    path: &str,
    prefix: &str,
    rest: &str,
    ctx: &PathContext<'_>,
) -> BuilderResult<RelationPath> {
    let prefix = LegacyPrefix::from_prefix(prefix).ok_or_else(|| {
        BuilderError::invalid_path(path, format!("unknown legacy prefix '{}'", prefix))
    })?;

    let hop = match prefix {
        LegacyPrefix::Own => {
            if !rest.is_empty() && rest != ctx.table {
                return Err(BuilderError::invalid_path(
                    path,
                    format!("'Own' names '{}' but the current table is '{}'", rest, ctx.table),
                ));
            }
            RelationHop::new(RelationKind::Own, "", ctx.table)
        }
        LegacyPrefix::Independent => {
            if !ctx.schema.has_table(rest) {
                return Err(BuilderError::invalid_path(
                    path,
                    format!("unknown table '{}'", rest),
                ));
            }
            RelationHop::new(RelationKind::Independent, "", rest)
        }
        LegacyPrefix::ChildList | LegacyPrefix::OneToOneShow => {
            let (table, key) = rest.split_once('.').ok_or_else(|| {
                BuilderError::invalid_path(path, "expected '<table>.<key>' after the prefix")
            })?;
            let mut hop = inbound_hop(path, table, key, ctx.table, ctx)?;
            if prefix == LegacyPrefix::OneToOneShow {
                hop.kind = RelationKind::OneToOneShortcut;
            }
            hop
        }
    };

    Ok(RelationPath {
        source: Some(ctx.table.to_string()),
        hops: vec![hop],
    })
}

fn foreign_hop(
    path: &str,
    key: &str,
    current: &str,
    ctx: &PathContext<'_>,
) -> BuilderResult<RelationHop> {
    let fk = ctx.schema.foreign_key(current, key).ok_or_else(|| {
        BuilderError::invalid_path(path, format!("no key '{}' on '{}'", key, current))
    })?;
    if !ctx.schema.has_table(&fk.references) {
        return Err(BuilderError::invalid_path(
            path,
            format!("'{}.{}' references unknown table '{}'", current, key, fk.references),
        ));
    }
    Ok(RelationHop::foreign(key, fk.references.clone()))
}

fn inbound_hop(
    path: &str,
    table: &str,
    key: &str,
    current: &str,
    ctx: &PathContext<'_>,
) -> BuilderResult<RelationHop> {
    if table.is_empty() || key.is_empty() {
        return Err(BuilderError::invalid_path(
            path,
            "inbound hop must be written '<table>$<key>'",
        ));
    }
    let fk = ctx.schema.foreign_key(table, key).ok_or_else(|| {
        BuilderError::invalid_path(path, format!("no key '{}' on '{}'", key, table))
    })?;
    if fk.references != current {
        return Err(BuilderError::invalid_path(
            path,
            format!("'{}.{}' does not reference '{}'", table, key, current),
        ));
    }
    Ok(RelationHop::inbound(key, table))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TableSchema;
    use pretty_assertions::assert_eq;

    fn schema() -> SchemaSnapshot {
        SchemaSnapshot::new()
            .with_table(TableSchema::new("artists"))
            .with_table(TableSchema::new("album"))
            .with_table(
                TableSchema::new("artist_plays_on_album")
                    .with_key("artist", "artists")
                    .with_key("album", "album"),
            )
            .with_table(TableSchema::new("fan_club").with_key("artist", "artists"))
            .with_table(TableSchema::new("covers"))
            .with_table(TableSchema::new("albums").with_unique_key("cover", "covers"))
    }

    #[test]
    fn test_parse_current_row() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "artists");
        let path = RelationPath::parse(".", &ctx).unwrap();
        assert!(path.is_current_row());
        assert!(path.hops().is_empty());
        assert_eq!(path.render(), ".");
    }

    #[test]
    fn test_parse_foreign() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "fan_club");
        let path = RelationPath::parse(".fan_club.artist", &ctx).unwrap();
        assert_eq!(path.source(), Some("fan_club"));
        assert_eq!(path.hops(), &[RelationHop::foreign("artist", "artists")]);
        assert_eq!(path.target_table(), Some("artists"));
        assert_eq!(path.render(), ".fan_club.artist");
    }

    #[test]
    fn test_parse_inbound() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "covers");
        let path = RelationPath::parse(".covers.albums$cover", &ctx).unwrap();
        assert_eq!(path.hops(), &[RelationHop::inbound("cover", "albums")]);
        assert_eq!(path.render(), ".covers.albums$cover");
    }

    #[test]
    fn test_parse_many_to_many() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "artists");
        let hops = parse(".artists.artist_plays_on_album$artist.album", &ctx).unwrap();
        assert_eq!(
            hops,
            vec![
                RelationHop::inbound("artist", "artist_plays_on_album"),
                RelationHop::foreign("album", "album"),
            ]
        );
    }

    #[test]
    fn test_source_only_path() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "artists");
        let path = RelationPath::parse(".artists", &ctx).unwrap();
        assert!(!path.is_current_row());
        assert_eq!(path.target_table(), Some("artists"));
        assert_eq!(path.render(), ".artists");
    }

    #[test]
    fn test_parse_rejects_unknown_key() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "fan_club");
        let err = RelationPath::parse(".fan_club.manager", &ctx).unwrap_err();
        assert!(err.is_relation());
        assert!(err.to_string().contains("no key 'manager' on 'fan_club'"));
    }

    #[test]
    fn test_parse_rejects_wrong_direction() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "album");
        // fan_club.artist points at artists, not album
        let err = RelationPath::parse(".album.fan_club$artist", &ctx).unwrap_err();
        assert!(err.to_string().contains("does not reference 'album'"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "artists");
        for bad in ["artists", ".artists..album", ".fan_club.artist", ".artists.$artist", "Parent:x"] {
            assert!(RelationPath::parse(bad, &ctx).is_err(), "{} should fail", bad);
        }
    }

    #[test]
    fn test_parse_legacy() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "covers");

        let own = RelationPath::parse("Own:", &ctx).unwrap();
        assert_eq!(own.hops()[0].kind, RelationKind::Own);
        assert_eq!(own.render(), "Own:covers");

        let independent = RelationPath::parse("Independent:artists", &ctx).unwrap();
        assert_eq!(independent.render(), "Independent:artists");

        let one_to_one = RelationPath::parse("OneToOneShow:albums.cover", &ctx).unwrap();
        assert_eq!(one_to_one.hops()[0].kind, RelationKind::OneToOneShortcut);
        assert_eq!(one_to_one.render(), "OneToOneShow:albums.cover");
        assert!(one_to_one.is_legacy());
    }

    #[test]
    fn test_child_list_canonicalizes_to_dotted() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "covers");
        let legacy = RelationPath::parse("ChildList:albums.cover", &ctx).unwrap();
        assert_eq!(legacy.render(), ".covers.albums$cover");
        assert_eq!(RelationPath::parse(&legacy.render(), &ctx).unwrap(), legacy);
    }

    #[test]
    fn test_render_reparses_to_same_hops() {
        let schema = schema();
        let ctx = PathContext::new(&schema, "artists");
        for path in [
            ".",
            ".artists",
            ".artists.fan_club$artist",
            ".artists.artist_plays_on_album$artist.album",
            ".artists.artist_plays_on_album$artist.artist",
            "Own:artists",
            "Independent:covers",
        ] {
            let parsed = RelationPath::parse(path, &ctx).unwrap();
            let reparsed = RelationPath::parse(&parsed.render(), &ctx).unwrap();
            assert_eq!(reparsed, parsed);
        }
    }

    #[test]
    fn test_from_hops_rejects_chained_legacy() {
        let hops = vec![
            RelationHop::new(RelationKind::Own, "", "artists"),
            RelationHop::foreign("album", "album"),
        ];
        assert!(RelationPath::from_hops(Some("artists".to_string()), hops).is_err());
        assert!(
            RelationPath::from_hops(None, vec![RelationHop::foreign("album", "album")]).is_err()
        );
    }

    #[test]
    fn test_legacy_prefixes() {
        assert_eq!(LegacyPrefix::all().len(), 4);
        assert_eq!(LegacyPrefix::from_prefix("ChildList"), Some(LegacyPrefix::ChildList));
        assert_eq!(LegacyPrefix::from_prefix("ParentShow"), None);
    }
}
