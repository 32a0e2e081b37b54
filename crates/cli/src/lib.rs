//! # Layoutsmith CLI
//!
//! Command-line front end over the layoutsmith libraries, for inspecting
//! relation paths and converting layouts outside the editor.
//!
//! ## Commands
//!
//! - `path` - Parse a relation path against a schema snapshot
//! - `graph` - Build the relation graph for a table and show its picker menus
//! - `layout` - Convert an editor node map into a layout payload
//! - `nodes` - Convert a layout payload into an editor node map
//! - `validate` - Validate a layout against a builder configuration
//!

pub mod settings;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use layoutsmith_core::{EditMode, ROOT_NODE_ID};
use layoutsmith_layout::{
    BuilderConfig, Document, SavePayload, Validator, ensure_extension, load_layout, save_layout,
    to_layout, to_nodes,
};
use layoutsmith_relations::{
    EagerPicker, MenuItem, OnDemandPicker, PathContext, RelationGraph, RelationPath,
    SchemaSnapshot,
};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub use settings::{PickerMode, Settings};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Arguments
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "layoutsmith", version, about = "Relation paths and layout trees for the layout builder")]
pub struct Cli {
    /// Settings file (defaults to ./layoutsmith.toml when present)
    #[arg(long, short, global = true, env = "LAYOUTSMITH_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Print compact JSON regardless of settings
    #[arg(long, global = true)]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a relation path and print its hops
    Path {
        /// Path to parse, e.g. `.books.author` or `Own:books`
        path: String,

        /// Table of the current row
        #[arg(long, short)]
        table: String,

        /// Schema snapshot (JSON)
        #[arg(long)]
        schema: PathBuf,
    },

    /// Build the relation graph for a table and show the picker menus
    Graph {
        /// Table of the current row
        #[arg(long, short)]
        table: String,

        /// Schema snapshot (JSON)
        #[arg(long)]
        schema: PathBuf,

        /// Permitted relation paths
        #[arg(required = true)]
        paths: Vec<String>,

        /// Picker layout (overrides settings)
        #[arg(long, value_enum)]
        mode: Option<PickerMode>,

        /// Menu depth ceiling of the eager picker (overrides settings)
        #[arg(long)]
        max_depth: Option<usize>,

        /// Print the graph as JSON instead of menus
        #[arg(long)]
        json: bool,
    },

    /// Convert an editor node map into a layout payload
    Layout {
        /// Node map (JSON)
        input: PathBuf,

        /// Write a layout file instead of printing
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Convert a layout payload into an editor node map
    Nodes {
        /// Layout file or bare payload (JSON)
        input: PathBuf,

        /// Write the node map instead of printing
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Validate a layout against a builder configuration
    Validate {
        /// Layout file or bare payload (JSON)
        input: PathBuf,

        /// Builder configuration (JSON); without it only structure is checked
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse arguments from the process command line
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Settings named on the command line, or the defaults
    pub fn load_settings(&self) -> Result<Settings> {
        Settings::load_or_default(self.settings.as_deref()).context("Failed to load settings")
    }
}

// ============================================================================
// Entry Points
// ============================================================================

/// Run a parsed command, printing to stdout
pub fn run(cli: Cli, settings: &Settings) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&cli, settings, &mut out)
}

/// Run a parsed command, printing to `out`
pub fn execute(cli: &Cli, settings: &Settings, out: &mut dyn Write) -> Result<()> {
    let pretty = settings.output.pretty && !cli.compact;
    match &cli.command {
        Command::Path { path, table, schema } => path_command(out, path, table, schema),
        Command::Graph {
            table,
            schema,
            paths,
            mode,
            max_depth,
            json,
        } => {
            let mode = mode.unwrap_or(settings.picker.mode);
            let max_depth = max_depth.unwrap_or(settings.picker.max_depth);
            graph_command(out, table, schema, paths, mode, max_depth, json.then_some(pretty))
        }
        Command::Layout { input, output } => layout_command(out, input, output.as_deref(), pretty),
        Command::Nodes { input, output } => nodes_command(out, input, output.as_deref(), pretty),
        Command::Validate { input, config } => validate_command(out, input, config.as_deref()),
    }
}

// ============================================================================
// Commands
// ============================================================================

fn path_command(out: &mut dyn Write, path: &str, table: &str, schema: &Path) -> Result<()> {
    let schema = read_schema(schema)?;
    let ctx = PathContext::new(&schema, table);
    let parsed = RelationPath::parse(path, &ctx)?;

    writeln!(out, "{} {}", "✓".green().bold(), parsed.render().bold())?;
    if parsed.is_current_row() {
        writeln!(out, "  the current row of {}", table.cyan())?;
        return Ok(());
    }
    if let Some(source) = parsed.source() {
        writeln!(out, "  from {}", source.cyan())?;
    }
    for (i, hop) in parsed.hops().iter().enumerate() {
        let via = if hop.key.is_empty() {
            String::new()
        } else {
            format!(" via {}", hop.key)
        };
        writeln!(
            out,
            "  {}. {}{} → {}",
            i + 1,
            hop.kind.display_name(),
            via,
            hop.table.cyan()
        )?;
    }
    if parsed.is_legacy() {
        writeln!(out, "  {}", "legacy syntax".dimmed())?;
    }
    Ok(())
}

fn graph_command(
    out: &mut dyn Write,
    table: &str,
    schema: &Path,
    paths: &[String],
    mode: PickerMode,
    max_depth: usize,
    json: Option<bool>,
) -> Result<()> {
    let schema = read_schema(schema)?;
    let graph = Rc::new(RelationGraph::build(paths, table, &schema));

    if let Some(pretty) = json {
        return print_json(out, &*graph, pretty);
    }

    for warning in graph.warnings() {
        writeln!(out, "{} {}", "warning:".yellow().bold(), warning)?;
    }
    writeln!(
        out,
        "{} ({} picker, {} selectable)",
        table.bold(),
        mode.display_name(),
        graph.selectable_paths().len()
    )?;

    match mode {
        PickerMode::Eager => {
            let picker = EagerPicker::with_max_depth(graph, max_depth, Box::new(|_| {}));
            for item in picker.menu() {
                write_item(out, item, 1)?;
            }
        }
        PickerMode::OnDemand => {
            let picker = OnDemandPicker::new(graph, Box::new(|_| {}));
            for item in picker.menu(&[]).unwrap_or_default() {
                write_item(out, item, 1)?;
            }
        }
    }
    Ok(())
}

fn write_item(out: &mut dyn Write, item: &MenuItem, depth: usize) -> Result<()> {
    let indent = "  ".repeat(depth);
    let marker = if item.has_submenu && item.children.is_empty() {
        " ›"
    } else {
        ""
    };
    match &item.rel_path {
        Some(path) => writeln!(out, "{}{}{}  {}", indent, item.label, marker, path.dimmed())?,
        None => writeln!(out, "{}{}{}", indent, item.label.italic(), marker)?,
    }
    for child in &item.children {
        write_item(out, child, depth + 1)?;
    }
    Ok(())
}

fn layout_command(out: &mut dyn Write, input: &Path, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = read_file(input)?;
    let document = Document::from_node_map(&json)
        .with_context(|| format!("Invalid node map '{}'", input.display()))?;
    let payload = SavePayload::from(to_layout(&document, ROOT_NODE_ID)?);

    match output {
        Some(path) => {
            let path = ensure_extension(path);
            save_layout(&payload, &path)?;
            writeln!(
                out,
                "{} wrote {} ({} columns)",
                "✓".green().bold(),
                path.display(),
                payload.columns.len()
            )?;
            Ok(())
        }
        None => print_json(out, &payload, pretty),
    }
}

fn nodes_command(out: &mut dyn Write, input: &Path, output: Option<&Path>, pretty: bool) -> Result<()> {
    let payload = load_layout(input)?;
    let mut document = Document::new();
    if let Some(layout) = &payload.layout {
        to_nodes(&mut document, layout, ROOT_NODE_ID, None)?;
    }
    let node_map = document.to_node_map()?;
    let node_map = if pretty {
        let value: serde_json::Value = serde_json::from_str(&node_map)?;
        serde_json::to_string_pretty(&value)?
    } else {
        node_map
    };

    match output {
        Some(path) => {
            std::fs::write(path, node_map)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            writeln!(
                out,
                "{} wrote {} ({} nodes)",
                "✓".green().bold(),
                path.display(),
                document.len()
            )?;
        }
        None => writeln!(out, "{}", node_map)?,
    }
    Ok(())
}

fn validate_command(out: &mut dyn Write, input: &Path, config: Option<&Path>) -> Result<()> {
    let payload = load_layout(input)?;
    let config = match config {
        Some(path) => BuilderConfig::from_json(&read_file(path)?)
            .with_context(|| format!("Invalid builder config '{}'", path.display()))?,
        None => BuilderConfig::new(EditMode::Show),
    };

    let Some(layout) = payload.layout else {
        writeln!(out, "{} empty layout", "✓".green().bold())?;
        return Ok(());
    };

    let result = Validator::with_default_rules().validate(&layout, &config);
    for issue in &result.errors {
        writeln!(out, "{} {}", "error:".red().bold(), issue)?;
    }
    for issue in &result.warnings {
        writeln!(out, "{} {}", "warning:".yellow().bold(), issue)?;
    }
    if result.has_errors() {
        bail!("{} has {} error(s)", input.display(), result.errors.len());
    }
    writeln!(
        out,
        "{} {} segments, {} warning(s)",
        "✓".green().bold(),
        layout.segment_count(),
        result.warnings.len()
    )?;
    Ok(())
}

// ============================================================================
// Helpers
// ============================================================================

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read '{}'", path.display()))
}

fn read_schema(path: &Path) -> Result<SchemaSnapshot> {
    serde_json::from_str(&read_file(path)?)
        .with_context(|| format!("Invalid schema snapshot '{}'", path.display()))
}

fn print_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(out, "{}", json)?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
