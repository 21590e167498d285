//! # Tessera CLI Module
//!
//! This module implements the CLI interface for Tessera.
//!
//! ## Available Commands
//!
//! - `init` - Create an empty snapshot file
//! - `status` - Show graph counts
//! - `show` - Show one node or link
//! - `add-node` - Create a node
//! - `connect` - Create a link between two nodes
//! - `remove` - Remove a node (with its links) or a link
//! - `set` - Set or unset an attribute
//! - `neighborhood` - List a node's neighborhood
//! - `append` - Append a node to an indexed neighborhood
//! - `export` - Write the graph as JSON or binary

mod commands;

use crate::config::TesseraConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tessera_core::{TesseraError, Value};

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Tessera - attributed multigraph store
///
/// Edits a graph snapshot file one command at a time.
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress confirmation output of mutating commands
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the snapshot file (JSON, or binary when it starts with TSRA)
    #[arg(short = 'S', long, global = true, default_value = "tessera.json")]
    pub snapshot: PathBuf,

    /// Path to the configuration file
    #[arg(short = 'c', long, global = true, default_value = "tessera.toml")]
    pub config: PathBuf,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty snapshot
    Init {
        /// Overwrite an existing snapshot
        #[arg(short, long)]
        force: bool,
    },

    /// Show graph status
    Status,

    /// Show a node or link by id
    Show {
        /// Object id
        id: u64,
    },

    /// Create a node
    AddNode {
        /// Label to attach (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Attribute as key=value (repeatable)
        #[arg(short, long = "attr", value_parser = parse_attribute)]
        attrs: Vec<(String, Value)>,
    },

    /// Create a link from ORIGIN to TARGET
    Connect {
        /// Origin node id
        origin: u64,

        /// Target node id
        target: u64,

        /// Label to attach (repeatable)
        #[arg(short, long = "label")]
        labels: Vec<String>,

        /// Attribute as key=value (repeatable)
        #[arg(short, long = "attr", value_parser = parse_attribute)]
        attrs: Vec<(String, Value)>,
    },

    /// Remove a node (and its links) or a link
    Remove {
        /// Object id
        id: u64,
    },

    /// Set an attribute, or unset it when no value is given
    Set {
        /// Object id
        id: u64,

        /// Attribute key
        key: String,

        /// New value (int, float, bool or string)
        value: Option<String>,
    },

    /// List the members of a node's neighborhood
    Neighborhood {
        /// Represented node id
        node: u64,

        /// Selector label
        label: String,

        /// Neighborhood kind (any, indexed, keyed, one)
        #[arg(short, long, default_value = "any")]
        kind: String,

        /// Link direction (outgoing, incoming)
        #[arg(short, long, default_value = "outgoing")]
        direction: String,
    },

    /// Append ITEM to NODE's indexed neighborhood LABEL
    Append {
        /// Represented node id
        node: u64,

        /// Selector label
        label: String,

        /// Node to append
        item: u64,
    },

    /// Export the graph
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (json, binary)
        #[arg(short = 't', long, default_value = "json")]
        format: String,
    },
}

/// Parse a `key=value` argument.
pub fn parse_attribute(arg: &str) -> Result<(String, Value), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{arg}'"))?;
    if key.is_empty() {
        return Err(format!("empty attribute key in '{arg}'"));
    }
    Ok((key.to_string(), parse_value(value)))
}

/// Interpret a command-line value as int, float, bool, or else string.
pub fn parse_value(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Int(int);
    }
    // NaN and infinities have no JSON form; they stay strings.
    if let Ok(float) = raw.parse::<f64>()
        && float.is_finite()
    {
        return Value::Float(float);
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), TesseraError> {
    let config = TesseraConfig::load(&cli.config)?;
    let ctx = Context {
        json: cli.json || config.output.json,
        quiet: cli.quiet,
        snapshot: cli.snapshot,
        config,
    };

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&ctx, force),
        Some(Commands::Status) | None => cmd_status(&ctx),
        Some(Commands::Show { id }) => cmd_show(&ctx, id),
        Some(Commands::AddNode { labels, attrs }) => cmd_add_node(&ctx, labels, attrs),
        Some(Commands::Connect {
            origin,
            target,
            labels,
            attrs,
        }) => cmd_connect(&ctx, origin, target, labels, attrs),
        Some(Commands::Remove { id }) => cmd_remove(&ctx, id),
        Some(Commands::Set { id, key, value }) => cmd_set(&ctx, id, &key, value.as_deref()),
        Some(Commands::Neighborhood {
            node,
            label,
            kind,
            direction,
        }) => cmd_neighborhood(&ctx, node, &label, &kind, &direction),
        Some(Commands::Append { node, label, item }) => cmd_append(&ctx, node, &label, item),
        Some(Commands::Export { output, format }) => cmd_export(&ctx, &output, &format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_parse_most_specific_first() {
        assert_eq!(parse_value("42"), Value::Int(42));
        assert_eq!(parse_value("2.5"), Value::Float(2.5));
        assert_eq!(parse_value("true"), Value::Bool(true));
        assert_eq!(parse_value("True"), Value::from("True"));
        assert_eq!(parse_value(""), Value::from(""));
    }

    #[test]
    fn non_finite_numbers_stay_strings() {
        assert_eq!(parse_value("nan"), Value::from("nan"));
        assert_eq!(parse_value("inf"), Value::from("inf"));
        assert_eq!(parse_value("-infinity"), Value::from("-infinity"));
        assert_eq!(parse_value("1e308"), Value::Float(1e308));
    }

    #[test]
    fn attribute_needs_key_and_equals() {
        assert_eq!(
            parse_attribute("title=a=b").ok(),
            Some(("title".to_string(), Value::from("a=b")))
        );
        assert!(parse_attribute("title").is_err());
        assert!(parse_attribute("=1").is_err());
    }

    #[test]
    fn cli_parses_repeated_flags() {
        let cli = Cli::parse_from([
            "tessera", "--snapshot", "g.json", "add-node", "-l", "Person", "-l", "Author",
            "--attr", "age=30",
        ]);
        let Some(Commands::AddNode { labels, attrs }) = cli.command else {
            unreachable!("expected add-node");
        };
        assert_eq!(labels, vec!["Person", "Author"]);
        assert_eq!(attrs, vec![("age".to_string(), Value::Int(30))]);
        assert_eq!(cli.snapshot, PathBuf::from("g.json"));
    }
}
