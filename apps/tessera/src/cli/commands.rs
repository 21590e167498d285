//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command loads the snapshot, works on the in-memory graph through
//! the core API and, when it mutated anything, writes the snapshot back in
//! the format it was read in.

use super::parse_value;
use crate::config::TesseraConfig;
use serde_json::json;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tessera_core::formats::persistence::is_binary_snapshot;
use tessera_core::{
    Attributes, Direction, Graph, GraphObject, GraphSnapshot, IndexedNeighborhood, Link, Neighborhood,
    NeighborhoodKind, Node, NodeId, ObjectId, TesseraError, Value, graph_from_bytes,
    graph_to_bytes, label_set,
};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum snapshot file size accepted for reading (256 MB).
///
/// Checked from file metadata before the file is read.
const MAX_SNAPSHOT_FILE_SIZE: u64 = 256 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), TesseraError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| TesseraError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(TesseraError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an output path: its parent must be an existing directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, TesseraError> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    let canonical_parent = parent.canonicalize().map_err(|e| {
        TesseraError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(TesseraError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| TesseraError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// CONTEXT & SNAPSHOT FILES
// =============================================================================

/// Settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub snapshot: PathBuf,
    pub config: TesseraConfig,
    pub json: bool,
    pub quiet: bool,
}

/// On-disk snapshot encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotFormat {
    Json,
    Binary,
}

impl SnapshotFormat {
    /// Format implied by a file name: `.tsra`/`.bin` are binary, anything else JSON.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("tsra" | "bin") => Self::Binary,
            _ => Self::Json,
        }
    }
}

impl FromStr for SnapshotFormat {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "binary" => Ok(Self::Binary),
            _ => Err(TesseraError::SerializationError(format!(
                "Unknown format: {}. Use: json, binary",
                s
            ))),
        }
    }
}

impl fmt::Display for SnapshotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Binary => "binary",
        })
    }
}

/// Load a snapshot file. A missing file is an empty graph.
pub fn load_graph(path: &Path) -> Result<(Graph, SnapshotFormat), TesseraError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no snapshot, starting empty");
        return Ok((Graph::new(), SnapshotFormat::for_path(path)));
    }

    validate_file_size(path, MAX_SNAPSHOT_FILE_SIZE)?;
    let data = std::fs::read(path)
        .map_err(|e| TesseraError::IoError(format!("Read snapshot: {}", e)))?;

    let (graph, format) = if is_binary_snapshot(&data) {
        (graph_from_bytes(&data)?, SnapshotFormat::Binary)
    } else {
        let snapshot: GraphSnapshot = serde_json::from_slice(&data)
            .map_err(|e| TesseraError::DeserializationError(e.to_string()))?;
        (snapshot.restore()?, SnapshotFormat::Json)
    };

    tracing::debug!(
        path = %path.display(),
        %format,
        nodes = graph.node_count(),
        links = graph.link_count(),
        "snapshot loaded"
    );
    Ok((graph, format))
}

/// Encode a graph in `format`.
///
/// JSON has no encoding for NaN or the infinities, so a graph holding one
/// is refused rather than written as a snapshot that cannot be read back.
pub fn encode_graph(graph: &Graph, format: SnapshotFormat) -> Result<Vec<u8>, TesseraError> {
    match format {
        SnapshotFormat::Json => {
            reject_non_finite(graph)?;
            serde_json::to_vec_pretty(&GraphSnapshot::from(graph))
                .map_err(|e| TesseraError::SerializationError(e.to_string()))
        }
        SnapshotFormat::Binary => graph_to_bytes(graph),
    }
}

fn reject_non_finite(graph: &Graph) -> Result<(), TesseraError> {
    let objects = graph
        .nodes()
        .map(|node| node as &dyn GraphObject)
        .chain(graph.links().map(|link| link as &dyn GraphObject));
    for object in objects {
        for (key, value) in object.attributes() {
            if let Value::Float(float) = value
                && !float.is_finite()
            {
                let id = object.object_id().map_or(0, |id| id.raw());
                return Err(TesseraError::SerializationError(format!(
                    "attribute {key} of object {id} is {float}, which JSON cannot represent"
                )));
            }
        }
    }
    Ok(())
}

/// Write a graph to a snapshot file.
pub fn save_graph(graph: &Graph, path: &Path, format: SnapshotFormat) -> Result<(), TesseraError> {
    let data = encode_graph(graph, format)?;
    std::fs::write(path, &data)
        .map_err(|e| TesseraError::IoError(format!("Write snapshot: {}", e)))?;
    tracing::debug!(path = %path.display(), %format, bytes = data.len(), "snapshot saved");
    Ok(())
}

// =============================================================================
// OUTPUT HELPERS
// =============================================================================

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

/// Report the outcome of a mutating command.
fn announce(ctx: &Context, message: impl fmt::Display, value: serde_json::Value) {
    if ctx.json {
        print_json(&value);
    } else if !ctx.quiet {
        println!("{}", message);
    }
}

fn value_json(value: &Value) -> serde_json::Value {
    match value {
        Value::String(s) => json!(s),
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        Value::Float(x) => json!(x),
    }
}

fn attributes_json(object: &dyn GraphObject) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = object
        .attributes()
        .iter()
        .map(|(key, value)| (key.clone(), value_json(value)))
        .collect();
    serde_json::Value::Object(map)
}

fn node_json(graph: &Graph, id: NodeId, node: &Node) -> serde_json::Value {
    json!({
        "kind": "node",
        "id": id.0,
        "labels": node.labels(),
        "attributes": attributes_json(node),
        "outgoing": graph.outgoing(id).filter_map(Link::id).map(|l| l.0).collect::<Vec<_>>(),
        "incoming": graph.incoming(id).filter_map(Link::id).map(|l| l.0).collect::<Vec<_>>(),
    })
}

fn link_json(raw: u64, link: &Link) -> serde_json::Value {
    json!({
        "kind": "link",
        "id": raw,
        "origin": link.origin().0,
        "target": link.target().0,
        "labels": link.labels(),
        "attributes": attributes_json(link),
    })
}

fn print_attributes(object: &dyn GraphObject) {
    if object.attributes().is_empty() {
        println!("Attributes: (none)");
        return;
    }
    println!("Attributes:");
    for (key, value) in object.attributes() {
        println!("  {} = {}", key, value);
    }
}

fn join_labels(object: &dyn GraphObject) -> String {
    if object.labels().is_empty() {
        return "(none)".to_string();
    }
    object
        .labels()
        .iter()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

fn require_object(graph: &Graph, raw: u64) -> Result<ObjectId, TesseraError> {
    graph.resolve(raw).ok_or(TesseraError::ObjectNotFound(raw))
}

fn require_node(graph: &Graph, raw: u64) -> Result<NodeId, TesseraError> {
    require_object(graph, raw)?
        .as_node()
        .ok_or(TesseraError::ObjectNotFound(raw))
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Create an empty snapshot file.
pub fn cmd_init(ctx: &Context, force: bool) -> Result<(), TesseraError> {
    if ctx.snapshot.exists() && !force {
        return Err(TesseraError::IoError(
            "Snapshot already exists. Use --force to overwrite.".to_string(),
        ));
    }

    let format = SnapshotFormat::for_path(&ctx.snapshot);
    save_graph(&Graph::new(), &ctx.snapshot, format)?;
    tracing::info!(path = %ctx.snapshot.display(), %format, "snapshot initialized");

    announce(
        ctx,
        format!("Initialized new {} snapshot at {:?}", format, ctx.snapshot),
        json!({ "snapshot": ctx.snapshot.to_string_lossy(), "format": format.to_string() }),
    );
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show graph status.
pub fn cmd_status(ctx: &Context) -> Result<(), TesseraError> {
    let (graph, format) = load_graph(&ctx.snapshot)?;
    let sinks = graph.node_ids().filter(|id| graph.is_sink(*id)).count();
    let sources = graph.node_ids().filter(|id| graph.is_source(*id)).count();
    let orphans = graph.node_ids().filter(|id| graph.is_orphan(*id)).count();

    if ctx.json {
        print_json(&json!({
            "snapshot": ctx.snapshot.to_string_lossy(),
            "format": format.to_string(),
            "node_count": graph.node_count(),
            "link_count": graph.link_count(),
            "sinks": sinks,
            "sources": sources,
            "orphans": orphans,
        }));
        return Ok(());
    }

    println!("Tessera Graph Status");
    println!("====================");
    println!("Snapshot: {:?} ({})", ctx.snapshot, format);
    println!();
    println!("Nodes:   {}", graph.node_count());
    println!("Links:   {}", graph.link_count());
    println!("Sinks:   {}", sinks);
    println!("Sources: {}", sources);
    println!("Orphans: {}", orphans);

    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// Show one node or link.
pub fn cmd_show(ctx: &Context, raw: u64) -> Result<(), TesseraError> {
    let (graph, _) = load_graph(&ctx.snapshot)?;

    match require_object(&graph, raw)? {
        ObjectId::Node(id) => {
            let node = graph.node(id).ok_or(TesseraError::ObjectNotFound(raw))?;
            if ctx.json {
                print_json(&node_json(&graph, id, node));
                return Ok(());
            }
            println!("Node {}", raw);
            println!("Labels: {}", join_labels(node));
            print_attributes(node);
            for link in graph.outgoing(id) {
                if let Some(link_id) = link.id() {
                    println!("  -> {} via link {}", link.target().0, link_id.0);
                }
            }
            for link in graph.incoming(id) {
                if let Some(link_id) = link.id() {
                    println!("  <- {} via link {}", link.origin().0, link_id.0);
                }
            }
        }
        ObjectId::Link(id) => {
            let link = graph.link(id).ok_or(TesseraError::ObjectNotFound(raw))?;
            if ctx.json {
                print_json(&link_json(raw, link));
                return Ok(());
            }
            println!("Link {}: {} -> {}", raw, link.origin().0, link.target().0);
            println!("Labels: {}", join_labels(link));
            print_attributes(link);
        }
    }

    Ok(())
}

// =============================================================================
// MUTATION COMMANDS
// =============================================================================

/// Create a node.
pub fn cmd_add_node(
    ctx: &Context,
    labels: Vec<String>,
    attrs: Vec<(String, Value)>,
) -> Result<(), TesseraError> {
    let (mut graph, format) = load_graph(&ctx.snapshot)?;

    let attributes: Attributes = attrs.into_iter().collect();
    let id = graph.create_node(label_set(labels), attributes, None);
    save_graph(&graph, &ctx.snapshot, format)?;

    announce(ctx, format!("Created node {}", id.0), json!({ "node": id.0 }));
    Ok(())
}

/// Create a link between two existing nodes.
pub fn cmd_connect(
    ctx: &Context,
    origin: u64,
    target: u64,
    labels: Vec<String>,
    attrs: Vec<(String, Value)>,
) -> Result<(), TesseraError> {
    let (mut graph, format) = load_graph(&ctx.snapshot)?;
    let origin = require_node(&graph, origin)?;
    let target = require_node(&graph, target)?;

    let attributes: Attributes = attrs.into_iter().collect();
    let id = graph.connect(origin, target, label_set(labels), attributes, None);
    save_graph(&graph, &ctx.snapshot, format)?;

    announce(
        ctx,
        format!("Created link {}: {} -> {}", id.0, origin.0, target.0),
        json!({ "link": id.0, "origin": origin.0, "target": target.0 }),
    );
    Ok(())
}

/// Remove a node (cascading to its links) or a single link.
pub fn cmd_remove(ctx: &Context, raw: u64) -> Result<(), TesseraError> {
    let (mut graph, format) = load_graph(&ctx.snapshot)?;

    let (message, value) = match require_object(&graph, raw)? {
        ObjectId::Node(id) => {
            let removed = graph.remove_node(id);
            (
                format!("Removed node {} and {} link(s)", raw, removed.links.len()),
                json!({ "removed": "node", "id": raw, "links": removed.links.len() }),
            )
        }
        ObjectId::Link(id) => {
            graph.disconnect(id);
            (
                format!("Removed link {}", raw),
                json!({ "removed": "link", "id": raw }),
            )
        }
    };
    save_graph(&graph, &ctx.snapshot, format)?;

    announce(ctx, message, value);
    Ok(())
}

/// Set an attribute, or unset it when `value` is absent.
pub fn cmd_set(ctx: &Context, raw: u64, key: &str, value: Option<&str>) -> Result<(), TesseraError> {
    let (mut graph, format) = load_graph(&ctx.snapshot)?;
    let object = require_object(&graph, raw)?;

    let value = value.map(parse_value);
    let (message, report) = match &value {
        Some(v) => (format!("Set {}.{} = {}", raw, key, v), value_json(v)),
        None => (format!("Unset {}.{}", raw, key), serde_json::Value::Null),
    };
    graph.update_attribute(object, key, value);
    save_graph(&graph, &ctx.snapshot, format)?;

    announce(ctx, message, json!({ "id": raw, "key": key, "value": report }));
    Ok(())
}

// =============================================================================
// NEIGHBORHOOD COMMANDS
// =============================================================================

/// List a node's neighborhood as a view of the requested kind.
pub fn cmd_neighborhood(
    ctx: &Context,
    raw: u64,
    label: &str,
    kind: &str,
    direction: &str,
) -> Result<(), TesseraError> {
    let kind: NeighborhoodKind = kind.parse()?;
    let direction: Direction = direction.parse()?;
    let (graph, _) = load_graph(&ctx.snapshot)?;
    let node = require_node(&graph, raw)?;

    let view = Neighborhood::configured(kind, node, label, direction, &ctx.config.neighborhood);
    let (lines, members): (Vec<String>, Vec<serde_json::Value>) = match &view {
        Neighborhood::Any(view) => view
            .nodes(&graph)
            .into_iter()
            .map(|member| (format!("  {}", member.0), json!({ "node": member.0 })))
            .unzip(),
        Neighborhood::Indexed(view) => view
            .nodes(&graph)
            .into_iter()
            .enumerate()
            .map(|(position, member)| {
                (
                    format!("  [{}] {}", position, member.0),
                    json!({ "position": position, "node": member.0 }),
                )
            })
            .unzip(),
        Neighborhood::Keyed(view) => view
            .entries(&graph)
            .into_iter()
            .map(|(key, member)| {
                (
                    format!("  {} => {}", key, member.0),
                    json!({ "key": value_json(&key), "node": member.0 }),
                )
            })
            .unzip(),
        Neighborhood::One(view) => view
            .node(&graph)
            .into_iter()
            .map(|member| (format!("  {}", member.0), json!({ "node": member.0 })))
            .unzip(),
    };

    if ctx.json {
        print_json(&json!({
            "node": raw,
            "label": label,
            "kind": kind.to_string(),
            "direction": direction.to_string(),
            "count": view.count(&graph),
            "members": members,
        }));
        return Ok(());
    }

    println!("{} neighborhood '{}' of node {} ({})", kind, label, raw, direction);
    if lines.is_empty() {
        println!("  (empty)");
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

/// Append `item` to the outgoing indexed neighborhood `label` of `node`.
pub fn cmd_append(ctx: &Context, raw: u64, label: &str, item: u64) -> Result<(), TesseraError> {
    let (mut graph, format) = load_graph(&ctx.snapshot)?;
    let node = require_node(&graph, raw)?;
    let item = require_node(&graph, item)?;

    let config = &ctx.config.neighborhood;
    let list = IndexedNeighborhood::new(node, config.selector(label, Direction::Outgoing))
        .with_index_attribute(config.index_attribute.clone());
    let link = list.append(&mut graph, item);
    let index = graph
        .attribute(link, list.index_attribute())
        .and_then(Value::as_int)
        .unwrap_or_default();
    save_graph(&graph, &ctx.snapshot, format)?;

    announce(
        ctx,
        format!("Appended node {} to '{}' of node {} at index {}", item.0, label, raw, index),
        json!({ "link": link.0, "index": index }),
    );
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export the graph to `output`.
pub fn cmd_export(ctx: &Context, output: &Path, format: &str) -> Result<(), TesseraError> {
    let format: SnapshotFormat = format.parse()?;
    let validated_output = validate_output_path(output)?;
    let (graph, _) = load_graph(&ctx.snapshot)?;

    let data = encode_graph(&graph, format)?;
    std::fs::write(&validated_output, &data)
        .map_err(|e| TesseraError::IoError(format!("Write file: {}", e)))?;
    tracing::info!(path = %validated_output.display(), %format, "graph exported");

    announce(
        ctx,
        format!("Exported {} bytes to {:?}", data.len(), validated_output),
        json!({ "bytes": data.len(), "output": validated_output.to_string_lossy(), "format": format.to_string() }),
    );
    Ok(())
}
