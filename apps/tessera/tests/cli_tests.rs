//! Integration tests driving CLI commands against snapshot files on disk.

use clap::Parser;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tessera::cli::{Cli, SnapshotFormat, encode_graph, execute, load_graph};
use tessera_core::{Graph, GraphObject, IndexedNeighborhood, NodeId, Selector, TesseraError, Value};

/// Run one command against `snapshot` with output suppressed.
fn run(dir: &TempDir, snapshot: &Path, args: &[&str]) -> Result<(), TesseraError> {
    let config = dir.path().join("tessera.toml");
    let mut argv: Vec<String> = vec![
        "tessera".into(),
        "--quiet".into(),
        "--snapshot".into(),
        snapshot.display().to_string(),
        "--config".into(),
        config.display().to_string(),
    ];
    argv.extend(args.iter().map(|arg| arg.to_string()));
    execute(Cli::parse_from(argv))
}

fn workspace() -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let snapshot = dir.path().join("graph.json");
    (dir, snapshot)
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let (dir, snapshot) = workspace();

    run(&dir, &snapshot, &["init"]).expect("init");
    assert!(snapshot.exists());
    assert!(matches!(
        run(&dir, &snapshot, &["init"]),
        Err(TesseraError::IoError(_))
    ));
    run(&dir, &snapshot, &["init", "--force"]).expect("forced init");
}

#[test]
fn mutations_persist_between_commands() {
    let (dir, snapshot) = workspace();

    run(&dir, &snapshot, &["add-node", "--label", "Person", "--attr", "name=Ada"]).expect("add");
    run(&dir, &snapshot, &["add-node", "--attr", "name=Grace"]).expect("add");
    run(&dir, &snapshot, &["connect", "1", "2", "--attr", "since=1843"]).expect("connect");
    run(&dir, &snapshot, &["set", "1", "born", "1815"]).expect("set");

    let (graph, format) = load_graph(&snapshot).expect("load");
    assert_eq!(format, SnapshotFormat::Json);
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.link_count(), 1);
    assert!(graph.node(NodeId(1)).is_some_and(|node| node.has_label("Person")));
    assert_eq!(graph.attribute(NodeId(1), "name"), Some(&Value::from("Ada")));
    assert_eq!(graph.attribute(NodeId(1), "born"), Some(&Value::Int(1815)));

    run(&dir, &snapshot, &["set", "1", "born"]).expect("unset");
    let (graph, _) = load_graph(&snapshot).expect("load");
    assert_eq!(graph.attribute(NodeId(1), "born"), None);
}

#[test]
fn removing_a_node_cascades_on_disk() {
    let (dir, snapshot) = workspace();
    run(&dir, &snapshot, &["add-node"]).expect("add");
    run(&dir, &snapshot, &["add-node"]).expect("add");
    run(&dir, &snapshot, &["connect", "1", "2"]).expect("connect");

    run(&dir, &snapshot, &["remove", "1"]).expect("remove");

    let (mut graph, _) = load_graph(&snapshot).expect("load");
    assert_eq!(graph.node_count(), 1);
    assert_eq!(graph.link_count(), 0);
    // Identifiers are never reused, even across process runs.
    assert_eq!(graph.new_node(), NodeId(4));
}

#[test]
fn unknown_ids_are_typed_errors() {
    let (dir, snapshot) = workspace();
    run(&dir, &snapshot, &["add-node"]).expect("add");
    run(&dir, &snapshot, &["add-node"]).expect("add");
    run(&dir, &snapshot, &["connect", "1", "2"]).expect("connect");

    assert!(matches!(
        run(&dir, &snapshot, &["connect", "1", "9"]),
        Err(TesseraError::ObjectNotFound(9))
    ));
    // Link 3 exists but is not a node.
    assert!(matches!(
        run(&dir, &snapshot, &["connect", "3", "1"]),
        Err(TesseraError::ObjectNotFound(3))
    ));
    assert!(matches!(
        run(&dir, &snapshot, &["show", "42"]),
        Err(TesseraError::ObjectNotFound(42))
    ));
}

#[test]
fn append_builds_a_dense_indexed_list() {
    let (dir, snapshot) = workspace();
    for _ in 0..4 {
        run(&dir, &snapshot, &["add-node"]).expect("add");
    }
    for item in ["2", "3", "4"] {
        run(&dir, &snapshot, &["append", "1", "steps", item]).expect("append");
    }
    run(&dir, &snapshot, &["neighborhood", "1", "steps", "--kind", "indexed"]).expect("list");

    let (graph, _) = load_graph(&snapshot).expect("load");
    let list = IndexedNeighborhood::new(NodeId(1), Selector::new("steps"));
    assert_eq!(list.nodes(&graph), vec![NodeId(2), NodeId(3), NodeId(4)]);
    assert_eq!(list.end_index(&graph), 3);
}

#[test]
fn configured_attribute_names_are_used() {
    let (dir, snapshot) = workspace();
    std::fs::write(
        dir.path().join("tessera.toml"),
        "[neighborhood]\nlabel_attribute = \"rel\"\nindex_attribute = \"pos\"\n",
    )
    .expect("write config");
    run(&dir, &snapshot, &["add-node"]).expect("add");
    run(&dir, &snapshot, &["add-node"]).expect("add");

    run(&dir, &snapshot, &["append", "1", "steps", "2"]).expect("append");

    let (graph, _) = load_graph(&snapshot).expect("load");
    let link = graph.links().next().expect("one link");
    assert_eq!(link.attribute("rel"), Some(&Value::from("steps")));
    assert_eq!(link.attribute("pos"), Some(&Value::Int(0)));
    assert_eq!(link.attribute("label"), None);
}

#[test]
fn bad_neighborhood_names_are_rejected() {
    let (dir, snapshot) = workspace();
    run(&dir, &snapshot, &["add-node"]).expect("add");

    assert!(matches!(
        run(&dir, &snapshot, &["neighborhood", "1", "x", "--kind", "list"]),
        Err(TesseraError::UnknownNeighborhoodKind(_))
    ));
    assert!(matches!(
        run(&dir, &snapshot, &["neighborhood", "1", "x", "--direction", "sideways"]),
        Err(TesseraError::UnknownDirection(_))
    ));
}

#[test]
fn binary_export_is_a_loadable_snapshot() {
    let (dir, snapshot) = workspace();
    run(&dir, &snapshot, &["add-node", "--attr", "ratio=0.25"]).expect("add");
    let exported = dir.path().join("graph.tsra");

    run(
        &dir,
        &snapshot,
        &["export", "--output", &exported.display().to_string(), "--format", "binary"],
    )
    .expect("export");

    let (graph, format) = load_graph(&exported).expect("load binary");
    assert_eq!(format, SnapshotFormat::Binary);
    assert_eq!(graph.attribute(NodeId(1), "ratio"), Some(&Value::Float(0.25)));

    // Commands keep writing a binary snapshot in binary.
    run(&dir, &exported, &["add-node"]).expect("add to binary");
    let (graph, format) = load_graph(&exported).expect("reload");
    assert_eq!(format, SnapshotFormat::Binary);
    assert_eq!(graph.node_count(), 2);
}

#[test]
fn unknown_export_format_is_rejected() {
    let (dir, snapshot) = workspace();
    let output = dir.path().join("out.xml");

    assert!(run(
        &dir,
        &snapshot,
        &["export", "--output", &output.display().to_string(), "--format", "xml"],
    )
    .is_err());
    assert!(!output.exists());
}

#[test]
fn corrupt_snapshot_is_reported() {
    let (dir, snapshot) = workspace();
    std::fs::write(&snapshot, "{ not json").expect("write");

    assert!(matches!(
        run(&dir, &snapshot, &["status"]),
        Err(TesseraError::DeserializationError(_))
    ));
}

#[test]
fn dangling_link_in_json_snapshot_is_rejected() {
    let (dir, snapshot) = workspace();
    std::fs::write(
        &snapshot,
        r#"{"nodes":[{"id":1}],"links":[{"id":2,"origin":1,"target":7}],"next_id":3}"#,
    )
    .expect("write");

    assert!(matches!(
        run(&dir, &snapshot, &["status"]),
        Err(TesseraError::InvalidSnapshot(_))
    ));
}

#[test]
fn non_finite_input_keeps_the_snapshot_loadable() {
    let (dir, snapshot) = workspace();
    run(&dir, &snapshot, &["add-node"]).expect("add");

    run(&dir, &snapshot, &["set", "1", "x", "nan"]).expect("set nan");
    run(&dir, &snapshot, &["set", "1", "y", "inf"]).expect("set inf");

    let (graph, _) = load_graph(&snapshot).expect("reload");
    assert_eq!(graph.attribute(NodeId(1), "x"), Some(&Value::from("nan")));
    assert_eq!(graph.attribute(NodeId(1), "y"), Some(&Value::from("inf")));
    run(&dir, &snapshot, &["status"]).expect("later commands still work");
}

#[test]
fn json_encoding_refuses_non_finite_floats() {
    let mut graph = Graph::new();
    let node = graph.new_node();
    graph.set_attribute(node, "ratio", f64::NAN);

    assert!(matches!(
        encode_graph(&graph, SnapshotFormat::Json),
        Err(TesseraError::SerializationError(message)) if message.contains("ratio")
    ));
    assert!(encode_graph(&graph, SnapshotFormat::Binary).is_ok());
}
