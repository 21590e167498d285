//! # Binary Envelope
//!
//! Compact binary serialization of a [`GraphSnapshot`].
//!
//! Format: Header (5 bytes) + postcard-serialized snapshot.
//! - 4 bytes: Magic ("TSRA")
//! - 1 byte: Version
//!
//! ## Untrusted Input
//!
//! [`graph_from_bytes`] checks size limits and the header before decoding
//! any payload, and the decoded snapshot is validated before it becomes a
//! graph.

use super::GraphSnapshot;
use crate::graph::Graph;
use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES, MAX_SNAPSHOT_PAYLOAD_SIZE};
use crate::TesseraError;

/// Size of the encoded header.
pub const HEADER_SIZE: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The header that precedes every binary snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl PersistenceHeader {
    /// Header for the current format version.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), TesseraError> {
        if &self.magic != MAGIC_BYTES {
            return Err(TesseraError::DeserializationError(
                "invalid magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(TesseraError::DeserializationError(format!(
                "unsupported version: {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TesseraError> {
        let Some(header) = bytes.get(..HEADER_SIZE) else {
            return Err(TesseraError::DeserializationError(format!(
                "data too short: {} bytes, header needs {HEADER_SIZE}",
                bytes.len()
            )));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

impl Default for PersistenceHeader {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether `bytes` start with the binary snapshot magic.
#[must_use]
pub fn is_binary_snapshot(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC_BYTES)
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a graph to bytes (header + payload).
pub fn graph_to_bytes(graph: &Graph) -> Result<Vec<u8>, TesseraError> {
    let payload = postcard::to_stdvec(&GraphSnapshot::from(graph))
        .map_err(|e| TesseraError::SerializationError(e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
    bytes.extend_from_slice(&PersistenceHeader::new().to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Deserialize and validate a graph from bytes.
pub fn graph_from_bytes(bytes: &[u8]) -> Result<Graph, TesseraError> {
    if bytes.len() > HEADER_SIZE + MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(TesseraError::DeserializationError(format!(
            "data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            HEADER_SIZE + MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    PersistenceHeader::from_bytes(bytes)?.validate()?;

    let snapshot: GraphSnapshot = postcard::from_bytes(&bytes[HEADER_SIZE..]).map_err(|e| {
        TesseraError::DeserializationError(format!("failed to decode snapshot: {e}"))
    })?;
    snapshot.restore()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attributes, NodeId, Value, label_set};

    #[test]
    fn bytes_roundtrip_bit_exact() {
        let mut graph = Graph::new();
        let a = graph.create_node(label_set(["Task"]), Attributes::new(), None);
        let b = graph.new_node();
        let link = graph.connect_nodes(a, b);
        graph.set_attribute(link, "weight", 0.5);
        graph.set_attribute(a, "done", false);

        let first = graph_to_bytes(&graph).expect("serialize");
        let restored = graph_from_bytes(&first).expect("deserialize");
        let second = graph_to_bytes(&restored).expect("serialize again");

        assert_eq!(first, second);
        assert_eq!(restored.attribute(a, "done"), Some(&Value::Bool(false)));
        assert!(is_binary_snapshot(&first));
    }

    #[test]
    fn invalid_magic_rejected() {
        let mut bytes = vec![0u8; 10];
        bytes[..4].copy_from_slice(b"XXXX");

        assert!(!is_binary_snapshot(&bytes));
        assert!(matches!(
            graph_from_bytes(&bytes),
            Err(TesseraError::DeserializationError(message)) if message.contains("magic")
        ));
    }

    #[test]
    fn future_version_rejected() {
        let mut bytes = graph_to_bytes(&Graph::new()).expect("serialize");
        bytes[4] = FORMAT_VERSION + 1;

        assert!(graph_from_bytes(&bytes).is_err());
    }

    #[test]
    fn truncated_input_rejected() {
        assert!(graph_from_bytes(b"TSR").is_err());

        let mut graph = Graph::new();
        graph.new_node();
        let bytes = graph_to_bytes(&graph).expect("serialize");
        assert!(graph_from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn decoded_snapshot_is_validated() {
        let snapshot = GraphSnapshot {
            nodes: vec![crate::Node::with_id(NodeId(1), Default::default(), Attributes::new())],
            links: vec![crate::Link::new(NodeId(1), NodeId(9), Default::default(), Attributes::new())],
            next_id: 2,
        };
        let mut bytes = PersistenceHeader::new().to_bytes().to_vec();
        bytes.extend(postcard::to_stdvec(&snapshot).expect("encode"));

        assert!(matches!(
            graph_from_bytes(&bytes),
            Err(TesseraError::InvalidSnapshot(_))
        ));
    }
}
