//! # Primitives
//!
//! Fixed constants of the Tessera core.

/// Attribute holding a link's selector label.
pub const DEFAULT_LABEL_ATTRIBUTE: &str = "label";

/// Attribute holding a link's position in an indexed neighborhood.
pub const DEFAULT_INDEX_ATTRIBUTE: &str = "index";

/// Attribute holding a link's key in a keyed neighborhood.
pub const DEFAULT_KEY_ATTRIBUTE: &str = "key";

/// Magic bytes for the Tessera binary snapshot header.
///
/// - File Header = Magic Bytes ("TSRA") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"TSRA";

/// Current binary snapshot format version.
///
/// Increment this when making breaking changes to the snapshot layout.
pub const FORMAT_VERSION: u8 = 1;

/// Maximum payload size accepted by the binary snapshot decoder (256 MB).
///
/// Checked before any decoding is attempted.
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 256 * 1024 * 1024;
