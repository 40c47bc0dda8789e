//! Binary codec for tag trees.
//!
//! Reuses CBOR (via `ciborium`) as the wire format. CBOR items are
//! self-delimiting, so multiple trees can be concatenated into one buffer
//! and decoded back sequentially from a single reader.

use std::io::Read;

use crate::compound::Compound;

/// Codec failures. Decode errors cover truncated buffers and malformed
/// encodings alike; the underlying cause is preserved as text.
#[derive(Debug, thiserror::Error)]
pub enum TagError {
    #[error("failed to encode tag tree: {0}")]
    Encode(String),
    #[error("failed to decode tag tree: {0}")]
    Decode(String),
}

/// Append the encoding of one tree to `out`.
pub fn encode(tree: &Compound, out: &mut Vec<u8>) -> Result<(), TagError> {
    ciborium::into_writer(tree, out).map_err(|e| TagError::Encode(e.to_string()))
}

/// Decode exactly one tree from the reader, leaving trailing bytes intact.
pub fn decode<R: Read>(reader: &mut R) -> Result<Compound, TagError> {
    ciborium::from_reader(reader).map_err(|e| TagError::Decode(e.to_string()))
}
