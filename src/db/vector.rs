//! Byte codec for vec0 embedding blobs.
//!
//! sqlite-vec expects raw little-endian IEEE-754 float32 arrays, 4 bytes
//! per element, no header.

use crate::error::{Result, SidecarError};

/// Serialize a float vector to the blob layout sqlite-vec expects.
pub fn serialize(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Deserialize a vec0 blob back into floats.
/// Fails unless the byte length is a multiple of 4.
pub fn deserialize(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(SidecarError::Indexer(format!(
            "Invalid embedding blob length: {} bytes",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
