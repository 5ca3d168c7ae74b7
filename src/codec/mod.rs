use bytes::Bytes;

use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::Entity;

/// Serialize an entity into the compact point-record form.
/// The enum tag makes the output self-describing; bincode's field order is
/// the declaration order, so the byte layout is deterministic.
pub fn encode(entity: &Entity) -> Result<Bytes> {
    let buf = bincode::serialize(entity)
        .map_err(|e| Error::new(ErrorKind::Internal, format!("entity encode failed: {}", e)))?;
    Ok(Bytes::from(buf))
}

/// Decode a point record. A failure here means the stored bytes do not
/// match the expected shape, an index-corruption signal the caller must
/// propagate, never paper over with defaults.
pub fn decode(bytes: &[u8]) -> Result<Entity> {
    bincode::deserialize(bytes)
        .map_err(|e| Error::new(ErrorKind::MalformedRecord, format!("entity decode failed: {}", e)))
}
