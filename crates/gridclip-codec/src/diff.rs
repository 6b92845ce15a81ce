//! Binary packing for delta frames.
//!
//! Each record is 3 bytes: a little-endian u16 pixel index followed by the
//! new intensity. There is no header or count prefix; the record count is
//! implied by the buffer length.

use crate::error::{Error, Result};
use crate::pixel::PixelChange;

/// Serialized size of one `(index, value)` record.
pub const RECORD_SIZE: usize = 3;

/// Pack changes into the wire layout.
pub fn serialize(changes: &[PixelChange]) -> Vec<u8> {
    let mut out = Vec::with_capacity(changes.len() * RECORD_SIZE);
    for change in changes {
        out.extend_from_slice(&change.index.to_le_bytes());
        out.push(change.value);
    }
    out
}

/// Decode a serialized diff buffer. Exact inverse of [`serialize`].
pub fn deserialize(bytes: &[u8]) -> Result<Vec<PixelChange>> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(Error::MalformedDiff { len: bytes.len() });
    }

    Ok(bytes
        .chunks_exact(RECORD_SIZE)
        .map(|record| PixelChange {
            index: u16::from_le_bytes([record[0], record[1]]),
            value: record[2],
        })
        .collect())
}
