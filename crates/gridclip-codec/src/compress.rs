//! DEFLATE (zlib container) helpers for frame payloads.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{Error, Result};

/// Deflate a payload at the default compression level.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    // Writing to a Vec sink cannot fail.
    encoder.write_all(data).expect("in-memory deflate cannot fail");
    encoder.finish().expect("in-memory deflate cannot fail")
}

/// Inflate a payload, mapping corrupt or truncated input to
/// [`Error::Decompression`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    ZlibDecoder::new(data)
        .read_to_end(&mut out)
        .map_err(|e| Error::Decompression(e.to_string()))?;
    Ok(out)
}
