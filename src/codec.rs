//! Payload encoding and compression.
//!
//! Payloads are gzip-compressed (optionally) and then base64-encoded so they
//! can be embedded in a string literal. The gzip header carries no
//! timestamp or file name, so the same input always yields the same bytes.

use std::io::{Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use thiserror::Error;

/// Errors from decoding a generated payload.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Invalid gzip payload: {0}")]
    Gzip(#[from] std::io::Error),
}

/// Encode bytes as standard padded base64.
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode standard padded base64.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    Ok(STANDARD.decode(text)?)
}

/// Gzip-compress bytes with a fixed header.
pub fn compress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::best());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Decompress a gzip stream.
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    Ok(out)
}

/// Turn raw resource bytes into the text stored in a generated module.
pub fn encode_payload(bytes: &[u8], compressed: bool) -> std::io::Result<String> {
    if compressed {
        Ok(encode(&compress(bytes)?))
    } else {
        Ok(encode(bytes))
    }
}

/// Inverse of [`encode_payload`].
pub fn decode_payload(text: &str, compressed: bool) -> Result<Vec<u8>, CodecError> {
    let bytes = decode(text)?;
    if compressed {
        decompress(&bytes)
    } else {
        Ok(bytes)
    }
}
