//! Conversions between user text and the engine's base64 payloads

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Encodes UTF-8 text as standard base64
#[must_use]
pub fn utf8_to_base64(text: &str) -> String {
    bytes_to_base64(text.as_bytes())
}

/// Decodes a base64 payload as text
///
/// Invalid UTF-8 sequences are replaced rather than rejected, since the recovered secret
/// is shown to the user either way.
///
/// # Errors
/// Returns an error if the payload is not valid base64
pub fn base64_to_utf8(b64: &str) -> Result<String> {
    let bytes = base64_to_bytes(b64)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[must_use]
pub fn bytes_to_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// # Errors
/// Returns an error if the payload is not valid base64
pub fn base64_to_bytes(b64: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(b64.trim())
        .context("secret payload is not valid base64")
}
