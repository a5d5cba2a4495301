//! Shared-secret key decoding.

use crate::error::TokenError;

/// Decode a hex-encoded shared secret into raw key bytes.
///
/// The string must be valid hex and decode to at least one byte.
pub fn decode_key(hex_key: &str) -> Result<Vec<u8>, TokenError> {
    let bytes = hex::decode(hex_key.trim()).map_err(|_| TokenError::InvalidKey)?;
    if bytes.is_empty() {
        return Err(TokenError::InvalidKey);
    }
    Ok(bytes)
}
