//! Opaque API token generation.

use rand::RngCore;

/// Default token size in bytes before hex encoding.
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Generate a cryptographically random opaque token, hex-encoded
/// (`2 * byte_len` characters).
pub fn generate_token(byte_len: usize) -> String {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; byte_len];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
