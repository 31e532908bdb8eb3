use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Entropy of a per-account password salt.
pub const SALT_BYTES: usize = 24;
/// Entropy of an account's bearer token.
pub const TOKEN_BYTES: usize = 32;

/// Deterministic salted hash: SHA-256 over the password concatenated with
/// the account's salt, base64 encoded.
pub fn compute_hash(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt.as_bytes());
    STANDARD.encode(hasher.finalize())
}

/// Opaque URL-safe token carrying `byte_length` bytes of OS entropy.
pub fn generate_token(byte_length: usize) -> String {
    let mut buf = vec![0u8; byte_length];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
