//! Utility functions

use sha2::{Digest, Sha256};

/// Hex-encoded SHA256 of `data`
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

/// Lossy UTF-8 view of process output, trimmed
pub fn output_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim().to_string()
}
