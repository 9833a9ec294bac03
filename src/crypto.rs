//! Digest helpers: SHA-256 for block hashes, MD5 for certificate identifiers.

use md5::Md5;
use sha2::{Digest, Sha256};

/// Hash inputs (concatenate as bytes, SHA-256) and return lowercase hex.
pub fn sha256_hex(parts: &[&[u8]]) -> String {
    digest_hex::<Sha256>(parts)
}

/// Hash inputs (concatenate as bytes, MD5) and return lowercase hex.
pub fn md5_hex(parts: &[&[u8]]) -> String {
    digest_hex::<Md5>(parts)
}

fn digest_hex<D: Digest>(parts: &[&[u8]]) -> String {
    let mut hasher = D::new();
    for p in parts {
        hasher.update(p);
    }
    hex::encode(hasher.finalize())
}
