//! Data model for certificate checkouts and the blocks that carry them.

use serde::{Deserialize, Serialize};

use crate::crypto::{md5_hex, sha256_hex};

/// One certificate-checkout event; the payload of a block.
///
/// Field order is part of the hash input: the canonical encoding is the
/// compact JSON of this struct, keys in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutPayload {
    /// Opaque key into the external certificate catalog.
    #[serde(default)]
    pub certificate_id: String,
    #[serde(default)]
    pub user: String,
    /// Usually ISO-8601, hashed as given.
    #[serde(default)]
    pub checkout_date: String,
    /// Set only on the genesis block's sentinel payload.
    #[serde(default)]
    pub is_genesis: bool,
}

impl CheckoutPayload {
    /// Sentinel payload carried by the genesis block.
    pub fn genesis() -> Self {
        Self {
            is_genesis: true,
            ..Self::default()
        }
    }

    /// Canonical byte encoding used as hash input.
    ///
    /// An encoding failure degrades to the empty byte sequence.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// 0 for genesis, then +1 per block.
    pub position: u64,
    pub payload: CheckoutPayload,
    /// RFC3339 creation time, kept as text.
    pub timestamp: String,
    /// SHA-256 hex over (position, timestamp, payload, prev_hash).
    pub hash: String,
    /// Hash of the predecessor; empty for genesis.
    pub prev_hash: String,
}

impl Block {
    /// Recompute this block's hash from its own fields.
    ///
    /// Position enters the digest as decimal text.
    pub fn compute_hash(&self) -> String {
        compute_hash(
            self.position,
            &self.timestamp,
            &self.payload,
            &self.prev_hash,
        )
    }

    /// True when the stored hash matches a fresh recomputation.
    pub fn has_valid_hash(&self) -> bool {
        self.compute_hash() == self.hash
    }
}

/// Hash a block's fields in the fixed order position, timestamp, payload, prev_hash.
pub fn compute_hash(
    position: u64,
    timestamp: &str,
    payload: &CheckoutPayload,
    prev_hash: &str,
) -> String {
    let position = position.to_string();
    let payload = payload.canonical_bytes();
    sha256_hex(&[
        position.as_bytes(),
        timestamp.as_bytes(),
        &payload,
        prev_hash.as_bytes(),
    ])
}

/// Catalog record submitted to `POST /new`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub publish_date: String,
    #[serde(default)]
    pub isbn: String,
}

impl Certificate {
    /// MD5 hex of `isbn ++ publish_date`; no other field contributes.
    pub fn derive_id(&self) -> String {
        md5_hex(&[self.isbn.as_bytes(), self.publish_date.as_bytes()])
    }

    /// Return the record with `id` replaced by the derived identifier.
    pub fn with_derived_id(mut self) -> Self {
        self.id = self.derive_id();
        self
    }
}
