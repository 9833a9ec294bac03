//! The hash chain: block construction, genesis, validation and append.
//!
//! Every block links to its predecessor by hash and sits exactly one position
//! after it. A candidate extends the chain only if linkage, integrity and
//! contiguity all hold; otherwise the chain is left untouched.

use std::sync::Arc;

use parking_lot::RwLock;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::error::ChainError;
use crate::model::{compute_hash, Block, CheckoutPayload};

/// Current wall-clock time as RFC3339 text.
fn now_timestamp() -> String {
    let now = OffsetDateTime::now_utc();
    now.format(&Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

impl Block {
    /// Build the block that follows `previous`, stamped with the current time.
    pub fn create(previous: &Block, payload: CheckoutPayload) -> Block {
        Self::sealed(
            previous.position + 1,
            now_timestamp(),
            payload,
            previous.hash.clone(),
        )
    }

    /// The chain root: position 0, sentinel payload, empty prev_hash.
    pub fn genesis() -> Block {
        Self::sealed(0, now_timestamp(), CheckoutPayload::genesis(), String::new())
    }

    /// Assemble a block and compute its hash.
    pub fn sealed(
        position: u64,
        timestamp: String,
        payload: CheckoutPayload,
        prev_hash: String,
    ) -> Block {
        let hash = compute_hash(position, &timestamp, &payload, &prev_hash);
        Block {
            position,
            payload,
            timestamp,
            hash,
            prev_hash,
        }
    }
}

/// Run linkage, integrity and contiguity checks in that order.
pub fn check_link(candidate: &Block, predecessor: &Block) -> Result<(), ChainError> {
    if candidate.prev_hash != predecessor.hash {
        return Err(ChainError::Linkage {
            position: candidate.position,
            expected: predecessor.hash.clone(),
            found: candidate.prev_hash.clone(),
        });
    }

    let recomputed = candidate.compute_hash();
    if recomputed != candidate.hash {
        return Err(ChainError::Integrity {
            position: candidate.position,
            stored: candidate.hash.clone(),
            recomputed,
        });
    }

    let expected = predecessor.position + 1;
    if candidate.position != expected {
        return Err(ChainError::Contiguity {
            expected,
            found: candidate.position,
        });
    }
    Ok(())
}

/// Whether `candidate` may follow `predecessor`.
pub fn is_valid(candidate: &Block, predecessor: &Block) -> bool {
    check_link(candidate, predecessor).is_ok()
}

/// Shape checks for a chain root. Empty means well-formed.
fn genesis_findings(genesis: &Block) -> Vec<String> {
    let mut errors = vec![];
    if genesis.position != 0 {
        errors.push(format!("genesis position is {}, expected 0", genesis.position));
    }
    if !genesis.prev_hash.is_empty() {
        errors.push("genesis prev_hash should be empty".to_string());
    }
    if !genesis.payload.is_genesis {
        errors.push("genesis payload is missing the genesis flag".to_string());
    }
    if !genesis.has_valid_hash() {
        errors.push("genesis block hash mismatch".to_string());
    }
    errors
}

/// Append-only sequence of blocks rooted at a genesis block.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// A fresh chain holding only a genesis block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    /// Root a chain at a caller-supplied genesis block.
    ///
    /// The block must sit at position 0 with an empty prev_hash, carry the
    /// genesis flag and hash to its stored value.
    pub fn with_genesis(genesis: Block) -> Result<Self, ChainError> {
        let findings = genesis_findings(&genesis);
        if !findings.is_empty() {
            return Err(ChainError::Genesis(findings));
        }
        Ok(Self {
            blocks: vec![genesis],
        })
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true: a chain always holds its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The current tail.
    pub fn tip(&self) -> &Block {
        // `blocks` is non-empty from construction and never shrinks.
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get(&self, position: u64) -> Option<&Block> {
        usize::try_from(position)
            .ok()
            .and_then(|i| self.blocks.get(i))
    }

    /// Build a block for `payload` on top of the tail and append it if valid.
    pub fn append(&mut self, payload: CheckoutPayload) -> Result<Block, ChainError> {
        let candidate = Block::create(self.tip(), payload);
        self.try_append(candidate)
    }

    /// Validate a caller-built block against the tail and append it if valid.
    ///
    /// On rejection the chain is unchanged.
    pub fn try_append(&mut self, candidate: Block) -> Result<Block, ChainError> {
        check_link(&candidate, self.tip())?;
        self.blocks.push(candidate.clone());
        Ok(candidate)
    }

    /// Owned copy of every block, genesis first.
    pub fn snapshot(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    /// Re-validate the whole chain. Returns one message per violation.
    pub fn audit(&self) -> Vec<String> {
        let mut errors = genesis_findings(&self.blocks[0]);
        for pair in self.blocks.windows(2) {
            if let Err(e) = check_link(&pair[1], &pair[0]) {
                errors.push(e.to_string());
            }
        }
        errors
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable handle to the process's single chain.
///
/// Appends are serialized under the write lock so that reading the tail,
/// building the candidate, validating and pushing happen as one step.
/// Readers get point-in-time copies under the read lock.
#[derive(Debug, Clone, Default)]
pub struct SharedChain {
    inner: Arc<RwLock<Chain>>,
}

impl SharedChain {
    pub fn new(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    pub fn append(&self, payload: CheckoutPayload) -> Result<Block, ChainError> {
        self.inner.write().append(payload)
    }

    pub fn snapshot(&self) -> Vec<Block> {
        self.inner.read().snapshot()
    }

    pub fn get(&self, position: u64) -> Option<Block> {
        self.inner.read().get(position).cloned()
    }

    pub fn tip(&self) -> Block {
        self.inner.read().tip().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Length and tail position, read together.
    pub fn head(&self) -> (usize, u64) {
        let chain = self.inner.read();
        (chain.len(), chain.tip().position)
    }

    pub fn audit(&self) -> Vec<String> {
        self.inner.read().audit()
    }

    /// Audit findings together with the length they were taken at.
    pub fn audit_with_len(&self) -> (usize, Vec<String>) {
        let chain = self.inner.read();
        (chain.len(), chain.audit())
    }
}
