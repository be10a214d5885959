//! Chunk hash combiners.
//!
//! # Overview
//!
//! A combiner folds one chunk of bytes into a running 64-bit seed. The
//! detector chains combiner calls chunk after chunk, so two items whose
//! chunk sequences are identical always end up with the same seed, while
//! differing content diverges with high probability. None of these are
//! cryptographic digests: collisions are possible and accepted.
//!
//! | Algorithm | Function |
//! |---|---|
//! | [`HashAlgorithm::Xxh3`] | seeded XXH3-64 (default) |
//! | [`HashAlgorithm::Blake3`] | BLAKE3 over `seed ‖ chunk`, truncated to 64 bits |
//! | [`HashAlgorithm::Multiplicative`] | per-byte golden-ratio hash combine |
//!
//! # Example
//!
//! ```
//! use chunkdupe::hasher::{HashAlgorithm, HashCombiner};
//!
//! let combiner = HashAlgorithm::Xxh3.combiner();
//! let a = combiner.combine(b"hello", 0).unwrap();
//! let b = combiner.combine(b"hello", 0).unwrap();
//! assert_eq!(a, b);
//! assert!(combiner.combine(b"", a).is_err());
//! ```

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64_with_seed;

/// Running hash value threaded through successive chunks.
pub type HashValue = u64;

/// Seed every item starts from.
pub const INITIAL_SEED: HashValue = 0;

const GOLDEN_RATIO: u64 = 0x9e37_79b9_7f4a_7c15;

/// Deterministic fold of a chunk into a running seed.
pub trait HashCombiner {
    /// Combine `chunk` into `seed`, returning the new seed.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::EmptyChunk`] if `chunk` is empty.
    fn combine(&self, chunk: &[u8], seed: HashValue) -> Result<HashValue, HashError>;
}

impl<H: HashCombiner + ?Sized> HashCombiner for Box<H> {
    fn combine(&self, chunk: &[u8], seed: HashValue) -> Result<HashValue, HashError> {
        (**self).combine(chunk, seed)
    }
}

impl<H: HashCombiner + ?Sized> HashCombiner for &H {
    fn combine(&self, chunk: &[u8], seed: HashValue) -> Result<HashValue, HashError> {
        (**self).combine(chunk, seed)
    }
}

/// Errors raised by hash combiners.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HashError {
    /// An empty chunk was passed in.
    #[error("Cannot combine an empty chunk")]
    EmptyChunk,
}

/// Seeded XXH3-64 combiner.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh3Combiner;

impl HashCombiner for Xxh3Combiner {
    fn combine(&self, chunk: &[u8], seed: HashValue) -> Result<HashValue, HashError> {
        if chunk.is_empty() {
            return Err(HashError::EmptyChunk);
        }
        Ok(xxh3_64_with_seed(chunk, seed))
    }
}

/// BLAKE3 over the little-endian seed followed by the chunk, truncated to
/// the first eight bytes of the digest.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Combiner;

impl HashCombiner for Blake3Combiner {
    fn combine(&self, chunk: &[u8], seed: HashValue) -> Result<HashValue, HashError> {
        if chunk.is_empty() {
            return Err(HashError::EmptyChunk);
        }

        let mut hasher = blake3::Hasher::new();
        hasher.update(&seed.to_le_bytes());
        hasher.update(chunk);

        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        Ok(u64::from_le_bytes(head))
    }
}

/// Per-byte multiplicative hash combine:
/// `seed ^= byte + φ + (seed << 6) + (seed >> 2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiplicativeCombiner;

impl HashCombiner for MultiplicativeCombiner {
    fn combine(&self, chunk: &[u8], seed: HashValue) -> Result<HashValue, HashError> {
        if chunk.is_empty() {
            return Err(HashError::EmptyChunk);
        }

        Ok(chunk.iter().fold(seed, |seed, &byte| {
            seed ^ u64::from(byte)
                .wrapping_add(GOLDEN_RATIO)
                .wrapping_add(seed << 6)
                .wrapping_add(seed >> 2)
        }))
    }
}

/// Selectable combiner algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Seeded XXH3-64
    #[default]
    Xxh3,
    /// BLAKE3, truncated to 64 bits
    Blake3,
    /// Per-byte golden-ratio hash combine
    Multiplicative,
}

impl HashAlgorithm {
    /// Build the combiner for this algorithm.
    #[must_use]
    pub fn combiner(self) -> Box<dyn HashCombiner + Send + Sync> {
        match self {
            Self::Xxh3 => Box::new(Xxh3Combiner),
            Self::Blake3 => Box::new(Blake3Combiner),
            Self::Multiplicative => Box::new(MultiplicativeCombiner),
        }
    }
}

impl std::fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Xxh3 => write!(f, "xxh3"),
            Self::Blake3 => write!(f, "blake3"),
            Self::Multiplicative => write!(f, "multiplicative"),
        }
    }
}
