use crate::digest::{DigestAlgorithm, SaltedDigest};
use crate::error::Result;

/// Derives any number of 32-bit hashes from one input by re-running a digest
/// with an incrementing one-byte salt prepended to the input.
///
/// Each digest round yields `output_len / 4` hashes, read as big-endian `u32`
/// groups. Hashes left over in the last round are discarded. A fresh hasher is
/// used for every round, so a `HashFamily` carries no mutable state and can be
/// shared freely between threads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HashFamily {
    digest: SaltedDigest,
}

impl HashFamily {
    pub fn new(algorithm: DigestAlgorithm) -> Result<Self> {
        Ok(HashFamily {
            digest: algorithm.salted()?,
        })
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.digest.algorithm()
    }

    /// Returns exactly `hash_count` hashes of `data`.
    pub fn hashes(&self, data: &[u8], hash_count: usize) -> Vec<u32> {
        let mut result = Vec::with_capacity(hash_count);
        let mut salt: u8 = 0;

        while result.len() < hash_count {
            let digest = self.digest.digest(salt, data);
            salt = salt.wrapping_add(1);

            for chunk in digest.chunks_exact(4) {
                if result.len() == hash_count {
                    break;
                }
                result.push(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
            }
        }

        result
    }

    /// Bit positions in `[0, bin_count)` selected by the hashes of `data`.
    pub fn indices(
        &self,
        data: &[u8],
        bin_count: usize,
        hash_count: usize,
    ) -> impl Iterator<Item = usize> {
        self.hashes(data, hash_count)
            .into_iter()
            .map(move |hash| bit_index(hash, bin_count))
    }
}

/// Maps a hash onto `[0, bin_count)`.
///
/// The hash is read as a signed 32-bit value and the index is `|hash| mod
/// bin_count`, which equals `|hash % bin_count|` under truncating division.
#[inline]
pub fn bit_index(hash: u32, bin_count: usize) -> usize {
    (hash as i32).unsigned_abs() as usize % bin_count
}
