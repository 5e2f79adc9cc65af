use tracing::debug;

use crate::bit_array::BitArray;
use crate::bloom_filters::BloomFilter;
use crate::digest::DigestAlgorithm;
use crate::error::{BloomError, Result};
use crate::hash_family::HashFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sizing {
    BitsPerElement(usize),
    BitSetSize(usize),
}

/// Builder for [`BloomFilter`].
///
/// A filter is sized either by bits per element or by total bit count, both
/// relative to the number of elements it is expected to hold. When no hash
/// count is given, `round(bits_per_element * ln 2)` is used.
///
/// ```
/// # #[cfg(feature = "md5")]
/// # {
/// # use bloom_filters::BloomFilterBuilder;
/// let filter = BloomFilterBuilder::with_bit_set_size(1000, 100).build().unwrap();
/// assert_eq!(filter.bits_per_element(), 10);
/// assert_eq!(filter.hash_functions_count(), 7);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BloomFilterBuilder {
    sizing: Sizing,
    expected_capacity: usize,
    hash_count: Option<usize>,
    digest: DigestAlgorithm,
}

impl BloomFilterBuilder {
    /// Sizes the filter at `bits_per_element * expected_capacity` bits.
    pub fn with_bits_per_element(bits_per_element: usize, expected_capacity: usize) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::BitsPerElement(bits_per_element),
            expected_capacity,
            hash_count: None,
            digest: DigestAlgorithm::default(),
        }
    }

    /// Sizes the filter from a requested total bit count.
    ///
    /// Bits per element is `bit_set_size / expected_capacity` rounded down, and
    /// the filter gets `bits_per_element * expected_capacity` bits, which can be
    /// fewer than requested when the division is not exact.
    pub fn with_bit_set_size(bit_set_size: usize, expected_capacity: usize) -> Self {
        BloomFilterBuilder {
            sizing: Sizing::BitSetSize(bit_set_size),
            expected_capacity,
            hash_count: None,
            digest: DigestAlgorithm::default(),
        }
    }

    pub fn hash_count(mut self, hash_count: usize) -> Self {
        self.hash_count = Some(hash_count);
        self
    }

    pub fn digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    pub fn build(self) -> Result<BloomFilter> {
        if self.expected_capacity == 0 {
            return Err(BloomError::configuration(
                "expected capacity must be greater than 0",
            ));
        }

        let bits_per_element = match self.sizing {
            Sizing::BitsPerElement(bits_per_element) => bits_per_element,
            Sizing::BitSetSize(bit_set_size) => bit_set_size / self.expected_capacity,
        };
        if bits_per_element == 0 {
            return Err(match self.sizing {
                Sizing::BitSetSize(bit_set_size) => BloomError::configuration(format!(
                    "bit set size {} is smaller than expected capacity {}",
                    bit_set_size, self.expected_capacity
                )),
                Sizing::BitsPerElement(_) => {
                    BloomError::configuration("bits per element must be greater than 0")
                }
            });
        }

        let hash_count = self
            .hash_count
            .unwrap_or_else(|| optimal_hash_count(bits_per_element));
        if hash_count == 0 {
            return Err(BloomError::configuration(
                "hash count must be greater than 0",
            ));
        }

        let bit_set_size = bits_per_element
            .checked_mul(self.expected_capacity)
            .ok_or_else(|| {
                BloomError::configuration(format!(
                    "{} bits per element for {} elements overflows the bit set size",
                    bits_per_element, self.expected_capacity
                ))
            })?;

        let hash_family = HashFamily::new(self.digest)?;
        let bits = BitArray::new(bit_set_size)?;

        debug!(
            bit_set_size,
            hash_count,
            bits_per_element,
            expected_capacity = self.expected_capacity,
            digest = %self.digest,
            "created bloom filter"
        );

        Ok(BloomFilter {
            bits,
            hash_family,
            hash_count,
            bits_per_element,
            expected_capacity: self.expected_capacity,
            inserted_count: 0,
        })
    }
}

/// Hash count minimising the false positive rate at full capacity:
/// `round(bits_per_element * ln 2)`.
pub fn optimal_hash_count(bits_per_element: usize) -> usize {
    (bits_per_element as f64 * std::f64::consts::LN_2).round() as usize
}
