//! Capacity-bounded Bloom filters.
//!
//! A [`BloomFilter`] is a fixed-size bit array probed at `k` positions per
//! element. The positions come from a [`HashFamily`] that runs a digest (MD5
//! unless another [`DigestAlgorithm`] is selected) over the element bytes
//! prefixed with an incrementing salt byte, and splits every digest into
//! big-endian 32-bit hashes.
//!
//! The examples need the default `md5` feature.
//!
//! ```
//! # #[cfg(feature = "md5")]
//! # {
//! use bloom_filters::BloomFilter;
//!
//! let mut filter = BloomFilter::with_bit_set_size(1000, 100).unwrap();
//! filter.add("evgeni").unwrap();
//!
//! assert!(filter.contains("evgeni"));
//! assert!(filter.false_positive_probability() < 1e-6);
//! # }
//! ```

pub mod bit_array;
pub mod bloom_filters;
pub mod builder;
pub mod digest;
pub mod element;
pub mod error;
pub mod hash_family;

pub use bit_array::BitArray;
pub use bloom_filters::BloomFilter;
pub use builder::{optimal_hash_count, BloomFilterBuilder};
pub use digest::DigestAlgorithm;
pub use element::ElementBytes;
pub use error::{BloomError, Result};
pub use hash_family::HashFamily;
