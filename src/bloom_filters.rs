use std::hash::{Hash, Hasher};

use tracing::{debug, trace};

use crate::bit_array::BitArray;
use crate::builder::BloomFilterBuilder;
use crate::digest::DigestAlgorithm;
use crate::element::ElementBytes;
use crate::error::{BloomError, Result};
use crate::hash_family::HashFamily;

/// A Bloom filter sized for a fixed number of insertions.
///
/// Once `expected_capacity` elements have been added the filter is full and
/// further insertions are refused until [`clear`](BloomFilter::clear) is called.
/// Repeated elements count towards the capacity.
///
/// ```
/// # #[cfg(feature = "md5")]
/// # {
/// # use bloom_filters::BloomFilter;
/// let mut filter = BloomFilter::with_bit_set_size(64, 10).unwrap();
/// filter.add("evgeni").unwrap();
///
/// assert!(filter.contains("evgeni"));
/// assert_eq!(filter.elements_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct BloomFilter {
    pub(crate) bits: BitArray,
    pub(crate) hash_family: HashFamily,
    pub(crate) hash_count: usize,
    pub(crate) bits_per_element: usize,
    pub(crate) expected_capacity: usize,
    pub(crate) inserted_count: usize,
}

impl BloomFilter {
    /// Creates a filter of `bits_per_element * expected_capacity` bits probed by
    /// `hash_count` MD5-derived hashes per element.
    pub fn new(
        bits_per_element: usize,
        expected_capacity: usize,
        hash_count: usize,
    ) -> Result<Self> {
        BloomFilterBuilder::with_bits_per_element(bits_per_element, expected_capacity)
            .hash_count(hash_count)
            .build()
    }

    /// Creates a filter from a total bit count, deriving bits per element by
    /// integer division and the hash count as `round(bits_per_element * ln 2)`.
    pub fn with_bit_set_size(bit_set_size: usize, expected_capacity: usize) -> Result<Self> {
        BloomFilterBuilder::with_bit_set_size(bit_set_size, expected_capacity).build()
    }

    pub fn add<E: ElementBytes + ?Sized>(&mut self, element: &E) -> Result<()> {
        if self.is_full() {
            debug!(
                capacity = self.expected_capacity,
                "refusing insertion into full bloom filter"
            );
            return Err(BloomError::CapacityExceeded {
                capacity: self.expected_capacity,
            });
        }

        self.add_bytes(&element.element_bytes());
        self.inserted_count += 1;

        Ok(())
    }

    fn add_bytes(&mut self, data: &[u8]) {
        let hash_family = self.hash_family;

        for index in hash_family.indices(data, self.bits.len(), self.hash_count) {
            self.bits.set(index);
        }
    }

    /// `false` means the element was definitely never added, `true` means it
    /// possibly was.
    pub fn contains<E: ElementBytes + ?Sized>(&self, element: &E) -> bool {
        self.contains_bytes(&element.element_bytes())
    }

    fn contains_bytes(&self, data: &[u8]) -> bool {
        for index in self
            .hash_family
            .indices(data, self.bits.len(), self.hash_count)
        {
            if !self.bits.get(index) {
                return false;
            }
        }

        true
    }

    pub fn clear(&mut self) {
        trace!(elements = self.inserted_count, "clearing bloom filter");
        self.inserted_count = 0;
        self.bits.clear_all();
    }

    /// False positive probability once the filter is full.
    pub fn expected_false_positive_probability(&self) -> f64 {
        self.false_positive_probability_at(self.expected_capacity as f64)
    }

    /// `(1 - e^(-k * n / m))^k` for `n = element_count`.
    pub fn false_positive_probability_at(&self, element_count: f64) -> f64 {
        let hash_count = self.hash_count as f64;
        let bit_set_size = self.bits.len() as f64;

        (1.0 - (-hash_count * element_count / bit_set_size).exp()).powf(hash_count)
    }

    /// False positive probability with the elements added so far.
    pub fn false_positive_probability(&self) -> f64 {
        self.false_positive_probability_at(self.inserted_count as f64)
    }

    pub fn elements_count(&self) -> usize {
        self.inserted_count
    }

    pub fn hash_functions_count(&self) -> usize {
        self.hash_count
    }

    pub fn bits_per_element(&self) -> usize {
        self.bits_per_element
    }

    pub fn bit_set_size(&self) -> usize {
        self.bits.len()
    }

    pub fn expected_capacity(&self) -> usize {
        self.expected_capacity
    }

    pub fn is_full(&self) -> bool {
        self.inserted_count == self.expected_capacity
    }

    pub fn is_empty(&self) -> bool {
        self.inserted_count == 0
    }

    pub fn digest_algorithm(&self) -> DigestAlgorithm {
        self.hash_family.algorithm()
    }

    pub fn bits(&self) -> &BitArray {
        &self.bits
    }
}

// The digest is not part of a filter's identity.
impl PartialEq for BloomFilter {
    fn eq(&self, other: &Self) -> bool {
        self.expected_capacity == other.expected_capacity
            && self.bits_per_element == other.bits_per_element
            && self.hash_count == other.hash_count
            && self.bits.len() == other.bits.len()
            && self.inserted_count == other.inserted_count
            && self.bits == other.bits
    }
}

impl Eq for BloomFilter {}

impl Hash for BloomFilter {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits.hash(state);
        self.bits_per_element.hash(state);
        self.expected_capacity.hash(state);
        self.hash_count.hash(state);
    }
}

#[cfg(all(test, feature = "md5"))]
mod tests {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    use rand::rngs::OsRng;
    use rand::Rng;

    use crate::bloom_filters::BloomFilter;
    use crate::builder::optimal_hash_count;
    use crate::error::BloomError;

    fn hash_of(filter: &BloomFilter) -> u64 {
        let mut hasher = DefaultHasher::new();
        filter.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_new() {
        for _ in 0..1000 {
            let bits_per_element = OsRng.gen_range(1..=20);
            let expected_capacity = OsRng.gen_range(1..=10_000);
            let hash_count = OsRng.gen_range(1..=20);

            let filter = BloomFilter::new(bits_per_element, expected_capacity, hash_count).unwrap();
            assert_eq!(filter.hash_functions_count(), hash_count);
            assert_eq!(filter.elements_count(), 0);
            assert_eq!(filter.bits_per_element(), bits_per_element);
            assert_eq!(filter.bit_set_size(), bits_per_element * expected_capacity);
        }
    }

    #[test]
    fn test_with_bit_set_size() {
        for _ in 0..1000 {
            let bit_set_size = OsRng.gen_range(1..=20_000);
            let expected_capacity = OsRng.gen_range(1..=10_000);

            let bits_per_element = bit_set_size / expected_capacity;
            let result = BloomFilter::with_bit_set_size(bit_set_size, expected_capacity);

            if bits_per_element == 0 {
                assert!(result.is_err());
                continue;
            }

            let filter = result.unwrap();
            assert_eq!(filter.hash_functions_count(), optimal_hash_count(bits_per_element));
            assert_eq!(filter.elements_count(), 0);
            assert_eq!(filter.bits_per_element(), bits_per_element);
        }
    }

    #[test]
    fn test_hash_functions() {
        let filter = BloomFilter::with_bit_set_size(64, 10).unwrap();
        assert_eq!(filter.hash_functions_count(), 4);

        let filter = BloomFilter::new(64, 10, 4).unwrap();
        assert_eq!(filter.bit_set_size(), 640);
    }

    #[test]
    fn test_add() {
        let mut filter = BloomFilter::with_bit_set_size(64, 10).unwrap();
        filter.add("evgeni").unwrap();
        filter.add("sadpanda").unwrap();

        assert!(filter.contains("evgeni"));
        assert!(filter.contains("sadpanda"));
        assert!(filter.bits().count_ones() <= 8);
    }

    #[test]
    fn test_absent_element() {
        let mut filter = BloomFilter::new(64, 10, 4).unwrap();
        filter.add("evgeni").unwrap();
        filter.add("sadpanda").unwrap();

        assert!(!filter.contains("unrelated-string-never-added"));
    }

    #[test]
    fn test_count() {
        let mut filter = BloomFilter::with_bit_set_size(64, 10).unwrap();
        assert_eq!(filter.elements_count(), 0);

        for i in 0..10 {
            filter.add(&i).unwrap();
        }
        assert_eq!(filter.elements_count(), 10);
        assert!(filter.is_full());
    }

    #[test]
    fn test_is_empty() {
        let mut filter = BloomFilter::new(8, 2, 3).unwrap();
        assert!(filter.is_empty());

        filter.add("evgeni").unwrap();
        assert!(!filter.is_empty());
        assert!(!filter.is_full());

        filter.clear();
        assert!(filter.is_empty());
    }

    #[test]
    fn test_new_rejects_unallocatable_size() {
        let err = BloomFilter::new(usize::MAX, 1, 1).unwrap_err();

        assert!(matches!(err, BloomError::Configuration(_)));
    }

    #[test]
    fn test_capacity_exceeded() {
        let mut filter = BloomFilter::with_bit_set_size(64, 1).unwrap();
        filter.add("a").unwrap();
        let before = filter.clone();

        let err = filter.add("b").unwrap_err();
        assert_eq!(err, BloomError::CapacityExceeded { capacity: 1 });
        assert!(err.is_capacity_exceeded());
        assert_eq!(filter, before);
        assert_eq!(filter.elements_count(), 1);
    }

    #[test]
    fn test_repeats_count_towards_capacity() {
        let mut filter = BloomFilter::new(8, 3, 3).unwrap();
        for _ in 0..3 {
            filter.add("same").unwrap();
        }

        assert!(filter.add("same").unwrap_err().is_capacity_exceeded());
    }

    #[test]
    fn test_contains() {
        let mut filter = BloomFilter::with_bit_set_size(10_000, 100).unwrap();
        for _ in 0..100 {
            filter.add("evgeni").unwrap();
        }

        assert!(filter.contains("evgeni"));
        assert!(!filter.contains("sadpanda"));

        filter.clear();
        assert!(!filter.contains("evgeni"));
    }

    #[test]
    fn test_no_false_negatives() {
        let elements: Vec<u64> = (0..500).map(|_| OsRng.gen()).collect();
        let mut filter = BloomFilter::with_bit_set_size(5_000, elements.len()).unwrap();

        for element in &elements {
            filter.add(element).unwrap();
        }

        assert!(elements.iter().all(|element| filter.contains(element)));
    }

    #[test]
    fn test_clear() {
        let mut filter = BloomFilter::with_bit_set_size(10_000, 100).unwrap();
        for _ in 0..100 {
            filter.add("evgeni").unwrap();
        }
        filter.clear();

        assert_eq!(filter.hash_functions_count(), optimal_hash_count(100));
        assert_eq!(filter.elements_count(), 0);
        assert_eq!(filter.bits_per_element(), 100);
        assert_eq!(filter.bit_set_size(), 10_000);
        assert_eq!(filter.expected_capacity(), 100);
        assert_eq!(filter.bits().count_ones(), 0);

        // A cleared filter accepts a full load again.
        for i in 0..100 {
            filter.add(&i).unwrap();
        }
    }

    #[test]
    fn test_false_positive_probability() {
        let filter = BloomFilter::new(64 / 10, 10, 4).unwrap();
        assert_eq!(filter.false_positive_probability(), 0.0);

        let expected = (1.0 - (-4.0 * 10.0 / 60.0f64).exp()).powf(4.0);
        assert_eq!(filter.expected_false_positive_probability(), expected);
    }

    #[test]
    fn test_false_positive_probability_tracks_count() {
        let mut filter = BloomFilter::with_bit_set_size(1000, 100).unwrap();
        for i in 0..20 {
            filter.add(&i).unwrap();
        }

        assert_eq!(
            filter.false_positive_probability(),
            filter.false_positive_probability_at(20.0)
        );
    }

    #[test]
    fn test_false_positive_probability_monotonic() {
        let filter = BloomFilter::with_bit_set_size(1000, 100).unwrap();

        let mut previous = filter.false_positive_probability_at(0.0);
        for n in 1..=200 {
            let current = filter.false_positive_probability_at(n as f64);
            assert!(current >= previous);
            previous = current;
        }
        assert!(previous <= 1.0);
    }

    #[test]
    #[allow(clippy::eq_op)]
    fn test_equals() {
        let mut filter = BloomFilter::with_bit_set_size(1000, 500).unwrap();
        let mut twin = filter.clone();
        assert_eq!(filter, filter);

        for i in 0..250 {
            filter.add(&i).unwrap();
            twin.add(&i).unwrap();
        }
        assert_eq!(filter, twin);
        assert_eq!(hash_of(&filter), hash_of(&twin));

        twin.add("evgeni").unwrap();
        assert_ne!(filter, twin);
    }

    #[test]
    fn test_equals_compares_sizing() {
        assert_ne!(
            BloomFilter::new(8, 10, 3).unwrap(),
            BloomFilter::new(8, 10, 4).unwrap()
        );
        assert_ne!(
            BloomFilter::new(8, 10, 3).unwrap(),
            BloomFilter::new(10, 8, 3).unwrap()
        );
    }

    #[cfg(feature = "sha3")]
    #[test]
    fn test_equals_ignores_digest() {
        use crate::builder::BloomFilterBuilder;
        use crate::digest::DigestAlgorithm;

        let md5 = BloomFilterBuilder::with_bits_per_element(8, 10)
            .hash_count(3)
            .build()
            .unwrap();
        let sha3 = BloomFilterBuilder::with_bits_per_element(8, 10)
            .hash_count(3)
            .digest(DigestAlgorithm::Sha3_256)
            .build()
            .unwrap();

        assert_eq!(md5.digest_algorithm(), DigestAlgorithm::Md5);
        assert_eq!(sha3.digest_algorithm(), DigestAlgorithm::Sha3_256);
        assert_eq!(md5, sha3);
        assert_eq!(hash_of(&md5), hash_of(&sha3));
    }

    #[test]
    fn test_deterministic() {
        let mut first = BloomFilter::new(10, 50, 7).unwrap();
        let mut second = BloomFilter::new(10, 50, 7).unwrap();

        for i in 0..50 {
            let element = format!("element-{}", i);
            first.add(&element).unwrap();
            second.add(&element).unwrap();
        }

        assert_eq!(first.bits(), second.bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_shared_between_threads() {
        use std::sync::{Arc, RwLock};
        use std::thread;

        let filter = Arc::new(RwLock::new(BloomFilter::new(10, 100, 7).unwrap()));

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let filter = Arc::clone(&filter);
                thread::spawn(move || {
                    for i in 0..25 {
                        filter.write().unwrap().add(&(t * 25 + i)).unwrap();
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let filter = filter.read().unwrap();
        assert_eq!(filter.elements_count(), 100);
        assert!((0..100).all(|i| filter.contains(&i)));
    }
}
