use crate::error::{BloomError, Result};

/// Fixed-length bit vector packed into `u64` words.
///
/// Bits past `len` in the last word are never set, so two arrays of the same
/// length compare equal exactly when their visible bits do.
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct BitArray {
    words: Box<[u64]>,
    len: usize,
}

impl BitArray {
    /// Allocates `len` unset bits, failing with [`BloomError::Configuration`]
    /// when the words cannot be allocated.
    pub fn new(len: usize) -> Result<Self> {
        let word_count = len / 64 + (len % 64 != 0) as usize;

        let mut words = Vec::new();
        words.try_reserve_exact(word_count).map_err(|_| {
            BloomError::configuration(format!("cannot allocate a bit array of {} bits", len))
        })?;
        words.resize(word_count, 0u64);

        Ok(BitArray {
            words: words.into_boxed_slice(),
            len,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index {} out of range", index);
        self.words[index / 64] & (1u64 << (index % 64)) != 0
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        assert!(index < self.len, "bit index {} out of range", index);
        self.words[index / 64] |= 1u64 << (index % 64);
    }

    pub fn clear_all(&mut self) {
        for word in self.words.iter_mut() {
            *word = 0;
        }
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }
}
