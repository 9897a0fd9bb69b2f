//! Dense bit set over universe ranks.

/// A fixed-capacity bit set backed by `u64` words.
///
/// Used for the `remaining` set of a run: it starts full and only shrinks,
/// and for coverage audits, where it starts empty and fills up.
#[derive(Debug, Clone)]
pub struct CoverSet {
    words: Vec<u64>,
    capacity: usize,
    count: usize,
}

impl CoverSet {
    const BITS_PER_WORD: usize = 64;

    /// An empty set able to hold `capacity` ranks.
    pub fn empty(capacity: usize) -> Self {
        Self {
            words: vec![0; capacity.div_ceil(Self::BITS_PER_WORD)],
            capacity,
            count: 0,
        }
    }

    /// A set holding every rank in `0..capacity`.
    pub fn full(capacity: usize) -> Self {
        let mut words = vec![u64::MAX; capacity.div_ceil(Self::BITS_PER_WORD)];
        let tail = capacity % Self::BITS_PER_WORD;
        if tail != 0 {
            if let Some(last) = words.last_mut() {
                *last = (1u64 << tail) - 1;
            }
        }
        Self {
            words,
            capacity,
            count: capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn word_and_mask(index: usize) -> (usize, u64) {
        (index / Self::BITS_PER_WORD, 1u64 << (index % Self::BITS_PER_WORD))
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }
        let (word, mask) = Self::word_and_mask(index);
        self.words[word] & mask != 0
    }

    /// Insert `index`. Returns true if it was not already present.
    #[inline]
    pub fn insert(&mut self, index: usize) -> bool {
        debug_assert!(index < self.capacity);
        let (word, mask) = Self::word_and_mask(index);
        let was_set = self.words[word] & mask != 0;
        if !was_set {
            self.words[word] |= mask;
            self.count += 1;
        }
        !was_set
    }

    /// Remove `index`. Returns true if it was present.
    #[inline]
    pub fn remove(&mut self, index: usize) -> bool {
        if index >= self.capacity {
            return false;
        }
        let (word, mask) = Self::word_and_mask(index);
        let was_set = self.words[word] & mask != 0;
        if was_set {
            self.words[word] &= !mask;
            self.count -= 1;
        }
        was_set
    }

    /// Number of `ranks` present in the set.
    #[inline]
    pub fn count_present(&self, ranks: &[u32]) -> usize {
        ranks
            .iter()
            .filter(|&&rank| self.contains(rank as usize))
            .count()
    }

    /// True if any of `ranks` is present.
    #[inline]
    pub fn intersects(&self, ranks: &[u32]) -> bool {
        ranks.iter().any(|&rank| self.contains(rank as usize))
    }

    /// Remove all of `ranks`, returning how many were present.
    pub fn remove_all(&mut self, ranks: &[u32]) -> usize {
        ranks
            .iter()
            .filter(|&&rank| self.remove(rank as usize))
            .count()
    }

    /// Present ranks in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words
            .iter()
            .enumerate()
            .flat_map(|(word_idx, &word)| {
                let base = word_idx * Self::BITS_PER_WORD;
                let mut bits = word;
                std::iter::from_fn(move || {
                    if bits == 0 {
                        return None;
                    }
                    let bit = bits.trailing_zeros() as usize;
                    bits &= bits - 1;
                    Some(base + bit)
                })
            })
    }
}
