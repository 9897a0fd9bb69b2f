//! Subset generation over ordered sequences.
//!
//! Subsets are handled in two forms: as position lists produced by
//! [`IndexCombinations`], and as [`Subset`] bitmasks over pool positions.
//! Enumeration is always lexicographic in input order, which the greedy
//! selector relies on for tie-breaking.

/// Largest pool the bitmask representation supports.
pub const MAX_POOL_SIZE: usize = 128;

/// Binomial coefficient `C(n, r)`.
///
/// Returns `Some(0)` when `r > n` and `None` if the result does not fit in a `u64`.
pub fn binomial(n: u64, r: u64) -> Option<u64> {
    if r > n {
        return Some(0);
    }
    let r = r.min(n - r);
    let mut acc: u128 = 1;
    for i in 0..r {
        acc = acc.checked_mul(u128::from(n - i))? / u128::from(i + 1);
        if acc > u128::from(u64::MAX) {
            return None;
        }
    }
    Some(acc as u64)
}

/// Pascal triangle used for ranking subsets.
///
/// Entries saturate at `u64::MAX`; callers only read entries bounded by
/// the universe size, which the engine limits keep in range.
#[derive(Debug, Clone)]
pub struct BinomialTable {
    rows: Vec<Vec<u64>>,
}

impl BinomialTable {
    /// Build the table for all `C(a, b)` with `a <= n`.
    pub fn new(n: usize) -> Self {
        let mut rows: Vec<Vec<u64>> = Vec::with_capacity(n + 1);
        for a in 0..=n {
            let mut row = vec![1u64; a + 1];
            for b in 1..a {
                row[b] = rows[a - 1][b - 1].saturating_add(rows[a - 1][b]);
            }
            rows.push(row);
        }
        Self { rows }
    }

    /// `C(a, b)`, zero when `b > a`.
    #[inline]
    pub fn get(&self, a: usize, b: usize) -> u64 {
        if b > a {
            0
        } else {
            self.rows[a][b]
        }
    }
}

/// A subset of pool positions, stored as a bitmask.
///
/// Two subsets are equal exactly when they hold the same positions, so
/// identity does not depend on how the subset was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Subset(u128);

impl Subset {
    pub const EMPTY: Subset = Subset(0);

    /// Build a subset from pool positions. Positions must be below [`MAX_POOL_SIZE`].
    pub fn from_positions(positions: &[usize]) -> Self {
        let mut bits = 0u128;
        for &p in positions {
            debug_assert!(p < MAX_POOL_SIZE);
            bits |= 1u128 << p;
        }
        Subset(bits)
    }

    #[inline]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn contains(self, position: usize) -> bool {
        position < MAX_POOL_SIZE && self.0 & (1u128 << position) != 0
    }

    /// True if every position of `other` is also in `self`.
    #[inline]
    pub fn is_superset_of(self, other: Subset) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub fn bits(self) -> u128 {
        self.0
    }

    /// Positions in ascending order.
    pub fn positions(self) -> Positions {
        Positions(self.0)
    }
}

/// Iterator over the set positions of a [`Subset`], lowest first.
#[derive(Debug, Clone)]
pub struct Positions(u128);

impl Iterator for Positions {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.0 == 0 {
            return None;
        }
        let position = self.0.trailing_zeros() as usize;
        self.0 &= self.0 - 1;
        Some(position)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Fresh,
    Running,
    Done,
}

/// Lexicographic enumeration of the size-`r` position sets of `0..n`.
///
/// The position buffer is advanced in place, so hot loops can walk
/// millions of combinations without allocating.
#[derive(Debug, Clone)]
pub struct IndexCombinations {
    n: usize,
    indices: Vec<usize>,
    cursor: Cursor,
}

impl IndexCombinations {
    pub fn new(n: usize, r: usize) -> Self {
        Self {
            n,
            indices: (0..r).collect(),
            cursor: if r > n { Cursor::Done } else { Cursor::Fresh },
        }
    }

    /// Advance to the next combination and return its positions.
    pub fn next_positions(&mut self) -> Option<&[usize]> {
        match self.cursor {
            Cursor::Done => return None,
            Cursor::Fresh => {
                self.cursor = Cursor::Running;
                return Some(&self.indices);
            }
            Cursor::Running => {}
        }

        let r = self.indices.len();
        let mut i = r;
        loop {
            if i == 0 {
                self.cursor = Cursor::Done;
                return None;
            }
            i -= 1;
            if self.indices[i] < self.n - r + i {
                break;
            }
        }

        self.indices[i] += 1;
        for j in i + 1..r {
            self.indices[j] = self.indices[j - 1] + 1;
        }
        Some(&self.indices)
    }
}

/// All size-`r` subsets of `items`, in lexicographic order of `items`.
///
/// `r == 0` yields a single empty subset, `r == items.len()` yields the
/// whole input once and `r > items.len()` yields nothing.
#[derive(Debug, Clone)]
pub struct Combinations<'a, T> {
    items: &'a [T],
    inner: IndexCombinations,
}

impl<'a, T> Combinations<'a, T> {
    pub fn new(items: &'a [T], r: usize) -> Self {
        Self {
            items,
            inner: IndexCombinations::new(items.len(), r),
        }
    }
}

impl<T: Clone> Iterator for Combinations<'_, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        let items = self.items;
        self.inner
            .next_positions()
            .map(|positions| positions.iter().map(|&p| items[p].clone()).collect())
    }
}
