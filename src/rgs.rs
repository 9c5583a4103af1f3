//! Enumeration of every set partition as a restricted growth sequence.
//!
//! This is the plain lexicographic enumeration of restricted growth sequences, independent of
//! any counting formula. Filtered by block count it visits exactly the partitions that
//! `unrank` produces, though in a different order.
//!
//! See <http://www-cs-faculty.stanford.edu/~uno/fasc3b.ps.gz> page 27 for the algorithm.

use crate::labels::Partition;

/// Walks all restricted growth sequences of length `n` in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RestrictedGrowth
{
    a: Vec<usize>,
    // b[j] = 1 + max(a[0..=j]) for j < n - 1
    b: Vec<usize>,
    m: usize
}

impl RestrictedGrowth
{
    /// Start at the trivial partition of size `n` (all zeroes)
    pub fn new(n: usize) -> Self {
        RestrictedGrowth {
            a: vec![0; n],
            b: vec![1; n.saturating_sub(1)],
            m: if n > 1 {1} else {0}
        }
    }

    /// Returns the current sequence
    pub fn get(&self) -> &[usize] {
        &self.a
    }

    /// Returns the size of the set being partitioned
    pub fn len(&self) -> usize {
        self.a.len()
    }

    /// Whether the set being partitioned is empty
    pub fn is_empty(&self) -> bool {
        self.a.is_empty()
    }

    /// Returns the number of non-empty blocks in the current partition
    pub fn num_blocks(&self) -> usize {
        match self.a.last() {
            Some(&al) if al == self.m => al + 1,
            _ => self.m
        }
    }

    /// The current partition in block form
    pub fn partition(&self) -> Partition {
        let mut blocks = vec![Vec::new(); self.num_blocks()];
        for (i, &v) in self.a.iter().enumerate() {
            blocks[v].push(i + 1);
        }
        Partition::from_canonical_blocks(blocks)
    }

    /// Reset to the trivial partition
    pub fn reset(&mut self) {
        *self = Self::new(self.len());
    }

    /// Move to the next sequence in lexicographic order, returning `true`,
    /// or back to the first one, returning `false`.
    pub fn increment(&mut self) -> bool {
        if let Some(al) = self.a.last_mut() {
            if *al != self.m {
                *al += 1;
                return true;
            }
        } else {
            return false;
        }

        self.increment_slowpath()
    }

    fn increment_slowpath(&mut self) -> bool {
        let n = self.len();
        if n <= 1 {
            return false;
        }

        let mut j = n - 2;
        while self.a[j] == self.b[j] {
            j -= 1;
        }
        if j == 0 {
            self.reset();
            return false;
        }

        self.a[j] += 1;
        let m = if self.a[j] == self.b[j] {self.b[j] + 1} else {self.b[j]};
        j += 1;
        for ak in &mut self.a[j..] {
            *ak = 0;
        }
        for bi in &mut self.b[j..] {
            *bi = m;
        }
        self.m = m;
        true
    }
}
