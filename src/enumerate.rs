//! Exhaustive enumeration of the partitions for a fixed `(n, k)`.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::error::Result;
use crate::labels::Partition;
use crate::unrank::Unranker;

/// Yields `(rank, partition)` for every rank in `0..S(n, k)`, in increasing rank order.
///
/// Under `ProviderStrategy::Triangle` the triangle is built before the first item and
/// every later call reads it from the cache.
#[derive(Debug)]
pub struct Partitions<'a>
{
    unranker: &'a Unranker,
    n: usize,
    k: usize,
    next: BigUint,
    end: BigUint
}

impl<'a> Partitions<'a>
{
    pub(crate) fn new(unranker: &'a Unranker, n: usize, k: usize) -> Result<Self> {
        let end = unranker.stirling_count(n, k)?;
        // (0, 0) has one partition, but unrank only accepts k >= 1
        let end = if k == 0 {BigUint::zero()} else {end};
        Ok(Partitions {unranker, n, k, next: BigUint::zero(), end})
    }

    /// Number of partitions not yet yielded
    pub fn remaining(&self) -> BigUint {
        &self.end - &self.next
    }
}

impl<'a> Iterator for Partitions<'a>
{
    type Item = Result<(BigUint, Partition)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let rank = self.next.clone();
        self.next += 1u32;
        Some(self.unranker.unrank(self.n, self.k, &rank).map(|p| (rank, p)))
    }
}
