//! The unrank driver: one block per step until a single block remains.

use std::sync::Arc;
use std::thread;

use num_bigint::BigUint;
use num_traits::{CheckedSub, Zero};
use tracing::{debug, trace};

use crate::enumerate::Partitions;
use crate::error::{Error, Result};
use crate::finder::find_block;
use crate::formula::{BlockCounter, FormulaStrategy};
use crate::labels::{map_to_labels, Partition};
use crate::stirling::triangle::{session_cache, Triangle, TriangleCache, MAX_TRIANGLE_DIM};
use crate::stirling::{self, initial_columns, previous_column, ColumnPair};

/// Where Stirling numbers come from during one unrank call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProviderStrategy
{
    /// Hold two adjacent columns, computing the next lower column on a background
    /// thread while the current block is searched
    #[default]
    Streaming,
    /// Look everything up in a precomputed triangle shared through a cache
    Triangle
}

/// Tuning knobs for an `Unranker`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UnrankConfig
{
    /// Stirling number provider
    pub provider: ProviderStrategy,
    /// Form of the block-count formula
    pub formula: FormulaStrategy,
    /// Evaluate the `Direct` form next to `formula` and fail on disagreement
    pub cross_check: bool,
    /// Maximum triangle dimension for `ProviderStrategy::Triangle`
    pub triangle_limit: usize
}

impl Default for UnrankConfig
{
    fn default() -> Self {
        UnrankConfig {
            provider: ProviderStrategy::default(),
            formula: FormulaStrategy::default(),
            cross_check: cfg!(debug_assertions),
            triangle_limit: MAX_TRIANGLE_DIM
        }
    }
}

impl UnrankConfig
{
    /// Use `provider` for Stirling numbers
    pub fn with_provider(mut self, provider: ProviderStrategy) -> Self {
        self.provider = provider;
        self
    }

    /// Use `formula` for block counts
    pub fn with_formula(mut self, formula: FormulaStrategy) -> Self {
        self.formula = formula;
        self
    }

    /// Enable or disable the `Direct` cross-check
    pub fn with_cross_check(mut self, cross_check: bool) -> Self {
        self.cross_check = cross_check;
        self
    }

    /// Cap the triangle dimension
    pub fn with_triangle_limit(mut self, triangle_limit: usize) -> Self {
        self.triangle_limit = triangle_limit;
        self
    }

    fn counter(&self) -> BlockCounter {
        BlockCounter::new(self.formula).with_cross_check(self.cross_check)
    }
}

/// The reduced problem between two block extractions.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchState
{
    n: usize,
    k: usize,
    rank: BigUint,
    offset: BigUint
}

impl SearchState
{
    // a block of `size` elements was taken, ranked after `consumed` partitions
    fn advance(&mut self, size: usize, consumed: BigUint) -> Result<()> {
        self.rank = self.rank.checked_sub(&consumed).ok_or_else(|| Error::inconsistent(format!(
            "block consumed {} but only rank {} was left", consumed, self.rank)))?;
        self.n -= size;
        self.k -= 1;
        self.offset += consumed;
        Ok(())
    }
}

enum Provider
{
    Streaming(ColumnPair),
    Triangle(Arc<Triangle>)
}

enum State
{
    Init,
    ExtractBlock(SearchState, Provider),
    FinalBlock(usize),
    Done
}

/// Unranks set partitions with a fixed configuration.
///
/// Independent calls share nothing mutable except the triangle cache, which is only
/// written when it has to grow.
#[derive(Debug, Clone)]
pub struct Unranker
{
    config: UnrankConfig,
    cache: Arc<TriangleCache>
}

impl Default for Unranker
{
    fn default() -> Self {
        Self::new(UnrankConfig::default())
    }
}

impl Unranker
{
    /// An unranker using the process-wide triangle cache
    pub fn new(config: UnrankConfig) -> Self {
        Unranker {config, cache: session_cache().clone()}
    }

    /// An unranker with its own triangle cache
    pub fn with_cache(config: UnrankConfig, cache: Arc<TriangleCache>) -> Self {
        Unranker {config, cache}
    }

    /// Returns the configuration
    pub fn config(&self) -> &UnrankConfig {
        &self.config
    }

    /// Returns the triangle cache
    pub fn cache(&self) -> &Arc<TriangleCache> {
        &self.cache
    }

    fn triangle(&self, n: usize, k: usize) -> Result<Arc<Triangle>> {
        self.cache.get(n, k, self.config.triangle_limit)
    }

    /// `S(n, k)`, taken from the cached triangle under `ProviderStrategy::Triangle`
    pub fn stirling_count(&self, n: usize, k: usize) -> Result<BigUint> {
        match self.config.provider {
            ProviderStrategy::Streaming => Ok(stirling::stirling_count(n, k)),
            ProviderStrategy::Triangle if k > n => Ok(stirling::stirling_count(n, k)),
            ProviderStrategy::Triangle => Ok(self.triangle(n, k)?.cell(n, k).clone())
        }
    }

    /// Iterate over every partition of `n` elements into `k` blocks, in rank order.
    pub fn partitions(&self, n: usize, k: usize) -> Result<Partitions<'_>> {
        Partitions::new(self, n, k)
    }

    /// The `rank`-th partition of `{1, ..., n}` into exactly `k` blocks.
    ///
    /// Fails with `InvalidArgument` unless `1 <= k <= n` and `rank < S(n, k)`, and with
    /// `ResourceExceeded` if the triangle provider cannot hold `(n, k)`.
    pub fn unrank(&self, n: usize, k: usize, rank: &BigUint) -> Result<Partition> {
        if k < 1 || k > n {
            return Err(Error::invalid(format!("need 1 <= k <= n, got n = {}, k = {}", n, k)));
        }
        debug!(n, k, provider = ?self.config.provider, formula = ?self.config.formula, "unranking");

        let counter = self.config.counter();
        let mut blocks: Vec<Vec<usize>> = Vec::with_capacity(k);
        let mut state = State::Init;
        loop {
            state = match state {
                State::Init => {
                    let (provider, total) = self.provide(n, k)?;
                    if *rank >= total {
                        return Err(Error::invalid(format!(
                            "rank {} out of range for S({}, {}) = {}", rank, n, k, total)));
                    }
                    if k == 1 {
                        State::FinalBlock(n)
                    } else {
                        let search = SearchState {n, k, rank: rank.clone(), offset: BigUint::zero()};
                        State::ExtractBlock(search, provider)
                    }
                }
                State::ExtractBlock(mut search, provider) => {
                    let (block, consumed, provider) = self.extract(&search, provider, &counter)?;
                    search.advance(block.len(), consumed)?;
                    trace!(size = block.len(), n = search.n, k = search.k, offset = %search.offset, "extracted block");
                    blocks.push(block);
                    if search.k > 1 {
                        State::ExtractBlock(search, provider)
                    } else {
                        State::FinalBlock(search.n)
                    }
                }
                State::FinalBlock(remaining) => {
                    blocks.push((0..remaining).collect());
                    State::Done
                }
                State::Done => {
                    let partition = map_to_labels(n, &blocks)?;
                    debug!(n, k, "unranked");
                    return Ok(partition);
                }
            };
        }
    }

    // synchronous provider setup; nothing runs in the background yet
    fn provide(&self, n: usize, k: usize) -> Result<(Provider, BigUint)> {
        match self.config.provider {
            ProviderStrategy::Streaming => {
                let pair = initial_columns(n, k)?;
                let total = pair.upper_column()[n].clone();
                Ok((Provider::Streaming(pair), total))
            }
            ProviderStrategy::Triangle => {
                let triangle = self.triangle(n, k)?;
                let total = triangle.cell(n, k).clone();
                Ok((Provider::Triangle(triangle), total))
            }
        }
    }

    fn extract(&self, search: &SearchState, provider: Provider, counter: &BlockCounter)
        -> Result<(Vec<usize>, BigUint, Provider)>
    {
        match provider {
            Provider::Triangle(triangle) => {
                let columns = triangle.columns(search.k)?;
                let (block, consumed) = find_block(&columns, search.n, &search.rank, counter)?;
                Ok((block, consumed, Provider::Triangle(triangle)))
            }
            Provider::Streaming(pair) => {
                let (found, next) = thread::scope(|scope| {
                    // column k - 2 is only needed if another search follows this one
                    let worker = (search.k > 2).then(|| scope.spawn(|| previous_column(pair.lower_column())));
                    let found = find_block(&pair, search.n, &search.rank, counter);
                    let next = worker.map(|w| w.join()
                        .unwrap_or_else(|_| Err(Error::inconsistent("column worker panicked"))));
                    (found, next)
                });
                let (block, consumed) = found?;
                let pair = match next {
                    Some(column) => {
                        trace!(k = search.k - 1, "column handed off");
                        pair.shift_down(column?)?
                    }
                    None => pair
                };
                Ok((block, consumed, Provider::Streaming(pair)))
            }
        }
    }
}

/// The `rank`-th partition of `{1, ..., n}` into exactly `k` blocks, with the default configuration.
pub fn unrank(n: usize, k: usize, rank: &BigUint) -> Result<Partition> {
    Unranker::default().unrank(n, k, rank)
}

/// `S(n, k)`: the number of valid ranks for `(n, k)`.
pub fn stirling_count(n: usize, k: usize) -> BigUint {
    stirling::stirling_count(n, k)
}

/// Number of partitions of a set of `n` elements: the `n`-th Bell number.
pub fn bell_count(n: usize) -> BigUint {
    let t = Triangle::new(n, n);
    (0..(n + 1)).map(|k| t.cell(n, k)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    fn unranker(provider: ProviderStrategy, formula: FormulaStrategy) -> Unranker {
        let config = UnrankConfig::default()
            .with_provider(provider)
            .with_formula(formula)
            .with_cross_check(true);
        Unranker::with_cache(config, Arc::new(TriangleCache::new()))
    }

    fn blocks(p: Partition) -> Vec<Vec<usize>> {
        p.into_blocks()
    }

    #[test]
    fn documented_example() {
        assert_eq!(blocks(unrank(5, 3, &BigUint::from(10u32)).unwrap()), vec![vec![1, 2, 3], vec![4], vec![5]]);
        assert_eq!(blocks(unrank(5, 3, &BigUint::from(24u32)).unwrap()), vec![vec![1, 5], vec![2, 4], vec![3]]);
        assert_eq!(blocks(unrank(5, 3, &BigUint::zero()).unwrap()), vec![vec![1], vec![2], vec![3, 4, 5]]);
        assert_eq!(stirling_count(5, 3), BigUint::from(25u32));
    }

    #[test]
    fn all_configurations_agree() {
        for n in 1..9 {
            for k in 1..(n + 1) {
                let total = stirling_count(n, k);
                let mut rank = BigUint::zero();
                while rank < total {
                    let expected = unrank(n, k, &rank).unwrap();
                    for provider in [ProviderStrategy::Streaming, ProviderStrategy::Triangle] {
                        for formula in FormulaStrategy::ALL {
                            assert_eq!(unranker(provider, formula).unrank(n, k, &rank).unwrap(), expected,
                                "{:?} {:?} n = {}, k = {}, rank = {}", provider, formula, n, k, rank);
                        }
                    }
                    rank += 1u32;
                }
            }
        }
    }

    #[test]
    fn boundary_ks() {
        for n in 1..15 {
            let one = unrank(n, 1, &BigUint::zero()).unwrap();
            assert_eq!(blocks(one), vec![(1..(n + 1)).collect::<Vec<_>>()]);
            let singletons = unrank(n, n, &BigUint::zero()).unwrap();
            assert_eq!(blocks(singletons), (1..(n + 1)).map(|i| vec![i]).collect::<Vec<_>>());
            assert!(unrank(n, 1, &BigUint::one()).is_err());
            assert!(unrank(n, n, &BigUint::one()).is_err());
        }
    }

    #[test]
    fn invalid_arguments() {
        assert!(matches!(unrank(5, 3, &BigUint::from(25u32)), Err(Error::InvalidArgument(_))));
        assert!(matches!(unrank(3, 5, &BigUint::zero()), Err(Error::InvalidArgument(_))));
        assert!(matches!(unrank(3, 0, &BigUint::zero()), Err(Error::InvalidArgument(_))));
        assert!(matches!(unrank(0, 0, &BigUint::zero()), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn triangle_limit() {
        let config = UnrankConfig::default()
            .with_provider(ProviderStrategy::Triangle)
            .with_triangle_limit(30);
        let small = Unranker::with_cache(config, Arc::new(TriangleCache::new()));
        assert!(matches!(small.unrank(40, 3, &BigUint::zero()), Err(Error::ResourceExceeded {limit: 30, ..})));
        assert!(matches!(small.stirling_count(40, 3), Err(Error::ResourceExceeded {..})));
        assert!(small.unrank(29, 3, &BigUint::zero()).is_ok());
        assert_eq!(small.stirling_count(29, 30).unwrap(), BigUint::zero());
    }

    #[test]
    fn limits_hold_on_a_shared_cache() {
        let cache = Arc::new(TriangleCache::new());
        let config = UnrankConfig::default().with_provider(ProviderStrategy::Triangle);
        let big = Unranker::with_cache(config, cache.clone());
        let small = Unranker::with_cache(config.with_triangle_limit(30), cache);

        assert!(big.unrank(40, 3, &BigUint::zero()).is_ok());
        assert!(matches!(small.unrank(40, 3, &BigUint::zero()), Err(Error::ResourceExceeded {limit: 30, ..})));
        assert!(matches!(small.stirling_count(40, 3), Err(Error::ResourceExceeded {limit: 30, ..})));

        assert!(big.unrank(200, 2, &BigUint::zero()).is_ok());
        assert_eq!(small.unrank(10, 5, &BigUint::zero()).unwrap(), unrank(10, 5, &BigUint::zero()).unwrap());
        assert_eq!(small.stirling_count(10, 5).unwrap(), stirling_count(10, 5));
    }

    #[test]
    fn large_rank() {
        let n = 120;
        let k = 40;
        let total = stirling_count(n, k);
        let last = &total - 1u32;
        let streaming = unranker(ProviderStrategy::Streaming, FormulaStrategy::Adaptive);
        let triangle = unranker(ProviderStrategy::Triangle, FormulaStrategy::Adaptive);
        for rank in [BigUint::zero(), &total / 3u32, &total / 2u32, last] {
            let p = streaming.unrank(n, k, &rank).unwrap();
            assert_eq!(p.num_blocks(), k);
            assert_eq!(p.len(), n);
            assert_eq!(Partition::try_from_blocks(p.clone().into_blocks()).unwrap(), p);
            assert_eq!(triangle.unrank(n, k, &rank).unwrap(), p);
        }
    }

    #[test]
    fn bell_numbers() {
        let expected = [1u64, 1, 2, 5, 15, 52, 203, 877, 4140, 21147, 115975];
        for (n, &b) in expected.iter().enumerate() {
            assert_eq!(bell_count(n), BigUint::from(b));
        }
        assert_eq!(bell_count(25), BigUint::from(4638590332229999353u64));
    }
}
