//! The block-count formula, the kernel evaluated by every step of the block search.
//!
//! For `n` elements still outside the block being built, of which the last `n - d` may
//! still join it, and `k` blocks in total, the number of completions is
//!
//! ```text
//! F(n, k, d) = sum_{u=0}^{min(n-d, n-k+1)} C(n-d, u) * S(n-u, k-1)
//! ```
//!
//! Viewing the open block as an extra marker element gives the equivalent
//! inclusion-exclusion form over the `d` excluded elements:
//!
//! ```text
//! F(n, k, d) = sum_{u=0}^{d} (-1)^u * C(d, u) * S(n+1-u, k)
//! ```
//!
//! Both sums can also be folded in half using `C(m, u) = C(m, m - u)`. Binomials are
//! carried incrementally (`C(m, u) = C(m, u - 1) * (m - u + 1) / u`), which is exact.

use num_bigint::BigUint;
use num_traits::{CheckedSub, One, Zero};

use crate::error::{Error, Result};
use crate::stirling::StirlingColumns;

/// The algebraic form used to evaluate `F(n, k, d)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormulaStrategy
{
    /// Direct sum over the `n - d` eligible elements
    Direct,
    /// Direct sum, pairing the terms `u` and `n - d - u`
    DirectSymmetric,
    /// Alternating sum over the `d` excluded elements
    Alternating,
    /// Alternating sum, pairing the terms `u` and `d - u`
    AlternatingSymmetric,
    /// `AlternatingSymmetric` when `2d < n`, `DirectSymmetric` otherwise
    #[default]
    Adaptive
}

impl FormulaStrategy
{
    /// Every strategy, slowest first
    pub const ALL: [FormulaStrategy; 5] = [
        FormulaStrategy::Direct,
        FormulaStrategy::DirectSymmetric,
        FormulaStrategy::Alternating,
        FormulaStrategy::AlternatingSymmetric,
        FormulaStrategy::Adaptive
    ];

    /// The concrete form evaluated for `(n, d)`; only `Adaptive` depends on them.
    pub fn resolve(self, n: usize, d: usize) -> FormulaStrategy {
        match self {
            FormulaStrategy::Adaptive if 2 * d < n => FormulaStrategy::AlternatingSymmetric,
            FormulaStrategy::Adaptive => FormulaStrategy::DirectSymmetric,
            other => other
        }
    }
}

fn next_binomial(binom: BigUint, m: usize, u: usize) -> BigUint {
    binom * BigUint::from(m - u + 1) / BigUint::from(u)
}

fn direct<C: StirlingColumns + ?Sized>(c: &C, n: usize, k: usize, d: usize) -> BigUint {
    let free = n - d;
    let last = free.min((n + 1).saturating_sub(k));
    let mut total = c.lower(n).clone();
    let mut binom = BigUint::one();
    for u in 1..(last + 1) {
        binom = next_binomial(binom, free, u);
        total += &binom * c.lower(n - u);
    }
    total
}

fn direct_symmetric<C: StirlingColumns + ?Sized>(c: &C, n: usize, k: usize, d: usize) -> BigUint {
    let free = n - d;
    let last = (free / 2).min((n + 1).saturating_sub(k));
    let mut total = BigUint::zero();
    let mut binom = BigUint::one();
    for u in 0..(last + 1) {
        if u > 0 {
            binom = next_binomial(binom, free, u);
        }
        if 2 * u < free {
            total += &binom * (c.lower(n - u) + c.lower(d + u));
        } else {
            total += &binom * c.lower(n - u);
        }
    }
    total
}

fn signed_total(pos: BigUint, neg: &BigUint, n: usize, k: usize, d: usize) -> Result<BigUint> {
    pos.checked_sub(neg).ok_or_else(|| Error::inconsistent(format!(
        "alternating sum for F({}, {}, {}) is negative", n, k, d)))
}

fn alternating<C: StirlingColumns + ?Sized>(c: &C, n: usize, k: usize, d: usize) -> Result<BigUint> {
    let last = d.min((n + 1).saturating_sub(k));
    let mut pos = c.upper(n + 1).clone();
    let mut neg = BigUint::zero();
    let mut binom = BigUint::one();
    for u in 1..(last + 1) {
        binom = next_binomial(binom, d, u);
        let term = &binom * c.upper(n + 1 - u);
        if u % 2 == 0 {
            pos += term;
        } else {
            neg += term;
        }
    }
    signed_total(pos, &neg, n, k, d)
}

fn alternating_symmetric<C: StirlingColumns + ?Sized>(c: &C, n: usize, k: usize, d: usize) -> Result<BigUint> {
    let last = (d / 2).min((n + 1).saturating_sub(k));
    let mut pos = BigUint::zero();
    let mut neg = BigUint::zero();
    let mut binom = BigUint::one();
    for u in 0..(last + 1) {
        if u > 0 {
            binom = next_binomial(binom, d, u);
        }
        let near = c.upper(n + 1 - u);
        let (plus, minus) = if u % 2 == 0 {(&mut pos, &mut neg)} else {(&mut neg, &mut pos)};
        if 2 * u == d {
            *plus += &binom * near;
            continue;
        }
        // the partner term d - u has sign (-1)^u * (-1)^d
        let far = c.upper(n + 1 - d + u);
        if d % 2 == 0 {
            *plus += &binom * (near + far);
        } else if near >= far {
            *plus += &binom * (near - far);
        } else {
            *minus += &binom * (far - near);
        }
    }
    signed_total(pos, &neg, n, k, d)
}

fn evaluate<C: StirlingColumns + ?Sized>(c: &C, n: usize, d: usize, strategy: FormulaStrategy) -> Result<BigUint> {
    let k = c.k();
    match strategy.resolve(n, d) {
        FormulaStrategy::Direct => Ok(direct(c, n, k, d)),
        FormulaStrategy::DirectSymmetric => Ok(direct_symmetric(c, n, k, d)),
        FormulaStrategy::Alternating => alternating(c, n, k, d),
        FormulaStrategy::AlternatingSymmetric => alternating_symmetric(c, n, k, d),
        FormulaStrategy::Adaptive => unreachable!("resolve never returns Adaptive")
    }
}

/// `F(n, k, d)` where `k` is the upper column of `columns`.
///
/// Negative `d` yields 0, as does `d = 0` when `k - 1 > n`. The direct forms read
/// `columns.lower` up to row `n`; the alternating forms read `columns.upper` up to row `n + 1`.
pub fn block_count<C>(columns: &C, n: usize, d: isize, strategy: FormulaStrategy) -> Result<BigUint>
    where C: StirlingColumns + ?Sized
{
    let k = columns.k();
    if k == 0 {
        return Err(Error::invalid("block count needs k >= 1"));
    }
    let d = match usize::try_from(d) {
        Ok(d) => d,
        Err(_) => return Ok(BigUint::zero())
    };
    if d > n {
        return Err(Error::invalid(format!("boundary {} beyond n = {}", d, n)));
    }
    if d == 0 && k - 1 > n {
        return Ok(BigUint::zero());
    }
    evaluate(columns, n, d, strategy)
}

/// A formula strategy fixed for one unrank call, with an optional cross-check
/// against the `Direct` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCounter
{
    strategy: FormulaStrategy,
    cross_check: bool
}

impl BlockCounter
{
    /// Evaluate with `strategy`, without cross-checking
    pub fn new(strategy: FormulaStrategy) -> Self {
        BlockCounter {strategy, cross_check: false}
    }

    /// Also evaluate the `Direct` form and fail on any mismatch
    pub fn with_cross_check(mut self, cross_check: bool) -> Self {
        self.cross_check = cross_check;
        self
    }

    /// The configured strategy
    pub fn strategy(&self) -> FormulaStrategy {
        self.strategy
    }

    /// `F(n, k, d)` for a boundary known to be in `0..=n`
    pub fn count<C: StirlingColumns + ?Sized>(&self, columns: &C, n: usize, d: usize) -> Result<BigUint> {
        let value = evaluate(columns, n, d, self.strategy)?;
        if self.cross_check && self.strategy.resolve(n, d) != FormulaStrategy::Direct {
            let reference = direct(columns, n, columns.k(), d);
            if reference != value {
                return Err(Error::inconsistent(format!(
                    "{:?} gives {} but Direct gives {} for F({}, {}, {})",
                    self.strategy, value, reference, n, columns.k(), d)));
            }
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stirling::triangle::Triangle;
    use crate::stirling::{initial_columns, stirling_count, ColumnPair};

    #[test]
    fn forms_agree() {
        let t = Triangle::new(16, 16);
        for k in 1..16 {
            let view = t.columns(k).unwrap();
            for n in 0..15 {
                for d in 0..(n + 1) {
                    let expected = block_count(&view, n, d as isize, FormulaStrategy::Direct).unwrap();
                    for strategy in FormulaStrategy::ALL {
                        assert_eq!(block_count(&view, n, d as isize, strategy).unwrap(), expected,
                            "{:?} F({}, {}, {})", strategy, n, k, d);
                    }
                }
            }
        }
    }

    #[test]
    fn boundary_values() {
        let pair = initial_columns(12, 4).unwrap();
        for n in 3..11 {
            for strategy in FormulaStrategy::ALL {
                // no excluded element: the open block is a marker in S(n + 1, k)
                assert_eq!(block_count(&pair, n, 0, strategy).unwrap(), stirling_count(n + 1, 4));
                // no eligible element: only the k - 1 other blocks remain
                assert_eq!(block_count(&pair, n, n as isize, strategy).unwrap(), stirling_count(n, 3));
                assert!(block_count(&pair, n, -1, strategy).unwrap().is_zero());
                assert!(block_count(&pair, n, -7, strategy).unwrap().is_zero());
            }
        }
    }

    #[test]
    fn decreasing_in_d() {
        let pair = initial_columns(20, 6).unwrap();
        for n in 6..19 {
            let values: Vec<_> = (0..(n + 1))
                .map(|d| block_count(&pair, n, d as isize, FormulaStrategy::Adaptive).unwrap())
                .collect();
            assert!(values.windows(2).all(|w| w[0] > w[1]), "F({}, 6, .) = {:?}", n, values);
        }
    }

    #[test]
    fn small_n_for_large_k() {
        let pair = initial_columns(10, 8).unwrap();
        for strategy in FormulaStrategy::ALL {
            assert!(block_count(&pair, 5, 0, strategy).unwrap().is_zero());
            assert!(block_count(&pair, 6, 2, strategy).unwrap().is_zero());
            assert_eq!(block_count(&pair, 7, 7, strategy).unwrap(), BigUint::one());
        }
    }

    #[test]
    fn rejects_bad_arguments() {
        let pair = initial_columns(6, 2).unwrap();
        assert!(matches!(block_count(&pair, 4, 5, FormulaStrategy::Direct), Err(Error::InvalidArgument(_))));
        let zeroth = Triangle::new(4, 0);
        assert!(zeroth.columns(0).is_err());
    }

    #[test]
    fn adaptive_resolution() {
        assert_eq!(FormulaStrategy::Adaptive.resolve(10, 4), FormulaStrategy::AlternatingSymmetric);
        assert_eq!(FormulaStrategy::Adaptive.resolve(10, 5), FormulaStrategy::DirectSymmetric);
        assert_eq!(FormulaStrategy::Direct.resolve(10, 1), FormulaStrategy::Direct);
    }

    // columns whose upper values no longer satisfy the recurrence
    struct Skewed
    {
        pair: ColumnPair,
        upper: Vec<BigUint>
    }

    impl StirlingColumns for Skewed
    {
        fn k(&self) -> usize {
            self.pair.k()
        }

        fn lower(&self, row: usize) -> &BigUint {
            self.pair.lower(row)
        }

        fn upper(&self, row: usize) -> &BigUint {
            &self.upper[row]
        }
    }

    #[test]
    fn cross_check_reports_disagreement() {
        let pair = initial_columns(10, 3).unwrap();
        let mut upper = pair.upper_column().values().to_vec();
        upper[9] += 1u32;
        let skewed = Skewed {pair, upper};

        for strategy in [FormulaStrategy::Alternating, FormulaStrategy::AlternatingSymmetric] {
            let unchecked = BlockCounter::new(strategy).count(&skewed, 8, 2).unwrap();
            let direct = BlockCounter::new(FormulaStrategy::Direct).count(&skewed, 8, 2).unwrap();
            assert_eq!(unchecked, direct + 1u32);

            let checked = BlockCounter::new(strategy).with_cross_check(true);
            assert!(matches!(checked.count(&skewed, 8, 2), Err(Error::ArithmeticInconsistency(_))));
        }
        // the direct form reads only the lower column
        let direct = BlockCounter::new(FormulaStrategy::Direct).with_cross_check(true);
        assert!(direct.count(&skewed, 8, 2).is_ok());
    }

    #[test]
    fn cross_checked_counter() {
        let pair = initial_columns(14, 5).unwrap();
        for strategy in FormulaStrategy::ALL {
            let counter = BlockCounter::new(strategy).with_cross_check(true);
            for d in 0..13 {
                assert_eq!(counter.count(&pair, 12, d).unwrap(),
                    block_count(&pair, 12, d as isize, FormulaStrategy::Direct).unwrap());
            }
        }
    }
}
