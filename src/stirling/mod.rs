//! Providers of Stirling numbers of the second kind.
//!
//! Two strategies are available:
//!
//! * the **streaming** strategy keeps only the two adjacent columns `k - 1` and `k`
//!   (a `ColumnPair`), built once by forward recurrence with `initial_columns`, and
//!   derives each lower column on demand with `previous_column`;
//! * the **triangle** strategy (`triangle::Triangle`) builds the full table once and
//!   answers every lookup from it.
//!
//! Both expose the `StirlingColumns` view that the block-count formula consumes.

use std::ops::Index;

use num_bigint::BigUint;
use num_traits::{CheckedSub, One, Zero};

use crate::error::{Error, Result};

pub mod triangle;

/// Read access to the two adjacent Stirling columns `k - 1` and `k`.
///
/// Rows are absolute: `lower(i)` is `S(i, k - 1)` and `upper(i)` is `S(i, k)`.
pub trait StirlingColumns
{
    /// The index `k` of the upper column
    fn k(&self) -> usize;

    /// `S(row, k - 1)`
    fn lower(&self, row: usize) -> &BigUint;

    /// `S(row, k)`
    fn upper(&self, row: usize) -> &BigUint;
}

/// One column `k` of the Stirling triangle, holding rows `0..rows()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Column
{
    k: usize,
    values: Vec<BigUint>
}

impl Column
{
    /// Column 0 with `rows` rows: `[1, 0, 0, ...]`
    pub fn zeroth(rows: usize) -> Self {
        let mut values = vec![BigUint::zero(); rows];
        if let Some(v0) = values.first_mut() {
            *v0 = BigUint::one();
        }
        Column {k: 0, values}
    }

    /// Column 1 with `rows` rows: `[0, 1, 1, ...]`
    pub fn first(rows: usize) -> Self {
        let mut values = vec![BigUint::one(); rows];
        if let Some(v0) = values.first_mut() {
            *v0 = BigUint::zero();
        }
        Column {k: 1, values}
    }

    /// Returns the column index `k`
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of stored rows
    pub fn rows(&self) -> usize {
        self.values.len()
    }

    /// Returns `S(row, k)` if that row is stored
    pub fn get(&self, row: usize) -> Option<&BigUint> {
        self.values.get(row)
    }

    /// Returns all stored values, indexed by row
    pub fn values(&self) -> &[BigUint] {
        &self.values
    }
}

impl Index<usize> for Column
{
    type Output = BigUint;

    fn index(&self, row: usize) -> &BigUint {
        &self.values[row]
    }
}

/// The adjacent columns `k - 1` and `k`, as handed between pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPair
{
    lower: Column,
    upper: Column
}

impl ColumnPair
{
    /// Pair up column `k - 1` with column `k`.
    ///
    /// Fails if the column indices are not adjacent.
    pub fn new(lower: Column, upper: Column) -> Result<Self> {
        if lower.k + 1 != upper.k {
            return Err(Error::invalid(format!(
                "columns {} and {} are not adjacent", lower.k, upper.k)));
        }
        Ok(ColumnPair {lower, upper})
    }

    /// Column `k - 1`
    pub fn lower_column(&self) -> &Column {
        &self.lower
    }

    /// Column `k`
    pub fn upper_column(&self) -> &Column {
        &self.upper
    }

    /// Consume the pair, returning `(column k - 1, column k)`
    pub fn into_columns(self) -> (Column, Column) {
        (self.lower, self.upper)
    }

    /// Replace the pair `(k - 1, k)` by `(k - 2, k - 1)`, given column `k - 2`.
    pub(crate) fn shift_down(self, next_lower: Column) -> Result<Self> {
        ColumnPair::new(next_lower, self.lower)
    }
}

impl StirlingColumns for ColumnPair
{
    fn k(&self) -> usize {
        self.upper.k
    }

    fn lower(&self, row: usize) -> &BigUint {
        &self.lower[row]
    }

    fn upper(&self, row: usize) -> &BigUint {
        &self.upper[row]
    }
}

/// Columns `k - 1` and `k` for rows `0..=n`, assuming `1 <= k`.
///
/// Two buffers alternate as the even and odd target column while `j` runs from 2 to `k`;
/// each pass overwrites the buffer holding column `j - 2` with column `j`.
fn columns_unchecked(n: usize, k: usize) -> ColumnPair {
    let rows = n + 1;
    if k == 1 {
        return ColumnPair {lower: Column::zeroth(rows), upper: Column::first(rows)};
    }

    let mut even = Column::zeroth(rows).values;
    let mut odd = Column::first(rows).values;
    for j in 2..=k {
        let (target, source) = if j % 2 == 0 {(&mut even, &odd)} else {(&mut odd, &even)};
        let factor = BigUint::from(j);
        target[0] = BigUint::zero();
        for i in 1..rows {
            let next = &source[i - 1] + &factor * &target[i - 1];
            target[i] = next;
        }
    }

    let (lower, upper) = if k % 2 == 0 {(odd, even)} else {(even, odd)};
    ColumnPair {
        lower: Column {k: k - 1, values: lower},
        upper: Column {k, values: upper}
    }
}

/// Compute the Stirling columns `k - 1` and `k` for rows `0..=n`.
///
/// Costs `O(n * k)` big-integer multiply-adds. Fails if `k < 1` or `k > n + 1`.
pub fn initial_columns(n: usize, k: usize) -> Result<ColumnPair> {
    if k < 1 || k > n + 1 {
        return Err(Error::invalid(format!(
            "initial columns need 1 <= k <= n + 1, got n = {}, k = {}", n, k)));
    }
    Ok(columns_unchecked(n, k))
}

/// Derive column `k - 1` from column `k` using `S(i, k - 1) = S(i + 1, k) - k * S(i, k)`.
///
/// The result has one row fewer than `column`. Costs `O(rows)` big-integer operations.
pub fn previous_column(column: &Column) -> Result<Column> {
    let k = column.k;
    if k == 0 {
        return Err(Error::invalid("column 0 has no previous column"));
    }
    let rows = column.rows().saturating_sub(1);
    match k {
        1 => Ok(Column::zeroth(rows)),
        2 => Ok(Column::first(rows)),
        _ => {
            let factor = BigUint::from(k);
            let values = column.values.windows(2)
                .map(|w| {
                    w[1].checked_sub(&(&factor * &w[0])).ok_or_else(|| Error::inconsistent(format!(
                        "column {} is not a Stirling column", k)))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Column {k: k - 1, values})
        }
    }
}

/// `S(n, k)`: the number of partitions of `n` elements into exactly `k` nonempty blocks.
///
/// Zero whenever `k > n`, except `S(0, 0) = 1`.
pub fn stirling_count(n: usize, k: usize) -> BigUint {
    if k == 0 {
        return if n == 0 {BigUint::one()} else {BigUint::zero()};
    }
    if k > n {
        return BigUint::zero();
    }
    columns_unchecked(n, k).upper.values.swap_remove(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive(n: usize, k: usize) -> BigUint {
        match (n, k) {
            (0, 0) => BigUint::one(),
            (_, 0) | (0, _) => BigUint::zero(),
            _ => naive(n - 1, k - 1) + BigUint::from(k) * naive(n - 1, k)
        }
    }

    #[test]
    fn known_values() {
        assert_eq!(stirling_count(5, 3), BigUint::from(25u32));
        assert_eq!(stirling_count(10, 4), BigUint::from(34105u32));
        assert_eq!(stirling_count(0, 0), BigUint::one());
        assert_eq!(stirling_count(3, 0), BigUint::zero());
        assert_eq!(stirling_count(3, 5), BigUint::zero());
        assert_eq!(stirling_count(7, 7), BigUint::one());
    }

    #[test]
    fn columns_match_recurrence() {
        for n in 0..11 {
            for k in 1..(n + 2) {
                let pair = initial_columns(n, k).unwrap();
                assert_eq!(pair.k(), k);
                assert_eq!(pair.lower_column().rows(), n + 1);
                assert_eq!(pair.upper_column().rows(), n + 1);
                for i in 0..(n + 1) {
                    assert_eq!(pair.lower(i), &naive(i, k - 1), "S({}, {})", i, k - 1);
                    assert_eq!(pair.upper(i), &naive(i, k), "S({}, {})", i, k);
                }
            }
        }
    }

    #[test]
    fn closed_forms_for_k_1() {
        let pair = initial_columns(4, 1).unwrap();
        let one = BigUint::one();
        let zero = BigUint::zero();
        assert_eq!(pair.lower_column().values(), &[one.clone(), zero.clone(), zero.clone(), zero.clone(), zero.clone()]);
        assert_eq!(pair.upper_column().values(), &[zero, one.clone(), one.clone(), one.clone(), one]);
    }

    #[test]
    fn initial_columns_rejects_out_of_range_k() {
        assert!(matches!(initial_columns(5, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(initial_columns(5, 7), Err(Error::InvalidArgument(_))));
        assert!(initial_columns(5, 6).is_ok());
    }

    #[test]
    fn previous_column_walks_down() {
        let n = 12;
        for k in 1..(n + 1) {
            let (mut lower, _) = initial_columns(n, k).unwrap().into_columns();
            let mut rows = n + 1;
            while lower.k() > 0 {
                let next = previous_column(&lower).unwrap();
                rows -= 1;
                assert_eq!(next.k(), lower.k() - 1);
                assert_eq!(next.rows(), rows);
                for i in 0..rows {
                    assert_eq!(next[i], naive(i, next.k()));
                }
                lower = next;
            }
            assert!(previous_column(&lower).is_err());
        }
    }

    #[test]
    fn pair_requires_adjacent_columns() {
        let (lower, upper) = initial_columns(6, 3).unwrap().into_columns();
        assert!(ColumnPair::new(upper.clone(), lower.clone()).is_err());
        let down = previous_column(&lower).unwrap();
        let pair = ColumnPair::new(lower, upper).unwrap().shift_down(down).unwrap();
        assert_eq!(pair.k(), 2);
        assert_eq!(pair.upper(6), &BigUint::from(31u32));
        assert_eq!(pair.lower(5), &BigUint::one());
    }
}
