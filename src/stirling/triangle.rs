//! The precomputed Stirling triangle and its session cache.

use std::sync::{Arc, OnceLock, RwLock};

use num_bigint::BigUint;
use num_traits::{One, Zero};
use tracing::debug;

use crate::error::{Error, Result};
use crate::stirling::StirlingColumns;

/// Largest triangle dimension the session cache will build by default.
pub const MAX_TRIANGLE_DIM: usize = 2000;

/// Dense table of `S(i, j)` for `0 <= i <= rows` and `0 <= j <= cols`.
///
/// Built once by forward recurrence and immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangle
{
    rows: usize,
    cols: usize,
    cells: Vec<BigUint>
}

impl Triangle
{
    /// Build the triangle for rows `0..=n` and columns `0..=k` in `O(n * k)`.
    pub fn new(n: usize, k: usize) -> Self {
        let stride = k + 1;
        let mut cells = vec![BigUint::zero(); (n + 1) * stride];
        cells[0] = BigUint::one();
        for i in 1..(n + 1) {
            for j in 1..(k.min(i) + 1) {
                let cell = &cells[(i - 1) * stride + j - 1] + BigUint::from(j) * &cells[(i - 1) * stride + j];
                cells[i * stride + j] = cell;
            }
        }
        Triangle {rows: n, cols: k, cells}
    }

    /// Build the triangle, failing if either dimension reaches `limit`.
    pub fn with_limit(n: usize, k: usize, limit: usize) -> Result<Self> {
        if n >= limit || k >= limit {
            return Err(Error::ResourceExceeded {rows: n + 1, cols: k + 1, limit});
        }
        Ok(Self::new(n, k))
    }

    /// Largest row index stored
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Largest column index stored
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Whether `S(n, k)` and every cell it depends on are stored
    pub fn covers(&self, n: usize, k: usize) -> bool {
        n <= self.rows && k <= self.cols
    }

    /// `S(i, j)`, or `None` outside the built bounds
    pub fn get(&self, i: usize, j: usize) -> Option<&BigUint> {
        if self.covers(i, j) {
            Some(&self.cells[i * (self.cols + 1) + j])
        } else {
            None
        }
    }

    // S(i, j); callers stay within the built bounds, `get` is the checked accessor
    pub(crate) fn cell(&self, i: usize, j: usize) -> &BigUint {
        assert!(self.covers(i, j), "S({}, {}) outside a {}x{} triangle", i, j, self.rows, self.cols);
        &self.cells[i * (self.cols + 1) + j]
    }

    /// View columns `k - 1` and `k` of the triangle.
    pub fn columns(&self, k: usize) -> Result<TriangleColumns<'_>> {
        if k == 0 || k > self.cols {
            return Err(Error::invalid(format!(
                "column {} not available in a triangle with {} columns", k, self.cols)));
        }
        Ok(TriangleColumns {triangle: self, k})
    }
}

/// Columns `k - 1` and `k` of a `Triangle`.
#[derive(Debug, Clone, Copy)]
pub struct TriangleColumns<'a>
{
    triangle: &'a Triangle,
    k: usize
}

impl<'a> StirlingColumns for TriangleColumns<'a>
{
    fn k(&self) -> usize {
        self.k
    }

    fn lower(&self, row: usize) -> &BigUint {
        self.triangle.cell(row, self.k - 1)
    }

    fn upper(&self, row: usize) -> &BigUint {
        self.triangle.cell(row, self.k)
    }
}

/// Build-once, read-many cache holding one triangle that covers recent requests.
///
/// Readers share the triangle through an `Arc`; a request that does not fit
/// takes the write lock and replaces the triangle with a larger one.
#[derive(Debug, Default)]
pub struct TriangleCache
{
    slot: RwLock<Option<Arc<Triangle>>>
}

impl TriangleCache
{
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached triangle if it covers `(n, k)`
    pub fn peek(&self, n: usize, k: usize) -> Option<Arc<Triangle>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().filter(|t| t.covers(n, k)).cloned()
    }

    /// Return a triangle covering `(n, k)`, building it if needed.
    ///
    /// Fails if `n` or `k` reaches `limit`, whatever the cache already holds. A rebuild
    /// extends the cached bounds when the grown table stays within `limit` and costs no
    /// more cells than the old and new shapes together; otherwise it covers `(n, k)` only.
    pub fn get(&self, n: usize, k: usize, limit: usize) -> Result<Arc<Triangle>> {
        if n >= limit || k >= limit {
            return Err(Error::ResourceExceeded {rows: n + 1, cols: k + 1, limit});
        }
        if let Some(t) = self.peek(n, k) {
            return Ok(t);
        }

        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        if let Some(t) = slot.as_ref().filter(|t| t.covers(n, k)) {
            return Ok(t.clone());
        }
        let (rows, cols) = match slot.as_ref() {
            Some(t) => {
                let grown = (t.rows().max(n), t.cols().max(k));
                let fits = grown.0 < limit && grown.1 < limit;
                if fits && cells(grown) <= cells((t.rows(), t.cols())) + cells((n, k)) {grown} else {(n, k)}
            }
            None => (n, k)
        };
        debug!(rows, cols, "building stirling triangle");
        let t = Arc::new(Triangle::with_limit(rows, cols, limit)?);
        *slot = Some(t.clone());
        Ok(t)
    }

    /// Drop the cached triangle
    pub fn reset(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        if slot.take().is_some() {
            debug!("stirling triangle cache reset");
        }
    }
}

fn cells((rows, cols): (usize, usize)) -> usize {
    (rows + 1).saturating_mul(cols + 1)
}

/// The process-wide triangle cache shared by `Unranker`s that do not bring their own.
pub fn session_cache() -> &'static Arc<TriangleCache> {
    static CACHE: OnceLock<Arc<TriangleCache>> = OnceLock::new();
    CACHE.get_or_init(|| Arc::new(TriangleCache::new()))
}
