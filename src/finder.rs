//! Carving one block out of the remaining elements by dichotomic search.
//!
//! The block always starts with the first remaining element (relative index 0). With the
//! block prefix `P` ending at relative index `last`, the partitions sharing `P` come in
//! this order: first those where the block is exactly `P` (`S(n - |P|, k - 1)` of them),
//! then those continuing with `last + 1`, `last + 2`, and so on. Writing `G(x)` for the
//! number of completions of `P` whose further elements all exceed `x`, which is
//! `F(n - |P|, k, x + 1 - |P|)`, the continuations with next element in `(last, e]`
//! number `G(last) - G(e)`. `G` is decreasing, so the next element is found by binary
//! search over `e`.

use num_bigint::BigUint;
use num_traits::{CheckedSub, Zero};
use tracing::trace;

use crate::error::{Error, Result};
use crate::formula::BlockCounter;
use crate::stirling::StirlingColumns;

/// Find the first block of the `rank`-th partition of `n` elements into `k` blocks,
/// where `k` is the upper column of `columns`.
///
/// Returns the block as strictly increasing relative indices into the remaining elements,
/// together with the number of partitions ranked before every partition starting with
/// that block. Requires `2 <= k <= n` and `rank < S(n, k)`.
pub fn find_block<C>(columns: &C, n: usize, rank: &BigUint, counter: &BlockCounter) -> Result<(Vec<usize>, BigUint)>
    where C: StirlingColumns + ?Sized
{
    let k = columns.k();
    if k < 2 || k > n {
        return Err(Error::invalid(format!("block search needs 2 <= k <= n, got n = {}, k = {}", n, k)));
    }

    let mut block = vec![0];
    let mut acc = BigUint::zero();
    loop {
        let size = block.len();
        let last = block[size - 1];

        let stop_end = &acc + columns.lower(n - size);
        if *rank < stop_end {
            trace!(n, k, size, "block complete");
            return Ok((block, acc));
        }
        acc = stop_end;

        if last + 1 >= n {
            return Err(Error::inconsistent(format!(
                "rank {} exhausted the block search for n = {}, k = {}", rank, n, k)));
        }

        let m = n - size;
        let g = |x: usize| counter.count(columns, m, x + 1 - size);

        // smallest e with rank + G(e) < acc + G(last); ties resolve to the smaller e
        let g_last = g(last)?;
        let target = &acc + &g_last;
        let (mut lo, mut hi) = (last + 1, n - 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if rank + g(mid)? < target {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        if rank + g(lo)? >= target {
            return Err(Error::inconsistent(format!(
                "binary search did not converge for n = {}, k = {}, rank = {}", n, k, rank)));
        }

        if lo > last + 1 {
            let skipped = g_last.checked_sub(&g(lo - 1)?).ok_or_else(|| Error::inconsistent(format!(
                "block count increased between {} and {}", last, lo - 1)))?;
            acc += skipped;
        }
        block.push(lo);
    }
}
