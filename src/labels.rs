//! Turning relative-index blocks into labelled partitions.

use std::fmt;
use std::ops::{Deref, Index};
use std::slice;

use crate::error::{Error, Result};

/// One block of a partition: ascending 1-based labels.
pub type Block = Vec<usize>;

/// A partition of `{1, ..., n}` into nonempty blocks.
///
/// Blocks are ordered by their smallest label and hold their labels in ascending order,
/// so each partition has exactly one representation. Comparison is lexicographic over the
/// block sequence, which is the order in which ranks enumerate partitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Partition
{
    blocks: Vec<Block>
}

impl Partition
{
    /// Validate and wrap a block sequence.
    ///
    /// Blocks must be nonempty and ascending, ordered by first label, and together
    /// contain every label of `1..=n` exactly once for some `n`.
    pub fn try_from_blocks(blocks: Vec<Block>) -> Result<Self> {
        let n: usize = blocks.iter().map(|b| b.len()).sum();
        let mut seen = vec![false; n];
        let mut previous_first = 0;
        for (i, block) in blocks.iter().enumerate() {
            let first = *block.first().ok_or_else(|| Error::invalid(format!("block {} is empty", i)))?;
            if first <= previous_first {
                return Err(Error::invalid(format!("block {} does not start after block {}", i, i.saturating_sub(1))));
            }
            if !block.windows(2).all(|w| w[0] < w[1]) {
                return Err(Error::invalid(format!("block {} is not ascending", i)));
            }
            for &label in block {
                if label == 0 || label > n || seen[label - 1] {
                    return Err(Error::invalid(format!("label {} is out of range or repeated", label)));
                }
                seen[label - 1] = true;
            }
            previous_first = first;
        }
        Ok(Partition {blocks})
    }

    // callers guarantee the blocks are already canonical
    pub(crate) fn from_canonical_blocks(blocks: Vec<Block>) -> Self {
        Partition {blocks}
    }

    /// Returns the blocks
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Consume the partition, returning its blocks
    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    /// Returns the size `n` of the partitioned set
    pub fn len(&self) -> usize {
        self.blocks.iter().map(|b| b.len()).sum()
    }

    /// Whether this is the partition of the empty set
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns the number of blocks
    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// The restricted growth sequence: entry `i` is the index of the block holding label `i + 1`.
    pub fn to_restricted_growth(&self) -> Vec<usize> {
        let mut a = vec![0; self.len()];
        for (v, block) in self.blocks.iter().enumerate() {
            for &label in block {
                a[label - 1] = v;
            }
        }
        a
    }

    /// Build the partition whose restricted growth sequence is `a`.
    pub fn from_restricted_growth(a: &[usize]) -> Result<Self> {
        if !is_restricted_growth(a.iter().copied()) {
            return Err(Error::invalid(format!("{:?} is not a restricted growth sequence", a)));
        }
        let mut blocks: Vec<Block> = Vec::new();
        for (i, &v) in a.iter().enumerate() {
            if v == blocks.len() {
                blocks.push(Vec::new());
            }
            blocks[v].push(i + 1);
        }
        Ok(Partition {blocks})
    }
}

/// Checks if a sequence is a restricted growth sequence: it starts at 0 and each
/// value is at most one more than every value before it.
pub fn is_restricted_growth<I>(iter: I) -> bool
    where I: Iterator<Item = usize>
{
    let mut m = 0;
    for ai in iter {
        if ai > m {
            return false;
        }
        m = m.max(ai + 1);
    }
    true
}

/// Map blocks of relative indices to labels.
///
/// Starts from the live sequence `1..=n`. Each block holds strictly increasing positions into
/// the live sequence as it stands before that block; its labels are emitted in order and then
/// removed together. Every label must be consumed by the last block.
pub fn map_to_labels(n: usize, blocks: &[Vec<usize>]) -> Result<Partition> {
    let mut live: Vec<usize> = (1..(n + 1)).collect();
    let mut out = Vec::with_capacity(blocks.len());
    for (i, block) in blocks.iter().enumerate() {
        if block.is_empty() || !block.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::invalid(format!("block {} is empty or not strictly increasing", i)));
        }
        if let Some(&beyond) = block.iter().find(|&&p| p >= live.len()) {
            return Err(Error::invalid(format!(
                "block {} has position {} but only {} elements remain", i, beyond, live.len())));
        }
        out.push(block.iter().map(|&p| live[p]).collect::<Block>());
        for &p in block.iter().rev() {
            live.remove(p);
        }
    }
    if !live.is_empty() {
        return Err(Error::invalid(format!("labels {:?} were not assigned to any block", live)));
    }
    Ok(Partition {blocks: out})
}

impl fmt::Display for Partition
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("[")?;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str("[")?;
            for (j, label) in block.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", label)?;
            }
            f.write_str("]")?;
        }
        f.write_str("]")
    }
}

impl Deref for Partition
{
    type Target = [Block];

    fn deref(&self) -> &Self::Target {
        self.blocks()
    }
}

impl AsRef<[Block]> for Partition
{
    fn as_ref(&self) -> &[Block] {
        self.blocks()
    }
}

impl Index<usize> for Partition
{
    type Output = Block;

    fn index(&self, index: usize) -> &Block {
        &self.blocks[index]
    }
}

impl<'a> IntoIterator for &'a Partition
{
    type Item = &'a Block;
    type IntoIter = slice::Iter<'a, Block>;

    fn into_iter(self) -> slice::Iter<'a, Block> {
        self.blocks.iter()
    }
}

impl IntoIterator for Partition
{
    type Item = Block;
    type IntoIter = std::vec::IntoIter<Block>;

    fn into_iter(self) -> std::vec::IntoIter<Block> {
        self.blocks.into_iter()
    }
}

impl TryFrom<Vec<Block>> for Partition
{
    type Error = Error;

    fn try_from(blocks: Vec<Block>) -> Result<Self> {
        Partition::try_from_blocks(blocks)
    }
}
