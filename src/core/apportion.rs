//! Largest-remainder apportionment of an image pool across splits.
//!
//! Converts a continuous target ratio into exact integer counts that sum to
//! a fixed pool size: floor every share, then hand the leftover units to the
//! splits with the largest fractional remainders.

use super::split::{DatasetSplit, SplitRatio};

/// Exact integer allocation of one dataset's labeled pool across splits.
///
/// Components always sum to the pool size they were computed from, and each
/// component stays within `[0, pool]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SplitAllocation {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitAllocation {
    /// Get the count for a specific split
    pub fn get(&self, split: DatasetSplit) -> usize {
        match split {
            DatasetSplit::Train => self.train,
            DatasetSplit::Val => self.val,
            DatasetSplit::Test => self.test,
        }
    }

    fn get_mut(&mut self, split: DatasetSplit) -> &mut usize {
        match split {
            DatasetSplit::Train => &mut self.train,
            DatasetSplit::Val => &mut self.val,
            DatasetSplit::Test => &mut self.test,
        }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Apportion `pool` labeled images across train/val/test following `ratio`.
///
/// Each component gets the floor of its exact share; leftover units go to
/// the splits with the largest fractional remainders. Exact remainder ties
/// are broken by the fixed train/val/test precedence, so identical inputs
/// always produce identical outputs.
///
/// Ratio components are expected to be non-negative and to sum to 1 within
/// a small floating tolerance; that is the caller's contract and is not
/// defended against here. An empty pool yields the empty allocation with no
/// distribution step.
pub fn apportion(pool: usize, ratio: &SplitRatio) -> SplitAllocation {
    if pool == 0 {
        return SplitAllocation::default();
    }

    let mut allocation = SplitAllocation::default();
    let mut remainders = [0.0f64; 3];

    for (idx, split) in DatasetSplit::ALL.iter().enumerate() {
        let exact = pool as f64 * ratio.get(*split);
        let base = exact.floor() as usize;
        *allocation.get_mut(*split) = base;
        remainders[idx] = exact - base as f64;
    }

    let leftover = pool.saturating_sub(allocation.total());

    // Indices into DatasetSplit::ALL, largest remainder first. The sort is
    // stable, so equal remainders keep the fixed train/val/test precedence.
    let mut order = [0usize, 1, 2];
    order.sort_by(|a, b| {
        remainders[*b]
            .partial_cmp(&remainders[*a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    // Floating error can leave one more unit than there are splits; cycling
    // the order keeps the sum invariant intact for any near-normalized ratio.
    for i in 0..leftover {
        *allocation.get_mut(DatasetSplit::ALL[order[i % 3]]) += 1;
    }

    allocation
}
