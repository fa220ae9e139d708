//! Multi-dataset rebalancing: one shared ratio applied across a selection.
//!
//! The ratio is derived once from the aggregate target and applied uniformly
//! to every selected dataset; per-dataset ratios are deliberately not
//! supported.

use tracing::info;

use super::apportion::{apportion, SplitAllocation};
use super::split::SplitRatio;

/// One dataset's labeled-image pool, read from the store and held constant
/// for the duration of a rebalance operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPool {
    pub id: String,
    pub labeled: usize,
}

impl DatasetPool {
    pub fn new(id: impl Into<String>, labeled: usize) -> Self {
        Self {
            id: id.into(),
            labeled,
        }
    }
}

/// A single dataset's entry in a rebalance plan.
#[derive(Debug, Clone)]
pub struct PlanEntry {
    pub dataset_id: String,
    /// Labeled pool size the allocation was computed from.
    pub pool: usize,
    pub allocation: SplitAllocation,
    /// Empty pools are carried for reporting but never persisted.
    pub skipped: bool,
}

/// A complete rebalance plan across the selected datasets, consumed exactly
/// once by the dispatcher.
#[derive(Debug, Clone)]
pub struct RebalancePlan {
    /// Entries in selection order; the dispatcher preserves this order.
    pub entries: Vec<PlanEntry>,
    /// Ratio every allocation in this plan was computed from.
    pub ratio: SplitRatio,
}

impl RebalancePlan {
    /// Number of datasets that will actually be persisted.
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.skipped).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn skipped_count(&self) -> usize {
        self.entries.iter().filter(|e| e.skipped).count()
    }

    /// Total labeled images covered by the plan.
    pub fn total_images(&self) -> usize {
        self.entries.iter().map(|e| e.pool).sum()
    }
}

/// Compute the allocation plan for `pools` under one shared `ratio`.
///
/// Datasets with an empty labeled pool get a zero allocation and are marked
/// skipped; they are never persisted and never treated as errors. Every
/// other entry's allocation sums exactly to that dataset's pool size.
pub fn calculate_rebalance_plan(pools: &[DatasetPool], ratio: SplitRatio) -> RebalancePlan {
    let mut plan = RebalancePlan {
        entries: Vec::with_capacity(pools.len()),
        ratio,
    };

    for pool in pools {
        if pool.labeled == 0 {
            info!("Dataset {} has no labeled images, skipping", pool.id);
            plan.entries.push(PlanEntry {
                dataset_id: pool.id.clone(),
                pool: 0,
                allocation: SplitAllocation::default(),
                skipped: true,
            });
            continue;
        }

        let allocation = apportion(pool.labeled, &ratio);
        plan.entries.push(PlanEntry {
            dataset_id: pool.id.clone(),
            pool: pool.labeled,
            allocation,
            skipped: false,
        });
    }

    info!(
        "Rebalance plan: {} datasets to persist, {} skipped, {} images total",
        plan.len(),
        plan.skipped_count(),
        plan.total_images()
    );

    plan
}
