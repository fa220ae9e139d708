//! Sequential persistence of a rebalance plan against the dataset store.
//!
//! The plan's entries form an ordered queue processed by one controller:
//! one request at a time, in plan order, each response awaited before the
//! next dataset is touched. There is no timeout or cancellation for an
//! individual request; a stalled request blocks the remainder of the batch.

use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc::Sender;
use tracing::{error, info};

use crate::store::{DatasetStore, RebalanceRequest};

use super::rebalance::RebalancePlan;

/// Outcome of one dataset's persistence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded,
    Failed(String),
}

/// One dataset's entry in the batch bookkeeping.
#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub dataset_id: String,
    pub outcome: DispatchOutcome,
}

/// Progress messages streamed to the caller during batch dispatch.
#[derive(Debug, Clone)]
pub enum DispatchProgressMessage {
    Progress {
        current: usize,
        total: usize,
        last_dataset: String,
    },
    Complete {
        success_count: usize,
        failed_count: usize,
    },
}

/// Aggregate result of one batch: which datasets were persisted, which
/// failed and why, and which were skipped as empty.
///
/// There is no cross-dataset transaction: datasets that succeeded stay
/// committed even when a later one fails.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Per-dataset outcomes, in dispatch order.
    pub results: Vec<DispatchResult>,
    /// Datasets carried in the plan but never persisted (empty pools).
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn succeeded_ids(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.outcome == DispatchOutcome::Succeeded)
            .map(|r| r.dataset_id.as_str())
            .collect()
    }

    pub fn failed_ids(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| matches!(r.outcome, DispatchOutcome::Failed(_)))
            .map(|r| r.dataset_id.as_str())
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.succeeded_ids().len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed_ids().len()
    }

    /// Whether every persisted dataset succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Structural errors in the submitted plan. A single dataset failure is
/// never one of these; it lands in the batch report instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// An entry's allocation does not add up to its recorded pool size.
    MalformedEntry {
        dataset_id: String,
        pool: usize,
        allocated: usize,
    },
    /// The same dataset appears more than once in the plan.
    DuplicateDataset { dataset_id: String },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::MalformedEntry {
                dataset_id,
                pool,
                allocated,
            } => write!(
                f,
                "Allocation for dataset {} totals {} but its pool holds {}",
                dataset_id, allocated, pool
            ),
            DispatchError::DuplicateDataset { dataset_id } => {
                write!(f, "Dataset {} appears more than once in the plan", dataset_id)
            }
        }
    }
}

impl std::error::Error for DispatchError {}

/// Persist a rebalance plan, one dataset at a time, in plan order.
///
/// The whole plan is checked for structural defects before the first
/// persistence call; a malformed plan returns an error without touching the
/// store. After that, a failing dataset is recorded and the batch continues
/// with the next entry. Skipped entries issue no persistence call.
pub fn dispatch_rebalance_plan(
    store: &dyn DatasetStore,
    plan: &RebalancePlan,
    progress_tx: Option<Sender<DispatchProgressMessage>>,
) -> Result<BatchReport, DispatchError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for entry in &plan.entries {
        if !seen.insert(entry.dataset_id.as_str()) {
            return Err(DispatchError::DuplicateDataset {
                dataset_id: entry.dataset_id.clone(),
            });
        }
        if entry.allocation.total() != entry.pool {
            return Err(DispatchError::MalformedEntry {
                dataset_id: entry.dataset_id.clone(),
                pool: entry.pool,
                allocated: entry.allocation.total(),
            });
        }
    }

    let mut report = BatchReport::default();
    let total = plan.len();
    let mut processed = 0;

    for entry in &plan.entries {
        if entry.skipped {
            report.skipped.push(entry.dataset_id.clone());
            continue;
        }

        let request = RebalanceRequest::from_allocation(&entry.allocation);
        let outcome = match store.rebalance(&entry.dataset_id, &request) {
            Ok(()) => {
                info!(
                    "Persisted allocation for dataset {}: train={}, val={}, test={}",
                    entry.dataset_id, request.train_count, request.val_count, request.test_count
                );
                DispatchOutcome::Succeeded
            }
            Err(e) => {
                error!("Rebalance failed for dataset {}: {}", entry.dataset_id, e);
                DispatchOutcome::Failed(e.to_string())
            }
        };
        report.results.push(DispatchResult {
            dataset_id: entry.dataset_id.clone(),
            outcome,
        });

        processed += 1;
        if let Some(ref tx) = progress_tx {
            let _ = tx.send(DispatchProgressMessage::Progress {
                current: processed,
                total,
                last_dataset: entry.dataset_id.clone(),
            });
        }
    }

    info!(
        "Batch complete: {} succeeded, {} failed, {} skipped",
        report.success_count(),
        report.failed_count(),
        report.skipped.len()
    );

    if let Some(tx) = progress_tx {
        let _ = tx.send(DispatchProgressMessage::Complete {
            success_count: report.success_count(),
            failed_count: report.failed_count(),
        });
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::apportion::SplitAllocation;
    use crate::core::rebalance::{calculate_rebalance_plan, DatasetPool, PlanEntry};
    use crate::core::split::SplitRatio;
    use crate::store::InMemoryStore;
    use std::sync::mpsc::channel;

    fn plan_for(store: &InMemoryStore, pools: &[DatasetPool]) -> RebalancePlan {
        for pool in pools {
            store.insert_dataset(pool.id.clone(), pool.labeled, pool.labeled);
        }
        calculate_rebalance_plan(pools, SplitRatio::default())
    }

    #[test]
    fn test_batch_persists_every_dataset_in_order() {
        let store = InMemoryStore::new();
        let pools = vec![
            DatasetPool::new("a", 10),
            DatasetPool::new("b", 20),
            DatasetPool::new("c", 30),
        ];
        let plan = plan_for(&store, &pools);

        let report = dispatch_rebalance_plan(&store, &plan, None).unwrap();
        assert_eq!(report.succeeded_ids(), ["a", "b", "c"]);
        assert!(report.is_clean());

        let order: Vec<String> = store
            .rebalance_attempts()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn test_one_failure_does_not_abort_the_batch() {
        let store = InMemoryStore::new();
        let pools = vec![DatasetPool::new("a", 10), DatasetPool::new("b", 10)];
        let plan = plan_for(&store, &pools);
        store.fail_rebalance_for("b");

        let report = dispatch_rebalance_plan(&store, &plan, None).unwrap();

        // A stays committed regardless of B's outcome.
        let stats = store.get_split_stats("a").unwrap();
        assert_eq!((stats.train, stats.val, stats.test), (7, 2, 1));

        assert_eq!(report.succeeded_ids(), ["a"]);
        assert_eq!(report.failed_ids(), ["b"]);
        match &report.results[1].outcome {
            DispatchOutcome::Failed(reason) => assert!(reason.contains("injected failure")),
            other => panic!("expected failure outcome, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_in_the_middle_continues_with_later_datasets() {
        let store = InMemoryStore::new();
        let pools = vec![
            DatasetPool::new("a", 10),
            DatasetPool::new("b", 10),
            DatasetPool::new("c", 10),
        ];
        let plan = plan_for(&store, &pools);
        store.fail_rebalance_for("b");

        let report = dispatch_rebalance_plan(&store, &plan, None).unwrap();
        assert_eq!(report.succeeded_ids(), ["a", "c"]);
        assert_eq!(report.failed_ids(), ["b"]);
        assert_eq!(store.rebalance_attempts().len(), 3);
    }

    #[test]
    fn test_skipped_datasets_issue_no_persistence_calls() {
        let store = InMemoryStore::new();
        let pools = vec![DatasetPool::new("empty", 0)];
        let plan = plan_for(&store, &pools);

        let report = dispatch_rebalance_plan(&store, &plan, None).unwrap();
        assert_eq!(report.skipped, ["empty"]);
        assert!(report.results.is_empty());
        assert!(store.rebalance_attempts().is_empty());
    }

    #[test]
    fn test_malformed_entry_rejected_before_any_call() {
        let store = InMemoryStore::new();
        store.insert_dataset("a", 10, 10);
        let plan = RebalancePlan {
            entries: vec![PlanEntry {
                dataset_id: "a".to_string(),
                pool: 10,
                allocation: SplitAllocation {
                    train: 5,
                    val: 2,
                    test: 2,
                },
                skipped: false,
            }],
            ratio: SplitRatio::default(),
        };

        let err = dispatch_rebalance_plan(&store, &plan, None).unwrap_err();
        assert_eq!(
            err,
            DispatchError::MalformedEntry {
                dataset_id: "a".to_string(),
                pool: 10,
                allocated: 9
            }
        );
        assert!(store.rebalance_attempts().is_empty());
    }

    #[test]
    fn test_duplicate_dataset_rejected_before_any_call() {
        let store = InMemoryStore::new();
        store.insert_dataset("a", 10, 10);
        let pools = vec![DatasetPool::new("a", 10), DatasetPool::new("a", 10)];
        let plan = calculate_rebalance_plan(&pools, SplitRatio::default());

        let err = dispatch_rebalance_plan(&store, &plan, None).unwrap_err();
        assert_eq!(
            err,
            DispatchError::DuplicateDataset {
                dataset_id: "a".to_string()
            }
        );
        assert!(store.rebalance_attempts().is_empty());
    }

    #[test]
    fn test_progress_messages_cover_the_batch() {
        let store = InMemoryStore::new();
        let pools = vec![DatasetPool::new("a", 10), DatasetPool::new("b", 20)];
        let plan = plan_for(&store, &pools);

        let (tx, rx) = channel();
        dispatch_rebalance_plan(&store, &plan, Some(tx)).unwrap();

        let messages: Vec<DispatchProgressMessage> = rx.try_iter().collect();
        assert_eq!(messages.len(), 3);
        match &messages[0] {
            DispatchProgressMessage::Progress {
                current,
                total,
                last_dataset,
            } => {
                assert_eq!((*current, *total), (1, 2));
                assert_eq!(last_dataset, "a");
            }
            other => panic!("unexpected message: {:?}", other),
        }
        match &messages[2] {
            DispatchProgressMessage::Complete {
                success_count,
                failed_count,
            } => {
                assert_eq!((*success_count, *failed_count), (2, 0));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
