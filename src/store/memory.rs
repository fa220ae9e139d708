//! In-memory dataset store for tests and local tooling.
//!
//! Implements the same contract as the platform store, including a way to
//! inject per-dataset failures so batch bookkeeping can be exercised end to
//! end. Rebalance attempts are recorded in call order.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use super::{DatasetStore, DatasetSummary, RebalanceRequest, SplitStats, StoreError};

#[derive(Debug, Clone)]
struct StoredDataset {
    labeled: usize,
    total: usize,
    splits: SplitStats,
}

/// A `DatasetStore` backed by process memory.
#[derive(Default)]
pub struct InMemoryStore {
    datasets: RefCell<HashMap<String, StoredDataset>>,
    failing: RefCell<HashSet<String>>,
    rebalance_attempts: RefCell<Vec<(String, RebalanceRequest)>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dataset whose labeled images all start in the train split.
    pub fn insert_dataset(&self, id: impl Into<String>, labeled: usize, total: usize) {
        self.datasets.borrow_mut().insert(
            id.into(),
            StoredDataset {
                labeled,
                total,
                splits: SplitStats {
                    train: labeled,
                    val: 0,
                    test: 0,
                },
            },
        );
    }

    /// Add a dataset with explicit split counts; the labeled pool is their
    /// sum.
    pub fn insert_dataset_with_splits(&self, id: impl Into<String>, total: usize, splits: SplitStats) {
        self.datasets.borrow_mut().insert(
            id.into(),
            StoredDataset {
                labeled: splits.total(),
                total,
                splits,
            },
        );
    }

    /// Make every future `rebalance` call for `id` fail.
    pub fn fail_rebalance_for(&self, id: impl Into<String>) {
        self.failing.borrow_mut().insert(id.into());
    }

    /// Every `rebalance` attempt so far, in call order, including failed
    /// ones.
    pub fn rebalance_attempts(&self) -> Vec<(String, RebalanceRequest)> {
        self.rebalance_attempts.borrow().clone()
    }
}

impl DatasetStore for InMemoryStore {
    fn get_dataset(&self, id: &str) -> Result<DatasetSummary, StoreError> {
        self.datasets
            .borrow()
            .get(id)
            .map(|d| DatasetSummary {
                labeled_images: d.labeled,
                total_images: d.total,
            })
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn get_split_stats(&self, id: &str) -> Result<SplitStats, StoreError> {
        self.datasets
            .borrow()
            .get(id)
            .map(|d| d.splits)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn rebalance(&self, id: &str, request: &RebalanceRequest) -> Result<(), StoreError> {
        self.rebalance_attempts
            .borrow_mut()
            .push((id.to_string(), *request));

        if self.failing.borrow().contains(id) {
            return Err(StoreError::Rejected(format!("injected failure for {}", id)));
        }

        let mut datasets = self.datasets.borrow_mut();
        let dataset = datasets
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if request.total() != dataset.labeled {
            return Err(StoreError::Rejected(format!(
                "requested counts total {}, dataset has {} labeled images",
                request.total(),
                dataset.labeled
            )));
        }

        dataset.splits = SplitStats {
            train: request.train_count,
            val: request.val_count,
            test: request.test_count,
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_roundtrip() {
        let store = InMemoryStore::new();
        store.insert_dataset("vehicles", 100, 120);

        let summary = store.get_dataset("vehicles").unwrap();
        assert_eq!(summary.labeled_images, 100);
        assert_eq!(summary.total_images, 120);

        let stats = store.get_split_stats("vehicles").unwrap();
        assert_eq!(stats.train, 100);
        assert_eq!(stats.total(), 100);
    }

    #[test]
    fn test_insert_with_explicit_splits() {
        let store = InMemoryStore::new();
        store.insert_dataset_with_splits(
            "vehicles",
            120,
            SplitStats {
                train: 70,
                val: 20,
                test: 10,
            },
        );

        let summary = store.get_dataset("vehicles").unwrap();
        assert_eq!(summary.labeled_images, 100);
        assert_eq!(summary.total_images, 120);
        let stats = store.get_split_stats("vehicles").unwrap();
        assert_eq!((stats.train, stats.val, stats.test), (70, 20, 10));
    }

    #[test]
    fn test_unknown_dataset_is_not_found() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.get_dataset("missing"),
            Err(StoreError::NotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_rebalance_applies_requested_counts() {
        let store = InMemoryStore::new();
        store.insert_dataset("vehicles", 100, 120);

        let request = RebalanceRequest {
            train_count: 70,
            val_count: 20,
            test_count: 10,
        };
        store.rebalance("vehicles", &request).unwrap();

        let stats = store.get_split_stats("vehicles").unwrap();
        assert_eq!((stats.train, stats.val, stats.test), (70, 20, 10));
    }

    #[test]
    fn test_rebalance_rejects_mismatched_totals() {
        let store = InMemoryStore::new();
        store.insert_dataset("vehicles", 100, 120);

        let request = RebalanceRequest {
            train_count: 70,
            val_count: 20,
            test_count: 20,
        };
        let err = store.rebalance("vehicles", &request).unwrap_err();
        assert!(matches!(err, StoreError::Rejected(_)));

        // Split counts are untouched after a rejected request.
        let stats = store.get_split_stats("vehicles").unwrap();
        assert_eq!(stats.train, 100);
    }

    #[test]
    fn test_injected_failure_and_attempt_log() {
        let store = InMemoryStore::new();
        store.insert_dataset("vehicles", 10, 10);
        store.fail_rebalance_for("vehicles");

        let request = RebalanceRequest {
            train_count: 7,
            val_count: 2,
            test_count: 1,
        };
        assert!(store.rebalance("vehicles", &request).is_err());

        let attempts = store.rebalance_attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].0, "vehicles");
    }
}
