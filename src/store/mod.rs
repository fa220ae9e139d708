//! Dataset-store contract.
//!
//! The store is the platform's source of truth for which images land in
//! which split; this client only reads counters and submits target counts.
//! Everything behind the trait (transport, representation) is opaque.

mod memory;

pub use memory::InMemoryStore;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::apportion::SplitAllocation;
use crate::core::split::DatasetSplit;

/// Summary counters for one dataset as the store reports them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Images with at least one annotation, eligible for split assignment.
    #[serde(rename = "labeledImages")]
    pub labeled_images: usize,
    #[serde(rename = "totalImages")]
    pub total_images: usize,
}

/// Current per-split image counts for one dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitStats {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitStats {
    /// Get the count for a specific split
    pub fn get(&self, split: DatasetSplit) -> usize {
        match split {
            DatasetSplit::Train => self.train,
            DatasetSplit::Val => self.val,
            DatasetSplit::Test => self.test,
        }
    }

    pub fn total(&self) -> usize {
        self.train + self.val + self.test
    }
}

/// Target counts submitted to the store. The store decides which images
/// actually move; only counts travel over the wire, never image identities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebalanceRequest {
    pub train_count: usize,
    pub val_count: usize,
    pub test_count: usize,
}

impl RebalanceRequest {
    pub fn from_allocation(allocation: &SplitAllocation) -> Self {
        Self {
            train_count: allocation.train,
            val_count: allocation.val,
            test_count: allocation.test,
        }
    }

    pub fn total(&self) -> usize {
        self.train_count + self.val_count + self.test_count
    }
}

/// Error types for dataset-store operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Unknown dataset id.
    NotFound(String),
    /// The store refused the requested operation.
    Rejected(String),
    /// The store's response could not be parsed.
    MalformedResponse(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::NotFound(id) => write!(f, "Dataset not found: {}", id),
            StoreError::Rejected(msg) => write!(f, "Store rejected request: {}", msg),
            StoreError::MalformedResponse(msg) => write!(f, "Malformed store response: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Operations the platform's dataset store exposes to this client.
pub trait DatasetStore {
    fn get_dataset(&self, id: &str) -> Result<DatasetSummary, StoreError>;

    fn get_split_stats(&self, id: &str) -> Result<SplitStats, StoreError>;

    /// Ask the store to redistribute the dataset's labeled images so the
    /// splits end up at the requested counts.
    fn rebalance(&self, id: &str, request: &RebalanceRequest) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_wire_field_names() {
        let summary = DatasetSummary {
            labeled_images: 120,
            total_images: 150,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"labeledImages\":120"));
        assert!(json.contains("\"totalImages\":150"));

        let parsed: DatasetSummary =
            serde_json::from_str(r#"{"labeledImages": 7, "totalImages": 9}"#).unwrap();
        assert_eq!(parsed.labeled_images, 7);
        assert_eq!(parsed.total_images, 9);
    }

    #[test]
    fn test_rebalance_request_from_allocation() {
        let allocation = SplitAllocation {
            train: 70,
            val: 20,
            test: 10,
        };
        let request = RebalanceRequest::from_allocation(&allocation);
        assert_eq!(request.train_count, 70);
        assert_eq!(request.val_count, 20);
        assert_eq!(request.test_count, 10);
        assert_eq!(request.total(), 100);

        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"train_count\":70"));
    }

    #[test]
    fn test_split_stats_lookup() {
        let stats = SplitStats {
            train: 5,
            val: 3,
            test: 2,
        };
        assert_eq!(stats.get(DatasetSplit::Train), 5);
        assert_eq!(stats.get(DatasetSplit::Val), 3);
        assert_eq!(stats.get(DatasetSplit::Test), 2);
        assert_eq!(stats.total(), 10);
    }

    #[test]
    fn test_store_error_messages() {
        let err = StoreError::NotFound("vehicles".to_string());
        assert_eq!(err.to_string(), "Dataset not found: vehicles");
        let err = StoreError::Rejected("counts exceed pool".to_string());
        assert!(err.to_string().contains("counts exceed pool"));
    }
}
