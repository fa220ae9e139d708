use serde::{Deserialize, Serialize};

/// One of the three dataset partitions used to organize images for model
/// training and evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetSplit {
    Train,
    Val,
    Test,
}

impl DatasetSplit {
    /// Fixed split order. Every place that walks counts or remainders uses
    /// this order, so results never depend on incidental iteration order.
    pub const ALL: [DatasetSplit; 3] = [DatasetSplit::Train, DatasetSplit::Val, DatasetSplit::Test];

    pub fn as_str(&self) -> &str {
        match self {
            DatasetSplit::Train => "train",
            DatasetSplit::Val => "val",
            DatasetSplit::Test => "test",
        }
    }
}

/// Target ratios for train/val/test distribution.
///
/// Derived once per commit from the aggregate split target and shared
/// unchanged across every dataset in the operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatio {
    pub train: f64, // e.g., 0.70 for 70%
    pub val: f64,   // e.g., 0.20 for 20%
    pub test: f64,  // e.g., 0.10 for 10%
}

impl Default for SplitRatio {
    fn default() -> Self {
        Self {
            train: 0.70,
            val: 0.20,
            test: 0.10,
        }
    }
}

impl SplitRatio {
    /// Derive the shared ratio from aggregate per-split counts.
    ///
    /// A zero total yields the zero ratio; apportionment then produces an
    /// empty allocation for every dataset instead of dividing by zero.
    pub fn from_counts(train: usize, val: usize, test: usize) -> Self {
        let total = train + val + test;
        if total == 0 {
            return Self {
                train: 0.0,
                val: 0.0,
                test: 0.0,
            };
        }
        let total = total as f64;
        Self {
            train: train as f64 / total,
            val: val as f64 / total,
            test: test as f64 / total,
        }
    }

    /// Get the ratio component for a specific split
    pub fn get(&self, split: DatasetSplit) -> f64 {
        match split {
            DatasetSplit::Train => self.train,
            DatasetSplit::Val => self.val,
            DatasetSplit::Test => self.test,
        }
    }

    /// Whether the components sum to 1 within `tolerance`.
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        ((self.train + self.val + self.test) - 1.0).abs() <= tolerance
    }
}
