//! Aggregate split-target editing and commit-time validation.
//!
//! The user edits one aggregate train/val/test target for the whole
//! selection. Edits are clamped as they happen; the sum is only enforced
//! when the user commits, at which point the shared ratio is derived.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::split::{DatasetSplit, SplitRatio};

/// User-entered aggregate split counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitTarget {
    pub train: usize,
    pub val: usize,
    pub test: usize,
}

impl SplitTarget {
    pub fn new(train: usize, val: usize, test: usize) -> Self {
        Self { train, val, test }
    }

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

/// Validation failures surfaced to the user before any persistence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The aggregate target does not account for every labeled image.
    SumMismatch { required: usize, entered: usize },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::SumMismatch { required, entered } => write!(
                f,
                "Split counts must total {} labeled images, got {}",
                required, entered
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Clamps and validates user-entered split targets against pool capacity
/// before a ratio is derived.
///
/// Each edit touches exactly one component and is clamped to
/// `[0, capacity]`; the other two components are never auto-adjusted. The
/// remaining slack is exposed for display while the user types, and the
/// aggregate sum is enforced only at commit time.
#[derive(Debug, Clone)]
pub struct SplitTargetNormalizer {
    capacity: usize,
    target: SplitTarget,
}

impl SplitTargetNormalizer {
    /// Create an editor over `capacity` labeled images with an all-zero
    /// target.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            target: SplitTarget::default(),
        }
    }

    /// Create an editor seeded with `target`, clamping each component the
    /// same way a user edit would be.
    pub fn with_target(capacity: usize, target: SplitTarget) -> Self {
        let mut editor = Self::new(capacity);
        for split in DatasetSplit::ALL {
            editor.set(split, target.get(split));
        }
        editor
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn target(&self) -> SplitTarget {
        self.target
    }

    /// Apply one user edit, clamped to `[0, capacity]`. Returns the value
    /// actually stored.
    pub fn set(&mut self, split: DatasetSplit, value: usize) -> usize {
        let clamped = value.min(self.capacity);
        if clamped != value {
            debug!(
                "Clamped {} target from {} to pool capacity {}",
                split.as_str(),
                value,
                clamped
            );
        }
        match split {
            DatasetSplit::Train => self.target.train = clamped,
            DatasetSplit::Val => self.target.val = clamped,
            DatasetSplit::Test => self.target.test = clamped,
        }
        clamped
    }

    /// Labeled images not yet assigned to any split. Negative when the
    /// entered counts overshoot the pool.
    pub fn slack(&self) -> i64 {
        self.capacity as i64 - self.target.total() as i64
    }

    /// Commit-time check: the target must account for every labeled image
    /// exactly.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let entered = self.target.total();
        if entered != self.capacity {
            return Err(ValidationError::SumMismatch {
                required: self.capacity,
                entered,
            });
        }
        Ok(())
    }

    /// Validate the target and derive the shared ratio for this commit.
    pub fn commit(&self) -> Result<SplitRatio, ValidationError> {
        self.validate()?;
        Ok(SplitRatio::from_counts(
            self.target.train,
            self.target.val,
            self.target.test,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_within_capacity_is_kept() {
        let mut editor = SplitTargetNormalizer::new(100);
        assert_eq!(editor.set(DatasetSplit::Train, 70), 70);
        assert_eq!(editor.target().train, 70);
    }

    #[test]
    fn test_edit_above_capacity_is_clamped() {
        let mut editor = SplitTargetNormalizer::new(100);
        assert_eq!(editor.set(DatasetSplit::Val, 250), 100);
        assert_eq!(editor.target().val, 100);
    }

    #[test]
    fn test_other_components_are_never_adjusted() {
        let mut editor = SplitTargetNormalizer::with_target(100, SplitTarget::new(70, 20, 10));
        editor.set(DatasetSplit::Train, 90);
        assert_eq!(editor.target(), SplitTarget::new(90, 20, 10));
    }

    #[test]
    fn test_slack_tracks_remaining_images() {
        let mut editor = SplitTargetNormalizer::new(100);
        assert_eq!(editor.slack(), 100);
        editor.set(DatasetSplit::Train, 70);
        editor.set(DatasetSplit::Val, 20);
        assert_eq!(editor.slack(), 10);
        editor.set(DatasetSplit::Test, 30);
        assert_eq!(editor.slack(), -20);
    }

    #[test]
    fn test_commit_rejects_sum_mismatch() {
        let editor = SplitTargetNormalizer::with_target(100, SplitTarget::new(70, 20, 5));
        let err = editor.commit().unwrap_err();
        assert_eq!(
            err,
            ValidationError::SumMismatch {
                required: 100,
                entered: 95
            }
        );
        // The message names both totals for the inline form error.
        let message = err.to_string();
        assert!(message.contains("100"));
        assert!(message.contains("95"));
    }

    #[test]
    fn test_commit_derives_shared_ratio() {
        let editor = SplitTargetNormalizer::with_target(100, SplitTarget::new(70, 20, 10));
        let ratio = editor.commit().unwrap();
        assert_eq!(ratio.train, 0.70);
        assert_eq!(ratio.val, 0.20);
        assert_eq!(ratio.test, 0.10);
    }

    #[test]
    fn test_empty_pool_commits_zero_target() {
        let editor = SplitTargetNormalizer::new(0);
        let ratio = editor.commit().unwrap();
        assert_eq!(ratio.get(DatasetSplit::Train), 0.0);
        assert_eq!(ratio.get(DatasetSplit::Val), 0.0);
        assert_eq!(ratio.get(DatasetSplit::Test), 0.0);
    }

    #[test]
    fn test_seeded_target_is_clamped() {
        let editor = SplitTargetNormalizer::with_target(10, SplitTarget::new(50, 5, 5));
        assert_eq!(editor.target(), SplitTarget::new(10, 5, 5));
    }
}
