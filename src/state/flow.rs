//! In-memory state of one user-initiated rebalance flow.
//!
//! The flow owns the selection and the target editor exclusively; nothing
//! else mutates them. Allocations computed during a commit are transient:
//! after dispatch the flow re-reads labeled counts from the store, so
//! repeated commits always work against what the store currently reports.

use std::fmt;
use std::sync::mpsc::Sender;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::apportion::apportion;
use crate::core::dispatch::{
    dispatch_rebalance_plan, BatchReport, DispatchError, DispatchProgressMessage,
};
use crate::core::rebalance::{calculate_rebalance_plan, DatasetPool, RebalancePlan};
use crate::core::split::DatasetSplit;
use crate::core::targets::{SplitTarget, SplitTargetNormalizer, ValidationError};
use crate::store::{DatasetStore, StoreError};

use super::settings::Settings;

/// Why a commit was rejected or could not be dispatched.
#[derive(Debug)]
pub enum RebalanceFlowError {
    Validation(ValidationError),
    Dispatch(DispatchError),
}

impl fmt::Display for RebalanceFlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebalanceFlowError::Validation(e) => write!(f, "{}", e),
            RebalanceFlowError::Dispatch(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RebalanceFlowError {}

impl From<ValidationError> for RebalanceFlowError {
    fn from(e: ValidationError) -> Self {
        RebalanceFlowError::Validation(e)
    }
}

impl From<DispatchError> for RebalanceFlowError {
    fn from(e: DispatchError) -> Self {
        RebalanceFlowError::Dispatch(e)
    }
}

/// Selection and target state for one multi-dataset rebalance.
pub struct RebalanceFlow {
    selection: Vec<DatasetPool>,
    editor: SplitTargetNormalizer,
    last_report: Option<BatchReport>,
}

impl RebalanceFlow {
    /// Build a flow over `dataset_ids`, reading each labeled count from the
    /// store. The selection must resolve completely before any target can
    /// be edited, so an unknown id is an error here.
    ///
    /// The target editor is seeded with the configured default ratio
    /// apportioned over the aggregate capacity, so the form opens on a
    /// committable assignment.
    pub fn select(
        store: &dyn DatasetStore,
        dataset_ids: &[String],
        config: &AppConfig,
    ) -> Result<Self, StoreError> {
        let mut selection = Vec::with_capacity(dataset_ids.len());
        for id in dataset_ids {
            let summary = store.get_dataset(id)?;
            selection.push(DatasetPool::new(id.clone(), summary.labeled_images));
        }

        let capacity: usize = selection.iter().map(|p| p.labeled).sum();
        let seed = apportion(capacity, &config.default_split_ratio);
        let editor = SplitTargetNormalizer::with_target(
            capacity,
            SplitTarget::new(seed.train, seed.val, seed.test),
        );

        info!(
            "Selected {} datasets with {} labeled images total",
            selection.len(),
            capacity
        );

        Ok(Self {
            selection,
            editor,
            last_report: None,
        })
    }

    pub fn selection(&self) -> &[DatasetPool] {
        &self.selection
    }

    /// Aggregate labeled-image capacity across the selection.
    pub fn capacity(&self) -> usize {
        self.editor.capacity()
    }

    pub fn target(&self) -> SplitTarget {
        self.editor.target()
    }

    /// Apply one user edit to the aggregate target. Returns the clamped
    /// value actually stored.
    pub fn set_target(&mut self, split: DatasetSplit, value: usize) -> usize {
        self.editor.set(split, value)
    }

    /// Images not yet assigned to any split, for display next to the form.
    pub fn slack(&self) -> i64 {
        self.editor.slack()
    }

    pub fn last_report(&self) -> Option<&BatchReport> {
        self.last_report.as_ref()
    }

    /// Compute the plan for the current target without touching the store.
    pub fn preview(&self) -> Result<RebalancePlan, ValidationError> {
        let ratio = self.editor.commit()?;
        Ok(calculate_rebalance_plan(&self.selection, ratio))
    }

    /// Validate the target, derive the shared ratio, apportion every
    /// selected dataset, persist sequentially, then re-read authoritative
    /// counts from the store.
    ///
    /// A validation failure performs no persistence calls. Per-dataset
    /// persistence failures land in the returned report; the batch is not
    /// transactional and earlier successes stay committed.
    pub fn commit(
        &mut self,
        store: &dyn DatasetStore,
        progress_tx: Option<Sender<DispatchProgressMessage>>,
    ) -> Result<BatchReport, RebalanceFlowError> {
        let ratio = self.editor.commit()?;
        let plan = calculate_rebalance_plan(&self.selection, ratio);
        let report = dispatch_rebalance_plan(store, &plan, progress_tx)?;

        self.refresh(store);
        self.last_report = Some(report.clone());
        Ok(report)
    }

    /// Record this flow's selection and target into persisted settings.
    pub fn remember(&self, settings: &mut Settings) {
        settings.last_target = Some(self.editor.target());
        settings.last_selection = self.selection.iter().map(|p| p.id.clone()).collect();
    }

    /// Re-fetch labeled counts after a commit. A failed fetch keeps the
    /// stale entry; the next commit recomputes against whatever the store
    /// reports then.
    fn refresh(&mut self, store: &dyn DatasetStore) {
        for pool in &mut self.selection {
            match store.get_dataset(&pool.id) {
                Ok(summary) => pool.labeled = summary.labeled_images,
                Err(e) => warn!("Failed to refresh dataset {}: {}", pool.id, e),
            }
        }

        let capacity: usize = self.selection.iter().map(|p| p.labeled).sum();
        self.editor = SplitTargetNormalizer::with_target(capacity, self.editor.target());
    }
}
