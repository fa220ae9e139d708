//! Split-reallocation core for a dataset-management platform.
//!
//! Given each selected dataset's labeled-image pool and one user-entered
//! aggregate train/val/test target, this crate derives a shared ratio,
//! apportions every pool into exact integer counts that sum to its size,
//! and persists the allocations against the platform's dataset store one
//! dataset at a time, reporting per-dataset success and failure.
//!
//! The store is the source of truth for which images land in which split;
//! this crate only ever submits target counts. UI rendering and pixel
//! processing live elsewhere in the platform.

pub mod config;
pub mod core;
pub mod logging;
pub mod state;
pub mod store;

pub use config::AppConfig;
pub use core::{
    apportion, calculate_rebalance_plan, dispatch_rebalance_plan, BatchReport, DatasetPool,
    DatasetSplit, DispatchError, DispatchOutcome, DispatchProgressMessage, RebalancePlan,
    SplitAllocation, SplitRatio, SplitTarget, SplitTargetNormalizer, ValidationError,
};
pub use state::{RebalanceFlow, RebalanceFlowError, Settings};
pub use store::{
    DatasetStore, DatasetSummary, InMemoryStore, RebalanceRequest, SplitStats, StoreError,
};
