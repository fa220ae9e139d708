pub mod analysis;
pub mod apportion;
pub mod dispatch;
pub mod rebalance;
pub mod split;
pub mod targets;

pub use apportion::{apportion, SplitAllocation};
pub use dispatch::{
    dispatch_rebalance_plan, BatchReport, DispatchError, DispatchOutcome, DispatchProgressMessage,
    DispatchResult,
};
pub use rebalance::{calculate_rebalance_plan, DatasetPool, PlanEntry, RebalancePlan};
pub use split::{DatasetSplit, SplitRatio};
pub use targets::{SplitTarget, SplitTargetNormalizer, ValidationError};
