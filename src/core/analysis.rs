//! Distribution analysis: how a dataset's current splits compare to a
//! target ratio.
//!
//! Read-only helpers over the store's split counters, used to render drift
//! summaries and manual-rebalancing recommendations.

use crate::store::SplitStats;

use super::apportion::apportion;
use super::split::{DatasetSplit, SplitRatio};

/// Percentage of a dataset's labeled images currently sitting in `split`.
pub fn split_percentage(stats: &SplitStats, split: DatasetSplit) -> f64 {
    if stats.total() == 0 {
        return 0.0;
    }
    stats.get(split) as f64 / stats.total() as f64 * 100.0
}

/// Signed per-split deviation from the target distribution, in images.
///
/// Positive means the split currently holds more images than the target
/// allots it. The ideal counts come from the same apportionment used for
/// rebalancing, so the deviations always sum to zero.
pub fn split_deviations(stats: &SplitStats, target: &SplitRatio) -> [(DatasetSplit, i64); 3] {
    let ideal = apportion(stats.total(), target);
    let mut deviations = [(DatasetSplit::Train, 0i64); 3];
    for (idx, split) in DatasetSplit::ALL.iter().enumerate() {
        deviations[idx] = (
            *split,
            stats.get(*split) as i64 - ideal.get(*split) as i64,
        );
    }
    deviations
}

/// Check if every split is within `tolerance` (fraction of the pool) of its
/// target share. An empty dataset counts as balanced.
pub fn is_balanced(stats: &SplitStats, target: &SplitRatio, tolerance: f64) -> bool {
    let total = stats.total();
    if total == 0 {
        return true;
    }
    for split in DatasetSplit::ALL {
        let current = stats.get(split) as f64 / total as f64;
        if (current - target.get(split)).abs() > tolerance {
            return false;
        }
    }
    true
}

/// Generate recommendations for manual rebalancing
pub fn get_recommendations(stats: &SplitStats, target: &SplitRatio) -> Vec<String> {
    let mut recommendations = Vec::new();

    if stats.total() == 0 {
        recommendations.push("No labeled images in dataset.".to_string());
        return recommendations;
    }

    for (split, deviation) in split_deviations(stats, target) {
        let current_pct = split_percentage(stats, split);
        let target_pct = target.get(split) * 100.0;

        if deviation > 0 {
            recommendations.push(format!(
                "📉 Move {} images out of {} (currently {:.1}%, target {:.1}%)",
                deviation,
                split.as_str(),
                current_pct,
                target_pct
            ));
        } else if deviation < 0 {
            recommendations.push(format!(
                "📈 Move {} images into {} (currently {:.1}%, target {:.1}%)",
                -deviation,
                split.as_str(),
                current_pct,
                target_pct
            ));
        } else {
            recommendations.push(format!(
                "✓ {} is balanced ({:.1}%)",
                split.as_str(),
                current_pct
            ));
        }
    }

    recommendations
}
