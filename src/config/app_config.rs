use crate::core::split::SplitRatio;

/// Application configuration containing all tunable defaults
///
/// This struct centralizes configuration values to make them easier to
/// manage and provides a foundation for future configuration file support.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Ratio the target editor is seeded with before the user edits it
    pub default_split_ratio: SplitRatio,
    /// Accepted deviation of a caller-supplied ratio sum from 1.0
    pub ratio_sum_tolerance: f64,
    /// Drift tolerance for considering a distribution balanced (0.02 = 2%)
    pub balance_tolerance: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_split_ratio: SplitRatio::default(),
            ratio_sum_tolerance: 1e-6,
            balance_tolerance: 0.02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ratio_is_normalized() {
        let config = AppConfig::default();
        assert!(config
            .default_split_ratio
            .is_normalized(config.ratio_sum_tolerance));
    }
}
