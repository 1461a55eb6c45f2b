pub mod stats;
pub mod weights;

#[cfg(feature = "optimization")]
pub mod max_sharpe;

pub use stats::{evaluate_allocation, AllocationStats};
pub use weights::{equal_weights, normalize_weights, WeightVector};

#[cfg(feature = "optimization")]
pub use max_sharpe::{
    optimize_max_sharpe, optimize_max_sharpe_with_settings, MaxSharpeSettings, MaxSharpeSolution,
    DEFAULT_PERIODS_PER_YEAR,
};
