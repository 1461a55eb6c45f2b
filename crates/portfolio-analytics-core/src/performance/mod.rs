pub mod metrics;
pub mod periods;

pub use metrics::{max_drawdown, summarize_performance, total_return, PerformanceSummary};
pub use periods::{
    cumulative_returns, monthly_returns, yearly_returns, CumulativePoint, MonthlyReturn,
    YearlyReturn,
};
