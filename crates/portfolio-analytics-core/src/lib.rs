pub mod allocation;
pub mod error;
pub mod math;
pub mod series;
pub mod types;

#[cfg(feature = "performance")]
pub mod performance;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use error::PortfolioError;
pub use types::*;

/// Standard result type for all portfolio analytics operations
pub type PortfolioResult<T> = Result<T, PortfolioError>;
