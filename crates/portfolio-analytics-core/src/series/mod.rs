pub mod prices;
pub mod returns;

pub use prices::{align_prices, PriceObservation, PriceSeries};
pub use returns::{compute_portfolio_returns, compute_returns, PortfolioReturnSeries, ReturnSeries};
