pub mod demand;
pub mod optimizer;
pub mod price_ending;

pub use demand::{alpha_from_point, estimate_alpha_per_sku, profit_at_price, snapshot_per_sku};
pub use optimizer::{choose_price, lerner_price, recommend_prices, OptimizerOptions};
pub use price_ending::{clamp, round_to_price_ending, EndingPolicy};
