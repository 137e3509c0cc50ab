pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::{etl::PricingEngine, pipeline::CsvPricingPipeline};
pub use domain::model::{Calibration, PricingMethod, Recommendation, SkuObservation};
pub use domain::services::OptimizerOptions;
pub use utils::error::{PricingError, Result};
