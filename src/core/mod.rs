pub mod etl;
pub mod pipeline;

pub use crate::domain::model::{PricingInputs, PricingResult};
pub use crate::domain::ports::{ConfigProvider, LoadOptions, Pipeline, Storage};
pub use crate::utils::error::Result;
