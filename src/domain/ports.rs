use crate::domain::model::{PricingInputs, PricingResult};
use crate::domain::services::optimizer::OptimizerOptions;
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// What the load phase writes besides the recommendation CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    pub filename: String,
    pub write_calibration: bool,
    pub print_table: bool,
    pub bundle_filename: Option<String>,
}

pub trait ConfigProvider: Send + Sync {
    fn sku_daily_path(&self) -> String;
    fn model_elasticity_path(&self) -> String;
    fn sku_costs_path(&self) -> String;
    fn output_path(&self) -> &str;
    fn optimizer_options(&self) -> OptimizerOptions;
    fn load_options(&self) -> LoadOptions;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<PricingInputs>;
    async fn transform(&self, inputs: PricingInputs) -> Result<PricingResult>;
    async fn load(&self, result: PricingResult) -> Result<String>;
}
