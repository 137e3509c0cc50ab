use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

pub struct PricingEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> PricingEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("🚀 Starting pricing run");

        // Extract
        let inputs = self.pipeline.extract().await?;
        tracing::info!(
            "📥 Extracted {} observations, {} elasticities, {} costs",
            inputs.observations.len(),
            inputs.elasticities.len(),
            inputs.costs.len()
        );
        self.monitor.log_stats("extract");

        // Transform
        let result = self.pipeline.transform(inputs).await?;
        let summary = &result.summary;
        tracing::info!(
            "🔧 Priced {} SKUs (lerner: {}, grid: {}), total delta profit {:.2}",
            summary.sku_count,
            summary.lerner_count,
            summary.grid_count,
            summary.total_delta_profit
        );
        self.monitor.log_stats("transform");

        // Load
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("💾 Output saved to: {}", output_path);
        self.monitor.log_stats("load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
