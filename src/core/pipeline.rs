use crate::adapters::tables;
use crate::core::{ConfigProvider, Pipeline, PricingInputs, PricingResult, Storage};
use crate::domain::model::RunSummary;
use crate::domain::services::{estimate_alpha_per_sku, recommend_prices, snapshot_per_sku};
use crate::utils::error::Result;
use std::io::Write;
use std::path::Path;
use zip::write::{FileOptions, ZipWriter};

const CALIBRATION_FILENAME: &str = "calibration.json";
const SUMMARY_FILENAME: &str = "summary.json";

/// Reads the three CSV tables, prices every SKU and writes the result table.
pub struct CsvPricingPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> CsvPricingPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn output_file(&self, name: &str) -> String {
        Path::new(self.config.output_path())
            .join(name)
            .to_string_lossy()
            .into_owned()
    }

    fn build_bundle(&self, csv_name: &str, result: &PricingResult) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

        zip.start_file::<_, ()>(csv_name, FileOptions::default())?;
        zip.write_all(result.csv_output.as_bytes())?;

        zip.start_file::<_, ()>(CALIBRATION_FILENAME, FileOptions::default())?;
        zip.write_all(serde_json::to_string_pretty(&result.calibrations)?.as_bytes())?;

        zip.start_file::<_, ()>(SUMMARY_FILENAME, FileOptions::default())?;
        zip.write_all(serde_json::to_string_pretty(&result.summary)?.as_bytes())?;

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for CsvPricingPipeline<S, C> {
    async fn extract(&self) -> Result<PricingInputs> {
        let daily_path = self.config.sku_daily_path();
        let elasticity_path = self.config.model_elasticity_path();
        let costs_path = self.config.sku_costs_path();

        tracing::debug!("Loading SKU observations from {}", daily_path);
        let observations = tables::parse_sku_daily(&self.storage.read_file(&daily_path).await?)?;

        tracing::debug!("Loading model elasticities from {}", elasticity_path);
        let elasticities =
            tables::parse_model_elasticity(&self.storage.read_file(&elasticity_path).await?)?;

        tracing::debug!("Loading unit costs from {}", costs_path);
        let costs = tables::parse_sku_costs(&self.storage.read_file(&costs_path).await?)?;

        Ok(PricingInputs {
            observations,
            elasticities,
            costs,
        })
    }

    async fn transform(&self, inputs: PricingInputs) -> Result<PricingResult> {
        let options = self.config.optimizer_options();

        // 每個 SKU 只保留一筆快照
        let snapshot = snapshot_per_sku(&inputs.observations);
        if snapshot.len() < inputs.observations.len() {
            tracing::info!(
                "📋 Reduced {} daily rows to {} SKU snapshots",
                inputs.observations.len(),
                snapshot.len()
            );
        }

        let calibrations = estimate_alpha_per_sku(&snapshot, &inputs.elasticities)?;
        let mut recommendations = recommend_prices(&calibrations, &inputs.costs, &options)?;

        for rec in &recommendations {
            tracing::debug!(
                sku_id = %rec.sku_id,
                method = %rec.method,
                p0 = rec.p0,
                price = rec.price_recommended,
                delta_profit = rec.delta_profit,
                "priced sku"
            );
        }

        // 依利潤增幅由高到低排序 (穩定排序，同值維持輸入順序)
        recommendations.sort_by(|a, b| b.delta_profit.total_cmp(&a.delta_profit));

        let csv_output = tables::write_recommendations_csv(&recommendations)?;
        let summary = RunSummary::from_recommendations(&recommendations);

        Ok(PricingResult {
            calibrations,
            recommendations,
            csv_output,
            summary,
        })
    }

    async fn load(&self, result: PricingResult) -> Result<String> {
        let load = self.config.load_options();
        let csv_path = self.output_file(&load.filename);

        self.storage
            .write_file(&csv_path, result.csv_output.as_bytes())
            .await?;
        tracing::info!("📄 Recommendations written: {}", csv_path);

        if load.write_calibration {
            let calibration_path = self.output_file(CALIBRATION_FILENAME);
            let json = serde_json::to_string_pretty(&result.calibrations)?;
            self.storage
                .write_file(&calibration_path, json.as_bytes())
                .await?;
            tracing::info!("📄 Calibration written: {}", calibration_path);
        }

        if let Some(bundle_name) = &load.bundle_filename {
            let bundle_path = self.output_file(bundle_name);
            let bundle = self.build_bundle(&load.filename, &result)?;
            self.storage.write_file(&bundle_path, &bundle).await?;
            tracing::info!("📦 Bundle written: {}", bundle_path);
        }

        if load.print_table {
            println!("{}", tables::render_table(&result.recommendations));
        }

        Ok(csv_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::TomlConfig;
    use crate::domain::model::PricingMethod;
    use crate::utils::error::PricingError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn put(&self, path: &str, data: &str) {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.as_bytes().to_vec());
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                PricingError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    fn config(extra: &str) -> TomlConfig {
        let content = format!(
            "[data]\ndir = \"in\"\n\n[load]\noutput_path = \"out\"\nprint_table = false\n{}",
            extra
        );
        TomlConfig::from_toml_str(&content).unwrap()
    }

    fn path(dir: &str, file: &str) -> String {
        Path::new(dir).join(file).to_string_lossy().into_owned()
    }

    async fn seeded_storage() -> MockStorage {
        let storage = MockStorage::new();
        storage
            .put(
                &path("in", "sku_daily.csv"),
                "date,sku_id,model,price,sales\n\
                 2024-06-01,SKU-A,M-ELASTIC,100,50\n\
                 2024-06-01,SKU-B,M-ELASTIC,100,50\n\
                 2024-06-01,SKU-C,M-FLAT,20,200\n\
                 2024-05-31,SKU-A,M-ELASTIC,90,60\n",
            )
            .await;
        storage
            .put(
                &path("in", "model_elasticity.csv"),
                "model,beta\nM-ELASTIC,-2.5\nM-FLAT,-0.7\n",
            )
            .await;
        storage
            .put(
                &path("in", "sku_costs.csv"),
                "sku_id,unit_cost\nSKU-A,40\nSKU-B,70\nSKU-C,8\n",
            )
            .await;
        storage
    }

    #[tokio::test]
    async fn test_extract_reads_all_tables() {
        let storage = seeded_storage().await;
        let pipeline = CsvPricingPipeline::new(storage, config(""));

        let inputs = pipeline.extract().await.unwrap();
        assert_eq!(inputs.observations.len(), 4);
        assert_eq!(inputs.elasticities.len(), 2);
        assert_eq!(inputs.costs["SKU-B"], 70.0);
    }

    #[tokio::test]
    async fn test_transform_prices_every_sku() {
        let storage = seeded_storage().await;
        let pipeline = CsvPricingPipeline::new(storage, config(""));

        let inputs = pipeline.extract().await.unwrap();
        let result = pipeline.transform(inputs).await.unwrap();

        assert_eq!(result.calibrations.len(), 3);
        assert_eq!(result.recommendations.len(), 3);

        let by_sku: HashMap<&str, _> = result
            .recommendations
            .iter()
            .map(|r| (r.sku_id.as_str(), r))
            .collect();
        assert_eq!(by_sku["SKU-A"].method, PricingMethod::Grid);
        assert_eq!(by_sku["SKU-A"].price_recommended, 85.99);
        assert_eq!(by_sku["SKU-B"].method, PricingMethod::Lerner);
        assert_eq!(by_sku["SKU-B"].price_recommended, 115.99);
        assert_eq!(by_sku["SKU-C"].method, PricingMethod::Grid);

        assert!(result
            .recommendations
            .windows(2)
            .all(|w| w[0].delta_profit >= w[1].delta_profit));
        assert_eq!(result.summary.lerner_count, 1);
        assert_eq!(result.summary.grid_count, 2);
    }

    #[tokio::test]
    async fn test_transform_fails_on_missing_cost() {
        let storage = seeded_storage().await;
        storage
            .put(&path("in", "sku_costs.csv"), "sku_id,unit_cost\nSKU-A,40\n")
            .await;
        let pipeline = CsvPricingPipeline::new(storage, config(""));

        let inputs = pipeline.extract().await.unwrap();
        let err = pipeline.transform(inputs).await.unwrap_err();
        assert!(matches!(err, PricingError::MissingCost { .. }));
    }

    #[tokio::test]
    async fn test_transform_fails_on_missing_elasticity() {
        let storage = seeded_storage().await;
        storage
            .put(&path("in", "model_elasticity.csv"), "model,beta\nM-ELASTIC,-2.5\n")
            .await;
        let pipeline = CsvPricingPipeline::new(storage, config(""));

        let inputs = pipeline.extract().await.unwrap();
        let err = pipeline.transform(inputs).await.unwrap_err();
        assert!(matches!(
            err,
            PricingError::MissingElasticity { ref model, .. } if model == "M-FLAT"
        ));
    }

    #[tokio::test]
    async fn test_transform_is_idempotent() {
        let storage = seeded_storage().await;
        let pipeline = CsvPricingPipeline::new(storage, config(""));

        let first = pipeline
            .transform(pipeline.extract().await.unwrap())
            .await
            .unwrap();
        let second = pipeline
            .transform(pipeline.extract().await.unwrap())
            .await
            .unwrap();

        assert_eq!(first.csv_output, second.csv_output);
        assert_eq!(first.recommendations, second.recommendations);
    }

    #[tokio::test]
    async fn test_load_writes_csv_calibration_and_bundle() {
        let storage = seeded_storage().await;
        let pipeline = CsvPricingPipeline::new(
            storage.clone(),
            config("write_calibration = true\n\n[load.compression]\nenabled = true\n"),
        );

        let result = pipeline
            .transform(pipeline.extract().await.unwrap())
            .await
            .unwrap();
        let output = pipeline.load(result).await.unwrap();

        assert_eq!(output, path("out", "pricing_recommendations.csv"));
        let csv = storage.get_file(&output).await.unwrap();
        assert!(String::from_utf8(csv).unwrap().starts_with("sku_id,model,beta"));

        let calibration = storage
            .get_file(&path("out", "calibration.json"))
            .await
            .unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&calibration).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 3);

        let bundle = storage
            .get_file(&path("out", "pricing_bundle.zip"))
            .await
            .unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bundle)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&"pricing_recommendations.csv"));
        assert!(names.contains(&"calibration.json"));
        assert!(names.contains(&"summary.json"));
    }
}
