use crate::core::{ConfigProvider, LoadOptions};
use crate::domain::services::optimizer::OptimizerOptions;
use crate::domain::services::price_ending::EndingPolicy;
use crate::utils::error::{PricingError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub pipeline: PipelineConfig,
    pub data: DataConfig,
    pub optimization: OptimizationConfig,
    pub guards: GuardConfig,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    pub dir: Option<String>,
    pub sku_daily: Option<String>,
    pub model_elasticity: Option<String>,
    pub sku_costs: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizationConfig {
    pub price_bounds_pct: Option<(f64, f64)>,
    pub n_grid: Option<usize>,
    pub price_ending: Option<f64>,
    pub enforce_price_ending: Option<bool>,
    pub price_ending_policy: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardConfig {
    pub min_margin_abs: Option<f64>,
    pub require_elasticity_gt_one: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadConfig {
    pub output_path: Option<String>,
    pub filename: Option<String>,
    pub write_calibration: Option<bool>,
    pub print_table: Option<bool>,
    pub compression: Option<CompressionConfig>,
}

/// 有 `[load.compression]` 區段即視為啟用，除非 `enabled = false`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub filename: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub enabled: bool,
    pub json_logs: Option<bool>,
}

fn default_true() -> bool {
    true
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PricingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PricingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PricingError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("data.dir", self.data_dir())?;
        validation::validate_path("load.output_path", self.output_path())?;
        validation::validate_path("load.filename", self.output_filename())?;

        let options = self.optimizer_options();
        validation::validate_positive_number("optimization.n_grid", options.n_grid, 2)?;
        validation::validate_bounds_pct("optimization.price_bounds_pct", options.price_bounds_pct)?;

        if let Some(ending) = options.price_ending {
            validation::validate_finite("optimization.price_ending", ending)?;
            validation::validate_range("optimization.price_ending", ending, 0.0, 0.99)?;
        }

        validation::validate_finite("guards.min_margin_abs", options.min_margin_abs)?;
        validation::validate_range("guards.min_margin_abs", options.min_margin_abs, 0.0, f64::MAX)?;

        if let Some(name) = &self.optimization.price_ending_policy {
            if EndingPolicy::parse(name).is_none() {
                tracing::warn!(
                    "⚠️ Unknown price_ending_policy '{}', falling back to 'down'",
                    name
                );
            }
        }

        Ok(())
    }

    pub fn pipeline_name(&self) -> &str {
        self.pipeline.name.as_deref().unwrap_or("sku-pricer")
    }

    pub fn data_dir(&self) -> &str {
        self.data.dir.as_deref().unwrap_or("data")
    }

    fn data_file(&self, name: &Option<String>, default: &str) -> String {
        let file = name.as_deref().unwrap_or(default);
        PathBuf::from(self.data_dir())
            .join(file)
            .to_string_lossy()
            .into_owned()
    }

    pub fn output_path(&self) -> &str {
        self.load.output_path.as_deref().unwrap_or("./output")
    }

    pub fn output_filename(&self) -> &str {
        self.load
            .filename
            .as_deref()
            .unwrap_or("pricing_recommendations.csv")
    }

    pub fn write_calibration(&self) -> bool {
        self.load.write_calibration.unwrap_or(false)
    }

    pub fn print_table(&self) -> bool {
        self.load.print_table.unwrap_or(true)
    }

    /// ZIP 打包檔名；未啟用時回傳 None
    pub fn bundle_filename(&self) -> Option<&str> {
        self.load
            .compression
            .as_ref()
            .filter(|c| c.enabled)
            .map(|c| c.filename.as_deref().unwrap_or("pricing_bundle.zip"))
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn sku_daily_path(&self) -> String {
        self.data_file(&self.data.sku_daily, "sku_daily.csv")
    }

    fn model_elasticity_path(&self) -> String {
        self.data_file(&self.data.model_elasticity, "model_elasticity.csv")
    }

    fn sku_costs_path(&self) -> String {
        self.data_file(&self.data.sku_costs, "sku_costs.csv")
    }

    fn output_path(&self) -> &str {
        self.output_path()
    }

    fn optimizer_options(&self) -> OptimizerOptions {
        let defaults = OptimizerOptions::default();
        let opt = &self.optimization;

        OptimizerOptions {
            price_bounds_pct: opt.price_bounds_pct.unwrap_or(defaults.price_bounds_pct),
            n_grid: opt.n_grid.unwrap_or(defaults.n_grid),
            price_ending: opt.price_ending.or(defaults.price_ending),
            enforce_price_ending: opt
                .enforce_price_ending
                .unwrap_or(defaults.enforce_price_ending),
            price_ending_policy: opt
                .price_ending_policy
                .as_deref()
                .map(EndingPolicy::from_name)
                .unwrap_or(defaults.price_ending_policy),
            min_margin_abs: self.guards.min_margin_abs.unwrap_or(defaults.min_margin_abs),
            require_elasticity_gt_one: self
                .guards
                .require_elasticity_gt_one
                .unwrap_or(defaults.require_elasticity_gt_one),
        }
    }

    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            filename: self.output_filename().to_string(),
            write_calibration: self.write_calibration(),
            print_table: self.print_table(),
            bundle_filename: self.bundle_filename().map(str::to_string),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
