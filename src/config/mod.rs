pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::toml_config::TomlConfig;
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "sku-pricer")]
#[command(about = "Recommend profit-maximizing prices per SKU from a single price/sales snapshot")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding sku_daily.csv, model_elasticity.csv and sku_costs.csv
    #[arg(long)]
    pub data_dir: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Number of grid points between the price bounds
    #[arg(long)]
    pub n_grid: Option<usize>,

    /// Psychological price ending, e.g. 0.99
    #[arg(long, conflicts_with = "no_price_ending")]
    pub price_ending: Option<f64>,

    /// Disable price-ending snapping
    #[arg(long)]
    pub no_price_ending: bool,

    /// down | up | nearest
    #[arg(long)]
    pub policy: Option<String>,

    /// Minimum absolute margin over unit cost
    #[arg(long)]
    pub min_margin: Option<f64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    pub monitor: Option<bool>,

    /// Show the resolved configuration without processing
    #[arg(long)]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 讀取 TOML (若有指定) 並套用命令列覆蓋設定
    pub fn resolve(&self) -> crate::utils::error::Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut TomlConfig) {
        if let Some(dir) = &self.data_dir {
            config.data.dir = Some(dir.clone());
        }
        if let Some(path) = &self.output_path {
            config.load.output_path = Some(path.clone());
        }
        if let Some(n) = self.n_grid {
            config.optimization.n_grid = Some(n);
        }
        if let Some(ending) = self.price_ending {
            config.optimization.price_ending = Some(ending);
            config.optimization.enforce_price_ending = Some(true);
        }
        if self.no_price_ending {
            config.optimization.enforce_price_ending = Some(false);
        }
        if let Some(policy) = &self.policy {
            config.optimization.price_ending_policy = Some(policy.clone());
        }
        if let Some(margin) = self.min_margin {
            config.guards.min_margin_abs = Some(margin);
        }
        if let Some(enabled) = self.monitor {
            let monitoring = config.monitoring.get_or_insert_with(Default::default);
            monitoring.enabled = enabled;
        }
        if self.log_json {
            let monitoring = config.monitoring.get_or_insert_with(Default::default);
            monitoring.json_logs = Some(true);
        }
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;
    use crate::core::ConfigProvider;
    use crate::domain::services::EndingPolicy;

    #[test]
    fn test_cli_overrides_toml_values() {
        let cli = CliConfig::parse_from([
            "sku-pricer",
            "--data-dir",
            "fixtures",
            "--n-grid",
            "31",
            "--policy",
            "up",
            "--min-margin",
            "2.5",
            "--no-price-ending",
            "--monitor",
            "true",
        ]);
        let mut config = TomlConfig::from_toml_str("[optimization]\nn_grid = 201\n").unwrap();
        cli.apply_overrides(&mut config);

        let options = config.optimizer_options();
        assert_eq!(config.data_dir(), "fixtures");
        assert_eq!(options.n_grid, 31);
        assert_eq!(options.price_ending_policy, EndingPolicy::Up);
        assert_eq!(options.min_margin_abs, 2.5);
        assert_eq!(options.active_ending(), None);
        assert!(config.monitoring_enabled());
    }

    #[test]
    fn test_price_ending_flag_reenables_snapping() {
        let cli = CliConfig::parse_from(["sku-pricer", "--price-ending", "0.49"]);
        let mut config =
            TomlConfig::from_toml_str("[optimization]\nenforce_price_ending = false\n").unwrap();
        cli.apply_overrides(&mut config);

        assert_eq!(config.optimizer_options().active_ending(), Some(0.49));
    }

    #[test]
    fn test_resolve_without_file_uses_defaults() {
        let cli = CliConfig::parse_from(["sku-pricer", "--log-json"]);
        let config = cli.resolve().unwrap();

        assert_eq!(config.optimizer_options().n_grid, 121);
        assert!(config.json_logs());
        assert!(!config.monitoring_enabled());
    }
}
