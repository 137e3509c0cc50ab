use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// model -> β
pub type ElasticityMap = HashMap<String, f64>;

/// sku_id -> unit cost
pub type CostMap = HashMap<String, f64>;

/// One daily row of the SKU table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkuObservation {
    pub date: NaiveDate,
    pub sku_id: String,
    pub model: String,
    pub price: f64,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticityRecord {
    pub model: String,
    pub beta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecord {
    pub sku_id: String,
    pub unit_cost: f64,
}

/// Constant-elasticity fit `Q = alpha * P^beta` through the observed point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub sku_id: String,
    pub model: String,
    pub p0: f64,
    pub q0: f64,
    pub beta: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingMethod {
    Lerner,
    Grid,
}

impl fmt::Display for PricingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricingMethod::Lerner => write!(f, "lerner"),
            PricingMethod::Grid => write!(f, "grid"),
        }
    }
}

/// Allowed price range for one SKU, derived from its current price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBounds {
    pub lo: f64,
    pub hi: f64,
}

impl PriceBounds {
    pub fn from_pct(p0: f64, pct: (f64, f64)) -> Self {
        Self {
            lo: p0 * pct.0,
            hi: p0 * pct.1,
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        self.lo <= price && price <= self.hi
    }
}

impl fmt::Display for PriceBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.lo, self.hi)
    }
}

fn serialize_bounds<S: Serializer>(bounds: &PriceBounds, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(bounds)
}

/// One output row. Field order is the column order of the result table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub sku_id: String,
    pub model: String,
    pub beta: f64,
    pub unit_cost: f64,
    pub p0: f64,
    pub q0: f64,
    pub alpha: f64,
    pub price_recommended: f64,
    pub profit_current: f64,
    pub profit_recommended: f64,
    pub delta_profit: f64,
    pub method: PricingMethod,
    #[serde(serialize_with = "serialize_bounds")]
    pub bounds: PriceBounds,
}

/// The three tables read by the extract phase.
#[derive(Debug, Clone, Default)]
pub struct PricingInputs {
    pub observations: Vec<SkuObservation>,
    pub elasticities: ElasticityMap,
    pub costs: CostMap,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    pub sku_count: usize,
    pub lerner_count: usize,
    pub grid_count: usize,
    pub total_delta_profit: f64,
}

impl RunSummary {
    pub fn from_recommendations(recommendations: &[Recommendation]) -> Self {
        let lerner_count = recommendations
            .iter()
            .filter(|r| r.method == PricingMethod::Lerner)
            .count();
        let total_delta_profit = recommendations.iter().map(|r| r.delta_profit).sum::<f64>();

        Self {
            sku_count: recommendations.len(),
            lerner_count,
            grid_count: recommendations.len() - lerner_count,
            total_delta_profit: (total_delta_profit * 100.0).round() / 100.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PricingResult {
    pub calibrations: Vec<Calibration>,
    pub recommendations: Vec<Recommendation>,
    pub csv_output: String,
    pub summary: RunSummary,
}
