//! CSV readers for the three input tables and writers for the result table.

use crate::domain::model::{
    CostMap, CostRecord, ElasticityMap, ElasticityRecord, Recommendation, SkuObservation,
};
use crate::utils::error::{PricingError, Result};
use std::fmt::Write as _;

fn reader(data: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data)
}

/// `date,sku_id,model,price,sales`
pub fn parse_sku_daily(data: &[u8]) -> Result<Vec<SkuObservation>> {
    let mut rdr = reader(data);
    let mut rows = Vec::new();
    for row in rdr.deserialize::<SkuObservation>() {
        rows.push(row?);
    }
    Ok(rows)
}

/// `model,beta`. A repeated model keeps its last value.
pub fn parse_model_elasticity(data: &[u8]) -> Result<ElasticityMap> {
    let mut rdr = reader(data);
    let mut map = ElasticityMap::new();
    for row in rdr.deserialize::<ElasticityRecord>() {
        let row = row?;
        if let Some(previous) = map.insert(row.model.clone(), row.beta) {
            tracing::warn!(
                "⚠️ Duplicate elasticity for model {}: {} replaced by {}",
                row.model,
                previous,
                row.beta
            );
        }
    }
    Ok(map)
}

/// `sku_id,unit_cost`. A repeated SKU keeps its last value.
pub fn parse_sku_costs(data: &[u8]) -> Result<CostMap> {
    let mut rdr = reader(data);
    let mut map = CostMap::new();
    for row in rdr.deserialize::<CostRecord>() {
        let row = row?;
        if let Some(previous) = map.insert(row.sku_id.clone(), row.unit_cost) {
            tracing::warn!(
                "⚠️ Duplicate unit cost for sku {}: {} replaced by {}",
                row.sku_id,
                previous,
                row.unit_cost
            );
        }
    }
    Ok(map)
}

pub fn write_recommendations_csv(recommendations: &[Recommendation]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for rec in recommendations {
        wtr.serialize(rec)?;
    }
    let bytes = wtr.into_inner().map_err(|e| PricingError::ProcessingError {
        message: format!("failed to flush CSV writer: {}", e),
    })?;
    String::from_utf8(bytes).map_err(|e| PricingError::ProcessingError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

const TABLE_HEADERS: [&str; 13] = [
    "sku_id",
    "model",
    "beta",
    "unit_cost",
    "p0",
    "q0",
    "alpha",
    "price_recommended",
    "profit_current",
    "profit_recommended",
    "delta_profit",
    "method",
    "bounds",
];

/// Right-aligned plain-text table for the console.
pub fn render_table(recommendations: &[Recommendation]) -> String {
    let rows: Vec<[String; 13]> = recommendations
        .iter()
        .map(|r| {
            [
                r.sku_id.clone(),
                r.model.clone(),
                r.beta.to_string(),
                r.unit_cost.to_string(),
                r.p0.to_string(),
                r.q0.to_string(),
                format!("{:.6}", r.alpha),
                format!("{:.2}", r.price_recommended),
                format!("{:.2}", r.profit_current),
                format!("{:.2}", r.profit_recommended),
                format!("{:.2}", r.delta_profit),
                r.method.to_string(),
                r.bounds.to_string(),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = TABLE_HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(h, w)| format!("{:>w$}", h, w = w))
        .collect();
    let _ = writeln!(out, "{}", header.join(" "));

    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(widths.iter())
            .map(|(cell, w)| format!("{:>w$}", cell, w = w))
            .collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }

    out
}
