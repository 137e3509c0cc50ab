//! Single-point constant-elasticity demand model: `Q = alpha * P^beta`.

use crate::domain::model::{Calibration, ElasticityMap, SkuObservation};
use crate::utils::error::{PricingError, Result};
use std::collections::HashMap;

/// Alpha used when the observed point cannot anchor a curve.
pub const ALPHA_GUARD: f64 = 1e-6;

/// Profit reported for non-positive prices so a search never picks them.
pub const INFEASIBLE_PROFIT: f64 = -1e18;

/// Solves `alpha = q0 / p0^beta` for one observed point.
///
/// A non-positive price or quantity collapses demand to [`ALPHA_GUARD`]
/// instead of failing.
pub fn alpha_from_point(q0: f64, p0: f64, beta: f64) -> f64 {
    if p0 <= 0.0 || q0 <= 0.0 {
        return ALPHA_GUARD;
    }
    q0 / p0.powf(beta)
}

/// `pi(P) = (P - cost) * alpha * P^beta`
pub fn profit_at_price(p: f64, alpha: f64, beta: f64, cost: f64) -> f64 {
    if p <= 0.0 {
        return INFEASIBLE_PROFIT;
    }
    let q = alpha * p.powf(beta);
    (p - cost) * q
}

/// Keeps one row per SKU: the latest date wins, later rows win on equal dates.
/// Output order is the order in which each SKU first appears.
pub fn snapshot_per_sku(observations: &[SkuObservation]) -> Vec<SkuObservation> {
    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut snapshot: Vec<SkuObservation> = Vec::new();

    for obs in observations {
        match position.get(obs.sku_id.as_str()) {
            Some(&idx) => {
                if obs.date >= snapshot[idx].date {
                    snapshot[idx] = obs.clone();
                }
            }
            None => {
                position.insert(obs.sku_id.as_str(), snapshot.len());
                snapshot.push(obs.clone());
            }
        }
    }

    snapshot
}

/// Calibrates alpha for every snapshot row, in input order.
pub fn estimate_alpha_per_sku(
    snapshot: &[SkuObservation],
    elasticities: &ElasticityMap,
) -> Result<Vec<Calibration>> {
    snapshot
        .iter()
        .map(|obs| {
            let beta = *elasticities.get(&obs.model).ok_or_else(|| {
                PricingError::MissingElasticity {
                    sku_id: obs.sku_id.clone(),
                    model: obs.model.clone(),
                }
            })?;

            Ok(Calibration {
                sku_id: obs.sku_id.clone(),
                model: obs.model.clone(),
                p0: obs.price,
                q0: obs.sales,
                beta,
                alpha: alpha_from_point(obs.sales, obs.price, beta),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(date: &str, sku: &str, model: &str, price: f64, sales: f64) -> SkuObservation {
        SkuObservation {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            sku_id: sku.to_string(),
            model: model.to_string(),
            price,
            sales,
        }
    }

    #[test]
    fn test_alpha_reproduces_observed_point() {
        let alpha = alpha_from_point(50.0, 100.0, -2.5);
        assert!((alpha - 5_000_000.0).abs() < 1e-3);
        assert!((alpha * 100f64.powf(-2.5) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_alpha_guard_on_degenerate_point() {
        assert_eq!(alpha_from_point(0.0, 10.0, -2.0), ALPHA_GUARD);
        assert_eq!(alpha_from_point(10.0, 0.0, -2.0), ALPHA_GUARD);
        assert_eq!(alpha_from_point(10.0, -3.0, -2.0), ALPHA_GUARD);
    }

    #[test]
    fn test_alpha_positive_for_fractional_beta() {
        for beta in [-3.7, -1.25, -0.4, 0.3, 1.8] {
            let alpha = alpha_from_point(12.0, 19.99, beta);
            assert!(alpha > 0.0 && alpha.is_finite(), "beta={} alpha={}", beta, alpha);
        }
    }

    #[test]
    fn test_profit_at_price() {
        let alpha = alpha_from_point(50.0, 100.0, -2.5);
        // (100 - 40) * 50
        assert!((profit_at_price(100.0, alpha, -2.5, 40.0) - 3000.0).abs() < 1e-6);
        assert!(profit_at_price(30.0, alpha, -2.5, 40.0) < 0.0);
    }

    #[test]
    fn test_profit_sentinel_for_non_positive_price() {
        assert_eq!(profit_at_price(0.0, 1.0, -2.0, 1.0), INFEASIBLE_PROFIT);
        assert_eq!(profit_at_price(-5.0, 1.0, -2.0, 1.0), INFEASIBLE_PROFIT);
    }

    #[test]
    fn test_snapshot_keeps_latest_row() {
        let rows = vec![
            obs("2024-03-01", "A", "m1", 10.0, 5.0),
            obs("2024-03-01", "B", "m1", 20.0, 3.0),
            obs("2024-03-03", "A", "m1", 11.0, 4.0),
            obs("2024-03-02", "A", "m1", 12.0, 2.0),
            obs("2024-03-01", "B", "m1", 21.0, 6.0),
        ];

        let snapshot = snapshot_per_sku(&rows);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].sku_id, "A");
        assert_eq!(snapshot[0].price, 11.0);
        // equal dates: later row wins
        assert_eq!(snapshot[1].price, 21.0);
    }

    #[test]
    fn test_estimate_alpha_per_sku() {
        let elasticities: ElasticityMap =
            [("m1".to_string(), -2.0), ("m2".to_string(), -1.5)].into_iter().collect();
        let rows = vec![
            obs("2024-03-01", "A", "m1", 10.0, 100.0),
            obs("2024-03-01", "B", "m2", 4.0, 0.0),
        ];

        let calib = estimate_alpha_per_sku(&rows, &elasticities).unwrap();
        assert_eq!(calib.len(), 2);
        assert_eq!(calib[0].beta, -2.0);
        assert!((calib[0].alpha - 10_000.0).abs() < 1e-9);
        assert_eq!(calib[1].alpha, ALPHA_GUARD);
    }

    #[test]
    fn test_missing_elasticity_is_an_error() {
        let elasticities = ElasticityMap::new();
        let rows = vec![obs("2024-03-01", "A", "ghost", 10.0, 1.0)];

        let err = estimate_alpha_per_sku(&rows, &elasticities).unwrap_err();
        assert!(matches!(
            err,
            PricingError::MissingElasticity { ref model, .. } if model == "ghost"
        ));
    }
}
