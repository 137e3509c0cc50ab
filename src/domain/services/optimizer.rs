//! Price optimizer.
//!
//! Each SKU gets the closed-form Lerner price when it is applicable and
//! survives the feasibility checks both before and after price-ending
//! snapping; otherwise a bounded grid search over snapped candidates picks the
//! most profitable legal price. Every branch ends in a concrete price.

use crate::domain::model::{
    Calibration, CostMap, PriceBounds, PricingMethod, Recommendation,
};
use crate::domain::services::demand::profit_at_price;
use crate::domain::services::price_ending::{clamp, round2, round_to_price_ending, EndingPolicy};
use crate::utils::error::{PricingError, Result};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerOptions {
    /// (lo, hi) multipliers of the current price.
    pub price_bounds_pct: (f64, f64),
    pub n_grid: usize,
    pub price_ending: Option<f64>,
    pub enforce_price_ending: bool,
    pub price_ending_policy: EndingPolicy,
    /// Minimum absolute margin over unit cost.
    pub min_margin_abs: f64,
    pub require_elasticity_gt_one: bool,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            price_bounds_pct: (0.85, 1.35),
            n_grid: 121,
            price_ending: Some(0.99),
            enforce_price_ending: true,
            price_ending_policy: EndingPolicy::Down,
            min_margin_abs: 0.0,
            require_elasticity_gt_one: true,
        }
    }
}

impl OptimizerOptions {
    /// The ending in effect, if snapping is enabled.
    pub fn active_ending(&self) -> Option<f64> {
        if self.enforce_price_ending {
            self.price_ending
        } else {
            None
        }
    }

    fn snap(&self, price: f64) -> f64 {
        match self.active_ending() {
            Some(ending) => round_to_price_ending(price, ending, self.price_ending_policy),
            None => price,
        }
    }

    fn is_feasible(&self, price: f64, cost: f64, bounds: &PriceBounds) -> bool {
        price >= cost + self.min_margin_abs && bounds.contains(price)
    }
}

/// Outcome of the per-SKU decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDecision {
    pub price: f64,
    pub method: PricingMethod,
    pub bounds: PriceBounds,
}

/// Lerner rule: `(P - C) / P = -1 / beta`, so `P* = |beta| / (|beta| - 1) * C`.
/// `None` for inelastic demand (`|beta| <= 1`).
pub fn lerner_price(cost: f64, beta: f64) -> Option<f64> {
    let b = beta.abs();
    if b <= 1.0 {
        return None;
    }
    Some(b / (b - 1.0) * cost)
}

/// `n` evenly spaced points over `[lo, hi]`, endpoints included exactly.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { hi } else { lo + step * i as f64 })
                .collect()
        }
    }
}

/// Snapped, deduplicated and filtered grid prices in scan order.
pub fn grid_candidates(cost: f64, bounds: &PriceBounds, options: &OptimizerOptions) -> Vec<f64> {
    let mut seen = HashSet::new();

    linspace(bounds.lo, bounds.hi, options.n_grid)
        .into_iter()
        .map(|p| match options.active_ending() {
            Some(ending) => round_to_price_ending(p, ending, options.price_ending_policy),
            None => round2(p),
        })
        .filter(|p| seen.insert(p.to_bits()))
        .filter(|&p| options.is_feasible(p, cost, bounds))
        .collect()
}

/// Most profitable grid price; the first candidate wins exact ties.
///
/// Falls back to the cheapest cost-covering price inside the bounds when no
/// candidate survives filtering.
pub fn grid_search_best_price(
    alpha: f64,
    beta: f64,
    cost: f64,
    bounds: &PriceBounds,
    options: &OptimizerOptions,
) -> f64 {
    let mut best: Option<(f64, f64)> = None;

    for p in grid_candidates(cost, bounds, options) {
        let profit = profit_at_price(p, alpha, beta, cost);
        match best {
            Some((_, best_profit)) if profit <= best_profit => {}
            _ => best = Some((p, profit)),
        }
    }

    match best {
        Some((price, _)) => price,
        None => {
            let floor = (cost + options.min_margin_abs).max(bounds.lo);
            options.snap(clamp(floor, bounds.lo, bounds.hi))
        }
    }
}

/// Runs the Lerner-then-grid decision for one calibrated SKU.
pub fn choose_price(calibration: &Calibration, cost: f64, options: &OptimizerOptions) -> PriceDecision {
    let bounds = PriceBounds::from_pct(calibration.p0, options.price_bounds_pct);
    let beta = calibration.beta;

    let lerner = lerner_price(cost, beta)
        .filter(|_| !options.require_elasticity_gt_one || beta.abs() > 1.0)
        .filter(|&p| options.is_feasible(p, cost, &bounds))
        .map(|p| options.snap(p))
        .filter(|&p| options.is_feasible(p, cost, &bounds));

    match lerner {
        Some(price) => PriceDecision {
            price,
            method: PricingMethod::Lerner,
            bounds,
        },
        None => PriceDecision {
            price: grid_search_best_price(calibration.alpha, beta, cost, &bounds, options),
            method: PricingMethod::Grid,
            bounds,
        },
    }
}

/// Builds the recommendation row for one SKU.
pub fn recommend(calibration: &Calibration, cost: f64, options: &OptimizerOptions) -> Recommendation {
    let decision = choose_price(calibration, cost, options);
    let (alpha, beta) = (calibration.alpha, calibration.beta);

    let profit_current = profit_at_price(calibration.p0, alpha, beta, cost);
    let profit_recommended = profit_at_price(decision.price, alpha, beta, cost);

    Recommendation {
        sku_id: calibration.sku_id.clone(),
        model: calibration.model.clone(),
        beta,
        unit_cost: cost,
        p0: calibration.p0,
        q0: calibration.q0,
        alpha,
        price_recommended: round2(decision.price),
        profit_current: round2(profit_current),
        profit_recommended: round2(profit_recommended),
        delta_profit: round2(profit_recommended - profit_current),
        method: decision.method,
        bounds: decision.bounds,
    }
}

/// Joins unit costs onto the calibrations and recommends a price per SKU.
///
/// A SKU without a cost row fails the whole run with [`PricingError::MissingCost`].
pub fn recommend_prices(
    calibrations: &[Calibration],
    costs: &CostMap,
    options: &OptimizerOptions,
) -> Result<Vec<Recommendation>> {
    calibrations
        .iter()
        .map(|calibration| {
            let cost = *costs
                .get(&calibration.sku_id)
                .ok_or_else(|| PricingError::MissingCost {
                    sku_id: calibration.sku_id.clone(),
                })?;
            Ok(recommend(calibration, cost, options))
        })
        .collect()
}
