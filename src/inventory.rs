//! Stock recommendations derived from multi-horizon demand forecasts

use crate::data::TransactionStore;
use crate::error::{ForecastError, Result};
use crate::predictor::DemandPredictor;
use serde::{Deserialize, Serialize};

/// Forecast horizon the optimizer sums demand over, in days.
pub const DEMAND_HORIZON_DAYS: u32 = 30;

/// Stock health classification relative to predicted demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockStatus {
    Good,
    Warning,
    Critical,
}

impl StockStatus {
    /// Classify stock health against predicted demand: `Critical` below
    /// half the demand, `Warning` below the demand, `Good` otherwise.
    pub fn for_stock(current_stock: f64, predicted_demand: f64) -> Self {
        if current_stock < predicted_demand * 0.5 {
            StockStatus::Critical
        } else if current_stock < predicted_demand {
            StockStatus::Warning
        } else {
            StockStatus::Good
        }
    }
}

/// Derived stock guidance for one product; recomputed on every call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockRecommendation {
    pub product_id: u32,
    pub product_name: String,
    pub current_stock: f64,
    pub predicted_30_day_demand: f64,
    pub recommended_stock_level: f64,
    pub safety_stock: f64,
    /// `f64::INFINITY` when predicted demand is zero
    pub days_of_stock_remaining: f64,
    /// Zero or more advisories, ordered by urgency; may be empty
    pub recommendations: Vec<String>,
    pub status: StockStatus,
}

/// Turns a 30-point prediction series into reorder and safety-stock
/// guidance.
#[derive(Debug)]
pub struct InventoryOptimizer<'a, S: TransactionStore> {
    predictor: &'a DemandPredictor<S>,
}

impl<'a, S: TransactionStore> InventoryOptimizer<'a, S> {
    pub fn new(predictor: &'a DemandPredictor<S>) -> Self {
        Self { predictor }
    }

    /// Derive stock recommendations for a product.
    ///
    /// Issues one single-day prediction per day of the horizon (30
    /// independent calls, not a joint multi-step forecast) and sums the
    /// quantities into the 30-day demand estimate.
    pub fn optimize(&self, product_id: u32) -> Result<StockRecommendation> {
        let product = self
            .predictor
            .store()
            .get_product(product_id)?
            .ok_or(ForecastError::ProductNotFound(product_id))?;

        let mut demand = 0.0;
        for day in 1..=DEMAND_HORIZON_DAYS {
            demand += self.predictor.predict(product_id, day)?.predicted_quantity;
        }

        let current_stock = product.stock_quantity;
        let safety_stock = product.reorder_level.max(0.1 * demand);
        let recommended_stock_level = demand + safety_stock;

        let mut recommendations = Vec::new();
        if current_stock < demand {
            recommendations.push(format!(
                "Urgent reorder needed: predicted demand ({demand:.1}) exceeds current stock ({current_stock})"
            ));
        }
        if current_stock < safety_stock {
            recommendations.push(format!(
                "Stock below safety level: increase to {safety_stock:.1} units"
            ));
        }
        if current_stock > recommended_stock_level * 2.0 {
            recommendations
                .push("Overstock detected: consider reducing orders or promotions".to_string());
        }

        let status = StockStatus::for_stock(current_stock, demand);

        let days_of_stock_remaining = if demand > 0.0 {
            current_stock / (demand / DEMAND_HORIZON_DAYS as f64)
        } else {
            f64::INFINITY
        };

        Ok(StockRecommendation {
            product_id,
            product_name: product.name,
            current_stock,
            predicted_30_day_demand: demand,
            recommended_stock_level,
            safety_stock,
            days_of_stock_remaining,
            recommendations,
            status,
        })
    }
}
