//! Deterministic feature encoding for sales observations

use crate::data::Observation;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Fixed divisor applied to quantities before training
pub const QUANTITY_SCALE: f64 = 1000.0;

/// Deterministic mapping from products and months to model features.
///
/// Built once alongside the training tensors and threaded into forecast
/// generation, so predictions use exactly the mapping the model was fitted
/// against. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingTable {
    products: Vec<String>,
    months: Vec<NaiveDate>,
    product_index: HashMap<String, usize>,
}

impl EncodingTable {
    fn from_observations(observations: &[Observation]) -> Self {
        let mut products = Vec::new();
        let mut product_index = HashMap::new();
        for observation in observations {
            if !product_index.contains_key(&observation.product) {
                product_index.insert(observation.product.clone(), products.len());
                products.push(observation.product.clone());
            }
        }

        let mut months: Vec<NaiveDate> =
            observations.iter().map(|observation| observation.month).collect();
        months.sort_unstable();
        months.dedup();

        Self {
            products,
            months,
            product_index,
        }
    }

    /// Distinct products in first-seen order
    pub fn products(&self) -> &[String] {
        &self.products
    }

    /// Distinct observed months, ascending
    pub fn months(&self) -> &[NaiveDate] {
        &self.months
    }

    /// Scalar code for a product: first-seen index over product count.
    ///
    /// The first product maps to 0 regardless of cardinality and no code
    /// reaches 1.0.
    pub fn product_code(&self, product: &str) -> Option<f64> {
        let index = *self.product_index.get(product)?;
        Some(index as f64 / self.products.len() as f64)
    }

    /// Normalized time index for an observed month, in [0, 1)
    pub fn time_index(&self, month: NaiveDate) -> Option<f64> {
        let index = self.months.binary_search(&month).ok()?;
        Some(index as f64 / self.months.len() as f64)
    }
}

/// Encode observations into training tensors plus the table that produced
/// them.
///
/// Feature rows are `[time_index, product_code]`; targets are quantities
/// scaled by [`QUANTITY_SCALE`]. Duplicate (month, product) pairs each keep
/// their own row.
pub fn encode(
    observations: &[Observation],
) -> Result<(Array2<f64>, Array1<f64>, EncodingTable)> {
    if observations.is_empty() {
        return Err(ForecastError::Encoding("empty observation set".to_string()));
    }

    let table = EncodingTable::from_observations(observations);

    let mut features = Array2::zeros((observations.len(), 2));
    let mut targets = Array1::zeros(observations.len());
    for (row, observation) in observations.iter().enumerate() {
        // Lookups cannot miss: the table was just built from these rows
        features[[row, 0]] = table.time_index(observation.month).unwrap_or_default();
        features[[row, 1]] = table.product_code(&observation.product).unwrap_or_default();
        targets[row] = observation.quantity / QUANTITY_SCALE;
    }

    Ok((features, targets, table))
}
