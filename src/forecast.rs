//! Future-period forecast generation

use crate::encoding::{EncodingTable, QUANTITY_SCALE};
use crate::error::{ForecastError, Result};
use crate::models::TrainedQuantityModel;
use crate::utils::months_after;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of future months predicted per product
pub const FORECAST_HORIZON: usize = 6;

/// One forecast row consumed by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    /// Forecast month, first-of-month
    pub month: NaiveDate,
    /// Product identifier
    pub product: String,
    /// Predicted quantity, clamped to a non-negative whole number
    pub predicted_quantity: u64,
}

/// Generate six months of predictions per product.
///
/// Months continue from `last_observed` with correct year rollover. The
/// synthetic time index extends the training scale: offset `k` maps to
/// `(observed_months + k) / (observed_months + 6)`, so the sixth month lands
/// on exactly 1.0. Rows are grouped by product in first-seen order, ascending
/// month within each group; display sorting is the presentation layer's job.
pub fn generate(
    model: &TrainedQuantityModel,
    table: &EncodingTable,
    last_observed: NaiveDate,
) -> Result<Vec<Prediction>> {
    if table.products().is_empty() {
        return Err(ForecastError::Encoding(
            "encoding table has no products".to_string(),
        ));
    }

    let months = months_after(last_observed, FORECAST_HORIZON);
    let observed = table.months().len() as f64;

    let mut predictions = Vec::with_capacity(table.products().len() * FORECAST_HORIZON);
    for product in table.products() {
        let code = table.product_code(product).ok_or_else(|| {
            ForecastError::Encoding(format!("product '{product}' missing from encoding table"))
        })?;

        for (offset, month) in months.iter().enumerate() {
            let time_index =
                (observed + (offset + 1) as f64) / (observed + FORECAST_HORIZON as f64);
            let raw = model.predict([time_index, code]);
            let predicted_quantity = (raw * QUANTITY_SCALE).round().max(0.0) as u64;
            predictions.push(Prediction {
                month: *month,
                product: product.clone(),
                predicted_quantity,
            });
        }
    }

    Ok(predictions)
}
