//! # Sales Forecast
//!
//! A Rust library for monthly product sales forecasting with a small
//! feed-forward regression network.
//!
//! ## Features
//!
//! - CSV ingestion with row-level validation (bad rows dropped, not fatal)
//! - Deterministic categorical + temporal feature encoding
//! - Dense regression network trained in-process (Adam, dropout, L2)
//! - Six-month-ahead quantity forecasts per product
//! - Background training with a cancellable progress event stream
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sales_forecast::PipelineSession;
//!
//! # fn main() -> sales_forecast::Result<()> {
//! let csv = "date,product,quantity\n\
//!            2024-01,Widget,100\n\
//!            2024-02,Widget,120\n\
//!            2024-01,Gadget,50\n";
//!
//! let mut session = PipelineSession::new();
//! session.load_csv(csv)?;
//! session.train()?;
//!
//! for prediction in session.forecast()? {
//!     println!(
//!         "{} {} {}",
//!         prediction.month, prediction.product, prediction.predicted_quantity
//!     );
//! }
//! # Ok(())
//! # }
//! ```

pub mod data;
pub mod encoding;
pub mod error;
pub mod forecast;
pub mod metrics;
pub mod models;
pub mod session;
pub mod task;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{last_observed_month, parse_csv, DataLoader, Observation};
pub use crate::encoding::{encode, EncodingTable, QUANTITY_SCALE};
pub use crate::error::{ForecastError, Result};
pub use crate::forecast::{generate, Prediction, FORECAST_HORIZON};
pub use crate::models::{
    QuantityRegressor, TrainedQuantityModel, TrainingConfig, TrainingProgress,
};
pub use crate::session::PipelineSession;
pub use crate::task::{TrainingHandle, TrainingTask};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
