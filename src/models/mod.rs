//! Quantity regression model: configuration, progress events, network

use serde::{Deserialize, Serialize};

pub mod layers;
pub mod optimizer;
pub mod regressor;

pub use regressor::{QuantityRegressor, TrainedQuantityModel, INPUT_FEATURES};

/// Training hyperparameters.
///
/// The defaults are the pipeline's fixed settings; tests shrink `epochs` to
/// keep runs short.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of passes over the training rows
    pub epochs: usize,
    /// Rows per gradient update
    pub batch_size: usize,
    /// Adam learning rate
    pub learning_rate: f64,
    /// Fraction of rows reserved, from the tail, for validation-loss reporting
    pub validation_split: f64,
    /// Hidden layer widths
    pub hidden_sizes: [usize; 2],
    /// Dropout rate applied after each hidden layer during training
    pub dropout: f64,
    /// L2 penalty on the hidden layers' weights
    pub l2_penalty: f64,
    /// Emit a progress event after every this many completed epochs
    pub progress_every: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 150,
            batch_size: 32,
            learning_rate: 0.001,
            validation_split: 0.2,
            hidden_sizes: [64, 32],
            dropout: 0.2,
            l2_penalty: 0.01,
            progress_every: 10,
        }
    }
}

/// Snapshot of a training run after a reported epoch
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingProgress {
    /// Completed epoch, counted from 1
    pub epoch: usize,
    /// Mean training loss over the epoch's batches
    pub loss: f64,
    /// Loss over the held-out rows, when any were reserved
    pub val_loss: Option<f64>,
}
