//! Feed-forward quantity regressor: training and inference

use crate::error::{ForecastError, Result};
use crate::metrics;
use crate::models::layers::{Activation, DenseLayer};
use crate::models::optimizer::Adam;
use crate::models::{TrainingConfig, TrainingProgress};
use crate::utils::split_validation;
use ndarray::{s, Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

/// Input width: normalized time index and product code
pub const INPUT_FEATURES: usize = 2;

/// Untrained quantity regression network.
///
/// Architecture is fixed: 2 inputs, two ReLU hidden layers with dropout and
/// an L2 weight penalty, one linear output.
#[derive(Debug, Clone)]
pub struct QuantityRegressor {
    config: TrainingConfig,
}

impl QuantityRegressor {
    /// Create a regressor after validating the training configuration
    pub fn new(config: TrainingConfig) -> Result<Self> {
        if config.epochs == 0 || config.batch_size == 0 {
            return Err(ForecastError::Validation(
                "epochs and batch size must be at least 1".to_string(),
            ));
        }
        if config.learning_rate <= 0.0 || !config.learning_rate.is_finite() {
            return Err(ForecastError::Validation(
                "learning rate must be a positive finite number".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&config.validation_split) {
            return Err(ForecastError::Validation(
                "validation split must be in [0, 1)".to_string(),
            ));
        }
        if !(0.0..1.0).contains(&config.dropout) {
            return Err(ForecastError::Validation(
                "dropout must be in [0, 1)".to_string(),
            ));
        }
        if config.progress_every == 0 {
            return Err(ForecastError::Validation(
                "progress interval must be at least 1".to_string(),
            ));
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on encoded tensors, reporting progress through `observer`
    pub fn fit<F>(
        &self,
        features: &Array2<f64>,
        targets: &Array1<f64>,
        observer: F,
    ) -> Result<TrainedQuantityModel>
    where
        F: FnMut(TrainingProgress),
    {
        self.fit_until(features, targets, observer, || false)
    }

    /// Train, aborting with [`ForecastError::Cancelled`] when `cancelled`
    /// turns true at an epoch boundary.
    ///
    /// Progress is reported after every `progress_every`-th completed epoch;
    /// a non-finite loss aborts the run instead of producing a degenerate
    /// model.
    pub fn fit_until<F, C>(
        &self,
        features: &Array2<f64>,
        targets: &Array1<f64>,
        mut observer: F,
        cancelled: C,
    ) -> Result<TrainedQuantityModel>
    where
        F: FnMut(TrainingProgress),
        C: Fn() -> bool,
    {
        let config = &self.config;
        if features.nrows() != targets.len() {
            return Err(ForecastError::Training(format!(
                "feature rows ({}) do not match target rows ({})",
                features.nrows(),
                targets.len()
            )));
        }
        if features.ncols() != INPUT_FEATURES {
            return Err(ForecastError::Training(format!(
                "expected {INPUT_FEATURES} feature columns, got {}",
                features.ncols()
            )));
        }
        if features.nrows() == 0 {
            return Err(ForecastError::Training("no training rows".to_string()));
        }

        let mut layers = self.build_layers();
        let mut optimizers: Vec<Adam> = layers
            .iter()
            .map(|layer| {
                Adam::new(
                    config.learning_rate,
                    (layer.input_size(), layer.output_size()),
                )
            })
            .collect();

        // The tail rows are reserved once for validation-loss reporting and
        // never feed gradient updates
        let train_rows = split_validation(features.nrows(), config.validation_split);
        let train_features = features.slice(s![..train_rows, ..]).to_owned();
        let train_targets = targets.slice(s![..train_rows]).to_owned();
        let val_features = features.slice(s![train_rows.., ..]).to_owned();
        let val_targets = targets.slice(s![train_rows..]).to_owned();

        info!(
            rows = features.nrows(),
            train_rows,
            epochs = config.epochs,
            "training started"
        );

        let mut rng = rand::thread_rng();
        let mut indices: Vec<usize> = (0..train_rows).collect();
        let mut last_loss = f64::NAN;

        for epoch in 1..=config.epochs {
            if cancelled() {
                info!(epoch, "training cancelled");
                return Err(ForecastError::Cancelled);
            }

            indices.shuffle(&mut rng);
            let mut epoch_loss = 0.0;
            let mut batches = 0usize;

            for batch in indices.chunks(config.batch_size) {
                let batch_features = train_features.select(Axis(0), batch);
                let batch_targets = train_targets.select(Axis(0), batch);
                epoch_loss += train_batch(
                    &mut layers,
                    &mut optimizers,
                    &batch_features,
                    &batch_targets,
                    &mut rng,
                );
                batches += 1;
            }

            let loss = epoch_loss / batches as f64;
            if !loss.is_finite() {
                warn!(epoch, loss, "aborting on non-finite loss");
                return Err(ForecastError::Training(format!(
                    "non-finite loss at epoch {epoch}"
                )));
            }
            last_loss = loss;

            if epoch % config.progress_every == 0 {
                let val_loss = validation_loss(&layers, &val_features, &val_targets)?;
                observer(TrainingProgress {
                    epoch,
                    loss,
                    val_loss,
                });
            }
        }

        for layer in &mut layers {
            layer.clear_cache();
        }
        info!(final_loss = last_loss, "training finished");

        Ok(TrainedQuantityModel { layers })
    }

    fn build_layers(&self) -> Vec<DenseLayer> {
        let config = &self.config;
        let [hidden1, hidden2] = config.hidden_sizes;
        vec![
            DenseLayer::new(INPUT_FEATURES, hidden1, Activation::Relu)
                .with_dropout(config.dropout)
                .with_l2(config.l2_penalty),
            DenseLayer::new(hidden1, hidden2, Activation::Relu)
                .with_dropout(config.dropout)
                .with_l2(config.l2_penalty),
            DenseLayer::new(hidden2, 1, Activation::Linear),
        ]
    }
}

/// One forward/backward pass over a batch; returns the batch loss
fn train_batch<R: Rng>(
    layers: &mut [DenseLayer],
    optimizers: &mut [Adam],
    features: &Array2<f64>,
    targets: &Array1<f64>,
    rng: &mut R,
) -> f64 {
    let mut activation = features.clone();
    for layer in layers.iter_mut() {
        activation = layer.forward_train(&activation, rng);
    }

    let rows = targets.len() as f64;
    let targets = targets.view().insert_axis(Axis(1));
    let diff = &activation - &targets;
    let mse = diff.mapv(|d| d * d).sum() / rows;
    let penalty: f64 = layers.iter().map(DenseLayer::weight_penalty).sum();

    let mut gradient = diff * (2.0 / rows);
    for (layer, optimizer) in layers.iter_mut().zip(optimizers.iter_mut()).rev() {
        let (input_gradient, weight_gradient, bias_gradient) = layer.backward(&gradient);
        optimizer.update(
            &mut layer.weights,
            &mut layer.biases,
            &weight_gradient,
            &bias_gradient,
        );
        gradient = input_gradient;
    }

    mse + penalty
}

/// Loss over the hold-out rows, or `None` when nothing was reserved
fn validation_loss(
    layers: &[DenseLayer],
    features: &Array2<f64>,
    targets: &Array1<f64>,
) -> Result<Option<f64>> {
    if targets.is_empty() {
        return Ok(None);
    }

    let mut activation = features.clone();
    for layer in layers {
        activation = layer.forward(&activation);
    }

    let predicted: Vec<f64> = activation.index_axis(Axis(1), 0).to_vec();
    let actual: Vec<f64> = targets.to_vec();
    Ok(Some(metrics::mean_squared_error(&predicted, &actual)?))
}

/// Fitted regression network; inference only
#[derive(Debug, Clone)]
pub struct TrainedQuantityModel {
    layers: Vec<DenseLayer>,
}

impl TrainedQuantityModel {
    /// Raw model output for one `[time_index, product_code]` row.
    ///
    /// The value is on the scaled-target axis and may be negative or
    /// fractional; inverse scaling and clamping happen in forecast
    /// generation.
    pub fn predict(&self, feature_row: [f64; INPUT_FEATURES]) -> f64 {
        let input = Array2::from_shape_fn((1, INPUT_FEATURES), |(_, col)| feature_row[col]);
        let output = self.forward(&input);
        output[[0, 0]]
    }

    /// Raw model outputs for a batch of feature rows
    pub fn predict_batch(&self, features: &Array2<f64>) -> Array1<f64> {
        self.forward(features).index_axis(Axis(1), 0).to_owned()
    }

    fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        let mut activation = input.clone();
        for layer in &self.layers {
            activation = layer.forward(&activation);
        }
        activation
    }
}
