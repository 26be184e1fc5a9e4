//! Pipeline session state owned by the calling layer

use crate::data::{self, Observation};
use crate::encoding::{self, EncodingTable};
use crate::error::{ForecastError, Result};
use crate::forecast::{self, Prediction};
use crate::models::{QuantityRegressor, TrainedQuantityModel, TrainingConfig, TrainingProgress};
use crate::task::{TrainingHandle, TrainingTask};
use tracing::info;

/// Explicit pipeline state: the parsed observations, the encoding table
/// captured at training time and the current trained model (if any).
///
/// The pipeline steps are pure transformations of explicit inputs; the
/// session only sequences them and swaps its state on success, so every
/// failure leaves the pre-run state intact.
#[derive(Debug, Default)]
pub struct PipelineSession {
    observations: Vec<Observation>,
    encoding: Option<EncodingTable>,
    model: Option<TrainedQuantityModel>,
}

impl PipelineSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse CSV text and adopt the surviving observations.
    ///
    /// Replaces any previous data and discards the current model and table;
    /// on error the session is left untouched.
    pub fn load_csv(&mut self, text: &str) -> Result<usize> {
        let observations = data::parse_csv(text)?;
        let rows = observations.len();
        info!(rows, "observations loaded");
        self.observations = observations;
        self.encoding = None;
        self.model = None;
        Ok(rows)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    /// Current trained model, when a run has completed
    pub fn model(&self) -> Option<&TrainedQuantityModel> {
        self.model.as_ref()
    }

    /// Encoding table captured by the last completed training run
    pub fn encoding(&self) -> Option<&EncodingTable> {
        self.encoding.as_ref()
    }

    /// Train synchronously with the pipeline's fixed settings, discarding
    /// progress events
    pub fn train(&mut self) -> Result<()> {
        self.train_with(TrainingConfig::default(), |_| {})
    }

    /// Train synchronously, forwarding progress events to `observer`.
    ///
    /// A completed run replaces the prior model and encoding table wholesale.
    pub fn train_with<F>(&mut self, config: TrainingConfig, observer: F) -> Result<()>
    where
        F: FnMut(TrainingProgress),
    {
        let (features, targets, table) = encoding::encode(&self.observations)?;
        let model = QuantityRegressor::new(config)?.fit(&features, &targets, observer)?;
        self.encoding = Some(table);
        self.model = Some(model);
        Ok(())
    }

    /// Start a background training run over the current observations.
    ///
    /// The session is untouched until the handle's outcome is adopted with
    /// [`finish_training`](Self::finish_training).
    pub fn start_training(&self, config: TrainingConfig) -> Result<TrainingHandle> {
        if self.observations.is_empty() {
            return Err(ForecastError::Encoding("empty observation set".to_string()));
        }
        Ok(TrainingTask::spawn(self.observations.clone(), config))
    }

    /// Adopt the outcome of a background run, replacing any prior model
    pub fn finish_training(&mut self, handle: TrainingHandle) -> Result<()> {
        let (model, table) = handle.join()?;
        self.encoding = Some(table);
        self.model = Some(model);
        Ok(())
    }

    /// Generate the six-months-per-product forecast from the current model
    pub fn forecast(&self) -> Result<Vec<Prediction>> {
        let model = self.model.as_ref().ok_or_else(|| {
            ForecastError::Training("no trained model; run train first".to_string())
        })?;
        let table = self.encoding.as_ref().ok_or_else(|| {
            ForecastError::Encoding("no encoding table captured".to_string())
        })?;
        let last = data::last_observed_month(&self.observations).ok_or_else(|| {
            ForecastError::Parse("no observations loaded".to_string())
        })?;
        forecast::generate(model, table, last)
    }
}
