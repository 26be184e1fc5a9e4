//! Background training with an explicit progress stream

use crate::data::Observation;
use crate::encoding::{self, EncodingTable};
use crate::error::{ForecastError, Result};
use crate::models::{QuantityRegressor, TrainedQuantityModel, TrainingConfig, TrainingProgress};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::debug;

/// Spawner for one in-flight training run
#[derive(Debug)]
pub struct TrainingTask;

impl TrainingTask {
    /// Encode and train on a worker thread.
    ///
    /// The returned handle streams the periodic progress events and can
    /// request a cooperative abort between epochs. Exactly one run exists per
    /// handle; abandoning the handle abandons the run without touching any
    /// shared state.
    pub fn spawn(observations: Vec<Observation>, config: TrainingConfig) -> TrainingHandle {
        let (sender, receiver) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);

        let worker = thread::spawn(move || {
            let (features, targets, table) = encoding::encode(&observations)?;
            let regressor = QuantityRegressor::new(config)?;
            let model = regressor.fit_until(
                &features,
                &targets,
                |progress| {
                    debug!(epoch = progress.epoch, loss = progress.loss, "progress");
                    // A caller that dropped the receiver just stops listening
                    let _ = sender.send(progress);
                },
                || cancel_flag.load(Ordering::Relaxed),
            )?;
            Ok((model, table))
        });

        TrainingHandle {
            progress: receiver,
            cancel,
            worker,
        }
    }
}

/// Handle to a spawned training run
#[derive(Debug)]
pub struct TrainingHandle {
    progress: Receiver<TrainingProgress>,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<Result<(TrainedQuantityModel, EncodingTable)>>,
}

impl TrainingHandle {
    /// Stream of progress events; closes when the run finishes
    pub fn progress(&self) -> &Receiver<TrainingProgress> {
        &self.progress
    }

    /// Request a cooperative abort at the next epoch boundary
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Wait for the run and take its outcome
    pub fn join(self) -> Result<(TrainedQuantityModel, EncodingTable)> {
        match self.worker.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(ForecastError::Training(
                "training thread panicked".to_string(),
            )),
        }
    }
}
