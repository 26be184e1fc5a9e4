//! Dense layers for the quantity regression network

use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::Rng;

/// Activation applied after a layer's linear transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// max(0, x)
    Relu,
    /// Identity
    Linear,
}

impl Activation {
    fn apply(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| v.max(0.0)),
            Activation::Linear => z.clone(),
        }
    }

    fn derivative(self, z: &Array2<f64>) -> Array2<f64> {
        match self {
            Activation::Relu => z.mapv(|v| if v > 0.0 { 1.0 } else { 0.0 }),
            Activation::Linear => Array2::ones(z.raw_dim()),
        }
    }
}

/// Fully connected layer with optional dropout and L2 weight penalty
#[derive(Debug, Clone)]
pub struct DenseLayer {
    pub(crate) weights: Array2<f64>,
    pub(crate) biases: Array1<f64>,
    activation: Activation,
    dropout: f64,
    l2: f64,

    // Cached forward state, populated only while training
    input: Option<Array2<f64>>,
    pre_activation: Option<Array2<f64>>,
    dropout_mask: Option<Array2<f64>>,
}

impl DenseLayer {
    /// Create a layer with Xavier-uniform initialized weights and zero biases
    pub fn new(inputs: usize, outputs: usize, activation: Activation) -> Self {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        Self {
            weights: Array2::random((inputs, outputs), Uniform::new(-limit, limit)),
            biases: Array1::zeros(outputs),
            activation,
            dropout: 0.0,
            l2: 0.0,
            input: None,
            pre_activation: None,
            dropout_mask: None,
        }
    }

    /// Set the dropout rate applied after activation during training
    pub fn with_dropout(mut self, rate: f64) -> Self {
        self.dropout = rate.clamp(0.0, 1.0);
        self
    }

    /// Set the L2 penalty coefficient on this layer's weights
    pub fn with_l2(mut self, lambda: f64) -> Self {
        self.l2 = lambda;
        self
    }

    pub fn input_size(&self) -> usize {
        self.weights.nrows()
    }

    pub fn output_size(&self) -> usize {
        self.weights.ncols()
    }

    /// This layer's L2 penalty contribution to the loss
    pub fn weight_penalty(&self) -> f64 {
        self.l2 * self.weights.mapv(|w| w * w).sum()
    }

    /// Inference forward pass; no dropout, no cached state
    pub fn forward(&self, input: &Array2<f64>) -> Array2<f64> {
        self.activation.apply(&self.affine(input))
    }

    /// Training forward pass: applies inverted dropout and caches state for
    /// backpropagation
    pub fn forward_train<R: Rng>(&mut self, input: &Array2<f64>, rng: &mut R) -> Array2<f64> {
        let z = self.affine(input);
        let mut output = self.activation.apply(&z);

        self.input = Some(input.clone());
        self.pre_activation = Some(z);
        self.dropout_mask = if self.dropout > 0.0 {
            let keep = 1.0 - self.dropout;
            let mask = Array2::from_shape_fn(output.raw_dim(), |_| {
                // Inverted scaling keeps the expected activation unchanged
                if rng.gen::<f64>() < keep {
                    1.0 / keep
                } else {
                    0.0
                }
            });
            output = &output * &mask;
            Some(mask)
        } else {
            None
        };

        output
    }

    /// Backpropagate through the cached forward state.
    ///
    /// Returns `(input_gradient, weight_gradient, bias_gradient)`; the weight
    /// gradient includes the L2 penalty term.
    pub fn backward(&self, upstream: &Array2<f64>) -> (Array2<f64>, Array2<f64>, Array1<f64>) {
        let z = self
            .pre_activation
            .as_ref()
            .expect("forward_train must run before backward");
        let input = self
            .input
            .as_ref()
            .expect("forward_train must run before backward");

        let upstream = match &self.dropout_mask {
            Some(mask) => upstream * mask,
            None => upstream.clone(),
        };

        let delta = &upstream * &self.activation.derivative(z);

        let mut weight_gradient = input.t().dot(&delta);
        if self.l2 > 0.0 {
            weight_gradient = weight_gradient + &self.weights * (2.0 * self.l2);
        }
        let bias_gradient = delta.sum_axis(Axis(0));
        let input_gradient = delta.dot(&self.weights.t());

        (input_gradient, weight_gradient, bias_gradient)
    }

    /// Drop cached training state, leaving the layer inference-only
    pub fn clear_cache(&mut self) {
        self.input = None;
        self.pre_activation = None;
        self.dropout_mask = None;
    }

    fn affine(&self, input: &Array2<f64>) -> Array2<f64> {
        let mut z = input.dot(&self.weights);
        for mut row in z.rows_mut() {
            row += &self.biases;
        }
        z
    }
}
