//! Adam optimizer for the dense layers

use ndarray::{Array1, Array2};

/// Adaptive moment estimation state for one layer's parameters
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    step: usize,
    m_weights: Array2<f64>,
    v_weights: Array2<f64>,
    m_biases: Array1<f64>,
    v_biases: Array1<f64>,
}

impl Adam {
    /// State sized for a layer with the given weight shape
    pub fn new(learning_rate: f64, weight_shape: (usize, usize)) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            step: 0,
            m_weights: Array2::zeros(weight_shape),
            v_weights: Array2::zeros(weight_shape),
            m_biases: Array1::zeros(weight_shape.1),
            v_biases: Array1::zeros(weight_shape.1),
        }
    }

    /// Apply one bias-corrected update to a layer's weights and biases
    pub fn update(
        &mut self,
        weights: &mut Array2<f64>,
        biases: &mut Array1<f64>,
        weight_gradients: &Array2<f64>,
        bias_gradients: &Array1<f64>,
    ) {
        self.step += 1;
        let correction1 = 1.0 - self.beta1.powi(self.step as i32);
        let correction2 = 1.0 - self.beta2.powi(self.step as i32);

        self.m_weights = &self.m_weights * self.beta1 + weight_gradients * (1.0 - self.beta1);
        self.v_weights = &self.v_weights * self.beta2
            + &(weight_gradients * weight_gradients) * (1.0 - self.beta2);
        let m_hat = &self.m_weights / correction1;
        let v_hat = &self.v_weights / correction2;
        *weights =
            &*weights - &(&m_hat * self.learning_rate / &(v_hat.mapv(f64::sqrt) + self.epsilon));

        self.m_biases = &self.m_biases * self.beta1 + bias_gradients * (1.0 - self.beta1);
        self.v_biases = &self.v_biases * self.beta2
            + &(bias_gradients * bias_gradients) * (1.0 - self.beta2);
        let m_hat = &self.m_biases / correction1;
        let v_hat = &self.v_biases / correction2;
        *biases =
            &*biases - &(&m_hat * self.learning_rate / &(v_hat.mapv(f64::sqrt) + self.epsilon));
    }
}
