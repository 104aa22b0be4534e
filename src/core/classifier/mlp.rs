//! Multilayer perceptron
//!
//! Weights are stored row-major as `out × in` (one row per output unit),
//! the transpose of scikit-learn's `coefs_` layout.

use serde::Deserialize;

use super::{argmax, class_label, dot, Classifier, InferenceError, StandardScaler};

/// Hidden-layer activation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
    Logistic,
    Identity,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Self::Relu => x.max(0.0),
            Self::Tanh => x.tanh(),
            Self::Logistic => 1.0 / (1.0 + (-x).exp()),
            Self::Identity => x,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DenseLayer {
    pub weights: Vec<Vec<f64>>,
    pub biases: Vec<f64>,
}

impl DenseLayer {
    fn forward(&self, input: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if self.weights.len() != self.biases.len() {
            return Err(InferenceError::InvalidModel(format!(
                "layer has {} weight rows but {} biases",
                self.weights.len(),
                self.biases.len()
            )));
        }
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(row, b)| Ok(dot(row, input)? + b))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mlp {
    pub classes: Vec<f64>,
    pub layers: Vec<DenseLayer>,
    #[serde(default)]
    pub activation: Activation,
    #[serde(default)]
    pub scaler: Option<StandardScaler>,
}

impl Mlp {
    /// Output-layer pre-activations
    pub fn forward(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let (last, hidden) = self
            .layers
            .split_last()
            .ok_or_else(|| InferenceError::InvalidModel("network has no layers".to_string()))?;

        let mut values = match &self.scaler {
            Some(scaler) => scaler.transform(row)?,
            None => row.to_vec(),
        };
        for layer in hidden {
            values = layer
                .forward(&values)?
                .into_iter()
                .map(|x| self.activation.apply(x))
                .collect();
        }
        last.forward(&values)
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let outputs = self.forward(row)?;
        if let [output] = outputs.as_slice() {
            if !output.is_finite() {
                return Err(InferenceError::NonFiniteScore);
            }
            let idx = if *output > 0.0 { 1 } else { 0 };
            return class_label(&self.classes, idx);
        }
        class_label(&self.classes, argmax(&outputs)?)
    }
}

impl Classifier for Mlp {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, InferenceError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    fn family(&self) -> &'static str {
        "mlp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network(activation: Activation) -> Mlp {
        Mlp {
            classes: vec![1.0, 2.0, 5.0],
            layers: vec![
                DenseLayer {
                    weights: vec![vec![1.0, 0.0], vec![-1.0, 0.0]],
                    biases: vec![-50.0, 50.0],
                },
                DenseLayer {
                    weights: vec![vec![1.0, 0.0], vec![0.0, 0.0], vec![0.0, 1.0]],
                    biases: vec![0.0, 5.0, 0.0],
                },
            ],
            activation,
            scaler: None,
        }
    }

    #[test]
    fn test_relu_network() {
        let model = network(Activation::Relu);
        // 72: hidden [22, 0] -> out [22, 5, 0] -> 1
        // 52: hidden [2, 0] -> out [2, 5, 0] -> 2
        // 20: hidden [0, 30] -> out [0, 5, 30] -> 5
        let rows = vec![vec![72.0, 0.0], vec![52.0, 0.0], vec![20.0, 0.0]];
        assert_eq!(model.predict(&rows).unwrap(), vec![1.0, 2.0, 5.0]);
    }

    #[test]
    fn test_identity_activation_keeps_negatives() {
        let model = network(Activation::Identity);
        // 72: hidden [22, -22] -> out [22, 5, -22] -> 1
        // 60: hidden [10, -10] -> out [10, 5, -10] -> 1
        // 40: hidden [-10, 10] -> out [-10, 5, 10] -> 5
        let rows = vec![vec![72.0, 0.0], vec![60.0, 0.0], vec![40.0, 0.0]];
        assert_eq!(model.predict(&rows).unwrap(), vec![1.0, 1.0, 5.0]);
    }

    #[test]
    fn test_activations() {
        assert_eq!(Activation::Relu.apply(-3.0), 0.0);
        assert_eq!(Activation::Logistic.apply(0.0), 0.5);
        assert_eq!(Activation::Tanh.apply(0.0), 0.0);
        assert_eq!(Activation::Identity.apply(-3.0), -3.0);
    }

    #[test]
    fn test_binary_output() {
        let model = Mlp {
            classes: vec![0.0, 6.0],
            layers: vec![DenseLayer {
                weights: vec![vec![1.0]],
                biases: vec![-1.0],
            }],
            activation: Activation::Relu,
            scaler: None,
        };
        assert_eq!(model.predict(&[vec![3.0], vec![0.5]]).unwrap(), vec![6.0, 0.0]);
    }

    #[test]
    fn test_empty_network() {
        let model = Mlp {
            classes: vec![0.0],
            layers: vec![],
            activation: Activation::Relu,
            scaler: None,
        };
        assert!(matches!(
            model.predict(&[vec![1.0]]),
            Err(InferenceError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_default_activation_is_relu() {
        let model: Mlp = serde_json::from_str(
            r#"{"classes": [0, 1], "layers": [{"weights": [[1.0]], "biases": [0.0]}]}"#,
        )
        .unwrap();
        assert_eq!(model.activation, Activation::Relu);
    }
}
