//! Gradient boosted trees (XGBoost-style export)
//!
//! Tree `i` adds its leaf value to output group `i % groups`. Multi-class
//! models have one group per class and predict the argmax margin; binary
//! models have a single group and predict `classes[1]` on a positive margin.

use serde::Deserialize;

use super::tree::{SplitRule, Tree};
use super::{argmax, check_features, class_label, Classifier, InferenceError};

#[derive(Debug, Clone, Deserialize)]
pub struct GradientBoosting {
    pub classes: Vec<f64>,
    pub n_features: usize,
    /// Starting margin for every group
    #[serde(default)]
    pub base_margin: f64,
    pub trees: Vec<Tree>,
}

impl GradientBoosting {
    fn groups(&self) -> usize {
        if self.classes.len() == 2 {
            1
        } else {
            self.classes.len()
        }
    }

    /// Raw margins per output group
    pub fn margins(&self, row: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_features(self.n_features, row)?;
        let groups = self.groups();
        if groups == 0 {
            return Err(InferenceError::InvalidModel("model has no classes".to_string()));
        }

        let mut margins = vec![self.base_margin; groups];
        for (i, tree) in self.trees.iter().enumerate() {
            let value = tree.leaf_value(row, SplitRule::Less)?;
            let leaf = value.first().ok_or_else(|| {
                InferenceError::InvalidModel(format!("tree {} has an empty leaf", i))
            })?;
            margins[i % groups] += leaf;
        }
        Ok(margins)
    }

    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let margins = self.margins(row)?;
        if let [margin] = margins.as_slice() {
            if !margin.is_finite() {
                return Err(InferenceError::NonFiniteScore);
            }
            let idx = if *margin > 0.0 { 1 } else { 0 };
            return class_label(&self.classes, idx);
        }
        class_label(&self.classes, argmax(&margins)?)
    }
}

impl Classifier for GradientBoosting {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, InferenceError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    fn family(&self) -> &'static str {
        "gradient_boosting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> serde_json::Value {
        serde_json::json!({"nodes": [
            {"feature": feature, "threshold": threshold, "left": 1, "right": 2},
            {"value": [left]},
            {"value": [right]}
        ]})
    }

    #[test]
    fn test_multiclass_round_robin() {
        let model: GradientBoosting = serde_json::from_value(serde_json::json!({
            "classes": [1, 2, 5],
            "n_features": 1,
            "trees": [
                stump(0, 50.0, -1.0, 0.5),   // class 1
                stump(0, 50.0, -0.5, 1.0),   // class 2
                stump(0, 50.0, 2.0, -1.0),   // class 5
                stump(0, 80.0, -0.2, 1.0),   // class 1 again
            ]
        }))
        .unwrap();

        // 35: margins [-1.2, -0.5, 2.0] -> 5
        assert_eq!(model.predict(&[vec![35.0]]).unwrap(), vec![5.0]);
        // 72: margins [0.3, 1.0, -1.0] -> 2
        assert_eq!(model.predict(&[vec![72.0]]).unwrap(), vec![2.0]);
        // 88: margins [1.5, 1.0, -1.0] -> 1
        assert_eq!(model.predict(&[vec![88.0]]).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_strict_split() {
        let model: GradientBoosting = serde_json::from_value(serde_json::json!({
            "classes": [0, 6],
            "n_features": 1,
            "trees": [stump(0, 10.0, 1.0, -1.0)]
        }))
        .unwrap();
        // 10 < 10 is false -> right leaf -> negative margin
        assert_eq!(model.predict(&[vec![10.0]]).unwrap(), vec![0.0]);
        assert_eq!(model.predict(&[vec![9.9]]).unwrap(), vec![6.0]);
    }

    #[test]
    fn test_base_margin_applies() {
        let model: GradientBoosting = serde_json::from_value(serde_json::json!({
            "classes": [0, 1],
            "n_features": 1,
            "base_margin": 3.0,
            "trees": [stump(0, 10.0, -1.0, -1.0)]
        }))
        .unwrap();
        assert_eq!(model.margins(&[0.0]).unwrap(), vec![2.0]);
        assert_eq!(model.predict(&[vec![0.0]]).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_feature_count_checked() {
        let model: GradientBoosting = serde_json::from_value(serde_json::json!({
            "classes": [0, 1],
            "n_features": 3,
            "trees": []
        }))
        .unwrap();
        assert_eq!(
            model.predict(&[vec![1.0]]),
            Err(InferenceError::FeatureCount { expected: 3, got: 1 })
        );
    }
}
