//! Decision trees and random forests

use serde::Deserialize;

use super::{argmax, check_features, class_label, Classifier, InferenceError};

/// Tree node. Children are indices into the tree's node list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Direction taken when the feature is NaN
        #[serde(default)]
        missing_left: bool,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// How a split compares a feature against its threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitRule {
    /// `x <= threshold` goes left
    LessOrEqual,
    /// `x < threshold` goes left
    Less,
}

/// Flat node list, root at index 0
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf and return its value
    pub fn leaf_value(&self, row: &[f64], rule: SplitRule) -> Result<&[f64], InferenceError> {
        let mut idx = 0;
        // a well-formed tree reaches a leaf in fewer hops than it has nodes
        for _ in 0..=self.nodes.len() {
            let node = self.nodes.get(idx).ok_or_else(|| {
                InferenceError::InvalidModel(format!(
                    "node index {} out of range for {} nodes",
                    idx,
                    self.nodes.len()
                ))
            })?;

            match node {
                Node::Leaf { value } => return Ok(value.as_slice()),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    missing_left,
                } => {
                    let x = *row.get(*feature).ok_or_else(|| {
                        InferenceError::InvalidModel(format!(
                            "split on feature {} but row has {}",
                            feature,
                            row.len()
                        ))
                    })?;
                    let go_left = if x.is_nan() {
                        *missing_left
                    } else {
                        match rule {
                            SplitRule::LessOrEqual => x <= *threshold,
                            SplitRule::Less => x < *threshold,
                        }
                    };
                    idx = if go_left { *left } else { *right };
                }
            }
        }
        Err(InferenceError::InvalidModel("tree contains a cycle".to_string()))
    }
}

/// Bagged trees voting with per-class leaf weights
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    pub classes: Vec<f64>,
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl RandomForest {
    fn predict_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        check_features(self.n_features, row)?;
        if self.trees.is_empty() {
            return Err(InferenceError::InvalidModel("forest has no trees".to_string()));
        }

        let mut totals = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let value = tree.leaf_value(row, SplitRule::LessOrEqual)?;
            if value.len() != totals.len() {
                return Err(InferenceError::InvalidModel(format!(
                    "leaf has {} class weights, expected {}",
                    value.len(),
                    totals.len()
                )));
            }
            for (total, v) in totals.iter_mut().zip(value) {
                *total += v;
            }
        }

        class_label(&self.classes, argmax(&totals)?)
    }
}

impl Classifier for RandomForest {
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, InferenceError> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    fn family(&self) -> &'static str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn forest() -> RandomForest {
        serde_json::from_str(
            r#"{
                "classes": [1, 2, 5],
                "n_features": 2,
                "trees": [
                    {"nodes": [
                        {"feature": 0, "threshold": 50.0, "left": 1, "right": 2},
                        {"value": [0.0, 0.0, 1.0]},
                        {"value": [0.2, 0.8, 0.0]}
                    ]},
                    {"nodes": [
                        {"feature": 1, "threshold": 100.0, "left": 1, "right": 2, "missing_left": true},
                        {"value": [0.6, 0.4, 0.0]},
                        {"value": [0.0, 0.3, 0.7]}
                    ]}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_forest_sums_leaf_weights() {
        let forest = forest();
        // tree1 -> [0.2, 0.8, 0], tree2 -> [0.6, 0.4, 0] => class 2
        assert_eq!(forest.predict(&[vec![72.0, 85.0]]).unwrap(), vec![2.0]);
        // tree1 -> [0, 0, 1], tree2 -> [0, 0.3, 0.7] => class 5
        assert_eq!(forest.predict(&[vec![35.0, 120.0]]).unwrap(), vec![5.0]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        // 50.0 <= 50.0 goes left in tree1 -> class 5 weight 1.0,
        // tree2 area 200 -> [0, 0.3, 0.7]
        assert_eq!(forest().predict(&[vec![50.0, 200.0]]).unwrap(), vec![5.0]);
    }

    #[test]
    fn test_missing_value_direction() {
        // tree2 sends NaN left -> [0.6, 0.4, 0]; tree1 -> [0.2, 0.8, 0] => class 2
        assert_eq!(forest().predict(&[vec![60.0, f64::NAN]]).unwrap(), vec![2.0]);
    }

    #[test]
    fn test_wrong_feature_count() {
        let err = forest().predict(&[vec![1.0]]).unwrap_err();
        assert_eq!(err, InferenceError::FeatureCount { expected: 2, got: 1 });
    }

    #[test]
    fn test_broken_child_index_fails_at_predict() {
        let tree = Tree {
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 0.0,
                left: 7,
                right: 7,
                missing_left: false,
            }],
        };
        assert!(matches!(
            tree.leaf_value(&[1.0], SplitRule::Less),
            Err(InferenceError::InvalidModel(_))
        ));
    }

    #[test]
    fn test_cycle_detected() {
        let tree = Tree {
            nodes: vec![Node::Split {
                feature: 0,
                threshold: 0.0,
                left: 0,
                right: 0,
                missing_left: false,
            }],
        };
        let err = tree.leaf_value(&[1.0], SplitRule::LessOrEqual).unwrap_err();
        assert_eq!(err.to_string(), "invalid model: tree contains a cycle");
    }
}
