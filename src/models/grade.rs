//! Weighted grade aggregate with validated bounds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{AppError, Result};

/// Absolute tolerance when checking that weights sum to one.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weighted subscore aggregate produced by a grader.
///
/// Invariants enforced by [`Grade::score`]: the subscore and weight key
/// sets are identical, every subscore lies in `[0, 1]`, and the weights
/// sum to one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Grade {
    /// Per-criterion scores in `[0, 1]`.
    pub subscores: BTreeMap<String, f64>,
    /// Per-criterion weights; must sum to one.
    pub weights: BTreeMap<String, f64>,
    /// Free-form grader metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Grade {
    /// Compute the weighted score, clamped to `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Score` if the subscore and weight key sets
    /// differ, the weights do not sum to one (within tolerance), or any
    /// subscore lies outside `[0, 1]`.
    pub fn score(&self) -> Result<f64> {
        let subscore_keys: Vec<&String> = self.subscores.keys().collect();
        let weight_keys: Vec<&String> = self.weights.keys().collect();
        if subscore_keys != weight_keys {
            return Err(AppError::Score(
                "subscore and weight key sets differ".into(),
            ));
        }

        let weight_sum: f64 = self.weights.values().sum();
        if (weight_sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(AppError::Score(format!(
                "weights must sum to 1, got {weight_sum}"
            )));
        }

        for (name, value) in &self.subscores {
            if !(0.0..=1.0).contains(value) {
                return Err(AppError::Score(format!(
                    "subscore {name} is {value}, outside [0, 1]"
                )));
            }
        }

        let score: f64 = self
            .subscores
            .iter()
            .map(|(name, value)| value * self.weights[name])
            .sum();

        Ok(score.clamp(0.0, 1.0))
    }
}
