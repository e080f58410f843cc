//! Engine and learning-loop settings.
//!
//! Both structs deserialize from partial JSON: every missing field takes its
//! default and unknown fields are ignored.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::learning::WeightVector;

/// Which grid offsets count as "next to".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Adjacency {
    /// Up, down, left, right.
    #[default]
    Orthogonal,
    /// Left and right only.
    Lateral,
    /// All eight surrounding seats.
    Diagonal,
}

impl Adjacency {
    pub fn offsets(&self) -> &'static [(i64, i64)] {
        match self {
            Adjacency::Orthogonal => &[(-1, 0), (1, 0), (0, -1), (0, 1)],
            Adjacency::Lateral => &[(0, -1), (0, 1)],
            Adjacency::Diagonal => &[(-1, -1), (-1, 0), (-1, 1), (0, -1), (0, 1), (1, -1), (1, 0), (1, 1)],
        }
    }
}

/// How far neighbor detection reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NeighborScope {
    /// Only seats of the same group are neighbors.
    #[default]
    Group,
    /// Groups stand side by side in key order, so edge columns of adjacent
    /// groups are neighbors too.
    Room,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub max_attempts: usize,
    pub seed: u64,
    pub adjacency: Adjacency,
    pub neighbor_scope: NeighborScope,
    /// Soft preferences used to rank valid seats.
    pub weights: WeightVector,
    /// Upper bound on candidate checks spent repairing one attempt.
    pub repair_budget: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_attempts: 5,
            seed: 0,
            adjacency: Adjacency::default(),
            neighbor_scope: NeighborScope::default(),
            weights: WeightVector::default(),
            repair_budget: 200_000,
        }
    }
}

impl Settings {
    pub fn from_json(json: &str) -> Result<Settings, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearningConfig {
    pub learning_rate: f64,
    pub min_weight: f64,
    pub max_weight: f64,
    /// Corrections retained in memory.
    pub max_history: usize,
    /// Window kept by the first pruning step when storage is full.
    pub history_cap: usize,
    pub aggressive_cap: usize,
    pub write_delay_ms: u64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        LearningConfig {
            learning_rate: 0.1,
            min_weight: 0.05,
            max_weight: 0.7,
            max_history: 1_000,
            history_cap: 500,
            aggressive_cap: 50,
            write_delay_ms: 2_000,
        }
    }
}

impl LearningConfig {
    pub fn write_delay(&self) -> Duration {
        Duration::from_millis(self.write_delay_ms)
    }

    pub fn from_json(json: &str) -> Result<LearningConfig, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_take_defaults() {
        let settings = Settings::from_json(r#"{"seed": 7, "theme": "dark"}"#).unwrap();
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.max_attempts, 5);
        assert_eq!(settings.adjacency, Adjacency::Orthogonal);
        assert_eq!(settings.neighbor_scope, NeighborScope::Group);

        let settings = Settings::from_json(r#"{"adjacency": "diagonal", "neighborScope": "room"}"#).unwrap();
        assert_eq!(settings.adjacency, Adjacency::Diagonal);
        assert_eq!(settings.neighbor_scope, NeighborScope::Room);
    }

    #[test]
    fn test_partial_weights_are_normalized() {
        let settings = Settings::from_json(r#"{"weights": {"genderBalance": 0.9}}"#).unwrap();
        let weights = &settings.weights;
        assert!((weights.sum() - 1.0).abs() < 1e-12);
        assert!((weights.gender_balance - 0.9 / 1.65).abs() < 1e-12);
        assert!((weights.cohort_mix - 0.25 / 1.65).abs() < 1e-12);

        let settings = Settings::from_json(r#"{"weights": {"genderBalance": 0, "cohortMix": 0, "neighborIsolation": -2, "riskAvoidance": 0}}"#).unwrap();
        assert_eq!(settings.weights.values(), [0.25; 4]);
    }

    #[test]
    fn test_learning_config_defaults() {
        let config = LearningConfig::from_json(r#"{"writeDelayMs": 0}"#).unwrap();
        assert_eq!(config.write_delay(), Duration::ZERO);
        assert_eq!(config.history_cap, 500);
        assert_eq!(config.aggressive_cap, 50);
    }
}
