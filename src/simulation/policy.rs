//! Colony policies and the per-task-type weight table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{ColonyError, Result};
use crate::core::types::normalize_token;
use crate::entity::tasks::TaskType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PolicyId {
    Fortify,
    HarvestRush,
    #[default]
    Recovery,
}

impl PolicyId {
    pub fn name(&self) -> &'static str {
        match self {
            PolicyId::Fortify => "FORTIFY",
            PolicyId::HarvestRush => "HARVEST_RUSH",
            PolicyId::Recovery => "RECOVERY",
        }
    }

    /// Weights in `TaskType::ALL` order
    pub fn weights(&self) -> PolicyWeights {
        match self {
            PolicyId::Fortify => PolicyWeights([0.8, 0.9, 0.8, 1.0, 1.5, 1.5, 2.0]),
            PolicyId::HarvestRush => PolicyWeights([0.9, 1.5, 1.5, 1.4, 0.8, 0.8, 2.0]),
            PolicyId::Recovery => PolicyWeights([0.9, 1.4, 1.1, 1.3, 0.8, 1.2, 2.0]),
        }
    }
}

impl fmt::Display for PolicyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyId {
    type Err = ColonyError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "FORTIFY" => Ok(PolicyId::Fortify),
            "HARVEST_RUSH" | "HARVESTRUSH" => Ok(PolicyId::HarvestRush),
            "RECOVERY" => Ok(PolicyId::Recovery),
            _ => Err(ColonyError::unknown("policy", s)),
        }
    }
}

/// Multiplier per task type; every entry is >= 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicyWeights([f64; 7]);

impl Default for PolicyWeights {
    fn default() -> Self {
        PolicyId::default().weights()
    }
}

impl PolicyWeights {
    pub fn get(&self, task_type: TaskType) -> f64 {
        self.0[task_type.index()]
    }

    /// Override one weight; negative or NaN values become 0
    pub fn set(&mut self, task_type: TaskType, weight: f64) {
        self.0[task_type.index()] = if weight > 0.0 { weight } else { 0.0 };
    }

    pub fn with_weight(mut self, task_type: TaskType, weight: f64) -> Self {
        self.set(task_type, weight);
        self
    }
}
