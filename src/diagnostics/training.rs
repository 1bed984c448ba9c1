use super::timing::TimingBreakdown;
use crate::features::Feature;
use serde::{Deserialize, Serialize};

/// One boosting round: the selected classifier and its vote.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub round: usize,
    pub feature: Feature,
    pub threshold: f32,
    pub polarity: i8,
    /// Weighted error before the epsilon clamp.
    pub error: f64,
    pub beta: f64,
    pub alpha: f64,
    pub alpha_capped: bool,
    pub elapsed_ms: f64,
}

/// Summary of one cascade stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    pub stage_index: usize,
    pub requested_rounds: usize,
    pub built_rounds: usize,
    pub target_false_positive_rate: f64,
    pub threshold: f64,
    pub total_alpha: f64,
    /// Why boosting stopped early, if it did.
    pub stop_reason: Option<String>,
    /// True when the stage produced no classifier and was left out.
    pub skipped: bool,
    pub rounds: Vec<RoundRecord>,
    pub elapsed_ms: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReport {
    pub window_size: usize,
    pub sample_count: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub feature_count: usize,
    pub stages: Vec<StageReport>,
    pub timings: TimingBreakdown,
}

impl TrainingReport {
    pub fn built_stage_count(&self) -> usize {
        self.stages.iter().filter(|s| !s.skipped).count()
    }

    pub fn total_classifiers(&self) -> usize {
        self.stages.iter().map(|s| s.built_rounds).sum()
    }
}
