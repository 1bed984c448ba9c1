use super::timing::TimingBreakdown;
use serde::{Deserialize, Serialize};

/// Statistics for a single pyramid level of the sliding-window scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleReport {
    pub scale: f64,
    pub width: usize,
    pub height: usize,
    /// Scanned window size expressed in input-image pixels.
    pub box_size: usize,
    pub windows_evaluated: usize,
    pub candidates: usize,
    pub elapsed_ms: f64,
}

/// Full trace of a `detect_multi_scale` call.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub image_width: usize,
    pub image_height: usize,
    pub scales: Vec<ScaleReport>,
    pub raw_detections: usize,
    pub final_detections: usize,
    pub timings: TimingBreakdown,
}

impl DetectionReport {
    pub fn windows_evaluated(&self) -> usize {
        self.scales.iter().map(|s| s.windows_evaluated).sum()
    }
}
