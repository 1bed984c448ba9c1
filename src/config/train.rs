use crate::boost::BoostParams;
use crate::cascade::{default_schedule, CascadeTrainParams, StageSchedule};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct TrainToolConfig {
    pub positives: PathBuf,
    pub negatives: PathBuf,
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    pub output: TrainOutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub positive_count: usize,
    pub negative_count: usize,
    /// Rows removed from the top of every positive image before cropping.
    pub crop_top: usize,
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            positive_count: 100,
            negative_count: 100,
            crop_top: 0,
            seed: 42,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub window_size: usize,
    pub stages: Vec<StageSchedule>,
    pub boost: BoostParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            window_size: 24,
            stages: default_schedule(),
            boost: BoostParams::default(),
        }
    }
}

impl TrainingConfig {
    pub fn to_params(&self) -> CascadeTrainParams {
        CascadeTrainParams {
            window_size: self.window_size,
            stages: self.stages.clone(),
            boost: self.boost.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TrainOutputConfig {
    pub model_json: PathBuf,
    pub report_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<TrainToolConfig, String> {
    super::read_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_fills_defaults() {
        let json = r#"{
            "positives": "data/faces",
            "negatives": "data/background",
            "training": { "stages": [ { "rounds": 3, "target_false_positive_rate": 0.25 } ] },
            "output": { "model_json": "out/model.json" }
        }"#;
        let cfg: TrainToolConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(cfg.sampling.positive_count, 100);
        assert_eq!(cfg.training.window_size, 24);
        assert_eq!(cfg.training.stages, vec![StageSchedule::new(3, 0.25)]);
        assert_eq!(cfg.training.boost.chunk_size, 1500);
        assert!(cfg.output.report_json.is_none());
    }
}
