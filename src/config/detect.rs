use crate::detect::DetectParams;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
pub struct DetectToolConfig {
    pub input: PathBuf,
    pub model: PathBuf,
    #[serde(default)]
    pub detection: DetectParams,
    pub output: DetectOutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct DetectOutputConfig {
    pub detections_json: PathBuf,
    /// Copy of the input with detections outlined.
    pub annotated_image: Option<PathBuf>,
    #[serde(default)]
    pub report_json: Option<PathBuf>,
}

pub fn load_config(path: &Path) -> Result<DetectToolConfig, String> {
    super::read_json(path)
}
