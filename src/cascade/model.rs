//! Persisted cascade: the classifier together with the window size and the
//! normalization it was trained under.
use super::classifier::CascadeClassifier;
use crate::image::io::write_json_file;
use crate::samples::NormalizationParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq)]
pub enum CascadeError {
    /// No model file exists; training has to produce one first.
    MissingCascade { path: PathBuf },
    /// The model has no stages and cannot make a decision.
    EmptyCascade,
    Io(String),
    Parse(String),
}

impl std::fmt::Display for CascadeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CascadeError::MissingCascade { path } => write!(
                f,
                "no trained cascade at {}; please run the trainer first",
                path.display()
            ),
            CascadeError::EmptyCascade => write!(f, "cascade has no stages"),
            CascadeError::Io(msg) => write!(f, "cascade I/O error: {msg}"),
            CascadeError::Parse(msg) => write!(f, "invalid cascade file: {msg}"),
        }
    }
}

impl std::error::Error for CascadeError {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainedCascade {
    pub window_size: usize,
    pub normalization: NormalizationParams,
    pub cascade: CascadeClassifier,
}

impl TrainedCascade {
    /// A usable model has at least one stage, a non-zero window and only
    /// features that lie inside that window.
    pub fn validate(&self) -> Result<(), CascadeError> {
        if self.cascade.is_empty() {
            return Err(CascadeError::EmptyCascade);
        }
        if self.window_size == 0 {
            return Err(CascadeError::Parse("window size must be positive".to_string()));
        }
        for (s, stage) in self.cascade.stages.iter().enumerate() {
            if let Some(wc) = stage
                .weak_classifiers
                .iter()
                .find(|wc| !wc.feature.fits(self.window_size))
            {
                return Err(CascadeError::Parse(format!(
                    "stage {s}: feature {:?} exceeds the {}px window",
                    wc.feature, self.window_size
                )));
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), CascadeError> {
        self.validate()?;
        write_json_file(path, self).map_err(CascadeError::Io)
    }

    /// Read a model written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self, CascadeError> {
        if !path.exists() {
            return Err(CascadeError::MissingCascade {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path)
            .map_err(|e| CascadeError::Io(format!("Failed to read {}: {e}", path.display())))?;
        let model: TrainedCascade = serde_json::from_str(&text)
            .map_err(|e| CascadeError::Parse(format!("{}: {e}", path.display())))?;
        model.validate().map_err(|e| match e {
            CascadeError::Parse(msg) => CascadeError::Parse(format!("{}: {msg}", path.display())),
            other => other,
        })?;
        log::debug!(
            "loaded cascade from {}: {} stages, {} weak classifiers",
            path.display(),
            model.cascade.stage_count(),
            model.cascade.weak_count()
        );
        Ok(model)
    }
}
