#![doc = include_str!("../README.md")]

// Core algorithms
pub mod boost;
pub mod cascade;
pub mod detect;
pub mod features;
pub mod integral;

// Data plumbing and reporting
pub mod config;
pub mod diagnostics;
pub mod image;
pub mod samples;

// --- High-level re-exports -------------------------------------------------

pub use crate::cascade::{
    CascadeClassifier, CascadeError, CascadeTrainParams, CascadeTrainer, StageSchedule,
    TrainError, TrainedCascade,
};
pub use crate::detect::{DetectParams, Detection, MultiScaleDetector};
pub use crate::features::{Feature, FeatureKind};
pub use crate::samples::{NormalizationParams, SampleSet};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use haar_cascade::prelude::*;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let detector = MultiScaleDetector::from_file(Path::new("model.json"), DetectParams::default())?;
/// let (w, h) = (640usize, 480usize);
/// let gray = vec![0u8; w * h];
/// let img = ImageU8 { w, h, stride: w, data: &gray };
///
/// for d in detector.detect_multi_scale(&img.to_f32()) {
///     println!("{} {} {}x{}", d.x, d.y, d.width, d.height);
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageF32, ImageU8};
    pub use crate::{
        CascadeTrainer, DetectParams, Detection, MultiScaleDetector, SampleSet, TrainedCascade,
    };
}
