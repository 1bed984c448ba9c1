//! Serializable reports produced by training and detection.
//!
//! `TrainingReport` records every boosting round of every stage;
//! `DetectionReport` records per-scale scan statistics. Both carry a
//! `TimingBreakdown` and are written as JSON by the tools.

pub mod detection;
pub mod timing;
pub mod training;

pub use detection::{DetectionReport, ScaleReport};
pub use timing::{StageTiming, TimingBreakdown};
pub use training::{RoundRecord, StageReport, TrainingReport};
