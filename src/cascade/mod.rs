//! Cascade model, stage construction, training driver and evaluation.

pub mod classifier;
pub mod evaluation;
pub mod model;
pub mod stage;
pub mod trainer;

pub use classifier::{CascadeClassifier, CascadeState, StageClassifier, WeakClassifier};
pub use evaluation::{evaluate_cascade_detailed, CascadeEvaluation};
pub use model::{CascadeError, TrainedCascade};
pub use stage::{build_stage, stage_threshold};
pub use trainer::{
    default_schedule, CascadeTrainParams, CascadeTrainer, StageSchedule, TrainError,
    TrainingOutcome,
};
