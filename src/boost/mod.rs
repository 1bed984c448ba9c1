//! Weak-classifier search and the AdaBoost loop.

pub mod params;
pub mod search;
pub mod trainer;
pub mod weights;

pub use params::BoostParams;
pub use search::{
    find_best_threshold, is_positive, search_feature, weak_decision, weighted_error,
    ClassifierCandidate, ThresholdPolarity,
};
pub use trainer::{best_candidate, train_boosted, BoostOutcome, BoostStop};
pub use weights::{NormalizeOutcome, SampleWeights};
