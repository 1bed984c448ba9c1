use super::classifier::{StageClassifier, WeakClassifier};

/// Acceptance threshold for a stage: `rate · Σ alpha`.
///
/// A higher rate demands more of the vote mass and so rejects more windows.
pub fn stage_threshold(classifiers: &[WeakClassifier], target_false_positive_rate: f64) -> f64 {
    let total_alpha: f64 = classifiers.iter().map(|wc| wc.alpha).sum();
    target_false_positive_rate * total_alpha
}

/// Freeze boosted classifiers into a stage with its threshold.
pub fn build_stage(
    classifiers: Vec<WeakClassifier>,
    target_false_positive_rate: f64,
) -> StageClassifier {
    let threshold = stage_threshold(&classifiers, target_false_positive_rate);
    StageClassifier {
        weak_classifiers: classifiers,
        threshold,
    }
}
