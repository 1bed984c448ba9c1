//! Stage-by-stage cascade training.
//!
//! Each stage runs its own boosting loop and starts from the final weight
//! vector of the stage before it, so later stages concentrate on the samples
//! earlier stages found hard.
use super::classifier::CascadeClassifier;
use super::model::TrainedCascade;
use super::stage::build_stage;
use crate::boost::{is_positive, train_boosted, BoostParams, SampleWeights};
use crate::diagnostics::{StageReport, TimingBreakdown, TrainingReport};
use crate::features::Feature;
use crate::integral::SumTable;
use crate::samples::{NormalizationParams, SampleSet};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Rounds and threshold coefficient of one stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageSchedule {
    pub rounds: usize,
    pub target_false_positive_rate: f64,
}

impl StageSchedule {
    pub const fn new(rounds: usize, target_false_positive_rate: f64) -> Self {
        Self {
            rounds,
            target_false_positive_rate,
        }
    }
}

/// Three stages, cheap and permissive first.
pub fn default_schedule() -> Vec<StageSchedule> {
    vec![
        StageSchedule::new(2, 0.3),
        StageSchedule::new(5, 0.4),
        StageSchedule::new(10, 0.5),
    ]
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeTrainParams {
    pub window_size: usize,
    pub stages: Vec<StageSchedule>,
    pub boost: BoostParams,
}

impl Default for CascadeTrainParams {
    fn default() -> Self {
        Self {
            window_size: 24,
            stages: default_schedule(),
            boost: BoostParams::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TrainError {
    EmptySampleSet,
    LabelMismatch { samples: usize, labels: usize },
    MissingClass { positives: usize, negatives: usize },
    EmptyFeaturePool,
    WindowMismatch { expected: usize, found: usize },
    FeatureOutsideWindow { index: usize, feature: Feature },
    NoStagesBuilt,
}

impl std::fmt::Display for TrainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrainError::EmptySampleSet => write!(f, "sample set is empty"),
            TrainError::LabelMismatch { samples, labels } => {
                write!(f, "{samples} samples but {labels} labels")
            }
            TrainError::MissingClass {
                positives,
                negatives,
            } => write!(
                f,
                "both classes are required ({positives} positives, {negatives} negatives)"
            ),
            TrainError::EmptyFeaturePool => write!(f, "feature pool is empty"),
            TrainError::WindowMismatch { expected, found } => {
                write!(f, "samples use a {found}px window, expected {expected}px")
            }
            TrainError::FeatureOutsideWindow { index, feature } => {
                write!(f, "feature {index} ({feature}) does not fit the window")
            }
            TrainError::NoStagesBuilt => write!(f, "no stage produced a weak classifier"),
        }
    }
}

impl std::error::Error for TrainError {}

/// Trained model plus the trace of how it was built.
#[derive(Clone, Debug)]
pub struct TrainingOutcome {
    pub model: TrainedCascade,
    pub report: TrainingReport,
    /// Weight vector after the last round of the last stage.
    pub final_weights: SampleWeights,
}

#[derive(Clone, Debug, Default)]
pub struct CascadeTrainer {
    pub params: CascadeTrainParams,
}

impl CascadeTrainer {
    pub fn new(params: CascadeTrainParams) -> Self {
        Self { params }
    }

    /// Train on a prepared sample set; its normalization is stored in the model.
    pub fn train(&self, set: &SampleSet, pool: &[Feature]) -> Result<TrainingOutcome, TrainError> {
        if set.window_size() != self.params.window_size {
            return Err(TrainError::WindowMismatch {
                expected: self.params.window_size,
                found: set.window_size(),
            });
        }
        self.train_samples(set.samples(), set.labels(), pool, set.normalization())
    }

    /// Train on arbitrary integral tables whose extent is the window.
    pub fn train_samples<S: SumTable + Sync>(
        &self,
        samples: &[S],
        labels: &[f32],
        pool: &[Feature],
        normalization: NormalizationParams,
    ) -> Result<TrainingOutcome, TrainError> {
        let window = self.params.window_size;
        if samples.is_empty() {
            return Err(TrainError::EmptySampleSet);
        }
        if samples.len() != labels.len() {
            return Err(TrainError::LabelMismatch {
                samples: samples.len(),
                labels: labels.len(),
            });
        }
        let positives = labels.iter().filter(|&&y| is_positive(y)).count();
        let negatives = labels.len() - positives;
        if positives == 0 || negatives == 0 {
            return Err(TrainError::MissingClass {
                positives,
                negatives,
            });
        }
        if pool.is_empty() {
            return Err(TrainError::EmptyFeaturePool);
        }
        if let Some((index, feature)) = pool.iter().enumerate().find(|(_, f)| !f.fits(window)) {
            return Err(TrainError::FeatureOutsideWindow {
                index,
                feature: *feature,
            });
        }
        if let Some(found) = samples
            .iter()
            .map(|s| s.extent())
            .find(|&(w, h)| w < window || h < window)
            .map(|(w, h)| w.min(h))
        {
            return Err(TrainError::WindowMismatch {
                expected: window,
                found,
            });
        }

        let t_total = Instant::now();
        let mut timings = TimingBreakdown::default();
        let mut weights: Option<SampleWeights> = None;
        let mut stages = Vec::with_capacity(self.params.stages.len());
        let mut stage_reports = Vec::with_capacity(self.params.stages.len());

        for (stage_index, schedule) in self.params.stages.iter().enumerate() {
            let t0 = Instant::now();
            log::debug!(
                "stage {}: boosting {} rounds over {} features",
                stage_index + 1,
                schedule.rounds,
                pool.len()
            );
            let outcome = train_boosted(
                schedule.rounds,
                samples,
                labels,
                pool,
                weights.take(),
                &self.params.boost,
            );
            let stop_reason = outcome.stopped.map(|s| s.to_string());
            let rounds = outcome.rounds;
            let classifiers = outcome.classifiers;
            let mut history = outcome.history;
            weights = history.pop();

            let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
            timings.push(format!("stage {}", stage_index + 1), elapsed_ms);

            if classifiers.is_empty() {
                log::warn!(
                    "stage {} built no weak classifier and is skipped",
                    stage_index + 1
                );
                stage_reports.push(StageReport {
                    stage_index,
                    requested_rounds: schedule.rounds,
                    built_rounds: 0,
                    target_false_positive_rate: schedule.target_false_positive_rate,
                    threshold: 0.0,
                    total_alpha: 0.0,
                    stop_reason,
                    skipped: true,
                    rounds,
                    elapsed_ms,
                });
                continue;
            }

            let built_rounds = classifiers.len();
            let stage = build_stage(classifiers, schedule.target_false_positive_rate);
            log::info!(
                "stage {}: {} weak classifiers, threshold {:.4} of total alpha {:.4} ({:.1} ms)",
                stage_index + 1,
                built_rounds,
                stage.threshold,
                stage.total_alpha(),
                elapsed_ms
            );
            stage_reports.push(StageReport {
                stage_index,
                requested_rounds: schedule.rounds,
                built_rounds,
                target_false_positive_rate: schedule.target_false_positive_rate,
                threshold: stage.threshold,
                total_alpha: stage.total_alpha(),
                stop_reason,
                skipped: false,
                rounds,
                elapsed_ms,
            });
            stages.push(stage);
        }

        if stages.is_empty() {
            return Err(TrainError::NoStagesBuilt);
        }

        timings.total_ms = t_total.elapsed().as_secs_f64() * 1000.0;
        let report = TrainingReport {
            window_size: window,
            sample_count: samples.len(),
            positive_count: positives,
            negative_count: negatives,
            feature_count: pool.len(),
            stages: stage_reports,
            timings,
        };
        Ok(TrainingOutcome {
            model: TrainedCascade {
                window_size: window,
                normalization,
                cascade: CascadeClassifier::new(stages),
            },
            report,
            final_weights: weights.unwrap_or_else(|| SampleWeights::balanced(labels)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureKind;
    use crate::image::ImageF32;

    fn set() -> SampleSet {
        let bright_left = ImageF32::from_fn(2, 2, |x, _| if x == 0 { 9.0 } else { 1.0 });
        let bright_right = ImageF32::from_fn(2, 2, |x, _| if x == 0 { 1.0 } else { 9.0 });
        SampleSet::from_windows(
            &[bright_left.clone(), bright_left],
            &[bright_right.clone(), bright_right],
            2,
        )
        .expect("samples")
    }

    fn trainer(stages: Vec<StageSchedule>) -> CascadeTrainer {
        CascadeTrainer::new(CascadeTrainParams {
            window_size: 2,
            stages,
            boost: BoostParams::default(),
        })
    }

    #[test]
    fn separable_set_trains_a_perfect_cascade() {
        let pool = vec![Feature::new(FeatureKind::TwoH, 0, 0, 2, 2)];
        let set = set();
        let out = trainer(vec![StageSchedule::new(1, 0.5)])
            .train(&set, &pool)
            .expect("trained");
        assert_eq!(out.model.cascade.stage_count(), 1);
        for (s, &y) in set.samples().iter().zip(set.labels()) {
            assert_eq!(out.model.cascade.predict(s), is_positive(y));
        }
        assert_eq!(out.report.built_stage_count(), 1);
        assert_eq!(out.final_weights.len(), 4);
        assert!(out.final_weights.all_finite());
    }

    #[test]
    fn hopeless_pool_builds_no_stage() {
        // the vertical split sees identical rows in every sample
        let pool = vec![Feature::new(FeatureKind::TwoV, 0, 0, 2, 2)];
        let err = trainer(default_schedule()).train(&set(), &pool).unwrap_err();
        assert_eq!(err, TrainError::NoStagesBuilt);
    }

    #[test]
    fn input_validation() {
        let pool = vec![Feature::new(FeatureKind::TwoH, 0, 0, 2, 2)];
        let t = trainer(default_schedule());
        assert_eq!(t.train(&set(), &[]).unwrap_err(), TrainError::EmptyFeaturePool);

        let wide = [Feature::new(FeatureKind::TwoH, 0, 0, 4, 2)];
        assert!(matches!(
            t.train(&set(), &wide).unwrap_err(),
            TrainError::FeatureOutsideWindow { index: 0, .. }
        ));

        let only_pos: Vec<f32> = vec![1.0; 4];
        assert_eq!(
            t.train_samples(set().samples(), &only_pos, &pool, NormalizationParams::default())
                .unwrap_err(),
            TrainError::MissingClass {
                positives: 4,
                negatives: 0
            }
        );
        assert_eq!(
            t.train_samples(set().samples(), &[1.0, 0.0], &pool, NormalizationParams::default())
                .unwrap_err(),
            TrainError::LabelMismatch {
                samples: 4,
                labels: 2
            }
        );
    }
}
