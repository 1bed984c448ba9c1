//! Offline quality report for a cascade over a labelled sample set.
use super::classifier::{CascadeClassifier, CascadeState};
use crate::boost::is_positive;
use crate::integral::SumTable;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeEvaluation {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    /// Number of samples rejected by each stage.
    pub stage_rejects: Vec<usize>,
}

impl CascadeEvaluation {
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn f1_score(&self) -> f64 {
        let (p, r) = (self.precision(), self.recall());
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }

    /// Write the confusion matrix, metrics and rejection histogram at `info`.
    pub fn log_report(&self) {
        log::info!(
            "confusion: tp={} fp={} tn={} fn={}",
            self.true_positives,
            self.false_positives,
            self.true_negatives,
            self.false_negatives
        );
        log::info!(
            "accuracy={:.2}% precision={:.2}% recall={:.2}% f1={:.4}",
            self.accuracy() * 100.0,
            self.precision() * 100.0,
            self.recall() * 100.0,
            self.f1_score()
        );
        let total = self.total().max(1) as f64;
        for (i, &count) in self.stage_rejects.iter().enumerate() {
            log::info!(
                "stage {}: rejected {count} samples ({:.2}%)",
                i + 1,
                count as f64 / total * 100.0
            );
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den > 0 {
        num as f64 / den as f64
    } else {
        0.0
    }
}

/// Evaluate `cascade` on every sample, recording where rejections happen.
pub fn evaluate_cascade_detailed<S: SumTable>(
    cascade: &CascadeClassifier,
    samples: &[S],
    labels: &[f32],
) -> CascadeEvaluation {
    let mut eval = CascadeEvaluation {
        stage_rejects: vec![0; cascade.stage_count()],
        ..CascadeEvaluation::default()
    };
    for (sample, &label) in samples.iter().zip(labels) {
        let predicted = match cascade.run(sample) {
            CascadeState::Rejected { stage } => {
                eval.stage_rejects[stage] += 1;
                false
            }
            _ => true,
        };
        match (predicted, is_positive(label)) {
            (true, true) => eval.true_positives += 1,
            (true, false) => eval.false_positives += 1,
            (false, true) => eval.false_negatives += 1,
            (false, false) => eval.true_negatives += 1,
        }
    }
    eval
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_from_counts() {
        let eval = CascadeEvaluation {
            true_positives: 8,
            false_positives: 2,
            true_negatives: 6,
            false_negatives: 4,
            stage_rejects: vec![7, 3],
        };
        assert_eq!(eval.total(), 20);
        assert!((eval.precision() - 0.8).abs() < 1e-12);
        assert!((eval.recall() - 8.0 / 12.0).abs() < 1e-12);
        assert!((eval.accuracy() - 0.7).abs() < 1e-12);
        let f1 = 2.0 * 0.8 * (8.0 / 12.0) / (0.8 + 8.0 / 12.0);
        assert!((eval.f1_score() - f1).abs() < 1e-12);
    }

    #[test]
    fn empty_evaluation_has_zero_metrics() {
        let eval = CascadeEvaluation::default();
        assert_eq!(eval.precision(), 0.0);
        assert_eq!(eval.recall(), 0.0);
        assert_eq!(eval.accuracy(), 0.0);
        assert_eq!(eval.f1_score(), 0.0);
    }
}
