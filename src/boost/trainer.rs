//! AdaBoost loop selecting one weak classifier per round.
use super::params::BoostParams;
use super::search::{is_positive, search_feature, ClassifierCandidate};
use super::weights::SampleWeights;
use crate::cascade::WeakClassifier;
use crate::diagnostics::RoundRecord;
use crate::features::Feature;
use crate::integral::SumTable;
use std::fmt;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Why a boosting loop ended before its requested round count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoostStop {
    /// The best feature in the pool was no better than chance.
    ErrorAtLeastHalf { round: usize, error: f64 },
    /// Reweighting produced NaN or infinite weights.
    NonFiniteWeights { round: usize },
}

impl fmt::Display for BoostStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoostStop::ErrorAtLeastHalf { round, error } => write!(
                f,
                "round {round}: best weighted error {error:.6} is not below 0.5"
            ),
            BoostStop::NonFiniteWeights { round } => {
                write!(f, "round {round}: reweighting produced non-finite weights")
            }
        }
    }
}

/// Classifiers built by one boosting call plus the weight trajectory.
#[derive(Clone, Debug)]
pub struct BoostOutcome {
    pub classifiers: Vec<WeakClassifier>,
    /// Starts with the initial vector; one more entry per completed round.
    pub history: Vec<SampleWeights>,
    pub rounds: Vec<RoundRecord>,
    pub stopped: Option<BoostStop>,
}

impl BoostOutcome {
    /// Weights to resume the next stage from.
    pub fn final_weights(&self) -> Option<&SampleWeights> {
        self.history.last()
    }

    pub fn into_final_weights(mut self) -> Option<SampleWeights> {
        self.history.pop()
    }
}

/// Lowest-error candidate over the whole pool.
///
/// The pool is processed in chunks of `chunk_size`; each chunk yields its
/// local best and the reduction keeps the minimum by `(error, pool index)`,
/// so the winner does not depend on scheduling.
pub fn best_candidate<S: SumTable + Sync>(
    pool: &[Feature],
    samples: &[S],
    labels: &[f32],
    weights: &[f64],
    chunk_size: usize,
) -> Option<ClassifierCandidate> {
    let chunk_size = chunk_size.max(1);
    let local_best = |(chunk_idx, chunk): (usize, &[Feature])| {
        chunk
            .iter()
            .enumerate()
            .map(|(j, f)| {
                (
                    chunk_idx * chunk_size + j,
                    search_feature(f, samples, labels, weights),
                )
            })
            .reduce(pick_lower)
    };

    #[cfg(feature = "parallel")]
    let best = pool
        .par_chunks(chunk_size)
        .enumerate()
        .filter_map(local_best)
        .reduce_with(pick_lower);
    #[cfg(not(feature = "parallel"))]
    let best = pool
        .chunks(chunk_size)
        .enumerate()
        .filter_map(local_best)
        .reduce(pick_lower);

    best.map(|(_, candidate)| candidate)
}

fn pick_lower(
    a: (usize, ClassifierCandidate),
    b: (usize, ClassifierCandidate),
) -> (usize, ClassifierCandidate) {
    match a.1.error.total_cmp(&b.1.error).then(a.0.cmp(&b.0)) {
        std::cmp::Ordering::Greater => b,
        _ => a,
    }
}

/// Run up to `rounds` boosting rounds.
///
/// Without `initial` weights each class starts with half the mass. The loop
/// stops early when the best error reaches 0.5 or the weights stop being
/// finite; classifiers from earlier rounds are kept in both cases.
///
/// # Panics
/// If `samples`, `labels` and `initial` differ in length.
pub fn train_boosted<S: SumTable + Sync>(
    rounds: usize,
    samples: &[S],
    labels: &[f32],
    pool: &[Feature],
    initial: Option<SampleWeights>,
    params: &BoostParams,
) -> BoostOutcome {
    assert_eq!(samples.len(), labels.len(), "one label per sample");
    let mut weights = initial.unwrap_or_else(|| SampleWeights::balanced(labels));
    assert_eq!(weights.len(), samples.len(), "one weight per sample");

    let mut outcome = BoostOutcome {
        classifiers: Vec::with_capacity(rounds),
        history: vec![weights.clone()],
        rounds: Vec::with_capacity(rounds),
        stopped: None,
    };

    for round in 0..rounds {
        let t0 = Instant::now();
        weights.normalize();

        let candidate =
            best_candidate(pool, samples, labels, weights.as_slice(), params.chunk_size);
        let Some(best) = candidate else {
            log::warn!("feature pool is empty, nothing to boost");
            break;
        };

        if best.error >= 0.5 || best.error.is_nan() {
            let stop = BoostStop::ErrorAtLeastHalf {
                round,
                error: best.error,
            };
            log::warn!("boosting stopped: {stop}");
            outcome.stopped = Some(stop);
            break;
        }

        let error = best
            .error
            .clamp(params.error_epsilon, 1.0 - params.error_epsilon);
        let beta = error / (1.0 - error);
        let raw_alpha = (1.0 / beta).ln();
        let alpha_capped = !raw_alpha.is_finite() || raw_alpha > params.alpha_cap;
        let alpha = if alpha_capped {
            log::debug!("round {round}: alpha {raw_alpha} capped at {}", params.alpha_cap);
            params.alpha_cap
        } else {
            raw_alpha
        };

        let classifier = WeakClassifier {
            threshold: best.threshold,
            polarity: best.polarity,
            alpha,
            feature: best.feature,
        };

        for ((w, sample), &label) in weights
            .as_mut_slice()
            .iter_mut()
            .zip(samples)
            .zip(labels)
        {
            let h = classifier.classify(sample);
            let y = u8::from(is_positive(label));
            if h == y {
                *w *= beta;
            }
        }

        if !weights.all_finite() {
            let stop = BoostStop::NonFiniteWeights { round };
            log::warn!("boosting stopped: {stop}");
            outcome.stopped = Some(stop);
            break;
        }

        let elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0;
        log::debug!(
            "round {round}: {} threshold={} polarity={} error={:.6} alpha={alpha:.4} ({elapsed_ms:.1} ms)",
            classifier.feature,
            classifier.threshold,
            classifier.polarity,
            best.error,
        );
        outcome.rounds.push(RoundRecord {
            round,
            feature: classifier.feature,
            threshold: classifier.threshold,
            polarity: classifier.polarity,
            error: best.error,
            beta,
            alpha,
            alpha_capped,
            elapsed_ms,
        });
        outcome.classifiers.push(classifier);
        outcome.history.push(weights.clone());
    }

    outcome
}
