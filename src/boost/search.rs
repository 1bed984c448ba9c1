//! Optimal threshold/polarity search for a single feature.
//!
//! Given per-sample feature values, labels and weights, the samples are
//! stable-sorted by value and walked once while accumulating the weight of
//! negatives (`s_minus`) and positives (`s_plus`) seen so far. At every
//! boundary between runs of equal values two splits are scored:
//!
//! - polarity `-1`, threshold = value of the run just consumed: everything at
//!   or below it is negative, so the error is `s_plus + (total_minus - s_minus)`;
//! - polarity `+1`, threshold = value of the run about to be consumed:
//!   everything strictly below it is positive, so the error is
//!   `s_minus + (total_plus - s_plus)`.
//!
//! Scoring only at run boundaries makes the reported error equal to the
//! weighted error of [`weak_decision`] at the returned threshold, including
//! samples whose value equals the threshold. The first strictly better split
//! wins, which makes the search deterministic.
use crate::features::Feature;
use crate::integral::SumTable;
use std::cmp::Ordering;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdPolarity {
    pub threshold: f32,
    pub polarity: i8,
}

/// Best split of one feature on the current weight distribution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClassifierCandidate {
    pub threshold: f32,
    pub polarity: i8,
    pub error: f64,
    pub feature: Feature,
}

/// Labels above 0.5 are positive.
#[inline]
pub fn is_positive(label: f32) -> bool {
    label > 0.5
}

/// `(sign(polarity · (threshold − value)) + 1) / 2`, with `sign(0) = 0`.
#[inline]
pub fn weak_decision(value: f32, threshold: f32, polarity: i8) -> u8 {
    let diff = threshold - value;
    let sign: i32 = if diff > 0.0 {
        1
    } else if diff < 0.0 {
        -1
    } else {
        0
    };
    ((polarity as i32 * sign + 1) / 2) as u8
}

/// Find the error-minimising split over precomputed feature values.
///
/// Returns the split and its weighted error. With no samples the error is
/// `f64::INFINITY`.
pub fn find_best_threshold(
    values: &[f32],
    labels: &[f32],
    weights: &[f64],
) -> (ThresholdPolarity, f64) {
    debug_assert_eq!(values.len(), labels.len());
    debug_assert_eq!(values.len(), weights.len());

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let (mut total_minus, mut total_plus) = (0.0f64, 0.0f64);
    for (&label, &w) in labels.iter().zip(weights) {
        if is_positive(label) {
            total_plus += w;
        } else {
            total_minus += w;
        }
    }

    let mut best = ThresholdPolarity {
        threshold: 0.0,
        polarity: 1,
    };
    let mut best_error = f64::INFINITY;
    let (mut s_minus, mut s_plus) = (0.0f64, 0.0f64);
    let mut i = 0;
    while i < order.len() {
        let z = values[order[i]];

        let error_pos = s_minus + (total_plus - s_plus);
        if error_pos < best_error {
            best_error = error_pos;
            best = ThresholdPolarity {
                threshold: z,
                polarity: 1,
            };
        }

        loop {
            let idx = order[i];
            if is_positive(labels[idx]) {
                s_plus += weights[idx];
            } else {
                s_minus += weights[idx];
            }
            i += 1;
            if i >= order.len() || values[order[i]].total_cmp(&z) != Ordering::Equal {
                break;
            }
        }

        let error_neg = s_plus + (total_minus - s_minus);
        if error_neg < best_error {
            best_error = error_neg;
            best = ThresholdPolarity {
                threshold: z,
                polarity: -1,
            };
        }
    }

    // running sums can leave tiny negative residue
    (best, best_error.max(0.0))
}

/// Evaluate `feature` on every sample and return its best split.
pub fn search_feature<S: SumTable>(
    feature: &Feature,
    samples: &[S],
    labels: &[f32],
    weights: &[f64],
) -> ClassifierCandidate {
    let values: Vec<f32> = samples.iter().map(|s| feature.evaluate(s)).collect();
    let (tp, error) = find_best_threshold(&values, labels, weights);
    ClassifierCandidate {
        threshold: tp.threshold,
        polarity: tp.polarity,
        error,
        feature: *feature,
    }
}

/// Weighted error of a fixed `(threshold, polarity)` rule on precomputed values.
pub fn weighted_error(
    values: &[f32],
    labels: &[f32],
    weights: &[f64],
    threshold: f32,
    polarity: i8,
) -> f64 {
    values
        .iter()
        .zip(labels)
        .zip(weights)
        .filter(|((&z, &y), _)| (weak_decision(z, threshold, polarity) == 1) != is_positive(y))
        .map(|(_, &w)| w)
        .sum()
}
