use super::search::is_positive;

/// Outcome of [`SampleWeights::normalize`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NormalizeOutcome {
    Normalized,
    /// The sum was not finite or not positive; weights were reset to uniform.
    UniformFallback { sum: f64 },
}

/// Per-sample boosting weights.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleWeights(Vec<f64>);

impl SampleWeights {
    pub fn uniform(n: usize) -> Self {
        if n == 0 {
            return Self(Vec::new());
        }
        Self(vec![1.0 / n as f64; n])
    }

    /// `1 / (2 · count)` per class so both classes carry half the mass.
    ///
    /// If one class is absent the other simply carries its own half; the
    /// next normalisation restores a unit sum.
    pub fn balanced(labels: &[f32]) -> Self {
        let positives = labels.iter().filter(|&&y| is_positive(y)).count();
        let negatives = labels.len() - positives;
        let w_pos = if positives > 0 {
            1.0 / (2.0 * positives as f64)
        } else {
            0.0
        };
        let w_neg = if negatives > 0 {
            1.0 / (2.0 * negatives as f64)
        } else {
            0.0
        };
        Self(
            labels
                .iter()
                .map(|&y| if is_positive(y) { w_pos } else { w_neg })
                .collect(),
        )
    }

    pub fn from_vec(weights: Vec<f64>) -> Self {
        Self(weights)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }

    pub fn all_finite(&self) -> bool {
        self.0.iter().all(|w| w.is_finite())
    }

    /// Rescale to unit sum. Weights are floored at the smallest positive
    /// normal `f64` so no sample ever reaches exactly zero.
    pub fn normalize(&mut self) -> NormalizeOutcome {
        let sum = self.sum();
        if !sum.is_finite() || sum <= 0.0 {
            log::warn!("weight sum {sum} is degenerate, resetting to uniform");
            *self = Self::uniform(self.len());
            return NormalizeOutcome::UniformFallback { sum };
        }
        for w in &mut self.0 {
            *w = (*w / sum).max(f64::MIN_POSITIVE);
        }
        NormalizeOutcome::Normalized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_gives_each_class_half() {
        let labels = [1.0, 1.0, 1.0, 0.0];
        let w = SampleWeights::balanced(&labels);
        assert_eq!(w.as_slice(), &[1.0 / 6.0, 1.0 / 6.0, 1.0 / 6.0, 0.5]);
        assert!((w.sum() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_yields_unit_sum() {
        let mut w = SampleWeights::from_vec(vec![2.0, 6.0, 0.0, 2.0]);
        assert_eq!(w.normalize(), NormalizeOutcome::Normalized);
        assert!((w.sum() - 1.0).abs() < 1e-12);
        assert!(w.as_slice().iter().all(|&v| v > 0.0));
    }

    #[test]
    fn degenerate_sum_falls_back_to_uniform() {
        let mut w = SampleWeights::from_vec(vec![0.0, 0.0, 0.0, 0.0]);
        assert_eq!(w.normalize(), NormalizeOutcome::UniformFallback { sum: 0.0 });
        assert_eq!(w.as_slice(), &[0.25; 4]);

        let mut w = SampleWeights::from_vec(vec![f64::INFINITY, 1.0]);
        assert!(matches!(
            w.normalize(),
            NormalizeOutcome::UniformFallback { .. }
        ));
        assert_eq!(w.as_slice(), &[0.5, 0.5]);
    }
}
