//! Immutable classifier artifacts produced by training and shared by every
//! inference path.
//!
//! Evaluation of a cascade is a small state machine: stage `i` pending →
//! stage `i + 1` pending when the stage score reaches its threshold, otherwise
//! rejected immediately. Passing the last stage accepts the sample.
use crate::boost::search::weak_decision;
use crate::features::Feature;
use crate::integral::SumTable;
use serde::{Deserialize, Serialize};

/// Single feature + threshold + polarity with its boosting vote weight.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeakClassifier {
    pub threshold: f32,
    /// `+1` accepts values below the threshold, `-1` accepts values above it.
    pub polarity: i8,
    pub alpha: f64,
    pub feature: Feature,
}

impl WeakClassifier {
    /// Decision in `{0, 1}`.
    #[inline]
    pub fn classify<S: SumTable + ?Sized>(&self, sample: &S) -> u8 {
        weak_decision(self.feature.evaluate(sample), self.threshold, self.polarity)
    }
}

/// Boosted ensemble with an acceptance threshold on the summed votes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageClassifier {
    pub weak_classifiers: Vec<WeakClassifier>,
    pub threshold: f64,
}

impl StageClassifier {
    /// `Σ alpha_j · h_j(sample)`.
    pub fn score<S: SumTable + ?Sized>(&self, sample: &S) -> f64 {
        self.weak_classifiers
            .iter()
            .filter(|wc| wc.classify(sample) == 1)
            .map(|wc| wc.alpha)
            .sum()
    }

    #[inline]
    pub fn accepts<S: SumTable + ?Sized>(&self, sample: &S) -> bool {
        self.score(sample) >= self.threshold
    }

    pub fn total_alpha(&self) -> f64 {
        self.weak_classifiers.iter().map(|wc| wc.alpha).sum()
    }
}

/// Position of a sample in the cascade evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CascadeState {
    Pending(usize),
    Accepted,
    Rejected { stage: usize },
}

impl CascadeState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, CascadeState::Pending(_))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CascadeClassifier {
    pub stages: Vec<StageClassifier>,
}

impl CascadeClassifier {
    pub fn new(stages: Vec<StageClassifier>) -> Self {
        Self { stages }
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn weak_count(&self) -> usize {
        self.stages.iter().map(|s| s.weak_classifiers.len()).sum()
    }

    /// Advance one transition from `state`. Terminal states are returned as-is.
    pub fn step<S: SumTable + ?Sized>(&self, state: CascadeState, sample: &S) -> CascadeState {
        match state {
            CascadeState::Pending(i) => match self.stages.get(i) {
                None => CascadeState::Accepted,
                Some(stage) if !stage.accepts(sample) => CascadeState::Rejected { stage: i },
                Some(_) if i + 1 == self.stages.len() => CascadeState::Accepted,
                Some(_) => CascadeState::Pending(i + 1),
            },
            terminal => terminal,
        }
    }

    /// Run the state machine to a terminal state.
    pub fn run<S: SumTable + ?Sized>(&self, sample: &S) -> CascadeState {
        let mut state = CascadeState::Pending(0);
        while !state.is_terminal() {
            state = self.step(state, sample);
        }
        state
    }

    /// Accept only if every stage accepts, stopping at the first rejection.
    pub fn predict<S: SumTable + ?Sized>(&self, sample: &S) -> bool {
        self.run(sample) == CascadeState::Accepted
    }

    /// Evaluate every stage without early exit. Always agrees with [`predict`](Self::predict).
    pub fn predict_all_stages<S: SumTable + ?Sized>(&self, sample: &S) -> bool {
        self.stages
            .iter()
            .map(|stage| stage.accepts(sample))
            .fold(true, |acc, ok| acc & ok)
    }

    pub fn predict_batch<S: SumTable + Sync>(&self, samples: &[S]) -> Vec<bool> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            samples.par_iter().map(|s| self.predict(s)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            samples.iter().map(|s| self.predict(s)).collect()
        }
    }
}
