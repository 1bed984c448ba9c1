use serde::{Deserialize, Serialize};

/// Tunables for the AdaBoost loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostParams {
    /// Upper bound on a single classifier's vote.
    pub alpha_cap: f64,
    /// Weighted errors are clamped to at least this before computing beta.
    pub error_epsilon: f64,
    /// Features per parallel work unit in the search.
    pub chunk_size: usize,
}

impl Default for BoostParams {
    fn default() -> Self {
        Self {
            alpha_cap: 25.0,
            error_epsilon: 1e-10,
            chunk_size: 1500,
        }
    }
}
